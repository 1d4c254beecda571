/// Checks that a NAME, TOPIC or VALUE token is acceptable on the wire.
///
/// Non-empty and free of colons. Space and newline are excluded by
/// construction once a line has been split into fields, but a caller
/// validating a raw command-line argument (the companion client, before it
/// has sent anything) needs the full check.
pub fn is_valid_token(bytes: &[u8]) -> bool {
    !bytes.is_empty() && !bytes.contains(&b':')
}
