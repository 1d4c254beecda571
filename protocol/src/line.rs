use std::io::{self, BufRead};

/// Reads one line, stripping the trailing `\n` (and a preceding `\r`, for
/// tolerance of clients that send CRLF).
///
/// Returns `Ok(None)` at end-of-input with no bytes read, matching the
/// "session ends when the input stream reaches end-of-file" rule.
pub fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let read = reader.read_until(b'\n', &mut buf)?;
    if read == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(buf))
}
