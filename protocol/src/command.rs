use crate::token::is_valid_token;

/// One parsed command line from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Name(Vec<u8>),
    Sub(Vec<u8>),
    Unsub(Vec<u8>),
    Pub { topic: Vec<u8>, value: Vec<u8> },
}

/// Parses one command line (without its trailing newline).
///
/// Returns `None` if the line does not match any command grammar or fails
/// the token validation rules. The caller decides what to do with an
/// unparseable line (reply `:invalid`, or drop it silently) based on the
/// session's own state - this function knows nothing about sessions.
pub fn parse(line: &[u8]) -> Option<Command> {
    let (verb, rest) = split_once(line, b' ')?;
    match verb {
        b"name" => single_token(rest).map(|n| Command::Name(n.to_vec())),
        b"sub" => single_token(rest).map(|t| Command::Sub(t.to_vec())),
        b"unsub" => single_token(rest).map(|t| Command::Unsub(t.to_vec())),
        b"pub" => {
            let (topic, value) = split_once(rest, b' ')?;
            if is_valid_token(topic) && is_valid_token(value) {
                Some(Command::Pub {
                    topic: topic.to_vec(),
                    value: value.to_vec(),
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

/// A field that must be exactly one token: non-empty, no embedded space.
fn single_token(field: &[u8]) -> Option<&[u8]> {
    if field.contains(&b' ') || !is_valid_token(field) {
        None
    } else {
        Some(field)
    }
}

fn split_once(s: &[u8], byte: u8) -> Option<(&[u8], &[u8])> {
    let pos = s.iter().position(|&b| b == byte)?;
    Some((&s[..pos], &s[pos + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name() {
        assert_eq!(parse(b"name alice"), Some(Command::Name(b"alice".to_vec())));
    }

    #[test]
    fn parses_sub_and_unsub() {
        assert_eq!(parse(b"sub news"), Some(Command::Sub(b"news".to_vec())));
        assert_eq!(parse(b"unsub news"), Some(Command::Unsub(b"news".to_vec())));
    }

    #[test]
    fn parses_pub_with_spaces_in_value() {
        assert_eq!(
            parse(b"pub news hello world"),
            Some(Command::Pub {
                topic: b"news".to_vec(),
                value: b"hello world".to_vec()
            })
        );
    }

    #[test]
    fn pub_value_keeps_repeated_internal_spaces() {
        assert_eq!(
            parse(b"pub news a  b"),
            Some(Command::Pub {
                topic: b"news".to_vec(),
                value: b"a  b".to_vec()
            })
        );
    }

    #[test]
    fn rejects_colon_in_any_field() {
        assert_eq!(parse(b"name al:ice"), None);
        assert_eq!(parse(b"sub ne:ws"), None);
        assert_eq!(parse(b"pub t a:b"), None);
        assert_eq!(parse(b"pub t:opic value"), None);
    }

    #[test]
    fn rejects_empty_fields() {
        assert_eq!(parse(b"name "), None);
        assert_eq!(parse(b"sub "), None);
        assert_eq!(parse(b"pub news "), None);
    }

    #[test]
    fn rejects_extra_fields_on_name_sub_unsub() {
        assert_eq!(parse(b"name alice bob"), None);
        assert_eq!(parse(b"sub news weather"), None);
    }

    #[test]
    fn rejects_unknown_verb_and_bare_verb() {
        assert_eq!(parse(b"subx foo"), None);
        assert_eq!(parse(b"sub"), None);
        assert_eq!(parse(b""), None);
    }
}
