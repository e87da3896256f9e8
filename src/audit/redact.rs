//! Message redaction
//!
//! Secrets are kept out of log messages by construction (`SecretString`
//! cannot be formatted), but error text from transport libraries is not
//! under our control. `scrub` masks anything that looks like a
//! credential assignment before the message is written.

const SENSITIVE_KEYS: &[&str] = &["password", "passphrase", "pwd", "secret", "token"];

/// Mask credential-looking fragments in a message.
///
/// `password=hunter2` becomes `password=***`; the value is masked up to
/// the next whitespace, comma, or quote. Matching is case-insensitive.
pub fn scrub(message: &str) -> String {
    // ASCII-only lowering keeps byte offsets aligned with the original.
    let lower = message.to_ascii_lowercase();
    let mut masked: Vec<(usize, usize)> = Vec::new();

    for key in SENSITIVE_KEYS {
        let mut search_from = 0;
        while let Some(pos) = lower[search_from..].find(key) {
            let key_start = search_from + pos;
            let after_key = key_start + key.len();
            search_from = after_key;

            // Only treat it as an assignment: key followed by '=' or ':'
            let rest = &message[after_key..];
            let sep_len = if rest.starts_with(": ") || rest.starts_with("= ") {
                2
            } else if rest.starts_with('=') || rest.starts_with(':') {
                1
            } else {
                continue;
            };

            let value_start = after_key + sep_len;
            let value_end = message[value_start..]
                .find(|c: char| c.is_whitespace() || c == ',' || c == '"' || c == '\'')
                .map(|i| value_start + i)
                .unwrap_or(message.len());

            if value_end > value_start {
                masked.push((value_start, value_end));
            }
        }
    }

    if masked.is_empty() {
        return message.to_string();
    }

    masked.sort_unstable();
    let mut out = String::with_capacity(message.len());
    let mut cursor = 0;
    for (start, end) in masked {
        if start < cursor {
            continue;
        }
        out.push_str(&message[cursor..start]);
        out.push_str("***");
        cursor = end;
    }
    out.push_str(&message[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_masks_assignments() {
        assert_eq!(scrub("auth failed: password=hunter2 for user"),
                   "auth failed: password=*** for user");
        assert_eq!(scrub("PWD=p@ss"), "PWD=***");
        assert_eq!(scrub("token:abc123,retrying"), "token:***,retrying");
    }

    #[test]
    fn test_scrub_leaves_plain_text_alone() {
        let msg = "password prompt was shown to the user";
        assert_eq!(scrub(msg), msg);

        let msg = "connection refused by host";
        assert_eq!(scrub(msg), msg);
    }

    #[test]
    fn test_scrub_multiple_fragments() {
        let out = scrub("password=a secret=b");
        assert_eq!(out, "password=*** secret=***");
    }
}
