//! Text escaping and content-line folding (RFC 5545 §3.1, §3.3.11).

/// Content lines are folded before reaching this many octets.
pub const FOLD_LIMIT: usize = 75;

/// Escape a TEXT value.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str("\\n");
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Reverse of [`escape_text`]. Unknown escapes keep the escaped character.
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

/// Fold a content line so no physical line reaches [`FOLD_LIMIT`] octets.
///
/// Continuation lines start with a single space. Folds only happen on
/// character boundaries, so multi-byte UTF-8 sequences stay intact.
pub fn fold_line(line: &str) -> String {
    if line.len() < FOLD_LIMIT {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + 3 * (line.len() / FOLD_LIMIT + 1));
    let mut octets = 0;

    for ch in line.chars() {
        let len = ch.len_utf8();
        octets += len;
        if octets >= FOLD_LIMIT {
            out.push_str("\r\n ");
            octets = len;
        }
        out.push(ch);
    }

    out
}
