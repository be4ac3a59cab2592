use std::borrow::Cow;

/// Escapes a string for the text form of bulk-copy input.
///
/// Backslashes are doubled first, then the ASCII control characters 8 through
/// 13 become their two-character escapes.  Everything else passes through
/// unchanged; the output stays UTF-8.
pub fn escape(input: &str) -> Cow<'_, str> {
    if !input.bytes().any(|b| b == b'\\' || (0x08..=0x0d).contains(&b)) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
