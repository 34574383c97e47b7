//! Text normalization helpers shared by the extractors

/// Split text into lines on universal-newline boundaries.
///
/// `\n`, `\r\n`, `\r`, vertical tab, form feed, the file/group/record
/// separators, NEL, U+2028 and U+2029 all end a line. A trailing boundary
/// does not produce an empty last line, and the empty string has no lines.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            '\n' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}' => {
                lines.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Clean up PDF page text: resolve leftover `<uniXXXX>` / `(uniXXXX)` glyph
/// names, expand the Latin ligatures U+FB00..U+FB04 and drop NUL bytes.
/// Everything else is kept as extracted.
pub fn cleanup_pdf_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if c == '<' || c == '(' {
            if let Some(glyph) = glyph_name(rest) {
                result.push(glyph);
                rest = &rest[GLYPH_NAME_LEN..];
                continue;
            }
        }

        match c {
            '\0' => {}
            '\u{FB00}' => result.push_str("ff"),
            '\u{FB01}' => result.push_str("fi"),
            '\u{FB02}' => result.push_str("fl"),
            '\u{FB03}' => result.push_str("ffi"),
            '\u{FB04}' => result.push_str("ffl"),
            other => result.push(other),
        }
        rest = &rest[c.len_utf8()..];
    }

    result
}

/// Length of a delimited glyph name such as `<uni2022>`
const GLYPH_NAME_LEN: usize = 9;

/// Decode a glyph name at the start of `text`
fn glyph_name(text: &str) -> Option<char> {
    let candidate = text.get(..GLYPH_NAME_LEN)?;
    let close = match candidate.as_bytes()[0] {
        b'<' => b'>',
        b'(' => b')',
        _ => return None,
    };
    if candidate.as_bytes()[GLYPH_NAME_LEN - 1] != close {
        return None;
    }

    let hex = candidate[1..GLYPH_NAME_LEN - 1].strip_prefix("uni")?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_basic() {
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_lines_edges() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("\n"), vec![""]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("   "), vec!["   "]);
    }

    #[test]
    fn test_split_lines_unicode_boundaries() {
        assert_eq!(split_lines("title\u{0b}subtitle"), vec!["title", "subtitle"]);
        assert_eq!(split_lines("x\u{2028}y\u{0c}z"), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_cleanup_pdf_text() {
        assert_eq!(cleanup_pdf_text("e\u{FB03}cient \u{FB00}ort"), "efficient effort");
        assert_eq!(cleanup_pdf_text("a\0b"), "ab");
        assert_eq!(cleanup_pdf_text("(uni2022)item <uni2013> x"), "\u{2022}item \u{2013} x");
        assert_eq!(cleanup_pdf_text("fine"), "fine");
    }

    #[test]
    fn test_cleanup_keeps_ordinary_text() {
        let text = "(fl) \u{201C}q\u{201D} \u{2014} caf\u{e9} (unit) <uni12>";
        assert_eq!(cleanup_pdf_text(text), text);
    }
}
