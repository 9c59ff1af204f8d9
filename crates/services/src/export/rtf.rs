/// Build an RTF 1 document with a bold title followed by the text
pub(super) fn render(title: &str, text: &str) -> String {
    let mut out = String::from("{\\rtf1\\ansi\\deff0 {\\fonttbl {\\f0 Times New Roman;}}\n");
    out.push_str("\\f0\\fs24 \\b ");
    out.push_str(&escape(title));
    out.push_str("\\b0\\par\n\\par\n");

    let mut lines = text.lines().peekable();
    while let Some(line) = lines.next() {
        out.push_str(&escape(line));
        if lines.peek().is_some() {
            out.push_str("\\par\n");
        }
    }

    out.push_str("\n}");
    out
}

/// Escape control characters and write non-ASCII as `\uN?` (signed UTF-16 units)
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\t' => out.push_str("\\tab "),
            '\r' => {}
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c if c.is_ascii_control() => {}
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_rtf_control_characters() {
        assert_eq!(escape(r"a\b{c}"), r"a\\b\{c\}");
    }

    #[test]
    fn test_non_ascii_as_unicode_escapes() {
        assert_eq!(escape("é"), "\\u233?");
        // U+6539, below 0x8000 stays positive
        assert_eq!(escape("改"), "\\u25913?");
        // Surrogate pair, written as two negative units
        assert_eq!(escape("😀"), "\\u-10179?\\u-8704?");
    }

    #[test]
    fn test_render_document_structure() {
        let rtf = render("AI Rewritten Text", "First line\nSecond {line}");

        assert!(rtf.starts_with("{\\rtf1\\ansi"));
        assert!(rtf.contains("\\b AI Rewritten Text\\b0\\par"));
        assert!(rtf.contains("First line\\par\nSecond \\{line\\}"));
        assert!(rtf.ends_with('}'));
    }
}
