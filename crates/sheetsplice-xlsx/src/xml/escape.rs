//! Minimal XML escaping
//!
//! Only `& < > " '`, tab, carriage return and (outside character data)
//! newline are replaced, each by its shortest entity. Characters outside the
//! XML character range become U+FFFD.

/// Escape character data; newlines are kept as-is
pub fn escape_text(out: &mut String, s: &str) {
    escape(out, s, false)
}

/// Escape an attribute value or a shared string; newlines become `&#xA;`
pub fn escape_value(out: &mut String, s: &str) {
    escape(out, s, true)
}

fn escape(out: &mut String, s: &str, escape_newline: bool) {
    let mut last = 0;
    for (i, c) in s.char_indices() {
        let replacement = match c {
            '"' => "&#34;",
            '\'' => "&#39;",
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '\t' => "&#x9;",
            '\n' if escape_newline => "&#xA;",
            '\n' => continue,
            '\r' => "&#xD;",
            c if is_xml_char(c) => continue,
            _ => "\u{FFFD}",
        };
        out.push_str(&s[last..i]);
        out.push_str(replacement);
        last = i + c.len_utf8();
    }
    out.push_str(&s[last..]);
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}'
        | '\t' | '\n' | '\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> String {
        let mut out = String::new();
        escape_text(&mut out, s);
        out
    }

    fn value(s: &str) -> String {
        let mut out = String::new();
        escape_value(&mut out, s);
        out
    }

    #[test]
    fn test_escape_entities() {
        assert_eq!(text(r#"a "b" & 'c' <d>"#), "a &#34;b&#34; &amp; &#39;c&#39; &lt;d&gt;");
        assert_eq!(text("tab\there\r"), "tab&#x9;here&#xD;");
        assert_eq!(text("plain ascii, ünïcode"), "plain ascii, ünïcode");
    }

    #[test]
    fn test_newline_handling() {
        assert_eq!(text("a\nb"), "a\nb");
        assert_eq!(value("a\nb"), "a&#xA;b");
    }

    #[test]
    fn test_invalid_chars_replaced() {
        assert_eq!(text("a\u{1}b"), "a\u{FFFD}b");
    }
}
