//! Line-break helpers shared by plain and rich insertion paths.
//!
//! Expansion content arrives from storage with whatever line endings the
//! author's platform produced. Both insertion paths first normalize to `\n`;
//! single-line controls then flatten every break to a substitute character.

/// Convert `\r\n` and lone `\r` to `\n`.
pub fn normalize_line_breaks(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Replace every line break (after normalization) with `substitute`.
pub fn flatten_line_breaks(text: &str, substitute: char) -> String {
    normalize_line_breaks(text)
        .chars()
        .map(|c| if c == '\n' { substitute } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn crlf_and_cr_become_lf() {
        assert_eq!(normalize_line_breaks("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_line_breaks("plain"), "plain");
    }

    #[test]
    fn flatten_uses_single_substitute_per_break() {
        assert_eq!(
            flatten_line_breaks("Best regards,\r\nJane", ' '),
            "Best regards, Jane"
        );
        assert_eq!(flatten_line_breaks("a\n\nb", ' '), "a  b");
    }

    proptest! {
        #[test]
        fn flatten_preserves_char_count_of_normalized(s in "[a-z \\n\\r]{0,40}") {
            let normalized = normalize_line_breaks(&s);
            let flat = flatten_line_breaks(&s, ' ');
            prop_assert_eq!(flat.chars().count(), normalized.chars().count());
            prop_assert!(!flat.contains('\n'));
            prop_assert!(!flat.contains('\r'));
        }
    }
}
