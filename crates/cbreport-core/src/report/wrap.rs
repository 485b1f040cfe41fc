//! Greedy reflow of long text values

/// Fill `text` into lines of at most `width` characters
///
/// Words are separated by whitespace and never broken, so a word longer than
/// the line gets a line of its own. Every line after the first starts with
/// `indent` spaces, which count towards the width.
pub fn fill(text: &str, width: usize, indent: usize) -> String {
    let prefix = " ".repeat(indent);
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let available = if lines.is_empty() { width } else { width.saturating_sub(indent) };
        if line_len > 0 && line_len + 1 + word_len > available {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }
    if line_len > 0 {
        lines.push(line);
    }

    let mut out = String::new();
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            out.push('\n');
            out.push_str(&prefix);
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(fill("clusterbuster -P cpusoaker", 72, 16), "clusterbuster -P cpusoaker");
    }

    #[test]
    fn test_continuation_lines_indented() {
        let text = "aaaa bbbb cccc dddd";
        assert_eq!(fill(text, 10, 2), "aaaa bbbb\n  cccc\n  dddd");
    }

    #[test]
    fn test_long_words_not_broken() {
        let text = "short --a-very-long-option=with-a-value next";
        assert_eq!(fill(text, 12, 4), "short\n    --a-very-long-option=with-a-value\n    next");
    }

    #[test]
    fn test_exact_width_fits() {
        assert_eq!(fill("abc def", 7, 0), "abc def");
        assert_eq!(fill("abc defg", 7, 0), "abc\ndefg");
    }

    #[test]
    fn test_command_line_width() {
        let words: Vec<String> = (0..30).map(|i| format!("--opt{:02}", i)).collect();
        let text = fill(&words.join(" "), 72, 16);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| line.chars().count() <= 72));
        assert!(lines[1..].iter().all(|line| line.starts_with(&" ".repeat(16))));
    }

    #[test]
    fn test_empty() {
        assert_eq!(fill("", 72, 16), "");
    }
}
