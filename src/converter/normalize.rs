use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").unwrap());
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

fn is_closing_fence(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '`')
}

/// Clean up assembled Markdown. Idempotent.
///
/// Drops empty fenced blocks, puts one blank line before headings that sit
/// outside code, collapses blank-line runs and strips trailing whitespace.
pub fn normalize(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.split('\n').map(str::trim_end).collect();

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut in_fence = false;
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if in_fence {
            if is_closing_fence(line) {
                in_fence = false;
            }
            out.push(line);
            i += 1;
            continue;
        }

        if is_fence(line) {
            let mut j = i + 1;
            while j < lines.len() && lines[j].is_empty() {
                j += 1;
            }
            if j < lines.len() && is_closing_fence(lines[j]) {
                i = j + 1;
                continue;
            }
            in_fence = true;
        } else if HEADING.is_match(line) && out.last().is_some_and(|prev| !prev.is_empty()) {
            out.push("");
        }

        out.push(line);
        i += 1;
    }

    let joined = out.join("\n");
    BLANK_RUN.replace_all(&joined, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_collapses_blank_lines() {
        assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n  \n\t\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_removes_empty_fences() {
        assert_eq!(normalize("a\n```\n\n```\nb"), "a\nb");
        assert_eq!(normalize("```python\n```"), "");
    }

    #[test]
    fn test_keeps_adjacent_code_blocks() {
        let md = "```\nx = 1\n```\n\n```\ny = 2\n```";
        assert_eq!(normalize(md), md);
    }

    #[test]
    fn test_heading_spacing() {
        assert_eq!(normalize("intro\n## Title\ntext"), "intro\n\n## Title\ntext");
        assert_eq!(normalize("intro\n\n\n\n# Title"), "intro\n\n# Title");
        assert_eq!(normalize("#hashtag\nnext"), "#hashtag\nnext");
    }

    #[test]
    fn test_headings_inside_code_untouched() {
        let md = "```\nx = 1\n# comment\n```";
        assert_eq!(normalize(md), md);
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(normalize("\n\n  a  \nb\t\n\n"), "a\nb");
    }

    fn markdown_line() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("```".to_string()),
            Just("```python".to_string()),
            Just("   ".to_string()),
            "#{1,7} ?[a-z ]{0,6}",
            "[a-z| -]{0,12}",
            " {0,3}[a-z#`]{0,8} {0,2}",
        ]
    }

    proptest! {
        #[test]
        fn test_idempotent(lines in prop::collection::vec(markdown_line(), 0..24)) {
            let text = lines.join("\n");
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn test_idempotent_arbitrary(text in "\\PC{0,80}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
