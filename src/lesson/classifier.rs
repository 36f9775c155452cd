/// Display role of one lesson line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockKind {
    BoldHeader(String),
    SectionHeader(String),
    NumberedQuestion(String),
    BlankLine,
    PlainText(String),
}

impl BlockKind {
    pub fn text(&self) -> &str {
        match self {
            BlockKind::BoldHeader(text)
            | BlockKind::SectionHeader(text)
            | BlockKind::NumberedQuestion(text)
            | BlockKind::PlainText(text) => text,
            BlockKind::BlankLine => "",
        }
    }

    /// Numbered questions are followed by a blank answer rule when rendered.
    pub fn needs_answer_rule(&self) -> bool {
        matches!(self, BlockKind::NumberedQuestion(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonBlock {
    /// 0-based source line, stable across re-renders of the same text.
    pub index: usize,
    pub kind: BlockKind,
}

/// Classify lesson text line by line. Empty input produces no blocks.
pub fn classify(text: &str) -> Vec<LessonBlock> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .enumerate()
        .map(|(index, line)| LessonBlock {
            index,
            kind: classify_line(line.strip_suffix('\r').unwrap_or(line)),
        })
        .collect()
}

pub fn classify_line(line: &str) -> BlockKind {
    let trimmed = line.trim();

    if is_bold(trimmed) {
        BlockKind::BoldHeader(trimmed.replace("**", "").trim().to_string())
    } else if trimmed.starts_with("Activity") || trimmed.starts_with("Section") {
        BlockKind::SectionHeader(line.to_string())
    } else if is_numbered(trimmed) {
        BlockKind::NumberedQuestion(line.to_string())
    } else if trimmed.is_empty() {
        BlockKind::BlankLine
    } else {
        BlockKind::PlainText(line.to_string())
    }
}

fn is_bold(trimmed: &str) -> bool {
    trimmed.starts_with("**") && trimmed.ends_with("**")
}

/// `<digits>.` at the start of the line.
fn is_numbered(trimmed: &str) -> bool {
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && trimmed.as_bytes().get(digits) == Some(&b'.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<BlockKind> {
        classify(text).into_iter().map(|b| b.kind).collect()
    }

    #[test]
    fn sample_lesson_classifies_in_order() {
        let text = "**Header**\nSection 1\n1. What is a noun?\n\nDone.";
        assert_eq!(
            kinds(text),
            vec![
                BlockKind::BoldHeader("Header".to_string()),
                BlockKind::SectionHeader("Section 1".to_string()),
                BlockKind::NumberedQuestion("1. What is a noun?".to_string()),
                BlockKind::BlankLine,
                BlockKind::PlainText("Done.".to_string()),
            ]
        );
    }

    #[test]
    fn empty_input_yields_no_blocks() {
        assert!(classify("").is_empty());
    }

    #[test]
    fn lone_newline_is_two_blank_lines() {
        assert_eq!(kinds("\n"), vec![BlockKind::BlankLine, BlockKind::BlankLine]);
    }

    #[test]
    fn indices_follow_source_lines() {
        let blocks = classify("a\n\n\nb");
        let indices: Vec<usize> = blocks.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn bold_wins_over_section_prefix() {
        assert_eq!(
            classify_line("  **Activity A: Identification**  "),
            BlockKind::BoldHeader("Activity A: Identification".to_string())
        );
    }

    #[test]
    fn bold_strips_inner_markers_too() {
        assert_eq!(
            classify_line("**Rule 1:** **Kinds of Sentences**"),
            BlockKind::BoldHeader("Rule 1: Kinds of Sentences".to_string())
        );
    }

    #[test]
    fn bare_marker_is_an_empty_header() {
        assert_eq!(classify_line("**"), BlockKind::BoldHeader(String::new()));
        assert_eq!(classify_line(" *** "), BlockKind::BoldHeader("*".to_string()));
    }

    #[test]
    fn section_header_keeps_line_unmodified() {
        assert_eq!(
            classify_line("   Activity 2  "),
            BlockKind::SectionHeader("   Activity 2  ".to_string())
        );
        assert_eq!(
            classify_line("Sectional rivalry"),
            BlockKind::SectionHeader("Sectional rivalry".to_string())
        );
        assert_eq!(
            classify_line("activity 2"),
            BlockKind::PlainText("activity 2".to_string())
        );
    }

    #[test]
    fn numbered_question_requires_period_after_digits() {
        assert!(matches!(
            classify_line("  12. Circle the verb."),
            BlockKind::NumberedQuestion(line) if line == "  12. Circle the verb."
        ));
        assert!(matches!(classify_line("12) Circle"), BlockKind::PlainText(_)));
        assert!(matches!(classify_line(". 1"), BlockKind::PlainText(_)));
        assert!(matches!(classify_line("1.5 cups"), BlockKind::NumberedQuestion(_)));
    }

    #[test]
    fn whitespace_only_line_is_blank() {
        assert_eq!(classify_line(" \t "), BlockKind::BlankLine);
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        assert_eq!(
            kinds("Section 1\r\n1. Go\r\n"),
            vec![
                BlockKind::SectionHeader("Section 1".to_string()),
                BlockKind::NumberedQuestion("1. Go".to_string()),
                BlockKind::BlankLine,
            ]
        );
    }

    #[test]
    fn only_questions_need_answer_rules() {
        let blocks = classify("**T**\nSection\n1. q\n\ntext");
        let ruled: Vec<usize> = blocks
            .iter()
            .filter(|b| b.kind.needs_answer_rule())
            .map(|b| b.index)
            .collect();
        assert_eq!(ruled, vec![2]);
    }

    #[test]
    fn numbered_rule_agrees_with_reference_pattern() {
        let pattern = regex::Regex::new(r"^\s*[0-9]+\.").unwrap();
        let samples = [
            "1. a", " 2.b", "\t30. c", "4 . d", "x1. e", "", "  ", "7", "8.", "  9)", "10.10",
            "Activity 1.", "**1.**",
        ];
        for sample in samples {
            let trimmed = sample.trim();
            assert_eq!(
                is_numbered(trimmed),
                pattern.is_match(sample),
                "disagreement on {sample:?}"
            );
        }
    }
}
