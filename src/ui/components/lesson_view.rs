use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::app::LessonView;
use crate::lesson::{BlockKind, LessonBlock};
use crate::ui::theme::{Theme, ThemeColors};

/// Rows reserved below each numbered question for the written answer.
const ANSWER_ROWS: usize = 2;

pub struct LessonPane<'a> {
    lesson: &'a LessonView,
    theme: &'a Theme,
}

impl<'a> LessonPane<'a> {
    pub fn new(lesson: &'a LessonView, theme: &'a Theme) -> Self {
        Self { lesson, theme }
    }
}

/// Number of screen lines `build_lines` produces, before wrapping.
pub fn line_count(blocks: &[LessonBlock]) -> usize {
    let mut count = 0;
    let mut previous_blank = true;
    for block in blocks {
        match &block.kind {
            BlockKind::SectionHeader(_) => {
                if !previous_blank {
                    count += 1;
                }
                count += 1;
            }
            BlockKind::NumberedQuestion(_) => count += 1 + ANSWER_ROWS,
            _ => count += 1,
        }
        previous_blank = matches!(block.kind, BlockKind::BlankLine);
    }
    count
}

/// Styled lines for the on-screen worksheet. Section headers get a blank line
/// above them, questions are followed by an answer rule `rule_width` wide.
pub fn build_lines(blocks: &[LessonBlock], colors: &ThemeColors, rule_width: usize) -> Vec<Line<'static>> {
    let rule = "\u{2581}".repeat(rule_width.max(8));
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(blocks.len() * 2);
    let mut previous_blank = true;

    for block in blocks {
        match &block.kind {
            BlockKind::BoldHeader(text) => lines.push(Line::from(Span::styled(
                text.clone(),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            ))),
            BlockKind::SectionHeader(text) => {
                if !previous_blank {
                    lines.push(Line::from(""));
                }
                lines.push(Line::from(Span::styled(
                    text.clone(),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                )));
            }
            BlockKind::NumberedQuestion(text) => {
                lines.push(Line::from(Span::styled(
                    text.clone(),
                    Style::default().fg(colors.fg()),
                )));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("   {rule}"),
                    Style::default().fg(colors.answer_rule()),
                )));
            }
            BlockKind::BlankLine => lines.push(Line::from("")),
            BlockKind::PlainText(text) => lines.push(Line::from(Span::styled(
                text.clone(),
                Style::default().fg(colors.fg()),
            ))),
        }
        previous_blank = matches!(block.kind, BlockKind::BlankLine);
    }
    lines
}

impl Widget for LessonPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let lesson = self.lesson;

        let mut title = format!(" {} · Grade {} ", lesson.title, lesson.grade);
        if let Some(id) = lesson.lesson_id {
            title.push_str(&format!("· #{id} "));
        }
        let mut block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        if !lesson.tags.is_empty() {
            block = block.title_bottom(format!(" {} ", lesson.tags.join(" · ")));
        }
        let inner = block.inner(area);
        block.render(area, buf);

        if lesson.blocks.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "The lesson is empty.",
                Style::default().fg(colors.text_muted()),
            )))
            .render(inner, buf);
            return;
        }

        let rule_width = (inner.width as usize).saturating_sub(6).min(72);
        let mut lines = Vec::new();
        for warning in &lesson.warnings {
            lines.push(Line::from(Span::styled(
                format!("! {warning}"),
                Style::default().fg(colors.warning()),
            )));
        }
        if !lesson.warnings.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(build_lines(&lesson.blocks, colors, rule_width));

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((lesson.scroll, 0))
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::classify;

    fn texts(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn questions_get_an_answer_rule() {
        let colors = ThemeColors::default();
        let lines = build_lines(&classify("1. Circle the noun.\n2. Underline the verb."), &colors, 10);
        let rule = format!("   {}", "\u{2581}".repeat(10));
        assert_eq!(
            texts(&lines),
            vec![
                "1. Circle the noun.".to_string(),
                String::new(),
                rule.clone(),
                "2. Underline the verb.".to_string(),
                String::new(),
                rule,
            ]
        );
    }

    #[test]
    fn sections_are_separated_from_prose() {
        let colors = ThemeColors::default();
        let blocks = classify("**Nouns**\nRead carefully.\nActivity 1\n\nSection 2");
        let lines = build_lines(&blocks, &colors, 10);
        assert_eq!(
            texts(&lines),
            vec!["Nouns", "Read carefully.", "", "Activity 1", "", "Section 2"]
        );
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(lines[3].spans[0].style.fg, Some(colors.accent()));
    }

    #[test]
    fn line_count_matches_build_lines() {
        let colors = ThemeColors::default();
        for text in [
            "",
            "Section A\nSection B",
            "**T**\nIntro\nActivity 1\n1. a\n2. b\n\nSection 2\n3. c",
        ] {
            let blocks = classify(text);
            assert_eq!(line_count(&blocks), build_lines(&blocks, &colors, 20).len(), "{text:?}");
        }
    }
}
