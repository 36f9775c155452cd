use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::history::{HistoryView, detail_line};
use crate::ui::theme::Theme;

/// Rows per lesson entry: title line, detail line, spacer.
const ROW_HEIGHT: usize = 3;

pub struct HistoryList<'a> {
    view: &'a HistoryView,
    theme: &'a Theme,
}

impl<'a> HistoryList<'a> {
    pub fn new(view: &'a HistoryView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }
}

impl Widget for HistoryList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Lesson History ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        let header = if self.view.loading {
            "  Loading lessons…".to_string()
        } else {
            format!("  {}", self.view.count_label())
        };
        Paragraph::new(Line::from(Span::styled(
            header,
            Style::default().fg(colors.text_muted()),
        )))
        .render(layout[0], buf);

        if self.view.lessons.is_empty() {
            if !self.view.loading {
                Paragraph::new(Line::from(Span::styled(
                    "  No lessons found. Generate your first lesson to see it here.",
                    Style::default().fg(colors.text_muted()),
                )))
                .render(layout[1], buf);
            }
            return;
        }

        let visible = (layout[1].height as usize / ROW_HEIGHT).max(1);
        let offset = (self.view.selected + 1).saturating_sub(visible);

        let mut lines: Vec<Line> = Vec::new();
        for (i, lesson) in self.view.lessons.iter().enumerate().skip(offset).take(visible) {
            let selected = i == self.view.selected;
            let indicator = if selected { " > " } else { "   " };
            let title_style = Style::default()
                .fg(if selected { colors.accent() } else { colors.fg() })
                .add_modifier(if selected { Modifier::BOLD } else { Modifier::empty() });
            lines.push(Line::from(vec![
                Span::styled(format!("{indicator}{}", lesson.topics.join(", ")), title_style),
                Span::styled(
                    format!("  Grade {}", lesson.grade),
                    Style::default().fg(colors.text_muted()),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!("     {}", detail_line(lesson)),
                Style::default().fg(colors.text_muted()),
            )));
            lines.push(Line::from(""));
        }
        Paragraph::new(lines).render(layout[1], buf);
    }
}
