use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::topic::{RecentTopicsStore, TopicOption, TopicSuggestionEngine};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Input box plus, while focused and open, the suggestion list underneath.
pub struct TopicField<'a, S> {
    engine: &'a TopicSuggestionEngine<S>,
    input: &'a LineInput,
    focused: bool,
    theme: &'a Theme,
}

impl<'a, S: RecentTopicsStore> TopicField<'a, S> {
    pub fn new(
        engine: &'a TopicSuggestionEngine<S>,
        input: &'a LineInput,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            engine,
            input,
            focused,
            theme,
        }
    }

    /// Rows needed: the 3-row input, one hint row, and the open dropdown.
    pub fn height(&self, max_options: usize) -> u16 {
        let dropdown = if self.dropdown_visible() {
            self.engine.options().len().min(max_options) + 2
        } else {
            0
        };
        (4 + dropdown) as u16
    }

    fn dropdown_visible(&self) -> bool {
        self.focused && self.engine.is_open() && self.engine.is_enabled()
    }

    fn input_line(&self) -> Line<'static> {
        let colors = &self.theme.colors;
        if !self.engine.is_enabled() {
            let text = if self.engine.grade().is_none() {
                "Select a grade first".to_string()
            } else {
                self.engine.buffer().to_string()
            };
            return Line::from(Span::styled(text, Style::default().fg(colors.text_muted())));
        }
        if !self.focused {
            if self.engine.buffer().is_empty() {
                return Line::from(Span::styled(
                    "Type or pick a topic",
                    Style::default().fg(colors.text_muted()),
                ));
            }
            return Line::from(Span::styled(
                self.engine.buffer().to_string(),
                Style::default().fg(colors.fg()),
            ));
        }

        let (before, cursor, after) = self.input.render_parts();
        let cursor_style = Style::default().fg(colors.bg()).bg(colors.fg());
        Line::from(vec![
            Span::styled(before.to_string(), Style::default().fg(colors.fg())),
            Span::styled(cursor.unwrap_or(' ').to_string(), cursor_style),
            Span::styled(after.to_string(), Style::default().fg(colors.fg())),
        ])
    }

    fn hint_line(&self) -> Line<'static> {
        let colors = &self.theme.colors;
        if self.engine.shows_empty_error() {
            Line::from(Span::styled(
                " Topic cannot be empty",
                Style::default().fg(colors.error()),
            ))
        } else if self.engine.shows_custom_label() {
            Line::from(Span::styled(
                " Custom topic",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::ITALIC),
            ))
        } else {
            Line::from("")
        }
    }
}

impl<S: RecentTopicsStore> Widget for TopicField<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        if area.height < 3 {
            return;
        }

        let border = if !self.engine.is_valid() {
            colors.error()
        } else if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let input_area = Rect::new(area.x, area.y, area.width, 3);
        let block = Block::bordered()
            .title(" Topic ")
            .border_style(Style::default().fg(border));
        let inner = block.inner(input_area);
        block.render(input_area, buf);
        Paragraph::new(self.input_line()).render(inner, buf);

        if area.height > 3 {
            let hint_area = Rect::new(area.x, area.y + 3, area.width, 1);
            Paragraph::new(self.hint_line()).render(hint_area, buf);
        }

        if !self.dropdown_visible() || area.height <= 6 {
            return;
        }
        let list_area = Rect::new(area.x, area.y + 4, area.width, area.height - 4);
        let list_block = Block::bordered()
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let list_inner = list_block.inner(list_area);
        list_block.render(list_area, buf);

        let options = self.engine.options();
        let visible = list_inner.height as usize;
        let highlighted = self.engine.highlighted_index();
        // Keep the highlighted option in view.
        let offset = highlighted
            .map(|h| (h + 1).saturating_sub(visible))
            .unwrap_or(0);

        let lines: Vec<Line> = options
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, option)| {
                let selected = highlighted == Some(i);
                let marker = match option {
                    TopicOption::Recent(_) => "\u{21ba} ",
                    TopicOption::Catalog(_) => "  ",
                    TopicOption::Custom => "+ ",
                };
                let mut style = match option {
                    TopicOption::Custom => Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::ITALIC),
                    _ => Style::default().fg(colors.fg()),
                };
                if selected {
                    style = style.bg(colors.highlight_bg()).add_modifier(Modifier::BOLD);
                }
                Line::from(Span::styled(format!("{marker}{}", option.label()), style))
            })
            .collect();
        Paragraph::new(lines).render(list_inner, buf);
    }
}
