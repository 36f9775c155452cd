use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::FormField;
use crate::form::LessonForm;
use crate::topic::RecentTopicsStore;
use crate::ui::components::topic_field::TopicField;
use crate::ui::theme::Theme;

const MAX_VISIBLE_OPTIONS: usize = 8;

pub struct FormPanel<'a, S> {
    form: &'a LessonForm,
    focus: FormField,
    topic: TopicField<'a, S>,
    busy: bool,
    theme: &'a Theme,
}

impl<'a, S: RecentTopicsStore> FormPanel<'a, S> {
    pub fn new(
        form: &'a LessonForm,
        focus: FormField,
        topic: TopicField<'a, S>,
        busy: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            form,
            focus,
            topic,
            busy,
            theme,
        }
    }

    fn selector(&self, field: FormField, label: &str, value: String) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let selected = self.focus == field;
        let indicator = if selected { " > " } else { "   " };
        let label_style = Style::default()
            .fg(if selected { colors.accent() } else { colors.fg() })
            .add_modifier(if selected { Modifier::BOLD } else { Modifier::empty() });
        let value_style = Style::default().fg(if selected {
            colors.fg()
        } else {
            colors.text_muted()
        });
        vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("     < {value} >"), value_style)),
        ]
    }
}

impl<S: RecentTopicsStore> Widget for FormPanel<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" New Lesson ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let topic_height = self.topic.height(MAX_VISIBLE_OPTIONS);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(topic_height),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let grade = self
            .form
            .grade
            .map(|g| format!("Grade {g}"))
            .unwrap_or_else(|| "Select a grade".to_string());
        Paragraph::new(self.selector(FormField::Grade, "Grade", grade)).render(layout[0], buf);
        Paragraph::new(self.selector(FormField::Subject, "Subject", self.form.subject.clone()))
            .render(layout[1], buf);

        let questions = self.form.questions_per_section.to_string();
        let questions_lines = self.selector(FormField::Questions, "Questions per section", questions);
        let generate_focused = self.focus == FormField::Generate;
        let button_text = if self.busy {
            "   [ Generating… ]".to_string()
        } else if generate_focused {
            " > [ Generate Lesson ]".to_string()
        } else {
            "   [ Generate Lesson ]".to_string()
        };
        let button_style = if self.busy {
            Style::default().fg(colors.text_muted())
        } else if generate_focused {
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.accent())
        };

        let topic_area = Rect::new(
            layout[2].x + 1,
            layout[2].y,
            layout[2].width.saturating_sub(2),
            layout[2].height,
        );
        self.topic.render(topic_area, buf);
        Paragraph::new(questions_lines).render(layout[3], buf);
        Paragraph::new(Line::from(Span::styled(button_text, button_style))).render(layout[4], buf);
    }
}
