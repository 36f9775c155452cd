use chrono::{DateTime, NaiveDateTime};

use crate::api::types::LessonSummary;

/// Previously generated lessons, newest first as the backend returns them.
#[derive(Clone, Debug, Default)]
pub struct HistoryView {
    pub lessons: Vec<LessonSummary>,
    pub selected: usize,
    pub loading: bool,
}

impl HistoryView {
    pub fn set_lessons(&mut self, lessons: Vec<LessonSummary>) {
        self.lessons = lessons;
        self.selected = self.selected.min(self.lessons.len().saturating_sub(1));
        self.loading = false;
    }

    pub fn next(&mut self) {
        if !self.lessons.is_empty() {
            self.selected = (self.selected + 1).min(self.lessons.len() - 1);
        }
    }

    pub fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_lesson(&self) -> Option<&LessonSummary> {
        self.lessons.get(self.selected)
    }

    pub fn count_label(&self) -> String {
        let n = self.lessons.len();
        format!("{n} lesson{} total", if n == 1 { "" } else { "s" })
    }
}

/// `2025-03-04T15:07:00.123456` → `Mar 4, 2025, 03:07 PM`. Unparseable input
/// is shown as-is.
pub fn format_date(raw: &str) -> String {
    const DISPLAY: &str = "%b %-d, %Y, %I:%M %p";
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format(DISPLAY).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY).to_string();
    }
    raw.to_string()
}

pub fn detail_line(lesson: &LessonSummary) -> String {
    let mut line = format!("ID: {} • {}", lesson.id, format_date(&lesson.date_generated));
    if let Some(age) = lesson.age {
        line.push_str(&format!(" • Age: {age}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i64, age: Option<u32>) -> LessonSummary {
        LessonSummary {
            id,
            topics: vec!["Nouns".to_string(), "Verbs".to_string()],
            grade: 2,
            age,
            date_generated: "2025-03-04T15:07:00.123456".to_string(),
        }
    }

    #[test]
    fn formats_naive_iso_timestamp() {
        assert_eq!(format_date("2025-03-04T15:07:00.123456"), "Mar 4, 2025, 03:07 PM");
        assert_eq!(format_date("2025-11-20T09:30:00"), "Nov 20, 2025, 09:30 AM");
    }

    #[test]
    fn formats_rfc3339_and_passes_through_garbage() {
        assert_eq!(format_date("2025-03-04T15:07:00+00:00"), "Mar 4, 2025, 03:07 PM");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn detail_line_includes_age_only_when_known() {
        assert_eq!(detail_line(&summary(3, None)), "ID: 3 • Mar 4, 2025, 03:07 PM");
        assert!(detail_line(&summary(3, Some(8))).ends_with(" • Age: 8"));
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut view = HistoryView::default();
        view.next();
        assert_eq!(view.selected, 0);

        view.set_lessons(vec![summary(1, None), summary(2, None)]);
        view.next();
        view.next();
        assert_eq!(view.selected, 1);
        view.prev();
        view.prev();
        assert_eq!(view.selected, 0);

        view.selected = 1;
        view.set_lessons(vec![summary(1, None)]);
        assert_eq!(view.selected, 0);
    }

    #[test]
    fn count_label_pluralizes() {
        let mut view = HistoryView::default();
        assert_eq!(view.count_label(), "0 lessons total");
        view.set_lessons(vec![summary(1, None)]);
        assert_eq!(view.count_label(), "1 lesson total");
    }
}
