use thiserror::Error;

use crate::api::types::LessonRequest;
use crate::config::{Config, MAX_QUESTIONS, MIN_QUESTIONS, SUBJECTS};
use crate::topic::catalog::{Grade, TopicCatalog};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Select a grade first")]
    MissingGrade,
    #[error("Topic cannot be empty")]
    EmptyTopic,
    #[error("Questions per section must be between {MIN_QUESTIONS} and {MAX_QUESTIONS}")]
    QuestionsOutOfRange,
}

/// Lesson parameters. `topic` is only ever written from a combobox commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonForm {
    pub grade: Option<Grade>,
    pub subject: String,
    pub topic: String,
    pub questions_per_section: u32,
}

impl LessonForm {
    pub fn from_config(config: &Config) -> Self {
        Self {
            grade: Some(Grade(config.default_grade)),
            subject: config.default_subject.clone(),
            topic: String::new(),
            questions_per_section: config.questions_per_section,
        }
    }

    /// Step to the next/previous grade known to the catalog. An unknown current
    /// grade snaps to the first catalog grade.
    pub fn cycle_grade(&mut self, catalog: &TopicCatalog, forward: bool) -> Option<Grade> {
        let grades: Vec<Grade> = catalog.grades().collect();
        if grades.is_empty() {
            return self.grade;
        }
        let next = match self.grade.and_then(|g| grades.iter().position(|&x| x == g)) {
            Some(idx) if forward => grades[(idx + 1) % grades.len()],
            Some(idx) => grades[(idx + grades.len() - 1) % grades.len()],
            None => grades[0],
        };
        self.grade = Some(next);
        self.grade
    }

    pub fn cycle_subject(&mut self, forward: bool) {
        let idx = SUBJECTS
            .iter()
            .position(|s| *s == self.subject)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % SUBJECTS.len()
        } else {
            (idx + SUBJECTS.len() - 1) % SUBJECTS.len()
        };
        self.subject = SUBJECTS[next].to_string();
    }

    pub fn adjust_questions(&mut self, delta: i32) {
        let value = self.questions_per_section as i64 + delta as i64;
        self.questions_per_section =
            value.clamp(MIN_QUESTIONS as i64, MAX_QUESTIONS as i64) as u32;
    }

    pub fn validate(&self) -> Result<LessonRequest, FormError> {
        let grade = self.grade.ok_or(FormError::MissingGrade)?;
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(FormError::EmptyTopic);
        }
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&self.questions_per_section) {
            return Err(FormError::QuestionsOutOfRange);
        }
        Ok(LessonRequest {
            grade: grade.0,
            subject: self.subject.clone(),
            topic: topic.to_string(),
            questions_per_section: self.questions_per_section,
        })
    }
}
