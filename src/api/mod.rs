//! Client side of the lesson backend: generation, history and DOCX download.

pub mod client;
pub mod types;

use thiserror::Error;

pub use client::{LessonService, OfflineLessonService, connect};
pub use types::{LessonDetail, LessonRequest, LessonResponse, LessonSummary, LessonsListResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("lesson service is not available offline")]
    Offline,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("lesson service returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response from lesson service: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to save download: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Short message for the status line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound(_) => "Lesson not found. It may have been deleted.".to_string(),
            ApiError::Status { detail, .. } if !detail.is_empty() => detail.clone(),
            other => other.to_string(),
        }
    }
}
