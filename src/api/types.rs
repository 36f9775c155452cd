use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRequest {
    pub grade: i32,
    pub subject: String,
    pub topic: String,
    pub questions_per_section: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonResponse {
    pub lesson_text: String,
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub regenerated: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub lesson_id: Option<i64>,
}

fn default_success() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSummary {
    pub id: i64,
    pub topics: Vec<String>,
    pub grade: i32,
    #[serde(default)]
    pub age: Option<u32>,
    pub date_generated: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonsListResponse {
    pub lessons: Vec<LessonSummary>,
    pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDetail {
    pub id: i64,
    pub topics: Vec<String>,
    pub grade: i32,
    #[serde(default)]
    pub age: Option<u32>,
    pub date_generated: String,
    pub lesson_text: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// FastAPI error body. `detail` is a string for HTTPException but a list for
/// validation failures, in which case the raw body is shown instead.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}
