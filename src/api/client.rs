use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiError;
use crate::api::types::{LessonDetail, LessonRequest, LessonResponse, LessonsListResponse};

/// The lesson backend as seen by the front-end. Implementations block; callers
/// run them off the UI thread.
pub trait LessonService: Send + Sync {
    fn generate(&self, request: &LessonRequest) -> Result<LessonResponse, ApiError>;
    fn list_lessons(&self) -> Result<LessonsListResponse, ApiError>;
    fn lesson(&self, id: i64) -> Result<LessonDetail, ApiError>;
    fn docx(&self, id: i64) -> Result<Vec<u8>, ApiError>;
}

/// Used with `--offline` and in builds without the `network` feature.
pub struct OfflineLessonService;

impl LessonService for OfflineLessonService {
    fn generate(&self, _request: &LessonRequest) -> Result<LessonResponse, ApiError> {
        Err(ApiError::Offline)
    }

    fn list_lessons(&self) -> Result<LessonsListResponse, ApiError> {
        Err(ApiError::Offline)
    }

    fn lesson(&self, _id: i64) -> Result<LessonDetail, ApiError> {
        Err(ApiError::Offline)
    }

    fn docx(&self, _id: i64) -> Result<Vec<u8>, ApiError> {
        Err(ApiError::Offline)
    }
}

pub fn connect(base_url: &str, timeout: Duration, offline: bool) -> Arc<dyn LessonService> {
    if offline {
        log::info!("offline mode: lesson service disabled");
        return Arc::new(OfflineLessonService);
    }
    #[cfg(feature = "network")]
    {
        match HttpLessonService::new(base_url, timeout) {
            Ok(service) => return Arc::new(service),
            Err(e) => log::warn!("could not build HTTP client, staying offline: {e}"),
        }
    }
    #[cfg(not(feature = "network"))]
    {
        let _ = (base_url, timeout);
        log::info!("built without network support");
    }
    Arc::new(OfflineLessonService)
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[cfg(feature = "network")]
pub use http::HttpLessonService;

#[cfg(feature = "network")]
mod http {
    use std::time::Duration;

    use reqwest::StatusCode;
    use reqwest::blocking::{Client, Response};
    use serde::de::DeserializeOwned;

    use super::{LessonService, endpoint};
    use crate::api::ApiError;
    use crate::api::types::{
        ErrorBody, LessonDetail, LessonRequest, LessonResponse, LessonsListResponse,
    };

    pub struct HttpLessonService {
        base_url: String,
        client: Client,
    }

    impl HttpLessonService {
        pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            Ok(Self {
                base_url: base_url.to_string(),
                client,
            })
        }

        fn get(&self, path: &str) -> Result<Response, ApiError> {
            let url = endpoint(&self.base_url, path);
            log::debug!("GET {url}");
            let response = self
                .client
                .get(&url)
                .send()
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            check(response)
        }
    }

    impl LessonService for HttpLessonService {
        fn generate(&self, request: &LessonRequest) -> Result<LessonResponse, ApiError> {
            let url = endpoint(&self.base_url, "/api/generate-lesson");
            log::info!(
                "requesting grade {} lesson on {:?} ({} per section)",
                request.grade,
                request.topic,
                request.questions_per_section
            );
            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            read_json(check(response)?)
        }

        fn list_lessons(&self) -> Result<LessonsListResponse, ApiError> {
            read_json(self.get("/api/lessons")?)
        }

        fn lesson(&self, id: i64) -> Result<LessonDetail, ApiError> {
            read_json(self.get(&format!("/api/lessons/{id}"))?)
        }

        fn docx(&self, id: i64) -> Result<Vec<u8>, ApiError> {
            let response = self.get(&format!("/api/lessons/{id}/docx"))?;
            let bytes = response
                .bytes()
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            Ok(bytes.to_vec())
        }
    }

    fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.detail)
            .unwrap_or(body);
        log::warn!("lesson service returned {status}: {detail}");
        if status == StatusCode::NOT_FOUND {
            Err(ApiError::NotFound(detail))
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            })
        }
    }

    fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response
            .text()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}
