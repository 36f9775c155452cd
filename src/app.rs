use std::rc::Rc;
use std::sync::{Arc, mpsc};
use std::thread;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::{ApiError, LessonDetail, LessonResponse, LessonService};
use crate::config::Config;
use crate::event::{ApiEvent, AppEvent};
use crate::form::{FormError, LessonForm};
use crate::history::HistoryView;
use crate::lesson::print::{self, ExportFormat};
use crate::lesson::{LessonBlock, classify};
use crate::store::JsonStore;
use crate::topic::{
    ComboKey, ComboOutcome, KeyValueStore, MemoryStorage, TopicCatalog, TopicSuggestionEngine,
};
use crate::ui::components::lesson_view;
use crate::ui::line_input::{InputResult, LineInput};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Form,
    Lesson,
    History,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Grade,
    Subject,
    Topic,
    Questions,
    Generate,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Grade,
        FormField::Subject,
        FormField::Topic,
        FormField::Questions,
        FormField::Generate,
    ];

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

/// The request currently running on a worker thread, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pending {
    Generate,
    History,
    Detail,
    Docx,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LessonOrigin {
    Generated,
    History,
}

/// A lesson on screen: classified once, scrolled by the viewer.
#[derive(Clone, Debug)]
pub struct LessonView {
    pub lesson_id: Option<i64>,
    pub title: String,
    pub grade: i32,
    pub blocks: Vec<LessonBlock>,
    pub warnings: Vec<String>,
    pub regenerated: bool,
    pub tags: Vec<String>,
    pub origin: LessonOrigin,
    pub scroll: u16,
}

impl LessonView {
    fn from_response(response: LessonResponse, topic: &str, grade: i32) -> Self {
        Self {
            lesson_id: response.lesson_id,
            title: topic.to_string(),
            grade,
            blocks: classify(&response.lesson_text),
            warnings: response.warnings,
            regenerated: response.regenerated,
            tags: Vec::new(),
            origin: LessonOrigin::Generated,
            scroll: 0,
        }
    }

    fn from_detail(detail: LessonDetail) -> Self {
        Self {
            lesson_id: Some(detail.id),
            title: detail.topics.join(", "),
            grade: detail.grade,
            blocks: classify(&detail.lesson_text),
            warnings: Vec::new(),
            regenerated: false,
            tags: detail.tags.unwrap_or_default(),
            origin: LessonOrigin::History,
            scroll: 0,
        }
    }
}

pub struct App {
    pub screen: AppScreen,
    pub focus: FormField,
    pub form: LessonForm,
    pub catalog: Rc<TopicCatalog>,
    pub topic: TopicSuggestionEngine<Box<dyn KeyValueStore>>,
    pub topic_input: LineInput,
    pub lesson: Option<LessonView>,
    pub history: HistoryView,
    pub status: Option<StatusMessage>,
    pub pending: Option<Pending>,
    pub theme: &'static Theme,
    pub config: Config,
    pub should_quit: bool,
    service: Arc<dyn LessonService>,
    events: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(
        config: Config,
        service: Arc<dyn LessonService>,
        events: mpsc::Sender<AppEvent>,
    ) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_else(|| {
            log::warn!("theme {:?} not found, using default", config.theme);
            Theme::default()
        });
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let catalog = Rc::new(TopicCatalog::load(config.catalog_file().as_deref()));

        let store: Box<dyn KeyValueStore> = match JsonStore::new() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("recent topics will not persist: {e}");
                Box::new(MemoryStorage::new())
            }
        };

        Self::with_parts(config, theme, catalog, store, service, events)
    }

    pub fn with_parts(
        config: Config,
        theme: &'static Theme,
        catalog: Rc<TopicCatalog>,
        store: Box<dyn KeyValueStore>,
        service: Arc<dyn LessonService>,
        events: mpsc::Sender<AppEvent>,
    ) -> Self {
        let form = LessonForm::from_config(&config);
        let mut topic = TopicSuggestionEngine::new(Rc::clone(&catalog), store);
        topic.on_grade_change(form.grade);

        Self {
            screen: AppScreen::Form,
            focus: FormField::Topic,
            form,
            catalog,
            topic,
            topic_input: LineInput::new(""),
            lesson: None,
            history: HistoryView::default(),
            status: None,
            pending: None,
            theme,
            config,
            should_quit: false,
            service,
            events,
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind,
            text: text.into(),
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.screen {
            AppScreen::Form => self.handle_form_key(key),
            AppScreen::Lesson => self.handle_lesson_key(key),
            AppScreen::History => self.handle_history_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('g') {
            self.submit();
            return;
        }
        match key.code {
            KeyCode::Tab => return self.move_focus(self.focus.next()),
            KeyCode::BackTab => return self.move_focus(self.focus.prev()),
            _ => {}
        }
        if self.focus == FormField::Topic {
            self.handle_topic_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('h') => self.open_history(),
            KeyCode::Char('v') if self.lesson.is_some() => self.screen = AppScreen::Lesson,
            KeyCode::Down | KeyCode::Char('j') => self.move_focus(self.focus.next()),
            KeyCode::Up | KeyCode::Char('k') => self.move_focus(self.focus.prev()),
            KeyCode::Right | KeyCode::Char('l') => self.adjust_field(true),
            KeyCode::Left => self.adjust_field(false),
            KeyCode::Enter => match self.focus {
                FormField::Generate => self.submit(),
                _ => self.move_focus(self.focus.next()),
            },
            _ => {}
        }
    }

    fn handle_topic_key(&mut self, key: KeyEvent) {
        // A disabled field is frozen; the line editor must not run ahead of the engine.
        if !self.topic.is_enabled() {
            return;
        }
        let outcome = match key.code {
            KeyCode::Up => self.topic.on_key(ComboKey::Up),
            KeyCode::Down => self.topic.on_key(ComboKey::Down),
            KeyCode::Esc => self.topic.on_key(ComboKey::Escape),
            KeyCode::Enter => match self.topic.highlighted() {
                Some(option) if self.topic.is_open() => self.topic.on_option_select(&option),
                _ => self.topic.on_key(ComboKey::Enter),
            },
            _ => {
                if self.topic_input.handle(key) == InputResult::Changed {
                    self.topic.on_input_change(self.topic_input.value());
                    self.topic.on_focus();
                }
                ComboOutcome::Idle
            }
        };
        self.apply_topic_outcome(outcome);
    }

    fn apply_topic_outcome(&mut self, outcome: ComboOutcome) {
        match outcome {
            ComboOutcome::Commit(topic) => {
                self.topic.sync_value(&topic);
                self.topic_input.set_text(&topic);
                self.form.topic = topic;
            }
            ComboOutcome::Refocus => {
                self.focus = FormField::Topic;
                self.topic_input.set_text(self.topic.buffer());
                self.set_status(StatusKind::Info, "Type a custom topic and press Enter");
            }
            ComboOutcome::Idle => {}
        }
    }

    fn move_focus(&mut self, to: FormField) {
        if self.focus == to {
            return;
        }
        if self.focus == FormField::Topic {
            let outcome = self.topic.on_blur();
            self.apply_topic_outcome(outcome);
        }
        self.focus = to;
        if to == FormField::Topic {
            self.topic_input.set_text(self.topic.buffer());
            self.topic.on_focus();
        }
    }

    fn adjust_field(&mut self, forward: bool) {
        match self.focus {
            FormField::Grade => {
                let grade = self.form.cycle_grade(&self.catalog, forward);
                self.topic.on_grade_change(grade);
            }
            FormField::Subject => self.form.cycle_subject(forward),
            FormField::Questions => self.form.adjust_questions(if forward { 1 } else { -1 }),
            FormField::Topic | FormField::Generate => {}
        }
    }

    pub fn submit(&mut self) {
        if self.pending.is_some() {
            return;
        }
        if self.focus == FormField::Topic {
            let outcome = self.topic.on_blur();
            self.apply_topic_outcome(outcome);
        }

        let request = match self.form.validate() {
            Ok(request) => request,
            Err(e) => {
                if e == FormError::EmptyTopic {
                    self.move_focus(FormField::Topic);
                }
                self.set_status(StatusKind::Error, e.to_string());
                return;
            }
        };

        log::info!(
            "generating lesson: grade {} {:?} ({} per section)",
            request.grade,
            request.topic,
            request.questions_per_section
        );
        self.pending = Some(Pending::Generate);
        self.topic.set_disabled(true);
        self.set_status(StatusKind::Info, "Generating lesson…");
        let service = Arc::clone(&self.service);
        self.spawn(move || ApiEvent::Generated(service.generate(&request)));
    }

    pub fn open_history(&mut self) {
        self.screen = AppScreen::History;
        self.refresh_history();
    }

    fn refresh_history(&mut self) {
        if self.pending.is_some() {
            return;
        }
        self.pending = Some(Pending::History);
        self.history.loading = true;
        let service = Arc::clone(&self.service);
        self.spawn(move || ApiEvent::HistoryLoaded(service.list_lessons()));
    }

    fn open_selected_lesson(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(id) = self.history.selected_lesson().map(|l| l.id) else {
            return;
        };
        self.pending = Some(Pending::Detail);
        self.set_status(StatusKind::Info, format!("Loading lesson {id}…"));
        let service = Arc::clone(&self.service);
        self.spawn(move || ApiEvent::DetailLoaded(service.lesson(id)));
    }

    fn handle_lesson_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.screen = match self.lesson.as_ref().map(|l| l.origin) {
                    Some(LessonOrigin::History) => AppScreen::History,
                    _ => AppScreen::Form,
                };
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll_lesson(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_lesson(-1),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_lesson(10),
            KeyCode::PageUp => self.scroll_lesson(-10),
            KeyCode::Home | KeyCode::Char('g') => {
                if let Some(lesson) = self.lesson.as_mut() {
                    lesson.scroll = 0;
                }
            }
            KeyCode::Char('p') => self.export(ExportFormat::Html),
            KeyCode::Char('t') => self.export(ExportFormat::Text),
            KeyCode::Char('d') => self.download_docx(),
            KeyCode::Char('h') => self.open_history(),
            _ => {}
        }
    }

    fn scroll_lesson(&mut self, delta: i32) {
        if let Some(lesson) = self.lesson.as_mut() {
            let max = lesson_view::line_count(&lesson.blocks).saturating_sub(1) as i32;
            lesson.scroll = (lesson.scroll as i32 + delta).clamp(0, max.max(0)) as u16;
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.screen = AppScreen::Form,
            KeyCode::Down | KeyCode::Char('j') => self.history.next(),
            KeyCode::Up | KeyCode::Char('k') => self.history.prev(),
            KeyCode::Char('r') => self.refresh_history(),
            KeyCode::Enter => self.open_selected_lesson(),
            _ => {}
        }
    }

    pub fn export(&mut self, format: ExportFormat) {
        let Some(lesson) = self.lesson.as_ref() else {
            return;
        };
        let dir = self.config.download_path();
        match print::export_worksheet(&dir, lesson.lesson_id, &lesson.blocks, format) {
            Ok(path) => self.set_status(StatusKind::Success, format!("Saved {}", path.display())),
            Err(e) => {
                log::warn!("worksheet export failed: {e:#}");
                self.set_status(StatusKind::Error, format!("Export failed: {e}"));
            }
        }
    }

    pub fn download_docx(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(id) = self.lesson.as_ref().and_then(|l| l.lesson_id) else {
            self.set_status(
                StatusKind::Warning,
                "This lesson was not saved by the server; DOCX is unavailable",
            );
            return;
        };
        self.pending = Some(Pending::Docx);
        self.set_status(StatusKind::Info, "Downloading DOCX…");
        let service = Arc::clone(&self.service);
        let path = self.config.download_path().join(format!("Lesson_{id}.docx"));
        self.spawn(move || {
            let result = service.docx(id).and_then(|bytes| {
                print::write_atomic(&path, &bytes)?;
                Ok(path)
            });
            ApiEvent::DocxSaved(result)
        });
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() -> ApiEvent + Send + 'static,
    {
        let tx = self.events.clone();
        thread::spawn(move || {
            // The UI may have quit already.
            let _ = tx.send(AppEvent::Api(job()));
        });
    }

    pub fn handle_api_event(&mut self, event: ApiEvent) {
        self.pending = None;
        match event {
            ApiEvent::Generated(result) => {
                self.topic.set_disabled(false);
                self.topic_input.set_text(self.topic.buffer());
                match result {
                    Ok(response) if !response.success => {
                        self.set_status(StatusKind::Error, "Failed to generate lesson");
                    }
                    Ok(response) => self.show_generated(response),
                    Err(e) => self.report(&e, "generate"),
                }
            }
            ApiEvent::HistoryLoaded(result) => match result {
                Ok(list) => {
                    log::debug!("loaded {} of {} lessons", list.lessons.len(), list.total);
                    self.history.set_lessons(list.lessons);
                    self.set_status(StatusKind::Info, self.history.count_label());
                }
                Err(e) => {
                    self.history.loading = false;
                    self.report(&e, "history");
                }
            },
            ApiEvent::DetailLoaded(result) => match result {
                Ok(detail) => {
                    self.lesson = Some(LessonView::from_detail(detail));
                    self.screen = AppScreen::Lesson;
                    self.status = None;
                }
                Err(e) => self.report(&e, "lesson detail"),
            },
            ApiEvent::DocxSaved(result) => match result {
                Ok(path) => {
                    log::info!("saved DOCX to {}", path.display());
                    self.set_status(StatusKind::Success, format!("Saved {}", path.display()));
                }
                Err(e) => self.report(&e, "docx"),
            },
        }
    }

    fn show_generated(&mut self, response: LessonResponse) {
        let grade = self.form.grade.map(|g| g.0).unwrap_or_default();
        let lesson = LessonView::from_response(response, &self.form.topic, grade);
        if !lesson.warnings.is_empty() {
            let n = lesson.warnings.len();
            self.set_status(
                StatusKind::Warning,
                format!("Lesson generated with {n} warning{}", if n == 1 { "" } else { "s" }),
            );
        } else if lesson.regenerated {
            self.set_status(StatusKind::Info, "Lesson generated after a retry");
        } else {
            self.set_status(StatusKind::Success, "Lesson generated");
        }
        self.lesson = Some(lesson);
        self.screen = AppScreen::Lesson;
    }

    fn report(&mut self, error: &ApiError, what: &str) {
        log::warn!("{what} request failed: {error}");
        self.set_status(StatusKind::Error, error.user_message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{LessonRequest, LessonSummary, LessonsListResponse};
    use crate::topic::{Grade, RecentTopicsStore};
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeService {
        requests: Mutex<Vec<LessonRequest>>,
        lesson_id: Option<i64>,
        warnings: Vec<String>,
    }

    impl LessonService for FakeService {
        fn generate(&self, request: &LessonRequest) -> Result<LessonResponse, ApiError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
            Ok(LessonResponse {
                lesson_text: format!("**{}**\nActivity 1\n1. First\n\nThe end.", request.topic),
                success: true,
                regenerated: false,
                warnings: self.warnings.clone(),
                lesson_id: self.lesson_id,
            })
        }

        fn list_lessons(&self) -> Result<LessonsListResponse, ApiError> {
            Ok(LessonsListResponse {
                lessons: vec![LessonSummary {
                    id: 7,
                    topics: vec!["Verbs".to_string()],
                    grade: 2,
                    age: Some(7),
                    date_generated: "2025-03-04T15:07:00".to_string(),
                }],
                total: 1,
            })
        }

        fn lesson(&self, id: i64) -> Result<LessonDetail, ApiError> {
            if id != 7 {
                return Err(ApiError::NotFound(format!("lesson {id}")));
            }
            Ok(LessonDetail {
                id,
                topics: vec!["Verbs".to_string()],
                grade: 2,
                age: Some(7),
                date_generated: "2025-03-04T15:07:00".to_string(),
                lesson_text: "Section A\n1. Run".to_string(),
                tags: None,
            })
        }

        fn docx(&self, _id: i64) -> Result<Vec<u8>, ApiError> {
            Ok(b"PK\x03\x04".to_vec())
        }
    }

    struct Harness {
        app: App,
        rx: mpsc::Receiver<AppEvent>,
        service: Arc<FakeService>,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        fn new(service: FakeService) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut config = Config::default();
            config.download_dir = dir.path().to_string_lossy().to_string();
            let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
            let service = Arc::new(service);
            let (tx, rx) = mpsc::channel();
            let app = App::with_parts(
                config,
                theme,
                Rc::new(TopicCatalog::bundled()),
                Box::new(MemoryStorage::new()),
                service.clone(),
                tx,
            );
            Self {
                app,
                rx,
                service,
                _dir: dir,
            }
        }

        fn press(&mut self, code: KeyCode) {
            self.app.handle_key(KeyEvent {
                code,
                modifiers: KeyModifiers::NONE,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            });
        }

        fn ctrl(&mut self, ch: char) {
            self.app.handle_key(KeyEvent {
                code: KeyCode::Char(ch),
                modifiers: KeyModifiers::CONTROL,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            });
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }

        /// Deliver the next worker result to the app.
        fn settle(&mut self) {
            match self.rx.recv_timeout(Duration::from_secs(5)) {
                Ok(AppEvent::Api(event)) => self.app.handle_api_event(event),
                _ => panic!("expected an API event"),
            }
        }
    }

    #[test]
    fn starts_on_topic_with_default_grade() {
        let h = Harness::new(FakeService::default());
        assert_eq!(h.app.screen, AppScreen::Form);
        assert_eq!(h.app.focus, FormField::Topic);
        assert_eq!(h.app.topic.grade(), Some(Grade(2)));
        assert!(h.app.topic.is_enabled());
    }

    #[test]
    fn typed_topic_is_committed_on_tab() {
        let mut h = Harness::new(FakeService::default());
        h.type_text("  Idioms ");
        assert!(h.app.topic.is_open());
        assert!(h.app.form.topic.is_empty());

        h.press(KeyCode::Tab);
        assert_eq!(h.app.focus, FormField::Questions);
        assert_eq!(h.app.form.topic, "Idioms");
        assert_eq!(h.app.topic.buffer(), "Idioms");
        assert_eq!(h.app.topic.store().read(Grade(2)), vec!["Idioms".to_string()]);
    }

    #[test]
    fn highlighted_option_is_selected_with_enter() {
        let mut h = Harness::new(FakeService::default());
        h.press(KeyCode::Down);
        h.press(KeyCode::Enter);
        assert_eq!(h.app.form.topic, "Nouns");
        assert_eq!(h.app.topic_input.value(), "Nouns");
        assert!(!h.app.topic.is_open());
        assert_eq!(h.app.topic.recent()[0], "Nouns");
    }

    #[test]
    fn custom_entry_keeps_focus_and_waits_for_text() {
        let mut h = Harness::new(FakeService::default());
        // Up from nothing wraps to the last option, which is the custom entry.
        h.press(KeyCode::Up);
        h.press(KeyCode::Enter);
        assert_eq!(h.app.focus, FormField::Topic);
        assert!(h.app.topic.is_custom_mode());
        assert!(h.app.form.topic.is_empty());
        assert_eq!(h.app.status.as_ref().map(|s| s.kind), Some(StatusKind::Info));
    }

    #[test]
    fn empty_submit_flags_topic() {
        let mut h = Harness::new(FakeService::default());
        h.ctrl('g');
        assert_eq!(h.app.pending, None);
        assert_eq!(h.app.focus, FormField::Topic);
        assert!(h.app.topic.shows_empty_error());
        let status = h.app.status.clone().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Topic cannot be empty");
    }

    #[test]
    fn generate_round_trip_shows_lesson() {
        let mut h = Harness::new(FakeService {
            lesson_id: Some(42),
            ..FakeService::default()
        });
        h.type_text("Verbs");
        h.ctrl('g');
        assert_eq!(h.app.pending, Some(Pending::Generate));
        assert!(!h.app.topic.is_enabled());

        h.settle();
        assert_eq!(h.app.pending, None);
        assert!(h.app.topic.is_enabled());
        assert_eq!(h.app.screen, AppScreen::Lesson);
        let lesson = h.app.lesson.as_ref().unwrap();
        assert_eq!(lesson.lesson_id, Some(42));
        assert_eq!(lesson.blocks.len(), 5);

        let requests = h.service.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].topic, "Verbs");
        assert_eq!(requests[0].grade, 2);
        assert_eq!(requests[0].questions_per_section, 6);
    }

    #[test]
    fn keys_typed_during_generation_are_dropped() {
        let mut h = Harness::new(FakeService::default());
        h.type_text("Verbs");
        h.ctrl('g');
        assert_eq!(h.app.focus, FormField::Topic);
        h.type_text("xyz");
        assert_eq!(h.app.topic.buffer(), "Verbs");
        assert_eq!(h.app.topic_input.value(), "Verbs");

        h.settle();
        h.press(KeyCode::Esc);
        assert_eq!(h.app.screen, AppScreen::Form);
        h.type_text("s");
        assert_eq!(h.app.topic_input.value(), "Verbss");
        assert_eq!(h.app.topic.buffer(), "Verbss");
    }

    #[test]
    fn warnings_are_surfaced() {
        let mut h = Harness::new(FakeService {
            warnings: vec!["Section 2 has 5 questions".to_string()],
            ..FakeService::default()
        });
        h.type_text("Verbs");
        h.ctrl('g');
        h.settle();
        let status = h.app.status.clone().unwrap();
        assert_eq!(status.kind, StatusKind::Warning);
        assert_eq!(status.text, "Lesson generated with 1 warning");
    }

    #[test]
    fn grade_change_reloads_recent_topics() {
        let mut h = Harness::new(FakeService::default());
        h.type_text("Idioms");
        h.press(KeyCode::BackTab);
        h.press(KeyCode::BackTab);
        assert_eq!(h.app.focus, FormField::Grade);
        h.press(KeyCode::Right);
        assert_eq!(h.app.form.grade, Some(Grade(3)));
        assert_eq!(h.app.topic.grade(), Some(Grade(3)));
        assert!(h.app.topic.recent().is_empty());

        h.press(KeyCode::Left);
        assert_eq!(h.app.topic.recent().to_vec(), vec!["Idioms".to_string()]);
    }

    #[test]
    fn export_writes_worksheet_into_download_dir() {
        let mut h = Harness::new(FakeService {
            lesson_id: Some(9),
            ..FakeService::default()
        });
        h.type_text("Nouns");
        h.ctrl('g');
        h.settle();

        h.press(KeyCode::Char('p'));
        let status = h.app.status.clone().unwrap();
        assert_eq!(status.kind, StatusKind::Success);
        let path = h.app.config.download_path().join("Lesson_9.html");
        assert!(path.exists());

        h.press(KeyCode::Char('d'));
        h.settle();
        assert!(h.app.config.download_path().join("Lesson_9.docx").exists());
    }

    #[test]
    fn docx_needs_a_saved_lesson() {
        let mut h = Harness::new(FakeService::default());
        h.type_text("Nouns");
        h.ctrl('g');
        h.settle();
        h.press(KeyCode::Char('d'));
        assert_eq!(h.app.pending, None);
        assert_eq!(h.app.status.as_ref().map(|s| s.kind), Some(StatusKind::Warning));
    }

    #[test]
    fn history_lists_and_opens_lessons() {
        let mut h = Harness::new(FakeService::default());
        h.press(KeyCode::Tab);
        h.press(KeyCode::Char('h'));
        assert_eq!(h.app.screen, AppScreen::History);
        assert!(h.app.history.loading);
        h.settle();
        assert_eq!(h.app.history.lessons.len(), 1);

        h.press(KeyCode::Enter);
        h.settle();
        assert_eq!(h.app.screen, AppScreen::Lesson);
        let lesson = h.app.lesson.as_ref().unwrap();
        assert_eq!(lesson.origin, LessonOrigin::History);
        assert_eq!(lesson.title, "Verbs");

        h.press(KeyCode::Esc);
        assert_eq!(h.app.screen, AppScreen::History);
    }

    #[test]
    fn offline_errors_are_reported() {
        let (tx, rx) = mpsc::channel();
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let mut app = App::with_parts(
            Config::default(),
            theme,
            Rc::new(TopicCatalog::bundled()),
            Box::new(MemoryStorage::new()),
            Arc::new(crate::api::OfflineLessonService),
            tx,
        );
        app.form.topic = "Nouns".to_string();
        app.focus = FormField::Generate;
        app.submit();
        match rx.recv_timeout(Duration::from_secs(5)) {
            Ok(AppEvent::Api(event)) => app.handle_api_event(event),
            _ => panic!("expected an API event"),
        }
        let status = app.status.unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("offline"));
        assert!(app.topic.is_enabled());
    }
}
