use std::rc::Rc;

use crate::topic::catalog::{Grade, TopicCatalog};
use crate::topic::recent::{RecentTopicsStore, remember};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dropdown {
    #[default]
    Closed,
    Open,
}

/// Whether the buffer names a catalog topic for the active grade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntryMode {
    #[default]
    Catalog,
    Custom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Validity {
    #[default]
    Valid,
    Invalid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComboboxState {
    pub dropdown: Dropdown,
    pub mode: EntryMode,
    pub validity: Validity,
    /// Literal keystrokes, never trimmed while typing.
    pub buffer: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopicOption {
    Recent(String),
    Catalog(String),
    Custom,
}

impl TopicOption {
    pub const CUSTOM_LABEL: &'static str = "Custom…";

    pub fn label(&self) -> &str {
        match self {
            TopicOption::Recent(topic) | TopicOption::Catalog(topic) => topic,
            TopicOption::Custom => Self::CUSTOM_LABEL,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComboKey {
    Enter,
    Escape,
    Up,
    Down,
}

/// What the owner of the combobox has to do after an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComboOutcome {
    Idle,
    /// A validated, trimmed, non-empty topic for the parent form.
    Commit(String),
    /// Return keyboard focus to the text input.
    Refocus,
}

/// Autocomplete state for the topic field: free text is allowed, but catalog
/// topics and the user's recent picks for the active grade are suggested.
pub struct TopicSuggestionEngine<S> {
    catalog: Rc<TopicCatalog>,
    store: S,
    grade: Option<Grade>,
    recent: Vec<String>,
    state: ComboboxState,
    disabled: bool,
    highlighted: Option<usize>,
}

impl<S: RecentTopicsStore> TopicSuggestionEngine<S> {
    pub fn new(catalog: Rc<TopicCatalog>, store: S) -> Self {
        Self {
            catalog,
            store,
            grade: None,
            recent: Vec::new(),
            state: ComboboxState::default(),
            disabled: false,
            highlighted: None,
        }
    }

    pub fn state(&self) -> &ComboboxState {
        &self.state
    }

    pub fn buffer(&self) -> &str {
        &self.state.buffer
    }

    pub fn grade(&self) -> Option<Grade> {
        self.grade
    }

    pub fn recent(&self) -> &[String] {
        &self.recent
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_open(&self) -> bool {
        self.state.dropdown == Dropdown::Open
    }

    pub fn is_custom_mode(&self) -> bool {
        self.state.mode == EntryMode::Custom
    }

    pub fn is_valid(&self) -> bool {
        self.state.validity == Validity::Valid
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled && self.grade.is_some()
    }

    pub fn shows_custom_label(&self) -> bool {
        self.is_custom_mode() && !self.state.buffer.trim().is_empty()
    }

    pub fn shows_empty_error(&self) -> bool {
        !self.is_valid() && self.state.buffer.trim().is_empty()
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.state.dropdown = Dropdown::Closed;
            self.highlighted = None;
        }
    }

    /// Mirror the parent's committed value. Applies even while disabled.
    pub fn sync_value(&mut self, value: &str) {
        self.state.buffer = value.to_string();
        if self.grade.is_some() && !value.is_empty() {
            self.state.mode = self.entry_mode_for(value);
        }
    }

    pub fn on_grade_change(&mut self, grade: Option<Grade>) {
        self.highlighted = None;
        match grade {
            Some(grade) => {
                self.grade = Some(grade);
                self.recent = self.store.read(grade);
                self.state.mode = self.entry_mode_for(&self.state.buffer);
                self.state.validity = Validity::Valid;
            }
            None => {
                self.grade = None;
                self.recent.clear();
                self.state = ComboboxState::default();
            }
        }
    }

    pub fn on_input_change(&mut self, raw: &str) {
        if !self.is_enabled() {
            return;
        }
        self.state.buffer = raw.to_string();
        if !raw.trim().is_empty() {
            self.state.validity = Validity::Valid;
        }
        self.state.mode = self.entry_mode_for(raw);
        self.highlighted = None;
    }

    pub fn on_focus(&mut self) {
        if self.is_enabled() {
            self.state.dropdown = Dropdown::Open;
        }
    }

    pub fn on_option_select(&mut self, option: &TopicOption) -> ComboOutcome {
        if !self.is_enabled() {
            return ComboOutcome::Idle;
        }
        let topic = match option {
            TopicOption::Custom => {
                self.state.mode = EntryMode::Custom;
                self.state.dropdown = Dropdown::Open;
                self.highlighted = None;
                return ComboOutcome::Refocus;
            }
            TopicOption::Recent(topic) | TopicOption::Catalog(topic) => topic.trim(),
        };
        if topic.is_empty() {
            return ComboOutcome::Idle;
        }

        let topic = topic.to_string();
        self.state.buffer = topic.clone();
        self.state.mode = EntryMode::Catalog;
        self.state.validity = Validity::Valid;
        self.state.dropdown = Dropdown::Closed;
        self.highlighted = None;
        self.record(&topic);
        log::debug!("topic selected: {topic:?}");
        ComboOutcome::Commit(topic)
    }

    pub fn on_blur(&mut self) -> ComboOutcome {
        if !self.is_enabled() {
            return ComboOutcome::Idle;
        }
        let Some(topic) = self.trimmed_buffer() else {
            // Keep the text and the dropdown so the user can correct it.
            self.state.validity = Validity::Invalid;
            return ComboOutcome::Idle;
        };
        self.state.dropdown = Dropdown::Closed;
        self.highlighted = None;
        self.commit_typed(topic)
    }

    pub fn on_key(&mut self, key: ComboKey) -> ComboOutcome {
        if !self.is_enabled() {
            return ComboOutcome::Idle;
        }
        match key {
            ComboKey::Enter => {
                // Unlike blur, an empty Enter leaves validity untouched.
                let Some(topic) = self.trimmed_buffer() else {
                    return ComboOutcome::Idle;
                };
                self.state.dropdown = Dropdown::Closed;
                self.highlighted = None;
                self.commit_typed(topic)
            }
            ComboKey::Escape => {
                self.state.dropdown = Dropdown::Closed;
                self.highlighted = None;
                ComboOutcome::Idle
            }
            ComboKey::Down => {
                self.move_highlight(true);
                ComboOutcome::Idle
            }
            ComboKey::Up => {
                self.move_highlight(false);
                ComboOutcome::Idle
            }
        }
    }

    /// Recent picks not already in the catalog (MRU order), then the catalog,
    /// then the custom entry. Empty when no grade is active.
    pub fn options(&self) -> Vec<TopicOption> {
        let Some(grade) = self.grade else {
            return Vec::new();
        };
        let catalog = self.catalog.topics_for_grade(grade);

        let mut options: Vec<TopicOption> = self
            .recent
            .iter()
            .filter(|topic| !catalog.contains(topic))
            .map(|topic| TopicOption::Recent(topic.clone()))
            .collect();
        options.extend(catalog.iter().map(|t| TopicOption::Catalog(t.clone())));
        options.push(TopicOption::Custom);
        options
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted(&self) -> Option<TopicOption> {
        let idx = self.highlighted?;
        self.options().into_iter().nth(idx)
    }

    fn move_highlight(&mut self, forward: bool) {
        let count = self.options().len();
        if count == 0 {
            return;
        }
        self.state.dropdown = Dropdown::Open;
        self.highlighted = Some(match self.highlighted {
            None if forward => 0,
            None => count - 1,
            Some(idx) if forward => (idx + 1) % count,
            Some(idx) => (idx + count - 1) % count,
        });
    }

    fn trimmed_buffer(&self) -> Option<String> {
        let trimmed = self.state.buffer.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Shared by blur and Enter: commit the typed text, remembering it only
    /// when it is not a catalog topic.
    fn commit_typed(&mut self, topic: String) -> ComboOutcome {
        self.state.validity = Validity::Valid;
        if self.is_custom_mode() {
            self.record(&topic);
        }
        log::debug!("topic committed: {topic:?}");
        ComboOutcome::Commit(topic)
    }

    fn entry_mode_for(&self, text: &str) -> EntryMode {
        let matched = self
            .grade
            .and_then(|grade| self.catalog.find_ignore_case(grade, text))
            .is_some();
        if matched {
            EntryMode::Catalog
        } else {
            EntryMode::Custom
        }
    }

    /// Persistence is advisory: a failed write is logged and the commit stands.
    fn record(&mut self, topic: &str) {
        let Some(grade) = self.grade else {
            return;
        };
        if self.recent.first().is_some_and(|t| t == topic) {
            return;
        }
        self.recent = remember(&self.recent, topic);
        if let Err(e) = self.store.write(grade, &self.recent) {
            log::warn!("could not save recent topics for grade {grade}: {e}");
        }
    }
}
