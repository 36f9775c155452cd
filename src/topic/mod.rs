//! Topic selection: the curated catalog, the user's recent picks, and the
//! combobox state machine that merges them.

pub mod catalog;
pub mod combobox;
pub mod recent;

pub use catalog::{Grade, TopicCatalog};
pub use combobox::{ComboKey, ComboOutcome, TopicOption, TopicSuggestionEngine};
pub use recent::{KeyValueStore, MemoryStorage, RecentTopicsStore};
