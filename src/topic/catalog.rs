use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const GRADE_TOPICS: &str = include_str!("../../assets/grade_topics.json");

/// School grade. Catalog keys are stringified integers, so any `i32` is a
/// valid grade even if the catalog knows nothing about it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grade(pub i32);

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read topic catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("topic catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Curated per-grade topic lists. Loaded once, never mutated.
#[derive(Clone, Debug, Default)]
pub struct TopicCatalog {
    grades: BTreeMap<Grade, Vec<String>>,
}

impl TopicCatalog {
    pub fn bundled() -> Self {
        match Self::from_json(GRADE_TOPICS) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("bundled topic catalog is unreadable: {e}");
                Self::default()
            }
        }
    }

    /// Load the user's catalog file if one is configured, falling back to the
    /// bundled catalog when it is missing or malformed.
    pub fn load(override_path: Option<&Path>) -> Self {
        if let Some(path) = override_path {
            match Self::from_file(path) {
                Ok(catalog) => {
                    log::info!("loaded topic catalog from {}", path.display());
                    return catalog;
                }
                Err(e) => log::warn!("falling back to bundled topic catalog: {e}"),
            }
        }
        Self::bundled()
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;

        let mut grades = BTreeMap::new();
        for (key, topics) in raw {
            let Ok(grade) = key.trim().parse::<i32>() else {
                log::debug!("ignoring non-numeric catalog key {key:?}");
                continue;
            };

            let mut cleaned: Vec<String> = Vec::with_capacity(topics.len());
            for topic in &topics {
                let topic = topic.trim();
                if topic.is_empty() || cleaned.iter().any(|t| t == topic) {
                    continue;
                }
                cleaned.push(topic.to_string());
            }
            grades.insert(Grade(grade), cleaned);
        }

        Ok(Self { grades })
    }

    /// Ordered, trimmed topics for `grade`. Unknown grades yield an empty slice.
    pub fn topics_for_grade(&self, grade: Grade) -> &[String] {
        self.grades.get(&grade).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn grades(&self) -> impl Iterator<Item = Grade> + '_ {
        self.grades.keys().copied()
    }

    pub fn contains(&self, grade: Grade, topic: &str) -> bool {
        self.topics_for_grade(grade).iter().any(|t| t == topic)
    }

    /// Case-insensitive lookup, returning the catalog's display form.
    pub fn find_ignore_case(&self, grade: Grade, text: &str) -> Option<&str> {
        let needle = text.to_lowercase();
        self.topics_for_grade(grade)
            .iter()
            .find(|t| t.to_lowercase() == needle)
            .map(String::as_str)
    }
}
