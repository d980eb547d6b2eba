//! Question catalog.
//!
//! Questions are grouped by category and loaded once at startup from a JSON
//! object of the form `{"Behavioral": ["...", "..."], "Technical": [...]}`.
//! Category order follows the file.

use std::path::Path;

use rand::seq::SliceRandom;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Errors raised while loading the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a JSON object of string arrays.
    #[error("Invalid question catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A named group of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub questions: Vec<String>,
}

/// Read-only mapping from category to questions.
#[derive(Debug, Clone, Default)]
pub struct QuestionCatalog {
    categories: Vec<Category>,
}

impl QuestionCatalog {
    /// Build a catalog from `(category, questions)` pairs, keeping their order.
    #[must_use]
    pub fn new<I, C, Q>(categories: I) -> Self
    where
        I: IntoIterator<Item = (C, Vec<Q>)>,
        C: Into<String>,
        Q: Into<String>,
    {
        Self {
            categories: categories
                .into_iter()
                .map(|(name, questions)| Category {
                    name: name.into(),
                    questions: questions.into_iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let map: Map<String, Value> = serde_json::from_str(json)?;
        let mut categories = Vec::with_capacity(map.len());
        for (name, questions) in map {
            let questions: Vec<String> = serde_json::from_value(questions)?;
            categories.push(Category { name, questions });
        }
        Ok(Self { categories })
    }

    /// Load the catalog from `path`.
    ///
    /// A missing file yields an empty catalog; a malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    name: "catalog.missing",
                    path = %path.display(),
                    "Question catalog not found, starting with no categories"
                );
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let catalog = Self::from_json(&json)?;
        info!(
            name: "catalog.loaded",
            path = %path.display(),
            categories = catalog.categories.len(),
            "Question catalog loaded"
        );
        Ok(catalog)
    }

    /// Category names in catalog order.
    #[must_use]
    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// Look up a category by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Pick a random question from `category`.
    ///
    /// Returns `None` for unknown categories and for categories with no questions.
    #[must_use]
    pub fn random_question(&self, category: &str) -> Option<&str> {
        self.get(category)?
            .questions
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Check if the catalog has no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
