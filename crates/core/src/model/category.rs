use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{CategoryId, QuestionId};
use crate::model::question::{Question, QuestionDraft, QuestionError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category id cannot be empty")]
    EmptyId,

    #[error("category name cannot be empty")]
    EmptyName,

    #[error("category {0} has no questions")]
    NoQuestions(CategoryId),

    #[error("question {id} appears twice in category {category}")]
    DuplicateQuestion { category: CategoryId, id: QuestionId },

    #[error("question {index} of category {category} is invalid: {source}")]
    InvalidQuestion {
        category: CategoryId,
        index: usize,
        #[source]
        source: QuestionError,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog has no categories")]
    Empty,

    #[error("category {0} appears twice in the catalog")]
    DuplicateCategory(CategoryId),

    #[error(transparent)]
    Category(#[from] CategoryError),
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// A named, ordered set of questions covering one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: String,
    questions: Vec<Question>,
}

impl Category {
    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError` if the id or name is blank, the question list is
    /// empty, or two questions share an id.
    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
        description: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, CategoryError> {
        if id.is_blank() {
            return Err(CategoryError::EmptyId);
        }
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(CategoryError::EmptyName);
        }
        if questions.is_empty() {
            return Err(CategoryError::NoQuestions(id));
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(CategoryError::DuplicateQuestion {
                    category: id,
                    id: question.id(),
                });
            }
        }

        Ok(Self {
            id,
            name,
            description: description.into().trim().to_owned(),
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Number of questions; always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Ordered, immutable list of categories supplied at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list and
    /// `CatalogError::DuplicateCategory` when two categories share an id.
    pub fn new(categories: Vec<Category>) -> Result<Self, CatalogError> {
        if categories.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(categories.len());
        for category in &categories {
            if !seen.insert(category.id()) {
                return Err(CatalogError::DuplicateCategory(category.id().clone()));
            }
        }
        Ok(Self { categories })
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn find(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id() == id)
    }

    pub(crate) fn position(&self, id: &CategoryId) -> Option<usize> {
        self.categories.iter().position(|c| c.id() == id)
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }
}

//
// ─── DOCUMENT SHAPE ────────────────────────────────────────────────────────────
//

/// Unvalidated category as it appears in a catalog document.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDraft {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<QuestionDraft>,
}

impl CategoryDraft {
    /// # Errors
    ///
    /// Returns `CategoryError` if any question or the category itself is invalid.
    pub fn validate(self) -> Result<Category, CategoryError> {
        let id = CategoryId::new(self.id.trim());
        let mut questions = Vec::with_capacity(self.questions.len());
        for (index, draft) in self.questions.into_iter().enumerate() {
            let question = draft
                .validate()
                .map_err(|source| CategoryError::InvalidQuestion {
                    category: id.clone(),
                    index,
                    source,
                })?;
            questions.push(question);
        }
        Category::new(id, self.name, self.description, questions)
    }
}

/// Top-level catalog document: `{ "categories": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDraft {
    pub categories: Vec<CategoryDraft>,
}

impl CatalogDraft {
    /// # Errors
    ///
    /// Returns `CatalogError` if any category is invalid or ids collide.
    pub fn validate(self) -> Result<Catalog, CatalogError> {
        let categories = self
            .categories
            .into_iter()
            .map(CategoryDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;
        Catalog::new(categories)
    }
}
