//! Fragment Entity
//!
//! A user-owned, orderable piece of writing. The remote store owns the
//! authoritative record; this crate only ever holds a read replica.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Fragment type determines which view a fragment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FragmentType {
    #[default]
    Note,
    Card,
    Outline,
}

impl FragmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentType::Note => "note",
            FragmentType::Card => "card",
            FragmentType::Outline => "outline",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "card" => FragmentType::Card,
            "outline" => FragmentType::Outline,
            _ => FragmentType::Note,
        }
    }
}

/// An orderable fragment of the manuscript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Fragment type
    pub fragment_type: FragmentType,
    /// Manual rank within the type's view (not necessarily contiguous)
    pub order: i64,
    /// Creation timestamp (epoch millis); secondary order key
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Fragment {
    /// Create a new fragment with default rank
    pub fn new(id: impl Into<String>, title: impl Into<String>, fragment_type: FragmentType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fragment_type,
            order: 0,
            created_at: None,
            updated_at: None,
        }
    }

    /// Create a fragment at a specific rank
    pub fn with_order(id: impl Into<String>, title: impl Into<String>, fragment_type: FragmentType, order: i64) -> Self {
        Self {
            order,
            ..Self::new(id, title, fragment_type)
        }
    }
}

impl Entity for Fragment {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
