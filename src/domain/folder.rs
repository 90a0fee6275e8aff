//! Folder Entity
//!
//! Folders group fragments for the sidebar. The implicit "uncategorized"
//! bucket is not a Folder; it is represented by the absence of one.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// A user-named folder with its own independent order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique identifier
    pub id: String,
    /// Folder name
    pub name: String,
    /// Manual rank within the folder list
    pub order: i64,
    /// Color (hex, e.g., "#FF5733")
    pub color: Option<String>,
}

impl Folder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
            color: None,
        }
    }

    pub fn with_color(id: impl Into<String>, name: impl Into<String>, order: i64, color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Self::new(id, name, order)
        }
    }
}

impl Entity for Folder {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_creation() {
        let folder = Folder::new("F1", "Characters", 0);
        assert_eq!(folder.id(), "F1");
        assert_eq!(folder.name, "Characters");
        assert!(folder.color.is_none());
    }

    #[test]
    fn test_folder_with_color() {
        let folder = Folder::with_color("F2", "Places", 1, "#FF0000");
        assert_eq!(folder.color, Some("#FF0000".to_string()));
    }
}
