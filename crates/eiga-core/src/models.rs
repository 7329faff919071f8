use serde::{Deserialize, Serialize};

/// Year string stored when the provider gave no release date.
pub const UNKNOWN_YEAR: &str = "Unknown";

/// A classified media item persisted in the catalog.
///
/// Entries are append-only: there is no update or delete, and duplicate
/// titles are allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub title: String,
    pub year: String,
    pub file_ref: String,
}

impl CatalogEntry {
    /// Display form used in replies: "Title (Year)".
    pub fn display(&self) -> String {
        format!("{} ({})", self.title, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_year() {
        let entry = CatalogEntry {
            id: 1,
            title: "The Matrix".into(),
            year: "1999".into(),
            file_ref: "file-abc".into(),
        };
        assert_eq!(entry.display(), "The Matrix (1999)");
    }
}
