use serde::{Deserialize, Serialize};

/// Key of a column sequence on a board, derived from the column name.
pub type ColumnKey = String;

pub const DEFAULT_COLUMN_COLORS: [&str; 6] = [
    "#2e7d32", "#c62828", "#1565c0", "#f9a825", "#6a1b9a", "#00838f",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTemplate {
    pub name: String,
    pub key: ColumnKey,
    pub color: String,
}

impl ColumnTemplate {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        let name = name.into();
        let key = slugify(&name);
        Self {
            name,
            key,
            color: color.into(),
        }
    }

    /// Build column templates from names, cycling through the default palette.
    pub fn from_names<I, S>(names: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                Self::new(name, DEFAULT_COLUMN_COLORS[i % DEFAULT_COLUMN_COLORS.len()])
            })
            .collect()
    }
}

/// Derive a column key: lowercase ASCII alphanumerics joined by single dashes.
pub fn slugify(name: &str) -> ColumnKey {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
