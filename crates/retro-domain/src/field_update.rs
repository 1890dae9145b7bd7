/// Three-state update for an optional field
///
/// - `NoChange`: field keeps its existing value
/// - `Set(value)`: field is updated to the provided value
/// - `Clear`: field is cleared (set to None)
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use retro_domain::FieldUpdate;
///
/// let mut expiry = None;
/// FieldUpdate::Set(Utc::now() + Duration::minutes(5)).apply_to(&mut expiry);
/// assert!(expiry.is_some());
///
/// FieldUpdate::Clear.apply_to(&mut expiry);
/// assert_eq!(expiry, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Do not modify this field (keep existing value)
    NoChange,
    /// Set the field to the provided value
    Set(T),
    /// Clear the field (set to None)
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::NoChange
    }
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    /// Check if this represents a change (not NoChange)
    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::NoChange)
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// `Some(value)` becomes `Set(value)`, `None` becomes `Clear`
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}
