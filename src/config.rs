use serde::{Deserialize, Serialize};

use crate::error::EditError;

pub const DEFAULT_MAX_DEPTH: usize = 512;

// ─── Limits ─────────────────────────────────────────────────────────────────

/// Bounds applied while walking encoded values.
///
/// `max_depth` counts container levels including the outermost one, so a
/// flat map needs `max_depth >= 1` and a map holding an array needs 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Limits {
    pub fn new(max_depth: usize) -> Result<Self, EditError> {
        let limits = Self { max_depth };
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<(), EditError> {
        if self.max_depth == 0 {
            return Err(EditError::Config("max_depth must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse limits from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EditError> {
        let limits: Limits =
            serde_json::from_str(json).map_err(|e| EditError::Config(e.to_string()))?;
        limits.validate()?;
        Ok(limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_depth() {
        assert_eq!(Limits::default().max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_from_json_partial() {
        assert_eq!(Limits::from_json("{}").unwrap(), Limits::default());
        assert_eq!(Limits::from_json(r#"{"max_depth": 3}"#).unwrap().max_depth, 3);
    }

    #[test]
    fn test_rejects_zero_depth() {
        assert!(matches!(Limits::new(0), Err(EditError::Config(_))));
        assert!(matches!(
            Limits::from_json(r#"{"max_depth": 0}"#),
            Err(EditError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Limits::from_json("max_depth = 3"),
            Err(EditError::Config(_))
        ));
    }
}
