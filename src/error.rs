//! Error types for Flurry.
//!
//! Only configuration can fail. Per-frame work (spawning, force fields,
//! integration, compaction) never returns an error: degenerate numeric
//! input is skipped instead.

use std::fmt;

/// Errors raised while configuring emitters, fields, grids and renderers.
#[derive(Debug)]
pub enum ConfigError {
    /// Spawn type string is not one of `point`, `line`, `box`, `grid`.
    UnknownSpawnType(String),
    /// Over-life target is not one of `opacity`, `size`, `blur`, `rotation`.
    UnknownOverLifeTarget(String),
    /// A map object failed validation on import.
    InvalidMapObject(String),
    /// Clip polygons need at least three points.
    InvalidClipPolygon {
        /// Number of points supplied.
        points: usize,
    },
    /// Path fields need at least two control points.
    InvalidPath {
        /// Number of points supplied.
        points: usize,
    },
    /// The operation needs a renderer (or a renderer capability) that is absent.
    MissingRenderer,
    /// A numeric parameter was rejected (non-finite or out of range).
    InvalidParameter(String),
    /// JSON (de)serialization of a config or map object failed.
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownSpawnType(t) => {
                write!(f, "Unknown emitter type: {t} (expected point, line, box or grid)")
            }
            ConfigError::UnknownOverLifeTarget(t) => {
                write!(f, "Unknown over-life target: {t} (expected opacity, size, blur or rotation)")
            }
            ConfigError::InvalidMapObject(msg) => write!(f, "Not a correctly initialized map object: {msg}"),
            ConfigError::InvalidClipPolygon { points } => {
                write!(f, "Clip polygon needs at least 3 points, got {points}")
            }
            ConfigError::InvalidPath { points } => {
                write!(f, "Path needs at least 2 control points, got {points}")
            }
            ConfigError::MissingRenderer => write!(f, "Not a valid renderer for this operation."),
            ConfigError::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
            ConfigError::Json(e) => write!(f, "Failed to parse configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Result alias used by fallible configuration calls.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_offending_value() {
        let err = ConfigError::UnknownSpawnType("spiral".into());
        assert!(err.to_string().contains("spiral"));

        let err = ConfigError::InvalidClipPolygon { points: 2 };
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn test_json_error_has_source() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
