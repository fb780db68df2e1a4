// Copyright @yucwang 2026

use crate::math::constants::Float;
use std::fmt;

/// Invalid geometry, material or render parameters. Raised when a value is
/// constructed or changed, never during a render.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositive { name: &'static str, value: Float },
    OutOfRange { name: &'static str, value: Float },
    LensCurvature { curve_radius: Float, radius: Float },
    Degenerate(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive { name, value } => write!(f, "{} must be positive, got {}", name, value),
            ConfigError::OutOfRange { name, value } => write!(f, "{} is out of range: {}", name, value),
            ConfigError::LensCurvature { curve_radius, radius } => write!(
                f,
                "lens curve radius {} must be larger than its radius {}",
                curve_radius, radius
            ),
            ConfigError::Degenerate(what) => write!(f, "degenerate geometry: {}", what),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn require_positive(name: &'static str, value: Float) -> Result<Float, ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

pub fn require_unit_interval(name: &'static str, value: Float) -> Result<Float, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange { name, value })
    }
}

/// Frame level failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    Config(ConfigError),
    MissingCamera,
    RowFailed { row: usize },
}

impl From<ConfigError> for RenderError {
    fn from(err: ConfigError) -> Self {
        RenderError::Config(err)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Config(err) => write!(f, "config error: {}", err),
            RenderError::MissingCamera => write!(f, "scene has no camera"),
            RenderError::RowFailed { row } => write!(f, "rendering of row {} failed, frame aborted", row),
        }
    }
}

impl std::error::Error for RenderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive("radius", 2.0), Ok(2.0));
        assert!(require_positive("radius", 0.0).is_err());
        assert!(require_positive("radius", -1.0).is_err());
        assert!(require_positive("radius", Float::NAN).is_err());
    }

    #[test]
    fn test_require_unit_interval() {
        assert!(require_unit_interval("transparency", 0.0).is_ok());
        assert!(require_unit_interval("transparency", 1.0).is_ok());
        assert!(require_unit_interval("transparency", 1.5).is_err());
        assert!(require_unit_interval("transparency", Float::NAN).is_err());
    }

    #[test]
    fn test_display() {
        let err = ConfigError::LensCurvature { curve_radius: 1.0, radius: 2.0 };
        assert_eq!(err.to_string(), "lens curve radius 1 must be larger than its radius 2");
        let err: RenderError = err.into();
        assert!(err.to_string().starts_with("config error"));
    }
}
