//! Error types for body construction and per-step numeric failures.

use std::fmt;

use crate::dynamics::BodyId;

/// Rejected body definition. Fatal at `World::append`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Shape encloses no area (or a negative one after winding fixup).
    DegenerateArea {
        /// The computed signed area.
        area: f64,
    },
    /// A vertex, center, radius, or material field is NaN or infinite.
    NonFiniteGeometry,
    /// Polygon definitions need at least three vertices.
    TooFewVertices {
        /// The number of vertices supplied.
        count: usize,
    },
    /// Explicit mass or density that is non-positive or non-finite.
    InvalidMass {
        /// The offending value.
        mass: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DegenerateArea { area } => {
                write!(f, "body shape has degenerate area {area}")
            }
            ConfigError::NonFiniteGeometry => {
                write!(f, "body definition contains NaN or infinite values")
            }
            ConfigError::TooFewVertices { count } => {
                write!(f, "polygon needs at least 3 vertices, got {count}")
            }
            ConfigError::InvalidMass { mass } => {
                write!(f, "mass and density must be positive and finite, got {mass}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Numeric blow-up detected after integration. The offending body is put to
/// sleep and the step continues for everyone else.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Position or velocity left the finite range.
    NonFiniteKinematics {
        /// The body whose state went non-finite.
        body: BodyId,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NonFiniteKinematics { body } => {
                write!(f, "body {body:?} has non-finite position or velocity")
            }
        }
    }
}

impl std::error::Error for DomainError {}

/// Global sink for per-body [`DomainError`]s raised mid-step.
pub type ErrorHandler = Box<dyn FnMut(&DomainError)>;
