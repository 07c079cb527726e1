//! `pulse2d` is the dynamics core of an interactive 2D rigid-body engine:
//! per-step integration under global forces, AABB broad phase plus SAT /
//! distance narrow phase, single-pass impulse resolution with contact
//! events, and a sleep heuristic. Rendering is delegated to an opaque host
//! handle that gets one repaint request per step.
//!
//! Integration is unit-time per step: the host's frame clock (nominally
//! 60 Hz) drives `World::tick`, and all velocities are per-step quantities.

pub mod collision;
pub mod dynamics;
pub mod error;
pub mod math;
pub mod render;

pub use dynamics::{
    Body, BodyDef, BodyId, BodyState, BoundaryEdge, ColliderId, GlobalForce, Nature, ShapeDef,
    StaticKind, World, WorldConfig,
};
pub use error::{ConfigError, DomainError};
pub use math::{BoundRect, Vec2};
pub use render::{Renderer, VisualAttr, VisualProxy};
