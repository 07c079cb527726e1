pub mod body;
pub mod boundary;
pub mod force;
pub mod heap;
pub mod motion;
pub mod shape;
pub mod world;

pub use body::{Body, BodyDef, BodyId, BodyState, ColliderId, Nature, StaticKind};
pub use boundary::{Boundary, BoundaryEdge, BoundaryManager};
pub use force::{AngularForce, ForceManager, LinearForce};
pub use heap::BodyHeap;
pub use motion::{Motion, MotionState, WorldStepFn};
pub use shape::{Shape, ShapeDef};
pub use world::{GlobalForce, World, WorldConfig};
