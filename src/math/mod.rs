pub mod aabb;
pub mod mat22;
pub mod utils;
pub mod vec2;

pub use aabb::BoundRect;
pub use mat22::Mat22;
pub use utils::{normalize_degrees, sign_nonzero};
pub use vec2::Vec2;

pub const DEG2RAD: f64 = core::f64::consts::PI / 180.0;
