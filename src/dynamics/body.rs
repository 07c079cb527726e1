use std::fmt;

use crate::dynamics::boundary::BoundaryEdge;
use crate::dynamics::force::ForceManager;
use crate::dynamics::shape::{Shape, ShapeDef};
use crate::error::ConfigError;
use crate::math::{normalize_degrees, BoundRect, Vec2};
use crate::render::{VisualAttr, VisualProxy};

/// Opaque body identifier, unique within a `World`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

/// Either side of a contact, as seen by collision callbacks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ColliderId {
    Body(BodyId),
    Boundary(BoundaryEdge),
}

/// Degrees of freedom pinned by the host.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum StaticKind {
    /// Fully dynamic.
    #[default]
    None,
    /// Position pinned; the body may still spin.
    Position,
    /// Position and orientation pinned.
    Total,
}

impl StaticKind {
    /// Parses the host-facing string form. Unknown values mean `None`.
    pub fn parse(s: &str) -> Self {
        match s {
            "position" => StaticKind::Position,
            "total" => StaticKind::Total,
            _ => StaticKind::None,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum BodyState {
    #[default]
    Init,
    Simulate,
    Sleep,
}

/// Which pose component moved, for incremental bound-rect maintenance.
#[derive(Copy, Clone, Debug)]
pub enum BoundDelta {
    Pos(Vec2),
    Rot,
}

pub type CollidedFn = Box<dyn FnMut(ColliderId)>;
pub type SeparatedFn = Box<dyn FnMut()>;

/// Material half of a body definition.
pub struct Nature {
    /// Explicit mass. When present, density is derived from it; otherwise
    /// mass = area * density.
    pub mass: Option<f64>,
    pub statics: StaticKind,
    pub linear_velocity: Vec2,
    pub angular_velocity: f64,
    pub friction: f64,
    pub restitution: f64,
    pub density: f64,
}

impl Default for Nature {
    fn default() -> Self {
        Self {
            mass: None,
            statics: StaticKind::None,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            friction: 0.2,
            restitution: 0.9,
            density: 0.01,
        }
    }
}

/// Full body definition handed to `World::append`.
pub struct BodyDef {
    pub shape: ShapeDef,
    pub nature: Nature,
    pub collided: Option<CollidedFn>,
    pub separated: Option<SeparatedFn>,
    pub visual: Option<Box<dyn VisualProxy>>,
}

impl BodyDef {
    pub fn new(shape: ShapeDef) -> Self {
        Self {
            shape,
            nature: Nature::default(),
            collided: None,
            separated: None,
            visual: None,
        }
    }

    pub fn with_nature(shape: ShapeDef, nature: Nature) -> Self {
        Self {
            shape,
            nature,
            collided: None,
            separated: None,
            visual: None,
        }
    }
}

/// Number of motion samples the sleep heuristic looks at.
pub const MOTION_SAMPLES: usize = 20;

/// Standard-deviation threshold under which a full sample window means the
/// body can sleep.
pub const SLEEP_SIGMA: f64 = 500.0;

/// Fixed-size ring of recent motion magnitudes.
#[derive(Clone, Debug, Default)]
pub(crate) struct MotionRing {
    samples: [f64; MOTION_SAMPLES],
    head: usize,
    len: usize,
}

impl MotionRing {
    pub fn push(&mut self, value: f64) {
        self.samples[self.head] = value;
        self.head = (self.head + 1) % MOTION_SAMPLES;
        self.len = (self.len + 1).min(MOTION_SAMPLES);
    }

    pub fn is_full(&self) -> bool {
        self.len == MOTION_SAMPLES
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Population standard deviation; `None` until the window is full.
    pub fn std_dev(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        let n = MOTION_SAMPLES as f64;
        let mean = self.samples.iter().sum::<f64>() / n;
        let var = self
            .samples
            .iter()
            .map(|s| (s - mean) * (s - mean))
            .sum::<f64>()
            / n;
        Some(var.sqrt())
    }
}

/// A rigid body: shape variant plus the shared kinematic/material record.
pub struct Body {
    pub id: BodyId,
    pub shape: Shape,

    pub pos: Vec2,
    /// Orientation in degrees, normalized to [0, 360).
    pub rot: f64,

    pub vel: Vec2,
    pub angular_vel: f64,
    pub linear_acc: Vec2,
    pub angular_acc: f64,
    pub torque: f64,

    pub mass: f64,
    pub inv_mass: f64,
    pub density: f64,
    pub friction: f64,
    pub restitution: f64,
    pub area: f64,
    /// World-space center of mass. Tracks `pos` since local vertex loops are
    /// centroid-centered.
    pub centroid: Vec2,
    pub rotation_inertia: f64,
    pub inv_inertia: f64,

    pub statics: StaticKind,
    pub state: BodyState,
    pub is_collide: bool,
    pub bound_rect: BoundRect,

    /// Cached world-frame vertex loop; empty for circles.
    pub world_verts: Vec<Vec2>,

    pub cur_motion: f64,
    pub(crate) motion_ring: MotionRing,

    def_mass: Option<f64>,
    pub(crate) collided: Option<CollidedFn>,
    pub(crate) separated: Option<SeparatedFn>,
    pub(crate) visual: Option<Box<dyn VisualProxy>>,
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("id", &self.id)
            .field("pos", &self.pos)
            .field("rot", &self.rot)
            .field("vel", &self.vel)
            .field("angular_vel", &self.angular_vel)
            .field("statics", &self.statics)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Body {
    /// Validates the definition and builds a body in the `Init` state. Mass
    /// data is computed when the heap first admits it.
    pub(crate) fn from_def(def: BodyDef, id: BodyId) -> Result<Self, ConfigError> {
        let BodyDef {
            shape,
            nature,
            collided,
            separated,
            visual,
        } = def;

        if !nature.linear_velocity.is_finite()
            || !nature.angular_velocity.is_finite()
            || !nature.friction.is_finite()
            || !nature.restitution.is_finite()
        {
            return Err(ConfigError::NonFiniteGeometry);
        }
        if let Some(m) = nature.mass {
            if !m.is_finite() || m <= 0.0 {
                return Err(ConfigError::InvalidMass { mass: m });
            }
        }
        if !nature.density.is_finite() || nature.density <= 0.0 {
            return Err(ConfigError::InvalidMass {
                mass: nature.density,
            });
        }

        let (shape, pos) = shape.build()?;

        Ok(Self {
            id,
            shape,
            pos,
            rot: 0.0,
            vel: nature.linear_velocity,
            angular_vel: nature.angular_velocity,
            linear_acc: Vec2::ZERO,
            angular_acc: 0.0,
            torque: 0.0,
            mass: 0.0,
            inv_mass: 0.0,
            density: nature.density,
            friction: nature.friction,
            restitution: nature.restitution,
            area: 0.0,
            centroid: pos,
            rotation_inertia: 0.0,
            inv_inertia: 0.0,
            statics: nature.statics,
            state: BodyState::Init,
            is_collide: false,
            bound_rect: BoundRect::default(),
            world_verts: Vec::new(),
            cur_motion: 0.0,
            motion_ring: MotionRing::default(),
            def_mass: nature.mass,
            collided,
            separated,
            visual,
        })
    }

    /// Computes the initial world-frame vertices, centroid, and bound rect.
    pub(crate) fn init_body_data(&mut self) {
        let mut verts = std::mem::take(&mut self.world_verts);
        self.shape.world_vertices(self.pos, self.rot, &mut verts);
        self.world_verts = verts;
        self.centroid = self.pos;
        self.create_bound_rect();
    }

    /// Fixes mass, density, inertia, and their inverses from the shape and
    /// the static kind.
    pub(crate) fn set_mass_data(&mut self) {
        self.area = self.shape.calc_area();
        match self.def_mass {
            Some(m) => {
                self.mass = m;
                self.density = self.calc_density();
            }
            None => {
                self.mass = self.area * self.density;
            }
        }
        self.rotation_inertia = self.shape.calc_rotation_inertia(self.mass);

        match self.statics {
            StaticKind::None => {
                self.inv_mass = 1.0 / self.mass;
                self.inv_inertia = 1.0 / self.rotation_inertia;
            }
            StaticKind::Position => {
                // Pinned in place but free to spin.
                self.inv_mass = 0.0;
                self.inv_inertia = 1.0 / self.rotation_inertia;
                self.vel = Vec2::ZERO;
            }
            StaticKind::Total => {
                self.inv_mass = 0.0;
                self.inv_inertia = 0.0;
                self.vel = Vec2::ZERO;
                self.angular_vel = 0.0;
            }
        }
    }

    pub fn calc_density(&self) -> f64 {
        self.mass / self.area
    }

    pub(crate) fn create_bound_rect(&mut self) {
        self.bound_rect = match self.shape {
            Shape::Circle { radius } => BoundRect::from_circle(self.pos, radius),
            _ => BoundRect::from_points(&self.world_verts),
        };
    }

    /// Incremental bound-rect maintenance: translations shift, rotations
    /// rebuild from the rotated loop.
    pub(crate) fn update_bound_rect(&mut self, delta: BoundDelta) {
        match delta {
            BoundDelta::Pos(d) => {
                for v in &mut self.world_verts {
                    *v += d;
                }
                self.bound_rect.translate(d);
            }
            BoundDelta::Rot => {
                if matches!(self.shape, Shape::Circle { .. }) {
                    return;
                }
                let mut verts = std::mem::take(&mut self.world_verts);
                self.shape.world_vertices(self.pos, self.rot, &mut verts);
                self.world_verts = verts;
                self.create_bound_rect();
            }
        }
    }

    /// Rigid translation keeping vertices, centroid, bound rect, and the
    /// visual proxy in sync.
    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
        self.centroid += delta;
        self.update_bound_rect(BoundDelta::Pos(delta));
        self.push_visual_translation();
    }

    /// Semi-implicit Euler over one unit step: `v += a; pos += v`.
    pub fn integrate_position(&mut self) {
        match self.statics {
            StaticKind::Position | StaticKind::Total => {
                self.vel = Vec2::ZERO;
                return;
            }
            StaticKind::None => {}
        }
        self.vel += self.linear_acc;
        let delta = self.vel;
        self.translate(delta);
    }

    /// `omega += alpha; rot = (rot + omega) mod 360`, normalized after the
    /// update so `rot` never leaves [0, 360). Accumulated torque feeds the
    /// angular acceleration through the inverse inertia.
    pub fn integrate_rotation(&mut self) {
        if self.statics == StaticKind::Total {
            self.angular_vel = 0.0;
            return;
        }
        self.angular_vel += self.angular_acc + self.torque * self.inv_inertia;
        self.rot = normalize_degrees(self.rot + self.angular_vel);
        self.update_bound_rect(BoundDelta::Rot);
        self.push_visual_rotation();
    }

    /// One body worth of step phase 1: apply forces, integrate, clear
    /// accumulators.
    pub fn update(&mut self, forces: &ForceManager) {
        forces.apply_linear_force(self);
        forces.apply_angular_force(self);
        self.integrate_position();
        self.integrate_rotation();
        forces.clear(self);
    }

    pub fn set_pos(&mut self, p: Vec2) {
        let delta = p - self.pos;
        self.translate(delta);
    }

    pub fn set_rotation(&mut self, deg: f64) {
        self.rot = normalize_degrees(deg);
        self.update_bound_rect(BoundDelta::Rot);
        self.push_visual_rotation();
    }

    pub fn set_linear_vel(&mut self, v: Vec2) {
        if self.statics == StaticKind::None {
            self.vel = v;
        }
    }

    pub fn set_angular_vel(&mut self, w: f64) {
        if self.statics != StaticKind::Total {
            self.angular_vel = w;
        }
    }

    /// Accumulates torque for the next integration. Cleared with the other
    /// accumulators after each step.
    pub fn add_torque(&mut self, amount: f64) {
        self.torque += amount;
    }

    /// The renderer-facing proxy, when one is attached.
    pub fn get_shape(&mut self) -> Option<&mut dyn VisualProxy> {
        match &mut self.visual {
            Some(v) => Some(v.as_mut()),
            None => None,
        }
    }

    pub fn set_visual(&mut self, proxy: Box<dyn VisualProxy>) {
        self.visual = Some(proxy);
        self.push_visual_translation();
        self.push_visual_rotation();
    }

    pub(crate) fn push_visual_translation(&mut self) {
        if let Some(v) = self.visual.as_deref_mut() {
            v.set_attr(VisualAttr::X, self.pos.x);
            v.set_attr(VisualAttr::Y, self.pos.y);
        }
    }

    pub(crate) fn push_visual_rotation(&mut self) {
        if let Some(v) = self.visual.as_deref_mut() {
            v.set_attr(VisualAttr::Rotate, self.rot);
        }
    }

    /// Records the current motion magnitude for the sleep heuristic.
    pub(crate) fn sample_motion(&mut self) {
        self.cur_motion = self.vel.length_sqr() + self.angular_vel * self.angular_vel;
        self.motion_ring.push(self.cur_motion);
    }

    /// Sleep test: full sample window with low spread.
    pub fn is_time_to_sleep(&self) -> bool {
        match self.motion_ring.std_dev() {
            Some(sigma) => sigma < SLEEP_SIGMA,
            None => false,
        }
    }

    /// Contact wake-up: sleeping bodies rejoin simulation with an empty
    /// sample window.
    pub(crate) fn wake(&mut self) {
        if self.state == BodyState::Sleep {
            self.state = BodyState::Simulate;
            self.motion_ring.clear();
        }
    }

    pub fn is_static(&self) -> bool {
        self.statics != StaticKind::None
    }

    pub(crate) fn kinematics_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.angular_vel.is_finite()
    }
}
