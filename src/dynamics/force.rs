//! Global force generators. Every non-static, awake body gets each
//! registered generator's contribution added to its acceleration
//! accumulators at the start of a step; the accumulators are cleared after
//! integration.

use crate::dynamics::body::{Body, StaticKind};
use crate::math::Vec2;

/// Linear force generator variants.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LinearForce {
    /// Constant acceleration field. Mass-independent.
    Gravity { g: Vec2 },
    /// Acceleration opposing the current velocity, scaled componentwise.
    LinearDrag { coeff: Vec2 },
}

impl LinearForce {
    fn apply(&self, body: &mut Body) {
        match *self {
            LinearForce::Gravity { g } => {
                body.linear_acc += g;
            }
            LinearForce::LinearDrag { coeff } => {
                body.linear_acc -=
                    Vec2::new(body.vel.x * coeff.x, body.vel.y * coeff.y);
            }
        }
    }
}

/// Angular force generator variants.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AngularForce {
    /// Angular acceleration opposing the current spin.
    AngularDrag { coeff: f64 },
}

impl AngularForce {
    fn apply(&self, body: &mut Body) {
        match *self {
            AngularForce::AngularDrag { coeff } => {
                body.angular_acc -= body.angular_vel * coeff;
            }
        }
    }
}

/// Registry of global generators, owned by the world.
#[derive(Debug, Default)]
pub struct ForceManager {
    linear: Vec<LinearForce>,
    angular: Vec<AngularForce>,
}

impl ForceManager {
    pub fn new() -> Self {
        Self {
            linear: Vec::new(),
            angular: Vec::new(),
        }
    }

    pub fn add_linear_force(&mut self, force: LinearForce) {
        self.linear.push(force);
    }

    pub fn add_angular_force(&mut self, force: AngularForce) {
        self.angular.push(force);
    }

    /// Adds every linear generator's contribution to `body.linear_acc`.
    /// Static bodies are immovable and take no linear forces.
    pub fn apply_linear_force(&self, body: &mut Body) {
        if body.inv_mass == 0.0 {
            return;
        }
        for force in &self.linear {
            force.apply(body);
        }
    }

    /// Adds every angular generator's contribution to `body.angular_acc`.
    /// Only `Total` statics are spin-locked; position statics may rotate.
    pub fn apply_angular_force(&self, body: &mut Body) {
        if body.statics == StaticKind::Total {
            return;
        }
        for force in &self.angular {
            force.apply(body);
        }
    }

    /// Zeroes the acceleration accumulators after integration.
    pub fn clear(&self, body: &mut Body) {
        body.linear_acc = Vec2::ZERO;
        body.angular_acc = 0.0;
        body.torque = 0.0;
    }

    /// Runtime retune of the gravity generator, if registered.
    pub fn set_gravity(&mut self, g: Vec2) {
        for force in &mut self.linear {
            if let LinearForce::Gravity { g: slot } = force {
                *slot = g;
            }
        }
    }

    pub fn set_linear_drag(&mut self, coeff: Vec2) {
        for force in &mut self.linear {
            if let LinearForce::LinearDrag { coeff: slot } = force {
                *slot = coeff;
            }
        }
    }

    pub fn set_angular_drag(&mut self, coeff: f64) {
        for force in &mut self.angular {
            let AngularForce::AngularDrag { coeff: slot } = force;
            *slot = coeff;
        }
    }
}
