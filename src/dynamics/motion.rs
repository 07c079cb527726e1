//! The stepping driver: owns the run/pause state machine, the registered
//! per-step user callbacks, and the fixed phase order of a simulation step.
//! Integration is unit-time per step; the host throttles the tick rate.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::collision::manager::CollisionManager;
use crate::collision::resolver::ContactResolver;
use crate::dynamics::body::{BodyState, StaticKind};
use crate::dynamics::boundary::BoundaryManager;
use crate::dynamics::force::ForceManager;
use crate::dynamics::heap::BodyHeap;
use crate::error::{DomainError, ErrorHandler};
use crate::render::Renderer;

/// Per-step user callback. Receives the live heap and the step count.
pub type WorldStepFn = Box<dyn FnMut(&mut BodyHeap, u64)>;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum MotionState {
    #[default]
    Stopped,
    Running,
}

#[derive(Default)]
pub struct Motion {
    state: MotionState,
    step_fns: Vec<WorldStepFn>,
}

impl Motion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.state = MotionState::Running;
    }

    pub fn pause(&mut self) {
        self.state = MotionState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        self.state == MotionState::Running
    }

    /// Registers a callback invoked exactly once per step, before rendering,
    /// in registration order.
    pub fn add_world_step_fn(&mut self, f: WorldStepFn) {
        self.step_fns.push(f);
    }

    /// One full simulation step.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn step(
        &mut self,
        step_count: u64,
        heap: &mut BodyHeap,
        boundaries: &BoundaryManager,
        forces: &ForceManager,
        collisions: &mut CollisionManager,
        resolver: &mut ContactResolver,
        mut renderer: Option<&mut dyn Renderer>,
        mut error_handler: Option<&mut ErrorHandler>,
    ) {
        // 1. Forces and integration for awake bodies.
        for body in heap.iter_mut() {
            if body.state != BodyState::Simulate {
                continue;
            }
            body.update(forces);

            if !body.kinematics_finite() {
                // Numeric blow-up: park the body, keep the step going.
                body.state = BodyState::Sleep;
                let err = DomainError::NonFiniteKinematics { body: body.id };
                log::error!("{err}; body parked");
                if let Some(handler) = error_handler.as_mut() {
                    handler(&err);
                }
            }
        }

        // 2-3. Contacts, then impulses and events.
        collisions.detect(heap, boundaries);
        resolver.resolve(heap, collisions.manifolds());
        resolver.emit_events(heap, collisions.manifolds());

        // 4. Sleep heuristic over freshly resolved motion.
        for body in heap.iter_mut() {
            if body.state != BodyState::Simulate || body.statics != StaticKind::None {
                continue;
            }
            body.sample_motion();
            if body.is_time_to_sleep() {
                body.state = BodyState::Sleep;
            }
        }

        // 5. User step functions, isolated from panics.
        for (i, f) in self.step_fns.iter_mut().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| f(heap, step_count))).is_err() {
                log::error!("world step fn #{i} panicked at step {step_count}; continuing");
            }
        }

        // 6. Ask the renderer for a repaint.
        if let Some(r) = renderer.as_deref_mut() {
            r.repaint();
        }
    }
}
