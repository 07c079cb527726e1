//! The world: owns the managers, the viewport, and the step counter, and
//! forwards host requests to the right component.

use crate::collision::manager::CollisionManager;
use crate::collision::resolver::ContactResolver;
use crate::dynamics::body::{Body, BodyDef, BodyId};
use crate::dynamics::boundary::{BoundaryEdge, BoundaryManager};
use crate::dynamics::force::{AngularForce, ForceManager, LinearForce};
use crate::dynamics::heap::BodyHeap;
use crate::dynamics::motion::{Motion, WorldStepFn};
use crate::error::{ConfigError, ErrorHandler};
use crate::math::Vec2;
use crate::render::{EventHandler, Renderer};

/// Global force configuration at construction time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldConfig {
    pub gravity: Vec2,
    pub linear_drag: Vec2,
    pub angular_drag: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 5.0),
            linear_drag: Vec2::new(0.2, 0.0),
            angular_drag: 0.15,
        }
    }
}

/// Partial update for `World::set_global_force`; absent fields keep their
/// current value.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GlobalForce {
    pub gravity: Option<Vec2>,
    pub linear_drag: Option<Vec2>,
    pub angular_drag: Option<f64>,
}

pub struct World {
    width: f64,
    height: f64,

    heap: BodyHeap,
    boundaries: BoundaryManager,
    forces: ForceManager,
    collisions: CollisionManager,
    resolver: ContactResolver,
    motion: Motion,

    renderer: Option<Box<dyn Renderer>>,
    error_handler: Option<ErrorHandler>,

    next_id: u64,
    step_count: u64,
}

impl World {
    pub fn new(size: (f64, f64), config: WorldConfig) -> Self {
        let mut forces = ForceManager::new();
        forces.add_linear_force(LinearForce::Gravity { g: config.gravity });
        forces.add_linear_force(LinearForce::LinearDrag {
            coeff: config.linear_drag,
        });
        forces.add_angular_force(AngularForce::AngularDrag {
            coeff: config.angular_drag,
        });

        Self {
            width: size.0,
            height: size.1,
            heap: BodyHeap::new(),
            boundaries: BoundaryManager::new(),
            forces,
            collisions: CollisionManager::new(),
            resolver: ContactResolver::new(),
            motion: Motion::new(),
            renderer: None,
            error_handler: None,
            next_id: 0,
            step_count: 0,
        }
    }

    /// Validates and admits a body. Degenerate definitions are fatal here.
    pub fn append(&mut self, def: BodyDef) -> Result<BodyId, ConfigError> {
        let id = BodyId(self.next_id);
        let body = Body::from_def(def, id)?;
        self.next_id += 1;
        Ok(self.heap.append(body))
    }

    /// Admits a batch; the first invalid definition aborts the rest.
    pub fn append_all(
        &mut self,
        defs: impl IntoIterator<Item = BodyDef>,
    ) -> Result<Vec<BodyId>, ConfigError> {
        defs.into_iter().map(|def| self.append(def)).collect()
    }

    /// Installs one of the four viewport walls.
    pub fn append_boundary(&mut self, edge: BoundaryEdge) {
        self.boundaries.add(edge, self.width, self.height);
    }

    pub fn remove(&mut self, id: BodyId) -> bool {
        self.heap.remove(id).is_some()
    }

    pub fn remove_boundary(&mut self, edge: BoundaryEdge) {
        self.boundaries.remove(edge);
    }

    /// Drops all bodies. Boundaries persist.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.resolver.clear_tracking();
    }

    /// Forwards event wiring to the renderer, when one is attached.
    pub fn bind(&mut self, event: &str, handler: EventHandler) {
        if let Some(r) = self.renderer.as_deref_mut() {
            r.bind(event, handler);
        } else {
            log::warn!("bind(\"{event}\") ignored: no renderer attached");
        }
    }

    pub fn start(&mut self) {
        self.motion.start();
    }

    pub fn pause(&mut self) {
        self.motion.pause();
    }

    pub fn is_running(&self) -> bool {
        self.motion.is_running()
    }

    /// Host frame tick. Runs one full step while the motion state machine is
    /// `Running`; a no-op otherwise.
    pub fn tick(&mut self) {
        if !self.motion.is_running() {
            return;
        }
        self.step_count += 1;

        let heap = &mut self.heap;
        let boundaries = &self.boundaries;
        let forces = &self.forces;
        let collisions = &mut self.collisions;
        let resolver = &mut self.resolver;
        let motion = &mut self.motion;
        let renderer: Option<&mut (dyn Renderer + '_)> = match &mut self.renderer {
            Some(r) => Some(r.as_mut()),
            None => None,
        };
        let error_handler = self.error_handler.as_mut();
        let step_count = self.step_count;

        motion.step(
            step_count,
            heap,
            boundaries,
            forces,
            collisions,
            resolver,
            renderer,
            error_handler,
        );
    }

    /// Mutates the registered global force generators in place.
    pub fn set_global_force(&mut self, update: GlobalForce) {
        if let Some(g) = update.gravity {
            self.forces.set_gravity(g);
        }
        if let Some(coeff) = update.linear_drag {
            self.forces.set_linear_drag(coeff);
        }
        if let Some(coeff) = update.angular_drag {
            self.forces.set_angular_drag(coeff);
        }
    }

    pub fn add_world_step_fn(&mut self, f: WorldStepFn) {
        self.motion.add_world_step_fn(f);
    }

    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderer = Some(renderer);
    }

    pub fn set_error_handler(&mut self, handler: ErrorHandler) {
        self.error_handler = Some(handler);
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn body_count(&self) -> usize {
        self.heap.len()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.heap.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.heap.get_mut(id)
    }

    pub fn bodies(&self) -> &[Body] {
        self.heap.heap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::body::Nature;
    use crate::dynamics::shape::ShapeDef;
    use approx::assert_relative_eq;

    fn quiet_config() -> WorldConfig {
        WorldConfig {
            gravity: Vec2::ZERO,
            linear_drag: Vec2::ZERO,
            angular_drag: 0.0,
        }
    }

    fn ball(x: f64, y: f64) -> BodyDef {
        BodyDef::with_nature(
            ShapeDef::Circle {
                center: Vec2::new(x, y),
                radius: 10.0,
            },
            Nature {
                mass: Some(1.0),
                ..Nature::default()
            },
        )
    }

    #[test]
    fn tick_is_noop_while_stopped() {
        let mut world = World::new((800.0, 600.0), WorldConfig::default());
        let id = world.append(ball(400.0, 100.0)).unwrap();

        world.tick();
        assert_eq!(world.step_count(), 0);
        assert_relative_eq!(world.body(id).unwrap().pos.y, 100.0);

        world.start();
        world.tick();
        assert_eq!(world.step_count(), 1);
        assert!(world.body(id).unwrap().pos.y > 100.0);

        world.pause();
        let y = world.body(id).unwrap().pos.y;
        world.tick();
        assert_relative_eq!(world.body(id).unwrap().pos.y, y);
    }

    #[test]
    fn append_rejects_degenerate_shapes() {
        let mut world = World::new((800.0, 600.0), WorldConfig::default());
        let bad = BodyDef::new(ShapeDef::Circle {
            center: Vec2::ZERO,
            radius: -1.0,
        });
        assert!(world.append(bad).is_err());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn clear_keeps_boundaries() {
        let mut world = World::new((800.0, 600.0), WorldConfig::default());
        world.append_boundary(BoundaryEdge::Bottom);
        world.append(ball(400.0, 595.0)).unwrap();
        world.clear();
        assert_eq!(world.body_count(), 0);

        // The floor still catches a fresh body.
        let id = world.append(ball(400.0, 595.0)).unwrap();
        world.start();
        world.tick();
        assert!(world.body(id).unwrap().pos.y <= 590.0 + 1e-9);
    }

    #[test]
    fn set_global_force_mutates_in_place() {
        let mut world = World::new((800.0, 600.0), quiet_config());
        let id = world.append(ball(400.0, 100.0)).unwrap();
        world.start();

        world.tick();
        assert_relative_eq!(world.body(id).unwrap().vel.y, 0.0);

        world.set_global_force(GlobalForce {
            gravity: Some(Vec2::new(0.0, 2.0)),
            ..GlobalForce::default()
        });
        world.tick();
        assert_relative_eq!(world.body(id).unwrap().vel.y, 2.0);
    }

    #[test]
    fn step_fns_run_in_registration_order() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let order = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new((800.0, 600.0), quiet_config());

        for tag in ["first", "second"] {
            let order = Rc::clone(&order);
            world.add_world_step_fn(Box::new(move |_, step| {
                order.borrow_mut().push((tag, step));
            }));
        }

        world.start();
        world.tick();
        world.tick();
        assert_eq!(
            *order.borrow(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
    }

    #[test]
    fn queries_report_viewport_and_count() {
        let mut world = World::new((1024.0, 768.0), WorldConfig::default());
        assert_relative_eq!(world.width(), 1024.0);
        assert_relative_eq!(world.height(), 768.0);

        let ids = world
            .append_all(vec![ball(100.0, 100.0), ball(200.0, 100.0)])
            .unwrap();
        assert_eq!(world.body_count(), 2);
        assert_ne!(ids[0], ids[1]);

        world.remove(ids[0]);
        assert_eq!(world.body_count(), 1);
    }
}
