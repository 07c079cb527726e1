//! Per-step collision pipeline: a naive all-pairs AABB broad phase over the
//! live heap plus body-boundary pairing, then narrow-phase dispatch into a
//! reusable manifold arena.

use crate::collision::manifold::Manifold;
use crate::collision::narrow::{collide_bodies, collide_boundary};
use crate::dynamics::body::{BodyId, ColliderId};
use crate::dynamics::boundary::{Boundary, BoundaryEdge, BoundaryManager};
use crate::dynamics::heap::BodyHeap;
use crate::math::{BoundRect, Vec2};

#[derive(Default)]
pub struct CollisionManager {
    /// Candidate body pairs from the last broad phase.
    pairs: Vec<(BodyId, BodyId)>,
    /// Candidate body-boundary pairs.
    boundary_pairs: Vec<(BodyId, BoundaryEdge)>,
    /// Scratch arena; manifolds live for one step.
    manifolds: Vec<Manifold>,
}

/// AABB corner deepest against a wall's inward normal.
fn support_against(rect: &BoundRect, normal: Vec2) -> Vec2 {
    Vec2::new(
        if normal.x > 0.0 { rect.min.x } else { rect.max.x },
        if normal.y > 0.0 { rect.min.y } else { rect.max.y },
    )
}

fn boundary_candidate(rect: &BoundRect, boundary: &Boundary) -> bool {
    boundary.penetration_of(support_against(rect, boundary.normal)) >= 0.0
}

impl CollisionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manifolds(&self) -> &[Manifold] {
        &self.manifolds
    }

    /// Runs both phases. Bodies touched by any manifold are woken and get
    /// their `is_collide` flag set for the step.
    pub fn detect(&mut self, heap: &mut BodyHeap, boundaries: &BoundaryManager) {
        self.broad_phase(heap, boundaries);
        self.narrow_phase(heap, boundaries);
    }

    fn broad_phase(&mut self, heap: &BodyHeap, boundaries: &BoundaryManager) {
        self.pairs.clear();
        self.boundary_pairs.clear();

        let bodies = heap.heap();
        for i in 0..bodies.len() {
            let a = &bodies[i];
            for b in &bodies[i + 1..] {
                // Two immovable bodies have nothing to resolve.
                if a.inv_mass == 0.0 && b.inv_mass == 0.0 {
                    continue;
                }
                if a.bound_rect.overlaps(&b.bound_rect) {
                    self.pairs.push((a.id, b.id));
                }
            }

            if a.inv_mass == 0.0 {
                continue;
            }
            for boundary in boundaries.iter() {
                if boundary_candidate(&a.bound_rect, boundary) {
                    self.boundary_pairs.push((a.id, boundary.edge));
                }
            }
        }
    }

    fn narrow_phase(&mut self, heap: &mut BodyHeap, boundaries: &BoundaryManager) {
        self.manifolds.clear();

        for body in heap.iter_mut() {
            body.is_collide = false;
        }

        for &(ia, ib) in &self.pairs {
            let Some((a, b)) = heap.two_mut(ia, ib) else {
                continue;
            };
            if let Some(data) = collide_bodies(a, b) {
                // Contact wakes a sleeping participant.
                a.wake();
                b.wake();
                a.is_collide = true;
                b.is_collide = true;
                self.manifolds
                    .push(data.into_manifold(ColliderId::Body(ia), ColliderId::Body(ib)));
            }
        }

        for &(id, edge) in &self.boundary_pairs {
            let Some(boundary) = boundaries.get(edge) else {
                continue;
            };
            let Some(body) = heap.get_mut(id) else {
                continue;
            };
            if let Some(data) = collide_boundary(body, boundary) {
                body.wake();
                body.is_collide = true;
                self.manifolds
                    .push(data.into_manifold(ColliderId::Body(id), ColliderId::Boundary(edge)));
            }
        }
    }
}
