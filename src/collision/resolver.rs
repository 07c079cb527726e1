//! Impulse-based contact resolution and contact-event bookkeeping. One pass
//! over the step's manifolds in insertion order; impulses are applied
//! immediately, with no iterative solver.

use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::collision::manifold::Manifold;
use crate::dynamics::body::{Body, ColliderId};
use crate::dynamics::heap::BodyHeap;
use crate::math::Vec2;

type PairKey = (ColliderId, ColliderId);

fn pair_key(a: ColliderId, b: ColliderId) -> PairKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Default)]
pub struct ContactResolver {
    /// Pairs that were in contact at the end of the previous step.
    prev_pairs: BTreeSet<PairKey>,
    curr_pairs: BTreeSet<PairKey>,
}

impl ContactResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies positional correction and velocity impulses for every
    /// manifold of this step.
    pub fn resolve(&mut self, heap: &mut BodyHeap, manifolds: &[Manifold]) {
        for m in manifolds {
            match (m.a, m.b) {
                (ColliderId::Body(ia), ColliderId::Body(ib)) => {
                    if let Some((a, b)) = heap.two_mut(ia, ib) {
                        resolve_body_pair(a, b, m);
                    }
                }
                (ColliderId::Body(id), ColliderId::Boundary(_)) => {
                    if let Some(body) = heap.get_mut(id) {
                        resolve_boundary_contact(body, m);
                    }
                }
                // Boundaries are always the second side of a manifold.
                _ => {}
            }
        }
    }

    /// Fires `collided` for pairs new this step and `separated` for pairs
    /// gone since the last one, exactly once per transition.
    pub fn emit_events(&mut self, heap: &mut BodyHeap, manifolds: &[Manifold]) {
        self.curr_pairs.clear();
        for m in manifolds {
            self.curr_pairs.insert(pair_key(m.a, m.b));
        }

        // New contacts, in manifold insertion order.
        for m in manifolds {
            let key = pair_key(m.a, m.b);
            if !self.prev_pairs.contains(&key) {
                fire_collided(heap, m.a, m.b);
                fire_collided(heap, m.b, m.a);
            }
        }

        for &(x, y) in self.prev_pairs.iter() {
            if !self.curr_pairs.contains(&(x, y)) {
                fire_separated(heap, x);
                fire_separated(heap, y);
            }
        }

        std::mem::swap(&mut self.prev_pairs, &mut self.curr_pairs);
    }

    /// Drops contact history, e.g. when the world is cleared.
    pub fn clear_tracking(&mut self) {
        self.prev_pairs.clear();
        self.curr_pairs.clear();
    }
}

fn fire_collided(heap: &mut BodyHeap, target: ColliderId, other: ColliderId) {
    let ColliderId::Body(id) = target else {
        return;
    };
    let Some(body) = heap.get_mut(id) else {
        return;
    };
    if let Some(cb) = body.collided.as_mut() {
        if catch_unwind(AssertUnwindSafe(|| cb(other))).is_err() {
            log::error!("collided callback for body {id:?} panicked; continuing step");
        }
    }
}

fn fire_separated(heap: &mut BodyHeap, target: ColliderId) {
    let ColliderId::Body(id) = target else {
        return;
    };
    let Some(body) = heap.get_mut(id) else {
        return;
    };
    if let Some(cb) = body.separated.as_mut() {
        if catch_unwind(AssertUnwindSafe(|| cb())).is_err() {
            log::error!("separated callback for body {id:?} panicked; continuing step");
        }
    }
}

/// Velocity of a body at a point offset `r` from its centroid.
#[inline]
fn point_velocity(vel: Vec2, angular_vel: f64, r: Vec2) -> Vec2 {
    vel + Vec2::cross_scalar_vec(angular_vel, r)
}

fn resolve_body_pair(a: &mut Body, b: &mut Body, m: &Manifold) {
    let total_inv = a.inv_mass + b.inv_mass;
    if total_inv > 0.0 {
        let correction = m.normal * m.penetration;
        let share_a = a.inv_mass / total_inv;
        let share_b = b.inv_mass / total_inv;
        if share_a > 0.0 {
            a.translate(correction * -share_a);
        }
        if share_b > 0.0 {
            b.translate(correction * share_b);
        }
    }

    let e = a.restitution.min(b.restitution);
    let mu = (a.friction * b.friction).sqrt();
    let count = m.contact_count as f64;
    let n = m.normal;

    for &p in m.contact_points() {
        let ra = p - a.centroid;
        let rb = p - b.centroid;

        let vrel = point_velocity(b.vel, b.angular_vel, rb)
            - point_velocity(a.vel, a.angular_vel, ra);
        let vn = vrel.dot(n);
        if vn > 0.0 {
            continue;
        }

        let ran = ra.cross(n);
        let rbn = rb.cross(n);
        let k = a.inv_mass + b.inv_mass + ran * ran * a.inv_inertia + rbn * rbn * b.inv_inertia;
        if k <= 0.0 {
            continue;
        }

        let j = -(1.0 + e) * vn / k / count;
        let impulse = n * j;

        a.vel -= impulse * a.inv_mass;
        a.angular_vel -= a.inv_inertia * ra.cross(impulse);
        b.vel += impulse * b.inv_mass;
        b.angular_vel += b.inv_inertia * rb.cross(impulse);

        // Friction against the post-impulse relative velocity.
        let vrel = point_velocity(b.vel, b.angular_vel, rb)
            - point_velocity(a.vel, a.angular_vel, ra);
        let Some(tangent) = (vrel - n * vrel.dot(n)).try_normalize() else {
            continue;
        };

        let max_jt = mu * j.abs();
        let jt = (-vrel.dot(tangent) / k / count).clamp(-max_jt, max_jt);
        let friction = tangent * jt;

        a.vel -= friction * a.inv_mass;
        a.angular_vel -= a.inv_inertia * ra.cross(friction);
        b.vel += friction * b.inv_mass;
        b.angular_vel += b.inv_inertia * rb.cross(friction);
    }
}

/// Boundary side: infinite mass at rest, mirroring the body's material so
/// restitution and friction come out as the body's own coefficients.
fn resolve_boundary_contact(body: &mut Body, m: &Manifold) {
    if body.inv_mass > 0.0 {
        body.translate(m.normal * -m.penetration);
    }

    let e = body.restitution;
    let mu = body.friction;
    let count = m.contact_count as f64;
    let n = m.normal;

    for &p in m.contact_points() {
        let ra = p - body.centroid;

        let vrel = -point_velocity(body.vel, body.angular_vel, ra);
        let vn = vrel.dot(n);
        if vn > 0.0 {
            continue;
        }

        let ran = ra.cross(n);
        let k = body.inv_mass + ran * ran * body.inv_inertia;
        if k <= 0.0 {
            continue;
        }

        let j = -(1.0 + e) * vn / k / count;
        let impulse = n * j;

        body.vel -= impulse * body.inv_mass;
        body.angular_vel -= body.inv_inertia * ra.cross(impulse);

        let vrel = -point_velocity(body.vel, body.angular_vel, ra);
        let Some(tangent) = (vrel - n * vrel.dot(n)).try_normalize() else {
            continue;
        };

        let max_jt = mu * j.abs();
        let jt = (-vrel.dot(tangent) / k / count).clamp(-max_jt, max_jt);
        let friction = tangent * jt;

        body.vel -= friction * body.inv_mass;
        body.angular_vel -= body.inv_inertia * ra.cross(friction);
    }
}
