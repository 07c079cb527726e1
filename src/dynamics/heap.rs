//! Insertion-ordered storage for live dynamic bodies. Iteration order is
//! stable within a step, which keeps callback ordering reproducible.

use crate::dynamics::body::{Body, BodyId, BodyState};

#[derive(Default)]
pub struct BodyHeap {
    bodies: Vec<Body>,
}

impl BodyHeap {
    pub fn new() -> Self {
        Self { bodies: Vec::new() }
    }

    /// Admits a body. First insertion of an `Init` body computes its world
    /// data and mass data, then moves it to `Simulate`.
    pub fn append(&mut self, mut body: Body) -> BodyId {
        if body.state == BodyState::Init {
            body.init_body_data();
            body.set_mass_data();
            body.state = BodyState::Simulate;
        }
        let id = body.id;
        self.bodies.push(body);
        id
    }

    /// Removes a body by id. O(n); in-flight contacts referencing it are
    /// transient and simply omitted next step.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let idx = self.bodies.iter().position(|b| b.id == id)?;
        Some(self.bodies.remove(idx))
    }

    /// The live sequence, in insertion order.
    pub fn heap(&self) -> &[Body] {
        &self.bodies
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.iter_mut()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    /// Split mutable borrow of two distinct bodies, for pairwise resolution.
    pub fn two_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut Body, &mut Body)> {
        debug_assert_ne!(a, b);
        let ia = self.bodies.iter().position(|x| x.id == a)?;
        let ib = self.bodies.iter().position(|x| x.id == b)?;
        if ia < ib {
            let (lo, hi) = self.bodies.split_at_mut(ib);
            Some((&mut lo[ia], &mut hi[0]))
        } else {
            let (lo, hi) = self.bodies.split_at_mut(ia);
            Some((&mut hi[0], &mut lo[ib]))
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::body::{BodyDef, Nature};
    use crate::dynamics::shape::ShapeDef;
    use crate::math::Vec2;

    fn make(id: u64, x: f64) -> Body {
        Body::from_def(
            BodyDef::with_nature(
                ShapeDef::Circle {
                    center: Vec2::new(x, 0.0),
                    radius: 1.0,
                },
                Nature::default(),
            ),
            BodyId(id),
        )
        .unwrap()
    }

    #[test]
    fn append_initializes_and_simulates() {
        let mut heap = BodyHeap::new();
        let id = heap.append(make(1, 0.0));
        let body = heap.get(id).unwrap();
        assert_eq!(body.state, BodyState::Simulate);
        assert!(body.mass > 0.0);
        assert!(body.bound_rect.is_valid());
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut heap = BodyHeap::new();
        for i in 0..5 {
            heap.append(make(i, i as f64));
        }
        let ids: Vec<u64> = heap.heap().iter().map(|b| b.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn remove_drops_only_the_target() {
        let mut heap = BodyHeap::new();
        for i in 0..3 {
            heap.append(make(i, 0.0));
        }
        assert!(heap.remove(BodyId(1)).is_some());
        assert!(heap.remove(BodyId(1)).is_none());
        assert_eq!(heap.len(), 2);
        assert!(heap.get(BodyId(0)).is_some());
        assert!(heap.get(BodyId(2)).is_some());
    }

    #[test]
    fn two_mut_splits_in_either_order() {
        let mut heap = BodyHeap::new();
        heap.append(make(1, 0.0));
        heap.append(make(2, 10.0));

        let (a, b) = heap.two_mut(BodyId(2), BodyId(1)).unwrap();
        assert_eq!(a.id, BodyId(2));
        assert_eq!(b.id, BodyId(1));
        a.vel.x = 1.0;
        b.vel.x = -1.0;

        assert!(heap.two_mut(BodyId(1), BodyId(9)).is_none());
    }
}
