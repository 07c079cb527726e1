use crate::dynamics::ColliderId;
use crate::math::Vec2;

/// Contact description between two colliders for one step. The normal is a
/// unit vector pointing from `a` to `b`; penetration is strictly positive.
#[derive(Copy, Clone, Debug)]
pub struct Manifold {
    pub a: ColliderId,
    pub b: ColliderId,
    pub normal: Vec2,
    pub penetration: f64,
    pub contacts: [Vec2; 2],
    pub contact_count: usize,
}

impl Manifold {
    pub fn contact_points(&self) -> &[Vec2] {
        &self.contacts[..self.contact_count]
    }
}

/// Narrow-phase output before collider ids are attached.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ContactData {
    pub normal: Vec2,
    pub penetration: f64,
    pub contacts: [Vec2; 2],
    pub contact_count: usize,
}

impl ContactData {
    pub(crate) fn single(normal: Vec2, penetration: f64, contact: Vec2) -> Self {
        Self {
            normal,
            penetration,
            contacts: [contact, Vec2::ZERO],
            contact_count: 1,
        }
    }

    pub(crate) fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }

    pub(crate) fn into_manifold(self, a: ColliderId, b: ColliderId) -> Manifold {
        Manifold {
            a,
            b,
            normal: self.normal,
            penetration: self.penetration,
            contacts: self.contacts,
            contact_count: self.contact_count,
        }
    }
}
