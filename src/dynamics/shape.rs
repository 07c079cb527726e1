//! Shape variants and their mass-data math. Polygonal variants keep their
//! vertex loop in the local frame, centered on the centroid, positively
//! wound; world-frame vertices are rebuilt from position and orientation.

use crate::error::ConfigError;
use crate::math::{Mat22, Vec2};

/// Geometry half of a body definition, in world coordinates.
#[derive(Clone, Debug)]
pub enum ShapeDef {
    Circle { center: Vec2, radius: f64 },
    Rect { pos: Vec2, width: f64, height: f64 },
    Triangle { points: [Vec2; 3] },
    Polygon { points: Vec<Vec2> },
}

/// Internal shape storage after validation and recentering.
#[derive(Clone, Debug)]
pub enum Shape {
    Circle {
        radius: f64,
    },
    Rectangle {
        width: f64,
        height: f64,
        local: [Vec2; 4],
    },
    Triangle {
        local: [Vec2; 3],
    },
    Polygon {
        local: Vec<Vec2>,
    },
}

/// Signed area of a vertex loop (shoelace). Positive for the winding the
/// narrow phase expects.
pub(crate) fn polygon_area(points: &[Vec2]) -> f64 {
    let mut twice = 0.0;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        twice += points[i].cross(points[j]);
    }
    0.5 * twice
}

/// Area-weighted centroid of a positively wound loop.
pub(crate) fn polygon_centroid(points: &[Vec2]) -> Vec2 {
    let mut center = Vec2::ZERO;
    let mut area = 0.0;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        let cross = points[i].cross(points[j]);
        area += 0.5 * cross;
        center += (points[i] + points[j]) * (cross / 6.0);
    }
    center / area
}

/// Second moment of area about the origin by signed-triangle decomposition.
/// Multiply by density to get the rotation inertia.
fn polygon_second_moment(points: &[Vec2]) -> f64 {
    let mut moment = 0.0;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        let p1 = points[i];
        let p2 = points[j];
        let cross = p1.cross(p2);
        let intx2 = p1.x * p1.x + p2.x * p1.x + p2.x * p2.x;
        let inty2 = p1.y * p1.y + p2.y * p1.y + p2.y * p2.y;
        moment += (cross / 12.0) * (intx2 + inty2);
    }
    moment
}

fn validated_loop(mut points: Vec<Vec2>) -> Result<(Vec<Vec2>, Vec2), ConfigError> {
    if points.len() < 3 {
        return Err(ConfigError::TooFewVertices {
            count: points.len(),
        });
    }
    if points.iter().any(|p| !p.is_finite()) {
        return Err(ConfigError::NonFiniteGeometry);
    }

    let signed = polygon_area(&points);
    if signed < 0.0 {
        points.reverse();
    }
    let area = signed.abs();
    if area <= f64::EPSILON {
        return Err(ConfigError::DegenerateArea { area: signed });
    }

    let centroid = polygon_centroid(&points);
    for p in &mut points {
        *p -= centroid;
    }
    Ok((points, centroid))
}

impl ShapeDef {
    /// Validates the definition and splits it into local-frame shape data
    /// and the body's initial world position (the shape centroid).
    pub(crate) fn build(self) -> Result<(Shape, Vec2), ConfigError> {
        match self {
            ShapeDef::Circle { center, radius } => {
                if !center.is_finite() || !radius.is_finite() {
                    return Err(ConfigError::NonFiniteGeometry);
                }
                if radius <= 0.0 {
                    return Err(ConfigError::DegenerateArea {
                        area: radius * radius,
                    });
                }
                Ok((Shape::Circle { radius }, center))
            }
            ShapeDef::Rect { pos, width, height } => {
                if !pos.is_finite() || !width.is_finite() || !height.is_finite() {
                    return Err(ConfigError::NonFiniteGeometry);
                }
                if width <= 0.0 || height <= 0.0 {
                    return Err(ConfigError::DegenerateArea {
                        area: width * height,
                    });
                }
                let hw = 0.5 * width;
                let hh = 0.5 * height;
                let local = [
                    Vec2::new(-hw, -hh),
                    Vec2::new(hw, -hh),
                    Vec2::new(hw, hh),
                    Vec2::new(-hw, hh),
                ];
                Ok((
                    Shape::Rectangle {
                        width,
                        height,
                        local,
                    },
                    pos,
                ))
            }
            ShapeDef::Triangle { points } => {
                let (local, centroid) = validated_loop(points.to_vec())?;
                let local = [local[0], local[1], local[2]];
                Ok((Shape::Triangle { local }, centroid))
            }
            ShapeDef::Polygon { points } => {
                let (local, centroid) = validated_loop(points)?;
                Ok((Shape::Polygon { local }, centroid))
            }
        }
    }
}

impl Shape {
    pub fn calc_area(&self) -> f64 {
        match self {
            Shape::Circle { radius } => core::f64::consts::PI * radius * radius,
            Shape::Rectangle { width, height, .. } => width * height,
            Shape::Triangle { local } => polygon_area(local),
            Shape::Polygon { local } => polygon_area(local),
        }
    }

    /// Rotation inertia about the centroid for the given mass.
    pub fn calc_rotation_inertia(&self, mass: f64) -> f64 {
        match self {
            Shape::Circle { radius } => 0.5 * mass * radius * radius,
            Shape::Rectangle { width, height, .. } => {
                mass * (width * width + height * height) / 12.0
            }
            Shape::Triangle { local } => {
                mass / polygon_area(local) * polygon_second_moment(local)
            }
            Shape::Polygon { local } => mass / polygon_area(local) * polygon_second_moment(local),
        }
    }

    /// Local-frame vertex loop. Empty for circles.
    pub fn local_vertices(&self) -> &[Vec2] {
        match self {
            Shape::Circle { .. } => &[],
            Shape::Rectangle { local, .. } => local,
            Shape::Triangle { local } => local,
            Shape::Polygon { local } => local,
        }
    }

    pub fn radius(&self) -> Option<f64> {
        match self {
            Shape::Circle { radius } => Some(*radius),
            _ => None,
        }
    }

    /// Rebuilds the world-frame vertex loop for the given pose.
    pub(crate) fn world_vertices(&self, pos: Vec2, rot_deg: f64, out: &mut Vec<Vec2>) {
        out.clear();
        let local = self.local_vertices();
        if local.is_empty() {
            return;
        }
        let rot = Mat22::from_degrees(rot_deg);
        out.extend(local.iter().map(|&v| pos + rot * v));
    }
}
