//! Interactive sandbox: a boxed-in world with a seeded pile of mixed
//! shapes. Click to drop a ball, press R to rebuild the scene, Space to
//! pause and resume the clock.

use macroquad::prelude::*;
use ::rand::rngs::ThreadRng;
use ::rand::thread_rng;

use pulse2d::dynamics::Nature;
use pulse2d::math::utils::random_range;
use pulse2d::{BodyDef, BodyState, BoundaryEdge, ShapeDef, StaticKind, Vec2, World, WorldConfig};
use pulse2d::dynamics::Shape;

const WORLD_W: f64 = 800.0;
const WORLD_H: f64 = 600.0;

fn build_world(rng: &mut ThreadRng) -> World {
    let mut world = World::new((WORLD_W, WORLD_H), WorldConfig::default());
    for edge in [
        BoundaryEdge::Top,
        BoundaryEdge::Right,
        BoundaryEdge::Bottom,
        BoundaryEdge::Left,
    ] {
        world.append_boundary(edge);
    }

    // A fixed platform to stack onto.
    world
        .append(BodyDef::with_nature(
            ShapeDef::Rect {
                pos: Vec2::new(400.0, 450.0),
                width: 360.0,
                height: 24.0,
            },
            Nature {
                statics: StaticKind::Total,
                restitution: 0.2,
                ..Nature::default()
            },
        ))
        .expect("platform definition is valid");

    // Randomized stacking, one column of slightly jittered boxes.
    for i in 0..6 {
        let jitter = random_range(rng, -8.0, 8.0);
        world
            .append(BodyDef::with_nature(
                ShapeDef::Rect {
                    pos: Vec2::new(400.0 + jitter, 410.0 - 30.0 * i as f64),
                    width: random_range(rng, 30.0, 60.0),
                    height: 24.0,
                },
                Nature {
                    restitution: 0.1,
                    friction: 0.4,
                    ..Nature::default()
                },
            ))
            .expect("box definition is valid");
    }

    // A couple of triangles rolling in from the sides.
    for (x, vx) in [(80.0, 4.0), (720.0, -4.0)] {
        world
            .append(BodyDef::with_nature(
                ShapeDef::Triangle {
                    points: [
                        Vec2::new(x - 20.0, 200.0),
                        Vec2::new(x + 20.0, 200.0),
                        Vec2::new(x, 164.0),
                    ],
                },
                Nature {
                    linear_velocity: Vec2::new(vx, 0.0),
                    restitution: 0.4,
                    ..Nature::default()
                },
            ))
            .expect("triangle definition is valid");
    }

    world.start();
    world
}

fn drop_ball(world: &mut World, rng: &mut ThreadRng, x: f64, y: f64) {
    let def = BodyDef::with_nature(
        ShapeDef::Circle {
            center: Vec2::new(x, y),
            radius: random_range(rng, 6.0, 16.0),
        },
        Nature {
            restitution: 0.6,
            friction: 0.1,
            ..Nature::default()
        },
    );
    if world.append(def).is_err() {
        log::warn!("ball rejected");
    }
}

fn draw_world(world: &World) {
    for body in world.bodies() {
        let color = match body.state {
            BodyState::Sleep => GRAY,
            _ if body.is_collide => ORANGE,
            _ => SKYBLUE,
        };

        match &body.shape {
            Shape::Circle { radius } => {
                draw_circle_lines(body.pos.x as f32, body.pos.y as f32, *radius as f32, 1.5, color);
                // Orientation tick so spin is visible.
                let rot = pulse2d::math::Mat22::from_degrees(body.rot);
                let tip = body.pos + rot * Vec2::new(*radius, 0.0);
                draw_line(
                    body.pos.x as f32,
                    body.pos.y as f32,
                    tip.x as f32,
                    tip.y as f32,
                    1.0,
                    color,
                );
            }
            _ => {
                let verts = &body.world_verts;
                for i in 0..verts.len() {
                    let a = verts[i];
                    let b = verts[(i + 1) % verts.len()];
                    draw_line(a.x as f32, a.y as f32, b.x as f32, b.y as f32, 1.5, color);
                }
            }
        }
    }
}

#[macroquad::main("pulse2d sandbox")]
async fn main() {
    let mut rng = thread_rng();
    let mut world = build_world(&mut rng);

    loop {
        if is_key_pressed(KeyCode::R) {
            world = build_world(&mut rng);
        }
        if is_key_pressed(KeyCode::Space) {
            if world.is_running() {
                world.pause();
            } else {
                world.start();
            }
        }
        if is_mouse_button_pressed(MouseButton::Left) {
            let (mx, my) = mouse_position();
            drop_ball(&mut world, &mut rng, mx as f64, my as f64);
        }

        world.tick();

        clear_background(BLACK);
        draw_world(&world);
        draw_text(
            &format!(
                "bodies: {}  step: {}  [click] drop  [space] pause  [r] reset",
                world.body_count(),
                world.step_count()
            ),
            12.0,
            20.0,
            20.0,
            LIGHTGRAY,
        );

        next_frame().await
    }
}
