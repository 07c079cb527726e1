use approx::assert_relative_eq;

use pulse2d::dynamics::Nature;
use pulse2d::{BodyDef, BoundaryEdge, ShapeDef, StaticKind, Vec2, World, WorldConfig};

fn no_forces() -> WorldConfig {
    WorldConfig {
        gravity: Vec2::ZERO,
        linear_drag: Vec2::ZERO,
        angular_drag: 0.0,
    }
}

fn gravity_only() -> WorldConfig {
    WorldConfig {
        gravity: Vec2::new(0.0, 5.0),
        linear_drag: Vec2::ZERO,
        angular_drag: 0.0,
    }
}

fn elastic_ball(x: f64, y: f64, vx: f64) -> BodyDef {
    BodyDef::with_nature(
        ShapeDef::Circle {
            center: Vec2::new(x, y),
            radius: 10.0,
        },
        Nature {
            mass: Some(1.0),
            linear_velocity: Vec2::new(vx, 0.0),
            friction: 0.0,
            restitution: 1.0,
            ..Nature::default()
        },
    )
}

#[test]
fn integration_head_on_elastic_collision_swaps_velocities() {
    let mut world = World::new((800.0, 600.0), no_forces());
    let a = world.append(elastic_ball(100.0, 300.0, 5.0)).unwrap();
    let b = world.append(elastic_ball(200.0, 300.0, -5.0)).unwrap();

    world.start();
    for _ in 0..12 {
        world.tick();
    }

    let va = world.body(a).unwrap().vel;
    let vb = world.body(b).unwrap().vel;
    assert_relative_eq!(va.x, -5.0, max_relative = 0.01);
    assert_relative_eq!(vb.x, 5.0, max_relative = 0.01);
    assert_relative_eq!(va.y, 0.0, epsilon = 1e-9);
    assert_relative_eq!(vb.y, 0.0, epsilon = 1e-9);
}

#[test]
fn integration_floor_bounce_preserves_impact_speed() {
    let mut world = World::new((800.0, 600.0), gravity_only());
    world.append_boundary(BoundaryEdge::Bottom);
    let id = world.append(elastic_ball(400.0, 500.0, 0.0)).unwrap();

    world.start();

    let mut prev_vy = 0.0;
    let mut bounced = false;
    for _ in 0..40 {
        world.tick();
        let vy = world.body(id).unwrap().vel.y;
        if vy < 0.0 {
            // Impact velocity is last step's velocity plus this step's
            // gravity increment; restitution 1 must mirror it.
            let expected = prev_vy + 5.0;
            assert_relative_eq!(-vy, expected, max_relative = 0.01);
            bounced = true;
            break;
        }
        prev_vy = vy;
    }
    assert!(bounced, "ball never reached the floor");
}

#[test]
fn integration_resting_contact_converges_to_floor() {
    let mut world = World::new((800.0, 600.0), gravity_only());
    world.append_boundary(BoundaryEdge::Bottom);
    let id = world
        .append(BodyDef::with_nature(
            ShapeDef::Circle {
                center: Vec2::new(400.0, 500.0),
                radius: 10.0,
            },
            Nature {
                mass: Some(1.0),
                friction: 0.0,
                restitution: 0.0,
                ..Nature::default()
            },
        ))
        .unwrap();

    world.start();
    for _ in 0..120 {
        world.tick();
    }

    // Penetration below the floor line stays under epsilon.
    let body = world.body(id).unwrap();
    let penetration = (body.pos.y + 10.0) - 600.0;
    assert!(
        penetration < 1e-6,
        "resting penetration too deep: {penetration}"
    );
    assert!(body.pos.y > 589.0);
}

#[test]
fn integration_side_walls_contain_a_ball() {
    let mut world = World::new((800.0, 600.0), no_forces());
    world.append_boundary(BoundaryEdge::Left);
    world.append_boundary(BoundaryEdge::Right);
    let id = world.append(elastic_ball(400.0, 300.0, 45.0)).unwrap();

    world.start();
    for _ in 0..200 {
        world.tick();
        let body = world.body(id).unwrap();
        assert!(body.pos.x >= 10.0 - 1e-9);
        assert!(body.pos.x <= 790.0 + 1e-9);
        assert_relative_eq!(body.vel.x.abs(), 45.0, epsilon = 1e-9);
    }
}

#[test]
fn integration_circle_settles_on_static_platform() {
    let mut world = World::new((800.0, 600.0), gravity_only());
    world
        .append(BodyDef::with_nature(
            ShapeDef::Rect {
                pos: Vec2::new(400.0, 500.0),
                width: 200.0,
                height: 20.0,
            },
            Nature {
                statics: StaticKind::Total,
                restitution: 0.0,
                ..Nature::default()
            },
        ))
        .unwrap();
    let ball = world
        .append(BodyDef::with_nature(
            ShapeDef::Circle {
                center: Vec2::new(400.0, 460.0),
                radius: 10.0,
            },
            Nature {
                mass: Some(1.0),
                friction: 0.0,
                restitution: 0.0,
                ..Nature::default()
            },
        ))
        .unwrap();

    world.start();
    for _ in 0..120 {
        world.tick();
    }

    // Resting on the platform's top face at y = 490, center 10 above.
    let body = world.body(ball).unwrap();
    assert_relative_eq!(body.pos.x, 400.0, epsilon = 1e-6);
    assert!((body.pos.y - 480.0).abs() < 1.0, "pos.y = {}", body.pos.y);
}

#[test]
fn integration_rect_stack_two_point_contacts_keep_it_level() {
    let mut world = World::new((800.0, 600.0), gravity_only());
    world.append_boundary(BoundaryEdge::Bottom);
    let id = world
        .append(BodyDef::with_nature(
            ShapeDef::Rect {
                pos: Vec2::new(400.0, 580.0),
                width: 50.0,
                height: 20.0,
            },
            Nature {
                restitution: 0.0,
                ..Nature::default()
            },
        ))
        .unwrap();

    world.start();
    for _ in 0..60 {
        world.tick();
    }

    // Two-point contacts resolved in one pass leave only tiny residuals:
    // the rect must end level on the floor line, not tipped or drifted.
    let body = world.body(id).unwrap();
    assert!((body.pos.x - 400.0).abs() < 1.0, "x drift: {}", body.pos.x);
    assert!((body.pos.y - 590.0).abs() < 0.5, "pos.y = {}", body.pos.y);
    let tilt = body.rot.min(360.0 - body.rot);
    assert!(tilt < 2.0, "tilt = {tilt}");
}

#[test]
fn integration_removed_body_stops_colliding() {
    let mut world = World::new((800.0, 600.0), no_forces());
    let a = world.append(elastic_ball(100.0, 300.0, 0.0)).unwrap();
    let b = world.append(elastic_ball(112.0, 300.0, 0.0)).unwrap();

    world.start();
    world.tick();
    assert!(world.body(a).unwrap().is_collide);

    assert!(world.remove(b));
    assert_eq!(world.body(b).map(|_| ()), None);
    world.tick();
    assert!(!world.body(a).unwrap().is_collide);
}
