use lander::{
    App, Craft, FlightController, FlightState, Input, KinematicBody, Landing, Settings, Terrain,
    TerrainSettings, Vec2,
};
use rand::{rngs::StdRng, SeedableRng};

const DT: f64 = 1. / 60.;

fn seeded_app(seed: u64) -> App {
    App::try_new(Settings {
        terrain: TerrainSettings::default()
            .with_width(5000.)
            .with_max_relief(300.)
            .with_seed(seed),
        ..Settings::default()
    })
    .unwrap()
}

#[test]
fn generated_terrain_is_monotonic() {
    for seed in 0..20 {
        let terrain = Terrain::generate(5000., 300., seed);
        let points = terrain.points();
        assert_eq!(points[0], Vec2::ZERO);
        assert!(points.windows(2).all(|w| w[0].x < w[1].x));
        assert_eq!(terrain.width(), 5000.);
    }
}

#[test]
fn drop_lands_on_a_pad() {
    for seed in 0..10 {
        let app = seeded_app(seed);
        let snapshot = app.snapshot();
        assert_eq!(snapshot.state, FlightState::Landed);
        let x = snapshot.position.x;
        assert!((625.0..=4375.0).contains(&x));
        assert!(app.controller().terrain().is_level(x - 10., x + 10.));
    }
}

#[test]
fn free_fall_onto_slope_crashes() {
    let terrain = Terrain::generate(5000., 300., 3);
    let slope = terrain
        .segments()
        .find(|s| !s.is_flat() && s.left.x > 100.)
        .unwrap();
    let x = slope.left.midpoint(slope.right).x;
    let start = Vec2::new(x, terrain.height_at(x) + 500.);
    let mut controller = FlightController::new(terrain, StdRng::seed_from_u64(1))
        .with_craft(Craft::default().with_position(start), FlightState::Flying);

    let mut verdict = None;
    for i in 1..2000 {
        verdict = controller.tick(DT, i as f64 * DT);
        if verdict.is_some() {
            break;
        }
    }
    assert!(matches!(verdict, Some(Landing::TooFastVertical { .. })));
    assert_eq!(controller.state(), FlightState::Destroyed);
    assert_eq!(controller.crashes(), 1);
    assert_eq!(controller.fragments().len(), 4);
}

#[test]
fn hover_and_descend_onto_pad() {
    let mut app = seeded_app(21);
    let start = app.snapshot();
    let mut burned = 0.;
    let mut descending = false;
    let mut verdict = None;

    for _ in 0..10_000 {
        let snapshot = app.snapshot();
        if snapshot.position.y > start.position.y + 150. {
            descending = true;
        }
        let target_vy = if descending { -0.5 } else { 1. };
        let acceleration = 0.025 + 0.1 * (target_vy - snapshot.velocity.y);
        let thrust = (acceleration * (1000. + snapshot.fuel) / 50.).max(0.);
        app.apply(Input::Thrust(thrust)).unwrap();

        burned += app.controller().craft().thrust() * 10. * DT;
        verdict = app.tick(DT);
        if descending && verdict.is_some() {
            break;
        }
    }

    let snapshot = app.snapshot();
    assert_eq!(verdict, Some(Landing::Correct { credited: true }));
    assert_eq!(snapshot.state, FlightState::Landed);
    assert_eq!(snapshot.landings, 1);
    assert_eq!(snapshot.crashes, 0);
    assert!((snapshot.position.x - start.position.x).abs() < 1e-9);
    assert!((start.fuel - snapshot.fuel - burned).abs() < 1e-6);
}

#[test]
fn reset_after_crash_restores_flight() {
    let mut app = seeded_app(4);
    app.apply(Input::Thrust(10.)).unwrap();
    for _ in 0..120 {
        app.tick(DT);
    }
    assert_eq!(app.snapshot().state, FlightState::Flying);
    app.apply(Input::ReleaseThrust).unwrap();
    for _ in 0..5000 {
        app.tick(DT);
        if app.snapshot().state == FlightState::Destroyed {
            break;
        }
    }
    assert_eq!(app.snapshot().state, FlightState::Destroyed);
    assert!(!app.snapshot().fragments.is_empty());

    app.apply(Input::ResetFlight).unwrap();
    let snapshot = app.snapshot();
    assert_eq!(snapshot.state, FlightState::Landed);
    assert!(snapshot.fragments.is_empty());
    assert_eq!(snapshot.thrust, 0.);
    assert_eq!(snapshot.crashes, 1);
}

#[test]
fn spin_decays_geometrically() {
    let mut body = KinematicBody::at(Vec2::new(0., 100.)).with_angular_velocity(0.1);
    for _ in 0..500 {
        body.update(DT);
    }
    let expected = 0.1 * 0.98 * (1. - 0.98f64.powi(500)) / 0.02;
    assert!((body.rotation() - expected).abs() < 1e-9);
}
