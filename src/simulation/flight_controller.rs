use std::collections::HashSet;

use rand::{rngs::StdRng, Rng};

use super::craft::FlightState;
use super::signals::{Shot, Signal, ThrustSound};
use super::{Craft, Fragment, Terrain, Vec2};
use crate::error::Error;

pub(crate) mod defaults {
    /// Approximates the craft's radius above the ground line.
    pub const CLEARANCE: f64 = 20.;
    pub const PAD_HALF_SPAN: f64 = 10.;
    pub const MAX_VERTICAL_SPEED: f64 = 1.0;
    pub const MAX_HORIZONTAL_SPEED: f64 = 0.30;
    /// Climb above the touchdown height needed before a landing is credited.
    pub const REAL_FLIGHT_MARGIN: f64 = 20.;
    pub const DROP_ATTEMPTS: usize = 10_000;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Landing {
    Correct { credited: bool },
    WrongTerrain,
    TooFastVertical { speed: f64 },
    TooFastHorizontal { speed: f64 },
}

impl Landing {
    pub fn is_hot(&self) -> bool {
        !matches!(self, Landing::Correct { .. })
    }
}

fn judge(velocity: Vec2, level: bool) -> Landing {
    if velocity.y.abs() > defaults::MAX_VERTICAL_SPEED {
        Landing::TooFastVertical {
            speed: velocity.y.abs(),
        }
    } else if velocity.x.abs() > defaults::MAX_HORIZONTAL_SPEED {
        Landing::TooFastHorizontal {
            speed: velocity.x.abs(),
        }
    } else if !level {
        Landing::WrongTerrain
    } else {
        Landing::Correct { credited: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Drop,
    Land,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightEvent {
    pub timestamp: f64,
    pub left: Vec2,
    pub right: Vec2,
    pub kind: EventKind,
}

/// Owns one craft over one terrain and judges every ground contact.
pub struct FlightController {
    craft: Craft,
    terrain: Terrain,
    state: FlightState,
    fragments: Vec<Fragment>,
    events: Vec<FlightEvent>,
    credited_segments: HashSet<usize>,
    landings: usize,
    crashes: usize,
    hot: bool,
    status: String,
    sound: ThrustSound,
    signals: Vec<Signal>,
    rng: StdRng,
    time: f64,
}

impl FlightController {
    pub fn new(terrain: Terrain, rng: StdRng) -> Self {
        Self {
            craft: Craft::default(),
            terrain,
            state: FlightState::Flying,
            fragments: Vec::new(),
            events: Vec::new(),
            credited_segments: HashSet::new(),
            landings: 0,
            crashes: 0,
            hot: false,
            status: String::new(),
            sound: ThrustSound::default(),
            signals: Vec::new(),
            rng,
            time: 0.,
        }
    }

    pub fn with_craft(self, craft: Craft, state: FlightState) -> Self {
        Self {
            craft,
            state,
            ..self
        }
    }

    /// Advances fragments and, unless destroyed, the craft by one tick.
    /// Returns the verdict when the craft touched down during this tick.
    pub fn tick(&mut self, dt: f64, t: f64) -> Option<Landing> {
        self.time = t;
        self.update_fragments(dt);

        if self.state == FlightState::Destroyed {
            self.advance_sound(dt);
            return None;
        }

        self.craft.update(dt);
        let intensity = self.craft.thrust_intensity();
        self.follow_thrust(intensity);
        self.advance_sound(dt);

        let position = self.craft.position();
        let ground = self.terrain.height_at(position.x) + defaults::CLEARANCE;
        match self.state {
            FlightState::Landed => {
                if self.terrain.is_above_ground(position, defaults::CLEARANCE) {
                    log::debug!("Lift-off at ({:.1}, {:.1})", position.x, position.y);
                    self.state = FlightState::Flying;
                    self.status.clear();
                } else {
                    let body = self.craft.body_mut();
                    body.set_altitude(ground);
                    body.reset();
                }
                None
            }
            FlightState::Flying => {
                let level = self.terrain.is_level(
                    position.x - defaults::PAD_HALF_SPAN,
                    position.x + defaults::PAD_HALF_SPAN,
                );
                let velocity = self.craft.velocity();
                let verdict = judge(velocity, level);
                self.hot = verdict.is_hot();

                if self.terrain.is_above_ground(position, defaults::CLEARANCE) || velocity.y >= 0. {
                    return None;
                }

                self.status = format!("vx:{:4.2} vy:{:4.2} l:{}", velocity.x, velocity.y, level);
                let verdict = match verdict {
                    Landing::Correct { .. } => Landing::Correct {
                        credited: self.land(),
                    },
                    other => {
                        self.crash();
                        other
                    }
                };
                self.craft.body_mut().set_altitude(ground);
                if self.state == FlightState::Landed {
                    self.craft.mark_altitude();
                }
                Some(verdict)
            }
            FlightState::Destroyed => None,
        }
    }

    /// Places the craft on a random pad inside the middle three quarters.
    pub fn drop_ship(&mut self, width: f64) -> Result<(), Error> {
        if !(width > 0.) {
            return Err(Error::Config(format!("drop width ({width}) must be positive")));
        }
        let (low, high) = (width / 8., width * 7. / 8.);
        for _ in 0..defaults::DROP_ATTEMPTS {
            let x = self.rng.gen_range(low..=high);
            let Some(segment) = self.terrain.segment_at(x).filter(|_| {
                self.terrain
                    .is_level(x - defaults::PAD_HALF_SPAN, x + defaults::PAD_HALF_SPAN)
            }) else {
                continue;
            };
            let y = self.terrain.height_at(x);
            self.craft.body_mut().place(Vec2::new(x, y));
            self.craft.mark_altitude();
            self.state = FlightState::Landed;
            self.events.push(FlightEvent {
                timestamp: self.time,
                left: segment.left,
                right: segment.right,
                kind: EventKind::Drop,
            });
            log::info!("Dropped at ({x:.1}, {y:.1})");
            return Ok(());
        }
        Err(Error::NoLandingPad {
            attempts: defaults::DROP_ATTEMPTS,
        })
    }

    pub fn reset_flight(&mut self) -> Result<(), Error> {
        self.craft.refit();
        self.fragments.clear();
        self.status.clear();
        self.hot = false;
        self.follow_thrust(0.);
        let width = self.terrain.width();
        self.drop_ship(width)?;
        log::info!("Flight reset, fuel {:.0}", self.craft.fuel());
        Ok(())
    }

    pub fn set_thrust(&mut self, level: f64) {
        if self.state == FlightState::Destroyed {
            return;
        }
        let intensity = self.craft.set_thrust(level);
        self.follow_thrust(intensity);
    }

    pub fn release_thrust(&mut self) {
        if self.state != FlightState::Destroyed {
            self.craft.release_thrust();
        }
    }

    pub fn set_rotation_rate(&mut self, level: f64) {
        if self.state != FlightState::Destroyed {
            self.craft.set_rotation_rate(level);
        }
    }

    pub fn add_fuel(&mut self, amount: f64) {
        self.craft.add_fuel(amount);
        log::debug!("Fuel added: {amount:.0}, now {:.0}", self.craft.fuel());
    }

    pub fn fire(&mut self) -> Option<Shot> {
        if self.state == FlightState::Destroyed {
            return None;
        }
        let shot = Shot::from_nose(self.craft.position(), self.craft.rotation());
        self.signals.push(Signal::FireTriggered(shot));
        Some(shot)
    }

    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    fn land(&mut self) -> bool {
        self.state = FlightState::Landed;
        let position = self.craft.position();
        let velocity = self.craft.velocity();
        let real_flight = self.craft.max_altitude() - position.y > defaults::REAL_FLIGHT_MARGIN;
        let credited = match self.terrain.segment_at(position.x) {
            Some(segment) if real_flight && self.credited_segments.insert(segment.index) => {
                self.landings += 1;
                self.events.push(FlightEvent {
                    timestamp: self.time,
                    left: segment.left,
                    right: segment.right,
                    kind: EventKind::Land,
                });
                true
            }
            _ => false,
        };
        log::info!(
            "Landed at x {:.1}, vx {:.2} vy {:.2}, credited: {credited}",
            position.x,
            velocity.x,
            velocity.y
        );
        self.signals.push(Signal::Touchdown { credited });
        credited
    }

    fn crash(&mut self) {
        let velocity = self.craft.velocity();
        log::info!("Crash, vx {:.2} vy {:.2}", velocity.x, velocity.y);
        self.state = FlightState::Destroyed;
        self.crashes += 1;
        self.credited_segments.clear();
        let fragments = self.craft.breakup(&mut self.rng);
        self.fragments.extend(fragments);
        self.follow_thrust(0.);
        self.signals.push(Signal::ExplosionTriggered);
        self.signals.push(Signal::Crashed);
    }

    fn update_fragments(&mut self, dt: f64) {
        for fragment in &mut self.fragments {
            fragment.update(dt);
            fragment.settle_on(&self.terrain);
        }
        self.fragments.retain(|f| !f.is_expired());
    }

    fn follow_thrust(&mut self, intensity: f64) {
        if let Some(volume) = self.sound.follow(intensity) {
            self.signals.push(Signal::ThrustIntensityChanged(volume));
        }
    }

    fn advance_sound(&mut self, dt: f64) {
        if let Some(volume) = self.sound.advance(dt) {
            self.signals.push(Signal::ThrustIntensityChanged(volume));
        }
    }

    pub fn craft(&self) -> &Craft {
        &self.craft
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn events(&self) -> &[FlightEvent] {
        &self.events
    }

    pub fn state(&self) -> FlightState {
        self.state
    }

    pub fn is_hot(&self) -> bool {
        self.hot
    }

    pub fn status_label(&self) -> &str {
        &self.status
    }

    pub fn landings(&self) -> usize {
        self.landings
    }

    pub fn crashes(&self) -> usize {
        self.crashes
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

#[cfg(test)]
mod flight_controller_tests {
    use super::*;
    use crate::simulation::KinematicBody;
    use rand::SeedableRng;

    const DT: f64 = 1. / 60.;

    /// Pad between x = 100 and x = 300 at height 50, slopes on both sides.
    fn terrain() -> Terrain {
        Terrain::from_points(vec![
            Vec2::new(0., 0.),
            Vec2::new(100., 50.),
            Vec2::new(300., 50.),
            Vec2::new(400., 0.),
            Vec2::new(500., 0.),
        ])
        .unwrap()
    }

    /// No gravity or drag so the touchdown velocity is exactly the one given.
    fn coasting(position: Vec2, velocity: Vec2) -> Craft {
        Craft::default().with_body(
            KinematicBody::at(position)
                .with_velocity(velocity)
                .with_gravity(Vec2::ZERO)
                .with_linear_damping(1.),
        )
    }

    fn controller(craft: Craft) -> FlightController {
        FlightController::new(terrain(), StdRng::seed_from_u64(5))
            .with_craft(craft, FlightState::Flying)
    }

    /// Starts just above the clearance line so one tick crosses it.
    fn touchdown(x: f64, velocity: Vec2) -> (FlightController, Option<Landing>) {
        let y = terrain().height_at(x) + defaults::CLEARANCE + 0.05;
        let mut controller = controller(coasting(Vec2::new(x, y), velocity));
        let verdict = controller.tick(DT, DT);
        (controller, verdict)
    }

    fn run_until_touchdown(controller: &mut FlightController) -> Landing {
        for i in 1..10_000 {
            if let Some(verdict) = controller.tick(DT, i as f64 * DT) {
                return verdict;
            }
        }
        panic!("No touchdown");
    }

    #[test]
    fn gentle_touchdown_lands() {
        let (controller, verdict) = touchdown(200., Vec2::new(0.3, -1.0));
        assert!(matches!(verdict, Some(Landing::Correct { .. })));
        assert_eq!(controller.state(), FlightState::Landed);
        assert_eq!(controller.craft().position().y, 70.);
        assert!(!controller.is_hot());
    }

    #[test]
    fn too_fast_vertical_crashes() {
        let (controller, verdict) = touchdown(200., Vec2::new(0.3, -1.01));
        assert!(matches!(verdict, Some(Landing::TooFastVertical { .. })));
        assert_eq!(controller.state(), FlightState::Destroyed);
        assert_eq!(controller.crashes(), 1);
        assert!(controller.is_hot());
    }

    #[test]
    fn too_fast_horizontal_crashes() {
        let (controller, verdict) = touchdown(200., Vec2::new(-0.31, -1.0));
        assert!(matches!(verdict, Some(Landing::TooFastHorizontal { .. })));
        assert_eq!(controller.state(), FlightState::Destroyed);
    }

    #[test]
    fn slope_crashes() {
        let (controller, verdict) = touchdown(350., Vec2::new(0., -0.2));
        assert_eq!(verdict, Some(Landing::WrongTerrain));
        assert_eq!(controller.state(), FlightState::Destroyed);
    }

    #[test]
    fn straddling_pad_edge_crashes() {
        let (controller, verdict) = touchdown(295., Vec2::new(0., -0.2));
        assert_eq!(verdict, Some(Landing::WrongTerrain));
        assert_eq!(controller.crashes(), 1);
    }

    #[test]
    fn ascending_through_ground_is_ignored() {
        let mut controller = controller(coasting(Vec2::new(200., 60.), Vec2::new(0., 0.5)));
        assert_eq!(controller.tick(DT, DT), None);
        assert_eq!(controller.state(), FlightState::Flying);
    }

    #[test]
    fn short_hop_is_not_credited() {
        let mut controller = controller(coasting(Vec2::new(200., 75.), Vec2::new(0., -0.5)));
        let verdict = run_until_touchdown(&mut controller);
        assert_eq!(verdict, Landing::Correct { credited: false });
        assert_eq!(controller.landings(), 0);
        assert_eq!(controller.state(), FlightState::Landed);
    }

    #[test]
    fn landing_credit_is_deduplicated_per_segment() {
        let mut controller = controller(coasting(Vec2::new(200., 120.), Vec2::new(0., -0.5)));
        assert_eq!(
            run_until_touchdown(&mut controller),
            Landing::Correct { credited: true }
        );
        assert_eq!(controller.landings(), 1);

        controller.craft = coasting(Vec2::new(250., 120.), Vec2::new(0., -0.5));
        controller.state = FlightState::Flying;
        assert_eq!(
            run_until_touchdown(&mut controller),
            Landing::Correct { credited: false }
        );
        assert_eq!(controller.landings(), 1);

        controller.craft = coasting(Vec2::new(350., 120.), Vec2::new(0., -0.5));
        controller.state = FlightState::Flying;
        assert_eq!(run_until_touchdown(&mut controller), Landing::WrongTerrain);

        controller.craft = coasting(Vec2::new(150., 120.), Vec2::new(0., -0.5));
        controller.state = FlightState::Flying;
        assert_eq!(
            run_until_touchdown(&mut controller),
            Landing::Correct { credited: true }
        );
        assert_eq!(controller.landings(), 2);

        let lands: Vec<_> = controller
            .events()
            .iter()
            .filter(|e| e.kind == EventKind::Land)
            .collect();
        assert_eq!(lands.len(), 2);
        assert_eq!(lands[0].left, Vec2::new(100., 50.));
        assert_eq!(lands[0].right, Vec2::new(300., 50.));
    }

    #[test]
    fn landed_craft_is_glued_to_pad() {
        let mut controller = FlightController::new(terrain(), StdRng::seed_from_u64(5))
            .with_craft(Craft::default().with_position(Vec2::new(200., 70.)), FlightState::Landed);
        controller.set_rotation_rate(5.);
        for i in 0..30 {
            controller.tick(DT, i as f64 * DT);
            assert_eq!(controller.state(), FlightState::Landed);
            assert_eq!(controller.craft().position().y, 70.);
            assert_eq!(controller.craft().velocity(), Vec2::ZERO);
            assert_eq!(controller.craft().rotation(), 0.);
        }
    }

    #[test]
    fn thrust_lifts_off_pad() {
        let mut controller = FlightController::new(terrain(), StdRng::seed_from_u64(5))
            .with_craft(Craft::default().with_position(Vec2::new(200., 70.)), FlightState::Landed);
        controller.set_thrust(10.);
        controller.tick(DT, DT);
        assert_eq!(controller.state(), FlightState::Flying);
        assert!(controller.craft().position().y > 70.);
    }

    #[test]
    fn crash_emits_fragments_and_signals() {
        let (mut controller, _) = touchdown(350., Vec2::new(0., -3.));
        assert_eq!(controller.fragments().len(), 4);
        let signals = controller.drain_signals();
        assert!(signals.contains(&Signal::ExplosionTriggered));
        assert!(signals.contains(&Signal::Crashed));
        assert!(controller.drain_signals().is_empty());
    }

    #[test]
    fn destroyed_craft_ignores_input() {
        let (mut controller, _) = touchdown(350., Vec2::new(0., -3.));
        let position = controller.craft().position();
        controller.set_thrust(10.);
        assert!(controller.fire().is_none());
        for i in 0..10 {
            assert_eq!(controller.tick(DT, i as f64 * DT), None);
        }
        assert_eq!(controller.craft().position(), position);
        assert_eq!(controller.craft().thrust(), 0.);
    }

    #[test]
    fn fragments_settle_and_expire() {
        let (mut controller, _) = touchdown(350., Vec2::new(0., -3.));
        for i in 0..100 {
            controller.tick(DT, i as f64 * DT);
            for fragment in controller.fragments() {
                let position = fragment.position();
                assert!(position.y >= controller.terrain().height_at(position.x) - 1e-9);
            }
        }
        for i in 100..200 {
            controller.tick(DT, i as f64 * DT);
        }
        assert!(controller.fragments().is_empty());
    }

    #[test]
    fn drop_lands_on_pad() {
        let mut controller = FlightController::new(terrain(), StdRng::seed_from_u64(11));
        controller.drop_ship(400.).unwrap();
        let x = controller.craft().position().x;
        assert_eq!(controller.state(), FlightState::Landed);
        assert!(controller.terrain().is_level(x - 10., x + 10.));
        assert_eq!(controller.craft().position().y, 50.);
        let event = controller.events().last().unwrap();
        assert_eq!(event.kind, EventKind::Drop);
        assert_eq!(event.left, Vec2::new(100., 50.));
    }

    #[test]
    fn drop_without_pad_fails() {
        let terrain = Terrain::from_points(vec![Vec2::new(0., 0.), Vec2::new(400., 300.)]).unwrap();
        let mut controller = FlightController::new(terrain, StdRng::seed_from_u64(0));
        assert!(matches!(
            controller.drop_ship(400.),
            Err(Error::NoLandingPad { .. })
        ));
    }

    #[test]
    fn reset_after_crash() {
        let (mut controller, _) = touchdown(350., Vec2::new(0., -3.));
        let fuel = controller.craft().fuel();
        controller.reset_flight().unwrap();
        assert_eq!(controller.state(), FlightState::Landed);
        assert!(controller.fragments().is_empty());
        assert_eq!(controller.craft().fuel(), fuel);
        assert_eq!(controller.crashes(), 1);
        assert!(controller.status_label().is_empty());
    }

    #[test]
    fn touchdown_label() {
        let (controller, _) = touchdown(200., Vec2::new(0.25, -0.5));
        assert_eq!(controller.status_label(), "vx:0.25 vy:-0.50 l:true");
    }

    #[test]
    fn thrust_changes_are_signalled() {
        let mut controller = controller(coasting(Vec2::new(200., 300.), Vec2::ZERO));
        controller.set_thrust(5.);
        assert_eq!(
            controller.drain_signals(),
            vec![Signal::ThrustIntensityChanged(0.5)]
        );
        controller.set_thrust(0.);
        controller.tick(DT, DT);
        assert!(matches!(
            controller.drain_signals().last(),
            Some(Signal::ThrustIntensityChanged(v)) if *v < 0.5
        ));
    }
}
