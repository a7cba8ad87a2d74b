//! Simulation engine: owns the world and advances it one tick at a time.

use crate::body::Body;
use crate::organism::{BodyKind, Egg, Mover};
use crate::rng::create_rng;
use hatchery_core::{
    Circle, Error, Point, PopulationStats, Result, RunTotals, SeedBody, SimConfig, TickReport,
    Torus,
};
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};
use tracing::{debug, event, info, instrument, trace, Level};

/// The ordered phases of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Kinematics,
    Collisions,
    Removal,
    Acceleration,
    Laying,
    Hatching,
    EggCleanup,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Kinematics,
        Phase::Collisions,
        Phase::Removal,
        Phase::Acceleration,
        Phase::Laying,
        Phase::Hatching,
        Phase::EggCleanup,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Kinematics => "kinematics",
            Phase::Collisions => "collisions",
            Phase::Removal => "removal",
            Phase::Acceleration => "acceleration",
            Phase::Laying => "laying",
            Phase::Hatching => "hatching",
            Phase::EggCleanup => "egg_cleanup",
        }
    }
}

/// Read-only view of the world handed to renderers and writers.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    pub tick: u64,
    pub torus: Torus,
    pub movers: &'a [Mover],
    pub eggs: &'a [Egg],
}

impl<'a> WorldView<'a> {
    /// Every body, movers first, each in collection order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyKind, &'a Body)> + 'a {
        self.movers
            .iter()
            .map(|m| (BodyKind::Mover, &m.body))
            .chain(self.eggs.iter().map(|e| (BodyKind::Egg, &e.body)))
    }
}

/// Consumer of a running simulation. Observers only ever see finished ticks.
pub trait Observer {
    /// Called after every tick selected by the output cadence.
    fn observe(&mut self, view: &WorldView<'_>) -> Result<()>;

    /// Wall-clock time spent in one phase of the tick that just ran.
    fn phase_finished(&mut self, _phase: Phase, _elapsed: Duration) {}
}

struct PhaseClock {
    last: Instant,
}

impl PhaseClock {
    fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    fn lap(&mut self, phase: Phase, observer: &mut dyn Observer) {
        let now = Instant::now();
        observer.phase_finished(phase, now - self.last);
        self.last = now;
    }
}

/// Observer that ignores everything.
pub struct NullObserver;

impl Observer for NullObserver {
    fn observe(&mut self, _view: &WorldView<'_>) -> Result<()> {
        Ok(())
    }
}

pub struct Simulation {
    config: SimConfig,
    torus: Torus,
    movers: Vec<Mover>,
    eggs: Vec<Egg>,
    rng: ChaCha8Rng,
    tick: u64,
    totals: RunTotals,
}

impl Simulation {
    /// Build the configured starting population with an RNG seeded from the config.
    pub fn new(config: SimConfig) -> Result<Self> {
        let rng = create_rng(config.seed);
        Self::with_rng(config, rng)
    }

    /// Same as [`Simulation::new`] but draws from the supplied generator.
    pub fn with_rng(config: SimConfig, rng: ChaCha8Rng) -> Result<Self> {
        let mut sim = Self::with_population(config, Vec::new(), Vec::new(), rng)?;

        let radius = sim.config.world.core_radius;
        let laying_period = sim.config.lifecycle.laying_period;
        let initial_speed = sim.config.motion.initial_speed;
        for seed in sim.config.population.movers.clone() {
            let body = seed_body(&seed, radius, &sim.torus);
            let mover = Mover::new(body, initial_speed, laying_period, &mut sim.rng);
            sim.movers.push(mover);
        }
        for seed in sim.config.population.eggs.clone() {
            let body = seed_body(&seed, radius, &sim.torus);
            sim.eggs
                .push(Egg::new(body, sim.config.lifecycle.incubation_period));
        }

        info!(
            movers = sim.movers.len(),
            eggs = sim.eggs.len(),
            width = sim.torus.width,
            height = sim.torus.height,
            seed = sim.config.seed,
            "Simulation initialized"
        );
        Ok(sim)
    }

    /// Start from an explicit population, ignoring `config.population`.
    pub fn with_population(
        config: SimConfig,
        movers: Vec<Mover>,
        eggs: Vec<Egg>,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            torus: config.world.torus(),
            config,
            movers,
            eggs,
            rng,
            tick: 0,
            totals: RunTotals::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn torus(&self) -> Torus {
        self.torus
    }

    pub fn movers(&self) -> &[Mover] {
        &self.movers
    }

    pub fn eggs(&self) -> &[Egg] {
        &self.eggs
    }

    /// Number of ticks executed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn totals(&self) -> &RunTotals {
        &self.totals
    }

    /// View of the world as left by the most recent tick.
    ///
    /// Taken before the first [`Simulation::step`] there is no finished tick
    /// behind it: the view shows the seeded population and still reports
    /// `tick = 0`. Check [`Simulation::tick`] (ticks executed) to tell the two
    /// apart.
    pub fn view(&self) -> WorldView<'_> {
        WorldView {
            tick: self.tick.saturating_sub(1),
            torus: self.torus,
            movers: &self.movers,
            eggs: &self.eggs,
        }
    }

    /// Run the configured number of ticks, handing the world to `observer`
    /// at the output cadence. Any error aborts the run.
    #[instrument(skip(self, observer), fields(num_ticks = self.config.run.ticks))]
    pub fn run(&mut self, observer: &mut dyn Observer) -> Result<RunTotals> {
        let num_ticks = self.config.run.ticks;
        info!("Starting simulation for {} ticks", num_ticks);

        for _ in 0..num_ticks {
            let report = self.step_observed(observer)?;

            if report.tick % self.config.run.output_every == 0 {
                observer.observe(&self.view())?;
            }

            if report.tick % self.config.run.log_every == 0 {
                self.emit_population_metrics(&report);
            }
        }

        self.emit_episode_summary();
        Ok(self.totals.clone())
    }

    /// Execute one tick.
    pub fn step(&mut self) -> Result<TickReport> {
        self.step_observed(&mut NullObserver)
    }

    fn step_observed(&mut self, observer: &mut dyn Observer) -> Result<TickReport> {
        let tick = self.tick;
        let mut clock = PhaseClock::start();

        self.step_kinematics();
        clock.lap(Phase::Kinematics, observer);

        let marked = resolve_collisions(&self.movers, &self.torus, tick)?;
        clock.lap(Phase::Collisions, observer);

        let killed = self.remove_marked_movers(&marked);
        clock.lap(Phase::Removal, observer);

        self.step_acceleration();
        clock.lap(Phase::Acceleration, observer);

        let laid = self.lay_eggs();
        clock.lap(Phase::Laying, observer);

        let hatched_marks = self.hatch_eggs();
        clock.lap(Phase::Hatching, observer);

        let hatched = self.remove_hatched_eggs(&hatched_marks);
        clock.lap(Phase::EggCleanup, observer);

        let report = TickReport {
            tick,
            killed,
            laid,
            hatched,
            movers: self.movers.len(),
            eggs: self.eggs.len(),
        };
        self.totals.record(&report);
        self.tick += 1;

        trace!(
            tick,
            killed,
            laid,
            hatched,
            movers = report.movers,
            eggs = report.eggs,
            "Tick complete"
        );
        Ok(report)
    }

    fn step_kinematics(&mut self) {
        let rotation_angle = self.config.motion.rotation_angle;
        for mover in &mut self.movers {
            mover.move_by(&self.torus);
            mover.rotate(rotation_angle, &mut self.rng);
        }
    }

    fn remove_marked_movers(&mut self, marked: &[bool]) -> usize {
        let before = self.movers.len();
        let mut index = 0;
        self.movers.retain(|_| {
            let keep = !marked[index];
            index += 1;
            keep
        });
        before - self.movers.len()
    }

    fn step_acceleration(&mut self) {
        let acceleration = self.config.motion.acceleration;
        for mover in &mut self.movers {
            mover.accelerate(acceleration);
        }
    }

    fn lay_eggs(&mut self) -> usize {
        let laying_period = self.config.lifecycle.laying_period;
        let incubation_period = self.config.lifecycle.incubation_period;
        let angle_scale = self.config.mutation.angle_scale;

        let mut laid = 0;
        for mover in &mut self.movers {
            if mover.time_to_lay > 0 {
                mover.time_to_lay -= 1;
                continue;
            }
            let body = mover.body.mutate(angle_scale, &self.torus, &mut self.rng);
            self.eggs.push(Egg::new(body, incubation_period));
            mover.time_to_lay = laying_period;
            laid += 1;
        }
        laid
    }

    /// Hatch every ready egg whose body is clear of all movers, including
    /// movers hatched earlier in this same pass. Returns the hatch marks.
    fn hatch_eggs(&mut self) -> Vec<bool> {
        let laying_period = self.config.lifecycle.laying_period;
        let initial_speed = self.config.motion.initial_speed;
        let tick = self.tick;

        let mut hatched = vec![false; self.eggs.len()];
        for (index, egg) in self.eggs.iter_mut().enumerate() {
            if egg.time_to_hatch > 0 {
                egg.time_to_hatch -= 1;
                continue;
            }

            let blocked = self
                .movers
                .iter()
                .any(|mover| egg.body.intersects(&mover.body, &self.torus));
            if blocked {
                trace!(tick, egg = index, "Egg ready but blocked by a mover");
                continue;
            }

            let mover = Mover::new(egg.body.clone(), initial_speed, laying_period, &mut self.rng);
            debug!(
                event = "hatch",
                tick,
                egg = index,
                speed = mover.speed(),
                limbs = mover.body.limb_count(),
                "Egg hatched"
            );
            self.movers.push(mover);
            hatched[index] = true;
        }
        hatched
    }

    fn remove_hatched_eggs(&mut self, hatched: &[bool]) -> usize {
        let before = self.eggs.len();
        let mut index = 0;
        self.eggs.retain(|_| {
            let keep = !hatched[index];
            index += 1;
            keep
        });
        before - self.eggs.len()
    }

    /// Population structure of the current world.
    pub fn population_stats(&self) -> PopulationStats {
        let mut stats = PopulationStats::new();
        for mover in &self.movers {
            stats.record_mover(
                mover.speed(),
                mover.momentum(),
                mover.body.shape_hash(&self.torus),
            );
        }
        for egg in &self.eggs {
            stats.record_egg(egg.is_ready(), egg.body.shape_hash(&self.torus));
        }
        stats
    }

    fn emit_population_metrics(&self, report: &TickReport) {
        let stats = self.population_stats();
        let (dominant_shape, dominant_count) = stats.dominant_shape().unwrap_or((0, 0));

        info!(
            event = "population_metrics",
            tick = report.tick,
            movers = stats.movers,
            eggs = stats.eggs,
            waiting_eggs = stats.waiting_eggs,
            mean_speed = stats.mean_speed,
            max_speed = stats.max_speed,
            total_momentum = stats.total_momentum,
            distinct_shapes = stats.distinct_shapes(),
            dominant_shape = dominant_shape,
            dominant_count = dominant_count,
            killed_total = self.totals.killed,
            hatched_total = self.totals.hatched,
            "Population metrics snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "population_movers",
            gauge_value = stats.movers,
            tick = report.tick,
            "Mover population gauge"
        );
    }

    fn emit_episode_summary(&self) {
        let totals = &self.totals;
        info!(
            event = "episode_summary",
            total_ticks = totals.ticks,
            final_movers = self.movers.len(),
            final_eggs = self.eggs.len(),
            killed_total = totals.killed,
            laid_total = totals.laid,
            hatched_total = totals.hatched,
            hatch_rate = format!("{:.2}%", totals.hatch_rate() * 100.0),
            peak_movers = totals.peak_movers,
            peak_eggs = totals.peak_eggs,
            "Episode complete"
        );
        if self.movers.is_empty() {
            info!(
                event = "extinction",
                last_extinct_tick = totals.last_extinct_tick,
                eggs_remaining = self.eggs.len(),
                "No movers left at the end of the run"
            );
        }
    }
}

/// Decide which movers lose a collision, judged on the positions and
/// velocities in `movers` alone.
///
/// For every pair of intersecting movers the closing speeds along the line
/// between their cores are compared and the slower closer is marked. The
/// ordered visits `(i, j)` and `(j, i)` see opposite separations, so one
/// decision per pair covers both and each intersecting pair loses exactly
/// one mover. Exactly equal speeds cannot be decided and abort the tick.
pub fn resolve_collisions(movers: &[Mover], torus: &Torus, tick: u64) -> Result<Vec<bool>> {
    let mut marked = vec![false; movers.len()];
    for (i, mover_i) in movers.iter().enumerate() {
        for (j, mover_j) in movers.iter().enumerate().skip(i + 1) {
            if !mover_i.body.intersects(&mover_j.body, torus) {
                continue;
            }

            let separation = torus
                .delta(mover_i.body.core().centre, mover_j.body.core().centre)
                .normalize();
            let i_parallel = mover_i.velocity.dot(separation);
            let j_parallel = -mover_j.velocity.dot(separation);

            if i_parallel == j_parallel {
                return Err(Error::AmbiguousCollision {
                    tick,
                    first: i,
                    second: j,
                    parallel_speed: i_parallel,
                });
            }
            let (winner, loser, winner_speed, loser_speed) = if i_parallel > j_parallel {
                (i, j, i_parallel, j_parallel)
            } else {
                (j, i, j_parallel, i_parallel)
            };
            if !marked[loser] {
                debug!(
                    event = "collision_kill",
                    tick,
                    winner,
                    loser,
                    winner_speed,
                    loser_speed,
                    "Mover eliminated by collision"
                );
            }
            marked[loser] = true;
        }
    }
    Ok(marked)
}

fn seed_body(seed: &SeedBody, radius: f64, torus: &Torus) -> Body {
    let centre = torus.wrap(Point::new(seed.x, seed.y));
    let mut body = Body::new(Circle::new(centre, radius), &seed.limb_angles);
    // Limbs of a core near an edge may start outside the domain.
    body.translate(Point::ZERO, torus);
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatchery_core::{PopulationConfig, SimConfig};
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn quiet_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.world.width = 100.0;
        config.world.height = 100.0;
        config.world.core_radius = 6.0;
        config.motion.rotation_angle = 0.0;
        config.motion.acceleration = 0.0;
        config.lifecycle.laying_period = 1000;
        config.lifecycle.incubation_period = 1000;
        config.population = PopulationConfig {
            movers: Vec::new(),
            eggs: Vec::new(),
        };
        config
    }

    fn body_at(x: f64, y: f64, r: f64, angles: &[f64]) -> Body {
        Body::new(Circle::new(Point::new(x, y), r), angles)
    }

    fn sim_with(config: SimConfig, movers: Vec<Mover>, eggs: Vec<Egg>) -> Simulation {
        Simulation::with_population(config, movers, eggs, create_rng(42)).unwrap()
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::new(SimConfig::default()).unwrap();
        assert_eq!(sim.movers().len(), 2);
        assert_eq!(sim.eggs().len(), 1);
        assert_eq!(sim.eggs()[0].time_to_hatch, 20);
        assert!(sim.movers().iter().all(|m| m.time_to_lay == 20));
        assert!(sim.movers().iter().all(|m| m.speed() < 10.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimConfig::default();
        config.world.height = -1.0;
        assert!(matches!(Simulation::new(config), Err(Error::Validation(_))));
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut config = SimConfig::default();
        config.run.ticks = 60;
        let mut a = Simulation::new(config.clone()).unwrap();
        let mut b = Simulation::new(config).unwrap();
        for _ in 0..60 {
            let ra = a.step();
            let rb = b.step();
            match (ra, rb) {
                (Ok(ra), Ok(rb)) => assert_eq!(ra, rb),
                (Err(_), Err(_)) => break,
                _ => panic!("runs diverged"),
            }
        }
        assert_eq!(a.movers(), b.movers());
        assert_eq!(a.eggs(), b.eggs());
    }

    #[test]
    fn test_faster_closer_wins() {
        let torus = Torus::new(100.0, 100.0);
        let movers = vec![
            Mover::with_velocity(body_at(0.0, 0.0, 6.0, &[0.0]), Point::new(2.0, 0.0), 10),
            Mover::with_velocity(body_at(10.0, 0.0, 6.0, &[PI]), Point::new(-1.0, 0.0), 10),
        ];
        let marked = resolve_collisions(&movers, &torus, 0).unwrap();
        assert_eq!(marked, vec![false, true]);

        // Same geometry, now the right-hand mover closes in harder.
        let movers = vec![
            Mover::with_velocity(body_at(0.0, 0.0, 6.0, &[0.0]), Point::new(1.0, 0.0), 10),
            Mover::with_velocity(body_at(10.0, 0.0, 6.0, &[PI]), Point::new(-3.0, 0.0), 10),
        ];
        let marked = resolve_collisions(&movers, &torus, 0).unwrap();
        assert_eq!(marked, vec![true, false]);
    }

    #[test]
    fn test_half_world_pair_loses_exactly_one() {
        // Cores exactly half the world apart, limb tips touching across the seam.
        let torus = Torus::new(100.0, 100.0);
        for (va, vb) in [
            (Point::new(-1.0, 0.0), Point::new(0.5, 0.0)),
            (Point::new(1.0, 0.0), Point::new(-0.5, 0.0)),
        ] {
            let movers = vec![
                Mover::with_velocity(body_at(25.0, 50.0, 10.0, &[0.0]), va, 10),
                Mover::with_velocity(body_at(75.0, 50.0, 10.0, &[PI]), vb, 10),
            ];
            assert!(movers[0].body.intersects(&movers[1].body, &torus));
            let marked = resolve_collisions(&movers, &torus, 0).unwrap();
            assert_eq!(marked.iter().filter(|m| **m).count(), 1);
        }
    }

    proptest! {
        #[test]
        fn proptest_intersecting_pair_loses_exactly_one(
            x in 0.0f64..100.0,
            y in 0.0f64..100.0,
            gap in 10.0f64..30.0,
            heading in -PI..PI,
            vax in -5.0f64..5.0, vay in -5.0f64..5.0,
            vbx in -5.0f64..5.0, vby in -5.0f64..5.0,
        ) {
            let torus = Torus::new(100.0, 100.0);
            let offset = Point::from_angle(heading) * gap;
            let mut a = Body::new(Circle::new(Point::new(x, y), 5.0), &[heading]);
            let mut b = Body::new(
                Circle::new(Point::new(x, y) + offset, 5.0),
                &[heading + PI],
            );
            a.translate(Point::ZERO, &torus);
            b.translate(Point::ZERO, &torus);
            prop_assume!(a.intersects(&b, &torus));

            let movers = vec![
                Mover::with_velocity(a, Point::new(vax, vay), 10),
                Mover::with_velocity(b, Point::new(vbx, vby), 10),
            ];
            match resolve_collisions(&movers, &torus, 0) {
                Ok(marked) => prop_assert_eq!(marked.iter().filter(|m| **m).count(), 1),
                Err(err) => prop_assert!(err.is_ambiguous_collision()),
            }
        }
    }

    #[test]
    fn test_equal_closing_speeds_are_fatal() {
        let torus = Torus::new(100.0, 100.0);
        let movers = vec![
            Mover::with_velocity(body_at(0.0, 0.0, 6.0, &[0.0]), Point::new(1.0, 0.0), 10),
            Mover::with_velocity(body_at(10.0, 0.0, 6.0, &[PI]), Point::new(-1.0, 0.0), 10),
        ];
        let err = resolve_collisions(&movers, &torus, 3).unwrap_err();
        assert!(err.is_ambiguous_collision());
        assert!(matches!(err, Error::AmbiguousCollision { tick: 3, .. }));
    }

    #[test]
    fn test_collision_tick_eliminates_exactly_one() {
        let mut config = quiet_config();
        config.motion.rotation_angle = 0.1;
        let movers = vec![
            Mover::with_velocity(body_at(0.0, 0.0, 6.0, &[0.0]), Point::new(1.0, 0.0), 10),
            Mover::with_velocity(body_at(10.0, 0.0, 6.0, &[PI]), Point::new(-1.0, 0.0), 10),
        ];
        let mut sim = sim_with(config, movers, Vec::new());

        // Replay kinematics on a copy to learn who should lose.
        let mut expected = sim.movers().to_vec();
        let mut rng = create_rng(42);
        for mover in &mut expected {
            mover.move_by(&sim.torus());
            mover.rotate(0.1, &mut rng);
        }
        let separation = sim
            .torus()
            .delta(expected[0].body.core().centre, expected[1].body.core().centre)
            .normalize();
        let a_parallel = expected[0].velocity.dot(separation);
        let b_parallel = -expected[1].velocity.dot(separation);
        let survivor = if a_parallel > b_parallel { 0 } else { 1 };

        let report = sim.step().unwrap();
        assert_eq!(report.killed, 1);
        assert_eq!(sim.movers().len(), 1);
        assert_eq!(sim.movers()[0].body, expected[survivor].body);
        assert_eq!(sim.movers()[0].velocity, expected[survivor].velocity);
    }

    #[test]
    fn test_non_overlapping_movers_survive() {
        let movers = vec![
            Mover::with_velocity(body_at(10.0, 10.0, 6.0, &[0.0]), Point::new(1.0, 0.0), 10),
            Mover::with_velocity(body_at(60.0, 60.0, 6.0, &[PI]), Point::new(-1.0, 0.0), 10),
        ];
        let mut sim = sim_with(quiet_config(), movers, Vec::new());
        let report = sim.step().unwrap();
        assert_eq!(report.killed, 0);
        assert_eq!(sim.movers().len(), 2);
    }

    #[test]
    fn test_lays_when_timer_is_zero() {
        let mut config = quiet_config();
        config.lifecycle.laying_period = 5;
        let movers = vec![Mover::with_velocity(
            body_at(50.0, 50.0, 6.0, &[0.0, PI / 2.0]),
            Point::new(1.0, 0.0),
            0,
        )];
        let mut sim = sim_with(config, movers, Vec::new());

        let report = sim.step().unwrap();
        assert_eq!(report.laid, 1);
        assert_eq!(sim.eggs().len(), 1);
        assert_eq!(sim.movers()[0].time_to_lay, 5);
        // The hatching phase of the same tick already counted down once.
        assert_eq!(sim.eggs()[0].time_to_hatch, 999);
        assert_eq!(sim.eggs()[0].body.core(), sim.movers()[0].body.core());

        for _ in 0..5 {
            assert_eq!(sim.step().unwrap().laid, 0);
        }
        assert_eq!(sim.movers()[0].time_to_lay, 0);
        assert_eq!(sim.step().unwrap().laid, 1);
        assert_eq!(sim.eggs().len(), 2);
    }

    #[test]
    fn test_egg_hatches_into_free_space() {
        let mut config = quiet_config();
        config.lifecycle.laying_period = 7;
        let egg = Egg::new(body_at(50.0, 50.0, 6.0, &[0.0]), 1);
        let mut sim = sim_with(config, Vec::new(), vec![egg]);

        let report = sim.step().unwrap();
        assert_eq!(report.hatched, 0);
        assert_eq!(sim.eggs()[0].time_to_hatch, 0);

        let report = sim.step().unwrap();
        assert_eq!(report.hatched, 1);
        assert!(sim.eggs().is_empty());
        assert_eq!(sim.movers().len(), 1);
        assert_eq!(sim.movers()[0].time_to_lay, 7);
    }

    #[test]
    fn test_blocked_egg_waits_until_space_clears() {
        let mut config = quiet_config();
        config.motion.initial_speed = 0.0;
        let egg = Egg::new(body_at(50.0, 50.0, 6.0, &[0.0]), 0);
        let sitter = Mover::with_velocity(body_at(50.0, 50.0, 6.0, &[0.0]), Point::ZERO, 1000);
        let mut sim = sim_with(config, vec![sitter], vec![egg]);

        for _ in 0..500 {
            let report = sim.step().unwrap();
            assert_eq!(report.hatched, 0);
        }
        assert_eq!(sim.eggs().len(), 1);
        assert_eq!(sim.eggs()[0].time_to_hatch, 0);

        // Nudge the sitter well away; the egg hatches on the next tick.
        sim.movers[0].velocity = Point::new(40.0, 0.0);
        let report = sim.step().unwrap();
        assert_eq!(report.hatched, 1);
        assert!(sim.eggs().is_empty());
        assert_eq!(sim.movers().len(), 2);
    }

    #[test]
    fn test_two_ready_eggs_on_one_spot_hatch_once() {
        let config = quiet_config();
        let eggs = vec![
            Egg::new(body_at(50.0, 50.0, 6.0, &[0.0]), 0),
            Egg::new(body_at(50.0, 50.0, 6.0, &[0.0]), 0),
        ];
        let mut sim = sim_with(config, Vec::new(), eggs);
        let report = sim.step().unwrap();
        assert_eq!(report.hatched, 1);
        assert_eq!(sim.eggs().len(), 1);
    }

    #[test]
    fn test_population_bookkeeping_holds() {
        let mut config = SimConfig::default();
        config.lifecycle.laying_period = 3;
        config.lifecycle.incubation_period = 2;
        let mut sim = Simulation::new(config).unwrap();

        for _ in 0..200 {
            let movers_before = sim.movers().len();
            let eggs_before = sim.eggs().len();
            let report = match sim.step() {
                Ok(report) => report,
                Err(err) => {
                    assert!(err.is_ambiguous_collision());
                    break;
                }
            };
            assert_eq!(
                sim.movers().len(),
                movers_before - report.killed + report.hatched
            );
            assert_eq!(sim.eggs().len(), eggs_before + report.laid - report.hatched);
            assert_eq!(report.movers, sim.movers().len());
            assert_eq!(report.eggs, sim.eggs().len());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn proptest_tick_counts_balance(seed in any::<u64>(), laying in 2u32..6, incubation in 0u32..5) {
            let mut config = SimConfig::default();
            config.seed = seed;
            config.lifecycle.laying_period = laying;
            config.lifecycle.incubation_period = incubation;
            let mut sim = Simulation::new(config).unwrap();

            for _ in 0..40 {
                let movers_before = sim.movers().len();
                let eggs_before = sim.eggs().len();
                let Ok(report) = sim.step() else { break };
                prop_assert_eq!(sim.movers().len() + report.killed, movers_before + report.hatched);
                prop_assert_eq!(sim.eggs().len() + report.hatched, eggs_before + report.laid);
                prop_assert!(report.killed <= movers_before);
            }
        }
    }

    #[test]
    fn test_view_before_first_step_shows_seed_population() {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        let view = sim.view();
        assert_eq!(sim.tick(), 0);
        assert_eq!(view.tick, 0);
        assert_eq!(view.movers.len(), 2);
        assert_eq!(view.eggs.len(), 1);

        sim.step().unwrap();
        assert_eq!(sim.tick(), 1);
        assert_eq!(sim.view().tick, 0);
        sim.step().unwrap();
        assert_eq!(sim.view().tick, 1);
    }

    #[test]
    fn test_empty_world_is_stable() {
        let mut sim = sim_with(quiet_config(), Vec::new(), Vec::new());
        for _ in 0..10 {
            let report = sim.step().unwrap();
            assert_eq!(report, TickReport { tick: report.tick, ..Default::default() });
        }
        assert_eq!(sim.tick(), 10);
    }

    struct CountingObserver {
        ticks: Vec<u64>,
        phases: usize,
    }

    impl Observer for CountingObserver {
        fn observe(&mut self, view: &WorldView<'_>) -> Result<()> {
            assert_eq!(view.bodies().count(), view.movers.len() + view.eggs.len());
            self.ticks.push(view.tick);
            Ok(())
        }

        fn phase_finished(&mut self, _phase: Phase, _elapsed: Duration) {
            self.phases += 1;
        }
    }

    #[test]
    fn test_run_respects_output_cadence() {
        let mut config = quiet_config();
        config.run.ticks = 10;
        config.run.output_every = 4;
        let mut sim = sim_with(config, Vec::new(), Vec::new());
        let mut observer = CountingObserver {
            ticks: Vec::new(),
            phases: 0,
        };

        let totals = sim.run(&mut observer).unwrap();
        assert_eq!(totals.ticks, 10);
        assert_eq!(observer.ticks, vec![0, 4, 8]);
        assert_eq!(observer.phases, 10 * Phase::ALL.len());
    }
}
