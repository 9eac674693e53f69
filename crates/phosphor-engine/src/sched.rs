//! Fixed-timestep scheduler.
//!
//! Wall-clock time is fed into an accumulator once per frame; whole fixed
//! steps are run while owed, up to a per-frame cap. Owed time beyond the
//! cap is *discarded* -- under sustained overload the simulation slows down
//! instead of spiraling into an ever-growing catch-up debt.
//!
//! Each fixed step runs the registered systems in registration order. The
//! order is a hard contract: later systems depend on earlier ones having
//! settled state this tick (the index system must see integrated positions,
//! collision must see a fresh index, and so on).
//!
//! Rendering is not scheduled here. The outer loop calls
//! [`Scheduler::advance`] once per wall frame and then flushes the surface,
//! however many steps ran -- hard cuts at the fixed rate, no interpolation.

use std::time::{Duration, Instant};

use crate::scene::Scene;

// ---------------------------------------------------------------------------
// StepConfig
// ---------------------------------------------------------------------------

/// Timing parameters for the scheduler.
#[derive(Debug, Clone)]
pub struct StepConfig {
    /// Seconds per simulation step. Must be positive and finite.
    pub fixed_dt: f64,
    /// Most steps allowed per wall frame before owed time is discarded.
    pub max_steps_per_frame: u32,
}

impl Default for StepConfig {
    /// 60 steps per second, at most 5 catch-up steps per wall frame.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// StepDiagnostics
// ---------------------------------------------------------------------------

/// Timing for the most recent simulation step.
#[derive(Debug, Clone, Default)]
pub struct StepDiagnostics {
    /// Wall-clock time per system, in execution order.
    pub system_times: Vec<(&'static str, Duration)>,
    /// Total time for the step.
    pub total_time: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// A system: one named transformation of scene state per fixed step.
pub type SystemFn = fn(&mut Scene, f32);

struct RegisteredSystem {
    name: &'static str,
    func: SystemFn,
}

pub struct Scheduler {
    config: StepConfig,
    systems: Vec<RegisteredSystem>,
    accumulator: f64,
    ticks: u64,
    /// Total owed time discarded past the step cap, for diagnostics.
    discarded: f64,
    last_diagnostics: StepDiagnostics,
}

impl Scheduler {
    /// # Panics
    ///
    /// Panics if `fixed_dt` is not positive and finite, or the step cap is
    /// zero -- both are construction-time misuse.
    pub fn new(config: StepConfig) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        assert!(config.max_steps_per_frame > 0, "step cap must be nonzero");
        Self {
            config,
            systems: Vec::new(),
            accumulator: 0.0,
            ticks: 0,
            discarded: 0.0,
            last_diagnostics: StepDiagnostics::default(),
        }
    }

    /// Register a system. Execution order is registration order.
    ///
    /// # Panics
    ///
    /// Panics if a system with the same name is already registered.
    pub fn add_system(&mut self, name: &'static str, func: SystemFn) {
        assert!(
            !self.systems.iter().any(|s| s.name == name),
            "duplicate system name: {name:?}"
        );
        self.systems.push(RegisteredSystem { name, func });
    }

    /// Feed `elapsed` wall-clock seconds into the accumulator and run the
    /// owed fixed steps, capped per frame. Returns how many steps ran --
    /// the outer loop can watch this for overload (persistently at the cap)
    /// or idle frames (zero).
    pub fn advance(&mut self, scene: &mut Scene, elapsed: f64) -> u32 {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed;
        }

        let mut steps = 0;
        while self.accumulator >= self.config.fixed_dt && steps < self.config.max_steps_per_frame {
            self.run_step(scene);
            self.accumulator -= self.config.fixed_dt;
            steps += 1;
        }

        if self.accumulator >= self.config.fixed_dt {
            // Still owed more than the cap allows: discard whole steps,
            // keeping only the sub-step remainder.
            let owed = (self.accumulator / self.config.fixed_dt).floor();
            let dropped = owed * self.config.fixed_dt;
            self.accumulator -= dropped;
            self.discarded += dropped;
            tracing::warn!(
                dropped_steps = owed as u64,
                "simulation overloaded, discarding owed time"
            );
        }

        steps
    }

    /// Run exactly one fixed step, ignoring the accumulator. Useful for
    /// tests and deterministic replays.
    pub fn step_once(&mut self, scene: &mut Scene) {
        self.run_step(scene);
    }

    fn run_step(&mut self, scene: &mut Scene) {
        let step_start = Instant::now();
        let mut system_times = Vec::with_capacity(self.systems.len());
        let dt = self.config.fixed_dt as f32;

        for system in &self.systems {
            let sys_start = Instant::now();
            (system.func)(scene, dt);
            system_times.push((system.name, sys_start.elapsed()));
        }

        self.ticks += 1;
        self.last_diagnostics = StepDiagnostics {
            system_times,
            total_time: step_start.elapsed(),
        };
    }

    // -- accessors -----------------------------------------------------------

    /// Steps executed so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Simulation time in seconds. Computed as `ticks * fixed_dt` rather
    /// than accumulated, so it carries no floating-point drift.
    pub fn sim_time(&self) -> f64 {
        self.ticks as f64 * self.config.fixed_dt
    }

    pub fn fixed_dt(&self) -> f64 {
        self.config.fixed_dt
    }

    /// Unspent wall time, always less than one step after `advance`.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Total owed seconds discarded under overload.
    pub fn discarded_time(&self) -> f64 {
        self.discarded
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.name).collect()
    }

    pub fn last_diagnostics(&self) -> &StepDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneConfig;

    fn test_scene() -> Scene {
        Scene::new(SceneConfig::default())
    }

    // Systems communicate through the scene's world in real use; for
    // scheduler-shape tests a counter component on a lone entity does fine.
    #[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
    struct TickStamp(u64);

    fn stamp_system(scene: &mut Scene, _dt: f32) {
        for id in scene.world.query::<(TickStamp,)>() {
            if let Some(stamp) = scene.world.get_mut::<TickStamp>(id) {
                stamp.0 += 1;
            }
        }
    }

    // -- construction -------------------------------------------------------

    #[test]
    #[should_panic(expected = "fixed_dt must be positive")]
    fn zero_dt_panics() {
        let _ = Scheduler::new(StepConfig {
            fixed_dt: 0.0,
            ..Default::default()
        });
    }

    #[test]
    #[should_panic(expected = "duplicate system name")]
    fn duplicate_system_name_panics() {
        let mut sched = Scheduler::new(StepConfig::default());
        sched.add_system("motion", |_, _| {});
        sched.add_system("motion", |_, _| {});
    }

    #[test]
    fn default_config_is_60hz_cap_5() {
        let config = StepConfig::default();
        assert!((config.fixed_dt - 1.0 / 60.0).abs() < f64::EPSILON);
        assert_eq!(config.max_steps_per_frame, 5);
    }

    // -- accumulator behavior -----------------------------------------------

    #[test]
    fn sub_step_elapsed_runs_nothing() {
        let mut sched = Scheduler::new(StepConfig::default());
        let mut scene = test_scene();
        assert_eq!(sched.advance(&mut scene, 0.005), 0);
        assert!((sched.accumulator() - 0.005).abs() < 1e-12);
        assert_eq!(sched.tick_count(), 0);
    }

    #[test]
    fn accumulator_carries_remainder_across_frames() {
        let mut sched = Scheduler::new(StepConfig {
            fixed_dt: 0.01,
            max_steps_per_frame: 5,
        });
        let mut scene = test_scene();
        assert_eq!(sched.advance(&mut scene, 0.025), 2);
        assert!((sched.accumulator() - 0.005).abs() < 1e-12);
        // The carried 0.005 plus 0.005 makes exactly one more step.
        assert_eq!(sched.advance(&mut scene, 0.005), 1);
        assert_eq!(sched.tick_count(), 3);
    }

    #[test]
    fn overload_runs_cap_and_discards_the_rest() {
        let mut sched = Scheduler::new(StepConfig {
            fixed_dt: 0.01,
            max_steps_per_frame: 5,
        });
        let mut scene = test_scene();
        // One second owed = 100 steps, far past the cap of 5.
        let steps = sched.advance(&mut scene, 1.0);
        assert_eq!(steps, 5);
        assert_eq!(sched.tick_count(), 5);
        assert!(
            sched.accumulator() < 0.01,
            "excess owed time must be discarded, not queued"
        );
        assert!(sched.discarded_time() > 0.9);
        // Next quiet frame is normal again: no stored backlog.
        assert_eq!(sched.advance(&mut scene, 0.0), 0);
    }

    #[test]
    fn negative_and_nan_elapsed_are_ignored() {
        let mut sched = Scheduler::new(StepConfig::default());
        let mut scene = test_scene();
        assert_eq!(sched.advance(&mut scene, -1.0), 0);
        assert_eq!(sched.advance(&mut scene, f64::NAN), 0);
        assert_eq!(sched.accumulator(), 0.0);
    }

    // -- systems ------------------------------------------------------------

    #[test]
    fn systems_run_once_per_step() {
        let mut sched = Scheduler::new(StepConfig {
            fixed_dt: 0.01,
            max_steps_per_frame: 10,
        });
        sched.add_system("stamp", stamp_system);
        let mut scene = test_scene();
        let counter = scene.world.spawn_with(TickStamp(0));

        let steps = sched.advance(&mut scene, 0.045);
        assert_eq!(steps, 4);
        assert_eq!(scene.world.get::<TickStamp>(counter), Some(&TickStamp(4)));
    }

    #[test]
    fn registration_order_is_execution_order() {
        let mut sched = Scheduler::new(StepConfig::default());
        sched.add_system("first", |scene, _| {
            let e = scene.world.spawn_with(TickStamp(1));
            scene.world.despawn(e);
        });
        sched.add_system("second", |_, _| {});
        assert_eq!(sched.system_names(), vec!["first", "second"]);
    }

    #[test]
    fn sim_time_is_computed_not_accumulated() {
        // 0.125 is exact in binary, so the owed-step count is exact too.
        let mut sched = Scheduler::new(StepConfig {
            fixed_dt: 0.125,
            max_steps_per_frame: 2_000,
        });
        let mut scene = test_scene();
        sched.advance(&mut scene, 125.0);
        assert_eq!(sched.tick_count(), 1_000);
        assert_eq!(sched.sim_time(), 125.0);
    }

    #[test]
    fn diagnostics_record_per_system_timing() {
        let mut sched = Scheduler::new(StepConfig::default());
        sched.add_system("stamp", stamp_system);
        let mut scene = test_scene();
        sched.step_once(&mut scene);
        let diag = sched.last_diagnostics();
        assert_eq!(diag.system_times.len(), 1);
        assert_eq!(diag.system_times[0].0, "stamp");
    }
}
