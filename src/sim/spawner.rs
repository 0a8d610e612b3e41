//! Bottle spawning policy
//!
//! Runs on the virtual-clock scheduler: a recurring batch task whose period
//! is the current level's spawn interval, plus staggered follow-up spawns for
//! the rest of each batch. All randomness comes from a seeded PCG stream.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::scheduler::{Scheduler, TaskHandle};
use super::state::{Bottle, GamePhase};
use crate::consts::*;
use crate::tuning::Tuning;

/// Timer tasks owned by the spawner
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnTask {
    /// Recurring batch tick
    Batch,
    /// Delayed bottle from a batch, at a pre-picked position
    Staggered { x: f32 },
}

/// Bottles per batch for a level index
pub fn batch_size(level: usize) -> usize {
    if level < LARGE_BATCH_LEVEL {
        SMALL_BATCH_SIZE
    } else {
        LARGE_BATCH_SIZE
    }
}

/// Per-level golden bottle bookkeeping: at most one golden per level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldenCadence {
    pub level: usize,
    /// Bottles spawned so far in this level
    pub spawned_in_level: u32,
    /// Ordinal the golden bottle lands on
    pub target: u32,
    pub golden_spawned: bool,
}

impl GoldenCadence {
    fn draw(level: usize, rng: &mut Pcg32) -> Self {
        Self {
            level,
            spawned_in_level: 0,
            target: rng.random_range(GOLDEN_TARGET_MIN..GOLDEN_TARGET_MAX),
            golden_spawned: false,
        }
    }

    /// Count one spawn; true if this bottle is the level's golden one
    fn next_is_golden(&mut self) -> bool {
        self.spawned_in_level += 1;
        if !self.golden_spawned && self.spawned_in_level >= self.target {
            self.golden_spawned = true;
            return true;
        }
        false
    }
}

/// Decides when, where and what bottles appear
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    next_id: u32,
    cadence: GoldenCadence,
    /// The single recurring batch task, if running
    batch_task: Option<TaskHandle>,
    /// Staggered spawns that may still be pending
    staggered: Vec<TaskHandle>,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let cadence = GoldenCadence::draw(0, &mut rng);
        Self {
            rng,
            next_id: 0,
            cadence,
            batch_task: None,
            staggered: Vec::new(),
        }
    }

    pub fn cadence(&self) -> &GoldenCadence {
        &self.cadence
    }

    pub fn is_running(&self) -> bool {
        self.batch_task.is_some()
    }

    /// Start the recurring schedule. Any previous schedule is cancelled first
    /// so restarts never stack.
    pub fn start<T: From<SpawnTask>>(&mut self, scheduler: &mut Scheduler<T>, level: usize) {
        self.stop(scheduler);
        self.cadence = GoldenCadence::draw(level, &mut self.rng);
        self.batch_task = Some(scheduler.schedule(FIRST_SPAWN_DELAY_MS, SpawnTask::Batch.into()));
        log::debug!("Spawner started");
    }

    /// Cancel the recurring schedule and every pending staggered spawn
    pub fn stop<T>(&mut self, scheduler: &mut Scheduler<T>) {
        if let Some(handle) = self.batch_task.take() {
            scheduler.cancel(handle);
        }
        for handle in self.staggered.drain(..) {
            scheduler.cancel(handle);
        }
    }

    /// Handle a recurring batch tick.
    ///
    /// Spawns the first bottle of the batch now, queues the rest 500 ms apart,
    /// then re-arms itself with the current level's interval. Nothing spawns
    /// outside `Playing`, but the schedule keeps running.
    pub fn on_batch<T: From<SpawnTask>>(
        &mut self,
        scheduler: &mut Scheduler<T>,
        phase: GamePhase,
        level: usize,
        tuning: &Tuning,
        mut on_spawn: impl FnMut(Bottle),
    ) {
        if phase == GamePhase::Playing {
            let positions = self.batch_positions(batch_size(level));
            self.staggered.retain(|h| scheduler.is_pending(*h));

            for (i, &x) in positions.iter().enumerate() {
                if i == 0 {
                    on_spawn(self.create_bottle(x, level));
                } else {
                    let delay = BATCH_STAGGER_MS * i as u64;
                    let handle = scheduler.schedule(delay, SpawnTask::Staggered { x }.into());
                    self.staggered.push(handle);
                }
            }
        }

        let interval = tuning.spawn_interval_ms(level);
        self.batch_task = Some(scheduler.schedule(interval, SpawnTask::Batch.into()));
    }

    /// Handle a staggered spawn. Re-checks the phase at fire time: a bottle
    /// due while paused is dropped, not deferred.
    pub fn on_staggered(
        &mut self,
        x: f32,
        phase: GamePhase,
        level: usize,
        mut on_spawn: impl FnMut(Bottle),
    ) {
        if phase == GamePhase::Playing {
            on_spawn(self.create_bottle(x, level));
        } else {
            log::debug!("Dropped staggered spawn at x={:.1} ({:?})", x, phase);
        }
    }

    /// Create a bottle at `x`, deciding whether it is the level's golden one
    pub fn create_bottle(&mut self, x: f32, level: usize) -> Bottle {
        if level != self.cadence.level {
            self.cadence = GoldenCadence::draw(level, &mut self.rng);
        }
        let golden = self.cadence.next_is_golden();

        let id = self.next_id;
        self.next_id += 1;
        if golden {
            log::debug!("Golden bottle {} at level {}", id, level + 1);
        }
        Bottle::new(id, x, SPAWN_Y, golden)
    }

    /// Pick `count` horizontal positions, spread at least 15% apart where the
    /// retry budget allows
    pub fn batch_positions(&mut self, count: usize) -> Vec<f32> {
        let mut placed: Vec<f32> = Vec::with_capacity(count);
        for _ in 0..count {
            let x = self.pick_x(&placed);
            placed.push(x);
        }
        placed
    }

    fn pick_x(&mut self, placed: &[f32]) -> f32 {
        let mut candidate = self.random_x();
        for _ in 1..MAX_PLACEMENT_RETRIES {
            if placed.iter().all(|p| (p - candidate).abs() >= MIN_BATCH_SPACING) {
                return candidate;
            }
            candidate = self.random_x();
        }
        // Out of retries: take the last draw even if it overlaps
        candidate
    }

    fn random_x(&mut self) -> f32 {
        self.rng.random_range(SPAWN_X_MIN..=SPAWN_X_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_all(
        spawner: &mut Spawner,
        scheduler: &mut Scheduler<SpawnTask>,
        until_ms: u64,
        phase: GamePhase,
        level: usize,
    ) -> Vec<Bottle> {
        let tuning = Tuning::default();
        let mut out = Vec::new();
        while let Some((_, task)) = scheduler.pop_until(until_ms) {
            match task {
                SpawnTask::Batch => {
                    spawner.on_batch(scheduler, phase, level, &tuning, |b| out.push(b))
                }
                SpawnTask::Staggered { x } => {
                    spawner.on_staggered(x, phase, level, |b| out.push(b))
                }
            }
        }
        out
    }

    #[test]
    fn test_batch_size_by_level() {
        assert_eq!(batch_size(0), 2);
        assert_eq!(batch_size(3), 2);
        assert_eq!(batch_size(4), 3);
        assert_eq!(batch_size(5), 3);
    }

    #[test]
    fn test_positions_in_range() {
        let mut spawner = Spawner::new(7);
        for _ in 0..200 {
            for x in spawner.batch_positions(3) {
                assert!((SPAWN_X_MIN..=SPAWN_X_MAX).contains(&x));
            }
        }
    }

    #[test]
    fn test_small_batches_are_spread() {
        // Two positions in a 65-wide range almost always fit 15 apart in 10 tries
        let mut spawner = Spawner::new(11);
        let spread = (0..500)
            .filter(|_| {
                let xs = spawner.batch_positions(2);
                (xs[0] - xs[1]).abs() >= MIN_BATCH_SPACING
            })
            .count();
        assert!(spread >= 495, "only {spread} of 500 batches spread");
    }

    #[test]
    fn test_first_batch_timing_and_stagger() {
        let mut spawner = Spawner::new(1);
        let mut scheduler = Scheduler::new(0);
        spawner.start(&mut scheduler, 0);

        assert!(spawn_all(&mut spawner, &mut scheduler, 999, GamePhase::Playing, 0).is_empty());
        assert_eq!(spawn_all(&mut spawner, &mut scheduler, 1000, GamePhase::Playing, 0).len(), 1);
        assert_eq!(spawn_all(&mut spawner, &mut scheduler, 1500, GamePhase::Playing, 0).len(), 1);
        // Next batch at 1000 + 1500
        assert!(spawn_all(&mut spawner, &mut scheduler, 2499, GamePhase::Playing, 0).is_empty());
        assert_eq!(spawn_all(&mut spawner, &mut scheduler, 2500, GamePhase::Playing, 0).len(), 1);
    }

    #[test]
    fn test_large_batches_at_level_five() {
        let mut spawner = Spawner::new(1);
        let mut scheduler = Scheduler::new(0);
        spawner.start(&mut scheduler, 4);
        // Batch at 1000 with staggers at 1500 and 2000; the 650 ms interval
        // brings the next batch in at 1650, between them
        let first = spawn_all(&mut spawner, &mut scheduler, 1649, GamePhase::Playing, 4);
        assert_eq!(first.len(), 2);
        let overlap = spawn_all(&mut spawner, &mut scheduler, 2000, GamePhase::Playing, 4);
        assert_eq!(overlap.len(), 2);
        // Second batch follow-ups at 2150 and 2650, third batch at 2300
        assert_eq!(spawn_all(&mut spawner, &mut scheduler, 2650, GamePhase::Playing, 4).len(), 3);
    }

    #[test]
    fn test_no_spawn_unless_playing() {
        for phase in [
            GamePhase::Menu,
            GamePhase::ModelSelection,
            GamePhase::Paused,
            GamePhase::GameOver,
        ] {
            let mut spawner = Spawner::new(3);
            let mut scheduler = Scheduler::new(0);
            spawner.start(&mut scheduler, 0);
            assert!(spawn_all(&mut spawner, &mut scheduler, 20_000, phase, 0).is_empty());
            // Schedule keeps ticking so play resumes without a restart
            assert!(spawner.is_running());
            assert_eq!(scheduler.pending(), 1);
        }
    }

    #[test]
    fn test_pause_mid_batch_drops_staggered() {
        let mut spawner = Spawner::new(5);
        let mut scheduler = Scheduler::new(0);
        spawner.start(&mut scheduler, 0);

        assert_eq!(spawn_all(&mut spawner, &mut scheduler, 1000, GamePhase::Playing, 0).len(), 1);
        // Paused when the second bottle comes due
        assert!(spawn_all(&mut spawner, &mut scheduler, 1500, GamePhase::Paused, 0).is_empty());
        // Not deferred: resuming before the next batch yields nothing
        assert!(spawn_all(&mut spawner, &mut scheduler, 2499, GamePhase::Playing, 0).is_empty());
    }

    #[test]
    fn test_restart_does_not_stack_schedules() {
        let mut spawner = Spawner::new(9);
        let mut scheduler = Scheduler::new(0);
        spawner.start(&mut scheduler, 0);
        spawner.start(&mut scheduler, 0);
        spawner.start(&mut scheduler, 0);
        assert_eq!(scheduler.pending(), 1);

        let bottles = spawn_all(&mut spawner, &mut scheduler, 1000, GamePhase::Playing, 0);
        assert_eq!(bottles.len(), 1);
    }

    #[test]
    fn test_stop_cancels_everything() {
        let mut spawner = Spawner::new(9);
        let mut scheduler = Scheduler::new(0);
        spawner.start(&mut scheduler, 0);
        spawn_all(&mut spawner, &mut scheduler, 1000, GamePhase::Playing, 0);
        assert_eq!(scheduler.pending(), 2);

        spawner.stop(&mut scheduler);
        assert!(!spawner.is_running());
        assert_eq!(scheduler.pending(), 0);
        assert!(spawn_all(&mut spawner, &mut scheduler, 60_000, GamePhase::Playing, 0).is_empty());
    }

    #[test]
    fn test_ids_unique_and_increasing() {
        let mut spawner = Spawner::new(2);
        let ids: Vec<u32> = (0..50).map(|i| spawner.create_bottle(10.0, i / 10).id()).collect();
        assert!(ids.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_one_golden_per_level_within_window() {
        for seed in 0..50 {
            let mut spawner = Spawner::new(seed);
            for level in 0..6 {
                let golden: Vec<usize> = (0..40)
                    .map(|_| spawner.create_bottle(20.0, level))
                    .enumerate()
                    .filter(|(_, b)| b.is_golden())
                    .map(|(i, _)| i + 1)
                    .collect();
                assert_eq!(golden.len(), 1, "seed {seed} level {level}");
                assert!((15..=25).contains(&golden[0]));
            }
        }
    }

    #[test]
    fn test_level_change_resets_cadence() {
        let mut spawner = Spawner::new(4);
        for _ in 0..10 {
            spawner.create_bottle(20.0, 0);
        }
        assert_eq!(spawner.cadence().spawned_in_level, 10);
        spawner.create_bottle(20.0, 1);
        assert_eq!(spawner.cadence().level, 1);
        assert_eq!(spawner.cadence().spawned_in_level, 1);
        assert!(!spawner.cadence().golden_spawned);
        assert!((GOLDEN_TARGET_MIN..GOLDEN_TARGET_MAX).contains(&spawner.cadence().target));
    }
}
