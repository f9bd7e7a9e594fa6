//! The loop thread
//!
//! `SimulationLoop` owns the game while stopped and hands it to a dedicated
//! thread while running. Start and stop are serialized by one mutex; stop
//! blocks until the thread has handed the game back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{Builder, JoinHandle};
use std::time::{Duration, Instant};

use super::fixed_step::{FixedStep, Simulation};
use super::stats::{LoopStats, LoopStatsSnapshot};
use crate::error::{BrainError, LoopError};
use crate::persistence::{BrainStore, SaveWorker};
use crate::platform::{DisplaySurface, Keyboard};
use crate::renderer::render_scene;
use crate::settings::Settings;
use crate::sim::{GameState, TickInput, manual_move, tick};

/// Everything the loop thread mutates
pub struct World {
    pub game: GameState,
    keyboard: Keyboard,
    surface: Box<dyn DisplaySurface + Send>,
}

impl World {
    pub fn new(
        game: GameState,
        keyboard: Keyboard,
        surface: Box<dyn DisplaySurface + Send>,
    ) -> Self {
        Self {
            game,
            keyboard,
            surface,
        }
    }
}

impl Simulation for World {
    fn update(&mut self) -> Result<(), BrainError> {
        let keys = self.keyboard.update();
        let input = TickInput {
            manual: manual_move(keys),
        };
        tick(&mut self.game, &input)
    }

    fn render(&mut self) {
        render_scene(self.surface.as_mut(), &self.game);
    }
}

struct Control {
    world: Option<World>,
    handle: Option<JoinHandle<World>>,
}

/// Timing the loop thread runs with
#[derive(Debug, Clone, Copy)]
struct Cadence {
    tick: Duration,
    idle: Duration,
    report: Duration,
}

pub struct SimulationLoop {
    control: Mutex<Control>,
    running: Arc<AtomicBool>,
    stats: LoopStats,
    keyboard: Keyboard,
    store: BrainStore,
    brain_name: String,
    load_saved: bool,
    cadence: Cadence,
}

impl SimulationLoop {
    /// Build a stopped loop around a fresh game. Rejects invalid settings.
    pub fn new(
        settings: &Settings,
        surface: Box<dyn DisplaySurface + Send>,
    ) -> Result<Self, LoopError> {
        settings.validate()?;
        let game = settings.build_game()?;
        let keyboard = Keyboard::new();
        let world = World::new(game, keyboard.clone(), surface);
        Ok(Self {
            control: Mutex::new(Control {
                world: Some(world),
                handle: None,
            }),
            running: Arc::new(AtomicBool::new(false)),
            stats: LoopStats::new(),
            keyboard,
            store: BrainStore::new(&settings.brain_dir),
            brain_name: settings.brain_name.clone(),
            load_saved: true,
            cadence: Cadence {
                tick: settings.tick_duration(),
                idle: settings.yield_duration(),
                report: settings.report_interval(),
            },
        })
    }

    /// Whether `start` picks up a brain saved by an earlier run (default on)
    pub fn load_saved_brain(mut self, enabled: bool) -> Self {
        self.load_saved = enabled;
        self
    }

    /// Handle for feeding key presses into the game
    pub fn keyboard(&self) -> Keyboard {
        self.keyboard.clone()
    }

    pub fn store(&self) -> &BrainStore {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> LoopStatsSnapshot {
        self.stats.snapshot()
    }

    /// Inspect the game. `None` while the loop thread owns it.
    pub fn with_game<R>(&self, f: impl FnOnce(&GameState) -> R) -> Option<R> {
        let control = self.lock();
        control.world.as_ref().map(|world| f(&world.game))
    }

    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the loop thread. Does nothing if it is already running.
    pub fn start(&self) -> Result<(), LoopError> {
        let mut control = self.lock();
        if self.is_running() {
            log::debug!("Simulation loop already running");
            return Ok(());
        }
        // A thread that stopped itself after an error still needs joining
        self.reap(&mut control);

        let mut world = control.world.take().ok_or(LoopError::StateLost)?;
        if self.load_saved {
            if let Err(e) = self.restore_brain(&mut world.game) {
                control.world = Some(world);
                return Err(e.into());
            }
        }
        let worker = match SaveWorker::spawn(self.store.clone(), self.brain_name.clone()) {
            Ok(worker) => worker,
            Err(e) => {
                control.world = Some(world);
                return Err(LoopError::Spawn(e));
            }
        };

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let stats = self.stats.clone();
        let cadence = self.cadence;
        let handle = Builder::new()
            .name("nong-loop".to_string())
            .spawn(move || run_loop(world, worker, running, stats, cadence))
            .map_err(|e| {
                self.running.store(false, Ordering::Release);
                LoopError::Spawn(e)
            })?;
        control.handle = Some(handle);

        log::info!(
            "Simulation loop started ({} ms per tick)",
            self.cadence.tick.as_secs_f32() * 1000.0
        );
        Ok(())
    }

    /// Stop the loop thread and wait for it. Does nothing if not started.
    pub fn stop(&self) {
        let mut control = self.lock();
        if control.handle.is_none() {
            log::debug!("Simulation loop not running");
            return;
        }
        self.running.store(false, Ordering::Release);
        self.reap(&mut control);
        log::info!("Simulation loop stopped");
    }

    fn reap(&self, control: &mut Control) {
        let Some(handle) = control.handle.take() else {
            return;
        };
        match handle.join() {
            Ok(world) => control.world = Some(world),
            Err(_) => log::warn!("Simulation loop thread panicked; game state lost"),
        }
    }

    /// Swap in the saved brain, keeping the fresh one if none is usable
    fn restore_brain(&self, game: &mut GameState) -> Result<(), BrainError> {
        let current = game.paddle.brain();
        let topology = current.topology();
        let rule = current.rule();
        match self.store.load_expecting(&self.brain_name, &topology) {
            Ok(brain) => {
                game.paddle.set_brain(brain.with_rule(rule))?;
                log::info!(
                    "Loaded brain from {}",
                    self.store.path_for(&self.brain_name).display()
                );
            }
            Err(BrainError::NotFound(path)) => {
                log::info!("No saved brain at {}, starting fresh", path.display());
            }
            Err(e) => log::warn!("{e}; starting with a fresh brain"),
        }
        Ok(())
    }
}

impl Drop for SimulationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fixed-length reporting windows anchored to the loop's start
#[derive(Debug, Clone, Copy)]
struct ReportWindow {
    start: Instant,
    interval: Duration,
}

impl ReportWindow {
    fn new(start: Instant, interval: Duration) -> Self {
        Self { start, interval }
    }

    /// True once per elapsed interval; the next window starts where this one ended
    fn close_if_due(&mut self, now: Instant) -> bool {
        if now.duration_since(self.start) < self.interval {
            return false;
        }
        self.start += self.interval;
        true
    }
}

fn run_loop(
    mut world: World,
    worker: SaveWorker,
    running: Arc<AtomicBool>,
    stats: LoopStats,
    cadence: Cadence,
) -> World {
    let mut step = FixedStep::new(cadence.tick);
    let mut last = Instant::now();
    let mut window = ReportWindow::new(last, cadence.report);
    let mut frames = 0u32;
    let mut updates = 0u32;

    while running.load(Ordering::Acquire) {
        let now = Instant::now();
        let elapsed = now.duration_since(last);
        last = now;

        match step.run(elapsed, &mut world, cadence.idle) {
            Ok(it) => {
                updates += it.updates;
                frames += u32::from(it.rendered);
                stats.record(it.updates, it.rendered, &world.game.score);
            }
            Err(e) => {
                log::error!("Tick failed: {e}; stopping simulation loop");
                running.store(false, Ordering::Release);
                break;
            }
        }

        if window.close_if_due(Instant::now()) {
            log::info!("FPS: {}, UPS: {}", frames, updates);
            stats.publish_rates(frames, updates);
            frames = 0;
            updates = 0;
            worker.try_submit(world.game.paddle.brain().clone());
        }
    }

    worker.shutdown(Some(world.game.paddle.brain().clone()));
    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::NeuralNetwork;
    use crate::persistence::test_support::scratch_dir;
    use crate::platform::HeadlessSurface;
    use std::path::Path;
    use std::thread;

    fn settings_in(dir: &Path) -> Settings {
        Settings {
            brain_dir: dir.to_path_buf(),
            learning_enabled: false,
            report_interval_ms: 20,
            yield_ms: 1,
            ..Settings::default()
        }
    }

    fn headless() -> Box<dyn DisplaySurface + Send> {
        Box::new(HeadlessSurface::new(800.0, 600.0))
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let dir = scratch_dir("loop-idem");
        let sim = SimulationLoop::new(&settings_in(&dir), headless()).unwrap();

        sim.start().unwrap();
        sim.start().unwrap();
        assert!(sim.is_running());
        assert!(sim.with_game(|_| ()).is_none());

        sim.stop();
        assert!(!sim.is_running());
        sim.stop();
        assert!(sim.with_game(|_| ()).is_some());
        std::fs::remove_dir_all(&dir).ok();
    }

    /// Presents nothing; panics on the first frame
    struct ExplodingSurface(HeadlessSurface);

    impl DisplaySurface for ExplodingSurface {
        fn is_prepared(&self) -> bool {
            true
        }

        fn prepare(&mut self, _buffers: u32) {}

        fn size(&self) -> (f32, f32) {
            self.0.size()
        }

        fn begin_frame(&mut self) -> &mut dyn crate::platform::Canvas {
            self.0.begin_frame()
        }

        fn present(&mut self) {
            panic!("display went away");
        }
    }

    #[test]
    fn test_report_window_does_not_drift() {
        let t0 = Instant::now();
        let second = Duration::from_secs(1);
        let mut window = ReportWindow::new(t0, second);

        assert!(!window.close_if_due(t0 + Duration::from_millis(999)));
        // A late iteration closes the window but keeps the one-second grid
        assert!(window.close_if_due(t0 + Duration::from_millis(1300)));
        assert_eq!(window.start, t0 + second);
        assert!(!window.close_if_due(t0 + Duration::from_millis(1999)));
        assert!(window.close_if_due(t0 + Duration::from_millis(2000)));
        assert_eq!(window.start, t0 + second * 2);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let dir = scratch_dir("loop-invalid");
        let settings = Settings {
            weight_limit: -1.0,
            ..settings_in(&dir)
        };
        let result = SimulationLoop::new(&settings, headless());
        assert!(matches!(result, Err(LoopError::Settings(_))));
    }

    #[test]
    fn test_panicked_thread_loses_state() {
        let dir = scratch_dir("loop-panic");
        let surface = Box::new(ExplodingSurface(HeadlessSurface::new(800.0, 600.0)));
        let sim = SimulationLoop::new(&settings_in(&dir), surface).unwrap();

        sim.start().unwrap();
        thread::sleep(Duration::from_millis(200));
        sim.stop();

        assert!(!sim.is_running());
        assert!(sim.with_game(|_| ()).is_none());
        assert!(matches!(sim.start(), Err(LoopError::StateLost)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_stop_before_start_is_noop() {
        let dir = scratch_dir("loop-noop");
        let sim = SimulationLoop::new(&settings_in(&dir), headless()).unwrap();
        sim.stop();
        assert!(!sim.is_running());
        assert_eq!(sim.with_game(|g| g.time_ticks), Some(0));
        assert!(!sim.store().exists("brain"));
    }

    #[test]
    fn test_loop_ticks_and_saves_on_stop() {
        let dir = scratch_dir("loop-run");
        let sim = SimulationLoop::new(&settings_in(&dir), headless()).unwrap();

        sim.start().unwrap();
        thread::sleep(Duration::from_millis(150));
        sim.stop();

        let stats = sim.stats();
        assert!(stats.total_updates > 0);
        let ticks = sim.with_game(|g| g.time_ticks).unwrap();
        assert_eq!(ticks, stats.total_updates);

        let saved = sim.store().load("brain").unwrap();
        let live = sim.with_game(|g| g.paddle.brain().clone()).unwrap();
        std::fs::remove_dir_all(&dir).ok();
        assert_eq!(saved, live);
    }

    #[test]
    fn test_saved_brain_is_loaded_at_start() {
        let dir = scratch_dir("loop-load");
        let settings = settings_in(&dir);
        let saved = NeuralNetwork::new(&settings.brain_topology(), 777).unwrap();
        BrainStore::new(&dir).save(&saved, "brain").unwrap();

        let sim = SimulationLoop::new(&settings, headless()).unwrap();
        sim.start().unwrap();
        sim.stop();

        let live = sim.with_game(|g| g.paddle.brain().clone()).unwrap();
        std::fs::remove_dir_all(&dir).ok();
        assert_eq!(live, saved);
    }

    #[test]
    fn test_fresh_run_ignores_saved_brain() {
        let dir = scratch_dir("loop-fresh");
        let settings = settings_in(&dir);
        let saved = NeuralNetwork::new(&settings.brain_topology(), 777).unwrap();
        BrainStore::new(&dir).save(&saved, "brain").unwrap();
        let fresh = settings.build_game().unwrap().paddle.brain().clone();

        let sim = SimulationLoop::new(&settings, headless())
            .unwrap()
            .load_saved_brain(false);
        sim.start().unwrap();
        sim.stop();

        let live = sim.with_game(|g| g.paddle.brain().clone()).unwrap();
        std::fs::remove_dir_all(&dir).ok();
        assert_eq!(live, fresh);
    }

    #[test]
    fn test_corrupt_brain_falls_back_to_fresh() {
        let dir = scratch_dir("loop-corrupt");
        let settings = settings_in(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("brain.brain"), b"NONG garbage").unwrap();
        let fresh = settings.build_game().unwrap().paddle.brain().clone();

        let sim = SimulationLoop::new(&settings, headless()).unwrap();
        sim.start().unwrap();
        sim.stop();

        let live = sim.with_game(|g| g.paddle.brain().clone()).unwrap();
        // The final save replaced the damaged file
        let reloaded = sim.store().load("brain").unwrap();
        std::fs::remove_dir_all(&dir).ok();
        assert_eq!(live, fresh);
        assert_eq!(reloaded, fresh);
    }

    #[test]
    fn test_restart_continues_game() {
        let dir = scratch_dir("loop-restart");
        let sim = SimulationLoop::new(&settings_in(&dir), headless()).unwrap();

        sim.start().unwrap();
        thread::sleep(Duration::from_millis(100));
        sim.stop();
        let first = sim.with_game(|g| g.time_ticks).unwrap();

        sim.start().unwrap();
        thread::sleep(Duration::from_millis(100));
        sim.stop();
        let second = sim.with_game(|g| g.time_ticks).unwrap();
        std::fs::remove_dir_all(&dir).ok();
        assert!(second > first);
    }
}
