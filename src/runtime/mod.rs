//! Real-time driver for the simulation
//!
//! - `fixed_step`: Duration accumulator that turns wall time into ticks
//! - `stats`: Lock-free FPS/UPS and score counters
//! - `simulation_loop`: Start/stop state machine around the loop thread

pub mod fixed_step;
pub mod simulation_loop;
pub mod stats;

pub use fixed_step::{FixedStep, Iteration, Simulation};
pub use simulation_loop::{SimulationLoop, World};
pub use stats::{LoopStats, LoopStatsSnapshot};
