//! Game settings
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults in `consts`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::brain::{LearningRule, NeuralNetwork};
use crate::consts::*;
use crate::error::{BrainError, SettingsError};
use crate::sim::{
    BallTuning, Field, GameState, LearningSignals, PaddleSpec, Side, brain_topology,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Ball ===
    pub ball_radius: f32,
    /// Pixels per tick after a serve
    pub ball_speed: f32,
    pub ball_max_speed: f32,
    /// Multiplier applied on every paddle return
    pub paddle_boost: f32,
    pub max_deflection_degrees: f32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_margin: f32,
    /// Pixels per tick
    pub paddle_speed: f32,
    pub paddle_side: Side,
    /// Let Up/Down (or W/S) override the brain
    pub manual_control: bool,

    // === Brain ===
    pub hidden_width: usize,
    /// Seed for a fresh brain's weights
    pub seed: u64,
    pub brain_dir: PathBuf,
    pub brain_name: String,
    pub learning_enabled: bool,
    pub learning_rate: f32,
    pub max_weight_step: f32,
    pub weight_limit: f32,
    pub hit_reward: f32,
    pub miss_penalty: f32,
    pub tracking_rate: f32,

    // === Timing ===
    pub ticks_per_second: u32,
    /// FPS/UPS report and brain save cadence
    pub report_interval_ms: u64,
    /// Voluntary sleep per loop iteration
    pub yield_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let signals = LearningSignals::default();
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            ball_radius: BALL_RADIUS,
            ball_speed: BALL_START_SPEED,
            ball_max_speed: BALL_MAX_SPEED,
            paddle_boost: PADDLE_BOOST,
            max_deflection_degrees: MAX_DEFLECTION.to_degrees(),

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_margin: PADDLE_MARGIN,
            paddle_speed: PADDLE_SPEED,
            paddle_side: Side::Left,
            manual_control: false,

            hidden_width: HIDDEN_WIDTH,
            seed: 0x5eed,
            brain_dir: PathBuf::from("."),
            brain_name: "brain".to_string(),
            learning_enabled: signals.enabled,
            learning_rate: LEARNING_RATE,
            max_weight_step: MAX_WEIGHT_STEP,
            weight_limit: WEIGHT_LIMIT,
            hit_reward: signals.hit_reward,
            miss_penalty: signals.miss_penalty,
            tracking_rate: signals.tracking_rate,

            ticks_per_second: TICKS_PER_SECOND,
            report_interval_ms: 1000,
            yield_ms: 3,
        }
    }
}

impl Settings {
    /// Parse settings JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, or fall back to defaults with a warning
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: &str| Err(SettingsError::Invalid(msg.to_string()));
        if self.field_width <= 0.0 || self.field_height <= 0.0 {
            return invalid("field dimensions must be positive");
        }
        if self.paddle_height <= 0.0 || self.paddle_height >= self.field_height {
            return invalid("paddle_height must be positive and below field_height");
        }
        if self.paddle_width <= 0.0
            || self.paddle_margin < 0.0
            || self.paddle_margin + self.paddle_width >= self.field_width / 2.0
        {
            return invalid("paddle must sit inside its half of the field");
        }
        if self.ball_radius <= 0.0
            || 2.0 * self.ball_radius >= self.field_width.min(self.field_height)
        {
            return invalid("ball must fit inside the field");
        }
        if self.ball_speed < 0.0 || self.ball_max_speed < self.ball_speed {
            return invalid("ball speed must be within 0..=ball_max_speed");
        }
        if self.weight_limit <= 0.0 || self.max_weight_step < 0.0 {
            return invalid("weight_limit must be positive and max_weight_step non-negative");
        }
        if !(0.0..90.0).contains(&self.max_deflection_degrees) {
            return invalid("max_deflection_degrees must be in [0, 90)");
        }
        if self.hidden_width == 0 {
            return invalid("hidden_width must be at least 1");
        }
        if self.ticks_per_second == 0 || self.report_interval_ms == 0 {
            return invalid("ticks_per_second and report_interval_ms must be positive");
        }
        if self.brain_name.is_empty() || self.brain_name.contains(['/', '\\']) {
            return invalid("brain_name must be a plain file stem");
        }
        Ok(())
    }

    pub fn field(&self) -> Field {
        Field {
            width: self.field_width,
            height: self.field_height,
        }
    }

    pub fn ball_tuning(&self) -> BallTuning {
        BallTuning {
            radius: self.ball_radius,
            base_speed: self.ball_speed,
            max_speed: self.ball_max_speed,
            paddle_boost: self.paddle_boost,
            max_deflection: self.max_deflection_degrees.to_radians(),
        }
    }

    pub fn paddle_spec(&self) -> PaddleSpec {
        PaddleSpec {
            width: self.paddle_width,
            height: self.paddle_height,
            margin: self.paddle_margin,
            speed: self.paddle_speed,
            side: self.paddle_side,
        }
    }

    pub fn learning_rule(&self) -> LearningRule {
        LearningRule {
            learning_rate: self.learning_rate,
            max_step: self.max_weight_step,
            weight_limit: self.weight_limit,
        }
    }

    pub fn learning_signals(&self) -> LearningSignals {
        LearningSignals {
            enabled: self.learning_enabled,
            hit_reward: self.hit_reward,
            miss_penalty: self.miss_penalty,
            tracking_rate: self.tracking_rate,
        }
    }

    pub fn brain_topology(&self) -> [usize; 3] {
        brain_topology(self.hidden_width)
    }

    /// A fresh game with a newly seeded brain
    pub fn build_game(&self) -> Result<GameState, BrainError> {
        let brain =
            NeuralNetwork::new(&self.brain_topology(), self.seed)?.with_rule(self.learning_rule());
        let mut game = GameState::new(self.field(), self.ball_tuning(), self.paddle_spec(), brain)?;
        game.learning = self.learning_signals();
        game.manual_control = self.manual_control;
        Ok(game)
    }

    /// Length of one logical tick
    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.ticks_per_second.max(1)))
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    pub fn yield_duration(&self) -> Duration {
        Duration::from_millis(self.yield_ms)
    }
}
