//! Feed-forward network: evaluation, online adjustment, visualization

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{LEARNING_RATE, MAX_WEIGHT_STEP, WEIGHT_LIMIT};
use crate::error::BrainError;
use crate::platform::{Canvas, Color, Rect};

/// Activation applied after every layer
#[inline]
pub fn activate(x: f32) -> f32 {
    x.tanh()
}

/// Maps an activation in [-1, 1] to a display intensity in [0, 1]
#[inline]
fn display_intensity(a: f32) -> f32 {
    ((a + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// One dense layer. Weights are row-major: `weights[out * inputs + in]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    /// Build a layer from raw parts, checking shape and finiteness
    pub fn from_parts(
        inputs: usize,
        outputs: usize,
        weights: Vec<f32>,
        biases: Vec<f32>,
    ) -> Result<Self, BrainError> {
        if inputs == 0 || outputs == 0 {
            return Err(BrainError::InvalidTopology(format!(
                "layer {inputs}x{outputs} has a zero width"
            )));
        }
        if weights.len() != inputs * outputs || biases.len() != outputs {
            return Err(BrainError::InvalidTopology(format!(
                "layer {inputs}x{outputs} given {} weights and {} biases",
                weights.len(),
                biases.len()
            )));
        }
        if weights.iter().chain(biases.iter()).any(|v| !v.is_finite()) {
            return Err(BrainError::InvalidTopology(
                "non-finite weight or bias".to_string(),
            ));
        }
        Ok(Self {
            inputs,
            outputs,
            weights,
            biases,
        })
    }

    fn random(inputs: usize, outputs: usize, rng: &mut Pcg32) -> Self {
        let scale = 1.0 / (inputs as f32).sqrt();
        let weights = (0..inputs * outputs)
            .map(|_| rng.random_range(-scale..scale))
            .collect();
        let biases = (0..outputs).map(|_| rng.random_range(-scale..scale)).collect();
        Self {
            inputs,
            outputs,
            weights,
            biases,
        }
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    pub fn weight(&self, output: usize, input: usize) -> f32 {
        self.weights[output * self.inputs + input]
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .chunks_exact(self.inputs)
            .zip(&self.biases)
            .map(|(row, &bias)| {
                let sum: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                activate(sum + bias)
            })
            .collect()
    }
}

/// Bounds for the online update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningRule {
    pub learning_rate: f32,
    /// Largest change a single adjustment may apply to one weight
    pub max_step: f32,
    /// Weights and biases are kept within ±weight_limit
    pub weight_limit: f32,
}

impl Default for LearningRule {
    fn default() -> Self {
        Self {
            learning_rate: LEARNING_RATE,
            max_step: MAX_WEIGHT_STEP,
            weight_limit: WEIGHT_LIMIT,
        }
    }
}

/// Feed-forward network with cached activations from the last evaluation
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    layers: Vec<Layer>,
    rule: LearningRule,
    /// Input vector followed by each layer's output
    activations: Vec<Vec<f32>>,
}

impl PartialEq for NeuralNetwork {
    /// Topology and parameters only; the activation cache is transient
    fn eq(&self, other: &Self) -> bool {
        self.layers == other.layers
    }
}

impl NeuralNetwork {
    /// Fresh network with seeded uniform weights in ±1/sqrt(fan_in)
    pub fn new(topology: &[usize], seed: u64) -> Result<Self, BrainError> {
        if topology.len() < 2 {
            return Err(BrainError::InvalidTopology(format!(
                "need at least an input and an output width, got {topology:?}"
            )));
        }
        if topology.contains(&0) {
            return Err(BrainError::InvalidTopology(format!(
                "zero width in {topology:?}"
            )));
        }
        let mut rng = Pcg32::seed_from_u64(seed);
        let layers = topology
            .windows(2)
            .map(|pair| Layer::random(pair[0], pair[1], &mut rng))
            .collect();
        Ok(Self {
            layers,
            rule: LearningRule::default(),
            activations: Vec::new(),
        })
    }

    /// Assemble a network from layers whose widths chain
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self, BrainError> {
        if layers.is_empty() {
            return Err(BrainError::InvalidTopology("no layers".to_string()));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].outputs != pair[1].inputs {
                return Err(BrainError::InvalidTopology(format!(
                    "layer {} outputs {} but layer {} expects {}",
                    i,
                    pair[0].outputs,
                    i + 1,
                    pair[1].inputs
                )));
            }
        }
        Ok(Self {
            layers,
            rule: LearningRule::default(),
            activations: Vec::new(),
        })
    }

    pub fn with_rule(mut self, rule: LearningRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn set_rule(&mut self, rule: LearningRule) {
        self.rule = rule;
    }

    pub fn rule(&self) -> LearningRule {
        self.rule
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Widths from input to output, e.g. `[5, 6, 3]`
    pub fn topology(&self) -> Vec<usize> {
        let mut widths = Vec::with_capacity(self.layers.len() + 1);
        widths.push(self.input_width());
        widths.extend(self.layers.iter().map(|l| l.outputs));
        widths
    }

    pub fn input_width(&self) -> usize {
        self.layers[0].inputs
    }

    pub fn output_width(&self) -> usize {
        self.layers[self.layers.len() - 1].outputs
    }

    /// Activations cached by the last `evaluate`, input first
    pub fn activations(&self) -> &[Vec<f32>] {
        &self.activations
    }

    /// Forward pass. Caches every layer's activations for `adjust` and `render`.
    pub fn evaluate(&mut self, inputs: &[f32]) -> Result<Vec<f32>, BrainError> {
        let expected = self.input_width();
        if inputs.len() != expected {
            return Err(BrainError::DimensionMismatch {
                expected,
                actual: inputs.len(),
            });
        }

        let mut cache = Vec::with_capacity(self.layers.len() + 1);
        let mut current = inputs.to_vec();
        for layer in &self.layers {
            let next = layer.forward(&current);
            cache.push(current);
            current = next;
        }
        cache.push(current.clone());
        self.activations = cache;
        Ok(current)
    }

    /// Nudge the output layer toward reducing `errors` (target - output per unit).
    ///
    /// Uses the activations of the last `evaluate`; without one this is a no-op.
    /// Each step is clipped to `max_step` and each parameter to `weight_limit`.
    pub fn adjust(&mut self, errors: &[f32]) -> Result<(), BrainError> {
        let expected = self.output_width();
        if errors.len() != expected {
            return Err(BrainError::DimensionMismatch {
                expected,
                actual: errors.len(),
            });
        }
        let n = self.activations.len();
        if n < 2 {
            log::trace!("adjust skipped: nothing evaluated yet");
            return Ok(());
        }

        let Self {
            layers,
            rule,
            activations,
        } = self;
        let layer_inputs = &activations[n - 2];
        let layer_outputs = &activations[n - 1];
        let Some(layer) = layers.last_mut() else {
            return Ok(());
        };
        let step = rule.max_step;
        let limit = rule.weight_limit;

        for (j, &error) in errors.iter().enumerate() {
            if !error.is_finite() {
                log::warn!("ignoring non-finite error signal for output {}", j);
                continue;
            }
            let out = layer_outputs[j];
            let delta = rule.learning_rate * error * (1.0 - out * out);
            let row = &mut layer.weights[j * layer.inputs..(j + 1) * layer.inputs];
            for (w, &a) in row.iter_mut().zip(layer_inputs) {
                *w = (*w + (delta * a).clamp(-step, step)).clamp(-limit, limit);
            }
            let bias = &mut layer.biases[j];
            *bias = (*bias + delta.clamp(-step, step)).clamp(-limit, limit);
        }
        Ok(())
    }

    /// Encode to the brain file format
    pub fn serialize(&self) -> Vec<u8> {
        super::codec::serialize(self)
    }

    /// Decode from the brain file format
    pub fn deserialize(bytes: &[u8]) -> Result<Self, BrainError> {
        super::codec::deserialize(bytes)
    }

    /// Draw the cached activations: one column per layer, one cell per neuron
    pub fn render(&self, canvas: &mut dyn Canvas, region: Rect) {
        canvas.stroke_rect(region, Color::FRAME);
        if self.activations.is_empty() {
            return;
        }

        let columns = self.activations.len() as f32;
        let tallest = self.activations.iter().map(Vec::len).max().unwrap_or(1) as f32;
        let col_w = region.w / columns;
        let row_h = region.h / tallest;
        let radius = (col_w.min(row_h) * 0.4).max(1.0);

        for (col, values) in self.activations.iter().enumerate() {
            let x = region.x + col_w * (col as f32 + 0.5);
            // Center shorter columns vertically
            let top = region.y + (region.h - row_h * values.len() as f32) / 2.0;
            for (row, &a) in values.iter().enumerate() {
                let y = top + row_h * (row as f32 + 0.5);
                canvas.fill_circle(Vec2::new(x, y), radius, Color::intensity(display_intensity(a)));
            }
        }
    }
}
