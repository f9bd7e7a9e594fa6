//! The paddle's brain
//!
//! A small fixed-topology feed-forward network with `tanh` activations,
//! trained online with a bounded output-layer delta rule, plus its binary
//! file format.

pub mod codec;
pub mod network;

pub use codec::{FORMAT_VERSION, MAGIC, deserialize, deserialize_expecting, serialize};
pub use network::{Layer, LearningRule, NeuralNetwork, activate};
