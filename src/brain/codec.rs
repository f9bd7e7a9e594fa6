//! Binary brain format
//!
//! All integers and floats are little-endian:
//!
//! ```text
//! magic      4 bytes  "NONG"
//! version    u16      FORMAT_VERSION
//! layers     u32      layer count n
//! shapes     n * (u32 inputs, u32 outputs)
//! params     per layer: outputs*inputs f32 weights (row-major), outputs f32 biases
//! ```
//!
//! Floats are stored bit-exact, so a decoded network equals the encoded one.

use super::network::{Layer, NeuralNetwork};
use crate::error::BrainError;

pub const MAGIC: &[u8; 4] = b"NONG";
pub const FORMAT_VERSION: u16 = 1;

/// Sanity caps so a damaged header cannot request huge allocations
const MAX_LAYERS: usize = 64;
const MAX_WIDTH: usize = 4096;

pub fn serialize(network: &NeuralNetwork) -> Vec<u8> {
    let layers = network.layers();
    let params: usize = layers
        .iter()
        .map(|l| l.weights().len() + l.biases().len())
        .sum();
    let mut out = Vec::with_capacity(10 + layers.len() * 8 + params * 4);

    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(layers.len() as u32).to_le_bytes());
    for layer in layers {
        out.extend_from_slice(&(layer.inputs() as u32).to_le_bytes());
        out.extend_from_slice(&(layer.outputs() as u32).to_le_bytes());
    }
    for layer in layers {
        for value in layer.weights().iter().chain(layer.biases()) {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
    out
}

pub fn deserialize(bytes: &[u8]) -> Result<NeuralNetwork, BrainError> {
    let mut reader = Reader::new(bytes);

    if reader.take(4)? != MAGIC {
        return Err(corrupt("bad magic"));
    }
    let version = reader.u16()?;
    if version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported format version {version}")));
    }

    let count = reader.u32()? as usize;
    if count == 0 || count > MAX_LAYERS {
        return Err(corrupt(format!("layer count {count} out of range")));
    }
    let mut shapes = Vec::with_capacity(count);
    for _ in 0..count {
        let inputs = reader.u32()? as usize;
        let outputs = reader.u32()? as usize;
        if inputs == 0 || outputs == 0 || inputs > MAX_WIDTH || outputs > MAX_WIDTH {
            return Err(corrupt(format!("layer shape {inputs}x{outputs} out of range")));
        }
        shapes.push((inputs, outputs));
    }

    let mut layers = Vec::with_capacity(count);
    for (inputs, outputs) in shapes {
        let weights = reader.f32s(inputs * outputs)?;
        let biases = reader.f32s(outputs)?;
        layers.push(Layer::from_parts(inputs, outputs, weights, biases).map_err(into_corrupt)?);
    }
    if reader.remaining() != 0 {
        return Err(corrupt(format!("{} trailing bytes", reader.remaining())));
    }

    NeuralNetwork::from_layers(layers).map_err(into_corrupt)
}

/// Decode and require the given topology (e.g. `[5, 6, 3]`)
pub fn deserialize_expecting(
    bytes: &[u8],
    topology: &[usize],
) -> Result<NeuralNetwork, BrainError> {
    let network = deserialize(bytes)?;
    let found = network.topology();
    if found != topology {
        return Err(corrupt(format!(
            "topology {found:?} does not match expected {topology:?}"
        )));
    }
    Ok(network)
}

fn corrupt(msg: impl Into<String>) -> BrainError {
    BrainError::CorruptBrain(msg.into())
}

fn into_corrupt(err: BrainError) -> BrainError {
    match err {
        BrainError::InvalidTopology(msg) => BrainError::CorruptBrain(msg),
        other => other,
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], BrainError> {
        if self.remaining() < n {
            return Err(corrupt(format!(
                "truncated at byte {}: wanted {} more, have {}",
                self.pos,
                n,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, BrainError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, BrainError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f32s(&mut self, n: usize) -> Result<Vec<f32>, BrainError> {
        let raw = self.take(n * 4)?;
        Ok(raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }
}
