//! Affine quantization between float tensors and the integer tensors of
//! fixed-point models: `real = (stored - zero_point) * scale`.

use ndarray::Array4;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantParams {
    pub scale: f32,
    pub zero_point: i32,
}

/// Element type of a model input or output tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorDType {
    #[default]
    Float32,
    Uint8,
    Int8,
}

impl TensorDType {
    /// Representable range of an integer type.
    pub fn int_range(&self) -> Option<(f32, f32)> {
        match self {
            TensorDType::Float32 => None,
            TensorDType::Uint8 => Some((u8::MIN as f32, u8::MAX as f32)),
            TensorDType::Int8 => Some((i8::MIN as f32, i8::MAX as f32)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TensorDType::Float32 => "float32",
            TensorDType::Uint8 => "uint8",
            TensorDType::Int8 => "int8",
        }
    }
}

/// Tensor fed to the model, already in the model's element type.
#[derive(Debug, Clone)]
pub enum InputTensor {
    Float32(Array4<f32>),
    Uint8(Array4<u8>),
    Int8(Array4<i8>),
}

/// Flattened scores produced by the model, in the model's element type.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTensor {
    Float32(Vec<f32>),
    Uint8(Vec<u8>),
    Int8(Vec<i8>),
}

impl OutputTensor {
    pub fn len(&self) -> usize {
        match self {
            OutputTensor::Float32(v) => v.len(),
            OutputTensor::Uint8(v) => v.len(),
            OutputTensor::Int8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `round(clip(x / scale + zero_point, min, max))`.
pub fn quantize_value(x: f32, params: QuantParams, min: f32, max: f32) -> f32 {
    (x / params.scale + params.zero_point as f32)
        .clamp(min, max)
        .round()
}

pub fn dequantize_value(q: f32, params: QuantParams) -> f32 {
    (q - params.zero_point as f32) * params.scale
}

/// Converts a normalized float tensor into the model's input element type.
///
/// Float inputs pass through untouched. Integer inputs without quantization
/// parameters (or with a zero scale) are clipped and rounded as-is.
pub fn quantize_input(x: Array4<f32>, dtype: TensorDType, params: Option<QuantParams>) -> InputTensor {
    let Some((min, max)) = dtype.int_range() else {
        return InputTensor::Float32(x);
    };
    let params = params
        .filter(|p| p.scale != 0.0)
        .unwrap_or(QuantParams {
            scale: 1.0,
            zero_point: 0,
        });
    let q = x.mapv(|v| quantize_value(v, params, min, max));
    match dtype {
        TensorDType::Uint8 => InputTensor::Uint8(q.mapv(|v| v as u8)),
        TensorDType::Int8 => InputTensor::Int8(q.mapv(|v| v as i8)),
        TensorDType::Float32 => InputTensor::Float32(q),
    }
}

/// Converts raw model scores to floats, de-quantizing integer outputs.
/// A zero scale means the scores are already real-valued.
pub fn dequantize_output(output: OutputTensor, params: Option<QuantParams>) -> Vec<f32> {
    let raw: Vec<f32> = match output {
        OutputTensor::Float32(v) => return v,
        OutputTensor::Uint8(v) => v.into_iter().map(f32::from).collect(),
        OutputTensor::Int8(v) => v.into_iter().map(f32::from).collect(),
    };
    match params {
        Some(p) if p.scale != 0.0 => raw.into_iter().map(|q| dequantize_value(q, p)).collect(),
        _ => raw,
    }
}
