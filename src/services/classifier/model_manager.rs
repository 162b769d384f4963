use crate::error::AppError;
use crate::models::labels::ClassLabelSet;
use crate::services::classifier::quantization::{InputTensor, OutputTensor, QuantParams, TensorDType};
use ort::session::Session;
use ort::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_IMAGE_SIZE: u32 = 224;

/// Pixel scaling the model was trained with. Picking the wrong one does not
/// fail, it just makes predictions worse, so it is never guessed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `x / 127.5 - 1.0`, mapping [0, 255] to [-1, 1] (MobileNet style).
    SignedUnit,
    /// Pixel values in [0, 255], unmodified.
    Raw,
}

impl Normalization {
    pub fn apply(&self, pixel: u8) -> f32 {
        match self {
            Normalization::SignedUnit => pixel as f32 / 127.5 - 1.0,
            Normalization::Raw => pixel as f32,
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::SignedUnit => write!(f, "signed_unit"),
            Normalization::Raw => write!(f, "raw"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TensorSpec {
    #[serde(default)]
    pub dtype: TensorDType,
    #[serde(default)]
    pub quantization: Option<QuantParams>,
}

/// Contents of the JSON file shipped next to the model.
#[derive(Clone, Debug, Deserialize)]
pub struct ModelConfig {
    pub normalization: Normalization,
    #[serde(default = "default_image_size")]
    pub image_size: u32,
    #[serde(default)]
    pub input: TensorSpec,
    #[serde(default)]
    pub output: TensorSpec,
    #[serde(default)]
    pub id2label: Option<HashMap<String, String>>,
}

fn default_image_size() -> u32 {
    DEFAULT_IMAGE_SIZE
}

impl ModelConfig {
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::ModelLoad(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, AppError> {
        let config: ModelConfig = serde_json::from_str(content)
            .map_err(|e| AppError::ModelLoad(format!("Failed to parse config JSON: {}", e)))?;
        if config.image_size == 0 {
            return Err(AppError::ModelLoad("image_size must be positive".to_string()));
        }
        Ok(config)
    }

    /// Labels from `id2label` sorted by index, or the built-in dish set.
    pub fn labels(&self) -> Result<ClassLabelSet, AppError> {
        let Some(id2label) = &self.id2label else {
            return Ok(ClassLabelSet::default());
        };

        let mut labels: Vec<(usize, String)> = id2label
            .iter()
            .map(|(k, v)| {
                k.parse::<usize>()
                    .map(|idx| (idx, v.clone()))
                    .map_err(|_| AppError::ModelLoad(format!("Invalid id2label index: {}", k)))
            })
            .collect::<Result<_, _>>()?;
        labels.sort_by_key(|(idx, _)| *idx);

        for (expected, (idx, _)) in labels.iter().enumerate() {
            if *idx != expected {
                return Err(AppError::ModelLoad(format!(
                    "id2label is missing index {}",
                    expected
                )));
            }
        }

        Ok(ClassLabelSet::new(
            labels.into_iter().map(|(_, label)| label).collect(),
        ))
    }
}

/// Descriptor of a loaded model: everything the engine needs besides the
/// runtime session itself.
#[derive(Clone, Debug)]
pub struct ModelDescriptor {
    pub normalization: Normalization,
    pub image_size: u32,
    pub input: TensorSpec,
    pub output: TensorSpec,
    pub labels: ClassLabelSet,
}

impl ModelDescriptor {
    pub fn from_config(config: ModelConfig) -> Result<Self, AppError> {
        let labels = config.labels()?;
        if labels.is_empty() {
            return Err(AppError::ModelLoad("Label set is empty".to_string()));
        }
        Ok(Self {
            normalization: config.normalization,
            image_size: config.image_size,
            input: config.input,
            output: config.output,
            labels,
        })
    }
}

/// Runs one forward pass. Implementations need not be thread-safe for
/// concurrent calls; the engine serializes access.
pub trait TensorBackend: Send {
    fn run(&mut self, input: InputTensor) -> Result<OutputTensor, AppError>;
}

pub struct OrtBackend {
    session: Session,
    output_dtype: TensorDType,
}

impl TensorBackend for OrtBackend {
    fn run(&mut self, input: InputTensor) -> Result<OutputTensor, AppError> {
        let input_name = self.session.inputs()[0].name().to_string();

        let input_value: Value = match input {
            InputTensor::Float32(a) => Value::from_array(a).map(Value::into_dyn),
            InputTensor::Uint8(a) => Value::from_array(a).map(Value::into_dyn),
            InputTensor::Int8(a) => Value::from_array(a).map(Value::into_dyn),
        }
        .map_err(|e| AppError::Inference(format!("Failed to create tensor value: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![input_name.as_str() => input_value])
            .map_err(|e| AppError::Inference(format!("Inference failed: {}", e)))?;

        let output_value = outputs
            .values()
            .next()
            .ok_or_else(|| AppError::Inference("Model produced no outputs".to_string()))?;

        let extract_err =
            |e: ort::Error| AppError::Inference(format!("Failed to extract output tensor: {}", e));

        let output = match self.output_dtype {
            TensorDType::Float32 => {
                let (_, data) = output_value.try_extract_tensor::<f32>().map_err(extract_err)?;
                OutputTensor::Float32(data.to_vec())
            }
            TensorDType::Uint8 => {
                let (_, data) = output_value.try_extract_tensor::<u8>().map_err(extract_err)?;
                OutputTensor::Uint8(data.to_vec())
            }
            TensorDType::Int8 => {
                let (_, data) = output_value.try_extract_tensor::<i8>().map_err(extract_err)?;
                OutputTensor::Int8(data.to_vec())
            }
        };

        Ok(output)
    }
}

/// Where to find the model and how to run it.
#[derive(Clone, Debug)]
pub struct ModelManager {
    pub model_path: PathBuf,
    pub config_path: PathBuf,
    pub intra_threads: usize,
    pub normalization_override: Option<Normalization>,
}

impl ModelManager {
    pub fn new(model_path: PathBuf, config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(|| model_path.with_extension("json"));
        Self {
            model_path,
            config_path,
            intra_threads: 4,
            normalization_override: None,
        }
    }

    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = threads.max(1);
        self
    }

    pub fn with_normalization(mut self, normalization: Option<Normalization>) -> Self {
        self.normalization_override = normalization;
        self
    }

    pub fn load_descriptor(&self) -> Result<ModelDescriptor, AppError> {
        let mut config = ModelConfig::from_file(&self.config_path)?;
        if let Some(normalization) = self.normalization_override {
            config.normalization = normalization;
        }
        ModelDescriptor::from_config(config)
    }

    /// Loads the descriptor and builds the ONNX Runtime session. Both
    /// failures are fatal for the process.
    pub fn load(&self) -> Result<(ModelDescriptor, OrtBackend), AppError> {
        let descriptor = self.load_descriptor()?;

        if !self.model_path.exists() {
            return Err(AppError::ModelLoad(format!(
                "Model file not found: {}",
                self.model_path.display()
            )));
        }

        let _ = ort::init().with_name("dish-footprint").commit();

        let session = Session::builder()
            .map_err(|e| AppError::ModelLoad(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| AppError::ModelLoad(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(self.intra_threads)
            .map_err(|e| AppError::ModelLoad(format!("Failed to set intra threads: {}", e)))?
            .with_execution_providers([
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ])
            .map_err(|e| {
                AppError::ModelLoad(format!("Failed to register CPU execution provider: {}", e))
            })?
            .commit_from_file(&self.model_path)
            .map_err(|e| AppError::ModelLoad(format!("Failed to load ONNX model: {}", e)))?;

        tracing::info!(
            model = %self.model_path.display(),
            normalization = %descriptor.normalization,
            input_dtype = descriptor.input.dtype.as_str(),
            output_dtype = descriptor.output.dtype.as_str(),
            labels = descriptor.labels.len(),
            "model loaded"
        );

        let backend = OrtBackend {
            session,
            output_dtype: descriptor.output.dtype,
        };
        Ok((descriptor, backend))
    }
}
