use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The model or its descriptor could not be loaded. Nothing can be served.
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    /// The image cannot be turned into the tensor the model expects.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Failed to load table {path}: {message}")]
    TableLoad { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ModelLoad(_) => "model_load",
            AppError::ShapeMismatch(_) => "shape_mismatch",
            AppError::Decode(_) => "decode",
            AppError::Inference(_) => "inference",
            AppError::TableLoad { .. } => "table_load",
            AppError::Io(_) => "io",
        }
    }
}

impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AppError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Decode(err.to_string())
    }
}
