use crate::error::AppError;
use crate::models::analysis_types::InferenceResult;
use crate::services::classifier::model_manager::{ModelDescriptor, Normalization, TensorBackend};
use crate::services::classifier::quantization::{dequantize_output, quantize_input, InputTensor};
use image::{DynamicImage, ImageReader};
use ndarray::Array4;
use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;

pub fn open_image(path: &Path) -> Result<DynamicImage, AppError> {
    let img = ImageReader::open(path)
        .map_err(|e| AppError::Decode(format!("Failed to open image {}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| AppError::Decode(format!("Failed to read image {}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| AppError::Decode(format!("Failed to decode image {}: {}", path.display(), e)))?;
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, AppError> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::Decode(format!("Failed to read image: {}", e)))?
        .decode()?;
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

/// Resizes (no crop, aspect ratio not kept) to `size`x`size` and packs the
/// pixels into a normalized NHWC tensor of shape [1, size, size, 3].
pub fn preprocess_image(
    img: &DynamicImage,
    size: u32,
    normalization: Normalization,
) -> Result<Array4<f32>, AppError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(AppError::ShapeMismatch(format!(
            "Cannot resize a {}x{} image",
            img.width(),
            img.height()
        )));
    }

    let resized = img.resize_exact(size, size, image::imageops::FilterType::CatmullRom);
    let rgb = resized.to_rgb8();

    let data: Vec<f32> = rgb.into_raw().into_iter().map(|p| normalization.apply(p)).collect();

    Array4::from_shape_vec((1, size as usize, size as usize, 3), data)
        .map_err(|e| AppError::ShapeMismatch(format!("Failed to create tensor: {}", e)))
}

/// Index of the largest score; the first one wins on ties. NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Image classifier around a single model instance.
///
/// Preprocessing and quantization run on the caller's thread; only the
/// forward pass holds the backend lock.
pub struct InferenceEngine<B: TensorBackend> {
    descriptor: ModelDescriptor,
    backend: Mutex<B>,
}

impl<B: TensorBackend> InferenceEngine<B> {
    pub fn new(descriptor: ModelDescriptor, backend: B) -> Self {
        Self {
            descriptor,
            backend: Mutex::new(backend),
        }
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    pub fn normalization(&self) -> Normalization {
        self.descriptor.normalization
    }

    pub fn prepare(&self, img: &DynamicImage) -> Result<InputTensor, AppError> {
        let x = preprocess_image(img, self.descriptor.image_size, self.descriptor.normalization)?;
        Ok(quantize_input(
            x,
            self.descriptor.input.dtype,
            self.descriptor.input.quantization,
        ))
    }

    pub fn run(&self, input: InputTensor) -> Result<InferenceResult, AppError> {
        let output = {
            let mut backend = self
                .backend
                .lock()
                .map_err(|_| AppError::Inference("Model lock poisoned".to_string()))?;
            backend.run(input)?
        };

        let labels = &self.descriptor.labels;
        if output.len() != labels.len() {
            return Err(AppError::ShapeMismatch(format!(
                "Model produced {} scores for {} labels",
                output.len(),
                labels.len()
            )));
        }

        let scores = dequantize_output(output, self.descriptor.output.quantization);
        let idx = argmax(&scores)
            .ok_or_else(|| AppError::Inference("Model produced no valid scores".to_string()))?;
        let label = labels
            .get(idx)
            .ok_or_else(|| AppError::Inference(format!("No label for class {}", idx)))?;

        tracing::debug!(label, confidence = scores[idx], "classified image");

        Ok(InferenceResult {
            label: label.to_string(),
            confidence: scores[idx],
        })
    }

    pub fn infer(&self, img: &DynamicImage) -> Result<InferenceResult, AppError> {
        let input = self.prepare(img)?;
        self.run(input)
    }
}
