use crate::error::AppError;
use crate::models::analysis_types::{AnalysisResult, BatchEntry, BatchReport, ModelInfo};
use crate::services::analyzer::Analyzer;
use crate::services::classifier::inference;
use crate::services::classifier::model_manager::TensorBackend;
use crate::services::classifier::quantization::QuantParams;
use crate::services::fs_service;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn analyze_image<B: TensorBackend>(
    analyzer: &Analyzer<B>,
    path: &Path,
) -> Result<AnalysisResult, AppError> {
    let img = inference::open_image(path)?;
    analyzer.analyze(&img)
}

fn analyze_entry<B: TensorBackend>(analyzer: &Analyzer<B>, path: &Path) -> BatchEntry {
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    // Decode and preprocess run in parallel; only the model run is serialized.
    let result = inference::open_image(path)
        .and_then(|img| analyzer.engine().prepare(&img))
        .and_then(|input| analyzer.analyze_prepared(input));

    let (result, error) = match result {
        Ok(r) => (Some(r), None),
        Err(e) => {
            tracing::warn!(file = file_name.as_str(), error = %e, "failed to analyze");
            (None, Some(e))
        }
    };

    BatchEntry {
        file_name,
        file_path: path.to_string_lossy().to_string(),
        result,
        error,
    }
}

/// Analyzes every image in `paths`. A failing image is reported in its entry
/// and does not stop the batch.
pub fn analyze_paths<B: TensorBackend>(analyzer: &Analyzer<B>, paths: &[PathBuf]) -> BatchReport {
    let start_time = std::time::Instant::now();

    let results: Vec<BatchEntry> = paths
        .par_iter()
        .map(|path| analyze_entry(analyzer, path))
        .collect();

    let succeeded = results.iter().filter(|r| r.result.is_some()).count();
    tracing::info!(
        total = paths.len(),
        succeeded,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "batch finished"
    );

    BatchReport {
        total: paths.len(),
        succeeded,
        failed: paths.len() - succeeded,
        results,
    }
}

pub async fn analyze_folder<B>(
    analyzer: Arc<Analyzer<B>>,
    folder: PathBuf,
) -> Result<BatchReport, AppError>
where
    B: TensorBackend + 'static,
{
    let image_paths = fs_service::list_image_files(&folder)?;
    tracing::info!(folder = %folder.display(), images = image_paths.len(), "starting batch");

    tokio::task::spawn_blocking(move || analyze_paths(&analyzer, &image_paths))
        .await
        .map_err(|e| AppError::Inference(format!("Task join failed: {}", e)))
}

pub fn model_info<B: TensorBackend>(analyzer: &Analyzer<B>) -> ModelInfo {
    let descriptor = analyzer.engine().descriptor();
    let quant = |q: Option<QuantParams>| q.map(|q| (q.scale, q.zero_point));
    ModelInfo {
        normalization: analyzer.engine().normalization().to_string(),
        image_size: descriptor.image_size,
        input_dtype: descriptor.input.dtype.as_str().to_string(),
        input_quantization: quant(descriptor.input.quantization),
        output_dtype: descriptor.output.dtype.as_str().to_string(),
        output_quantization: quant(descriptor.output.quantization),
        label_count: descriptor.labels.len(),
        table_policy: analyzer.tables().policy().to_string(),
    }
}
