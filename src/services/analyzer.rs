use crate::error::AppError;
use crate::models::analysis_types::{AnalysisResult, InferenceResult};
use crate::services::advisory_service::advise;
use crate::services::classifier::inference::InferenceEngine;
use crate::services::classifier::model_manager::TensorBackend;
use crate::services::classifier::quantization::InputTensor;
use crate::services::footprint_service::round2;
use crate::services::table_store::TableStore;
use image::DynamicImage;

/// Runs classification, ingredient lookup, footprint aggregation and advice
/// for one image. Errors from any stage are returned unchanged.
pub struct Analyzer<B: TensorBackend> {
    engine: InferenceEngine<B>,
    tables: TableStore,
}

impl<B: TensorBackend> Analyzer<B> {
    pub fn new(engine: InferenceEngine<B>, tables: TableStore) -> Self {
        Self { engine, tables }
    }

    pub fn engine(&self) -> &InferenceEngine<B> {
        &self.engine
    }

    pub fn tables(&self) -> &TableStore {
        &self.tables
    }

    pub fn analyze(&self, img: &DynamicImage) -> Result<AnalysisResult, AppError> {
        let input = self.engine.prepare(img)?;
        self.analyze_prepared(input)
    }

    /// Same as [`Analyzer::analyze`] for a tensor already built with
    /// [`InferenceEngine::prepare`].
    pub fn analyze_prepared(&self, input: InputTensor) -> Result<AnalysisResult, AppError> {
        let prediction = self.engine.run(input)?;
        self.report(prediction)
    }

    fn report(&self, prediction: InferenceResult) -> Result<AnalysisResult, AppError> {
        let tables = self.tables.tables()?;
        let ingredients = tables.dishes.resolve(&prediction.label);
        let footprint = tables.water.aggregate(&ingredients);
        let advice = advise(footprint.green_pct, footprint.blue_pct, footprint.grey_pct);

        tracing::debug!(
            dish = prediction.label.as_str(),
            ingredients = ingredients.len(),
            total = footprint.total,
            "analysis complete"
        );

        Ok(AnalysisResult {
            dish: prediction.label,
            confidence: round2(prediction.confidence as f64 * 100.0),
            ingredients,
            water_footprint: footprint,
            sustainability_advice: advice,
        })
    }
}
