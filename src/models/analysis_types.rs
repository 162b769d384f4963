use serde::Serialize;

/// Top-1 prediction from the classifier. `confidence` is the raw model score.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InferenceResult {
    pub label: String,
    pub confidence: f32,
}

/// Water use of a dish in litres per kilogram, split by source.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Default)]
pub struct FootprintRecord {
    pub green: f64,
    pub blue: f64,
    pub grey: f64,
    pub total: f64,
    pub green_pct: f64,
    pub blue_pct: f64,
    pub grey_pct: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AnalysisResult {
    pub dish: String,
    /// Percentage, 0-100.
    pub confidence: f64,
    pub ingredients: Vec<String>,
    pub water_footprint: FootprintRecord,
    pub sustainability_advice: Vec<String>,
}

/// Envelope printed for a single analysis.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub status: &'static str,
    pub data: AnalysisResult,
}

impl AnalysisResponse {
    pub fn success(data: AnalysisResult) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub file_name: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<crate::error::AppError>,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchEntry>,
}

/// What the loaded model expects, as reported by the `info` command.
#[derive(Debug, Serialize, Clone)]
pub struct ModelInfo {
    pub normalization: String,
    pub image_size: u32,
    pub input_dtype: String,
    pub input_quantization: Option<(f32, i32)>,
    pub output_dtype: String,
    pub output_quantization: Option<(f32, i32)>,
    pub label_count: usize,
    pub table_policy: String,
}
