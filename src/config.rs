use crate::error::AppError;
use crate::services::analyzer::Analyzer;
use crate::services::classifier::inference::InferenceEngine;
use crate::services::classifier::model_manager::{ModelManager, Normalization, OrtBackend};
use crate::services::table_store::{TablePolicy, TableStore};
use clap::Args;
use std::path::PathBuf;

/// Locations of the model and lookup tables, and how to use them.
#[derive(Args, Debug, Clone)]
pub struct AnalyzerConfig {
    /// ONNX classifier
    #[arg(long, env = "DISH_MODEL", default_value = "mobilenetv3_large.onnx")]
    pub model: PathBuf,

    /// Model descriptor JSON [default: the model path with a .json extension]
    #[arg(long, env = "DISH_MODEL_CONFIG")]
    pub model_config: Option<PathBuf>,

    /// Dish to ingredient table
    #[arg(long, env = "DISH_TABLE", default_value = "dishes.csv")]
    pub dishes: PathBuf,

    /// Ingredient water footprint table
    #[arg(long, env = "WATER_TABLE", default_value = "water.csv")]
    pub water: PathBuf,

    /// Override the pixel normalization named in the model descriptor
    #[arg(long, env = "DISH_NORMALIZATION", value_enum)]
    pub normalization: Option<Normalization>,

    #[arg(long, env = "DISH_TABLE_POLICY", value_enum, default_value_t = TablePolicy::Cached)]
    pub table_policy: TablePolicy,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "DISH_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl AnalyzerConfig {
    pub fn model_manager(&self) -> ModelManager {
        ModelManager::new(self.model.clone(), self.model_config.clone())
            .with_intra_threads(self.intra_threads)
            .with_normalization(self.normalization)
    }

    /// Loads the model and opens the tables. Slow; call once at startup.
    pub fn build(&self) -> Result<Analyzer<OrtBackend>, AppError> {
        let (descriptor, backend) = self.model_manager().load()?;
        let tables = TableStore::open(self.dishes.clone(), self.water.clone(), self.table_policy)?;
        Ok(Analyzer::new(InferenceEngine::new(descriptor, backend), tables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: AnalyzerConfig,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["test"]).unwrap();
        assert_eq!(cli.config.model, PathBuf::from("mobilenetv3_large.onnx"));
        assert_eq!(cli.config.table_policy, TablePolicy::Cached);
        assert!(cli.config.normalization.is_none());
        assert_eq!(
            cli.config.model_manager().config_path,
            PathBuf::from("mobilenetv3_large.json")
        );
    }

    #[test]
    fn test_value_enums() {
        let cli = TestCli::try_parse_from([
            "test",
            "--normalization",
            "signed-unit",
            "--table-policy",
            "per-request",
        ])
        .unwrap();
        assert_eq!(cli.config.normalization, Some(Normalization::SignedUnit));
        assert_eq!(cli.config.table_policy, TablePolicy::PerRequest);
    }
}
