use crate::error::AppError;
use crate::services::footprint_service::WaterTable;
use crate::services::ingredient_resolver::DishTable;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// When the lookup tables are read from disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TablePolicy {
    /// Parsed once; call [`TableStore::reload`] after the files change.
    #[default]
    Cached,
    /// Re-read on every analysis.
    PerRequest,
}

impl fmt::Display for TablePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TablePolicy::Cached => write!(f, "cached"),
            TablePolicy::PerRequest => write!(f, "per-request"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupTables {
    pub dishes: DishTable,
    pub water: WaterTable,
}

#[derive(Debug, Clone)]
struct TablePaths {
    dishes: PathBuf,
    water: PathBuf,
}

impl TablePaths {
    fn load(&self) -> Result<LookupTables, AppError> {
        let dishes = DishTable::from_path(&self.dishes)?;
        let water = WaterTable::from_path(&self.water)?;
        tracing::debug!(
            dishes = dishes.len(),
            ingredients = water.len(),
            "lookup tables loaded"
        );
        Ok(LookupTables { dishes, water })
    }
}

#[derive(Debug)]
pub struct TableStore {
    paths: TablePaths,
    policy: TablePolicy,
    cached: RwLock<Arc<LookupTables>>,
}

impl TableStore {
    /// Opens both tables. They are read here under either policy so a bad
    /// path fails at startup rather than on the first request.
    pub fn open(dishes: PathBuf, water: PathBuf, policy: TablePolicy) -> Result<Self, AppError> {
        let paths = TablePaths { dishes, water };
        let tables = paths.load()?;
        tracing::info!(
            dishes = %paths.dishes.display(),
            water = %paths.water.display(),
            %policy,
            "lookup tables opened"
        );
        Ok(Self {
            paths,
            policy,
            cached: RwLock::new(Arc::new(tables)),
        })
    }

    pub fn policy(&self) -> TablePolicy {
        self.policy
    }

    pub fn tables(&self) -> Result<Arc<LookupTables>, AppError> {
        if self.policy == TablePolicy::PerRequest {
            return self.paths.load().map(Arc::new);
        }
        let guard = self.cached.read().map_err(|_| poisoned())?;
        Ok(guard.clone())
    }

    /// Re-reads the files and replaces the cached tables. On failure the
    /// previous tables stay in place.
    pub fn reload(&self) -> Result<(), AppError> {
        let tables = Arc::new(self.paths.load()?);
        let mut guard = self.cached.write().map_err(|_| poisoned())?;
        *guard = tables;
        Ok(())
    }
}

fn poisoned() -> AppError {
    AppError::TableLoad {
        path: "<cache>".to_string(),
        message: "lock poisoned".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DISHES: &str = "Dish (cleaned),Matched_ingredients\nkhichdi,\"rice, lentils\"\n";
    const WATER_V1: &str = "Item,Green (L/kg),Blue (L/kg),Grey (L/kg)\nrice,10,0,0\n";
    const WATER_V2: &str = "Item,Green (L/kg),Blue (L/kg),Grey (L/kg)\nrice,99,0,0\n";

    fn write_tables(dir: &std::path::Path) -> (PathBuf, PathBuf) {
        let dishes = dir.join("dishes.csv");
        let water = dir.join("water.csv");
        fs::write(&dishes, DISHES).unwrap();
        fs::write(&water, WATER_V1).unwrap();
        (dishes, water)
    }

    fn rice_green(store: &TableStore) -> f64 {
        store.tables().unwrap().water.get("rice").unwrap().green
    }

    #[test]
    fn test_cached_ignores_file_changes_until_reload() {
        let dir = tempfile::tempdir().unwrap();
        let (dishes, water) = write_tables(dir.path());
        let store = TableStore::open(dishes, water.clone(), TablePolicy::Cached).unwrap();
        assert_eq!(rice_green(&store), 10.0);

        fs::write(&water, WATER_V2).unwrap();
        assert_eq!(rice_green(&store), 10.0);

        store.reload().unwrap();
        assert_eq!(rice_green(&store), 99.0);
    }

    #[test]
    fn test_per_request_sees_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let (dishes, water) = write_tables(dir.path());
        let store = TableStore::open(dishes, water.clone(), TablePolicy::PerRequest).unwrap();
        assert_eq!(rice_green(&store), 10.0);

        fs::write(&water, WATER_V2).unwrap();
        assert_eq!(rice_green(&store), 99.0);
    }

    #[test]
    fn test_failed_reload_keeps_previous_tables() {
        let dir = tempfile::tempdir().unwrap();
        let (dishes, water) = write_tables(dir.path());
        let store = TableStore::open(dishes, water.clone(), TablePolicy::Cached).unwrap();

        fs::write(&water, "Item,Green (L/kg),Blue (L/kg),Grey (L/kg)\nrice,lots,0,0\n").unwrap();
        assert!(matches!(store.reload(), Err(AppError::TableLoad { .. })));
        assert_eq!(rice_green(&store), 10.0);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = TableStore::open(
            dir.path().join("nope.csv"),
            dir.path().join("water.csv"),
            TablePolicy::Cached,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::TableLoad { .. }));
    }
}
