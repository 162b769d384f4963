//! Dish name to ingredient list lookup.

use crate::error::AppError;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

#[derive(Deserialize)]
struct DishRow {
    #[serde(rename = "Dish (cleaned)")]
    dish: String,
    #[serde(rename = "Matched_ingredients")]
    ingredients: String,
}

/// Dish table keyed by lowercased dish name.
#[derive(Debug, Clone)]
pub struct DishTable {
    dishes: HashMap<String, Vec<String>>,
}

impl DishTable {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let file = std::fs::File::open(path).map_err(|e| table_error(path, e))?;
        Self::from_reader(file).map_err(|e| table_error(path, e))
    }

    /// Parses the CSV. Header names are trimmed; when a dish appears twice the
    /// first row wins.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut dishes = HashMap::new();
        for row in rdr.deserialize::<DishRow>() {
            let row = row?;
            dishes
                .entry(row.dish.to_lowercase())
                .or_insert_with(|| split_ingredients(&row.ingredients));
        }
        Ok(Self { dishes })
    }

    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }

    /// Ingredients of `dish`, matched case-insensitively. An unknown dish has
    /// no ingredients; that is not an error.
    pub fn resolve(&self, dish: &str) -> Vec<String> {
        self.dishes
            .get(&dish.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}

fn split_ingredients(field: &str) -> Vec<String> {
    field.split(',').map(|s| s.trim().to_string()).collect()
}

pub(crate) fn table_error(path: &Path, err: impl std::fmt::Display) -> AppError {
    AppError::TableLoad {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISHES: &str = "\
 Dish (cleaned) ,Matched_ingredients ,Cuisine
Biryani,\"rice, chicken ,onion\",indian
dal tadka,\"lentils,  ghee\",indian
BIRYANI,\"should, not, win\",indian
";

    fn table() -> DishTable {
        DishTable::from_reader(DISHES.as_bytes()).unwrap()
    }

    #[test]
    fn test_resolve_splits_and_trims() {
        assert_eq!(table().resolve("biryani"), vec!["rice", "chicken", "onion"]);
        assert_eq!(table().resolve("Dal Tadka"), vec!["lentils", "ghee"]);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(table().len(), 2);
        assert_eq!(table().resolve("BIRYANI"), vec!["rice", "chicken", "onion"]);
    }

    #[test]
    fn test_unknown_dish_is_empty() {
        assert!(table().resolve("pav bhaji").is_empty());
        assert!(table().resolve("").is_empty());
    }

    #[test]
    fn test_missing_column_is_error() {
        let err = DishTable::from_reader("Dish,Ingredients\nx,y\n".as_bytes());
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_file_is_table_load_error() {
        let err = DishTable::from_path(Path::new("/nonexistent/dishes.csv")).unwrap_err();
        assert!(matches!(err, AppError::TableLoad { .. }));
    }
}
