//! Ingredient water intensities and their aggregation into a dish footprint.

use crate::error::AppError;
use crate::models::analysis_types::FootprintRecord;
use crate::services::ingredient_resolver::table_error;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Litres of water per kilogram of an ingredient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterIntensity {
    pub green: f64,
    pub blue: f64,
    pub grey: f64,
}

#[derive(Deserialize)]
struct WaterRow {
    #[serde(rename = "Item")]
    item: String,
    #[serde(rename = "Green (L/kg)")]
    green: f64,
    #[serde(rename = "Blue (L/kg)")]
    blue: f64,
    #[serde(rename = "Grey (L/kg)")]
    grey: f64,
}

/// Water table keyed by lowercased ingredient name.
#[derive(Debug, Clone)]
pub struct WaterTable {
    items: HashMap<String, WaterIntensity>,
}

impl WaterTable {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let file = std::fs::File::open(path).map_err(|e| table_error(path, e))?;
        Self::from_reader(file).map_err(|e| table_error(path, e))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut items = HashMap::new();
        for row in rdr.deserialize::<WaterRow>() {
            let row = row?;
            items.entry(row.item.to_lowercase()).or_insert(WaterIntensity {
                green: row.green,
                blue: row.blue,
                grey: row.grey,
            });
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, ingredient: &str) -> Option<&WaterIntensity> {
        self.items.get(&ingredient.to_lowercase())
    }

    /// Sums the footprint of every known ingredient. Unknown ingredients add
    /// nothing, so an empty or fully unmatched list gives an all-zero record.
    pub fn aggregate(&self, ingredients: &[String]) -> FootprintRecord {
        let (mut green, mut blue, mut grey) = (0.0f64, 0.0f64, 0.0f64);
        for ingredient in ingredients {
            match self.get(ingredient) {
                Some(w) => {
                    green += w.green;
                    blue += w.blue;
                    grey += w.grey;
                }
                None => tracing::debug!(ingredient = ingredient.as_str(), "no water data"),
            }
        }

        let total = green + blue + grey;
        let pct = |x: f64| if total > 0.0 { round2(x / total * 100.0) } else { 0.0 };

        FootprintRecord {
            green: round2(green),
            blue: round2(blue),
            grey: round2(grey),
            total: round2(total),
            green_pct: pct(green),
            blue_pct: pct(blue),
            grey_pct: pct(grey),
        }
    }
}

/// Rounds to two decimal places, correctly rounded from the exact binary
/// value of `x`. Exact halfway cases go to the even hundredth.
pub fn round2(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    // A double is exactly halfway between two hundredths only when 8x is an
    // odd integer; in that case x * 100 is exact too.
    let eighths = x * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        return (x * 100.0).round_ties_even() / 100.0;
    }
    format!("{:.2}", x).parse().unwrap_or(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER: &str = "\
Item , Green (L/kg) , Blue (L/kg) , Grey (L/kg) ,Source
Rice,500,300,50,fao
chicken,100,50,20,fao
onion,50,10,5,fao
rice,1,1,1,dup
Saffron,0.333,0.333,0.334,x
";

    fn table() -> WaterTable {
        WaterTable::from_reader(WATER.as_bytes()).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_aggregate_biryani() {
        let fp = table().aggregate(&names(&["rice", "Chicken", "ONION"]));
        assert_eq!(fp.green, 650.0);
        assert_eq!(fp.blue, 360.0);
        assert_eq!(fp.grey, 75.0);
        assert_eq!(fp.total, 1085.0);
        assert_eq!(fp.green_pct, 59.91);
        assert_eq!(fp.blue_pct, 33.18);
        assert_eq!(fp.grey_pct, 6.91);
    }

    #[test]
    fn test_first_row_wins() {
        assert_eq!(table().get("RICE").map(|w| w.green), Some(500.0));
    }

    #[test]
    fn test_empty_list_is_all_zero() {
        assert_eq!(table().aggregate(&[]), FootprintRecord::default());
    }

    #[test]
    fn test_unmatched_ingredients_are_skipped() {
        let fp = table().aggregate(&names(&["unobtainium", ""]));
        assert_eq!(fp, FootprintRecord::default());

        let fp = table().aggregate(&names(&["unobtainium", "onion"]));
        assert_eq!(fp.total, 65.0);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let t = table();
        for list in [
            names(&["rice"]),
            names(&["saffron"]),
            names(&["saffron", "onion", "chicken"]),
            names(&["onion", "onion", "rice"]),
        ] {
            let fp = t.aggregate(&list);
            assert!((fp.total - (fp.green + fp.blue + fp.grey)).abs() <= 0.02);
            let sum = fp.green_pct + fp.blue_pct + fp.grey_pct;
            assert!((sum - 100.0).abs() <= 0.03, "{:?} sums to {}", list, sum);
        }
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let t = table();
        let list = names(&["saffron", "rice", "chicken"]);
        let a = t.aggregate(&list);
        let b = t.aggregate(&list);
        assert_eq!(a.green_pct.to_bits(), b.green_pct.to_bits());
        assert_eq!(a.total.to_bits(), b.total.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(62.801932), 62.8);
        assert_eq!(round2(7.246376), 7.25);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_round2_uses_exact_value() {
        // 1.115 is stored slightly below the halfway point.
        assert_eq!(round2(1.115), 1.11);
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1.005), 1.0);
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(3.125), 3.12);
        assert_eq!(round2(59.375), 59.38);
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(-0.375), -0.38);
    }

    #[test]
    fn test_halfway_percentages_do_not_overshoot() {
        let t = WaterTable::from_reader(
            "Item,Green (L/kg),Blue (L/kg),Grey (L/kg)\nlentils,1,12,19\nmint,1.115,0,0\n"
                .as_bytes(),
        )
        .unwrap();

        let fp = t.aggregate(&names(&["lentils"]));
        assert_eq!((fp.green_pct, fp.blue_pct, fp.grey_pct), (3.12, 37.5, 59.38));
        assert!((fp.green_pct + fp.blue_pct + fp.grey_pct - 100.0).abs() < 1e-9);

        assert_eq!(t.aggregate(&names(&["mint"])).green, 1.11);
    }
}
