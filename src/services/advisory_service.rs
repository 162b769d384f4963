pub const GREEN_ADVICE: &str = "High reliance on rain-fed (green) water – environmentally positive.";
pub const BLUE_ADVICE: &str =
    "Moderate to high freshwater (blue) water usage – consume responsibly.";
pub const GREY_ADVICE: &str =
    "Noticeable pollution-related (grey) water footprint – avoid frequent consumption.";

pub const GREEN_THRESHOLD_PCT: f64 = 50.0;
pub const BLUE_THRESHOLD_PCT: f64 = 30.0;
pub const GREY_THRESHOLD_PCT: f64 = 10.0;

/// Advice for a footprint split. Each rule is checked on its own; the result
/// is ordered green, blue, grey and may be empty.
pub fn advise(green_pct: f64, blue_pct: f64, grey_pct: f64) -> Vec<String> {
    [
        (green_pct >= GREEN_THRESHOLD_PCT, GREEN_ADVICE),
        (blue_pct >= BLUE_THRESHOLD_PCT, BLUE_ADVICE),
        (grey_pct >= GREY_THRESHOLD_PCT, GREY_ADVICE),
    ]
    .into_iter()
    .filter(|(fired, _)| *fired)
    .map(|(_, advice)| advice.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rule_fires() {
        assert!(advise(0.0, 0.0, 0.0).is_empty());
        assert!(advise(49.99, 29.99, 9.99).is_empty());
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        assert_eq!(advise(50.0, 0.0, 0.0), vec![GREEN_ADVICE]);
        assert_eq!(advise(0.0, 30.0, 0.0), vec![BLUE_ADVICE]);
        assert_eq!(advise(0.0, 0.0, 10.0), vec![GREY_ADVICE]);
    }

    #[test]
    fn test_rules_fire_independently_in_order() {
        assert_eq!(
            advise(59.91, 33.18, 6.91),
            vec![GREEN_ADVICE.to_string(), BLUE_ADVICE.to_string()]
        );
        assert_eq!(
            advise(50.0, 30.0, 20.0),
            vec![GREEN_ADVICE, BLUE_ADVICE, GREY_ADVICE]
        );
        assert_eq!(advise(10.0, 40.0, 50.0), vec![BLUE_ADVICE, GREY_ADVICE]);
    }
}
