//! Weight units and conversion constants
//!
//! Standard weight units are derived relative to a base serving whose gram
//! weight is known, so a food reported "per 100 g" can also be bought by the
//! pound or ounce.

use crate::models::UnitOption;

// ============================================================================
// Weight Conversion Constants (to grams)
// ============================================================================

/// Grams per ounce
pub const G_PER_OZ: f64 = 28.3495;
/// Grams per pound
pub const G_PER_LB: f64 = 453.592;
/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;

// ============================================================================
// Unit Recognition
// ============================================================================

/// Get the conversion factor to grams for a weight unit label
pub fn grams_per_unit(unit: &str) -> Option<f64> {
    let lower = unit.to_lowercase();
    let trimmed = lower.trim();

    match trimmed {
        "g" | "gram" | "grams" => Some(1.0),
        "kg" | "kilogram" | "kilograms" => Some(G_PER_KG),
        "oz" | "ounce" | "ounces" => Some(G_PER_OZ),
        "lb" | "lbs" | "pound" | "pounds" => Some(G_PER_LB),
        _ => None,
    }
}

/// Unit options for buying by weight, relative to a base serving of
/// `base_serving_grams`.
///
/// Returns nothing when the serving weight is unknown or not positive.
pub fn weight_unit_options(base_serving_grams: f64) -> Vec<UnitOption> {
    if !base_serving_grams.is_finite() || base_serving_grams <= 0.0 {
        return Vec::new();
    }

    [
        ("lb", G_PER_LB, &["1 lb", "2 lbs", "3 lbs"][..]),
        ("oz", G_PER_OZ, &["8 oz", "16 oz"][..]),
        ("g", 1.0, &["100 g", "500 g"][..]),
        ("kg", G_PER_KG, &["1 kg"][..]),
    ]
    .into_iter()
    .map(|(label, grams, sizes)| {
        UnitOption::new(label, grams / base_serving_grams).with_sizes(sizes)
    })
    .collect()
}

/// Append `extra` units whose labels are not already present
pub fn merge_units(units: &mut Vec<UnitOption>, extra: Vec<UnitOption>) {
    for unit in extra {
        if !units.iter().any(|u| u.label == unit.label) {
            units.push(unit);
        }
    }
}
