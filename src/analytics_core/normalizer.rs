//! Distribution normalization from raw observations to clean, non-negative sequences

use super::error::EngineError;
use super::types::{Category, Distribution, Observation};

/// Normalize a category's raw observations into a [`Distribution`]
///
/// Cumulative categories are de-accumulated first, then any negative value
/// shifts the whole sequence by `|min| + 1`. Keys and order are preserved.
/// An empty input yields an empty distribution; the calculators reject it.
pub fn normalize(category: &Category, raw: &[Observation]) -> Result<Distribution, EngineError> {
    if let Some(bad) = raw.iter().find(|o| !o.value.is_finite()) {
        return Err(EngineError::data_in(
            &category.name,
            format!("non-finite value {} for key '{}'", bad.value, bad.key),
        ));
    }

    let mut values: Vec<f64> = raw.iter().map(|o| o.value).collect();

    if category.cumulative {
        deaccumulate(&mut values);
    }

    if shift_non_negative(&mut values) {
        log::debug!(
            "Shifted {} observations of {} to non-negative range",
            values.len(),
            category.name
        );
    }

    if values.iter().any(|v| !v.is_finite()) {
        return Err(EngineError::data_in(
            &category.name,
            "normalization produced a non-finite value",
        ));
    }

    let observations = raw
        .iter()
        .zip(values)
        .map(|(o, value)| Observation::new(o.key.clone(), value))
        .collect();

    Ok(Distribution { observations })
}

/// Convert "count at or above threshold" values into exclusive band counts
///
/// Input is ordered by ascending threshold. The scan runs from the highest
/// threshold down; each band subtracts the cumulative count of the band above.
/// Applying this twice is not the identity.
pub fn deaccumulate(values: &mut [f64]) {
    let mut removed = 0.0;
    for value in values.iter_mut().rev() {
        let cumulative = *value;
        *value = cumulative - removed;
        removed = cumulative;
    }
}

/// Shift all values by `|min| + 1` when any value is negative
///
/// Returns true if a shift was applied.
pub fn shift_non_negative(values: &mut [f64]) -> bool {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if min >= 0.0 {
        return false;
    }

    let offset = min.abs() + 1.0;
    for value in values.iter_mut() {
        *value += offset;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observations(values: &[f64]) -> Vec<Observation> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Observation::new(format!("k{}", i), *v))
            .collect()
    }

    #[test]
    fn test_deaccumulate_descending_cumulative() {
        let mut values = vec![100.0, 60.0, 30.0, 10.0];
        deaccumulate(&mut values);
        assert_eq!(values, vec![40.0, 30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_deaccumulate_is_not_idempotent() {
        let mut values = vec![100.0, 60.0, 30.0, 10.0];
        deaccumulate(&mut values);
        let once = values.clone();
        deaccumulate(&mut values);
        assert_ne!(values, once);
    }

    #[test]
    fn test_shift_negative_values() {
        let mut values = vec![-3.0, 0.0, 2.0];
        assert!(shift_non_negative(&mut values));
        assert_eq!(values, vec![1.0, 4.0, 6.0]);
        assert!(values.iter().all(|v| *v > 0.0));
    }

    #[test]
    fn test_no_shift_when_non_negative() {
        let mut values = vec![0.0, 5.0];
        assert!(!shift_non_negative(&mut values));
        assert_eq!(values, vec![0.0, 5.0]);
    }

    #[test]
    fn test_normalize_cumulative_category_keeps_keys() {
        let category = Category::new("nativeAssetsByAddress").cumulative();
        let raw = vec![
            Observation::new("above_0_001", 100.0),
            Observation::new("above_0_01", 60.0),
            Observation::new("above_0_1", 30.0),
            Observation::new("above_1", 10.0),
        ];

        let dist = normalize(&category, &raw).unwrap();
        assert_eq!(dist.values(), vec![40.0, 30.0, 20.0, 10.0]);
        assert_eq!(dist.observations[0].key, "above_0_001");
        assert_eq!(dist.observations[3].key, "above_1");
    }

    #[test]
    fn test_normalize_rejects_non_finite() {
        let category = Category::new("pools");
        let raw = observations(&[1.0, f64::NAN]);

        let err = normalize(&category, &raw).unwrap_err();
        assert!(err.is_data());
        assert_eq!(err.category(), Some("pools"));
    }

    #[test]
    fn test_normalize_empty_is_empty_distribution() {
        let dist = normalize(&Category::new("pools"), &[]).unwrap();
        assert!(dist.is_empty());
    }
}
