//! Min-max normalization of the scoring features.

use crate::dataset::ProductTable;

/// Observed range of one feature column.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

/// Ranges used for the last normalization pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeReport {
    pub price: FeatureRange,
    pub rating: FeatureRange,
    pub sales: FeatureRange,
    pub availability: FeatureRange,
}

/// Scales a value into [0, 1] given its column range.
///
/// A constant column scales to 0.0, matching the usual min-max convention of
/// treating a zero range as a unit divisor.
fn scale(value: f64, range: FeatureRange) -> f64 {
    let span = range.max - range.min;
    if span == 0.0 || !span.is_finite() {
        0.0
    } else {
        (value - range.min) / span
    }
}

fn range_of(values: impl Iterator<Item = Option<f64>>) -> FeatureRange {
    let mut range = FeatureRange {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };
    let mut seen = false;
    for value in values.flatten() {
        if value.is_finite() {
            range.min = range.min.min(value);
            range.max = range.max.max(value);
            seen = true;
        }
    }
    if !seen {
        return FeatureRange::default();
    }
    range
}

/// Min-max scales the four scoring features in place.
///
/// Values that are missing stay missing; downstream scoring substitutes the
/// neutral 0.5 for them.
pub fn min_max_normalize(table: &mut ProductTable) -> NormalizeReport {
    let report = NormalizeReport {
        price: range_of(table.records().iter().map(|r| r.price)),
        rating: range_of(table.records().iter().map(|r| r.average_rating)),
        sales: range_of(table.records().iter().map(|r| r.estimated_sales)),
        availability: range_of(table.records().iter().map(|r| r.availability_score)),
    };

    for record in table.records_mut() {
        record.price = record.price.map(|v| scale(v, report.price));
        record.average_rating = record.average_rating.map(|v| scale(v, report.rating));
        record.estimated_sales = record.estimated_sales.map(|v| scale(v, report.sales));
        record.availability_score = record
            .availability_score
            .map(|v| scale(v, report.availability));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ProductRecord;

    #[test]
    fn test_min_max_scales_to_unit_interval() {
        let mut table = ProductTable::from_records(vec![
            ProductRecord::new().with_price(10.0),
            ProductRecord::new().with_price(20.0),
            ProductRecord::new().with_price(30.0),
        ]);

        let report = min_max_normalize(&mut table);

        assert_eq!(report.price.min, 10.0);
        assert_eq!(report.price.max, 30.0);
        assert_eq!(table.records()[0].price, Some(0.0));
        assert_eq!(table.records()[1].price, Some(0.5));
        assert_eq!(table.records()[2].price, Some(1.0));
    }

    #[test]
    fn test_constant_column_scales_to_zero() {
        let mut table = ProductTable::from_records(vec![
            ProductRecord::new().with_rating(4.0),
            ProductRecord::new().with_rating(4.0),
        ]);

        min_max_normalize(&mut table);

        assert_eq!(table.records()[0].average_rating, Some(0.0));
        assert_eq!(table.records()[1].average_rating, Some(0.0));
    }

    #[test]
    fn test_missing_values_stay_missing() {
        let mut table = ProductTable::from_records(vec![
            ProductRecord::new().with_price(10.0),
            ProductRecord::new(),
        ]);

        min_max_normalize(&mut table);

        assert_eq!(table.records()[1].price, None);
    }
}
