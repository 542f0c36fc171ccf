//! Seeded Poisson synthesis of estimated sales.
//!
//! The scraped catalog carries no sales figures, so the pipeline synthesizes
//! them: well-rated, in-stock products are assumed to sell more. The draw is
//! Poisson with rate `rating * 10 * availability_score + 1`, from a ChaCha8
//! RNG seeded per run so the pipeline stays deterministic.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Poisson;
use tracing::debug;

use crate::dataset::ProductTable;
use crate::preprocess::NEUTRAL_SCORE;

/// Synthesizes `estimated_sales` for every row, in place.
///
/// Rows whose rating or availability score is still missing (possible only
/// when synthesis runs before imputation) use the neutral 0.5 instead.
/// A degenerate Poisson rate falls back to the rate itself as the estimate.
///
/// Returns the number of rows filled.
pub fn synthesize_sales(table: &mut ProductTable, seed: u64) -> usize {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut filled = 0usize;

    for record in table.records_mut() {
        let rating = record.average_rating.unwrap_or(NEUTRAL_SCORE);
        let availability = record.availability_score.unwrap_or(NEUTRAL_SCORE);
        let rate = (rating * 10.0 * availability + 1.0).max(f64::MIN_POSITIVE);

        let sales = match Poisson::new(rate) {
            Ok(dist) => rng.sample(dist),
            Err(e) => {
                debug!(rate, error = %e, "Degenerate Poisson rate; using the rate directly");
                rate
            }
        };

        record.estimated_sales = Some(sales);
        filled += 1;
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ProductRecord;
    use crate::preprocess::{impute_numeric, map_availability};

    fn sample_table() -> ProductTable {
        ProductTable::from_records(vec![
            ProductRecord::new()
                .with_price(10.0)
                .with_rating(4.5)
                .with_availability("En stock"),
            ProductRecord::new()
                .with_price(25.0)
                .with_rating(2.0)
                .with_availability("Rupture"),
            ProductRecord::new().with_price(5.0),
        ])
    }

    #[test]
    fn test_synthesis_fills_every_row() {
        let mut table = sample_table();
        impute_numeric(&mut table);
        map_availability(&mut table);

        let filled = synthesize_sales(&mut table, 42);

        assert_eq!(filled, 3);
        for record in table.records() {
            let sales = record.estimated_sales.expect("sales synthesized");
            assert!(sales >= 0.0);
        }
    }

    #[test]
    fn test_synthesis_is_deterministic_per_seed() {
        let mut first = sample_table();
        let mut second = sample_table();
        for table in [&mut first, &mut second] {
            impute_numeric(table);
            map_availability(table);
            synthesize_sales(table, 7);
        }

        let sales = |t: &ProductTable| -> Vec<Option<f64>> {
            t.records().iter().map(|r| r.estimated_sales).collect()
        };
        assert_eq!(sales(&first), sales(&second));
    }

    #[test]
    fn test_different_seeds_usually_differ() {
        let mut first = sample_table();
        let mut second = sample_table();
        for (table, seed) in [(&mut first, 1u64), (&mut second, 2u64)] {
            impute_numeric(table);
            map_availability(table);
            synthesize_sales(table, seed);
        }

        let a: Vec<Option<f64>> = first.records().iter().map(|r| r.estimated_sales).collect();
        let b: Vec<Option<f64>> = second.records().iter().map(|r| r.estimated_sales).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_out_of_stock_rate_is_one() {
        // rating * 10 * 0.0 + 1 = 1, so draws stay small but valid.
        let mut table = ProductTable::from_records(vec![ProductRecord::new()
            .with_price(10.0)
            .with_rating(5.0)
            .with_availability("Rupture")]);
        impute_numeric(&mut table);
        map_availability(&mut table);
        synthesize_sales(&mut table, 42);

        let sales = table.records()[0].estimated_sales.expect("sales");
        assert!(sales < 20.0, "Poisson(1) draw should be small, got {sales}");
    }
}
