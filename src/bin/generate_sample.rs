use anyhow::{Context, Result};
use serde::Serialize;

/// One row of the sample sales table.
#[derive(Debug, Clone, Serialize)]
struct SaleRecord {
    id: u32,
    category: &'static str,
    region: &'static str,
    amount: Option<f64>,
    quantity: u32,
    discount: f64,
    returned: bool,
    order_date: String,
}

/// SplitMix64: enough randomness for reproducible sample rows.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        low + (high - low) * unit
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const UNIQUE_ROWS: u32 = 97;
const DUPLICATED_ROWS: usize = 3;
/// Every 19th order has no recorded amount (5 of 97).
const MISSING_EVERY: u32 = 19;

fn sample_records(seed: u64) -> Vec<SaleRecord> {
    let mut rng = SampleRng(seed);

    let categories = ["Books", "Garden", "Toys", "Music", "Kitchen"];
    let regions = ["North", "South", "East", "West"];

    let mut records: Vec<SaleRecord> = (1..=UNIQUE_ROWS)
        .map(|id| {
            let quantity = 1 + (rng.next_u64() % 12) as u32;
            let unit_price = rng.uniform(12.0, 38.0);
            let amount = (id % MISSING_EVERY != 0)
                .then(|| (quantity as f64 * unit_price * 100.0).round() / 100.0);
            SaleRecord {
                id,
                category: rng.pick(&categories),
                region: rng.pick(&regions),
                amount,
                quantity,
                discount: rng.uniform(0.0, 30.0).round() / 100.0,
                returned: rng.uniform(0.0, 1.0) < 0.1,
                order_date: format!("2024-{:02}-{:02}", 1 + id % 12, 1 + id % 28),
            }
        })
        .collect();

    // Exact copies of the first orders, as a careless export would produce.
    let copies: Vec<SaleRecord> = records[..DUPLICATED_ROWS].to_vec();
    records.extend(copies);
    records
}

fn main() -> Result<()> {
    let records = sample_records(42);

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    for record in &records {
        writer.serialize(record).context("writing sample row")?;
    }
    writer.flush().context("flushing sample CSV")?;

    println!(
        "Wrote {} rows ({DUPLICATED_ROWS} duplicated, {} missing amounts) to {output_path}",
        records.len(),
        UNIQUE_ROWS / MISSING_EVERY
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_shape() {
        let records = sample_records(42);
        assert_eq!(records.len(), 100);
        assert_eq!(records.iter().filter(|r| r.amount.is_none()).count(), 5);
        assert_eq!(records[97].id, records[0].id);
        assert_eq!(records[99].order_date, records[2].order_date);
    }

    #[test]
    fn test_rng_is_deterministic_and_in_range() {
        let mut a = SampleRng(7);
        let mut b = SampleRng(7);
        for _ in 0..1000 {
            let x = a.uniform(12.0, 38.0);
            assert_eq!(x, b.uniform(12.0, 38.0));
            assert!((12.0..38.0).contains(&x));
        }
        assert_eq!(a.pick(&["only"]), "only");
    }
}
