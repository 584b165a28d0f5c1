use std::collections::HashMap;
use std::fmt::Write as _;

use super::model::{Cell, Column, Table};

// ---------------------------------------------------------------------------
// Overview metrics
// ---------------------------------------------------------------------------

/// Headline numbers shown under "Data Overview".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overview {
    pub rows: usize,
    pub columns: usize,
    /// Sum of missing cells over all columns.
    pub missing: usize,
    /// Rows that exactly repeat an earlier row.
    pub duplicates: usize,
}

pub fn overview(table: &Table) -> Overview {
    Overview {
        rows: table.n_rows(),
        columns: table.n_cols(),
        missing: table.missing_count(),
        duplicates: table.duplicate_count(),
    }
}

// ---------------------------------------------------------------------------
// Column info block
// ---------------------------------------------------------------------------

/// Fixed-width listing of every column with its non-null count and type.
pub fn column_info(table: &Table) -> String {
    let mut out = String::new();
    let n_rows = table.n_rows();
    if n_rows == 0 {
        let _ = writeln!(out, "Rows: 0");
    } else {
        let _ = writeln!(out, "Rows: {n_rows} (index 0 to {})", n_rows - 1);
    }
    let _ = writeln!(out, "Columns: {}", table.n_cols());

    let name_width = table
        .columns
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Column".len());

    let _ = writeln!(out, " #   {:<name_width$}  Non-Null  Type", "Column");
    let _ = writeln!(
        out,
        "---  {:<name_width$}  --------  --------",
        "-".repeat(name_width)
    );
    for (idx, col) in table.columns.iter().enumerate() {
        let _ = writeln!(
            out,
            "{idx:>2}   {:<name_width$}  {:>8}  {}",
            col.name,
            col.non_null_count(),
            col.kind
        );
    }

    let mut tally: Vec<(&str, usize)> = Vec::new();
    for col in &table.columns {
        match tally.iter_mut().find(|(k, _)| *k == col.kind.name()) {
            Some((_, n)) => *n += 1,
            None => tally.push((col.kind.name(), 1)),
        }
    }
    tally.sort();
    let types: Vec<String> = tally.iter().map(|(k, n)| format!("{k}({n})")).collect();
    let _ = writeln!(out, "types: {}", types.join(", "));
    let _ = write!(out, "memory usage: {}", format_bytes(approx_memory(table)));
    out
}

fn approx_memory(table: &Table) -> usize {
    table
        .columns
        .iter()
        .flat_map(|c| c.cells.iter())
        .map(|cell| {
            let heap = match cell {
                Cell::Text(s) | Cell::DateTime(s) => s.len(),
                _ => 0,
            };
            std::mem::size_of::<Cell>() + heap
        })
        .sum()
}

fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} bytes")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

// ---------------------------------------------------------------------------
// Numeric describe
// ---------------------------------------------------------------------------

/// Descriptive statistics of one numeric column. Undefined values are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl NumericSummary {
    pub const ROW_LABELS: [&'static str; 8] =
        ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Values in the order of [`Self::ROW_LABELS`].
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }

    pub fn from_column(column: &Column) -> Self {
        let mut values = column.numeric_values();
        values.sort_by(f64::total_cmp);
        let count = values.len();

        let mean = if count == 0 {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / count as f64
        };
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        };

        Self {
            column: column.name.clone(),
            count,
            mean,
            std,
            min: values.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Linear-interpolated quantile of an ascending slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

pub fn describe_numeric(table: &Table) -> Vec<NumericSummary> {
    table.numeric_columns().map(NumericSummary::from_column).collect()
}

// ---------------------------------------------------------------------------
// Non-numeric describe
// ---------------------------------------------------------------------------

/// count / unique / top / freq of one text column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

impl CategoricalSummary {
    pub const ROW_LABELS: [&'static str; 4] = ["count", "unique", "top", "freq"];

    /// Display strings in the order of [`Self::ROW_LABELS`].
    pub fn values(&self) -> [String; 4] {
        [
            self.count.to_string(),
            self.unique.to_string(),
            self.top.clone().unwrap_or_else(|| "NaN".to_string()),
            if self.top.is_some() {
                self.freq.to_string()
            } else {
                "NaN".to_string()
            },
        ]
    }

    pub fn from_column(column: &Column) -> Self {
        let counts = value_counts(column);
        let (top, freq) = counts
            .first()
            .map_or((None, 0), |(cell, n)| (Some(cell.to_string()), *n));
        Self {
            column: column.name.clone(),
            count: column.non_null_count(),
            unique: counts.len(),
            top,
            freq,
        }
    }
}

pub fn describe_categorical(table: &Table) -> Vec<CategoricalSummary> {
    table
        .categorical_columns()
        .map(CategoricalSummary::from_column)
        .collect()
}

/// Frequency of each distinct non-missing value, most frequent first.
/// Ties keep the order of first appearance.
pub fn value_counts(column: &Column) -> Vec<(Cell, usize)> {
    let mut counts: HashMap<&Cell, (usize, usize)> = HashMap::new();
    for (row, cell) in column.cells.iter().enumerate() {
        if cell.is_null() {
            continue;
        }
        counts.entry(cell).or_insert((0, row)).0 += 1;
    }
    let mut entries: Vec<(&Cell, (usize, usize))> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    entries
        .into_iter()
        .map(|(cell, (n, _))| (cell.clone(), n))
        .collect()
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Square Pearson correlation matrix over the numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `labels.len()` × `labels.len()`. NaN where undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.labels.len()
    }
}

/// Pairwise-complete Pearson correlation between every pair of numeric columns.
pub fn correlation_matrix(table: &Table) -> CorrelationMatrix {
    let columns: Vec<&Column> = table.numeric_columns().collect();
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| c.cells.iter().map(Cell::as_f64).collect())
        .collect();

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        labels: columns.iter().map(|c| c.name.clone()).collect(),
        values,
    }
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_upload;
    use crate::data::model::ColumnKind;

    /// 97 distinct rows plus 3 exact copies; five `amount` cells are blank.
    fn hundred_row_csv() -> String {
        let mut text = String::from("id,category,amount\n");
        let mut rows = Vec::new();
        for i in 1..=97 {
            let category = ["a", "b", "c"][i % 3];
            let amount = if i % 19 == 0 {
                String::new()
            } else {
                format!("{}.5", i * 2)
            };
            rows.push(format!("{i},{category},{amount}"));
        }
        for i in 0..3 {
            rows.push(rows[i].clone());
        }
        text.push_str(&rows.join("\n"));
        text.push('\n');
        text
    }

    #[test]
    fn test_overview_of_hundred_row_upload() {
        let table = load_upload("sales.csv", hundred_row_csv().as_bytes()).unwrap();
        let o = overview(&table);
        assert_eq!(
            o,
            Overview {
                rows: 100,
                columns: 3,
                missing: 5,
                duplicates: 3,
            }
        );
    }

    #[test]
    fn test_quantile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), 1.0);
        assert_eq!(quantile(&v, 0.5), 2.5);
        assert_eq!(quantile(&v, 0.25), 1.75);
        assert_eq!(quantile(&v, 1.0), 4.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_numeric_describe() {
        let table = load_upload("t.csv", b"x,label\n1,a\n2,b\n3,a\n4,\n,c\n").unwrap();
        let stats = describe_numeric(&table);
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.column, "x");
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert!((s.std - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn test_single_value_has_undefined_std() {
        let table = load_upload("t.csv", b"x\n7\n").unwrap();
        let s = &describe_numeric(&table)[0];
        assert_eq!(s.count, 1);
        assert!(s.std.is_nan());
        assert_eq!(s.q25, 7.0);
    }

    #[test]
    fn test_categorical_describe_and_bool_columns() {
        let table =
            load_upload("t.csv", b"label,ok\nb,true\na,false\nb,true\na,true\n,true\n").unwrap();
        let stats = describe_categorical(&table);
        assert_eq!(stats.len(), 2);

        let label = &stats[0];
        assert_eq!(label.count, 4);
        assert_eq!(label.unique, 2);
        // Tie between "b" and "a": first seen wins.
        assert_eq!(label.top.as_deref(), Some("b"));
        assert_eq!(label.freq, 2);

        let ok = &stats[1];
        assert_eq!(ok.top.as_deref(), Some("True"));
        assert_eq!(ok.freq, 4);
    }

    #[test]
    fn test_no_categorical_columns() {
        let table = load_upload("t.csv", b"a,b\n1,2.5\n3,4.5\n").unwrap();
        assert!(describe_categorical(&table).is_empty());
    }

    #[test]
    fn test_value_counts_order() {
        let table = load_upload("t.csv", b"c\nx\ny\ny\nz\nx\ny\n\n").unwrap();
        let counts = value_counts(table.column("c").unwrap());
        let labels: Vec<(String, usize)> =
            counts.iter().map(|(c, n)| (c.to_string(), *n)).collect();
        assert_eq!(
            labels,
            vec![("y".into(), 3), ("x".into(), 2), ("z".into(), 1)]
        );
    }

    #[test]
    fn test_correlation_matrix() {
        let table =
            load_upload("t.csv", b"a,b,c,name\n1,2,5,p\n2,4,3,q\n3,6,1,r\n4,,0,s\n").unwrap();
        let corr = correlation_matrix(&table);
        assert_eq!(corr.labels, vec!["a", "b", "c"]);
        assert_eq!(corr.size(), 3);
        assert!((corr.values[0][1] - 1.0).abs() < 1e-12);
        assert!(corr.values[0][2] < -0.9);
        assert_eq!(corr.values[1][0], corr.values[0][1]);
        assert!((corr.values[2][2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_correlation_is_undefined() {
        let table = load_upload("t.csv", b"a,b\n1,5\n2,5\n3,5\n").unwrap();
        let corr = correlation_matrix(&table);
        assert!(corr.values[0][1].is_nan());
    }

    #[test]
    fn test_column_info_lists_every_column() {
        let table = load_upload("t.csv", b"id,name,score\n1,a,\n2,b,3.5\n").unwrap();
        let info = column_info(&table);
        assert!(info.contains("Rows: 2 (index 0 to 1)"));
        assert!(info.contains("Columns: 3"));
        assert!(info.contains("types: float(1), integer(1), text(1)"));
        let score_line = info.lines().find(|l| l.contains("score")).unwrap();
        assert!(score_line.contains(" 1 "));
        assert!(score_line.ends_with(ColumnKind::Float.name()));
    }
}
