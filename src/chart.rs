use std::collections::HashMap;
use std::fmt;

use crate::config::ReportConfig;
use crate::data::model::{Cell, Column, Table};
use crate::data::summary::{CorrelationMatrix, correlation_matrix, value_counts};

// ---------------------------------------------------------------------------
// Chart kinds and requests
// ---------------------------------------------------------------------------

/// The six chart trigger buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartKind {
    Line,
    Bar,
    Histogram,
    Scatter,
    Pie,
    Heatmap,
}

impl ChartKind {
    /// Render order of requested charts.
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Histogram,
        ChartKind::Scatter,
        ChartKind::Pie,
        ChartKind::Heatmap,
    ];

    pub fn button_label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line Graph",
            ChartKind::Bar => "Bar Graph",
            ChartKind::Histogram => "Histogram Graph",
            ChartKind::Scatter => "Scatter Graph",
            ChartKind::Pie => "Pie Graph",
            ChartKind::Heatmap => "Heatmap",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            ChartKind::Line => "Showing a line graph",
            ChartKind::Bar => "Showing a bar graph",
            ChartKind::Histogram => "Showing a histogram",
            ChartKind::Scatter => "Showing a scatter graph",
            ChartKind::Pie => "Showing a pie graph",
            ChartKind::Heatmap => "Showing a heatmap",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.button_label())
    }
}

/// One pressed button together with the axis selection it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x: String,
    pub y: String,
}

/// A precondition a chart needs but the current table does not meet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChartWarning {
    #[error("Column '{0}' is not in the uploaded table")]
    MissingColumn(String),
    #[error("Column '{0}' is not numeric; a histogram needs numeric values")]
    NotNumeric(String),
    #[error("Column '{0}' has no values to plot")]
    NoValues(String),
    #[error("Need at least 2 numeric columns for heatmap (found {0})")]
    TooFewNumericColumns(usize),
}

// ---------------------------------------------------------------------------
// Chart geometry
// ---------------------------------------------------------------------------

/// How the values of a column are placed along a plot axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub label: String,
    /// `Some` for text / datetime columns: category `i` sits at coordinate `i`.
    pub categories: Option<Vec<String>>,
}

impl Axis {
    /// Label of the category at `value`, or `None` between categories.
    pub fn category_at(&self, value: f64) -> Option<&str> {
        let categories = self.categories.as_ref()?;
        let idx = value.round();
        if (value - idx).abs() > 1e-6 || idx < 0.0 {
            return None;
        }
        categories.get(idx as usize).map(String::as_str)
    }
}

/// Line, bar and scatter charts share this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct XyChart {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Rows with both values present, in row order.
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub title: String,
    pub column: String,
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        self.bins.first().map_or(1.0, |b| b.end - b.start)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    /// Fraction of the shown total, in [0, 1].
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pie {
    pub title: String,
    pub column: String,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub title: String,
    pub matrix: CorrelationMatrix,
}

/// Everything needed to draw one chart, derived from the current table.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Line(XyChart),
    Bar(XyChart),
    Scatter(XyChart),
    Histogram(Histogram),
    Pie(Pie),
    Heatmap(Heatmap),
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Build the chart for one request from the current table.
pub fn build(
    table: &Table,
    request: &ChartRequest,
    config: &ReportConfig,
) -> Result<ChartData, ChartWarning> {
    match request.kind {
        ChartKind::Line => xy_chart(table, request, "Line Graph").map(ChartData::Line),
        ChartKind::Bar => xy_chart(table, request, "Bar Graph").map(ChartData::Bar),
        ChartKind::Scatter => xy_chart(table, request, "Scatter Graph").map(ChartData::Scatter),
        ChartKind::Histogram => {
            let column = lookup(table, &request.y)?;
            histogram(column, config.histogram_bins).map(ChartData::Histogram)
        }
        ChartKind::Pie => {
            let column = lookup(table, &request.x)?;
            pie(column, config.pie_slices).map(ChartData::Pie)
        }
        ChartKind::Heatmap => heatmap(table).map(ChartData::Heatmap),
    }
}

fn lookup<'a>(table: &'a Table, name: &str) -> Result<&'a Column, ChartWarning> {
    table
        .column(name)
        .ok_or_else(|| ChartWarning::MissingColumn(name.to_string()))
}

/// Numeric columns map to their values; anything else maps to category
/// indices in order of first appearance.
fn axis_values(column: &Column) -> (Axis, Vec<Option<f64>>) {
    if column.kind.is_numeric() {
        let values = column.cells.iter().map(Cell::as_f64).collect();
        let axis = Axis {
            label: column.name.clone(),
            categories: None,
        };
        return (axis, values);
    }

    let mut categories: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let values = column
        .cells
        .iter()
        .map(|cell| {
            if cell.is_null() {
                return None;
            }
            let label = cell.to_string();
            let idx = *index.entry(label).or_insert_with_key(|label| {
                categories.push(label.clone());
                categories.len() - 1
            });
            Some(idx as f64)
        })
        .collect();
    let axis = Axis {
        label: column.name.clone(),
        categories: Some(categories),
    };
    (axis, values)
}

fn xy_chart(table: &Table, request: &ChartRequest, name: &str) -> Result<XyChart, ChartWarning> {
    let (x_axis, xs) = axis_values(lookup(table, &request.x)?);
    let (y_axis, ys) = axis_values(lookup(table, &request.y)?);
    let points = xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some([x?, y?]))
        .collect();
    Ok(XyChart {
        title: format!("{name} Of {} Vs {}", request.x, request.y),
        x_axis,
        y_axis,
        points,
    })
}

/// Equal-width buckets between the smallest and largest finite value.
/// A single distinct value gets a unit-wide range centred on it.
pub fn histogram(column: &Column, bins: usize) -> Result<Histogram, ChartWarning> {
    if !column.kind.is_numeric() {
        return Err(ChartWarning::NotNumeric(column.name.clone()));
    }
    let values: Vec<f64> = column
        .numeric_values()
        .into_iter()
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Err(ChartWarning::NoValues(column.name.clone()));
    }

    let bins = bins.max(1);
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count,
        })
        .collect();

    Ok(Histogram {
        title: "Histogram Graph".to_string(),
        column: column.name.clone(),
        bins,
    })
}

/// The `max_slices` most frequent values, as shares of their combined count.
pub fn pie(column: &Column, max_slices: usize) -> Result<Pie, ChartWarning> {
    let top: Vec<(Cell, usize)> = value_counts(column).into_iter().take(max_slices).collect();
    let total: usize = top.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Err(ChartWarning::NoValues(column.name.clone()));
    }
    let slices = top
        .into_iter()
        .map(|(cell, count)| PieSlice {
            label: cell.to_string(),
            count,
            share: count as f64 / total as f64,
        })
        .collect();
    Ok(Pie {
        title: "Pie Graph".to_string(),
        column: column.name.clone(),
        slices,
    })
}

pub fn heatmap(table: &Table) -> Result<Heatmap, ChartWarning> {
    let matrix = correlation_matrix(table);
    if matrix.size() < 2 {
        return Err(ChartWarning::TooFewNumericColumns(matrix.size()));
    }
    Ok(Heatmap {
        title: "Correlation Heatmap".to_string(),
        matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_upload;

    fn table(csv: &str) -> Table {
        load_upload("t.csv", csv.as_bytes()).unwrap()
    }

    fn request(kind: ChartKind, x: &str, y: &str) -> ChartRequest {
        ChartRequest {
            kind,
            x: x.to_string(),
            y: y.to_string(),
        }
    }

    #[test]
    fn test_line_chart_skips_rows_with_missing_values() {
        let t = table("x,y\n1,10\n2,\n3,30\n,40\n");
        let data =
            build(&t, &request(ChartKind::Line, "x", "y"), &ReportConfig::default()).unwrap();
        let ChartData::Line(chart) = data else {
            panic!("expected a line chart");
        };
        assert_eq!(chart.points, vec![[1.0, 10.0], [3.0, 30.0]]);
        assert_eq!(chart.title, "Line Graph Of x Vs y");
        assert_eq!(chart.x_axis.label, "x");
        assert!(chart.x_axis.categories.is_none());
    }

    #[test]
    fn test_text_axis_uses_category_indices() {
        let t = table("city,sales\nOslo,3\nRome,5\nOslo,7\n");
        let data = build(&t, &request(ChartKind::Bar, "city", "sales"), &ReportConfig::default())
            .unwrap();
        let ChartData::Bar(chart) = data else {
            panic!("expected a bar chart");
        };
        assert_eq!(chart.points, vec![[0.0, 3.0], [1.0, 5.0], [0.0, 7.0]]);
        assert_eq!(chart.x_axis.category_at(1.0), Some("Rome"));
        assert_eq!(chart.x_axis.category_at(0.5), None);
        assert_eq!(chart.x_axis.category_at(2.0), None);
    }

    #[test]
    fn test_scatter_title() {
        let t = table("a,b\n1,2\n");
        let data =
            build(&t, &request(ChartKind::Scatter, "a", "b"), &ReportConfig::default()).unwrap();
        let ChartData::Scatter(chart) = data else {
            panic!("expected a scatter chart");
        };
        assert_eq!(chart.title, "Scatter Graph Of a Vs b");
    }

    #[test]
    fn test_histogram_has_twenty_buckets() {
        let rows: Vec<String> = (0..100).map(|i| format!("{i}")).collect();
        let t = table(&format!("v\n{}\n\n", rows.join("\n")));
        let data = build(&t, &request(ChartKind::Histogram, "v", "v"), &ReportConfig::default())
            .unwrap();
        let ChartData::Histogram(h) = data else {
            panic!("expected a histogram");
        };
        assert_eq!(h.bins.len(), 20);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(h.bins[0].start, 0.0);
        assert!((h.bins[19].end - 99.0).abs() < 1e-9);
        // The maximum lands in the last bucket.
        assert_eq!(h.bins[19].count, 5);
    }

    #[test]
    fn test_histogram_uses_y_column_and_drops_missing() {
        let t = table("label,v\na,1\nb,\nc,3\n");
        let req = request(ChartKind::Histogram, "label", "v");
        let h = match build(&t, &req, &ReportConfig::default()) {
            Ok(ChartData::Histogram(h)) => h,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(h.column, "v");
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_histogram_of_constant_column() {
        let t = table("v\n4\n4\n");
        let h = histogram(t.column("v").unwrap(), 20).unwrap();
        assert_eq!(h.bins[0].start, 3.5);
        assert!((h.bins[19].end - 4.5).abs() < 1e-9);
        assert!((h.bin_width() - 0.05).abs() < 1e-12);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_histogram_rejects_text() {
        let t = table("label\na\nb\n");
        let err = histogram(t.column("label").unwrap(), 20).unwrap_err();
        assert_eq!(err, ChartWarning::NotNumeric("label".into()));
    }

    #[test]
    fn test_pie_keeps_at_most_ten_slices() {
        let mut csv = String::from("code\n");
        for i in 0..25 {
            for _ in 0..=i {
                csv.push_str(&format!("c{i}\n"));
            }
        }
        let t = table(&csv);
        let data = build(&t, &request(ChartKind::Pie, "code", "code"), &ReportConfig::default())
            .unwrap();
        let ChartData::Pie(pie) = data else {
            panic!("expected a pie chart");
        };
        assert_eq!(pie.slices.len(), 10);
        assert_eq!(pie.slices[0].label, "c24");
        let total_share: f64 = pie.slices.iter().map(|s| s.share).sum();
        assert!((total_share - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pie_of_empty_column_warns() {
        let t = table("a,b\n1,\n2,\n");
        let err = pie(t.column("b").unwrap(), 10).unwrap_err();
        assert_eq!(err, ChartWarning::NoValues("b".into()));
    }

    #[test]
    fn test_pie_labels_floats_in_shortest_form() {
        let t = table("price\n2.0\n2.0\n1.25\n");
        let p = pie(t.column("price").unwrap(), 10).unwrap();
        let labels: Vec<&str> = p.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["2", "1.25"]);
    }

    #[test]
    fn test_heatmap_needs_two_numeric_columns() {
        let t = table("n,label\n1,a\n2,b\n");
        let err = build(&t, &request(ChartKind::Heatmap, "n", "n"), &ReportConfig::default())
            .unwrap_err();
        assert_eq!(err, ChartWarning::TooFewNumericColumns(1));
        assert!(err.to_string().starts_with("Need at least 2 numeric columns"));
    }

    #[test]
    fn test_heatmap_grid_matches_numeric_column_count() {
        let t = table("a,b,c,label\n1,2,3,x\n2,1,5,y\n3,4,4,z\n");
        let data = build(&t, &request(ChartKind::Heatmap, "a", "b"), &ReportConfig::default())
            .unwrap();
        let ChartData::Heatmap(h) = data else {
            panic!("expected a heatmap");
        };
        assert_eq!(h.matrix.size(), 3);
        assert!(h.matrix.values.iter().all(|row| row.len() == 3));
    }

    #[test]
    fn test_unknown_column_warns() {
        let t = table("a\n1\n");
        let err = build(&t, &request(ChartKind::Line, "a", "gone"), &ReportConfig::default())
            .unwrap_err();
        assert_eq!(err, ChartWarning::MissingColumn("gone".into()));
    }
}
