// ---------------------------------------------------------------------------
// Report configuration
// ---------------------------------------------------------------------------

/// Compiled defaults for the report page. There are no flags or config
/// files; logging verbosity alone is read from `RUST_LOG`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// Rows shown in every preview table.
    pub preview_rows: usize,
    /// Equal-width buckets in the histogram.
    pub histogram_bins: usize,
    /// Most frequent values kept in the pie chart.
    pub pie_slices: usize,
    /// Height of each rendered chart, in points.
    pub chart_height: f32,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            histogram_bins: 20,
            pie_slices: 10,
            chart_height: 360.0,
            window_size: [1200.0, 900.0],
            min_window_size: [600.0, 400.0],
        }
    }
}
