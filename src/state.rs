use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::chart::{ChartKind, ChartRequest};
use crate::config::ReportConfig;
use crate::data::loader::{self, UnsupportedFormat};
use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Why the last upload produced no table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// Headline shown in red.
    pub message: String,
    /// Full error chain.
    pub detail: String,
}

/// The widget state, independent of rendering. Nothing derived from the
/// table (statistics, charts) is kept here; the page recomputes those on
/// every pass.
pub struct AppState {
    pub config: ReportConfig,

    /// Parsed upload (None until a file loads successfully).
    pub table: Option<Arc<Table>>,

    /// Name of the file behind `table`.
    pub file_name: Option<String>,

    /// Columns picked for the preview, in the order they were picked.
    pub selected_columns: Vec<String>,

    pub x_axis: Option<String>,
    pub y_axis: Option<String>,

    /// Chart buttons pressed since the last upload.
    pub chart_requests: BTreeSet<ChartKind>,

    /// Set when the last upload failed; the page shows nothing else.
    pub load_failure: Option<LoadFailure>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ReportConfig::default())
    }
}

impl AppState {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            table: None,
            file_name: None,
            selected_columns: Vec::new(),
            x_axis: None,
            y_axis: None,
            chart_requests: BTreeSet::new(),
            load_failure: None,
        }
    }

    /// Load a file picked from disk.
    pub fn load_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let result = loader::load_file(path);
        self.apply_load(name, result);
    }

    /// Load an in-memory upload (e.g. a file dropped onto the window).
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) {
        let result = loader::load_upload(name, bytes);
        self.apply_load(name.to_string(), result);
    }

    fn apply_load(&mut self, name: String, result: anyhow::Result<Table>) {
        match result {
            Ok(table) => {
                log::info!(
                    "Loaded {name}: {} rows, columns {:?}",
                    table.n_rows(),
                    table.column_names()
                );
                self.set_table(name, table);
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e:#}");
                let message = if e.downcast_ref::<UnsupportedFormat>().is_some() {
                    "Unsupported file format".to_string()
                } else {
                    "Could not read the CSV / Excel file. Please check the file format.".to_string()
                };
                self.reset();
                self.load_failure = Some(LoadFailure {
                    message,
                    detail: format!("{e:#}"),
                });
            }
        }
    }

    /// Ingest a newly loaded table and start a fresh selection.
    pub fn set_table(&mut self, name: String, table: Table) {
        self.reset();
        let first = table.columns.first().map(|c| c.name.clone());
        self.x_axis = first.clone();
        self.y_axis = first;
        self.table = Some(Arc::new(table));
        self.file_name = Some(name);
    }

    fn reset(&mut self) {
        self.table = None;
        self.file_name = None;
        self.selected_columns.clear();
        self.x_axis = None;
        self.y_axis = None;
        self.chart_requests.clear();
        self.load_failure = None;
    }

    // -- Column selection --

    /// Add or remove a column from the preview selection.
    pub fn toggle_column(&mut self, column: &str) {
        if let Some(pos) = self.selected_columns.iter().position(|c| c == column) {
            self.selected_columns.remove(pos);
        } else {
            self.selected_columns.push(column.to_string());
        }
    }

    /// Select every column, keeping already-picked ones first.
    pub fn select_all(&mut self) {
        if let Some(table) = &self.table {
            for name in table.column_names() {
                if !self.selected_columns.contains(&name) {
                    self.selected_columns.push(name);
                }
            }
        }
    }

    pub fn select_none(&mut self) {
        self.selected_columns.clear();
    }

    /// First rows of the picked columns, or of the whole table when nothing is picked.
    pub fn preview(&self) -> Option<Table> {
        let table = self.table.as_ref()?;
        let rows = self.config.preview_rows;
        if self.selected_columns.is_empty() {
            Some(table.head(rows))
        } else {
            Some(table.select(&self.selected_columns).head(rows))
        }
    }

    // -- Chart dispatch --

    /// Point stale axis selections back at the first column.
    pub fn sync_axes(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let first = table.columns.first().map(|c| c.name.clone());
        for axis in [&mut self.x_axis, &mut self.y_axis] {
            let valid = axis.as_deref().is_some_and(|name| table.column(name).is_some());
            if !valid {
                axis.clone_from(&first);
            }
        }
    }

    pub fn request_chart(&mut self, kind: ChartKind) {
        log::info!(
            "{kind} requested (x = {:?}, y = {:?})",
            self.x_axis,
            self.y_axis
        );
        self.chart_requests.insert(kind);
    }

    pub fn clear_charts(&mut self) {
        self.chart_requests.clear();
    }

    /// Pending requests in render order, bound to the current axis selection.
    pub fn pending_charts(&self) -> Vec<ChartRequest> {
        let (Some(x), Some(y)) = (&self.x_axis, &self.y_axis) else {
            return Vec::new();
        };
        ChartKind::ALL
            .into_iter()
            .filter(|kind| self.chart_requests.contains(kind))
            .map(|kind| ChartRequest {
                kind,
                x: x.clone(),
                y: y.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.load_bytes("t.csv", b"id,name,score\n1,a,2.5\n2,b,3.5\n3,c,\n4,d,1\n5,e,2\n6,f,9\n");
        state
    }

    #[test]
    fn test_successful_load_defaults_axes_to_first_column() {
        let state = loaded();
        assert!(state.load_failure.is_none());
        assert_eq!(state.file_name.as_deref(), Some("t.csv"));
        assert_eq!(state.x_axis.as_deref(), Some("id"));
        assert_eq!(state.y_axis.as_deref(), Some("id"));
    }

    #[test]
    fn test_unsupported_upload_halts_with_message() {
        let mut state = loaded();
        state.load_bytes("notes.pdf", b"%PDF");
        assert!(state.table.is_none());
        let failure = state.load_failure.unwrap();
        assert_eq!(failure.message, "Unsupported file format");
        assert!(failure.detail.contains(".pdf"));
    }

    #[test]
    fn test_decode_failure_carries_detail() {
        let mut state = AppState::default();
        state.load_bytes("t.csv", b"a,b\n1,2,3\n");
        assert!(state.table.is_none());
        let failure = state.load_failure.unwrap();
        assert!(failure.message.starts_with("Could not read"));
        assert!(failure.detail.contains("decoding CSV"));
    }

    #[test]
    fn test_preview_follows_selection_order() {
        let mut state = loaded();
        let full = state.preview().unwrap();
        assert_eq!(full.n_rows(), 5);
        assert_eq!(full.n_cols(), 3);

        state.toggle_column("score");
        state.toggle_column("id");
        let picked = state.preview().unwrap();
        assert_eq!(picked.column_names(), vec!["score", "id"]);

        state.toggle_column("score");
        assert_eq!(state.selected_columns, vec!["id"]);

        state.select_all();
        assert_eq!(state.selected_columns, vec!["id", "name", "score"]);
        state.select_none();
        assert!(state.selected_columns.is_empty());
    }

    #[test]
    fn test_pending_charts_render_in_fixed_order() {
        let mut state = loaded();
        state.request_chart(ChartKind::Heatmap);
        state.request_chart(ChartKind::Line);
        state.request_chart(ChartKind::Line);
        let kinds: Vec<ChartKind> = state.pending_charts().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ChartKind::Line, ChartKind::Heatmap]);

        state.clear_charts();
        assert!(state.pending_charts().is_empty());
    }

    #[test]
    fn test_new_upload_clears_requests_and_selection() {
        let mut state = loaded();
        state.request_chart(ChartKind::Pie);
        state.toggle_column("name");
        state.load_bytes("other.csv", b"k\n1\n");
        assert!(state.chart_requests.is_empty());
        assert!(state.selected_columns.is_empty());
        assert_eq!(state.x_axis.as_deref(), Some("k"));
    }

    #[test]
    fn test_sync_axes_replaces_unknown_columns() {
        let mut state = loaded();
        state.x_axis = Some("gone".into());
        state.y_axis = Some("score".into());
        state.sync_axes();
        assert_eq!(state.x_axis.as_deref(), Some("id"));
        assert_eq!(state.y_axis.as_deref(), Some("score"));
    }
}
