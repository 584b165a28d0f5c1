use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart::{self, ChartKind};
use crate::data::loader::SUPPORTED_EXTENSIONS;
use crate::data::model::Table;
use crate::data::summary;
use crate::state::AppState;
use crate::ui::{plot, tables};

const INFO_COLOR: Color32 = Color32::from_rgb(90, 150, 220);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(70, 170, 90);
const WARNING_COLOR: Color32 = Color32::from_rgb(230, 160, 0);

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(name), Some(table)) = (&state.file_name, &state.table) {
            ui.label(format!(
                "{name}: {} rows × {} columns",
                table.n_rows(),
                table.n_cols()
            ));
        }

        if let Some(failure) = &state.load_failure {
            ui.label(RichText::new(&failure.message).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload a CSV or an Excel file")
        .add_filter("CSV / Excel", SUPPORTED_EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

// ---------------------------------------------------------------------------
// Report page (central panel)
// ---------------------------------------------------------------------------

/// Render every page section, top to bottom, from the current state.
pub fn report_page(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Analyze Your Data");
            ui.label("Upload a CSV or an Excel file to explore your data interactively.");
            ui.add_space(6.0);

            uploader(ui, state);
            ui.add_space(8.0);

            if let Some(failure) = &state.load_failure {
                ui.label(RichText::new(&failure.message).color(Color32::RED).strong());
                egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                    ui.monospace(&failure.detail);
                });
                return;
            }

            let Some(table) = state.table.clone() else {
                ui.colored_label(INFO_COLOR, "Please upload a CSV or an Excel file to get started.");
                return;
            };

            if let Some(name) = &state.file_name {
                ui.colored_label(SUCCESS_COLOR, format!("File uploaded successfully: {name}"));
            }

            section(ui, "Preview Of Data");
            tables::data_table(ui, "preview", &table.head(state.config.preview_rows));

            overview_section(ui, &table);

            section(ui, "Complete Summary Of Dataset");
            egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                ui.monospace(summary::column_info(&table));
            });

            section(ui, "Statistical Summary Of Dataset");
            let numeric = summary::describe_numeric(&table);
            if numeric.is_empty() {
                ui.colored_label(INFO_COLOR, "No numerical features found in this dataset");
            } else {
                tables::numeric_stats_table(ui, &numeric);
            }

            section(ui, "Statistical Summary For Non-Numerical Features Of Dataset");
            let categorical = summary::describe_categorical(&table);
            if categorical.is_empty() {
                ui.colored_label(INFO_COLOR, "No non-numerical features found in this dataset");
            } else {
                tables::categorical_stats_table(ui, &categorical);
            }

            column_selection(ui, state, &table);
            visualization(ui, state, &table);
        });
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(10.0);
    ui.label(RichText::new(title).heading());
    ui.separator();
}

fn uploader(ui: &mut Ui, state: &mut AppState) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.horizontal(|ui: &mut Ui| {
            if ui.button("Browse files…").clicked() {
                open_file_dialog(state);
            }
            ui.label(format!(
                "or drop a file onto the window ({})",
                SUPPORTED_EXTENSIONS.join(", ")
            ));
        });
    });
}

fn overview_section(ui: &mut Ui, table: &Table) {
    section(ui, "Data Overview");
    let overview = summary::overview(table);
    egui::Grid::new("overview")
        .num_columns(2)
        .spacing([24.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for (label, value) in [
                ("Number of rows", overview.rows),
                ("Number of columns", overview.columns),
                ("Number of missing values", overview.missing),
                ("Number of duplicate records", overview.duplicates),
            ] {
                ui.label(label);
                ui.strong(value.to_string());
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Column selection
// ---------------------------------------------------------------------------

fn column_selection(ui: &mut Ui, state: &mut AppState, table: &Table) {
    section(ui, "Select The Desired Columns For Analysis");

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Choose columns");
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for col in &table.columns {
            let mut checked = state.selected_columns.contains(&col.name);
            if ui.checkbox(&mut checked, &col.name).changed() {
                state.toggle_column(&col.name);
            }
        }
    });

    if state.selected_columns.is_empty() {
        ui.colored_label(INFO_COLOR, "No columns selected. Showing full dataset.");
    } else {
        ui.label(format!("Selected: {}", state.selected_columns.join(", ")));
    }
    if let Some(preview) = state.preview() {
        tables::data_table(ui, "selection_preview", &preview);
    }
}

// ---------------------------------------------------------------------------
// Visualization
// ---------------------------------------------------------------------------

fn visualization(ui: &mut Ui, state: &mut AppState, table: &Table) {
    section(ui, "Data Visualization");
    ui.label("Select columns for data visualization");

    state.sync_axes();
    let names = table.column_names();
    axis_selector(ui, "Select column for X axis", &names, &mut state.x_axis);
    axis_selector(ui, "Select column for Y axis", &names, &mut state.y_axis);

    ui.add_space(6.0);
    ui.columns(3, |cols: &mut [Ui]| {
        for (i, pair) in ChartKind::ALL.chunks(2).enumerate() {
            for &kind in pair {
                if cols[i].button(kind.button_label()).clicked() {
                    state.request_chart(kind);
                }
            }
        }
    });
    if !state.chart_requests.is_empty() && ui.small_button("Clear charts").clicked() {
        state.clear_charts();
    }

    for request in state.pending_charts() {
        ui.add_space(10.0);
        ui.label(RichText::new(request.kind.heading()).heading());
        match chart::build(table, &request, &state.config) {
            Ok(data) => plot::chart(ui, &data, &state.config),
            Err(warning) => {
                log::debug!("{} not drawn: {warning}", request.kind);
                ui.colored_label(WARNING_COLOR, format!("⚠ {warning}"));
            }
        }
    }
}

fn axis_selector(ui: &mut Ui, label: &str, names: &[String], selected: &mut Option<String>) {
    let current = selected.clone().unwrap_or_default();
    egui::ComboBox::from_label(label)
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for name in names {
                if ui.selectable_label(current == *name, name).clicked() {
                    *selected = Some(name.clone());
                }
            }
        });
}
