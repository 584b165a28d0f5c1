use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Table;
use crate::data::summary::{CategoricalSummary, NumericSummary};

// ---------------------------------------------------------------------------
// Preview and statistics tables
// ---------------------------------------------------------------------------

/// Render the rows of `table` with a leading row-index column.
pub fn data_table(ui: &mut Ui, id: &str, table: &Table) {
    let mut header = vec![String::new()];
    header.extend(table.column_names());

    let rows: Vec<Vec<String>> = (0..table.n_rows())
        .map(|row| {
            let mut cells = vec![row.to_string()];
            cells.extend(table.columns.iter().map(|c| c.cells[row].to_string()));
            cells
        })
        .collect();

    string_table(ui, id, &header, &rows);
}

/// Statistics as rows, one column per numeric column.
pub fn numeric_stats_table(ui: &mut Ui, stats: &[NumericSummary]) {
    let mut header = vec![String::new()];
    header.extend(stats.iter().map(|s| s.column.clone()));

    let values: Vec<[f64; 8]> = stats.iter().map(NumericSummary::values).collect();
    let rows: Vec<Vec<String>> = NumericSummary::ROW_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mut row = vec![label.to_string()];
            row.extend(values.iter().map(|v| format_stat(v[i])));
            row
        })
        .collect();

    string_table(ui, "numeric_stats", &header, &rows);
}

/// count / unique / top / freq as rows, one column per text column.
pub fn categorical_stats_table(ui: &mut Ui, stats: &[CategoricalSummary]) {
    let mut header = vec![String::new()];
    header.extend(stats.iter().map(|s| s.column.clone()));

    let values: Vec<[String; 4]> = stats.iter().map(CategoricalSummary::values).collect();
    let rows: Vec<Vec<String>> = CategoricalSummary::ROW_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mut row = vec![label.to_string()];
            row.extend(values.iter().map(|v| v[i].clone()));
            row
        })
        .collect();

    string_table(ui, "categorical_stats", &header, &rows);
}

pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.4}")
    }
}

fn string_table(ui: &mut Ui, id: &str, header: &[String], rows: &[Vec<String>]) {
    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal()
            .auto_shrink([false, true])
            .show(ui, |ui: &mut Ui| {
                let mut builder = TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .vscroll(false)
                    .cell_layout(egui::Layout::left_to_right(egui::Align::Center));
                for _ in header {
                    builder = builder.column(TableColumn::auto().at_least(60.0));
                }

                builder
                    .header(22.0, |mut head| {
                        for name in header {
                            head.col(|ui: &mut Ui| {
                                ui.strong(name);
                            });
                        }
                    })
                    .body(|mut body| {
                        for row in rows {
                            body.row(20.0, |mut table_row| {
                                for value in row {
                                    table_row.col(|ui: &mut Ui| {
                                        ui.label(value);
                                    });
                                }
                            });
                        }
                    });
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_stat() {
        assert_eq!(format_stat(f64::NAN), "NaN");
        assert_eq!(format_stat(2.5), "2.5000");
    }
}
