use eframe::egui::{self, Align2, Color32, Id, LayerId, Order, TextStyle};

use crate::config::ReportConfig;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ExplorerApp {
    pub state: AppState,
}

impl ExplorerApp {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    /// Files dropped onto the window go through the same path as the uploader.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        // Single-file sessions: only the first dropped file is used.
        let Some(file) = dropped.into_iter().next() else {
            return;
        };
        if let Some(bytes) = &file.bytes {
            self.state.load_bytes(&file.name, bytes);
        } else if let Some(path) = &file.path {
            self.state.load_path(path);
        }
    }

    fn paint_drop_hint(ctx: &egui::Context) {
        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }
        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("drop_hint")));
        let screen = ctx.screen_rect();
        painter.rect_filled(screen, 0.0, Color32::from_black_alpha(160));
        painter.text(
            screen.center(),
            Align2::CENTER_CENTER,
            "Drop a CSV or Excel file to load it",
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

impl Default for ExplorerApp {
    fn default() -> Self {
        Self::new(ReportConfig::default())
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: report page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::report_page(ui, &mut self.state);
        });

        Self::paint_drop_hint(ctx);
    }
}
