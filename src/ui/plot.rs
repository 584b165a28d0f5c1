use std::f64::consts::TAU;

use eframe::egui::{self, Color32, RichText, Sense, Stroke, Ui, vec2};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::chart::{Axis, ChartData, Heatmap, Histogram, Pie, XyChart};
use crate::color::{contrasting_text, correlation_color, generate_palette};
use crate::config::ReportConfig;

const SERIES_COLOR: Color32 = Color32::from_rgb(31, 119, 180);

// ---------------------------------------------------------------------------
// Chart rendering
// ---------------------------------------------------------------------------

/// Draw one chart built by the dispatcher.
pub fn chart(ui: &mut Ui, data: &ChartData, config: &ReportConfig) {
    match data {
        ChartData::Line(c) => xy_plot(ui, "line_chart", c, config, |plot_ui, points| {
            plot_ui.line(Line::new(points).name(&c.title).color(SERIES_COLOR).width(1.5));
        }),
        ChartData::Bar(c) => xy_plot(ui, "bar_chart", c, config, |plot_ui, points| {
            let bars = points
                .iter()
                .map(|&[x, y]| Bar::new(x, y).width(0.8))
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).name(&c.title).color(SERIES_COLOR));
        }),
        ChartData::Scatter(c) => xy_plot(ui, "scatter_chart", c, config, |plot_ui, points| {
            plot_ui.points(
                Points::new(points)
                    .name(&c.title)
                    .color(SERIES_COLOR)
                    .radius(3.0),
            );
        }),
        ChartData::Histogram(h) => histogram_plot(ui, h, config),
        ChartData::Pie(p) => pie_plot(ui, p, config),
        ChartData::Heatmap(h) => heatmap_plot(ui, h, config),
    }
}

/// Shared frame for line / bar / scatter: title, labelled axes, category ticks.
fn xy_plot(
    ui: &mut Ui,
    id: &str,
    chart: &XyChart,
    config: &ReportConfig,
    draw: impl FnOnce(&mut egui_plot::PlotUi, Vec<[f64; 2]>),
) {
    ui.label(RichText::new(&chart.title).strong());

    let mut plot = Plot::new(id)
        .height(config.chart_height)
        .legend(Legend::default())
        .x_axis_label(chart.x_axis.label.clone())
        .y_axis_label(chart.y_axis.label.clone());

    if chart.x_axis.categories.is_some() {
        let axis = chart.x_axis.clone();
        plot = plot.x_axis_formatter(move |mark, _range| category_tick(&axis, mark.value));
    }
    if chart.y_axis.categories.is_some() {
        let axis = chart.y_axis.clone();
        plot = plot.y_axis_formatter(move |mark, _range| category_tick(&axis, mark.value));
    }

    let points = chart.points.clone();
    plot.show(ui, |plot_ui| draw(plot_ui, points));
}

fn category_tick(axis: &Axis, value: f64) -> String {
    axis.category_at(value).unwrap_or_default().to_string()
}

fn histogram_plot(ui: &mut Ui, histogram: &Histogram, config: &ReportConfig) {
    ui.label(RichText::new(&histogram.title).strong());

    let width = histogram.bin_width();
    let bars = histogram
        .bins
        .iter()
        .map(|b| {
            Bar::new(b.center(), b.count as f64)
                .width(width)
                .name(format!("{:.3} – {:.3}", b.start, b.end))
        })
        .collect();
    let chart = BarChart::new(bars)
        .name(&histogram.column)
        .color(SERIES_COLOR)
        .element_formatter(Box::new(|bar, _chart| {
            format!("{}\nCount: {}", bar.name, bar.value)
        }));

    Plot::new("histogram_chart")
        .height(config.chart_height)
        .x_axis_label(histogram.column.clone())
        .y_axis_label("Frequency")
        .include_y(0.0)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

fn pie_plot(ui: &mut Ui, pie: &Pie, config: &ReportConfig) {
    ui.label(RichText::new(&pie.title).strong());
    ui.label(format!("Most frequent values of {}", pie.column));

    let colors = generate_palette(pie.slices.len());
    Plot::new("pie_chart")
        .height(config.chart_height)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-1.4)
        .include_x(1.4)
        .include_y(-1.3)
        .include_y(1.3)
        .show(ui, |plot_ui| {
            // Counter-clockwise from three o'clock.
            let mut start = 0.0;
            for (slice, color) in pie.slices.iter().zip(colors) {
                let sweep = slice.share * TAU;
                let end = start + sweep;

                let name = format!("{} ({})", slice.label, slice.count);
                for outline in sector_outlines(start, sweep) {
                    let points: PlotPoints = outline.into_iter().collect();
                    plot_ui.polygon(
                        Polygon::new(points)
                            .name(&name)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                }

                let mid = start + sweep / 2.0;
                plot_ui.text(Text::new(
                    PlotPoint::new(1.15 * mid.cos(), 1.15 * mid.sin()),
                    RichText::new(&slice.label),
                ));
                plot_ui.text(Text::new(
                    PlotPoint::new(0.6 * mid.cos(), 0.6 * mid.sin()),
                    RichText::new(format!("{:.1}%", slice.share * 100.0)).color(Color32::BLACK),
                ));
                start = end;
            }
        });
}

/// Outlines of the unit-circle sector `start..start + sweep`, split into
/// pieces of at most a quarter turn so each polygon stays convex.
fn sector_outlines(start: f64, sweep: f64) -> Vec<Vec<[f64; 2]>> {
    const MAX_PIECE: f64 = TAU / 4.0;
    const STEPS_PER_TURN: f64 = 180.0;

    let pieces = (sweep / MAX_PIECE - 1e-9).ceil().max(1.0) as usize;
    let piece_sweep = sweep / pieces as f64;
    let steps = ((piece_sweep / TAU) * STEPS_PER_TURN).ceil().max(2.0) as usize;

    (0..pieces)
        .map(|p| {
            let piece_start = start + piece_sweep * p as f64;
            let mut outline = vec![[0.0, 0.0]];
            outline.extend((0..=steps).map(|i| {
                let a = piece_start + piece_sweep * i as f64 / steps as f64;
                [a.cos(), a.sin()]
            }));
            outline
        })
        .collect()
}

fn heatmap_plot(ui: &mut Ui, heatmap: &Heatmap, config: &ReportConfig) {
    ui.label(RichText::new(&heatmap.title).strong());

    let matrix = &heatmap.matrix;
    let n = matrix.size();
    // Row i is drawn at y = -i so the first column sits at the top.
    let x_labels = matrix.labels.clone();
    let y_labels = matrix.labels.clone();

    Plot::new("heatmap_chart")
        .height(config.chart_height.max(40.0 * n as f32))
        .data_aspect(1.0)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-0.5)
        .include_x(n as f64 - 0.5)
        .include_y(0.5)
        .include_y(-(n as f64) + 0.5)
        .x_grid_spacer(move |_input| cell_marks(n, 1.0))
        .y_grid_spacer(move |_input| cell_marks(n, -1.0))
        .x_axis_formatter(move |mark, _range| label_at(&x_labels, mark.value))
        .y_axis_formatter(move |mark, _range| label_at(&y_labels, -mark.value))
        .show(ui, |plot_ui| {
            for (i, row) in matrix.values.iter().enumerate() {
                for (j, &r) in row.iter().enumerate() {
                    let (x, y) = (j as f64, -(i as f64));
                    let fill = correlation_color(r);
                    let square: PlotPoints = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ]
                    .into_iter()
                    .collect();
                    plot_ui.polygon(
                        Polygon::new(square)
                            .fill_color(fill)
                            .stroke(Stroke::new(0.5, Color32::from_gray(60))),
                    );
                    let text = if r.is_finite() {
                        format!("{r:.2}")
                    } else {
                        "NaN".to_string()
                    };
                    plot_ui.text(Text::new(
                        PlotPoint::new(x, y),
                        RichText::new(text).color(contrasting_text(fill)),
                    ));
                }
            }
        });

    color_bar(ui);
}

/// One tick per cell centre, so every column name gets a label.
fn cell_marks(n: usize, direction: f64) -> Vec<GridMark> {
    (0..n)
        .map(|i| GridMark {
            value: direction * i as f64,
            step_size: 1.0,
        })
        .collect()
}

fn label_at(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Horizontal strip showing the [-1, 1] colour scale.
fn color_bar(ui: &mut Ui) {
    const STEPS: usize = 64;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("-1");
        let (rect, _) = ui.allocate_exact_size(vec2(240.0, 14.0), Sense::hover());
        let step_width = rect.width() / STEPS as f32;
        for i in 0..STEPS {
            let r = -1.0 + 2.0 * (i as f64 + 0.5) / STEPS as f64;
            let min = rect.min + vec2(step_width * i as f32, 0.0);
            let cell = egui::Rect::from_min_size(min, vec2(step_width + 0.5, rect.height()));
            ui.painter().rect_filled(cell, 0.0, correlation_color(r));
        }
        ui.label("1");
    });
}
