use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::analysis::Analysis;
use crate::data::stats::StackedHistogram;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Charts tab (central panel)
// ---------------------------------------------------------------------------

/// Scatter plot followed by the two distribution histograms.
pub fn charts(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        empty_hint(ui);
        return;
    };
    let height = ((ui.available_height() - 90.0) / 3.0).max(180.0);

    eframe::egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Salary vs Total Points");
            scatter_plot(ui, state, analysis, height);
            ui.separator();

            ui.strong("Salary Distribution");
            stacked_histogram(
                ui,
                "salary_hist",
                "Final Salary",
                &analysis.salary_hist,
                &state.color_map,
                height,
            );
            ui.separator();

            ui.strong("Points Distribution");
            stacked_histogram(
                ui,
                "points_hist",
                "Total Points",
                &analysis.points_hist,
                &state.color_map,
                height,
            );
        });
}

pub fn empty_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open workbooks and select at least one file  (File → Open…)");
    });
}

fn scatter_plot(ui: &mut Ui, state: &AppState, analysis: &Analysis, height: f32) {
    Plot::new("salary_points_scatter")
        .legend(Legend::default())
        .x_axis_label("Final Salary")
        .y_axis_label("Total Points")
        .height(height)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &analysis.scatter {
                let points = Points::new(PlotPoints::from(series.points.clone()))
                    .name(&series.source)
                    .color(state.color_map.faded(&series.source, state.config.scatter_alpha))
                    .filled(true)
                    .radius(3.0);
                plot_ui.points(points);
            }
        });
}

/// Bars stacked by source with the stacked density curves on top.
fn stacked_histogram(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    hist: &StackedHistogram,
    colors: &ColorMap,
    height: f32,
) {
    let centers = hist.centers();
    let width = hist.bin_width();

    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label("Count")
        .height(height)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for layer in &hist.layers {
                let color = colors.color_for(&layer.source);
                let bars: Vec<Bar> = centers
                    .iter()
                    .zip(&layer.counts)
                    .zip(&layer.base)
                    .filter(|((_, count), _)| **count > 0)
                    .map(|((&x, &count), &base)| {
                        Bar::new(x, count as f64).width(width).base_offset(base)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(&layer.source).color(color));

                if let Some(kde) = &layer.kde {
                    let curve: PlotPoints = hist
                        .kde_grid
                        .iter()
                        .zip(kde)
                        .map(|(&x, &y)| [x, y])
                        .collect();
                    plot_ui.line(Line::new(curve).name(&layer.source).color(color).width(2.0));
                }
            }
        });
}
