use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::WORKBOOK_EXTENSIONS;
use crate::data::model::{Role, POINTS_COLUMN, SALARY_COLUMN};
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – uploaded files and selection
// ---------------------------------------------------------------------------

/// Render the left file/selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Files");
    ui.separator();

    if state.uploads.is_empty() && state.read_errors.is_empty() {
        ui.label("No workbooks loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                ui.strong("Select files to analyze");
                if ui.small_button("All").clicked() {
                    state.select_all();
                }
                if ui.small_button("None").clicked() {
                    state.select_none();
                }
            });

            let mut toggled = None;
            let mut removed = None;
            for table in state.ingestion.tables() {
                let mut checked = state.selection.contains(&table.name);
                let text = RichText::new(&table.name).color(state.color_map.color_for(&table.name));
                ui.horizontal(|ui: &mut Ui| {
                    if ui.checkbox(&mut checked, text).changed() {
                        toggled = Some(table.name.clone());
                    }
                    if ui.small_button("✖").on_hover_text("Remove file").clicked() {
                        removed = Some(table.name.clone());
                    }
                });
                let counts: Vec<String> = Role::ALL
                    .iter()
                    .map(|r| format!("{} {}", table.count_role(*r), r.sheet_name().to_lowercase()))
                    .collect();
                ui.label(RichText::new(counts.join(" · ")).small().weak());
            }
            if let Some(name) = toggled {
                state.toggle_source(&name);
            }
            if let Some(name) = removed {
                state.remove_upload(&name);
            }

            let errors: Vec<String> = state.errors().map(|e| e.to_string()).collect();
            if !errors.is_empty() {
                ui.separator();
                ui.strong("Errors");
                for msg in errors {
                    ui.label(RichText::new(msg).color(Color32::RED));
                }
            }

            ui.separator();
            egui::CollapsingHeader::new("Load log")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for upload in &state.uploads {
                        ui.label(format!("Loading data from: {}...", upload.name));
                    }
                });
        });
}

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
            if ui.button("Clear").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.tab, Tab::Data, "Data");
        ui.selectable_value(&mut state.tab, Tab::Correlation, "Correlation");
        ui.selectable_value(&mut state.tab, Tab::Charts, "Charts");

        ui.separator();

        ui.label(format!(
            "{} files loaded, {} selected, {} rows",
            state.ingestion.len(),
            state.selection.len(),
            state.table.as_ref().map_or(0, |t| t.len())
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Correlation tab
// ---------------------------------------------------------------------------

pub fn correlation_panel(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        super::plot::empty_hint(ui);
        return;
    };
    let report = &analysis.correlation;

    ui.heading("Correlation Analysis");
    ui.label(format!(
        "{} rows with both {} and {}",
        report.paired_rows,
        SALARY_COLUMN,
        POINTS_COLUMN
    ));
    ui.add_space(6.0);

    egui::Grid::new("correlation_by_source")
        .striped(true)
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Source");
            ui.strong("Pearson r");
            ui.end_row();
            for (source, r) in &report.by_source {
                ui.label(RichText::new(source).color(state.color_map.color_for(source)));
                if r.is_nan() {
                    ui.label("n/a");
                } else {
                    ui.label(r.to_string());
                }
                ui.end_row();
            }
        });

    ui.add_space(10.0);
    let overall = if report.overall.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}", report.overall_rounded())
    };
    ui.label(RichText::new(format!("Overall Pearson Correlation Coefficient: {overall}")).strong());
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open workbooks")
        .add_filter("Spreadsheets", WORKBOOK_EXTENSIONS)
        .add_filter("Excel", &["xlsx", "xlsm", "xlsb", "xls"])
        .add_filter("OpenDocument", &["ods"])
        .pick_files();

    if let Some(paths) = files {
        log::info!("Opening {} file(s)", paths.len());
        state.open_paths(paths.as_slice());
    }
}
