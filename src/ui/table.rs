use std::cmp::Ordering;

use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{
    CellValue, RowRecord, UnifiedTable, POINTS_COLUMN, ROLE_COLUMN, SALARY_COLUMN, SOURCE_COLUMN,
};
use crate::state::{AppState, SortKey};

// ---------------------------------------------------------------------------
// Data tab – merged rows of the selected files
// ---------------------------------------------------------------------------

pub fn data_table(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = &state.table else {
        super::plot::empty_hint(ui);
        return;
    };

    ui.label(format!(
        "Selected files: {}",
        state.selection.join(", ")
    ));
    ui.separator();

    let order = sorted_indices(table, state.sort.as_ref());
    let mut keys = vec![SortKey::Role, SortKey::Source, SortKey::Salary, SortKey::Points];
    keys.extend(table.extra_columns.iter().cloned().map(SortKey::Extra));

    let mut clicked = None;
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(120.0))
        .columns(Column::initial(110.0).at_least(60.0), keys.len() - 2)
        .header(22.0, |mut header| {
            for key in &keys {
                header.col(|ui| {
                    let arrow = match &state.sort {
                        Some((k, true)) if k == key => " ▲",
                        Some((k, false)) if k == key => " ▼",
                        _ => "",
                    };
                    let label = RichText::new(format!("{}{arrow}", column_title(key))).strong();
                    if ui.button(label).clicked() {
                        clicked = Some(key.clone());
                    }
                });
            }
        })
        .body(|body| {
            body.rows(18.0, order.len(), |mut row| {
                let record = &table.rows[order[row.index()]];
                for key in &keys {
                    row.col(|ui| {
                        ui.label(cell_text(record, key));
                    });
                }
            });
        });

    if let Some(key) = clicked {
        state.sort_by(key);
    }
}

fn column_title(key: &SortKey) -> &str {
    match key {
        SortKey::Role => ROLE_COLUMN,
        SortKey::Source => SOURCE_COLUMN,
        SortKey::Salary => SALARY_COLUMN,
        SortKey::Points => POINTS_COLUMN,
        SortKey::Extra(name) => name.as_str(),
    }
}

fn cell_text(row: &RowRecord, key: &SortKey) -> String {
    let number = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    match key {
        SortKey::Role => row.role.to_string(),
        SortKey::Source => row.source.clone(),
        SortKey::Salary => number(row.final_salary),
        SortKey::Points => number(row.total_points),
        SortKey::Extra(name) => row.extra.get(name).map(CellValue::to_string).unwrap_or_default(),
    }
}

/// Missing values sort first.
fn cmp_numbers(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

/// Row display order. The sort is stable, so ties keep merge order.
pub fn sorted_indices(table: &UnifiedTable, sort: Option<&(SortKey, bool)>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..table.len()).collect();
    let Some((key, ascending)) = sort else {
        return order;
    };
    let null = CellValue::Null;
    order.sort_by(|&i, &j| {
        let (a, b) = (&table.rows[i], &table.rows[j]);
        let ord = match key {
            SortKey::Role => a.role.cmp(&b.role),
            SortKey::Source => a.source.cmp(&b.source),
            SortKey::Salary => cmp_numbers(a.final_salary, b.final_salary),
            SortKey::Points => cmp_numbers(a.total_points, b.total_points),
            SortKey::Extra(name) => a
                .extra
                .get(name)
                .unwrap_or(&null)
                .cmp(b.extra.get(name).unwrap_or(&null)),
        };
        if *ascending {
            ord
        } else {
            ord.reverse()
        }
    });
    order
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::model::Role;

    fn row(role: Role, salary: Option<f64>, name: &str) -> RowRecord {
        let mut extra = BTreeMap::new();
        extra.insert("Name".to_string(), CellValue::Text(name.to_string()));
        RowRecord {
            role,
            source: "f.xlsx".into(),
            final_salary: salary,
            total_points: None,
            extra,
        }
    }

    fn table() -> UnifiedTable {
        UnifiedTable::from_rows(vec![
            row(Role::Sire, Some(30.0), "c"),
            row(Role::Jockey, None, "a"),
            row(Role::Trainer, Some(10.0), "b"),
        ])
    }

    #[test]
    fn unsorted_keeps_merge_order() {
        assert_eq!(sorted_indices(&table(), None), [0, 1, 2]);
    }

    #[test]
    fn numeric_sort_puts_missing_first() {
        let asc = (SortKey::Salary, true);
        assert_eq!(sorted_indices(&table(), Some(&asc)), [1, 2, 0]);
        let desc = (SortKey::Salary, false);
        assert_eq!(sorted_indices(&table(), Some(&desc)), [0, 2, 1]);
    }

    #[test]
    fn extra_and_role_columns_sort() {
        let by_name = (SortKey::Extra("Name".into()), true);
        assert_eq!(sorted_indices(&table(), Some(&by_name)), [1, 2, 0]);
        let by_role = (SortKey::Role, true);
        assert_eq!(sorted_indices(&table(), Some(&by_role)), [1, 2, 0]);
    }

    #[test]
    fn cells_render_missing_as_blank() {
        let t = table();
        assert_eq!(cell_text(&t.rows[1], &SortKey::Salary), "");
        assert_eq!(cell_text(&t.rows[0], &SortKey::Salary), "30");
        assert_eq!(cell_text(&t.rows[0], &SortKey::Role), "Sire");
        assert_eq!(cell_text(&t.rows[2], &SortKey::Extra("Name".into())), "b");
    }
}
