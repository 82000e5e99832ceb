use super::loader::Ingestion;
use super::model::UnifiedTable;

// ---------------------------------------------------------------------------
// Selection: which ingested files feed the analysis
// ---------------------------------------------------------------------------

/// Ordered list of selected file names. Order decides row concatenation.
pub type Selection = Vec<String>;

/// Default selection: every ingested file, in upload order.
pub fn init_selection(ingestion: &Ingestion) -> Selection {
    ingestion.names()
}

/// Concatenate the selected files' rows in selection order.
///
/// Returns `None` for an empty selection: nothing downstream should run.
/// Names not present in `ingestion` are ignored.
pub fn select_sources(ingestion: &Ingestion, selection: &[String]) -> Option<UnifiedTable> {
    if selection.is_empty() {
        return None;
    }
    let rows = selection
        .iter()
        .filter_map(|name| ingestion.get(name))
        .flat_map(|table| table.rows.iter().cloned())
        .collect();
    Some(UnifiedTable::from_rows(rows))
}

/// Multiselect toggle: turning a name on appends it, turning it off removes it.
pub fn toggle(selection: &mut Selection, name: &str) {
    match selection.iter().position(|s| s == name) {
        Some(i) => {
            selection.remove(i);
        }
        None => selection.push(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::role_workbook;
    use crate::data::loader::{ingest, UploadedFile};

    fn three_files() -> Ingestion {
        ingest(&[
            UploadedFile::new("a.xlsx", role_workbook([1, 1, 1])),
            UploadedFile::new("b.xlsx", role_workbook([2, 2, 0])),
            UploadedFile::new("c.xlsx", role_workbook([0, 0, 5])),
        ])
    }

    #[test]
    fn default_selection_is_all_in_upload_order() {
        let ingestion = three_files();
        assert_eq!(init_selection(&ingestion), ["a.xlsx", "b.xlsx", "c.xlsx"]);
    }

    #[test]
    fn subset_row_count_sums_selected_files_only() {
        let ingestion = three_files();
        let table = select_sources(&ingestion, &["c.xlsx".to_string(), "a.xlsx".to_string()]).unwrap();
        assert_eq!(table.len(), 8);
        assert_eq!(table.sources, ["c.xlsx", "a.xlsx"]);
        assert!(table.rows[..5].iter().all(|r| r.source == "c.xlsx"));
    }

    #[test]
    fn empty_selection_yields_nothing() {
        assert!(select_sources(&three_files(), &[]).is_none());
    }

    #[test]
    fn unknown_names_are_ignored() {
        let table = select_sources(&three_files(), &["nope.xlsx".to_string(), "b.xlsx".to_string()]).unwrap();
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn toggle_appends_and_removes() {
        let mut sel: Selection = vec!["a".into(), "b".into()];
        toggle(&mut sel, "a");
        assert_eq!(sel, ["b"]);
        toggle(&mut sel, "a");
        assert_eq!(sel, ["b", "a"]);
    }
}
