use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use super::error::{FileIngestionError, IngestErrorKind};
use super::model::{
    CellValue, Role, RowRecord, SourceTable, POINTS_COLUMN, ROLE_COLUMN, SALARY_COLUMN, SOURCE_COLUMN,
};

/// Extensions offered by the file picker.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Text cells treated as missing in the numeric columns.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#NA", "N/A", "NA", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None",
];

static EMPTY_CELL: Data = Data::Empty;

// ---------------------------------------------------------------------------
// Uploaded files
// ---------------------------------------------------------------------------

/// A raw workbook as handed over by the file picker.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a workbook from disk, named after its file name.
    pub fn from_path(path: &Path) -> Result<Self, FileIngestionError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path).map_err(|e| FileIngestionError::new(&name, e.into()))?;
        Ok(Self::new(name, bytes))
    }
}

// ---------------------------------------------------------------------------
// Ingestion result
// ---------------------------------------------------------------------------

/// Merged tables keyed by file name (upload order), plus per-file failures.
#[derive(Debug, Default)]
pub struct Ingestion {
    tables: Vec<SourceTable>,
    pub errors: Vec<FileIngestionError>,
}

impl Ingestion {
    /// Store a table. A name seen before is replaced in place.
    pub fn insert(&mut self, table: SourceTable) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SourceTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Ingested file names in upload order.
    pub fn names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    pub fn tables(&self) -> &[SourceTable] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Ingest every upload. A failing file is recorded and skipped; the rest
/// are still processed.
pub fn ingest(files: &[UploadedFile]) -> Ingestion {
    let mut ingestion = Ingestion::default();
    for file in files {
        log::info!("Loading data from: {}...", file.name);
        match ingest_file(file) {
            Ok(table) => {
                log::info!(
                    "{}: {} jockeys, {} trainers, {} sires",
                    file.name,
                    table.count_role(Role::Jockey),
                    table.count_role(Role::Trainer),
                    table.count_role(Role::Sire),
                );
                ingestion.insert(table);
            }
            Err(e) => {
                log::error!("{e}");
                ingestion.errors.push(e);
            }
        }
    }
    ingestion
}

/// Read the three role sheets of one workbook and merge them.
///
/// All-or-nothing: any missing sheet, missing column or bad value rejects
/// the whole file.
pub fn ingest_file(file: &UploadedFile) -> Result<SourceTable, FileIngestionError> {
    let fail = |kind: IngestErrorKind| FileIngestionError::new(&file.name, kind);

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(file.bytes.as_slice()))
        .map_err(|e| fail(IngestErrorKind::Open(e)))?;
    let sheet_names = workbook.sheet_names();

    let mut rows = Vec::new();
    for role in Role::ALL {
        let sheet = role.sheet_name();
        if !sheet_names.iter().any(|s| s == sheet) {
            return Err(fail(IngestErrorKind::MissingSheet {
                sheet: sheet.to_string(),
                available: sheet_names.join(", "),
            }));
        }
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|source| {
                fail(IngestErrorKind::Sheet {
                    sheet: sheet.to_string(),
                    source,
                })
            })?;
        rows.extend(parse_sheet(&range, role, &file.name).map_err(fail)?);
    }

    Ok(SourceTable {
        name: file.name.clone(),
        rows,
    })
}

// ---------------------------------------------------------------------------
// Sheet parsing
// ---------------------------------------------------------------------------

/// Turn a sheet's used range into rows. The first row is the header.
fn parse_sheet(
    range: &Range<Data>,
    role: Role,
    source: &str,
) -> Result<Vec<RowRecord>, IngestErrorKind> {
    let sheet = role.sheet_name();
    let mut row_iter = range.rows();
    let header_row = row_iter.next().ok_or_else(|| IngestErrorKind::EmptySheet {
        sheet: sheet.to_string(),
    })?;
    let headers = header_names(header_row);

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IngestErrorKind::MissingColumn {
                sheet: sheet.to_string(),
                column: name.to_string(),
            })
    };
    let salary_idx = column(SALARY_COLUMN)?;
    let points_idx = column(POINTS_COLUMN)?;

    // Spreadsheet row number (1-based) of the first data row.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0) + 2;

    let mut rows = Vec::new();
    for (offset, cells) in row_iter.enumerate() {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let row_no = first_row + offset;
        let numeric = |idx: usize, name: &str| {
            numeric_cell(cells.get(idx).unwrap_or(&EMPTY_CELL)).map_err(|value| {
                IngestErrorKind::InvalidValue {
                    sheet: sheet.to_string(),
                    row: row_no,
                    column: name.to_string(),
                    value,
                }
            })
        };
        let final_salary = numeric(salary_idx, SALARY_COLUMN)?;
        let total_points = numeric(points_idx, POINTS_COLUMN)?;

        let mut extra = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if idx == salary_idx || idx == points_idx || header == ROLE_COLUMN || header == SOURCE_COLUMN {
                continue;
            }
            let cell = cells.get(idx).unwrap_or(&EMPTY_CELL);
            extra.insert(header.clone(), to_cell_value(cell));
        }

        rows.push(RowRecord {
            role,
            source: source.to_string(),
            final_salary,
            total_points,
            extra,
        });
    }
    Ok(rows)
}

/// Header labels: trimmed, blanks become `Unnamed: <idx>`, repeats get `.N`.
fn header_names(cells: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    cells
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let raw = cell.to_string().trim().to_string();
            let base = if raw.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                raw
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

/// Parse a cell of an analysis column. `Err` carries the offending text.
fn numeric_cell(cell: &Data) -> Result<Option<f64>, String> {
    match cell {
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::Float(f) => Ok(Some(*f)),
        Data::Empty | Data::Error(_) => Ok(None),
        Data::String(s) => {
            let s = s.trim();
            if NA_MARKERS.contains(&s) {
                return Ok(None);
            }
            s.parse::<f64>().map(Some).map_err(|_| s.to_string())
        }
        other => Err(other.to_string()),
    }
}

fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) | Data::DurationIso(_) => {
            CellValue::DateTime(cell.to_string())
        }
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    /// One sheet's contents: headers, then rows of optional numbers.
    pub(crate) struct SheetSpec<'a> {
        pub name: &'a str,
        pub headers: &'a [&'a str],
        pub rows: Vec<Vec<Option<f64>>>,
    }

    pub(crate) fn workbook_bytes(sheets: &[SheetSpec<'_>]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        for spec in sheets {
            let ws = workbook.add_worksheet();
            ws.set_name(spec.name).unwrap();
            for (c, h) in spec.headers.iter().enumerate() {
                ws.write_string(0, c as u16, *h).unwrap();
            }
            for (r, row) in spec.rows.iter().enumerate() {
                for (c, v) in row.iter().enumerate() {
                    if let Some(v) = v {
                        ws.write_number(r as u32 + 1, c as u16, *v).unwrap();
                    }
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    /// Three-sheet workbook with `n` (salary, points) rows per sheet.
    pub(crate) fn role_workbook(counts: [usize; 3]) -> Vec<u8> {
        let sheets: Vec<SheetSpec<'_>> = Role::ALL
            .iter()
            .zip(counts)
            .map(|(role, n)| SheetSpec {
                name: role.sheet_name(),
                headers: &["Id", "Final_Salary", "Total_Points"],
                rows: (0..n)
                    .map(|i| vec![Some(i as f64), Some(1000.0 + i as f64 * 10.0), Some(i as f64 * 2.0)])
                    .collect(),
            })
            .collect();
        workbook_bytes(&sheets)
    }

    #[test]
    fn merges_three_sheets_in_role_order() {
        let file = UploadedFile::new("week1.xlsx", role_workbook([2, 3, 1]));
        let table = ingest_file(&file).unwrap();

        assert_eq!(table.len(), 6);
        let roles: Vec<Role> = table.rows.iter().map(|r| r.role).collect();
        assert_eq!(
            roles,
            [Role::Jockey, Role::Jockey, Role::Trainer, Role::Trainer, Role::Trainer, Role::Sire]
        );
        assert!(table.rows.iter().all(|r| r.source == "week1.xlsx"));
        // sheet row order is kept
        assert_eq!(table.rows[2].extra["Id"], CellValue::Float(0.0));
        assert_eq!(table.rows[3].extra["Id"], CellValue::Float(1.0));
        assert_eq!(table.rows[4].final_salary, Some(1020.0));
    }

    #[test]
    fn sheet_role_and_source_columns_do_not_shadow_stamped_values() {
        let headers = ["Source", "Role", "Final_Salary", "Total_Points", "Starts"];
        let sheets: Vec<SheetSpec<'_>> = Role::ALL
            .iter()
            .map(|role| SheetSpec {
                name: role.sheet_name(),
                headers: &headers,
                rows: vec![vec![Some(7.0), Some(9.0), Some(1000.0), Some(4.0), Some(3.0)]],
            })
            .collect();
        let table = ingest_file(&UploadedFile::new("stamped.xlsx", workbook_bytes(&sheets))).unwrap();

        let first = &table.rows[0];
        assert_eq!(first.source, "stamped.xlsx");
        assert_eq!(first.role, Role::Jockey);
        assert!(!first.extra.contains_key("Source"));
        assert!(!first.extra.contains_key("Role"));
        assert_eq!(first.extra["Starts"], CellValue::Float(3.0));
    }

    #[test]
    fn missing_sires_sheet_rejects_whole_file() {
        let bytes = workbook_bytes(&[
            SheetSpec { name: "Jockeys", headers: &["Final_Salary", "Total_Points"], rows: vec![vec![Some(1.0), Some(2.0)]] },
            SheetSpec { name: "Trainers", headers: &["Final_Salary", "Total_Points"], rows: vec![vec![Some(1.0), Some(2.0)]] },
        ]);
        let err = ingest_file(&UploadedFile::new("partial.xlsx", bytes)).unwrap_err();
        assert_eq!(err.file, "partial.xlsx");
        assert!(matches!(err.kind, IngestErrorKind::MissingSheet { ref sheet, .. } if sheet == "Sires"));
        assert!(err.to_string().starts_with("Error processing file partial.xlsx:"));
    }

    #[test]
    fn one_bad_file_does_not_stop_the_others() {
        let files = vec![
            UploadedFile::new("a.xlsx", role_workbook([1, 1, 1])),
            UploadedFile::new("broken.xlsx", b"not a workbook".to_vec()),
            UploadedFile::new("c.xlsx", role_workbook([2, 0, 1])),
        ];
        let ingestion = ingest(&files);
        assert_eq!(ingestion.names(), ["a.xlsx", "c.xlsx"]);
        assert_eq!(ingestion.errors.len(), 1);
        assert_eq!(ingestion.errors[0].file, "broken.xlsx");
        assert_eq!(ingestion.get("c.xlsx").map(SourceTable::len), Some(3));
    }

    #[test]
    fn missing_analysis_column_is_rejected_at_ingestion() {
        let ok = SheetSpec { name: "", headers: &["Final_Salary", "Total_Points"], rows: vec![] };
        let bytes = workbook_bytes(&[
            SheetSpec { name: "Jockeys", ..ok },
            SheetSpec { name: "Trainers", headers: &["Final_Salary", "Points"], rows: vec![vec![Some(1.0), Some(1.0)]] },
            SheetSpec { name: "Sires", headers: &["Final_Salary", "Total_Points"], rows: vec![] },
        ]);
        let err = ingest_file(&UploadedFile::new("cols.xlsx", bytes)).unwrap_err();
        assert!(matches!(
            err.kind,
            IngestErrorKind::MissingColumn { ref sheet, ref column } if sheet == "Trainers" && column == "Total_Points"
        ));
    }

    #[test]
    fn empty_cells_become_missing_values() {
        let bytes = workbook_bytes(&[
            SheetSpec { name: "Jockeys", headers: &["Final_Salary", "Total_Points", "Note"], rows: vec![vec![Some(5.0), None, Some(1.0)]] },
            SheetSpec { name: "Trainers", headers: &["Final_Salary", "Total_Points"], rows: vec![] },
            SheetSpec { name: "Sires", headers: &["Final_Salary", "Total_Points"], rows: vec![] },
        ]);
        let table = ingest_file(&UploadedFile::new("gaps.xlsx", bytes)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].final_salary, Some(5.0));
        assert_eq!(table.rows[0].total_points, None);
    }

    #[test]
    fn non_numeric_salary_text_is_rejected() {
        let mut workbook = Workbook::new();
        for role in Role::ALL {
            let ws = workbook.add_worksheet();
            ws.set_name(role.sheet_name()).unwrap();
            ws.write_string(0, 0, "Final_Salary").unwrap();
            ws.write_string(0, 1, "Total_Points").unwrap();
            ws.write_string(1, 0, if role == Role::Sire { "lots" } else { "12.5" }).unwrap();
            ws.write_number(1, 1, 3.0).unwrap();
        }
        let bytes = workbook.save_to_buffer().unwrap();
        let err = ingest_file(&UploadedFile::new("text.xlsx", bytes)).unwrap_err();
        assert!(matches!(
            err.kind,
            IngestErrorKind::InvalidValue { ref sheet, row: 2, ref value, .. } if sheet == "Sires" && value == "lots"
        ));
    }

    #[test]
    fn header_names_fill_blanks_and_dedupe() {
        let cells = [
            Data::String(" Name ".into()),
            Data::Empty,
            Data::String("Name".into()),
        ];
        assert_eq!(header_names(&cells), ["Name", "Unnamed: 1", "Name.1"]);
    }

    #[test]
    fn reingesting_a_name_replaces_in_place() {
        let mut ingestion = Ingestion::default();
        ingestion.insert(SourceTable { name: "a".into(), rows: vec![] });
        ingestion.insert(SourceTable { name: "b".into(), rows: vec![] });
        let replacement = ingest_file(&UploadedFile::new("a", role_workbook([1, 0, 0]))).unwrap();
        ingestion.insert(replacement);
        assert_eq!(ingestion.names(), ["a", "b"]);
        assert_eq!(ingestion.get("a").map(SourceTable::len), Some(1));
    }

    #[test]
    fn uploads_read_from_disk_keep_their_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("season.xlsx");
        std::fs::write(&path, role_workbook([1, 1, 1])).unwrap();

        let upload = UploadedFile::from_path(&path).unwrap();
        assert_eq!(upload.name, "season.xlsx");
        assert_eq!(ingest_file(&upload).unwrap().len(), 3);

        let missing = UploadedFile::from_path(&dir.path().join("gone.xlsx")).unwrap_err();
        assert!(matches!(missing.kind, IngestErrorKind::Io(_)));
    }
}
