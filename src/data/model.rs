use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single pass-through spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell for columns outside the fixed row schema.
/// `Ord` so the data table can sort on any column.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date/time rendered as text by the workbook reader.
    DateTime(String),
    Null,
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                DateTime(_) => 5,
            }
        }
        let ra = rank(self);
        let rb = rank(other);
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) | (DateTime(a), DateTime(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(d) => write!(f, "{d}"),
            CellValue::Null => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Role – which sheet a row came from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Jockey,
    Trainer,
    Sire,
}

impl Role {
    /// Sheet read order; merged rows follow it.
    pub const ALL: [Role; 3] = [Role::Jockey, Role::Trainer, Role::Sire];

    /// Name of the workbook sheet holding this role's rows.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Role::Jockey => "Jockeys",
            Role::Trainer => "Trainers",
            Role::Sire => "Sires",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Jockey => "Jockey",
            Role::Trainer => "Trainer",
            Role::Sire => "Sire",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// RowRecord – one merged spreadsheet row
// ---------------------------------------------------------------------------

pub const SALARY_COLUMN: &str = "Final_Salary";
pub const POINTS_COLUMN: &str = "Total_Points";
/// Stamped by ingestion; a sheet column of the same name is dropped.
pub const ROLE_COLUMN: &str = "Role";
pub const SOURCE_COLUMN: &str = "Source";

/// A single merged row with the fixed analysis schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    pub role: Role,
    /// File name the row was ingested from.
    pub source: String,
    /// `None` when the cell was empty.
    pub final_salary: Option<f64>,
    pub total_points: Option<f64>,
    /// Every other column of the source sheet: column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

impl RowRecord {
    /// Both analysis values, if present and finite.
    pub fn salary_points(&self) -> Option<(f64, f64)> {
        match (self.final_salary, self.total_points) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SourceTable – one ingested file
// ---------------------------------------------------------------------------

/// Merged rows of one workbook: Jockeys, then Trainers, then Sires.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    pub name: String,
    pub rows: Vec<RowRecord>,
}

impl SourceTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows carrying the given role.
    pub fn count_role(&self, role: Role) -> usize {
        self.rows.iter().filter(|r| r.role == role).count()
    }
}

// ---------------------------------------------------------------------------
// UnifiedTable – the selected files concatenated
// ---------------------------------------------------------------------------

/// Rows of all selected files with a pre-computed column index.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedTable {
    pub rows: Vec<RowRecord>,
    /// Union of `extra` column names in first-appearance order.
    pub extra_columns: Vec<String>,
    /// Distinct sources in the order they appear in `rows`.
    pub sources: Vec<String>,
}

impl UnifiedTable {
    /// Build the column index from concatenated rows.
    pub fn from_rows(rows: Vec<RowRecord>) -> Self {
        let mut seen_columns: BTreeSet<&str> = BTreeSet::new();
        let mut extra_columns = Vec::new();
        let mut seen_sources: BTreeSet<&str> = BTreeSet::new();
        let mut sources = Vec::new();

        for row in &rows {
            if seen_sources.insert(row.source.as_str()) {
                sources.push(row.source.clone());
            }
            for col in row.extra.keys() {
                if seen_columns.insert(col.as_str()) {
                    extra_columns.push(col.clone());
                }
            }
        }

        UnifiedTable {
            rows,
            extra_columns,
            sources,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows where both analysis columns are present, as `(source, salary, points)`.
    pub fn paired(&self) -> impl Iterator<Item = (&str, f64, f64)> + '_ {
        self.rows
            .iter()
            .filter_map(|r| r.salary_points().map(|(x, y)| (r.source.as_str(), x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(source: &str, salary: Option<f64>, points: Option<f64>) -> RowRecord {
        RowRecord {
            role: Role::Jockey,
            source: source.to_string(),
            final_salary: salary,
            total_points: points,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn roles_map_to_fixed_sheet_names() {
        let sheets: Vec<&str> = Role::ALL.iter().map(|r| r.sheet_name()).collect();
        assert_eq!(sheets, ["Jockeys", "Trainers", "Sires"]);
        assert_eq!(Role::Sire.to_string(), "Sire");
    }

    #[test]
    fn unified_table_indexes_sources_and_columns_in_order() {
        let mut a = row("b.xlsx", Some(1.0), Some(2.0));
        a.extra.insert("Name".into(), CellValue::Text("X".into()));
        let mut b = row("a.xlsx", None, Some(3.0));
        b.extra.insert("Age".into(), CellValue::Integer(4));
        b.extra.insert("Name".into(), CellValue::Text("Y".into()));

        let table = UnifiedTable::from_rows(vec![a, b]);
        assert_eq!(table.sources, ["b.xlsx", "a.xlsx"]);
        assert_eq!(table.extra_columns, ["Name", "Age"]);
        assert_eq!(table.paired().count(), 1);
    }

    #[test]
    fn non_finite_values_are_not_paired() {
        assert_eq!(row("f", Some(f64::NAN), Some(1.0)).salary_points(), None);
        assert_eq!(row("f", Some(2.0), Some(1.0)).salary_points(), Some((2.0, 1.0)));
    }

    #[test]
    fn cell_values_order_by_kind_then_value() {
        let mut vals = vec![
            CellValue::Text("b".into()),
            CellValue::Integer(3),
            CellValue::Null,
            CellValue::Integer(1),
        ];
        vals.sort();
        assert_eq!(
            vals,
            [
                CellValue::Null,
                CellValue::Integer(1),
                CellValue::Integer(3),
                CellValue::Text("b".into()),
            ]
        );
    }
}
