use thiserror::Error;

/// Why a single file could not be ingested.
#[derive(Debug, Error)]
pub enum IngestErrorKind {
    #[error("could not open workbook: {0}")]
    Open(#[source] calamine::Error),

    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("worksheet named '{sheet}' not found (available: {available})")]
    MissingSheet { sheet: String, available: String },

    #[error("could not read sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("sheet '{sheet}' has no header row")]
    EmptySheet { sheet: String },

    #[error("sheet '{sheet}' is missing column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("sheet '{sheet}', row {row}: column '{column}' holds non-numeric value '{value}'")]
    InvalidValue {
        sheet: String,
        row: usize,
        column: String,
        value: String,
    },
}

/// A file skipped during ingestion. Never aborts the other files.
#[derive(Debug, Error)]
#[error("Error processing file {file}: {kind}")]
pub struct FileIngestionError {
    pub file: String,
    #[source]
    pub kind: IngestErrorKind,
}

impl FileIngestionError {
    pub fn new(file: impl Into<String>, kind: IngestErrorKind) -> Self {
        Self {
            file: file.into(),
            kind,
        }
    }
}
