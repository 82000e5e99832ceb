use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::analysis::Analysis;
use crate::data::error::FileIngestionError;
use crate::data::filter::{self, Selection};
use crate::data::loader::{self, Ingestion, UploadedFile};
use crate::data::model::UnifiedTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which view the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Data,
    Correlation,
    Charts,
}

/// Column the data table is sorted by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Role,
    Source,
    Salary,
    Points,
    Extra(String),
}

/// The full UI state, independent of rendering.
///
/// Every interaction reruns `ingest → select → analyse` from `uploads`;
/// nothing derived is carried over between runs.
pub struct AppState {
    pub config: AppConfig,

    /// Raw workbooks, in upload order.
    pub uploads: Vec<UploadedFile>,

    /// Files that could not even be read from disk on the last open.
    pub read_errors: Vec<FileIngestionError>,

    /// Per-file merged tables and ingestion failures.
    pub ingestion: Ingestion,

    /// Selected file names, in selection order.
    pub selection: Selection,

    /// Rows of the selected files (None when nothing is selected).
    pub table: Option<UnifiedTable>,

    /// Statistics over `table`.
    pub analysis: Option<Analysis>,

    /// One colour per ingested file.
    pub color_map: ColorMap,

    pub tab: Tab,

    /// Data table ordering: key and ascending flag.
    pub sort: Option<(SortKey, bool)>,

    /// Status message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            uploads: Vec::new(),
            read_errors: Vec::new(),
            ingestion: Ingestion::default(),
            selection: Selection::new(),
            table: None,
            analysis: None,
            color_map: ColorMap::default(),
            tab: Tab::default(),
            sort: None,
            status_message: None,
        }
    }

    /// Add workbooks; a name already uploaded is replaced in place.
    pub fn add_uploads(&mut self, files: Vec<UploadedFile>) {
        for file in files {
            match self.uploads.iter_mut().find(|u| u.name == file.name) {
                Some(existing) => *existing = file,
                None => self.uploads.push(file),
            }
        }
        self.reingest();
    }

    /// Read workbooks from disk and ingest them.
    pub fn open_paths<P: AsRef<std::path::Path>>(&mut self, paths: &[P]) {
        self.read_errors.clear();
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match UploadedFile::from_path(path.as_ref()) {
                Ok(file) => files.push(file),
                Err(e) => {
                    log::error!("{e}");
                    self.read_errors.push(e);
                }
            }
        }
        self.add_uploads(files);
    }

    pub fn remove_upload(&mut self, name: &str) {
        self.uploads.retain(|u| u.name != name);
        self.reingest();
    }

    pub fn clear(&mut self) {
        self.uploads.clear();
        self.read_errors.clear();
        self.reingest();
    }

    /// Rebuild everything from the raw uploads. The selection resets to all
    /// ingested files, as after a fresh upload.
    pub fn reingest(&mut self) {
        self.ingestion = loader::ingest(&self.uploads);
        self.selection = filter::init_selection(&self.ingestion);
        self.color_map = ColorMap::new(&self.ingestion.names());

        let n_err = self.ingestion.errors.len() + self.read_errors.len();
        self.status_message = match (self.ingestion.len(), n_err) {
            (_, 0) => None,
            (ok, err) => Some(format!("{ok} file(s) loaded, {err} failed")),
        };
        self.recompute();
    }

    /// Re-run selection and statistics after a selection change.
    pub fn recompute(&mut self) {
        self.table = filter::select_sources(&self.ingestion, &self.selection);
        self.analysis = self
            .table
            .as_ref()
            .map(|table| Analysis::compute(table, &self.config));
    }

    pub fn toggle_source(&mut self, name: &str) {
        filter::toggle(&mut self.selection, name);
        self.recompute();
    }

    pub fn select_all(&mut self) {
        self.selection = filter::init_selection(&self.ingestion);
        self.recompute();
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
        self.recompute();
    }

    /// Click on a column header: sort ascending, then flip.
    pub fn sort_by(&mut self, key: SortKey) {
        self.sort = match self.sort.take() {
            Some((current, asc)) if current == key => Some((current, !asc)),
            _ => Some((key, true)),
        };
    }

    /// All ingestion failures to report, disk reads first.
    pub fn errors(&self) -> impl Iterator<Item = &FileIngestionError> {
        self.read_errors.iter().chain(self.ingestion.errors.iter())
    }
}
