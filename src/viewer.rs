//! Upload flow controller.
//!
//! A [`Viewer`] owns the page state: which file is being read, the rows of the
//! last successful upload, and the toasts raised along the way. Selecting a
//! file clears the previous data and moves to [`ViewState::Loading`]; handing
//! the file content to [`Viewer::finish_read`] parses it and settles on either
//! [`ViewState::Loaded`] or back on [`ViewState::Idle`] with an error toast.

use crate::detect::has_accepted_extension;
use crate::error::{Error, Result};
use crate::model::{ParseResult, Record};
use crate::options::ReadOptions;
use std::io;
use std::path::Path;

/// Title of the toast raised after a successful upload.
pub const LOADED_TITLE: &str = "File loaded successfully";

/// Title of the toast raised when an upload fails.
pub const ERROR_TITLE: &str = "Error reading file";

/// Description used when the content is not a readable workbook.
pub const PARSE_FAILURE_DESCRIPTION: &str = "Please ensure your file is a valid Excel file";

/// Description used when the file content could not be read.
pub const READ_FAILURE_DESCRIPTION: &str = "Failed to read the file";

/// Visual style of a toast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    /// Success toast for `rows` loaded rows.
    pub fn loaded(rows: usize) -> Self {
        Self {
            title: LOADED_TITLE.to_string(),
            description: format!("Loaded {} rows of data", rows),
            variant: ToastVariant::Default,
        }
    }

    /// Error toast for content that did not parse as a workbook.
    pub fn parse_failure() -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            description: PARSE_FAILURE_DESCRIPTION.to_string(),
            variant: ToastVariant::Destructive,
        }
    }

    /// Error toast for a file that could not be read.
    pub fn read_failure() -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            description: READ_FAILURE_DESCRIPTION.to_string(),
            variant: ToastVariant::Destructive,
        }
    }

    /// Check whether this toast reports a failure.
    pub fn is_destructive(&self) -> bool {
        self.variant == ToastVariant::Destructive
    }
}

/// Page state.
#[derive(Debug, Clone, Default)]
pub enum ViewState {
    /// Nothing loaded (initial state, or after a failed upload)
    #[default]
    Idle,
    /// A file was selected and its content is being read
    Loading { file_name: String },
    /// The first sheet of the last upload; may hold zero rows
    Loaded(ParseResult),
}

/// Upload flow controller.
#[derive(Debug, Default)]
pub struct Viewer {
    state: ViewState,
    toasts: Vec<Toast>,
    options: ReadOptions,
    last_error: Option<Error>,
}

impl Viewer {
    /// Create an idle viewer with default read options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle viewer with the given read options.
    pub fn with_options(options: ReadOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Start an upload: clear the shown data and enter the loading state.
    pub fn select_file(&mut self, file_name: impl Into<String>) {
        let file_name = file_name.into();
        if !has_accepted_extension(&file_name) {
            log::debug!("{} is outside the picker filter, reading anyway", file_name);
        }
        self.last_error = None;
        self.state = ViewState::Loading { file_name };
    }

    /// Complete the upload started by [`select_file`](Self::select_file).
    ///
    /// A read error or a parse error leaves the viewer idle with a
    /// destructive toast; the error itself is kept in
    /// [`last_error`](Self::last_error). Fails only when no upload is in
    /// progress.
    pub fn finish_read(&mut self, content: io::Result<Vec<u8>>) -> Result<()> {
        let file_name = match &self.state {
            ViewState::Loading { file_name } => file_name.clone(),
            ViewState::Idle => {
                return Err(Error::InvalidState("no upload in progress".to_string()))
            }
            ViewState::Loaded(_) => {
                return Err(Error::InvalidState("upload already finished".to_string()))
            }
        };

        let data = match content {
            Ok(data) => data,
            Err(e) => {
                log::warn!("failed to read {}: {}", file_name, e);
                self.fail(Toast::read_failure(), Error::Io(e));
                return Ok(());
            }
        };

        match crate::parse_bytes(data, &self.options) {
            Ok(result) => {
                log::debug!(
                    "{}: sheet {:?}, {} columns, {} rows",
                    file_name,
                    result.sheet_name,
                    result.headers.len(),
                    result.row_count()
                );
                // An empty sheet shows the placeholder without a toast
                if !result.is_empty() {
                    self.toasts.push(Toast::loaded(result.row_count()));
                }
                self.state = ViewState::Loaded(result);
            }
            Err(e) => {
                log::warn!("failed to parse {}: {}", file_name, e);
                self.fail(Toast::parse_failure(), e);
            }
        }

        Ok(())
    }

    fn fail(&mut self, toast: Toast, error: Error) {
        self.toasts.push(toast);
        self.last_error = Some(error);
        self.state = ViewState::Idle;
    }

    /// Upload a file from disk: select it, then read and parse it.
    pub fn upload_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.select_file(display_name(path));
        self.finish_read(std::fs::read(path))
    }

    /// Upload a file from disk, reading it with Tokio.
    #[cfg(feature = "async")]
    pub async fn upload_path_async(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.select_file(display_name(path));
        let content = tokio::fs::read(path).await;
        self.finish_read(content)
    }

    /// Upload in-memory file content.
    pub fn upload_bytes(&mut self, file_name: impl Into<String>, data: Vec<u8>) -> Result<()> {
        self.select_file(file_name);
        self.finish_read(Ok(data))
    }

    /// Current state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Check whether an upload is in progress.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading { .. })
    }

    /// The loaded result, if any.
    pub fn result(&self) -> Option<&ParseResult> {
        match &self.state {
            ViewState::Loaded(result) => Some(result),
            _ => None,
        }
    }

    /// Column names of the loaded data (empty when nothing is loaded).
    pub fn headers(&self) -> &[String] {
        self.result().map(|r| r.headers.as_slice()).unwrap_or(&[])
    }

    /// Rows of the loaded data (empty when nothing is loaded).
    pub fn rows(&self) -> &[Record] {
        self.result().map(|r| r.rows.as_slice()).unwrap_or(&[])
    }

    /// Toasts raised so far, oldest first.
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Remove and return the pending toasts.
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    /// The error behind the last failed upload.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let viewer = Viewer::new();
        assert!(matches!(viewer.state(), ViewState::Idle));
        assert!(viewer.headers().is_empty());
        assert!(viewer.rows().is_empty());
        assert!(viewer.toasts().is_empty());
    }

    #[test]
    fn test_select_file_enters_loading() {
        let mut viewer = Viewer::new();
        viewer.select_file("campaigns.xlsx");
        assert!(viewer.is_loading());
        match viewer.state() {
            ViewState::Loading { file_name } => assert_eq!(file_name, "campaigns.xlsx"),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_finish_read_without_upload() {
        let mut viewer = Viewer::new();
        let result = viewer.finish_read(Ok(Vec::new()));
        assert!(matches!(result, Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_read_failure_toast() {
        let mut viewer = Viewer::new();
        viewer.select_file("campaigns.xlsx");
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        viewer.finish_read(Err(err)).unwrap();

        assert!(matches!(viewer.state(), ViewState::Idle));
        assert_eq!(viewer.toasts(), &[Toast::read_failure()]);
        assert!(matches!(viewer.last_error(), Some(Error::Io(_))));
    }

    #[test]
    fn test_parse_failure_toast() {
        let mut viewer = Viewer::new();
        viewer
            .upload_bytes("notes.xlsx", b"just some text".to_vec())
            .unwrap();

        assert!(matches!(viewer.state(), ViewState::Idle));
        assert!(viewer.rows().is_empty());
        let toast = &viewer.toasts()[0];
        assert_eq!(toast.title, "Error reading file");
        assert_eq!(
            toast.description,
            "Please ensure your file is a valid Excel file"
        );
        assert!(toast.is_destructive());
    }

    #[test]
    fn test_missing_file_is_read_failure() {
        let mut viewer = Viewer::new();
        viewer.upload_path("no/such/file.xls").unwrap();
        assert_eq!(viewer.toasts(), &[Toast::read_failure()]);
    }

    #[test]
    fn test_loaded_toast_text() {
        let toast = Toast::loaded(2);
        assert_eq!(toast.title, "File loaded successfully");
        assert_eq!(toast.description, "Loaded 2 rows of data");
        assert!(!toast.is_destructive());
    }

    #[test]
    fn test_take_toasts() {
        let mut viewer = Viewer::new();
        viewer.upload_bytes("a.xls", vec![0; 4]).unwrap();
        assert_eq!(viewer.take_toasts().len(), 1);
        assert!(viewer.toasts().is_empty());
    }
}
