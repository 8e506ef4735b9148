//! Building the downloaded-files list shown after a successful job.

use super::models::FileRecord;

pub const NO_FILES_PLACEHOLDER: &str = "No files downloaded";
pub const NO_SUBJECT_PLACEHOLDER: &str = "No subject";

/// One row of the results list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub name: String,
    pub from: String,
    pub subject: String,
    pub date: String,
    /// Server-relative link, e.g. `/downloads/a.pdf`.
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    Empty,
    Items(Vec<ResultItem>),
}

impl ResultsView {
    pub fn len(&self) -> usize {
        match self {
            ResultsView::Empty => 0,
            ResultsView::Items(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Server-relative download route for a file name.
pub fn download_path(name: &str) -> String {
    format!("/downloads/{}", urlencoding::encode(name))
}

/// Build the results list, keeping the server's order.
pub fn render_results(files: &[FileRecord]) -> ResultsView {
    if files.is_empty() {
        return ResultsView::Empty;
    }

    let items = files
        .iter()
        .map(|file| ResultItem {
            name: file.name.clone(),
            from: file.from.clone(),
            subject: match file.subject.as_deref() {
                Some(subject) if !subject.is_empty() => subject.to_string(),
                _ => NO_SUBJECT_PLACEHOLDER.to_string(),
            },
            date: file.date.clone(),
            download_url: download_path(&file.name),
        })
        .collect();

    ResultsView::Items(items)
}
