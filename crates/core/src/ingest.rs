use crate::extractor::{extract_text, PdfExtractor};
use crate::info::InfoExtractor;
use crate::{Candidate, IngestError};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

pub const DOCUMENT_EXTENSION: &str = "pdf";

/// PDF files directly inside `folder` (no recursion), sorted by path.
pub fn discover_pdf_files(folder: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !folder.is_dir() {
        return Err(IngestError::InvalidArgument(format!(
            "resume directory does not exist: {}",
            folder.display()
        )));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    Ok(files)
}

pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

pub struct IngestionReport {
    pub candidates: Vec<Candidate>,
    pub skipped_files: Vec<SkippedPdf>,
}

pub fn ingest_folder_best_effort<X>(
    folder: &Path,
    extractor: &X,
    info: &InfoExtractor,
) -> Result<IngestionReport, IngestError>
where
    X: PdfExtractor + ?Sized,
{
    let files = discover_pdf_files(folder)?;

    let mut candidates = Vec::new();
    let mut skipped_files = Vec::new();

    for path in files {
        let filename = match file_name(&path) {
            Ok(name) => name,
            Err(error) => {
                skipped_files.push(SkippedPdf {
                    path,
                    reason: error.to_string(),
                });
                continue;
            }
        };

        let text = extract_text(extractor, &path);
        if text.is_empty() {
            warn!(path = %path.display(), "skipping resume without extractable text");
            skipped_files.push(SkippedPdf {
                path,
                reason: "no extractable text".to_string(),
            });
            continue;
        }

        let fields = info.extract(&text, &filename);
        candidates.push(Candidate::from_fields(
            candidate_id(&path, &filename),
            path.to_string_lossy().to_string(),
            filename,
            text,
            fields,
        ));
    }

    Ok(IngestionReport {
        candidates,
        skipped_files,
    })
}

fn file_name(path: &Path) -> Result<String, IngestError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            IngestError::MissingFileName(format!("path missing filename: {}", path.display()))
        })
}

fn candidate_id(path: &Path, filename: &str) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(filename)
        .to_string()
}
