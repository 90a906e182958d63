use crate::error::IngestError;
use lopdf::Document;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PageText {
    pub text: String,
}

pub trait PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, IngestError> {
        let document = Document::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;

            pages.push(PageText { text });
        }

        Ok(pages)
    }
}

pub fn extract_text<X>(extractor: &X, path: &Path) -> String
where
    X: PdfExtractor + ?Sized,
{
    match extractor.extract_pages(path) {
        Ok(pages) => pages.into_iter().map(|page| page.text).collect(),
        Err(error) => {
            warn!(path = %path.display(), %error, "unable to extract pdf text");
            String::new()
        }
    }
}
