use pdf_engine::{
    DocumentHandle, LopdfEngine, OpenSource, PageSize, PdfEngine, PdfEngineError, RgbaImage,
};
use placement_core::DocumentRenderer;
use std::path::{Path, PathBuf};

/// A PDF on disk, opened on first use.
pub struct LoadedPdf {
    engine: LopdfEngine,
    path: PathBuf,
    handle: Option<DocumentHandle>,
}

impl LoadedPdf {
    pub fn new(path: &Path) -> Self {
        Self { engine: pdf_engine::default_engine(), path: path.to_path_buf(), handle: None }
    }

    pub fn page_size(&self, page_number: u32) -> Option<PageSize> {
        let handle = self.handle?;
        self.engine.page_size(handle, page_number).ok()
    }

    fn open(&mut self) -> Result<DocumentHandle, PdfEngineError> {
        if let Some(handle) = self.handle {
            return Ok(handle);
        }

        let handle = self.engine.open(OpenSource::from(self.path.as_path()))?;
        self.handle = Some(handle);
        Ok(handle)
    }
}

impl DocumentRenderer for LoadedPdf {
    type Page = RgbaImage;
    type Error = PdfEngineError;

    fn load(&mut self) -> Result<u32, PdfEngineError> {
        let handle = self.open()?;
        self.engine.page_count(handle)
    }

    fn render_page(
        &mut self,
        page_number: u32,
        width_px: u32,
    ) -> Result<RgbaImage, PdfEngineError> {
        let handle = self.open()?;
        self.engine.render_page(handle, page_number, width_px)
    }
}

impl Drop for LoadedPdf {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.engine.close(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_before_load_opens_the_document() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("missing.pdf");
        let mut pdf = LoadedPdf::new(&path);

        let err = pdf.render_page(1, 300).expect_err("missing file should fail to open");
        assert!(matches!(err, PdfEngineError::Io(_)));
        assert!(pdf.page_size(1).is_none());
    }
}
