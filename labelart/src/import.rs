//! Import a page content stream: parse operations, then extract vector objects
//! and text spans.

use crate::{
    cluster::DEFAULT_PROXIMITY_THRESHOLD_MM,
    extract::{extract_painted_objects, PaintedObject},
    graphics::{batch_path_construction, parse_operations, trans::pt_to_mm},
    text::{extract_text_spans, TextSpan},
};
use educe::Educe;
use flate2::bufread::{DeflateDecoder, ZlibDecoder};
use log::info;
use std::{io::Read, path::Path};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("read content: {0}")]
    Io(#[from] std::io::Error),
    #[error("inflate content: {0}")]
    Decode(std::io::Error),
    #[error("parse content: {0}")]
    Parse(String),
}

/// Option for page import
#[derive(Debug, Educe, Clone, Copy, PartialEq)]
#[educe(Default)]
pub struct ExtractOption {
    /// Page height in pdf points, A4 by default.
    #[educe(Default = 841.89)]
    page_height_pt: f64,
    #[educe(Default(expression = "DEFAULT_PROXIMITY_THRESHOLD_MM"))]
    proximity_threshold_mm: f64,
}

impl ExtractOption {
    pub fn page_height_pt(&self) -> f64 {
        self.page_height_pt
    }

    pub fn page_height_mm(&self) -> f64 {
        pt_to_mm(self.page_height_pt)
    }

    pub fn proximity_threshold_mm(&self) -> f64 {
        self.proximity_threshold_mm
    }
}

#[derive(Educe)]
#[educe(Default(new))]
pub struct ExtractOptionBuilder(ExtractOption);

impl ExtractOptionBuilder {
    pub fn page_height_pt(mut self, height: f64) -> Self {
        self.0.page_height_pt = height;
        self
    }

    pub fn proximity_threshold_mm(mut self, threshold: f64) -> Self {
        self.0.proximity_threshold_mm = threshold;
        self
    }

    pub fn build(self) -> ExtractOption {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedPage {
    pub height_mm: f64,
    pub objects: Vec<PaintedObject>,
    pub texts: Vec<TextSpan>,
}

/// Inflate FlateDecode data, raw deflate stream without zlib header tolerated.
pub fn inflate(buf: &[u8]) -> Result<Vec<u8>, ImportError> {
    let mut r = Vec::with_capacity(buf.len() * 2);
    if ZlibDecoder::new(buf).read_to_end(&mut r).is_ok() {
        return Ok(r);
    }

    r.clear();
    DeflateDecoder::new(buf)
        .read_to_end(&mut r)
        .map_err(ImportError::Decode)?;
    Ok(r)
}

/// Load content stream from file, inflate if `compressed`.
pub fn load_content(path: impl AsRef<Path>, compressed: bool) -> Result<Vec<u8>, ImportError> {
    let buf = std::fs::read(path)?;
    if compressed {
        inflate(&buf)
    } else {
        Ok(buf)
    }
}

/// Parse content stream, vector objects and text spans are extracted in parallel.
/// Broken content fails the whole import, no partial result returned.
pub fn import_page(content: &[u8], option: &ExtractOption) -> Result<ImportedPage, ImportError> {
    let (remains, ops) = parse_operations(content).map_err(|e| ImportError::Parse(e.to_string()))?;
    if !remains.is_empty() {
        return Err(ImportError::Parse(format!(
            "unexpected content at offset {}",
            content.len() - remains.len()
        )));
    }

    let height_mm = option.page_height_mm();
    let (objects, texts) = rayon::join(
        || extract_painted_objects(batch_path_construction(ops.iter().cloned()), height_mm),
        || extract_text_spans(&ops, height_mm),
    );
    info!(
        "imported {} operations: {} objects, {} text spans",
        ops.len(),
        objects.len(),
        texts.len()
    );
    Ok(ImportedPage {
        height_mm,
        objects,
        texts,
    })
}
