//! PDF text and image extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// Upper bound on page-tree depth when looking up inherited resources.
const MAX_TREE_DEPTH: usize = 32;

/// PDF content extractor.
///
/// `lopdf` parses the structure and decodes page images; `pdf-extract` reads
/// the text layer.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create an extractor with no document loaded.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Create an extractor and load `data` into it.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("no document loaded".to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            // Receipts are often "encrypted" with an empty user password
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        self.document()?;

        // pdf-extract panics on some malformed content streams
        let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&self.raw_data)
        }))
        .map_err(|_| PdfError::TextExtraction("text extractor panicked".to_string()))?;

        let text = extracted.map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        trace!("Extracted {} chars of text", text.len());
        Ok(text)
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let page_id = *doc
            .get_pages()
            .get(&page)
            .ok_or(PdfError::InvalidPage(page))?;

        let Some(resources) = page_resources(doc, page_id) else {
            return Ok(Vec::new());
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return Ok(Vec::new());
        };
        let xobjects = match doc.dereference(xobjects) {
            Ok((_, Object::Dictionary(dict))) => dict,
            _ => return Ok(Vec::new()),
        };

        let mut images = Vec::new();
        let mut failure = None;
        for (name, obj) in xobjects.iter() {
            let Ok((_, Object::Stream(stream))) = doc.dereference(obj) else {
                continue;
            };
            match decode_image_xobject(doc, stream) {
                Ok(Some(image)) => images.push(image),
                Ok(None) => {}
                Err(e) => {
                    debug!("Image {} on page {}: {}", String::from_utf8_lossy(name), page, e);
                    failure.get_or_insert(e);
                }
            }
        }

        // A page fails only when none of its images could be decoded
        match failure {
            Some(e) if images.is_empty() => Err(e),
            _ => {
                debug!("Decoded {} images on page {}", images.len(), page);
                Ok(images)
            }
        }
    }
}

/// Resources of a page, following `Parent` links for inherited entries.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node_id = page_id;

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(node_id).ok()?;

        if let Ok(resources) = node.get(b"Resources") {
            if let Ok((_, Object::Dictionary(dict))) = doc.dereference(resources) {
                return Some(dict);
            }
        }

        node_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }

    None
}

/// Decode an image XObject stream.
///
/// Handles JPEG (`DCTDecode`) and 8-bit RGB or grayscale samples after the
/// stream filters are undone. Other encodings are skipped with `Ok(None)`;
/// a JPEG that fails to decode is an error.
fn decode_image_xobject(doc: &Document, stream: &Stream) -> Result<Option<DynamicImage>> {
    let dict = &stream.dict;
    if dict.get(b"Subtype").and_then(Object::as_name).ok() != Some(b"Image".as_slice()) {
        return Ok(None);
    }

    let dimension = |key: &[u8]| {
        dict.get(key)
            .and_then(Object::as_i64)
            .ok()
            .and_then(|v| u32::try_from(v).ok())
    };
    let (Some(width), Some(height)) = (dimension(b"Width"), dimension(b"Height")) else {
        return Ok(None);
    };

    match first_name(doc, dict.get(b"Filter").ok()) {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                .map(Some)
                .map_err(|e| PdfError::ImageExtraction(format!("{}x{} JPEG: {}", width, height, e)));
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Skipping {}x{} image with unsupported filter", width, height);
            return Ok(None);
        }
        _ => {}
    }

    Ok(decode_raw_samples(doc, stream, width, height))
}

/// 8-bit RGB or grayscale samples, or `None` when the layout is unsupported
/// or the stream is short.
fn decode_raw_samples(doc: &Document, stream: &Stream, width: u32, height: u32) -> Option<DynamicImage> {
    let dict = &stream.dict;

    let bits = dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits != 8 {
        trace!("Skipping image with {} bits per component", bits);
        return None;
    }

    let samples = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    let pixels = (width as usize).checked_mul(height as usize)?;

    match first_name(doc, dict.get(b"ColorSpace").ok()).unwrap_or(b"DeviceRGB") {
        b"DeviceRGB" | b"RGB" => {
            let len = pixels.checked_mul(3)?;
            let buf = samples.get(..len)?.to_vec();
            RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" => {
            let buf = samples.get(..pixels)?.to_vec();
            GrayImage::from_raw(width, height, buf).map(DynamicImage::ImageLuma8)
        }
        other => {
            trace!("Skipping image in color space {}", String::from_utf8_lossy(other));
            None
        }
    }
}

/// Name value of an entry that may be a name, an array of names or a reference.
fn first_name<'a>(doc: &'a Document, obj: Option<&'a Object>) -> Option<&'a [u8]> {
    let (_, obj) = doc.dereference(obj?).ok()?;
    match obj {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(items) => items.first().and_then(|o| o.as_name().ok()),
        _ => None,
    }
}
