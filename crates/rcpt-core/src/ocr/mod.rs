//! OCR fallback for scanned receipts.
//!
//! The pipeline only needs text back from an image; any engine implementing
//! [`ImageOcr`] can be plugged into [`crate::source::PdfTextSource`].

#[cfg(feature = "ocr")]
mod pure_engine;

#[cfg(feature = "ocr")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Image-to-text recognizer.
pub trait ImageOcr {
    /// Recognize text in an image, lines in reading order.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

impl<F> ImageOcr for F
where
    F: Fn(&DynamicImage) -> Result<String, OcrError>,
{
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        self(image)
    }
}

/// A recognized text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub score: f32,
}

impl TextBox {
    /// Axis-aligned bounding rectangle as (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().copied().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Height of a row band when grouping boxes into lines.
const ROW_HEIGHT: f32 = 20.0;

/// Sort boxes top-to-bottom, then left-to-right within a row band.
pub fn sort_by_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();
        let row_a = (ay / ROW_HEIGHT) as i32;
        let row_b = (by / ROW_HEIGHT) as i32;

        row_a
            .cmp(&row_b)
            .then(ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal))
    });
}

/// Join boxes into text, one line per row band.
///
/// Boxes must already be in reading order. Keeping a receipt row (label and
/// amount) on one line matters to the total rule.
pub fn boxes_to_text(boxes: &[TextBox]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current_row = None;

    for text_box in boxes {
        let (_, y, _, _) = text_box.rect();
        let row = (y / ROW_HEIGHT) as i32;

        match lines.last_mut() {
            Some(line) if current_row == Some(row) => {
                line.push(' ');
                line.push_str(&text_box.text);
            }
            _ => lines.push(text_box.text.clone()),
        }
        current_row = Some(row);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
            score: 0.9,
        }
    }

    #[test]
    fn test_rect() {
        let b = text_box(10.0, 40.0, "x");
        assert_eq!(b.rect(), (10.0, 40.0, 60.0, 50.0));
    }

    #[test]
    fn test_reading_order_and_rows() {
        let mut boxes = vec![
            text_box(300.0, 102.0, "$25.37"),
            text_box(10.0, 5.0, "Acme Hardware"),
            text_box(10.0, 100.0, "Total"),
        ];

        sort_by_reading_order(&mut boxes);
        assert_eq!(boxes_to_text(&boxes), "Acme Hardware\nTotal $25.37");
    }

    #[test]
    fn test_closure_as_ocr() {
        let ocr = |_: &DynamicImage| -> Result<String, OcrError> { Ok("Total 1.00".to_string()) };
        let image = DynamicImage::new_rgb8(1, 1);
        assert_eq!(ocr.recognize(&image).unwrap(), "Total 1.00");
    }
}
