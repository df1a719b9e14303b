//! Extract text spans from page operations.
//!
//! Glyph metrics need font programs that the content stream does not carry,
//! spans are positioned at the origin of the text line they are shown on.

use crate::graphics::{
    trans::{
        compose, page_to_output, transform_point, AffineMatrix, PageToOutputSpace,
        UserToPageSpace,
    },
    Operation, Point, TextStringOrNumber,
};
use encoding_rs::WINDOWS_1252;
use log::{debug, info};

/// `TJ` position adjustment, in thousandths of text space unit, less than this
/// is treated as a word gap.
const WORD_GAP_ADJUSTMENT: f64 = -200.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    /// Font resource name, empty if `Tf` not called.
    pub font: String,
    /// Font size scaled by text matrix and CTM.
    pub font_size_pt: f64,
    pub x_mm: f64,
    pub y_mm: f64,
}

#[derive(Debug, Clone, Default)]
struct TextState {
    font: String,
    font_size: f64,
    leading: f64,
    matrix: AffineMatrix,
    line_matrix: AffineMatrix,
}

#[derive(Debug)]
pub struct TextExtractor {
    ctm: UserToPageSpace,
    ctm_stack: Vec<UserToPageSpace>,
    text: TextState,
    page_to_output: PageToOutputSpace,
    spans: Vec<TextSpan>,
}

fn decode_text(s: &[u8]) -> String {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(s);
    text.into_owned()
}

impl TextExtractor {
    pub fn new(page_height_mm: f64) -> Self {
        Self {
            ctm: UserToPageSpace::identity(),
            ctm_stack: vec![],
            text: TextState::default(),
            page_to_output: page_to_output(page_height_mm),
            spans: vec![],
        }
    }

    pub fn exec(&mut self, op: &Operation) {
        match op {
            Operation::SaveGraphicsState => self.ctm_stack.push(self.ctm),
            Operation::RestoreGraphicsState => match self.ctm_stack.pop() {
                Some(ctm) => self.ctm = ctm,
                None => info!("pop empty state stack"),
            },
            Operation::ModifyCTM(m) => self.ctm = compose(&self.ctm, m),

            Operation::BeginText => {
                self.text.matrix = AffineMatrix::identity();
                self.text.line_matrix = AffineMatrix::identity();
            }
            Operation::EndText => {}
            Operation::SetLeading(leading) => self.text.leading = *leading,
            Operation::SetFont(name, size) => {
                self.text.font = name.as_str().to_owned();
                self.text.font_size = *size;
            }
            Operation::MoveTextPosition(p) => self.move_text_position(*p),
            Operation::MoveTextPositionAndSetLeading(p) => {
                self.text.leading = -p.y;
                self.move_text_position(*p);
            }
            Operation::SetTextMatrix(m) => {
                self.text.matrix = *m;
                self.text.line_matrix = *m;
            }
            Operation::MoveToStartOfNextLine => self.move_to_next_line(),
            Operation::ShowText(s) => self.show_text(decode_text(s)),
            Operation::ShowTexts(arr) => self.show_text(Self::join_texts(arr)),
            Operation::MoveToNextLineAndShowText(s)
            | Operation::SetSpacingMoveToNextLineAndShowText(_, _, s) => {
                self.move_to_next_line();
                self.show_text(decode_text(s));
            }
            _ => {}
        }
    }

    pub fn finish(self) -> Vec<TextSpan> {
        self.spans
    }

    fn move_text_position(&mut self, p: Point) {
        let translate = AffineMatrix::translation(p.x, p.y);
        self.text.line_matrix = compose(&self.text.line_matrix, &translate);
        self.text.matrix = self.text.line_matrix;
    }

    fn move_to_next_line(&mut self) {
        self.move_text_position(Point::new(0.0, -self.text.leading));
    }

    fn join_texts(arr: &[TextStringOrNumber]) -> String {
        let mut r = String::new();
        for item in arr {
            match item {
                TextStringOrNumber::TextString(s) => r.push_str(&decode_text(s)),
                TextStringOrNumber::Number(n) if *n < WORD_GAP_ADJUSTMENT => r.push(' '),
                TextStringOrNumber::Number(_) => {}
            }
        }
        r
    }

    fn show_text(&mut self, text: String) {
        if text.trim().is_empty() {
            debug!("skip blank text");
            return;
        }

        let user_to_page = compose(&self.ctm, &self.text.matrix);
        let (x, y) = transform_point(&user_to_page, 0.0, 0.0);
        let (x_mm, y_mm) = transform_point(&self.page_to_output, x, y);
        let scale = user_to_page.transform_vector((0.0, 1.0).into()).length();
        self.spans.push(TextSpan {
            text,
            font: self.text.font.clone(),
            font_size_pt: self.text.font_size * scale,
            x_mm,
            y_mm,
        });
    }
}

/// Extract text spans of page operations, in showing order.
pub fn extract_text_spans<'a>(
    ops: impl IntoIterator<Item = &'a Operation>,
    page_height_mm: f64,
) -> Vec<TextSpan> {
    let mut extractor = TextExtractor::new(page_height_mm);
    ops.into_iter().for_each(|op| extractor.exec(op));
    extractor.finish()
}
