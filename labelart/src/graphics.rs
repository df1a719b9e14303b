use crate::{
    object::{Name, Object, ObjectValueError},
    parser::{
        is_delimiter, parse_object, whitespace_or_comment, ws_prefixed, ParseError, ParseResult,
    },
};
use log::{debug, warn};
use memchr::memmem;
use nom::{
    branch::alt,
    bytes::complete::{is_not, take},
    combinator::{map, verify},
    Parser,
};

pub mod color_space;
pub mod trans;

use self::trans::AffineMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, b: Self) -> f64 {
        (self.x - b.x).hypot(self.y - b.y)
    }
}

/// Sub operation of `Operation::ConstructPath`, consumes `operand_count()`
/// numbers from the shared operand list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOp {
    MoveTo,
    LineTo,
    CurveTo,
    /// `v`, current point is the first control point.
    CurveToCurrentAsControl,
    /// `y`, destination point is the second control point.
    CurveToDestAsControl,
    Rectangle,
    ClosePath,
}

impl PathOp {
    pub fn operand_count(self) -> usize {
        match self {
            Self::MoveTo | Self::LineTo => 2,
            Self::CurveTo => 6,
            Self::CurveToCurrentAsControl | Self::CurveToDestAsControl | Self::Rectangle => 4,
            Self::ClosePath => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextStringOrNumber {
    TextString(Vec<u8>),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
#[rustfmt::skip]
pub enum Operation {
    // General Graphics State Operations
    SetLineWidth(f64),                          // w

    // Special Graphics State Operations
    SaveGraphicsState,                          // q
    RestoreGraphicsState,                       // Q
    ModifyCTM(AffineMatrix),                    // cm

    // Path Construction Operations
    MoveTo(Point),                              // m
    LineTo(Point),                              // l
    CurveTo(Point, Point, Point),               // c
    CurveToCurrentAsControl(Point, Point),      // v
    CurveToDestAsControl(Point, Point),         // y
    ClosePath,                                  // h
    Rectangle(Point, f64, f64),                 // re
    /// Batch of path construction operations sharing one operand list.
    ConstructPath(Vec<PathOp>, Vec<f64>),

    // Path Painting Operations
    Stroke,                                     // S
    CloseStroke,                                // s
    Fill,                                       // f, F
    EoFill,                                     // f*
    FillStroke,                                 // B
    EoFillStroke,                               // B*
    CloseFillStroke,                            // b
    CloseEoFillStroke,                          // b*
    EndPath,                                    // n

    // Clipping Path Operations
    ClipNonZero,                                // W
    ClipEvenOdd,                                // W*

    // Text Object Operations
    BeginText,                                  // BT
    EndText,                                    // ET

    // Text State Operations
    SetLeading(f64),                            // TL
    SetFont(Name, f64),                         // Tf

    // Text Positioning Operations
    MoveTextPosition(Point),                    // Td
    MoveTextPositionAndSetLeading(Point),       // TD
    SetTextMatrix(AffineMatrix),                // Tm
    MoveToStartOfNextLine,                      // T*

    // Text Showing Operations
    ShowText(Vec<u8>),                          // Tj
    ShowTexts(Vec<TextStringOrNumber>),         // TJ
    MoveToNextLineAndShowText(Vec<u8>),         // '
    SetSpacingMoveToNextLineAndShowText(f64, f64, Vec<u8>), // "

    // Color Operations
    SetStrokeColorSpace(Name),                  // CS
    SetFillColorSpace(Name),                    // cs
    SetStrokeColor(Vec<f64>),                   // SC, SCN
    SetFillColor(Vec<f64>),                     // sc, scn
    SetStrokeGray(f64),                         // G
    SetFillGray(f64),                           // g
    SetStrokeRGB([f64; 3]),                     // RG
    SetFillRGB([f64; 3]),                       // rg
    SetStrokeCMYK([f64; 4]),                    // K
    SetFillCMYK([f64; 4]),                      // k

    /// Operators not interpreted, such as line dash, marked content, XObject.
    Unrecognized(String),
}

pub(crate) trait ConvertFromObject
where
    Self: Sized,
{
    /// Pop operand(s) from the end of `objects`.
    fn convert_from_object(objects: &mut Vec<Object>) -> Result<Self, ObjectValueError>;
}

fn pop(objects: &mut Vec<Object>) -> Result<Object, ObjectValueError> {
    objects.pop().ok_or(ObjectValueError::OperandMissing)
}

impl ConvertFromObject for f64 {
    fn convert_from_object(objects: &mut Vec<Object>) -> Result<Self, ObjectValueError> {
        pop(objects)?.as_number()
    }
}

impl<const N: usize> ConvertFromObject for [f64; N] {
    fn convert_from_object(objects: &mut Vec<Object>) -> Result<Self, ObjectValueError> {
        let mut result = [0.0; N];
        for i in 0..N {
            result[N - 1 - i] = pop(objects)?.as_number()?;
        }
        Ok(result)
    }
}

impl ConvertFromObject for Point {
    fn convert_from_object(objects: &mut Vec<Object>) -> Result<Self, ObjectValueError> {
        let [x, y] = <[f64; 2]>::convert_from_object(objects)?;
        Ok(Self { x, y })
    }
}

impl ConvertFromObject for AffineMatrix {
    fn convert_from_object(objects: &mut Vec<Object>) -> Result<Self, ObjectValueError> {
        let [a, b, c, d, e, f] = <[f64; 6]>::convert_from_object(objects)?;
        Ok(Self::new(a, b, c, d, e, f))
    }
}

impl ConvertFromObject for Name {
    fn convert_from_object(objects: &mut Vec<Object>) -> Result<Self, ObjectValueError> {
        pop(objects)?.name()
    }
}

impl ConvertFromObject for Vec<u8> {
    fn convert_from_object(objects: &mut Vec<Object>) -> Result<Self, ObjectValueError> {
        pop(objects)?.into_string()
    }
}

impl ConvertFromObject for Vec<TextStringOrNumber> {
    fn convert_from_object(objects: &mut Vec<Object>) -> Result<Self, ObjectValueError> {
        pop(objects)?
            .into_arr()?
            .into_iter()
            .map(|o| match o {
                Object::String(s) => Ok(TextStringOrNumber::TextString(s)),
                Object::Number(n) => Ok(TextStringOrNumber::Number(n)),
                _ => Err(ObjectValueError::UnexpectedType),
            })
            .collect()
    }
}

/// Color components of `sc`/`scn`, takes all operands.
/// Pattern name of `scn` is not supported.
impl ConvertFromObject for Vec<f64> {
    fn convert_from_object(objects: &mut Vec<Object>) -> Result<Self, ObjectValueError> {
        let r = objects
            .iter()
            .map(Object::as_number)
            .collect::<Result<Self, _>>()?;
        objects.clear();
        Ok(r)
    }
}

fn arg<T: ConvertFromObject>(operands: &mut Vec<Object>) -> Result<T, ObjectValueError> {
    T::convert_from_object(operands)
}

/// Create operation from operator and its operands, operands are popped from the end.
fn create_operation(op: &str, operands: &mut Vec<Object>) -> Result<Operation, ObjectValueError> {
    Ok(match op {
        "w" => Operation::SetLineWidth(arg(operands)?),
        "q" => Operation::SaveGraphicsState,
        "Q" => Operation::RestoreGraphicsState,
        "cm" => Operation::ModifyCTM(arg(operands)?),

        "m" => Operation::MoveTo(arg(operands)?),
        "l" => Operation::LineTo(arg(operands)?),
        "c" => {
            let p3 = arg(operands)?;
            let p2 = arg(operands)?;
            Operation::CurveTo(arg(operands)?, p2, p3)
        }
        "v" => {
            let p3 = arg(operands)?;
            Operation::CurveToCurrentAsControl(arg(operands)?, p3)
        }
        "y" => {
            let p3 = arg(operands)?;
            Operation::CurveToDestAsControl(arg(operands)?, p3)
        }
        "h" => Operation::ClosePath,
        "re" => {
            let h = arg(operands)?;
            let w = arg(operands)?;
            Operation::Rectangle(arg(operands)?, w, h)
        }

        "S" => Operation::Stroke,
        "s" => Operation::CloseStroke,
        "f" | "F" => Operation::Fill,
        "f*" => Operation::EoFill,
        "B" => Operation::FillStroke,
        "B*" => Operation::EoFillStroke,
        "b" => Operation::CloseFillStroke,
        "b*" => Operation::CloseEoFillStroke,
        "n" => Operation::EndPath,
        "W" => Operation::ClipNonZero,
        "W*" => Operation::ClipEvenOdd,

        "BT" => Operation::BeginText,
        "ET" => Operation::EndText,
        "TL" => Operation::SetLeading(arg(operands)?),
        "Tf" => {
            let size = arg(operands)?;
            Operation::SetFont(arg(operands)?, size)
        }
        "Td" => Operation::MoveTextPosition(arg(operands)?),
        "TD" => Operation::MoveTextPositionAndSetLeading(arg(operands)?),
        "Tm" => Operation::SetTextMatrix(arg(operands)?),
        "T*" => Operation::MoveToStartOfNextLine,
        "Tj" => Operation::ShowText(arg(operands)?),
        "TJ" => Operation::ShowTexts(arg(operands)?),
        "'" => Operation::MoveToNextLineAndShowText(arg(operands)?),
        "\"" => {
            let text = arg(operands)?;
            let char_spacing = arg(operands)?;
            Operation::SetSpacingMoveToNextLineAndShowText(arg(operands)?, char_spacing, text)
        }

        "CS" => Operation::SetStrokeColorSpace(arg(operands)?),
        "cs" => Operation::SetFillColorSpace(arg(operands)?),
        "SC" | "SCN" => Operation::SetStrokeColor(arg(operands)?),
        "sc" | "scn" => Operation::SetFillColor(arg(operands)?),
        "G" => Operation::SetStrokeGray(arg(operands)?),
        "g" => Operation::SetFillGray(arg(operands)?),
        "RG" => Operation::SetStrokeRGB(arg(operands)?),
        "rg" => Operation::SetFillRGB(arg(operands)?),
        "K" => Operation::SetStrokeCMYK(arg(operands)?),
        "k" => Operation::SetFillCMYK(arg(operands)?),

        _ => {
            operands.clear();
            Operation::Unrecognized(op.to_owned())
        }
    })
}

#[derive(Debug, PartialEq)]
enum ObjectOrOperator<'a> {
    Object(Object),
    Operator(&'a str),
}

fn parse_operator(input: &[u8]) -> ParseResult<'_, ObjectOrOperator<'_>> {
    let p = verify(is_not(b" \t\n\r\x0c\0%[]<>(){}/".as_slice()), |op: &[u8]| {
        std::str::from_utf8(op).is_ok()
    });
    map(p, |op| {
        // verified above
        ObjectOrOperator::Operator(std::str::from_utf8(op).unwrap_or_default())
    })(input)
}

fn parse_object_or_operator(input: &[u8]) -> ParseResult<'_, ObjectOrOperator<'_>> {
    alt((parse_object.map(ObjectOrOperator::Object), parse_operator))(input)
}

/// Skip inline image dictionary and data, `input` starts after `BI` operator.
/// Image data ends at the first `EI` surrounded by whitespace.
fn skip_inline_image(input: &[u8]) -> ParseResult<'_, ()> {
    let mut input = input;
    loop {
        let (remains, vr) = ws_prefixed(parse_object_or_operator)(input)?;
        input = remains;
        if vr == ObjectOrOperator::Operator("ID") {
            break;
        }
    }
    // single whitespace after `ID`
    let (input, _) = take::<_, _, ParseError>(1usize)(input)?;
    let mut pos = 0;
    while let Some(i) = memmem::find(&input[pos..], b"EI") {
        let at = pos + i;
        let before_ok = at == 0 || input[at - 1].is_ascii_whitespace();
        let after_ok = input.get(at + 2).map_or(true, |c| is_delimiter(*c));
        if before_ok && after_ok {
            return Ok((&input[at + 2..], ()));
        }
        pos = at + 2;
    }
    // no `EI`, image data runs to the end
    Ok((&input[input.len()..], ()))
}

/// Parse content stream into operations.
///
/// Operators with missing or wrong typed operands are dropped, unknown operators
/// returned as `Operation::Unrecognized`. Parse stops at the first byte that is neither
/// an object nor an operator, check the returned remains to detect broken content.
pub fn parse_operations(mut input: &[u8]) -> ParseResult<'_, Vec<Operation>> {
    let mut operands = Vec::with_capacity(8);
    let mut r = vec![];
    loop {
        let vr = ws_prefixed(parse_object_or_operator)(input);
        match vr {
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
            Ok((remains, vr)) => {
                input = remains;
                match vr {
                    ObjectOrOperator::Object(o) => operands.push(o),
                    ObjectOrOperator::Operator("BI") => {
                        operands.clear();
                        (input, _) = skip_inline_image(input)?;
                        r.push(Operation::Unrecognized("BI".to_owned()));
                    }
                    ObjectOrOperator::Operator(op) => {
                        match create_operation(op, &mut operands) {
                            Ok(op) => r.push(op),
                            Err(e) => warn!("drop operation {}: {}", op, e),
                        }
                        if !operands.is_empty() {
                            debug!("extra operands of {}: {:?}", op, operands);
                            operands.clear();
                        }
                    }
                }
            }
        }
        (input, _) = whitespace_or_comment(input)?;
    }

    Ok((input, r))
}

/// Merge adjacent path construction operations into `Operation::ConstructPath`,
/// the batched form the extractor replays through a shared operand cursor.
pub fn batch_path_construction(ops: impl IntoIterator<Item = Operation>) -> Vec<Operation> {
    fn flush(r: &mut Vec<Operation>, path_ops: &mut Vec<PathOp>, args: &mut Vec<f64>) {
        if !path_ops.is_empty() {
            r.push(Operation::ConstructPath(
                std::mem::take(path_ops),
                std::mem::take(args),
            ));
        }
    }

    let mut r = vec![];
    let mut path_ops = vec![];
    let mut args = vec![];
    for op in ops {
        match op {
            Operation::MoveTo(p) => {
                path_ops.push(PathOp::MoveTo);
                args.extend([p.x, p.y]);
            }
            Operation::LineTo(p) => {
                path_ops.push(PathOp::LineTo);
                args.extend([p.x, p.y]);
            }
            Operation::CurveTo(p1, p2, p3) => {
                path_ops.push(PathOp::CurveTo);
                args.extend([p1.x, p1.y, p2.x, p2.y, p3.x, p3.y]);
            }
            Operation::CurveToCurrentAsControl(p2, p3) => {
                path_ops.push(PathOp::CurveToCurrentAsControl);
                args.extend([p2.x, p2.y, p3.x, p3.y]);
            }
            Operation::CurveToDestAsControl(p1, p3) => {
                path_ops.push(PathOp::CurveToDestAsControl);
                args.extend([p1.x, p1.y, p3.x, p3.y]);
            }
            Operation::Rectangle(p, w, h) => {
                path_ops.push(PathOp::Rectangle);
                args.extend([p.x, p.y, w, h]);
            }
            Operation::ClosePath => path_ops.push(PathOp::ClosePath),
            Operation::ConstructPath(ops, points) => {
                path_ops.extend(ops);
                args.extend(points);
            }
            op => {
                flush(&mut r, &mut path_ops, &mut args);
                r.push(op);
            }
        }
    }
    flush(&mut r, &mut path_ops, &mut args);
    r
}
