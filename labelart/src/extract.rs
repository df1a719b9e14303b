//! Interpret page operations into painted path objects.
//!
//! `Extractor` folds over the operations keeping a graphics state and a
//! save/restore stack. Path construction is accumulated in output space
//! (millimetres, origin at left-top), each painting operation freezes the
//! accumulated path together with current fill/stroke into a `PaintedObject`.

use crate::{
    graphics::{
        color_space::{cmyk_to_rgb, gray_to_rgb, normalize_rgb_triple, ColorSpace, Rgb},
        trans::{
            compose, page_to_output, pt_to_mm, transform_point, AffineMatrix, PageToOutputSpace,
            UserToPageSpace,
        },
        Operation, PathOp, Point,
    },
    object::Name,
    path::{bbox, BBox, PathBuilder, PathSegment},
};
use educe::Educe;
use log::{debug, info, warn};

/// Path painted by a fill and/or stroke operation, coordinates in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintedObject {
    pub segments: Vec<PathSegment>,
    pub fill: Option<Rgb>,
    pub stroke: Option<Rgb>,
    pub stroke_width_mm: f64,
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Educe)]
#[educe(Default)]
pub struct GraphicsState {
    pub ctm: UserToPageSpace,
    pub fill: Option<Rgb>,
    pub stroke: Option<Rgb>,
    /// In user space units, not scaled by `ctm`.
    #[educe(Default = 1.0)]
    pub line_width: f64,
    /// None if the color space is a page resource, such as ICCBased, the
    /// color space of `sc`/`SC` operands is then guessed by components count.
    #[educe(Default(expression = "Some(ColorSpace::DeviceGray)"))]
    pub fill_color_space: Option<ColorSpace>,
    #[educe(Default(expression = "Some(ColorSpace::DeviceGray)"))]
    pub stroke_color_space: Option<ColorSpace>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaintTarget {
    Fill,
    Stroke,
}

#[derive(Debug)]
pub struct Extractor {
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    path: PathBuilder,
    page_to_output: PageToOutputSpace,
    objects: Vec<PaintedObject>,
}

impl Extractor {
    pub fn new(page_height_mm: f64) -> Self {
        Self {
            state: GraphicsState::default(),
            stack: vec![],
            path: PathBuilder::new(),
            page_to_output: page_to_output(page_height_mm),
            objects: vec![],
        }
    }

    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    /// Objects emitted so far.
    pub fn objects(&self) -> &[PaintedObject] {
        &self.objects
    }

    pub fn finish(self) -> Vec<PaintedObject> {
        self.objects
    }

    fn push(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn pop(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            // some file contains unpaired q/Q operations
            None => info!("pop empty state stack"),
        }
    }

    pub fn exec(&mut self, op: Operation) {
        debug!("handle operation: {:?}", op);
        match op {
            Operation::SetLineWidth(width) => self.state.line_width = width,

            Operation::SaveGraphicsState => self.push(),
            Operation::RestoreGraphicsState => self.pop(),
            Operation::ModifyCTM(m) => self.concat_ctm(&m),

            Operation::MoveTo(p) => self.move_to(p),
            Operation::LineTo(p) => self.line_to(p),
            Operation::CurveTo(p1, p2, p3) => self.curve_to(p1, p2, p3),
            Operation::CurveToCurrentAsControl(p2, p3) => {
                self.curve_to_cur_point_as_control(p2, p3)
            }
            Operation::CurveToDestAsControl(p1, p3) => {
                self.curve_to_dest_point_as_control(p1, p3)
            }
            Operation::ClosePath => self.path.close(),
            Operation::Rectangle(p, w, h) => self.append_rect(p, w, h),
            Operation::ConstructPath(ops, args) => self.construct_path(&ops, &args),

            Operation::Stroke => self.paint(&[PaintTarget::Stroke]),
            Operation::CloseStroke => {
                self.path.close();
                self.paint(&[PaintTarget::Stroke]);
            }
            Operation::Fill | Operation::EoFill => self.paint(&[PaintTarget::Fill]),
            Operation::FillStroke | Operation::EoFillStroke => {
                self.paint(&[PaintTarget::Fill, PaintTarget::Stroke])
            }
            Operation::CloseFillStroke | Operation::CloseEoFillStroke => {
                self.path.close();
                self.paint(&[PaintTarget::Fill, PaintTarget::Stroke]);
            }
            Operation::EndPath => self.path.clear(),
            // clipping not supported, the path is discarded by following `n`
            Operation::ClipNonZero | Operation::ClipEvenOdd => {}

            Operation::SetFillRGB([r, g, b]) => {
                self.set_fill(ColorSpace::DeviceRGB, normalize_rgb_triple(r, g, b))
            }
            Operation::SetStrokeRGB([r, g, b]) => {
                self.set_stroke(ColorSpace::DeviceRGB, normalize_rgb_triple(r, g, b))
            }
            Operation::SetFillCMYK([c, m, y, k]) => {
                self.set_fill(ColorSpace::DeviceCMYK, cmyk_to_rgb(c, m, y, k))
            }
            Operation::SetStrokeCMYK([c, m, y, k]) => {
                self.set_stroke(ColorSpace::DeviceCMYK, cmyk_to_rgb(c, m, y, k))
            }
            Operation::SetFillGray(g) => self.set_fill(ColorSpace::DeviceGray, gray_to_rgb(g)),
            Operation::SetStrokeGray(g) => {
                self.set_stroke(ColorSpace::DeviceGray, gray_to_rgb(g))
            }
            Operation::SetFillColorSpace(name) => {
                let cs = Self::color_space_by_name(&name);
                self.state.fill_color_space = cs;
                self.state.fill = Some(Rgb::BLACK);
            }
            Operation::SetStrokeColorSpace(name) => {
                let cs = Self::color_space_by_name(&name);
                self.state.stroke_color_space = cs;
                self.state.stroke = Some(Rgb::BLACK);
            }
            Operation::SetFillColor(args) => {
                if let Some(c) = Self::color_args_to_rgb(self.state.fill_color_space, &args) {
                    self.state.fill = Some(c);
                }
            }
            Operation::SetStrokeColor(args) => {
                if let Some(c) = Self::color_args_to_rgb(self.state.stroke_color_space, &args) {
                    self.state.stroke = Some(c);
                }
            }

            // Text operations are handled by text extraction
            Operation::BeginText
            | Operation::EndText
            | Operation::SetLeading(_)
            | Operation::SetFont(..)
            | Operation::MoveTextPosition(_)
            | Operation::MoveTextPositionAndSetLeading(_)
            | Operation::SetTextMatrix(_)
            | Operation::MoveToStartOfNextLine
            | Operation::ShowText(_)
            | Operation::ShowTexts(_)
            | Operation::MoveToNextLineAndShowText(_)
            | Operation::SetSpacingMoveToNextLineAndShowText(..) => {}

            Operation::Unrecognized(op) => debug!("ignore operation: {}", op),
        }
    }

    fn concat_ctm(&mut self, m: &AffineMatrix) {
        self.state.ctm = compose(&self.state.ctm, m);
        debug!("ctm to {:?}", self.state.ctm);
    }

    /// Map a point of user space to output space.
    fn to_output(&self, p: Point) -> Point {
        let (x, y) = transform_point(&self.state.ctm, p.x, p.y);
        let (x, y) = transform_point(&self.page_to_output, x, y);
        Point::new(x, y)
    }

    fn move_to(&mut self, p: Point) {
        let p = self.to_output(p);
        self.path.move_to(p);
    }

    fn line_to(&mut self, p: Point) {
        let p = self.to_output(p);
        self.path.line_to(p);
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        let (p1, p2, p3) = (self.to_output(p1), self.to_output(p2), self.to_output(p3));
        self.path.curve_to(p1, p2, p3);
    }

    fn curve_to_cur_point_as_control(&mut self, p2: Point, p3: Point) {
        let (p2, p3) = (self.to_output(p2), self.to_output(p3));
        match self.path.current_point() {
            Some(p1) => self.path.curve_to(p1, p2, p3),
            None => {
                debug!("v without current point, degrade to line");
                self.path.line_to(p3);
            }
        }
    }

    fn curve_to_dest_point_as_control(&mut self, p1: Point, p3: Point) {
        let (p1, p3) = (self.to_output(p1), self.to_output(p3));
        self.path.curve_to(p1, p3, p3);
    }

    /// Corners transformed one by one, the rectangle may not be axis-aligned
    /// in output space.
    fn append_rect(&mut self, p: Point, w: f64, h: f64) {
        self.move_to(p);
        self.line_to(Point::new(p.x + w, p.y));
        self.line_to(Point::new(p.x + w, p.y + h));
        self.line_to(Point::new(p.x, p.y + h));
        self.path.close();
    }

    /// Replay batched path operations, each takes its operands from a shared cursor.
    fn construct_path(&mut self, ops: &[PathOp], args: &[f64]) {
        let mut pos = 0;
        for &op in ops {
            let n = op.operand_count();
            let Some(a) = args.get(pos..pos + n) else {
                warn!(
                    "construct path: {:?} needs {} operands, {} left",
                    op,
                    n,
                    args.len() - pos
                );
                break;
            };
            pos += n;
            match op {
                PathOp::MoveTo => self.move_to(Point::new(a[0], a[1])),
                PathOp::LineTo => self.line_to(Point::new(a[0], a[1])),
                PathOp::CurveTo => self.curve_to(
                    Point::new(a[0], a[1]),
                    Point::new(a[2], a[3]),
                    Point::new(a[4], a[5]),
                ),
                PathOp::CurveToCurrentAsControl => self
                    .curve_to_cur_point_as_control(Point::new(a[0], a[1]), Point::new(a[2], a[3])),
                PathOp::CurveToDestAsControl => self
                    .curve_to_dest_point_as_control(Point::new(a[0], a[1]), Point::new(a[2], a[3])),
                PathOp::Rectangle => self.append_rect(Point::new(a[0], a[1]), a[2], a[3]),
                PathOp::ClosePath => self.path.close(),
            }
        }
    }

    /// Emit accumulated path as a painted object and start a new path.
    /// Nothing emitted if the path has no point.
    fn paint(&mut self, targets: &[PaintTarget]) {
        let segments = self.path.take();
        let Some(bbox) = bbox(&segments) else {
            debug!("paint: empty path");
            return;
        };

        // pdf initial color is black
        let color_of = |target, color: Option<Rgb>| {
            targets
                .contains(&target)
                .then(|| color.unwrap_or(Rgb::BLACK))
        };
        let object = PaintedObject {
            segments,
            fill: color_of(PaintTarget::Fill, self.state.fill),
            stroke: color_of(PaintTarget::Stroke, self.state.stroke),
            stroke_width_mm: pt_to_mm(self.state.line_width),
            bbox,
        };
        self.objects.push(object);
    }

    fn set_fill(&mut self, cs: ColorSpace, color: Rgb) {
        self.state.fill_color_space = Some(cs);
        self.state.fill = Some(color);
    }

    fn set_stroke(&mut self, cs: ColorSpace, color: Rgb) {
        self.state.stroke_color_space = Some(cs);
        self.state.stroke = Some(color);
    }

    fn color_space_by_name(name: &Name) -> Option<ColorSpace> {
        let r = ColorSpace::from_name(name.as_str());
        if r.is_none() {
            debug!("color space {} not resolvable, guess by components", name.as_str());
        }
        r
    }

    fn color_args_to_rgb(cs: Option<ColorSpace>, args: &[f64]) -> Option<Rgb> {
        let r = cs
            .or_else(|| ColorSpace::from_components(args.len()))
            .and_then(|cs| cs.to_rgb(args));
        if r.is_none() {
            debug!("unsupported color args: {:?}", args);
        }
        r
    }
}

/// Interpret all operations of a page, return painted objects in paint order.
pub fn extract_painted_objects(
    ops: impl IntoIterator<Item = Operation>,
    page_height_mm: f64,
) -> Vec<PaintedObject> {
    let mut extractor = Extractor::new(page_height_mm);
    ops.into_iter().for_each(|op| extractor.exec(op));
    extractor.finish()
}
