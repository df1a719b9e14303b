//! Lib to translate coordinates. Operands of drawing operations live in `UserSpace`,
//! the CTM maps them to `PageSpace` (pdf points, origin at left-bottom), and the
//! output transform maps page space to `OutputSpace` (millimetres, origin at left-top).

use euclid::Transform2D;

pub enum UserSpace {}
/// Coordinate space after `ctm`, in pdf points, y-axis goes up.
pub enum PageSpace {}
/// Millimetres, y-axis goes down.
pub enum OutputSpace {}

/// Matrix `(a, b, c, d, e, f)` maps to `(m11, m12, m21, m22, m31, m32)`,
/// `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
pub type AffineMatrix = Transform2D<f64, UserSpace, UserSpace>;
pub type UserToPageSpace = Transform2D<f64, UserSpace, PageSpace>;
pub type PageToOutputSpace = Transform2D<f64, PageSpace, OutputSpace>;

/// Document points to millimetres.
pub const PT_TO_MM: f64 = 25.4 / 72.0;

pub fn pt_to_mm(v: f64) -> f64 {
    v * PT_TO_MM
}

/// Return the matrix that applies `inner` first, then `outer`.
pub fn compose<S, M, D>(
    outer: &Transform2D<f64, M, D>,
    inner: &Transform2D<f64, S, M>,
) -> Transform2D<f64, S, D> {
    inner.then(outer)
}

pub fn transform_point<S, D>(m: &Transform2D<f64, S, D>, x: f64, y: f64) -> (f64, f64) {
    let p = m.transform_point((x, y).into());
    (p.x, p.y)
}

/// Convert pdf points to millimetres and flip y-axis, because pdf use left-bottom as origin.
pub fn page_to_output(page_height_mm: f64) -> PageToOutputSpace {
    Transform2D::scale(PT_TO_MM, -PT_TO_MM).then_translate((0.0, page_height_mm).into())
}
