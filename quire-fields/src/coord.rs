//! Coordinate space mapping utilities.
//!
//! Fields are authored on raster previews of the document's pages. The preview is
//! displayed at whatever size the viewer chooses, so pointer positions arrive in
//! *viewport space*: pixels of the rendered image, origin at its top-left corner,
//! y-axis pointing down. Fields are stored in *document space*: PDF points
//! anchored to the page's stored size, also with the origin at the top-left and
//! the y-axis pointing down.
//!
//! The two spaces differ only by a per-axis scale, which depends on the page
//! geometry and the current rendered size of the page's image. PDF itself uses a
//! bottom-left origin; [`to_pdf_user_space`] converts for consumers that need it.

use crate::page::PageGeometry;
use kurbo::{Point, Rect, Size};

/// Return a viewport size that is safe to divide by.
///
/// A non-positive or non-finite viewport has no meaningful scale; it is replaced by
/// the page's own size, which maps points to pixels one to one.
fn usable_viewport(viewport: Size, page: PageGeometry) -> Size {
    if viewport.width.is_finite()
        && viewport.height.is_finite()
        && viewport.width > 0.0
        && viewport.height > 0.0
    {
        viewport
    } else {
        log::warn!(
            "unusable viewport {}x{}, mapping at identity scale",
            viewport.width,
            viewport.height
        );
        page.size()
    }
}

/// The `(scale_x, scale_y)` factors converting viewport pixels into points.
pub fn scale_factors(viewport: Size, page: PageGeometry) -> (f64, f64) {
    let page = page.sanitized();
    let viewport = usable_viewport(viewport, page);
    (page.width / viewport.width, page.height / viewport.height)
}

/// The `(scale_x, scale_y)` factors converting points into viewport pixels.
pub fn inverse_scale_factors(viewport: Size, page: PageGeometry) -> (f64, f64) {
    let page = page.sanitized();
    let viewport = usable_viewport(viewport, page);
    (viewport.width / page.width, viewport.height / page.height)
}

/// Convert a point in viewport space into document space.
pub fn point_to_document_space(point: Point, viewport: Size, page: PageGeometry) -> Point {
    let (sx, sy) = scale_factors(viewport, page);
    Point::new(point.x * sx, point.y * sy)
}

/// Convert a point in document space into viewport space.
pub fn point_to_viewport_space(point: Point, viewport: Size, page: PageGeometry) -> Point {
    let (sx, sy) = inverse_scale_factors(viewport, page);
    Point::new(point.x * sx, point.y * sy)
}

/// Convert a drop position in viewport space into a document-space rectangle.
///
/// The rectangle's origin is the converted position. Its size is `footprint` (in
/// viewport pixels) scaled by the same factors, so a new field always covers the
/// same area of the rendered image regardless of zoom.
pub fn to_document_space(
    point: Point,
    footprint: Size,
    viewport: Size,
    page: PageGeometry,
) -> Rect {
    let (sx, sy) = scale_factors(viewport, page);
    Rect::from_origin_size(
        Point::new(point.x * sx, point.y * sy),
        Size::new(footprint.width * sx, footprint.height * sy),
    )
}

/// Convert a document-space rectangle into viewport space.
///
/// This is the inverse of [`to_document_space`] for the same viewport and page.
pub fn to_viewport_space(rect: Rect, viewport: Size, page: PageGeometry) -> Rect {
    let (sx, sy) = inverse_scale_factors(viewport, page);
    Rect::from_origin_size(
        Point::new(rect.x0 * sx, rect.y0 * sy),
        Size::new(rect.width() * sx, rect.height() * sy),
    )
}

/// Convert a document-space rectangle into PDF user space.
///
/// PDF user space has its origin at the bottom-left of the page with the y-axis
/// pointing up. The result is `[x0, y0, x1, y1]` with `x0 < x1` and `y0 < y1`.
pub fn to_pdf_user_space(rect: Rect, page: PageGeometry) -> [f64; 4] {
    let rect = rect.abs();
    let page = page.sanitized();
    [rect.x0, page.height - rect.y1, rect.x1, page.height - rect.y0]
}

/// Convert a PDF user space rectangle `[x0, y0, x1, y1]` into document space.
pub fn from_pdf_user_space(rect: [f64; 4], page: PageGeometry) -> Rect {
    let page = page.sanitized();
    Rect::new(rect[0], page.height - rect[3], rect[2], page.height - rect[1]).abs()
}
