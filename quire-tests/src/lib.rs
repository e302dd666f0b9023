//! Shared fixtures for the quire behavioral tests.

use quire_fields::kurbo::Size;
use quire_fields::{AuthoringSession, PageGeometry, PageGeometryTable, PlacementSettings};

/// The pixel size of a US Letter page rendered at 72 DPI.
pub fn letter_image() -> Size {
    PageGeometry::US_LETTER.raster_size(72.0)
}

/// A single US Letter page at 72 DPI.
pub fn letter_table() -> PageGeometryTable {
    PageGeometryTable::single_letter_page(72.0)
}

/// A blank session whose only page image is displayed at `rendered`.
pub fn session_with_image(rendered: Size) -> AuthoringSession {
    let mut session = AuthoringSession::new(PlacementSettings::default());
    session.image_loaded(1, rendered);
    session
}
