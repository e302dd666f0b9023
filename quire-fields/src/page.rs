//! Page geometry of the document being authored.
//!
//! Every coordinate conversion is anchored to a page's size in PDF points. The
//! sizes arrive with the document's metadata and stay fixed for the rest of the
//! editing session.

use crate::field::Field;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// The number of PDF points in one inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// A page's size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// The page width in points.
    pub width: f64,
    /// The page height in points.
    pub height: f64,
}

impl PageGeometry {
    /// US Letter, 8.5 by 11 inches. Used whenever real page geometry is missing.
    pub const US_LETTER: Self = Self {
        width: 612.0,
        height: 792.0,
    };

    /// Create a new page geometry.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Return `self` if it is usable for coordinate mapping, US Letter otherwise.
    pub fn sanitized(self) -> Self {
        if self.is_valid() {
            self
        } else {
            log::warn!(
                "unusable page geometry {}x{}, falling back to US Letter",
                self.width,
                self.height
            );
            Self::US_LETTER
        }
    }

    /// The page size as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The pixel size of a raster preview of this page rendered at `dpi`.
    pub fn raster_size(&self, dpi: f64) -> Size {
        let factor = dpi / POINTS_PER_INCH;
        Size::new(self.width * factor, self.height * factor)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::US_LETTER
    }
}

/// The page geometry of a whole document, indexed by 1-based page number.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometryTable {
    pages: Vec<PageGeometry>,
    dpi: f64,
}

impl PageGeometryTable {
    /// Build a table from a list of pages and the DPI the raster previews were
    /// produced at.
    ///
    /// An empty list is replaced by a single US Letter page and unusable entries
    /// are replaced individually, so that every page number in
    /// `1..=page_count()` maps to a valid geometry.
    pub fn new(pages: Vec<PageGeometry>, dpi: f64) -> Self {
        let pages = if pages.is_empty() {
            log::warn!("document has no page geometry, assuming a single US Letter page");
            vec![PageGeometry::US_LETTER]
        } else {
            pages.into_iter().map(PageGeometry::sanitized).collect()
        };

        let dpi = if dpi.is_finite() && dpi > 0.0 {
            dpi
        } else {
            log::warn!("invalid preview dpi {dpi}, assuming {POINTS_PER_INCH}");
            POINTS_PER_INCH
        };

        Self { pages, dpi }
    }

    /// A table holding a single US Letter page.
    pub fn single_letter_page(dpi: f64) -> Self {
        Self::new(vec![PageGeometry::US_LETTER], dpi)
    }

    /// The number of pages.
    pub fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    /// The DPI the raster previews were rendered at.
    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    /// The geometry of a page, if the page exists.
    pub fn get(&self, page_number: u32) -> Option<PageGeometry> {
        let index = usize::try_from(page_number.checked_sub(1)?).ok()?;
        self.pages.get(index).copied()
    }

    /// The geometry of a page, falling back to US Letter for unknown pages.
    pub fn page(&self, page_number: u32) -> PageGeometry {
        self.get(page_number).unwrap_or_else(|| {
            log::warn!("no geometry for page {page_number}, falling back to US Letter");
            PageGeometry::US_LETTER
        })
    }

    /// The geometry a field should be mapped with.
    ///
    /// This is the table's entry for the field's page, or the snapshot stored with
    /// the field when the table does not know the page.
    pub fn for_field(&self, field: &Field) -> PageGeometry {
        self.get(field.page_number)
            .unwrap_or_else(|| field.page_geometry().sanitized())
    }

    /// Whether `page_number` refers to a page of this document.
    pub fn contains(&self, page_number: u32) -> bool {
        page_number >= 1 && page_number <= self.page_count()
    }

    /// Pin a page number into `1..=page_count()`.
    pub fn clamp_page_number(&self, page_number: u32) -> u32 {
        page_number.clamp(1, self.page_count().max(1))
    }

    /// All pages in page order.
    pub fn pages(&self) -> &[PageGeometry] {
        &self.pages
    }
}

impl Default for PageGeometryTable {
    fn default() -> Self {
        Self::single_letter_page(POINTS_PER_INCH)
    }
}
