//! Keeping field overlays aligned with the page previews they are drawn on.
//!
//! An overlay's pixel rectangle depends on the rendered size of its page's
//! preview image. Until that image has loaded its size is meaningless, so fields
//! on such pages get no overlay at all rather than a misplaced one.

use crate::coord::to_viewport_space;
use crate::field::FieldId;
use crate::page::PageGeometryTable;
use crate::placement::PlacementSession;
use kurbo::{Point, Rect, Size};
use rustc_hash::FxHashMap;

/// The state of one page's preview image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageImage {
    /// Whether the image has finished loading.
    pub loaded: bool,
    /// The size the image is currently displayed at, in pixels.
    pub rendered: Size,
}

/// The on-screen rectangle of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// The field the overlay belongs to.
    pub field_id: FieldId,
    /// The page the field is on.
    pub page_number: u32,
    /// The rectangle in viewport space of the page's image.
    pub rect: Rect,
    /// Whether the field is selected.
    pub selected: bool,
}

/// Per-page image bookkeeping and the overlays derived from it.
#[derive(Debug, Default)]
pub struct PageRenderSession {
    images: FxHashMap<u32, PageImage>,
    overlays: Vec<Overlay>,
    seen_revision: Option<u64>,
    stale: bool,
}

impl PageRenderSession {
    /// Create a session with no loaded images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a page's image has loaded, or has been resized, and is now
    /// displayed at `rendered`.
    ///
    /// Returns `true` if this changed anything, in which case the overlays need to
    /// be recomputed.
    pub fn image_loaded(&mut self, page_number: u32, rendered: Size) -> bool {
        let image = PageImage {
            loaded: true,
            rendered,
        };
        let previous = self.images.insert(page_number, image);
        let changed = previous != Some(image);
        if changed {
            log::debug!(
                "page {page_number} image displayed at {}x{}",
                rendered.width,
                rendered.height
            );
            self.stale = true;
        }
        changed
    }

    /// Record that a page's image is no longer usable, e.g. because its source is
    /// being replaced.
    pub fn image_unloaded(&mut self, page_number: u32) {
        if self.images.remove(&page_number).is_some() {
            self.stale = true;
        }
    }

    /// Whether a page's image has finished loading.
    pub fn is_loaded(&self, page_number: u32) -> bool {
        self.images.get(&page_number).is_some_and(|image| image.loaded)
    }

    /// The size a page's image is displayed at, if it has loaded with a usable
    /// size.
    pub fn rendered_size(&self, page_number: u32) -> Option<Size> {
        self.images
            .get(&page_number)
            .filter(|image| {
                image.loaded
                    && image.rendered.width.is_finite()
                    && image.rendered.height.is_finite()
                    && image.rendered.width > 0.0
                    && image.rendered.height > 0.0
            })
            .map(|image| image.rendered)
    }

    /// Whether the overlays are out of date with respect to the images or the
    /// given placement session.
    pub fn needs_recompute(&self, placement: &PlacementSession) -> bool {
        self.stale || self.seen_revision != Some(placement.revision())
    }

    /// Re-derive the overlay of every field whose page image has loaded.
    pub fn recompute(&mut self, placement: &PlacementSession, pages: &PageGeometryTable) -> &[Overlay] {
        let selected = placement.selected();
        self.overlays.clear();

        for field in placement.fields() {
            let Some(rendered) = self.rendered_size(field.page_number) else {
                continue;
            };
            let page = pages.for_field(field);
            self.overlays.push(Overlay {
                field_id: field.id.clone(),
                page_number: field.page_number,
                rect: to_viewport_space(field.rect(), rendered, page),
                selected: selected == Some(&field.id),
            });
        }

        self.seen_revision = Some(placement.revision());
        self.stale = false;
        &self.overlays
    }

    /// Recompute the overlays if anything they depend on changed.
    pub fn refresh(&mut self, placement: &PlacementSession, pages: &PageGeometryTable) -> &[Overlay] {
        if self.needs_recompute(placement) {
            self.recompute(placement, pages)
        } else {
            &self.overlays
        }
    }

    /// The overlays as of the last recomputation.
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// The overlay of a field, as of the last recomputation.
    pub fn overlay(&self, id: &FieldId) -> Option<&Overlay> {
        self.overlays.iter().find(|overlay| &overlay.field_id == id)
    }

    /// The overlays on one page, in drawing order.
    pub fn overlays_on_page(&self, page_number: u32) -> impl Iterator<Item = &Overlay> + '_ {
        self.overlays
            .iter()
            .filter(move |overlay| overlay.page_number == page_number)
    }

    /// The topmost overlay on a page containing `point`.
    pub fn overlay_at(&self, page_number: u32, point: Point) -> Option<&Overlay> {
        self.overlays
            .iter()
            .rev()
            .find(|overlay| overlay.page_number == page_number && overlay.rect.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Assignee, FieldType};
    use crate::page::PageGeometry;
    use crate::palette::PaletteEntry;
    use crate::settings::PlacementSettings;

    fn session_with_fields(pages: &PageGeometryTable) -> (PlacementSession, FieldId, FieldId) {
        let mut placement = PlacementSession::new(PlacementSettings::default());
        let entry = PaletteEntry::new(FieldType::Signature, Assignee::External);
        let rendered = Size::new(612.0, 792.0);
        let a = placement
            .create_on_drop(&entry, 1, Point::new(306.0, 396.0), rendered, pages)
            .unwrap();
        let b = placement
            .create_on_drop(&entry, 2, Point::new(306.0, 396.0), rendered, pages)
            .unwrap();
        (placement, a, b)
    }

    #[test]
    fn unloaded_pages_get_no_overlays() {
        let pages = PageGeometryTable::new(vec![PageGeometry::US_LETTER; 2], 72.0);
        let (placement, a, b) = session_with_fields(&pages);
        let mut render = PageRenderSession::new();

        assert!(render.recompute(&placement, &pages).is_empty());

        assert!(render.image_loaded(1, Size::new(1224.0, 1584.0)));
        let overlays = render.refresh(&placement, &pages).to_vec();
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].field_id, a);
        assert_eq!(overlays[0].rect, Rect::new(412.0, 762.0, 812.0, 822.0));
        assert!(render.overlay(&b).is_none());
    }

    #[test]
    fn resize_triggers_recompute() {
        let pages = PageGeometryTable::new(vec![PageGeometry::US_LETTER; 2], 72.0);
        let (placement, a, _) = session_with_fields(&pages);
        let mut render = PageRenderSession::new();

        render.image_loaded(1, Size::new(612.0, 792.0));
        render.refresh(&placement, &pages);
        assert!(!render.needs_recompute(&placement));
        assert!(!render.image_loaded(1, Size::new(612.0, 792.0)));
        assert!(!render.needs_recompute(&placement));

        assert!(render.image_loaded(1, Size::new(306.0, 396.0)));
        assert!(render.needs_recompute(&placement));
        render.refresh(&placement, &pages);
        assert_eq!(render.overlay(&a).unwrap().rect, Rect::new(103.0, 190.5, 203.0, 205.5));
    }

    #[test]
    fn field_changes_trigger_recompute() {
        let pages = PageGeometryTable::new(vec![PageGeometry::US_LETTER; 2], 72.0);
        let (mut placement, a, _) = session_with_fields(&pages);
        let mut render = PageRenderSession::new();
        render.image_loaded(1, Size::new(612.0, 792.0));
        render.refresh(&placement, &pages);

        placement.delete(&a);
        assert!(render.needs_recompute(&placement));
        assert!(render.refresh(&placement, &pages).is_empty());
    }

    #[test]
    fn recompute_is_idempotent() {
        let pages = PageGeometryTable::new(vec![PageGeometry::US_LETTER; 2], 72.0);
        let (placement, _, _) = session_with_fields(&pages);
        let mut render = PageRenderSession::new();
        render.image_loaded(1, Size::new(800.0, 1000.0));
        render.image_loaded(2, Size::new(400.0, 500.0));

        let first = render.recompute(&placement, &pages).to_vec();
        let second = render.recompute(&placement, &pages).to_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(first[1].selected);
        assert!(!first[0].selected);
    }

    #[test]
    fn hit_testing_prefers_topmost() {
        let pages = PageGeometryTable::new(vec![PageGeometry::US_LETTER; 2], 72.0);
        let mut placement = PlacementSession::new(PlacementSettings::default());
        let entry = PaletteEntry::new(FieldType::Date, Assignee::Internal);
        let rendered = Size::new(612.0, 792.0);
        placement.create_on_drop(&entry, 1, Point::new(300.0, 300.0), rendered, &pages);
        let top = placement
            .create_on_drop(&entry, 1, Point::new(310.0, 305.0), rendered, &pages)
            .unwrap();

        let mut render = PageRenderSession::new();
        render.image_loaded(1, rendered);
        render.refresh(&placement, &pages);

        assert_eq!(render.overlay_at(1, Point::new(300.0, 300.0)).map(|o| &o.field_id), Some(&top));
        assert!(render.overlay_at(1, Point::new(5.0, 5.0)).is_none());
        assert!(render.overlay_at(2, Point::new(300.0, 300.0)).is_none());
        assert_eq!(render.overlays_on_page(1).count(), 2);
    }

    #[test]
    fn unloading_hides_overlays() {
        let pages = PageGeometryTable::new(vec![PageGeometry::US_LETTER; 2], 72.0);
        let (placement, _, _) = session_with_fields(&pages);
        let mut render = PageRenderSession::new();
        render.image_loaded(1, Size::new(612.0, 792.0));
        render.refresh(&placement, &pages);
        assert_eq!(render.overlays().len(), 1);

        render.image_unloaded(1);
        assert!(!render.is_loaded(1));
        assert!(render.refresh(&placement, &pages).is_empty());
    }
}
