//! An editing session over one document.
//!
//! [`AuthoringSession`] ties the document's page geometry, its fields and the
//! state of its page previews together. Hosts forward raw pointer events with
//! positions relative to a page's preview image; the session looks up how large
//! that image currently is and routes the event to the placement logic.

use crate::field::{Field, FieldId};
use crate::page::PageGeometryTable;
use crate::palette::PaletteEntry;
use crate::placement::{DragOutcome, ListenerId, PlacementSession, SessionEvent};
use crate::render::{Overlay, PageRenderSession};
use crate::settings::PlacementSettings;
use crate::wire::{
    DocumentDpi, PageDimensions, SavePayload, TemplateData, ValidationError, WireError,
    validate_for_save,
};
use kurbo::{Point, Size};

/// The editing state of one document.
pub struct AuthoringSession {
    pages: PageGeometryTable,
    placement: PlacementSession,
    render: PageRenderSession,
    pdf_dpi: DocumentDpi,
    page_dimensions: PageDimensions,
    drag_page: Option<u32>,
}

impl AuthoringSession {
    /// Start a session on a blank single-page US Letter document.
    pub fn new(settings: PlacementSettings) -> Self {
        Self::from_template(
            TemplateData {
                field_mappings: Vec::new(),
                pdf_dpi: DocumentDpi::default(),
                pdf_page_dimensions: PageDimensions::from_value(None),
            },
            settings,
        )
    }

    /// Start a session on a document read from the document service.
    ///
    /// Fields whose snapshot lacks a DPI get the one the previews use.
    pub fn from_template(mut template: TemplateData, settings: PlacementSettings) -> Self {
        let pages = template.page_table(settings.default_dpi);
        for field in &mut template.field_mappings {
            let page = pages.for_field(field);
            field.fill_missing_snapshot(page, Some(pages.dpi()));
        }
        log::debug!(
            "opened document with {} pages and {} fields",
            pages.page_count(),
            template.field_mappings.len()
        );

        Self {
            pages,
            placement: PlacementSession::with_fields(template.field_mappings, settings),
            render: PageRenderSession::new(),
            pdf_dpi: template.pdf_dpi,
            page_dimensions: template.pdf_page_dimensions,
            drag_page: None,
        }
    }

    /// Start a session on a document given as JSON text.
    pub fn from_json(json: &str, settings: PlacementSettings) -> Result<Self, WireError> {
        Ok(Self::from_template(TemplateData::from_json(json)?, settings))
    }

    /// The page geometry of the document.
    pub fn pages(&self) -> &PageGeometryTable {
        &self.pages
    }

    /// The fields and editor state.
    pub fn placement(&self) -> &PlacementSession {
        &self.placement
    }

    /// The state of the page previews.
    pub fn render(&self) -> &PageRenderSession {
        &self.render
    }

    /// The settings the session was created with.
    pub fn settings(&self) -> &PlacementSettings {
        self.placement.settings()
    }

    /// Register a listener that is called after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionEvent) + 'static) -> ListenerId {
        self.placement.subscribe(listener)
    }

    /// Remove a listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.placement.unsubscribe(id)
    }

    /// Record that a page's preview image has loaded, or has been resized.
    pub fn image_loaded(&mut self, page_number: u32, rendered: Size) -> bool {
        if !self.pages.contains(page_number) {
            log::debug!("ignoring image for unknown page {page_number}");
            return false;
        }
        let changed = self.render.image_loaded(page_number, rendered);
        if changed {
            self.placement.emit(SessionEvent::PageImageLoaded(page_number));
        }
        changed
    }

    /// Record that a page's preview image is no longer usable.
    ///
    /// A drag on that page is cancelled.
    pub fn image_unloaded(&mut self, page_number: u32) {
        if self.drag_page == Some(page_number) {
            self.pointer_leave();
        }
        self.render.image_unloaded(page_number);
    }

    fn rendered_size(&self, page_number: u32) -> Option<Size> {
        let size = self.render.rendered_size(page_number);
        if size.is_none() {
            log::debug!("page {page_number} has no loaded image, ignoring gesture");
        }
        size
    }

    /// Create a field from a palette entry dropped at `point` on a page's image.
    pub fn drop_field(
        &mut self,
        entry: &PaletteEntry,
        page_number: u32,
        point: Point,
    ) -> Option<FieldId> {
        let rendered = self.rendered_size(page_number)?;
        self.placement
            .create_on_drop(entry, page_number, point, rendered, &self.pages)
    }

    /// Handle a pointer press at `point` on a page's image.
    ///
    /// A press on a field starts tracking a drag of the topmost field under the
    /// pointer and returns its identifier. A press on empty space clears the
    /// selection.
    pub fn pointer_down(&mut self, page_number: u32, point: Point) -> Option<FieldId> {
        let rendered = self.rendered_size(page_number)?;
        self.render.refresh(&self.placement, &self.pages);

        let Some(id) = self
            .render
            .overlay_at(page_number, point)
            .map(|overlay| overlay.field_id.clone())
        else {
            self.placement.clear_selection();
            self.placement.set_active_page(page_number);
            return None;
        };

        if !self.placement.begin_drag(&id, point, rendered, &self.pages) {
            return None;
        }
        self.drag_page = Some(page_number);
        self.placement.set_active_page(page_number);
        Some(id)
    }

    /// Handle pointer movement while a press is tracked.
    ///
    /// `point` is relative to the image of the page the press started on.
    /// Returns `true` if a field was moved.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        let Some(page_number) = self.drag_page else {
            return false;
        };
        let Some(rendered) = self.rendered_size(page_number) else {
            return false;
        };
        self.placement.drag_to(point, rendered, &self.pages)
    }

    /// Handle the release of a tracked press.
    pub fn pointer_up(&mut self) -> Option<DragOutcome> {
        self.drag_page = None;
        self.placement.end_drag()
    }

    /// Handle the pointer leaving the tracked area. The dragged field stays
    /// where it was last moved to.
    pub fn pointer_leave(&mut self) -> Option<FieldId> {
        self.drag_page = None;
        self.placement.cancel_drag()
    }

    /// Delete a field.
    pub fn delete_field(&mut self, id: &FieldId) -> Option<Field> {
        let removed = self.placement.delete(id);
        if !self.placement.has_pending_drag() {
            self.drag_page = None;
        }
        removed
    }

    /// Edit a field's label, options or flags.
    pub fn edit_field<R>(&mut self, id: &FieldId, edit: impl FnOnce(&mut Field) -> R) -> Option<R> {
        self.placement.edit(id, edit)
    }

    /// Select a field.
    pub fn select(&mut self, id: &FieldId) -> bool {
        self.placement.select(id)
    }

    /// Deselect the selected field.
    pub fn clear_selection(&mut self) {
        self.placement.clear_selection();
    }

    /// Switch the page being worked on. Unknown pages are pinned to the nearest
    /// existing one.
    pub fn set_active_page(&mut self, page_number: u32) {
        let page_number = self.pages.clamp_page_number(page_number);
        self.placement.set_active_page(page_number);
    }

    /// Replace all fields, e.g. with an earlier snapshot.
    pub fn restore(&mut self, fields: Vec<Field>) {
        self.drag_page = None;
        self.placement.restore(fields);
    }

    /// The on-screen rectangles of all fields on pages with a loaded image.
    pub fn overlays(&mut self) -> &[Overlay] {
        self.render.refresh(&self.placement, &self.pages)
    }

    /// The document as it should be written back to the document service.
    ///
    /// Fails without changing anything if an option field has no options.
    pub fn save_payload(&self) -> Result<SavePayload, ValidationError> {
        let fields = self.placement.fields();
        validate_for_save(fields)?;

        Ok(SavePayload {
            field_mappings: fields.to_vec(),
            pdf_dpi: self.pdf_dpi.clone(),
            pdf_page_dimensions: self.page_dimensions.clone(),
        })
    }
}
