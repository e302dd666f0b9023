//! Creating, moving, selecting and deleting fields.
//!
//! A [`PlacementSession`] owns the ordered field collection of one document
//! together with the selection, the active page and the state of an ongoing
//! drag. Pointer positions are always given in viewport space together with the
//! current rendered size of the page image they refer to; the session converts
//! them into document space before touching any field.

use crate::coord::{point_to_document_space, point_to_viewport_space, to_document_space};
use crate::field::{Field, FieldId};
use crate::page::PageGeometryTable;
use crate::palette::PaletteEntry;
use crate::settings::PlacementSettings;
use kurbo::{Point, Size, Vec2};
use rustc_hash::FxHashSet;

/// A change to a [`PlacementSession`] (or the page previews it is drawn on).
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A field was created.
    FieldAdded(FieldId),
    /// A field's position changed.
    FieldMoved(FieldId),
    /// A field's label, options or flags changed.
    FieldUpdated(FieldId),
    /// A field was deleted.
    FieldRemoved(FieldId),
    /// The whole collection was replaced, e.g. by undo.
    FieldsReplaced,
    /// The selected field changed.
    SelectionChanged(Option<FieldId>),
    /// The page being worked on changed.
    ActivePageChanged(u32),
    /// The preview image of a page finished loading or was resized.
    PageImageLoaded(u32),
}

/// A handle to a listener registered with [`PlacementSession::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// How a drag gesture ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// The pointer never left the drag threshold; the field was only selected.
    Clicked(FieldId),
    /// The field was repositioned.
    Moved(FieldId),
}

#[derive(Debug, Clone)]
struct DragState {
    field_id: FieldId,
    start_pointer: Point,
    grab_offset: Vec2,
    dragging: bool,
}

type Listener = Box<dyn FnMut(&SessionEvent)>;

/// The field collection of one document and the state of its editor.
pub struct PlacementSession {
    fields: Vec<Field>,
    selected: Option<FieldId>,
    active_page: u32,
    drag: Option<DragState>,
    next_id: u64,
    revision: u64,
    settings: PlacementSettings,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl PlacementSession {
    /// Create an empty session.
    pub fn new(settings: PlacementSettings) -> Self {
        Self::with_fields(Vec::new(), settings)
    }

    /// Create a session editing an existing collection of fields.
    pub fn with_fields(fields: Vec<Field>, settings: PlacementSettings) -> Self {
        Self {
            fields,
            selected: None,
            active_page: 1,
            drag: None,
            next_id: 1,
            revision: 0,
            settings,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// All fields, in creation order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field.
    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| &f.id == id)
    }

    /// The selected field's identifier.
    pub fn selected(&self) -> Option<&FieldId> {
        self.selected.as_ref()
    }

    /// The selected field.
    pub fn selected_field(&self) -> Option<&Field> {
        self.field(self.selected.as_ref()?)
    }

    /// The page currently being worked on.
    pub fn active_page(&self) -> u32 {
        self.active_page
    }

    /// A counter that increases with every change to the session.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The settings the session was created with.
    pub fn settings(&self) -> &PlacementSettings {
        &self.settings
    }

    /// The field currently being dragged, once the pointer has left the drag
    /// threshold.
    pub fn dragging(&self) -> Option<&FieldId> {
        self.drag
            .as_ref()
            .filter(|drag| drag.dragging)
            .map(|drag| &drag.field_id)
    }

    /// Whether a press on a field is being tracked.
    pub fn has_pending_drag(&self) -> bool {
        self.drag.is_some()
    }

    /// Register a listener that is called after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub(crate) fn emit(&mut self, event: SessionEvent) {
        self.revision += 1;
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    fn index_of(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|f| &f.id == id)
    }

    fn fresh_id(&mut self) -> FieldId {
        let taken: FxHashSet<&str> = self.fields.iter().map(|f| f.id.as_str()).collect();
        loop {
            let candidate = format!("field_{}", self.next_id);
            self.next_id += 1;
            if !taken.contains(candidate.as_str()) {
                return FieldId::new(candidate);
            }
        }
    }

    /// Create a field from a palette entry dropped onto a page.
    ///
    /// `drop_point` is relative to the top-left corner of the page's rendered
    /// image, which currently has the size `rendered`. The new field is centered
    /// on the drop point, selected, and its page becomes the active page.
    ///
    /// Returns `None` if the page does not exist or its image has no usable size.
    pub fn create_on_drop(
        &mut self,
        entry: &PaletteEntry,
        page_number: u32,
        drop_point: Point,
        rendered: Size,
        pages: &PageGeometryTable,
    ) -> Option<FieldId> {
        if !is_renderable(rendered) {
            log::debug!("ignoring drop on page {page_number}: image has no size yet");
            return None;
        }
        let Some(page) = pages.get(page_number) else {
            log::debug!("ignoring drop on unknown page {page_number}");
            return None;
        };

        let footprint = self.settings.default_field_size();
        let rect = to_document_space(drop_point, footprint, rendered, page);
        // Small previews scale the footprint past the page itself.
        let size = Size::new(rect.width().min(page.width), rect.height().min(page.height));
        let origin = rect.origin() - Vec2::new(size.width / 2.0, size.height / 2.0);

        let mut field = Field {
            id: self.fresh_id(),
            field_type: entry.field_type,
            field_name: entry.label.clone(),
            assigned_to: entry.category,
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
            page_number,
            required: self.settings.default_required,
            options: entry.field_type.initial_options(),
            default_option: None,
            pdf_dpi: pages.dpi(),
            pdf_page_width: page.width,
            pdf_page_height: page.height,
        };
        if self.settings.clamp_on_create {
            field.move_clamped(origin, page);
        }

        let id = field.id.clone();
        log::debug!(
            "created {} field {id} on page {page_number} at ({:.1}, {:.1})",
            field.field_type,
            field.x,
            field.y
        );
        self.fields.push(field);
        self.emit(SessionEvent::FieldAdded(id.clone()));
        self.select(&id);
        self.set_active_page(page_number);
        Some(id)
    }

    /// Start tracking a press on a field.
    ///
    /// `pointer` is in viewport space of the field's page image, which currently
    /// has the size `rendered`. Geometry is untouched until the pointer leaves the
    /// drag threshold. Returns `false` if the field does not exist or the image
    /// has no usable size.
    pub fn begin_drag(
        &mut self,
        id: &FieldId,
        pointer: Point,
        rendered: Size,
        pages: &PageGeometryTable,
    ) -> bool {
        if !is_renderable(rendered) {
            return false;
        }
        let Some(field) = self.field(id) else {
            return false;
        };

        let page = pages.for_field(field);
        let top_left = point_to_viewport_space(field.origin(), rendered, page);
        self.drag = Some(DragState {
            field_id: id.clone(),
            start_pointer: pointer,
            grab_offset: pointer - top_left,
            dragging: false,
        });
        true
    }

    /// Follow the pointer during a drag.
    ///
    /// The field's top-left corner follows `pointer - grab_offset` and is clamped
    /// into its page, so the pointer may travel past the image edges. Returns
    /// `true` if the field was moved.
    pub fn drag_to(&mut self, pointer: Point, rendered: Size, pages: &PageGeometryTable) -> bool {
        if !is_renderable(rendered) {
            return false;
        }
        let threshold = self.settings.drag_threshold;
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };

        if !drag.dragging {
            if (pointer - drag.start_pointer).hypot() < threshold {
                return false;
            }
            drag.dragging = true;
        }

        let id = drag.field_id.clone();
        let candidate = pointer - drag.grab_offset;
        let Some(index) = self.index_of(&id) else {
            self.drag = None;
            return false;
        };

        let field = &mut self.fields[index];
        let page = pages.for_field(field);
        let origin = point_to_document_space(candidate, rendered, page);
        field.move_clamped(origin, page);
        log::trace!("dragged field {id} to ({:.1}, {:.1})", field.x, field.y);

        self.emit(SessionEvent::FieldMoved(id.clone()));
        self.select(&id);
        true
    }

    /// Finish a drag.
    ///
    /// A press that never left the drag threshold selects the field and leaves
    /// its geometry untouched.
    pub fn end_drag(&mut self) -> Option<DragOutcome> {
        let drag = self.drag.take()?;
        if self.index_of(&drag.field_id).is_none() {
            return None;
        }

        self.select(&drag.field_id);
        if drag.dragging {
            Some(DragOutcome::Moved(drag.field_id))
        } else {
            Some(DragOutcome::Clicked(drag.field_id))
        }
    }

    /// Abort a drag, e.g. because the pointer left the tracked area.
    ///
    /// The field keeps the last position it was moved to.
    pub fn cancel_drag(&mut self) -> Option<FieldId> {
        self.drag.take().map(|drag| drag.field_id)
    }

    /// Delete a field.
    pub fn delete(&mut self, id: &FieldId) -> Option<Field> {
        let index = self.index_of(id)?;
        let removed = self.fields.remove(index);

        if self.drag.as_ref().is_some_and(|drag| &drag.field_id == id) {
            self.drag = None;
        }
        self.emit(SessionEvent::FieldRemoved(id.clone()));
        if self.selected.as_ref() == Some(id) {
            self.clear_selection();
        }
        Some(removed)
    }

    /// Select a field. Returns `false` if it does not exist.
    pub fn select(&mut self, id: &FieldId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        if self.selected.as_ref() != Some(id) {
            self.selected = Some(id.clone());
            self.emit(SessionEvent::SelectionChanged(Some(id.clone())));
        }
        true
    }

    /// Deselect the selected field, if any.
    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.emit(SessionEvent::SelectionChanged(None));
        }
    }

    /// Switch the page being worked on.
    pub fn set_active_page(&mut self, page_number: u32) {
        if self.active_page != page_number {
            self.active_page = page_number;
            self.emit(SessionEvent::ActivePageChanged(page_number));
        }
    }

    /// Edit a field in place, e.g. with the option editing methods of [`Field`].
    ///
    /// Returns `None` if the field does not exist, otherwise the closure's result.
    pub fn edit<R>(&mut self, id: &FieldId, edit: impl FnOnce(&mut Field) -> R) -> Option<R> {
        let index = self.index_of(id)?;
        let result = edit(&mut self.fields[index]);
        self.emit(SessionEvent::FieldUpdated(id.clone()));
        Some(result)
    }

    /// Replace the whole collection, e.g. with a snapshot taken earlier.
    ///
    /// Any drag is dropped and the selection is cleared if its field is gone.
    /// Identifiers handed out before are not handed out again.
    pub fn restore(&mut self, fields: Vec<Field>) {
        self.fields = fields;
        self.drag = None;
        self.emit(SessionEvent::FieldsReplaced);

        if let Some(selected) = self.selected.clone() {
            if self.index_of(&selected).is_none() {
                self.clear_selection();
            }
        }
    }
}

fn is_renderable(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}
