//! Integration tests for interactive editing through `AuthoringSession`.

use std::cell::RefCell;
use std::rc::Rc;

use quire_fields::kurbo::{Point, Rect, Size};
use quire_fields::*;

fn loaded_session(settings: PlacementSettings) -> AuthoringSession {
    let mut session = AuthoringSession::new(settings);
    session.image_loaded(1, Size::new(612.0, 792.0));
    session
}

#[test]
fn default_footprint_on_identity_scale() {
    let mut session = loaded_session(PlacementSettings::default());
    for entry in default_palette()
        .iter()
        .filter(|entry| !entry.field_type.has_options())
    {
        let id = session
            .drop_field(entry, 1, Point::new(306.0, 396.0))
            .unwrap();
        let field = session.placement().field(&id).unwrap();
        assert_eq!(
            field.rect(),
            Rect::new(206.0, 381.0, 406.0, 411.0),
            "type={}",
            entry.field_type
        );
        assert_eq!(field.assigned_to, entry.category);
    }
}

#[test]
fn overlays_follow_zoom() {
    let mut session = loaded_session(PlacementSettings::default());
    let entry = PaletteEntry::new(FieldType::Signature, Assignee::External);
    let id = session
        .drop_field(&entry, 1, Point::new(306.0, 396.0))
        .unwrap();

    let before = session.placement().field(&id).unwrap().clone();
    for rendered in [Size::new(1224.0, 1584.0), Size::new(306.0, 396.0)] {
        session.image_loaded(1, rendered);
        let factor = rendered.width / 612.0;
        let overlay = session.overlays()[0].clone();
        assert_eq!(
            overlay.rect,
            Rect::new(
                206.0 * factor,
                381.0 * factor,
                406.0 * factor,
                411.0 * factor
            )
        );
    }
    assert_eq!(session.placement().field(&id), Some(&before));
}

#[test]
fn drag_past_the_edge_stops_at_the_page() {
    let mut session = loaded_session(PlacementSettings::default());
    let entry = PaletteEntry::new(FieldType::Date, Assignee::Internal);
    let id = session
        .drop_field(&entry, 1, Point::new(306.0, 396.0))
        .unwrap();

    session.pointer_down(1, Point::new(306.0, 396.0));
    assert!(session.pointer_move(Point::new(900.0, -300.0)));
    let field = session.placement().field(&id).unwrap();
    assert_eq!((field.x, field.y), (412.0, 0.0));

    // Leaving the tracked area keeps the clamped position.
    assert_eq!(session.pointer_leave(), Some(id.clone()));
    assert!(!session.pointer_move(Point::new(0.0, 0.0)));
    let field = session.placement().field(&id).unwrap();
    assert_eq!((field.x, field.y), (412.0, 0.0));
}

#[test]
fn click_selects_without_moving() {
    let mut session = loaded_session(PlacementSettings::default());
    let entry = PaletteEntry::new(FieldType::Email, Assignee::External);
    let first = session
        .drop_field(&entry, 1, Point::new(150.0, 100.0))
        .unwrap();
    let second = session
        .drop_field(&entry, 1, Point::new(400.0, 600.0))
        .unwrap();
    assert_eq!(session.placement().selected(), Some(&second));

    let before = session.placement().field(&first).unwrap().clone();
    session.pointer_down(1, Point::new(150.0, 100.0));
    assert!(!session.pointer_move(Point::new(152.0, 103.0)));
    assert_eq!(session.pointer_up(), Some(DragOutcome::Clicked(first.clone())));

    assert_eq!(session.placement().selected(), Some(&first));
    let after = session.placement().field(&first).unwrap();
    assert_eq!(after.x.to_bits(), before.x.to_bits());
    assert_eq!(after.y.to_bits(), before.y.to_bits());
}

#[test]
fn listeners_see_every_change() {
    let mut session = AuthoringSession::new(PlacementSettings::default());
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let listener = session.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    session.image_loaded(1, Size::new(612.0, 792.0));
    let entry = PaletteEntry::new(FieldType::Radio, Assignee::Internal);
    let id = session
        .drop_field(&entry, 1, Point::new(306.0, 396.0))
        .unwrap();
    session.edit_field(&id, |field| field.add_option("Option 2"));
    session.delete_field(&id);

    assert_eq!(
        *events.borrow(),
        [
            SessionEvent::PageImageLoaded(1),
            SessionEvent::FieldAdded(id.clone()),
            SessionEvent::SelectionChanged(Some(id.clone())),
            SessionEvent::FieldUpdated(id.clone()),
            SessionEvent::FieldRemoved(id.clone()),
            SessionEvent::SelectionChanged(None),
        ]
    );

    assert!(session.unsubscribe(listener));
    session.set_active_page(1);
    assert_eq!(events.borrow().len(), 6);
    assert!(session.overlays().is_empty());
}

#[test]
fn unclamped_creation_can_overhang() {
    let settings = PlacementSettings {
        clamp_on_create: false,
        ..PlacementSettings::default()
    };
    let mut session = loaded_session(settings);
    let entry = PaletteEntry::new(FieldType::Fullname, Assignee::External);
    let id = session
        .drop_field(&entry, 1, Point::new(610.0, 790.0))
        .unwrap();

    let field = session.placement().field(&id).unwrap();
    assert_eq!((field.x, field.y), (510.0, 775.0));
    assert!(!field.is_within(PageGeometry::US_LETTER));

    // The first move brings it back inside.
    session.pointer_down(1, Point::new(600.0, 780.0));
    session.pointer_move(Point::new(610.0, 790.0));
    let field = session.placement().field(&id).unwrap();
    assert!(field.is_within(PageGeometry::US_LETTER));
}
