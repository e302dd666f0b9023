use proptest::prelude::*;
use quire_fields::kurbo::{Point, Rect, Size, Vec2};
use quire_fields::*;
use quire_tests::session_with_image;
use serde_json::{Value, json};

const EPSILON: f64 = 1e-9;

fn assert_within_page(field: &Field, page: PageGeometry) {
    assert!(field.x >= 0.0, "x={}", field.x);
    assert!(field.y >= 0.0, "y={}", field.y);
    assert!(field.x + field.width <= page.width + EPSILON, "x1={}", field.x + field.width);
    assert!(field.y + field.height <= page.height + EPSILON, "y1={}", field.y + field.height);
}

proptest! {
    #[test]
    fn viewport_roundtrip_recovers_drop_rect(
        vw in 50.0..4000.0f64,
        vh in 50.0..4000.0f64,
        pw in 100.0..2000.0f64,
        ph in 100.0..2000.0f64,
        fx in 0.0..1.0f64,
        fy in 0.0..1.0f64,
    ) {
        let viewport = Size::new(vw, vh);
        let page = PageGeometry::new(pw, ph);
        let point = Point::new(vw * fx, vh * fy);
        let footprint = Size::new(200.0, 30.0);

        let doc = to_document_space(point, footprint, viewport, page);
        let back = to_viewport_space(doc, viewport, page);
        let expected = Rect::from_origin_size(point, footprint);

        let tolerance = 1e-9 * vw.max(vh);
        prop_assert!((back.x0 - expected.x0).abs() < tolerance, "x0={}", back.x0);
        prop_assert!((back.y0 - expected.y0).abs() < tolerance, "y0={}", back.y0);
        prop_assert!((back.x1 - expected.x1).abs() < tolerance, "x1={}", back.x1);
        prop_assert!((back.y1 - expected.y1).abs() < tolerance, "y1={}", back.y1);
    }

    #[test]
    fn dragged_fields_stay_on_the_page(
        vw in 50.0..2500.0f64,
        vh in 50.0..2500.0f64,
        moves in prop::collection::vec((-3000.0..3000.0f64, -3000.0..3000.0f64), 1..40),
    ) {
        let mut session = session_with_image(Size::new(vw, vh));
        let entry = PaletteEntry::new(FieldType::Signature, Assignee::External);
        let id = session
            .drop_field(&entry, 1, Point::new(vw / 2.0, vh / 2.0))
            .unwrap();
        assert_within_page(session.placement().field(&id).unwrap(), PageGeometry::US_LETTER);

        prop_assert_eq!(session.pointer_down(1, Point::new(vw / 2.0, vh / 2.0)), Some(id.clone()));
        for (x, y) in moves {
            session.pointer_move(Point::new(x, y));
            assert_within_page(session.placement().field(&id).unwrap(), PageGeometry::US_LETTER);
        }
        session.pointer_up();
        assert_within_page(session.placement().field(&id).unwrap(), PageGeometry::US_LETTER);
    }

    #[test]
    fn presses_below_threshold_leave_geometry_untouched(
        dx in -3.5..3.5f64,
        dy in -3.5..3.5f64,
        scale in 0.5..3.0f64,
    ) {
        let rendered = Size::new(612.0 * scale, 792.0 * scale);
        let mut session = session_with_image(rendered);
        let entry = PaletteEntry::new(FieldType::Checkbox, Assignee::Internal);
        let press = Point::new(rendered.width / 2.0, rendered.height / 2.0);
        let id = session.drop_field(&entry, 1, press).unwrap();
        let before = session.placement().field(&id).unwrap().clone();

        session.pointer_down(1, press);
        prop_assert!(!session.pointer_move(press + Vec2::new(dx, dy)));
        prop_assert_eq!(session.pointer_up(), Some(DragOutcome::Clicked(id.clone())));

        let after = session.placement().field(&id).unwrap();
        prop_assert_eq!(after.x.to_bits(), before.x.to_bits());
        prop_assert_eq!(after.y.to_bits(), before.y.to_bits());
    }

    #[test]
    fn string_dimensions_parse_like_arrays(
        sizes in prop::collection::vec((1u32..20_000, 1u32..20_000), 1..6),
    ) {
        let array: Value = sizes
            .iter()
            .map(|&(width, height)| {
                json!({"width": f64::from(width) / 4.0, "height": f64::from(height) / 4.0})
            })
            .collect();
        let encoded = Value::String(array.to_string());

        let from_array = PageDimensions::from_value(Some(&array));
        let from_string = PageDimensions::from_value(Some(&encoded));
        prop_assert_eq!(from_array.pages(), from_string.pages());
        prop_assert_eq!(from_array.pages().len(), sizes.len());
    }
}
