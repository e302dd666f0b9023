use quire_fields::Overlay;
use serde::Serialize;

/// An overlay as handed to JavaScript, in CSS pixels of the page image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OverlayBox {
    pub(crate) id: String,
    pub(crate) page: u32,
    pub(crate) left: f64,
    pub(crate) top: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) selected: bool,
}

impl From<&Overlay> for OverlayBox {
    fn from(overlay: &Overlay) -> Self {
        Self {
            id: overlay.field_id.to_string(),
            page: overlay.page_number,
            left: overlay.rect.x0,
            top: overlay.rect.y0,
            width: overlay.rect.width(),
            height: overlay.rect.height(),
            selected: overlay.selected,
        }
    }
}

pub(crate) fn overlay_boxes(overlays: &[Overlay]) -> Vec<OverlayBox> {
    overlays.iter().map(OverlayBox::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_fields::FieldId;
    use quire_fields::kurbo::Rect;

    #[test]
    fn overlay_box_uses_css_layout() {
        let overlay = Overlay {
            field_id: FieldId::new("field_3"),
            page_number: 2,
            rect: Rect::new(412.0, 762.0, 812.0, 822.0),
            selected: true,
        };
        let boxes = overlay_boxes(&[overlay]);
        assert_eq!(
            boxes,
            [OverlayBox {
                id: "field_3".to_string(),
                page: 2,
                left: 412.0,
                top: 762.0,
                width: 400.0,
                height: 60.0,
                selected: true,
            }]
        );
        let json = serde_json::to_value(&boxes[0]).unwrap();
        assert_eq!(json["left"], 412.0);
        assert_eq!(json["selected"], true);
    }
}
