//! The field model.

use crate::coord::to_pdf_user_space;
use crate::page::PageGeometry;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The identifier of a field.
///
/// Identifiers are opaque strings on the wire. Fields created by a
/// [`PlacementSession`](crate::PlacementSession) get identifiers of the form
/// `field_<n>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Create a new field identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The kind of data a field collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// The signer's full name.
    Fullname,
    /// The signer's email address.
    Email,
    /// A date.
    Date,
    /// Free-form text.
    CustomText,
    /// A group of checkboxes.
    Checkbox,
    /// A group of radio buttons.
    Radio,
    /// A drop-down selection.
    Select,
    /// A handwritten signature.
    Signature,
}

impl FieldType {
    /// Every field type, in palette order.
    pub const ALL: [Self; 8] = [
        Self::Fullname,
        Self::Email,
        Self::Date,
        Self::CustomText,
        Self::Checkbox,
        Self::Radio,
        Self::Select,
        Self::Signature,
    ];

    /// The human readable name of the type, also used as the default field name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Fullname => "Full Name",
            Self::Email => "Email",
            Self::Date => "Date",
            Self::CustomText => "Custom Text",
            Self::Checkbox => "Checkbox",
            Self::Radio => "Radio",
            Self::Select => "Select",
            Self::Signature => "Signature",
        }
    }

    /// Whether fields of this type carry a list of options.
    pub fn has_options(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio | Self::Select)
    }

    /// The options a freshly created field of this type starts with.
    ///
    /// Returns `None` for types without options.
    pub fn initial_options(self) -> Option<Vec<String>> {
        match self {
            Self::Checkbox | Self::Radio => Some(vec!["Option 1".to_string()]),
            Self::Select => Some(Vec::new()),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which category of signer fills in a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Assignee {
    /// A member of the organization sending the document.
    #[default]
    Internal,
    /// A recipient outside the organization.
    External,
}

/// A field placed on a page of a document.
///
/// The geometry is expressed in PDF points with the origin at the top-left of
/// the page. Pixel geometry is always derived from it and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// The identifier of the field.
    pub id: FieldId,
    /// The kind of data the field collects.
    pub field_type: FieldType,
    /// The label shown to the signer.
    #[serde(default)]
    pub field_name: String,
    /// Which category of signer fills in the field.
    #[serde(default)]
    pub assigned_to: Assignee,
    /// Left edge, in points.
    pub x: f64,
    /// Top edge, in points.
    pub y: f64,
    /// Width, in points.
    pub width: f64,
    /// Height, in points.
    pub height: f64,
    /// The 1-based page number.
    pub page_number: u32,
    /// Whether the signer must fill in the field.
    #[serde(default)]
    pub required: bool,
    /// The options of checkbox, radio and select fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// The preselected option of a select field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_option: Option<String>,
    /// The DPI of the page previews when the field was created.
    ///
    /// Documents written before the snapshot existed lack it; see
    /// [`Field::fill_missing_snapshot`].
    #[serde(rename = "pdfDpi", default)]
    pub pdf_dpi: f64,
    /// The width of the page when the field was created.
    #[serde(rename = "pdfPageWidth", default)]
    pub pdf_page_width: f64,
    /// The height of the page when the field was created.
    #[serde(rename = "pdfPageHeight", default)]
    pub pdf_page_height: f64,
}

impl Field {
    /// The field's rectangle in document space.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// The field's top-left corner in document space.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The page geometry snapshot stored with the field.
    pub fn page_geometry(&self) -> PageGeometry {
        PageGeometry::new(self.pdf_page_width, self.pdf_page_height)
    }

    /// The field's rectangle in PDF user space, `[x0, y0, x1, y1]`.
    pub fn pdf_rect(&self) -> [f64; 4] {
        to_pdf_user_space(self.rect(), self.page_geometry())
    }

    /// Move the field so that its top-left corner is as close to `origin` as the
    /// page allows.
    ///
    /// Each axis is clamped to `0..=page - size`. A field larger than the page
    /// along an axis is first shrunk to the page extent, so it ends up pinned to
    /// `0` on that axis.
    pub fn move_clamped(&mut self, origin: Point, page: PageGeometry) {
        self.width = self.width.min(page.width);
        self.height = self.height.min(page.height);
        self.x = clamp_axis(origin.x, page.width, self.width);
        self.y = clamp_axis(origin.y, page.height, self.height);
    }

    /// Complete a snapshot that was missing from a loaded document.
    ///
    /// An empty name becomes the type's label. Missing or unusable page sizes
    /// are taken from `page`, and a missing DPI from `dpi` when it is known.
    /// Returns `true` if anything was filled in.
    pub fn fill_missing_snapshot(&mut self, page: PageGeometry, dpi: Option<f64>) -> bool {
        let mut filled = false;
        if self.field_name.is_empty() {
            self.field_name = self.field_type.label().to_string();
            filled = true;
        }
        if !is_positive(self.pdf_page_width) {
            self.pdf_page_width = page.width;
            filled = true;
        }
        if !is_positive(self.pdf_page_height) {
            self.pdf_page_height = page.height;
            filled = true;
        }
        if !is_positive(self.pdf_dpi) {
            if let Some(dpi) = dpi.filter(|dpi| is_positive(*dpi)) {
                self.pdf_dpi = dpi;
                filled = true;
            }
        }
        filled
    }

    /// Whether the field lies completely inside `page`.
    pub fn is_within(&self, page: PageGeometry) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= page.width
            && self.y + self.height <= page.height
    }

    /// Whether the field has an options list that is empty when it needs one.
    pub fn is_missing_options(&self) -> bool {
        self.field_type.has_options() && self.options.as_ref().is_none_or(Vec::is_empty)
    }

    /// Bring the option-related attributes in line with the field type.
    ///
    /// Option types always carry a (possibly empty) options list. Other types
    /// carry neither options nor a default option, and only select fields keep a
    /// default option.
    pub fn normalize_options(&mut self) {
        if self.field_type.has_options() {
            self.options.get_or_insert_with(Vec::new);
        } else {
            self.options = None;
        }

        let default_is_listed = match (&self.default_option, &self.options) {
            (Some(default), Some(options)) => options.contains(default),
            _ => false,
        };
        if self.field_type != FieldType::Select || !default_is_listed {
            self.default_option = None;
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// `max(0, min(page_extent - size, candidate))`.
fn clamp_axis(candidate: f64, page_extent: f64, size: f64) -> f64 {
    let max = page_extent - size;
    candidate.min(max).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_field(field_type: FieldType) -> Field {
        Field {
            id: FieldId::new("field_1"),
            field_type,
            field_name: field_type.label().to_string(),
            assigned_to: Assignee::Internal,
            x: 10.0,
            y: 20.0,
            width: 200.0,
            height: 30.0,
            page_number: 1,
            required: true,
            options: field_type.initial_options(),
            default_option: None,
            pdf_dpi: 72.0,
            pdf_page_width: 612.0,
            pdf_page_height: 792.0,
        }
    }

    #[test]
    fn clamping_pins_to_page_edges() {
        let mut field = sample_field(FieldType::Signature);
        field.move_clamped(Point::new(1000.0, -50.0), PageGeometry::US_LETTER);
        assert_eq!(field.x, 412.0);
        assert_eq!(field.y, 0.0);

        field.move_clamped(Point::new(-1.0, 9999.0), PageGeometry::US_LETTER);
        assert_eq!(field.x, 0.0);
        assert_eq!(field.y, 762.0);
        assert!(field.is_within(PageGeometry::US_LETTER));
    }

    #[test]
    fn missing_snapshot_is_filled_from_the_page() {
        let mut field = sample_field(FieldType::Email);
        field.field_name.clear();
        field.pdf_dpi = 0.0;
        field.pdf_page_width = 0.0;
        field.pdf_page_height = f64::NAN;

        let a4 = PageGeometry::new(595.0, 842.0);
        assert!(field.fill_missing_snapshot(a4, Some(150.0)));
        assert_eq!(field.field_name, "Email");
        assert_eq!((field.pdf_page_width, field.pdf_page_height), (595.0, 842.0));
        assert_eq!(field.pdf_dpi, 150.0);

        // A complete snapshot is left alone.
        assert!(!field.fill_missing_snapshot(PageGeometry::US_LETTER, Some(72.0)));
        assert_eq!(field.pdf_page_width, 595.0);
    }

    #[test]
    fn snapshot_less_field_deserializes() {
        let json = r#"{"id":"field_4","fieldType":"date","x":1,"y":2,"width":3,"height":4,"pageNumber":1}"#;
        let mut field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field.assigned_to, Assignee::Internal);
        assert_eq!(field.pdf_dpi, 0.0);

        assert!(field.fill_missing_snapshot(PageGeometry::US_LETTER, None));
        assert_eq!(field.field_name, "Date");
        assert_eq!(field.pdf_page_width, 612.0);
        assert_eq!(field.pdf_dpi, 0.0);
    }

    #[test]
    fn oversized_field_shrinks_to_page() {
        let mut field = sample_field(FieldType::Signature);
        field.width = 700.0;
        field.move_clamped(Point::new(40.0, 40.0), PageGeometry::US_LETTER);
        assert_eq!(field.x, 0.0);
        assert_eq!(field.y, 40.0);
        assert_eq!(field.width, 612.0);
        assert_eq!(field.height, 30.0);
        assert!(field.is_within(PageGeometry::US_LETTER));
    }

    #[test]
    fn initial_options_per_type() {
        assert_eq!(
            FieldType::Checkbox.initial_options(),
            Some(vec!["Option 1".to_string()])
        );
        assert_eq!(
            FieldType::Radio.initial_options(),
            Some(vec!["Option 1".to_string()])
        );
        assert_eq!(FieldType::Select.initial_options(), Some(vec![]));
        assert_eq!(FieldType::Email.initial_options(), None);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let field = sample_field(FieldType::CustomText);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["fieldType"], "customText");
        assert_eq!(json["assignedTo"], "internal");
        assert_eq!(json["pageNumber"], 1);
        assert_eq!(json["pdfPageWidth"], 612.0);
        assert!(json.get("options").is_none());
        assert!(json.get("defaultOption").is_none());
    }

    #[test]
    fn normalize_drops_stray_options() {
        let mut field = sample_field(FieldType::Date);
        field.options = Some(vec!["a".to_string()]);
        field.default_option = Some("a".to_string());
        field.normalize_options();
        assert_eq!(field.options, None);
        assert_eq!(field.default_option, None);

        let mut field = sample_field(FieldType::Select);
        field.options = None;
        field.default_option = Some("gone".to_string());
        field.normalize_options();
        assert_eq!(field.options, Some(vec![]));
        assert_eq!(field.default_option, None);
        assert!(field.is_missing_options());
    }

    #[test]
    fn pdf_rect_is_bottom_left_based() {
        let field = sample_field(FieldType::Signature);
        assert_eq!(field.pdf_rect(), [10.0, 742.0, 210.0, 772.0]);
    }
}
