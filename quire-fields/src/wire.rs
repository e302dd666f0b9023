//! The JSON format exchanged with the document service.
//!
//! Documents arrive as
//!
//! ```json
//! { "fieldMappings": [...], "pdfDpi": 150, "pdfPageDimensions": [{"width": 612, "height": 792}] }
//! ```
//!
//! where older documents store `pdfPageDimensions` as a JSON-encoded string
//! instead of an array. Malformed metadata is expected and never blocks
//! authoring: it is replaced by defaults with a warning. Only text that is not a
//! JSON object at all is rejected.

use crate::field::{Field, FieldId};
use crate::page::{PageGeometry, PageGeometryTable};
use serde::Deserialize;
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// An error that occurred while reading or writing the document service format.
#[derive(Debug)]
pub enum WireError {
    /// The text is not valid JSON.
    Json(String),
    /// The JSON value is not an object.
    NotAnObject,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(s) => write!(f, "invalid JSON: {s}"),
            Self::NotAnObject => write!(f, "document metadata is not a JSON object"),
        }
    }
}

impl std::error::Error for WireError {}

impl From<serde_json::Error> for WireError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// An error that prevents a document from being saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Checkbox, radio or select fields without any options.
    MissingOptions(Vec<FieldId>),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOptions(ids) => {
                write!(f, "fields without options: ")?;
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{id}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check that a field collection can be saved.
pub fn validate_for_save(fields: &[Field]) -> Result<(), ValidationError> {
    let missing: Vec<FieldId> = fields
        .iter()
        .filter(|field| field.is_missing_options())
        .map(|field| field.id.clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingOptions(missing))
    }
}

/// How the page dimensions of a document were encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDimensionsEncoding {
    /// A JSON array of `{width, height}` objects.
    Array,
    /// A string containing such an array, encoded as JSON.
    JsonString,
    /// Some other JSON value, such as a number or an object.
    Unrecognized,
    /// The key was absent or `null`.
    Missing,
}

/// The page dimensions of a document.
///
/// The value they were read from is kept and written back unchanged, so that
/// keys quire does not know about and the original number formatting survive a
/// save.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDimensions {
    pages: Vec<PageGeometry>,
    encoding: PageDimensionsEncoding,
    original: Option<Value>,
}

impl PageDimensions {
    /// Page dimensions given as an array.
    pub fn new(pages: Vec<PageGeometry>) -> Self {
        Self {
            pages,
            encoding: PageDimensionsEncoding::Array,
            original: None,
        }
    }

    /// Parse the `pdfPageDimensions` value of a document.
    ///
    /// Every entry is read on its own; an entry that is not a `{width, height}`
    /// object becomes a US Letter page so that later pages keep their numbers.
    /// Anything that does not yield at least one page becomes a single US
    /// Letter page.
    pub fn from_value(value: Option<&Value>) -> Self {
        let (entries, encoding) = match value {
            None | Some(Value::Null) => (None, PageDimensionsEncoding::Missing),
            Some(Value::String(s)) => (
                serde_json::from_str::<Vec<Value>>(s).ok(),
                PageDimensionsEncoding::JsonString,
            ),
            Some(Value::Array(entries)) => (Some(entries.clone()), PageDimensionsEncoding::Array),
            Some(_) => (None, PageDimensionsEncoding::Unrecognized),
        };

        let pages = match entries {
            Some(entries) if !entries.is_empty() => read_pages(entries),
            _ => {
                if encoding != PageDimensionsEncoding::Missing {
                    log::warn!("unreadable page dimensions, assuming a single US Letter page");
                }
                vec![PageGeometry::US_LETTER]
            }
        };

        let original = match encoding {
            PageDimensionsEncoding::Missing => None,
            _ => value.cloned(),
        };

        Self {
            pages,
            encoding,
            original,
        }
    }

    /// The parsed pages.
    pub fn pages(&self) -> &[PageGeometry] {
        &self.pages
    }

    /// The encoding the dimensions arrived in.
    pub fn encoding(&self) -> PageDimensionsEncoding {
        self.encoding
    }

    fn is_missing(&self) -> bool {
        self.encoding == PageDimensionsEncoding::Missing
    }
}

fn read_pages(entries: Vec<Value>) -> Vec<PageGeometry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            PageGeometry::deserialize(entry).unwrap_or_else(|err| {
                log::warn!("unreadable size of page {}, assuming US Letter: {err}", index + 1);
                PageGeometry::US_LETTER
            })
        })
        .collect()
}

impl Serialize for PageDimensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.original {
            Some(original) => original.serialize(serializer),
            None => self.pages.serialize(serializer),
        }
    }
}

/// The DPI a document's page previews were rendered at.
///
/// Like [`PageDimensions`], the value is written back exactly as it was read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentDpi {
    dpi: Option<f64>,
    original: Option<Value>,
}

impl DocumentDpi {
    /// Parse the `pdfDpi` value of a document. Numbers and numeric strings are
    /// understood.
    pub fn from_value(value: Option<&Value>) -> Self {
        let original = value.filter(|value| !value.is_null()).cloned();
        let dpi = original.as_ref().and_then(read_number);
        if original.is_some() && dpi.is_none() {
            log::warn!("unreadable document DPI, using the default");
        }
        Self { dpi, original }
    }

    /// The DPI, if the document states a usable one.
    pub fn value(&self) -> Option<f64> {
        self.dpi
    }

    fn is_missing(&self) -> bool {
        self.original.is_none()
    }
}

impl Serialize for DocumentDpi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.original.serialize(serializer)
    }
}

fn read_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (number.is_finite() && number > 0.0).then_some(number)
}

/// A document as read from the document service.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateData {
    /// The fields placed on the document.
    pub field_mappings: Vec<Field>,
    /// The DPI the page previews were rendered at.
    pub pdf_dpi: DocumentDpi,
    /// The size of every page.
    pub pdf_page_dimensions: PageDimensions,
}

impl TemplateData {
    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, WireError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Read a document from a parsed JSON value.
    ///
    /// Field entries that cannot be read are skipped. Fields on pages the
    /// document does not have are moved to the nearest existing page. Fields
    /// written without a page snapshot get one from the document's metadata.
    pub fn from_value(value: Value) -> Result<Self, WireError> {
        let Value::Object(object) = value else {
            return Err(WireError::NotAnObject);
        };

        let pdf_page_dimensions = PageDimensions::from_value(object.get("pdfPageDimensions"));
        let pdf_dpi = DocumentDpi::from_value(object.get("pdfDpi"));
        let pages = pdf_page_dimensions.pages();
        let page_count = u32::try_from(pages.len()).unwrap_or(u32::MAX);

        let entries = match object.get("fieldMappings") {
            Some(Value::Array(entries)) => entries.clone(),
            Some(Value::String(s)) => serde_json::from_str::<Vec<Value>>(s).unwrap_or_else(|err| {
                log::warn!("unreadable field mappings string: {err}");
                Vec::new()
            }),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                log::warn!("field mappings are not a list, ignoring them");
                Vec::new()
            }
        };

        let mut field_mappings = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Field>(entry) {
                Ok(mut field) => {
                    field.normalize_options();
                    let pinned = field.page_number.clamp(1, page_count.max(1));
                    if pinned != field.page_number {
                        log::warn!(
                            "field {} is on page {}, moving it to page {pinned}",
                            field.id,
                            field.page_number
                        );
                        field.page_number = pinned;
                    }
                    let page = pages
                        .get(pinned as usize - 1)
                        .copied()
                        .filter(PageGeometry::is_valid)
                        .unwrap_or(PageGeometry::US_LETTER);
                    if field.fill_missing_snapshot(page, pdf_dpi.value()) {
                        log::debug!("completed the page snapshot of field {}", field.id);
                    }
                    field_mappings.push(field);
                }
                Err(err) => log::warn!("skipping unreadable field mapping #{index}: {err}"),
            }
        }

        Ok(Self {
            field_mappings,
            pdf_dpi,
            pdf_page_dimensions,
        })
    }

    /// The page geometry table of the document.
    pub fn page_table(&self, default_dpi: f64) -> PageGeometryTable {
        PageGeometryTable::new(
            self.pdf_page_dimensions.pages().to_vec(),
            self.pdf_dpi.value().unwrap_or(default_dpi),
        )
    }
}

/// A document as written back to the document service.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    /// The fields placed on the document, in document space.
    pub field_mappings: Vec<Field>,
    /// The DPI the page previews were rendered at, as it was read.
    #[serde(skip_serializing_if = "DocumentDpi::is_missing")]
    pub pdf_dpi: DocumentDpi,
    /// The page dimensions, as they were read.
    #[serde(skip_serializing_if = "PageDimensions::is_missing")]
    pub pdf_page_dimensions: PageDimensions,
}

impl SavePayload {
    /// Serialize the payload as JSON text.
    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }
}
