//! The menu of field types that can be dragged onto a page.

use crate::field::{Assignee, FieldType};
use serde::{Deserialize, Serialize};

/// One entry of the field palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// The type of field the entry creates.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// The label shown in the palette and used as the new field's name.
    pub label: String,
    /// The signer category new fields are assigned to.
    pub category: Assignee,
}

impl PaletteEntry {
    /// Create a palette entry labelled with the type's default label.
    pub fn new(field_type: FieldType, category: Assignee) -> Self {
        Self {
            field_type,
            label: field_type.label().to_string(),
            category,
        }
    }
}

/// The standard palette: every field type, once for internal and once for
/// external signers.
pub fn default_palette() -> Vec<PaletteEntry> {
    [Assignee::Internal, Assignee::External]
        .into_iter()
        .flat_map(|category| {
            FieldType::ALL
                .into_iter()
                .map(move |field_type| PaletteEntry::new(field_type, category))
        })
        .collect()
}
