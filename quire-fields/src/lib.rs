/*!
A crate for placing and editing e-signature fields on rendered PDF pages.

Fields are authored by dragging them onto raster previews of a document's pages,
but their geometry is always stored in PDF points so that it stays valid at any
zoom level and can be handed to a stamping backend as-is. This crate provides the
conversion between the two coordinate spaces, the field model, the drag and drop
placement logic with bounds clamping, per-page overlay bookkeeping and the
per-type configuration editor.

The entry point for most users is [`AuthoringSession`], which wires all of these
pieces together and speaks the JSON format of the document service through
[`TemplateData`] and [`SavePayload`].
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod coord;
mod editor;
mod field;
mod page;
mod palette;
mod placement;
mod render;
mod session;
mod settings;
mod wire;

pub use kurbo;

pub use coord::*;
pub use field::*;
pub use page::*;
pub use palette::*;
pub use placement::*;
pub use render::*;
pub use session::*;
pub use settings::*;
pub use wire::*;
