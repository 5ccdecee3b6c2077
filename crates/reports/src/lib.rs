//! Renderers that turn a [`orcid_core::Profile`] into report files.
//!
//! Every renderer writes one complete file into a [`ResultDir`].

pub mod document;
pub mod output;
pub mod pdf;
pub mod settings;
pub mod structured;
pub mod table;
pub mod text;

pub use document::render_document;
pub use output::ResultDir;
pub use settings::Settings;
pub use structured::{StructuredReport, render_structured};
pub use table::{TableFormat, render_table};
pub use text::render_text;
