//! Document rendering: plain, multi-page PDF output written to disk.

pub mod filename;
pub mod pdf;

pub use filename::meaningful_filename;
pub use pdf::{build_pdf, PdfRenderer};
