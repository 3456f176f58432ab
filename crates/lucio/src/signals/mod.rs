//! Structured signals pulled out of unstructured text: the URL a screen
//! description points at, and the keywords of a user request.

pub mod keywords;
pub mod url;

pub use keywords::extract_keywords;
pub use url::{extract_explicit_url, extract_url, extract_url_detailed, CascadeStep};
