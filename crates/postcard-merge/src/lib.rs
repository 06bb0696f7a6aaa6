//! Sheet merging - batching persisted sheet images into paginated PDFs
//!
//! Runs after every sheet is durably on disk. Sheets are taken in
//! lexicographic filename order, partitioned into bounded chunks and each
//! chunk becomes one PDF with a page per sheet, so peak memory never holds
//! more than one chunk's decoded images.

mod merge;
pub mod reconcile;
mod types;

pub use merge::{chunk_sheets, document_filename, enumerate_sheets, merge};
pub use reconcile::{missing_uprns, reconcile};
pub use types::{MergeError, MergeOptions, Result};
