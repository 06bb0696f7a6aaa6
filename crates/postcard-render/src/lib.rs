//! Postcard rendering - composing bin collection postcards for print
//!
//! The pipeline works in three stages:
//! 1. Render each property's address and calendar faces onto the card
//!    templates
//! 2. Compose four cards per side onto a blank SRA3 sheet and persist it
//! 3. Hand the persisted sheets to `postcard-merge` for PDF batching

pub mod batch;
pub mod card;
pub mod sheet;
pub mod source;
pub mod text;

mod assets;
mod layout;
mod options;
mod record;
mod types;

pub use assets::{AssetPaths, Assets};
pub use batch::{BatchOutput, generate, group_uprns};
pub use card::{AddressCard, CalendarCard, CalendarLayout, Card};
pub use layout::{CARD_OFFSETS, flip_group, flip_index};
pub use options::RenderOptions;
pub use record::{AddressRecord, CalendarRecord, CalendarStrings, Collection};
pub use sheet::{compose_sheet, parse_sheet_filename, save_sheet, sheet_filename};
pub use source::{CsvRecordSource, RecordSource, with_retry};
pub use types::{RenderError, Result, Rotation, SheetSide, Uprn};
