//! Card renderers - one finished postcard face per property
//!
//! Both faces share the marker stamps (positional index and UPRN) that let
//! the print shop match an address sheet to its calendar sheet; everything
//! else is face-specific.

use image::{Rgb, RgbImage};

use crate::assets::Assets;
use crate::layout::flip_index;
use crate::options::RenderOptions;
use crate::record::{AddressRecord, CalendarRecord};
use crate::text::{TextFlow, render_text_box, stamp, wrap_text};
use crate::types::{RenderError, Result, Rotation, Uprn};

const ADDRESS_FONT_SIZE: f32 = 45.0;
const CALENDAR_FONT_SIZE: f32 = 59.0;
const MARKER_FONT_SIZE: f32 = 40.0;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// A text region on a card: box size plus paste offset, in template pixels.
struct Region {
    width: u32,
    height: u32,
    x: u32,
    y: u32,
}

// Address block on the front face
const ADDRESS_REGION: Region = Region {
    width: 1900,
    height: 850,
    x: 500,
    y: 700,
};

// Calendar face, one region per waste stream. Offsets match the artwork on
// the same-collection template.
const REFUSE_REGION: Region = Region {
    width: 300,
    height: 450,
    x: 380,
    y: 710,
};
const RECYCLING_BIN_REGION: Region = Region {
    width: 300,
    height: 450,
    x: 1070,
    y: 710,
};
const RECYCLING_BOX_REGION: Region = Region {
    width: 400,
    height: 250,
    x: 935,
    y: 710,
};
const GARDEN_REGION: Region = Region {
    width: 300,
    height: 450,
    x: 1975,
    y: 710,
};

// Corner markers
const INDEX_REGION: Region = Region {
    width: 100,
    height: 100,
    x: 0,
    y: 0,
};
const UPRN_REGION: Region = Region {
    width: 1000,
    height: 100,
    x: 750,
    y: 0,
};

/// One renderable postcard face.
pub trait Card {
    fn uprn(&self) -> &Uprn;

    /// Render the face for grid position `index` (1-4) onto a fresh copy of
    /// its template.
    fn render(&self, index: usize, assets: &Assets, options: &RenderOptions) -> Result<RgbImage>;
}

/// The address face of a postcard.
#[derive(Debug, Clone)]
pub struct AddressCard {
    pub record: AddressRecord,
}

impl AddressCard {
    pub fn new(record: AddressRecord) -> Self {
        Self { record }
    }
}

impl Card for AddressCard {
    fn uprn(&self) -> &Uprn {
        &self.record.uprn
    }

    fn render(&self, index: usize, assets: &Assets, _options: &RenderOptions) -> Result<RgbImage> {
        if self.record.address_block.trim().is_empty() {
            return Err(RenderError::MissingField {
                uprn: self.record.uprn.clone(),
                field: "address_block",
            });
        }

        let mut card = assets.address_template.clone();
        let address = render_text_box(
            TextFlow::Preformatted(&self.record.address_block),
            ADDRESS_REGION.width,
            ADDRESS_REGION.height,
            Rotation::None,
            &assets.address_font,
            ADDRESS_FONT_SIZE,
        );
        stamp(&mut card, &address, ADDRESS_REGION.x, ADDRESS_REGION.y, BLACK);

        stamp_markers(&mut card, index, &self.record.uprn, assets);
        Ok(card)
    }
}

/// Which calendar artwork a property needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarLayout {
    /// Recycling bin and box collected on the same day
    SameCollection,
    /// Bin and box on different days. The artwork exists but the layout was
    /// never finished, so selecting it is an explicit error rather than a
    /// silently blank region.
    DifferentCollection,
}

impl CalendarLayout {
    pub fn for_record(record: &CalendarRecord) -> Self {
        if record.recycling_box.day == record.recycling_bin.day {
            CalendarLayout::SameCollection
        } else {
            CalendarLayout::DifferentCollection
        }
    }
}

/// The calendar face of a postcard.
#[derive(Debug, Clone)]
pub struct CalendarCard {
    pub record: CalendarRecord,
}

impl CalendarCard {
    pub fn new(record: CalendarRecord) -> Self {
        Self { record }
    }

    pub fn layout(&self) -> CalendarLayout {
        CalendarLayout::for_record(&self.record)
    }
}

impl Card for CalendarCard {
    fn uprn(&self) -> &Uprn {
        &self.record.uprn
    }

    fn render(&self, index: usize, assets: &Assets, options: &RenderOptions) -> Result<RgbImage> {
        if self.layout() == CalendarLayout::DifferentCollection {
            return Err(RenderError::UnimplementedLayout);
        }

        let strings = self.record.display_strings(options)?;
        let mut card = assets.calendar_template.clone();

        for (text, region) in [
            (&strings.refuse, &REFUSE_REGION),
            (&strings.recycling_bin, &RECYCLING_BIN_REGION),
            (&strings.recycling_box, &RECYCLING_BOX_REGION),
            (&strings.garden, &GARDEN_REGION),
        ] {
            let lines = wrap_text(text, options.wrap_width);
            let mask = render_text_box(
                TextFlow::Wrapped(&lines),
                region.width,
                region.height,
                Rotation::None,
                &assets.calendar_font,
                CALENDAR_FONT_SIZE,
            );
            stamp(&mut card, &mask, region.x, region.y, WHITE);
        }

        // The calendar side is flipped against the address side when the
        // sheets are printed back to back, so the printed index is remapped
        stamp_markers(&mut card, flip_index(index), &self.record.uprn, assets);
        Ok(card)
    }
}

/// Stamp the positional index and the UPRN in the card's top corners.
fn stamp_markers(card: &mut RgbImage, index: usize, uprn: &Uprn, assets: &Assets) {
    let index_mask = render_text_box(
        TextFlow::Preformatted(&index.to_string()),
        INDEX_REGION.width,
        INDEX_REGION.height,
        Rotation::None,
        &assets.marker_font,
        MARKER_FONT_SIZE,
    );
    stamp(card, &index_mask, INDEX_REGION.x, INDEX_REGION.y, BLACK);

    let uprn_mask = render_text_box(
        TextFlow::Preformatted(uprn.as_str()),
        UPRN_REGION.width,
        UPRN_REGION.height,
        Rotation::None,
        &assets.marker_font,
        MARKER_FONT_SIZE,
    );
    stamp(card, &uprn_mask, UPRN_REGION.x, UPRN_REGION.y, BLACK);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Collection;

    fn calendar_record(bin_day: &str, box_day: &str) -> CalendarRecord {
        CalendarRecord {
            uprn: Uprn::from("100023336956"),
            refuse: Collection {
                day: "Wednesday".to_string(),
                week: 1,
            },
            recycling_bin: Collection {
                day: bin_day.to_string(),
                week: 0,
            },
            recycling_box: Collection {
                day: box_day.to_string(),
                week: 0,
            },
            garden: None,
        }
    }

    #[test]
    fn same_day_collections_use_same_collection_layout() {
        let card = CalendarCard::new(calendar_record("Monday", "Monday"));
        assert_eq!(card.layout(), CalendarLayout::SameCollection);
    }

    #[test]
    fn different_day_collections_select_unfinished_layout() {
        let card = CalendarCard::new(calendar_record("Monday", "Friday"));
        assert_eq!(card.layout(), CalendarLayout::DifferentCollection);
    }
}
