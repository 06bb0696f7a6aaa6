//! Property records and the display strings derived from them

use crate::options::RenderOptions;
use crate::types::{RenderError, Result, Uprn};

/// Royal Mail standard address of a property.
#[derive(Debug, Clone)]
pub struct AddressRecord {
    pub uprn: Uprn,
    /// Address block with embedded newlines, one line per address element.
    pub address_block: String,
}

/// One waste stream's collection slot: the weekday it runs plus the week
/// offset inside the collection cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub day: String,
    pub week: u32,
}

/// Collection schedule for a property. Garden waste is optional - plenty of
/// properties simply have no garden collection.
#[derive(Debug, Clone)]
pub struct CalendarRecord {
    pub uprn: Uprn,
    pub refuse: Collection,
    pub recycling_bin: Collection,
    pub recycling_box: Collection,
    pub garden: Option<Collection>,
}

/// The four strings stamped onto a calendar card, one per waste stream.
#[derive(Debug, Clone)]
pub struct CalendarStrings {
    pub refuse: String,
    pub recycling_bin: String,
    /// Empty when the box is collected on the same day as the bin; the
    /// region is then left blank on the card.
    pub recycling_box: String,
    pub garden: String,
}

/// Map a collection day name to its offset from the start of the week.
/// Collections only run Monday to Friday.
pub fn weekday_index(uprn: &Uprn, day: &str) -> Result<u32> {
    match day {
        "Monday" => Ok(0),
        "Tuesday" => Ok(1),
        "Wednesday" => Ok(2),
        "Thursday" => Ok(3),
        "Friday" => Ok(4),
        other => Err(RenderError::UnknownDay {
            uprn: uprn.clone(),
            day: other.to_string(),
        }),
    }
}

impl CalendarRecord {
    /// Format the display strings to match the card design.
    ///
    /// Each stream reads `"<Day>   from   <date> <period label>"` where the
    /// date is the day's offset into the print run's calendar period:
    /// `week * 7 + weekday_index + epoch_day_offset`.
    pub fn display_strings(&self, options: &RenderOptions) -> Result<CalendarStrings> {
        let refuse = self.stream_string(&self.refuse, options)?;
        let recycling_bin = self.stream_string(&self.recycling_bin, options)?;

        // Same-day box collections are suppressed rather than repeated
        let recycling_box = if self.recycling_box.day == self.recycling_bin.day {
            String::new()
        } else {
            self.stream_string(&self.recycling_box, options)?
        };

        let garden = match &self.garden {
            Some(collection) => self.stream_string(collection, options)?,
            None => "Not collected".to_string(),
        };

        Ok(CalendarStrings {
            refuse,
            recycling_bin,
            recycling_box,
            garden,
        })
    }

    fn stream_string(&self, collection: &Collection, options: &RenderOptions) -> Result<String> {
        let date = collection.week * 7
            + weekday_index(&self.uprn, &collection.day)?
            + options.epoch_day_offset;
        Ok(format!(
            "{}   from   {} {}",
            collection.day, date, options.period_label
        ))
    }
}
