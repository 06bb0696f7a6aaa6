//! Record source - the data-access boundary
//!
//! The pipeline only sees the [`RecordSource`] trait; the shipped
//! implementation reads a CSV export of the gazetteer query, one row per
//! property. Fetches go through [`with_retry`] so a transient source
//! failure gets a few chances before it aborts the run.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::options::RenderOptions;
use crate::record::{AddressRecord, CalendarRecord, Collection};
use crate::types::{RenderError, Result, Uprn};

/// Source of property records, keyed by UPRN.
pub trait RecordSource {
    /// Every UPRN in the batch, in batch order.
    fn uprns(&self) -> Result<Vec<Uprn>>;

    /// Address data for one property.
    fn address(&self, uprn: &Uprn) -> Result<AddressRecord>;

    /// Collection schedule for one property. A missing garden day is a
    /// valid "not collected" state, not an error.
    fn calendar(&self, uprn: &Uprn) -> Result<CalendarRecord>;
}

/// One row of the CSV export.
#[derive(Debug, Clone, Deserialize)]
struct Row {
    uprn: String,
    address_block: String,
    refuse_day: String,
    refuse_week: u32,
    bin_day: String,
    bin_week: u32,
    box_day: String,
    box_week: u32,
    garden_day: Option<String>,
    garden_week: Option<u32>,
}

/// [`RecordSource`] over a CSV export with columns
/// `uprn,address_block,refuse_day,refuse_week,bin_day,bin_week,box_day,box_week,garden_day,garden_week`.
pub struct CsvRecordSource {
    order: Vec<Uprn>,
    rows: HashMap<Uprn, Row>,
}

impl CsvRecordSource {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;

        // CSV parsing is CPU-bound, spawn blocking
        let source = tokio::task::spawn_blocking(move || Self::from_csv_str(&contents)).await??;
        Ok(source)
    }

    fn from_csv_str(contents: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(contents.as_bytes());
        let mut order = Vec::new();
        let mut rows = HashMap::new();

        for result in reader.deserialize() {
            let row: Row = result?;
            let uprn = Uprn::new(row.uprn.clone());
            order.push(uprn.clone());
            rows.insert(uprn, row);
        }

        Ok(Self { order, rows })
    }

    fn row(&self, uprn: &Uprn) -> Result<&Row> {
        self.rows
            .get(uprn)
            .ok_or_else(|| RenderError::RecordNotFound(uprn.clone()))
    }
}

impl RecordSource for CsvRecordSource {
    fn uprns(&self) -> Result<Vec<Uprn>> {
        Ok(self.order.clone())
    }

    fn address(&self, uprn: &Uprn) -> Result<AddressRecord> {
        let row = self.row(uprn)?;
        if row.address_block.trim().is_empty() {
            return Err(RenderError::MissingField {
                uprn: uprn.clone(),
                field: "address_block",
            });
        }
        Ok(AddressRecord {
            uprn: uprn.clone(),
            // The export carries <br> separators rather than raw newlines
            address_block: row.address_block.replace("<br>", "\n"),
        })
    }

    fn calendar(&self, uprn: &Uprn) -> Result<CalendarRecord> {
        let row = self.row(uprn)?;
        let required = |value: &str, field: &'static str| -> Result<String> {
            if value.trim().is_empty() {
                Err(RenderError::MissingField {
                    uprn: uprn.clone(),
                    field,
                })
            } else {
                Ok(value.to_string())
            }
        };

        let garden = match &row.garden_day {
            Some(day) if !day.trim().is_empty() => Some(Collection {
                day: day.clone(),
                week: row.garden_week.unwrap_or(0),
            }),
            _ => None,
        };

        Ok(CalendarRecord {
            uprn: uprn.clone(),
            refuse: Collection {
                day: required(&row.refuse_day, "refuse_day")?,
                week: row.refuse_week,
            },
            recycling_bin: Collection {
                day: required(&row.bin_day, "bin_day")?,
                week: row.bin_week,
            },
            recycling_box: Collection {
                day: required(&row.box_day, "box_day")?,
                week: row.box_week,
            },
            garden,
        })
    }
}

/// Run a record fetch, retrying transient failures with a fixed delay.
/// Data errors (missing fields, unknown records) fail immediately - a retry
/// cannot fix those.
pub fn with_retry<T>(options: &RenderOptions, mut fetch: impl FnMut() -> Result<T>) -> Result<T> {
    let attempts = options.retry_count.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match fetch() {
            Ok(value) => return Ok(value),
            Err(err @ (RenderError::Source(_) | RenderError::Io(_))) => {
                warn!("record fetch attempt {}/{} failed: {}", attempt, attempts, err);
                last_error = Some(err);
                if attempt < attempts {
                    std::thread::sleep(std::time::Duration::from_millis(options.retry_delay_ms));
                }
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_error.unwrap_or_else(|| RenderError::Source("retry exhausted".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const CSV: &str = "\
uprn,address_block,refuse_day,refuse_week,bin_day,bin_week,box_day,box_week,garden_day,garden_week
100010001,1 High Street<br>Testtown<br>TE5 7AB,Wednesday,1,Monday,0,Monday,0,Friday,1
100010002,2 High Street<br>Testtown<br>TE5 7AB,Thursday,0,Tuesday,1,Tuesday,1,,
100010003,,Monday,0,Monday,0,Monday,0,,
";

    fn source() -> CsvRecordSource {
        CsvRecordSource::from_csv_str(CSV).unwrap()
    }

    #[test]
    fn uprns_keep_batch_order() {
        let uprns = source().uprns().unwrap();
        assert_eq!(
            uprns,
            vec![
                Uprn::from("100010001"),
                Uprn::from("100010002"),
                Uprn::from("100010003"),
            ]
        );
    }

    #[test]
    fn address_converts_br_to_newlines() {
        let record = source().address(&Uprn::from("100010001")).unwrap();
        assert_eq!(record.address_block, "1 High Street\nTesttown\nTE5 7AB");
    }

    #[test]
    fn empty_address_block_is_a_missing_field() {
        let err = source().address(&Uprn::from("100010003")).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingField {
                field: "address_block",
                ..
            }
        ));
    }

    #[test]
    fn empty_garden_day_means_not_collected() {
        let record = source().calendar(&Uprn::from("100010002")).unwrap();
        assert!(record.garden.is_none());

        let record = source().calendar(&Uprn::from("100010001")).unwrap();
        assert_eq!(
            record.garden,
            Some(Collection {
                day: "Friday".to_string(),
                week: 1,
            })
        );
    }

    #[test]
    fn unknown_uprn_is_not_found() {
        let err = source().calendar(&Uprn::from("999999999")).unwrap_err();
        assert!(matches!(err, RenderError::RecordNotFound(_)));
    }

    fn fast_retry() -> RenderOptions {
        RenderOptions {
            retry_count: 3,
            retry_delay_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn retry_recovers_from_transient_failures() {
        let calls = Cell::new(0);
        let result = with_retry(&fast_retry(), || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(RenderError::Source("connection reset".to_string()))
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn retry_gives_up_after_the_configured_attempts() {
        let calls = Cell::new(0);
        let result: Result<()> = with_retry(&fast_retry(), || {
            calls.set(calls.get() + 1);
            Err(RenderError::Source("down".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn data_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<()> = with_retry(&fast_retry(), || {
            calls.set(calls.get() + 1);
            Err(RenderError::RecordNotFound(Uprn::from("x")))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
