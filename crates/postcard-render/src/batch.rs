//! Batch orchestrator - drives the whole render pipeline
//!
//! Groups the batch into fours, renders both faces for every group and
//! persists the two composed sheets. Groups share nothing but the output
//! directory, and filenames are collision-free by construction, so an error
//! aborts the run while every already-persisted sheet stays valid.

use image::RgbImage;
use std::path::PathBuf;
use tracing::info;

use crate::assets::Assets;
use crate::card::{AddressCard, CalendarCard, Card};
use crate::layout::flip_group;
use crate::options::RenderOptions;
use crate::sheet::{compose_sheet, save_sheet, sheet_filename};
use crate::source::{RecordSource, with_retry};
use crate::types::{Result, SheetSide, Uprn};

/// What a batch run produced.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    /// Every persisted sheet, in production order
    pub sheets: Vec<PathBuf>,
    /// Number of size-4 groups processed
    pub groups: usize,
    /// Trailing UPRNs that didn't fill a group and were skipped.
    /// The reconcile pass reports these from the output side too.
    pub dropped: Vec<Uprn>,
}

/// Split the batch into groups of exactly four. The remainder is dropped,
/// not padded - the sheets hold four cards and a partially blank sheet
/// would go straight to the guillotine.
pub fn group_uprns(uprns: &[Uprn]) -> (Vec<[Uprn; 4]>, Vec<Uprn>) {
    let groups = uprns
        .chunks_exact(4)
        .map(|chunk| {
            [
                chunk[0].clone(),
                chunk[1].clone(),
                chunk[2].clone(),
                chunk[3].clone(),
            ]
        })
        .collect();
    let dropped = uprns.chunks_exact(4).remainder().to_vec();
    (groups, dropped)
}

/// Run the full batch: fetch, render and persist every group's sheet pair.
pub async fn generate<S>(source: S, assets: Assets, options: RenderOptions) -> Result<BatchOutput>
where
    S: RecordSource + Send + 'static,
{
    options.validate()?;

    // Rendering is CPU-bound, spawn blocking
    tokio::task::spawn_blocking(move || generate_sync(&source, &assets, &options)).await?
}

fn generate_sync(
    source: &dyn RecordSource,
    assets: &Assets,
    options: &RenderOptions,
) -> Result<BatchOutput> {
    std::fs::create_dir_all(&options.out_dir)?;

    let uprns = with_retry(options, || source.uprns())?;
    let (groups, dropped) = group_uprns(&uprns);
    if !dropped.is_empty() {
        info!(
            "batch of {} leaves {} UPRN(s) outside a full group",
            uprns.len(),
            dropped.len()
        );
    }

    let mut output = BatchOutput {
        groups: groups.len(),
        dropped,
        ..Default::default()
    };

    for (number, group) in groups.iter().enumerate() {
        let address_path = render_side(group, SheetSide::Address, source, assets, options)?;
        info!("{}: {}", number + 1, address_path.display());
        output.sheets.push(address_path);

        let calendar_path = render_side(group, SheetSide::Calendar, source, assets, options)?;
        info!("{}: {}", number + 1, calendar_path.display());
        output.sheets.push(calendar_path);
    }

    Ok(output)
}

/// Render and persist one side's sheet for one group.
fn render_side(
    group: &[Uprn; 4],
    side: SheetSide,
    source: &dyn RecordSource,
    assets: &Assets,
    options: &RenderOptions,
) -> Result<PathBuf> {
    let cards = match side {
        SheetSide::Address => {
            let mut cards = Vec::with_capacity(4);
            for uprn in group {
                let record = with_retry(options, || source.address(uprn))?;
                cards.push(Box::new(AddressCard::new(record)) as Box<dyn Card>)
            }
            cards
        }
        SheetSide::Calendar => {
            // The calendar side is pair-swapped so the two sheets line up
            // when printed back to back
            let mut cards = Vec::with_capacity(4);
            for uprn in flip_group(group) {
                let record = with_retry(options, || source.calendar(&uprn))?;
                cards.push(Box::new(CalendarCard::new(record)) as Box<dyn Card>)
            }
            cards
        }
    };

    let images: [RgbImage; 4] = [
        cards[0].render(1, assets, options)?,
        cards[1].render(2, assets, options)?,
        cards[2].render(3, assets, options)?,
        cards[3].render(4, assets, options)?,
    ];

    let sheet = compose_sheet(&images, &assets.blank_sheet);
    // Filenames always use the original group order, whatever permutation
    // the side applied internally
    let filename = sheet_filename(group, side)?;
    save_sheet(&sheet, &filename, &options.out_dir, options.jpeg_quality)
}
