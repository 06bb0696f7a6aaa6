use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use postcard_merge::MergeOptions;
use postcard_render::{AssetPaths, Assets, CsvRecordSource, RenderOptions};

#[derive(Parser)]
#[command(name = "postcards", about = "Bin collection postcard generator", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render and persist sheet images for a batch of properties
    Generate {
        /// CSV export of the property records
        #[arg(short, long)]
        records: PathBuf,

        /// Directory the composed sheets are written to
        #[arg(short, long, default_value = "./out")]
        out_dir: PathBuf,

        /// Directory holding the card templates and fonts
        #[arg(long, default_value = "./in")]
        assets: PathBuf,

        /// Render options JSON; overrides the individual flags below
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Day-of-month of the Monday of week zero
        #[arg(long, default_value = "4")]
        epoch_offset: u32,

        /// Period label printed after the computed date
        #[arg(long, default_value = "June 2018")]
        period_label: String,

        /// Character width the calendar strings wrap at
        #[arg(long, default_value = "7")]
        wrap_width: usize,

        /// JPEG quality for persisted sheets
        #[arg(long, default_value = "95")]
        jpeg_quality: u8,
    },

    /// Merge persisted sheet images into numbered PDF documents
    Merge {
        /// Directory holding the sheet images
        #[arg(short, long, default_value = "./out")]
        sheets: PathBuf,

        /// Directory the PDF documents are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Maximum sheets per document
        #[arg(long, default_value = "150")]
        chunk_size: usize,

        /// Print resolution in DPI
        #[arg(long, default_value = "300")]
        dpi: f32,
    },

    /// Report expected UPRNs that never made it into a sheet
    Reconcile {
        /// Directory holding the sheet images
        #[arg(short, long, default_value = "./out")]
        sheets: PathBuf,

        /// Headerless CSV with the expected UPRNs in its first column
        #[arg(short, long)]
        expected: PathBuf,
    },
}

/// Resolve the fixed asset files inside the assets directory.
fn asset_paths(dir: &Path) -> AssetPaths {
    AssetPaths {
        address_template: dir.join("postcard-front.jpg"),
        calendar_template: dir.join("postcard-back-same-dates.jpg"),
        blank_sheet: dir.join("blank_sra3.jpg"),
        address_font: dir.join("arial.ttf"),
        calendar_font: dir.join("futura-bold-condensed-italic.ttf"),
        marker_font: dir.join("consola.ttf"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Generate {
            records,
            out_dir,
            assets,
            config,
            epoch_offset,
            period_label,
            wrap_width,
            jpeg_quality,
        } => {
            let options = match config {
                Some(path) => RenderOptions::load(path).await?,
                None => RenderOptions {
                    out_dir,
                    wrap_width,
                    epoch_day_offset: epoch_offset,
                    period_label,
                    jpeg_quality,
                    ..Default::default()
                },
            };

            let source = CsvRecordSource::load(&records).await?;
            let assets = Assets::load(&asset_paths(&assets)).await?;
            let output = postcard_render::generate(source, assets, options).await?;

            println!(
                "Generated {} sheets across {} groups",
                output.sheets.len(),
                output.groups
            );
            if !output.dropped.is_empty() {
                println!(
                    "Dropped {} UPRN(s) outside a full group: {}",
                    output.dropped.len(),
                    output
                        .dropped
                        .iter()
                        .map(|u| u.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }

        Commands::Merge {
            sheets,
            out_dir,
            chunk_size,
            dpi,
        } => {
            let options = MergeOptions { chunk_size, dpi };
            let documents = postcard_merge::merge(&sheets, &out_dir, options).await?;
            println!("Merged into {} document(s)", documents.len());
            for path in documents {
                println!("  {}", path.display());
            }
        }

        Commands::Reconcile { sheets, expected } => {
            let missing = postcard_merge::reconcile(&sheets, &expected).await?;
            if missing.is_empty() {
                println!("All expected UPRNs were processed");
            } else {
                println!("{} UPRN(s) never processed:", missing.len());
                for uprn in missing {
                    println!("  {}", uprn);
                }
            }
        }
    }

    Ok(())
}
