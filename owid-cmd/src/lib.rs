//! Command implementations for the OWID dashboard CLI.
//!
//! Every data command loads the dataset (from a local copy or the published
//! URL), runs the pure transformations from `owid-data`, and writes the
//! result to stdout or a file.

use chrono::NaiveDate;
use clap::Subcommand;
use owid_core::field::TOTAL_CASES;
use owid_core::source::DEFAULT_SOURCE_URL;
use std::path::PathBuf;

pub mod dashboard;
pub mod fetch;
pub mod inspect;
pub mod series;
pub mod source;

pub use series::{Format, Trace};
pub use source::SourceArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download the OWID CSV to a local file
    Fetch {
        /// Where to write the CSV
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Source URL
        #[arg(long, default_value = DEFAULT_SOURCE_URL)]
        url: String,
    },

    /// List the locations in the dataset
    Locations {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List the fields selectable as a lethality factor
    Factors {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print headline figures for a location
    Summary {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(short = 'l', long)]
        location: String,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        until: Option<NaiveDate>,
    },

    /// Write one chart-ready trace for a location
    Series {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(short = 'l', long)]
        location: String,

        #[arg(short = 't', long, value_enum, default_value_t = Trace::Cumulative)]
        trace: Trace,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        until: Option<NaiveDate>,

        /// Field joined with lethality (only with --trace lethality)
        #[arg(long)]
        factor: Option<String>,

        #[arg(short = 'f', long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        /// Output file; stdout when omitted
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Write the per-location map layer as JSON
    Snapshot {
        #[command(flatten)]
        source: SourceArgs,

        /// Cumulative field to map
        #[arg(long, default_value = TOTAL_CASES)]
        field: String,

        /// Extra locations to leave off the map (repeatable)
        #[arg(short = 'x', long)]
        exclude: Vec<String>,

        /// Keep World, continents and income groups
        #[arg(long)]
        keep_aggregates: bool,

        /// Output file; stdout when omitted
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Render every dashboard panel for a selection into a directory
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(short = 'l', long)]
        location: String,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        until: Option<NaiveDate>,

        /// Field correlated against lethality
        #[arg(long)]
        factor: Option<String>,

        /// Field shown on the map
        #[arg(long)]
        map_field: Option<String>,

        /// Directory for the SVG and JSON files
        #[arg(short = 'o', long)]
        out_dir: PathBuf,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Fetch { output, url } => fetch::run_fetch(&url, &output).await,
        Command::Locations { source } => {
            let dataset = source.load().await?;
            inspect::print_locations(&dataset);
            Ok(())
        }
        Command::Factors { source } => {
            let dataset = source.load().await?;
            inspect::print_factors(&dataset);
            Ok(())
        }
        Command::Summary {
            source,
            location,
            until,
        } => {
            let dataset = source.load().await?;
            inspect::print_summary(&dataset, &location, until)
        }
        Command::Series {
            source,
            location,
            trace,
            until,
            factor,
            format,
            output,
        } => {
            let dataset = source.load().await?;
            let request = series::SeriesRequest {
                location,
                trace,
                until,
                factor,
            };
            let body = series::render_series(&dataset, &request, format)?;
            write_output(output.as_deref(), &body)
        }
        Command::Snapshot {
            source,
            field,
            exclude,
            keep_aggregates,
            output,
        } => {
            let dataset = source.load().await?;
            let body = series::render_snapshot(&dataset, &field, &exclude, keep_aggregates)?;
            write_output(output.as_deref(), &body)
        }
        Command::Dashboard {
            source,
            location,
            until,
            factor,
            map_field,
            out_dir,
        } => {
            let dataset = source.load().await?;
            let selection = owid_data::Selection {
                location,
                cutoff: until,
                factor,
                map_field,
            };
            dashboard::write_dashboard(&dataset, &selection, &out_dir).map(|_| ())
        }
    }
}

/// Write to a file, or stdout when no path is given.
pub fn write_output(output: Option<&std::path::Path>, body: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match output {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => print!("{}", body),
    }
    Ok(())
}
