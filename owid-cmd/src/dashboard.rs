//! Render every dashboard panel for one selection to files.
//!
//! ```text
//! out_dir/
//!   cumulative_cases.svg
//!   new_cases.svg
//!   stringency.svg
//!   lethality.svg
//!   map.json
//!   summary.json     (headline figures, or the no-data state)
//!   view.json        (the full view model, including no-data states)
//! ```

use anyhow::Context;
use log::{info, warn};
use owid_chart::svg::{bar_chart, dual_axis_chart, line_chart, AxisLabels};
use owid_chart::{map::choropleth_json, ChartError};
use owid_core::Dataset;
use owid_data::models::DualAxisPoint;
use owid_data::{render_pass, DashboardView, DisplayState, Selection};
use std::path::{Path, PathBuf};

/// One output file. `ChartError::NoData` content means the panel had nothing to show.
struct Panel {
    file_name: &'static str,
    content: Result<String, ChartError>,
}

fn lethality_panel(view: &DashboardView) -> Result<String, ChartError> {
    match &view.factor {
        Some(DisplayState::Ready(factor)) => {
            let points: Vec<DualAxisPoint> = factor
                .points
                .iter()
                .map(|p| DualAxisPoint {
                    date: p.date,
                    primary: Some(p.lethality),
                    secondary: p.factor,
                })
                .collect();
            let labels = AxisLabels {
                primary: "Lethality",
                secondary: &factor.factor,
            };
            dual_axis_chart(&format!("Lethality vs {}", factor.factor), labels, &points)
        }
        Some(DisplayState::NoData { reason }) => Err(ChartError::NoData(reason.clone())),
        None => line_chart("Lethality", &view.lethality),
    }
}

fn panels(view: &DashboardView) -> Vec<Panel> {
    let location = &view.selection.location;
    let stringency_labels = AxisLabels {
        primary: "New cases (7-day average)",
        secondary: "Stringency index",
    };
    let map = match &view.map {
        DisplayState::Ready(layer) => choropleth_json(&layer.field, &layer.values),
        DisplayState::NoData { reason } => Err(ChartError::NoData(reason.clone())),
    };
    vec![
        Panel {
            file_name: "cumulative_cases.svg",
            content: line_chart(&format!("Total cases: {}", location), &view.cumulative_cases),
        },
        Panel {
            file_name: "new_cases.svg",
            content: bar_chart(
                &format!("New cases: {}", location),
                &view.new_cases,
                &view.new_cases_smoothed,
            ),
        },
        Panel {
            file_name: "stringency.svg",
            content: dual_axis_chart(
                &format!("Stringency: {}", location),
                stringency_labels,
                &view.stringency,
            ),
        },
        Panel {
            file_name: "lethality.svg",
            content: lethality_panel(view),
        },
        Panel {
            file_name: "map.json",
            content: map,
        },
    ]
}

/// Write the panels that have data, plus `summary.json` and `view.json`.
/// Returns written paths.
pub fn write_dashboard(
    dataset: &Dataset,
    selection: &Selection,
    out_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let view = render_pass(dataset, selection);
    if let DisplayState::NoData { reason } = &view.summary {
        println!("{}", reason);
    }

    let mut written = Vec::new();
    for panel in panels(&view) {
        match panel.content {
            Ok(body) => {
                let path = out_dir.join(panel.file_name);
                std::fs::write(&path, body)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                written.push(path);
            }
            Err(ChartError::NoData(reason)) => {
                warn!("Skipping {}: {}", panel.file_name, reason);
            }
            Err(e) => return Err(e).context(panel.file_name),
        }
    }

    for (file_name, body) in [
        ("summary.json", serde_json::to_string_pretty(&view.summary)?),
        ("view.json", serde_json::to_string_pretty(&view)?),
    ] {
        let path = out_dir.join(file_name);
        std::fs::write(&path, body)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    info!(
        "Dashboard for {} written to {} ({} files)",
        selection.location,
        out_dir.display(),
        written.len()
    );
    Ok(written)
}
