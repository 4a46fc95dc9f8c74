//! SVG rendering of the dashboard traces.
//!
//! Each public function returns the complete SVG document as a string.
//! Empty traces are refused with [`ChartError::NoData`] so the caller can
//! show a "no data" panel instead of an empty frame.

use chrono::{NaiveDate, TimeDelta};
use log::debug;
use owid_core::date_range::DateBounds;
use owid_data::models::{DateValue, DualAxisPoint};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::ops::Range;

use crate::error::ChartError;

pub const CHART_SIZE: (u32, u32) = (800, 600);

type SvgResult = Result<(), DrawingAreaErrorKind<std::io::Error>>;

/// Axis labels for a dual-axis chart.
#[derive(Debug, Clone, Copy)]
pub struct AxisLabels<'a> {
    pub primary: &'a str,
    pub secondary: &'a str,
}

/// x axis covering every date, widened by a day so the last bar fits.
fn date_axis(bounds: DateBounds) -> RangedDate<NaiveDate> {
    let range = Range {
        start: bounds.first,
        end: bounds.last + TimeDelta::days(1),
    };
    range.into()
}

/// y axis from min(0, values) up to the maximum plus a fifth of headroom.
fn value_axis<I: Iterator<Item = f64>>(values: I) -> Range<f64> {
    let (low, high) = values.fold((0f64, 0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let headroom = if high > 0.0 { high / 5.0 } else { 1.0 };
    low..high + headroom
}

fn bounds_of(title: &str, dates: impl Iterator<Item = NaiveDate>) -> Result<DateBounds, ChartError> {
    DateBounds::from_dates(dates).ok_or_else(|| ChartError::NoData(title.to_string()))
}

/// Single line over time, e.g. cumulative cases.
pub fn line_chart(title: &str, points: &[DateValue]) -> Result<String, ChartError> {
    let bounds = bounds_of(title, points.iter().map(|p| p.date))?;
    let mut svg = String::new();
    draw_line_chart(&mut svg, title, bounds, points)?;
    debug!("line chart {:?}: {} points", title, points.len());
    Ok(svg)
}

fn draw_line_chart(
    svg: &mut String,
    title: &str,
    bounds: DateBounds,
    points: &[DateValue],
) -> SvgResult {
    let root = SVGBackend::with_string(svg, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24).into_font())
        .margin(20i32)
        .x_label_area_size(30u32)
        .y_label_area_size(70u32)
        .build_cartesian_2d(date_axis(bounds), value_axis(points.iter().map(|p| p.value)))?;
    chart.configure_mesh().x_labels(10_usize).draw()?;

    chart
        .draw_series(LineSeries::new(points.iter().map(|p| (p.date, p.value)), RED))?
        .label(title)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.7))
        .draw()?;
    root.present()?;
    Ok(())
}

/// One bar per day, with an optional smoothed line drawn over the bars.
pub fn bar_chart(title: &str, bars: &[DateValue], smoothed: &[DateValue]) -> Result<String, ChartError> {
    let bounds = bounds_of(title, bars.iter().chain(smoothed).map(|p| p.date))?;
    let mut svg = String::new();
    draw_bar_chart(&mut svg, title, bounds, bars, smoothed)?;
    debug!("bar chart {:?}: {} bars", title, bars.len());
    Ok(svg)
}

fn draw_bar_chart(
    svg: &mut String,
    title: &str,
    bounds: DateBounds,
    bars: &[DateValue],
    smoothed: &[DateValue],
) -> SvgResult {
    let root = SVGBackend::with_string(svg, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let y_axis = value_axis(bars.iter().chain(smoothed).map(|p| p.value));
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24).into_font())
        .margin(20i32)
        .x_label_area_size(30u32)
        .y_label_area_size(70u32)
        .build_cartesian_2d(date_axis(bounds), y_axis)?;
    chart.configure_mesh().x_labels(10_usize).draw()?;

    chart
        .draw_series(bars.iter().map(|p| {
            Rectangle::new(
                [(p.date, 0.0), (p.date + TimeDelta::days(1), p.value)],
                BLUE.mix(0.5).filled(),
            )
        }))?
        .label(title)
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], BLUE.mix(0.5).filled()));

    if !smoothed.is_empty() {
        chart
            .draw_series(LineSeries::new(
                smoothed.iter().map(|p| (p.date, p.value)),
                RED.stroke_width(2),
            ))?
            .label("7-day average")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.7))
        .draw()?;
    root.present()?;
    Ok(())
}

/// Two lines sharing the date axis, each with its own y axis.
///
/// Dates where a side has no value are skipped on that side only.
pub fn dual_axis_chart(
    title: &str,
    labels: AxisLabels<'_>,
    points: &[DualAxisPoint],
) -> Result<String, ChartError> {
    let bounds = bounds_of(title, points.iter().map(|p| p.date))?;
    let mut svg = String::new();
    draw_dual_axis_chart(&mut svg, title, labels, bounds, points)?;
    debug!("dual axis chart {:?}: {} points", title, points.len());
    Ok(svg)
}

fn draw_dual_axis_chart(
    svg: &mut String,
    title: &str,
    labels: AxisLabels<'_>,
    bounds: DateBounds,
    points: &[DualAxisPoint],
) -> SvgResult {
    let primary: Vec<(NaiveDate, f64)> = points
        .iter()
        .filter_map(|p| p.primary.map(|v| (p.date, v)))
        .collect();
    let secondary: Vec<(NaiveDate, f64)> = points
        .iter()
        .filter_map(|p| p.secondary.map(|v| (p.date, v)))
        .collect();

    let root = SVGBackend::with_string(svg, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24).into_font())
        .margin(20i32)
        .x_label_area_size(30u32)
        .y_label_area_size(70u32)
        .right_y_label_area_size(70u32)
        .build_cartesian_2d(date_axis(bounds), value_axis(primary.iter().map(|p| p.1)))?
        .set_secondary_coord(date_axis(bounds), value_axis(secondary.iter().map(|p| p.1)));

    chart
        .configure_mesh()
        .x_labels(10_usize)
        .y_desc(labels.primary)
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc(labels.secondary)
        .draw()?;

    chart
        .draw_series(LineSeries::new(primary, BLUE))?
        .label(labels.primary)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_secondary_series(LineSeries::new(secondary, RED))?
        .label(labels.secondary)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.7))
        .draw()?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn trace() -> Vec<DateValue> {
        (1..=5)
            .map(|d| DateValue {
                date: day(d),
                value: (d * 10) as f64,
            })
            .collect()
    }

    #[test]
    fn test_value_axis_headroom() {
        assert_eq!(value_axis(vec![10.0, 50.0].into_iter()), 0.0..60.0);
        assert_eq!(value_axis(Vec::new().into_iter()), 0.0..1.0);
        assert_eq!(value_axis(vec![-5.0, 10.0].into_iter()), -5.0..12.0);
    }

    #[test]
    fn test_line_chart_svg() {
        let svg = line_chart("Total cases", &trace()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Total cases"));
    }

    #[test]
    fn test_bar_chart_single_day() {
        let bars = vec![DateValue {
            date: day(1),
            value: 3.0,
        }];
        let svg = bar_chart("New cases", &bars, &[]).unwrap();
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_empty_trace_is_no_data() {
        let err = line_chart("Total cases", &[]).unwrap_err();
        assert!(matches!(err, ChartError::NoData(_)));
        assert!(bar_chart("New cases", &[], &[]).is_err());
    }

    #[test]
    fn test_dual_axis_chart_with_gaps() {
        let points: Vec<DualAxisPoint> = (1..=4)
            .map(|d| DualAxisPoint {
                date: day(d),
                primary: Some(d as f64),
                secondary: (d % 2 == 0).then_some(50.0),
            })
            .collect();
        let labels = AxisLabels {
            primary: "New cases (7-day)",
            secondary: "Stringency index",
        };
        let svg = dual_axis_chart("Stringency", labels, &points).unwrap();
        assert!(svg.contains("Stringency index"));
    }
}
