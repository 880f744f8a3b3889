use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use std::io::Write;

use super::AggregateSink;
use crate::error::{Result, TrainLoadError};
use crate::models::{MonthlyAggregate, PaceExtremes};
use crate::pace::format_pace;

/// SVG chart: monthly mileage bars above monthly base pace points
#[derive(Debug, Clone)]
pub struct ChartSink {
    width: u32,
    height: u32,
}

impl ChartSink {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ChartSink {
    fn default() -> Self {
        Self::new(1280, 900)
    }
}

fn chart_error<E: std::fmt::Display>(e: E) -> TrainLoadError {
    TrainLoadError::Export {
        path: "<svg>".into(),
        reason: format!("plotting error: {}", e),
    }
}

fn month_label(labels: &[String], x: f64) -> String {
    if x < 0.0 || x.fract() != 0.0 {
        return String::new();
    }
    labels.get(x as usize).cloned().unwrap_or_default()
}

fn pace_range_start(paces: &[(f64, f64)]) -> f64 {
    let min_pace = paces.iter().map(|(_, p)| *p).fold(f64::MAX, f64::min);
    if paces.is_empty() {
        0.0
    } else {
        (min_pace - 0.5).max(0.0)
    }
}

/// (x, minutes per mile, label) for the fastest and slowest base pace months
fn extreme_marks(aggregates: &[MonthlyAggregate]) -> Vec<(f64, f64, String)> {
    let Some(extremes) = PaceExtremes::from_aggregates(aggregates) else {
        return Vec::new();
    };
    let index_of = |date| {
        aggregates
            .iter()
            .position(|a| a.representative_date == date)
            .unwrap_or(0) as f64
    };

    let mut marks = vec![(
        index_of(extremes.fastest_date),
        extremes.fastest_pace_seconds / 60.0,
        format!(
            "Fastest {} ({})",
            format_pace(extremes.fastest_pace_seconds),
            extremes.fastest_date.format("%Y-%m")
        ),
    )];
    if extremes.slowest_date != extremes.fastest_date {
        marks.push((
            index_of(extremes.slowest_date),
            extremes.slowest_pace_seconds / 60.0,
            format!(
                "Slowest {} ({})",
                format_pace(extremes.slowest_pace_seconds),
                extremes.slowest_date.format("%Y-%m")
            ),
        ));
    }
    marks
}

impl ChartSink {
    fn render(&self, aggregates: &[MonthlyAggregate]) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(chart_error)?;
            let (upper, lower) = root.split_vertically(self.height / 2);

            let labels: Vec<String> = aggregates
                .iter()
                .map(|a| a.representative_date.format("%Y-%m").to_string())
                .collect();
            let x_range = -0.5f64..(aggregates.len() as f64 - 0.5).max(0.5);

            let miles: Vec<f64> = aggregates
                .iter()
                .map(|a| a.cumulative_distance_miles.to_f64().unwrap_or(0.0))
                .collect();
            let max_miles = miles.iter().copied().fold(0.0, f64::max).max(1.0);

            let mut mileage = ChartBuilder::on(&upper)
                .caption("Monthly Mileage", ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(x_range.clone(), 0f64..max_miles * 1.1)
                .map_err(chart_error)?;

            mileage
                .configure_mesh()
                .x_labels(labels.len().max(1))
                .x_label_formatter(&|x| month_label(&labels, *x))
                .y_desc("Total Miles")
                .draw()
                .map_err(chart_error)?;

            mileage
                .draw_series(miles.iter().enumerate().map(|(i, m)| {
                    let x = i as f64;
                    Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *m)], BLUE.mix(0.6).filled())
                }))
                .map_err(chart_error)?;

            // minutes per mile
            let paces: Vec<(f64, f64)> = aggregates
                .iter()
                .enumerate()
                .filter_map(|(i, a)| a.base_run_avg_pace_seconds.map(|p| (i as f64, p / 60.0)))
                .collect();
            let max_pace = paces.iter().map(|(_, p)| *p).fold(0.0, f64::max);
            let pace_range = if paces.is_empty() {
                0.0..1.0
            } else {
                pace_range_start(&paces)..max_pace + 0.5
            };

            let mut pace = ChartBuilder::on(&lower)
                .caption("Monthly Base Pace", ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(x_range, pace_range)
                .map_err(chart_error)?;

            pace.configure_mesh()
                .x_labels(labels.len().max(1))
                .x_label_formatter(&|x| month_label(&labels, *x))
                .y_desc("Base Pace (min/mile)")
                .draw()
                .map_err(chart_error)?;

            pace.draw_series(
                paces
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 5, RED.filled())),
            )
            .map_err(chart_error)?;

            let floor = pace_range_start(&paces);
            let marks = extreme_marks(aggregates);
            pace.draw_series(marks.iter().map(|(x, y, _)| {
                PathElement::new(vec![(*x, floor), (*x, *y)], BLACK.mix(0.5))
            }))
            .map_err(chart_error)?;
            pace.draw_series(marks.iter().map(|(x, y, label)| {
                Text::new(label.clone(), (*x + 0.1, *y), ("sans-serif", 14).into_font())
            }))
            .map_err(chart_error)?;

            root.present().map_err(chart_error)?;
        }
        Ok(svg)
    }
}

impl AggregateSink for ChartSink {
    fn write_to(&self, aggregates: &[MonthlyAggregate], out: &mut dyn Write) -> Result<()> {
        let svg = self.render(aggregates)?;
        out.write_all(svg.as_bytes())?;
        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "svg chart"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn month(month: u32, miles: Decimal, base_pace: Option<f64>) -> MonthlyAggregate {
        MonthlyAggregate {
            year: 2021,
            month,
            representative_date: NaiveDate::from_ymd_opt(2021, month, 3).unwrap(),
            activity_count: 4,
            cumulative_distance_miles: miles,
            cumulative_duration_minutes: 300,
            cumulative_duration_hours: dec!(5),
            base_run_avg_pace_seconds: base_pace,
            base_run_avg_heart_rate: base_pace.map(|_| 138.0),
            base_run_avg_pace_display: base_pace.map(format_pace),
            fast_run_avg_pace_seconds: None,
            fast_run_avg_heart_rate: None,
            fast_run_avg_pace_display: None,
        }
    }

    fn render(aggregates: &[MonthlyAggregate]) -> String {
        let mut out = Vec::new();
        ChartSink::default().write_to(aggregates, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_renders_svg_with_pace_extremes() {
        let aggregates = vec![
            month(1, dec!(42.5), Some(600.0)),
            month(2, dec!(51.0), Some(500.0)),
            month(3, dec!(38.2), None),
            month(4, dec!(60.4), Some(640.0)),
        ];

        let svg = render(&aggregates);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Monthly Mileage"));
        assert!(svg.contains("Fastest 8:20 (2021-02)"));
        assert!(svg.contains("Slowest 10:40 (2021-04)"));
    }

    #[test]
    fn test_extreme_marks() {
        let aggregates = vec![month(5, dec!(10), Some(540.0)), month(6, dec!(12), None)];
        let marks = extreme_marks(&aggregates);

        // A single paced month is both fastest and slowest; label it once
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].0, 0.0);
        assert_eq!(marks[0].1, 9.0);

        assert!(extreme_marks(&[month(7, dec!(3), None)]).is_empty());
    }

    #[test]
    fn test_renders_without_any_base_pace() {
        let svg = render(&[month(3, dec!(20), None)]);
        assert!(svg.contains("Monthly Base Pace"));
        assert!(!svg.contains("Fastest"));
    }

    #[test]
    fn test_month_label_only_on_whole_indices() {
        let labels = vec!["2021-01".to_string(), "2021-02".to_string()];
        assert_eq!(month_label(&labels, 1.0), "2021-02");
        assert_eq!(month_label(&labels, 0.5), "");
        assert_eq!(month_label(&labels, -1.0), "");
        assert_eq!(month_label(&labels, 7.0), "");
    }
}
