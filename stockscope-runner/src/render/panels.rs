use plotters::coord::combinators::{BindKeyPoints, WithKeyPoints};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

use stockscope_core::domain::Series;
use stockscope_core::indicators::{IndicatorSet, RetracementLevels};

use super::axis::{month_starts, thin_ticks, week_starts, TimeAxis};
use super::{backend, ChartOptions, RenderError};

type PriceChart<'a, DB> =
    ChartContext<'a, DB, Cartesian2d<WithKeyPoints<RangedCoordf64>, RangedCoordf64>>;

const CLOSE: RGBColor = RGBColor(31, 119, 180);
const VOLUME: RGBColor = RGBColor(44, 160, 44);
const GRID: RGBColor = RGBColor(150, 150, 150);
const FONT: &str = "sans-serif";
const MAX_MONTH_LABELS: usize = 24;

/// Everything the three panels share.
struct Frame {
    axis: TimeAxis,
    xs: Vec<f64>,
    closes: Vec<f64>,
    volumes: Vec<f64>,
    x_range: Range<f64>,
    months: Vec<f64>,
    /// Labelled x positions: month starts, thinned for long histories.
    month_ticks: Vec<f64>,
    weeks: Vec<f64>,
    time_zone: String,
}

impl Frame {
    /// Callers guarantee a non-empty series.
    fn new(series: &Series) -> Option<Self> {
        let first = series.first()?.date;
        let last = series.last()?.date;
        let axis = TimeAxis::new(first);

        let xs: Vec<f64> = series.bars().iter().map(|b| axis.position(b.date)).collect();
        let span = axis.position(last);
        let x_range = -1.0..span.max(0.0) + 1.0;

        let (start, end) = (first.date(), last.date());
        let months: Vec<f64> = month_starts(start, end)
            .into_iter()
            .map(|d| axis.position_of_date(d))
            .collect();
        let mut month_ticks = thin_ticks(&months, MAX_MONTH_LABELS);
        if month_ticks.is_empty() {
            month_ticks.push(0.0);
        }
        let weeks = week_starts(start, end)
            .into_iter()
            .map(|d| axis.position_of_date(d))
            .collect();

        Some(Self {
            axis,
            xs,
            closes: series.closes(),
            volumes: series.bars().iter().map(|b| b.volume).collect(),
            x_range,
            months,
            month_ticks,
            weeks,
            time_zone: series.time_zone().name().to_string(),
        })
    }

    fn close_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.closes.iter().copied())
    }
}

pub(super) fn draw(
    series: &Series,
    indicators: &IndicatorSet,
    levels: &RetracementLevels,
    destination: &Path,
    options: &ChartOptions,
) -> Result<(), RenderError> {
    let frame = Frame::new(series).ok_or(RenderError::EmptySeries)?;

    let root = BitMapBackend::new(destination, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(backend)?;

    let panels = root.split_evenly((3, 1));
    draw_retracement_panel(&panels[0], &frame, levels, &options.title)?;
    draw_volume_panel(&panels[1], &frame, &options.title)?;
    draw_average_panel(&panels[2], &frame, indicators, &options.title)?;

    root.present().map_err(backend)?;
    Ok(())
}

// ── a) close + retracement levels ────────────────────────────────────

fn draw_retracement_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    frame: &Frame,
    levels: &RetracementLevels,
    title: &str,
) -> Result<(), RenderError> {
    let y_range = padded(
        frame
            .closes
            .iter()
            .copied()
            .chain([levels.max, levels.min]),
    );
    let mut chart = build_chart(area, frame, y_range, &caption(title, "Fibonacci retracement"))?;
    configure_mesh(&mut chart, frame, "Price")?;

    chart
        .draw_series(LineSeries::new(frame.close_points(), CLOSE.stroke_width(2)))
        .map_err(backend)?
        .label("Close")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CLOSE.stroke_width(2)));

    let (x0, x1) = (frame.x_range.start, frame.x_range.end);
    for (i, level) in levels.iter().enumerate() {
        let style = Palette99::pick(i + 1).stroke_width(1);
        chart
            .draw_series(LineSeries::new(
                [(x0, level.price), (x1, level.price)],
                style,
            ))
            .map_err(backend)?
            .label(format!("{:.1}% ({:.2})", level.ratio * 100.0, level.price))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    draw_legend(&mut chart)
}

// ── b) volume ────────────────────────────────────────────────────────

fn draw_volume_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    frame: &Frame,
    title: &str,
) -> Result<(), RenderError> {
    let peak = frame.volumes.iter().copied().fold(0.0_f64, f64::max);
    let top = if peak > 0.0 { peak * 1.1 } else { 1.0 };
    let mut chart = build_chart(area, frame, 0.0..top, &caption(title, "Volume"))?;
    configure_mesh(&mut chart, frame, "Volume")?;

    let fill = VOLUME.mix(0.6).filled();
    chart
        .draw_series(
            frame
                .xs
                .iter()
                .zip(&frame.volumes)
                .map(|(&x, &v)| Rectangle::new([(x - 0.4, 0.0), (x + 0.4, v)], fill)),
        )
        .map_err(backend)?;
    Ok(())
}

// ── c) close + moving averages ───────────────────────────────────────

fn draw_average_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    frame: &Frame,
    indicators: &IndicatorSet,
    title: &str,
) -> Result<(), RenderError> {
    let averages: Vec<(usize, Vec<(f64, f64)>)> = indicators
        .windows()
        .into_iter()
        .map(|w| {
            let points = indicators
                .values(w)
                .unwrap_or_default()
                .iter()
                .zip(&frame.xs)
                .filter(|(v, _)| v.is_finite())
                .map(|(&v, &x)| (x, v))
                .collect();
            (w, points)
        })
        .collect();

    let y_range = padded(
        frame
            .closes
            .iter()
            .copied()
            .chain(averages.iter().flat_map(|(_, pts)| pts.iter().map(|p| p.1))),
    );
    let mut chart = build_chart(area, frame, y_range, &caption(title, "Moving averages"))?;
    configure_mesh(&mut chart, frame, "Price")?;

    chart
        .draw_series(LineSeries::new(frame.close_points(), CLOSE.stroke_width(2)))
        .map_err(backend)?
        .label("Close")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CLOSE.stroke_width(2)));

    for (i, (window, points)) in averages.into_iter().enumerate() {
        let style = Palette99::pick(i + 1).stroke_width(2);
        chart
            .draw_series(LineSeries::new(points, style))
            .map_err(backend)?
            .label(format!("MA-{window}"))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    draw_legend(&mut chart)
}

// ── Shared pieces ────────────────────────────────────────────────────

fn caption(title: &str, panel: &str) -> String {
    if title.is_empty() {
        panel.to_string()
    } else {
        format!("{title}: {panel}")
    }
}

fn build_chart<'a, DB: DrawingBackend + 'a>(
    area: &'a DrawingArea<DB, plotters::coord::Shift>,
    frame: &Frame,
    y_range: Range<f64>,
    caption: &str,
) -> Result<PriceChart<'a, DB>, RenderError> {
    ChartBuilder::on(area)
        .caption(caption, (FONT, 20).into_font())
        .margin(8)
        .x_label_area_size(70)
        .y_label_area_size(80)
        .build_cartesian_2d(
            frame.x_range.clone().with_key_points(frame.month_ticks.clone()),
            y_range,
        )
        .map_err(backend)
}

/// Axis labels plus month (major) and Monday (minor) gridlines.
fn configure_mesh<'a, DB: DrawingBackend + 'a>(
    chart: &mut PriceChart<'a, DB>,
    frame: &Frame,
    y_desc: &str,
) -> Result<(), RenderError> {
    let x_desc = format!("Date ({})", frame.time_zone);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(frame.month_ticks.len())
        .x_label_formatter(&|x: &f64| frame.axis.month_label(*x))
        .x_label_style((FONT, 12).into_font().transform(FontTransform::Rotate90))
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(backend)?;

    let y = chart.y_range();
    let (lo, hi) = (y.start, y.end);
    chart
        .draw_series(
            frame
                .weeks
                .iter()
                .map(|&x| PathElement::new(vec![(x, lo), (x, hi)], GRID.mix(0.25).stroke_width(1))),
        )
        .map_err(backend)?;
    chart
        .draw_series(
            frame
                .months
                .iter()
                .map(|&x| PathElement::new(vec![(x, lo), (x, hi)], GRID.mix(0.7).stroke_width(1))),
        )
        .map_err(backend)?;
    Ok(())
}

fn draw_legend<'a, DB: DrawingBackend + 'a>(
    chart: &mut PriceChart<'a, DB>,
) -> Result<(), RenderError> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font((FONT, 12).into_font())
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(backend)
}

/// Value range with 5% headroom; a flat range is widened by one unit.
fn padded(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_widens_flat_range() {
        assert_eq!(padded([50.0, 50.0].into_iter()), 49.0..51.0);
    }

    #[test]
    fn padded_ignores_nan() {
        let r = padded([f64::NAN, 10.0, 20.0].into_iter());
        assert!((r.start - 9.5).abs() < 1e-12);
        assert!((r.end - 20.5).abs() < 1e-12);
    }

    fn bar(y: i32, m: u32, d: u32) -> stockscope_core::domain::Bar {
        stockscope_core::domain::Bar {
            date: chrono::NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1.0,
        }
    }

    #[test]
    fn month_ticks_sit_on_month_gridlines() {
        let series = Series::from_bars(
            vec![bar(2024, 1, 15), bar(2024, 2, 15), bar(2024, 3, 15), bar(2024, 4, 2)],
            chrono_tz::Tz::UTC,
        )
        .unwrap();
        let frame = Frame::new(&series).unwrap();
        assert_eq!(frame.month_ticks, frame.months);
        let labels: Vec<String> = frame
            .month_ticks
            .iter()
            .map(|&x| frame.axis.month_label(x))
            .collect();
        assert_eq!(labels, vec!["2024-02", "2024-03", "2024-04"]);
    }

    #[test]
    fn single_month_series_labels_first_bar() {
        let series =
            Series::from_bars(vec![bar(2024, 1, 15), bar(2024, 1, 16)], chrono_tz::Tz::UTC)
                .unwrap();
        let frame = Frame::new(&series).unwrap();
        assert!(frame.months.is_empty());
        assert_eq!(frame.month_ticks, vec![0.0]);
    }

    #[test]
    fn caption_prefixes_title() {
        assert_eq!(caption("IBM (NYSE)", "Volume"), "IBM (NYSE): Volume");
        assert_eq!(caption("", "Volume"), "Volume");
    }
}
