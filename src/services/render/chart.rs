//! 价格走势折线图：价格、MA20、MA60 三线共用日期轴

use super::fonts::{text_enabled, FONT_FAMILY};
use super::{write_jpeg, RenderOptions, CHART_FILE};
use crate::errors::{render_err, Result, ScrapeError};
use crate::models::{CommoditySeries, TimeSeriesPoint};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const CHART_SIZE: (u32, u32) = (2000, 1500);
/// 每隔几个日期显示一个标签
const DATE_LABEL_EVERY: usize = 10;
/// 价格轴刻度间距
const PRICE_TICK_STEP: f64 = 50.0;

const MA20_COLOUR: RGBColor = RGBColor(0x00, 0x00, 0xE3);
const MA60_COLOUR: RGBColor = RGBColor(0xD2, 0x69, 0x00);

type Picker = fn(&TimeSeriesPoint) -> f64;

/// 价格轴范围：取三条线的极值，向外对齐到刻度间距，至少一格宽
pub fn price_axis_bounds(points: &[TimeSeriesPoint], step: f64) -> (f64, f64) {
    let (min, max) = points
        .iter()
        .flat_map(|p| [p.price, p.ma20, p.ma60])
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !min.is_finite() {
        return (0.0, step);
    }

    let lo = (min / step).floor() * step;
    let mut hi = (max / step).ceil() * step;
    if hi <= lo {
        hi = lo + step;
    }
    (lo, hi)
}

/// 绘制折线图，写入 `dir/plot.jpg`
pub fn render_line_chart(
    series: &CommoditySeries,
    dir: &Path,
    options: &RenderOptions,
) -> Result<PathBuf> {
    let points = &series.points;
    if points.is_empty() {
        return Err(ScrapeError::EmptySeries);
    }

    let text = text_enabled();
    let (width, height) = CHART_SIZE;
    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let n = points.len();
        let (y_lo, y_hi) = price_axis_bounds(points, PRICE_TICK_STEP);

        let mut builder = ChartBuilder::on(&root);
        builder.margin(40);
        if text {
            builder
                .caption(
                    &series.code,
                    (FONT_FAMILY, 56).into_font().style(FontStyle::Bold),
                )
                .x_label_area_size(90)
                .y_label_area_size(130);
        }
        let mut chart = builder
            .build_cartesian_2d(0..n, y_lo..y_hi)
            .map_err(render_err)?;

        if text {
            let date_label = |idx: &usize| {
                if idx % DATE_LABEL_EVERY == 0 {
                    points.get(*idx).map(|p| p.date.clone()).unwrap_or_default()
                } else {
                    String::new()
                }
            };
            let price_ticks = ((y_hi - y_lo) / PRICE_TICK_STEP).round() as usize + 1;

            chart
                .configure_mesh()
                .x_labels(n.div_ceil(DATE_LABEL_EVERY) + 1)
                .y_labels(price_ticks)
                .x_label_formatter(&date_label)
                .y_label_formatter(&|v| format!("{:.0}", v))
                .x_desc("Date")
                .y_desc("Price")
                .axis_desc_style((FONT_FAMILY, 40).into_font().style(FontStyle::Bold))
                .label_style((FONT_FAMILY, 24))
                .draw()
                .map_err(render_err)?;
        }

        let lines: [(&str, RGBColor, Picker); 3] = [
            ("Price", RED, |p| p.price),
            ("MA20", MA20_COLOUR, |p| p.ma20),
            ("MA60", MA60_COLOUR, |p| p.ma60),
        ];

        for (label, colour, pick) in lines {
            let data = points
                .iter()
                .enumerate()
                .map(|(i, p)| (i, pick(p)))
                .filter(|(_, v)| v.is_finite());
            let drawn = chart
                .draw_series(LineSeries::new(data, colour.stroke_width(3)))
                .map_err(render_err)?;
            if text {
                drawn.label(label).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 30, y)], colour.stroke_width(3))
                });
            }
        }

        if text {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font((FONT_FAMILY, 32))
                .draw()
                .map_err(render_err)?;
        }

        root.present().map_err(render_err)?;
    }

    let path = dir.join(CHART_FILE);
    write_jpeg(&path, &buffer, CHART_SIZE, options.jpeg_quality)?;
    log::debug!("折线图已写入 {}", path.display());
    Ok(path)
}
