//! 最新十笔数据表格
//!
//! 最新一笔在最上面；行标签（日期）用 YlOrRd 渐层着色，表头三栏固定颜色

use super::fonts::{text_enabled, FONT_FAMILY};
use super::palette::row_shades;
use super::{write_jpeg, RenderOptions, TABLE_FILE};
use crate::errors::{render_err, Result, ScrapeError};
use crate::models::{CommoditySeries, TimeSeriesPoint};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};

/// 表格显示的笔数
pub const LATEST_ROWS: usize = 10;
/// 表头颜色：价格、MA20、MA60
pub const HEADER_COLOURS: [RGBColor; 3] = [
    RGBColor(0xff, 0x66, 0x66),
    RGBColor(0x78, 0x8c, 0xff),
    RGBColor(0xff, 0xa8, 0x82),
];

const MARGIN: i32 = 60;
const TITLE_HEIGHT: i32 = 140;
const ROW_HEIGHT: i32 = 80;
const LABEL_WIDTH: i32 = 320;
const VALUE_WIDTH: i32 = 320;

/// 表格中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub label: String,
    pub cells: [String; 3],
}

/// 取最后 `count` 笔并倒序（新在前），数值保留一位小数
pub fn latest_rows(points: &[TimeSeriesPoint], count: usize) -> Vec<TableRow> {
    let start = points.len().saturating_sub(count);
    points[start..]
        .iter()
        .rev()
        .map(|p| TableRow {
            label: p.date.clone(),
            cells: [format_cell(p.price), format_cell(p.ma20), format_cell(p.ma60)],
        })
        .collect()
}

fn format_cell(value: f64) -> String {
    if value.is_finite() {
        format!("{:.1}", value)
    } else {
        "-".to_string()
    }
}

/// 绘制表格，写入 `dir/table.jpg`
pub fn render_latest_table(
    series: &CommoditySeries,
    dir: &Path,
    options: &RenderOptions,
) -> Result<PathBuf> {
    if series.is_empty() {
        return Err(ScrapeError::EmptySeries);
    }

    let rows = latest_rows(&series.points, LATEST_ROWS);
    let shades = row_shades(LATEST_ROWS);
    let columns = series.value_labels();
    let text = text_enabled();

    let width = (MARGIN * 2 + LABEL_WIDTH + VALUE_WIDTH * 3) as u32;
    let height = (MARGIN + TITLE_HEIGHT + ROW_HEIGHT * (rows.len() as i32 + 1)) as u32;
    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let centred = Pos::new(HPos::Center, VPos::Center);
        let title_style = (FONT_FAMILY, 48)
            .into_font()
            .style(FontStyle::Bold)
            .color(&BLACK)
            .pos(centred);
        let header_style = (FONT_FAMILY, 32).into_font().color(&BLACK).pos(centred);
        let label_style = (FONT_FAMILY, 30).into_font().color(&BLACK).pos(centred);
        let value_style = (FONT_FAMILY, 32)
            .into_font()
            .style(FontStyle::Bold)
            .color(&BLACK)
            .pos(centred);

        if text {
            root.draw(&Text::new(
                series.code.clone(),
                (width as i32 / 2, TITLE_HEIGHT / 2),
                title_style,
            ))
            .map_err(render_err)?;
        }

        // 单元格左上角坐标
        let cell_x = |col: usize| {
            if col == 0 {
                MARGIN
            } else {
                MARGIN + LABEL_WIDTH + VALUE_WIDTH * (col as i32 - 1)
            }
        };
        let cell_w = |col: usize| if col == 0 { LABEL_WIDTH } else { VALUE_WIDTH };
        let cell_y = |row: usize| TITLE_HEIGHT + ROW_HEIGHT * row as i32;

        let draw_cell = |col: usize,
                         row: usize,
                         fill: RGBColor,
                         content: Option<(&str, &TextStyle)>|
         -> Result<()> {
            let (x, y, w) = (cell_x(col), cell_y(row), cell_w(col));
            let corners = [(x, y), (x + w, y + ROW_HEIGHT)];
            root.draw(&Rectangle::new(corners, fill.filled()))
                .map_err(render_err)?;
            root.draw(&Rectangle::new(corners, BLACK.stroke_width(2)))
                .map_err(render_err)?;
            if let (true, Some((s, style))) = (text, content) {
                root.draw(&Text::new(
                    s.to_string(),
                    (x + w / 2, y + ROW_HEIGHT / 2),
                    style.clone(),
                ))
                .map_err(render_err)?;
            }
            Ok(())
        };

        // 表头：左上角留白
        draw_cell(0, 0, WHITE, None)?;
        for (i, caption) in columns.iter().enumerate() {
            draw_cell(i + 1, 0, HEADER_COLOURS[i], Some((caption.as_str(), &header_style)))?;
        }

        for (r, row) in rows.iter().enumerate() {
            draw_cell(0, r + 1, shades[r], Some((row.label.as_str(), &label_style)))?;
            for (c, value) in row.cells.iter().enumerate() {
                draw_cell(c + 1, r + 1, WHITE, Some((value.as_str(), &value_style)))?;
            }
        }

        root.present().map_err(render_err)?;
    }

    let path = dir.join(TABLE_FILE);
    write_jpeg(&path, &buffer, (width, height), options.jpeg_quality)?;
    log::debug!("表格已写入 {}", path.display());
    Ok(path)
}
