//! 图表与表格绘制
//!
//! 用 plotters 在内存 RGB 缓冲区作图，再以低质量 JPEG 写入临时目录，
//! 尽量压小传输体积。绘图是纯 CPU 工作，调用方应放到阻塞线程池执行。

mod chart;
mod fonts;
mod palette;
mod table;

use crate::errors::{render_err, Result};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub use chart::render_line_chart;
pub use fonts::{init_fonts, text_enabled};
pub use table::render_latest_table;

pub const CHART_FILE: &str = "plot.jpg";
pub const TABLE_FILE: &str = "table.jpg";

/// 输出参数
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// JPEG 质量 1-100
    pub jpeg_quality: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { jpeg_quality: 5 }
    }
}

/// 把 RGB 缓冲区编码为 JPEG 写入文件
fn write_jpeg(path: &Path, rgb: &[u8], (width, height): (u32, u32), quality: u8) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
        .encode(rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(render_err)?;
    writer.flush()?;
    Ok(())
}
