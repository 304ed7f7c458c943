//! 字体注册
//!
//! plotters 的 ab_glyph 后端需要先注册字体数据。找不到字体时图表仍会输出，只是没有文字。

use plotters::style::{register_font, FontStyle};
use std::sync::OnceLock;

pub(super) const FONT_FAMILY: &str = "sans-serif";

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static TEXT_ENABLED: OnceLock<bool> = OnceLock::new();

/// 启动时调用；`font_path` 优先于系统字体。只有第一次调用生效。
pub fn init_fonts(font_path: Option<&str>) -> bool {
    *TEXT_ENABLED.get_or_init(|| register(font_path))
}

/// 是否能绘制文字
pub fn text_enabled() -> bool {
    *TEXT_ENABLED.get_or_init(|| register(None))
}

fn register(font_path: Option<&str>) -> bool {
    for path in font_path.into_iter().chain(FONT_CANDIDATES.iter().copied()) {
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };
        // 注册接口要求 'static，字体在进程内只载入一次
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        let registered = [FontStyle::Normal, FontStyle::Bold]
            .into_iter()
            .all(|style| register_font(FONT_FAMILY, style, bytes).is_ok());
        if registered {
            log::info!("使用字体 {}", path);
            return true;
        }
        log::warn!("字体 {} 无法载入", path);
    }

    log::warn!("未找到可用字体，图表将不含文字");
    false
}
