//! 颜色

use plotters::style::RGBColor;

/// ColorBrewer YlOrRd 九阶
const YLORRD_STOPS: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xcc),
    (0xff, 0xed, 0xa0),
    (0xfe, 0xd9, 0x76),
    (0xfe, 0xb2, 0x4c),
    (0xfd, 0x8d, 0x3c),
    (0xfc, 0x4e, 0x2a),
    (0xe3, 0x1a, 0x1c),
    (0xbd, 0x00, 0x26),
    (0x80, 0x00, 0x26),
];

/// YlOrRd 连续色阶，`t` 取 [0, 1]，0 为浅黄，1 为深红
pub fn ylorrd(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (YLORRD_STOPS.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(YLORRD_STOPS.len() - 1);
    let frac = pos - lower as f64;

    let (r0, g0, b0) = YLORRD_STOPS[lower];
    let (r1, g1, b1) = YLORRD_STOPS[upper];
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

/// 行标签渐层：在色阶上从 0.4 线性递减到 0 取 `count` 个颜色（最新一行颜色最深）
pub fn row_shades(count: usize) -> Vec<RGBColor> {
    const START: f64 = 0.4;
    match count {
        0 => Vec::new(),
        1 => vec![ylorrd(START)],
        _ => (0..count)
            .map(|i| ylorrd(START - START * i as f64 / (count - 1) as f64))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ylorrd_endpoints() {
        assert_eq!(ylorrd(0.0), RGBColor(0xff, 0xff, 0xcc));
        assert_eq!(ylorrd(1.0), RGBColor(0x80, 0x00, 0x26));
        assert_eq!(ylorrd(0.5), RGBColor(0xfd, 0x8d, 0x3c));
        assert_eq!(ylorrd(-3.0), ylorrd(0.0));
    }

    #[test]
    fn test_row_shades_gradient() {
        println!("\n========== 测试行标签渐层 ==========");
        let shades = row_shades(10);
        assert_eq!(shades.len(), 10);
        assert_eq!(shades[0], ylorrd(0.4));
        assert_eq!(shades[9], ylorrd(0.0));

        // 越往下越浅：绿色分量单调不减
        for pair in shades.windows(2) {
            println!("  {:?} -> {:?}", pair[0], pair[1]);
            assert!(pair[0].1 <= pair[1].1);
        }
        println!("✅ 行标签渐层测试通过！");
    }
}
