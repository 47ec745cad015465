//! 渲染配置模块：排版缩放系数、渲染器默认值以及 SVG 输出模式

use once_cell::sync::Lazy; // 延迟读取环境变量
use std::env; // 读取环境变量
use std::sync::atomic::{AtomicU8, Ordering}; // 存储全局覆盖开关

use crate::environment::Color;

/// 排版公式里用到的全部经验系数
///
/// 所有数值都是相对量：字号的倍数、x 高度的倍数或线宽的倍数。
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// 括号高度相对内容的放大倍数
    pub brace_factor: f32,
    /// 上下标字号缩放
    pub subsuper_size_factor: f32,
    /// 斜体字形的上下标横向修正
    pub italic_correction_factor: f32,
    /// 下标向下偏移（相对子节点字体的 x 高度）
    pub sub_shift_factor: f32,
    /// 上标向上偏移（相对 x 高度）
    pub super_shift_factor: f32,
    /// 括号宽度的收缩系数
    pub brace_shrink_factor: f32,
    /// 分子分母字号缩放
    pub frac_factor: f32,
    /// 嵌套分数的额外缩放，display 模式不受影响
    pub frac_nested_factor: f32,
    /// 分子分母离开分数线的距离（相对 x 高度）
    pub frac_shift_factor: f32,
    pub underbrace_factor: f32,
    pub underset_factor: f32,
    /// 装饰线离开内容的高度
    pub decoration_height_factor: f32,
    /// 装饰线两端内缩（相对 "X" 宽度）
    pub decoration_width_reduction_x_factor: f32,
    pub brace_y_shift_factor: f32,
    /// 大型运算符上下限的字号缩放
    pub operatorsubsuper_size_factor: f32,
    /// 大型运算符与上下限之间的距离（相对 x 高度）
    pub operatorsubsuper_distance_factor: f32,
    /// 大型运算符两侧额外留白（相对 "x" 宽度）
    pub operatorsubsuper_extraspace_factor: f32,
    /// 数学模式下运算符号的加宽倍数
    pub mathoperator_width_factor: f32,
    /// 前一个兄弟超过字体上升/下降的多少倍时启用特殊上下标模式
    pub subsuper_mode_selection_by_size_factor: f32,
    pub special_sub_shift_factor: f32,
    pub special_super_shift_factor: f32,
    /// 根号内容高度的放大倍数
    pub sqrt_height_factor: f32,
    /// 根号钩子宽度（相对 "X" 宽度）
    pub sqrt_width_x_factor: f32,
    /// 根号次数使用的字号缩放
    pub sqrt_small_font_factor: f32,
    /// 线宽下限，单位像素
    pub min_line_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            brace_factor: 1.04,
            subsuper_size_factor: 0.7,
            italic_correction_factor: 0.4,
            sub_shift_factor: 0.6,
            super_shift_factor: 0.5,
            brace_shrink_factor: 0.6,
            frac_factor: 0.9,
            frac_nested_factor: 0.7,
            frac_shift_factor: 0.5,
            underbrace_factor: 0.75,
            underset_factor: 0.7,
            decoration_height_factor: 0.2,
            decoration_width_reduction_x_factor: 0.2,
            brace_y_shift_factor: 0.7,
            operatorsubsuper_size_factor: 0.65,
            operatorsubsuper_distance_factor: 0.35,
            operatorsubsuper_extraspace_factor: 0.5,
            mathoperator_width_factor: 1.5,
            subsuper_mode_selection_by_size_factor: 1.05,
            special_sub_shift_factor: 0.4,
            special_super_shift_factor: 0.4,
            sqrt_height_factor: 1.2,
            sqrt_width_x_factor: 0.8,
            sqrt_small_font_factor: 0.57,
            min_line_width: 0.02,
        }
    }
}

/// 渲染器级别的默认值
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub layout: LayoutConfig,
    /// 基础字号，单位像素
    pub font_size: f32,
    pub color: Color,
    /// 为 true 时整段输入按数学模式解析，相当于外层包了一对 `$`
    pub start_in_math_mode: bool,
    /// 顶层 `\\` 是否产生多行
    pub allow_linebreaks: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            font_size: 28.0,
            color: Color::BLACK,
            start_in_math_mode: false,
            allow_linebreaks: true,
        }
    }
}

/// SVG 输出模式：保留 `<text>` 还是转换为矢量路径
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SvgTextMode {
    /// 默认模式，保留 `<text>` 节点以缩小文件体积
    Text,
    /// 把文字转换成 `<path>`，确保无字体依赖
    Paths,
}

// 0: 未覆盖，1: Text，2: Paths
static MODE_OVERRIDE: AtomicU8 = AtomicU8::new(0);

/// 环境变量 `MATHTEXT_SVG_MODE` 的默认设置
static ENV_DEFAULT: Lazy<SvgTextMode> = Lazy::new(|| {
    env::var("MATHTEXT_SVG_MODE")
        .map(|value| parse_svg_mode(&value))
        .unwrap_or(SvgTextMode::Text)
});

fn parse_svg_mode(value: &str) -> SvgTextMode {
    match value.trim().to_ascii_lowercase().as_str() {
        "path" | "paths" => SvgTextMode::Paths,
        _ => SvgTextMode::Text,
    }
}

/// 获取当前 SVG 输出模式（覆盖优先于环境变量）
pub fn svg_text_mode() -> SvgTextMode {
    match MODE_OVERRIDE.load(Ordering::Relaxed) {
        1 => SvgTextMode::Text,
        2 => SvgTextMode::Paths,
        _ => *ENV_DEFAULT,
    }
}

/// 允许在运行时覆盖 SVG 输出模式；`None` 表示还原为默认设置
pub fn override_svg_text_mode(mode: Option<SvgTextMode>) {
    let value = match mode {
        Some(SvgTextMode::Text) => 1,
        Some(SvgTextMode::Paths) => 2,
        None => 0,
    };
    MODE_OVERRIDE.store(value, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_mode_names_are_case_insensitive() {
        assert_eq!(parse_svg_mode(" Paths "), SvgTextMode::Paths);
        assert_eq!(parse_svg_mode("PATH"), SvgTextMode::Paths);
        assert_eq!(parse_svg_mode("text"), SvgTextMode::Text);
        assert_eq!(parse_svg_mode("???"), SvgTextMode::Text);
    }

    #[test]
    fn default_factors_keep_scripts_smaller_than_base() {
        let cfg = LayoutConfig::default();
        assert!(cfg.subsuper_size_factor < 1.0);
        assert!(cfg.operatorsubsuper_size_factor < cfg.subsuper_size_factor);
        assert!(cfg.frac_nested_factor < 1.0);
        assert!(cfg.brace_factor > 1.0);
    }
}
