//! 度量模块：盒子尺寸、矩形以及字体度量提供者
//!
//! 坐标系与 SVG 一致：x 向右，y 向下，字形矩形以基线上的起笔点为原点。

use fontdue::Metrics as GlyphMetrics;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread_local;

use crate::environment::{FontEncoding, FontRole};
use crate::init::{FontDefaults, LoadedFace};

/// 节点测量结果
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxMetrics {
    pub width: f32,
    /// 基线以上的高度
    pub baseline_height: f32,
    /// 整体高度，始终不小于 `baseline_height`
    pub overall_height: f32,
    /// 删除线（视觉中线）在基线以上的位置
    pub strikeout_pos: f32,
    /// 斜体字形右侧伸出的部分，下标据此向右挪
    pub baseline_x_correction: f32,
}

impl BoxMetrics {
    pub fn new(width: f32, baseline_height: f32, overall_height: f32, strikeout_pos: f32) -> Self {
        Self {
            width,
            baseline_height,
            overall_height,
            strikeout_pos,
            baseline_x_correction: 0.0,
        }
    }

    pub fn descent(&self) -> f32 {
        self.overall_height - self.baseline_height
    }

    /// 把负值夹到 0，保证 `overall >= baseline >= 0`
    pub fn clamped(mut self) -> Self {
        self.baseline_height = self.baseline_height.max(0.0);
        self.overall_height = self.overall_height.max(self.baseline_height);
        self
    }
}

/// 轴对齐矩形，y 向下
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }

    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// 度量查询使用的具体字体
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub role: FontRole,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

/// 字体度量提供者，排版只通过它接触字体
pub trait FontMetricsProvider {
    fn ascent(&self, font: &FontSpec) -> f32;
    /// 基线以下的深度，正数
    fn descent(&self, font: &FontSpec) -> f32;
    fn x_height(&self, font: &FontSpec) -> f32;
    fn line_width(&self, font: &FontSpec) -> f32;
    /// 基线到下一行基线的距离
    fn line_spacing(&self, font: &FontSpec) -> f32 {
        self.ascent(font) + self.descent(font)
    }
    fn strikeout_pos(&self, font: &FontSpec) -> f32 {
        self.x_height(font) * 0.5
    }
    /// 文本的前进宽度
    fn glyph_width(&self, font: &FontSpec, text: &str) -> f32;
    /// 逻辑包围盒：宽度为前进宽度，高度覆盖整行
    fn bounding_box(&self, font: &FontSpec, text: &str) -> Rect {
        let ascent = self.ascent(font);
        Rect::new(
            0.0,
            -ascent,
            self.glyph_width(font, text),
            ascent + self.descent(font),
        )
    }
    /// 墨迹的紧包围盒
    fn tight_bounding_box(&self, font: &FontSpec, text: &str) -> Rect;
    fn has_glyph(&self, font: &FontSpec, ch: char) -> bool;
    fn encoding(&self, _role: FontRole) -> FontEncoding {
        FontEncoding::Unicode
    }
}

/// 与字体无关的确定性度量，用于测试以及没有系统字体时的兜底
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMetrics;

/// 单个字形的近似形状，全部以字号为单位
struct FixedGlyph {
    advance: f32,
    top: f32,
    bottom: f32,
}

impl FixedMetrics {
    fn glyph(ch: char) -> Option<FixedGlyph> {
        fn g(advance: f32, top: f32, bottom: f32) -> Option<FixedGlyph> {
            Some(FixedGlyph {
                advance,
                top,
                bottom,
            })
        }
        match ch {
            c if c.is_whitespace() => None,
            '\u{0300}'..='\u{036f}' => None,
            'A'..='Z' => g(if ch == 'M' || ch == 'W' { 0.8 } else { 0.65 }, 0.7, 0.0),
            '0'..='9' => g(0.5, 0.68, 0.0),
            'b' | 'd' | 'f' | 'h' | 'k' | 'l' | 't' | 'i' => g(0.5, 0.7, 0.0),
            'g' | 'p' | 'q' | 'y' | 'j' => g(0.5, 0.45, 0.2),
            'a'..='z' => g(if ch == 'm' || ch == 'w' { 0.75 } else { 0.5 }, 0.45, 0.0),
            '(' | ')' | '[' | ']' | '{' | '}' | '|' => g(0.35, 0.75, 0.25),
            '.' => g(0.25, 0.1, 0.0),
            ',' | ';' => g(0.25, 0.1, 0.15),
            ':' => g(0.25, 0.45, 0.0),
            '_' => g(0.5, -0.1, 0.15),
            '-' | '\u{2212}' => g(0.5, 0.3, -0.22),
            '+' | '=' | '<' | '>' | '*' | '\u{00b1}' | '\u{2213}' => g(0.7, 0.55, 0.0),
            '^' | '~' | '`' | '\'' | '"' => g(0.4, 0.7, -0.45),
            '\u{2211}' | '\u{220f}' | '\u{2210}' | '\u{22c0}'..='\u{22c3}' => g(0.9, 0.75, 0.25),
            '\u{222b}'..='\u{2230}' => g(0.45, 0.8, 0.25),
            _ => g(0.6, 0.6, 0.0),
        }
    }

    fn advance(ch: char) -> f32 {
        match Self::glyph(ch) {
            Some(glyph) => glyph.advance,
            None if ch.is_whitespace() => 0.25,
            None => 0.0,
        }
    }

    fn weight(font: &FontSpec) -> f32 {
        if font.bold {
            1.05
        } else {
            1.0
        }
    }
}

impl FontMetricsProvider for FixedMetrics {
    fn ascent(&self, font: &FontSpec) -> f32 {
        font.size * 0.8
    }

    fn descent(&self, font: &FontSpec) -> f32 {
        font.size * 0.2
    }

    fn x_height(&self, font: &FontSpec) -> f32 {
        font.size * 0.45
    }

    fn line_width(&self, font: &FontSpec) -> f32 {
        font.size / 20.0
    }

    fn glyph_width(&self, font: &FontSpec, text: &str) -> f32 {
        text.chars().map(Self::advance).sum::<f32>() * font.size * Self::weight(font)
    }

    fn tight_bounding_box(&self, font: &FontSpec, text: &str) -> Rect {
        let scale = font.size * Self::weight(font);
        let slant = if font.italic { 0.08 * font.size } else { 0.0 };
        let mut pen = 0.0f32;
        let mut ink = Rect::default();
        for ch in text.chars() {
            if let Some(glyph) = Self::glyph(ch) {
                let glyph_rect = Rect::new(
                    pen + 0.05 * scale,
                    -glyph.top * font.size,
                    (glyph.advance - 0.1) * scale + slant,
                    (glyph.top + glyph.bottom) * font.size,
                );
                ink = ink.union(&glyph_rect);
            }
            pen += Self::advance(ch) * scale;
        }
        ink
    }

    fn has_glyph(&self, _font: &FontSpec, ch: char) -> bool {
        Self::glyph(ch).is_some() || ch.is_whitespace()
    }
}

/// 基于 fontdue 字形数据的度量提供者
pub struct FontdueMetrics {
    defaults: Arc<FontDefaults>,
}

impl FontdueMetrics {
    pub fn new(defaults: Arc<FontDefaults>) -> Self {
        Self { defaults }
    }

    fn face(&self, font: &FontSpec) -> Option<&LoadedFace> {
        self.defaults.face(font.role, font.bold, font.italic)
    }

    /// 读取字体的行距信息，若字体未提供则退化为经验值
    fn line_metrics(&self, font: &FontSpec) -> (f32, f32, f32) {
        let metrics = self
            .face(font)
            .and_then(|face| face.font.horizontal_line_metrics(font.size));
        match metrics {
            Some(metrics) => (
                metrics.ascent.max(0.0),
                metrics.descent.abs(),
                metrics.line_gap.max(0.0),
            ),
            None => (
                font.size * 0.8, // 经验值：上方高度约为字号 80%
                font.size * 0.2, // 下方高度约为字号 20%
                0.0,
            ),
        }
    }
}

impl FontMetricsProvider for FontdueMetrics {
    fn ascent(&self, font: &FontSpec) -> f32 {
        self.line_metrics(font).0
    }

    fn descent(&self, font: &FontSpec) -> f32 {
        self.line_metrics(font).1
    }

    fn line_spacing(&self, font: &FontSpec) -> f32 {
        let (ascent, descent, gap) = self.line_metrics(font);
        ascent + descent + gap
    }

    fn x_height(&self, font: &FontSpec) -> f32 {
        let tight = self.tight_bounding_box(font, "x");
        if tight.height > 0.0 {
            tight.height
        } else {
            font.size * 0.45
        }
    }

    fn line_width(&self, font: &FontSpec) -> f32 {
        (font.size / 20.0).max(0.5)
    }

    fn glyph_width(&self, font: &FontSpec, text: &str) -> f32 {
        match self.face(font) {
            Some(face) => text
                .chars()
                .map(|ch| cached_metrics(face, ch, font.size).advance_width)
                .sum(),
            None => FixedMetrics.glyph_width(font, text),
        }
    }

    fn tight_bounding_box(&self, font: &FontSpec, text: &str) -> Rect {
        let Some(face) = self.face(font) else {
            return FixedMetrics.tight_bounding_box(font, text);
        };
        let mut pen = 0.0f32;
        let mut ink = Rect::default();
        for ch in text.chars() {
            let metrics = cached_metrics(face, ch, font.size);
            let bounds = metrics.bounds;
            if bounds.width > 0.0 && bounds.height > 0.0 {
                // fontdue 的 ymin 以基线向上为正
                let glyph_rect = Rect::new(
                    pen + bounds.xmin,
                    -(bounds.ymin + bounds.height),
                    bounds.width,
                    bounds.height,
                );
                ink = ink.union(&glyph_rect);
            }
            pen += metrics.advance_width;
        }
        ink
    }

    fn has_glyph(&self, font: &FontSpec, ch: char) -> bool {
        self.face(font)
            .map(|face| face.font.lookup_glyph_index(ch) != 0)
            .unwrap_or(false)
    }

    fn encoding(&self, role: FontRole) -> FontEncoding {
        self.defaults.encoding(role)
    }
}

fn cached_metrics(face: &LoadedFace, ch: char, font_size: f32) -> GlyphMetrics {
    let quantized = (font_size * 100.0).round() as u32;
    let key = (face.id, ch, quantized);
    METRICS_CACHE.with(|cache| {
        if let Some(metrics) = cache.borrow().get(&key) {
            return *metrics;
        }
        let metrics = face.font.metrics(ch, font_size);
        cache.borrow_mut().insert(key, metrics);
        metrics
    })
}

thread_local! {
    static METRICS_CACHE: RefCell<HashMap<(usize, char, u32), GlyphMetrics>> =
        RefCell::new(HashMap::new());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(size: f32) -> FontSpec {
        FontSpec {
            role: FontRole::Roman,
            size,
            bold: false,
            italic: false,
        }
    }

    #[test]
    fn fixed_metrics_scale_with_size() {
        let small = FixedMetrics.glyph_width(&spec(10.0), "abc");
        let large = FixedMetrics.glyph_width(&spec(20.0), "abc");
        assert!((large - 2.0 * small).abs() < 1e-4);
    }

    #[test]
    fn tight_box_of_descender_extends_below_baseline() {
        let rect = FixedMetrics.tight_bounding_box(&spec(10.0), "gy");
        assert!(rect.y < 0.0);
        assert!(rect.bottom() > 0.0);
        let flat = FixedMetrics.tight_bounding_box(&spec(10.0), "ace");
        assert!(flat.bottom().abs() < 1e-4);
    }

    #[test]
    fn whitespace_has_advance_but_no_ink() {
        let rect = FixedMetrics.tight_bounding_box(&spec(10.0), " ");
        assert!(rect.is_empty());
        assert!(FixedMetrics.glyph_width(&spec(10.0), " ") > 0.0);
    }

    #[test]
    fn combining_marks_are_reported_missing() {
        assert!(!FixedMetrics.has_glyph(&spec(10.0), '\u{0302}'));
        assert!(FixedMetrics.has_glyph(&spec(10.0), 'a'));
    }

    #[test]
    fn clamping_restores_box_invariant() {
        let m = BoxMetrics::new(1.0, -2.0, -3.0, 0.0).clamped();
        assert_eq!(m.baseline_height, 0.0);
        assert_eq!(m.overall_height, 0.0);
    }
}
