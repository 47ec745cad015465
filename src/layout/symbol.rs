//! 命名符号与空白
//!
//! 符号的尺寸来自字形的紧包围盒；长箭头没有对应字形，直接画路径。
//! 表中查不到的符号画成一个空心方框。

use crate::ast::{LengthUnit, SymbolNode, WhitespaceKind};
use crate::environment::{Environment, FontEncoding};
use crate::metrics::{BoxMetrics, FontSpec};
use crate::parse::rules::symbols::{self, SymbolEntry, SymbolFlags};
use crate::surface::{DrawingSurface, Path};

use super::{box_from, LayoutContext};

/// 1pt = 4/3 px
const PX_PER_PT: f32 = 4.0 / 3.0;
/// 长箭头相对 "X" 宽度的长度
const LONG_ARROW_WIDTH: f32 = 3.5;
/// 只有上升高度的符号额外保留的下降比例
const ASCENT_ONLY_DESCENT: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Glyph {
        text: String,
        font: FontSpec,
        /// 相对起点与基线的偏移
        dx: f32,
        dy: f32,
    },
    LongArrow {
        left: bool,
        right: bool,
        double: bool,
    },
    Unknown,
}

/// 符号测量与绘制共用的几何
#[derive(Debug, Clone, PartialEq)]
pub(super) struct SymbolLayout {
    pub metrics: BoxMetrics,
    /// 放在正上/正下方的上下限沿斜体方向错开的距离
    pub limit_correction: f32,
    shape: Shape,
}

/// 字体缺字或只支持 ASCII 时换用替代文本
fn glyph_text(ctx: &LayoutContext<'_>, name: &str, entry: &SymbolEntry, font: &FontSpec) -> String {
    let fallback = symbols::ascii_fallback(name);
    let standard = ctx.metrics().encoding(font.role) == FontEncoding::Standard;
    let missing = entry
        .glyph
        .chars()
        .next()
        .is_some_and(|ch| !ctx.metrics().has_glyph(font, ch));
    match fallback {
        Some(text) if standard || missing => text.to_string(),
        _ => entry.glyph.to_string(),
    }
}

pub(super) fn measure_symbol(
    ctx: &LayoutContext<'_>,
    sym: &SymbolNode,
    env: &Environment,
) -> SymbolLayout {
    let strikeout = ctx.strikeout(env);
    let Some(entry) = symbols::lookup(&sym.name) else {
        // 未知符号：与大写字母一样高的方框
        let ink = ctx.tight(env, "X");
        return SymbolLayout {
            metrics: box_from(ctx.advance(env, "a").max(ink.width), -ink.y, 0.0, strikeout),
            limit_correction: 0.0,
            shape: Shape::Unknown,
        };
    };

    if entry.has(SymbolFlags::LONG_ARROW) {
        let (left, right, double) = symbols::long_arrow_shape(&sym.name);
        let ink = ctx.tight(env, "X");
        let half = ctx.x_height(env) * 0.5;
        return SymbolLayout {
            metrics: box_from(ink.width * LONG_ARROW_WIDTH, half * 2.0, 0.0, strikeout),
            limit_correction: 0.0,
            shape: Shape::LongArrow {
                left,
                right,
                double,
            },
        };
    }

    let mut font = env.font_spec();
    font.size *= entry.font_factor;
    if entry.has(SymbolFlags::UPRIGHT) {
        font.italic = false;
    }
    let text = glyph_text(ctx, &sym.name, entry, &font);
    let metrics = ctx.metrics();
    let ink = metrics.tight_bounding_box(&font, &text);
    let advance = metrics.glyph_width(&font, &text);

    let mut width = advance;
    if env.inside_math {
        width = width.max(metrics.tight_bounding_box(&font, "(").width);
    }
    let mut dx = 0.0;
    if entry.has(SymbolFlags::EXTEND_WIDTH) && env.inside_math {
        width *= ctx.config().mathoperator_width_factor;
        dx = (width - ink.width) / 2.0 - ink.x;
    }

    let mut ascent = if ink.is_empty() { 0.0 } else { -ink.y };
    let mut descent = if ink.is_empty() { 0.0 } else { ink.bottom() };
    // 放大的符号以删除线为中心
    let mut dy = 0.0;
    if entry.font_factor != 1.0 && !ink.is_empty() {
        let center = ascent - ink.height / 2.0;
        dy = center - strikeout;
        ascent -= dy;
        descent += dy;
    }
    if entry.has(SymbolFlags::HEIGHT_IS_ASCENT) && !entry.has(SymbolFlags::EXACT_ASCENT) {
        descent = ascent * ASCENT_ONLY_DESCENT;
    }

    let limit_correction = if entry.font_factor > 1.0 {
        ink.width * 0.1
    } else {
        0.0
    };
    let mut size = box_from(width, ascent, descent, strikeout);
    if font.italic && !ink.is_empty() {
        size.baseline_x_correction = (ink.right() - advance).max(0.0);
    }
    SymbolLayout {
        metrics: size,
        limit_correction,
        shape: Shape::Glyph { text, font, dx, dy },
    }
}

/// 长箭头：横线加箭头，`double` 时画双线
fn long_arrow_path(x: f32, y: f32, width: f32, head: f32, left: bool, right: bool, double: bool) -> Vec<Path> {
    let mut paths = Vec::new();
    let gap = if double { head * 0.35 } else { 0.0 };
    let (x0, x1) = (x, x + width);
    if double {
        paths.push(Path::polyline(&[(x0 + head * 0.3, y - gap), (x1 - head * 0.3, y - gap)]));
        paths.push(Path::polyline(&[(x0 + head * 0.3, y + gap), (x1 - head * 0.3, y + gap)]));
    } else {
        paths.push(Path::polyline(&[(x0, y), (x1, y)]));
    }
    let spread = head * 0.6 + gap;
    if left {
        paths.push(Path::polyline(&[
            (x0 + head, y - spread),
            (x0, y),
            (x0 + head, y + spread),
        ]));
    }
    if right {
        paths.push(Path::polyline(&[
            (x1 - head, y - spread),
            (x1, y),
            (x1 - head, y + spread),
        ]));
    }
    paths
}

pub(super) fn draw_symbol(
    ctx: &LayoutContext<'_>,
    sym: &SymbolNode,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    let layout = measure_symbol(ctx, sym, env);
    let size = layout.metrics;
    let pen = ctx.pen(env);
    match &layout.shape {
        Shape::Glyph { text, font, dx, dy } => {
            surface.draw_text(x + dx, y + dy, text, font, env.color);
        }
        Shape::LongArrow {
            left,
            right,
            double,
        } => {
            let head = ctx.x_height(env) * 0.5;
            let ay = y - ctx.x_height(env) * 0.5;
            for path in long_arrow_path(x, ay, size.width, head, *left, *right, *double) {
                surface.draw_path(&path, Some(&pen), None);
            }
        }
        Shape::Unknown => {
            let inset = pen.width;
            let rect = crate::metrics::Rect::new(
                x + inset,
                y - size.baseline_height,
                (size.width - 2.0 * inset).max(0.0),
                size.overall_height,
            );
            surface.draw_rect(rect, Some(&pen), None, 0.0);
        }
    }
    x + size.width
}

/// 空白的宽度，em 取当前字号，ex 取 x 高度
pub(super) fn whitespace_width(ctx: &LayoutContext<'_>, kind: WhitespaceKind, env: &Environment) -> f32 {
    let em = env.size;
    match kind {
        WhitespaceKind::Normal | WhitespaceKind::NonBreaking => ctx.advance(env, " "),
        WhitespaceKind::Thin => em * 3.0 / 18.0,
        WhitespaceKind::Medium => em * 4.0 / 18.0,
        WhitespaceKind::Thick => em * 5.0 / 18.0,
        WhitespaceKind::NegThin => -em * 3.0 / 18.0,
        WhitespaceKind::NegMedium => -em * 4.0 / 18.0,
        WhitespaceKind::NegThick => -em * 5.0 / 18.0,
        WhitespaceKind::EnSpace => em * 0.5,
        WhitespaceKind::Quad | WhitespaceKind::EmSpace => em,
        WhitespaceKind::QQuad => em * 2.0,
        WhitespaceKind::Custom(length) => match length.unit {
            LengthUnit::Em => length.value * em,
            LengthUnit::Ex => length.value * ctx.x_height(env),
            LengthUnit::Pt => length.value * PX_PER_PT,
            LengthUnit::Px => length.value,
        },
    }
}

pub(super) fn measure_whitespace(
    ctx: &LayoutContext<'_>,
    kind: WhitespaceKind,
    env: &Environment,
) -> BoxMetrics {
    BoxMetrics::new(whitespace_width(ctx, kind, env), 0.0, 0.0, ctx.strikeout(env))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::ast::{Length, Node};

    fn layout(name: &str, env: &Environment) -> SymbolLayout {
        let cfg = config();
        let sym = SymbolNode {
            name: name.into(),
            above_below: false,
        };
        measure_symbol(&LayoutContext::new(&FIXED, &cfg), &sym, env)
    }

    #[test]
    fn operators_widen_in_math() {
        let text_mode = layout("=", &Environment::default()).metrics.width;
        let math = layout("=", &math_env()).metrics.width;
        assert!((math - text_mode * 1.5).abs() < 1e-3);
    }

    #[test]
    fn greek_follows_math_italic() {
        match layout("alpha", &math_env()).shape {
            Shape::Glyph { font, .. } => assert!(font.italic),
            other => panic!("{other:?}"),
        }
        match layout("sin", &math_env()).shape {
            Shape::Glyph { font, text, .. } => {
                assert!(!font.italic);
                assert_eq!(text, "sin");
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn integrals_are_enlarged_and_centered() {
        let env = math_env();
        let int = layout("int", &env);
        let plus = layout("+", &env);
        assert!(int.metrics.overall_height > plus.metrics.overall_height);
        assert!(int.limit_correction > 0.0);
        // 中心落在删除线上
        let m = int.metrics;
        let center = m.baseline_height - m.overall_height / 2.0;
        assert!((center - m.strikeout_pos).abs() < 1e-3);
    }

    #[test]
    fn long_arrows_are_paths() {
        let arrow = layout("longrightarrow", &math_env());
        assert!(matches!(
            arrow.shape,
            Shape::LongArrow {
                left: false,
                right: true,
                double: false
            }
        ));
        let (_, surface) = draw(&math(r"\Longleftrightarrow"));
        assert!(surface.scene().items.is_empty());
        assert_eq!(surface.scene().paths.len(), 4);
    }

    #[test]
    fn unknown_symbols_draw_a_box() {
        let unknown = layout("definitelynotasymbol", &Environment::default());
        assert_eq!(unknown.shape, Shape::Unknown);
        assert!(unknown.metrics.width > 0.0);
        let (_, surface) = draw(&Node::symbol("definitelynotasymbol"));
        assert_eq!(surface.scene().paths.len(), 1);
    }

    #[test]
    fn whitespace_units() {
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        let env = Environment::default();
        assert_eq!(whitespace_width(&ctx, WhitespaceKind::Quad, &env), 28.0);
        assert_eq!(whitespace_width(&ctx, WhitespaceKind::NegThin, &env), -28.0 / 6.0);
        let pt = WhitespaceKind::Custom(Length {
            value: 3.0,
            unit: LengthUnit::Pt,
        });
        assert!((whitespace_width(&ctx, pt, &env) - 4.0).abs() < 1e-5);
        assert_eq!(measure(&Node::Whitespace(WhitespaceKind::Normal)).width, 7.0);
    }
}
