//! 装饰：`\vec`、`\hat`、`\overline`、`\underline`、`\cancel` 等
//!
//! 单个字符的简单重音优先使用字体里的组合字符，其余情况用路径画在内容上方、下方或穿过内容。

use crate::ast::{DecoratedNode, DecorationPlacement, DecorationType, Node};
use crate::environment::Environment;
use crate::metrics::BoxMetrics;
use crate::surface::{DrawingSurface, LineStyle, Path, Pen};

use super::{box_from, text, LayoutContext};

/// 装饰带：相对基线的上下边界（y 向下）与横向范围
#[derive(Debug, Clone, Copy)]
struct Band {
    top: f32,
    bottom: f32,
    left: f32,
    right: f32,
}

impl Band {
    fn middle(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    fn center(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    fn height(&self) -> f32 {
        self.bottom - self.top
    }

    fn width(&self) -> f32 {
        self.right - self.left
    }
}

struct DecorationLayout {
    metrics: BoxMetrics,
    child: BoxMetrics,
    child_dx: f32,
    band: Band,
}

/// 可以直接用组合字符绘制时返回拼好的文本
fn combined_text(ctx: &LayoutContext<'_>, deco: &DecoratedNode, env: &Environment) -> Option<String> {
    let Node::Text(leaf) = deco.child.as_ref() else {
        return None;
    };
    let mut chars = leaf.text.chars();
    let base = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let mark = deco.decoration.combining_char()?;
    ctx.metrics()
        .has_glyph(&env.font_spec(), mark)
        .then(|| format!("{base}{mark}"))
}

fn is_line(decoration: DecorationType) -> bool {
    matches!(
        decoration,
        DecorationType::Bar
            | DecorationType::Overline
            | DecorationType::Underline
            | DecorationType::UnderlineDashed
            | DecorationType::UnderlineDotted
    )
}

fn is_double_line(decoration: DecorationType) -> bool {
    matches!(
        decoration,
        DecorationType::DoubleOverline | DecorationType::DoubleUnderline
    )
}

/// 需要铺满整个宽度的装饰
fn spans_full_width(decoration: DecorationType) -> bool {
    matches!(
        decoration,
        DecorationType::Overline
            | DecorationType::DoubleOverline
            | DecorationType::Underline
            | DecorationType::UnderlineDashed
            | DecorationType::UnderlineDotted
            | DecorationType::DoubleUnderline
    )
}

fn layout(ctx: &LayoutContext<'_>, deco: &DecoratedNode, env: &Environment) -> DecorationLayout {
    let cfg = ctx.config();
    let factor = cfg.decoration_height_factor;
    let cs = ctx.measure(&deco.child, env);
    let lw = ctx.line_width(env);
    let x_height = ctx.x_height(env);
    let deco_height = factor * cs.baseline_height.max(x_height);

    let mini = match deco.decoration {
        DecorationType::Tilde | DecorationType::WideTilde | DecorationType::Breve => "~",
        _ => "^",
    };
    let width = cs.width.max(ctx.advance(env, mini));
    let child_dx = (width - cs.width) / 2.0;
    let (left, right) = if spans_full_width(deco.decoration) {
        (0.0, width)
    } else {
        let inset = cfg.decoration_width_reduction_x_factor * ctx.advance(env, "X") / 2.0;
        let deco_width = (width - 2.0 * inset).max(ctx.advance(env, "x") * 0.5);
        ((width - deco_width) / 2.0, (width + deco_width) / 2.0)
    };

    let thickness = if is_line(deco.decoration) {
        lw * 1.5
    } else if is_double_line(deco.decoration) {
        lw * 3.5
    } else {
        deco_height
    };

    let (band, ascent, descent) = match deco.decoration.placement() {
        DecorationPlacement::Over => {
            let mut lift = cs.baseline_height + lw;
            if deco.decoration == DecorationType::Bar {
                lift = lift.max(ctx.ascent(env));
            }
            let band = Band {
                top: -(lift + thickness),
                bottom: -lift,
                left,
                right,
            };
            (band, lift + thickness, cs.descent())
        }
        DecorationPlacement::Under => {
            let drop = (cs.descent() + lw).max(x_height * factor);
            let band = Band {
                top: drop,
                bottom: drop + thickness,
                left,
                right,
            };
            (band, cs.baseline_height, drop + thickness)
        }
        DecorationPlacement::Through => {
            let band = Band {
                top: -cs.baseline_height,
                bottom: cs.descent(),
                left: 0.0,
                right: width,
            };
            (band, cs.baseline_height, cs.descent())
        }
    };
    let mut metrics = box_from(width, ascent, descent, cs.strikeout_pos);
    metrics.baseline_x_correction = cs.baseline_x_correction;
    DecorationLayout {
        metrics,
        child: cs,
        child_dx,
        band,
    }
}

pub(super) fn measure_decorated(
    ctx: &LayoutContext<'_>,
    deco: &DecoratedNode,
    env: &Environment,
) -> BoxMetrics {
    match combined_text(ctx, deco, env) {
        Some(text) => text::measure_text(ctx, &text, env),
        None => layout(ctx, deco, env).metrics,
    }
}

/// 横向箭头，头部大小取装饰带高度的一半
fn arrow(surface: &mut dyn DrawingSurface, band: &Band, x: f32, y: f32, left: bool, right: bool, pen: &Pen) {
    let ay = y + band.middle();
    let head = band.height() / 2.0;
    let (x0, x1) = (x + band.left, x + band.right);
    surface.draw_line(x0, ay, x1, ay, pen);
    if left {
        let path = Path::polyline(&[(x0 + head, ay - head), (x0, ay), (x0 + head, ay + head)]);
        surface.draw_path(&path, Some(pen), None);
    }
    if right {
        let path = Path::polyline(&[(x1 - head, ay - head), (x1, ay), (x1 - head, ay + head)]);
        surface.draw_path(&path, Some(pen), None);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_shape(
    ctx: &LayoutContext<'_>,
    decoration: DecorationType,
    layout: &DecorationLayout,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) {
    use DecorationType::*;
    let pen = ctx.pen(env);
    let lw = pen.width;
    let band = &layout.band;
    let (l, r, c) = (x + band.left, x + band.right, x + band.center());
    let (top, bottom, mid) = (y + band.top, y + band.bottom, y + band.middle());
    let h = band.height();
    let w = band.width();
    match decoration {
        Vector | Arrow | OverRightArrow | UnderRightArrow => arrow(surface, band, x, y, false, true, &pen),
        OverLeftArrow | UnderLeftArrow => arrow(surface, band, x, y, true, false, &pen),
        OverLeftRightArrow | UnderLeftRightArrow => arrow(surface, band, x, y, true, true, &pen),
        Hat | WideHat => {
            surface.draw_path(&Path::polyline(&[(l, bottom), (c, top), (r, bottom)]), Some(&pen), None);
        }
        Check | WideCheck => {
            surface.draw_path(&Path::polyline(&[(l, top), (c, bottom), (r, top)]), Some(&pen), None);
        }
        Breve => {
            let mut path = Path::new();
            path.move_to(l, top).cubic_to(l, bottom, r, bottom, r, top);
            surface.draw_path(&path, Some(&pen), None);
        }
        Tilde | WideTilde => {
            let mut path = Path::new();
            path.move_to(l, bottom)
                .cubic_to(l + w * 0.25, top - h * 0.3, c - w * 0.1, top, c, mid)
                .cubic_to(c + w * 0.1, bottom, r - w * 0.25, bottom + h * 0.3, r, top);
            surface.draw_path(&path, Some(&pen), None);
        }
        Ocirc => {
            let radius = h / 2.0;
            surface.draw_ellipse(c, mid, radius, radius, Some(&pen), None);
        }
        Dot => {
            let radius = (lw * 1.2).min(h / 2.0);
            surface.draw_ellipse(c, mid, radius, radius, None, Some(env.color));
        }
        Ddot => {
            let radius = (lw * 1.2).min(h / 2.0);
            let spread = (w / 4.0).max(radius * 2.0);
            surface.draw_ellipse(c - spread, mid, radius, radius, None, Some(env.color));
            surface.draw_ellipse(c + spread, mid, radius, radius, None, Some(env.color));
        }
        Acute => surface.draw_line(c - h * 0.3, bottom, c + h * 0.3, top, &pen),
        Grave => surface.draw_line(c - h * 0.3, top, c + h * 0.3, bottom, &pen),
        Bar | Overline => surface.draw_line(l, bottom - lw / 2.0, r, bottom - lw / 2.0, &pen),
        DoubleOverline => {
            surface.draw_line(l, bottom - lw / 2.0, r, bottom - lw / 2.0, &pen);
            surface.draw_line(l, bottom - lw * 2.5, r, bottom - lw * 2.5, &pen);
        }
        Underline => surface.draw_line(l, top + lw / 2.0, r, top + lw / 2.0, &pen),
        UnderlineDashed => {
            let dashed = pen.with_style(LineStyle::Dashed);
            surface.draw_line(l, top + lw / 2.0, r, top + lw / 2.0, &dashed);
        }
        UnderlineDotted => {
            let dotted = pen.with_style(LineStyle::Dotted);
            surface.draw_line(l, top + lw / 2.0, r, top + lw / 2.0, &dotted);
        }
        DoubleUnderline => {
            surface.draw_line(l, top + lw / 2.0, r, top + lw / 2.0, &pen);
            surface.draw_line(l, top + lw * 2.5, r, top + lw * 2.5, &pen);
        }
        Strike => {
            let sy = y - layout.child.baseline_height / 2.0;
            surface.draw_line(l, sy, r, sy, &pen);
        }
        Cancel => surface.draw_line(l, bottom, r, top, &pen),
        BCancel => surface.draw_line(l, top, r, bottom, &pen),
        XCancel => {
            surface.draw_line(l, bottom, r, top, &pen);
            surface.draw_line(l, top, r, bottom, &pen);
        }
    }
}

pub(super) fn draw_decorated(
    ctx: &LayoutContext<'_>,
    deco: &DecoratedNode,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    if let Some(text) = combined_text(ctx, deco, env) {
        return text::draw_text(ctx, &text, surface, x, y, env);
    }
    let layout = layout(ctx, deco, env);
    ctx.draw(&deco.child, surface, x + layout.child_dx, y, env);
    draw_shape(ctx, deco.decoration, &layout, surface, x, y, env);
    x + layout.metrics.width
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn over_and_under_grow_their_side() {
        let base = measure(&math("ab"));
        let over = measure(&math(r"\overline{ab}"));
        let under = measure(&math(r"\underline{ab}"));
        let crossed = measure(&math(r"\cancel{ab}"));
        assert!(over.baseline_height > base.baseline_height);
        assert_eq!(over.descent(), base.descent());
        assert!(under.descent() > base.descent());
        assert_eq!(under.baseline_height, base.baseline_height);
        assert_eq!(crossed.baseline_height, base.baseline_height);
        assert_eq!(crossed.width, base.width);
    }

    #[test]
    fn accents_on_multi_char_content_are_paths() {
        let (_, hat) = draw(&math(r"\hat{ab}"));
        assert_eq!(hat.scene().paths.len(), 1);
        let (_, dots) = draw(&math(r"\ddot{ab}"));
        assert_eq!(dots.scene().paths.len(), 2);
        let (_, arrow) = draw(&math(r"\overleftrightarrow{ab}"));
        assert_eq!(arrow.scene().lines.len(), 1);
        assert_eq!(arrow.scene().paths.len(), 2);
    }

    #[test]
    fn single_char_uses_combining_mark_when_available() {
        // 测试度量中 U+0302 没有字形，U+20D7 有
        let (_, hat) = draw(&math(r"\hat{a}"));
        assert_eq!(hat.scene().paths.len(), 1);
        let (_, vec) = draw(&math(r"\vec{a}"));
        assert!(vec.scene().paths.is_empty());
        assert_eq!(vec.scene().items[0].text, "a\u{20d7}");
    }

    #[test]
    fn bar_sits_above_the_font_ascent() {
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        let env = math_env();
        let node = DecoratedNode {
            decoration: DecorationType::Bar,
            child: Box::new(Node::text("ab")),
        };
        let m = measure_decorated(&ctx, &node, &env);
        assert!(m.baseline_height > ctx.ascent(&env));
    }

    #[test]
    fn narrow_content_uses_minimum_width() {
        let dot = measure(&math(r"\tilde{.}"));
        let plain = measure(&math("."));
        assert!(dot.width > plain.width);
    }
}
