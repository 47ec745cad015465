//! 可伸缩括号：`\left( .. \right)`、`\big` 系列以及矩阵外框
//!
//! 括号不取字形，而是按内容高度画路径。闭括号由开括号的形状左右镜像得到。

use crate::ast::{BraceNode, BraceType};
use crate::environment::Environment;
use crate::metrics::BoxMetrics;
use crate::surface::{DrawingSurface, Path, Pen};

use super::LayoutContext;

/// 圆括号内侧端点占括号宽度的比例
const PAREN_FRACTION: f32 = 0.75;
/// 竖线类括号的线宽缩放
const BAR_LINE_FACTOR: f32 = 0.75;
/// 括号比字体高出这个倍数后才开始加宽
const OVERSIZE_THRESHOLD: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct BraceLayout {
    pub metrics: BoxMetrics,
    pub open_width: f32,
    pub close_width: f32,
}

/// 括号宽度：以线宽为单位的基础值，括号明显高于字体时按高度的次线性函数加宽
fn brace_width(ctx: &LayoutContext<'_>, kind: BraceType, height: f32, env: &Environment) -> f32 {
    let lw = ctx.line_width(env);
    let units = match kind {
        BraceType::None => return 0.0,
        BraceType::CurlyBracket => 6.5,
        BraceType::Parenthesis => 6.0,
        BraceType::DoubleLine => 5.0,
        BraceType::SingleLine => 3.0,
        BraceType::SquareBracket | BraceType::FloorBracket | BraceType::CeilBracket => 7.0,
        BraceType::AngleBracket => 5.0,
    };
    let font_height = ctx.ascent(env) + ctx.descent(env);
    let oversize = if font_height > 0.0 { height / font_height } else { 1.0 };
    if oversize > OVERSIZE_THRESHOLD {
        units * lw * oversize.powf(ctx.config().brace_shrink_factor)
    } else {
        units * lw
    }
}

pub(super) fn measure_brace(ctx: &LayoutContext<'_>, brace: &BraceNode, env: &Environment) -> BraceLayout {
    let cs = ctx.measure(&brace.child, env);
    let min_height = ctx.tight(env, "l").height;
    let strike = cs.strikeout_pos;
    let above = (min_height - strike).max(cs.baseline_height - strike);
    let below = strike.max(cs.descent() + strike);
    let half = above.max(below) * ctx.config().brace_factor;
    let height = 2.0 * half;

    let open_width = if brace.show_opening_brace() {
        brace_width(ctx, brace.open, height, env)
    } else {
        0.0
    };
    let close_width = if brace.show_closing_brace() {
        brace_width(ctx, brace.close, height, env)
    } else {
        0.0
    };
    let mut metrics = BoxMetrics::new(
        cs.width + open_width + close_width,
        strike + half,
        height,
        strike,
    );
    metrics.baseline_x_correction = cs.baseline_x_correction;
    BraceLayout {
        metrics,
        open_width,
        close_width,
    }
}

/// 横向花括号，`down` 时尖端朝下；用描边绘制
pub(super) fn horizontal_brace(x0: f32, x1: f32, top: f32, height: f32, down: bool) -> Path {
    let mid = top + height / 2.0;
    let (arm_y, tip_y) = if down { (top, top + height) } else { (top + height, top) };
    let cx = (x0 + x1) / 2.0;
    let q = (height / 2.0).min((x1 - x0) / 4.0).max(0.0);
    let mut path = Path::new();
    path.move_to(x0, arm_y)
        .cubic_to(x0, mid, x0, mid, x0 + q, mid)
        .line_to(cx - q, mid)
        .cubic_to(cx, mid, cx, mid, cx, tip_y)
        .cubic_to(cx, mid, cx, mid, cx + q, mid)
        .line_to(x1 - q, mid)
        .cubic_to(x1, mid, x1, mid, x1, arm_y);
    path
}

/// 横向方括号，`down` 时开口朝上
pub(super) fn horizontal_bracket(x0: f32, x1: f32, top: f32, height: f32, down: bool) -> Path {
    let bottom = top + height;
    if down {
        Path::polyline(&[(x0, top), (x0, bottom), (x1, bottom), (x1, top)])
    } else {
        Path::polyline(&[(x0, bottom), (x0, top), (x1, top), (x1, bottom)])
    }
}

/// 在 [left, left + width] 内画一侧括号，`closing` 时左右镜像
#[allow(clippy::too_many_arguments)]
fn draw_side(
    surface: &mut dyn DrawingSurface,
    kind: BraceType,
    closing: bool,
    left: f32,
    width: f32,
    top: f32,
    bottom: f32,
    pen: &Pen,
) {
    let lw = pen.width;
    let px = |u: f32| if closing { left + width - u } else { left + u };
    let outer = lw * 2.0;
    let inner = (PAREN_FRACTION * width).min(width - lw);
    let mid = (top + bottom) / 2.0;
    let sixth = (bottom - top) / 6.0;
    let tip = lw * 0.75 / 2.0;
    match kind {
        BraceType::None => {}
        BraceType::Parenthesis => {
            let center = lw * 1.75 / 2.0;
            let mut path = Path::new();
            path.move_to(px(inner - tip), bottom)
                .cubic_to(px(outer - center), mid + sixth, px(outer - center), mid - sixth, px(inner - tip), top)
                .line_to(px(inner + tip), top)
                .cubic_to(px(outer + center), mid - sixth, px(outer + center), mid + sixth, px(inner + tip), bottom)
                .close();
            surface.draw_path(&path, None, Some(pen.color));
        }
        BraceType::AngleBracket => {
            let center = lw * 1.55 / 2.0;
            let mut path = Path::polyline(&[
                (px(inner - tip), bottom),
                (px(outer - center), mid),
                (px(inner - tip), top),
                (px(inner + tip), top),
                (px(outer + center), mid),
                (px(inner + tip), bottom),
            ]);
            path.close();
            surface.draw_path(&path, None, Some(pen.color));
        }
        BraceType::SquareBracket => {
            let path = Path::polyline(&[
                (px(inner), bottom - lw / 2.0),
                (px(outer), bottom - lw / 2.0),
                (px(outer), top + lw / 2.0),
                (px(inner), top + lw / 2.0),
            ]);
            surface.draw_path(&path, Some(pen), None);
        }
        BraceType::FloorBracket => {
            let path = Path::polyline(&[
                (px(inner), bottom - lw / 2.0),
                (px(outer), bottom - lw / 2.0),
                (px(outer), top),
            ]);
            surface.draw_path(&path, Some(pen), None);
        }
        BraceType::CeilBracket => {
            let path = Path::polyline(&[
                (px(outer), bottom),
                (px(outer), top + lw / 2.0),
                (px(inner), top + lw / 2.0),
            ]);
            surface.draw_path(&path, Some(pen), None);
        }
        BraceType::CurlyBracket => {
            // 尖端朝下的横向括号转 90° 后尖端朝左，正好是开括号
            let cx = left + width / 2.0;
            let reach = width * PAREN_FRACTION;
            let span = bottom - top;
            let path = horizontal_brace(cx - span / 2.0, cx + span / 2.0, mid - reach / 2.0, reach, !closing)
                .rotated_90(cx, mid);
            surface.draw_path(&path, Some(pen), None);
        }
        BraceType::SingleLine => {
            let thin = Pen {
                width: lw * BAR_LINE_FACTOR,
                ..*pen
            };
            let cx = left + width / 2.0;
            surface.draw_line(cx, top, cx, bottom, &thin);
        }
        BraceType::DoubleLine => {
            let thin = Pen {
                width: lw * BAR_LINE_FACTOR,
                ..*pen
            };
            let cx = left + width / 2.0;
            surface.draw_line(cx - lw, top, cx - lw, bottom, &thin);
            surface.draw_line(cx + lw, top, cx + lw, bottom, &thin);
        }
    }
}

pub(super) fn draw_brace(
    ctx: &LayoutContext<'_>,
    brace: &BraceNode,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    let layout = measure_brace(ctx, brace, env);
    let top = y - layout.metrics.baseline_height;
    let bottom = y + layout.metrics.descent();
    let pen = ctx.pen(env);
    if layout.open_width > 0.0 {
        draw_side(surface, brace.open, false, x, layout.open_width, top, bottom, &pen);
    }
    let after_child = ctx.draw(&brace.child, surface, x + layout.open_width, y, env);
    if layout.close_width > 0.0 {
        draw_side(surface, brace.close, true, after_child, layout.close_width, top, bottom, &pen);
    }
    x + layout.metrics.width
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::surface::PathCommand;

    #[test]
    fn braces_grow_with_content() {
        let small = measure(&math(r"\left(x\right)"));
        let tall = measure(&math(r"\left(\frac{\frac{a}{b}}{c}\right)"));
        assert!(tall.overall_height > small.overall_height);
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        let env = math_env();
        let normal = brace_width(&ctx, BraceType::Parenthesis, 20.0, &env);
        let big = brace_width(&ctx, BraceType::Parenthesis, 200.0, &env);
        assert!(big > normal);
        // 次线性增长
        assert!(big / normal < 200.0 / 20.0);
    }

    #[test]
    fn hidden_sides_take_no_room() {
        let both = measure(&math(r"\left|x\right|"));
        let one = measure(&math(r"\left.x\right|"));
        let none = measure(&math(r"\left.x\right."));
        assert!(one.width < both.width);
        assert!(none.width < one.width);
    }

    #[test]
    fn brace_is_centered_on_the_strikeout_line() {
        let m = measure(&math(r"\left[x\right]"));
        let above = m.baseline_height - m.strikeout_pos;
        assert!((above - m.overall_height / 2.0).abs() < 1e-3);
    }

    #[test]
    fn shapes_per_kind() {
        let (_, parens) = draw(&math(r"\left(x\right)"));
        assert_eq!(parens.scene().paths.len(), 2);
        assert!(parens.scene().paths.iter().all(|p| p.fill.is_some()));
        let (_, bars) = draw(&math(r"\left\|x\right\|"));
        assert_eq!(bars.scene().lines.len(), 4);
        let (_, curly) = draw(&math(r"\left\{x\right\}"));
        assert_eq!(curly.scene().paths.len(), 2);
        assert!(curly.scene().paths.iter().all(|p| p.pen.is_some()));
    }

    #[test]
    fn brace_paths_point_the_right_way() {
        let down = horizontal_brace(0.0, 10.0, 0.0, 2.0, true);
        assert_eq!(down.commands()[0], PathCommand::MoveTo(0.0, 0.0));
        let tip = down.commands().iter().find_map(|cmd| match cmd {
            PathCommand::CubicTo(_, _, _, _, x, y) if *x == 5.0 => Some(*y),
            _ => None,
        });
        assert_eq!(tip, Some(2.0));
        let up = horizontal_bracket(0.0, 10.0, 0.0, 2.0, false);
        assert_eq!(up.commands()[0], PathCommand::MoveTo(0.0, 2.0));
    }
}
