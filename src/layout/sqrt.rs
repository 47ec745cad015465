//! 根号：`\sqrt{x}` 与 `\sqrt[n]{x}`

use crate::ast::SqrtNode;
use crate::environment::Environment;
use crate::metrics::BoxMetrics;
use crate::surface::{DrawingSurface, Path};

use super::{box_from, LayoutContext};

/// 根号次数右端相对钩子宽度的位置
const DEGREE_ANCHOR: f32 = 0.6;
/// 内容高于钩子宽度这么多倍时改用竖直的根号线
const TALL_RATIO: f32 = 4.0;

struct SqrtLayout {
    metrics: BoxMetrics,
    child: BoxMetrics,
    hook_width: f32,
    /// 钩子起点相对节点起点的偏移（给次数留出的空间）
    hook_x: f32,
    ascent: f32,
    descent: f32,
    degree: Option<(f32, f32, Environment)>,
}

fn degree_env(ctx: &LayoutContext<'_>, env: &Environment) -> Environment {
    env.scaled(ctx.config().sqrt_small_font_factor).upright()
}

fn layout(ctx: &LayoutContext<'_>, sqrt: &SqrtNode, env: &Environment) -> SqrtLayout {
    let cfg = ctx.config();
    let cs = ctx.measure(&sqrt.child, env);
    let lw = ctx.line_width(env);
    let hook_width = ctx.advance(env, "X") * cfg.sqrt_width_x_factor;
    let ascent = (cs.baseline_height * cfg.sqrt_height_factor).max(ctx.ascent(env)) + lw;
    let descent = (cs.descent() * cfg.sqrt_height_factor).max(ctx.descent(env));

    let mut box_ascent = ascent;
    let mut hook_x = 0.0;
    let mut degree = None;
    if let Some(node) = &sqrt.degree {
        let denv = degree_env(ctx, env);
        let dm = ctx.measure(node, &denv);
        hook_x = (dm.width - DEGREE_ANCHOR * hook_width).max(0.0);
        // 次数的底边位于钩子起点上方
        let lift = cs.strikeout_pos + 2.0 * lw + dm.descent();
        box_ascent = box_ascent.max(lift + dm.baseline_height);
        degree = Some((hook_x + DEGREE_ANCHOR * hook_width - dm.width, -lift, denv));
    }
    SqrtLayout {
        metrics: box_from(
            hook_x + hook_width + cs.width,
            box_ascent,
            descent,
            cs.strikeout_pos,
        ),
        child: cs,
        hook_width,
        hook_x,
        ascent,
        descent,
        degree,
    }
}

pub(super) fn measure_sqrt(ctx: &LayoutContext<'_>, sqrt: &SqrtNode, env: &Environment) -> BoxMetrics {
    layout(ctx, sqrt, env).metrics
}

pub(super) fn draw_sqrt(
    ctx: &LayoutContext<'_>,
    sqrt: &SqrtNode,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    let layout = layout(ctx, sqrt, env);
    let lw = ctx.line_width(env);
    let x0 = x + layout.hook_x;
    let sw = layout.hook_width;
    let strike = layout.child.strikeout_pos;
    let top = y - layout.ascent + lw / 2.0;
    let bottom = y + layout.descent;
    let end = x0 + sw + layout.child.width;

    let tall = layout.child.overall_height > TALL_RATIO * sw;
    let points = if tall {
        vec![
            (x0, y - strike),
            (x0 + 0.3 * sw, y - strike - lw),
            (x0 + sw, bottom),
            (x0 + sw, top),
            (end, top),
        ]
    } else {
        vec![
            (x0, y - strike),
            (x0 + 0.25 * sw, y - strike - lw),
            (x0 + 0.5 * sw, bottom),
            (x0 + sw, top),
            (end, top),
        ]
    };
    surface.draw_path(&Path::polyline(&points), Some(&ctx.pen(env)), None);

    if let (Some(node), Some((dx, dy, denv))) = (&sqrt.degree, layout.degree) {
        ctx.draw(node, surface, x + dx, y + dy, &denv);
    }
    ctx.draw(&sqrt.child, surface, x0 + sw, y, env);
    x + layout.metrics.width
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;

    #[test]
    fn root_covers_its_content() {
        let child = measure(&math("x"));
        let root = measure(&math(r"\sqrt{x}"));
        assert!(root.width > child.width);
        assert!(root.baseline_height > child.baseline_height);
        let (_, surface) = draw(&math(r"\sqrt{x}"));
        assert_eq!(surface.scene().paths.len(), 1);
        assert_eq!(surface.scene().items.len(), 1);
    }

    #[test]
    fn long_degrees_widen_the_root() {
        let plain = measure(&math(r"\sqrt{x}"));
        let short = measure(&math(r"\sqrt[3]{x}"));
        let long = measure(&math(r"\sqrt[123]{x}"));
        assert!(short.width >= plain.width);
        assert!(long.width > short.width);
        let (_, surface) = draw(&math(r"\sqrt[3]{x}"));
        assert_eq!(surface.scene().items.len(), 2);
    }
}
