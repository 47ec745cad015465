//! 上标与下标
//!
//! 位置以 x 高度为尺度。前一个兄弟特别高（或特别深）时切换到特殊模式，
//! 让上下标跟随前一个盒子的边缘。

use crate::ast::Node;
use crate::environment::Environment;
use crate::metrics::BoxMetrics;
use crate::surface::DrawingSurface;

use super::{box_from, LayoutContext};

/// 上下标的摆放结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct ScriptPlacement {
    pub child_env: Environment,
    /// 子节点基线相对父基线向下的偏移，上标为负
    pub baseline_offset: f32,
    pub metrics: BoxMetrics,
}

pub(super) fn script_env(ctx: &LayoutContext<'_>, env: &Environment) -> Environment {
    env.scaled(ctx.config().subsuper_size_factor)
}

pub(super) fn place_superscript(
    ctx: &LayoutContext<'_>,
    child: &Node,
    env: &Environment,
    prev: Option<&BoxMetrics>,
) -> ScriptPlacement {
    let cfg = ctx.config();
    let child_env = script_env(ctx, env);
    let cs = ctx.measure(child, &child_env);
    let x_height = ctx.tight(env, "x").height;
    let mut shift = cfg.super_shift_factor * x_height;
    if let Some(prev) = prev {
        let modified = prev.baseline_height
            - 2.0 * cs.descent()
            - cfg.special_super_shift_factor * cs.baseline_height;
        shift = shift.max(modified);
    }
    let strikeout = prev.map_or_else(|| ctx.strikeout(env), |p| p.strikeout_pos);
    ScriptPlacement {
        child_env,
        baseline_offset: -(shift + cs.descent()),
        metrics: box_from(cs.width, cs.overall_height + shift, -shift, strikeout),
    }
}

pub(super) fn place_subscript(
    ctx: &LayoutContext<'_>,
    child: &Node,
    env: &Environment,
    prev: Option<&BoxMetrics>,
) -> ScriptPlacement {
    let cfg = ctx.config();
    let child_env = script_env(ctx, env);
    let cs = ctx.measure(child, &child_env);
    let mut shift = cs.baseline_height - cfg.sub_shift_factor * ctx.x_height(&child_env);
    if let Some(prev) = prev {
        shift = shift.max(prev.descent() + cfg.special_sub_shift_factor * cs.baseline_height);
    }
    ScriptPlacement {
        child_env,
        baseline_offset: shift,
        metrics: box_from(
            cs.width,
            cs.baseline_height - shift,
            cs.descent() + shift,
            ctx.strikeout(env),
        ),
    }
}

pub(super) fn draw_superscript(
    ctx: &LayoutContext<'_>,
    child: &Node,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
    prev: Option<&BoxMetrics>,
) -> f32 {
    let placed = place_superscript(ctx, child, env, prev);
    ctx.draw(child, surface, x, y + placed.baseline_offset, &placed.child_env);
    x + placed.metrics.width
}

pub(super) fn draw_subscript(
    ctx: &LayoutContext<'_>,
    child: &Node,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
    prev: Option<&BoxMetrics>,
) -> f32 {
    let placed = place_subscript(ctx, child, env, prev);
    ctx.draw(child, surface, x, y + placed.baseline_offset, &placed.child_env);
    x + placed.metrics.width
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn scripts_use_a_smaller_font() {
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        let env = math_env();
        let sup = place_superscript(&ctx, &Node::text("2"), &env, None);
        assert!((sup.child_env.size - env.size * 0.7).abs() < 1e-4);
        assert!(sup.baseline_offset < 0.0);
        assert_eq!(sup.metrics.descent(), 0.0);

        let sub = place_subscript(&ctx, &Node::text("i"), &env, None);
        assert!(sub.baseline_offset > 0.0);
        assert!(sub.metrics.descent() > 0.0);
        assert_valid(&sub.metrics);
    }

    #[test]
    fn tall_neighbours_push_scripts_outward() {
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        let env = math_env();
        let tall = BoxMetrics::new(10.0, 60.0, 120.0, 6.0);
        let normal = place_superscript(&ctx, &Node::text("2"), &env, None);
        let special = place_superscript(&ctx, &Node::text("2"), &env, Some(&tall));
        assert!(special.baseline_offset < normal.baseline_offset);
        assert_eq!(special.metrics.strikeout_pos, 6.0);

        let low = place_subscript(&ctx, &Node::text("2"), &env, None);
        let deep = place_subscript(&ctx, &Node::text("2"), &env, Some(&tall));
        assert!(deep.baseline_offset > low.baseline_offset);
    }
}
