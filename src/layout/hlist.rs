//! 水平列表：把兄弟节点从左到右排开
//!
//! 先生成一份摆放计划（每个片段的类别、环境与横向偏移），测量与绘制都从这份计划出发，
//! 两者的几何因此完全一致。上下标与前一个兄弟、大型运算符与其上下限在这里配对。

use crate::ast::Node;
use crate::environment::Environment;
use crate::metrics::BoxMetrics;
use crate::surface::DrawingSurface;

use super::script::{self, ScriptPlacement};
use super::symbol;
use super::{apply_modifier, box_from, merge_vertical, LayoutContext};

#[derive(Debug, Clone, Copy)]
enum Piece<'n> {
    Node(&'n Node),
    Sub(ScriptPlacement, &'n Node),
    Sup(ScriptPlacement, &'n Node),
    Operator {
        op: &'n Node,
        sub: Option<&'n Node>,
        sup: Option<&'n Node>,
    },
}

#[derive(Debug, Clone, Copy)]
struct Placed<'n> {
    piece: Piece<'n>,
    env: Environment,
    x: f32,
}

struct Plan<'n> {
    placed: Vec<Placed<'n>>,
    metrics: BoxMetrics,
}

/// 运算符上下限的几何，相对运算符片段的起点与基线
#[derive(Debug, Clone, Copy)]
struct LimitPlacement {
    dx: f32,
    dy: f32,
}

#[derive(Debug, Clone, Copy)]
struct OperatorLayout {
    metrics: BoxMetrics,
    op_dx: f32,
    script_env: Environment,
    sub: Option<LimitPlacement>,
    sup: Option<LimitPlacement>,
}

/// 上下标节点里真正要排版的内容
fn script_body(node: &Node) -> &Node {
    match node {
        Node::Subscript(child) | Node::Superscript(child) => child,
        other => other,
    }
}

fn operator_layout(
    ctx: &LayoutContext<'_>,
    op: &Node,
    sub: Option<&Node>,
    sup: Option<&Node>,
    env: &Environment,
) -> OperatorLayout {
    let cfg = ctx.config();
    let (om, correction) = match op {
        Node::Symbol(sym) => {
            let layout = symbol::measure_symbol(ctx, sym, env);
            (layout.metrics, layout.limit_correction)
        }
        other => (ctx.measure(other, env), 0.0),
    };
    let script_env = env.scaled(cfg.operatorsubsuper_size_factor);
    let distance = ctx.x_height(env) * cfg.operatorsubsuper_distance_factor;
    let extra = ctx.advance(env, "x") * cfg.operatorsubsuper_extraspace_factor;
    let sub_size = sub.map(|node| ctx.measure(script_body(node), &script_env));
    let sup_size = sup.map(|node| ctx.measure(script_body(node), &script_env));

    let inner = [
        Some(om.width),
        sub_size.map(|m| m.width + correction),
        sup_size.map(|m| m.width + correction),
    ]
    .into_iter()
    .flatten()
    .fold(0.0f32, f32::max);
    let width = inner + extra;

    let mut ascent = om.baseline_height;
    let mut descent = om.descent();
    let sub = sub_size.map(|m| {
        descent += m.overall_height + distance;
        LimitPlacement {
            dx: (width - m.width) / 2.0 - correction,
            dy: om.descent() + distance + m.baseline_height,
        }
    });
    let sup = sup_size.map(|m| {
        ascent += m.overall_height + distance;
        LimitPlacement {
            dx: (width - m.width) / 2.0 + correction,
            dy: -(om.baseline_height + distance + m.descent()),
        }
    });
    OperatorLayout {
        metrics: box_from(width, ascent, descent, om.strikeout_pos),
        op_dx: (width - om.width) / 2.0,
        script_env,
        sub,
        sup,
    }
}

/// 节点对后续兄弟环境的影响；不带花括号的嵌套列表会把修改带出来
pub(super) fn carry_modifiers(ctx: &LayoutContext<'_>, node: &Node, env: &mut Environment) {
    match node {
        Node::ModifyEnvironment(modify) => apply_modifier(ctx, env, modify),
        Node::HorizontalList(items) => {
            for item in items {
                carry_modifiers(ctx, item, env);
            }
        }
        _ => {}
    }
}

fn plan<'n>(ctx: &LayoutContext<'_>, items: &'n [Node], start: &Environment) -> Plan<'n> {
    let cfg = ctx.config();
    let mut env = *start;
    let mut placed = Vec::with_capacity(items.len());
    let mut acc = BoxMetrics::new(0.0, 0.0, 0.0, ctx.strikeout(&env));
    let mut x = 0.0f32;
    let mut prev: Option<BoxMetrics> = None;
    let mut i = 0;

    while i < items.len() {
        let node = &items[i];
        let next = items.get(i + 1);
        let (extent, advance, consumed) = match node {
            Node::Subscript(_) | Node::Superscript(_) => {
                let (sup, sub): (Option<&Node>, Option<&Node>) = match (node, next) {
                    (Node::Superscript(sup), Some(Node::Subscript(sub)))
                    | (Node::Subscript(sub), Some(Node::Superscript(sup))) => (Some(&**sup), Some(&**sub)),
                    (Node::Superscript(sup), _) => (Some(&**sup), None),
                    (Node::Subscript(sub), _) => (None, Some(&**sub)),
                    _ => (None, None),
                };
                let selection = cfg.subsuper_mode_selection_by_size_factor;
                let special_sup = prev.filter(|p| p.baseline_height >= ctx.ascent(&env) * selection);
                let special_sub = prev.filter(|p| p.descent() >= ctx.descent(&env) * selection);
                let x_correction =
                    prev.map_or(0.0, |p| p.baseline_x_correction) + ctx.line_width(&env) * 0.5;

                let mut extent = BoxMetrics::new(0.0, 0.0, 0.0, ctx.strikeout(&env));
                let mut sup_width = None;
                let mut sub_width = None;
                if let Some(child) = sup {
                    let placement = script::place_superscript(ctx, child, &env, special_sup.as_ref());
                    merge_vertical(&mut extent, &placement.metrics);
                    extent.strikeout_pos = placement.metrics.strikeout_pos;
                    sup_width = Some(placement.metrics.width);
                    placed.push(Placed {
                        piece: Piece::Sup(placement, child),
                        env,
                        x,
                    });
                }
                if let Some(child) = sub {
                    let placement = script::place_subscript(ctx, child, &env, special_sub.as_ref());
                    merge_vertical(&mut extent, &placement.metrics);
                    sub_width = Some(placement.metrics.width);
                    placed.push(Placed {
                        piece: Piece::Sub(placement, child),
                        env,
                        x: x + x_correction,
                    });
                }
                let advance = match (sup_width, sub_width) {
                    (Some(sw), Some(bw)) => (sw + ctx.advance(&env, " ")).max(bw + x_correction),
                    (Some(sw), None) => sw,
                    (None, Some(bw)) => bw + x_correction,
                    (None, None) => 0.0,
                };
                let consumed = if sup.is_some() && sub.is_some() { 2 } else { 1 };
                (extent, advance, consumed)
            }
            _ if node.is_above_below() => {
                let after = items.get(i + 2);
                let (sub, sup, consumed) = match (next, after) {
                    (Some(s @ Node::Subscript(_)), Some(p @ Node::Superscript(_)))
                    | (Some(p @ Node::Superscript(_)), Some(s @ Node::Subscript(_))) => {
                        (Some(s), Some(p), 3)
                    }
                    (Some(s @ Node::Subscript(_)), _) => (Some(s), None, 2),
                    (Some(p @ Node::Superscript(_)), _) => (None, Some(p), 2),
                    _ => (None, None, 1),
                };
                let layout = operator_layout(ctx, node, sub, sup, &env);
                placed.push(Placed {
                    piece: Piece::Operator { op: node, sub, sup },
                    env,
                    x,
                });
                (layout.metrics, layout.metrics.width, consumed)
            }
            _ => {
                let size = ctx.measure(node, &env);
                placed.push(Placed {
                    piece: Piece::Node(node),
                    env,
                    x,
                });
                carry_modifiers(ctx, node, &mut env);
                (size, size.width, 1)
            }
        };
        if merge_vertical(&mut acc, &extent) {
            acc.strikeout_pos = extent.strikeout_pos;
        }
        acc.baseline_x_correction = extent.baseline_x_correction;
        x += advance;
        prev = Some(extent);
        i += consumed;
    }
    acc.width = x;
    Plan {
        placed,
        metrics: acc,
    }
}

pub(super) fn measure_list(ctx: &LayoutContext<'_>, items: &[Node], env: &Environment) -> BoxMetrics {
    plan(ctx, items, env).metrics
}

pub(super) fn draw_list(
    ctx: &LayoutContext<'_>,
    items: &[Node],
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    let plan = plan(ctx, items, env);
    for placed in &plan.placed {
        let px = x + placed.x;
        match placed.piece {
            Piece::Node(node) => {
                ctx.draw(node, surface, px, y, &placed.env);
            }
            Piece::Sub(placement, child) | Piece::Sup(placement, child) => {
                ctx.draw(child, surface, px, y + placement.baseline_offset, &placement.child_env);
            }
            Piece::Operator { op, sub, sup } => {
                let layout = operator_layout(ctx, op, sub, sup, &placed.env);
                ctx.draw(op, surface, px + layout.op_dx, y, &placed.env);
                if let (Some(node), Some(at)) = (sub, layout.sub) {
                    ctx.draw(script_body(node), surface, px + at.dx, y + at.dy, &layout.script_env);
                }
                if let (Some(node), Some(at)) = (sup, layout.sup) {
                    ctx.draw(script_body(node), surface, px + at.dx, y + at.dy, &layout.script_env);
                }
            }
        }
    }
    x + plan.metrics.width
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn script_order_does_not_matter() {
        let a = measure(&math("x^2_3"));
        let b = measure(&math("x_3^2"));
        assert_eq!(a, b);
    }

    #[test]
    fn operator_limits_in_either_order() {
        let a = measure(&math(r"\sum_{i}^{n}"));
        let b = measure(&math(r"\sum^{n}_{i}"));
        assert_eq!(a, b);
        assert_valid(&a);
    }

    #[test]
    fn tall_sibling_pushes_subscript_down() {
        // 前一个兄弟节点的下沉足够大时，下标相对它来放置
        let bare = measure(&math(r"\left(\frac{a}{b}\right)"));
        let scripted = measure(&math(r"\left(\frac{a}{b}\right)_2"));
        let plain = measure(&math("x_2"));
        assert!(scripted.descent() > bare.descent());
        assert!(scripted.descent() > plain.descent());
    }

    #[test]
    fn scripts_extend_the_line() {
        let base = measure(&math("x"));
        let sup = measure(&math("x^2"));
        let sub = measure(&math("x_2"));
        assert!(sup.baseline_height > base.baseline_height);
        assert!(sub.descent() > base.descent());
        assert!(sup.width > base.width);
    }

    #[test]
    fn limits_sit_above_and_below() {
        let side = measure(&math(r"\sum\nolimits_{i=0}^{n}"));
        let stacked = measure(&math(r"\sum_{i=0}^{n}"));
        assert!(stacked.overall_height > side.overall_height);
        assert!(stacked.width < side.width);
    }

    #[test]
    fn modifiers_reach_later_siblings_only() {
        let plain = measure(&math("ab"));
        let scaled = measure(&math(r"a\large b"));
        assert!(scaled.width > plain.width);
        // 花括号限制修改的范围
        let grouped = measure(&math(r"{\large a}b"));
        let after = measure(&math(r"{\large a}\large b"));
        assert!(after.width > grouped.width);
    }

    #[test]
    fn list_width_is_sum_of_children() {
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        let env = math_env();
        let items = vec![Node::text("a"), Node::symbol("+"), Node::text("b")];
        let total: f32 = items.iter().map(|node| ctx.measure(node, &env).width).sum();
        assert!((measure_list(&ctx, &items, &env).width - total).abs() < 1e-4);
        assert!(measure_list(&ctx, &[], &env).width == 0.0);
    }
}
