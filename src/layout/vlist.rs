//! 多行排版：`\\` 分出的行、`\substack` 以及未知环境的内容
//!
//! 每行从同一个环境出发，行内的 `\bf` 之类不会带到下一行。

use crate::ast::{HAlign, LineSpacing, VerticalListNode, VerticalOrientation};
use crate::environment::Environment;
use crate::metrics::BoxMetrics;
use crate::surface::DrawingSurface;

use super::{box_from, LayoutContext};

struct LinePlan {
    sizes: Vec<BoxMetrics>,
    /// 各行基线相对第一行基线的偏移
    baselines: Vec<f32>,
    metrics: BoxMetrics,
}

fn plan(ctx: &LayoutContext<'_>, list: &VerticalListNode, env: &Environment) -> LinePlan {
    let sizes: Vec<BoxMetrics> = list.lines.iter().map(|line| ctx.measure(line, env)).collect();
    let strikeout = ctx.strikeout(env);
    if sizes.is_empty() {
        return LinePlan {
            sizes,
            baselines: Vec::new(),
            metrics: BoxMetrics::new(0.0, 0.0, 0.0, strikeout),
        };
    }

    let font_spacing = ctx.line_spacing(env) * list.line_spacing_factor;
    let leading = (ctx.line_spacing(env) - ctx.ascent(env) - ctx.descent(env))
        .max(ctx.line_width(env))
        * list.line_spacing_factor;
    let mut baselines = Vec::with_capacity(sizes.len());
    let mut y = 0.0f32;
    for (index, size) in sizes.iter().enumerate() {
        if index > 0 {
            let previous = &sizes[index - 1];
            let tight = previous.descent() + leading + size.baseline_height;
            y += match list.spacing {
                LineSpacing::Default => tight.max(font_spacing),
                LineSpacing::Minimal => tight,
            };
        }
        baselines.push(y);
    }

    let width = sizes.iter().map(|s| s.width).fold(0.0f32, f32::max);
    let top = sizes[0].baseline_height;
    let last = sizes.len() - 1;
    let height = top + baselines[last] + sizes[last].descent();
    // 整体盒子的基线到顶边的距离
    let ascent = match list.orientation {
        VerticalOrientation::Top => 0.0,
        VerticalOrientation::FirstLine => top,
        VerticalOrientation::Centered => height / 2.0 + strikeout,
        VerticalOrientation::LastLine => top + baselines[last],
        VerticalOrientation::Bottom => height,
    };
    LinePlan {
        sizes,
        baselines,
        metrics: box_from(width, ascent.min(height), height - ascent.min(height), strikeout),
    }
}

pub(super) fn measure_lines(
    ctx: &LayoutContext<'_>,
    list: &VerticalListNode,
    env: &Environment,
) -> BoxMetrics {
    plan(ctx, list, env).metrics
}

pub(super) fn draw_lines(
    ctx: &LayoutContext<'_>,
    list: &VerticalListNode,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    let plan = plan(ctx, list, env);
    let Some(first) = plan.sizes.first() else {
        return x;
    };
    // 第一行基线的绝对位置
    let first_baseline = y - plan.metrics.baseline_height + first.baseline_height;
    let width = plan.metrics.width;
    for ((line, size), offset) in list.lines.iter().zip(&plan.sizes).zip(&plan.baselines) {
        let dx = match list.alignment {
            HAlign::Left => 0.0,
            HAlign::Center => (width - size.width) / 2.0,
            HAlign::Right => width - size.width,
        };
        ctx.draw(line, surface, x + dx, first_baseline + offset, env);
    }
    x + width
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::ast::Node;

    fn lines(orientation: VerticalOrientation, spacing: LineSpacing) -> VerticalListNode {
        VerticalListNode {
            lines: vec![Node::text("ab"), Node::text("longer")],
            alignment: HAlign::Right,
            spacing,
            line_spacing_factor: 1.0,
            orientation,
        }
    }

    #[test]
    fn orientation_moves_the_baseline() {
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        let env = Environment::default();
        let first = measure_lines(&ctx, &lines(VerticalOrientation::FirstLine, LineSpacing::Default), &env);
        let last = measure_lines(&ctx, &lines(VerticalOrientation::LastLine, LineSpacing::Default), &env);
        let top = measure_lines(&ctx, &lines(VerticalOrientation::Top, LineSpacing::Default), &env);
        let bottom = measure_lines(&ctx, &lines(VerticalOrientation::Bottom, LineSpacing::Default), &env);
        assert_eq!(first.overall_height, last.overall_height);
        assert!(last.baseline_height > first.baseline_height);
        assert_eq!(top.baseline_height, 0.0);
        assert_eq!(bottom.baseline_height, bottom.overall_height);
    }

    #[test]
    fn minimal_spacing_is_tighter() {
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        let env = Environment::default();
        let normal = measure_lines(&ctx, &lines(VerticalOrientation::FirstLine, LineSpacing::Default), &env);
        let minimal = measure_lines(&ctx, &lines(VerticalOrientation::FirstLine, LineSpacing::Minimal), &env);
        assert!(minimal.overall_height < normal.overall_height);
        assert_eq!(minimal.width, normal.width);
    }

    #[test]
    fn lines_are_aligned_right() {
        let node = Node::VerticalList(lines(VerticalOrientation::FirstLine, LineSpacing::Default));
        let (end, surface) = draw(&node);
        let items = &surface.scene().items;
        assert_eq!(items.len(), 2);
        assert!(items[0].x > items[1].x);
        assert!(items[1].y > items[0].y);
        assert!((end - measure(&node).width).abs() < 1e-4);
    }
}
