//! 分数与堆叠：`\frac`、`\sfrac`、`\binom`、`\underbrace`、`\overset` 等
//!
//! 所有模式都先算出一份 `FracLayout`（两个子节点的偏移与要画的线），
//! 测量只取其中的盒子尺寸。

use crate::ast::{FracMode, FracNode, Node};
use crate::environment::Environment;
use crate::metrics::BoxMetrics;
use crate::surface::{DrawingSurface, Path};

use super::brace::{horizontal_brace, horizontal_bracket};
use super::{box_from, LayoutContext};

/// 子节点相对分数起点与基线的位置
#[derive(Debug, Clone, Copy)]
struct Slot {
    dx: f32,
    dy: f32,
    env: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Rule {
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    Brace { x0: f32, x1: f32, top: f32, height: f32, down: bool },
    Bracket { x0: f32, x1: f32, top: f32, height: f32, down: bool },
}

#[derive(Debug, Clone)]
struct FracLayout {
    metrics: BoxMetrics,
    numerator: Slot,
    denominator: Slot,
    rule: Option<Rule>,
}

/// 标签（缩小的那一个子节点）使用的环境
///
/// 已经处在另一个分数里时，用 `frac_nested_factor` 取代 `frac_factor`；
/// 显示样式与 `\dfrac` 不缩小，`\dfrac` 也不增加嵌套深度。
fn child_env(ctx: &LayoutContext<'_>, mode: FracMode, env: &Environment) -> Environment {
    let cfg = ctx.config();
    let base = if env.frac_depth > 0 && !env.display_style {
        cfg.frac_nested_factor
    } else {
        cfg.frac_factor
    };
    let factor = match mode {
        FracMode::Plain | FracMode::Slanted | FracMode::Stack => base,
        FracMode::Display => 1.0,
        FracMode::Small | FracMode::StackedSlanted => base * 0.7,
        FracMode::Underbrace | FracMode::Overbrace | FracMode::Underbracket | FracMode::Overbracket => {
            cfg.underbrace_factor
        }
        FracMode::Underset | FracMode::Overset | FracMode::StackRel => cfg.underset_factor,
    };
    let mut out = env.scaled(factor);
    if mode.nests() {
        out.frac_depth = out.frac_depth.saturating_add(1);
    }
    out
}

fn layout(ctx: &LayoutContext<'_>, frac: &FracNode, env: &Environment) -> FracLayout {
    let scaled = child_env(ctx, frac.mode, env);
    match frac.mode {
        FracMode::Plain | FracMode::Display | FracMode::Small | FracMode::Stack => {
            stacked(ctx, frac, env, scaled)
        }
        FracMode::Slanted => slanted(ctx, frac, env, scaled),
        FracMode::StackedSlanted => stacked_slanted(ctx, frac, env, scaled),
        FracMode::Underbrace | FracMode::Underbracket => braced(ctx, frac, env, scaled, true),
        FracMode::Overbrace | FracMode::Overbracket => braced(ctx, frac, env, scaled, false),
        FracMode::Underset => annotated(ctx, frac, env, scaled, true),
        FracMode::Overset | FracMode::StackRel => annotated(ctx, frac, env, scaled, false),
    }
}

/// 分子在上、分母在下，中间是分数线
fn stacked(ctx: &LayoutContext<'_>, frac: &FracNode, env: &Environment, cenv: Environment) -> FracLayout {
    let num = ctx.measure(&frac.numerator, &cenv);
    let den = ctx.measure(&frac.denominator, &cenv);
    let axis = ctx.x_height(env) * 0.5;
    let gap = ctx.x_height(env) * ctx.config().frac_shift_factor;
    let xw = ctx.advance(env, "x");
    let width = num.width.max(den.width) + xw;

    let rule = (frac.mode != FracMode::Stack).then_some(Rule::Line {
        x1: xw / 4.0,
        y1: -axis,
        x2: width - xw / 4.0,
        y2: -axis,
    });
    FracLayout {
        metrics: box_from(
            width,
            axis + gap + num.overall_height,
            gap + den.overall_height - axis,
            axis,
        ),
        numerator: Slot {
            dx: (width - num.width) / 2.0,
            dy: -(axis + gap + num.descent()),
            env: cenv,
        },
        denominator: Slot {
            dx: (width - den.width) / 2.0,
            dy: -axis + gap + den.baseline_height,
            env: cenv,
        },
        rule,
    }
}

/// `\sfrac`：分子抬高、分母在基线上，中间一条斜线
fn slanted(ctx: &LayoutContext<'_>, frac: &FracNode, env: &Environment, cenv: Environment) -> FracLayout {
    let num = ctx.measure(&frac.numerator, &cenv);
    let den = ctx.measure(&frac.denominator, &cenv);
    let up = ctx.x_height(env) * 0.5;
    let slash = ctx.advance(env, "x");
    let ascent = (up + num.baseline_height).max(den.baseline_height);
    let descent = den.descent().max(num.descent() - up);
    FracLayout {
        metrics: box_from(num.width + slash + den.width, ascent, descent, ctx.strikeout(env)),
        numerator: Slot {
            dx: 0.0,
            dy: -up,
            env: cenv,
        },
        denominator: Slot {
            dx: num.width + slash,
            dy: 0.0,
            env: cenv,
        },
        rule: Some(Rule::Line {
            x1: num.width,
            y1: descent,
            x2: num.width + slash,
            y2: -ascent,
        }),
    }
}

/// `\stfrac`：上下堆叠，分子靠左、分母靠右，斜线分隔
fn stacked_slanted(
    ctx: &LayoutContext<'_>,
    frac: &FracNode,
    env: &Environment,
    cenv: Environment,
) -> FracLayout {
    let num = ctx.measure(&frac.numerator, &cenv);
    let den = ctx.measure(&frac.denominator, &cenv);
    let axis = ctx.x_height(env) * 0.5;
    let gap = ctx.x_height(env) * ctx.config().frac_shift_factor;
    let xw = ctx.advance(env, "x");
    let width = num.width.max(den.width) + xw;
    let ascent = axis + gap + num.overall_height;
    let descent = gap + den.overall_height - axis;
    FracLayout {
        metrics: box_from(width, ascent, descent, axis),
        numerator: Slot {
            dx: xw / 4.0,
            dy: -(axis + gap + num.descent()),
            env: cenv,
        },
        denominator: Slot {
            dx: width - xw / 4.0 - den.width,
            dy: -axis + gap + den.baseline_height,
            env: cenv,
        },
        rule: Some(Rule::Line {
            x1: xw / 4.0,
            y1: descent.max(0.0),
            x2: width - xw / 4.0,
            y2: -ascent,
        }),
    }
}

/// 横向花括号或方括号：分子是内容，分母是标注
fn braced(
    ctx: &LayoutContext<'_>,
    frac: &FracNode,
    env: &Environment,
    cenv: Environment,
    under: bool,
) -> FracLayout {
    let content = ctx.measure(&frac.numerator, env);
    let label = ctx.measure(&frac.denominator, &cenv);
    let lw = ctx.line_width(env);
    let brace_height = ctx.tight(env, "M").height / 2.0;
    let width = content.width.max(label.width);
    let x0 = (width - content.width) / 2.0;
    let x1 = x0 + content.width;
    let curly = matches!(frac.mode, FracMode::Underbrace | FracMode::Overbrace);

    let (top, label_dy, ascent, descent) = if under {
        let top = content.descent() + lw;
        (
            top,
            top + brace_height + lw + label.baseline_height,
            content.baseline_height,
            top + brace_height + lw + label.overall_height,
        )
    } else {
        let top = -(content.baseline_height + lw + brace_height);
        (
            top,
            top - lw - label.descent(),
            -top + lw + label.overall_height,
            content.descent(),
        )
    };
    let rule = if curly {
        Rule::Brace {
            x0,
            x1,
            top,
            height: brace_height,
            down: under,
        }
    } else {
        Rule::Bracket {
            x0,
            x1,
            top,
            height: brace_height,
            down: under,
        }
    };
    FracLayout {
        metrics: box_from(width, ascent, descent, content.strikeout_pos),
        numerator: Slot {
            dx: x0,
            dy: 0.0,
            env: *env,
        },
        denominator: Slot {
            dx: (width - label.width) / 2.0,
            dy: label_dy,
            env: cenv,
        },
        rule: Some(rule),
    }
}

/// `\underset`、`\overset`、`\stackrel`：分子是标注，分母是基准
fn annotated(
    ctx: &LayoutContext<'_>,
    frac: &FracNode,
    env: &Environment,
    cenv: Environment,
    under: bool,
) -> FracLayout {
    let label = ctx.measure(&frac.numerator, &cenv);
    let base = ctx.measure(&frac.denominator, env);
    let gap = ctx.x_height(env) / 6.0;
    let width = base.width.max(label.width);
    let (label_dy, ascent, descent) = if under {
        (
            base.descent() + gap + label.baseline_height,
            base.baseline_height,
            base.descent() + gap + label.overall_height,
        )
    } else {
        (
            -(base.baseline_height + gap + label.descent()),
            base.baseline_height + gap + label.overall_height,
            base.descent(),
        )
    };
    FracLayout {
        metrics: box_from(width, ascent, descent, base.strikeout_pos),
        numerator: Slot {
            dx: (width - label.width) / 2.0,
            dy: label_dy,
            env: cenv,
        },
        denominator: Slot {
            dx: (width - base.width) / 2.0,
            dy: 0.0,
            env: *env,
        },
        rule: None,
    }
}

pub(super) fn measure_frac(ctx: &LayoutContext<'_>, frac: &FracNode, env: &Environment) -> BoxMetrics {
    layout(ctx, frac, env).metrics
}

fn draw_slot(ctx: &LayoutContext<'_>, node: &Node, slot: &Slot, surface: &mut dyn DrawingSurface, x: f32, y: f32) {
    ctx.draw(node, surface, x + slot.dx, y + slot.dy, &slot.env);
}

pub(super) fn draw_frac(
    ctx: &LayoutContext<'_>,
    frac: &FracNode,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    let layout = layout(ctx, frac, env);
    draw_slot(ctx, &frac.numerator, &layout.numerator, surface, x, y);
    draw_slot(ctx, &frac.denominator, &layout.denominator, surface, x, y);
    let pen = ctx.pen(env);
    match layout.rule {
        Some(Rule::Line { x1, y1, x2, y2 }) => {
            surface.draw_line(x + x1, y + y1, x + x2, y + y2, &pen);
        }
        Some(Rule::Brace {
            x0,
            x1,
            top,
            height,
            down,
        }) => {
            let path = horizontal_brace(x + x0, x + x1, y + top, height, down);
            surface.draw_path(&path, Some(&pen), None);
        }
        Some(Rule::Bracket {
            x0,
            x1,
            top,
            height,
            down,
        }) => {
            let path: Path = horizontal_bracket(x + x0, x + x1, y + top, height, down);
            surface.draw_path(&path, Some(&pen), None);
        }
        None => {}
    }
    x + layout.metrics.width
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn fraction_is_taller_than_its_parts() {
        let frac = measure(&math(r"\frac{a}{b}"));
        let a = measure(&math("a"));
        let b = measure(&math("b"));
        assert!(frac.overall_height > a.overall_height + b.overall_height * 0.5);
        assert!(frac.descent() > 0.0);
        let (_, surface) = draw(&math(r"\frac{a}{b}"));
        assert_eq!(surface.scene().lines.len(), 1);
    }

    #[test]
    fn nested_fractions_shrink_unless_display() {
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        let mut env = math_env();
        let outer = child_env(&ctx, FracMode::Plain, &env);
        assert_eq!(outer.frac_depth, 1);
        assert!((outer.size - env.size * cfg.frac_factor).abs() < 1e-4);
        // 内层直接换成嵌套系数，不与外层系数相乘
        let inner = child_env(&ctx, FracMode::Plain, &outer);
        assert!((inner.size - outer.size * cfg.frac_nested_factor).abs() < 1e-4);
        env.display_style = true;
        env.frac_depth = 1;
        assert!((child_env(&ctx, FracMode::Plain, &env).size - env.size * cfg.frac_factor).abs() < 1e-4);
        assert_eq!(child_env(&ctx, FracMode::Display, &env).size, env.size);
    }

    #[test]
    fn fraction_inside_dfrac_is_not_nested() {
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        let env = math_env();
        let display = child_env(&ctx, FracMode::Display, &env);
        assert_eq!(display.frac_depth, 0);
        let inner = child_env(&ctx, FracMode::Plain, &display);
        assert!((inner.size / display.size - cfg.frac_factor).abs() < 1e-4);

        // 整棵树上也一样：\dfrac 里的 \frac 与顶层的 \frac 同样大
        let in_dfrac = measure(&math(r"\dfrac{\frac{a}{b}}{c}"));
        let in_frac = measure(&math(r"\frac{\frac{a}{b}}{c}"));
        assert!(in_dfrac.overall_height > in_frac.overall_height);
    }

    #[test]
    fn binomials_have_no_bar() {
        let (_, surface) = draw(&math(r"\binom{n}{k}"));
        assert!(surface.scene().lines.is_empty());
    }

    #[test]
    fn slanted_fraction_is_wide_and_flat() {
        let slanted = measure(&math(r"\sfrac{1}{2}"));
        let plain = measure(&math(r"\frac{1}{2}"));
        assert!(slanted.width > plain.width);
        assert!(slanted.overall_height < plain.overall_height);
    }

    #[test]
    fn braces_grow_on_their_side() {
        let base = measure(&math("a+b"));
        let under = measure(&math(r"\underbrace{a+b}_{n}"));
        let over = measure(&math(r"\overbrace{a+b}^{n}"));
        assert_eq!(under.baseline_height, base.baseline_height);
        assert!(under.descent() > base.descent());
        assert!(over.baseline_height > base.baseline_height);
        let (_, surface) = draw(&math(r"\underbracket{a+b}_{n}"));
        assert_eq!(surface.scene().paths.len(), 1);
    }

    #[test]
    fn overset_keeps_base_on_the_baseline() {
        let base = measure(&math("="));
        let over = measure(&math(r"\stackrel{def}{=}"));
        let under = measure(&math(r"\underset{x}{=}"));
        assert!(over.baseline_height > base.baseline_height);
        assert_eq!(over.descent(), base.descent());
        assert!(under.descent() > base.descent());
    }
}
