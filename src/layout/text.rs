//! 文本叶子与 verbatim 块
//!
//! 一段文本按字体切成若干 run：数学模式下数字与标点保持直立，小型大写字母缩小字号。

use crate::ast::{HAlign, VerbatimNode};
use crate::environment::{Environment, FontRole, TextTransform};
use crate::metrics::{BoxMetrics, FontSpec};
use crate::parse::rules::symbols::double_struck;
use crate::surface::DrawingSurface;

use super::{box_from, LayoutContext};

/// 小型大写字母相对正常字号的比例
const SMALL_CAPS_SCALE: f32 = 0.8;
/// verbatim 中可见空格使用的字形
const VISIBLE_SPACE: char = '\u{2423}';

/// 使用同一字体的一段文字
#[derive(Debug, Clone, PartialEq)]
struct Run {
    text: String,
    font: FontSpec,
}

/// 数学模式中不随变量倾斜的字符
fn stays_upright(ch: char) -> bool {
    ch.is_ascii_digit() || ch.is_ascii_punctuation() || ch.is_whitespace()
}

pub(crate) fn apply_transform(text: &str, transform: TextTransform) -> String {
    match transform {
        TextTransform::None => text.to_string(),
        TextTransform::Upper => text.to_uppercase(),
        TextTransform::Lower => text.to_lowercase(),
    }
}

fn split_runs(text: &str, env: &Environment) -> Vec<Run> {
    let text = apply_transform(text, env.transform);
    let base = env.font_spec();
    let mut runs: Vec<Run> = Vec::new();
    for ch in text.chars() {
        let mut font = base;
        let mut ch = ch;
        if env.inside_math && stays_upright(ch) {
            font.italic = false;
        }
        if env.role == FontRole::Blackboard {
            ch = double_struck(ch);
        }
        if env.small_caps && ch.is_lowercase() {
            font.size *= SMALL_CAPS_SCALE;
        }
        let shown: String = if env.small_caps {
            ch.to_uppercase().collect()
        } else {
            ch.to_string()
        };
        match runs.last_mut() {
            Some(run) if run.font == font => run.text.push_str(&shown),
            _ => runs.push(Run { text: shown, font }),
        }
    }
    runs
}

/// 下划线在基线以下的位置
fn underline_offset(ctx: &LayoutContext<'_>, env: &Environment) -> f32 {
    (ctx.descent(env) * 0.5).max(ctx.line_width(env) * 2.0)
}

/// 上划线在基线以上的位置
fn overline_offset(ctx: &LayoutContext<'_>, env: &Environment) -> f32 {
    ctx.ascent(env) + ctx.line_width(env)
}

pub(super) fn measure_text(ctx: &LayoutContext<'_>, text: &str, env: &Environment) -> BoxMetrics {
    let metrics = ctx.metrics();
    let lw = ctx.line_width(env);
    let mut width = 0.0f32;
    let mut ascent = 0.0f32;
    let mut descent = 0.0f32;
    let mut x_correction = 0.0f32;
    for run in split_runs(text, env) {
        let advance = metrics.glyph_width(&run.font, &run.text);
        let ink = metrics.tight_bounding_box(&run.font, &run.text);
        if !ink.is_empty() {
            ascent = ascent.max(-ink.y);
            descent = descent.max(ink.bottom());
        }
        x_correction = if run.font.italic {
            (ink.right() - advance)
                .max(0.0)
                .max(ctx.config().italic_correction_factor * lw)
        } else {
            0.0
        };
        width += advance;
    }
    if env.underlined {
        descent = descent.max(underline_offset(ctx, env) + lw);
    }
    if env.overlined {
        ascent = ascent.max(overline_offset(ctx, env) + lw);
    }
    let mut size = box_from(width, ascent, descent, ctx.strikeout(env));
    size.baseline_x_correction = x_correction;
    size
}

pub(super) fn draw_text(
    ctx: &LayoutContext<'_>,
    text: &str,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    let mut pen_x = x;
    for run in split_runs(text, env) {
        surface.draw_text(pen_x, y, &run.text, &run.font, env.color);
        pen_x += ctx.metrics().glyph_width(&run.font, &run.text);
    }
    if pen_x > x {
        let pen = ctx.pen(env);
        if env.underlined {
            let uy = y + underline_offset(ctx, env);
            surface.draw_line(x, uy, pen_x, uy, &pen);
        }
        if env.overlined {
            let oy = y - overline_offset(ctx, env);
            surface.draw_line(x, oy, pen_x, oy, &pen);
        }
        if env.strike {
            let sy = y - ctx.strikeout(env);
            surface.draw_line(x, sy, pen_x, sy, &pen);
        }
    }
    pen_x
}

/// verbatim 使用等宽直立字体，不进入数学模式
fn verbatim_env(env: &Environment) -> Environment {
    let mut out = *env;
    out.leave_math();
    out.role = FontRole::Typewriter;
    out.small_caps = false;
    out.transform = TextTransform::None;
    out
}

fn verbatim_lines(verb: &VerbatimNode) -> Vec<String> {
    verb.text
        .split('\n')
        .map(|line| {
            let line = line.trim_end_matches('\r');
            if verb.visible_space {
                line.replace(' ', &VISIBLE_SPACE.to_string())
            } else {
                line.to_string()
            }
        })
        .collect()
}

pub(super) fn measure_verbatim(
    ctx: &LayoutContext<'_>,
    verb: &VerbatimNode,
    env: &Environment,
) -> BoxMetrics {
    let venv = verbatim_env(env);
    let lines = verbatim_lines(verb);
    let width = lines
        .iter()
        .map(|line| ctx.advance(&venv, line))
        .fold(0.0f32, f32::max);
    let extra = (lines.len().saturating_sub(1)) as f32 * ctx.line_spacing(&venv);
    box_from(
        width,
        ctx.ascent(&venv),
        ctx.descent(&venv) + extra,
        ctx.strikeout(&venv),
    )
}

pub(super) fn draw_verbatim(
    ctx: &LayoutContext<'_>,
    verb: &VerbatimNode,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    let venv = verbatim_env(env);
    let width = measure_verbatim(ctx, verb, env).width;
    let spacing = ctx.line_spacing(&venv);
    let font = venv.font_spec();
    for (index, line) in verbatim_lines(verb).iter().enumerate() {
        let line_width = ctx.advance(&venv, line);
        let dx = match verb.alignment {
            HAlign::Left => 0.0,
            HAlign::Center => (width - line_width) / 2.0,
            HAlign::Right => width - line_width,
        };
        surface.draw_text(x + dx, y + index as f32 * spacing, line, &font, venv.color);
    }
    x + width
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::ast::Node;

    fn ctx_measure(text: &str, env: &Environment) -> BoxMetrics {
        let cfg = config();
        measure_text(&LayoutContext::new(&FIXED, &cfg), text, env)
    }

    #[test]
    fn plain_text_uses_ink_height() {
        let m = ctx_measure("x", &Environment::default());
        assert!((m.width - 14.0).abs() < 1e-4);
        assert!((m.baseline_height - 12.6).abs() < 1e-4);
        assert_eq!(m.descent(), 0.0);
        assert_eq!(m.baseline_x_correction, 0.0);

        let deep = ctx_measure("gy", &Environment::default());
        assert!(deep.descent() > 0.0);
    }

    #[test]
    fn math_digits_stay_upright() {
        let runs = split_runs("2x", &math_env());
        assert_eq!(runs.len(), 2);
        assert!(!runs[0].font.italic);
        assert!(runs[1].font.italic);
        assert!(ctx_measure("x", &math_env()).baseline_x_correction > 0.0);
    }

    #[test]
    fn small_caps_shrink_lowercase() {
        let mut env = Environment::default();
        env.small_caps = true;
        let runs = split_runs("Ab", &env);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].text, "B");
        let caps = ctx_measure("ab", &env);
        let upper = ctx_measure("AB", &Environment::default());
        assert!(caps.width < upper.width);
    }

    #[test]
    fn transforms_and_blackboard() {
        let mut env = Environment::default();
        env.transform = TextTransform::Upper;
        assert_eq!(split_runs("ab", &env)[0].text, "AB");
        env.transform = TextTransform::None;
        env.role = FontRole::Blackboard;
        assert_eq!(split_runs("R", &env)[0].text, "ℝ");
    }

    #[test]
    fn underline_reaches_below_baseline() {
        let mut env = Environment::default();
        env.underlined = true;
        let m = ctx_measure("x", &env);
        assert!(m.descent() > 0.0);

        let cfg = config();
        let mut surface = crate::surface::SvgSurface::new();
        draw_text(&LayoutContext::new(&FIXED, &cfg), "x", &mut surface, 0.0, 50.0, &env);
        assert_eq!(surface.scene().lines.len(), 1);
        assert!(surface.scene().lines[0].y1 > 50.0);
    }

    #[test]
    fn verbatim_stacks_lines() {
        let one = measure(&Node::Verbatim(VerbatimNode {
            text: "a b".into(),
            visible_space: true,
            alignment: HAlign::Left,
        }));
        let two = measure(&Node::Verbatim(VerbatimNode {
            text: "a b\nlonger".into(),
            visible_space: false,
            alignment: HAlign::Center,
        }));
        assert!(two.overall_height > one.overall_height);
        assert!(two.width > one.width);

        let (_, surface) = draw(&Node::Verbatim(VerbatimNode {
            text: "a b".into(),
            visible_space: true,
            alignment: HAlign::Left,
        }));
        assert_eq!(surface.scene().items[0].text, "a\u{2423}b");
    }
}
