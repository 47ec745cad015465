//! 改变环境的节点：文本属性指令、环境修改、方框、幻影与支撑
//!
//! 这些节点本身几乎没有几何，主要工作是算出子节点使用的环境。

use crate::ast::{
    BoxInstructionNode, EnvModifier, InstructionNode, ModifyEnvironmentNode, PhantomMode,
    PhantomNode, TextProperty,
};
use crate::environment::{Color, Environment, FontRole, TextTransform};
use crate::metrics::{BoxMetrics, Rect};
use crate::parse::rules::{BoxFrame, FramePen};
use crate::surface::{DrawingSurface, Pen};

use super::{box_from, LayoutContext};

/// 1pt = 4/3 px
const PX_PER_PT: f32 = 4.0 / 3.0;
/// 双线边框两条线之间的距离（线宽倍数）
const DOUBLE_FRAME_GAP: f32 = 2.0;

/// 无法识别的颜色名保留当前颜色
fn set_color(env: &mut Environment, params: &[String]) {
    let Some(name) = params.first() else {
        return;
    };
    match Color::parse(name) {
        Some(color) => env.color = color,
        None => log::trace!("未知颜色 '{name}'，保留当前颜色"),
    }
}

/// `\bf`、`\large`、`\color{red}` 等作用于其后兄弟的修改
pub(crate) fn apply_modifier(ctx: &LayoutContext<'_>, env: &mut Environment, node: &ModifyEnvironmentNode) {
    let base = ctx.base_size();
    let script = ctx.config().subsuper_size_factor;
    match node.modifier {
        EnvModifier::Bold => env.bold = true,
        EnvModifier::Medium => env.bold = false,
        EnvModifier::Italic => env.italic = true,
        EnvModifier::Upright => env.italic = false,
        EnvModifier::Roman => env.role = FontRole::Roman,
        EnvModifier::Sans => env.role = FontRole::Sans,
        EnvModifier::Typewriter => env.role = FontRole::Typewriter,
        EnvModifier::SmallCaps => env.small_caps = true,
        EnvModifier::Script => env.role = FontRole::Script,
        EnvModifier::Blackboard => env.role = FontRole::Blackboard,
        EnvModifier::Caligraphic => env.role = FontRole::Caligraphic,
        EnvModifier::Fraktur => env.role = FontRole::Fraktur,
        EnvModifier::NormalFont => {
            env.role = FontRole::Roman;
            env.bold = false;
            env.small_caps = false;
            env.italic = env.inside_math;
        }
        EnvModifier::Color => set_color(env, &node.params),
        EnvModifier::Size(factor) => env.size = base * factor,
        EnvModifier::FontSize => {
            if let Some(pt) = node.params.first().and_then(|raw| raw.trim().parse::<f32>().ok()) {
                if pt > 0.0 {
                    env.size = pt * PX_PER_PT;
                }
            }
        }
        EnvModifier::DisplayStyle => {
            env.display_style = true;
            env.size = base;
        }
        EnvModifier::TextStyle => {
            env.display_style = false;
            env.size = base;
        }
        EnvModifier::ScriptStyle => {
            env.display_style = false;
            env.size = base * script;
        }
        EnvModifier::ScriptScriptStyle => {
            env.display_style = false;
            env.size = base * script * script;
        }
    }
}

/// 一参数指令为子节点准备的环境
pub(crate) fn apply_property(env: &Environment, inst: &InstructionNode) -> Environment {
    let mut out = *env;
    let math = out.inside_math;
    match inst.property {
        TextProperty::Bold => out.bold = true,
        TextProperty::Italic => out.italic = true,
        TextProperty::Upright => out.italic = false,
        TextProperty::Roman => {
            out.role = FontRole::Roman;
            out.italic = false;
        }
        TextProperty::Sans => {
            out.role = FontRole::Sans;
            out.italic = out.italic && !math;
        }
        TextProperty::Typewriter => {
            out.role = FontRole::Typewriter;
            out.italic = out.italic && !math;
        }
        TextProperty::Script => {
            out.role = FontRole::Script;
            out.italic = false;
        }
        TextProperty::Blackboard => {
            out.role = FontRole::Blackboard;
            out.italic = false;
        }
        TextProperty::Caligraphic => {
            out.role = FontRole::Caligraphic;
            out.italic = false;
        }
        TextProperty::Fraktur => {
            out.role = FontRole::Fraktur;
            out.italic = false;
        }
        TextProperty::SmallCaps => out.small_caps = true,
        TextProperty::Color => set_color(&mut out, &inst.params),
        TextProperty::Text => out.leave_math(),
        TextProperty::Math => out.enter_math(),
        TextProperty::Uppercase => out.transform = TextTransform::Upper,
        TextProperty::Lowercase => out.transform = TextTransform::Lower,
        TextProperty::Underlined => out.underlined = true,
        TextProperty::Overlined => out.overlined = true,
        TextProperty::Strike => out.strike = true,
        TextProperty::DisplayStyle => out.display_style = true,
        TextProperty::Generic => {}
    }
    out
}

pub(super) fn measure_instruction(
    ctx: &LayoutContext<'_>,
    inst: &InstructionNode,
    env: &Environment,
) -> BoxMetrics {
    ctx.measure(&inst.child, &apply_property(env, inst))
}

pub(super) fn draw_instruction(
    ctx: &LayoutContext<'_>,
    inst: &InstructionNode,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    ctx.draw(&inst.child, surface, x, y, &apply_property(env, inst))
}

fn param_color(params: &[String], index: Option<usize>) -> Option<Color> {
    index
        .and_then(|i| params.get(i))
        .and_then(|name| Color::parse(name))
}

/// 方框的边框画笔与内缩量
struct Frame {
    frame: BoxFrame,
    pen: Option<Pen>,
    fill: Option<Color>,
    /// 内容到外边缘的距离
    inset: f32,
    rounding: f32,
}

fn frame(ctx: &LayoutContext<'_>, inst: &BoxInstructionNode, env: &Environment) -> Frame {
    let frame = inst.style.frame();
    let x_width = ctx.advance(env, "x");
    let lw = ctx.line_width(env);
    let pen = frame.pen.map(|FramePen { width_factor, style, color_param }| {
        let color = param_color(&inst.params, color_param).unwrap_or(env.color);
        Pen::solid(color, lw * width_factor).with_style(style)
    });
    let fill = frame
        .fill_param
        .map(|_| param_color(&inst.params, frame.fill_param).unwrap_or(Color::LIGHT_GRAY));
    let border = match (&pen, frame.double_line) {
        (Some(pen), true) => pen.width * (2.0 + DOUBLE_FRAME_GAP),
        (Some(pen), false) => pen.width,
        (None, _) => 0.0,
    };
    Frame {
        frame,
        pen,
        fill,
        inset: frame.padding * x_width + border,
        rounding: frame.rounding * x_width,
    }
}

pub(super) fn measure_box(
    ctx: &LayoutContext<'_>,
    inst: &BoxInstructionNode,
    env: &Environment,
) -> BoxMetrics {
    let cs = ctx.measure(&inst.child, env);
    let inset = frame(ctx, inst, env).inset;
    box_from(
        cs.width + 2.0 * inset,
        cs.baseline_height + inset,
        cs.descent() + inset,
        cs.strikeout_pos,
    )
}

pub(super) fn draw_box(
    ctx: &LayoutContext<'_>,
    inst: &BoxInstructionNode,
    surface: &mut dyn DrawingSurface,
    x: f32,
    y: f32,
    env: &Environment,
) -> f32 {
    let size = measure_box(ctx, inst, env);
    let frame = frame(ctx, inst, env);
    let half = frame.pen.map_or(0.0, |pen| pen.width / 2.0);
    let outer = Rect::new(
        x + half,
        y - size.baseline_height + half,
        size.width - 2.0 * half,
        size.overall_height - 2.0 * half,
    );
    if let Some(fill) = frame.fill {
        surface.draw_rect(outer, None, Some(fill), frame.rounding);
    }
    ctx.draw(&inst.child, surface, x + frame.inset, y, env);
    if let Some(pen) = &frame.pen {
        surface.draw_rect(outer, Some(pen), None, frame.rounding);
        if frame.frame.double_line {
            let step = pen.width * (1.0 + DOUBLE_FRAME_GAP);
            let inner = Rect::new(
                outer.x + step,
                outer.y + step,
                outer.width - 2.0 * step,
                outer.height - 2.0 * step,
            );
            surface.draw_rect(inner, Some(pen), None, (frame.rounding - step).max(0.0));
        }
    }
    x + size.width
}

pub(super) fn measure_phantom(
    ctx: &LayoutContext<'_>,
    phantom: &PhantomNode,
    env: &Environment,
) -> BoxMetrics {
    let cs = ctx.measure(&phantom.child, env);
    match phantom.mode {
        PhantomMode::Both => cs,
        PhantomMode::Vertical => BoxMetrics::new(0.0, cs.baseline_height, cs.overall_height, cs.strikeout_pos),
        PhantomMode::Horizontal => BoxMetrics::new(cs.width, 0.0, 0.0, cs.strikeout_pos),
    }
}

/// 零宽支撑，高度为字号的倍数并以删除线为中心
pub(super) fn measure_strut(ctx: &LayoutContext<'_>, factor: f32, env: &Environment) -> BoxMetrics {
    let half = factor * env.size / 2.0;
    let strikeout = ctx.strikeout(env);
    box_from(0.0, half + strikeout, half - strikeout, strikeout)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::ast::{BoxStyle, Node};

    #[test]
    fn properties_change_the_child_environment() {
        let env = math_env();
        let inst = |property, params: Vec<&str>| InstructionNode {
            name: "x".into(),
            property,
            params: params.into_iter().map(String::from).collect(),
            child: Box::new(Node::empty()),
            above_below: false,
        };
        assert!(!apply_property(&env, &inst(TextProperty::Roman, vec![])).italic);
        assert!(!apply_property(&env, &inst(TextProperty::Text, vec![])).inside_math);
        assert_eq!(
            apply_property(&env, &inst(TextProperty::Color, vec!["red"])).color,
            Color::rgb(255, 0, 0)
        );
        // 无法识别的颜色保持原样
        assert_eq!(
            apply_property(&env, &inst(TextProperty::Color, vec!["nocolor"])).color,
            env.color
        );
        let mut text = Environment::default();
        text.italic = true;
        assert!(apply_property(&text, &inst(TextProperty::Sans, vec![])).italic);
    }

    #[test]
    fn unknown_color_modifier_keeps_color() {
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        let mut env = Environment::default();
        let color = |name: &str| ModifyEnvironmentNode {
            modifier: EnvModifier::Color,
            params: vec![name.to_string()],
        };
        apply_modifier(&ctx, &mut env, &color("blue"));
        assert_eq!(env.color, Color::rgb(0, 0, 255));
        apply_modifier(&ctx, &mut env, &color("notacolor"));
        assert_eq!(env.color, Color::rgb(0, 0, 255));
    }

    #[test]
    fn sizes_are_relative_to_the_base() {
        let cfg = config();
        let ctx = LayoutContext::new(&FIXED, &cfg).with_base_size(20.0);
        let mut env = Environment::default();
        let modify = |modifier, params: Vec<&str>| ModifyEnvironmentNode {
            modifier,
            params: params.into_iter().map(String::from).collect(),
        };
        apply_modifier(&ctx, &mut env, &modify(EnvModifier::Size(2.0), vec![]));
        assert_eq!(env.size, 40.0);
        apply_modifier(&ctx, &mut env, &modify(EnvModifier::Size(2.0), vec![]));
        assert_eq!(env.size, 40.0);
        apply_modifier(&ctx, &mut env, &modify(EnvModifier::FontSize, vec!["12"]));
        assert!((env.size - 16.0).abs() < 1e-4);
        apply_modifier(&ctx, &mut env, &modify(EnvModifier::ScriptStyle, vec![]));
        assert!((env.size - 14.0).abs() < 1e-4);
    }

    #[test]
    fn boxes_add_padding_and_frames() {
        let child = measure(&math("a"));
        let fbox = measure(&math(r"\fbox{a}"));
        assert!(fbox.width > child.width);
        assert!(fbox.baseline_height > child.baseline_height);
        let (_, surface) = draw(&math(r"\fbox{a}"));
        assert_eq!(surface.scene().paths.len(), 1);

        let (_, shaded) = draw(&Node::BoxInstruction(BoxInstructionNode {
            style: BoxStyle::FColorBox,
            params: vec!["red".into(), "yellow".into()],
            child: Box::new(Node::text("a")),
        }));
        let paths = &shaded.scene().paths;
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].fill, Color::parse("yellow"));
        assert_eq!(paths[1].pen.map(|p| p.color), Color::parse("red"));

        let single = measure(&math(r"\fbox{a}"));
        let double = measure(&math(r"\doublebox{a}"));
        assert!(double.width > single.width);
    }

    #[test]
    fn phantoms_keep_size_but_draw_nothing() {
        let visible = measure(&math(r"\frac{a}{b}"));
        let hidden = measure(&math(r"\phantom{\frac{a}{b}}"));
        assert_eq!(visible, hidden);
        let vertical = measure(&math(r"\vphantom{\frac{a}{b}}"));
        assert_eq!(vertical.width, 0.0);
        assert_eq!(vertical.overall_height, visible.overall_height);
        let (end, surface) = draw(&math(r"\phantom{x}"));
        assert!(surface.scene().is_empty());
        assert!(end > 0.0);
    }

    #[test]
    fn struts_have_height_only() {
        let m = measure(&Node::Strut(1.15));
        assert_eq!(m.width, 0.0);
        assert!((m.overall_height - 1.15 * 28.0).abs() < 1e-3);
    }
}
