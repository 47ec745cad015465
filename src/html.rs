//! HTML 导出：尽力把语法树写成带内联样式的 HTML 片段
//!
//! 分数、装饰、矩阵没有合适的 HTML 写法，遇到时返回失败，但已经写出的部分照常保留。

use std::fmt::Write;

use crate::ast::{BraceType, HAlign, Node, WhitespaceKind};
use crate::environment::{Color, Environment, FontRole};
use crate::layout::{apply_modifier, apply_property, apply_transform, LayoutContext};
use crate::parse::rules::symbols::{self, SymbolFlags};
use crate::render::escape_text;
use crate::surface::LineStyle;

/// 1px = 0.75pt
const PT_PER_PX: f32 = 0.75;

/// 导出结果：`ok` 为 false 时 `html` 只包含能表达的部分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOutput {
    pub html: String,
    pub ok: bool,
}

pub fn to_html(ctx: &LayoutContext<'_>, root: &Node, env: &Environment) -> HtmlOutput {
    let mut writer = HtmlWriter {
        ctx,
        default: *env,
        out: String::new(),
    };
    let ok = writer.node(root, env);
    HtmlOutput {
        html: writer.out,
        ok,
    }
}

struct HtmlWriter<'c, 'a> {
    ctx: &'c LayoutContext<'a>,
    default: Environment,
    out: String,
}

impl HtmlWriter<'_, '_> {
    fn node(&mut self, node: &Node, env: &Environment) -> bool {
        match node {
            Node::Text(text) => {
                let mut shown = apply_transform(&text.text, env.transform);
                if env.role == FontRole::Blackboard {
                    shown = shown.chars().map(symbols::double_struck).collect();
                }
                let escaped = escape_text(&shown).into_owned();
                self.span(env, &escaped);
                true
            }
            Node::Symbol(sym) => match symbol_html(&sym.name) {
                Some((html, factor)) => {
                    let mut senv = *env;
                    senv.size *= factor;
                    self.span(&senv, &html);
                    true
                }
                None => false,
            },
            Node::Whitespace(kind) => {
                self.out.push_str(whitespace_entity(*kind));
                true
            }
            Node::HorizontalList(items) => {
                let mut env = *env;
                let mut ok = true;
                for item in items {
                    if let Node::ModifyEnvironment(modify) = item {
                        apply_modifier(self.ctx, &mut env, modify);
                        continue;
                    }
                    ok &= self.node(item, &env);
                }
                ok
            }
            Node::VerticalList(list) => {
                let align = match list.alignment {
                    HAlign::Left => "left",
                    HAlign::Center => "center",
                    HAlign::Right => "right",
                };
                let _ = write!(self.out, r#"<div style="text-align: {align}">"#);
                let mut ok = true;
                for (index, line) in list.lines.iter().enumerate() {
                    if index > 0 {
                        self.out.push_str("<br>");
                    }
                    ok &= self.node(line, env);
                }
                self.out.push_str("</div>");
                ok
            }
            Node::Block(child) => self.node(child, env),
            Node::Subscript(child) => self.wrapped("<sub>", child, env, "</sub>"),
            Node::Superscript(child) => self.wrapped("<sup>", child, env, "</sup>"),
            Node::Sqrt(sqrt) => {
                let mut ok = true;
                if let Some(degree) = &sqrt.degree {
                    ok &= self.wrapped("<sup>", degree, env, "</sup>");
                }
                self.out.push_str(r#"&radic;<span style="text-decoration: overline">"#);
                ok &= self.node(&sqrt.child, env);
                self.out.push_str("&nbsp;</span>");
                ok
            }
            Node::Brace(brace) => {
                self.out.push_str(brace_entity(brace.open, false));
                let ok = self.node(&brace.child, env);
                self.out.push_str(brace_entity(brace.close, true));
                ok
            }
            Node::Instruction(inst) => self.node(&inst.child, &apply_property(env, inst)),
            // 只在水平列表里对后续兄弟生效
            Node::ModifyEnvironment(_) | Node::Strut(_) => true,
            Node::BoxInstruction(inst) => {
                let frame = inst.style.frame();
                let mut style = String::from("display: inline-block; ");
                if let Some(pen) = frame.pen {
                    let color = pen
                        .color_param
                        .and_then(|i| inst.params.get(i))
                        .and_then(|name| Color::parse(name))
                        .unwrap_or(env.color);
                    let kind = match (pen.style, frame.double_line) {
                        (_, true) => "double",
                        (LineStyle::Dashed, _) => "dashed",
                        (LineStyle::Dotted, _) => "dotted",
                        _ => "solid",
                    };
                    let width = if frame.double_line { 3.0 } else { pen.width_factor };
                    let _ = write!(style, "border: {width}px {kind} {}; ", color.to_hex());
                }
                if let Some(fill) = frame
                    .fill_param
                    .and_then(|i| inst.params.get(i))
                    .and_then(|name| Color::parse(name))
                {
                    let _ = write!(style, "background-color: {}; ", fill.to_hex());
                }
                if frame.padding > 0.0 {
                    let _ = write!(style, "padding: {}ex; ", frame.padding);
                }
                if frame.rounding > 0.0 {
                    let _ = write!(style, "border-radius: {}ex; ", frame.rounding);
                }
                let _ = write!(self.out, r#"<span style="{}">"#, style.trim_end());
                let ok = self.node(&inst.child, env);
                self.out.push_str("</span>");
                ok
            }
            Node::Phantom(phantom) => {
                self.out.push_str(r#"<span style="visibility: hidden">"#);
                let ok = self.node(&phantom.child, env);
                self.out.push_str("</span>");
                ok
            }
            Node::Verbatim(verb) => {
                let text = if verb.visible_space {
                    verb.text.replace(' ', "\u{2423}")
                } else {
                    verb.text.clone()
                };
                let _ = write!(self.out, "<pre>{}</pre>", escape_text(&text));
                true
            }
            Node::Frac(_) | Node::Decorated(_) | Node::Matrix(_) => false,
        }
    }

    fn wrapped(&mut self, open: &str, child: &Node, env: &Environment, close: &str) -> bool {
        self.out.push_str(open);
        let ok = self.node(child, env);
        self.out.push_str(close);
        ok
    }

    /// 只输出与默认环境不同的样式
    fn span(&mut self, env: &Environment, content: &str) {
        let default = &self.default;
        let mut style = format!("font-size: {}pt; ", env.size * PT_PER_PX);
        if env.italic != default.italic {
            style.push_str(if env.italic {
                "font-style: italic; "
            } else {
                "font-style: normal; "
            });
        }
        if env.bold && !default.bold {
            style.push_str("font-weight: bold; ");
        }
        if env.small_caps && !default.small_caps {
            style.push_str("font-variant: small-caps; ");
        }
        if env.color != default.color {
            let _ = write!(style, "color: {}; ", env.color.to_hex());
        }
        match env.role {
            FontRole::Sans | FontRole::MathSans => style.push_str("font-family: sans-serif; "),
            FontRole::Typewriter => style.push_str("font-family: monospace; "),
            FontRole::Script | FontRole::Caligraphic => style.push_str("font-family: cursive; "),
            _ => {}
        }
        let mut lines = Vec::new();
        if env.underlined && !default.underlined {
            lines.push("underline");
        }
        if env.overlined && !default.overlined {
            lines.push("overline");
        }
        if env.strike && !default.strike {
            lines.push("line-through");
        }
        if !lines.is_empty() {
            let _ = write!(style, "text-decoration: {}; ", lines.join(" "));
        }
        let _ = write!(self.out, r#"<span style="{}">{content}</span>"#, style.trim_end());
    }
}

/// 符号对应的 HTML 与字号倍数
fn symbol_html(name: &str) -> Option<(String, f32)> {
    let entry = symbols::lookup(name)?;
    if entry.has(SymbolFlags::LONG_ARROW) {
        let arrow = match symbols::long_arrow_shape(name) {
            (true, true, false) => "&#x27F7;",
            (true, true, true) => "&#x27FA;",
            (true, false, false) => "&#x27F5;",
            (true, false, true) => "&#x27F8;",
            (_, _, true) => "&#x27F9;",
            _ => "&#x27F6;",
        };
        return Some((arrow.to_string(), 1.0));
    }
    if entry.glyph.is_empty() {
        return None;
    }
    let mut html = String::with_capacity(entry.glyph.len() * 8);
    for ch in entry.glyph.chars() {
        if ch.is_ascii() {
            html.push_str(&escape_text(ch.encode_utf8(&mut [0; 4])));
        } else {
            let _ = write!(html, "&#x{:X};", ch as u32);
        }
    }
    Some((html, entry.font_factor))
}

fn whitespace_entity(kind: WhitespaceKind) -> &'static str {
    match kind {
        WhitespaceKind::Normal | WhitespaceKind::NonBreaking => "&nbsp;",
        WhitespaceKind::Thin => "&thinsp;",
        WhitespaceKind::Medium => "&#x205F;",
        WhitespaceKind::Thick | WhitespaceKind::EnSpace => "&ensp;",
        WhitespaceKind::Quad | WhitespaceKind::EmSpace => "&emsp;",
        WhitespaceKind::QQuad => "&emsp;&emsp;",
        WhitespaceKind::NegThin | WhitespaceKind::NegMedium | WhitespaceKind::NegThick => "",
        WhitespaceKind::Custom(length) if length.value > 0.0 => "&nbsp;",
        WhitespaceKind::Custom(_) => "",
    }
}

fn brace_entity(kind: BraceType, closing: bool) -> &'static str {
    match (kind, closing) {
        (BraceType::None, _) => "",
        (BraceType::Parenthesis, false) => "(",
        (BraceType::Parenthesis, true) => ")",
        (BraceType::SquareBracket, false) => "[",
        (BraceType::SquareBracket, true) => "]",
        (BraceType::CurlyBracket, false) => "{",
        (BraceType::CurlyBracket, true) => "}",
        (BraceType::SingleLine, _) => "|",
        (BraceType::DoubleLine, _) => "&#x2016;",
        (BraceType::AngleBracket, false) => "&lang;",
        (BraceType::AngleBracket, true) => "&rang;",
        (BraceType::FloorBracket, false) => "&lfloor;",
        (BraceType::FloorBracket, true) => "&rfloor;",
        (BraceType::CeilBracket, false) => "&lceil;",
        (BraceType::CeilBracket, true) => "&rceil;",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::metrics::FixedMetrics;
    use crate::parse::{parse, ParseOptions};

    fn export(input: &str) -> HtmlOutput {
        let doc = parse(input, ParseOptions::default());
        let config = LayoutConfig::default();
        let ctx = LayoutContext::new(&FixedMetrics, &config);
        to_html(&ctx, &doc.root, &Environment::default())
    }

    #[test]
    fn plain_text_is_escaped() {
        let out = export("a<b");
        assert!(out.ok);
        assert!(out.html.contains("a&lt;b"));
        assert!(out.html.starts_with("<span"));
    }

    #[test]
    fn scripts_and_roots() {
        let out = export(r"$x^2_i + \sqrt{y}$");
        assert!(out.ok, "{}", out.html);
        assert!(out.html.contains("<sup>"));
        assert!(out.html.contains("<sub>"));
        assert!(out.html.contains("&radic;"));
        assert!(out.html.contains("font-style: italic"));
    }

    #[test]
    fn symbols_become_character_references() {
        let out = export(r"$\alpha \leq \beta$");
        assert!(out.ok);
        assert!(out.html.contains("&#x3B1;"));
        assert!(out.html.contains("&#x2264;"));
    }

    #[test]
    fn styles_follow_instructions_and_modifiers() {
        let out = export(r"\textbf{a} {\color{red} b}");
        assert!(out.ok);
        assert!(out.html.contains("font-weight: bold"));
        assert!(out.html.contains("color: #ff0000"));
    }

    #[test]
    fn unsupported_nodes_report_failure() {
        let frac = export(r"$a + \frac{1}{2}$");
        assert!(!frac.ok);
        // 能表达的部分仍然输出
        assert!(frac.html.contains('a'));
        assert!(!export(r"$\hat{x}$").ok);
        assert!(!export(r"$\begin{matrix}1\end{matrix}$").ok);
    }

    #[test]
    fn boxes_and_braces() {
        let out = export(r"$\fbox{x} \left\langle y \right\rangle$");
        assert!(out.ok, "{}", out.html);
        assert!(out.html.contains("border: 1px solid #000000"));
        assert!(out.html.contains("&lang;"));
        assert!(out.html.contains("&rang;"));
    }
}
