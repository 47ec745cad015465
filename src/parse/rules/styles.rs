//! 字体与样式指令
//!
//! 两张表：`\bf`、`\large` 这类开关修改其后的兄弟节点；
//! `\textbf{..}`、`\textcolor{c}{..}` 这类指令只作用于自己的参数。

use phf::phf_map;

use crate::ast::{EnvModifier, TextProperty};

/// 指令名 → (修改, 参数个数)
static MODIFIERS: phf::Map<&'static str, (EnvModifier, usize)> = phf_map! {
    "bf" => (EnvModifier::Bold, 0),
    "bfseries" => (EnvModifier::Bold, 0),
    "md" => (EnvModifier::Medium, 0),
    "mdseries" => (EnvModifier::Medium, 0),
    "it" => (EnvModifier::Italic, 0),
    "itshape" => (EnvModifier::Italic, 0),
    "em" => (EnvModifier::Italic, 0),
    "up" => (EnvModifier::Upright, 0),
    "upshape" => (EnvModifier::Upright, 0),
    "rm" => (EnvModifier::Roman, 0),
    "rmfamily" => (EnvModifier::Roman, 0),
    "sf" => (EnvModifier::Sans, 0),
    "sffamily" => (EnvModifier::Sans, 0),
    "tt" => (EnvModifier::Typewriter, 0),
    "ttfamily" => (EnvModifier::Typewriter, 0),
    "sc" => (EnvModifier::SmallCaps, 0),
    "scshape" => (EnvModifier::SmallCaps, 0),
    "scr" => (EnvModifier::Script, 0),
    "scrseries" => (EnvModifier::Script, 0),
    "bb" => (EnvModifier::Blackboard, 0),
    "bbfamily" => (EnvModifier::Blackboard, 0),
    "cal" => (EnvModifier::Caligraphic, 0),
    "calfamily" => (EnvModifier::Caligraphic, 0),
    "frak" => (EnvModifier::Fraktur, 0),
    "frakfamily" => (EnvModifier::Fraktur, 0),
    "normalfont" => (EnvModifier::NormalFont, 0),
    "color" => (EnvModifier::Color, 1),
    "tiny" => (EnvModifier::Size(6.0 / 11.0), 0),
    "ssmall" => (EnvModifier::Size(7.0 / 11.0), 0),
    "scriptsize" => (EnvModifier::Size(8.0 / 11.0), 0),
    "footnotesize" => (EnvModifier::Size(9.0 / 11.0), 0),
    "small" => (EnvModifier::Size(10.0 / 11.0), 0),
    "normalsize" => (EnvModifier::Size(1.0), 0),
    "large" => (EnvModifier::Size(12.0 / 11.0), 0),
    "Large" => (EnvModifier::Size(14.4 / 11.0), 0),
    "LARGE" => (EnvModifier::Size(17.28 / 11.0), 0),
    "huge" => (EnvModifier::Size(20.74 / 11.0), 0),
    "Huge" => (EnvModifier::Size(24.88 / 11.0), 0),
    "fontsize" => (EnvModifier::FontSize, 1),
    "displaystyle" => (EnvModifier::DisplayStyle, 0),
    "textstyle" => (EnvModifier::TextStyle, 0),
    "scriptstyle" => (EnvModifier::ScriptStyle, 0),
    "scriptscriptstyle" => (EnvModifier::ScriptScriptStyle, 0),
};

/// 指令名 → (属性, 内容之前的参数个数)
static TEXT_PROPS: phf::Map<&'static str, (TextProperty, usize)> = phf_map! {
    "textbf" => (TextProperty::Bold, 0),
    "mathbf" => (TextProperty::Bold, 0),
    "boldsymbol" => (TextProperty::Bold, 0),
    "bm" => (TextProperty::Bold, 0),
    "textit" => (TextProperty::Italic, 0),
    "mathit" => (TextProperty::Italic, 0),
    "emph" => (TextProperty::Italic, 0),
    "textup" => (TextProperty::Upright, 0),
    "mathup" => (TextProperty::Upright, 0),
    "textrm" => (TextProperty::Roman, 0),
    "mathrm" => (TextProperty::Roman, 0),
    "operatorname" => (TextProperty::Roman, 0),
    "unit" => (TextProperty::Roman, 0),
    "textsf" => (TextProperty::Sans, 0),
    "mathsf" => (TextProperty::Sans, 0),
    "texttt" => (TextProperty::Typewriter, 0),
    "mathtt" => (TextProperty::Typewriter, 0),
    "textscript" => (TextProperty::Script, 0),
    "textscr" => (TextProperty::Script, 0),
    "mathscript" => (TextProperty::Script, 0),
    "mathscr" => (TextProperty::Script, 0),
    "textbb" => (TextProperty::Blackboard, 0),
    "mathbb" => (TextProperty::Blackboard, 0),
    "textcal" => (TextProperty::Caligraphic, 0),
    "mathcal" => (TextProperty::Caligraphic, 0),
    "textfrak" => (TextProperty::Fraktur, 0),
    "mathfrak" => (TextProperty::Fraktur, 0),
    "textsc" => (TextProperty::SmallCaps, 0),
    "mathsc" => (TextProperty::SmallCaps, 0),
    "textcolor" => (TextProperty::Color, 1),
    "mathcolor" => (TextProperty::Color, 1),
    "text" => (TextProperty::Text, 0),
    "mbox" => (TextProperty::Text, 0),
    "textnormal" => (TextProperty::Text, 0),
    "ensuretext" => (TextProperty::Text, 0),
    "ensuremath" => (TextProperty::Math, 0),
    "equation" => (TextProperty::Math, 0),
    "uppercase" => (TextProperty::Uppercase, 0),
    "MakeUppercase" => (TextProperty::Uppercase, 0),
    "lowercase" => (TextProperty::Lowercase, 0),
    "MakeLowercase" => (TextProperty::Lowercase, 0),
    "ul" => (TextProperty::Underlined, 0),
    "underlined" => (TextProperty::Underlined, 0),
    "ol" => (TextProperty::Overlined, 0),
    "overlined" => (TextProperty::Overlined, 0),
    "sout" => (TextProperty::Strike, 0),
    "st" => (TextProperty::Strike, 0),
    "strikethrough" => (TextProperty::Strike, 0),
    "displaystyle" => (TextProperty::DisplayStyle, 0),
};

pub fn modifier(name: &str) -> Option<(EnvModifier, usize)> {
    MODIFIERS.get(name).copied()
}

pub fn text_property(name: &str) -> Option<(TextProperty, usize)> {
    TEXT_PROPS.get(name).copied()
}

/// 大括号内的内容是否切换到数学模式：Some(true) 进入，Some(false) 退出，None 保持
pub fn content_math_mode(property: TextProperty) -> Option<bool> {
    match property {
        TextProperty::Math => Some(true),
        TextProperty::Text => Some(false),
        _ => None,
    }
}
