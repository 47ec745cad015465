//! 指令分派表
//!
//! 每个文件维护一张 `phf` 静态表，`lookup` 按固定顺序查询，
//! 得到的 `InstructionKind` 决定解析器如何读取参数、构造哪种节点。

pub(crate) mod accents;
mod basic;
pub mod boxes;
mod decorations;
mod delimiters;
mod environments;
mod fractions;
mod functions;
mod matrix;
mod operators;
mod roots;
mod spacing;
mod styles;
pub mod symbols;

use crate::ast::{
    BoxStyle, DecorationType, EnvModifier, FracMode, HAlign, PhantomMode, TableLine,
    TextProperty, WhitespaceKind,
};

pub use boxes::{BoxFrame, FramePen};
pub use delimiters::BigSide;
use symbols::SymbolEntry;

/// `\unicode{..}` 的两种写法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicodeForm {
    /// 十六进制码位
    Codepoint,
    /// 十六进制书写的 UTF-8 字节
    Utf8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InstructionKind {
    Whitespace(WhitespaceKind),
    HSpace,
    Symbol(&'static SymbolEntry),
    /// `\big(` 一类，`factor` 为支撑高度（em）
    Big { factor: f32, side: BigSide },
    Left,
    Modifier { modifier: EnvModifier, params: usize },
    TextProperty { property: TextProperty, params: usize },
    Unicode(UnicodeForm),
    Box { style: BoxStyle, params: usize },
    Phantom(PhantomMode),
    Substack(HAlign),
    Sqrt,
    Cbrt,
    Decoration(DecorationType),
    Fraction(FracMode),
    Binom,
    TableLine(TableLine),
}

/// 查询指令类别
///
/// `brace_follows` 表示指令后紧跟 `{`：此时装饰与文本属性优先于同名的开关或符号。
pub fn lookup(name: &str, brace_follows: bool) -> Option<InstructionKind> {
    if brace_follows {
        if let Some(decoration) = decorations::lookup(name) {
            return Some(InstructionKind::Decoration(decoration));
        }
        if let Some((property, params)) = styles::text_property(name) {
            return Some(InstructionKind::TextProperty { property, params });
        }
    }
    spacing::lookup(name)
        .map(InstructionKind::Whitespace)
        .or_else(|| symbols::lookup(name).map(InstructionKind::Symbol))
        .or_else(|| delimiters::lookup(name))
        .or_else(|| {
            styles::modifier(name)
                .map(|(modifier, params)| InstructionKind::Modifier { modifier, params })
        })
        .or_else(|| {
            styles::text_property(name)
                .map(|(property, params)| InstructionKind::TextProperty { property, params })
        })
        .or_else(|| basic::lookup(name))
        .or_else(|| boxes::lookup(name).map(|(style, params)| InstructionKind::Box { style, params }))
        .or_else(|| roots::lookup(name))
        .or_else(|| decorations::lookup(name).map(InstructionKind::Decoration))
        .or_else(|| fractions::lookup(name))
        .or_else(|| matrix::lookup_line(name).map(InstructionKind::TableLine))
}

pub use styles::content_math_mode;
