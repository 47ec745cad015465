//! `\begin{..}` 环境：矩阵族、对齐段落与方框

use log::warn;
use phf::phf_map;

use crate::ast::{BoxInstructionNode, BoxStyle, BraceType, HAlign, Node, VerticalListNode};
use crate::error::ParseError;

use super::super::{LinesEnd, Parser};
use super::matrix::{CellAlignment, MatrixStyle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvironmentKind {
    /// 多行文本，按给定方式对齐
    Lines(HAlign),
    /// 整个环境放进方框，`param` 为默认的颜色参数
    Boxed {
        style: BoxStyle,
        param: Option<&'static str>,
    },
    Matrix(MatrixStyle),
}

static ENVIRONMENTS: phf::Map<&'static str, EnvironmentKind> = phf_map! {
    "center" => EnvironmentKind::Lines(HAlign::Center),
    "flushleft" => EnvironmentKind::Lines(HAlign::Left),
    "flushright" => EnvironmentKind::Lines(HAlign::Right),
    "document" => EnvironmentKind::Lines(HAlign::Left),
    "framed" => EnvironmentKind::Boxed { style: BoxStyle::Framed, param: None },
    "shaded" => EnvironmentKind::Boxed { style: BoxStyle::Shaded, param: Some("lightgray") },
    "snugshade" => EnvironmentKind::Boxed { style: BoxStyle::SnugShade, param: Some("lightgray") },
    "matrix" => EnvironmentKind::Matrix(MatrixStyle::plain(CellAlignment::Center)),
    "smallmatrix" => EnvironmentKind::Matrix(MatrixStyle::plain(CellAlignment::Center)),
    "gather" => EnvironmentKind::Matrix(MatrixStyle::plain(CellAlignment::Center)),
    "gathered" => EnvironmentKind::Matrix(MatrixStyle::plain(CellAlignment::Center)),
    "align" => EnvironmentKind::Matrix(MatrixStyle::plain(CellAlignment::Alternating)),
    "align*" => EnvironmentKind::Matrix(MatrixStyle::plain(CellAlignment::Alternating)),
    "aligned" => EnvironmentKind::Matrix(MatrixStyle::plain(CellAlignment::Alternating)),
    "pmatrix" => EnvironmentKind::Matrix(MatrixStyle::braced(BraceType::Parenthesis, BraceType::Parenthesis)),
    "bmatrix" => EnvironmentKind::Matrix(MatrixStyle::braced(BraceType::SquareBracket, BraceType::SquareBracket)),
    "Bmatrix" => EnvironmentKind::Matrix(MatrixStyle::braced(BraceType::CurlyBracket, BraceType::CurlyBracket)),
    "vmatrix" => EnvironmentKind::Matrix(MatrixStyle::braced(BraceType::SingleLine, BraceType::SingleLine)),
    "Vmatrix" => EnvironmentKind::Matrix(MatrixStyle::braced(BraceType::DoubleLine, BraceType::DoubleLine)),
    "cases" => EnvironmentKind::Matrix(MatrixStyle {
        open: BraceType::CurlyBracket,
        close: BraceType::None,
        alignment: CellAlignment::Left,
        column_spec: false,
        text_mode: false,
    }),
    "array" => EnvironmentKind::Matrix(MatrixStyle {
        open: BraceType::None,
        close: BraceType::None,
        alignment: CellAlignment::Center,
        column_spec: true,
        text_mode: false,
    }),
    "tabular" => EnvironmentKind::Matrix(MatrixStyle {
        open: BraceType::None,
        close: BraceType::None,
        alignment: CellAlignment::Left,
        column_spec: true,
        text_mode: true,
    }),
};

pub fn lookup(name: &str) -> Option<EnvironmentKind> {
    ENVIRONMENTS.get(name).copied()
}

impl Parser {
    /// `\begin{name}` 已被读取，解析到对应的 `\end{name}`
    pub(crate) fn parse_environment(&mut self, name: &str) -> Node {
        let pos = self.position();
        match lookup(name) {
            Some(EnvironmentKind::Matrix(style)) => self.parse_matrix(name, style),
            Some(EnvironmentKind::Lines(alignment)) => {
                let lines = self.parse_lines(LinesEnd::Environment(name));
                Node::VerticalList(VerticalListNode::new(lines, alignment))
            }
            Some(EnvironmentKind::Boxed { style, param }) => {
                let lines = self.parse_lines(LinesEnd::Environment(name));
                Node::BoxInstruction(BoxInstructionNode {
                    style,
                    params: param.map(str::to_string).into_iter().collect(),
                    child: Box::new(Node::VerticalList(VerticalListNode::new(
                        lines,
                        HAlign::Left,
                    ))),
                })
            }
            None => {
                warn!("未知环境 {}，按普通段落处理", name);
                self.error(ParseError::UnknownEnvironment {
                    pos,
                    name: name.to_string(),
                });
                let lines = self.parse_lines(LinesEnd::Environment(name));
                Node::VerticalList(VerticalListNode::new(lines, HAlign::Left))
            }
        }
    }
}
