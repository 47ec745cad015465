//! 矩阵与表格：`&` 分列、`\\` 分行，`\hline` 一类指令画横线

use log::debug;
use phf::phf_map;

use crate::ast::{BraceNode, BraceType, HAlign, MatrixNode, Node, TableLine, WhitespaceKind};
use crate::error::ParseError;

use super::super::lexer::Token;
use super::super::Parser;

static LINES: phf::Map<&'static str, TableLine> = phf_map! {
    "hline" => TableLine::Single,
    "midrule" => TableLine::Single,
    "toprule" => TableLine::Heavy,
    "bottomrule" => TableLine::Heavy,
    "hdashline" => TableLine::Dashed,
};

pub fn lookup_line(name: &str) -> Option<TableLine> {
    LINES.get(name).copied()
}

/// 单元格的默认对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAlignment {
    Center,
    Left,
    /// `align`：右、左交替
    Alternating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixStyle {
    pub open: BraceType,
    pub close: BraceType,
    pub alignment: CellAlignment,
    /// `\begin{array}{c|c}` 带列格式参数
    pub column_spec: bool,
    /// 单元格按正文模式解析
    pub text_mode: bool,
}

impl MatrixStyle {
    pub const fn plain(alignment: CellAlignment) -> Self {
        Self {
            open: BraceType::None,
            close: BraceType::None,
            alignment,
            column_spec: false,
            text_mode: false,
        }
    }

    pub const fn braced(open: BraceType, close: BraceType) -> Self {
        Self {
            open,
            close,
            alignment: CellAlignment::Center,
            column_spec: false,
            text_mode: false,
        }
    }

    fn default_alignment(self, column: usize) -> HAlign {
        match self.alignment {
            CellAlignment::Center => HAlign::Center,
            CellAlignment::Left => HAlign::Left,
            CellAlignment::Alternating if column % 2 == 0 => HAlign::Right,
            CellAlignment::Alternating => HAlign::Left,
        }
    }
}

/// 同一位置出现两次的线合并为双线
fn merge_line(current: TableLine, added: TableLine) -> TableLine {
    match (current, added) {
        (TableLine::None, line) => line,
        (TableLine::Single, TableLine::Single) => TableLine::Double,
        (TableLine::Dashed, TableLine::Dashed) => TableLine::DoubleDashed,
        (_, line) => line,
    }
}

/// 解析 `l|c||r` 形式的列格式，返回 (列对齐, 列间竖线)
fn parse_column_spec(spec: &str) -> (Vec<HAlign>, Vec<TableLine>) {
    let mut alignment = Vec::new();
    let mut lines = vec![TableLine::None];
    for ch in spec.chars() {
        let align = match ch {
            'l' => HAlign::Left,
            'c' => HAlign::Center,
            'r' => HAlign::Right,
            '|' => {
                if let Some(last) = lines.last_mut() {
                    *last = merge_line(*last, TableLine::Single);
                }
                continue;
            }
            _ => continue,
        };
        alignment.push(align);
        lines.push(TableLine::None);
    }
    (alignment, lines)
}

/// 去掉单元格首尾的空白
fn trim_cell(mut items: Vec<Node>) -> Node {
    let is_space = |node: &Node| matches!(node, Node::Whitespace(WhitespaceKind::Normal));
    while items.last().is_some_and(is_space) {
        items.pop();
    }
    let leading = items.iter().take_while(|node| is_space(*node)).count();
    items.drain(..leading);
    if let Some(Node::Text(first)) = items.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(Node::Text(last)) = items.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    items.retain(|node| !matches!(node, Node::Text(text) if text.text.is_empty()));
    Node::HorizontalList(items).simplify()
}

impl Parser {
    /// `\hline` 等指令记录在当前行的上方
    pub(crate) fn add_table_line(&mut self, line: TableLine) {
        let merged = merge_line(self.table_line.unwrap_or(TableLine::None), line);
        self.table_line = Some(merged);
    }

    /// `\begin{name}` 已被读取
    pub(crate) fn parse_matrix(&mut self, name: &str, style: MatrixStyle) -> Node {
        let start = self.position();
        let spec = if style.column_spec {
            self.read_column_spec(name)
        } else {
            None
        };
        let (spec_alignment, spec_lines) = spec
            .as_deref()
            .map(parse_column_spec)
            .unwrap_or_default();

        let saved_math = self.math;
        let saved_line = self.table_line.take();
        if style.text_mode {
            self.math = false;
        }

        let mut rows: Vec<Vec<Node>> = Vec::new();
        let mut row_lines: Vec<TableLine> = Vec::new();
        let mut cells = Vec::new();
        let mut finished = false;
        while !finished {
            let (items, end) = self.parse_list(false);
            let cell = trim_cell(items);
            match end {
                Token::Ampersand => {
                    cells.push(cell);
                    continue;
                }
                Token::Newline => {}
                Token::EndEnvironment(ref end_name) if end_name == name => finished = true,
                Token::End => {
                    self.error(ParseError::UnterminatedEnvironment {
                        pos: start,
                        name: name.to_string(),
                    });
                    finished = true;
                }
                Token::EndEnvironment(end_name) => {
                    self.error(ParseError::UnmatchedEnvironmentEnd {
                        pos: self.position(),
                        name: end_name,
                    });
                    cells.push(cell);
                    continue;
                }
                _ => {
                    self.error(ParseError::UnexpectedBraceToken {
                        pos: self.position(),
                        instruction: name.to_string(),
                    });
                    cells.push(cell);
                    continue;
                }
            }
            cells.push(cell);
            row_lines.push(self.table_line.take().unwrap_or(TableLine::None));
            rows.push(std::mem::take(&mut cells));
        }

        self.math = saved_math;
        self.table_line = saved_line;

        // 末尾 `\\` 留下的空行不算一行，它上方的线成为底线
        let trailing_empty = rows
            .last()
            .is_some_and(|row| row.len() == 1 && row[0] == Node::empty());
        let mut bottom = TableLine::None;
        if trailing_empty {
            rows.pop();
            bottom = row_lines.pop().unwrap_or(TableLine::None);
        }
        row_lines.push(bottom);

        let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
        if !spec_alignment.is_empty() && widest > spec_alignment.len() {
            self.error(ParseError::ColumnCount {
                pos: start,
                name: name.to_string(),
            });
        }
        let columns = widest.max(spec_alignment.len());
        let column_alignment = (0..columns)
            .map(|column| {
                spec_alignment
                    .get(column)
                    .copied()
                    .unwrap_or_else(|| style.default_alignment(column))
            })
            .collect();
        let column_lines = (0..=columns)
            .map(|index| spec_lines.get(index).copied().unwrap_or(TableLine::None))
            .collect();

        debug!("环境 {} 解析为 {} 行 {} 列", name, rows.len(), columns);
        let matrix = Node::Matrix(MatrixNode {
            rows,
            columns,
            column_alignment,
            column_lines,
            row_lines,
        });
        if style.open == BraceType::None && style.close == BraceType::None {
            return matrix;
        }
        Node::Brace(BraceNode {
            open: style.open,
            close: style.close,
            child: Box::new(matrix),
        })
    }

    fn read_column_spec(&mut self, name: &str) -> Option<String> {
        if !self.brace_follows() {
            return None;
        }
        self.read_string_params(name, 1)
            .and_then(|mut params| params.pop())
    }
}
