//! 解析器：把记号流组装成语法树
//!
//! 解析从不中途放弃，遇到问题时记录一条 `ParseError` 并尽量保留已读到的内容。

pub(crate) mod lexer;
pub mod rules;

use log::{debug, trace};

use crate::ast::{
    BoxInstructionNode, BraceType, DecoratedNode, DecorationType, HAlign, InstructionNode,
    ModifyEnvironmentNode, Node, SymbolNode, TableLine, TextProperty, VerbatimNode,
    VerticalListNode, WhitespaceKind,
};
use crate::error::ParseError;

use lexer::{Lexer, Mode, Token};
use rules::symbols::{self, SymbolFlags};
use rules::InstructionKind;

/// 解析选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// 从数学模式开始解析，等价于整段外面包了一层 `$..$`
    pub math_mode: bool,
    /// 顶层的 `\\` 是否换行
    pub allow_linebreaks: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            math_mode: false,
            allow_linebreaks: true,
        }
    }
}

/// 解析结果：语法树与沿途收集的诊断
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub root: Node,
    pub errors: Vec<ParseError>,
}

impl ParsedDocument {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn parse(input: &str, options: ParseOptions) -> ParsedDocument {
    let mut parser = Parser::new(input, options);
    let lines = parser.parse_lines(LinesEnd::Document);
    let mut root = if lines.len() == 1 {
        lines.into_iter().next().unwrap_or_else(Node::empty)
    } else {
        Node::VerticalList(VerticalListNode::new(lines, HAlign::Left))
    };
    if options.math_mode {
        root = math_wrapper(root);
    }
    let errors = parser.finish();
    debug!("解析完成: 输入 {} 字节, {} 条错误", input.len(), errors.len());
    ParsedDocument { root, errors }
}

fn math_wrapper(child: Node) -> Node {
    Node::Instruction(InstructionNode {
        name: "equation".to_string(),
        property: TextProperty::Math,
        params: Vec::new(),
        child: Box::new(child),
        above_below: false,
    })
}

/// `parse_lines` 的结束条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinesEnd<'a> {
    /// 整个输入
    Document,
    /// `{` 之后，读到 `}`
    Group,
    /// `\begin{name}` 之后，读到 `\end{name}`
    Environment(&'a str),
}

pub(crate) struct Parser {
    lexer: Lexer,
    pending: Option<Token>,
    pub(crate) math: bool,
    inline_math: bool,
    errors: Vec<ParseError>,
    /// 最近一次 `\right` 读到的括号
    pub(crate) last_right_brace: BraceType,
    /// 当前矩阵行上方待画的横线
    pub(crate) table_line: Option<TableLine>,
    allow_linebreaks: bool,
}

impl Parser {
    pub(crate) fn new(input: &str, options: ParseOptions) -> Self {
        Self {
            lexer: Lexer::new(input),
            pending: None,
            math: options.math_mode,
            inline_math: false,
            errors: Vec::new(),
            last_right_brace: BraceType::None,
            table_line: None,
            allow_linebreaks: options.allow_linebreaks,
        }
    }

    fn finish(mut self) -> Vec<ParseError> {
        let trailing = self.lexer.take_errors();
        self.errors.extend(trailing);
        self.errors
    }

    pub(crate) fn next(&mut self) -> Token {
        if let Some(token) = self.pending.take() {
            return token;
        }
        let mode = if self.math { Mode::Math } else { Mode::Text };
        let token = self.lexer.next_token(mode);
        let lexed = self.lexer.take_errors();
        self.errors.extend(lexed);
        token
    }

    pub(crate) fn push_back(&mut self, token: Token) {
        debug_assert!(self.pending.is_none(), "只支持回退一个记号");
        self.pending = Some(token);
    }

    /// 退回 `parse_list` 的结束记号；`\right` 的括号已被读走，不能再退回
    pub(crate) fn restore_terminator(&mut self, token: Token) {
        match token {
            Token::End => {}
            Token::Instruction(ref name) if name == "right" => {}
            other => self.push_back(other),
        }
    }

    pub(crate) fn next_skip_whitespace(&mut self) -> Token {
        loop {
            let token = self.next();
            if token != Token::Whitespace {
                return token;
            }
        }
    }

    /// 控制词之后的空白属于指令本身
    fn skip_one_whitespace(&mut self) {
        let token = self.next();
        if token != Token::Whitespace {
            self.push_back(token);
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.lexer.position()
    }

    pub(crate) fn error(&mut self, error: ParseError) {
        trace!("解析错误: {}", error);
        self.errors.push(error);
    }

    /// 下一个非空白记号是否为 `{`
    pub(crate) fn brace_follows(&self) -> bool {
        match &self.pending {
            Some(Token::OpenBrace) => true,
            Some(Token::Whitespace) | None => self.lexer.peek_non_whitespace() == Some('{'),
            Some(_) => false,
        }
    }

    /// 解析一串兄弟节点，返回这些节点和使解析停下的记号
    pub(crate) fn parse_list(&mut self, stop_at_bracket: bool) -> (Vec<Node>, Token) {
        let mut items = Vec::new();
        loop {
            let token = self.next();
            match token {
                Token::End
                | Token::CloseBrace
                | Token::Ampersand
                | Token::Newline
                | Token::EndEnvironment(_) => return (items, token),
                Token::CloseBracket if stop_at_bracket => return (items, token),
                Token::Dollar => {
                    if !self.math {
                        let equation = self.parse_inline_math();
                        items.push(equation);
                    } else if self.inline_math {
                        return (items, token);
                    }
                }
                Token::Instruction(name) => match name.as_str() {
                    "right" => {
                        self.read_right_brace();
                        return (items, Token::Instruction(name));
                    }
                    "limits" | "nolimits" => {
                        if let Some(last) = items.last_mut() {
                            last.set_above_below(name == "limits");
                        }
                    }
                    _ => {
                        if let Some(node) = self.parse_instruction(&name) {
                            items.push(node);
                        }
                    }
                },
                Token::Text(text) => self.push_text(&mut items, text),
                Token::Whitespace => {
                    if !self.math {
                        match items.last_mut() {
                            Some(Node::Text(prev)) => prev.text.push(' '),
                            _ => items.push(Node::Whitespace(WhitespaceKind::Normal)),
                        }
                    }
                }
                Token::Tilde => items.push(Node::Whitespace(WhitespaceKind::NonBreaking)),
                Token::Hyphen => self.push_text(&mut items, "-".to_string()),
                Token::EnDash => self.push_text(&mut items, "\u{2013}".to_string()),
                Token::EmDash => self.push_text(&mut items, "\u{2014}".to_string()),
                Token::OpenBracket => self.push_text(&mut items, "[".to_string()),
                Token::CloseBracket => self.push_text(&mut items, "]".to_string()),
                Token::OpenBrace => {
                    let group = self.parse_group();
                    items.push(Node::Block(Box::new(group)));
                }
                Token::Underscore => {
                    let script = self.read_script_argument("_");
                    items.push(Node::Subscript(Box::new(script)));
                }
                Token::Caret => {
                    let script = self.read_script_argument("^");
                    items.push(Node::Superscript(Box::new(script)));
                }
                Token::Verbatim {
                    text,
                    visible_space,
                } => items.push(Node::Verbatim(VerbatimNode {
                    text,
                    visible_space,
                    alignment: HAlign::Left,
                })),
                Token::Begin(name) => {
                    let env = self.parse_environment(&name);
                    items.push(env);
                }
            }
        }
    }

    /// 正文模式中相邻文本合并；数学模式中单个运算字符变成符号
    fn push_text(&mut self, items: &mut Vec<Node>, text: String) {
        if text.is_empty() {
            return;
        }
        if self.math {
            let mut chars = text.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                if let Some(name) = symbols::math_char_symbol(ch) {
                    items.push(Node::symbol(name));
                    return;
                }
            }
            items.push(Node::text(text));
            return;
        }
        match items.last_mut() {
            Some(Node::Text(prev)) => prev.text.push_str(&text),
            _ => items.push(Node::text(text)),
        }
    }

    /// 正文中的 `$..$`
    fn parse_inline_math(&mut self) -> Node {
        let saved = (self.math, self.inline_math);
        self.math = true;
        self.inline_math = true;
        let mut content = Vec::new();
        loop {
            let (items, end) = self.parse_list(false);
            content.extend(items);
            match end {
                Token::Dollar | Token::End => break,
                Token::Instruction(_) => {
                    self.error(ParseError::UnexpectedBraceToken {
                        pos: self.position(),
                        instruction: "right".to_string(),
                    });
                }
                other => {
                    self.push_back(other);
                    break;
                }
            }
        }
        (self.math, self.inline_math) = saved;
        math_wrapper(Node::HorizontalList(content).simplify())
    }

    /// `_`/`^` 之后的一个参数：花括号分组、单个字符或一条指令
    pub(crate) fn read_script_argument(&mut self, instruction: &str) -> Node {
        let pos = self.position();
        match self.next_skip_whitespace() {
            Token::OpenBrace => self.parse_group(),
            Token::Text(text) => {
                let mut chars = text.chars();
                let Some(first) = chars.next() else {
                    return Node::empty();
                };
                let rest = chars.as_str();
                if !rest.is_empty() {
                    self.push_back(Token::Text(rest.to_string()));
                }
                let mut items = Vec::new();
                self.push_text(&mut items, first.to_string());
                Node::HorizontalList(items).simplify()
            }
            Token::Instruction(name) if name != "right" && name != "limits" => {
                self.parse_instruction(&name).unwrap_or_else(Node::empty)
            }
            other => {
                self.error(ParseError::MissingArgument {
                    pos,
                    instruction: instruction.to_string(),
                    index: 1,
                });
                self.push_back(other);
                Node::empty()
            }
        }
    }

    /// `{` 已被读取，解析到匹配的 `}`
    pub(crate) fn parse_group(&mut self) -> Node {
        let start = self.position();
        let mut content = Vec::new();
        loop {
            let (items, end) = self.parse_list(false);
            content.extend(items);
            match end {
                Token::CloseBrace => break,
                Token::End => {
                    self.error(ParseError::MissingClosingBrace(start));
                    break;
                }
                Token::Newline | Token::Ampersand => {
                    trace!("分组内的 {:?} 被忽略", end);
                }
                Token::Instruction(_) => {
                    self.error(ParseError::UnexpectedBraceToken {
                        pos: self.position(),
                        instruction: "right".to_string(),
                    });
                }
                other => {
                    self.error(ParseError::MissingClosingBrace(start));
                    self.push_back(other);
                    break;
                }
            }
        }
        Node::HorizontalList(content).simplify()
    }

    pub(crate) fn expect_group(&mut self, instruction: &str, index: usize) -> Option<Node> {
        self.expect_group_with_mode(instruction, index, None)
    }

    /// 读取一个 `{..}` 参数，`math` 为 Some 时在指定模式下解析内容
    pub(crate) fn expect_group_with_mode(
        &mut self,
        instruction: &str,
        index: usize,
        math: Option<bool>,
    ) -> Option<Node> {
        let pos = self.position();
        let token = self.next_skip_whitespace();
        if token != Token::OpenBrace {
            self.error(ParseError::MissingArgument {
                pos,
                instruction: instruction.to_string(),
                index,
            });
            self.push_back(token);
            return None;
        }
        let saved = (self.math, self.inline_math);
        if let Some(math) = math {
            self.math = math;
            self.inline_math = false;
        }
        let group = self.parse_group();
        (self.math, self.inline_math) = saved;
        Some(group)
    }

    /// 读取 `count` 个纯文本参数，如颜色名、长度、列格式
    pub(crate) fn read_string_params(
        &mut self,
        instruction: &str,
        count: usize,
    ) -> Option<Vec<String>> {
        let mut params = Vec::with_capacity(count);
        for index in 1..=count {
            let pos = self.position();
            let token = self.next_skip_whitespace();
            if token != Token::OpenBrace {
                self.error(ParseError::MissingArgument {
                    pos,
                    instruction: instruction.to_string(),
                    index,
                });
                self.push_back(token);
                return None;
            }
            let mut value = String::new();
            loop {
                match self.next() {
                    Token::Text(text) => value.push_str(&text),
                    Token::Whitespace => value.push(' '),
                    Token::Hyphen => value.push('-'),
                    Token::EnDash => value.push_str("--"),
                    Token::EmDash => value.push_str("---"),
                    Token::CloseBrace => break,
                    other => {
                        self.error(ParseError::MalformedParameters {
                            pos,
                            instruction: instruction.to_string(),
                        });
                        self.push_back(other);
                        return None;
                    }
                }
            }
            params.push(value.trim().to_string());
        }
        Some(params)
    }

    /// 指令名已被读取
    fn parse_instruction(&mut self, name: &str) -> Option<Node> {
        let brace_follows = self.brace_follows();
        let Some(kind) = rules::lookup(name, brace_follows) else {
            return self.parse_unknown_instruction(name, brace_follows);
        };
        match kind {
            InstructionKind::Whitespace(kind) => Some(Node::Whitespace(kind)),
            InstructionKind::HSpace => self.parse_hspace(name),
            InstructionKind::Symbol(entry) => Some(Node::Symbol(SymbolNode {
                name: name.to_string(),
                above_below: self.math && entry.has(SymbolFlags::ABOVE_BELOW),
            })),
            InstructionKind::Big { factor, side } => Some(self.parse_big(name, factor, side)),
            InstructionKind::Left => Some(self.parse_left()),
            InstructionKind::Modifier { modifier, params } => {
                let params = self.read_string_params(name, params)?;
                self.skip_one_whitespace();
                Some(Node::ModifyEnvironment(ModifyEnvironmentNode { modifier, params }))
            }
            InstructionKind::TextProperty { property, params } => {
                let params = self.read_string_params(name, params)?;
                let mode = rules::content_math_mode(property);
                let child = self.expect_group_with_mode(name, params.len() + 1, mode)?;
                Some(Node::Instruction(InstructionNode {
                    name: name.to_string(),
                    property,
                    params,
                    child: Box::new(child),
                    above_below: false,
                }))
            }
            InstructionKind::Unicode(form) => self.parse_unicode(name, form),
            InstructionKind::Box { style, params } => {
                let params = self.read_string_params(name, params)?;
                let child = self.expect_group(name, params.len() + 1)?;
                Some(Node::BoxInstruction(BoxInstructionNode {
                    style,
                    params,
                    child: Box::new(child),
                }))
            }
            InstructionKind::Phantom(mode) => self.parse_phantom(name, mode),
            InstructionKind::Substack(alignment) => self.parse_substack(name, alignment),
            InstructionKind::Sqrt => self.parse_sqrt(),
            InstructionKind::Cbrt => self.parse_cbrt(),
            InstructionKind::Decoration(decoration) => {
                let child = self.expect_group(name, 1)?;
                Some(Node::Decorated(DecoratedNode {
                    decoration,
                    child: Box::new(child),
                }))
            }
            InstructionKind::Fraction(mode) => self.parse_fraction(name, mode),
            InstructionKind::Binom => self.parse_binom(name),
            InstructionKind::TableLine(line) => {
                self.add_table_line(line);
                self.skip_one_whitespace();
                None
            }
        }
    }

    fn parse_unknown_instruction(&mut self, name: &str, brace_follows: bool) -> Option<Node> {
        if let Some(node) = letter_shorthand(name) {
            return Some(node);
        }
        if brace_follows {
            trace!("未知指令 \\{}，按普通指令透传参数", name);
            let child = self.expect_group(name, 1)?;
            return Some(Node::Instruction(InstructionNode {
                name: name.to_string(),
                property: TextProperty::Generic,
                params: Vec::new(),
                child: Box::new(child),
                above_below: false,
            }));
        }
        trace!("未知符号 \\{}", name);
        self.error(ParseError::UnknownSymbol(name.to_string()));
        Some(Node::symbol(name))
    }

    /// 按行解析，直到 `end` 指定的结束位置
    pub(crate) fn parse_lines(&mut self, end: LinesEnd<'_>) -> Vec<Node> {
        let start = self.position();
        let mut lines = Vec::new();
        let mut current = Vec::new();
        loop {
            let (items, token) = self.parse_list(false);
            current.extend(items);
            match token {
                Token::Newline => {
                    if end == LinesEnd::Document && !self.allow_linebreaks {
                        continue;
                    }
                    let line = std::mem::take(&mut current);
                    lines.push(Node::HorizontalList(line).simplify());
                }
                Token::End => {
                    match end {
                        LinesEnd::Document => {}
                        LinesEnd::Group => self.error(ParseError::MissingClosingBrace(start)),
                        LinesEnd::Environment(name) => {
                            self.error(ParseError::UnterminatedEnvironment {
                                pos: start,
                                name: name.to_string(),
                            })
                        }
                    }
                    break;
                }
                Token::CloseBrace => {
                    if end == LinesEnd::Group {
                        break;
                    }
                    self.error(ParseError::UnexpectedBraceToken {
                        pos: self.position(),
                        instruction: "}".to_string(),
                    });
                }
                Token::EndEnvironment(name) => match end {
                    LinesEnd::Environment(expected) if expected == name => break,
                    LinesEnd::Group => {
                        self.error(ParseError::MissingClosingBrace(start));
                        self.push_back(Token::EndEnvironment(name));
                        break;
                    }
                    _ => self.error(ParseError::UnmatchedEnvironmentEnd {
                        pos: self.position(),
                        name,
                    }),
                },
                Token::Ampersand => trace!("矩阵之外的 & 被忽略"),
                Token::Instruction(_) => self.error(ParseError::UnexpectedBraceToken {
                    pos: self.position(),
                    instruction: "right".to_string(),
                }),
                other => {
                    if end == LinesEnd::Group {
                        self.error(ParseError::MissingClosingBrace(start));
                        self.push_back(other);
                        break;
                    }
                }
            }
        }
        lines.push(Node::HorizontalList(current).simplify());
        lines
    }
}

/// `\vx` → 向量，`\cA` → 花体，`\bbR` → 黑板粗体
fn letter_shorthand(name: &str) -> Option<Node> {
    let letter = |rest: &str| {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if ch.is_ascii_alphabetic() => Some(ch),
            _ => None,
        }
    };
    let styled = |command: &str, property: TextProperty, ch: char| {
        Node::Instruction(InstructionNode {
            name: command.to_string(),
            property,
            params: Vec::new(),
            child: Box::new(Node::text(ch)),
            above_below: false,
        })
    };
    if let Some(ch) = name.strip_prefix("bb").and_then(letter) {
        return Some(styled("mathbb", TextProperty::Blackboard, ch));
    }
    if let Some(ch) = name.strip_prefix('c').and_then(letter) {
        return Some(styled("mathcal", TextProperty::Caligraphic, ch));
    }
    if let Some(ch) = name.strip_prefix('v').and_then(letter) {
        return Some(Node::Decorated(DecoratedNode {
            decoration: DecorationType::Vector,
            child: Box::new(Node::text(ch)),
        }));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BraceNode, FracMode, FracNode, NodeKind, SqrtNode};

    fn math(input: &str) -> ParsedDocument {
        parse(
            input,
            ParseOptions {
                math_mode: true,
                ..ParseOptions::default()
            },
        )
    }

    /// 去掉数学模式外层的 equation 包装
    fn body(doc: &ParsedDocument) -> &Node {
        match &doc.root {
            Node::Instruction(inst) if inst.name == "equation" => inst.child.as_ref(),
            other => other,
        }
    }

    #[test]
    fn fraction_has_two_leaves() {
        let doc = math(r"\frac{a}{b}");
        assert!(doc.is_ok(), "{:?}", doc.errors);
        assert_eq!(
            body(&doc),
            &Node::Frac(FracNode {
                mode: FracMode::Plain,
                numerator: Box::new(Node::text("a")),
                denominator: Box::new(Node::text("b")),
            })
        );
    }

    #[test]
    fn sqrt_with_and_without_degree() {
        match body(&math(r"\sqrt{x}")) {
            Node::Sqrt(SqrtNode { degree, .. }) => assert!(degree.is_none()),
            other => panic!("{other:?}"),
        }
        match body(&math(r"\sqrt[3]{x}")) {
            Node::Sqrt(SqrtNode { child, degree }) => {
                assert_eq!(child.as_ref(), &Node::text("x"));
                assert_eq!(degree.as_deref(), Some(&Node::text("3")));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn empty_left_right_pair() {
        let doc = math(r"\left(\right)");
        assert!(doc.is_ok(), "{:?}", doc.errors);
        let Node::Brace(brace) = body(&doc) else {
            panic!("{:?}", doc.root);
        };
        assert_eq!(brace.open, BraceType::Parenthesis);
        assert_eq!(brace.close, BraceType::Parenthesis);
        assert_eq!(brace.child.as_ref(), &Node::empty());
        assert!(brace.show_opening_brace() && brace.show_closing_brace());
    }

    #[test]
    fn left_with_named_and_invisible_braces() {
        let doc = math(r"\left\langle x \right.");
        let Node::Brace(BraceNode { open, close, .. }) = body(&doc) else {
            panic!("{:?}", doc.root);
        };
        assert_eq!(*open, BraceType::AngleBracket);
        assert_eq!(*close, BraceType::None);
    }

    #[test]
    fn unmatched_left_is_reported() {
        let doc = math(r"\left( x");
        assert!(doc.errors.iter().any(|e| matches!(e, ParseError::UnmatchedLeft(_))));
        assert_eq!(body(&doc).kind(), NodeKind::Brace);
    }

    #[test]
    fn scripts_are_siblings_in_either_order() {
        for input in ["x^2_3", "x_3^2"] {
            let doc = math(input);
            let Node::HorizontalList(items) = body(&doc) else {
                panic!("{input}: {:?}", doc.root);
            };
            assert_eq!(items.len(), 3, "{input}");
            assert_eq!(items[0], Node::text("x"));
        }
        let Node::HorizontalList(items) = body(&math("x^2_3")).clone() else {
            unreachable!()
        };
        assert_eq!(items[1].kind(), NodeKind::Superscript);
        assert_eq!(items[2].kind(), NodeKind::Subscript);
    }

    #[test]
    fn script_takes_a_single_character() {
        let doc = math("x^23");
        let Node::HorizontalList(items) = body(&doc) else {
            panic!("{:?}", doc.root);
        };
        assert_eq!(items[1], Node::Superscript(Box::new(Node::text("2"))));
        assert_eq!(items[2], Node::text("3"));
    }

    #[test]
    fn missing_second_argument_keeps_the_first() {
        let doc = math(r"\frac{a}");
        assert!(!doc.errors.is_empty());
        assert!(matches!(
            doc.errors[0],
            ParseError::MissingArgument { index: 2, .. }
        ));
        assert_eq!(body(&doc), &Node::text("a"));
    }

    #[test]
    fn pmatrix_is_two_by_two() {
        let doc = math(r"\begin{pmatrix}1&2\\3&4\end{pmatrix}");
        assert!(doc.is_ok(), "{:?}", doc.errors);
        let Node::Brace(brace) = body(&doc) else {
            panic!("{:?}", doc.root);
        };
        assert_eq!(brace.open, BraceType::Parenthesis);
        assert_eq!(brace.close, BraceType::Parenthesis);
        let Node::Matrix(matrix) = brace.child.as_ref() else {
            panic!("{:?}", brace.child);
        };
        assert_eq!(matrix.row_count(), 2);
        assert_eq!(matrix.columns, 2);
        assert_eq!(matrix.cell(1, 0), Some(&Node::text("3")));
        assert_eq!(matrix.row_lines.len(), 3);
        assert_eq!(matrix.column_lines.len(), 3);
    }

    #[test]
    fn tabular_lines_and_trailing_row() {
        let doc = parse(
            r"\begin{tabular}{|l|c|}\hline a & b \\ \hline\hline c & d \\ \hline\end{tabular}",
            ParseOptions::default(),
        );
        assert!(doc.is_ok(), "{:?}", doc.errors);
        let Node::Matrix(matrix) = &doc.root else {
            panic!("{:?}", doc.root);
        };
        assert_eq!(matrix.row_count(), 2);
        assert_eq!(
            matrix.row_lines,
            vec![TableLine::Single, TableLine::Double, TableLine::Single]
        );
        assert_eq!(matrix.column_alignment, vec![HAlign::Left, HAlign::Center]);
        assert_eq!(
            matrix.column_lines,
            vec![TableLine::Single, TableLine::Single, TableLine::Single]
        );
    }

    #[test]
    fn too_many_columns_for_the_spec() {
        let doc = math(r"\begin{array}{c}1&2\end{array}");
        assert!(doc
            .errors
            .iter()
            .any(|e| matches!(e, ParseError::ColumnCount { .. })));
    }

    #[test]
    fn unterminated_environment() {
        let doc = math(r"\begin{matrix}1&2");
        assert!(doc
            .errors
            .iter()
            .any(|e| matches!(e, ParseError::UnterminatedEnvironment { .. })));
    }

    #[test]
    fn parsing_is_repeatable() {
        let input = r"\sum_{i=0}^{n} \frac{\alpha_i}{\sqrt[3]{x}} + \left[\begin{matrix}a\\b\end{matrix}\right]";
        let first = math(input);
        let second = math(input);
        assert_eq!(first.root.structure(), second.root.structure());
        assert_eq!(first, second);
    }

    #[test]
    fn operators_sit_above_below_in_math() {
        let doc = math(r"\sum\nolimits_i \int\limits_0^1");
        let Node::HorizontalList(items) = body(&doc) else {
            panic!("{:?}", doc.root);
        };
        assert!(!items[0].is_above_below());
        assert!(items[2].is_above_below());
        let text = parse(r"\sum", ParseOptions::default());
        assert!(!text.root.is_above_below());
    }

    #[test]
    fn inline_math_inside_text() {
        let doc = parse(r"area $\pi r^2$ units", ParseOptions::default());
        let Node::HorizontalList(items) = &doc.root else {
            panic!("{:?}", doc.root);
        };
        assert_eq!(items[0], Node::text("area "));
        assert!(matches!(
            &items[1],
            Node::Instruction(inst) if inst.property == TextProperty::Math
        ));
        assert_eq!(items[2], Node::Whitespace(WhitespaceKind::Normal));
        assert_eq!(items[3], Node::text("units"));
    }

    #[test]
    fn modifiers_and_text_properties() {
        let doc = parse(r"\bf bold \textcolor{red}{x}", ParseOptions::default());
        let Node::HorizontalList(items) = &doc.root else {
            panic!("{:?}", doc.root);
        };
        assert!(matches!(&items[0], Node::ModifyEnvironment(_)));
        assert_eq!(items[1], Node::text("bold "));
        let Node::Instruction(inst) = &items[2] else {
            panic!("{:?}", items[2]);
        };
        assert_eq!(inst.params, vec!["red".to_string()]);
        assert_eq!(inst.property, TextProperty::Color);
    }

    #[test]
    fn text_inside_math_is_parsed_as_text() {
        let doc = math(r"\text{a-b}");
        let Node::Instruction(inst) = body(&doc) else {
            panic!("{:?}", doc.root);
        };
        assert_eq!(inst.child.as_ref(), &Node::text("a-b"));
    }

    #[test]
    fn top_level_line_breaks() {
        let doc = parse(r"one\\two", ParseOptions::default());
        let Node::VerticalList(list) = &doc.root else {
            panic!("{:?}", doc.root);
        };
        assert_eq!(list.lines, vec![Node::text("one"), Node::text("two")]);

        let joined = parse(
            r"one\\two",
            ParseOptions {
                allow_linebreaks: false,
                ..ParseOptions::default()
            },
        );
        assert_eq!(joined.root.kind(), NodeKind::HorizontalList);
    }

    #[test]
    fn unknown_names() {
        let doc = math(r"\foo");
        assert_eq!(doc.errors, vec![ParseError::UnknownSymbol("foo".into())]);
        assert_eq!(body(&doc), &Node::symbol("foo"));

        let generic = math(r"\foo{x}");
        assert!(generic.is_ok());
        assert!(matches!(
            body(&generic),
            Node::Instruction(inst) if inst.property == TextProperty::Generic
        ));
    }

    #[test]
    fn letter_shorthands() {
        assert!(matches!(
            body(&math(r"\vx")),
            Node::Decorated(deco) if deco.decoration == DecorationType::Vector
        ));
        assert!(matches!(
            body(&math(r"\bbK")),
            Node::Instruction(inst) if inst.property == TextProperty::Blackboard
        ));
        assert!(matches!(
            body(&math(r"\cA")),
            Node::Instruction(inst) if inst.property == TextProperty::Caligraphic
        ));
    }

    #[test]
    fn unclosed_brace_is_an_error() {
        let doc = math(r"\sqrt{x");
        assert_eq!(doc.errors, vec![ParseError::MissingClosingBrace(6)]);
        assert_eq!(body(&doc).kind(), NodeKind::Sqrt);
    }

    #[test]
    fn big_braces_pick_a_side() {
        let Node::HorizontalList(items) = body(&math(r"\bigl( x \bigr)")).clone() else {
            panic!()
        };
        let Node::Brace(open) = &items[0] else {
            panic!("{:?}", items[0]);
        };
        assert_eq!(open.open, BraceType::Parenthesis);
        assert_eq!(open.close, BraceType::None);
        assert_eq!(open.child.as_ref(), &Node::Strut(0.85));
        let Node::Brace(close) = &items[2] else {
            panic!("{:?}", items[2]);
        };
        assert_eq!(close.open, BraceType::None);
    }

    #[test]
    fn underbrace_label_from_subscript() {
        let doc = math(r"\underbrace{a+b}_{n}");
        assert!(doc.is_ok(), "{:?}", doc.errors);
        let Node::Frac(frac) = body(&doc) else {
            panic!("{:?}", doc.root);
        };
        assert_eq!(frac.mode, FracMode::Underbrace);
        assert_eq!(frac.denominator.as_ref(), &Node::text("n"));
    }

    #[test]
    fn binom_is_a_bracketed_stack() {
        let Node::Brace(brace) = body(&math(r"\binom{n}{k}")).clone() else {
            panic!()
        };
        assert!(matches!(
            brace.child.as_ref(),
            Node::Frac(frac) if frac.mode == FracMode::Stack
        ));
    }

    #[test]
    fn hspace_and_unicode() {
        let doc = math(r"a\hspace{2em}\unicode{3B1}");
        assert!(doc.is_ok(), "{:?}", doc.errors);
        let Node::HorizontalList(items) = body(&doc) else {
            panic!("{:?}", doc.root);
        };
        assert!(matches!(items[1], Node::Whitespace(WhitespaceKind::Custom(_))));
        assert_eq!(items[2], Node::text("α"));
    }

    #[test]
    fn framed_environment_wraps_lines() {
        let doc = parse(r"\begin{framed}a\\b\end{framed}", ParseOptions::default());
        let Node::BoxInstruction(boxed) = &doc.root else {
            panic!("{:?}", doc.root);
        };
        let Node::VerticalList(list) = boxed.child.as_ref() else {
            panic!("{:?}", boxed.child);
        };
        assert_eq!(list.lines.len(), 2);
    }
}
