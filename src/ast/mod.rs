//! 语法树：解析器产出的节点，构建完成后结构不再改变
//!
//! 每个父节点独占自己的子节点（`Box`/`Vec`），树中不存在共享或回指。

/// 节点类别，供调试输出与测试比较结构使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Symbol,
    Whitespace,
    HorizontalList,
    VerticalList,
    Block,
    Subscript,
    Superscript,
    Frac,
    Sqrt,
    Brace,
    Decorated,
    Matrix,
    Instruction,
    ModifyEnvironment,
    BoxInstruction,
    Phantom,
    Strut,
    Verbatim,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(TextNode),
    Symbol(SymbolNode),
    Whitespace(WhitespaceKind),
    HorizontalList(Vec<Node>),
    VerticalList(VerticalListNode),
    /// `{...}` 分组，内部的环境修改不会泄漏到后续兄弟
    Block(Box<Node>),
    Subscript(Box<Node>),
    Superscript(Box<Node>),
    Frac(FracNode),
    Sqrt(SqrtNode),
    Brace(BraceNode),
    Decorated(DecoratedNode),
    Matrix(MatrixNode),
    Instruction(InstructionNode),
    ModifyEnvironment(ModifyEnvironmentNode),
    BoxInstruction(BoxInstructionNode),
    Phantom(PhantomNode),
    /// 不可见的支撑盒，高度为字体行高的若干倍
    Strut(f32),
    Verbatim(VerbatimNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolNode {
    pub name: String,
    /// 上下标放在符号正上方/正下方（`\sum`、`\lim`、`\limits`）
    pub above_below: bool,
}

/// 长度单位，`\hspace` 使用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Em,
    Ex,
    Pt,
    Px,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WhitespaceKind {
    /// 普通空格
    Normal,
    /// `~` 与 `\nbsp`
    NonBreaking,
    Thin,
    Medium,
    Thick,
    NegThin,
    NegMedium,
    NegThick,
    EnSpace,
    Quad,
    EmSpace,
    QQuad,
    Custom(Length),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSpacing {
    /// 行距不小于字体行距
    Default,
    /// 只保证上一行下降 + 行间隙 + 下一行上升
    Minimal,
}

/// 多行盒子的基线取在哪里
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalOrientation {
    Top,
    FirstLine,
    Centered,
    LastLine,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerticalListNode {
    pub lines: Vec<Node>,
    pub alignment: HAlign,
    pub spacing: LineSpacing,
    pub line_spacing_factor: f32,
    pub orientation: VerticalOrientation,
}

impl VerticalListNode {
    pub fn new(lines: Vec<Node>, alignment: HAlign) -> Self {
        Self {
            lines,
            alignment,
            spacing: LineSpacing::Default,
            line_spacing_factor: 1.0,
            orientation: VerticalOrientation::FirstLine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FracMode {
    /// `\frac`
    Plain,
    /// `\dfrac`
    Display,
    /// `\tfrac`
    Small,
    /// `\sfrac`
    Slanted,
    /// `\stfrac`
    StackedSlanted,
    /// `\stackrel{top}{base}`
    StackRel,
    /// 无分数线的堆叠，`\binom` 使用
    Stack,
    Underbrace,
    Overbrace,
    Underbracket,
    Overbracket,
    Underset,
    Overset,
}

impl FracMode {
    /// 会让内层分数进入嵌套缩小的模式；`\dfrac` 不计入
    pub fn nests(self) -> bool {
        matches!(
            self,
            FracMode::Plain
                | FracMode::Small
                | FracMode::Stack
                | FracMode::Slanted
                | FracMode::StackedSlanted
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FracNode {
    pub mode: FracMode,
    pub numerator: Box<Node>,
    pub denominator: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqrtNode {
    pub child: Box<Node>,
    pub degree: Option<Box<Node>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceType {
    /// `.`，该侧不画括号
    None,
    Parenthesis,
    SquareBracket,
    CurlyBracket,
    SingleLine,
    DoubleLine,
    AngleBracket,
    FloorBracket,
    CeilBracket,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BraceNode {
    pub open: BraceType,
    pub close: BraceType,
    pub child: Box<Node>,
}

impl BraceNode {
    pub fn show_opening_brace(&self) -> bool {
        self.open != BraceType::None
    }

    pub fn show_closing_brace(&self) -> bool {
        self.close != BraceType::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationType {
    Vector,
    Hat,
    WideHat,
    Check,
    WideCheck,
    Breve,
    Ocirc,
    Dot,
    Ddot,
    Bar,
    Overline,
    DoubleOverline,
    Tilde,
    WideTilde,
    Acute,
    Grave,
    Arrow,
    OverLeftArrow,
    OverRightArrow,
    OverLeftRightArrow,
    Underline,
    UnderlineDashed,
    UnderlineDotted,
    DoubleUnderline,
    UnderLeftArrow,
    UnderRightArrow,
    UnderLeftRightArrow,
    Strike,
    Cancel,
    BCancel,
    XCancel,
}

/// 装饰所在的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationPlacement {
    Over,
    Under,
    Through,
}

impl DecorationType {
    pub fn placement(self) -> DecorationPlacement {
        use DecorationType::*;
        match self {
            Underline | UnderlineDashed | UnderlineDotted | DoubleUnderline | UnderLeftArrow
            | UnderRightArrow | UnderLeftRightArrow => DecorationPlacement::Under,
            Strike | Cancel | BCancel | XCancel => DecorationPlacement::Through,
            _ => DecorationPlacement::Over,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedNode {
    pub decoration: DecorationType,
    pub child: Box<Node>,
}

/// 表格线的样式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLine {
    None,
    Single,
    Double,
    Heavy,
    Dashed,
    DoubleDashed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixNode {
    /// 按行存放的单元格，行可以比列数短，缺少的单元格视为空
    pub rows: Vec<Vec<Node>>,
    pub columns: usize,
    pub column_alignment: Vec<HAlign>,
    /// 列之间的竖线，长度为 `columns + 1`
    pub column_lines: Vec<TableLine>,
    /// 行之间的横线，长度为 `rows + 1`，第 0 项是顶线
    pub row_lines: Vec<TableLine>,
}

impl MatrixNode {
    pub fn cell(&self, row: usize, column: usize) -> Option<&Node> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// 一参数文本属性指令（`\textbf{}`、`\textcolor{c}{}` 等）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextProperty {
    Bold,
    Italic,
    Upright,
    Roman,
    Sans,
    Typewriter,
    Script,
    Blackboard,
    Caligraphic,
    Fraktur,
    SmallCaps,
    Color,
    /// 数学模式中的正文
    Text,
    /// 进入数学模式（`$...$`、`\ensuremath`）
    Math,
    Uppercase,
    Lowercase,
    Underlined,
    Overlined,
    Strike,
    /// `\displaystyle{}` 这类一参数写法
    DisplayStyle,
    /// 未知指令，只透传内容
    Generic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstructionNode {
    pub name: String,
    pub property: TextProperty,
    pub params: Vec<String>,
    pub child: Box<Node>,
    pub above_below: bool,
}

/// 无参数的环境修改（`\bf`、`\color{red}`、`\large`），作用于其后的兄弟
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvModifier {
    Bold,
    Italic,
    Upright,
    Roman,
    Sans,
    Typewriter,
    SmallCaps,
    Script,
    Blackboard,
    Caligraphic,
    Fraktur,
    /// 取消粗体
    Medium,
    /// 回到正文字体
    NormalFont,
    Color,
    /// 相对基础字号的倍数
    Size(f32),
    /// `\fontsize{n}`，单位为 pt
    FontSize,
    DisplayStyle,
    TextStyle,
    ScriptStyle,
    ScriptScriptStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifyEnvironmentNode {
    pub modifier: EnvModifier,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxStyle {
    Fbox,
    Boxed,
    Framed,
    DoubleBox,
    OvalBox,
    HeavyOvalBox,
    OvalDoubleBox,
    ColorBox,
    FColorBox,
    Shaded,
    SnugShade,
    SnugBox,
    DashBox,
    DottedBox,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxInstructionNode {
    pub style: BoxStyle,
    pub params: Vec<String>,
    pub child: Box<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhantomMode {
    Both,
    /// 只保留高度
    Vertical,
    /// 只保留宽度
    Horizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhantomNode {
    pub mode: PhantomMode,
    pub child: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerbatimNode {
    pub text: String,
    pub visible_space: bool,
    pub alignment: HAlign,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Node {
        Node::Text(TextNode { text: text.into() })
    }

    pub fn symbol(name: impl Into<String>) -> Node {
        Node::Symbol(SymbolNode {
            name: name.into(),
            above_below: false,
        })
    }

    pub fn empty() -> Node {
        Node::HorizontalList(Vec::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Text(_) => NodeKind::Text,
            Node::Symbol(_) => NodeKind::Symbol,
            Node::Whitespace(_) => NodeKind::Whitespace,
            Node::HorizontalList(_) => NodeKind::HorizontalList,
            Node::VerticalList(_) => NodeKind::VerticalList,
            Node::Block(_) => NodeKind::Block,
            Node::Subscript(_) => NodeKind::Subscript,
            Node::Superscript(_) => NodeKind::Superscript,
            Node::Frac(_) => NodeKind::Frac,
            Node::Sqrt(_) => NodeKind::Sqrt,
            Node::Brace(_) => NodeKind::Brace,
            Node::Decorated(_) => NodeKind::Decorated,
            Node::Matrix(_) => NodeKind::Matrix,
            Node::Instruction(_) => NodeKind::Instruction,
            Node::ModifyEnvironment(_) => NodeKind::ModifyEnvironment,
            Node::BoxInstruction(_) => NodeKind::BoxInstruction,
            Node::Phantom(_) => NodeKind::Phantom,
            Node::Strut(_) => NodeKind::Strut,
            Node::Verbatim(_) => NodeKind::Verbatim,
        }
    }

    /// 直接子节点，矩阵按行展开
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::HorizontalList(items) => items.iter().collect(),
            Node::VerticalList(list) => list.lines.iter().collect(),
            Node::Block(child) | Node::Subscript(child) | Node::Superscript(child) => {
                vec![child.as_ref()]
            }
            Node::Frac(frac) => vec![frac.numerator.as_ref(), frac.denominator.as_ref()],
            Node::Sqrt(sqrt) => {
                let mut children = vec![sqrt.child.as_ref()];
                if let Some(degree) = &sqrt.degree {
                    children.push(degree.as_ref());
                }
                children
            }
            Node::Brace(brace) => vec![brace.child.as_ref()],
            Node::Decorated(deco) => vec![deco.child.as_ref()],
            Node::Matrix(matrix) => matrix.rows.iter().flatten().collect(),
            Node::Instruction(inst) => vec![inst.child.as_ref()],
            Node::BoxInstruction(inst) => vec![inst.child.as_ref()],
            Node::Phantom(phantom) => vec![phantom.child.as_ref()],
            Node::Text(_)
            | Node::Symbol(_)
            | Node::Whitespace(_)
            | Node::ModifyEnvironment(_)
            | Node::Strut(_)
            | Node::Verbatim(_) => Vec::new(),
        }
    }

    /// 上下标是否放在该节点的正上方/正下方
    pub fn is_above_below(&self) -> bool {
        match self {
            Node::Symbol(sym) => sym.above_below,
            Node::Instruction(inst) => inst.above_below,
            _ => false,
        }
    }

    /// `\limits`/`\nolimits` 修改前一个节点
    pub fn set_above_below(&mut self, value: bool) -> bool {
        match self {
            Node::Symbol(sym) => {
                sym.above_below = value;
                true
            }
            Node::Instruction(inst) => {
                inst.above_below = value;
                true
            }
            _ => false,
        }
    }

    /// 只有一个元素的水平列表退化为该元素
    pub fn simplify(self) -> Node {
        match self {
            Node::HorizontalList(mut items) if items.len() == 1 => items.remove(0).simplify(),
            other => other,
        }
    }

    /// 树的最大深度，叶子为 1；用显式栈遍历，不受递归深度影响
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children().into_iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// 节点树的结构摘要：先序遍历得到的 (类别, 子节点数) 序列
    pub fn structure(&self) -> Vec<(NodeKind, usize)> {
        let mut out = Vec::new();
        self.collect_structure(&mut out);
        out
    }

    fn collect_structure(&self, out: &mut Vec<(NodeKind, usize)>) {
        let children = self.children();
        out.push((self.kind(), children.len()));
        for child in children {
            child.collect_structure(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_counts_the_longest_branch() {
        assert_eq!(Node::text("a").depth(), 1);
        let mut node = Node::text("a");
        for _ in 0..2_000 {
            node = Node::Block(Box::new(node));
        }
        assert_eq!(node.depth(), 2_001);
        let list = Node::HorizontalList(vec![Node::text("a"), Node::Block(Box::new(Node::text("b")))]);
        assert_eq!(list.depth(), 3);
        // 深树的析构是递归的，这里逐层拆开
        while let Node::Block(inner) = node {
            node = *inner;
        }
    }

    #[test]
    fn simplify_unwraps_single_item_lists() {
        let nested = Node::HorizontalList(vec![Node::HorizontalList(vec![Node::text("a")])]);
        assert_eq!(nested.simplify(), Node::text("a"));
        let pair = Node::HorizontalList(vec![Node::text("a"), Node::text("b")]);
        assert_eq!(pair.clone().simplify(), pair);
    }

    #[test]
    fn structure_lists_children_in_preorder() {
        let frac = Node::Frac(FracNode {
            mode: FracMode::Plain,
            numerator: Box::new(Node::text("a")),
            denominator: Box::new(Node::symbol("alpha")),
        });
        assert_eq!(
            frac.structure(),
            vec![
                (NodeKind::Frac, 2),
                (NodeKind::Text, 0),
                (NodeKind::Symbol, 0)
            ]
        );
    }

    #[test]
    fn limits_only_apply_to_operators() {
        let mut sym = Node::symbol("sum");
        assert!(sym.set_above_below(true));
        assert!(sym.is_above_below());
        let mut text = Node::text("x");
        assert!(!text.set_above_below(true));
        assert!(!text.is_above_below());
    }

    #[test]
    fn hidden_brace_sides() {
        let brace = BraceNode {
            open: BraceType::Parenthesis,
            close: BraceType::None,
            child: Box::new(Node::empty()),
        };
        assert!(brace.show_opening_brace());
        assert!(!brace.show_closing_brace());
    }
}
