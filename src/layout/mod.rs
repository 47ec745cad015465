//! 排版模块：对语法树做两遍处理，先测量盒子尺寸，再按相同的几何绘制
//!
//! 每类节点一个文件，入口都是 `LayoutContext::measure` 与 `LayoutContext::draw`。
//! 坐标 y 向下，`draw` 的 y 为基线位置，返回值为节点右侧的 x。

mod brace;
mod decoration;
mod frac;
mod hlist;
mod matrix;
mod script;
mod sqrt;
mod styled;
mod symbol;
mod text;
mod vlist;

use crate::ast::Node;
use crate::config::LayoutConfig;
use crate::environment::{Color, Environment};
use crate::metrics::{BoxMetrics, FontMetricsProvider, Rect};
use crate::surface::{DrawingSurface, LineStyle, Pen};

pub(crate) use styled::{apply_modifier, apply_property};
pub(crate) use text::apply_transform;

/// 调试框的颜色
const DEBUG_BOX_COLOR: Color = Color::rgb(0, 160, 255);
const DEBUG_BASELINE_COLOR: Color = Color::rgb(255, 0, 160);

/// 一次排版所需的只读上下文
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    metrics: &'a dyn FontMetricsProvider,
    config: &'a LayoutConfig,
    /// `\large`、`\scriptstyle` 等以它为基准
    base_size: f32,
    debug_boxes: bool,
}

impl<'a> LayoutContext<'a> {
    pub fn new(metrics: &'a dyn FontMetricsProvider, config: &'a LayoutConfig) -> Self {
        Self {
            metrics,
            config,
            base_size: Environment::default().size,
            debug_boxes: false,
        }
    }

    pub fn with_base_size(mut self, size: f32) -> Self {
        self.base_size = size;
        self
    }

    /// 打开后每个节点都会画出自己的测量框与基线
    pub fn with_debug_boxes(mut self, enabled: bool) -> Self {
        self.debug_boxes = enabled;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        self.config
    }

    pub fn metrics(&self) -> &dyn FontMetricsProvider {
        self.metrics
    }

    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    /// 测量节点，不修改任何状态
    pub fn measure(&self, node: &Node, env: &Environment) -> BoxMetrics {
        let metrics = match node {
            Node::Text(text) => text::measure_text(self, &text.text, env),
            Node::Symbol(sym) => symbol::measure_symbol(self, sym, env).metrics,
            Node::Whitespace(kind) => symbol::measure_whitespace(self, *kind, env),
            Node::HorizontalList(items) => hlist::measure_list(self, items, env),
            Node::VerticalList(list) => vlist::measure_lines(self, list, env),
            Node::Block(child) => self.measure(child, env),
            Node::Subscript(child) => script::place_subscript(self, child, env, None).metrics,
            Node::Superscript(child) => script::place_superscript(self, child, env, None).metrics,
            Node::Frac(frac) => frac::measure_frac(self, frac, env),
            Node::Sqrt(sqrt) => sqrt::measure_sqrt(self, sqrt, env),
            Node::Brace(brace) => brace::measure_brace(self, brace, env).metrics,
            Node::Decorated(deco) => decoration::measure_decorated(self, deco, env),
            Node::Matrix(matrix) => matrix::measure_matrix(self, matrix, env),
            Node::Instruction(inst) => styled::measure_instruction(self, inst, env),
            Node::ModifyEnvironment(_) => BoxMetrics {
                strikeout_pos: self.strikeout(env),
                ..BoxMetrics::default()
            },
            Node::BoxInstruction(inst) => styled::measure_box(self, inst, env),
            Node::Phantom(phantom) => styled::measure_phantom(self, phantom, env),
            Node::Strut(factor) => styled::measure_strut(self, *factor, env),
            Node::Verbatim(verb) => text::measure_verbatim(self, verb, env),
        };
        metrics.clamped()
    }

    /// 在基线 (x, y) 处绘制节点，返回节点右侧的 x
    pub fn draw(
        &self,
        node: &Node,
        surface: &mut dyn DrawingSurface,
        x: f32,
        y: f32,
        env: &Environment,
    ) -> f32 {
        if self.debug_boxes {
            self.draw_debug_box(node, surface, x, y, env);
        }
        match node {
            Node::Text(text) => text::draw_text(self, &text.text, surface, x, y, env),
            Node::Symbol(sym) => symbol::draw_symbol(self, sym, surface, x, y, env),
            Node::Whitespace(kind) => x + symbol::measure_whitespace(self, *kind, env).width,
            Node::HorizontalList(items) => hlist::draw_list(self, items, surface, x, y, env),
            Node::VerticalList(list) => vlist::draw_lines(self, list, surface, x, y, env),
            Node::Block(child) => self.draw(child, surface, x, y, env),
            Node::Subscript(child) => script::draw_subscript(self, child, surface, x, y, env, None),
            Node::Superscript(child) => {
                script::draw_superscript(self, child, surface, x, y, env, None)
            }
            Node::Frac(frac) => frac::draw_frac(self, frac, surface, x, y, env),
            Node::Sqrt(sqrt) => sqrt::draw_sqrt(self, sqrt, surface, x, y, env),
            Node::Brace(brace) => brace::draw_brace(self, brace, surface, x, y, env),
            Node::Decorated(deco) => decoration::draw_decorated(self, deco, surface, x, y, env),
            Node::Matrix(matrix) => matrix::draw_matrix(self, matrix, surface, x, y, env),
            Node::Instruction(inst) => styled::draw_instruction(self, inst, surface, x, y, env),
            Node::ModifyEnvironment(_) => x,
            Node::BoxInstruction(inst) => styled::draw_box(self, inst, surface, x, y, env),
            Node::Phantom(phantom) => x + styled::measure_phantom(self, phantom, env).width,
            Node::Strut(_) => x,
            Node::Verbatim(verb) => text::draw_verbatim(self, verb, surface, x, y, env),
        }
    }

    fn draw_debug_box(
        &self,
        node: &Node,
        surface: &mut dyn DrawingSurface,
        x: f32,
        y: f32,
        env: &Environment,
    ) {
        let m = self.measure(node, env);
        let lw = self.config.min_line_width.max(0.5);
        let pen = Pen::solid(DEBUG_BOX_COLOR, lw).with_style(LineStyle::Dotted);
        surface.draw_rect(
            Rect::new(x, y - m.baseline_height, m.width, m.overall_height),
            Some(&pen),
            None,
            0.0,
        );
        let base = Pen::solid(DEBUG_BASELINE_COLOR, lw);
        surface.draw_line(x, y, x + m.width, y, &base);
    }

    // 以下为各节点共用的字体查询

    pub(crate) fn ascent(&self, env: &Environment) -> f32 {
        self.metrics.ascent(&env.font_spec())
    }

    pub(crate) fn descent(&self, env: &Environment) -> f32 {
        self.metrics.descent(&env.font_spec())
    }

    pub(crate) fn x_height(&self, env: &Environment) -> f32 {
        self.metrics.x_height(&env.font_spec())
    }

    pub(crate) fn strikeout(&self, env: &Environment) -> f32 {
        self.metrics.strikeout_pos(&env.font_spec())
    }

    pub(crate) fn line_spacing(&self, env: &Environment) -> f32 {
        self.metrics.line_spacing(&env.font_spec())
    }

    /// 线宽，不小于配置的下限
    pub(crate) fn line_width(&self, env: &Environment) -> f32 {
        self.metrics
            .line_width(&env.font_spec())
            .max(self.config.min_line_width)
    }

    pub(crate) fn advance(&self, env: &Environment, text: &str) -> f32 {
        self.metrics.glyph_width(&env.font_spec(), text)
    }

    pub(crate) fn tight(&self, env: &Environment, text: &str) -> Rect {
        self.metrics.tight_bounding_box(&env.font_spec(), text)
    }

    pub(crate) fn pen(&self, env: &Environment) -> Pen {
        Pen::solid(env.color, self.line_width(env))
    }
}

/// 把子盒子的上升/下降并入 `acc`，返回是否改变了高度
pub(crate) fn merge_vertical(acc: &mut BoxMetrics, child: &BoxMetrics) -> bool {
    let mut grown = false;
    if child.baseline_height > acc.baseline_height {
        acc.overall_height += child.baseline_height - acc.baseline_height;
        acc.baseline_height = child.baseline_height;
        grown = true;
    }
    if child.descent() > acc.descent() {
        acc.overall_height = acc.baseline_height + child.descent();
        grown = true;
    }
    grown
}

/// 由上升与下降构造盒子
pub(crate) fn box_from(width: f32, ascent: f32, descent: f32, strikeout: f32) -> BoxMetrics {
    BoxMetrics::new(width, ascent.max(0.0), ascent.max(0.0) + descent.max(0.0), strikeout)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    const SAMPLES: &[&str] = &[
        r"x",
        r"\frac{a}{b}",
        r"\sqrt[3]{x+1}",
        r"\left(\frac{1}{2}\right)",
        r"x_i^2",
        r"\sum_{i=0}^{n} i",
        r"\vec{v} + \hat{x} + \underline{y}",
        r"\begin{pmatrix}1&2\\3&4\end{pmatrix}",
        r"\fbox{a} \phantom{b} \textcolor{red}{c}",
        r"\underbrace{a+b}_{n}",
        r"\substack{a\\b}",
        r"\alpha\beta\gamma \longrightarrow \infty",
        r"\text{if } x \bf bold \large big",
    ];

    #[test]
    fn every_box_keeps_the_height_invariant() {
        for input in SAMPLES {
            let root = math(input);
            let m = measure(&root);
            assert_valid(&m);
            for child in root.children() {
                assert_valid(&measure(child));
            }
        }
    }

    #[test]
    fn measuring_twice_is_bit_identical() {
        for input in SAMPLES {
            let root = math(input);
            assert_eq!(measure(&root), measure(&root), "{input}");
        }
    }

    #[test]
    fn draw_returns_the_measured_width() {
        for input in [r"x+y", r"\frac{a}{b}", r"\sqrt{x}", r"\left[x\right]", r"\fbox{a}"] {
            let root = math(input);
            let (end, _) = draw(&root);
            assert!((end - measure(&root).width).abs() < 1e-3, "{input}");
        }
    }

    #[test]
    fn debug_boxes_add_outlines() {
        let cfg = config();
        let root = math("a+b");
        let mut plain = crate::surface::SvgSurface::new();
        let mut boxed = crate::surface::SvgSurface::new();
        let ctx = LayoutContext::new(&FIXED, &cfg);
        ctx.draw(&root, &mut plain, 0.0, 50.0, &Environment::default());
        ctx.with_debug_boxes(true)
            .draw(&root, &mut boxed, 0.0, 50.0, &Environment::default());
        assert!(boxed.scene().paths.len() > plain.scene().paths.len());
        assert_eq!(boxed.scene().items.len(), plain.scene().items.len());
    }

    #[test]
    fn merging_tracks_both_sides() {
        let mut acc = BoxMetrics::new(0.0, 5.0, 7.0, 2.0);
        assert!(merge_vertical(&mut acc, &BoxMetrics::new(1.0, 3.0, 10.0, 0.0)));
        assert_eq!(acc.baseline_height, 5.0);
        assert_eq!(acc.descent(), 7.0);
        assert!(!merge_vertical(&mut acc, &BoxMetrics::new(1.0, 1.0, 2.0, 0.0)));
    }
}
