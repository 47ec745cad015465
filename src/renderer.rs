//! 渲染器门面：解析、缓存语法树，并在给定表面上测量和绘制

use std::sync::Arc;

use log::debug;

use crate::ast::{HAlign, Node};
use crate::config::RendererConfig;
use crate::environment::Environment;
use crate::error::RenderError;
use crate::html::{to_html, HtmlOutput};
use crate::init::{generic_family_names, FontDefaults};
use crate::layout::LayoutContext;
use crate::metrics::{BoxMetrics, FixedMetrics, FontMetricsProvider, FontdueMetrics, Rect};
use crate::parse::{parse, ParseOptions, ParsedDocument};
use crate::render::{render_svg_document, SvgDocument};
use crate::surface::{DrawingSurface, SvgSurface};

/// SVG 画布四周的留白，给斜体字形的外伸部分留出空间
const SVG_MARGIN: f32 = 2.0;

/// 竖直对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
    /// 基线落在矩形的下边
    Baseline,
}

/// `draw_aligned` 使用的对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

impl Default for Alignment {
    fn default() -> Self {
        Self {
            horizontal: HAlign::Left,
            vertical: VAlign::Top,
        }
    }
}

/// 一段标记文本的渲染器
///
/// 最近一次解析的输入与语法树会被缓存，对同一输入重复调用 `parse` 不会重新解析。
pub struct Renderer {
    defaults: Option<Arc<FontDefaults>>,
    metrics: Box<dyn FontMetricsProvider>,
    config: RendererConfig,
    source: Option<String>,
    document: ParsedDocument,
}

impl Renderer {
    /// 使用已发现的系统字体
    pub fn with_defaults(defaults: Arc<FontDefaults>, config: RendererConfig) -> Self {
        let metrics = Box::new(FontdueMetrics::new(Arc::clone(&defaults)));
        Self::build(Some(defaults), metrics, config)
    }

    /// 使用任意度量提供者，SVG 中写入通用字体族
    pub fn with_metrics(metrics: Box<dyn FontMetricsProvider>, config: RendererConfig) -> Self {
        Self::build(None, metrics, config)
    }

    /// 进程级字体默认值；系统里没有任何字体时退回到近似度量
    pub fn new(config: RendererConfig) -> Self {
        match FontDefaults::global() {
            Ok(defaults) if defaults.has_faces() => Self::with_defaults(defaults, config),
            Ok(_) => {
                log::warn!("没有找到系统字体，使用近似度量");
                Self::with_metrics(Box::new(FixedMetrics), config)
            }
            Err(err) => {
                log::warn!("字体初始化失败（{err}），使用近似度量");
                Self::with_metrics(Box::new(FixedMetrics), config)
            }
        }
    }

    fn build(
        defaults: Option<Arc<FontDefaults>>,
        metrics: Box<dyn FontMetricsProvider>,
        config: RendererConfig,
    ) -> Self {
        Self {
            defaults,
            metrics,
            config,
            source: None,
            document: ParsedDocument {
                root: Node::empty(),
                errors: Vec::new(),
            },
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// 解析输入，返回是否没有错误；输入与上一次相同时直接复用语法树
    pub fn parse(&mut self, text: &str) -> bool {
        if self.source.as_deref() == Some(text) {
            debug!("输入未变化，复用已解析的语法树");
            return self.document.is_ok();
        }
        self.document = parse(
            text,
            ParseOptions {
                math_mode: self.config.start_in_math_mode,
                allow_linebreaks: self.config.allow_linebreaks,
            },
        );
        self.source = Some(text.to_string());
        self.document.is_ok()
    }

    pub fn root(&self) -> &Node {
        &self.document.root
    }

    /// 最近一次解析的诊断信息
    pub fn errors(&self) -> Vec<String> {
        self.document.errors.iter().map(ToString::to_string).collect()
    }

    /// 渲染器配置对应的初始环境
    pub fn environment(&self) -> Environment {
        Environment::new(self.config.font_size, self.config.color)
    }

    fn context(&self, debug_boxes: bool) -> LayoutContext<'_> {
        LayoutContext::new(self.metrics.as_ref(), &self.config.layout)
            .with_base_size(self.config.font_size)
            .with_debug_boxes(debug_boxes)
    }

    pub fn measure(&self, env: &Environment) -> BoxMetrics {
        self.context(false).measure(&self.document.root, env)
    }

    /// 以 (x, y) 为基线起点绘制，返回右侧 x
    pub fn draw(
        &self,
        surface: &mut dyn DrawingSurface,
        x: f32,
        y: f32,
        env: &Environment,
        debug_boxes: bool,
    ) -> f32 {
        self.context(debug_boxes)
            .draw(&self.document.root, surface, x, y, env)
    }

    /// 在矩形内按对齐方式绘制
    pub fn draw_aligned(
        &self,
        surface: &mut dyn DrawingSurface,
        rect: Rect,
        alignment: Alignment,
        env: &Environment,
    ) -> f32 {
        let size = self.measure(env);
        let x = match alignment.horizontal {
            HAlign::Left => rect.x,
            HAlign::Center => rect.x + (rect.width - size.width) / 2.0,
            HAlign::Right => rect.right() - size.width,
        };
        let y = match alignment.vertical {
            VAlign::Top => rect.y + size.baseline_height,
            VAlign::Center => {
                rect.y + (rect.height - size.overall_height) / 2.0 + size.baseline_height
            }
            VAlign::Bottom => rect.bottom() - size.descent(),
            VAlign::Baseline => rect.bottom(),
        };
        self.draw(surface, x, y, env, false)
    }

    /// 完整的 SVG 文档
    pub fn to_svg(&self) -> Result<String, RenderError> {
        let env = self.environment();
        let size = self.measure(&env);
        let mut surface = SvgSurface::new();
        self.draw(
            &mut surface,
            SVG_MARGIN,
            SVG_MARGIN + size.baseline_height,
            &env,
            false,
        );
        let families = match &self.defaults {
            Some(defaults) => defaults.family_names(),
            None => generic_family_names(),
        };
        let fonts = self
            .defaults
            .as_deref()
            .filter(|defaults| defaults.has_faces())
            .map(FontDefaults::database);
        render_svg_document(
            &SvgDocument {
                scene: surface.scene(),
                width: size.width + 2.0 * SVG_MARGIN,
                height: size.overall_height + 2.0 * SVG_MARGIN,
                families: &families,
            },
            fonts,
        )
    }

    /// 尽力而为的 HTML 导出
    pub fn to_html(&self) -> HtmlOutput {
        to_html(&self.context(false), &self.document.root, &self.environment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(config: RendererConfig) -> Renderer {
        Renderer::with_metrics(Box::new(FixedMetrics), config)
    }

    #[test]
    fn parse_collects_errors_without_failing() {
        let mut renderer = fixed(RendererConfig::default());
        assert!(renderer.parse(r"$\frac{a}{b}$"));
        assert!(renderer.errors().is_empty());
        assert!(!renderer.parse(r"$\frac{a}$"));
        assert!(!renderer.errors().is_empty());
        // 出错的树仍然可以测量
        let size = renderer.measure(&renderer.environment());
        assert!(size.width > 0.0);
    }

    #[test]
    fn unchanged_input_keeps_the_tree() {
        let mut renderer = fixed(RendererConfig::default());
        assert!(!renderer.parse(r"\frac{a}"));
        let before = renderer.root().clone();
        let errors = renderer.errors();
        assert!(!renderer.parse(r"\frac{a}"));
        assert_eq!(renderer.root(), &before);
        assert_eq!(renderer.errors(), errors);
        assert!(renderer.parse("$x^3$"));
        assert_ne!(renderer.root(), &before);
        assert!(renderer.errors().is_empty());
    }

    #[test]
    fn math_mode_start_and_base_size() {
        let config = RendererConfig {
            start_in_math_mode: true,
            font_size: 14.0,
            ..RendererConfig::default()
        };
        let mut small = fixed(config);
        small.parse(r"\alpha");
        let mut large = fixed(RendererConfig {
            start_in_math_mode: true,
            ..RendererConfig::default()
        });
        large.parse(r"\alpha");
        let a = small.measure(&small.environment());
        let b = large.measure(&large.environment());
        assert!((b.width - 2.0 * a.width).abs() < 1e-3);
    }

    #[test]
    fn aligned_drawing_positions_the_box() {
        let mut renderer = fixed(RendererConfig::default());
        renderer.parse("x");
        let env = renderer.environment();
        let size = renderer.measure(&env);
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);

        let mut surface = SvgSurface::new();
        let end = renderer.draw_aligned(
            &mut surface,
            rect,
            Alignment {
                horizontal: HAlign::Right,
                vertical: VAlign::Bottom,
            },
            &env,
        );
        assert!((end - 200.0).abs() < 1e-3);
        let item = &surface.scene().items[0];
        assert!((item.y - (100.0 - size.descent())).abs() < 1e-3);

        let mut centered = SvgSurface::new();
        renderer.draw_aligned(
            &mut centered,
            rect,
            Alignment {
                horizontal: HAlign::Center,
                vertical: VAlign::Center,
            },
            &env,
        );
        let item = &centered.scene().items[0];
        assert!((item.x - (200.0 - size.width) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn debug_boxes_draw_outlines() {
        let mut renderer = fixed(RendererConfig::default());
        renderer.parse("ab");
        let env = renderer.environment();
        let mut plain = SvgSurface::new();
        renderer.draw(&mut plain, 0.0, 50.0, &env, false);
        let mut boxed = SvgSurface::new();
        renderer.draw(&mut boxed, 0.0, 50.0, &env, true);
        assert!(plain.scene().paths.is_empty());
        assert!(!boxed.scene().paths.is_empty());
    }

    #[test]
    fn svg_and_html_exports() {
        let mut renderer = fixed(RendererConfig::default());
        renderer.parse(r"$\alpha + \sqrt{x}$");
        let svg = renderer.to_svg().expect("SVG 输出失败");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains('α'));
        assert!(svg.contains("serif"));
        let html = renderer.to_html();
        assert!(html.ok);
        assert!(html.html.contains("&radic;"));
    }
}
