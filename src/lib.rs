//! 数学排版引擎：把 LaTeX 风格的标记文本解析成语法树，测量后绘制到任意表面
//!
//! 常用入口是 [`Renderer`]；只需要 SVG 时可以直接调用 [`render_svg`]。

#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

use std::panic::{catch_unwind, AssertUnwindSafe}; // 防止单次渲染的 panic 拖垮进程

use rayon::prelude::*; // 批量渲染使用并行迭代器

mod ast; // 语法树定义
mod config; // 排版系数与输出模式
mod environment; // 字体角色、颜色与排版环境
mod error; // 致命错误与解析诊断
mod ffi; // C 可调用的接口
mod html; // HTML 导出
mod init; // 一次性发现系统字体
mod layout; // 测量与绘制
mod metrics; // 字体度量
mod parse; // 词法与语法分析
mod render; // SVG 文档输出
mod renderer; // 渲染器门面
mod surface; // 绘制表面

pub use crate::ast::{
    BraceType, DecorationType, FracMode, HAlign, LineSpacing, MatrixNode, Node, NodeKind,
    VerticalOrientation,
};
pub use crate::config::{override_svg_text_mode, svg_text_mode, LayoutConfig, RendererConfig, SvgTextMode};
pub use crate::environment::{Color, Environment, FontEncoding, FontRole, TextTransform};
pub use crate::error::{ParseError, RenderError};
pub use crate::ffi::{mathtext_free, mathtext_render_svg};
pub use crate::html::HtmlOutput;
pub use crate::init::FontDefaults;
pub use crate::layout::LayoutContext;
pub use crate::metrics::{BoxMetrics, FixedMetrics, FontMetricsProvider, FontSpec, FontdueMetrics, Rect};
pub use crate::parse::{parse, ParseOptions, ParsedDocument};
pub use crate::renderer::{Alignment, Renderer, VAlign};
pub use crate::surface::{DrawingSurface, LineStyle, Path, Pen, SvgScene, SvgSurface};

/// 便捷接口接受的最大输入长度
const MAX_INPUT_BYTES: usize = 5 * 1024;
/// 便捷接口接受的最大大括号嵌套层数
const MAX_GROUP_NESTING: usize = 64;
/// 便捷接口接受的最大语法树深度
const MAX_TREE_DEPTH: usize = 256;

/// 解析前的廉价检查：长度与大括号嵌套层数
fn check_input_limits(tex: &str) -> Result<(), RenderError> {
    if tex.len() > MAX_INPUT_BYTES {
        return Err(RenderError::LimitExceeded(format!(
            "公式长度超过 {} 字节",
            MAX_INPUT_BYTES
        )));
    }
    let mut depth = 0usize;
    let mut chars = tex.chars();
    while let Some(ch) = chars.next() {
        match ch {
            // `\{`、`\}` 是字面括号
            '\\' => {
                chars.next();
            }
            '{' => {
                depth += 1;
                if depth > MAX_GROUP_NESTING {
                    return Err(RenderError::LimitExceeded(format!(
                        "大括号嵌套超过 {} 层",
                        MAX_GROUP_NESTING
                    )));
                }
            }
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// 把一段公式渲染成 SVG，输入按数学模式解析
pub fn render_svg(tex: &str) -> Result<String, RenderError> {
    render_svg_with(
        tex,
        &RendererConfig {
            start_in_math_mode: true,
            ..RendererConfig::default()
        },
    )
}

/// 使用指定配置渲染；解析错误只记录日志，尽量输出能排出的部分
pub fn render_svg_with(tex: &str, config: &RendererConfig) -> Result<String, RenderError> {
    let trimmed = tex.trim();
    if trimmed.is_empty() {
        return Err(RenderError::EmptyInput);
    }
    check_input_limits(trimmed)?;

    let guarded = catch_unwind(AssertUnwindSafe(|| {
        let mut renderer = Renderer::new(config.clone());
        if !renderer.parse(trimmed) {
            log::debug!("公式存在 {} 处解析错误", renderer.errors().len());
        }
        let depth = renderer.root().depth();
        if depth > MAX_TREE_DEPTH {
            return Err(RenderError::LimitExceeded(format!(
                "语法树深度 {depth} 超过 {MAX_TREE_DEPTH}"
            )));
        }
        renderer.to_svg()
    }));

    match guarded {
        Ok(result) => result,
        Err(_) => Err(RenderError::UnexpectedPanic),
    }
}

/// 批量渲染，各公式之间互不影响
pub fn render_svg_batch(texts: &[String]) -> Vec<Result<String, RenderError>> {
    texts.par_iter().map(|tex| render_svg(tex)).collect()
}
