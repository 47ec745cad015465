//! 渲染模块：把绘制记录写成最终的 SVG 字符串

use crate::config::{svg_text_mode, SvgTextMode}; // 引入输出模式配置
use crate::environment::{Color, FontRole};
use crate::error::RenderError; // 引入错误类型
use crate::surface::{LineStyle, Pen, SvgScene};

use resvg::Tree as ResvgTree;
use std::borrow::Cow;
use std::fmt::Write;
use usvg::fontdb::Database;
use usvg::{Options as UsvgOptions, TreeParsing, TreeTextToPath, TreeWriting, XmlOptions};

/// 生成 SVG 所需的画布信息
pub struct SvgDocument<'a> {
    pub scene: &'a SvgScene,
    pub width: f32,
    pub height: f32,
    /// 按 `FontRole::ALL` 顺序排列的字体族
    pub families: &'a [String],
}

/// 把绘制记录转换为 SVG 字符串，`Paths` 模式下需要字体数据库把文字转成轮廓
pub fn render_svg_document(
    doc: &SvgDocument<'_>,
    fonts: Option<&Database>,
) -> Result<String, RenderError> {
    let base_svg = build_base_svg(doc);

    let Some(font_db) = fonts else {
        return Ok(base_svg);
    };
    if matches!(svg_text_mode(), SvgTextMode::Text) {
        // 默认返回文本版 SVG，避免体积膨胀
        return Ok(base_svg);
    }

    let mut opts = UsvgOptions::default();
    opts.font_family = family_of(doc.families, FontRole::Roman).to_string();

    let mut tree = usvg::Tree::from_str(&base_svg, &opts)
        .map_err(|err| RenderError::RenderFailure(format!("usvg 解析失败: {err}")))?;
    tree.convert_text(font_db);

    let render_tree = ResvgTree::from_usvg(&tree);
    tree.size = render_tree.size;
    tree.view_box = render_tree.view_box;

    Ok(tree.to_string(&XmlOptions::default()))
}

fn family_of(families: &[String], role: FontRole) -> &str {
    families
        .get(role.index())
        .map(String::as_str)
        .unwrap_or("serif")
}

fn build_base_svg(doc: &SvgDocument<'_>) -> String {
    let safe_width = doc.width.max(1.0);
    let safe_height = doc.height.max(1.0);
    let plan = doc.scene;
    let estimated = plan.len() * 96 + 256;
    let mut svg = String::with_capacity(estimated);
    let _ = write!(
        &mut svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.2}" height="{height:.2}" viewBox="0 0 {width:.2} {height:.2}" preserveAspectRatio="xMinYMin meet">"#,
        width = safe_width,
        height = safe_height
    );

    if !plan.lines.is_empty() {
        svg.push_str("<g fill=\"none\" stroke-linecap=\"round\">");
        for line in &plan.lines {
            let _ = write!(
                &mut svg,
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}""#,
                line.x1, line.y1, line.x2, line.y2
            );
            write_pen(&mut svg, &line.pen);
            svg.push_str("/>");
        }
        svg.push_str("</g>");
    }

    if !plan.paths.is_empty() {
        svg.push_str("<g>");
        for path in &plan.paths {
            let _ = write!(&mut svg, r#"<path d="{}""#, path.d);
            match path.fill {
                Some(color) => write_color(&mut svg, "fill", color),
                None => svg.push_str(r#" fill="none""#),
            }
            match &path.pen {
                Some(pen) => {
                    write_pen(&mut svg, pen);
                    svg.push_str(r#" stroke-linejoin="round""#);
                }
                None => svg.push_str(r#" stroke="none""#),
            }
            svg.push_str("/>");
        }
        svg.push_str("</g>");
    }

    if !plan.items.is_empty() {
        svg.push_str("<g>");
        for item in &plan.items {
            let escaped = escape_text(&item.text);
            let _ = write!(
                &mut svg,
                r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.2}""#,
                item.x,
                item.y,
                escape_text(family_of(doc.families, item.role)),
                item.font_size
            );
            if item.bold {
                svg.push_str(r#" font-weight="bold""#);
            }
            if item.italic {
                svg.push_str(r#" font-style="italic""#);
            }
            write_color(&mut svg, "fill", item.color);
            let _ = write!(&mut svg, r#" xml:space="preserve">{}</text>"#, escaped);
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

fn write_color(svg: &mut String, attr: &str, color: Color) {
    let _ = write!(svg, r#" {attr}="{}""#, color.to_hex());
    if color.a < 255 {
        let _ = write!(svg, r#" {attr}-opacity="{:.3}""#, color.opacity());
    }
}

fn write_pen(svg: &mut String, pen: &Pen) {
    write_color(svg, "stroke", pen.color);
    let _ = write!(svg, r#" stroke-width="{:.2}""#, pen.width);
    match pen.style {
        LineStyle::Solid => {}
        LineStyle::Dashed => {
            let _ = write!(svg, r#" stroke-dasharray="{:.2} {:.2}""#, pen.width * 4.0, pen.width * 2.0);
        }
        LineStyle::Dotted => {
            let _ = write!(svg, r#" stroke-dasharray="{:.2} {:.2}""#, pen.width, pen.width * 2.0);
        }
    }
}

/// 替换文本中的 XML 关键字符，避免产生非法 SVG
pub(crate) fn escape_text(input: &str) -> Cow<'_, str> {
    if !input
        .bytes()
        .any(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\''))
    {
        return Cow::Borrowed(input);
    }

    let mut escaped = String::with_capacity(input.len() + 16);
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::generic_family_names;
    use crate::metrics::{FontSpec, Rect};
    use crate::surface::{DrawingSurface, SvgSurface};

    #[test]
    fn escaping_only_allocates_when_needed() {
        assert!(matches!(escape_text("abc"), Cow::Borrowed(_)));
        assert_eq!(escape_text("a<b&c"), "a&lt;b&amp;c");
    }

    #[test]
    fn scene_is_written_as_svg_elements() {
        let mut surface = SvgSurface::new();
        let font = FontSpec {
            role: FontRole::Typewriter,
            size: 12.0,
            bold: true,
            italic: false,
        };
        surface.draw_text(1.0, 10.0, "x<y", &font, Color::rgb(255, 0, 0));
        surface.draw_line(0.0, 0.0, 5.0, 0.0, &Pen::solid(Color::BLACK, 1.0).with_style(LineStyle::Dashed));
        surface.draw_rect(Rect::new(0.0, 0.0, 4.0, 4.0), None, Some(Color::WHITE), 0.0);
        let families = generic_family_names();
        let svg = build_base_svg(&SvgDocument {
            scene: surface.scene(),
            width: 20.0,
            height: 12.0,
            families: &families,
        });
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"font-family="monospace""#));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains("x&lt;y"));
        assert!(svg.contains("#ff0000"));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("<path"));
        assert!(svg.ends_with("</svg>"));
    }
}
