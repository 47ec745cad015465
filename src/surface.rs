//! 绘图表面：排版节点只通过 `DrawingSurface` 输出图元
//!
//! `SvgSurface` 把图元记录成 `SvgScene`，再由 `render` 模块写成 SVG。

use std::fmt::Write;

use crate::environment::{Color, FontRole};
use crate::metrics::{FontSpec, Rect};

/// 线型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

/// 画笔
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Color,
    pub width: f32,
    pub style: LineStyle,
}

impl Pen {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            style: LineStyle::Solid,
        }
    }

    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    CubicTo(f32, f32, f32, f32, f32, f32),
    Close,
}

/// 由直线段与三次贝塞尔曲线组成的路径
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依次连接各点的折线
    pub fn polyline(points: &[(f32, f32)]) -> Self {
        let mut path = Path::new();
        for (idx, &(x, y)) in points.iter().enumerate() {
            if idx == 0 {
                path.move_to(x, y);
            } else {
                path.line_to(x, y);
            }
        }
        path
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(x, y));
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.commands.push(PathCommand::LineTo(x, y));
        self
    }

    pub fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) -> &mut Self {
        self.commands
            .push(PathCommand::CubicTo(c1x, c1y, c2x, c2y, x, y));
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// 以 (cx, cy) 为中心旋转 90°，水平花括号据此变成竖直花括号
    pub fn rotated_90(&self, cx: f32, cy: f32) -> Path {
        let rot = |x: f32, y: f32| (cx - (y - cy), cy + (x - cx));
        let commands = self
            .commands
            .iter()
            .map(|cmd| match *cmd {
                PathCommand::MoveTo(x, y) => {
                    let (x, y) = rot(x, y);
                    PathCommand::MoveTo(x, y)
                }
                PathCommand::LineTo(x, y) => {
                    let (x, y) = rot(x, y);
                    PathCommand::LineTo(x, y)
                }
                PathCommand::CubicTo(a, b, c, d, e, f) => {
                    let (a, b) = rot(a, b);
                    let (c, d) = rot(c, d);
                    let (e, f) = rot(e, f);
                    PathCommand::CubicTo(a, b, c, d, e, f)
                }
                PathCommand::Close => PathCommand::Close,
            })
            .collect();
        Path { commands }
    }

    /// 转成 SVG `d` 属性
    pub fn to_svg_data(&self) -> String {
        let mut d = String::with_capacity(self.commands.len() * 24);
        for cmd in &self.commands {
            let _ = match *cmd {
                PathCommand::MoveTo(x, y) => write!(d, "M{x:.2} {y:.2}"),
                PathCommand::LineTo(x, y) => write!(d, "L{x:.2} {y:.2}"),
                PathCommand::CubicTo(a, b, c, e, f, g) => {
                    write!(d, "C{a:.2} {b:.2} {c:.2} {e:.2} {f:.2} {g:.2}")
                }
                PathCommand::Close => write!(d, "Z"),
            };
        }
        d
    }
}

/// 抽象绘图表面
pub trait DrawingSurface {
    /// 在基线点 (x, y) 处绘制文本
    fn draw_text(&mut self, x: f32, y: f32, text: &str, font: &FontSpec, color: Color);
    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, pen: &Pen);
    fn draw_path(&mut self, path: &Path, pen: Option<&Pen>, fill: Option<Color>);
    /// `rounding` 为圆角半径
    fn draw_rect(&mut self, rect: Rect, pen: Option<&Pen>, fill: Option<Color>, rounding: f32);
    fn draw_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, pen: Option<&Pen>, fill: Option<Color>);
}

/// SVG 绘制所需的文字片段
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub role: FontRole,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
}

/// SVG 中需要绘制的直线（分数横线、根号顶线等）
#[derive(Debug, Clone)]
pub struct RenderLine {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub pen: Pen,
}

/// SVG 中需要绘制的路径、矩形或椭圆
#[derive(Debug, Clone)]
pub struct RenderPath {
    pub d: String,
    pub fill: Option<Color>,
    pub pen: Option<Pen>,
}

/// 一次绘制得到的全部图元
#[derive(Debug, Clone, Default)]
pub struct SvgScene {
    pub items: Vec<RenderItem>,
    pub lines: Vec<RenderLine>,
    pub paths: Vec<RenderPath>,
}

impl SvgScene {
    pub fn len(&self) -> usize {
        self.items.len() + self.lines.len() + self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 把绘制调用记录下来的表面
#[derive(Debug, Default)]
pub struct SvgSurface {
    scene: SvgScene,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &SvgScene {
        &self.scene
    }

    pub fn into_scene(self) -> SvgScene {
        self.scene
    }
}

impl DrawingSurface for SvgSurface {
    fn draw_text(&mut self, x: f32, y: f32, text: &str, font: &FontSpec, color: Color) {
        if text.is_empty() {
            return;
        }
        self.scene.items.push(RenderItem {
            text: text.to_string(),
            x,
            y,
            font_size: font.size,
            role: font.role,
            bold: font.bold,
            italic: font.italic,
            color,
        });
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, pen: &Pen) {
        if (x1 - x2).abs() < f32::EPSILON && (y1 - y2).abs() < f32::EPSILON {
            return;
        }
        self.scene.lines.push(RenderLine {
            x1,
            y1,
            x2,
            y2,
            pen: *pen,
        });
    }

    fn draw_path(&mut self, path: &Path, pen: Option<&Pen>, fill: Option<Color>) {
        if path.is_empty() {
            return;
        }
        self.scene.paths.push(RenderPath {
            d: path.to_svg_data(),
            fill,
            pen: pen.copied(),
        });
    }

    fn draw_rect(&mut self, rect: Rect, pen: Option<&Pen>, fill: Option<Color>, rounding: f32) {
        let r = rounding.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
        let mut path = Path::new();
        if r <= 0.0 {
            path.move_to(rect.x, rect.y)
                .line_to(rect.right(), rect.y)
                .line_to(rect.right(), rect.bottom())
                .line_to(rect.x, rect.bottom())
                .close();
        } else {
            // 四分之一圆弧的贝塞尔近似
            let k = r * 0.552_284_8;
            let (x0, y0, x1, y1) = (rect.x, rect.y, rect.right(), rect.bottom());
            path.move_to(x0 + r, y0)
                .line_to(x1 - r, y0)
                .cubic_to(x1 - r + k, y0, x1, y0 + r - k, x1, y0 + r)
                .line_to(x1, y1 - r)
                .cubic_to(x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1)
                .line_to(x0 + r, y1)
                .cubic_to(x0 + r - k, y1, x0, y1 - r + k, x0, y1 - r)
                .line_to(x0, y0 + r)
                .cubic_to(x0, y0 + r - k, x0 + r - k, y0, x0 + r, y0)
                .close();
        }
        self.draw_path(&path, pen, fill);
    }

    fn draw_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, pen: Option<&Pen>, fill: Option<Color>) {
        let kx = rx * 0.552_284_8;
        let ky = ry * 0.552_284_8;
        let mut path = Path::new();
        path.move_to(cx + rx, cy)
            .cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry)
            .cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy)
            .cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry)
            .cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy)
            .close();
        self.draw_path(&path, pen, fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyline_starts_with_move() {
        let path = Path::polyline(&[(0.0, 0.0), (1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(path.commands()[0], PathCommand::MoveTo(0.0, 0.0));
        assert_eq!(path.to_svg_data(), "M0.00 0.00L1.00 2.00L3.00 4.00");
    }

    #[test]
    fn rotation_maps_horizontal_to_vertical() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0).line_to(10.0, 0.0);
        let rotated = path.rotated_90(5.0, 0.0);
        assert_eq!(rotated.commands()[0], PathCommand::MoveTo(5.0, -5.0));
        assert_eq!(rotated.commands()[1], PathCommand::LineTo(5.0, 5.0));
    }

    #[test]
    fn degenerate_lines_are_skipped() {
        let mut surface = SvgSurface::new();
        let pen = Pen::solid(Color::BLACK, 1.0);
        surface.draw_line(1.0, 1.0, 1.0, 1.0, &pen);
        surface.draw_line(0.0, 0.0, 1.0, 1.0, &pen);
        assert_eq!(surface.scene().lines.len(), 1);
    }

    #[test]
    fn rounded_rect_uses_curves() {
        let mut surface = SvgSurface::new();
        surface.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), None, Some(Color::WHITE), 2.0);
        assert!(surface.scene().paths[0].d.contains('C'));
    }
}
