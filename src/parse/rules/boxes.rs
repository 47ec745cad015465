//! 方框指令：`\fbox`、`\colorbox{c}`、`\ovalbox` 等

use phf::phf_map;

use crate::ast::BoxStyle;
use crate::surface::LineStyle;

/// 指令名 → (样式, 参数个数)
static BOXES: phf::Map<&'static str, (BoxStyle, usize)> = phf_map! {
    "fbox" => (BoxStyle::Fbox, 0),
    "framebox" => (BoxStyle::Fbox, 0),
    "boxed" => (BoxStyle::Boxed, 0),
    "framed" => (BoxStyle::Framed, 0),
    "doublebox" => (BoxStyle::DoubleBox, 0),
    "ovalbox" => (BoxStyle::OvalBox, 0),
    "Ovalbox" => (BoxStyle::HeavyOvalBox, 0),
    "ovaldoublebox" => (BoxStyle::OvalDoubleBox, 0),
    "colorbox" => (BoxStyle::ColorBox, 1),
    "fcolorbox" => (BoxStyle::FColorBox, 2),
    "shaded" => (BoxStyle::Shaded, 1),
    "snugshade" => (BoxStyle::SnugShade, 1),
    "snugbox" => (BoxStyle::SnugBox, 0),
    "dashbox" => (BoxStyle::DashBox, 0),
    "dashedbox" => (BoxStyle::DashBox, 0),
    "dbox" => (BoxStyle::DashBox, 0),
    "dottedbox" => (BoxStyle::DottedBox, 0),
    "dotbox" => (BoxStyle::DottedBox, 0),
};

pub fn lookup(name: &str) -> Option<(BoxStyle, usize)> {
    BOXES.get(name).copied()
}

/// 边框画笔：线宽相对字体线宽的倍数，颜色可取自参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePen {
    pub width_factor: f32,
    pub style: LineStyle,
    pub color_param: Option<usize>,
}

impl FramePen {
    const fn solid() -> Self {
        Self {
            width_factor: 1.0,
            style: LineStyle::Solid,
            color_param: None,
        }
    }
}

/// 方框的外观
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxFrame {
    pub pen: Option<FramePen>,
    /// 填充色所在的参数下标
    pub fill_param: Option<usize>,
    /// 内边距，相对 "x" 的宽度
    pub padding: f32,
    /// 圆角半径，相对 "x" 的宽度
    pub rounding: f32,
    pub double_line: bool,
}

const DEFAULT_PADDING: f32 = 0.5;

impl BoxStyle {
    pub fn frame(self) -> BoxFrame {
        let plain = BoxFrame {
            pen: Some(FramePen::solid()),
            fill_param: None,
            padding: DEFAULT_PADDING,
            rounding: 0.0,
            double_line: false,
        };
        match self {
            BoxStyle::Fbox | BoxStyle::Boxed | BoxStyle::Framed => plain,
            BoxStyle::DoubleBox => BoxFrame {
                double_line: true,
                ..plain
            },
            BoxStyle::OvalBox => BoxFrame {
                rounding: 0.7,
                ..plain
            },
            BoxStyle::HeavyOvalBox => BoxFrame {
                pen: Some(FramePen {
                    width_factor: 1.5,
                    ..FramePen::solid()
                }),
                rounding: 0.8,
                ..plain
            },
            BoxStyle::OvalDoubleBox => BoxFrame {
                rounding: 0.7,
                double_line: true,
                ..plain
            },
            BoxStyle::ColorBox => BoxFrame {
                pen: Some(FramePen {
                    color_param: Some(0),
                    ..FramePen::solid()
                }),
                ..plain
            },
            BoxStyle::FColorBox => BoxFrame {
                pen: Some(FramePen {
                    color_param: Some(0),
                    ..FramePen::solid()
                }),
                fill_param: Some(1),
                ..plain
            },
            BoxStyle::Shaded => BoxFrame {
                pen: None,
                fill_param: Some(0),
                ..plain
            },
            BoxStyle::SnugShade => BoxFrame {
                pen: None,
                fill_param: Some(0),
                padding: 0.0,
                ..plain
            },
            BoxStyle::SnugBox => BoxFrame {
                padding: 0.0,
                ..plain
            },
            BoxStyle::DashBox => BoxFrame {
                pen: Some(FramePen {
                    style: LineStyle::Dashed,
                    ..FramePen::solid()
                }),
                ..plain
            },
            BoxStyle::DottedBox => BoxFrame {
                pen: Some(FramePen {
                    style: LineStyle::Dotted,
                    ..FramePen::solid()
                }),
                ..plain
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_share_a_style() {
        assert_eq!(lookup("framebox"), lookup("fbox"));
        assert_eq!(lookup("fcolorbox"), Some((BoxStyle::FColorBox, 2)));
        assert!(lookup("frac").is_none());
    }

    #[test]
    fn shaded_boxes_have_no_frame() {
        let frame = BoxStyle::SnugShade.frame();
        assert!(frame.pen.is_none());
        assert_eq!(frame.fill_param, Some(0));
        assert_eq!(frame.padding, 0.0);
        assert!(BoxStyle::OvalDoubleBox.frame().double_line);
    }
}
