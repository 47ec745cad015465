//! 排版环境：沿语法树向下传递的字体、字号、颜色等上下文
//!
//! `Environment` 是值类型，子节点复制一份再按需修改，不存在共享的可变状态。

use phf::phf_map;

use crate::metrics::FontSpec;

/// 逻辑字体角色，真正的字体族由 `FontDefaults` 解析
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Roman,
    Sans,
    /// 数学模式下替代 Roman
    MathRoman,
    /// 数学模式下替代 Sans
    MathSans,
    Typewriter,
    Script,
    Blackboard,
    Caligraphic,
    Fraktur,
}

impl FontRole {
    pub const ALL: [FontRole; 9] = [
        FontRole::Roman,
        FontRole::Sans,
        FontRole::MathRoman,
        FontRole::MathSans,
        FontRole::Typewriter,
        FontRole::Script,
        FontRole::Blackboard,
        FontRole::Caligraphic,
        FontRole::Fraktur,
    ];

    pub fn index(self) -> usize {
        match self {
            FontRole::Roman => 0,
            FontRole::Sans => 1,
            FontRole::MathRoman => 2,
            FontRole::MathSans => 3,
            FontRole::Typewriter => 4,
            FontRole::Script => 5,
            FontRole::Blackboard => 6,
            FontRole::Caligraphic => 7,
            FontRole::Fraktur => 8,
        }
    }
}

/// 字体对 Unicode 数学符号的覆盖程度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontEncoding {
    /// 覆盖希腊字母与数学运算符
    Unicode,
    /// 只覆盖希腊字母等常见字符
    UnicodeLimited,
    /// 只有拉丁字符
    Standard,
}

/// 大小写变换，由 `\uppercase`、`\lowercase` 设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTransform {
    None,
    Upper,
    Lower,
}

/// sRGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

static NAMED_COLORS: phf::Map<&'static str, (u8, u8, u8)> = phf_map! {
    "black" => (0, 0, 0),
    "white" => (255, 255, 255),
    "red" => (255, 0, 0),
    "green" => (0, 128, 0),
    "lime" => (0, 255, 0),
    "blue" => (0, 0, 255),
    "cyan" => (0, 255, 255),
    "magenta" => (255, 0, 255),
    "yellow" => (255, 255, 0),
    "gray" => (128, 128, 128),
    "grey" => (128, 128, 128),
    "lightgray" => (211, 211, 211),
    "lightgrey" => (211, 211, 211),
    "darkgray" => (169, 169, 169),
    "darkgrey" => (169, 169, 169),
    "orange" => (255, 165, 0),
    "purple" => (128, 0, 128),
    "violet" => (238, 130, 238),
    "brown" => (165, 42, 42),
    "pink" => (255, 192, 203),
    "olive" => (128, 128, 0),
    "teal" => (0, 128, 128),
    "navy" => (0, 0, 128),
    "maroon" => (128, 0, 0),
    "silver" => (192, 192, 192),
    "gold" => (255, 215, 0),
    "darkred" => (139, 0, 0),
    "darkgreen" => (0, 100, 0),
    "darkblue" => (0, 0, 139),
    "lightblue" => (173, 216, 230),
    "lightgreen" => (144, 238, 144),
    "lightyellow" => (255, 255, 224),
};

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const LIGHT_GRAY: Color = Color::rgb(211, 211, 211);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// 解析颜色名或 `#RGB`、`#RRGGBB`、`#RRGGBBAA`
    pub fn parse(text: &str) -> Option<Color> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        NAMED_COLORS
            .get(text.to_ascii_lowercase().as_str())
            .map(|&(r, g, b)| Color::rgb(r, g, b))
    }

    fn parse_hex(hex: &str) -> Option<Color> {
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
        match hex.len() {
            3 => {
                let mut parts = hex.chars().filter_map(|ch| ch.to_digit(16));
                let r = parts.next()? as u8;
                let g = parts.next()? as u8;
                let b = parts.next()? as u8;
                Some(Color::rgb(r * 17, g * 17, b * 17))
            }
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => None,
        }
    }

    /// `#rrggbb` 形式，透明度单独输出
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(self) -> f32 {
        self.a as f32 / 255.0
    }
}

/// 排版环境
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub role: FontRole,
    /// 字号，单位像素
    pub size: f32,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub small_caps: bool,
    pub underlined: bool,
    pub overlined: bool,
    pub strike: bool,
    pub transform: TextTransform,
    pub inside_math: bool,
    /// `\displaystyle` 打开后分数不再因嵌套而缩小
    pub display_style: bool,
    /// 当前所处的分数嵌套层数
    pub frac_depth: u8,
}

impl Environment {
    pub fn new(size: f32, color: Color) -> Self {
        Self {
            role: FontRole::Roman,
            size,
            color,
            bold: false,
            italic: false,
            small_caps: false,
            underlined: false,
            overlined: false,
            strike: false,
            transform: TextTransform::None,
            inside_math: false,
            display_style: false,
            frac_depth: 0,
        }
    }

    /// 数学模式下 Roman/Sans 换成对应的数学字体
    pub fn effective_role(&self) -> FontRole {
        match (self.inside_math, self.role) {
            (true, FontRole::Roman) => FontRole::MathRoman,
            (true, FontRole::Sans) => FontRole::MathSans,
            (_, role) => role,
        }
    }

    pub fn font_spec(&self) -> FontSpec {
        FontSpec {
            role: self.effective_role(),
            size: self.size,
            bold: self.bold,
            italic: self.italic,
        }
    }

    /// 进入数学模式：变量默认斜体
    pub fn enter_math(&mut self) {
        self.inside_math = true;
        self.italic = true;
    }

    pub fn leave_math(&mut self) {
        self.inside_math = false;
        self.italic = false;
    }

    pub fn scaled(mut self, factor: f32) -> Self {
        self.size *= factor;
        self
    }

    pub fn upright(mut self) -> Self {
        self.italic = false;
        self
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(28.0, Color::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_parse_from_names_and_hex() {
        assert_eq!(Color::parse("red"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("LightGray"), Some(Color::LIGHT_GRAY));
        assert_eq!(Color::parse("#0f0"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(Color::parse("#102030").map(Color::to_hex), Some("#102030".into()));
        assert_eq!(Color::parse("#10203080").map(|c| c.a), Some(0x80));
        assert_eq!(Color::parse("nocolor"), None);
        assert_eq!(Color::parse("#12"), None);
    }

    #[test]
    fn math_mode_swaps_roman_for_math_roman() {
        let mut env = Environment::default();
        assert_eq!(env.effective_role(), FontRole::Roman);
        env.enter_math();
        assert_eq!(env.effective_role(), FontRole::MathRoman);
        assert!(env.italic);
        env.role = FontRole::Typewriter;
        assert_eq!(env.effective_role(), FontRole::Typewriter);
    }

    #[test]
    fn scaling_copies_instead_of_mutating() {
        let env = Environment::default();
        let child = env.scaled(0.5);
        assert_eq!(env.size, 28.0);
        assert_eq!(child.size, 14.0);
    }
}
