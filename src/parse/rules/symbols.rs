use phf::phf_map;

use super::{functions, operators};

/// 符号的排版标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolFlags(u8);

impl SymbolFlags {
    pub const NONE: SymbolFlags = SymbolFlags(0);
    /// 数学模式下按 `mathoperator_width_factor` 加宽并居中
    pub const EXTEND_WIDTH: SymbolFlags = SymbolFlags(1);
    /// 下降取上升的 10%
    pub const HEIGHT_IS_ASCENT: SymbolFlags = SymbolFlags(1 << 1);
    /// 与 `HEIGHT_IS_ASCENT` 同时出现时使用墨迹的真实高度
    pub const EXACT_ASCENT: SymbolFlags = SymbolFlags(1 << 2);
    /// 不随环境变为斜体
    pub const UPRIGHT: SymbolFlags = SymbolFlags(1 << 3);
    /// 数学模式下上下标放在正上方/正下方
    pub const ABOVE_BELOW: SymbolFlags = SymbolFlags(1 << 4);
    /// 没有字形，按路径画长箭头
    pub const LONG_ARROW: SymbolFlags = SymbolFlags(1 << 5);

    pub const fn union(self, other: SymbolFlags) -> SymbolFlags {
        SymbolFlags(self.0 | other.0)
    }

    pub const fn contains(self, other: SymbolFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolEntry {
    pub glyph: &'static str,
    pub flags: SymbolFlags,
    /// 相对当前字号的放大倍数
    pub font_factor: f32,
}

impl SymbolEntry {
    pub fn has(&self, flag: SymbolFlags) -> bool {
        self.flags.contains(flag)
    }
}

pub(super) const fn entry(glyph: &'static str, flags: SymbolFlags) -> SymbolEntry {
    SymbolEntry {
        glyph,
        flags,
        font_factor: 1.0,
    }
}

/// 小写希腊字母，随数学模式倾斜
const fn greek(glyph: &'static str) -> SymbolEntry {
    entry(glyph, SymbolFlags::NONE)
}

const fn up(glyph: &'static str) -> SymbolEntry {
    entry(glyph, SymbolFlags::UPRIGHT)
}

/// 关系符、运算符与箭头：数学模式下两侧留白
const fn op(glyph: &'static str) -> SymbolEntry {
    entry(glyph, SymbolFlags::UPRIGHT.union(SymbolFlags::EXTEND_WIDTH))
}

const fn long_arrow() -> SymbolEntry {
    entry("", SymbolFlags::UPRIGHT.union(SymbolFlags::LONG_ARROW))
}

static SYMBOLS: phf::Map<&'static str, SymbolEntry> = phf_map! {
    // 希腊字母
    "alpha" => greek("α"),
    "beta" => greek("β"),
    "gamma" => greek("γ"),
    "delta" => greek("δ"),
    "epsilon" => greek("ϵ"),
    "varepsilon" => greek("ε"),
    "zeta" => greek("ζ"),
    "eta" => greek("η"),
    "theta" => greek("θ"),
    "vartheta" => greek("ϑ"),
    "iota" => greek("ι"),
    "kappa" => greek("κ"),
    "varkappa" => greek("ϰ"),
    "lambda" => greek("λ"),
    "mu" => greek("μ"),
    "nu" => greek("ν"),
    "xi" => greek("ξ"),
    "omicron" => greek("ο"),
    "pi" => greek("π"),
    "varpi" => greek("ϖ"),
    "rho" => greek("ρ"),
    "varrho" => greek("ϱ"),
    "sigma" => greek("σ"),
    "varsigma" => greek("ς"),
    "tau" => greek("τ"),
    "upsilon" => greek("υ"),
    "phi" => greek("ϕ"),
    "varphi" => greek("φ"),
    "chi" => greek("χ"),
    "psi" => greek("ψ"),
    "omega" => greek("ω"),
    "digamma" => greek("ϝ"),
    "Gamma" => up("Γ"),
    "Delta" => up("Δ"),
    "Theta" => up("Θ"),
    "Lambda" => up("Λ"),
    "Xi" => up("Ξ"),
    "Pi" => up("Π"),
    "Sigma" => up("Σ"),
    "Upsilon" => up("Υ"),
    "Phi" => up("Φ"),
    "Psi" => up("Ψ"),
    "Omega" => up("Ω"),

    // 箭头
    "leftrightarrow" => op("↔"),
    "leftarrow" => op("←"),
    "gets" => op("←"),
    "rightarrow" => op("→"),
    "to" => op("→"),
    "uparrow" => op("↑"),
    "downarrow" => op("↓"),
    "updownarrow" => op("↕"),
    "Leftrightarrow" => op("⇔"),
    "iff" => op("⇔"),
    "Leftarrow" => op("⇐"),
    "impliedby" => op("⇐"),
    "Rightarrow" => op("⇒"),
    "implies" => op("⇒"),
    "Uparrow" => op("⇑"),
    "Downarrow" => op("⇓"),
    "Updownarrow" => op("⇕"),
    "nwarrow" => op("↖"),
    "nearrow" => op("↗"),
    "searrow" => op("↘"),
    "swarrow" => op("↙"),
    "mapsto" => op("↦"),
    "hookleftarrow" => op("↩"),
    "hookrightarrow" => op("↪"),
    "leftleftarrows" => op("⇇"),
    "rightrightarrows" => op("⇉"),
    "leftrightarrows" => op("⇆"),
    "rightleftarrows" => op("⇄"),
    "leftharpoonup" => op("↼"),
    "rightharpoonup" => op("⇀"),
    "upharpoonleft" => op("↿"),
    "downharpoonleft" => op("⇃"),
    "leftrightharpoon" => op("⇋"),
    "rightleftharpoon" => op("⇌"),
    "leftharpoondown" => op("↽"),
    "rightharpoondown" => op("⇁"),
    "upharpoonright" => op("↾"),
    "downharpoonright" => op("⇂"),
    "lightning" => up("↯"),
    "longleftarrow" => long_arrow(),
    "longrightarrow" => long_arrow(),
    "Longleftarrow" => long_arrow(),
    "Longrightarrow" => long_arrow(),
    "longleftrightarrow" => long_arrow(),
    "Longleftrightarrow" => long_arrow(),

    // 关系符
    "leq" => op("≤"),
    "le" => op("≤"),
    "geq" => op("≥"),
    "ge" => op("≥"),
    "leqq" => op("≦"),
    "geqq" => op("≧"),
    "ll" => op("≪"),
    "gg" => op("≫"),
    "neq" => op("≠"),
    "ne" => op("≠"),
    "equiv" => op("≡"),
    "approx" => op("≈"),
    "sim" => op("∼"),
    "simeq" => op("≃"),
    "cong" => op("≅"),
    "doteq" => op("≐"),
    "propto" => op("∝"),
    "prec" => op("≺"),
    "succ" => op("≻"),
    "preceq" => op("⪯"),
    "succeq" => op("⪰"),
    "in" => op("∈"),
    "notin" => op("∉"),
    "ni" => op("∋"),
    "notni" => op("∌"),
    "subset" => op("⊂"),
    "subseteq" => op("⊆"),
    "supset" => op("⊃"),
    "supseteq" => op("⊇"),
    "subsetnot" => op("⊄"),
    "supsetnot" => op("⊅"),
    "mid" => op("∣"),
    "nmid" => op("∤"),
    "parallel" => op("∥"),
    "nparallel" => op("∦"),
    "perp" => op("⊥"),
    "bot" => op("⊥"),
    "top" => op("⊤"),
    "vdash" => op("⊢"),
    "dashv" => op("⊣"),
    "models" => op("⊨"),
    "vartriangleleft" => op("⊲"),

    // 二元运算符
    "pm" => op("±"),
    "mp" => op("∓"),
    "times" => op("×"),
    "div" => op("÷"),
    "cdot" => op("⋅"),
    "ast" => op("∗"),
    "asterisk" => op("∗"),
    "star" => op("⋆"),
    "circ" => op("∘"),
    "bullet" => op("∙"),
    "cap" => op("∩"),
    "cup" => op("∪"),
    "land" => op("∧"),
    "lor" => op("∨"),
    "wedge" => op("∧"),
    "vee" => op("∨"),
    "oplus" => op("⊕"),
    "ominus" => op("⊖"),
    "otimes" => op("⊗"),
    "oslash" => op("⊘"),
    "odot" => op("⊙"),
    "setminus" => op("∖"),
    "sqcap" => op("⊓"),
    "sqcup" => op("⊔"),
    "uplus" => op("⊎"),
    "multimap" => op("⊸"),
    "maporiginal" => op("⊶"),
    "mapimage" => op("⊷"),
    "diamond" => op("⋄"),
    "neg" => up("¬"),
    "lnot" => up("¬"),
    "+" => op("+"),
    "-" => op("−"),
    "*" => op("∗"),
    "/" => op("/"),
    "<" => op("<"),
    ">" => op(">"),
    "=" => op("="),
    "vert" => op("|"),

    // 杂项
    "infty" => up("∞"),
    "partial" => up("∂"),
    "nabla" => up("∇"),
    "forall" => up("∀"),
    "exists" => up("∃"),
    "nexists" => up("∄"),
    "emptyset" => up("∅"),
    "varnothing" => up("∅"),
    "angle" => up("∠"),
    "measuredangle" => up("∡"),
    "sphericalangle" => up("∢"),
    "rightangle" => up("∟"),
    "triangle" => up("△"),
    "square" => up("□"),
    "Box" => up("□"),
    "blacksquare" => up("∎"),
    "therefore" => up("∴"),
    "because" => up("∵"),
    "hbar" => up("ℏ"),
    "ell" => up("ℓ"),
    "wp" => up("℘"),
    "Re" => up("ℜ"),
    "Im" => up("ℑ"),
    "aleph" => up("ℵ"),
    "Aleph" => up("ℵ"),
    "alef" => up("ℵ"),
    "Alef" => up("ℵ"),
    "beth" => up("ℶ"),
    "Beth" => up("ℶ"),
    "bet" => up("ℶ"),
    "Bet" => up("ℶ"),
    "gimel" => up("ℷ"),
    "Gimel" => up("ℷ"),
    "dalet" => up("ℸ"),
    "Dalet" => up("ℸ"),
    "prime" => up("′"),
    "dprime" => up("″"),
    "trprime" => up("‴"),
    "degree" => up("°"),
    "textdegree" => up("°"),
    "celsius" => up("℃"),
    "perthousand" => up("‰"),
    "copyright" => up("©"),
    "registered" => up("®"),
    "circledR" => up("®"),
    "textregistered" => up("®"),
    "trademark" => up("™"),
    "dagger" => up("†"),
    "ddagger" => up("‡"),
    "S" => up("§"),
    "P" => up("¶"),
    "dots" => up("…"),
    "ldots" => up("…"),
    "ellipsis" => up("…"),
    "cdots" => up("⋯"),
    "vdots" => up("⋮"),
    "ddots" => up("⋱"),
    "iddots" => up("⋰"),
    "euro" => up("€"),
    "EUR" => up("€"),
    "cent" => up("¢"),
    "pound" => up("£"),
    "yen" => up("¥"),
    "dollar" => up("$"),
    "glq" => up("‘"),
    "grq" => up("’"),
    "glqq" => up("“"),
    "grqq" => up("”"),
    "flq" => up("‹"),
    "frq" => up("›"),
    "flqq" => up("«"),
    "frqq" => up("»"),
    "Angstrom" => up("Å"),
    "Angstroem" => up("Å"),
    "Ohm" => up("Ω"),
    "ohm" => up("Ω"),
    "tcohm" => up("Ω"),
    "co" => up("℅"),
    "No" => up("№"),
    "AC" => up("∿"),
    "DC" => up("⎓"),
    "female" => up("♀"),
    "male" => up("♂"),
    "smiley" => up("☺"),
    "blacksmiley" => up("☻"),
    "frownie" => up("☹"),
    "frown" => up("⌢"),
    "smile" => up("⌣"),
    "hexagon" => up("⎔"),
    "benzene" => up("⌬"),
    "varhexagonlrbonds" => up("⌬"),
    "accurrent" => up("⏦"),
    "varcarriagereturn" => up("⏎"),
    "trapezium" => up("⏢"),

    // 括号与转义字符
    "ulcorner" => up("⌜"),
    "urcorner" => up("⌝"),
    "llcorner" => up("⌞"),
    "lrcorner" => up("⌟"),
    "tlcorner" => up("⌜"),
    "trcorner" => up("⌝"),
    "blcorner" => up("⌞"),
    "brcorner" => up("⌟"),
    "langle" => up("⟨"),
    "rangle" => up("⟩"),
    "lceil" => up("⌈"),
    "rceil" => up("⌉"),
    "lfloor" => up("⌊"),
    "rfloor" => up("⌋"),
    "lbrace" => up("{"),
    "rbrace" => up("}"),
    "lbrack" => up("["),
    "rbrack" => up("]"),
    "Vert" => up("‖"),
    "|" => up("‖"),
    "_" => up("_"),
    "{" => up("{"),
    "}" => up("}"),
    "[" => up("["),
    "]" => up("]"),
    "(" => up("("),
    ")" => up(")"),
    "$" => up("$"),
    "%" => up("%"),
    "&" => up("&"),
    "#" => up("#"),
    "backslash" => up("\\"),
    "textbackslash" => up("\\"),
    "colon" => up(":"),

    // 黑板粗体简写
    "bbC" => up("ℂ"),
    "bbH" => up("ℍ"),
    "bbN" => up("ℕ"),
    "bbP" => up("ℙ"),
    "bbQ" => up("ℚ"),
    "bbR" => up("ℝ"),
    "bbZ" => up("ℤ"),
};

/// 字体只有拉丁字符时的替代写法
static ASCII_FALLBACK: phf::Map<&'static str, &'static str> = phf_map! {
    "dots" => "...",
    "ldots" => "...",
    "ellipsis" => "...",
    "cdots" => "...",
    "leq" => "<=",
    "le" => "<=",
    "geq" => ">=",
    "ge" => ">=",
    "neq" => "!=",
    "ne" => "!=",
    "to" => "->",
    "rightarrow" => "->",
    "leftarrow" => "<-",
    "gets" => "<-",
    "Rightarrow" => "=>",
    "implies" => "=>",
    "leftrightarrow" => "<->",
    "Leftrightarrow" => "<=>",
    "iff" => "<=>",
    "pm" => "+/-",
    "times" => "x",
    "cdot" => "·",
    "-" => "-",
    "*" => "*",
    "ast" => "*",
    "asterisk" => "*",
    "prime" => "'",
    "dprime" => "''",
    "trprime" => "'''",
    "glq" => "'",
    "grq" => "'",
    "glqq" => "\"",
    "grqq" => "\"",
    "flq" => "<",
    "frq" => ">",
    "ll" => "<<",
    "gg" => ">>",
    "approx" => "~",
    "sim" => "~",
    "mid" => "|",
    "|" => "||",
    "Vert" => "||",
};

/// 依次查找普通符号、大型运算符与函数名
pub fn lookup(name: &str) -> Option<&'static SymbolEntry> {
    SYMBOLS
        .get(name)
        .or_else(|| operators::OPERATORS.get(name))
        .or_else(|| functions::FUNCTIONS.get(name))
}

pub fn ascii_fallback(name: &str) -> Option<&'static str> {
    ASCII_FALLBACK.get(name).copied()
}

/// 数学模式下单独成词的运算字符对应的符号名
pub fn math_char_symbol(ch: char) -> Option<&'static str> {
    Some(match ch {
        '+' => "+",
        '-' => "-",
        '*' => "*",
        '/' => "/",
        '<' => "<",
        '>' => ">",
        '=' => "=",
        '|' => "vert",
        _ => return None,
    })
}

/// 长箭头的方向：(左箭头, 右箭头, 双线)
pub fn long_arrow_shape(name: &str) -> (bool, bool, bool) {
    let double = name.starts_with('L');
    let lower = name.to_ascii_lowercase();
    let both = lower.contains("leftright");
    (both || lower.contains("left"), both || lower.contains("right"), double)
}

/// 黑板粗体字母，传统的 ℂℍℕℙℚℝℤ 在 BMP 中另有码位
pub fn double_struck(ch: char) -> char {
    let mapped = match ch {
        'C' => Some('ℂ'),
        'H' => Some('ℍ'),
        'N' => Some('ℕ'),
        'P' => Some('ℙ'),
        'Q' => Some('ℚ'),
        'R' => Some('ℝ'),
        'Z' => Some('ℤ'),
        'A'..='Z' => char::from_u32(0x1D538 + (ch as u32 - 'A' as u32)),
        'a'..='z' => char::from_u32(0x1D552 + (ch as u32 - 'a' as u32)),
        '0'..='9' => char::from_u32(0x1D7D8 + (ch as u32 - '0' as u32)),
        _ => None,
    };
    mapped.unwrap_or(ch)
}
