//! 常见数学函数名，`\sin` 等指令以直立文本排版

use phf::phf_map;

use super::symbols::{SymbolEntry, SymbolFlags};

const fn func(glyph: &'static str) -> SymbolEntry {
    SymbolEntry {
        glyph,
        flags: SymbolFlags::UPRIGHT,
        font_factor: 1.0,
    }
}

/// 极限类函数名，数学模式下上下标放在正下方
const fn limit(glyph: &'static str) -> SymbolEntry {
    SymbolEntry {
        glyph,
        flags: SymbolFlags::UPRIGHT
            .union(SymbolFlags::HEIGHT_IS_ASCENT)
            .union(SymbolFlags::ABOVE_BELOW),
        font_factor: 1.0,
    }
}

pub(super) static FUNCTIONS: phf::Map<&'static str, SymbolEntry> = phf_map! {
    "sin" => func("sin"),
    "cos" => func("cos"),
    "tan" => func("tan"),
    "sec" => func("sec"),
    "csc" => func("csc"),
    "cot" => func("cot"),
    "sinh" => func("sinh"),
    "cosh" => func("cosh"),
    "tanh" => func("tanh"),
    "coth" => func("coth"),
    "atan" => func("atan"),
    "acos" => func("acos"),
    "asin" => func("asin"),
    "arcsin" => func("arcsin"),
    "arccos" => func("arccos"),
    "arctan" => func("arctan"),
    "exp" => func("exp"),
    "log" => func("log"),
    "ln" => func("ln"),
    "ld" => func("ld"),
    "lb" => func("lb"),
    "erf" => func("erf"),
    "gcd" => func("gcd"),
    "hom" => func("hom"),
    "ker" => func("ker"),
    "dim" => func("dim"),
    "arg" => func("arg"),
    "det" => func("det"),
    "deg" => func("deg"),
    "sign" => func("sign"),
    "sgn" => func("sgn"),
    "Pr" => func("Pr"),
    "mod" => func("mod"),
    "bmod" => func("mod"),
    "ii" => func("i"),
    "dd" => func("d"),
    "lim" => limit("lim"),
    "liminf" => limit("lim inf"),
    "limsup" => limit("lim sup"),
    "max" => limit("max"),
    "min" => limit("min"),
    "sup" => limit("sup"),
    "inf" => limit("inf"),
    "argmin" => limit("argmin"),
    "argmax" => limit("argmax"),
    "median" => limit("median"),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_functions_have_no_limits() {
        let sin = FUNCTIONS.get("sin").expect("sin");
        assert!(sin.has(SymbolFlags::UPRIGHT));
        assert!(!sin.has(SymbolFlags::ABOVE_BELOW));
        assert_eq!(FUNCTIONS.get("limsup").map(|e| e.glyph), Some("lim sup"));
    }
}
