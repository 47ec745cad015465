//! 大型运算符：求和、乘积、并交以及积分

use phf::phf_map;

use super::symbols::{SymbolEntry, SymbolFlags};

/// 上下限放在正上方/正下方的大型运算符
const fn large(glyph: &'static str) -> SymbolEntry {
    SymbolEntry {
        glyph,
        flags: SymbolFlags::UPRIGHT
            .union(SymbolFlags::HEIGHT_IS_ASCENT)
            .union(SymbolFlags::EXACT_ASCENT)
            .union(SymbolFlags::ABOVE_BELOW),
        font_factor: 1.0,
    }
}

/// 积分号：字号放大，上下限在右侧
const fn integral(glyph: &'static str) -> SymbolEntry {
    SymbolEntry {
        glyph,
        flags: SymbolFlags::UPRIGHT
            .union(SymbolFlags::HEIGHT_IS_ASCENT)
            .union(SymbolFlags::EXACT_ASCENT),
        font_factor: 1.8,
    }
}

pub(super) static OPERATORS: phf::Map<&'static str, SymbolEntry> = phf_map! {
    "sum" => large("∑"),
    "prod" => large("∏"),
    "coprod" => large("∐"),
    "bigcap" => large("⋂"),
    "bigcup" => large("⋃"),
    "bigvee" => large("⋁"),
    "bigwedge" => large("⋀"),
    "bighat" => large("⋀"),
    "bigoplus" => large("⨁"),
    "bigotimes" => large("⨂"),
    "bigodot" => large("⨀"),
    "biguplus" => large("⨄"),
    "bigsqcup" => large("⨆"),
    "int" => integral("∫"),
    "iint" => integral("∬"),
    "iiint" => integral("∭"),
    "oint" => integral("∮"),
    "oiint" => integral("∯"),
    "oiiint" => integral("∰"),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrals_are_enlarged_but_keep_side_limits() {
        let int = OPERATORS.get("int").expect("int");
        assert!(int.font_factor > 1.0);
        assert!(!int.has(SymbolFlags::ABOVE_BELOW));
        assert!(OPERATORS.get("bigcup").expect("bigcup").has(SymbolFlags::ABOVE_BELOW));
        assert!(OPERATORS.contains_key("prod"));
        assert!(!OPERATORS.contains_key("alpha"));
    }
}
