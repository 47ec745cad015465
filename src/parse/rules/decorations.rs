//! 装饰指令：帽子、波浪线、上下划线与删除线

use phf::phf_map;

use crate::ast::DecorationType;

static DECORATIONS: phf::Map<&'static str, DecorationType> = phf_map! {
    "vec" => DecorationType::Vector,
    "hat" => DecorationType::Hat,
    "widehat" => DecorationType::WideHat,
    "check" => DecorationType::Check,
    "widecheck" => DecorationType::WideCheck,
    "breve" => DecorationType::Breve,
    "ocirc" => DecorationType::Ocirc,
    "dot" => DecorationType::Dot,
    "ddot" => DecorationType::Ddot,
    "bar" => DecorationType::Bar,
    "overline" => DecorationType::Overline,
    "oline" => DecorationType::Overline,
    "doubleoverline" => DecorationType::DoubleOverline,
    "ooline" => DecorationType::DoubleOverline,
    "tilde" => DecorationType::Tilde,
    "widetilde" => DecorationType::WideTilde,
    "acute" => DecorationType::Acute,
    "grave" => DecorationType::Grave,
    "arrow" => DecorationType::Arrow,
    "overleftarrow" => DecorationType::OverLeftArrow,
    "overrightarrow" => DecorationType::OverRightArrow,
    "overleftrightarrow" => DecorationType::OverLeftRightArrow,
    "underline" => DecorationType::Underline,
    "uline" => DecorationType::Underline,
    "underlineDashed" => DecorationType::UnderlineDashed,
    "dashuline" => DecorationType::UnderlineDashed,
    "underlineDotted" => DecorationType::UnderlineDotted,
    "dotuline" => DecorationType::UnderlineDotted,
    "doubleunderline" => DecorationType::DoubleUnderline,
    "uuline" => DecorationType::DoubleUnderline,
    "underleftarrow" => DecorationType::UnderLeftArrow,
    "underrightarrow" => DecorationType::UnderRightArrow,
    "underleftrightarrow" => DecorationType::UnderLeftRightArrow,
    "strike" => DecorationType::Strike,
    "cancel" => DecorationType::Cancel,
    "bcancel" => DecorationType::BCancel,
    "xcancel" => DecorationType::XCancel,
};

pub fn lookup(name: &str) -> Option<DecorationType> {
    DECORATIONS.get(name).copied()
}

impl DecorationType {
    /// 可以用组合字符代替路径的小装饰
    pub fn combining_char(self) -> Option<char> {
        Some(match self {
            DecorationType::Vector => '\u{20D7}',
            DecorationType::Hat => '\u{0302}',
            DecorationType::Check => '\u{030C}',
            DecorationType::Breve => '\u{0306}',
            DecorationType::Ocirc => '\u{030A}',
            DecorationType::Dot => '\u{0307}',
            DecorationType::Ddot => '\u{0308}',
            DecorationType::Bar => '\u{0304}',
            DecorationType::Tilde => '\u{0303}',
            DecorationType::Acute => '\u{0301}',
            DecorationType::Grave => '\u{0300}',
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DecorationPlacement;

    #[test]
    fn aliases_and_placement() {
        assert_eq!(lookup("dashuline"), Some(DecorationType::UnderlineDashed));
        assert_eq!(lookup("uuline"), lookup("doubleunderline"));
        assert_eq!(
            lookup("underrightarrow").map(DecorationType::placement),
            Some(DecorationPlacement::Under)
        );
        assert_eq!(
            lookup("xcancel").map(DecorationType::placement),
            Some(DecorationPlacement::Through)
        );
        assert!(lookup("alpha").is_none());
    }

    #[test]
    fn only_small_accents_have_combining_forms() {
        assert_eq!(DecorationType::Hat.combining_char(), Some('\u{0302}'));
        assert_eq!(DecorationType::WideHat.combining_char(), None);
        assert_eq!(DecorationType::Underline.combining_char(), None);
    }
}
