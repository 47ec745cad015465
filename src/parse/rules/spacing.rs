//! 间距指令：`\,`、`\quad` 以及 `\hspace{..}`

use phf::phf_map;

use crate::ast::{Length, LengthUnit, WhitespaceKind};

static SPACING: phf::Map<&'static str, WhitespaceKind> = phf_map! {
    " " => WhitespaceKind::Normal,
    "nbsp" => WhitespaceKind::NonBreaking,
    "enspace" => WhitespaceKind::EnSpace,
    "quad" => WhitespaceKind::Quad,
    "emspace" => WhitespaceKind::EmSpace,
    "qquad" => WhitespaceKind::QQuad,
    "," => WhitespaceKind::Thin,
    "thinspace" => WhitespaceKind::Thin,
    ":" => WhitespaceKind::Medium,
    "medspace" => WhitespaceKind::Medium,
    ";" => WhitespaceKind::Thick,
    "thickspace" => WhitespaceKind::Thick,
    "!" => WhitespaceKind::NegThin,
    "negthinspace" => WhitespaceKind::NegThin,
    "negmedspace" => WhitespaceKind::NegMedium,
    "negthickspace" => WhitespaceKind::NegThick,
};

pub fn lookup(name: &str) -> Option<WhitespaceKind> {
    SPACING.get(name).copied()
}

/// 解析 `1.5em`、`-3pt` 这样的长度，缺省单位为 em
pub fn parse_length(raw: &str) -> Option<Length> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let value: f32 = number.trim().parse().ok()?;
    let unit = match unit.trim() {
        "" | "em" => LengthUnit::Em,
        "ex" => LengthUnit::Ex,
        "pt" => LengthUnit::Pt,
        "px" => LengthUnit::Px,
        _ => return None,
    };
    Some(Length { value, unit })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_spaces() {
        assert_eq!(lookup(","), Some(WhitespaceKind::Thin));
        assert_eq!(lookup("qquad"), Some(WhitespaceKind::QQuad));
        assert_eq!(lookup("alpha"), None);
    }

    #[test]
    fn lengths_with_units() {
        assert_eq!(
            parse_length("1.5em"),
            Some(Length {
                value: 1.5,
                unit: LengthUnit::Em
            })
        );
        assert_eq!(parse_length(" -3 pt").map(|l| l.unit), Some(LengthUnit::Pt));
        assert_eq!(parse_length("2").map(|l| l.unit), Some(LengthUnit::Em));
        assert!(parse_length("2furlongs").is_none());
        assert!(parse_length("em").is_none());
    }
}
