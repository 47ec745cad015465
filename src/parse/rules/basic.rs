//! 杂项指令：`\unicode`、`\phantom`、`\substack`、`\hspace`

use phf::phf_map;

use crate::ast::{
    HAlign, LineSpacing, Node, PhantomMode, PhantomNode, VerticalListNode, VerticalOrientation,
    WhitespaceKind,
};
use crate::error::ParseError;

use super::super::lexer::Token;
use super::super::{LinesEnd, Parser};
use super::spacing::parse_length;
use super::{InstructionKind, UnicodeForm};

static BASIC: phf::Map<&'static str, InstructionKind> = phf_map! {
    "unicode" => InstructionKind::Unicode(UnicodeForm::Codepoint),
    "usym" => InstructionKind::Unicode(UnicodeForm::Codepoint),
    "utfeight" => InstructionKind::Unicode(UnicodeForm::Utf8),
    "phantom" => InstructionKind::Phantom(PhantomMode::Both),
    "vphantom" => InstructionKind::Phantom(PhantomMode::Vertical),
    "hphantom" => InstructionKind::Phantom(PhantomMode::Horizontal),
    "substack" => InstructionKind::Substack(HAlign::Center),
    "lsubstack" => InstructionKind::Substack(HAlign::Left),
    "rsubstack" => InstructionKind::Substack(HAlign::Right),
    "hspace" => InstructionKind::HSpace,
    "hskip" => InstructionKind::HSpace,
};

pub fn lookup(name: &str) -> Option<InstructionKind> {
    BASIC.get(name).copied()
}

/// 十六进制码位或十六进制 UTF-8 字节串
fn decode_unicode(raw: &str, form: UnicodeForm) -> Option<String> {
    let digits: String = raw
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("U+")
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    if digits.is_empty() {
        return None;
    }
    match form {
        UnicodeForm::Codepoint => {
            let code = u32::from_str_radix(&digits, 16).ok()?;
            char::from_u32(code).map(String::from)
        }
        UnicodeForm::Utf8 => {
            if digits.len() % 2 != 0 {
                return None;
            }
            let bytes = (0..digits.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok())
                .collect::<Option<Vec<u8>>>()?;
            String::from_utf8(bytes).ok()
        }
    }
}

impl Parser {
    pub(crate) fn parse_unicode(&mut self, name: &str, form: UnicodeForm) -> Option<Node> {
        let pos = self.position();
        let raw = self.read_string_params(name, 1)?.pop()?;
        match decode_unicode(&raw, form) {
            Some(text) => Some(Node::text(text)),
            None => {
                self.error(ParseError::MalformedParameters {
                    pos,
                    instruction: name.to_string(),
                });
                None
            }
        }
    }

    pub(crate) fn parse_phantom(&mut self, name: &str, mode: PhantomMode) -> Option<Node> {
        let child = self.expect_group(name, 1)?;
        Some(Node::Phantom(PhantomNode {
            mode,
            child: Box::new(child),
        }))
    }

    /// `\substack{a \\ b}`：紧凑的多行，常用于求和号下方
    pub(crate) fn parse_substack(&mut self, name: &str, alignment: HAlign) -> Option<Node> {
        let token = self.next_skip_whitespace();
        if token != Token::OpenBrace {
            self.error(ParseError::MissingArgument {
                pos: self.position(),
                instruction: name.to_string(),
                index: 1,
            });
            self.push_back(token);
            return None;
        }
        let lines = self.parse_lines(LinesEnd::Group);
        Some(Node::VerticalList(VerticalListNode {
            lines,
            alignment,
            spacing: LineSpacing::Minimal,
            line_spacing_factor: 1.0,
            orientation: VerticalOrientation::FirstLine,
        }))
    }

    pub(crate) fn parse_hspace(&mut self, name: &str) -> Option<Node> {
        let pos = self.position();
        let raw = self.read_string_params(name, 1)?.pop()?;
        match parse_length(&raw) {
            Some(length) => Some(Node::Whitespace(WhitespaceKind::Custom(length))),
            None => {
                self.error(ParseError::MalformedParameters {
                    pos,
                    instruction: name.to_string(),
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_points_and_utf8_bytes() {
        assert_eq!(
            decode_unicode("263A", UnicodeForm::Codepoint).as_deref(),
            Some("☺")
        );
        assert_eq!(
            decode_unicode("E2 98 BA", UnicodeForm::Utf8).as_deref(),
            Some("☺")
        );
        assert_eq!(decode_unicode("zz", UnicodeForm::Codepoint), None);
        assert_eq!(decode_unicode("E29", UnicodeForm::Utf8), None);
        assert_eq!(decode_unicode("D800", UnicodeForm::Codepoint), None);
    }

    #[test]
    fn phantom_variants() {
        assert_eq!(
            lookup("vphantom"),
            Some(InstructionKind::Phantom(PhantomMode::Vertical))
        );
        assert_eq!(lookup("lsubstack"), Some(InstructionKind::Substack(HAlign::Left)));
    }
}
