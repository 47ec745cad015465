//! 分数与堆叠：`\frac`、`\binom`、`\underbrace` 等两参数指令

use phf::phf_map;

use crate::ast::{BraceNode, BraceType, FracMode, FracNode, Node};

use super::super::lexer::Token;
use super::super::Parser;
use super::InstructionKind;

static FRACTIONS: phf::Map<&'static str, FracMode> = phf_map! {
    "frac" => FracMode::Plain,
    "dfrac" => FracMode::Display,
    "tfrac" => FracMode::Small,
    "sfrac" => FracMode::Slanted,
    "slantfrac" => FracMode::Slanted,
    "xfrac" => FracMode::Slanted,
    "nicefrac" => FracMode::Slanted,
    "stfrac" => FracMode::StackedSlanted,
    "stackrel" => FracMode::StackRel,
    "underbrace" => FracMode::Underbrace,
    "overbrace" => FracMode::Overbrace,
    "underbracket" => FracMode::Underbracket,
    "overbracket" => FracMode::Overbracket,
    "underset" => FracMode::Underset,
    "overset" => FracMode::Overset,
};

pub fn lookup(name: &str) -> Option<InstructionKind> {
    if matches!(name, "binom" | "dbinom" | "tbinom") {
        return Some(InstructionKind::Binom);
    }
    FRACTIONS.get(name).copied().map(InstructionKind::Fraction)
}

/// 括号类堆叠只有一个必需参数，标注写在随后的 `_`/`^` 里
fn label_token(mode: FracMode) -> Option<Token> {
    match mode {
        FracMode::Underbrace | FracMode::Underbracket => Some(Token::Underscore),
        FracMode::Overbrace | FracMode::Overbracket => Some(Token::Caret),
        _ => None,
    }
}

impl Parser {
    pub(crate) fn parse_fraction(&mut self, name: &str, mode: FracMode) -> Option<Node> {
        let first = self.expect_group(name, 1)?;
        let second = match label_token(mode) {
            Some(marker) => self.read_brace_label(name, marker),
            None => self.expect_group(name, 2),
        };
        let Some(second) = second else {
            return Some(first);
        };
        Some(Node::Frac(FracNode {
            mode,
            numerator: Box::new(first),
            denominator: Box::new(second),
        }))
    }

    /// `\underbrace{x}_{label}`，也接受 `\underbrace{x}{label}`
    fn read_brace_label(&mut self, name: &str, marker: Token) -> Option<Node> {
        let token = self.next_skip_whitespace();
        if token == marker {
            let script = if marker == Token::Underscore { "_" } else { "^" };
            return Some(self.read_script_argument(script));
        }
        self.push_back(token);
        if self.brace_follows() {
            return self.expect_group(name, 2);
        }
        Some(Node::empty())
    }

    pub(crate) fn parse_binom(&mut self, name: &str) -> Option<Node> {
        let top = self.expect_group(name, 1)?;
        let Some(bottom) = self.expect_group(name, 2) else {
            return Some(top);
        };
        Some(Node::Brace(BraceNode {
            open: BraceType::Parenthesis,
            close: BraceType::Parenthesis,
            child: Box::new(Node::Frac(FracNode {
                mode: FracMode::Stack,
                numerator: Box::new(top),
                denominator: Box::new(bottom),
            })),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomials_are_separate() {
        assert_eq!(lookup("tbinom"), Some(InstructionKind::Binom));
        assert_eq!(lookup("nicefrac"), Some(InstructionKind::Fraction(FracMode::Slanted)));
        assert_eq!(lookup("sqrt"), None);
    }

    #[test]
    fn only_brace_stacks_take_script_labels() {
        assert_eq!(label_token(FracMode::Underbrace), Some(Token::Underscore));
        assert_eq!(label_token(FracMode::Overbracket), Some(Token::Caret));
        assert_eq!(label_token(FracMode::Underset), None);
    }
}
