//! 根号：`\sqrt{x}`、`\sqrt[n]{x}` 与 `\cbrt{x}`

use crate::ast::{Node, SqrtNode};
use crate::error::ParseError;

use super::super::lexer::Token;
use super::super::Parser;
use super::InstructionKind;

pub fn lookup(name: &str) -> Option<InstructionKind> {
    match name {
        "sqrt" => Some(InstructionKind::Sqrt),
        "cbrt" => Some(InstructionKind::Cbrt),
        _ => None,
    }
}

impl Parser {
    pub(crate) fn parse_sqrt(&mut self) -> Option<Node> {
        let degree = match self.next_skip_whitespace() {
            Token::OpenBracket => Some(self.parse_root_degree()),
            Token::OpenBrace => {
                self.push_back(Token::OpenBrace);
                None
            }
            other => {
                self.error(ParseError::MissingArgument {
                    pos: self.position(),
                    instruction: "sqrt".to_string(),
                    index: 1,
                });
                self.push_back(other);
                return None;
            }
        };
        let child = self.expect_group("sqrt", 1)?;
        Some(Node::Sqrt(SqrtNode {
            child: Box::new(child),
            degree: degree.map(Box::new),
        }))
    }

    /// `[` 已被读取，读到匹配的 `]`
    fn parse_root_degree(&mut self) -> Node {
        let (content, end) = self.parse_list(true);
        if end != Token::CloseBracket {
            self.error(ParseError::MalformedParameters {
                pos: self.position(),
                instruction: "sqrt".to_string(),
            });
            self.restore_terminator(end);
        }
        Node::HorizontalList(content).simplify()
    }

    pub(crate) fn parse_cbrt(&mut self) -> Option<Node> {
        let child = self.expect_group("cbrt", 1)?;
        Some(Node::Sqrt(SqrtNode {
            child: Box::new(child),
            degree: Some(Box::new(Node::text("3"))),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_instructions() {
        assert_eq!(lookup("sqrt"), Some(InstructionKind::Sqrt));
        assert_eq!(lookup("cbrt"), Some(InstructionKind::Cbrt));
        assert_eq!(lookup("root"), None);
    }
}
