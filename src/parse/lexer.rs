use crate::error::ParseError;

use super::rules::accents;

/// 词法单元
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    End,
    Text(String),
    Instruction(String),
    /// `\\`、`\newline`、`\linebreak`
    Newline,
    Verbatim { text: String, visible_space: bool },
    Begin(String),
    EndEnvironment(String),
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Underscore,
    Caret,
    Ampersand,
    Dollar,
    Tilde,
    Whitespace,
    Hyphen,
    EnDash,
    EmDash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Text,
    Math,
}

/// 紧跟反斜杠、自身即为指令名的单个字符
const SINGLE_CHAR_INSTRUCTIONS: &str = "_&{}#%$ ,:;!|[]()<>^~\"'`=.-+*/";

/// 数学模式下单独成词的字符
const MATH_SINGLE_CHARS: &str = "()|+-*/<>=";

/// 切分文本的字符
fn ends_text(ch: char, mode: Mode) -> bool {
    if ch.is_whitespace() || matches!(ch, '\\' | '$' | '&' | '{' | '}' | '[' | ']' | '_' | '^' | '~')
    {
        return true;
    }
    match mode {
        Mode::Text => ch == '-',
        Mode::Math => MATH_SINGLE_CHARS.contains(ch),
    }
}

/// 原样读取内容的环境
fn is_verbatim_environment(name: &str) -> bool {
    matches!(name, "verbatim" | "verbatim*" | "lstlisting")
}

/// 按需产出词法单元的游标
pub struct Lexer {
    source: Vec<char>,
    len: usize,
    pos: usize,
    errors: Vec<ParseError>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let len = chars.len();
        Self {
            source: chars,
            len,
            pos: 0,
            errors: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn peek_char(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    #[inline]
    pub(crate) fn consume_char(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        Some(ch)
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// 跳过空白后的下一个字符，不移动游标
    pub(crate) fn peek_non_whitespace(&self) -> Option<char> {
        self.source[self.pos..]
            .iter()
            .copied()
            .find(|ch| !ch.is_whitespace())
    }

    /// 取走词法阶段积累的错误
    pub(crate) fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// 原样读取直到 `end`（不含），`end` 本身被消耗；找不到时返回 None 并停在末尾
    pub(crate) fn read_raw_until(&mut self, end: char) -> Option<String> {
        let start = self.pos;
        while let Some(ch) = self.consume_char() {
            if ch == end {
                return Some(self.source[start..self.pos - 1].iter().collect());
            }
        }
        None
    }

    pub fn next_token(&mut self, mode: Mode) -> Token {
        let Some(ch) = self.consume_char() else {
            return Token::End;
        };
        match ch {
            '\\' => self.read_instruction(mode),
            '{' => Token::OpenBrace,
            '}' => Token::CloseBrace,
            '[' => Token::OpenBracket,
            ']' => Token::CloseBracket,
            '_' => Token::Underscore,
            '^' => Token::Caret,
            '&' => Token::Ampersand,
            '$' => Token::Dollar,
            '~' => Token::Tilde,
            c if c.is_whitespace() => {
                while self.peek_char().is_some_and(char::is_whitespace) {
                    self.pos += 1;
                }
                Token::Whitespace
            }
            '-' if mode == Mode::Text => self.read_dash(),
            c if mode == Mode::Math && MATH_SINGLE_CHARS.contains(c) => Token::Text(c.to_string()),
            c => {
                let mut text = String::new();
                text.push(c);
                while let Some(next) = self.peek_char() {
                    if ends_text(next, mode) {
                        break;
                    }
                    text.push(next);
                    self.pos += 1;
                }
                Token::Text(text)
            }
        }
    }

    fn read_dash(&mut self) -> Token {
        if self.peek_char() != Some('-') {
            return Token::Hyphen;
        }
        self.pos += 1;
        if self.peek_char() == Some('-') {
            self.pos += 1;
            Token::EmDash
        } else {
            Token::EnDash
        }
    }

    fn read_instruction(&mut self, mode: Mode) -> Token {
        let start = self.pos - 1;
        let Some(next) = self.peek_char() else {
            self.errors.push(ParseError::UnterminatedInstruction(start));
            return Token::End;
        };

        if next == '\\' {
            self.pos += 1;
            return Token::Newline;
        }

        if !next.is_ascii_alphabetic() {
            self.pos += 1;
            if mode == Mode::Text && accents::is_accent_command(next) {
                if let Some(text) = self.read_accent(next) {
                    return Token::Text(text);
                }
            }
            if SINGLE_CHAR_INSTRUCTIONS.contains(next) {
                return Token::Instruction(next.to_string());
            }
            // 其他转义字符按原样输出
            return Token::Text(next.to_string());
        }

        let mut name = String::new();
        while let Some(ch) = self.peek_char() {
            if !ch.is_ascii_alphabetic() {
                break;
            }
            name.push(ch);
            self.pos += 1;
        }

        match name.as_str() {
            "newline" | "linebreak" => return Token::Newline,
            "char" => return self.read_char_code(start),
            "verb" => return self.read_verb(start),
            "begin" | "end" => return self.read_environment(name == "begin", start),
            _ => {}
        }

        if mode == Mode::Text {
            if let Some(ligature) = accents::ligature(&name) {
                // 与 TeX 一致，控制词后的一个空格属于指令本身
                if self.peek_char() == Some(' ') {
                    self.pos += 1;
                }
                return Token::Text(ligature.to_string());
            }
            let mut letters = name.chars();
            if let (Some(cmd), None) = (letters.next(), letters.next()) {
                if accents::is_accent_command(cmd) {
                    let saved = self.pos;
                    if let Some(text) = self.read_accent(cmd) {
                        return Token::Text(text);
                    }
                    self.pos = saved;
                }
            }
        }
        Token::Instruction(name)
    }

    /// `\"a`、`\"{a}`、`\v{c}` 等带重音的字母
    fn read_accent(&mut self, cmd: char) -> Option<String> {
        let saved = self.pos;
        let letter = match self.peek_char() {
            Some('{') => {
                let letter = self.peek_at(1)?;
                if self.peek_at(2) != Some('}') {
                    return None;
                }
                self.pos += 3;
                letter
            }
            // 字母型重音指令（`\v`）必须带花括号，否则会与 `\vec` 之类冲突
            Some(letter) if !cmd.is_ascii_alphabetic() && letter.is_alphabetic() => {
                self.pos += 1;
                letter
            }
            _ => return None,
        };
        match accents::accented(cmd, letter) {
            Some(ch) => Some(ch.to_string()),
            None => {
                self.pos = saved;
                None
            }
        }
    }

    /// `\char"41`、`\char'101`、`\char65`
    fn read_char_code(&mut self, start: usize) -> Token {
        let radix = match self.peek_char() {
            Some('"') => {
                self.pos += 1;
                16
            }
            Some('\'') => {
                self.pos += 1;
                8
            }
            _ => 10,
        };
        let mut digits = String::new();
        while let Some(ch) = self.peek_char() {
            if !ch.is_digit(radix) {
                break;
            }
            digits.push(ch);
            self.pos += 1;
        }
        match u32::from_str_radix(&digits, radix)
            .ok()
            .and_then(char::from_u32)
        {
            Some(ch) => Token::Text(ch.to_string()),
            None => {
                self.errors.push(ParseError::MalformedParameters {
                    pos: start,
                    instruction: "char".into(),
                });
                Token::Text(String::new())
            }
        }
    }

    /// `\verb|...|`，分隔符为 `\verb` 之后的第一个字符
    fn read_verb(&mut self, start: usize) -> Token {
        let Some(delimiter) = self.consume_char() else {
            self.errors.push(ParseError::UnterminatedVerbatim {
                pos: start,
                delimiter: String::new(),
            });
            return Token::End;
        };
        let body_start = self.pos;
        let text = match self.read_raw_until(delimiter) {
            Some(text) => text,
            None => {
                self.errors.push(ParseError::UnterminatedVerbatim {
                    pos: start,
                    delimiter: delimiter.to_string(),
                });
                self.source[body_start..].iter().collect()
            }
        };
        Token::Verbatim {
            text,
            visible_space: false,
        }
    }

    fn read_environment(&mut self, begin: bool, start: usize) -> Token {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        let instruction = if begin { "begin" } else { "end" };
        if self.peek_char() != Some('{') {
            self.errors.push(ParseError::MissingArgument {
                pos: start,
                instruction: instruction.into(),
                index: 1,
            });
            return Token::Instruction(instruction.into());
        }
        self.pos += 1;
        let Some(name) = self.read_raw_until('}') else {
            self.errors.push(ParseError::MissingClosingBrace(start));
            return Token::End;
        };
        let name = name.trim().to_string();
        if !begin {
            return Token::EndEnvironment(name);
        }
        if is_verbatim_environment(&name) {
            return self.read_verbatim_environment(&name, start);
        }
        Token::Begin(name)
    }

    fn read_verbatim_environment(&mut self, name: &str, start: usize) -> Token {
        if name == "lstlisting" && self.peek_char() == Some('[') {
            let _ = self.read_raw_until(']');
        }
        let terminator: Vec<char> = format!("\\end{{{name}}}").chars().collect();
        let body_start = self.pos;
        let found = (body_start..self.len)
            .find(|&idx| self.source[idx..].starts_with(&terminator));
        let body_end = found.unwrap_or(self.len);
        let mut text: String = self.source[body_start..body_end].iter().collect();
        if text.starts_with('\n') {
            text.remove(0);
        } else if text.starts_with("\r\n") {
            text.drain(..2);
        }
        if text.ends_with('\n') {
            text.pop();
        }
        match found {
            Some(idx) => self.pos = idx + terminator.len(),
            None => {
                self.errors.push(ParseError::UnterminatedVerbatim {
                    pos: start,
                    delimiter: terminator.iter().collect(),
                });
                self.pos = self.len;
            }
        }
        Token::Verbatim {
            text,
            visible_space: name.ends_with('*'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str, mode: Mode) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token(mode);
            if token == Token::End {
                break;
            }
            out.push(token);
        }
        out
    }

    fn text(s: &str) -> Token {
        Token::Text(s.into())
    }

    #[test]
    fn math_mode_splits_at_operators() {
        assert_eq!(
            tokens("a+bc=(x)", Mode::Math),
            vec![
                text("a"),
                text("+"),
                text("bc"),
                text("="),
                text("("),
                text("x"),
                text(")")
            ]
        );
    }

    #[test]
    fn text_mode_keeps_operators_in_runs() {
        assert_eq!(tokens("a+b=(c)", Mode::Text), vec![text("a+b=(c)")]);
    }

    #[test]
    fn whitespace_is_coalesced() {
        assert_eq!(
            tokens("a   b", Mode::Text),
            vec![text("a"), Token::Whitespace, text("b")]
        );
    }

    #[test]
    fn instructions_and_single_char_instructions() {
        assert_eq!(
            tokens(r"\alpha\{\\\,x", Mode::Math),
            vec![
                Token::Instruction("alpha".into()),
                Token::Instruction("{".into()),
                Token::Newline,
                Token::Instruction(",".into()),
                text("x")
            ]
        );
    }

    #[test]
    fn trailing_backslash_is_reported() {
        let mut lexer = Lexer::new("a\\");
        assert_eq!(lexer.next_token(Mode::Text), text("a"));
        assert_eq!(lexer.next_token(Mode::Text), Token::End);
        assert_eq!(
            lexer.take_errors(),
            vec![ParseError::UnterminatedInstruction(1)]
        );
    }

    #[test]
    fn structural_characters() {
        assert_eq!(
            tokens("{}[]_^&$~", Mode::Math),
            vec![
                Token::OpenBrace,
                Token::CloseBrace,
                Token::OpenBracket,
                Token::CloseBracket,
                Token::Underscore,
                Token::Caret,
                Token::Ampersand,
                Token::Dollar,
                Token::Tilde
            ]
        );
    }

    #[test]
    fn dashes_only_in_text_mode() {
        assert_eq!(
            tokens("a-b--c---d", Mode::Text),
            vec![
                text("a"),
                Token::Hyphen,
                text("b"),
                Token::EnDash,
                text("c"),
                Token::EmDash,
                text("d")
            ]
        );
        assert_eq!(tokens("--", Mode::Math), vec![text("-"), text("-")]);
    }

    #[test]
    fn char_codes() {
        assert_eq!(tokens("\\char\"41", Mode::Text), vec![text("A")]);
        assert_eq!(tokens("\\char'101", Mode::Text), vec![text("A")]);
        assert_eq!(tokens("\\char65", Mode::Text), vec![text("A")]);
    }

    #[test]
    fn verb_and_verbatim_environment() {
        assert_eq!(
            tokens(r"\verb|a\b|", Mode::Text),
            vec![Token::Verbatim {
                text: r"a\b".into(),
                visible_space: false
            }]
        );
        assert_eq!(
            tokens("\\begin{verbatim*}\nx y\n\\end{verbatim*}z", Mode::Text),
            vec![
                Token::Verbatim {
                    text: "x y".into(),
                    visible_space: true
                },
                text("z")
            ]
        );
    }

    #[test]
    fn unterminated_verb_is_an_error() {
        let mut lexer = Lexer::new(r"\verb|abc");
        assert_eq!(
            lexer.next_token(Mode::Text),
            Token::Verbatim {
                text: "abc".into(),
                visible_space: false
            }
        );
        assert_eq!(lexer.take_errors().len(), 1);
    }

    #[test]
    fn environments() {
        assert_eq!(
            tokens(r"\begin{pmatrix}\end{pmatrix}", Mode::Math),
            vec![
                Token::Begin("pmatrix".into()),
                Token::EndEnvironment("pmatrix".into())
            ]
        );
    }

    #[test]
    fn text_mode_accents_and_ligatures() {
        assert_eq!(tokens(r#"\"a\"{o}"#, Mode::Text), vec![text("ä"), text("ö")]);
        assert_eq!(tokens(r"\v{c}", Mode::Text), vec![text("č")]);
        assert_eq!(tokens(r"Stra\ss e", Mode::Text), vec![text("Stra"), text("ß"), text("e")]);
        // 数学模式下保持指令
        assert_eq!(
            tokens(r"\vec", Mode::Math),
            vec![Token::Instruction("vec".into())]
        );
        assert_eq!(
            tokens(r"\v x", Mode::Text),
            vec![Token::Instruction("v".into()), Token::Whitespace, text("x")]
        );
    }
}
