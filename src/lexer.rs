use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Identifier(String),
    Keyword(Keyword),

    NumericLiteral(f64),
    StringLiteral(String),

    // Punctuators
    LeftBrace,          // {
    RightBrace,         // }
    LeftParen,          // (
    RightParen,         // )
    LeftBracket,        // [
    RightBracket,       // ]
    Dot,                // .
    Semicolon,          // ;
    Comma,              // ,
    LessThan,           // <
    GreaterThan,        // >
    LessThanEqual,      // <=
    GreaterThanEqual,   // >=
    Equal,              // ==
    NotEqual,           // !=
    Plus,               // +
    Minus,              // -
    Star,               // *
    Slash,              // /
    Percent,            // %
    Increment,          // ++
    Decrement,          // --
    LeftShift,          // <<
    RightShift,         // >>
    UnsignedRightShift, // >>>
    Ampersand,          // &
    Pipe,               // |
    Caret,              // ^
    Bang,               // !
    Tilde,              // ~
    LogicalAnd,         // &&
    LogicalOr,          // ||
    Question,           // ?
    Colon,              // :
    Assign,             // =
    PlusAssign,         // +=
    MinusAssign,        // -=
    StarAssign,         // *=
    SlashAssign,        // /=
    PercentAssign,      // %=
    LeftShiftAssign,    // <<=
    RightShiftAssign,   // >>=
    UnsignedRightShiftAssign, // >>>=
    AmpersandAssign,    // &=
    PipeAssign,         // |=
    CaretAssign,        // ^=

    Eof,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    Break,
    Continue,
    Delete,
    Else,
    False,
    For,
    Function,
    If,
    New,
    Null,
    Return,
    True,
    Typeof,
    Undefined,
    Var,
    Void,
    While,
}

fn keyword_of(word: &str) -> Option<Keyword> {
    Some(match word {
        "break" => Keyword::Break,
        "continue" => Keyword::Continue,
        "delete" => Keyword::Delete,
        "else" => Keyword::Else,
        "false" => Keyword::False,
        "for" => Keyword::For,
        "function" => Keyword::Function,
        "if" => Keyword::If,
        "new" => Keyword::New,
        "null" => Keyword::Null,
        "return" => Keyword::Return,
        "true" => Keyword::True,
        "typeof" => Keyword::Typeof,
        "undefined" => Keyword::Undefined,
        "var" => Keyword::Var,
        "void" => Keyword::Void,
        "while" => Keyword::While,
        _ => return None,
    })
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "identifier '{name}'"),
            Token::Keyword(k) => write!(f, "'{k:?}'"),
            Token::NumericLiteral(n) => write!(f, "number {n}"),
            Token::StringLiteral(s) => write!(f, "string {s:?}"),
            Token::Eof => write!(f, "end of input"),
            other => write!(f, "'{other:?}'"),
        }
    }
}

#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub position: usize,
}

pub struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
    token_start: usize,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            len: source.len(),
            token_start: 0,
            offset: 0,
        }
    }

    /// Byte offset where the most recent token begins.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Byte offset just past the most recent token.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let (i, c) = self.chars.next()?;
        self.offset = i + c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> LexError {
        LexError {
            message: message.into(),
            position: self.offset,
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    // Only consume if it introduces a comment
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.peek().map(|&(_, c)| c) {
                        Some('/') => {
                            while let Some(c) = self.peek() {
                                if c == '\n' {
                                    break;
                                }
                                self.bump();
                            }
                        }
                        Some('*') => {
                            self.bump();
                            self.bump();
                            let mut closed = false;
                            while let Some(c) = self.bump() {
                                if c == '*' && self.eat('/') {
                                    closed = true;
                                    break;
                                }
                            }
                            if !closed {
                                return Err(self.error("unterminated block comment"));
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;
        self.token_start = self.chars.peek().map_or(self.len, |&(i, _)| i);
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let token = match c {
            '{' => Token::LeftBrace,
            '}' => Token::RightBrace,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            ';' => Token::Semicolon,
            ',' => Token::Comma,
            '~' => Token::Tilde,
            '?' => Token::Question,
            ':' => Token::Colon,
            '.' => {
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    return self.scan_number('.');
                }
                Token::Dot
            }
            '<' => {
                if self.eat('<') {
                    if self.eat('=') {
                        Token::LeftShiftAssign
                    } else {
                        Token::LeftShift
                    }
                } else if self.eat('=') {
                    Token::LessThanEqual
                } else {
                    Token::LessThan
                }
            }
            '>' => {
                if self.eat('>') {
                    if self.eat('>') {
                        if self.eat('=') {
                            Token::UnsignedRightShiftAssign
                        } else {
                            Token::UnsignedRightShift
                        }
                    } else if self.eat('=') {
                        Token::RightShiftAssign
                    } else {
                        Token::RightShift
                    }
                } else if self.eat('=') {
                    Token::GreaterThanEqual
                } else {
                    Token::GreaterThan
                }
            }
            '=' => {
                if self.eat('=') {
                    Token::Equal
                } else {
                    Token::Assign
                }
            }
            '!' => {
                if self.eat('=') {
                    Token::NotEqual
                } else {
                    Token::Bang
                }
            }
            '+' => {
                if self.eat('+') {
                    Token::Increment
                } else if self.eat('=') {
                    Token::PlusAssign
                } else {
                    Token::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    Token::Decrement
                } else if self.eat('=') {
                    Token::MinusAssign
                } else {
                    Token::Minus
                }
            }
            '*' => {
                if self.eat('=') {
                    Token::StarAssign
                } else {
                    Token::Star
                }
            }
            '/' => {
                if self.eat('=') {
                    Token::SlashAssign
                } else {
                    Token::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    Token::PercentAssign
                } else {
                    Token::Percent
                }
            }
            '&' => {
                if self.eat('&') {
                    Token::LogicalAnd
                } else if self.eat('=') {
                    Token::AmpersandAssign
                } else {
                    Token::Ampersand
                }
            }
            '|' => {
                if self.eat('|') {
                    Token::LogicalOr
                } else if self.eat('=') {
                    Token::PipeAssign
                } else {
                    Token::Pipe
                }
            }
            '^' => {
                if self.eat('=') {
                    Token::CaretAssign
                } else {
                    Token::Caret
                }
            }
            '"' | '\'' => return self.scan_string(c),
            c if c.is_ascii_digit() => return self.scan_number(c),
            c if is_identifier_start(c) => {
                let mut word = String::new();
                word.push(c);
                while let Some(n) = self.peek() {
                    if !is_identifier_part(n) {
                        break;
                    }
                    word.push(n);
                    self.bump();
                }
                match keyword_of(&word) {
                    Some(k) => Token::Keyword(k),
                    None => Token::Identifier(word),
                }
            }
            other => return Err(self.error(format!("unexpected character {other:?}"))),
        };
        Ok(token)
    }

    fn scan_number(&mut self, first: char) -> Result<Token, LexError> {
        let mut text = String::new();
        text.push(first);

        if first == '0' && self.peek().is_some_and(|c| c == 'x' || c == 'X') {
            self.bump();
            let mut digits = String::new();
            while let Some(c) = self.peek() {
                if !c.is_ascii_hexdigit() {
                    break;
                }
                digits.push(c);
                self.bump();
            }
            if digits.is_empty() {
                return Err(self.error("missing digits in hex literal"));
            }
            let value = u64::from_str_radix(&digits, 16)
                .map_err(|_| self.error("hex literal out of range"))?;
            return Ok(Token::NumericLiteral(value as f64));
        }

        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.bump();
        }
        if first != '.' && self.peek() == Some('.') {
            text.push('.');
            self.bump();
            while let Some(c) = self.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                text.push(c);
                self.bump();
            }
        }
        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            text.push('e');
            self.bump();
            if let Some(sign) = self.peek()
                && (sign == '+' || sign == '-')
            {
                text.push(sign);
                self.bump();
            }
            let mut has_digit = false;
            while let Some(c) = self.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                has_digit = true;
                text.push(c);
                self.bump();
            }
            if !has_digit {
                return Err(self.error("missing digits in exponent"));
            }
        }

        text.parse::<f64>()
            .map(Token::NumericLiteral)
            .map_err(|_| self.error(format!("invalid numeric literal {text:?}")))
    }

    fn scan_string(&mut self, quote: char) -> Result<Token, LexError> {
        let mut value = String::new();
        loop {
            let c = self
                .bump()
                .ok_or_else(|| self.error("unterminated string literal"))?;
            if c == quote {
                break;
            }
            if c == '\n' {
                return Err(self.error("unterminated string literal"));
            }
            if c != '\\' {
                value.push(c);
                continue;
            }
            let escaped = self
                .bump()
                .ok_or_else(|| self.error("unterminated string literal"))?;
            match escaped {
                'b' => value.push('\u{0008}'),
                't' => value.push('\t'),
                'n' => value.push('\n'),
                'f' => value.push('\u{000C}'),
                'r' => value.push('\r'),
                'x' => value.push(self.scan_hex_escape(2)?),
                'u' => value.push(self.scan_hex_escape(4)?),
                other => value.push(other),
            }
        }
        Ok(Token::StringLiteral(value))
    }

    fn scan_hex_escape(&mut self, digits: u32) -> Result<char, LexError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let c = self
                .bump()
                .ok_or_else(|| self.error("unterminated string literal"))?;
            let d = c
                .to_digit(16)
                .ok_or_else(|| self.error(format!("invalid hex escape digit {c:?}")))?;
            code = code * 16 + d;
        }
        char::from_u32(code).ok_or_else(|| self.error("invalid character escape"))
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
