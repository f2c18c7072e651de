use std::iter::Peekable;
use std::str::Chars;

use crate::errors::{ParseError, Pos};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Char(char),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Assign,
    Amp,
    Star,
    Minus,
    Plus,
    /// Any other Go operator. Only ever valid inside skipped declarations.
    Op(char),
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier `{}`", name),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Int(_) | TokenKind::Float(_) => "number".to_string(),
            TokenKind::Char(_) => "rune literal".to_string(),
            TokenKind::LBrace => "`{`".to_string(),
            TokenKind::RBrace => "`}`".to_string(),
            TokenKind::LBracket => "`[`".to_string(),
            TokenKind::RBracket => "`]`".to_string(),
            TokenKind::LParen => "`(`".to_string(),
            TokenKind::RParen => "`)`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::Colon => "`:`".to_string(),
            TokenKind::Semicolon => "`;`".to_string(),
            TokenKind::Dot => "`.`".to_string(),
            TokenKind::Assign => "`=`".to_string(),
            TokenKind::Amp => "`&`".to_string(),
            TokenKind::Star => "`*`".to_string(),
            TokenKind::Minus => "`-`".to_string(),
            TokenKind::Plus => "`+`".to_string(),
            TokenKind::Op(c) => format!("operator `{}`", c),
            TokenKind::Eof => "end of file".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

/// Splits Go source into tokens, inserting semicolons at line ends the way
/// the Go compiler does.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    last: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            last: None,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            self.last = Some(token.kind.clone());
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn wants_semicolon(&self) -> bool {
        matches!(
            self.last,
            Some(
                TokenKind::Ident(_)
                    | TokenKind::Str(_)
                    | TokenKind::Int(_)
                    | TokenKind::Float(_)
                    | TokenKind::Char(_)
                    | TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::RBrace
            )
        )
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            let pos = self.pos();
            let Some(&c) = self.chars.peek() else {
                if self.wants_semicolon() {
                    return Ok(Token {
                        kind: TokenKind::Semicolon,
                        pos,
                    });
                }
                return Ok(Token {
                    kind: TokenKind::Eof,
                    pos,
                });
            };

            match c {
                '\n' => {
                    self.bump();
                    if self.wants_semicolon() {
                        return Ok(Token {
                            kind: TokenKind::Semicolon,
                            pos,
                        });
                    }
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' => {
                    self.bump();
                    match self.chars.peek() {
                        Some('/') => {
                            while let Some(&c) = self.chars.peek() {
                                if c == '\n' {
                                    break;
                                }
                                self.bump();
                            }
                        }
                        Some('*') => {
                            self.bump();
                            let newline = self.skip_block_comment(pos)?;
                            if newline && self.wants_semicolon() {
                                return Ok(Token {
                                    kind: TokenKind::Semicolon,
                                    pos,
                                });
                            }
                        }
                        _ => {
                            return Ok(Token {
                                kind: TokenKind::Op('/'),
                                pos,
                            })
                        }
                    }
                }
                '"' => {
                    self.bump();
                    let value = self.interpreted_string(pos)?;
                    return Ok(Token {
                        kind: TokenKind::Str(value),
                        pos,
                    });
                }
                '`' => {
                    self.bump();
                    let value = self.raw_string(pos)?;
                    return Ok(Token {
                        kind: TokenKind::Str(value),
                        pos,
                    });
                }
                '\'' => {
                    self.bump();
                    let value = self.rune(pos)?;
                    return Ok(Token {
                        kind: TokenKind::Char(value),
                        pos,
                    });
                }
                c if c.is_ascii_digit() || (c == '.' && self.digit_follows()) => {
                    let kind = self.number(pos)?;
                    return Ok(Token { kind, pos });
                }
                c if c == '_' || c.is_alphabetic() => {
                    let mut name = String::new();
                    while let Some(&c) = self.chars.peek() {
                        if c == '_' || c.is_alphanumeric() {
                            name.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    return Ok(Token {
                        kind: TokenKind::Ident(name),
                        pos,
                    });
                }
                _ => {
                    self.bump();
                    let kind = match c {
                        '{' => TokenKind::LBrace,
                        '}' => TokenKind::RBrace,
                        '[' => TokenKind::LBracket,
                        ']' => TokenKind::RBracket,
                        '(' => TokenKind::LParen,
                        ')' => TokenKind::RParen,
                        ',' => TokenKind::Comma,
                        ':' => TokenKind::Colon,
                        ';' => TokenKind::Semicolon,
                        '.' => TokenKind::Dot,
                        '=' => TokenKind::Assign,
                        '&' => TokenKind::Amp,
                        '*' => TokenKind::Star,
                        '-' => TokenKind::Minus,
                        '+' => TokenKind::Plus,
                        '!' | '<' | '>' | '|' | '%' | '^' | '~' => TokenKind::Op(c),
                        other => {
                            return Err(ParseError::new(
                                pos,
                                format!("unexpected character `{}`", other),
                            ))
                        }
                    };
                    return Ok(Token { kind, pos });
                }
            }
        }
    }

    /// Whether the character after the current one is a decimal digit, as in `.5`.
    fn digit_follows(&self) -> bool {
        self.chars
            .clone()
            .nth(1)
            .is_some_and(|c| c.is_ascii_digit())
    }

    /// Returns whether the comment spanned a newline.
    fn skip_block_comment(&mut self, start: Pos) -> Result<bool, ParseError> {
        let mut newline = false;
        loop {
            match self.bump() {
                Some('*') if self.chars.peek() == Some(&'/') => {
                    self.bump();
                    return Ok(newline);
                }
                Some('\n') => newline = true,
                Some(_) => {}
                None => return Err(ParseError::new(start, "unterminated block comment")),
            }
        }
    }

    fn raw_string(&mut self, start: Pos) -> Result<String, ParseError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('`') => return Ok(value),
                // carriage returns are discarded from raw strings
                Some('\r') => {}
                Some(c) => value.push(c),
                None => return Err(ParseError::new(start, "unterminated raw string")),
            }
        }
    }

    /// `\x` and octal escapes are single bytes, so the literal is assembled as
    /// bytes. Invalid UTF-8 becomes U+FFFD, as Go's JSON encoder does.
    fn interpreted_string(&mut self, start: Pos) -> Result<String, ParseError> {
        let mut bytes = Vec::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
                Some('\\') => match self.escape('"')? {
                    Escape::Byte(b) => bytes.push(b),
                    Escape::Char(c) => push_char(&mut bytes, c),
                },
                Some('\n') | None => {
                    return Err(ParseError::new(start, "unterminated string literal"))
                }
                Some(c) => push_char(&mut bytes, c),
            }
        }
    }

    fn rune(&mut self, start: Pos) -> Result<char, ParseError> {
        let value = match self.bump() {
            Some('\\') => match self.escape('\'')? {
                Escape::Byte(b) => char::from(b),
                Escape::Char(c) => c,
            },
            Some('\'') | Some('\n') | None => {
                return Err(ParseError::new(start, "empty or unterminated rune literal"))
            }
            Some(c) => c,
        };
        match self.bump() {
            Some('\'') => Ok(value),
            _ => Err(ParseError::new(start, "rune literal has more than one character")),
        }
    }

    fn escape(&mut self, quote: char) -> Result<Escape, ParseError> {
        let pos = self.pos();
        let c = self
            .bump()
            .ok_or_else(|| ParseError::new(pos, "unterminated escape sequence"))?;
        let value = match c {
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0B}',
            '\\' => '\\',
            c if c == quote => c,
            'x' => return self.digits(pos, 2, 16).map(|b| Escape::Byte(b as u8)),
            'u' => self.code_point(pos, 4)?,
            'U' => self.code_point(pos, 8)?,
            '0'..='7' => {
                let rest = self.digits(pos, 2, 8)?;
                let value = (c as u32 - '0' as u32) * 64 + rest;
                let byte = u8::try_from(value)
                    .map_err(|_| ParseError::new(pos, "octal escape value > 255"))?;
                return Ok(Escape::Byte(byte));
            }
            other => {
                return Err(ParseError::new(
                    pos,
                    format!("unknown escape sequence `\\{}`", other),
                ))
            }
        };
        Ok(Escape::Char(value))
    }

    fn digits(&mut self, pos: Pos, count: usize, radix: u32) -> Result<u32, ParseError> {
        let mut value = 0u32;
        for _ in 0..count {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(radix))
                .ok_or_else(|| ParseError::new(pos, "malformed escape sequence"))?;
            value = value * radix + digit;
        }
        Ok(value)
    }

    fn code_point(&mut self, pos: Pos, count: usize) -> Result<char, ParseError> {
        let value = self.digits(pos, count, 16)?;
        char::from_u32(value).ok_or_else(|| ParseError::new(pos, "escape is not a valid code point"))
    }

    fn number(&mut self, pos: Pos) -> Result<TokenKind, ParseError> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                text.push(c);
                self.bump();
            } else if (c == '+' || c == '-') && text.ends_with(['e', 'E']) && !is_prefixed(&text)
            {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let digits: String = text.chars().filter(|&c| c != '_').collect();
        let lower = digits.to_ascii_lowercase();
        let parsed = if let Some(hex) = lower.strip_prefix("0x") {
            i64::from_str_radix(hex, 16).map(TokenKind::Int).ok()
        } else if let Some(bin) = lower.strip_prefix("0b") {
            i64::from_str_radix(bin, 2).map(TokenKind::Int).ok()
        } else if let Some(oct) = lower.strip_prefix("0o") {
            i64::from_str_radix(oct, 8).map(TokenKind::Int).ok()
        } else if lower.contains(['.', 'e']) {
            lower.parse::<f64>().map(TokenKind::Float).ok()
        } else if lower.len() > 1 && lower.starts_with('0') {
            i64::from_str_radix(&lower[1..], 8).map(TokenKind::Int).ok()
        } else {
            lower.parse::<i64>().map(TokenKind::Int).ok()
        };

        parsed.ok_or_else(|| ParseError::new(pos, format!("malformed number `{}`", text)))
    }
}

enum Escape {
    Byte(u8),
    Char(char),
}

fn push_char(bytes: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn is_prefixed(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.starts_with("0x") || lower.starts_with("0b") || lower.starts_with("0o")
}
