use crate::errors::{ParseError, Pos};
use crate::golang::lexer::{Lexer, Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Str(String),
    Int(i64),
    Float(f64),
    Char(char),
    Ident(String),
    Selector { package: String, name: String },
    Composite { ty: Option<String>, elements: Vec<Element> },
    Neg(Box<Expr>),
    AddrOf(Box<Expr>),
    /// Single-argument call: a conversion like `uint8(64)` or a helper like `pointer.To(x)`.
    Call { callee: String, arg: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub kind: DeclKind,
    pub name: String,
    pub ty: Option<String>,
    pub value: Option<Expr>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceFile {
    pub package: String,
    pub imports: Vec<String>,
    pub decls: Vec<Decl>,
}

pub fn parse_file(source: &str) -> Result<SourceFile, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser { tokens, index: 0 }.file()
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // the token stream always ends with Eof
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if *self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("expected {}", kind.describe())))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Pos), ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) => Ok((name, token.pos)),
            other => Err(ParseError::new(
                token.pos,
                format!("expected identifier, found {}", other.describe()),
            )),
        }
    }

    fn unexpected(&self, context: &str) -> ParseError {
        let token = self.peek();
        ParseError::new(
            token.pos,
            format!("{}, found {}", context, token.kind.describe()),
        )
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek_kind(), TokenKind::Ident(name) if name == keyword)
    }

    fn end_of_decl(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof | TokenKind::RParen => Ok(()),
            _ => Err(self.unexpected("expected end of declaration")),
        }
    }

    fn file(mut self) -> Result<SourceFile, ParseError> {
        let mut file = SourceFile::default();

        if !self.is_keyword("package") {
            return Err(self.unexpected("expected package clause"));
        }
        self.advance();
        file.package = self.expect_ident()?.0;
        self.end_of_decl()?;

        while self.is_keyword("import") {
            self.advance();
            self.imports(&mut file.imports)?;
        }

        loop {
            match self.peek_kind().clone() {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Ident(keyword) if keyword == "var" || keyword == "const" => {
                    self.advance();
                    let kind = if keyword == "var" {
                        DeclKind::Var
                    } else {
                        DeclKind::Const
                    };
                    self.decl_group(kind, &mut file.decls)?;
                }
                TokenKind::Ident(keyword) if keyword == "func" || keyword == "type" => {
                    self.skip_decl()?;
                }
                _ => return Err(self.unexpected("expected declaration")),
            }
        }

        Ok(file)
    }

    fn imports(&mut self, imports: &mut Vec<String>) -> Result<(), ParseError> {
        if self.eat(&TokenKind::LParen) {
            while !self.eat(&TokenKind::RParen) {
                if self.eat(&TokenKind::Semicolon) {
                    continue;
                }
                imports.push(self.import_spec()?);
                self.end_of_decl()?;
            }
            self.end_of_decl()
        } else {
            imports.push(self.import_spec()?);
            self.end_of_decl()
        }
    }

    fn import_spec(&mut self) -> Result<String, ParseError> {
        // optional alias, `.` or `_`
        match self.peek_kind() {
            TokenKind::Ident(_) | TokenKind::Dot => {
                self.advance();
            }
            _ => {}
        }
        match self.advance() {
            Token {
                kind: TokenKind::Str(path),
                ..
            } => Ok(path),
            token => Err(ParseError::new(
                token.pos,
                format!("expected import path, found {}", token.kind.describe()),
            )),
        }
    }

    /// Skips a `func` or `type` declaration; neither contributes values.
    fn skip_decl(&mut self) -> Result<(), ParseError> {
        let start = self.peek().pos;
        let mut depth = 0usize;
        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| ParseError::new(token.pos, "unbalanced brackets"))?;
                }
                TokenKind::Semicolon if depth == 0 => return Ok(()),
                TokenKind::Eof => {
                    if depth == 0 {
                        return Ok(());
                    }
                    return Err(ParseError::new(start, "unterminated declaration"));
                }
                _ => {}
            }
        }
    }

    fn decl_group(&mut self, kind: DeclKind, decls: &mut Vec<Decl>) -> Result<(), ParseError> {
        if self.eat(&TokenKind::LParen) {
            while !self.eat(&TokenKind::RParen) {
                if self.eat(&TokenKind::Semicolon) {
                    continue;
                }
                self.value_spec(kind, decls)?;
                self.end_of_decl()?;
            }
            self.end_of_decl()
        } else {
            self.value_spec(kind, decls)?;
            self.end_of_decl()
        }
    }

    fn value_spec(&mut self, kind: DeclKind, decls: &mut Vec<Decl>) -> Result<(), ParseError> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }

        let ty = match self.peek_kind() {
            TokenKind::Assign | TokenKind::Semicolon | TokenKind::RParen | TokenKind::Eof => None,
            _ => Some(self.type_expr()?),
        };

        let mut values = Vec::new();
        if self.eat(&TokenKind::Assign) {
            values.push(self.expr()?);
            while self.eat(&TokenKind::Comma) {
                values.push(self.expr()?);
            }
            if values.len() != names.len() {
                return Err(ParseError::new(
                    names[0].1,
                    format!(
                        "assignment mismatch: {} names but {} values",
                        names.len(),
                        values.len()
                    ),
                ));
            }
        }

        let mut values = values.into_iter();
        for (name, pos) in names {
            decls.push(Decl {
                kind,
                name,
                ty: ty.clone(),
                value: values.next(),
                pos,
            });
        }
        Ok(())
    }

    /// Parses a type and returns its source spelling.
    fn type_expr(&mut self) -> Result<String, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Star => {
                self.advance();
                Ok(format!("*{}", self.type_expr()?))
            }
            TokenKind::LBracket => {
                self.advance();
                let len = match self.peek_kind().clone() {
                    TokenKind::Int(n) => {
                        self.advance();
                        n.to_string()
                    }
                    _ => String::new(),
                };
                self.expect(TokenKind::RBracket)?;
                Ok(format!("[{}]{}", len, self.type_expr()?))
            }
            TokenKind::Ident(name) if name == "map" => {
                self.advance();
                self.expect(TokenKind::LBracket)?;
                let key = self.type_expr()?;
                self.expect(TokenKind::RBracket)?;
                Ok(format!("map[{}]{}", key, self.type_expr()?))
            }
            TokenKind::Ident(name) if name == "struct" || name == "interface" || name == "func" => {
                Err(self.unexpected("anonymous types are not supported"))
            }
            TokenKind::Ident(_) => {
                let (name, _) = self.expect_ident()?;
                if self.eat(&TokenKind::Dot) {
                    let (member, _) = self.expect_ident()?;
                    Ok(format!("{}.{}", name, member))
                } else {
                    Ok(name)
                }
            }
            _ => Err(self.unexpected("expected type")),
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        let pos = token.pos;
        let kind = match token.kind {
            TokenKind::Str(value) => {
                self.advance();
                ExprKind::Str(value)
            }
            TokenKind::Int(value) => {
                self.advance();
                ExprKind::Int(value)
            }
            TokenKind::Float(value) => {
                self.advance();
                ExprKind::Float(value)
            }
            TokenKind::Char(value) => {
                self.advance();
                ExprKind::Char(value)
            }
            TokenKind::Amp => {
                self.advance();
                ExprKind::AddrOf(Box::new(self.expr()?))
            }
            TokenKind::Minus => {
                self.advance();
                ExprKind::Neg(Box::new(self.expr()?))
            }
            TokenKind::Plus => {
                self.advance();
                return self.expr();
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBrace => self.composite(None)?,
            TokenKind::LBracket => {
                let ty = self.type_expr()?;
                self.composite(Some(ty))?
            }
            TokenKind::Ident(name) if name == "map" => {
                let ty = self.type_expr()?;
                self.composite(Some(ty))?
            }
            TokenKind::Ident(name) if name == "func" => {
                return Err(self.unexpected("function literals are not supported"));
            }
            TokenKind::Ident(name) => {
                self.advance();
                let (package, name) = if self.eat(&TokenKind::Dot) {
                    (Some(name), self.expect_ident()?.0)
                } else {
                    (None, name)
                };
                let spelled = match &package {
                    Some(package) => format!("{}.{}", package, name),
                    None => name.clone(),
                };
                match self.peek_kind() {
                    TokenKind::LBrace => self.composite(Some(spelled))?,
                    TokenKind::LParen => self.call(spelled)?,
                    _ => match package {
                        Some(package) => ExprKind::Selector { package, name },
                        None => ExprKind::Ident(name),
                    },
                }
            }
            _ => return Err(self.unexpected("expected expression")),
        };
        Ok(Expr { kind, pos })
    }

    fn call(&mut self, callee: String) -> Result<ExprKind, ParseError> {
        self.expect(TokenKind::LParen)?;
        let arg = self.expr()?;
        self.eat(&TokenKind::Comma);
        if *self.peek_kind() != TokenKind::RParen {
            return Err(self.unexpected(&format!(
                "only single-argument calls are supported in `{}`",
                callee
            )));
        }
        self.advance();
        Ok(ExprKind::Call {
            callee,
            arg: Box::new(arg),
        })
    }

    fn composite(&mut self, ty: Option<String>) -> Result<ExprKind, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut elements = Vec::new();
        loop {
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            let first = self.expr()?;
            let element = if self.eat(&TokenKind::Colon) {
                Element {
                    key: Some(first),
                    value: self.expr()?,
                }
            } else {
                Element {
                    key: None,
                    value: first,
                }
            };
            elements.push(element);

            if self.eat(&TokenKind::Comma) {
                continue;
            }
            if *self.peek_kind() == TokenKind::Semicolon {
                return Err(self.unexpected("missing `,` before newline in composite literal"));
            }
            self.expect(TokenKind::RBrace)?;
            break;
        }
        Ok(ExprKind::Composite { ty, elements })
    }
}
