//! Gremlin recursive descent parser.
//!
//! Parses token streams into a [`Traversal`]. Supports chained steps with
//! string, numeric and nested-traversal arguments, enough for every query
//! the builder produces plus simple admin traversals like `g.V().count()`.

use crate::{Error, Result};
use super::ast::*;
use super::lexer::{Token, TokenKind};

/// Parser state: wraps a token slice with cursor.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        self.tokens[idx].kind
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token> {
        let tok = self.peek();
        if tok.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {:?}, got {:?} '{}'", kind, tok.kind, tok.text)))
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, msg: String) -> Error {
        Error::Syntax {
            position: self.peek().span.start,
            message: msg,
        }
    }

    fn parse_traversal(&mut self) -> Result<Traversal> {
        let anchored = self.peek().text == "g"
            && self.peek_kind() == TokenKind::Identifier
            && self.peek_kind_at(1) == TokenKind::Dot;
        if anchored {
            self.advance();
            self.advance();
        }

        let mut steps = vec![self.parse_step()?];
        while self.eat(TokenKind::Dot) {
            steps.push(self.parse_step()?);
        }
        Ok(Traversal { anchored, steps })
    }

    fn parse_step(&mut self) -> Result<Step> {
        let tok = self.expect(TokenKind::Identifier)?;
        let name = tok.text.clone();
        let position = tok.span.start;

        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.at(TokenKind::RParen) {
            args.push(self.parse_arg()?);
            while self.eat(TokenKind::Comma) {
                args.push(self.parse_arg()?);
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok(Step { name, args, position })
    }

    fn parse_arg(&mut self) -> Result<Arg> {
        match self.peek_kind() {
            TokenKind::StringLiteral => Ok(Arg::String(self.advance().text.clone())),
            TokenKind::Integer => {
                let tok = self.advance();
                let text = tok.text.clone();
                text.parse()
                    .map(Arg::Integer)
                    .map_err(|_| self.error(format!("Integer out of range: {text}")))
            }
            TokenKind::Float => {
                let tok = self.advance();
                let text = tok.text.clone();
                text.parse()
                    .map(Arg::Float)
                    .map_err(|_| self.error(format!("Invalid float: {text}")))
            }
            TokenKind::Identifier => Ok(Arg::Traversal(self.parse_traversal()?)),
            _ => {
                let tok = self.peek();
                Err(self.error(format!("Unexpected argument {:?} '{}'", tok.kind, tok.text)))
            }
        }
    }
}

/// Parse a full token stream into a single anchored traversal.
pub fn parse_traversal(tokens: &[Token]) -> Result<Traversal> {
    let mut p = Parser::new(tokens);
    let traversal = p.parse_traversal()?;
    if !p.at(TokenKind::Eof) {
        return Err(p.error(format!("Unexpected trailing input '{}'", p.peek().text)));
    }
    if !traversal.anchored {
        return Err(Error::Syntax {
            position: 0,
            message: "Traversal must start from 'g'".into(),
        });
    }
    Ok(traversal)
}
