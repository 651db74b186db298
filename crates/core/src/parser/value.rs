use super::helpers::ErrorClass;
use super::Parser;
use crate::ast::Value;
use crate::error::ParseError;
use crate::lexer::{Number, Payload, Token, TokenKind};
use crate::source::InputStream;

/// Token kinds that may start an attribute value.
pub(super) const VALUE_START: [TokenKind; 6] = [
    TokenKind::Identifier,
    TokenKind::String,
    TokenKind::Boolean,
    TokenKind::Null,
    TokenKind::Number,
    TokenKind::SquareBracketOpen,
];

impl<S: InputStream> Parser<S> {
    // -- Value parsing ------------------------------------------

    /// Parse one value at the current token, leaving the parser on the token
    /// after it.
    pub(super) fn parse_value(&mut self) -> Result<Value, ParseError> {
        self.expect_as(&VALUE_START, ErrorClass::AttributeValue)?;
        if self.peek().is(TokenKind::SquareBracketOpen) {
            return self.parse_array();
        }
        let token = self.advance()?;
        scalar_value(token)
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        let open = self.advance()?;
        self.enter(open.position)?;
        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::SquareBracketClose => break,
                TokenKind::EndOfToken => self.expect(&[TokenKind::SquareBracketClose])?,
                _ => {}
            }
            items.push(self.parse_value()?);
            self.expect(&[TokenKind::Comma, TokenKind::SquareBracketClose])?;
            self.skip_optional_comma()?;
        }
        self.advance()?;
        self.leave();
        Ok(Value::Array(items))
    }
}

fn scalar_value(token: Token) -> Result<Value, ParseError> {
    let Token {
        kind,
        value,
        position,
    } = token;
    match (kind, value) {
        (TokenKind::Null, _) => Ok(Value::Null),
        (TokenKind::Boolean, Some(Payload::Bool(b))) => Ok(Value::Boolean(b)),
        (TokenKind::String, Some(Payload::Text(s))) => Ok(Value::String(s)),
        (TokenKind::Identifier, Some(Payload::Text(s))) => Ok(Value::ConstantReference(s)),
        (TokenKind::Number, Some(Payload::Number(literal))) => Number::parse(&literal)
            .map(Value::from)
            .ok_or_else(|| {
                ParseError::lexical(position, format!("invalid number literal '{}'", literal))
            }),
        (kind, value) => Err(ParseError::lexical(
            position,
            format!("malformed {} token {:?}", kind, value),
        )),
    }
}
