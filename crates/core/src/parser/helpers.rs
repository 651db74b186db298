//! Token-level utilities shared by every grammar rule.
//!
//! These operate on an explicit lexer handle and hold no state of their own.

use crate::error::{Expected, ParseError};
use crate::lexer::{Lexer, Payload, Token, TokenKind};
use crate::source::InputStream;

/// Which error to raise when a token does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Structural position: [`ParseError::UnexpectedToken`]
    Token,
    /// Value position: [`ParseError::InvalidAttributeValue`]
    AttributeValue,
}

/// Pull tokens until one is not a comment.
pub fn next_significant_token<S: InputStream>(lexer: &mut Lexer<S>) -> Result<Token, ParseError> {
    loop {
        let token = lexer.next_token()?;
        if !token.is(TokenKind::Comment) {
            return Ok(token);
        }
    }
}

/// If `token` is a comma, return the token after it; otherwise `token` itself.
pub fn skip_optional_comma<S: InputStream>(
    lexer: &mut Lexer<S>,
    token: Token,
) -> Result<Token, ParseError> {
    if token.is(TokenKind::Comma) {
        next_significant_token(lexer)
    } else {
        Ok(token)
    }
}

pub fn expect_one_of(
    token: &Token,
    allowed: &[TokenKind],
    class: ErrorClass,
) -> Result<(), ParseError> {
    if allowed.contains(&token.kind) {
        return Ok(());
    }
    let found = token.kind;
    let value = token.value_display();
    let expected = Expected(allowed.to_vec());
    let position = token.position;
    Err(match class {
        ErrorClass::Token => ParseError::UnexpectedToken {
            found,
            value,
            expected,
            position,
        },
        ErrorClass::AttributeValue => ParseError::InvalidAttributeValue {
            found,
            value,
            expected,
            position,
        },
    })
}

/// Text payload of an identifier, string or block token.
pub(crate) fn into_text(token: Token) -> String {
    match token.value {
        Some(Payload::Text(s)) | Some(Payload::Number(s)) => s,
        Some(Payload::Bool(b)) => b.to_string(),
        None => String::new(),
    }
}
