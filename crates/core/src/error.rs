use std::fmt;

use crate::lexer::{Position, TokenKind};

/// Coarse classification of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Token,
    AttributeValue,
    NestingTooDeep,
    Stream,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "lexical",
            ErrorKind::Token => "token",
            ErrorKind::AttributeValue => "attribute_value",
            ErrorKind::NestingTooDeep => "nesting_too_deep",
            ErrorKind::Stream => "stream",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendered list of acceptable token kinds, used in error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expected(pub Vec<TokenKind>);

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", kind)?;
        }
        Ok(())
    }
}

/// Every way a parse can fail. All variants abort the in-flight parse.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Malformed literal, bad number, invalid UTF-8 or unterminated block.
    #[error("{message} at {position}")]
    Lexical { message: String, position: Position },

    /// A token of the wrong kind at a structural grammar position.
    #[error("unexpected token {found} [{value}] at {position}, expecting one of ({expected})")]
    UnexpectedToken {
        found: TokenKind,
        value: String,
        expected: Expected,
        position: Position,
    },

    /// A token that cannot start an attribute value.
    #[error("invalid attribute value {found} [{value}] at {position}, expecting one of ({expected})")]
    InvalidAttributeValue {
        found: TokenKind,
        value: String,
        expected: Expected,
        position: Position,
    },

    /// Elements or arrays nested beyond the configured limit.
    #[error("nesting deeper than {limit} levels at {position}")]
    NestingTooDeep { limit: usize, position: Position },

    /// The backing store could not be opened or read.
    #[error("{context}: {source}")]
    Stream {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    pub fn lexical(position: Position, message: impl Into<String>) -> Self {
        ParseError::Lexical {
            message: message.into(),
            position,
        }
    }

    pub fn stream(context: impl Into<String>, source: std::io::Error) -> Self {
        ParseError::Stream {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Lexical { .. } => ErrorKind::Lexical,
            ParseError::UnexpectedToken { .. } => ErrorKind::Token,
            ParseError::InvalidAttributeValue { .. } => ErrorKind::AttributeValue,
            ParseError::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
            ParseError::Stream { .. } => ErrorKind::Stream,
        }
    }

    /// True for both structural token errors and attribute-value errors;
    /// the latter are a refinement of the former.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            ParseError::UnexpectedToken { .. } | ParseError::InvalidAttributeValue { .. }
        )
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Lexical { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::InvalidAttributeValue { position, .. }
            | ParseError::NestingTooDeep { position, .. } => Some(*position),
            ParseError::Stream { .. } => None,
        }
    }

    /// Machine-readable rendering: `{kind, message, line, column}`.
    /// Position fields are null for stream errors.
    pub fn to_json_value(&self) -> serde_json::Value {
        let position = self.position();
        serde_json::json!({
            "column":  position.map(|p| p.column),
            "kind":    self.kind().as_str(),
            "line":    position.map(|p| p.line),
            "message": self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unexpected(kind: TokenKind) -> ParseError {
        ParseError::UnexpectedToken {
            found: kind,
            value: String::new(),
            expected: Expected(vec![TokenKind::Comma, TokenKind::CurlyBracketOpen]),
            position: Position::new(3, 7),
        }
    }

    #[test]
    fn message_lists_expected_kinds() {
        let err = unexpected(TokenKind::Identifier);
        assert_eq!(
            err.to_string(),
            "unexpected token IDENTIFIER [] at 3:7, expecting one of (COMMA, CURLY_BRACKET_OPEN)"
        );
    }

    #[test]
    fn attribute_value_error_is_a_token_error() {
        let err = ParseError::InvalidAttributeValue {
            found: TokenKind::Comma,
            value: String::new(),
            expected: Expected(vec![TokenKind::Number]),
            position: Position::new(1, 1),
        };
        assert!(err.is_token_error());
        assert_eq!(err.kind(), ErrorKind::AttributeValue);
        assert!(!ParseError::lexical(Position::new(1, 1), "x").is_token_error());
    }

    #[test]
    fn json_rendering_includes_position() {
        let json = unexpected(TokenKind::Equal).to_json_value();
        assert_eq!(json["kind"], "token");
        assert_eq!(json["line"], 3);
        assert_eq!(json["column"], 7);
    }

    #[test]
    fn stream_error_has_no_position() {
        let err = ParseError::stream(
            "failed to open missing.tdoc",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.position(), None);
        assert!(err.to_json_value()["line"].is_null());
        assert_eq!(err.to_string(), "failed to open missing.tdoc: no such file");
    }
}
