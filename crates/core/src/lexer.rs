use std::collections::VecDeque;
use std::fmt;

use crate::error::ParseError;
use crate::source::InputStream;

/// 1-based line and column (in characters) of a point in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Placeholder before the first token has been read
    StartOfToken,
    /// End of input
    EndOfToken,
    // Punctuation
    Comma,
    Equal,
    CurlyBracketOpen,
    CurlyBracketClose,
    RoundBracketOpen,
    RoundBracketClose,
    SquareBracketOpen,
    SquareBracketClose,
    /// `# ...` up to the end of the line
    Comment,
    Identifier,
    Null,
    Boolean,
    /// Numeric literal, kept as written
    Number,
    /// Double-quoted string with escapes resolved
    String,
    /// Triple-quoted raw block
    NowdocString,
    /// Triple-backtick block with optional language tag
    EmbeddedSourceCode,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::StartOfToken => "START_OF_TOKEN",
            TokenKind::EndOfToken => "END_OF_TOKEN",
            TokenKind::Comma => "COMMA",
            TokenKind::Equal => "EQUAL",
            TokenKind::CurlyBracketOpen => "CURLY_BRACKET_OPEN",
            TokenKind::CurlyBracketClose => "CURLY_BRACKET_CLOSE",
            TokenKind::RoundBracketOpen => "ROUND_BRACKET_OPEN",
            TokenKind::RoundBracketClose => "ROUND_BRACKET_CLOSE",
            TokenKind::SquareBracketOpen => "SQUARE_BRACKET_OPEN",
            TokenKind::SquareBracketClose => "SQUARE_BRACKET_CLOSE",
            TokenKind::Comment => "COMMENT",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Null => "NULL_VALUE",
            TokenKind::Boolean => "BOOLEAN_VALUE",
            TokenKind::Number => "NUMBER_VALUE",
            TokenKind::String => "STRING_VALUE",
            TokenKind::NowdocString => "NOWDOC_STRING_VALUE",
            TokenKind::EmbeddedSourceCode => "EMBEDDED_SOURCE_CODE",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token payload; which variant appears depends on the token kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Identifier name, string/raw/embedded content, or comment text
    Text(String),
    Bool(bool),
    /// Number literal exactly as written
    Number(String),
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Text(s) | Payload::Number(s) => f.write_str(s),
            Payload::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<Payload>,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, value: Option<Payload>, position: Position) -> Self {
        Token {
            kind,
            value,
            position,
        }
    }

    /// The sentinel a parser holds before its first fetch.
    pub fn start() -> Self {
        Token::new(TokenKind::StartOfToken, None, Position::default())
    }

    fn punct(kind: TokenKind, position: Position) -> Self {
        Token::new(kind, None, position)
    }

    fn text(kind: TokenKind, text: String, position: Position) -> Self {
        Token::new(kind, Some(Payload::Text(text)), position)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Payload rendered for diagnostics; empty when there is none.
    pub fn value_display(&self) -> String {
        self.value.as_ref().map(|v| v.to_string()).unwrap_or_default()
    }
}

/// Interpreted numeric literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Interpret a well-formed literal: a `.` or exponent makes it a float.
    /// Returns `None` for malformed or out-of-range literals.
    pub fn parse(literal: &str) -> Option<Number> {
        if !is_well_formed_number(literal) {
            return None;
        }
        if literal.contains(['.', 'e', 'E']) {
            let f: f64 = literal.parse().ok()?;
            f.is_finite().then_some(Number::Float(f))
        } else {
            literal.parse().ok().map(Number::Integer)
        }
    }
}

/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`
fn is_well_formed_number(literal: &str) -> bool {
    let bytes = literal.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - start
    };

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_digits = digits(&mut i);
    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        frac_digits = digits(&mut i);
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        if digits(&mut i) == 0 {
            return false;
        }
    }
    i == bytes.len()
}

fn is_skip_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E')
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Character-level scanner over a refillable buffer.
///
/// The lexer pulls chunks from its [`InputStream`] whenever the buffer runs
/// dry and decodes UTF-8 incrementally, so a character split across chunk
/// boundaries is reassembled. One lexer serves exactly one parse.
pub struct Lexer<S> {
    stream: S,
    buffer: VecDeque<char>,
    /// Undecoded tail of the last chunk (an incomplete UTF-8 sequence)
    pending: Vec<u8>,
    /// Set once decoding fails; nothing after the failure is decoded
    decode_error: Option<&'static str>,
    line: u32,
    column: u32,
}

impl<S: InputStream> Lexer<S> {
    pub fn new(stream: S) -> Self {
        Lexer {
            stream,
            buffer: VecDeque::new(),
            pending: Vec::new(),
            decode_error: None,
            line: 1,
            column: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// The character under the cursor, without consuming it.
    pub fn current(&mut self) -> Result<Option<char>, ParseError> {
        self.peek_char(0)
    }

    /// Produce the next token. Comments are returned as tokens; end of input
    /// yields `EndOfToken` on every further call.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        while let Some(c) = self.peek_char(0)? {
            if !is_skip_char(c) {
                break;
            }
            self.bump()?;
        }

        let position = self.position();
        let Some(c) = self.bump()? else {
            return Ok(Token::punct(TokenKind::EndOfToken, position));
        };

        let token = match c {
            '[' => Token::punct(TokenKind::SquareBracketOpen, position),
            ']' => Token::punct(TokenKind::SquareBracketClose, position),
            '{' => Token::punct(TokenKind::CurlyBracketOpen, position),
            '}' => Token::punct(TokenKind::CurlyBracketClose, position),
            '(' => Token::punct(TokenKind::RoundBracketOpen, position),
            ')' => Token::punct(TokenKind::RoundBracketClose, position),
            '=' => Token::punct(TokenKind::Equal, position),
            ',' => Token::punct(TokenKind::Comma, position),
            '#' => self.comment(position)?,
            '"' => self.string(position)?,
            '`' => self.embedded_source(position)?,
            '0'..='9' | '+' | '-' | '.' => self.number(c, position)?,
            _ => self.identifier_or_keyword(c, position)?,
        };
        tracing::trace!(kind = %token.kind, %position, "token");
        Ok(token)
    }

    // -- Character cursor ---------------------------------------

    /// Make sure `n + 1` characters are buffered if the stream has them.
    ///
    /// A decoding failure is raised only once every character before it has
    /// been consumed, so it carries the position of the offending byte.
    fn fill(&mut self, n: usize) -> Result<bool, ParseError> {
        while self.buffer.len() <= n {
            if let Some(message) = self.decode_error {
                if self.buffer.is_empty() {
                    return Err(ParseError::lexical(self.position(), message));
                }
                return Ok(false);
            }
            if self.stream.is_end_of_stream() {
                if self.pending.is_empty() {
                    return Ok(false);
                }
                self.pending.clear();
                self.decode_error = Some("input ends inside a UTF-8 sequence");
                continue;
            }
            let chunk = self
                .stream
                .read()
                .map_err(|e| ParseError::stream("failed to read input", e))?;
            tracing::trace!(bytes = chunk.len(), "chunk");
            self.decode(chunk);
        }
        Ok(true)
    }

    /// Move the valid UTF-8 prefix of the pending bytes into the buffer.
    fn decode(&mut self, chunk: Vec<u8>) {
        self.pending.extend(chunk);
        let (valid, invalid) = match std::str::from_utf8(&self.pending) {
            Ok(s) => (s.len(), false),
            // error_len() is None for an incomplete trailing sequence: wait
            // for the next chunk
            Err(e) => (e.valid_up_to(), e.error_len().is_some()),
        };
        if let Ok(text) = std::str::from_utf8(&self.pending[..valid]) {
            self.buffer.extend(text.chars());
        }
        self.pending.drain(..valid);
        if invalid {
            self.pending.clear();
            self.decode_error = Some("invalid UTF-8 in input");
        }
    }

    fn peek_char(&mut self, n: usize) -> Result<Option<char>, ParseError> {
        if self.fill(n)? {
            Ok(self.buffer.get(n).copied())
        } else {
            Ok(None)
        }
    }

    fn bump(&mut self) -> Result<Option<char>, ParseError> {
        self.fill(0)?;
        let c = self.buffer.pop_front();
        match c {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => {}
        }
        Ok(c)
    }

    /// True if the next three characters are all `delim`.
    fn at_triple(&mut self, delim: char) -> Result<bool, ParseError> {
        for n in 0..3 {
            if self.peek_char(n)? != Some(delim) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn skip(&mut self, count: usize) -> Result<(), ParseError> {
        for _ in 0..count {
            self.bump()?;
        }
        Ok(())
    }

    // -- Token scanners -----------------------------------------

    fn comment(&mut self, position: Position) -> Result<Token, ParseError> {
        let mut text = String::new();
        while let Some(c) = self.peek_char(0)? {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump()?;
        }
        Ok(Token::text(TokenKind::Comment, text.trim().to_owned(), position))
    }

    /// Called after the opening `"`.
    fn string(&mut self, position: Position) -> Result<Token, ParseError> {
        if self.peek_char(0)? == Some('"') && self.peek_char(1)? == Some('"') {
            self.skip(2)?;
            return self.nowdoc(position);
        }

        let mut s = String::new();
        loop {
            let Some(c) = self.bump()? else {
                return Err(ParseError::lexical(position, "unterminated string literal"));
            };
            match c {
                '"' => break,
                '\\' => {
                    let Some(escaped) = self.bump()? else {
                        return Err(ParseError::lexical(position, "unterminated string literal"));
                    };
                    match escaped {
                        '"' => s.push('"'),
                        '\\' => s.push('\\'),
                        '/' => s.push('/'),
                        'b' => s.push('\u{8}'),
                        'f' => s.push('\u{c}'),
                        'n' => s.push('\n'),
                        'r' => s.push('\r'),
                        't' => s.push('\t'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                }
                other => s.push(other),
            }
        }
        Ok(Token::text(TokenKind::String, s, position))
    }

    /// Called after the opening `"""`; no escape processing.
    fn nowdoc(&mut self, position: Position) -> Result<Token, ParseError> {
        let mut raw = String::new();
        loop {
            if self.at_triple('"')? {
                self.skip(3)?;
                break;
            }
            match self.bump()? {
                Some(c) => raw.push(c),
                None => return Err(ParseError::lexical(position, "unterminated raw string block")),
            }
        }
        Ok(Token::text(TokenKind::NowdocString, raw.trim().to_owned(), position))
    }

    /// Called after the first backtick.
    fn embedded_source(&mut self, position: Position) -> Result<Token, ParseError> {
        if self.peek_char(0)? != Some('`') || self.peek_char(1)? != Some('`') {
            return Err(ParseError::lexical(
                position,
                "embedded source block must open with three backticks",
            ));
        }
        self.skip(2)?;

        // Language tag, discarded together with the whitespace ending it
        while let Some(c) = self.peek_char(0)? {
            if c.is_whitespace() || c == '`' {
                break;
            }
            self.bump()?;
        }
        if matches!(self.peek_char(0)?, Some(c) if c.is_whitespace()) {
            self.bump()?;
        }

        let mut source = String::new();
        loop {
            if self.at_triple('`')? {
                self.skip(3)?;
                break;
            }
            match self.bump()? {
                Some(c) => source.push(c),
                None => {
                    return Err(ParseError::lexical(
                        position,
                        "unterminated embedded source block",
                    ))
                }
            }
        }
        Ok(Token::text(
            TokenKind::EmbeddedSourceCode,
            source.trim().to_owned(),
            position,
        ))
    }

    fn number(&mut self, first: char, position: Position) -> Result<Token, ParseError> {
        let mut literal = String::from(first);
        while let Some(c) = self.peek_char(0)? {
            if !is_number_char(c) {
                break;
            }
            literal.push(c);
            self.bump()?;
        }
        if Number::parse(&literal).is_none() {
            return Err(ParseError::lexical(
                position,
                format!("invalid number literal '{}'", literal),
            ));
        }
        Ok(Token::new(
            TokenKind::Number,
            Some(Payload::Number(literal)),
            position,
        ))
    }

    fn identifier_or_keyword(
        &mut self,
        first: char,
        position: Position,
    ) -> Result<Token, ParseError> {
        let mut word = String::from(first);
        while let Some(c) = self.peek_char(0)? {
            if !is_identifier_char(c) {
                break;
            }
            word.push(c);
            self.bump()?;
        }
        Ok(match word.as_str() {
            "true" => Token::new(TokenKind::Boolean, Some(Payload::Bool(true)), position),
            "false" => Token::new(TokenKind::Boolean, Some(Payload::Bool(false)), position),
            "null" => Token::punct(TokenKind::Null, position),
            _ => Token::text(TokenKind::Identifier, word, position),
        })
    }
}

/// Lex an entire stream, comments included, up to and including `EndOfToken`.
pub fn tokenize<S: InputStream>(stream: S) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(stream);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.is(TokenKind::EndOfToken);
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StringInputStream;

    fn lexer(src: &str) -> Lexer<StringInputStream> {
        Lexer::new(StringInputStream::new(src))
    }

    fn first(src: &str) -> Token {
        lexer(src).next_token().expect("lex should succeed")
    }

    fn text(token: &Token) -> &str {
        match &token.value {
            Some(Payload::Text(s)) | Some(Payload::Number(s)) => s,
            other => panic!("expected text payload, got {:?}", other),
        }
    }

    #[test]
    fn cursor_starts_at_first_character() {
        assert_eq!(lexer("{}").current().unwrap(), Some('{'));
    }

    #[test]
    fn punctuation_tokens() {
        let cases = [
            (" [ ", TokenKind::SquareBracketOpen),
            (" ] ", TokenKind::SquareBracketClose),
            (" { ", TokenKind::CurlyBracketOpen),
            (" } ", TokenKind::CurlyBracketClose),
            (" ( ", TokenKind::RoundBracketOpen),
            (" ) ", TokenKind::RoundBracketClose),
            (" = ", TokenKind::Equal),
            (" , ", TokenKind::Comma),
            ("", TokenKind::EndOfToken),
            (" \t\r\n ", TokenKind::EndOfToken),
        ];
        for (src, kind) in cases {
            let token = first(src);
            assert_eq!(token.kind, kind, "input {:?}", src);
            assert_eq!(token.value, None);
        }
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(first(" true ").value, Some(Payload::Bool(true)));
        assert_eq!(first(" false ").value, Some(Payload::Bool(false)));
        assert_eq!(first(" null ").kind, TokenKind::Null);

        let ident = first("namespace");
        assert_eq!(ident.kind, TokenKind::Identifier);
        assert_eq!(text(&ident), "namespace");
        assert_eq!(text(&first("child-1")), "child-1");
        assert_eq!(text(&first("max_count=3")), "max_count");
        // Keywords only match whole words
        assert_eq!(text(&first("nullable")), "nullable");
    }

    #[test]
    fn escaped_string() {
        let token = first(r#" "test string" "#);
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(text(&token), "test string");

        let token = first(r#""a\"b\\c\/d\n\t\r\b\f\q""#);
        assert_eq!(text(&token), "a\"b\\c/d\n\t\r\u{8}\u{c}\\q");
        assert_eq!(text(&first(r#""""#)), "");
    }

    #[test]
    fn nowdoc_block_is_raw_and_trimmed() {
        let token = first(r#"""" text content """"#);
        assert_eq!(token.kind, TokenKind::NowdocString);
        assert_eq!(text(&token), "text content");

        let token = first("\"\"\"\n  keep \\n \"quotes\"\n\"\"\" rest");
        assert_eq!(text(&token), "keep \\n \"quotes\"");
    }

    #[test]
    fn embedded_source_block() {
        let token = first("``` source code ```");
        assert_eq!(token.kind, TokenKind::EmbeddedSourceCode);
        assert_eq!(text(&token), "source code");

        let token = first("```php\n$x = `date`;\n```");
        assert_eq!(text(&token), "$x = `date`;");
    }

    #[test]
    fn comment_runs_to_end_of_line() {
        let mut lx = lexer("# test comment \nname");
        let comment = lx.next_token().unwrap();
        assert_eq!(comment.kind, TokenKind::Comment);
        assert_eq!(text(&comment), "test comment");
        assert_eq!(text(&lx.next_token().unwrap()), "name");
        assert_eq!(first("# at eof").kind, TokenKind::Comment);
    }

    #[test]
    fn numbers_are_validated() {
        for src in ["123", "-1.0", "1.0", "+7", ".5", "5.", "1e10", "2.5E-3"] {
            let token = first(src);
            assert_eq!(token.kind, TokenKind::Number, "input {:?}", src);
            assert_eq!(text(&token), src);
        }
        for src in ["1-2e+3-4", "-", "1.2.3", "1e", "+.", "99999999999999999999", "1e999"] {
            let err = lexer(src).next_token().unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Lexical, "input {:?}", src);
        }
    }

    #[test]
    fn number_interpretation() {
        assert_eq!(Number::parse("123"), Some(Number::Integer(123)));
        assert_eq!(Number::parse("-1.0"), Some(Number::Float(-1.0)));
        assert_eq!(Number::parse("1e3"), Some(Number::Float(1000.0)));
        assert_eq!(Number::parse("1-2"), None);
    }

    #[test]
    fn unterminated_literals_fail() {
        for src in [r#""open"#, r#""trailing\"#, r#"""" never closed"#, "``` never closed", "``"] {
            let err = lexer(src).next_token().unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Lexical, "input {:?}", src);
            assert_eq!(err.position(), Some(Position::new(1, 1)));
        }
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = tokenize(StringInputStream::new("a (\n  b = 1\n)")).unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(
            positions,
            vec![
                Position::new(1, 1),
                Position::new(1, 3),
                Position::new(2, 3),
                Position::new(2, 5),
                Position::new(2, 7),
                Position::new(3, 1),
                Position::new(3, 2),
            ]
        );
    }

    #[test]
    fn end_of_input_is_sticky() {
        let mut lx = lexer("x");
        lx.next_token().unwrap();
        assert!(lx.next_token().unwrap().is(TokenKind::EndOfToken));
        assert!(lx.next_token().unwrap().is(TokenKind::EndOfToken));
    }

    #[test]
    fn invalid_utf8_is_lexical_error() {
        let mut lx = Lexer::new(StringInputStream::new(vec![b'a', 0xff, b'b']));
        let err = lx.next_token().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Lexical);
        assert_eq!(err.position(), Some(Position::new(1, 2)));
    }

    #[test]
    fn invalid_utf8_reports_the_offending_byte() {
        let src = b"doc {\n  child {}\n  bad\xff {}\n}".to_vec();
        let mut lx = Lexer::new(StringInputStream::new(src));
        for _ in 0..5 {
            lx.next_token().unwrap();
        }
        let err = lx.next_token().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Lexical);
        assert!(err.to_string().contains("invalid UTF-8"));
        assert_eq!(err.position(), Some(Position::new(3, 6)));
    }

    #[test]
    fn truncated_utf8_reports_where_input_ends() {
        let mut lx = Lexer::new(StringInputStream::new(b"a\n \xc3".to_vec()));
        assert!(lx.next_token().unwrap().is(TokenKind::Identifier));
        let err = lx.next_token().unwrap_err();
        assert!(err.to_string().contains("ends inside a UTF-8 sequence"));
        assert_eq!(err.position(), Some(Position::new(2, 2)));
    }
}
