//! Tokenizer for the `go.mod` text format.
//!
//! Produces a flat token stream with explicit newlines. String tokens keep
//! their quotes so the formatter can write them back exactly as they were
//! read. Errors do not stop the scan: the rest of the offending line is
//! skipped and lexing resumes on the next one.

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word such as `require`, `=>` or `golang.org/x/mod`.
    Word,
    /// Interpreted (`"..."`) or raw (`` `...` ``) string, quotes included.
    String,
    LParen,
    RParen,
    /// `//` comment running to the end of the line.
    Comment,
    Newline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based source line.
    pub line: usize,
}

/// A lexical error with its 1-based line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

/// Splits `src` into tokens, collecting every lexical error.
pub fn tokenize(src: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer {
        src,
        pos: 0,
        line: 1,
        tokens: Vec::new(),
        errors: Vec::new(),
    };
    lexer.run();
    (lexer.tokens, lexer.errors)
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            text: self.src[start..self.pos].to_string(),
            line: self.line,
        });
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(LexError {
            line: self.line,
            message: message.into(),
        });
        // Resync at the next newline.
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                '\n' => {
                    self.bump();
                    self.push(TokenKind::Newline, start);
                    self.line += 1;
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '(' => {
                    self.bump();
                    self.push(TokenKind::LParen, start);
                }
                ')' => {
                    self.bump();
                    self.push(TokenKind::RParen, start);
                }
                '"' | '`' => self.string(c),
                _ if self.rest().starts_with("//") => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                    let text = self.src[start..self.pos].trim_end().to_string();
                    self.tokens.push(Token {
                        kind: TokenKind::Comment,
                        text,
                        line: self.line,
                    });
                }
                _ if self.rest().starts_with("/*") => {
                    self.error("mod files must use // comments, not /* */ comments");
                }
                _ => self.word(),
            }
        }
    }

    fn string(&mut self, quote: char) {
        let start = self.pos;
        self.bump();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.pos = start;
                    self.error("unexpected newline in string");
                    return;
                }
                Some('\\') if quote == '"' => {
                    self.bump();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                Some(c) if c == quote => {
                    self.bump();
                    self.push(TokenKind::String, start);
                    return;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn word(&mut self) {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '`') {
                break;
            }
            if self.rest().starts_with("//") {
                break;
            }
            if self.rest().starts_with("/*") {
                self.error("mod files must use // comments, not /* */ comments");
                return;
            }
            self.bump();
        }
        self.push(TokenKind::Word, start);
    }
}

/// Decodes a string token to its value. Bare words are returned as-is.
///
/// Interpreted strings accept Go's escapes: `\a \b \f \n \r \t \v \\ \"`,
/// `\xNN`, three-digit octal `\NNN`, `\uNNNN` and `\UNNNNNNNN`. Byte escapes
/// may spell out multi-byte characters, but the decoded value must be UTF-8.
pub fn unquote(raw: &str) -> Result<String, String> {
    let invalid = || format!("invalid quoted string {raw}");

    if let Some(inner) = raw.strip_prefix('`') {
        return inner.strip_suffix('`').map(str::to_string).ok_or_else(invalid);
    }
    let Some(inner) = raw.strip_prefix('"') else {
        return Ok(raw.to_string());
    };
    let inner = inner.strip_suffix('"').ok_or_else(invalid)?;

    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            push_char(&mut out, c);
            continue;
        }
        let escape = chars.next().ok_or_else(invalid)?;
        match escape {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '"' => out.push(b'"'),
            'x' => {
                let value = read_digits(&mut chars, 2, 16).ok_or_else(invalid)?;
                out.push(value as u8);
            }
            '0'..='7' => {
                let rest = read_digits(&mut chars, 2, 8).ok_or_else(invalid)?;
                let value = (escape as u32 - '0' as u32) * 64 + rest;
                out.push(u8::try_from(value).map_err(|_| invalid())?);
            }
            'u' | 'U' => {
                let width = if escape == 'u' { 4 } else { 8 };
                let value = read_digits(&mut chars, width, 16).ok_or_else(invalid)?;
                push_char(&mut out, char::from_u32(value).ok_or_else(invalid)?);
            }
            _ => return Err(invalid()),
        }
    }
    String::from_utf8(out).map_err(|_| invalid())
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Reads exactly `count` digits in `radix`.
fn read_digits(chars: &mut std::str::Chars<'_>, count: usize, radix: u32) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        value = value * radix + chars.next()?.to_digit(radix)?;
    }
    Some(value)
}

/// Returns true if `s` cannot be written as a bare word.
pub fn must_quote(s: &str) -> bool {
    for c in s.chars() {
        match c {
            ' ' | '"' | '\'' | '`' => return true,
            '(' | ')' | '[' | ']' | '{' | '}' | ',' if s.len() > 1 => return true,
            c if c.is_whitespace() || c.is_control() => return true,
            _ => {}
        }
    }
    s.is_empty() || s.contains("//") || s.contains("/*")
}

/// Quotes `s` only when it cannot be written as a bare word.
pub fn auto_quote(s: &str) -> String {
    if !must_quote(s) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
