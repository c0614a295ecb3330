//! Concrete syntax tree and canonical formatter for `go.mod` files.
//!
//! The tree keeps every statement, block, comment and blank-line separator
//! so a file can be written back with only the edited lines changed.
//! Formatting is canonical: tokens are separated by one space, block entries
//! are indented with a tab, and runs of blank lines collapse to one.

use super::error::ModError;
use super::lexer::{LexError, Token, TokenKind, tokenize};

/// Stable identity of a [`Line`], valid across insertions and removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(usize);

/// One directive line: raw tokens plus an optional trailing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub id: LineId,
    /// Raw token text; strings keep their quotes.
    pub tokens: Vec<String>,
    pub comment: Option<String>,
    /// 1-based source line, 0 for lines added after parsing.
    pub line: usize,
}

/// A factored block such as `require ( ... )`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub verb: Vec<String>,
    pub comment: Option<String>,
    pub entries: Vec<Stmt>,
    pub close_comment: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Blank,
    Comment(String),
    Line(Line),
    /// Blocks only appear at the top level.
    Block(Block),
}

/// Where a line lives in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Top(usize),
    InBlock(usize, usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSyntax {
    pub stmts: Vec<Stmt>,
    next_id: usize,
}

impl FileSyntax {
    /// Parses `src` into a syntax tree, collecting every structural error.
    pub fn parse(src: &str) -> (FileSyntax, Vec<LexError>) {
        let (tokens, mut errors) = tokenize(src);
        let mut syntax = FileSyntax::default();
        let mut open: Option<Block> = None;

        for group in split_lines(&tokens) {
            let line_no = group.line;
            let (words, comment) = (group.words, group.comment);

            if words.is_empty() {
                let stmt = match comment {
                    Some(text) => Stmt::Comment(text),
                    None => Stmt::Blank,
                };
                match open.as_mut() {
                    Some(block) => block.entries.push(stmt),
                    None => syntax.stmts.push(stmt),
                }
                continue;
            }

            let last = words[words.len() - 1];
            if last.kind == TokenKind::LParen {
                if open.is_some() {
                    errors.push(structure_error(line_no, "unexpected '(' inside block"));
                    continue;
                }
                if words.len() == 1 || words[..words.len() - 1].iter().any(|t| !is_value(t)) {
                    errors.push(structure_error(line_no, "unexpected '('"));
                    continue;
                }
                open = Some(Block {
                    verb: words[..words.len() - 1]
                        .iter()
                        .map(|t| t.text.clone())
                        .collect(),
                    comment,
                    entries: Vec::new(),
                    close_comment: None,
                    line: line_no,
                });
                continue;
            }

            // `require ()` on one line is an empty block.
            let n = words.len();
            if open.is_none()
                && n >= 3
                && words[n - 2].kind == TokenKind::LParen
                && last.kind == TokenKind::RParen
                && words[..n - 2].iter().all(|t| is_value(t))
            {
                syntax.stmts.push(Stmt::Block(Block {
                    verb: words[..n - 2].iter().map(|t| t.text.clone()).collect(),
                    comment: None,
                    entries: Vec::new(),
                    close_comment: comment,
                    line: line_no,
                }));
                continue;
            }

            if last.kind == TokenKind::RParen && words.len() == 1 {
                match open.take() {
                    Some(mut block) => {
                        block.close_comment = comment;
                        syntax.stmts.push(Stmt::Block(block));
                    }
                    None => errors.push(structure_error(line_no, "unexpected ')'")),
                }
                continue;
            }

            if words.iter().any(|t| !is_value(t)) {
                errors.push(structure_error(line_no, "unexpected parenthesis"));
                continue;
            }

            let line = Line {
                id: syntax.fresh_id(),
                tokens: words.iter().map(|t| t.text.clone()).collect(),
                comment,
                line: line_no,
            };
            match open.as_mut() {
                Some(block) => block.entries.push(Stmt::Line(line)),
                None => syntax.stmts.push(Stmt::Line(line)),
            }
        }

        if let Some(block) = open {
            errors.push(structure_error(
                block.line,
                "unexpected EOF: block is missing its closing ')'",
            ));
        }

        (syntax, errors)
    }

    fn fresh_id(&mut self) -> LineId {
        let id = LineId(self.next_id);
        self.next_id += 1;
        id
    }

    fn locate(&self, id: LineId) -> Option<Location> {
        for (idx, stmt) in self.stmts.iter().enumerate() {
            match stmt {
                Stmt::Line(line) if line.id == id => return Some(Location::Top(idx)),
                Stmt::Block(block) => {
                    for (entry_idx, entry) in block.entries.iter().enumerate() {
                        if matches!(entry, Stmt::Line(line) if line.id == id) {
                            return Some(Location::InBlock(idx, entry_idx));
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Returns the line with the given id.
    pub fn line(&self, id: LineId) -> Option<&Line> {
        match self.locate(id)? {
            Location::Top(idx) => match &self.stmts[idx] {
                Stmt::Line(line) => Some(line),
                _ => None,
            },
            Location::InBlock(idx, entry_idx) => match &self.stmts[idx] {
                Stmt::Block(block) => match &block.entries[entry_idx] {
                    Stmt::Line(line) => Some(line),
                    _ => None,
                },
                _ => None,
            },
        }
    }

    fn line_mut(&mut self, id: LineId) -> Option<(&mut Line, bool)> {
        match self.locate(id)? {
            Location::Top(idx) => match &mut self.stmts[idx] {
                Stmt::Line(line) => Some((line, false)),
                _ => None,
            },
            Location::InBlock(idx, entry_idx) => match &mut self.stmts[idx] {
                Stmt::Block(block) => match &mut block.entries[entry_idx] {
                    Stmt::Line(line) => Some((line, true)),
                    _ => None,
                },
                _ => None,
            },
        }
    }

    /// Rewrites the arguments of a directive line, keeping its comment.
    ///
    /// Top-level lines get `verb` prepended; block entries carry arguments
    /// only. Returns false if the line no longer exists.
    pub fn set_args(&mut self, id: LineId, verb: &str, args: Vec<String>) -> bool {
        let Some((line, in_block)) = self.line_mut(id) else {
            return false;
        };
        line.tokens = if in_block {
            args
        } else {
            std::iter::once(verb.to_string()).chain(args).collect()
        };
        true
    }

    /// Removes a line. A block left without directive lines is removed too.
    pub fn remove_line(&mut self, id: LineId) {
        match self.locate(id) {
            Some(Location::Top(idx)) => {
                self.stmts.remove(idx);
            }
            Some(Location::InBlock(idx, entry_idx)) => {
                if let Stmt::Block(block) = &mut self.stmts[idx] {
                    block.entries.remove(entry_idx);
                    if !block.entries.iter().any(|e| matches!(e, Stmt::Line(_))) {
                        self.stmts.remove(idx);
                    }
                }
            }
            None => {}
        }
    }

    /// Adds a directive line after `hint`, or at the end of the file.
    ///
    /// When `hint` sits inside a block the new line joins that block.
    pub fn add_line(&mut self, hint: Option<LineId>, verb: &str, args: Vec<String>) -> LineId {
        let id = self.fresh_id();
        let make = |tokens: Vec<String>| Line {
            id,
            tokens,
            comment: None,
            line: 0,
        };
        let with_verb = || -> Vec<String> {
            std::iter::once(verb.to_string())
                .chain(args.iter().cloned())
                .collect()
        };

        match hint.and_then(|h| self.locate(h)) {
            Some(Location::Top(idx)) => {
                self.stmts.insert(idx + 1, Stmt::Line(make(with_verb())));
            }
            Some(Location::InBlock(idx, entry_idx)) => {
                if let Stmt::Block(block) = &mut self.stmts[idx] {
                    block
                        .entries
                        .insert(entry_idx + 1, Stmt::Line(make(args)));
                }
            }
            None => self.stmts.push(Stmt::Line(make(with_verb()))),
        }
        id
    }

    /// Renders the tree in canonical form.
    pub fn format(&self) -> Result<String, ModError> {
        let mut out: Vec<String> = Vec::new();

        for stmt in &self.stmts {
            match stmt {
                Stmt::Blank => push_blank(&mut out),
                Stmt::Comment(text) => out.push(text.clone()),
                Stmt::Line(line) => out.push(render_line(line)?),
                Stmt::Block(block) => {
                    out.push(with_comment(
                        format!("{} (", block.verb.join(" ")),
                        &block.comment,
                    ));
                    for entry in &block.entries {
                        match entry {
                            Stmt::Blank => push_blank(&mut out),
                            Stmt::Comment(text) => out.push(format!("\t{text}")),
                            Stmt::Line(line) => out.push(format!("\t{}", render_line(line)?)),
                            Stmt::Block(_) => unreachable!("blocks do not nest"),
                        }
                    }
                    out.push(with_comment(")".to_string(), &block.close_comment));
                }
            }
        }

        while out.last().is_some_and(|l| l.is_empty()) {
            out.pop();
        }
        if out.is_empty() {
            return Ok(String::new());
        }
        let mut text = out.join("\n");
        text.push('\n');
        Ok(text)
    }
}

fn push_blank(out: &mut Vec<String>) {
    if out.last().is_some_and(|l| !l.is_empty()) {
        out.push(String::new());
    }
}

fn render_line(line: &Line) -> Result<String, ModError> {
    if let Some(token) = line.tokens.iter().find(|t| t.contains(['\n', '\r'])) {
        return Err(ModError::Unencodable {
            line: line.line,
            token: token.clone(),
        });
    }
    Ok(with_comment(line.tokens.join(" "), &line.comment))
}

fn with_comment(mut text: String, comment: &Option<String>) -> String {
    if let Some(comment) = comment {
        text.push(' ');
        text.push_str(comment);
    }
    text
}

fn is_value(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Word | TokenKind::String)
}

fn structure_error(line: usize, message: &str) -> LexError {
    LexError {
        line,
        message: message.to_string(),
    }
}

struct LineGroup<'t> {
    line: usize,
    words: Vec<&'t Token>,
    comment: Option<String>,
}

fn split_lines(tokens: &[Token]) -> Vec<LineGroup<'_>> {
    let mut groups = Vec::new();
    let mut current = LineGroup {
        line: 1,
        words: Vec::new(),
        comment: None,
    };

    for token in tokens {
        match token.kind {
            TokenKind::Newline => {
                let next = LineGroup {
                    line: token.line + 1,
                    words: Vec::new(),
                    comment: None,
                };
                groups.push(std::mem::replace(&mut current, next));
            }
            TokenKind::Comment => current.comment = Some(token.text.clone()),
            _ => current.words.push(token),
        }
    }
    if !current.words.is_empty() || current.comment.is_some() {
        groups.push(current);
    }
    groups
}
