//! Brace-aware statement scanner
//!
//! The scanner walks the source with a (line, column) cursor. Comments and directives are
//! handled where they start; everything else is collected into a statement up to the first
//! `;`, `{` or `}` outside parentheses. Braces are tracked with a scope stack, so nesting never
//! depends on indentation.

use super::patterns::{self, Opener};
use super::tokens::{BlockKeyword, FileToken, TokenKind};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::parser::decl;

/// Tokens spanning more lines than this are reported as suspicious.
pub const MAX_TOKEN_LINES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Aggregate,
    Enum,
    Namespace,
    Extern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Semicolon,
    OpenBrace,
    CloseBrace,
    Comma,
    TrailingDoc,
    Eof,
}

#[derive(Debug, Default, Clone, Copy)]
struct Stops {
    comma: bool,
    trailing_doc: bool,
}

#[derive(Debug)]
struct Statement {
    text: String,
    stop: Stop,
    first_line: usize,
    last_line: usize,
}

pub struct Scanner<'a> {
    file: &'a str,
    lines: Vec<&'a str>,
    line: usize,
    col: usize,
    tokens: Vec<FileToken>,
    scopes: Vec<Scope>,
    /// Open `#if` directives; `true` for version gates.
    conditionals: Vec<bool>,
    forward_group: bool,
    diagnostics: &'a Diagnostics,
}

impl<'a> Scanner<'a> {
    pub fn new(file: &'a str, source: &'a str, diagnostics: &'a Diagnostics) -> Self {
        Self {
            file,
            lines: source.lines().collect(),
            line: 0,
            col: 0,
            tokens: Vec::new(),
            scopes: Vec::new(),
            conditionals: Vec::new(),
            forward_group: false,
            diagnostics,
        }
    }

    pub fn run(mut self) -> Result<Vec<FileToken>> {
        while self.line < self.lines.len() {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            if trimmed.is_empty() {
                if self.col == 0 {
                    self.forward_group = false;
                }
                self.next_line();
                continue;
            }
            let at_line_start = self.lines[self.line][..self.col].trim().is_empty();
            self.col += rest.len() - trimmed.len();

            if trimmed.starts_with("/*") {
                self.block_comment()?;
            } else if trimmed.starts_with("//") {
                self.line_comment()?;
            } else if trimmed.starts_with('#') && at_line_start {
                if self.directive()? {
                    break;
                }
            } else if trimmed.starts_with('}') {
                self.close_scope()?;
            } else if let Some(len) = patterns::access_label_len(trimmed) {
                self.col += len;
            } else if self.scope() == Some(Scope::Enum) {
                self.enumerator()?;
            } else if starts_template(trimmed) {
                self.template()?;
            } else {
                self.declaration()?;
            }
        }
        Ok(self.tokens)
    }

    fn rest(&self) -> &'a str {
        let line: &'a str = self.lines[self.line];
        &line[self.col.min(line.len())..]
    }

    fn next_line(&mut self) {
        self.line += 1;
        self.col = 0;
    }

    fn scope(&self) -> Option<Scope> {
        self.scopes.last().copied()
    }

    fn in_aggregate(&self) -> bool {
        self.scope() == Some(Scope::Aggregate)
    }

    fn push(&mut self, first_line: usize, last_line: usize, kind: TokenKind) -> Result<()> {
        let token = FileToken {
            begin: first_line + 1,
            end: last_line + 2,
            spaces: indentation(self.lines[first_line]),
            kind,
        };
        if token.end - token.begin > MAX_TOKEN_LINES {
            self.diagnostics.warn(format!(
                "{}:{}: {} token spans {} lines",
                self.file,
                token.begin,
                token.kind.describe(),
                token.end - token.begin
            ))?;
        }
        tracing::trace!(begin = token.begin, end = token.end, kind = token.kind.describe(), "token");
        self.tokens.push(token);
        Ok(())
    }

    fn unrecognized(&self, line: usize, text: &str) -> Result<()> {
        if patterns::is_ignorable(text) {
            return Ok(());
        }
        self.diagnostics.warn(format!(
            "{}:{}: skipping unrecognized declaration `{}`",
            self.file,
            line + 1,
            decl::collapse_whitespace(text)
        ))
    }

    fn block_comment(&mut self) -> Result<()> {
        let start = self.line;
        let opener = self.rest();
        let trailing = opener.starts_with("/**<") || opener.starts_with("/*!<");
        let is_doc = trailing || ((opener.starts_with("/**") || opener.starts_with("/*!")) && !opener.starts_with("/**/"));
        let skip = if trailing {
            4
        } else if is_doc {
            3
        } else {
            2
        };
        let mut from = self.col + skip;
        let mut parts = Vec::new();
        loop {
            let Some(&line) = self.lines.get(self.line) else {
                return Err(Error::parse(self.file, start + 1, "unterminated comment"));
            };
            let from_col = from.min(line.len());
            match line[from_col..].find("*/") {
                Some(rel) => {
                    parts.push(&line[from_col..from_col + rel]);
                    self.col = from_col + rel + 2;
                    break;
                }
                None => {
                    parts.push(&line[from_col..]);
                    self.next_line();
                    from = 0;
                }
            }
        }
        if is_doc {
            let text = comment_body(&parts);
            self.push(start, self.line, TokenKind::Doc { text, trailing })?;
        }
        Ok(())
    }

    fn line_comment(&mut self) -> Result<()> {
        let rest = self.rest();
        if !rest.starts_with("///") || rest.starts_with("////") {
            if patterns::is_forward_sentinel(rest) {
                self.forward_group = true;
            }
            self.next_line();
            return Ok(());
        }
        let start = self.line;
        let trailing = rest.starts_with("///<");
        let mut parts = vec![line_doc_text(rest)];
        self.next_line();
        while !trailing && self.line < self.lines.len() {
            let next = self.lines[self.line].trim_start();
            if !next.starts_with("///") || next.starts_with("///<") || next.starts_with("////") {
                break;
            }
            parts.push(line_doc_text(next));
            self.next_line();
        }
        let text = trim_blank_lines(&parts);
        self.push(start, self.line - 1, TokenKind::Doc { text, trailing })
    }

    /// Returns `true` when tokenization must stop.
    fn directive(&mut self) -> Result<bool> {
        let start = self.line;
        let mut pieces = vec![self.rest().trim_end()];
        while pieces.last().is_some_and(|piece| piece.ends_with('\\')) && self.line + 1 < self.lines.len() {
            if let Some(piece) = pieces.last_mut() {
                let current: &'a str = *piece;
                *piece = current.trim_end_matches('\\').trim_end();
            }
            self.next_line();
            pieces.push(self.lines[self.line].trim());
        }
        let end = self.line;
        self.next_line();
        let text = pieces.join(" ");

        let Some(kinds) = patterns::directive_tokens(&text, &mut self.conditionals) else {
            self.unrecognized(start, &text)?;
            return Ok(false);
        };
        let mut stop = false;
        for kind in kinds {
            stop |= kind == TokenKind::ImplMarker;
            self.push(start, end, kind)?;
        }
        Ok(stop)
    }

    fn close_scope(&mut self) -> Result<()> {
        let start = self.line;
        let rest = self.rest();
        let comment = rest.find("//").into_iter().chain(rest.find("/*")).min().unwrap_or(rest.len());
        let consumed = match rest[..comment].find(';') {
            Some(semicolon) => semicolon + 1,
            None => 1,
        };
        let text = &rest[..consumed];
        self.col += consumed;

        match self.scopes.pop() {
            Some(Scope::Aggregate | Scope::Enum) => {
                let name = patterns::closing_name(text);
                self.push(start, start, TokenKind::EndStruct { name })
            }
            Some(Scope::Namespace) => self.push(start, start, TokenKind::EndNamespace),
            Some(Scope::Extern) => Ok(()),
            None => self
                .diagnostics
                .warn(format!("{}:{}: unbalanced closing brace", self.file, start + 1)),
        }
    }

    fn enumerator(&mut self) -> Result<()> {
        let statement = self.collect(Stops {
            comma: true,
            trailing_doc: true,
        })?;
        let text = statement.text.trim();
        if text.is_empty() {
            return Ok(());
        }
        match patterns::parse_enumerator(text) {
            Some(kind) => self.push(statement.first_line, statement.last_line, kind),
            None => self.unrecognized(statement.first_line, text),
        }
    }

    fn template(&mut self) -> Result<()> {
        let start = self.line;
        self.col += "template".len();
        let mut depth = 0usize;
        let mut parameters = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(Error::parse(self.file, start + 1, "unterminated template signature"));
            };
            match c {
                '<' => {
                    depth += 1;
                    if depth == 1 {
                        continue;
                    }
                }
                '>' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            if depth > 0 {
                parameters.push(if c == '\n' { ' ' } else { c });
            }
        }
        let parameters = decl::collapse_whitespace(&parameters);
        self.push(start, self.line, TokenKind::Template { parameters })
    }

    fn declaration(&mut self) -> Result<()> {
        let in_aggregate = self.in_aggregate();
        let statement = self.collect(Stops::default())?;
        let text = statement.text.trim();
        let (first, last) = (statement.first_line, statement.last_line);

        match statement.stop {
            Stop::Semicolon => {
                if text.is_empty() || patterns::is_ignorable(text) {
                    return Ok(());
                }
                match patterns::classify_statement(text, in_aggregate, self.forward_group) {
                    Some(kind) => self.push(first, last, kind),
                    None => self.unrecognized(first, text),
                }
            }
            Stop::OpenBrace => match patterns::classify_opener(text, in_aggregate) {
                Opener::ExternC => {
                    self.scopes.push(Scope::Extern);
                    Ok(())
                }
                Opener::Namespace(name) => {
                    self.scopes.push(Scope::Namespace);
                    self.push(first, last, TokenKind::Namespace { name })
                }
                Opener::Block(kind) => {
                    let scope = match kind {
                        TokenKind::Block {
                            keyword: BlockKeyword::Enum,
                            ..
                        } => Scope::Enum,
                        _ => Scope::Aggregate,
                    };
                    self.scopes.push(scope);
                    self.push(first, last, kind)
                }
                Opener::Function(kind) => {
                    self.skip_body(first)?;
                    let end = self.line;
                    self.skip_semicolon();
                    self.push(first, end, kind)
                }
                Opener::Initializer => {
                    let body = self.skip_body(first)?;
                    let tail = self.collect(Stops::default())?;
                    let full = format!("{text} {{{body}}}{}", tail.text);
                    match patterns::classify_statement(&full, in_aggregate, self.forward_group) {
                        Some(kind) => self.push(first, tail.last_line, kind),
                        None => self.unrecognized(first, &full),
                    }
                }
                Opener::Unknown => {
                    self.skip_body(first)?;
                    self.skip_semicolon();
                    self.unrecognized(first, text)
                }
            },
            Stop::CloseBrace | Stop::Comma | Stop::TrailingDoc | Stop::Eof => {
                if text.is_empty() {
                    Ok(())
                } else {
                    self.unrecognized(first, text)
                }
            }
        }
    }

    /// Advance one character; line ends read as `\n`.
    fn bump(&mut self) -> Option<char> {
        let line = *self.lines.get(self.line)?;
        match line[self.col.min(line.len())..].chars().next() {
            Some(c) => {
                self.col += c.len_utf8();
                Some(c)
            }
            None => {
                self.next_line();
                Some('\n')
            }
        }
    }

    fn collect(&mut self, stops: Stops) -> Result<Statement> {
        let first_line = self.line;
        let mut last_line = self.line;
        let mut text = String::new();
        let mut depth = 0usize;
        let finish = |text: String, stop: Stop, last_line: usize| Statement {
            text,
            stop,
            first_line,
            last_line,
        };

        while self.line < self.lines.len() {
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                text.push(' ');
                self.next_line();
                if let Some(directive) = self.lines.get(self.line).copied().map(str::trim) {
                    if directive.starts_with('#') {
                        if !text.trim().is_empty() {
                            self.diagnostics.warn(format!(
                                "{}:{}: ignoring `{}` inside a declaration",
                                self.file,
                                self.line + 1,
                                directive
                            ))?;
                        }
                        self.next_line();
                    }
                }
                continue;
            };
            if rest.starts_with("//") {
                if stops.trailing_doc && depth == 0 && rest.starts_with("///<") {
                    return Ok(finish(text, Stop::TrailingDoc, last_line));
                }
                self.col = self.lines[self.line].len();
                continue;
            }
            if rest.starts_with("/*") {
                if stops.trailing_doc && depth == 0 && rest.starts_with("/**<") {
                    return Ok(finish(text, Stop::TrailingDoc, last_line));
                }
                self.skip_block_comment()?;
                text.push(' ');
                continue;
            }
            if c == '"' || c == '\'' {
                text.push_str(self.literal(c));
                last_line = self.line;
                continue;
            }
            match c {
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                ';' if depth == 0 => {
                    self.col += 1;
                    return Ok(finish(text, Stop::Semicolon, self.line));
                }
                '{' if depth == 0 => {
                    self.col += 1;
                    return Ok(finish(text, Stop::OpenBrace, self.line));
                }
                '}' if depth == 0 => return Ok(finish(text, Stop::CloseBrace, last_line)),
                ',' if depth == 0 && stops.comma => {
                    self.col += 1;
                    return Ok(finish(text, Stop::Comma, self.line));
                }
                _ => {}
            }
            if !c.is_whitespace() {
                last_line = self.line;
            }
            text.push(c);
            self.col += c.len_utf8();
        }
        Ok(finish(text, Stop::Eof, last_line))
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.line;
        let mut from = self.col + 2;
        while let Some(&line) = self.lines.get(self.line) {
            let from_col = from.min(line.len());
            if let Some(rel) = line[from_col..].find("*/") {
                self.col = from_col + rel + 2;
                return Ok(());
            }
            self.next_line();
            from = 0;
        }
        Err(Error::parse(self.file, start + 1, "unterminated comment"))
    }

    /// Consume a quoted literal on the current line.
    fn literal(&mut self, quote: char) -> &'a str {
        let rest = self.rest();
        let mut escaped = false;
        let mut len = rest.len();
        for (i, c) in rest.char_indices().skip(1) {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                len = i + 1;
                break;
            }
        }
        self.col += len;
        &rest[..len]
    }

    /// Skip a braced body whose `{` was just consumed, returning its inner text.
    fn skip_body(&mut self, start: usize) -> Result<String> {
        let mut depth = 1usize;
        let mut body = String::new();
        while self.line < self.lines.len() {
            let rest = self.rest();
            if rest.starts_with("//") {
                self.col = self.lines[self.line].len();
                continue;
            }
            if rest.starts_with("/*") {
                self.skip_block_comment()?;
                continue;
            }
            if let Some(c @ ('"' | '\'')) = rest.chars().next() {
                body.push_str(self.literal(c));
                continue;
            }
            let Some(c) = self.bump() else { break };
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(body);
                    }
                }
                _ => {}
            }
            body.push(c);
        }
        Err(Error::parse(self.file, start + 1, "unterminated body"))
    }

    fn skip_semicolon(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        if trimmed.starts_with(';') {
            self.col += rest.len() - trimmed.len() + 1;
        }
    }
}

fn starts_template(text: &str) -> bool {
    text.strip_prefix("template")
        .is_some_and(|rest| rest.starts_with('<') || rest.starts_with(char::is_whitespace))
}

pub fn indentation(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Body of a run of `///` comment lines.
pub fn line_doc_body(lines: &[&str]) -> String {
    let parts: Vec<&str> = lines.iter().map(|line| line_doc_text(line)).collect();
    trim_blank_lines(&parts)
}

fn line_doc_text(line: &str) -> &str {
    let text = line.trim_start();
    let text = text.strip_prefix("///<").or_else(|| text.strip_prefix("///")).unwrap_or(text);
    let text = text.strip_prefix(' ').unwrap_or(text);
    text.trim_end()
}

/// Comment body from the pieces between `/**` and `*/`, with leading `*` markers removed.
pub fn comment_body(parts: &[&str]) -> String {
    let lines: Vec<&str> = parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                return part.trim();
            }
            let text = part.trim_start();
            let text = match text.strip_prefix('*') {
                Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                None => text,
            };
            text.trim_end()
        })
        .collect();
    trim_blank_lines(&lines)
}

fn trim_blank_lines(lines: &[&str]) -> String {
    let first = lines.iter().position(|line| !line.is_empty());
    let last = lines.iter().rposition(|line| !line.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}
