//! Template parsing
//!
//! A small recursive-descent parser that turns a template into a list of
//! [`Segment`]s. Output declarations carry their path expression as a nested
//! segment list, so placeholders can nest to any depth:
//!
//! ```text
//! zcat [i:gz] > [o:fasta:[i:gz|basename|%.gz]]
//! ```
//!
//! A `[` only opens a placeholder when followed by `i:`, `o:` or `p:`. Any
//! other bracket is literal text, which keeps shell tests like `[ -f x ]`
//! usable in commands.

use crate::error::{PlaceholderError, PlaceholderResult, PortKind};
use crate::placeholder::Modifier;
use regex::Regex;
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("valid name pattern"));

/// A parsed piece of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, copied as-is
    Text(String),

    /// `[i:name|mods]`
    Input {
        name: String,
        modifiers: Vec<Modifier>,
    },

    /// `[p:name|mods]`
    Param {
        name: String,
        modifiers: Vec<Modifier>,
    },

    /// `[o:name:path-expr]` when `path` is set, `[o:name|mods]` otherwise
    Output {
        name: String,
        path: Option<Vec<Segment>>,
        modifiers: Vec<Modifier>,
    },
}

/// Parse a template into segments
pub fn parse(template: &str) -> PlaceholderResult<Vec<Segment>> {
    let mut parser = Parser {
        src: template,
        pos: 0,
    };
    parser.sequence(None)
}

/// Check whether a string is a valid placeholder name
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn placeholder_kind(&self) -> Option<PortKind> {
        let rest = self.rest();
        if rest.starts_with("[i:") {
            Some(PortKind::Input)
        } else if rest.starts_with("[o:") {
            Some(PortKind::Output)
        } else if rest.starts_with("[p:") {
            Some(PortKind::Param)
        } else {
            None
        }
    }

    /// Parse text and placeholders. With `opened` set, this is a nested path
    /// expression and stops (without consuming) at the closing `]`.
    fn sequence(&mut self, opened: Option<usize>) -> PlaceholderResult<Vec<Segment>> {
        let mut segments = Vec::new();
        let mut text = String::new();

        while let Some(c) = self.peek() {
            if opened.is_some() && c == ']' {
                break;
            }

            if let Some(kind) = self.placeholder_kind() {
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(self.placeholder(kind)?);
                continue;
            }

            text.push(c);
            self.bump(c);
        }

        if let Some(start) = opened {
            if self.peek().is_none() {
                return Err(self.error(start, "unterminated placeholder"));
            }
        }

        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(segments)
    }

    fn placeholder(&mut self, kind: PortKind) -> PlaceholderResult<Segment> {
        let opened = self.pos;
        self.pos += 3;

        let name = self.name(opened)?;

        let segment = match kind {
            PortKind::Input => Segment::Input {
                name,
                modifiers: self.modifiers(opened)?,
            },
            PortKind::Param => Segment::Param {
                name,
                modifiers: self.modifiers(opened)?,
            },
            PortKind::Output if self.peek() == Some(':') => {
                self.bump(':');
                let path = self.sequence(Some(opened))?;
                if path.is_empty() {
                    return Err(self.error(opened, "empty path expression"));
                }
                Segment::Output {
                    name,
                    path: Some(path),
                    modifiers: Vec::new(),
                }
            }
            PortKind::Output => Segment::Output {
                name,
                path: None,
                modifiers: self.modifiers(opened)?,
            },
        };

        self.close(opened)?;
        Ok(segment)
    }

    fn name(&mut self, opened: usize) -> PlaceholderResult<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, ':' | '|' | ']' | '[') {
                break;
            }
            self.bump(c);
        }

        if self.peek().is_none() {
            return Err(self.error(opened, "unterminated placeholder"));
        }

        let name = &self.src[start..self.pos];
        if name.is_empty() {
            return Err(self.error(opened, "empty name"));
        }
        if !is_valid_name(name) {
            return Err(self.error(opened, &format!("invalid name '{}'", name)));
        }

        Ok(name.to_string())
    }

    fn modifiers(&mut self, opened: usize) -> PlaceholderResult<Vec<Modifier>> {
        let mut modifiers = Vec::new();
        while self.peek() == Some('|') {
            self.bump('|');
            modifiers.push(self.modifier(opened)?);
        }
        Ok(modifiers)
    }

    fn modifier(&mut self, opened: usize) -> PlaceholderResult<Modifier> {
        if self.rest().starts_with("s/") {
            self.pos += 2;
            let search = self.delimited(opened)?;
            let replace = self.delimited(opened)?;
            return Ok(Modifier::Replace { search, replace });
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '|' || c == ']' {
                break;
            }
            self.bump(c);
        }

        let raw = &self.src[start..self.pos];
        if raw == "basename" {
            Ok(Modifier::Basename)
        } else if let Some(suffix) = raw.strip_prefix('%') {
            Ok(Modifier::StripSuffix(suffix.to_string()))
        } else if raw.is_empty() {
            Err(self.error(opened, "empty modifier"))
        } else {
            Err(self.error(opened, &format!("unknown modifier '{}'", raw)))
        }
    }

    /// Read one `/`-terminated part of a substitution, honouring `\/` and `\\`
    fn delimited(&mut self, opened: usize) -> PlaceholderResult<String> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.bump(c);
            match c {
                '/' => return Ok(out),
                '\\' => match self.peek() {
                    Some(next @ ('/' | '\\')) => {
                        self.bump(next);
                        out.push(next);
                    }
                    _ => out.push(c),
                },
                _ => out.push(c),
            }
        }
        Err(self.error(opened, "unterminated substitution"))
    }

    fn close(&mut self, opened: usize) -> PlaceholderResult<()> {
        match self.peek() {
            Some(']') => {
                self.bump(']');
                Ok(())
            }
            None => Err(self.error(opened, "unterminated placeholder")),
            Some(c) => Err(self.error(opened, &format!("unexpected '{}'", c))),
        }
    }

    /// Error naming the fragment from the opening bracket to the next `]`
    fn error(&self, opened: usize, reason: &str) -> PlaceholderError {
        let end = self.src[self.pos..]
            .find(']')
            .map(|idx| self.pos + idx + 1)
            .unwrap_or(self.src.len());
        PlaceholderError::Syntax {
            fragment: self.src[opened..end].to_string(),
            reason: reason.to_string(),
        }
    }
}
