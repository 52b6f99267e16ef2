use std::borrow::Cow;
use std::collections::HashMap;

use crate::config::AttributeQuoting;
use crate::error::{MalformedInputError, MalformedKind};

/// Forward-only position over the input's characters.
pub(crate) struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Whether the input at the cursor starts with `s`.
    pub fn at(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(offset, c)| self.peek_at(offset) == Some(c))
    }

    /// `<a ` or `<a>`, but not `<abbr>` and friends.
    pub fn at_anchor_open(&self) -> bool {
        self.at("<a") && matches!(self.peek_at(2), Some(' ') | Some('>'))
    }

    /// Consume a tag through its closing `>`. An unterminated tag runs to the
    /// end of input and is returned as is.
    pub fn extract_tag(&mut self) -> String {
        let mut tag = String::new();
        while let Some(c) = self.bump() {
            tag.push(c);
            if c == '>' {
                break;
            }
        }
        tag
    }

    /// Consume an entity starting at `&`. Stops after `;`, or before a
    /// character that cannot belong to an entity.
    pub fn extract_entity(&mut self) -> String {
        let mut entity = String::new();
        if let Some(amp) = self.bump() {
            entity.push(amp);
        }
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '<' || c == '&' {
                break;
            }
            entity.push(c);
            self.pos += 1;
            if c == ';' {
                break;
            }
        }
        entity
    }

    /// Skip past the next `count` closing `>` characters.
    pub fn skip_tags(&mut self, count: usize) {
        for _ in 0..count {
            while let Some(c) = self.bump() {
                if c == '>' {
                    break;
                }
            }
        }
    }

    /// Scan `name=value` pairs of the tag at the cursor through its `>`.
    ///
    /// Values are split on spaces and lose the quoting characters on both
    /// sides, so `href=\"x\"` yields `x` under escaped quoting.
    pub fn extract_attributes(
        &mut self,
        quoting: AttributeQuoting,
    ) -> Result<HashMap<String, String>, MalformedInputError> {
        let mut attributes = HashMap::new();

        // Tag name
        while let Some(c) = self.peek() {
            if c == ' ' || c == '>' {
                break;
            }
            self.pos += 1;
        }

        loop {
            match self.peek() {
                None => {
                    return Err(MalformedInputError::new(
                        self.pos,
                        MalformedKind::UnterminatedAttributes,
                    ));
                }
                Some('>') => {
                    self.pos += 1;
                    return Ok(attributes);
                }
                Some(' ') => {
                    self.pos += 1;
                    continue;
                }
                Some(_) => {}
            }

            let mut name = String::new();
            while let Some(c) = self.peek() {
                if c == '=' || c == ' ' || c == '>' {
                    break;
                }
                name.push(c);
                self.pos += 1;
            }

            if self.peek() != Some('=') {
                attributes.insert(name, String::new());
                continue;
            }
            self.pos += 1;

            let value_start = self.pos;
            let mut raw = Vec::new();
            loop {
                match self.peek() {
                    None => {
                        return Err(MalformedInputError::new(
                            self.pos,
                            MalformedKind::UnterminatedAttributes,
                        ));
                    }
                    Some('>') | Some(' ') => break,
                    Some(c) => {
                        raw.push(c);
                        self.pos += 1;
                    }
                }
            }

            let pad = quoting.padding();
            if raw.len() < pad * 2 {
                return Err(MalformedInputError::new(
                    value_start,
                    MalformedKind::ShortAttributeValue,
                ));
            }
            let value: String = raw[pad..raw.len() - pad].iter().collect();
            attributes.insert(name, value);
        }
    }
}

/// Rewrite escaped attribute quotes so tags can be looked up in the tables.
pub(crate) fn normalize_tag(tag: &str, quoting: AttributeQuoting) -> Cow<'_, str> {
    match quoting {
        AttributeQuoting::Escaped if tag.contains("\\\"") => Cow::Owned(tag.replace("\\\"", "\"")),
        _ => Cow::Borrowed(tag),
    }
}
