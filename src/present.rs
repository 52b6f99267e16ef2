//! Mapping recorded style kinds to concrete visual attributes.
//!
//! Parsing only records ranges; a caller-supplied [`PresentationResolver`]
//! turns them into whatever its renderer understands.

use std::ops::Range;

use crate::config::{Face, Theme};
use crate::styled::{HeaderLevel, StyleKind, StyledText};

pub trait PresentationResolver {
    type Attributes;

    fn resolve(&self, kind: StyleKind) -> Self::Attributes;

    /// Attributes layered over spoiler ranges, if any.
    fn spoiler(&self) -> Option<Self::Attributes> {
        None
    }
}

/// Attributes applied over a character range. Later runs are layered on top
/// of earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Run<A> {
    pub range: Range<usize>,
    pub attributes: A,
}

/// Resolve every annotation of `text`: the base kind over the whole text,
/// then each style range, then spoilers.
pub fn resolve_runs<R: PresentationResolver>(
    text: &StyledText,
    resolver: &R,
) -> Vec<Run<R::Attributes>> {
    let mut runs = vec![Run {
        range: 0..text.len(),
        attributes: resolver.resolve(text.base),
    }];

    for style in &text.styles {
        for kind in style.flags.kinds() {
            runs.push(Run {
                range: style.range.clone(),
                attributes: resolver.resolve(kind),
            });
        }
    }

    for spoiler in &text.spoilers {
        if let Some(attributes) = resolver.spoiler() {
            runs.push(Run {
                range: spoiler.range.clone(),
                attributes,
            });
        }
    }

    runs
}

impl PresentationResolver for Theme {
    type Attributes = Face;

    fn resolve(&self, kind: StyleKind) -> Face {
        let face = match kind {
            StyleKind::Body => &self.body,
            StyleKind::Bold => &self.bold,
            StyleKind::Italic => &self.italic,
            StyleKind::BoldItalic => &self.bold_italic,
            StyleKind::Strikethrough => &self.strikethrough,
            StyleKind::Superscript => &self.superscript,
            StyleKind::InlineCode => &self.inline_code,
            StyleKind::Header(HeaderLevel::H1) => &self.h1,
            StyleKind::Header(HeaderLevel::H2) => &self.h2,
            StyleKind::Header(HeaderLevel::H3) => &self.h3,
            StyleKind::Header(HeaderLevel::H4) => &self.h4,
            StyleKind::Header(HeaderLevel::H5) => &self.h5,
            StyleKind::Header(HeaderLevel::H6) => &self.h6,
        };
        face.clone()
    }

    fn spoiler(&self) -> Option<Face> {
        Some(self.spoiler.clone())
    }
}
