use std::ops::Range;

use bitflags::bitflags;

bitflags! {
    /// Inline emphasis kinds that can be active at the same time.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StyleFlags: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const STRIKETHROUGH = 1 << 2;
        const SUPERSCRIPT = 1 << 3;
        const INLINE_CODE = 1 << 4;
    }
}

/// Heading level taken from the numeral of a closing `</hN>` tag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HeaderLevel {
    #[default]
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeaderLevel {
    /// Unrecognized numerals fall back to level 1.
    pub fn from_numeral(c: char) -> Self {
        match c {
            '2' => HeaderLevel::H2,
            '3' => HeaderLevel::H3,
            '4' => HeaderLevel::H4,
            '5' => HeaderLevel::H5,
            '6' => HeaderLevel::H6,
            _ => HeaderLevel::H1,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            HeaderLevel::H1 => 1,
            HeaderLevel::H2 => 2,
            HeaderLevel::H3 => 3,
            HeaderLevel::H4 => 4,
            HeaderLevel::H5 => 5,
            HeaderLevel::H6 => 6,
        }
    }
}

/// Style kinds understood by a presentation resolver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Body,
    Bold,
    Italic,
    BoldItalic,
    Strikethrough,
    Superscript,
    InlineCode,
    Header(HeaderLevel),
}

impl StyleFlags {
    /// Style kinds this flag combination resolves to.
    ///
    /// Bold and italic together collapse into `BoldItalic`; the remaining
    /// flags map one to one.
    pub fn kinds(self) -> Vec<StyleKind> {
        let mut kinds = Vec::new();
        if self.contains(StyleFlags::BOLD | StyleFlags::ITALIC) {
            kinds.push(StyleKind::BoldItalic);
        } else if self.contains(StyleFlags::BOLD) {
            kinds.push(StyleKind::Bold);
        } else if self.contains(StyleFlags::ITALIC) {
            kinds.push(StyleKind::Italic);
        }
        if self.contains(StyleFlags::STRIKETHROUGH) {
            kinds.push(StyleKind::Strikethrough);
        }
        if self.contains(StyleFlags::INLINE_CODE) {
            kinds.push(StyleKind::InlineCode);
        }
        if self.contains(StyleFlags::SUPERSCRIPT) {
            kinds.push(StyleKind::Superscript);
        }
        kinds
    }
}

/// A span where every flag in `flags` was active.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRange {
    pub flags: StyleFlags,
    pub range: Range<usize>,
}

/// A spoiler span. Ids restart at 0 for every text unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpoilerRange {
    pub id: usize,
    pub range: Range<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRange {
    pub href: String,
    pub range: Range<usize>,
}

/// Plain text plus annotations. All offsets count characters, not bytes,
/// and ranges are kept in the order their closing tags were seen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledText {
    pub text: String,
    /// `Body` for paragraphs and cells, `Header(_)` for headings.
    pub base: StyleKind,
    pub styles: Vec<StyleRange>,
    pub spoilers: Vec<SpoilerRange>,
    pub links: Vec<LinkRange>,
}

impl StyledText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            base: StyleKind::Body,
            styles: Vec::new(),
            spoilers: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Header level, if this text is a heading.
    pub fn header_level(&self) -> Option<HeaderLevel> {
        match self.base {
            StyleKind::Header(level) => Some(level),
            _ => None,
        }
    }

    /// Characters covered by `range`, sliced on character boundaries.
    pub fn slice(&self, range: Range<usize>) -> String {
        self.text
            .chars()
            .skip(range.start)
            .take(range.end.saturating_sub(range.start))
            .collect()
    }
}
