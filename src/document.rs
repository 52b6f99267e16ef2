use std::collections::HashSet;

use crate::styled::StyledText;

/// Output of a parse: content blocks in document order plus the links seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub components: Vec<Component>,
    unique_links: HashSet<String>,
    link_order: Vec<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a link target. Returns `true` the first time `href` is seen.
    pub fn register_link(&mut self, href: &str) -> bool {
        if self.unique_links.insert(href.to_string()) {
            self.link_order.push(href.to_string());
            true
        } else {
            false
        }
    }

    /// Distinct link targets in first-seen order.
    pub fn links(&self) -> &[String] {
        &self.link_order
    }

    pub fn unique_links(&self) -> &HashSet<String> {
        &self.unique_links
    }

    pub fn contains_link(&self, href: &str) -> bool {
        self.unique_links.contains(href)
    }
}

/// A finished content block.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Paragraph or heading.
    Text(StyledText),
    /// Verbatim code block, never styled.
    Code(String),
    Image {
        url: String,
        width: f64,
        height: f64,
    },
    Table(Table),
    List(List),
    /// Fragments of one quote level; `depth` starts at 1.
    Blockquote {
        fragments: Vec<StyledText>,
        depth: usize,
    },
}

impl Component {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Component::Text(_) => "text",
            Component::Code(_) => "code",
            Component::Image { .. } => "image",
            Component::Table(_) => "table",
            Component::List(_) => "list",
            Component::Blockquote { .. } => "blockquote",
        }
    }
}

/// Header cells plus body rows wrapped at the header width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<StyledText>,
    pub rows: Vec<Vec<StyledText>>,
}

impl Table {
    /// Append a body cell, starting a new row whenever the current one holds
    /// a multiple of the header count. Without headers nothing wraps.
    pub(crate) fn push_cell(&mut self, cell: StyledText) {
        let width = self.headers.len();
        let wrap = match self.rows.last() {
            None => true,
            Some(row) => width > 0 && !row.is_empty() && row.len() % width == 0,
        };
        if wrap {
            self.rows.push(Vec::new());
        }
        if let Some(row) = self.rows.last_mut() {
            row.push(cell);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub kind: ListKind,
    pub children: Vec<ListNode>,
}

/// One list item, optionally owning the sub-list nested directly under it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListNode {
    pub text: StyledText,
    pub list: Option<List>,
}

impl List {
    /// Number of items, counting nested lists.
    pub fn count_items(&self) -> usize {
        let mut count = self.children.len();
        for node in &self.children {
            if let Some(ref nested) = node.list {
                count += nested.count_items();
            }
        }
        count
    }
}
