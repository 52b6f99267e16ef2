use std::mem;
use std::ops::Range;

use tracing::{debug, trace};

use crate::document::{Component, Document, List, ListKind, ListNode, Table};
use crate::styled::{LinkRange, SpoilerRange, StyleFlags, StyleKind, StyleRange, StyledText};

/// Text accumulator for the block currently being assembled, with the
/// ranges recorded against it.
#[derive(Default)]
pub(crate) struct TextBuilder {
    text: String,
    // Length in characters
    len: usize,
    styles: Vec<StyleRange>,
    spoilers: Vec<Range<usize>>,
    links: Vec<LinkRange>,
}

impl TextBuilder {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
        self.len += 1;
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
        self.len += s.chars().count();
    }

    pub fn add_style(&mut self, flags: StyleFlags, start: usize) {
        self.styles.push(StyleRange {
            flags,
            range: start..self.len,
        });
    }

    pub fn add_spoiler(&mut self, start: usize) {
        self.spoilers.push(start..self.len);
    }

    pub fn add_link(&mut self, href: &str, start: usize) {
        self.links.push(LinkRange {
            href: href.to_string(),
            range: start..self.len,
        });
    }

    /// Finish the accumulated text and reset the builder. Spoiler ids count
    /// from 0 within this text.
    pub fn finish(&mut self, base: StyleKind) -> StyledText {
        let builder = mem::take(self);
        StyledText {
            text: builder.text,
            base,
            styles: builder.styles,
            spoilers: builder
                .spoilers
                .into_iter()
                .enumerate()
                .map(|(id, range)| SpoilerRange { id, range })
                .collect(),
            links: builder.links,
        }
    }

    pub fn clear(&mut self) {
        *self = TextBuilder::default();
    }
}

struct ListFrame {
    kind: ListKind,
    items: Vec<ItemRecord>,
}

struct ItemRecord {
    text: StyledText,
    // Index of the nested list frame
    child: Option<usize>,
}

/// Lists under construction, stored flat and addressed by index. `open`
/// holds the frames still being filled, innermost last.
#[derive(Default)]
pub(crate) struct ListArena {
    frames: Vec<ListFrame>,
    open: Vec<usize>,
}

impl ListArena {
    pub fn is_open(&self) -> bool {
        !self.open.is_empty()
    }

    pub fn open(&mut self, kind: ListKind) {
        self.frames.push(ListFrame {
            kind,
            items: Vec::new(),
        });
        self.open.push(self.frames.len() - 1);
    }

    /// Append an item to the innermost open list. Returns the text back if
    /// no list is open.
    pub fn push_item(&mut self, text: StyledText) -> Result<(), StyledText> {
        match self.open.last() {
            Some(&index) => {
                self.frames[index]
                    .items
                    .push(ItemRecord { text, child: None });
                Ok(())
            }
            None => Err(text),
        }
    }

    /// Close the innermost list. A top-level list is returned as a finished
    /// tree; a nested one is attached to the last item of its parent.
    pub fn close(&mut self) -> Option<List> {
        let index = self.open.pop()?;
        match self.open.last() {
            None => {
                let list = self.build(index);
                self.frames.clear();
                Some(list)
            }
            Some(&parent) => {
                let items = &mut self.frames[parent].items;
                if items.is_empty() {
                    debug!("nested list without a parent item");
                    items.push(ItemRecord {
                        text: StyledText::plain(""),
                        child: None,
                    });
                }
                if let Some(last) = items.last_mut() {
                    last.child = Some(index);
                }
                None
            }
        }
    }

    fn build(&mut self, index: usize) -> List {
        let kind = self.frames[index].kind;
        let records = mem::take(&mut self.frames[index].items);
        let children = records
            .into_iter()
            .map(|record| ListNode {
                text: record.text,
                list: record.child.map(|child| self.build(child)),
            })
            .collect();
        List { kind, children }
    }
}

/// Everything a single parse mutates. Created per call and dropped when the
/// call returns, except for the document it hands back.
#[derive(Default)]
pub(crate) struct ParseState {
    pub allow_append: bool,
    pub builder: TextBuilder,

    // Style tracking
    pub active_styles: StyleFlags,
    pub active_tags: usize,
    pub style_start: usize,

    // Start offset of the pending spoiler or link
    pub marked_index: usize,
    pub last_link: String,

    // Blockquote state
    pub quote_depth: usize,
    pub quote_fragments: Vec<StyledText>,

    pub table: Table,
    pub lists: ListArena,

    pub document: Document,
}

impl ParseState {
    pub fn emit(&mut self, component: Component) {
        trace!(kind = component.kind_name(), "component");
        self.document.components.push(component);
    }

    /// Finish the builder as a paragraph or heading, into the pending quote
    /// when inside a blockquote.
    pub fn pop_builder(&mut self, base: StyleKind) {
        let text = self.builder.finish(base);
        if self.quote_depth > 0 {
            self.quote_fragments.push(text);
        } else {
            self.emit(Component::Text(text));
        }
    }

    pub fn pop_table_header(&mut self) {
        let cell = self.builder.finish(StyleKind::Body);
        self.table.headers.push(cell);
    }

    pub fn pop_table_cell(&mut self) {
        if self.table.headers.is_empty() {
            debug!("table cell without headers");
        }
        let cell = self.builder.finish(StyleKind::Body);
        self.table.push_cell(cell);
    }

    /// Flush pending text as an item of the innermost list. Nothing happens
    /// when there is no pending text.
    pub fn pop_list_element(&mut self) {
        if self.builder.is_empty() {
            return;
        }
        let text = self.builder.finish(StyleKind::Body);
        if let Err(text) = self.lists.push_item(text) {
            debug!("list item outside of a list");
            self.emit(Component::Text(text));
        }
    }

    pub fn close_list(&mut self) {
        if !self.lists.is_open() {
            debug!("list close without an open list");
            return;
        }
        if let Some(list) = self.lists.close() {
            self.emit(Component::List(list));
        }
    }

    pub fn close_table(&mut self) {
        let table = mem::take(&mut self.table);
        self.emit(Component::Table(table));
    }

    /// Emit the pending quote fragments at the current depth.
    pub fn flush_quote(&mut self) {
        if self.quote_fragments.is_empty() {
            return;
        }
        let fragments = mem::take(&mut self.quote_fragments);
        let depth = self.quote_depth;
        self.emit(Component::Blockquote { fragments, depth });
    }
}
