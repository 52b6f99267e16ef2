use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::ParseOptions;
use crate::cursor::{Cursor, normalize_tag};
use crate::document::{Component, Document, ListKind};
use crate::error::{MalformedInputError, MalformedKind};
use crate::state::ParseState;
use crate::styled::{HeaderLevel, StyleFlags, StyleKind};
use crate::tables::{TagAction, entity_substitution, structural_actions, style_flag};

/// Parse converter HTML into a document in a single forward pass.
#[tracing::instrument(level = "debug", skip_all, fields(len = html.len()))]
pub fn parse(html: &str, options: &ParseOptions) -> Result<Document, MalformedInputError> {
    let mut parser = Parser {
        cursor: Cursor::new(html),
        state: ParseState::default(),
        options,
    };
    parser.run()?;

    let document = parser.state.document;
    debug!(
        components = document.components.len(),
        links = document.links().len(),
        "parse complete"
    );
    Ok(document)
}

struct Parser<'a> {
    cursor: Cursor,
    state: ParseState,
    options: &'a ParseOptions,
}

impl Parser<'_> {
    fn run(&mut self) -> Result<(), MalformedInputError> {
        while let Some(c) = self.cursor.peek() {
            match c {
                '&' => self.process_entity(),
                '<' => {
                    // Links and inline images carry attributes, handle them first
                    if self.cursor.at_anchor_open() {
                        self.process_link_or_image()?;
                        continue;
                    }

                    let raw = self.cursor.extract_tag();
                    let tag = normalize_tag(&raw, self.options.quoting);
                    if let Some(actions) = structural_actions(&tag) {
                        self.process_actions(actions, &tag)?;
                    } else if let Some(flag) = style_flag(&tag) {
                        self.process_style(flag);
                    } else {
                        trace!(tag = %tag, "ignoring tag");
                    }
                }
                _ => {
                    if self.state.allow_append {
                        self.state.builder.push(c);
                    }
                    self.cursor.bump();
                }
            }
        }
        Ok(())
    }

    fn process_entity(&mut self) {
        let entity = self.cursor.extract_entity();
        if self.state.allow_append {
            self.state.builder.push_str(substitute(&entity));
        }
    }

    fn process_link_or_image(&mut self) -> Result<(), MalformedInputError> {
        let mut attributes = self.cursor.extract_attributes(self.options.quoting)?;
        self.state.marked_index = self.state.builder.len();
        self.state.last_link = attributes
            .remove("href")
            .unwrap_or_else(|| self.options.link_placeholder.clone());
        self.state.document.register_link(&self.state.last_link);

        if self.cursor.at("<img") {
            let attributes = self.cursor.extract_attributes(self.options.quoting)?;
            match image_component(&attributes) {
                Some(image) => self.state.emit(image),
                None => debug!("skipping incomplete inline image"),
            }
            // The closing </a> has no text to mark
            self.cursor.skip_tags(1);
        }
        Ok(())
    }

    /// Consume a `<pre><code>` block verbatim through `</code></pre>`.
    fn process_code_block(&mut self) -> Result<(), MalformedInputError> {
        self.cursor.skip_tags(1);

        let mut code = String::new();
        while let Some(c) = self.cursor.peek() {
            match c {
                '<' => break,
                '\\' => {
                    let escaped = self.cursor.peek_at(1).ok_or_else(|| {
                        MalformedInputError::new(self.cursor.pos(), MalformedKind::DanglingEscape)
                    })?;
                    match escaped {
                        'n' => code.push('\n'),
                        '\\' => code.push('\\'),
                        other => {
                            code.push('\\');
                            code.push(other);
                        }
                    }
                    self.cursor.bump();
                    self.cursor.bump();
                }
                '&' => {
                    let entity = self.cursor.extract_entity();
                    code.push_str(substitute(&entity));
                }
                _ => {
                    code.push(c);
                    self.cursor.bump();
                }
            }
        }

        self.cursor.skip_tags(2);
        self.state.emit(Component::Code(code));
        Ok(())
    }

    fn process_actions(&mut self, actions: TagAction, tag: &str) -> Result<(), MalformedInputError> {
        let state = &mut self.state;

        if actions.contains(TagAction::ALLOW_APPEND) {
            state.allow_append = true;
        } else if actions.contains(TagAction::DISALLOW_APPEND) {
            state.allow_append = false;
        }

        if actions.contains(TagAction::MARK_INDEX) {
            state.marked_index = state.builder.len();
        } else if actions.contains(TagAction::MARK_INDEX_AS_SPOILER) {
            state.builder.add_spoiler(state.marked_index);
        } else if actions.contains(TagAction::MARK_INDEX_AS_LINK) {
            state.builder.add_link(&state.last_link, state.marked_index);
        }

        if actions.contains(TagAction::MARK_CODE_BLOCK) {
            self.process_code_block()?;
        }

        let state = &mut self.state;

        if actions.contains(TagAction::NEW_BUILDER) {
            state.builder.clear();
        }

        if actions.contains(TagAction::POP_BUILDER) {
            state.pop_builder(StyleKind::Body);
        }

        if actions.contains(TagAction::CLOSE_HEADER) {
            // Numeral sits right before the closing '>'
            let level = tag
                .chars()
                .rev()
                .nth(1)
                .map(HeaderLevel::from_numeral)
                .unwrap_or_default();
            state.pop_builder(StyleKind::Header(level));
        }

        if actions.intersects(TagAction::NEW_ORDERED_LIST | TagAction::NEW_UNORDERED_LIST) {
            // Text of the enclosing item is still pending when a nested list opens
            state.pop_list_element();
            let kind = if actions.contains(TagAction::NEW_UNORDERED_LIST) {
                ListKind::Unordered
            } else {
                ListKind::Ordered
            };
            state.lists.open(kind);
        } else if actions.contains(TagAction::CLOSE_LIST) {
            state.close_list();
        } else if actions.contains(TagAction::CLOSE_LIST_ELEMENT) {
            state.pop_list_element();
        }

        if actions.contains(TagAction::NEW_TABLE) {
            state.table = Default::default();
        } else if actions.contains(TagAction::CLOSE_TABLE) {
            state.close_table();
        } else if actions.contains(TagAction::CLOSE_TABLE_HEADER) {
            state.pop_table_header();
        } else if actions.contains(TagAction::CLOSE_TABLE_ROW) {
            state.pop_table_cell();
        }

        if actions.contains(TagAction::OPEN_BLOCK_QUOTE) {
            // Separate an outer quote's text from the nested one
            if state.quote_depth > 0 {
                state.flush_quote();
            }
            state.quote_depth += 1;
        } else if actions.contains(TagAction::CLOSE_BLOCK_QUOTE) {
            state.flush_quote();
            state.quote_depth = state.quote_depth.saturating_sub(1);
        }

        Ok(())
    }

    /// Style tags toggle a set instead of nesting. The first close of an
    /// active flag emits one range for the whole set and swallows the
    /// closing tags of the other open styles.
    fn process_style(&mut self, flag: StyleFlags) {
        let state = &mut self.state;
        if state.active_styles.contains(flag) {
            state
                .builder
                .add_style(state.active_styles, state.style_start);
            self.cursor.skip_tags(state.active_tags.saturating_sub(1));
            state.active_tags = 0;
            state.active_styles = StyleFlags::empty();
        } else {
            if state.active_styles.is_empty() {
                state.style_start = state.builder.len();
            }
            state.active_styles.insert(flag);
            state.active_tags += 1;
        }
    }
}

/// Known entities are replaced, anything else passes through as written.
fn substitute(entity: &str) -> &str {
    entity_substitution(entity).unwrap_or(entity)
}

fn image_component(attributes: &HashMap<String, String>) -> Option<Component> {
    let url = attributes.get("src").filter(|src| !src.is_empty())?;
    let width = attributes.get("width")?.parse::<f64>().ok()?;
    let height = attributes.get("height")?.parse::<f64>().ok()?;
    Some(Component::Image {
        url: url.clone(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AttributeQuoting;
    use crate::document::{List, Table};
    use crate::styled::{LinkRange, SpoilerRange, StyleRange, StyledText};
    use pretty_assertions::assert_eq;

    const COMPREHENSIVE: &str = include_str!("testdata/comprehensive.html");

    fn parse_default(html: &str) -> Document {
        parse(html, &ParseOptions::default()).unwrap()
    }

    fn texts(html: &str) -> Vec<StyledText> {
        parse_default(html)
            .components
            .into_iter()
            .map(|component| match component {
                Component::Text(text) => text,
                other => panic!("expected text, got {other:?}"),
            })
            .collect()
    }

    fn only_list(html: &str) -> List {
        let mut doc = parse_default(html);
        assert_eq!(doc.components.len(), 1);
        match doc.components.remove(0) {
            Component::List(list) => list,
            other => panic!("expected list, got {other:?}"),
        }
    }

    fn only_table(html: &str) -> Table {
        let mut doc = parse_default(html);
        assert_eq!(doc.components.len(), 1);
        match doc.components.remove(0) {
            Component::Table(table) => table,
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn paragraph_with_bold() {
        let texts = texts("<p>a <strong>b</strong> c</p>");
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text, "a b c");
        assert_eq!(texts[0].base, StyleKind::Body);
        assert_eq!(
            texts[0].styles,
            vec![StyleRange {
                flags: StyleFlags::BOLD,
                range: 2..3
            }]
        );
    }

    #[test]
    fn nested_styles_collapse_into_one_range() {
        let texts = texts("<p><strong><em>both</em></strong> <del>gone</del></p>");
        assert_eq!(texts[0].text, "both gone");
        assert_eq!(
            texts[0].styles,
            vec![
                StyleRange {
                    flags: StyleFlags::BOLD | StyleFlags::ITALIC,
                    range: 0..4
                },
                StyleRange {
                    flags: StyleFlags::STRIKETHROUGH,
                    range: 5..9
                },
            ]
        );
    }

    #[test]
    fn triple_nesting_is_one_range() {
        let texts = texts("<p>x <strong><em><del>y</del></em></strong>z</p>");
        assert_eq!(texts[0].text, "x yz");
        assert_eq!(texts[0].styles.len(), 1);
        assert_eq!(
            texts[0].styles[0].flags,
            StyleFlags::BOLD | StyleFlags::ITALIC | StyleFlags::STRIKETHROUGH
        );
        assert_eq!(texts[0].styles[0].range, 2..3);
    }

    #[test]
    fn headings_carry_their_level() {
        let texts = texts("<h2>Two</h2>\n<h6>Six</h6>");
        assert_eq!(texts[0].header_level(), Some(HeaderLevel::H2));
        assert_eq!(texts[1].header_level(), Some(HeaderLevel::H6));
        assert_eq!(texts[1].text, "Six");
    }

    #[test]
    fn flat_ordered_list() {
        let list = only_list("<ol><li>x</li><li>y</li></ol>");
        assert_eq!(list.kind, ListKind::Ordered);
        let items: Vec<&str> = list.children.iter().map(|n| n.text.text.as_str()).collect();
        assert_eq!(items, vec!["x", "y"]);
        assert!(list.children.iter().all(|n| n.list.is_none()));
    }

    #[test]
    fn nested_list_hangs_off_second_item() {
        let list = only_list("<ol>\n<li>one</li>\n<li>two\n<ol>\n<li>aaa</li>\n</ol></li>\n</ol>");
        assert_eq!(list.children.len(), 2);
        assert!(list.children[0].list.is_none());
        assert_eq!(list.children[1].text.text, "two\n");
        let nested = list.children[1].list.as_ref().unwrap();
        assert_eq!(nested.children.len(), 1);
        assert_eq!(nested.children[0].text.text, "aaa");
    }

    #[test]
    fn mixed_list_kinds() {
        let list = only_list("<ul><li>a<ol><li>b</li></ol></li><li>c</li></ul>");
        assert_eq!(list.kind, ListKind::Unordered);
        assert_eq!(list.children.len(), 2);
        assert_eq!(
            list.children[0].list.as_ref().unwrap().kind,
            ListKind::Ordered
        );
        assert_eq!(list.children[1].text.text, "c");
    }

    #[test]
    fn table_rows_wrap_at_header_width() {
        let table = only_table(
            "<table><thead>\n<tr>\n<th>A</th>\n<th>B</th>\n</tr>\n</thead><tbody>\n\
             <tr>\n<td>1</td>\n<td>2</td>\n</tr>\n<tr>\n<td>3</td>\n<td>4</td>\n</tr>\n\
             </tbody></table>",
        );
        assert_eq!(table.headers.len(), 2);
        assert_eq!(table.rows.len(), 2);
        let cells: Vec<Vec<&str>> = table
            .rows
            .iter()
            .map(|row| row.iter().map(|c| c.text.as_str()).collect())
            .collect();
        assert_eq!(cells, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn short_final_row_is_kept() {
        let table = only_table(
            "<table><tr><th>A</th><th>B</th></tr>\
             <tr><td>1</td><td>2</td><td>3</td></tr></table>",
        );
        let lens: Vec<usize> = table.rows.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![2, 1]);
    }

    #[test]
    fn aligned_cells_are_recognized() {
        let table = only_table(
            r#"<table><tr><th align=\"left\">Name</th><th align=\"right\">Pay</th></tr><tr><td align=\"left\">Joe</td><td align=\"right\">$1</td></tr></table>"#,
        );
        assert_eq!(table.headers[1].text, "Pay");
        assert_eq!(table.rows[0][1].text, "$1");
    }

    #[test]
    fn blockquote_collects_paragraphs() {
        let doc = parse_default("<blockquote>\n<p>one</p>\n\n<p>two</p>\n</blockquote>");
        assert_eq!(doc.components.len(), 1);
        match &doc.components[0] {
            Component::Blockquote { fragments, depth } => {
                assert_eq!(*depth, 1);
                let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
                assert_eq!(texts, vec!["one", "two"]);
            }
            other => panic!("expected blockquote, got {other:?}"),
        }
    }

    #[test]
    fn nested_blockquote_flushes_outer_first() {
        let doc = parse_default(
            "<blockquote><p>a</p><blockquote><p>b</p></blockquote></blockquote><p>c</p>",
        );
        assert_eq!(
            doc.components,
            vec![
                Component::Blockquote {
                    fragments: vec![StyledText::plain("a")],
                    depth: 1
                },
                Component::Blockquote {
                    fragments: vec![StyledText::plain("b")],
                    depth: 2
                },
                Component::Text(StyledText::plain("c")),
            ]
        );
    }

    #[test]
    fn empty_blockquote_emits_nothing() {
        assert!(parse_default("<blockquote>\n</blockquote>").components.is_empty());
    }

    #[test]
    fn spoiler_ids_are_scoped_per_paragraph() {
        let texts = texts(
            r#"<p><span class=\"md-spoiler-text\">s1</span> and <span class=\"md-spoiler-text\">s2</span></p><p>x <span class=\"md-spoiler-text\">s3</span></p>"#,
        );
        assert_eq!(texts[0].text, "s1 and s2");
        assert_eq!(
            texts[0].spoilers,
            vec![
                SpoilerRange { id: 0, range: 0..2 },
                SpoilerRange { id: 1, range: 7..9 },
            ]
        );
        assert_eq!(texts[1].spoilers, vec![SpoilerRange { id: 0, range: 2..4 }]);
    }

    #[test]
    fn code_block_is_literal() {
        let doc = parse_default(
            r#"<pre><code>line1\nprint(&quot;hi&quot;) \\ \t</code></pre><p>after</p>"#,
        );
        assert_eq!(
            doc.components,
            vec![
                Component::Code("line1\nprint(\"hi\") \\ \\t".to_string()),
                Component::Text(StyledText::plain("after")),
            ]
        );
    }

    #[test]
    fn code_block_ends_at_first_tag() {
        let doc = parse_default("<p>a</p><pre><code>x <strong></code></pre>");
        // The code text stops at the first '<'
        assert_eq!(doc.components[1], Component::Code("x ".to_string()));
    }

    #[test]
    fn links_dedupe_in_scan_order() {
        let doc = parse_default(
            r#"<p><a href=\"https://a.com\">a</a> <a href=\"https://b.com\">b</a> <a href=\"https://a.com\">c</a></p>"#,
        );
        assert_eq!(doc.links(), ["https://a.com", "https://b.com"]);
        assert_eq!(doc.unique_links().len(), 2);
        match &doc.components[0] {
            Component::Text(text) => assert_eq!(
                text.links,
                vec![
                    LinkRange { href: "https://a.com".into(), range: 0..1 },
                    LinkRange { href: "https://b.com".into(), range: 2..3 },
                    LinkRange { href: "https://a.com".into(), range: 4..5 },
                ]
            ),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn anchor_without_href_uses_placeholder() {
        let doc = parse_default("<p><a>x</a></p>");
        assert_eq!(doc.links(), ["https://google.com"]);
    }

    #[test]
    fn inline_image_bypasses_text() {
        let doc = parse_default(
            r#"<p><a href=\"https://i.example/x.png\"><img src=\"https://i.example/x.png\" width=\"100\" height=\"50.5\"></a> caption</p>"#,
        );
        assert_eq!(
            doc.components,
            vec![
                Component::Image {
                    url: "https://i.example/x.png".into(),
                    width: 100.0,
                    height: 50.5
                },
                Component::Text(StyledText::plain(" caption")),
            ]
        );
        assert!(doc.contains_link("https://i.example/x.png"));
    }

    #[test]
    fn incomplete_image_is_omitted() {
        let doc = parse_default(
            r#"<p><a href=\"https://x.io\"><img src=\"https://x.io/i.png\" width=\"wide\" height=\"5\"></a></p>"#,
        );
        assert_eq!(doc.components, vec![Component::Text(StyledText::plain(""))]);
        assert_eq!(doc.links(), ["https://x.io"]);
    }

    #[test]
    fn entities_substitute_or_pass_through() {
        let texts = texts("<p>don&#39;t &amp; &copy; &nbsp</p>");
        assert_eq!(texts[0].text, "don't & &copy; &nbsp");
    }

    #[test]
    fn entity_length_counts_substitution() {
        let texts = texts("<p>&lt;<strong>b</strong></p>");
        assert_eq!(texts[0].text, "<b");
        assert_eq!(texts[0].styles[0].range, 1..2);
    }

    #[test]
    fn text_outside_containers_is_dropped() {
        let texts = texts(r#"<div class=\"md\">noise &amp;<p>a<br>b</p>\n\n</div>"#);
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text, "ab");
    }

    #[test]
    fn stray_list_close_is_ignored() {
        let texts = texts("</ul><p>x</p>");
        assert_eq!(texts[0].text, "x");
    }

    #[test]
    fn plain_quoting() {
        let options = ParseOptions {
            quoting: AttributeQuoting::Plain,
            ..Default::default()
        };
        let doc = parse(
            r#"<p><a href="https://a.com">a</a> <span class="md-spoiler-text">s</span></p>"#,
            &options,
        )
        .unwrap();
        assert_eq!(doc.links(), ["https://a.com"]);
        match &doc.components[0] {
            Component::Text(text) => assert_eq!(text.spoilers.len(), 1),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_anchor_is_malformed() {
        let err = parse(r#"<p><a href=\"x"#, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, MalformedKind::UnterminatedAttributes);
    }

    #[test]
    fn short_attribute_is_malformed() {
        let err = parse(r#"<p><a href=x>y</a></p>"#, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, MalformedKind::ShortAttributeValue);
    }

    #[test]
    fn dangling_code_escape_is_malformed() {
        let err = parse(r"<pre><code>abc\", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, MalformedKind::DanglingEscape);
        assert_eq!(err.offset, 14);
    }

    #[test]
    fn trailing_lt_is_tolerated() {
        let texts = texts("<p>a</p><");
        assert_eq!(texts[0].text, "a");
    }

    #[test]
    fn parsing_is_deterministic() {
        assert_eq!(parse_default(COMPREHENSIVE), parse_default(COMPREHENSIVE));
    }

    #[test]
    fn comprehensive_document() {
        let doc = parse_default(COMPREHENSIVE);
        let kinds: Vec<&str> = doc.components.iter().map(Component::kind_name).collect();
        assert_eq!(
            kinds,
            vec![
                "text", "text", "text", "table", "text", "list", "text", "blockquote", "text",
                "code"
            ]
        );
        assert_eq!(
            doc.links(),
            ["https://google.com", "https://reddit.com", "https://www.google.com"]
        );
        assert_eq!(doc.unique_links().len(), 3);

        let Component::Text(header) = &doc.components[0] else {
            panic!("expected header");
        };
        assert_eq!(header.text, "Header 1");
        assert_eq!(header.header_level(), Some(HeaderLevel::H1));
        assert_eq!(header.links[0].range, 0..8);

        let Component::Table(table) = &doc.components[3] else {
            panic!("expected table");
        };
        assert_eq!(table.headers.len(), 2);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0].text, "Joe Mama");

        let Component::List(list) = &doc.components[5] else {
            panic!("expected list");
        };
        assert_eq!(list.children.len(), 2);
        assert_eq!(list.count_items(), 4);
        let sub = list.children[0].list.as_ref().unwrap();
        let subsub = sub.children[0].list.as_ref().unwrap();
        assert_eq!(subsub.children[0].text.text, "aaa");
        assert_eq!(list.children[1].text.text, "This linked list element");
        assert_eq!(list.children[1].text.links[0].range, 5..11);

        let Component::Blockquote { fragments, depth } = &doc.components[7] else {
            panic!("expected blockquote");
        };
        assert_eq!(*depth, 1);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[1].text, "Line 2");

        assert_eq!(
            doc.components[9],
            Component::Code("let width: Double = 3.0\nprint(\"Width: \\(width)\")\n".to_string())
        );
    }
}
