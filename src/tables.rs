//! Fixed vocabulary of the upstream converter: structural tags, style tags
//! and entities.

use bitflags::bitflags;

use crate::styled::StyleFlags;

bitflags! {
    /// State transitions triggered by a structural tag.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct TagAction: u32 {
        const NEW_BUILDER = 1 << 0;
        const POP_BUILDER = 1 << 1;
        const ALLOW_APPEND = 1 << 2;
        const DISALLOW_APPEND = 1 << 3;
        const MARK_INDEX = 1 << 4;
        const MARK_INDEX_AS_SPOILER = 1 << 5;
        const MARK_INDEX_AS_LINK = 1 << 6;
        const MARK_CODE_BLOCK = 1 << 7;
        const CLOSE_HEADER = 1 << 8;
        const CLOSE_TABLE_HEADER = 1 << 9;
        const CLOSE_TABLE_ROW = 1 << 10;
        const NEW_TABLE = 1 << 11;
        const CLOSE_TABLE = 1 << 12;
        const NEW_ORDERED_LIST = 1 << 13;
        const NEW_UNORDERED_LIST = 1 << 14;
        const CLOSE_LIST = 1 << 15;
        const CLOSE_LIST_ELEMENT = 1 << 16;
        const OPEN_BLOCK_QUOTE = 1 << 17;
        const CLOSE_BLOCK_QUOTE = 1 << 18;

        /// Container tags that start capturing text.
        const OPEN_CONTAINER = Self::NEW_BUILDER.bits() | Self::ALLOW_APPEND.bits();
    }
}

/// Actions for a structural tag. `tag` must already have its attribute
/// quoting normalized to plain `"`.
pub fn structural_actions(tag: &str) -> Option<TagAction> {
    let actions = match tag {
        "<p>" => TagAction::OPEN_CONTAINER,
        "</p>" => TagAction::POP_BUILDER | TagAction::DISALLOW_APPEND,
        "<span class=\"md-spoiler-text\">" => TagAction::MARK_INDEX,
        "</span>" => TagAction::MARK_INDEX_AS_SPOILER,
        "</a>" => TagAction::MARK_INDEX_AS_LINK,
        "<pre>" => TagAction::MARK_CODE_BLOCK,
        "<h1>" | "<h2>" | "<h3>" | "<h4>" | "<h5>" | "<h6>" => TagAction::OPEN_CONTAINER,
        "</h1>" | "</h2>" | "</h3>" | "</h4>" | "</h5>" | "</h6>" => {
            TagAction::CLOSE_HEADER | TagAction::DISALLOW_APPEND
        }
        "<th>"
        | "<th align=\"left\">"
        | "<th align=\"right\">"
        | "<th align=\"center\">" => TagAction::OPEN_CONTAINER,
        "</th>" => TagAction::CLOSE_TABLE_HEADER | TagAction::DISALLOW_APPEND,
        "<td>"
        | "<td align=\"left\">"
        | "<td align=\"right\">"
        | "<td align=\"center\">" => TagAction::OPEN_CONTAINER,
        "</td>" => TagAction::CLOSE_TABLE_ROW | TagAction::DISALLOW_APPEND,
        "<table>" => TagAction::NEW_TABLE,
        "</table>" => TagAction::CLOSE_TABLE,
        "<ul>" => TagAction::NEW_UNORDERED_LIST | TagAction::DISALLOW_APPEND,
        "<ol>" => TagAction::NEW_ORDERED_LIST | TagAction::DISALLOW_APPEND,
        "</ul>" | "</ol>" => TagAction::CLOSE_LIST,
        "<li>" => TagAction::OPEN_CONTAINER,
        "</li>" => TagAction::CLOSE_LIST_ELEMENT | TagAction::DISALLOW_APPEND,
        "<blockquote>" => TagAction::OPEN_BLOCK_QUOTE,
        "</blockquote>" => TagAction::CLOSE_BLOCK_QUOTE,
        _ => return None,
    };
    Some(actions)
}

/// Style flag for an inline style tag. Opening and closing tags map to the
/// same flag; the tracker tells them apart by whether the flag is active.
pub fn style_flag(tag: &str) -> Option<StyleFlags> {
    match tag {
        "<strong>" | "</strong>" => Some(StyleFlags::BOLD),
        "<em>" | "</em>" => Some(StyleFlags::ITALIC),
        "<del>" | "</del>" => Some(StyleFlags::STRIKETHROUGH),
        "<sup>" | "</sup>" => Some(StyleFlags::SUPERSCRIPT),
        "<code>" | "</code>" => Some(StyleFlags::INLINE_CODE),
        _ => None,
    }
}

/// Literal replacement for a known entity, `None` if unknown.
pub fn entity_substitution(entity: &str) -> Option<&'static str> {
    match entity {
        "&#39;" | "&#039;" | "&#x27;" => Some("'"),
        "&amp;" => Some("&"),
        "&quot;" => Some("\""),
        "&#32;" => Some(" "),
        "&lt;" => Some("<"),
        "&gt;" => Some(">"),
        "&nbsp;" => Some("\u{a0}"),
        "&#x200B;" => Some(""),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_enable_capture() {
        for tag in ["<p>", "<h3>", "<td align=\"left\">", "<th>", "<li>"] {
            let actions = structural_actions(tag).unwrap();
            assert!(actions.contains(TagAction::ALLOW_APPEND), "{tag}");
            assert!(actions.contains(TagAction::NEW_BUILDER), "{tag}");
        }
        assert!(!structural_actions("<ul>").unwrap().contains(TagAction::ALLOW_APPEND));
    }

    #[test]
    fn unknown_tags_have_no_actions() {
        assert_eq!(structural_actions("<div class=\"md\">"), None);
        assert_eq!(structural_actions("<strong>"), None);
        assert_eq!(style_flag("<p>"), None);
    }

    #[test]
    fn style_tags_share_flag_with_their_close() {
        assert_eq!(style_flag("<em>"), style_flag("</em>"));
        assert_eq!(style_flag("</code>"), Some(StyleFlags::INLINE_CODE));
    }

    #[test]
    fn entities() {
        assert_eq!(entity_substitution("&#039;"), Some("'"));
        assert_eq!(entity_substitution("&#x200B;"), Some(""));
        assert_eq!(entity_substitution("&copy;"), None);
    }
}
