mod config;
mod cursor;
mod document;
mod error;
mod parser;
mod present;
mod state;
mod styled;
mod tables;

pub use config::{AttributeQuoting, Config, Face, ParseOptions, Theme};
pub use document::{Component, Document, List, ListKind, ListNode, Table};
pub use error::{ConfigError, MalformedInputError, MalformedKind};
pub use present::{PresentationResolver, Run, resolve_runs};
pub use styled::{
    HeaderLevel, LinkRange, SpoilerRange, StyleFlags, StyleKind, StyleRange, StyledText,
};

/// Parse converter HTML into a document using the default options.
pub fn parse(html: &str) -> Result<Document, MalformedInputError> {
    parser::parse(html, &ParseOptions::default())
}

/// Parse converter HTML into a document with custom options.
pub fn parse_with_options(
    html: &str,
    options: &ParseOptions,
) -> Result<Document, MalformedInputError> {
    parser::parse(html, options)
}
