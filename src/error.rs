use thiserror::Error;

/// The single hard failure a parse can produce.
///
/// Everything else (unknown tags, unknown entities, incomplete images) is
/// tolerated and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed input at character {offset}: {kind}")]
pub struct MalformedInputError {
    /// Character offset into the input where the scan gave up.
    pub offset: usize,
    pub kind: MalformedKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedKind {
    #[error("attribute list is not terminated by '>'")]
    UnterminatedAttributes,
    #[error("attribute value is shorter than its quoting")]
    ShortAttributeValue,
    #[error("code block ends with a dangling backslash")]
    DanglingEscape,
}

impl MalformedInputError {
    pub(crate) fn new(offset: usize, kind: MalformedKind) -> Self {
        Self { offset, kind }
    }
}

/// Failure to read or decode a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}
