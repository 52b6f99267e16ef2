use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::ConfigError;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub parser: ParseOptions,
    pub theme: Theme,
}

/// How attribute values are wrapped by the upstream converter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeQuoting {
    /// `href=\"value\"`: two delimiter characters on each side.
    #[default]
    Escaped,
    /// `href="value"`: one delimiter character on each side.
    Plain,
}

impl AttributeQuoting {
    /// Characters stripped from each end of an attribute value.
    pub fn padding(self) -> usize {
        match self {
            AttributeQuoting::Escaped => 2,
            AttributeQuoting::Plain => 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParseOptions {
    pub quoting: AttributeQuoting,
    /// Link target recorded for anchors without an `href`.
    pub link_placeholder: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            quoting: AttributeQuoting::Escaped,
            link_placeholder: "https://google.com".to_string(),
        }
    }
}

/// Concrete visual attributes for one style kind.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Face {
    pub font: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<String>,
    pub strikethrough: bool,
    pub baseline_offset: f32,
}

impl Default for Face {
    fn default() -> Self {
        Self {
            font: "system".to_string(),
            size: 13.0,
            bold: false,
            italic: false,
            color: None,
            strikethrough: false,
            baseline_offset: 0.0,
        }
    }
}

impl Face {
    fn with(f: impl FnOnce(&mut Face)) -> Self {
        let mut face = Face::default();
        f(&mut face);
        face
    }

    fn heading(size: f32) -> Self {
        Face::with(|face| {
            face.size = size;
            face.bold = true;
        })
    }
}

/// Reference presentation: one face per style kind.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Theme {
    pub body: Face,
    pub bold: Face,
    pub italic: Face,
    pub bold_italic: Face,
    pub strikethrough: Face,
    pub superscript: Face,
    pub inline_code: Face,
    pub spoiler: Face,
    pub h1: Face,
    pub h2: Face,
    pub h3: Face,
    pub h4: Face,
    pub h5: Face,
    pub h6: Face,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            body: Face::default(),
            bold: Face::with(|face| face.bold = true),
            italic: Face::with(|face| face.italic = true),
            bold_italic: Face::with(|face| {
                face.bold = true;
                face.italic = true;
            }),
            strikethrough: Face::with(|face| {
                face.strikethrough = true;
                face.color = Some("#ff3b30".to_string());
            }),
            superscript: Face::with(|face| {
                face.size = 9.0;
                face.baseline_offset = 5.0;
            }),
            inline_code: Face::with(|face| {
                face.font = "monospace".to_string();
                face.color = Some("#ff2d55".to_string());
            }),
            spoiler: Face::with(|face| face.color = Some("#34c759".to_string())),
            h1: Face::heading(26.0),
            h2: Face::heading(22.0),
            h3: Face::heading(19.0),
            h4: Face::heading(17.0),
            h5: Face::heading(15.0),
            h6: Face::heading(14.0),
        }
    }
}

impl Config {
    /// Configuration bundled with the crate.
    pub fn compiled_default() -> Self {
        // Validated by build.rs, so this never falls back in practice.
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return the bundled defaults if the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::compiled_default()),
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}
