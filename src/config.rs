use std::path::PathBuf;

use anyhow::Result;
use crossterm::style::Stylize;
use figment::{
    providers::{Data, Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{
    client::{CONNECT_TIMEOUT_MS, READ_TIMEOUT_MS},
    default_colors::*,
    query::BOOK_SEARCH_URL,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    bold:   bool,
    italic: bool,
    color:  crossterm::style::Color,
}

impl StyleConfig {
    fn style(&self, s: impl ToString) -> String {
        let mut s = s.to_string().with(self.color);
        if self.bold {
            s = s.bold();
        }
        if self.italic {
            s = s.italic();
        }
        s.to_string()
    }
}

pub trait Styleable {
    fn style(&self, c: &StyleConfig) -> String;
}

impl<T> Styleable for T
where
    T: ToString + std::fmt::Display,
{
    fn style(&self, c: &StyleConfig) -> String {
        c.style(self)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color:  COLOR_WHITE,
            bold:   false,
            italic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub prefix:            String,
    pub suffix:            String,
    pub description:       String,
    pub style_prefix:      StyleConfig,
    pub style_suffix:      StyleConfig,
    pub style_description: StyleConfig,
    pub style_content:     StyleConfig,
}

impl OutputConfig {
    pub fn format_str(&self, content: impl ToString) -> String {
        self.wrap(content.to_string().style(&self.style_content))
    }

    fn wrap(&self, content: String) -> String {
        let prefix = self.prefix.style(&self.style_prefix);
        let suffix = self.suffix.style(&self.style_suffix);
        if self.description.is_empty() {
            return format!("{prefix}{content}{suffix}");
        }
        let description = self.description.style(&self.style_description);
        format!("{prefix}{description} {content}{suffix}")
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix:            "".into(),
            suffix:            "".into(),
            description:       "".into(),
            style_prefix:      StyleConfig::default(),
            style_suffix:      StyleConfig::default(),
            style_description: StyleConfig {
                italic: true,
                ..StyleConfig::default()
            },
            style_content:     StyleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub endpoint:           String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms:    u64,
    pub trailing_separator: bool,
    pub load_thumbnails:    bool,
    pub state_location:     PathBuf,
    pub history_location:   PathBuf,
    pub output_index:       OutputConfig,
    pub output_title:       OutputConfig,
    pub output_authors:     OutputConfig,
    pub output_description: OutputConfig,
    pub output_preview:     OutputConfig,
    pub output_thumbnail:   OutputConfig,
    pub output_notice:      OutputConfig,
    pub output_error:       OutputConfig,
}

impl Config {
    pub fn default_as_string() -> Result<String> {
        Ok(toml::to_string(&Self::default())?)
    }

    pub fn read_config() -> Result<Self> {
        Self::figment(Toml::file("config.toml"))
    }

    fn figment(toml: Data<Toml>) -> Result<Self> {
        Ok(Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(toml)
            .merge(Env::prefixed("BOOKCAT_"))
            .extract()?)
    }

    /// `state_location` with `~` and environment variables expanded
    pub fn state_path(&self) -> Result<PathBuf> {
        Ok(shellexpand::path::full(&self.state_location)?.into_owned())
    }

    pub fn history_path(&self) -> Result<PathBuf> {
        Ok(shellexpand::path::full(&self.history_location)?.into_owned())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint:           BOOK_SEARCH_URL.into(),
            connect_timeout_ms: CONNECT_TIMEOUT_MS,
            read_timeout_ms:    READ_TIMEOUT_MS,
            trailing_separator: true,
            load_thumbnails:    true,
            state_location:     PathBuf::from("~/.local/share/bookcat/session.json"),
            history_location:   PathBuf::from("~/.local/share/bookcat/history.txt"),
            output_index:       OutputConfig {
                prefix: "[".into(),
                suffix: "]".into(),
                style_content: StyleConfig {
                    color: COLOR_DIMMED,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_title:       OutputConfig {
                style_content: StyleConfig {
                    bold: true,
                    color: COLOR_BOOK,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_authors:     OutputConfig {
                description: "by".into(),
                style_content: StyleConfig {
                    color: COLOR_AUTHOR,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_description: OutputConfig {
                style_content: StyleConfig {
                    color: COLOR_DESCRIPTION,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_preview:     OutputConfig {
                description: "Preview:".into(),
                style_content: StyleConfig {
                    color: COLOR_LINK,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_thumbnail:   OutputConfig {
                description: "Thumbnail:".into(),
                style_content: StyleConfig {
                    color: COLOR_DIMMED,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_notice:      OutputConfig {
                style_content: StyleConfig {
                    italic: true,
                    color: COLOR_NOTICE,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
            output_error:       OutputConfig {
                description: "Error".into(),
                style_content: StyleConfig {
                    color: COLOR_ERROR,
                    ..StyleConfig::default()
                },
                ..OutputConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_search_constants() {
        let config = Config::default();
        assert_eq!(config.endpoint, "https://www.googleapis.com/books/v1/volumes?q=");
        assert_eq!(config.connect_timeout_ms, 15000);
        assert_eq!(config.read_timeout_ms, 10000);
        assert!(config.trailing_separator);
    }

    #[test]
    fn default_string_parses_back() {
        let s = Config::default_as_string().unwrap();
        let parsed = Config::figment(Toml::string(&s)).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn toml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "trailing_separator = false\nread_timeout_ms = 500").unwrap();
        let config = Config::figment(Toml::file(file.path())).unwrap();
        assert!(!config.trailing_separator);
        assert_eq!(config.read_timeout_ms, 500);
        assert_eq!(config.connect_timeout_ms, 15000);
    }

    #[test]
    fn plain_output_keeps_content() {
        let output = OutputConfig {
            prefix: "[".into(),
            suffix: "]".into(),
            ..OutputConfig::default()
        };
        let s = output.format_str("7");
        assert!(s.contains('['));
        assert!(s.contains('7'));
        assert!(s.contains(']'));
    }
}
