use std::str::FromStr;

use strum::EnumString;

use crate::error::ConfigError;

pub const DEFAULT_PLAY_SYMBOL: &str = "▶";
pub const DEFAULT_PAUSE_SYMBOL: &str = "\u{f04c}";
pub const DEFAULT_SEPARATOR: &str = " - ";
pub const DEFAULT_ORDER: &str = "SYMBOL:ARTIST:ALBUM:TITLE:POSITION";

/// An element of the status line text.
#[derive(EnumString, strum::Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Field {
    Symbol,
    Artist,
    Album,
    Title,
    Position,
}

/// Colon-separated field order, e.g. `SYMBOL:ARTIST:TITLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOrder(pub Vec<Field>);

impl FromStr for FieldOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = Vec::new();

        for part in s.split(':').map(str::trim).filter(|p| !p.is_empty()) {
            let field =
                Field::from_str(part).map_err(|_| ConfigError::UnknownField(part.to_string()))?;

            if fields.contains(&field) {
                return Err(ConfigError::DuplicateField(field));
            }
            fields.push(field);
        }

        if fields.is_empty() {
            return Err(ConfigError::EmptyOrder);
        }

        Ok(FieldOrder(fields))
    }
}

impl Default for FieldOrder {
    fn default() -> Self {
        FieldOrder(vec![
            Field::Symbol,
            Field::Artist,
            Field::Album,
            Field::Title,
            Field::Position,
        ])
    }
}

/// Settings resolved once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub play_symbol: String,
    pub pause_symbol: String,
    pub separator: String,
    pub order: Vec<Field>,
    /// Newly appearing or newly playing players take focus.
    pub auto_focus: bool,
    /// Show the playback position and reprint it every second.
    pub show_position: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            play_symbol: DEFAULT_PLAY_SYMBOL.to_string(),
            pause_symbol: DEFAULT_PAUSE_SYMBOL.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            order: FieldOrder::default().0,
            auto_focus: false,
            show_position: false,
        }
    }
}
