use std::sync::Arc;

use serde::Serialize;

use crate::{
    config::{Config, Field},
    player::{PlayerHandle, PlayerSnapshot},
};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackClass {
    Playing,
    Paused,
}

/// One line of bar output. `Empty` serializes as `{}`, which tells the bar to
/// hide the module.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StatusLine {
    Track {
        text: String,
        tooltip: String,
        class: PlaybackClass,
    },
    Empty {},
}

impl StatusLine {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Renders the focused player with the startup configuration.
#[derive(Debug, Clone)]
pub struct Presenter {
    config: Arc<Config>,
}

impl Presenter {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn present(&self, handle: Option<&PlayerHandle>) -> StatusLine {
        let Some(handle) = handle else {
            return StatusLine::Empty {};
        };

        let snapshot = &handle.snapshot;
        if !snapshot.has_track_info() {
            return StatusLine::Empty {};
        }

        let (class, symbol) = if snapshot.playing {
            (PlaybackClass::Playing, &self.config.pause_symbol)
        } else {
            (PlaybackClass::Paused, &self.config.play_symbol)
        };

        let position = if self.config.show_position {
            format_position(snapshot)
        } else {
            String::new()
        };

        let items: Vec<(Field, &str)> = self
            .config
            .order
            .iter()
            .map(|field| {
                let value = match field {
                    Field::Symbol => symbol.as_str(),
                    Field::Artist => snapshot.artist.as_str(),
                    Field::Album => snapshot.album.as_str(),
                    Field::Title => snapshot.title.as_str(),
                    Field::Position => position.as_str(),
                };
                (*field, value)
            })
            .filter(|(field, value)| *field == Field::Symbol || !value.is_empty())
            .collect();

        StatusLine::Track {
            text: self.join(&items),
            tooltip: tooltip(handle),
            class,
        }
    }

    /// Text fields are joined by the separator, anything next to the symbol
    /// or the position by a single space.
    fn join(&self, items: &[(Field, &str)]) -> String {
        let mut text = String::new();

        for (i, (field, value)) in items.iter().enumerate() {
            if i > 0 {
                let prev = items[i - 1].0;
                if is_text_field(prev) && is_text_field(*field) {
                    text.push_str(&self.config.separator);
                } else {
                    text.push(' ');
                }
            }
            text.push_str(value);
        }

        text
    }
}

fn is_text_field(field: Field) -> bool {
    matches!(field, Field::Artist | Field::Album | Field::Title)
}

fn tooltip(handle: &PlayerHandle) -> String {
    let snapshot = &handle.snapshot;
    let mut tooltip = format!("{}\nby {}\n", snapshot.title, snapshot.artist);
    if !snapshot.album.is_empty() {
        tooltip.push_str(&format!("from {}\n", snapshot.album));
    }
    tooltip.push_str(&format!("({})", handle.display_name));
    tooltip
}

/// `(MM:SS/MM:SS)`, or `(MM:SS)` when the length is unknown. Empty without a
/// position.
fn format_position(snapshot: &PlayerSnapshot) -> String {
    let Some(position) = snapshot.position_micros else {
        return String::new();
    };

    match snapshot.length_micros.filter(|len| *len > 0) {
        Some(length) => format!("({}/{})", clock(position), clock(length)),
        None => format!("({})", clock(position)),
    }
}

fn clock(micros: i64) -> String {
    let secs = micros.max(0) / 1_000_000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
