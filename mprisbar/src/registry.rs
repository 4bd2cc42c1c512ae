use std::{fmt::Write, sync::Arc};

use tracing::{debug, info};

use crate::{
    media_events::TransportCommand, media_listener::PlayerBackend, player::PlayerHandle,
};

/// Outcome of [`Registry::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    NotTracked,
    Removed,
    /// The focused entry was removed, focus moved to the first entry.
    FocusLost,
}

/// Ordered set of tracked players and the one in focus.
///
/// `focused` is a valid index whenever `entries` is non-empty and 0 otherwise.
pub struct Registry<B> {
    backend: Arc<B>,
    entries: Vec<PlayerHandle>,
    focused: usize,
    auto_focus: bool,
    track_position: bool,
}

impl<B: PlayerBackend> Registry<B> {
    pub fn new(backend: Arc<B>, auto_focus: bool, track_position: bool) -> Self {
        Self {
            backend,
            entries: Vec::new(),
            focused: 0,
            auto_focus,
            track_position,
        }
    }

    pub fn entries(&self) -> &[PlayerHandle] {
        &self.entries
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    pub fn focused(&self) -> Option<&PlayerHandle> {
        self.entries.get(self.focused)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, endpoint_id: &str) -> bool {
        self.position_of(endpoint_id).is_some()
    }

    fn position_of(&self, endpoint_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.endpoint_id == endpoint_id)
    }

    /// Start tracking an endpoint. An already tracked endpoint keeps its
    /// place and is refreshed, taking over the new owner's pid and label.
    pub async fn add(&mut self, endpoint_id: &str, process_id: u32) {
        if let Some(index) = self.position_of(endpoint_id) {
            if self.entries[index].process_id == process_id {
                self.entries[index]
                    .refresh(self.backend.as_ref(), self.track_position)
                    .await;
            } else {
                let handle = PlayerHandle::open(
                    self.backend.as_ref(),
                    endpoint_id,
                    process_id,
                    self.track_position,
                )
                .await;
                info!(endpoint = endpoint_id, name = %handle.display_name, pid = process_id, "Player owner changed");
                self.entries[index] = handle;
            }
            return;
        }

        let handle = PlayerHandle::open(
            self.backend.as_ref(),
            endpoint_id,
            process_id,
            self.track_position,
        )
        .await;

        info!(endpoint = endpoint_id, name = %handle.display_name, pid = process_id, "Player added");
        self.entries.push(handle);

        if self.auto_focus {
            self.focused = self.entries.len() - 1;
        }
    }

    pub fn remove(&mut self, endpoint_id: &str) -> Removal {
        let Some(index) = self.position_of(endpoint_id) else {
            return Removal::NotTracked;
        };

        let handle = self.entries.remove(index);
        info!(endpoint = endpoint_id, name = %handle.display_name, "Player removed");

        if index == self.focused {
            self.focused = 0;
            Removal::FocusLost
        } else {
            if index < self.focused {
                self.focused -= 1;
            }
            Removal::Removed
        }
    }

    pub async fn refresh_all(&mut self) {
        for entry in &mut self.entries {
            entry
                .refresh(self.backend.as_ref(), self.track_position)
                .await;
        }
    }

    pub async fn refresh_focused(&mut self) {
        if let Some(entry) = self.entries.get_mut(self.focused) {
            entry
                .refresh(self.backend.as_ref(), self.track_position)
                .await;
        }
    }

    /// Playing entries first, then by display name and endpoint id. Focus
    /// goes to the first entry.
    pub fn reorder(&mut self) {
        self.entries.sort_by(|a, b| {
            b.snapshot
                .playing
                .cmp(&a.snapshot.playing)
                .then_with(|| a.display_name.cmp(&b.display_name))
                .then_with(|| a.endpoint_id.cmp(&b.endpoint_id))
        });
        self.focused = 0;
    }

    pub fn focus_next(&mut self) {
        if !self.entries.is_empty() {
            self.focused = (self.focused + 1) % self.entries.len();
            debug!(index = self.focused, "Focus moved");
        }
    }

    pub fn focus_previous(&mut self) {
        if !self.entries.is_empty() {
            self.focused = (self.focused + self.entries.len() - 1) % self.entries.len();
            debug!(index = self.focused, "Focus moved");
        }
    }

    pub async fn current_command(&self, command: TransportCommand) {
        if let Some(entry) = self.focused() {
            entry.send_command(self.backend.as_ref(), command).await;
        }
    }

    /// One line per entry:
    /// `{index}{marker}: Name: {name}; Playing: {playing}; PID: {pid}`.
    ///
    /// Indices are zero-padded to the digit count of the entry count and the
    /// focused entry is marked with `*`.
    pub fn listing(&self) -> String {
        let width = self.entries.len().to_string().len();
        let mut out = String::new();

        for (index, entry) in self.entries.iter().enumerate() {
            let marker = if index == self.focused { '*' } else { ' ' };
            let _ = writeln!(
                out,
                "{index:0width$}{marker}: Name: {}; Playing: {}; PID: {}",
                entry.display_name, entry.snapshot.playing, entry.process_id
            );
        }

        out
    }
}
