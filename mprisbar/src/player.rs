use tracing::{debug, warn};

use crate::{
    labels,
    media_events::{PlaybackState, TransportCommand},
    media_listener::PlayerBackend,
    metadata::Metadata,
};

/// Playback state and track info of one endpoint, as of its last refresh.
///
/// `playing` and `stopped` are never both set; neither set means paused.
/// Absent text fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub playing: bool,
    pub stopped: bool,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub position_micros: Option<i64>,
    pub length_micros: Option<i64>,
}

impl PlayerSnapshot {
    /// The state of an endpoint that could not be read.
    pub fn stopped() -> Self {
        Self {
            stopped: true,
            ..Default::default()
        }
    }

    pub fn new(state: PlaybackState, metadata: &Metadata, position_micros: Option<i64>) -> Self {
        Self {
            playing: state == PlaybackState::Playing,
            stopped: !matches!(state, PlaybackState::Playing | PlaybackState::Paused),
            title: metadata.title().unwrap_or_default().to_string(),
            artist: metadata.artists().unwrap_or_default(),
            album: metadata.album_name().unwrap_or_default().to_string(),
            position_micros,
            length_micros: metadata.length_in_microseconds(),
        }
    }

    /// Whether there is any track text worth showing.
    pub fn has_track_info(&self) -> bool {
        !(self.title.is_empty() && self.artist.is_empty() && self.album.is_empty())
    }
}

/// One tracked endpoint.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    pub endpoint_id: String,
    pub display_name: String,
    /// 0 when unknown.
    pub process_id: u32,
    pub snapshot: PlayerSnapshot,
}

impl PlayerHandle {
    /// A handle in the stopped state, not yet refreshed.
    pub fn new(
        endpoint_id: impl Into<String>,
        process_id: u32,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_id: endpoint_id.into(),
            display_name: display_name.into(),
            process_id,
            snapshot: PlayerSnapshot::stopped(),
        }
    }

    /// Name the endpoint and read its current state.
    pub async fn open<B: PlayerBackend>(
        backend: &B,
        endpoint_id: &str,
        process_id: u32,
        with_position: bool,
    ) -> Self {
        let display_name = labels::resolve_display_name(backend, endpoint_id, process_id).await;

        let mut handle = Self::new(endpoint_id, process_id, display_name);
        handle.refresh(backend, with_position).await;
        handle
    }

    /// Re-read state from the backend. Failures leave the handle stopped and
    /// empty instead of surfacing to the caller.
    pub async fn refresh<B: PlayerBackend>(&mut self, backend: &B, with_position: bool) {
        let state = match backend.playback_status(&self.endpoint_id).await {
            Ok(state) => state,
            Err(e) => {
                debug!(endpoint = %self.endpoint_id, "Refresh failed: {e}");
                self.snapshot = PlayerSnapshot::stopped();
                return;
            }
        };

        let metadata = match backend.metadata(&self.endpoint_id).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(endpoint = %self.endpoint_id, "Refresh failed: {e}");
                self.snapshot = PlayerSnapshot::stopped();
                return;
            }
        };

        // many players do not implement Position, that alone is not a failure
        let position = if with_position {
            backend.position(&self.endpoint_id).await.ok()
        } else {
            None
        };

        self.snapshot = PlayerSnapshot::new(state, &metadata, position);
    }

    pub async fn send_command<B: PlayerBackend>(&self, backend: &B, command: TransportCommand) {
        if let Err(e) = backend.send_control(&self.endpoint_id, command).await {
            warn!(endpoint = %self.endpoint_id, %command, "Command failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_listener::fake::{FakeBackend, FakePlayer};

    const SPOTIFY: &str = "org.mpris.MediaPlayer2.spotify";

    #[test]
    fn snapshot_states_are_exclusive() {
        let md = Metadata::default();
        let playing = PlayerSnapshot::new(PlaybackState::Playing, &md, None);
        let paused = PlayerSnapshot::new(PlaybackState::Paused, &md, None);
        let other = PlayerSnapshot::new(PlaybackState::Other, &md, None);

        assert!(playing.playing && !playing.stopped);
        assert!(!paused.playing && !paused.stopped);
        assert!(!other.playing && other.stopped);
    }

    #[tokio::test]
    async fn refresh_reads_backend() {
        let backend = FakeBackend::default().with_player(
            SPOTIFY,
            FakePlayer::track(PlaybackState::Playing, "Air", "Moon Safari", "La Femme d'Argent"),
        );
        backend.set_position(SPOTIFY, 5_000_000);

        let handle = PlayerHandle::open(&backend, SPOTIFY, 0, true).await;

        assert_eq!(handle.display_name, "spotify");
        assert!(handle.snapshot.playing);
        assert_eq!(handle.snapshot.artist, "Air");
        assert_eq!(handle.snapshot.album, "Moon Safari");
        assert_eq!(handle.snapshot.title, "La Femme d'Argent");
        assert_eq!(handle.snapshot.position_micros, Some(5_000_000));
        assert_eq!(handle.snapshot.length_micros, Some(240_000_000));
    }

    #[tokio::test]
    async fn refresh_of_vanished_endpoint_degrades_to_stopped() {
        let backend = FakeBackend::default().with_player(
            SPOTIFY,
            FakePlayer::track(PlaybackState::Playing, "Air", "Moon Safari", "Talisman"),
        );
        let mut handle = PlayerHandle::new(SPOTIFY, 0, "spotify");
        handle.refresh(&backend, false).await;
        assert!(handle.snapshot.playing);

        backend.drop_player(SPOTIFY);
        handle.refresh(&backend, false).await;

        assert_eq!(handle.snapshot, PlayerSnapshot::stopped());
    }

    #[tokio::test]
    async fn command_to_vanished_endpoint_is_absorbed() {
        let backend = FakeBackend::default();
        let handle = PlayerHandle::new(SPOTIFY, 0, "spotify");

        handle.send_command(&backend, TransportCommand::Next).await;

        assert!(backend.commands().is_empty());
    }
}
