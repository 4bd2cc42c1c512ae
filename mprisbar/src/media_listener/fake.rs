use std::sync::{Arc, Mutex};

use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;

use crate::{
    error::BackendError,
    media_events::{BackendEvent, PlaybackState, TransportCommand},
    media_listener::{EventStream, PlayerBackend},
    metadata::{Metadata, MetadataValue},
};

#[derive(Debug, Clone)]
pub struct FakePlayer {
    pub state: PlaybackState,
    pub metadata: Metadata,
    pub position: i64,
    pub process_id: u32,
    pub identity: String,
}

impl FakePlayer {
    pub fn track(state: PlaybackState, artist: &str, album: &str, title: &str) -> Self {
        let metadata = [
            ("xesam:artist", MetadataValue::StrList(vec![artist.to_string()])),
            ("xesam:album", MetadataValue::Str(album.to_string())),
            ("xesam:title", MetadataValue::Str(title.to_string())),
            ("mpris:length", MetadataValue::Int(240_000_000)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            state,
            metadata,
            position: 0,
            process_id: 100,
            identity: String::new(),
        }
    }
}

/// In-memory backend. Clones share state.
#[derive(Clone, Default)]
pub struct FakeBackend {
    players: Arc<Mutex<Vec<(String, FakePlayer)>>>,
    commands: Arc<Mutex<Vec<(String, TransportCommand)>>>,
    events: Arc<Mutex<Option<mpsc::UnboundedReceiver<Result<BackendEvent, BackendError>>>>>,
}

impl FakeBackend {
    pub fn with_player(self, endpoint_id: &str, player: FakePlayer) -> Self {
        self.put(endpoint_id, player);
        self
    }

    pub fn put(&self, endpoint_id: &str, player: FakePlayer) {
        let mut players = self.players.lock().unwrap();
        players.retain(|(id, _)| id != endpoint_id);
        players.push((endpoint_id.to_string(), player));
    }

    pub fn set_state(&self, endpoint_id: &str, state: PlaybackState) {
        if let Some((_, player)) = self
            .players
            .lock()
            .unwrap()
            .iter_mut()
            .find(|(id, _)| id == endpoint_id)
        {
            player.state = state;
        }
    }

    pub fn set_position(&self, endpoint_id: &str, position: i64) {
        if let Some((_, player)) = self
            .players
            .lock()
            .unwrap()
            .iter_mut()
            .find(|(id, _)| id == endpoint_id)
        {
            player.position = position;
        }
    }

    pub fn drop_player(&self, endpoint_id: &str) {
        self.players
            .lock()
            .unwrap()
            .retain(|(id, _)| id != endpoint_id);
    }

    pub fn commands(&self) -> Vec<(String, TransportCommand)> {
        self.commands.lock().unwrap().clone()
    }

    /// Feed for the stream returned by `subscribe`.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<Result<BackendEvent, BackendError>> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events.lock().unwrap() = Some(rx);
        tx
    }

    fn player(&self, endpoint_id: &str) -> Result<FakePlayer, BackendError> {
        self.players
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == endpoint_id)
            .map(|(_, p)| p.clone())
            .ok_or_else(|| BackendError::NotFound(endpoint_id.to_string()))
    }
}

impl PlayerBackend for FakeBackend {
    async fn list_endpoints(&self) -> Result<Vec<String>, BackendError> {
        Ok(self
            .players
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn process_id(&self, endpoint_id: &str) -> Result<u32, BackendError> {
        Ok(self.player(endpoint_id)?.process_id)
    }

    async fn identity(&self, endpoint_id: &str) -> Result<String, BackendError> {
        Ok(self.player(endpoint_id)?.identity)
    }

    async fn playback_status(&self, endpoint_id: &str) -> Result<PlaybackState, BackendError> {
        Ok(self.player(endpoint_id)?.state)
    }

    async fn metadata(&self, endpoint_id: &str) -> Result<Metadata, BackendError> {
        Ok(self.player(endpoint_id)?.metadata)
    }

    async fn position(&self, endpoint_id: &str) -> Result<i64, BackendError> {
        Ok(self.player(endpoint_id)?.position)
    }

    async fn send_control(
        &self,
        endpoint_id: &str,
        command: TransportCommand,
    ) -> Result<(), BackendError> {
        self.player(endpoint_id)?;
        self.commands
            .lock()
            .unwrap()
            .push((endpoint_id.to_string(), command));
        Ok(())
    }

    async fn subscribe(&self) -> Result<EventStream, BackendError> {
        let rx = self
            .events
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| BackendError::Unavailable("no event feed".to_string()))?;

        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .boxed_local())
    }
}

/// Stand-in for stdout that tests can read back.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
