use strum::EnumString;

/// Interface whose property changes affect what the bar shows.
pub const PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";

#[derive(EnumString, strum::Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
    Other,
}

#[derive(strum::Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCommand {
    Next,
    Previous,
    PlayPause,
}

/// Notification delivered by the backend subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// An endpoint appeared or disappeared. A `process_id` of 0 means the
    /// endpoint lost its owner.
    OwnershipChanged {
        endpoint_id: String,
        process_id: u32,
    },
    PropertiesChanged {
        endpoint_id: String,
        interface: String,
    },
}
