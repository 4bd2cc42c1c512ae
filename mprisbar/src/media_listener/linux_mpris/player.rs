use std::collections::HashMap;

use zbus::{proxy, zvariant::OwnedValue};

/// The root `org.mpris.MediaPlayer2` interface, for the player's own name.
#[proxy(
    interface = "org.mpris.MediaPlayer2",
    default_path = "/org/mpris/MediaPlayer2",
    gen_blocking = false
)]
pub trait MediaPlayer2 {
    #[zbus(property)]
    fn identity(&self) -> zbus::Result<String>;
}

/// The `org.mpris.MediaPlayer2.Player` interface, restricted to what the bar
/// reads and the transport commands it forwards.
#[proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2",
    gen_blocking = false
)]
pub trait Player {
    fn next(&self) -> zbus::Result<()>;

    fn previous(&self) -> zbus::Result<()>;

    fn play_pause(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn playback_status(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn metadata(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    /// Microseconds. Never cached, players do not signal its changes.
    #[zbus(property)]
    fn position(&self) -> zbus::Result<i64>;
}
