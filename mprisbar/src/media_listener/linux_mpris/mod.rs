mod metadata;
mod mpris_listener;
mod player;

pub use mpris_listener::MprisBackend;
