pub mod config;
pub mod error;
pub mod event_loop;
pub mod ipc;
pub mod labels;
pub mod media_events;
pub mod media_listener;
pub mod metadata;
pub mod player;
pub mod presenter;
pub mod registry;
