use futures_util::stream::LocalBoxStream;

use crate::{
    error::BackendError,
    media_events::{BackendEvent, PlaybackState, TransportCommand},
    metadata::Metadata,
};

pub mod linux_mpris;

#[cfg(test)]
pub(crate) mod fake;

pub use linux_mpris::MprisBackend;

/// Infinite stream of backend notifications. Its end, or an `Err` item,
/// means the subscription is gone for good.
pub type EventStream = LocalBoxStream<'static, Result<BackendEvent, BackendError>>;

/// The media-control transport.
///
/// Every method addresses one endpoint by its opaque id and fails with
/// [`BackendError::NotFound`] once the endpoint is gone.
#[allow(async_fn_in_trait)]
pub trait PlayerBackend {
    async fn list_endpoints(&self) -> Result<Vec<String>, BackendError>;

    async fn process_id(&self, endpoint_id: &str) -> Result<u32, BackendError>;

    /// The player's self-reported name. May be empty.
    async fn identity(&self, endpoint_id: &str) -> Result<String, BackendError>;

    async fn playback_status(&self, endpoint_id: &str) -> Result<PlaybackState, BackendError>;

    async fn metadata(&self, endpoint_id: &str) -> Result<Metadata, BackendError>;

    /// Current position in microseconds.
    async fn position(&self, endpoint_id: &str) -> Result<i64, BackendError>;

    async fn send_control(
        &self,
        endpoint_id: &str,
        command: TransportCommand,
    ) -> Result<(), BackendError>;

    async fn subscribe(&self) -> Result<EventStream, BackendError>;
}
