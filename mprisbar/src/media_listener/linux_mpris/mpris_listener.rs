use std::{collections::HashMap, str::FromStr, time::Duration};

use futures_util::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, warn};
use zbus::{
    Connection, MatchRule, Message, MessageStream,
    fdo::{self, DBusProxy, NameOwnerChanged},
    message,
    names::BusName,
    proxy::CacheProperties,
    zvariant::OwnedValue,
};

use crate::{
    error::BackendError,
    labels::MPRIS2_PREFIX,
    media_events::{BackendEvent, PlaybackState, TransportCommand},
    media_listener::{EventStream, PlayerBackend, linux_mpris::metadata},
    metadata::Metadata,
};

use super::player::{MediaPlayer2Proxy, PlayerProxy};

const MPRIS2_PATH: &str = "/org/mpris/MediaPlayer2";
const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

// some chromium instances never answer Identity
const IDENTITY_TIMEOUT: Duration = Duration::from_millis(200);

/// Error names meaning the endpoint has no owner anymore.
const GONE_ERRORS: &[&str] = &[
    "org.freedesktop.DBus.Error.ServiceUnknown",
    "org.freedesktop.DBus.Error.NameHasNoOwner",
];

/// [`PlayerBackend`] over the D-Bus session bus.
pub struct MprisBackend {
    connection: Connection,
    dbus_proxy: DBusProxy<'static>,
}

impl MprisBackend {
    pub async fn connect() -> Result<Self, BackendError> {
        let connection = Connection::session()
            .await
            .map_err(|e| bus_error("session bus", e))?;
        let dbus_proxy = DBusProxy::new(&connection)
            .await
            .map_err(|e| bus_error("org.freedesktop.DBus", e))?;

        Ok(Self {
            connection,
            dbus_proxy,
        })
    }

    async fn player_proxy(&self, endpoint_id: &str) -> Result<PlayerProxy<'static>, BackendError> {
        // uncached: the bar re-reads every property on each change signal anyway
        PlayerProxy::builder(&self.connection)
            .destination(endpoint_id.to_owned())
            .map_err(|e| bus_error(endpoint_id, e))?
            .cache_properties(CacheProperties::No)
            .build()
            .await
            .map_err(|e| bus_error(endpoint_id, e))
    }
}

impl PlayerBackend for MprisBackend {
    async fn list_endpoints(&self) -> Result<Vec<String>, BackendError> {
        let names = self
            .dbus_proxy
            .list_names()
            .await
            .map_err(|e| bus_error("org.freedesktop.DBus", e))?;

        Ok(names
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| name.starts_with(MPRIS2_PREFIX))
            .collect())
    }

    async fn process_id(&self, endpoint_id: &str) -> Result<u32, BackendError> {
        let bus_name = BusName::try_from(endpoint_id).map_err(|e| bus_error(endpoint_id, e))?;

        self.dbus_proxy
            .get_connection_unix_process_id(bus_name)
            .await
            .map_err(|e| bus_error(endpoint_id, e))
    }

    async fn identity(&self, endpoint_id: &str) -> Result<String, BackendError> {
        let proxy = MediaPlayer2Proxy::builder(&self.connection)
            .destination(endpoint_id.to_owned())
            .map_err(|e| bus_error(endpoint_id, e))?
            .cache_properties(CacheProperties::No)
            .build()
            .await
            .map_err(|e| bus_error(endpoint_id, e))?;

        timeout(IDENTITY_TIMEOUT, proxy.identity())
            .await
            .map_err(|_| BackendError::Unavailable(format!("{endpoint_id}: Identity timed out")))?
            .map_err(|e| bus_error(endpoint_id, e))
    }

    async fn playback_status(&self, endpoint_id: &str) -> Result<PlaybackState, BackendError> {
        let status = self
            .player_proxy(endpoint_id)
            .await?
            .playback_status()
            .await
            .map_err(|e| bus_error(endpoint_id, e))?;

        Ok(PlaybackState::from_str(&status).unwrap_or(PlaybackState::Other))
    }

    async fn metadata(&self, endpoint_id: &str) -> Result<Metadata, BackendError> {
        let values = self
            .player_proxy(endpoint_id)
            .await?
            .metadata()
            .await
            .map_err(|e| bus_error(endpoint_id, e))?;

        Ok(metadata::decode(values))
    }

    async fn position(&self, endpoint_id: &str) -> Result<i64, BackendError> {
        self.player_proxy(endpoint_id)
            .await?
            .position()
            .await
            .map_err(|e| bus_error(endpoint_id, e))
    }

    async fn send_control(
        &self,
        endpoint_id: &str,
        command: TransportCommand,
    ) -> Result<(), BackendError> {
        let player_proxy = self.player_proxy(endpoint_id).await?;

        let result = match command {
            TransportCommand::Next => player_proxy.next().await,
            TransportCommand::Previous => player_proxy.previous().await,
            TransportCommand::PlayPause => player_proxy.play_pause().await,
        };

        result.map_err(|e| bus_error(endpoint_id, e))
    }

    async fn subscribe(&self) -> Result<EventStream, BackendError> {
        let name_owner_changed = self
            .dbus_proxy
            .receive_name_owner_changed()
            .await
            .map_err(|e| bus_error("org.freedesktop.DBus", e))?;

        let dbus_proxy = self.dbus_proxy.clone();
        let ownership_events = name_owner_changed.filter_map(move |signal| {
            let dbus_proxy = dbus_proxy.clone();
            async move { ownership_event(&dbus_proxy, signal).await.map(Ok) }
        });

        let rule = MatchRule::builder()
            .msg_type(message::Type::Signal)
            .interface(PROPERTIES_INTERFACE)
            .and_then(|b| b.member("PropertiesChanged"))
            .and_then(|b| b.path(MPRIS2_PATH))
            .map_err(|e| bus_error(PROPERTIES_INTERFACE, e))?
            .build();

        let properties_changed = MessageStream::for_match_rule(rule, &self.connection, None)
            .await
            .map_err(|e| bus_error(PROPERTIES_INTERFACE, e))?;

        let property_events = properties_changed.filter_map(|message| async move {
            match message {
                Ok(message) => properties_event(&message).map(Ok),
                Err(e) => Some(Err(bus_error(PROPERTIES_INTERFACE, e))),
            }
        });

        Ok(stream::select(ownership_events, property_events).boxed_local())
    }
}

async fn ownership_event(
    dbus_proxy: &DBusProxy<'static>,
    signal: NameOwnerChanged,
) -> Option<BackendEvent> {
    let args = match signal.args() {
        Ok(args) => args,
        Err(e) => {
            warn!("Malformed NameOwnerChanged signal: {e}");
            return None;
        }
    };

    let endpoint_id = args.name().to_string();
    if !endpoint_id.starts_with(MPRIS2_PREFIX) {
        return None;
    }

    let process_id = match &**args.new_owner() {
        None => 0,
        Some(owner) => {
            match dbus_proxy
                .get_connection_unix_process_id(BusName::Unique(owner.clone()))
                .await
            {
                Ok(pid) => pid,
                Err(e) => {
                    // the owner already left, its removal signal follows
                    warn!(endpoint = %endpoint_id, "Could not resolve owner pid: {e}");
                    return None;
                }
            }
        }
    };

    Some(BackendEvent::OwnershipChanged {
        endpoint_id,
        process_id,
    })
}

fn properties_event(message: &Message) -> Option<BackendEvent> {
    let header = message.header();
    let endpoint_id = header.sender()?.to_string();

    let body = message.body();
    let (interface, _changed, _invalidated): (String, HashMap<String, OwnedValue>, Vec<String>) =
        match body.deserialize() {
            Ok(args) => args,
            Err(e) => {
                debug!(sender = %endpoint_id, "Ignoring PropertiesChanged with bad body: {e}");
                return None;
            }
        };

    Some(BackendEvent::PropertiesChanged {
        endpoint_id,
        interface,
    })
}

fn bus_error(endpoint_id: &str, e: impl Into<zbus::Error>) -> BackendError {
    let e = e.into();

    let gone = match &e {
        zbus::Error::MethodError(name, _, _) => GONE_ERRORS.contains(&name.as_str()),
        zbus::Error::FDO(fdo_error) => matches!(
            **fdo_error,
            fdo::Error::ServiceUnknown(_) | fdo::Error::NameHasNoOwner(_)
        ),
        _ => false,
    };

    if gone {
        BackendError::NotFound(endpoint_id.to_string())
    } else {
        BackendError::Unavailable(format!("{endpoint_id}: {e}"))
    }
}
