use {
    crate::{error::AppError, event_loop::EventLoop, media_listener::PlayerBackend},
    interprocess::local_socket::{
        GenericNamespaced, ListenerOptions, ToNsName,
        traits::tokio::{Listener, Stream},
    },
    std::{io, str::FromStr, time::Duration},
    strum::EnumString,
    tokio::{
        io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
        time::timeout,
    },
    tracing::{debug, warn},
};

pub use interprocess::local_socket::tokio::Listener as ControlListener;

pub const DEFAULT_SOCKET_NAME: &str = "mprisbar.sock";

const READ_TIMEOUT: Duration = Duration::from_secs(2);
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Requests understood by the control socket.
#[derive(EnumString, strum::Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum Opcode {
    PlayerNext,
    PlayerPrev,
    Next,
    Prev,
    Toggle,
    List,
}

/// Claim the control socket. Fails if another instance holds the name.
pub fn bind(socket_name: &str) -> Result<ControlListener, AppError> {
    let name = socket_name.to_ns_name::<GenericNamespaced>()?;

    let listener = ListenerOptions::new()
        .name(name)
        .reclaim_name(true)
        .create_tokio()?;

    Ok(listener)
}

/// Serve control requests one connection at a time: read one opcode, apply
/// it, write the reply if there is one, close.
///
/// Requests are handled strictly in sequence. The control path is driven by
/// a human clicking the bar, so a slow client only delays the next click.
pub async fn commands_listener<B: PlayerBackend>(
    listener: ControlListener,
    event_loop: &EventLoop<B>,
) -> Result<(), AppError> {
    let mut buffer = String::with_capacity(128);

    loop {
        let conn = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("There was an error with an incoming connection: {e}");
                continue;
            }
        };

        let mut conn = BufReader::new(conn);
        buffer.clear();

        match timeout(READ_TIMEOUT, conn.read_line(&mut buffer)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                warn!("Error reading from control socket: {e}");
                continue;
            }
            Err(_) => {
                warn!("Control client sent no request");
                continue;
            }
        }

        let request = buffer.trim();
        if request.is_empty() {
            warn!("Empty control request");
            continue;
        }

        let Ok(opcode) = Opcode::from_str(request) else {
            warn!(request, "Unknown control command");
            continue;
        };

        debug!(%opcode, "Control command");

        if let Some(reply) = event_loop.handle_opcode(opcode).await? {
            if let Err(e) = conn.get_mut().write_all(reply.as_bytes()).await {
                warn!("Error writing control reply: {e}");
            }
        }
    }
}

/// Send one request to a running instance and return its reply, which is
/// empty for every opcode but `list`.
pub async fn send_command(socket_name: &str, command: &str) -> Result<String, AppError> {
    let name = socket_name.to_ns_name::<GenericNamespaced>()?;

    let mut conn = timeout(
        CONNECT_TIMEOUT,
        interprocess::local_socket::tokio::Stream::connect(name),
    )
    .await
    .map_err(io::Error::from)??;

    conn.write_all(command.as_bytes()).await?;
    conn.write_all(b"\n").await?;

    let mut reply = String::new();
    conn.read_to_string(&mut reply).await?;

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::Config,
        media_events::{PlaybackState, TransportCommand},
        media_listener::fake::{FakeBackend, FakePlayer, SharedBuffer},
    };

    fn socket_name(tag: &str) -> String {
        format!("mprisbar-test-{}-{tag}.sock", std::process::id())
    }

    #[test]
    fn opcodes_parse_from_wire_names() {
        assert_eq!(Opcode::from_str("player-next").unwrap(), Opcode::PlayerNext);
        assert_eq!(Opcode::from_str("player-prev").unwrap(), Opcode::PlayerPrev);
        assert_eq!(Opcode::from_str("toggle").unwrap(), Opcode::Toggle);
        assert_eq!(Opcode::List.to_string(), "list");
        assert!(Opcode::from_str("shuffle").is_err());
    }

    #[tokio::test]
    async fn control_socket_round_trip() {
        let backend = FakeBackend::default()
            .with_player(
                "org.mpris.MediaPlayer2.mpv",
                FakePlayer::track(PlaybackState::Playing, "A", "B", "C"),
            )
            .with_player(
                "org.mpris.MediaPlayer2.vlc",
                FakePlayer::track(PlaybackState::Paused, "D", "E", "F"),
            );
        let event_loop = EventLoop::start(
            Arc::new(backend.clone()),
            Arc::new(Config::default()),
            Box::new(SharedBuffer::default()),
        )
        .await
        .unwrap();

        let name = socket_name("round-trip");
        let listener = bind(&name).unwrap();

        let client = async {
            assert_eq!(send_command(&name, "bogus").await.unwrap(), "");
            assert_eq!(send_command(&name, "player-next").await.unwrap(), "");
            assert_eq!(send_command(&name, "toggle").await.unwrap(), "");
            send_command(&name, "list").await.unwrap()
        };

        let listing = tokio::select! {
            result = commands_listener(listener, &event_loop) => panic!("server stopped: {result:?}"),
            listing = client => listing,
        };

        assert_eq!(
            listing,
            "0 : Name: mpv; Playing: true; PID: 100\n1*: Name: vlc; Playing: false; PID: 100\n"
        );
        assert_eq!(
            backend.commands(),
            [(
                "org.mpris.MediaPlayer2.vlc".to_string(),
                TransportCommand::PlayPause
            )]
        );
    }

    #[tokio::test]
    async fn second_bind_fails() {
        let name = socket_name("busy");
        let _first = bind(&name).unwrap();

        assert!(bind(&name).is_err());
    }
}
