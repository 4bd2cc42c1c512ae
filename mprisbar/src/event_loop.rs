use std::{io::Write, sync::Arc, time::Duration};

use futures_util::StreamExt;
use tokio::{
    sync::Mutex,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, error, info};

use crate::{
    config::Config,
    error::AppError,
    ipc::{self, ControlListener, Opcode},
    labels,
    media_events::{BackendEvent, PLAYER_INTERFACE, TransportCommand},
    media_listener::{EventStream, PlayerBackend},
    presenter::Presenter,
    registry::{Registry, Removal},
};

const POSITION_TICK: Duration = Duration::from_secs(1);

struct State<B> {
    registry: Registry<B>,
    presenter: Presenter,
    last_line: Option<String>,
    out: Box<dyn Write>,
}

impl<B: PlayerBackend> State<B> {
    /// Present the focused player and print the line, unless it repeats the
    /// previous one and `force` is off.
    fn emit(&mut self, force: bool) -> Result<(), AppError> {
        let line = self
            .presenter
            .present(self.registry.focused())
            .to_json()?;

        if !force && self.last_line.as_deref() == Some(line.as_str()) {
            return Ok(());
        }

        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        self.last_line = Some(line);
        Ok(())
    }
}

/// Owns the registry and serializes every access to it. Backend events,
/// control requests and the position ticker all go through the same lock,
/// which is held until the resulting line is printed.
pub struct EventLoop<B> {
    config: Arc<Config>,
    state: Mutex<State<B>>,
}

impl<B: PlayerBackend> EventLoop<B> {
    /// Track every player already on the bus and print the first line.
    pub async fn start(
        backend: Arc<B>,
        config: Arc<Config>,
        out: Box<dyn Write>,
    ) -> Result<Self, AppError> {
        let mut registry = Registry::new(backend.clone(), config.auto_focus, config.show_position);

        let endpoints = backend.list_endpoints().await?;
        for endpoint_id in endpoints
            .iter()
            .filter(|e| labels::is_player_endpoint(e))
        {
            let process_id = backend.process_id(endpoint_id).await.unwrap_or_else(|e| {
                debug!(endpoint = %endpoint_id, "No pid: {e}");
                0
            });
            registry.add(endpoint_id, process_id).await;
        }
        registry.reorder();

        info!(players = registry.len(), "Listening for players");

        let mut state = State {
            registry,
            presenter: Presenter::new(config.clone()),
            last_line: None,
            out,
        };
        state.emit(true)?;

        Ok(Self {
            config,
            state: Mutex::new(state),
        })
    }

    pub async fn handle_event(&self, event: BackendEvent) -> Result<(), AppError> {
        let mut state = self.state.lock().await;

        match event {
            BackendEvent::OwnershipChanged {
                endpoint_id,
                process_id,
            } => {
                if !labels::is_player_endpoint(&endpoint_id) {
                    return Ok(());
                }

                if process_id == 0 {
                    match state.registry.remove(&endpoint_id) {
                        Removal::NotTracked | Removal::Removed => return Ok(()),
                        Removal::FocusLost => self.refresh(&mut state).await,
                    }
                } else {
                    state.registry.add(&endpoint_id, process_id).await;
                }
            }

            BackendEvent::PropertiesChanged { interface, .. } => {
                if interface != PLAYER_INTERFACE {
                    return Ok(());
                }
                self.refresh(&mut state).await;
            }
        }

        state.emit(false)
    }

    async fn refresh(&self, state: &mut State<B>) {
        state.registry.refresh_all().await;
        if self.config.auto_focus {
            state.registry.reorder();
        }
    }

    /// Apply a control request. Returns the reply body, if the opcode has one.
    pub async fn handle_opcode(&self, opcode: Opcode) -> Result<Option<String>, AppError> {
        let mut state = self.state.lock().await;

        let command = match opcode {
            Opcode::List => return Ok(Some(state.registry.listing())),
            Opcode::PlayerNext => {
                state.registry.focus_next();
                Self::show_focused(&mut state).await?;
                return Ok(None);
            }
            Opcode::PlayerPrev => {
                state.registry.focus_previous();
                Self::show_focused(&mut state).await?;
                return Ok(None);
            }
            Opcode::Next => TransportCommand::Next,
            Opcode::Prev => TransportCommand::Previous,
            Opcode::Toggle => TransportCommand::PlayPause,
        };

        // the player answers with PropertiesChanged, which reprints
        state.registry.current_command(command).await;
        Ok(None)
    }

    async fn show_focused(state: &mut State<B>) -> Result<(), AppError> {
        state.registry.refresh_focused().await;
        state.emit(false)
    }

    /// Reprint the focused player with a fresh position while it plays.
    pub async fn tick(&self) -> Result<(), AppError> {
        let mut state = self.state.lock().await;

        let playing = state
            .registry
            .focused()
            .is_some_and(|handle| handle.snapshot.playing);
        if !playing {
            return Ok(());
        }

        state.registry.refresh_focused().await;
        state.emit(true)
    }

    /// Consume backend notifications. Returns only on failure, the end of
    /// the stream included.
    pub async fn run_events(&self, mut events: EventStream) -> Result<(), AppError> {
        while let Some(event) = events.next().await {
            let event = event.inspect_err(|e| error!("Backend subscription failed: {e}"))?;
            debug!(?event, "Backend event");
            self.handle_event(event).await?;
        }

        error!("Backend subscription ended");
        Err(AppError::SubscriptionLost)
    }

    pub async fn run_ticker(&self) -> Result<(), AppError> {
        if !self.config.show_position {
            return Ok(());
        }

        let mut ticker = interval(POSITION_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.tick().await?;
        }
    }

    /// Run every producer until one of them fails.
    pub async fn run(&self, events: EventStream, listener: ControlListener) -> Result<(), AppError> {
        tokio::try_join!(
            self.run_events(events),
            ipc::commands_listener(listener, self),
            self.run_ticker(),
        )?;

        Ok(())
    }

    #[cfg(test)]
    async fn with_registry<T>(&self, f: impl FnOnce(&Registry<B>) -> T) -> T {
        f(&self.state.lock().await.registry)
    }
}
