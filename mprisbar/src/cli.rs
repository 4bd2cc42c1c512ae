use clap::Parser;

use mprisbar::{
    config::{
        Config, DEFAULT_ORDER, DEFAULT_PAUSE_SYMBOL, DEFAULT_PLAY_SYMBOL, DEFAULT_SEPARATOR,
        FieldOrder,
    },
    ipc::DEFAULT_SOCKET_NAME,
};

/// Print the focused MPRIS player as waybar JSON and accept control
/// commands on a local socket.
#[derive(Parser, Debug)]
#[command(name = "mprisbar", version, about)]
pub struct Cli {
    /// Symbol shown while the player is paused
    #[arg(long = "play", default_value = DEFAULT_PLAY_SYMBOL)]
    pub play_symbol: String,

    /// Symbol shown while the player is playing
    #[arg(long = "pause", default_value = DEFAULT_PAUSE_SYMBOL)]
    pub pause_symbol: String,

    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    pub separator: String,

    /// Colon-separated fields out of SYMBOL, ARTIST, ALBUM, TITLE, POSITION
    #[arg(long, default_value = DEFAULT_ORDER)]
    pub order: FieldOrder,

    /// Give focus to players as they appear or start playing
    #[arg(long)]
    pub autofocus: bool,

    /// Show the playback position, updated every second
    #[arg(long)]
    pub position: bool,

    /// Name of the control socket
    #[arg(long, default_value = DEFAULT_SOCKET_NAME)]
    pub socket: String,

    /// Send a command (player-next, player-prev, next, prev, toggle, list)
    /// to a running instance and exit
    #[arg(long, value_name = "OPCODE")]
    pub send: Option<String>,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn to_config(&self) -> Config {
        Config {
            play_symbol: self.play_symbol.clone(),
            pause_symbol: self.pause_symbol.clone(),
            separator: self.separator.clone(),
            order: self.order.0.clone(),
            auto_focus: self.autofocus,
            show_position: self.position,
        }
    }
}
