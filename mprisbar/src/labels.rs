use std::fs;

use tracing::debug;

use crate::media_listener::PlayerBackend;

pub const MPRIS2_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// playerctld re-exports the players it tracks, counting it would show every
/// player twice.
const IGNORED_ENDPOINTS: &[&str] = &["org.mpris.MediaPlayer2.playerctld"];

/// Bridges that expose other programs' players under their own name.
const GENERIC_NAMES: &[&str] = &["chromium", "plasma-browser-integration", "kdeconnect"];

/// Whether a bus name is a media player this tool should track.
pub fn is_player_endpoint(endpoint_id: &str) -> bool {
    endpoint_id.starts_with(MPRIS2_PREFIX) && !IGNORED_ENDPOINTS.contains(&endpoint_id)
}

/// Human-readable label for an endpoint.
///
/// Instanced and bridge endpoints say little through their bus name, so the
/// player's `Identity` is asked first. Everything else is named after its
/// bus name.
pub async fn resolve_display_name<B: PlayerBackend>(
    backend: &B,
    endpoint_id: &str,
    process_id: u32,
) -> String {
    let (base, ambiguous) = split_name(endpoint_id);

    if ambiguous {
        match backend.identity(endpoint_id).await {
            Ok(identity) if !identity.trim().is_empty() => return identity.trim().to_string(),
            Ok(_) => {}
            Err(e) => debug!(endpoint = endpoint_id, "No identity: {e}"),
        }
    }

    fallback_name(base, ambiguous, process_id)
}

/// Bus name without prefix and instance suffix, and whether that name is
/// shared by several programs.
fn split_name(endpoint_id: &str) -> (&str, bool) {
    let name = endpoint_id.strip_prefix(MPRIS2_PREFIX).unwrap_or(endpoint_id);
    match name.split_once(".instance") {
        Some((base, _)) => (base, true),
        None => (name, GENERIC_NAMES.contains(&name)),
    }
}

/// The executable for ambiguous names, the bus name otherwise.
fn fallback_name(base: &str, ambiguous: bool, process_id: u32) -> String {
    if process_id != 0 && ambiguous {
        if let Some(label) = process_label(process_id) {
            return label;
        }
    }

    base.to_string()
}

fn process_label(process_id: u32) -> Option<String> {
    match fs::read(format!("/proc/{process_id}/cmdline")) {
        Ok(cmdline) => label_from_cmdline(&String::from_utf8_lossy(&cmdline)),
        Err(e) => {
            debug!(pid = process_id, "Could not read cmdline: {e}");
            None
        }
    }
}

/// Executable basename from a NUL-separated `/proc/<pid>/cmdline`.
fn label_from_cmdline(cmdline: &str) -> Option<String> {
    let exe = cmdline.split('\0').next()?.split(' ').next()?;
    let basename = exe.rsplit('/').next()?.trim();

    (!basename.is_empty()).then(|| basename.to_string())
}
