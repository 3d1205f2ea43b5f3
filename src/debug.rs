use std::env;
use std::sync::OnceLock;

static BRIDGE_DUMP_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if the BRIDGE_DUMP_GRAPH environment variable is set.
/// This function caches the environment variable check on first call.
#[inline]
pub fn dump_env_enabled() -> bool {
    *BRIDGE_DUMP_ENABLED.get_or_init(|| env::var("BRIDGE_DUMP_GRAPH").is_ok())
}

/// Writes a graph dump line when dumping is enabled. The message is only
/// formatted if it will be written.
macro_rules! bridge_dump {
    ($enabled:expr, $($arg:tt)+) => {
        if $enabled {
            log::trace!(target: "tarjan_bridge::dump", $($arg)+);
        }
    };
}

pub(crate) use bridge_dump;
