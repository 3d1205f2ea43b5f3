use super::debug::dump_env_enabled;
use super::scan_data::ScanData;
use std::mem::size_of;

/// This structure contains the configuration settings for a bridge processor.
#[derive(Copy, Clone, Debug)]
pub struct BridgeConfig {
    /// The number of scan records held by a single arena bucket. Records are
    /// bump allocated out of a bucket until it is full, at which point a new
    /// bucket is started.
    pub scan_bucket_entries: usize,

    /// Initial capacity of the registration list and of the object to
    /// record map.
    pub registration_capacity: usize,

    /// Trace every push, scan and SCC closure of the DFS as well as the color
    /// table before and after flattening. Very noisy, only useful for
    /// debugging small heaps.
    pub dump_graph: bool,

    /// Log a one line summary of counts and phase timings after every cycle.
    pub log_summary: bool,
}

pub const BRIDGE_BUCKET_SIZE: usize = 8184;
pub const BRIDGE_CONFIG_DEFAULT_REGISTRATION_CAPACITY: usize = 64;

// buckets are sized to fit the bytes of a fixed size internal allocation,
// minus the two words of bucket bookkeeping
pub fn default_scan_bucket_entries<O>() -> usize {
    let entries = (BRIDGE_BUCKET_SIZE - size_of::<usize>() * 2) / size_of::<ScanData<O>>();

    entries.max(1)
}

impl BridgeConfig {
    /// Creates a default config for the object type `O`.
    pub fn for_object<O>() -> Self {
        Self {
            scan_bucket_entries: default_scan_bucket_entries::<O>(),
            registration_capacity: BRIDGE_CONFIG_DEFAULT_REGISTRATION_CAPACITY,
            dump_graph: cfg!(feature = "dump_graph") || dump_env_enabled(),
            log_summary: true,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::for_object::<usize>()
    }
}
