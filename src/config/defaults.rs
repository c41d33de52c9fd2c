//! Default configuration values

use std::time::Duration;

/// Config file name in the home directory
pub const CONFIG_FILE_NAME: &str = ".ernest";

/// Timeout for plain REST requests
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for establishing a connection
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total time spent retrying the initial event stream connection
pub const STREAM_CONNECT_RETRY_WINDOW: Duration = Duration::from_secs(30);

/// Capacity of the raw message channel between transport and monitor
pub const STREAM_CHANNEL_CAPACITY: usize = 64;
