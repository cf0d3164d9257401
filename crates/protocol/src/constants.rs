use std::ops::RangeInclusive;
use std::time::Duration;

/// Size of every data-channel frame in bytes.
///
/// Responses are zero-padded up to this size and anything longer is cut
/// off. Receivers always read exactly this many bytes; there is no length
/// prefix.
pub const FRAME_CAPACITY: usize = 75_000;

/// Maximum size of a single control-channel field.
pub const MAX_FIELD_SIZE: usize = 512;

/// Acknowledgment sent after each control-channel field.
pub const ACK: &[u8; 2] = b"OK";

/// Command token requesting a directory listing.
pub const LIST_TOKEN: &str = "-l";

/// Command token requesting a file.
pub const GET_TOKEN: &str = "-g";

/// Ports the server is allowed to listen on.
pub const LISTEN_PORT_RANGE: RangeInclusive<u16> = 1024..=65535;

/// Default bound for each control-channel read or write.
pub const CONTROL_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound for opening the data channel back to the client.
pub const DATA_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound for transmitting one frame.
pub const DATA_SEND_TIMEOUT: Duration = Duration::from_secs(60);
