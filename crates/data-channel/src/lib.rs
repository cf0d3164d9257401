//! TCP data channel for response frames.
//!
//! The server opens a fresh connection back to the address the client
//! advertised on the control channel, writes exactly one frame and closes
//! it. The client side listens, accepts that single connection and reads
//! the frame back.
//!
//! # Wire format
//!
//! See [`wire`] module for the frame layout.

pub mod error;
pub mod receiver;
pub mod sender;
pub mod wire;

pub use error::DataChannelError;
pub use receiver::DataReceiver;
pub use sender::DataSender;
pub use wire::{Frame, trim_padding};

use std::time::Duration;

/// Timeout for the outbound connection attempt.
pub const TCP_CONNECT_TIMEOUT: Duration = ftserve_protocol::constants::DATA_CONNECT_TIMEOUT;

/// Timeout for transmitting or receiving one whole frame.
pub const TCP_TRANSFER_TIMEOUT: Duration = ftserve_protocol::constants::DATA_SEND_TIMEOUT;
