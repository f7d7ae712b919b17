//! ODrive Client
//!
//! A blocking command channel for ODrive motor controllers over their ASCII
//! serial interface. The channel borrows a byte stream it does not own,
//! formats commands with `odrive-ascii-protocol`, and reads replies one line
//! at a time under a deadline.
//!
//! # Example
//!
//! ```rust
//! use odrive_client::sim::SimulatedODrive;
//! use odrive_client::{AxisState, ODrive};
//!
//! let mut device = SimulatedODrive::new().with_settle_polls(0);
//! let mut odrive = ODrive::new(&mut device);
//!
//! odrive.set_position(0, 1.5, 0.0, 0.0)?;
//! assert_eq!(odrive.get_position(0)?, 1.5);
//! assert_eq!(odrive.get_state(0)?, AxisState::Idle);
//! # Ok::<(), odrive_client::ClientError>(())
//! ```
//!
//! # Failure Model
//!
//! Only transport and configuration failures surface as [`ClientError`]. A
//! reply that never arrives reads as empty text, unparseable numbers read as
//! zero, and [`ODrive::run_state`] reports a timeout as `Ok(false)`.

pub mod config;
pub mod error;
pub mod mock;
pub mod odrive;
#[cfg(feature = "serial")]
pub mod serial;
pub mod sim;
pub mod stream;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use odrive::ODrive;
#[cfg(feature = "serial")]
pub use serial::{open_serial, SerialStream};
pub use sim::SimulatedODrive;
pub use stream::{Clock, Stream, SystemClock};

pub use odrive_ascii_protocol::{self as protocol, AxisState, Command, Feedback};
