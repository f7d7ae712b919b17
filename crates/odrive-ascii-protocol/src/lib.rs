//! ODrive ASCII Protocol
//!
//! This crate provides types and utilities for talking to ODrive motor
//! controllers over their ASCII serial interface. It performs no I/O: the
//! `odrive-client` crate owns the byte stream and uses these pieces to format
//! requests and interpret replies.
//!
//! # Protocol Overview
//!
//! The ASCII protocol is a simple line-based text interface:
//!
//! - **Commands** (host → device): ASCII text terminated with `\n`
//! - **Replies** (device → host): a single line of text, usually a decimal
//!   number (or two, for the `f` feedback query)
//!
//! Floating-point arguments are rendered with exactly four fractional digits.
//!
//! # Command Types
//!
//! - **Motion**: `p`, `v`, `c` and `t` setpoints
//! - **Properties**: `r axis<N>.<path>` reads, `w axis<N>.<path> <value>` writes
//! - **System**: `ss` (save configuration), `sc` (clear errors)
//! - **Watchdog**: `u<N>` feeds the axis watchdog
//!
//! # Example
//!
//! ```rust
//! use odrive_ascii_protocol::{decode_errors, parse_float, Command};
//!
//! let cmd = Command::SetTorque { axis: 0, torque: 0.5 };
//! assert_eq!(cmd.encode(), b"c 0 0.5000\n");
//!
//! assert_eq!(parse_float("-2.5"), -2.5);
//! assert_eq!(decode_errors(0), "");
//! ```

mod codec;
mod commands;
mod constants;
mod error;
mod errors;
mod responses;

pub use codec::*;
pub use commands::*;
pub use constants::*;
pub use error::*;
pub use errors::*;
pub use responses::*;
