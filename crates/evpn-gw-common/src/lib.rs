//! Common infrastructure for the EVPN gateway crates.
//!
//! - [`error`]: the [`GwError`] taxonomy and its coarse status [`Code`]
//! - [`shell`]: shell command execution with proper quoting, used by the
//!   iproute2 and vtysh backends

pub mod error;
pub mod shell;

pub use error::{Code, GwError, GwResult};
