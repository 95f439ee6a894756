//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every subscribed server stops accepting
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT or trigger → graceful shutdown of the server
//!     → in-flight requests drain within the grace period
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
