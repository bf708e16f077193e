//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (App::build):
//!     Load config → Validate → Initialize modules → Compile routes → Bind
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
