//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → stores → seed data → AppState
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → stop accepting → drain in-flight requests → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener is bound last, after seed data is in place

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, Services, StartupError};
