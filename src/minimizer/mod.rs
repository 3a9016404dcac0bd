//! Minimizer — client for the remote DFA minimization service.
//!
//! DESIGN
//! ======
//! The service owns minimization and every validation of the automaton
//! source. This side only ships the raw text, waits for one response and
//! sorts failures into "unreachable" versus "service said no". There is no
//! retry and no state kept between submissions beyond the connection pool.

pub mod client;
pub mod config;
pub mod types;

pub use client::MinimizerClient;
pub use config::MinimizerConfig;
pub use types::{MinimizeResponse, MinimizerError};
