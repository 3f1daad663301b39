//! Command implementations.
//!
//! The shell module contains the full interactive loop, invoked by the
//! thin wrapper binary.

pub mod shell;
