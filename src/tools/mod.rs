//! The tools module provides helper functions for hzip.
//!
//! The tools are:
//! - cli: Command line interface for hzip.
//! - data_io: Opening, naming and removing the files hzip reads and writes.
//! - freq_count: Frequency count of the input symbols.
//!
pub mod cli;
pub mod data_io;
pub mod freq_count;
