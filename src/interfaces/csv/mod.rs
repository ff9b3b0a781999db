//! CSV command intake and report output used by the command-line client.

pub mod command_reader;
pub mod report_writer;
