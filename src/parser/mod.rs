//! Parsers for project documents and compiler options files

mod options;
mod xml;

pub use options::{scan_options, LangVersionRequest, OptionsScan};
pub use xml::parse_project;
