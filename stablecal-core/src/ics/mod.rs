//! ICS wire format: generation and read-back.
//!
//! This module handles writing and reading .ics content according to RFC 5545.

mod generate;
mod parse;
mod text;

pub use generate::generate_ics;
pub use parse::{CalendarOverview, ParsedComponent, parse_calendar};
pub use text::{FOLD_LIMIT, escape_text, fold_line, unescape_text};
