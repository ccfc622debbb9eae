//! Deterministic iCalendar export.
//!
//! Turns event records into a single calendar document whose bytes depend
//! only on the logical content, never on insertion order:
//! - `uid` derives stable UUID v5 identifiers from event urls
//! - `event` validates producer records and maps them to VEVENTs
//! - `calendar` orders components by UID and completes missing timezones
//! - `export` drives the start / add / finish lifecycle against a sink
//! - `ics` writes (and reads back) the RFC 5545 wire format

pub mod calendar;
pub mod component;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod ics;
pub mod property;
pub mod time;
pub mod timezone;
pub mod uid;

pub use calendar::Calendar;
pub use component::{Component, ComponentKind};
pub use config::ExportConfig;
pub use error::{ExportError, ExportResult};
pub use event::{EventRecord, RawEventRecord, parse_records};
pub use export::{CalendarExporter, ExportState, export_records};
pub use property::{PropertyName, Value};
pub use time::EventTime;
pub use uid::{DEFAULT_NAMESPACE, IdentifierDeriver, derive_uid};
