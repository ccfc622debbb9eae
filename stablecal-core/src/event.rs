//! Event records and their mapping to VEVENT components.
//!
//! Producers hand over [`RawEventRecord`]s (typically deserialized from JSON)
//! where every field is optional. Converting to an [`EventRecord`] validates
//! required fields and timestamps up front, so building a component can never
//! fail halfway.

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::error::{ExportError, ExportResult};
use crate::property::{PropertyName, Value};
use crate::time::EventTime;
use crate::uid::IdentifierDeriver;

/// An event record as delivered by a producer, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEventRecord {
    pub summary: Option<String>,
    pub url: Option<String>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub updated_at: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// A validated event record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub summary: String,
    /// Canonical url, the natural key of the event
    pub url: String,
    pub start_datetime: EventTime,
    pub end_datetime: EventTime,
    pub updated_at: EventTime,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EventRecord {
    /// Build the VEVENT for this record.
    ///
    /// Absent location and description are left out entirely rather than
    /// written as empty properties. DTSTAMP is always written in UTC.
    pub fn to_component(&self, deriver: &IdentifierDeriver) -> Component {
        let mut event = Component::event();
        event
            .insert(PropertyName::Summary, self.summary.as_str())
            .insert(PropertyName::Uid, deriver.uid_for(&self.url))
            .insert(PropertyName::Url, self.url.as_str())
            .insert(PropertyName::DtStart, self.start_datetime)
            .insert(PropertyName::DtEnd, self.end_datetime)
            .insert(PropertyName::DtStamp, EventTime::Utc(self.updated_at.to_utc()))
            .insert_opt(PropertyName::Location, self.location.as_deref().map(Value::text))
            .insert_opt(
                PropertyName::Description,
                self.description.as_deref().map(Value::text),
            );
        event
    }
}

impl TryFrom<RawEventRecord> for EventRecord {
    type Error = ExportError;

    fn try_from(raw: RawEventRecord) -> ExportResult<Self> {
        Ok(EventRecord {
            summary: required("summary", raw.summary)?,
            url: required("url", raw.url)?,
            start_datetime: timestamp("start_datetime", raw.start_datetime)?,
            end_datetime: timestamp("end_datetime", raw.end_datetime)?,
            updated_at: timestamp("updated_at", raw.updated_at)?,
            location: raw.location,
            description: raw.description,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> ExportResult<String> {
    value.ok_or_else(|| ExportError::invalid_record(field, "is required"))
}

fn timestamp(field: &'static str, value: Option<String>) -> ExportResult<EventTime> {
    EventTime::parse(field, &required(field, value)?)
}

/// Parse producer output: either a JSON array of records or JSON Lines (one
/// record per line, blank lines ignored).
pub fn parse_records(input: &str) -> ExportResult<Vec<RawEventRecord>> {
    if input.trim_start().starts_with('[') {
        return serde_json::from_str(input).map_err(|e| ExportError::Json(e.to_string()));
    }

    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .map_err(|e| ExportError::Json(format!("line {}: {e}", index + 1)))
        })
        .collect()
}
