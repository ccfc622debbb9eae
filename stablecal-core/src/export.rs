//! Streaming-style exporter: start, add records, finish.
//!
//! Records are collected in memory and nothing reaches the sink until
//! [`CalendarExporter::finish`], which writes the finalized document in a
//! single bulk write. Dropping an exporter before finishing writes nothing.

use std::collections::HashSet;
use std::io::Write;

use tracing::{debug, info, warn};

use crate::calendar::Calendar;
use crate::component::ComponentKind;
use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::event::EventRecord;
use crate::uid::IdentifierDeriver;

/// Lifecycle of a [`CalendarExporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Created,
    Exporting,
    Finalized,
}

impl ExportState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportState::Created => "created",
            ExportState::Exporting => "exporting",
            ExportState::Finalized => "finalized",
        }
    }
}

/// Exports event records to a sink as one canonical ICS document.
///
/// Not meant to be shared between threads; feed `add` from a single writer.
pub struct CalendarExporter<W: Write> {
    sink: W,
    config: ExportConfig,
    deriver: IdentifierDeriver,
    calendar: Calendar,
    seen_uids: HashSet<String>,
    state: ExportState,
}

impl<W: Write> CalendarExporter<W> {
    pub fn new(sink: W, config: ExportConfig) -> Self {
        let deriver = IdentifierDeriver::new(config.namespace);
        CalendarExporter {
            sink,
            config,
            deriver,
            calendar: Calendar::new(),
            seen_uids: HashSet::new(),
            state: ExportState::Created,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Write the calendar header. Must be called once, before any `add`.
    pub fn start(&mut self) -> ExportResult<()> {
        self.require(ExportState::Created, "start")?;

        self.calendar = Calendar::with_header(&self.config.product_id, &self.config.calendar_name);
        self.state = ExportState::Exporting;
        Ok(())
    }

    /// Add one record. Order of calls does not affect the output.
    pub fn add(&mut self, record: &EventRecord) -> ExportResult<()> {
        self.require(ExportState::Exporting, "add")?;

        let component = record.to_component(&self.deriver);
        if let Some(uid) = component.uid() {
            if !self.seen_uids.insert(uid.to_string()) {
                warn!(url = %record.url, uid, "Duplicate event url, output order between duplicates follows insertion");
            }
            debug!(url = %record.url, uid, "Added event");
        }

        self.calendar.push(component);
        Ok(())
    }

    /// Finalize the document and write it to the sink.
    ///
    /// Sink errors are returned as [`ExportError::Sink`]; the exporter is
    /// finalized either way and cannot be retried.
    pub fn finish(&mut self) -> ExportResult<()> {
        self.require(ExportState::Exporting, "finish")?;
        self.state = ExportState::Finalized;

        let mut calendar = std::mem::take(&mut self.calendar);
        let timezones = calendar.finalize();
        let events = calendar
            .components()
            .iter()
            .filter(|c| c.kind() == ComponentKind::Event)
            .count();
        let ics = calendar.to_ics();

        info!(events, timezones, bytes = ics.len(), "Writing calendar");

        self.sink
            .write_all(ics.as_bytes())
            .map_err(ExportError::Sink)?;
        self.sink.flush().map_err(ExportError::Sink)?;

        Ok(())
    }

    /// Give back the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn require(&self, expected: ExportState, operation: &'static str) -> ExportResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ExportError::InvalidState {
                operation,
                state: self.state.as_str(),
            })
        }
    }
}

/// Export all records to `sink` in one go.
pub fn export_records<'a, W: Write>(
    sink: W,
    config: ExportConfig,
    records: impl IntoIterator<Item = &'a EventRecord>,
) -> ExportResult<W> {
    let mut exporter = CalendarExporter::new(sink, config);
    exporter.start()?;
    for record in records {
        exporter.add(record)?;
    }
    exporter.finish()?;
    Ok(exporter.into_inner())
}
