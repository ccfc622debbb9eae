//! Read emitted ICS back using the icalendar crate's parser.
//!
//! This is a verification aid, not a decoder: it recovers component names,
//! UIDs and property values so callers can check what a conformant reader
//! sees in an exported document.

use icalendar::parser::{Component as IcsComponent, read_calendar, unfold};

use crate::error::{ExportError, ExportResult};
use crate::ics::text::unescape_text;
use crate::property::PropertyName;

/// A top-level component as seen by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedComponent {
    pub name: String,
    /// Property names and unescaped values, in document order
    pub properties: Vec<(String, String)>,
    pub components: Vec<ParsedComponent>,
}

impl ParsedComponent {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn uid(&self) -> Option<&str> {
        self.property("UID")
    }

    fn properties_sorted(&self) -> bool {
        properties_sorted(&self.properties)
            && self.components.iter().all(ParsedComponent::properties_sorted)
    }

    fn from_parsed(component: &IcsComponent<'_>) -> Self {
        ParsedComponent {
            name: component.name.to_string(),
            properties: component
                .properties
                .iter()
                .map(|p| (p.name.to_string(), unescape_text(p.val.as_ref())))
                .collect(),
            components: component.components.iter().map(Self::from_parsed).collect(),
        }
    }
}

/// A parsed calendar document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarOverview {
    pub properties: Vec<(String, String)>,
    pub components: Vec<ParsedComponent>,
}

impl CalendarOverview {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn events(&self) -> impl Iterator<Item = &ParsedComponent> {
        self.components.iter().filter(|c| c.name == "VEVENT")
    }

    /// UIDs of top-level components, in document order.
    pub fn uids(&self) -> Vec<&str> {
        self.components.iter().filter_map(ParsedComponent::uid).collect()
    }

    /// TZIDs of the VTIMEZONE components, in document order.
    pub fn timezones(&self) -> Vec<&str> {
        self.components
            .iter()
            .filter(|c| c.name == "VTIMEZONE")
            .filter_map(|c| c.property("TZID"))
            .collect()
    }

    /// Whether top-level components are in canonical order (ascending by
    /// UID, components without a UID first) and every component's known
    /// properties appear in canonical property order.
    pub fn is_canonically_ordered(&self) -> bool {
        let components_sorted = self
            .components
            .windows(2)
            .all(|pair| pair[0].uid() <= pair[1].uid());

        components_sorted
            && properties_sorted(&self.properties)
            && self.components.iter().all(ParsedComponent::properties_sorted)
    }
}

/// Known property names must not decrease; unknown names are ignored.
fn properties_sorted(properties: &[(String, String)]) -> bool {
    let known: Vec<PropertyName> = properties
        .iter()
        .filter_map(|(name, _)| PropertyName::from_name(name))
        .collect();
    known.windows(2).all(|pair| pair[0] <= pair[1])
}

/// Parse ICS content into a [`CalendarOverview`].
pub fn parse_calendar(content: &str) -> ExportResult<CalendarOverview> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| ExportError::IcsParse(e.to_string()))?;

    Ok(CalendarOverview {
        properties: calendar
            .properties
            .iter()
            .map(|p| (p.name.to_string(), unescape_text(p.val.as_ref())))
            .collect(),
        components: calendar
            .components
            .iter()
            .map(ParsedComponent::from_parsed)
            .collect(),
    })
}
