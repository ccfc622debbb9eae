//! The calendar document: header properties plus top-level components.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use chrono_tz::Tz;

use crate::component::{Component, ComponentKind};
use crate::ics::generate_ics;
use crate::property::{PropertyName, Value};
use crate::timezone::vtimezone;

pub const ICALENDAR_VERSION: &str = "2.0";
pub const PUBLISH_METHOD: &str = "PUBLISH";

/// An in-memory VCALENDAR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    root: Component,
}

impl Calendar {
    /// An empty VCALENDAR with no header properties.
    pub fn new() -> Self {
        Calendar {
            root: Component::new(ComponentKind::Calendar),
        }
    }

    /// A VCALENDAR carrying the published-feed header.
    pub fn with_header(product_id: &str, calendar_name: &str) -> Self {
        let mut calendar = Calendar::new();
        calendar
            .set(PropertyName::ProdId, product_id)
            .set(PropertyName::Version, ICALENDAR_VERSION)
            .set(PropertyName::Method, PUBLISH_METHOD)
            .set(PropertyName::XWrCalName, calendar_name);
        calendar
    }

    pub fn set(&mut self, name: PropertyName, value: impl Into<Value>) -> &mut Self {
        self.root.insert(name, value);
        self
    }

    pub fn push(&mut self, component: Component) -> &mut Self {
        self.root.push(component);
        self
    }

    pub fn components(&self) -> &[Component] {
        self.root.components()
    }

    /// Add a VTIMEZONE for every zone referenced by a date-time property
    /// that the document does not define yet. Returns how many were added.
    ///
    /// Each definition covers the years from the earliest to the latest
    /// date-time in that zone. New definitions are appended in TZID order.
    pub fn add_missing_timezones(&mut self) -> usize {
        let defined: BTreeSet<&str> = self
            .components()
            .iter()
            .filter(|c| c.kind() == ComponentKind::TimeZone)
            .filter_map(|c| c.get(PropertyName::TzId).and_then(Value::as_text))
            .collect();

        let mut missing: BTreeMap<&'static str, (Tz, RangeInclusive<i32>)> = BTreeMap::new();
        for component in self.root.walk() {
            for (_, value) in component.properties() {
                let Some(time) = value.as_event_time() else {
                    continue;
                };
                let Some(tz) = time.timezone() else {
                    continue;
                };
                if defined.contains(tz.name()) {
                    continue;
                }
                let year = time.local_year();
                missing
                    .entry(tz.name())
                    .and_modify(|(_, years)| {
                        *years = (*years.start()).min(year)..=(*years.end()).max(year);
                    })
                    .or_insert((tz, year..=year));
            }
        }

        let added = missing.len();
        for (tz, years) in missing.into_values() {
            self.root.push(vtimezone(tz, years));
        }
        added
    }

    /// Stable sort of top-level components by UID. Components without a UID
    /// come first.
    pub fn sort_components(&mut self) {
        self.root
            .components_mut()
            .sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }

    /// Complete and order the document: add missing timezones, then sort.
    /// Returns the number of timezone definitions added.
    pub fn finalize(&mut self) -> usize {
        let added = self.add_missing_timezones();
        self.sort_components();
        added
    }

    /// The document in ICS wire format.
    pub fn to_ics(&self) -> String {
        generate_ics(&self.root)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Calendar::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::EventTime;
    use chrono::TimeZone;
    use indoc::indoc;

    fn crlf(text: &str) -> String {
        text.replace('\n', "\r\n")
    }

    fn uid_only(uid: &str) -> Component {
        let mut event = Component::event();
        event.insert(PropertyName::Uid, uid);
        event
    }

    fn test_calendar() -> Calendar {
        Calendar::with_header("-//author.example.com//", "Cal Name")
    }

    #[test]
    fn test_header_serializes_exactly() {
        assert_eq!(
            test_calendar().to_ics(),
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//author.example.com//\r\nMETHOD:PUBLISH\r\nX-WR-CALNAME:Cal Name\r\nEND:VCALENDAR\r\n"
        );
    }

    #[test]
    fn test_components_sort_by_uid() {
        let mut calendar = test_calendar();
        for letter in "aZbYcWdXe".chars() {
            calendar.push(uid_only(&format!("uuid-{}", letter.to_ascii_uppercase())));
        }

        calendar.finalize();

        assert_eq!(
            calendar.to_ics(),
            crlf(indoc! {"
                BEGIN:VCALENDAR
                VERSION:2.0
                PRODID:-//author.example.com//
                METHOD:PUBLISH
                X-WR-CALNAME:Cal Name
                BEGIN:VEVENT
                UID:uuid-A
                END:VEVENT
                BEGIN:VEVENT
                UID:uuid-B
                END:VEVENT
                BEGIN:VEVENT
                UID:uuid-C
                END:VEVENT
                BEGIN:VEVENT
                UID:uuid-D
                END:VEVENT
                BEGIN:VEVENT
                UID:uuid-E
                END:VEVENT
                BEGIN:VEVENT
                UID:uuid-W
                END:VEVENT
                BEGIN:VEVENT
                UID:uuid-X
                END:VEVENT
                BEGIN:VEVENT
                UID:uuid-Y
                END:VEVENT
                BEGIN:VEVENT
                UID:uuid-Z
                END:VEVENT
                END:VCALENDAR
            "})
        );
    }

    #[test]
    fn test_components_without_uid_sort_first() {
        let mut calendar = test_calendar();
        calendar.push(uid_only("0"));
        calendar.push(Component::event());
        calendar.push(uid_only(""));

        calendar.sort_components();

        let uids: Vec<Option<&str>> = calendar.components().iter().map(Component::uid).collect();
        assert_eq!(uids, [None, Some(""), Some("0")]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_uids() {
        let mut calendar = test_calendar();
        let mut first = uid_only("uuid-A");
        first.insert(PropertyName::Summary, "first");
        let mut second = uid_only("uuid-A");
        second.insert(PropertyName::Summary, "second");

        calendar.push(uid_only("uuid-B")).push(first).push(second);
        calendar.sort_components();

        let summaries: Vec<Option<&str>> = calendar
            .components()
            .iter()
            .map(|c| c.get(PropertyName::Summary).and_then(Value::as_text))
            .collect();
        assert_eq!(summaries, [Some("first"), Some("second"), None]);
    }

    #[test]
    fn test_missing_timezones_are_added_once_per_zone() {
        let toronto: Tz = "America/Toronto".parse().unwrap();
        let paris: Tz = "Europe/Paris".parse().unwrap();

        let mut calendar = test_calendar();
        for (uid, tz, year) in [
            ("uuid-A", paris, 2021),
            ("uuid-B", toronto, 2020),
            ("uuid-C", toronto, 2019),
        ] {
            let mut event = uid_only(uid);
            event.insert(
                PropertyName::DtStart,
                EventTime::Zoned(tz.with_ymd_and_hms(year, 6, 1, 18, 0, 0).unwrap()),
            );
            calendar.push(event);
        }

        assert_eq!(calendar.finalize(), 2);

        let kinds: Vec<ComponentKind> = calendar.components().iter().map(Component::kind).collect();
        assert_eq!(
            kinds,
            [
                ComponentKind::TimeZone,
                ComponentKind::TimeZone,
                ComponentKind::Event,
                ComponentKind::Event,
                ComponentKind::Event
            ]
        );

        let ics = calendar.to_ics();
        assert!(ics.contains("TZID:America/Toronto"), "ICS:\n{ics}");
        assert!(ics.contains("TZID:Europe/Paris"), "ICS:\n{ics}");
        assert!(
            ics.find("TZID:America/Toronto") < ics.find("TZID:Europe/Paris"),
            "ICS:\n{ics}"
        );
        // Toronto is described from the start of its earliest year
        assert!(ics.contains("DTSTART:20190101T000000"), "ICS:\n{ics}");
        assert!(ics.contains("DTSTART:20190310T020000"), "ICS:\n{ics}");

        // Already complete: nothing more to add
        assert_eq!(calendar.add_missing_timezones(), 0);
    }

    fn zoned_event(uid: &str, tz: Tz, stamp: (i32, u32, u32)) -> Component {
        let (year, month, day) = stamp;
        let mut event = uid_only(uid);
        event.insert(
            PropertyName::DtStart,
            EventTime::Zoned(tz.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()),
        );
        event
    }

    #[test]
    fn test_timezone_covers_every_referenced_year() {
        let toronto: Tz = "America/Toronto".parse().unwrap();

        let mut calendar = test_calendar();
        calendar
            .push(zoned_event("uuid-A", toronto, (2006, 7, 1)))
            .push(zoned_event("uuid-B", toronto, (2020, 3, 20)));
        calendar.finalize();
        let ics = calendar.to_ics();

        // 2020-03-20 is already in DST under the rules in force since 2007
        assert!(
            ics.contains("DTSTART:20070311T020000\r\n"),
            "ICS:\n{ics}"
        );
        assert!(
            ics.contains("RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\r\n"),
            "ICS:\n{ics}"
        );
        assert!(!ics.contains("BYMONTH=4;BYDAY=1SU\r\n"), "ICS:\n{ics}");
    }

    #[test]
    fn test_timezone_starts_before_january_event() {
        let toronto: Tz = "America/Toronto".parse().unwrap();

        let mut calendar = test_calendar();
        calendar.push(zoned_event("uuid-A", toronto, (2020, 1, 15)));
        calendar.finalize();

        let vtimezone = &calendar.components()[0];
        let first_onset = vtimezone.components().first().and_then(|c| c.get(PropertyName::DtStart));
        assert_eq!(
            first_onset.map(Value::to_ics).as_deref(),
            Some("20200101T000000"),
            "ICS:\n{}",
            calendar.to_ics()
        );
    }

    #[test]
    fn test_utc_times_need_no_timezone() {
        let mut calendar = test_calendar();
        let mut event = uid_only("uuid-A");
        event.insert(
            PropertyName::DtStart,
            EventTime::Utc(chrono::Utc.with_ymd_and_hms(2020, 1, 1, 13, 30, 0).unwrap()),
        );
        calendar.push(event);

        assert_eq!(calendar.finalize(), 0);
        assert!(!calendar.to_ics().contains("VTIMEZONE"));
    }
}
