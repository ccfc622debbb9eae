//! VTIMEZONE synthesis from the IANA database bundled with `chrono-tz`.
//!
//! A zone is described over the span of years its date-times fall in. The
//! first observance is the zone's state at local midnight on January 1 of the
//! first year. Consecutive years whose two transitions follow the same weekday
//! rule are collapsed into a pair of yearly rules (`BYMONTH`/`BYDAY`), closed
//! with `UNTIL` when the zone changes its rules. Every other transition is
//! written as a fixed observance.

use std::ops::RangeInclusive;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    TimeZone, Utc, Weekday,
};
use chrono_tz::{OffsetComponents, Tz};

use crate::component::{Component, ComponentKind};
use crate::property::{PropertyName, Value};

/// One change of UTC offset.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Transition {
    at: DateTime<Utc>,
    from: FixedOffset,
    to: FixedOffset,
    daylight: bool,
    name: String,
}

impl Transition {
    /// Wall-clock time of the transition, in the offset in effect before it.
    fn local_start(&self) -> NaiveDateTime {
        self.at.naive_utc() + TimeDelta::seconds(i64::from(self.from.local_minus_utc()))
    }
}

/// Yearly recurrence of one transition. Two years share a rule when their
/// recurrences compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Recurrence {
    rule: String,
    time: NaiveTime,
    from: FixedOffset,
    to: FixedOffset,
    daylight: bool,
    name: String,
}

impl Recurrence {
    fn of(transition: &Transition) -> Self {
        let start = transition.local_start();
        Recurrence {
            rule: yearly_rule(&start),
            time: start.time(),
            from: transition.from,
            to: transition.to,
            daylight: transition.daylight,
            name: transition.name.clone(),
        }
    }
}

/// Recurrences of a year with exactly two transitions.
fn yearly_pattern(transitions: &[Transition]) -> Option<Vec<Recurrence>> {
    if transitions.len() != 2 {
        return None;
    }
    Some(transitions.iter().map(Recurrence::of).collect())
}

/// Build the VTIMEZONE component for `tz`, covering every instant from local
/// midnight on January 1 of the first year through the end of the last.
pub fn vtimezone(tz: Tz, years: RangeInclusive<i32>) -> Component {
    let first = *years.start();
    let last = (*years.end()).max(first);

    let mut component = Component::new(ComponentKind::TimeZone);
    component.insert(PropertyName::TzId, tz.name());

    if let Some(initial) = initial_state(tz, first) {
        component.push(observance(&initial, None));
    }

    // The extra year decides whether the last rule is still in force
    let by_year: Vec<Vec<Transition>> = (first..=last.saturating_add(1))
        .map(|year| transitions_in_year(tz, year))
        .collect();
    let lookahead = by_year.len() - 1;

    let mut index = 0;
    while index < lookahead {
        let transitions = &by_year[index];
        let pattern = yearly_pattern(transitions);
        let end = match &pattern {
            Some(pattern) => rule_end(&by_year, index, pattern),
            None => index,
        };

        match pattern.filter(|_| end > index) {
            Some(pattern) => {
                for (position, (transition, recurrence)) in
                    transitions.iter().zip(&pattern).enumerate()
                {
                    let rule = if end == lookahead {
                        recurrence.rule.clone()
                    } else {
                        let until = by_year[end][position].at;
                        format!("{};UNTIL={}", recurrence.rule, until.format("%Y%m%dT%H%M%SZ"))
                    };
                    component.push(observance(transition, Some(rule)));
                }
                index = end + 1;
            }
            None => {
                for transition in transitions {
                    component.push(observance(transition, None));
                }
                index += 1;
            }
        }
    }

    component
}

/// Index of the last year, starting at `index`, that repeats `pattern`.
fn rule_end(by_year: &[Vec<Transition>], index: usize, pattern: &[Recurrence]) -> usize {
    let mut end = index;
    while end + 1 < by_year.len()
        && yearly_pattern(&by_year[end + 1]).as_deref() == Some(pattern)
    {
        end += 1;
    }
    end
}

fn observance(transition: &Transition, rule: Option<String>) -> Component {
    let kind = if transition.daylight {
        ComponentKind::Daylight
    } else {
        ComponentKind::Standard
    };

    let mut component = Component::new(kind);
    component
        .insert(PropertyName::DtStart, Value::LocalDateTime(transition.local_start()))
        .insert(PropertyName::TzOffsetFrom, Value::UtcOffset(transition.from))
        .insert(PropertyName::TzOffsetTo, Value::UtcOffset(transition.to))
        .insert(PropertyName::TzName, transition.name.as_str())
        .insert_opt(PropertyName::RRule, rule.map(Value::Recur));
    component
}

fn year_start(year: i32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// State of the zone at local midnight on January 1, as a zero-width
/// observance.
fn initial_state(tz: Tz, year: i32) -> Option<Transition> {
    let midnight = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let offset = tz
        .offset_from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.offset_from_utc_datetime(&midnight));
    let fixed = offset.fix();

    Some(Transition {
        at: midnight.and_utc() - TimeDelta::seconds(i64::from(fixed.local_minus_utc())),
        from: fixed,
        to: fixed,
        daylight: !offset.dst_offset().is_zero(),
        name: offset.to_string(),
    })
}

/// Every offset change in `[year-01-01, (year+1)-01-01)` UTC.
fn transitions_in_year(tz: Tz, year: i32) -> Vec<Transition> {
    let (Some(start), Some(end)) = (year_start(year), year_start(year + 1)) else {
        return Vec::new();
    };

    let offset_at = |instant: DateTime<Utc>| tz.offset_from_utc_datetime(&instant.naive_utc());

    let mut transitions = Vec::new();
    let mut cursor = start;

    while cursor < end {
        let next = (cursor + TimeDelta::days(1)).min(end);
        let before = offset_at(cursor).fix();

        if offset_at(next).fix() != before {
            // Narrow down to the first second with the new offset
            let (mut lo, mut hi) = (cursor, next);
            while hi - lo > TimeDelta::seconds(1) {
                let mid = lo + (hi - lo) / 2;
                if offset_at(mid).fix() == before {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }

            if hi < end {
                let offset = offset_at(hi);
                transitions.push(Transition {
                    at: hi,
                    from: before,
                    to: offset.fix(),
                    daylight: !offset.dst_offset().is_zero(),
                    name: offset.to_string(),
                });
            }
        }

        cursor = next;
    }

    transitions
}

/// `FREQ=YEARLY` rule recurring on the same weekday-of-month as `start`,
/// using `-1` when `start` falls in the last week of its month.
fn yearly_rule(start: &NaiveDateTime) -> String {
    let day = start.day();
    let ordinal = if day + 7 > days_in_month(start.year(), start.month()) {
        "-1".to_string()
    } else {
        ((day - 1) / 7 + 1).to_string()
    };

    format!(
        "FREQ=YEARLY;BYMONTH={};BYDAY={}{}",
        start.month(),
        ordinal,
        weekday_code(start.weekday())
    )
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::generate_ics;

    fn observances(component: &Component) -> Vec<&Component> {
        component.components().iter().collect()
    }

    fn onsets(component: &Component) -> Vec<NaiveDateTime> {
        component
            .components()
            .iter()
            .filter_map(|c| match c.get(PropertyName::DtStart) {
                Some(Value::LocalDateTime(dt)) => Some(*dt),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_toronto_has_daylight_and_standard_rules() {
        let tz: Tz = "America/Toronto".parse().unwrap();
        let vtimezone = vtimezone(tz, 2020..=2020);
        let ics = generate_ics(&vtimezone);

        assert_eq!(vtimezone.get(PropertyName::TzId), Some(&Value::text("America/Toronto")));

        let parts = observances(&vtimezone);
        assert_eq!(parts.len(), 3, "ICS:\n{ics}");
        assert_eq!(parts[0].kind(), ComponentKind::Standard);
        assert_eq!(parts[1].kind(), ComponentKind::Daylight);
        assert_eq!(parts[2].kind(), ComponentKind::Standard);

        assert!(
            ics.contains(
                "BEGIN:STANDARD\r\n\
                 DTSTART:20200101T000000\r\n\
                 TZOFFSETTO:-0500\r\n\
                 TZOFFSETFROM:-0500\r\n\
                 TZNAME:EST\r\n\
                 END:STANDARD\r\n"
            ),
            "ICS:\n{ics}"
        );
        assert!(
            ics.contains(
                "BEGIN:DAYLIGHT\r\n\
                 DTSTART:20200308T020000\r\n\
                 TZOFFSETTO:-0400\r\n\
                 TZOFFSETFROM:-0500\r\n\
                 RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\r\n\
                 TZNAME:EDT\r\n\
                 END:DAYLIGHT\r\n"
            ),
            "ICS:\n{ics}"
        );
        assert!(
            ics.contains(
                "BEGIN:STANDARD\r\n\
                 DTSTART:20201101T020000\r\n\
                 TZOFFSETTO:-0500\r\n\
                 TZOFFSETFROM:-0400\r\n\
                 RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\r\n\
                 TZNAME:EST\r\n\
                 END:STANDARD\r\n"
            ),
            "ICS:\n{ics}"
        );
    }

    #[test]
    fn test_january_is_covered_before_first_transition() {
        let tz: Tz = "America/Toronto".parse().unwrap();
        let vtimezone = vtimezone(tz, 2020..=2020);
        let ics = generate_ics(&vtimezone);

        let event = NaiveDate::from_ymd_opt(2020, 1, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let onsets = onsets(&vtimezone);

        assert!(
            onsets.first().is_some_and(|onset| *onset <= event),
            "ICS:\n{ics}"
        );
        assert!(onsets.windows(2).all(|pair| pair[0] <= pair[1]), "ICS:\n{ics}");
    }

    #[test]
    fn test_rule_change_between_years_is_written_out() {
        // Canada moved DST from April/October to March/November in 2007
        let tz: Tz = "America/Toronto".parse().unwrap();
        let vtimezone = vtimezone(tz, 2006..=2020);
        let ics = generate_ics(&vtimezone);

        assert_eq!(observances(&vtimezone).len(), 5, "ICS:\n{ics}");
        assert!(ics.contains("DTSTART:20060101T000000"), "ICS:\n{ics}");
        // 2006 stands alone, so its transitions are fixed observances
        assert!(
            ics.contains(
                "BEGIN:DAYLIGHT\r\n\
                 DTSTART:20060402T020000\r\n\
                 TZOFFSETTO:-0400\r\n\
                 TZOFFSETFROM:-0500\r\n\
                 TZNAME:EDT\r\n\
                 END:DAYLIGHT\r\n"
            ),
            "ICS:\n{ics}"
        );
        assert!(ics.contains("DTSTART:20061029T020000"), "ICS:\n{ics}");
        assert!(!ics.contains("BYMONTH=4"), "ICS:\n{ics}");
        assert!(
            ics.contains(
                "DTSTART:20070311T020000\r\n\
                 TZOFFSETTO:-0400\r\n\
                 TZOFFSETFROM:-0500\r\n\
                 RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\r\n"
            ),
            "ICS:\n{ics}"
        );
        assert!(
            ics.contains(
                "DTSTART:20071104T020000\r\n\
                 TZOFFSETTO:-0500\r\n\
                 TZOFFSETFROM:-0400\r\n\
                 RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\r\n"
            ),
            "ICS:\n{ics}"
        );
    }

    #[test]
    fn test_superseded_rules_end_with_until() {
        let tz: Tz = "America/Toronto".parse().unwrap();
        let ics = generate_ics(&vtimezone(tz, 2005..=2008));

        assert!(
            ics.contains("RRULE:FREQ=YEARLY;BYMONTH=4;BYDAY=1SU;UNTIL=20060402T070000Z\r\n"),
            "ICS:\n{ics}"
        );
        assert!(
            ics.contains("RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU;UNTIL=20061029T060000Z\r\n"),
            "ICS:\n{ics}"
        );
        assert!(
            ics.contains("RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\r\n"),
            "ICS:\n{ics}"
        );
        assert!(ics.contains("DTSTART:20050403T020000"), "ICS:\n{ics}");
        assert!(!ics.contains("DTSTART:2006"), "ICS:\n{ics}");
    }

    #[test]
    fn test_last_sunday_rules_use_negative_ordinal() {
        let tz: Tz = "Europe/Berlin".parse().unwrap();
        let ics = generate_ics(&vtimezone(tz, 2020..=2020));

        assert!(
            ics.contains("RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU"),
            "ICS:\n{ics}"
        );
        assert!(
            ics.contains("RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU"),
            "ICS:\n{ics}"
        );
        assert!(ics.contains("DTSTART:20200329T020000"), "ICS:\n{ics}");
        assert!(ics.contains("DTSTART:20201025T030000"), "ICS:\n{ics}");
    }

    #[test]
    fn test_transitions_off_a_weekday_rule_are_fixed() {
        // Iran switched on calendar dates, not on a weekday of the month
        let tz: Tz = "Asia/Tehran".parse().unwrap();
        let vtimezone = vtimezone(tz, 2020..=2021);
        let ics = generate_ics(&vtimezone);

        assert!(!ics.contains("RRULE"), "ICS:\n{ics}");
        assert_eq!(observances(&vtimezone).len(), 5, "ICS:\n{ics}");
        assert!(ics.contains("DTSTART:20200321T000000"), "ICS:\n{ics}");
        assert!(ics.contains("DTSTART:20200921T000000"), "ICS:\n{ics}");
        assert!(ics.contains("DTSTART:20210322T000000"), "ICS:\n{ics}");
        assert!(ics.contains("DTSTART:20210922T000000"), "ICS:\n{ics}");
    }

    #[test]
    fn test_single_year_rule_is_checked_against_next_year() {
        let tz: Tz = "Asia/Tehran".parse().unwrap();
        let ics = generate_ics(&vtimezone(tz, 2020..=2020));

        assert!(!ics.contains("BYDAY"), "ICS:\n{ics}");
        assert!(ics.contains("DTSTART:20200321T000000"), "ICS:\n{ics}");
    }

    #[test]
    fn test_zone_without_dst_has_single_standard_observance() {
        let tz: Tz = "Asia/Tokyo".parse().unwrap();
        let vtimezone = vtimezone(tz, 2021..=2024);
        let ics = generate_ics(&vtimezone);

        let parts = observances(&vtimezone);
        assert_eq!(parts.len(), 1, "ICS:\n{ics}");
        assert_eq!(parts[0].kind(), ComponentKind::Standard);
        assert!(ics.contains("DTSTART:20210101T000000"), "ICS:\n{ics}");
        assert!(ics.contains("TZOFFSETTO:+0900"), "ICS:\n{ics}");
        assert!(ics.contains("TZOFFSETFROM:+0900"), "ICS:\n{ics}");
        assert!(!ics.contains("RRULE"), "ICS:\n{ics}");
    }

    #[test]
    fn test_yearly_rule_ordinals() {
        let second_sunday = NaiveDate::from_ymd_opt(2020, 3, 8)
            .unwrap()
            .and_hms_opt(2, 0, 0)
            .unwrap();
        assert_eq!(
            yearly_rule(&second_sunday),
            "FREQ=YEARLY;BYMONTH=3;BYDAY=2SU"
        );

        let last_sunday = NaiveDate::from_ymd_opt(2021, 10, 31)
            .unwrap()
            .and_hms_opt(3, 0, 0)
            .unwrap();
        assert_eq!(
            yearly_rule(&last_sunday),
            "FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU"
        );
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2020, 2), 29);
        assert_eq!(days_in_month(2021, 2), 28);
        assert_eq!(days_in_month(2021, 12), 31);
        assert_eq!(days_in_month(2021, 4), 30);
    }
}
