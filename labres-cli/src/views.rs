//! Row layouts for each kind of record the CLI lists.

use chrono::NaiveDateTime;
use labres::schedule::{format_date, format_time};
use labres::{NotificationEvent, Release, Reservation, Resource, ResourceAvailability};

use crate::output::Rows;
use crate::utils::format_timestamp;

const RESOURCE_HEADERS: &[&str] = &[
    "id",
    "label",
    "location",
    "specification",
    "status",
    "created_at",
];

const AVAILABILITY_HEADERS: &[&str] = &["id", "label", "status", "current", "next_window"];

const RESERVATION_HEADERS: &[&str] = &[
    "id",
    "resource",
    "owner",
    "start_date",
    "end_date",
    "start_time",
    "end_time",
    "status",
    "reason",
    "decision_reason",
];

const RELEASE_HEADERS: &[&str] = &[
    "id",
    "reservation",
    "owner",
    "resource",
    "dates",
    "reclaimed",
    "status",
    "reason",
];

const NOTIFICATION_HEADERS: &[&str] = &[
    "id",
    "kind",
    "user",
    "reservation",
    "release",
    "created_at",
    "message",
];

fn opt(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn resources(resources: &[Resource]) -> Rows {
    let mut rows = Rows::new(RESOURCE_HEADERS);
    for r in resources {
        rows.push(vec![
            r.id().to_string(),
            r.label().to_string(),
            opt(r.location()),
            opt(r.specification()),
            r.status().to_string(),
            format_timestamp(r.created_at()),
        ]);
    }
    rows
}

pub fn availability(entries: &[ResourceAvailability]) -> Rows {
    let mut rows = Rows::new(AVAILABILITY_HEADERS);
    for entry in entries {
        let next = entry.next_window.as_ref().map(|w| {
            format!(
                "{} {}-{}",
                format_date(w.date),
                format_time(w.start),
                format_time(w.end)
            )
        });
        rows.push(vec![
            entry.resource.id().to_string(),
            entry.resource.label().to_string(),
            entry.status.to_string(),
            opt(entry.current),
            opt(next),
        ]);
    }
    rows
}

/// Reservations with their status as of `now`.
pub fn reservations(reservations: &[Reservation], now: NaiveDateTime) -> Rows {
    let mut rows = Rows::new(RESERVATION_HEADERS);
    for r in reservations {
        rows.push(vec![
            r.id().to_string(),
            r.resource().to_string(),
            r.owner().to_string(),
            format_date(r.dates().start()),
            format_date(r.dates().end()),
            format_time(r.window().start()),
            format_time(r.window().end()),
            r.effective_status(now).to_string(),
            r.reason().to_string(),
            opt(r.decision_reason()),
        ]);
    }
    rows
}

pub fn releases(releases: &[Release]) -> Rows {
    let mut rows = Rows::new(RELEASE_HEADERS);
    for r in releases {
        let dates = r
            .original_dates()
            .iter()
            .map(|d| format_date(*d))
            .collect::<Vec<_>>()
            .join(" ");
        let reclaimed = r
            .reclaimed()
            .iter()
            .map(|(d, by)| format!("{}={by}", format_date(*d)))
            .collect::<Vec<_>>()
            .join(" ");
        rows.push(vec![
            r.id().to_string(),
            r.reservation().to_string(),
            r.owner().to_string(),
            r.resource().to_string(),
            dates,
            reclaimed,
            r.status().to_string(),
            r.reason().to_string(),
        ]);
    }
    rows
}

pub fn notifications(events: &[NotificationEvent]) -> Rows {
    let mut rows = Rows::new(NOTIFICATION_HEADERS);
    for e in events {
        rows.push(vec![
            e.id.to_string(),
            e.kind.to_string(),
            e.user.to_string(),
            opt(e.reservation),
            opt(e.release),
            format_timestamp(e.created_at),
            e.message.clone(),
        ]);
    }
    rows
}
