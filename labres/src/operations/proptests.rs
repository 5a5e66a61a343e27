//! Property-based tests for operations module.
//!
//! These tests drive random sequences of requests, approvals, releases,
//! extensions and cancellations through the planners and check the ledger
//! invariants after every step.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime, Timelike};
use proptest::prelude::*;
use rusqlite::Connection;

use crate::actor::Actor;
use crate::database::test_util::{create_test_database, date, insert_test_resource, plan_context};
use crate::database::Database;
use crate::error::Result;
use crate::policy::BookingPolicy;
use crate::release::{ReleaseRequest, ReleaseStatus};
use crate::reservation::{ExtendRequest, Reservation, ReservationRequest, ReservationStatus};
use crate::resource::Resource;
use crate::schedule::{DateRange, TimeWindow};

use super::{
    ApprovePlan, CancelPlan, CancelReleasePlan, ExtendPlan, OperationPlan, PlanExecutor,
    ReleasePlan, ReservePlan,
};

const USERS: [&str; 3] = ["alice", "bob", "dave"];

#[derive(Debug, Clone)]
enum Step {
    Reserve {
        user: usize,
        resource: usize,
        first_day: u32,
        days: u32,
        start_hour: u32,
        hours: u32,
    },
    Approve(usize),
    Cancel(usize),
    Release { pick: usize, day: u32 },
    CancelRelease(usize),
    Extend { pick: usize, days: u32, hours: u32 },
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0..USERS.len(), 0usize..2, 2u32..=12, 0u32..4, 8u32..=16, 1u32..=4).prop_map(
            |(user, resource, first_day, days, start_hour, hours)| Step::Reserve {
                user,
                resource,
                first_day,
                days,
                start_hour,
                hours,
            }
        ),
        3 => any::<usize>().prop_map(Step::Approve),
        1 => any::<usize>().prop_map(Step::Cancel),
        2 => (any::<usize>(), 2u32..=16).prop_map(|(pick, day)| Step::Release { pick, day }),
        1 => any::<usize>().prop_map(Step::CancelRelease),
        1 => (any::<usize>(), 0u32..3, 0u32..2).prop_map(|(pick, days, hours)| Step::Extend {
            pick,
            days,
            hours,
        }),
    ]
}

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap()
}

// Rejected steps are expected; only successful plans are applied.
fn apply(conn: &Connection, plan: Result<OperationPlan>) {
    if let Ok(plan) = plan {
        PlanExecutor::new(conn).execute(&plan).unwrap();
    }
}

fn pick(reservations: &[Reservation], index: usize) -> Option<&Reservation> {
    if reservations.is_empty() {
        None
    } else {
        reservations.get(index % reservations.len())
    }
}

fn run_step(conn: &Connection, resources: &[Resource], step: &Step) {
    let admin = Actor::admin("carol").unwrap();
    let policy = BookingPolicy::permissive();
    let reservations = Database::list_all_reservations(conn).unwrap();

    match step {
        Step::Reserve {
            user,
            resource,
            first_day,
            days,
            start_hour,
            hours,
        } => {
            let actor = Actor::user(USERS[*user]).unwrap();
            let request = ReservationRequest::new(
                resources[*resource].id(),
                DateRange::new(date(*first_day), date(first_day + days)).unwrap(),
                TimeWindow::new(at(*start_hour), at(start_hour + hours)).unwrap(),
                "experiment",
            );
            let plan = ReservePlan::new(request, &policy).build_plan(&plan_context(conn, &actor));
            apply(conn, plan);
        }
        Step::Approve(index) => {
            if let Some(r) = pick(&reservations, *index) {
                let plan = ApprovePlan::new(r.id()).build_plan(&plan_context(conn, &admin));
                apply(conn, plan);
            }
        }
        Step::Cancel(index) => {
            if let Some(r) = pick(&reservations, *index) {
                let owner = Actor::user(r.owner().as_str()).unwrap();
                let plan = CancelPlan::new(r.id(), None).build_plan(&plan_context(conn, &owner));
                apply(conn, plan);
            }
        }
        Step::Release { pick: index, day } => {
            if let Some(r) = pick(&reservations, *index) {
                let owner = Actor::user(r.owner().as_str()).unwrap();
                let request = ReleaseRequest::new(r.id(), [date(*day)], "away");
                let plan = ReleasePlan::new(request).build_plan(&plan_context(conn, &owner));
                apply(conn, plan);
            }
        }
        Step::CancelRelease(index) => {
            if let Some(r) = pick(&reservations, *index) {
                let owner = Actor::user(r.owner().as_str()).unwrap();
                for release in Database::list_releases_for_reservation(conn, r.id()).unwrap() {
                    let plan = CancelReleasePlan::new(release.id(), None)
                        .build_plan(&plan_context(conn, &owner));
                    apply(conn, plan);
                }
            }
        }
        Step::Extend {
            pick: index,
            days,
            hours,
        } => {
            if let Some(r) = pick(&reservations, *index) {
                let request = ExtendRequest {
                    new_end_date: Some(r.dates().end() + chrono::Duration::days(i64::from(*days))),
                    new_end_time: Some(at(r.window().end().hour() + hours)),
                };
                let plan =
                    ExtendPlan::new(r.id(), request, &policy).build_plan(&plan_context(conn, &admin));
                apply(conn, plan);
            }
        }
    }
}

/// Dates an approved reservation holds outright: its range minus the dates
/// others reclaimed from its releases.
fn held_dates(conn: &Connection, reservation: &Reservation) -> BTreeSet<NaiveDate> {
    let reclaimed: BTreeSet<NaiveDate> =
        Database::list_releases_for_reservation(conn, reservation.id())
            .unwrap()
            .iter()
            .flat_map(|r| r.reclaimed().keys().copied().collect::<Vec<_>>())
            .collect();
    reservation
        .dates()
        .days()
        .filter(|d| !reclaimed.contains(d))
        .collect()
}

fn assert_no_double_booking(conn: &Connection, resources: &[Resource]) {
    for resource in resources {
        let approved: Vec<Reservation> = Database::list_reservations_for_resource(conn, resource.id())
            .unwrap()
            .into_iter()
            .filter(|r| r.status() == ReservationStatus::Approved)
            .collect();

        for (i, a) in approved.iter().enumerate() {
            for b in &approved[i + 1..] {
                if !a.window().overlaps(&b.window()) {
                    continue;
                }
                let shared: Vec<_> = held_dates(conn, a)
                    .intersection(&held_dates(conn, b))
                    .copied()
                    .collect();
                assert!(
                    shared.is_empty(),
                    "{} and {} both hold {shared:?}",
                    a.label(),
                    b.label()
                );
            }
        }
    }
}

fn assert_release_conservation(conn: &Connection, resources: &[Resource]) {
    for resource in resources {
        for release in Database::list_releases_for_resource(conn, resource.id()).unwrap() {
            let original = release.original_dates();
            assert!(release.reclaimed().keys().all(|d| original.contains(d)));

            let active = release.active_dates();
            assert_eq!(active.len() + release.reclaimed().len(), original.len());

            let parent = Database::get_reservation(conn, release.reservation())
                .unwrap()
                .unwrap();
            assert!(original.iter().all(|d| parent.dates().contains(*d)));
            if release.is_live() {
                assert_eq!(
                    release.status() == ReleaseStatus::PartiallyBooked,
                    active.is_empty()
                );
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    // Approved reservations never share a held date in overlapping windows
    #[test]
    fn no_double_booking(steps in prop::collection::vec(step_strategy(), 1..30)) {
        let db = create_test_database();
        let conn = db.connection();
        let resources = vec![
            insert_test_resource(conn, "ws-01"),
            insert_test_resource(conn, "ws-02"),
        ];

        for step in &steps {
            run_step(conn, &resources, step);
            assert_no_double_booking(conn, &resources);
        }
    }

    // Reclaimed dates come from the original set and active dates are the rest
    #[test]
    fn release_conservation(steps in prop::collection::vec(step_strategy(), 1..30)) {
        let db = create_test_database();
        let conn = db.connection();
        let resources = vec![insert_test_resource(conn, "ws-01"), insert_test_resource(conn, "ws-02")];

        for step in &steps {
            run_step(conn, &resources, step);
            assert_release_conservation(conn, &resources);
        }
    }

    // Extensions never shrink a reservation
    #[test]
    fn extension_is_monotonic(days in 0u32..4, hours in 0u32..4, back in 1u32..3) {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let reservation = crate::database::test_util::insert_test_reservation(
            conn, ws.id(), "alice", (5, 7), (9, 12), ReservationStatus::Approved,
        );
        let admin = Actor::admin("carol").unwrap();
        let policy = BookingPolicy::permissive();

        let shrink = ExtendRequest {
            new_end_date: Some(date(7 - back)),
            new_end_time: None,
        };
        prop_assert!(ExtendPlan::new(reservation.id(), shrink, &policy)
            .build_plan(&plan_context(conn, &admin))
            .is_err());

        let grow = ExtendRequest {
            new_end_date: Some(date(7 + days)),
            new_end_time: Some(at(12 + hours)),
        };
        let plan = ExtendPlan::new(reservation.id(), grow, &policy)
            .build_plan(&plan_context(conn, &admin))
            .unwrap();
        PlanExecutor::new(conn).execute(&plan).unwrap();

        let stored = Database::get_reservation(conn, reservation.id()).unwrap().unwrap();
        prop_assert_eq!(stored.dates().start(), date(5));
        prop_assert_eq!(stored.dates().end(), date(7 + days));
        prop_assert_eq!(stored.window().end(), at(12 + hours));
        prop_assert_eq!(stored.window().start(), at(9));
    }
}
