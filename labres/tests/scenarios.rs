//! End-to-end booking scenarios.
//!
//! Each test walks one story through the public [`Engine`] API: overlapping
//! approvals, booking released dates, withdrawing a release, malformed
//! ranges, and rejection with and without a reason.

mod common;

use common::{dates, june, user, window, TestLab};
use labres::{
    DateRange, Error, ErrorKind, NotificationKind, ReleaseRequest, ReleaseStatus,
    ReservationRequest, ReservationStatus,
};

/// Approving a request that overlaps an approved reservation fails with a
/// conflict naming the blocker, and leaves the request pending.
#[test]
fn test_overlapping_approval_is_refused() {
    let mut lab = TestLab::new();
    let ws = lab.add_resource("ws-01");

    let r1 = lab.approved("alice", ws.id(), dates(1, 3), window((9, 0), (12, 0)));
    let r2 = lab.request("bob", ws.id(), dates(2, 2), window((10, 0), (11, 0)));

    let err = lab
        .engine
        .approve_reservation(&lab.admin, r2.id())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.blocking_reservation(), Some(r1.id()));

    let r2 = lab.engine.get_reservation(r2.id()).unwrap();
    assert_eq!(r2.status(), ReservationStatus::Pending);
}

/// Released dates can be booked by someone else; booking the last active
/// date marks the release partially booked.
#[test]
fn test_released_date_can_be_booked() {
    let mut lab = TestLab::new();
    let ws = lab.add_resource("ws-01");
    let r1 = lab.approved("alice", ws.id(), dates(1, 3), window((9, 0), (12, 0)));

    let release = lab
        .engine
        .create_release(
            &user("alice"),
            ReleaseRequest::new(r1.id(), [june(2)], "conference travel"),
        )
        .unwrap()
        .value;
    assert_eq!(release.status(), ReleaseStatus::Active);

    let r3 = lab.request("bob", ws.id(), dates(2, 2), window((9, 30), (10, 30)));
    lab.emitter.clear();
    let approved = lab
        .engine
        .approve_reservation(&lab.admin, r3.id())
        .unwrap();
    assert_eq!(approved.value.status(), ReservationStatus::Approved);

    let release = lab.engine.get_release(release.id()).unwrap();
    assert_eq!(release.status(), ReleaseStatus::PartiallyBooked);
    assert!(release.active_dates().is_empty());
    assert_eq!(release.reclaimed().get(&june(2)), Some(&r3.id()));

    // The approval is announced to bob, the reclaim to alice
    let events = lab.emitter.events();
    assert!(events
        .iter()
        .any(|e| e.kind == NotificationKind::ReservationApproved && e.user.as_str() == "bob"));
    assert!(events
        .iter()
        .any(|e| e.kind == NotificationKind::ReleaseReclaimed && e.user.as_str() == "alice"));
}

/// Withdrawing a release before anyone books it hands the dates back to
/// the owner.
#[test]
fn test_cancelled_release_blocks_again() {
    let mut lab = TestLab::new();
    let ws = lab.add_resource("ws-01");
    let r1 = lab.approved("alice", ws.id(), dates(1, 3), window((9, 0), (12, 0)));

    let release = lab
        .engine
        .create_release(
            &user("alice"),
            ReleaseRequest::new(r1.id(), [june(2)], "conference travel"),
        )
        .unwrap()
        .value;
    let r3 = lab.request("bob", ws.id(), dates(2, 2), window((9, 30), (10, 30)));

    let cancelled = lab
        .engine
        .cancel_release(&user("alice"), release.id(), None)
        .unwrap();
    assert_eq!(cancelled.value.status(), ReleaseStatus::Cancelled);

    let err = lab
        .engine
        .approve_reservation(&lab.admin, r3.id())
        .unwrap_err();
    assert_eq!(err.blocking_reservation(), Some(r1.id()));
}

/// A range whose start follows its end is refused before anything is
/// written.
#[test]
fn test_backwards_range_is_refused() {
    let lab = TestLab::new();

    let err: Error = DateRange::new(june(5), june(1)).unwrap_err().into();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "end_date"));

    assert!(lab
        .engine
        .list_reservations_for_user(user("alice").id())
        .unwrap()
        .is_empty());
}

/// A request for a resource that does not exist is refused.
#[test]
fn test_request_for_unknown_resource() {
    let mut lab = TestLab::new();
    let request = ReservationRequest::new(
        labres::ResourceId::new(99),
        dates(1, 1),
        window((9, 0), (10, 0)),
        "benchmarks",
    );

    let err = lab
        .engine
        .create_reservation(&user("alice"), request)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

/// Rejection needs a reason, and the owner is told exactly once.
#[test]
fn test_reject_requires_reason() {
    let mut lab = TestLab::new();
    let ws = lab.add_resource("ws-01");
    let r = lab.request("alice", ws.id(), dates(1, 3), window((9, 0), (12, 0)));

    let err = lab
        .engine
        .reject_reservation(&lab.admin, r.id(), "   ")
        .unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "reason"));
    assert_eq!(
        lab.engine.get_reservation(r.id()).unwrap().status(),
        ReservationStatus::Pending
    );

    lab.emitter.clear();
    let rejected = lab
        .engine
        .reject_reservation(&lab.admin, r.id(), "Resource needed for maintenance")
        .unwrap();
    assert_eq!(rejected.value.status(), ReservationStatus::Rejected);
    assert_eq!(
        rejected.value.decision_reason(),
        Some("Resource needed for maintenance")
    );

    assert_eq!(rejected.notifications.len(), 1);
    let event = &lab.emitter.events()[0];
    assert_eq!(event.kind, NotificationKind::ReservationRejected);
    assert_eq!(event.user.as_str(), "alice");
    assert!(event.message.contains("Resource needed for maintenance"));
}
