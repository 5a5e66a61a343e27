//! Common test utilities for integration tests.
//!
//! [`TestLab`] wires an [`Engine`] to a database in a temporary directory,
//! a settable clock and an in-memory emitter, so each test starts from an
//! empty ledger at a known moment.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use labres::config::PolicyConfig;
use labres::database::DatabaseConfig;
use labres::notification::MemoryEmitter;
use labres::policy::BookingPolicy;
use labres::{
    Actor, DateRange, Engine, FixedClock, NewResource, Reservation, ReservationRequest, Resource,
    ResourceId, TimeWindow,
};
use tempfile::TempDir;

/// A date in June 2024.
pub fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

/// A wall-clock time.
pub fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// June dates `first..=last`.
pub fn dates(first: u32, last: u32) -> DateRange {
    DateRange::new(june(first), june(last)).unwrap()
}

/// A daily window from `(hour, minute)` to `(hour, minute)`.
pub fn window(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
    TimeWindow::new(at(start.0, start.1), at(end.0, end.1)).unwrap()
}

/// The moment every lab starts at: noon before the June scenarios.
pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 31)
        .unwrap()
        .and_time(at(12, 0))
}

pub fn user(id: &str) -> Actor {
    Actor::user(id).unwrap()
}

pub fn admin() -> Actor {
    Actor::admin("carol").unwrap()
}

/// An engine over a throwaway database with a fixed clock.
///
/// `engine` is declared before `dir` so the connection closes before the
/// directory is removed.
pub struct TestLab {
    pub engine: Engine,
    pub clock: Arc<FixedClock>,
    pub emitter: MemoryEmitter,
    pub admin: Actor,
    dir: TempDir,
}

impl TestLab {
    /// A lab with the default booking policy.
    pub fn new() -> Self {
        Self::with_policy(BookingPolicy::from_config(&PolicyConfig::default()))
    }

    /// A lab whose policy accepts every well-formed request.
    pub fn permissive() -> Self {
        Self::with_policy(BookingPolicy::permissive())
    }

    pub fn with_policy(policy: BookingPolicy) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(FixedClock::new(start_time()));
        let emitter = MemoryEmitter::new();
        let engine = Engine::open(DatabaseConfig::new(dir.path().join("labres.db")))
            .unwrap()
            .with_policy(policy)
            .with_clock(Arc::clone(&clock))
            .with_emitter(emitter.clone());

        Self {
            engine,
            clock,
            emitter,
            admin: admin(),
            dir,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("labres.db")
    }

    /// A second engine over the same database file, sharing the clock.
    pub fn open_engine(&self) -> Engine {
        Engine::open(DatabaseConfig::new(self.db_path()))
            .unwrap()
            .with_policy(BookingPolicy::permissive())
            .with_clock(Arc::clone(&self.clock))
            .without_emitter()
    }

    pub fn add_resource(&mut self, label: &str) -> Resource {
        self.engine
            .create_resource(&self.admin, NewResource::new(label))
            .unwrap()
            .value
    }

    /// Submits a pending request for `owner`.
    pub fn request(
        &mut self,
        owner: &str,
        resource: ResourceId,
        dates: DateRange,
        window: TimeWindow,
    ) -> Reservation {
        let request = ReservationRequest::new(resource, dates, window, "experiment run");
        self.engine
            .create_reservation(&user(owner), request)
            .unwrap()
            .value
    }

    /// Submits and approves a request for `owner`.
    pub fn approved(
        &mut self,
        owner: &str,
        resource: ResourceId,
        dates: DateRange,
        window: TimeWindow,
    ) -> Reservation {
        let pending = self.request(owner, resource, dates, window);
        self.engine
            .approve_reservation(&self.admin, pending.id())
            .unwrap()
            .value
    }
}
