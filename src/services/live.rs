//! Live queries over an expense store
//!
//! A [`LiveQuery`] keeps a value computed from the expenses in one time range
//! and recomputes it when the store reports a change inside that range.
//! Switching the range replaces the subscription, so notifications that were
//! queued for the old range are discarded along with it.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, TimeRange};
use crate::storage::{ExpenseStore, StoreEvent};

/// A computed value and the inputs it was computed from
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Range the value covers
    pub range: TimeRange,
    /// Bumped on every range switch
    pub generation: u64,
    /// Store revision the value reflects
    pub revision: u64,
    pub value: T,
}

type Compute<'a, T> = Box<dyn Fn(&[Expense]) -> T + 'a>;

/// A value that follows the expenses in a time range
pub struct LiveQuery<'a, T> {
    store: &'a dyn ExpenseStore,
    compute: Compute<'a, T>,
    events: Receiver<StoreEvent>,
    snapshot: Snapshot<T>,
    /// A relevant change arrived but recomputing it has not succeeded yet
    stale: bool,
}

impl<'a, T> LiveQuery<'a, T> {
    /// Subscribe to the store and compute the first snapshot
    pub fn new<F>(store: &'a dyn ExpenseStore, range: TimeRange, compute: F) -> ExpenseResult<Self>
    where
        F: Fn(&[Expense]) -> T + 'a,
    {
        // Subscribe before reading so an insert racing the read is not lost
        let events = store.subscribe();
        let revision = store.revision();
        let expenses = store.query_by_range(range)?;
        let value = compute(&expenses);

        debug!(%range, revision, "live query started");

        Ok(Self {
            store,
            compute: Box::new(compute),
            events,
            snapshot: Snapshot {
                range,
                generation: 0,
                revision,
                value,
            },
            stale: false,
        })
    }

    /// The latest snapshot
    pub fn current(&self) -> &Snapshot<T> {
        &self.snapshot
    }

    /// The latest value
    pub fn value(&self) -> &T {
        &self.snapshot.value
    }

    /// The active range
    pub fn range(&self) -> TimeRange {
        self.snapshot.range
    }

    pub fn generation(&self) -> u64 {
        self.snapshot.generation
    }

    /// Switch to a different range
    ///
    /// On success every later snapshot belongs to the new range. On failure
    /// the query keeps its previous range, subscription and snapshot.
    pub fn set_range(&mut self, range: TimeRange) -> ExpenseResult<&Snapshot<T>> {
        let events = self.store.subscribe();
        let revision = self.store.revision();
        let expenses = self.store.query_by_range(range)?;
        let value = (self.compute)(&expenses);

        // Dropping the old receiver discards anything still queued on it
        self.events = events;
        self.stale = false;
        self.snapshot = Snapshot {
            range,
            generation: self.snapshot.generation + 1,
            revision,
            value,
        };

        debug!(%range, generation = self.snapshot.generation, "live query switched range");
        Ok(&self.snapshot)
    }

    /// Apply pending notifications without blocking
    ///
    /// Returns the new snapshot if anything inside the range changed.
    pub fn refresh(&mut self) -> ExpenseResult<Option<&Snapshot<T>>> {
        self.drain()?;
        if !self.stale {
            return Ok(None);
        }
        self.recompute()?;
        Ok(Some(&self.snapshot))
    }

    /// Block until something inside the range changes or the timeout passes
    pub fn wait_for_change(&mut self, timeout: Duration) -> ExpenseResult<Option<&Snapshot<T>>> {
        // A timeout too large for an Instant waits without a deadline
        let deadline = Instant::now().checked_add(timeout);

        while !self.stale {
            let event = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.events.recv_timeout(remaining) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => return Ok(None),
                        Err(RecvTimeoutError::Disconnected) => return Err(closed()),
                    }
                }
                None => self.events.recv().map_err(|_| closed())?,
            };
            self.observe(event);
            self.drain()?;
        }

        self.recompute()?;
        Ok(Some(&self.snapshot))
    }

    fn drain(&mut self) -> ExpenseResult<()> {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.observe(event),
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => return Err(closed()),
            }
        }
    }

    fn observe(&mut self, event: StoreEvent) {
        if self.snapshot.range.contains(event.occurred_at()) {
            self.stale = true;
        } else if !self.stale {
            // Nothing in range moved, so the value is current as of this revision
            self.snapshot.revision = self.snapshot.revision.max(event.revision());
        }
    }

    fn recompute(&mut self) -> ExpenseResult<()> {
        let revision = self.store.revision();
        let expenses = self.store.query_by_range(self.snapshot.range)?;
        self.snapshot.value = (self.compute)(&expenses);
        self.snapshot.revision = revision;
        self.stale = false;

        debug!(
            range = %self.snapshot.range,
            revision,
            matched = expenses.len(),
            "live query recomputed"
        );
        Ok(())
    }
}

fn closed() -> ExpenseError {
    ExpenseError::Store("Store closed the subscription".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, NewExpense};
    use crate::storage::ExpenseRepository;
    use std::sync::mpsc::{self, Sender};
    use std::sync::Mutex;
    use std::thread;

    fn total(expenses: &[Expense]) -> Money {
        expenses.iter().map(|e| e.amount).sum()
    }

    fn spend(repo: &ExpenseRepository, cents: i64, at: i64) {
        repo.insert(NewExpense::new("Item", Money::from_cents(cents), "Food", at))
            .unwrap();
    }

    fn range(start: i64, end: i64) -> TimeRange {
        TimeRange::new(start, end).unwrap()
    }

    #[test]
    fn test_initial_snapshot() {
        let repo = ExpenseRepository::in_memory();
        spend(&repo, 250, 10);
        spend(&repo, 100, 500);

        let query = LiveQuery::new(&repo, range(0, 100), total).unwrap();

        assert_eq!(*query.value(), Money::from_cents(250));
        assert_eq!(query.generation(), 0);
        assert_eq!(query.current().revision, 2);
    }

    #[test]
    fn test_refresh_picks_up_insert_in_range() {
        let repo = ExpenseRepository::in_memory();
        let mut query = LiveQuery::new(&repo, range(0, 100), total).unwrap();
        assert!(query.refresh().unwrap().is_none());

        spend(&repo, 300, 50);

        let snapshot = query.refresh().unwrap().unwrap();
        assert_eq!(snapshot.value, Money::from_cents(300));
        assert_eq!(snapshot.revision, 1);
    }

    #[test]
    fn test_insert_outside_range_does_not_recompute() {
        let repo = ExpenseRepository::in_memory();
        let mut query = LiveQuery::new(&repo, range(0, 100), total).unwrap();

        spend(&repo, 300, 101);

        assert!(query.refresh().unwrap().is_none());
        assert!(query.value().is_zero());
        assert_eq!(query.current().revision, 1);
    }

    #[test]
    fn test_range_switch_discards_old_range_changes() {
        let repo = ExpenseRepository::in_memory();
        let range_a = range(0, 100);
        let range_b = range(1_000, 2_000);
        let mut query = LiveQuery::new(&repo, range_a, total).unwrap();

        // Queued for A but not yet applied when the switch happens
        spend(&repo, 700, 50);
        let switched = query.set_range(range_b).unwrap();
        assert_eq!(switched.range, range_b);
        assert_eq!(switched.generation, 1);
        assert!(switched.value.is_zero());

        // Changes in A after the switch are not observed either
        spend(&repo, 900, 60);
        assert!(query.refresh().unwrap().is_none());
        assert_eq!(query.range(), range_b);
        assert!(query.value().is_zero());

        spend(&repo, 125, 1_500);
        let snapshot = query.refresh().unwrap().unwrap();
        assert_eq!(snapshot.range, range_b);
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.value, Money::from_cents(125));
    }

    #[test]
    fn test_wait_for_change_times_out() {
        let repo = ExpenseRepository::in_memory();
        let mut query = LiveQuery::new(&repo, range(0, 100), total).unwrap();

        let result = query.wait_for_change(Duration::from_millis(20)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_wait_for_change_sees_insert_from_another_thread() {
        let repo = ExpenseRepository::in_memory();
        let mut query = LiveQuery::new(&repo, range(0, 100), total).unwrap();

        thread::scope(|s| {
            s.spawn(|| {
                spend(&repo, 10, 500);
                spend(&repo, 40, 20);
            });

            let snapshot = query
                .wait_for_change(Duration::from_secs(5))
                .unwrap()
                .unwrap();
            assert_eq!(snapshot.value, Money::from_cents(40));
        });
    }

    #[test]
    fn test_wait_for_change_without_deadline() {
        let repo = ExpenseRepository::in_memory();
        let mut query = LiveQuery::new(&repo, range(0, 100), total).unwrap();

        thread::scope(|s| {
            s.spawn(|| spend(&repo, 75, 30));

            let snapshot = query.wait_for_change(Duration::MAX).unwrap().unwrap();
            assert_eq!(snapshot.value, Money::from_cents(75));
        });
    }

    /// Store whose reads can be made to fail
    struct FlakyStore {
        inner: ExpenseRepository,
        failing: Mutex<bool>,
        subscribers: Mutex<Vec<Sender<StoreEvent>>>,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: ExpenseRepository::in_memory(),
                failing: Mutex::new(false),
                subscribers: Mutex::new(Vec::new()),
            }
        }

        fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }
    }

    impl ExpenseStore for FlakyStore {
        fn insert(&self, expense: NewExpense) -> ExpenseResult<Expense> {
            let saved = self.inner.insert(expense)?;
            for sender in self.subscribers.lock().unwrap().iter() {
                let _ = sender.send(StoreEvent::Inserted {
                    id: saved.id,
                    occurred_at: saved.occurred_at,
                    revision: self.inner.revision(),
                });
            }
            Ok(saved)
        }

        fn query_by_range(&self, range: TimeRange) -> ExpenseResult<Vec<Expense>> {
            if *self.failing.lock().unwrap() {
                return Err(ExpenseError::Store("disk unavailable".into()));
            }
            self.inner.query_by_range(range)
        }

        fn subscribe(&self) -> Receiver<StoreEvent> {
            let (sender, receiver) = mpsc::channel();
            self.subscribers.lock().unwrap().push(sender);
            receiver
        }

        fn revision(&self) -> u64 {
            self.inner.revision()
        }
    }

    #[test]
    fn test_failed_read_keeps_previous_snapshot() {
        let store = FlakyStore::new();
        let mut query = LiveQuery::new(&store, range(0, 100), total).unwrap();
        store
            .insert(NewExpense::new("Tea", Money::from_cents(80), "Food", 5))
            .unwrap();

        store.set_failing(true);
        assert!(query.refresh().unwrap_err().is_store());
        assert!(query.value().is_zero());
        assert!(query.set_range(range(0, 10)).unwrap_err().is_store());
        assert_eq!(query.range(), range(0, 100));
        assert_eq!(query.generation(), 0);

        // The change is retried once reads work again
        store.set_failing(false);
        let snapshot = query.refresh().unwrap().unwrap();
        assert_eq!(snapshot.value, Money::from_cents(80));
    }
}
