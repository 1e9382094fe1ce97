//! Singleflight: at most one concurrent computation per `CrossKey`.
//!
//! The first caller for a key becomes the owner: it inserts an in-flight
//! slot, releases the table, and runs the computation without holding any
//! lock. Later callers find the slot, register as waiters, and block on the
//! slot's condition variable until the owner publishes.
//!
//! Completion order for the owner, all under the slot's state lock:
//! commit (cache write) → publish outcome → remove slot from the table.
//! A caller that creates a new slot after removal therefore always finds the
//! committed value in the cache.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, error};

use crossbreed_core::{CrossError, CrossKey, CrossOutcome};

/// What a caller got out of [`Singleflight::run`].
#[derive(Debug, Clone)]
pub struct Flight<T> {
    pub value: T,
    /// True when this caller waited on a computation owned by another caller.
    pub shared: bool,
    /// True when the owner's value was marked stale mid-flight and not committed.
    pub discarded: bool,
}

struct FlightState<T> {
    outcome: Option<CrossOutcome<T>>,
    stale: bool,
}

struct InFlight<T> {
    state: Mutex<FlightState<T>>,
    done: Condvar,
    waiters: AtomicUsize,
}

impl<T> InFlight<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(FlightState {
                outcome: None,
                stale: false,
            }),
            done: Condvar::new(),
            waiters: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlightState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-key request coalescing.
pub struct Singleflight<T> {
    flights: DashMap<CrossKey, Arc<InFlight<T>>>,
}

impl<T> Default for Singleflight<T> {
    fn default() -> Self {
        Self {
            flights: DashMap::new(),
        }
    }
}

impl<T: Clone> Singleflight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `compute` for `key` unless another caller already is; in that
    /// case wait for and share its outcome.
    ///
    /// `commit` runs on the owner only, after a successful `compute`, before
    /// the in-flight slot is released, and is skipped if the flight was
    /// marked stale. Errors are shared with every waiter and never retried.
    pub fn run<C, P>(&self, key: &CrossKey, compute: C, commit: P) -> CrossOutcome<Flight<T>>
    where
        C: FnOnce() -> CrossOutcome<T>,
        P: FnOnce(&T),
    {
        self.run_until(key, None, compute, commit)
    }

    /// Like [`run`](Self::run), but a waiter gives up after `timeout` with
    /// `CrossError::WaitTimedOut`. The owner's computation is never
    /// cancelled; it completes and commits for everyone else.
    pub fn run_with_timeout<C, P>(
        &self,
        key: &CrossKey,
        timeout: Duration,
        compute: C,
        commit: P,
    ) -> CrossOutcome<Flight<T>>
    where
        C: FnOnce() -> CrossOutcome<T>,
        P: FnOnce(&T),
    {
        self.run_until(key, Instant::now().checked_add(timeout), compute, commit)
    }

    fn run_until<C, P>(
        &self,
        key: &CrossKey,
        deadline: Option<Instant>,
        compute: C,
        commit: P,
    ) -> CrossOutcome<Flight<T>>
    where
        C: FnOnce() -> CrossOutcome<T>,
        P: FnOnce(&T),
    {
        let (flight, owner) = match self.flights.entry(key.clone()) {
            Entry::Occupied(occupied) => {
                let flight = Arc::clone(occupied.get());
                flight.waiters.fetch_add(1, Ordering::SeqCst);
                (flight, false)
            }
            Entry::Vacant(vacant) => {
                let flight = Arc::new(InFlight::new());
                vacant.insert(Arc::clone(&flight));
                (flight, true)
            }
        };

        if owner {
            self.own(key, &flight, compute, commit)
        } else {
            Self::wait(key, &flight, deadline)
        }
    }

    fn own<C, P>(
        &self,
        key: &CrossKey,
        flight: &Arc<InFlight<T>>,
        compute: C,
        commit: P,
    ) -> CrossOutcome<Flight<T>>
    where
        C: FnOnce() -> CrossOutcome<T>,
        P: FnOnce(&T),
    {
        let outcome = match panic::catch_unwind(AssertUnwindSafe(compute)) {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(key = %key, "prediction computation panicked");
                Err(CrossError::cache_internal(format!(
                    "computation for {key} panicked"
                )))
            }
        };

        let mut state = flight.lock();
        let discarded = state.stale && outcome.is_ok();
        if let Ok(value) = &outcome {
            if !state.stale && panic::catch_unwind(AssertUnwindSafe(|| commit(value))).is_err() {
                error!(key = %key, "committing computed value panicked");
            }
        }
        state.outcome = Some(outcome.clone());
        self.flights
            .remove_if(key, |_, current| Arc::ptr_eq(current, flight));
        let waiters = flight.waiters.load(Ordering::SeqCst);
        drop(state);
        flight.done.notify_all();

        debug!(key = %key, waiters, discarded, ok = outcome.is_ok(), "in-flight computation released");
        outcome.map(|value| Flight {
            value,
            shared: false,
            discarded,
        })
    }

    fn wait(key: &CrossKey, flight: &InFlight<T>, deadline: Option<Instant>) -> CrossOutcome<Flight<T>> {
        let started = Instant::now();
        let mut state = flight.lock();
        loop {
            if let Some(outcome) = &state.outcome {
                let outcome = outcome.clone();
                flight.waiters.fetch_sub(1, Ordering::SeqCst);
                return outcome.map(|value| Flight {
                    value,
                    shared: true,
                    discarded: false,
                });
            }

            state = match deadline {
                None => flight
                    .done
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        flight.waiters.fetch_sub(1, Ordering::SeqCst);
                        let waited_ms = started.elapsed().as_millis() as u64;
                        debug!(key = %key, waited_ms, "waiter gave up on in-flight computation");
                        return Err(CrossError::WaitTimedOut {
                            key: key.to_string(),
                            waited_ms,
                        });
                    }
                    flight
                        .done
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }

    /// Flag the in-flight computation for `key` (if any) so its value is not
    /// committed. Its waiters still receive it.
    pub fn mark_stale(&self, key: &CrossKey) -> bool {
        let flight = self.flights.get(key).map(|f| Arc::clone(f.value()));
        match flight {
            Some(flight) => {
                flight.lock().stale = true;
                true
            }
            None => false,
        }
    }

    /// [`mark_stale`](Self::mark_stale) for every in-flight key matching
    /// `predicate`. Returns how many were flagged.
    pub fn mark_stale_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CrossKey) -> bool,
    {
        let flights: Vec<_> = self
            .flights
            .iter()
            .filter(|f| predicate(f.key()))
            .map(|f| Arc::clone(f.value()))
            .collect();
        for flight in &flights {
            flight.lock().stale = true;
        }
        flights.len()
    }

    pub fn mark_all_stale(&self) -> usize {
        self.mark_stale_where(|_| true)
    }

    /// Number of keys with a computation currently running.
    pub fn in_flight_count(&self) -> usize {
        self.flights.len()
    }

    pub fn is_in_flight(&self, key: &CrossKey) -> bool {
        self.flights.contains_key(key)
    }

    /// Callers currently blocked on the computation for `key`.
    pub fn waiters(&self, key: &CrossKey) -> usize {
        self.flights
            .get(key)
            .map(|f| f.waiters.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}
