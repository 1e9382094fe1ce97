use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use crossbreed_core::traits::IPredictionBackend;
use crossbreed_core::{BackendError, ParentGenetics, ParentRef, Prediction};

/// Scriptable prediction backend.
///
/// Every successful call returns the configured prediction stamped with a
/// fresh strain id, so two results with the same id came from one call.
pub struct MockBackend {
    prediction: Mutex<Prediction>,
    model_version: Mutex<String>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    failures: Mutex<VecDeque<BackendError>>,
    panic_next: AtomicBool,
    gate: Option<(Mutex<bool>, Condvar)>,
    last_parents: Mutex<Option<(ParentRef, ParentRef)>>,
}

impl MockBackend {
    pub fn new(prediction: Prediction) -> Self {
        Self {
            prediction: Mutex::new(prediction),
            model_version: Mutex::new("mock-v1".to_string()),
            calls: AtomicUsize::new(0),
            delay: None,
            failures: Mutex::new(VecDeque::new()),
            panic_next: AtomicBool::new(false),
            gate: None,
            last_parents: Mutex::new(None),
        }
    }

    /// Sleep for `delay` inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Block every call until [`release`](Self::release) is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some((Mutex::new(false), Condvar::new()));
        self
    }

    /// Open the gate; current and future calls proceed.
    pub fn release(&self) {
        if let Some((open, cv)) = &self.gate {
            *open.lock().unwrap_or_else(PoisonError::into_inner) = true;
            cv.notify_all();
        }
    }

    /// Make the next call fail with `error`. Queued failures are used in order.
    pub fn fail_next(&self, error: BackendError) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
    }

    /// Make the next call panic.
    pub fn panic_next(&self) {
        self.panic_next.store(true, Ordering::SeqCst);
    }

    pub fn set_prediction(&self, prediction: Prediction) {
        *self.prediction.lock().unwrap_or_else(PoisonError::into_inner) = prediction;
    }

    pub fn set_model_version(&self, version: impl Into<String>) {
        *self.model_version.lock().unwrap_or_else(PoisonError::into_inner) = version.into();
    }

    /// Number of `predict` calls started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Parent refs passed to the most recent call.
    pub fn last_parents(&self) -> Option<(ParentRef, ParentRef)> {
        self.last_parents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn wait_for_gate(&self) {
        if let Some((open, cv)) = &self.gate {
            let mut open = open.lock().unwrap_or_else(PoisonError::into_inner);
            while !*open {
                open = cv.wait(open).unwrap_or_else(PoisonError::into_inner);
            }
        }
    }
}

impl IPredictionBackend for MockBackend {
    fn predict(
        &self,
        parent_a: &ParentGenetics,
        parent_b: &ParentGenetics,
    ) -> Result<Prediction, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_parents.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((parent_a.parent.clone(), parent_b.parent.clone()));

        self.wait_for_gate();
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("mock backend asked to panic");
        }
        if let Some(error) = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            return Err(error);
        }

        let mut prediction = self
            .prediction
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        prediction.strain.id = uuid::Uuid::new_v4().to_string();
        Ok(prediction)
    }

    fn model_version(&self) -> String {
        self.model_version
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
