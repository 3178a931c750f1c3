//! In-memory sinks and factories for tests

use std::error::Error as StdError;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{BackendError, SinkFactory, TelemetrySink};
use crate::domain::telemetry::PropertySet;

/// Records every submission; can be told to fail
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, PropertySet)>>,
    exceptions: Mutex<Vec<String>>,
    fail_events: bool,
    fail_exceptions: bool,
}

impl RecordingSink {
    pub fn failing_events() -> Self {
        Self {
            fail_events: true,
            ..Default::default()
        }
    }

    pub fn failing_everything() -> Self {
        Self {
            fail_events: true,
            fail_exceptions: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<(String, PropertySet)> {
        self.events.lock().unwrap().clone()
    }

    pub fn exceptions(&self) -> Vec<String> {
        self.exceptions.lock().unwrap().clone()
    }
}

impl TelemetrySink for RecordingSink {
    fn track_event(&self, name: &str, properties: &PropertySet) -> Result<(), BackendError> {
        if self.fail_events {
            return Err(BackendError::Closed);
        }
        self.events
            .lock()
            .unwrap()
            .push((name.to_string(), properties.clone()));
        Ok(())
    }

    fn track_exception(&self, error: &(dyn StdError + 'static)) -> Result<(), BackendError> {
        if self.fail_exceptions {
            return Err(BackendError::Closed);
        }
        self.exceptions.lock().unwrap().push(error.to_string());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

/// Counts `build` calls; hands out one shared sink or always fails
pub struct CountingFactory {
    calls: AtomicUsize,
    sink: Option<Arc<RecordingSink>>,
}

impl CountingFactory {
    pub fn succeeding() -> Self {
        Self::with_sink(Arc::new(RecordingSink::default()))
    }

    pub fn with_sink(sink: Arc<RecordingSink>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            sink: Some(sink),
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            sink: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SinkFactory for CountingFactory {
    async fn build(&self, _connection_string: &str) -> Result<Arc<dyn TelemetrySink>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Give concurrent callers a chance to race
        tokio::task::yield_now().await;
        match &self.sink {
            Some(sink) => Ok(Arc::clone(sink) as Arc<dyn TelemetrySink>),
            None => Err(BackendError::Construction("factory configured to fail".into())),
        }
    }
}
