//! Progress reporting.
//!
//! A long-running operation is divided into stages, each with a known
//! number of items. Every item produces a `started` event and then
//! either a `finished` or a `failed` one.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

/// A sink for progress events.
pub trait EventLog: Send + Sync + Debug {
    fn record(&self, event: Event);
}

/// A progress event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Unix timestamp of the event.
    pub time: i64,

    /// Name of the stage.
    pub stage: String,

    /// Label of the item.
    pub task: String,

    /// 1-based position of the item in the stage.
    pub index: usize,

    /// Number of items in the stage.
    pub total: usize,

    pub state: EventState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
    Started,
    Finished,
    Failed,
}

/// A stage of an operation.
#[derive(Debug)]
pub struct Stage {
    log: Arc<dyn EventLog>,
    name: String,
    total: usize,
    index: AtomicUsize,
}

/// Writes events to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingEventLog;

/// Begins a stage with a known number of items.
pub fn begin_stage(log: Arc<dyn EventLog>, name: &str, total: usize) -> Arc<Stage> {
    tracing::info!("{} ({} item(s))", name, total);

    Arc::new(Stage {
        log,
        name: name.to_owned(),
        total,
        index: AtomicUsize::new(0),
    })
}

impl Stage {
    /// Performs one item of work.
    ///
    /// The item is counted as advanced whether or not the work succeeds.
    /// A failure is recorded and then handed back to the caller.
    pub async fn advance_and_track<T, E, F>(&self, task: &str, work: F) -> Result<T, E>
    where
        E: Display,
        F: Future<Output = Result<T, E>>,
    {
        let index = self.index.fetch_add(1, Ordering::SeqCst) + 1;
        self.emit(task, index, EventState::Started, None);

        let result = work.await;

        match &result {
            Ok(_) => self.emit(task, index, EventState::Finished, None),
            Err(e) => {
                tracing::warn!("{}: {} failed: {}", self.name, task, e);
                self.emit(task, index, EventState::Failed, Some(e.to_string()));
            }
        }

        result
    }

    fn emit(&self, task: &str, index: usize, state: EventState, error: Option<String>) {
        self.log.record(Event {
            time: Utc::now().timestamp(),
            stage: self.name.clone(),
            task: task.to_owned(),
            index,
            total: self.total,
            state,
            error,
        });
    }
}

impl EventLog for TracingEventLog {
    fn record(&self, event: Event) {
        tracing::info!(
            stage = %event.stage,
            task = %event.task,
            index = event.index,
            total = event.total,
            state = ?event.state,
            error = event.error.as_deref().unwrap_or(""),
            "event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::MemoryEventLog;

    #[tokio::test]
    async fn test_failure_still_advances() {
        let log = Arc::new(MemoryEventLog::default());
        let stage = begin_stage(log.clone(), "Deleting releases", 2);

        let ok: Result<u32, String> = stage.advance_and_track("r1/1", async { Ok(1) }).await;
        assert_eq!(Ok(1), ok);

        let err: Result<(), String> = stage
            .advance_and_track("r1/2", async { Err("boom".to_string()) })
            .await;
        assert!(err.is_err());

        let events = log.events();
        let states: Vec<_> = events.iter().map(|e| (e.index, e.state)).collect();
        assert_eq!(
            vec![
                (1, EventState::Started),
                (1, EventState::Finished),
                (2, EventState::Started),
                (2, EventState::Failed),
            ],
            states
        );
        assert_eq!(Some("boom".to_string()), events[3].error);
        assert!(events.iter().all(|e| e.total == 2));
    }

    #[test]
    fn test_event_format() {
        let event = Event {
            time: 0,
            stage: "Deleting stemcells".to_string(),
            task: "ubuntu/1".to_string(),
            index: 1,
            total: 1,
            state: EventState::Finished,
            error: None,
        };

        assert_eq!(
            r#"{"time":0,"stage":"Deleting stemcells","task":"ubuntu/1","index":1,"total":1,"state":"finished"}"#,
            serde_json::to_string(&event).unwrap()
        );
    }
}
