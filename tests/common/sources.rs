use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sheet_search_cache::{RawRow, RowSource, SheetResult};

/// Row source that replays scripted responses in order, then repeats the last one
pub struct ScriptedSource {
    responses: Mutex<VecDeque<SheetResult<Vec<RawRow>>>>,
    last: Mutex<Option<SheetResult<Vec<RawRow>>>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<SheetResult<Vec<RawRow>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Suspends each fetch for `delay` before answering
    #[allow(dead_code)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RowSource for ScriptedSource {
    async fn fetch_rows(&self) -> SheetResult<Vec<RawRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.lock().pop_front();
        match next {
            Some(response) => {
                *self.last.lock() = Some(response.clone());
                response
            }
            None => self
                .last
                .lock()
                .clone()
                .unwrap_or_else(|| Ok(Vec::new())),
        }
    }

    fn source_name(&self) -> &str {
        "scripted"
    }
}
