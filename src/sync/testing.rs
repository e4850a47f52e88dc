//! In-memory `AdminApi` for loop tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::admin::{AdminApi, AdminError};

/// Scripted fetch answer.
#[derive(Debug, Clone)]
pub(crate) enum Fetch {
    Fail,
    Null,
    Document(String),
}

#[derive(Debug, Default)]
pub(crate) struct FakeAdmin {
    fetches: Mutex<VecDeque<Fetch>>,
    loads: Mutex<Vec<String>>,
    fail_loads: Mutex<bool>,
}

impl FakeAdmin {
    /// Answers are consumed in order; the last one repeats.
    pub(crate) fn with_fetches(fetches: Vec<Fetch>) -> Self {
        Self {
            fetches: Mutex::new(fetches.into()),
            ..Default::default()
        }
    }

    pub(crate) fn set_fail_loads(&self, fail: bool) {
        *self.fail_loads.lock() = fail;
    }

    pub(crate) fn loads(&self) -> Vec<String> {
        self.loads.lock().clone()
    }

    fn unavailable() -> AdminError {
        AdminError::Status {
            status: 502,
            body: "unavailable".into(),
        }
    }
}

#[async_trait]
impl AdminApi for FakeAdmin {
    async fn fetch_config(&self) -> Result<Option<String>, AdminError> {
        let next = {
            let mut fetches = self.fetches.lock();
            if fetches.len() > 1 {
                fetches.pop_front()
            } else {
                fetches.front().cloned()
            }
        };

        match next.unwrap_or(Fetch::Null) {
            Fetch::Fail => Err(Self::unavailable()),
            Fetch::Null => Ok(None),
            Fetch::Document(doc) => Ok(Some(doc)),
        }
    }

    async fn load_config(&self, document: &str) -> Result<String, AdminError> {
        self.loads.lock().push(document.to_string());
        if *self.fail_loads.lock() {
            return Err(Self::unavailable());
        }
        Ok(String::new())
    }
}
