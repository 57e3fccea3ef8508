use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobId, ResultPage};

/// Lines accumulated so far for one job plus the token needed to fetch the
/// next page. Persisted when a harvest runs out of budget so the next
/// invocation can continue where this one stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestCheckpoint {
    pub job_id: JobId,
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub pages_fetched: u32,
    pub ts: DateTime<Utc>,
}

impl HarvestCheckpoint {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            next_token: None,
            lines: Vec::new(),
            pages_fetched: 0,
            ts: Utc::now(),
        }
    }

    pub fn absorb(&mut self, page: ResultPage) {
        self.lines
            .extend(page.line_texts().map(|text| text.to_string()));
        self.next_token = page.next_token.filter(|t| !t.is_empty());
        self.pages_fetched += 1;
        self.ts = Utc::now();
    }

    /// At least one page was read and the engine returned no continuation.
    pub fn is_finished(&self) -> bool {
        self.pages_fetched > 0 && self.next_token.is_none()
    }
}
