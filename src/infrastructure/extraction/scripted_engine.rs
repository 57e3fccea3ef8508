use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::{ExtractionEngine, ExtractionEngineError, SubmitRequest};
use crate::domain::{JobId, ResultPage, TextBlock};

const TOKEN_PREFIX: &str = "page-";

/// In-process engine that serves a fixed list of pages for every job.
/// Submissions sharing a client token resolve to the same job id, as the
/// real engine does.
#[derive(Default)]
pub struct ScriptedExtractionEngine {
    pages: Vec<Vec<String>>,
    jobs: Mutex<HashMap<String, JobId>>,
    submissions: Mutex<Vec<SubmitRequest>>,
    fetches: AtomicUsize,
    fail_fetches: bool,
}

impl ScriptedExtractionEngine {
    pub fn new(pages: Vec<Vec<String>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// Every `fetch_page` call fails, as an unreachable engine would.
    pub fn failing() -> Self {
        Self {
            fail_fetches: true,
            ..Self::default()
        }
    }

    pub fn submissions(&self) -> Vec<SubmitRequest> {
        self.submissions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn page_index(token: Option<&str>) -> Result<usize, ExtractionEngineError> {
        match token {
            None => Ok(0),
            Some(t) => t
                .strip_prefix(TOKEN_PREFIX)
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| ExtractionEngineError::FetchFailed(format!("unknown page token {t}"))),
        }
    }
}

#[async_trait]
impl ExtractionEngine for ScriptedExtractionEngine {
    async fn submit(&self, request: &SubmitRequest) -> Result<JobId, ExtractionEngineError> {
        self.submissions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let job_id = jobs
            .entry(request.client_token.clone())
            .or_insert_with(|| JobId::new(Uuid::new_v4().simple().to_string()))
            .clone();
        Ok(job_id)
    }

    async fn fetch_page(
        &self,
        _job_id: &JobId,
        page_token: Option<&str>,
        _page_size: i32,
    ) -> Result<ResultPage, ExtractionEngineError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches {
            return Err(ExtractionEngineError::FetchFailed(
                "scripted engine unavailable".to_string(),
            ));
        }

        let index = Self::page_index(page_token)?;
        let blocks = self
            .pages
            .get(index)
            .map(|lines| lines.iter().map(TextBlock::line).collect())
            .unwrap_or_default();
        let next_token =
            (index + 1 < self.pages.len()).then(|| format!("{TOKEN_PREFIX}{}", index + 1));

        Ok(ResultPage { blocks, next_token })
    }
}
