mod collector;
mod dispatcher;
mod job_store;
mod overlap_scorer;
mod scorer;

pub use collector::{
    CollectError, CollectOutcome, Collector, CompletionNotice, FAILURE_STATUSES, HarvestBudget,
    MAX_UPLOAD_WRITE_ATTEMPTS, SUCCESS_STATUS,
};
pub use dispatcher::{
    DispatchError, DispatchOutcome, Dispatcher, DispatcherConfig, UploadedObject, idempotency_key,
};
pub use job_store::{ConditionalWrite, JobStore, JobStoreError, Versioned};
pub use overlap_scorer::{MAX_MISSING, MIN_TOKEN_LEN, STOPWORDS, normalize, score_overlap};
pub use scorer::{
    PENDING_STATUS, PollStatus, ScoreOutcome, ScoreReport, ScoreRequest, Scorer, ScorerError,
};
