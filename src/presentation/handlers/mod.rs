mod completion;
pub mod event_types;
mod health;
mod score;
mod upload_event;

pub use completion::{CompletionResponse, completion_handler};
pub use health::health_handler;
pub use score::{ALLOWED_HEADERS, ALLOWED_METHODS, score_handler};
pub use upload_event::upload_event_handler;
