pub mod extraction;
pub mod observability;
pub mod storage;
