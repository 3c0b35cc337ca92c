pub mod admission;
pub mod dispatcher;
pub mod storage;
pub mod types;
