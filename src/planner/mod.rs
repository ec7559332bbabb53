pub mod edit;
pub mod storage;
pub mod store;
pub mod task;
pub mod ui;
