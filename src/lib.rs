//! Personal task notebook.
//!
//! [`planner::store::Store`] owns the task collection and persists it through
//! an injected [`planner::storage::Storage`] after every change. The terminal
//! front end in [`planner::ui`] is one caller of that API.

pub mod error;
pub mod planner;
pub mod settings;
