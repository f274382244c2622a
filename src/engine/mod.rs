//! Terminal front end for the declarative engine
//!
//! - [`differ`] renders an execution plan
//! - [`executor`] supplies the progress bar and confirmation prompt the
//!   executor reports through

pub mod differ;
pub mod executor;

pub use differ::display_plan;
pub use executor::{DialoguerConfirm, TerminalProgress, print_summary};
