//! Operator review of low-confidence identifications.

pub mod console;
pub mod reviewer;
pub mod store;

pub use console::{review_channel, OperatorConsole, ReviewRequest, StdinConsole};
pub use reviewer::{Confirmation, ConfirmationSource, Reviewer};
