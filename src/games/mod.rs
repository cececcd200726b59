//! Game rules.

pub mod twenty_questions;
