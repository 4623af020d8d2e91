//! Step model.
//!
//! A [`Step`] is a named [`Action`] plus the names of the steps it depends
//! on or must run after. Steps are declared through
//! [`TargetGraphBuilder`](crate::runner::TargetGraphBuilder).

pub mod step;

pub use step::{Action, Step};
