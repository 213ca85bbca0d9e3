//! Core business logic - framework-agnostic gift catalog and reservation operations.

pub mod catalog;
pub mod directory;
pub mod gifts;
pub mod reservation;
pub mod selections;
