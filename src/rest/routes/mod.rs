//! Route handlers for the REST API.

pub mod board;
pub mod health;
pub mod intake;
pub mod patients;
pub mod steps;
