//! # Web API Handlers

pub mod callbacks;
pub mod health;
pub mod hearings;
