//! Request handlers

pub mod admin;
pub mod campaign;
pub mod health;
pub mod leaderboard;
pub mod users;
