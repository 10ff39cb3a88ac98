//! Challonge tournament API access.

pub mod client;
pub mod resources;

pub use client::{ChallongeClient, TournamentApi};
pub use resources::{Id, Match, Tournament};
