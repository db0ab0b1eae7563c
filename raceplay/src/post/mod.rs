pub mod commentary;
pub mod leaderboard;
pub mod overlay_store;
pub mod race_outcome;
