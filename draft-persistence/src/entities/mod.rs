pub mod prelude;

pub mod games;
pub mod leaderboard_entries;
