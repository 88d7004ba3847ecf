pub use super::games::Entity as Games;
pub use super::leaderboard_entries::Entity as LeaderboardEntries;
