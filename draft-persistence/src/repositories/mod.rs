pub mod game_repository;
pub mod leaderboard_repository;

pub use game_repository::GameRepository;
pub use leaderboard_repository::LeaderboardRepository;
