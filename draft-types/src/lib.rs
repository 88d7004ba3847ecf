pub mod game;
pub mod leaderboard;
pub mod messages;
pub mod player;

// Re-export all types
pub use game::*;
pub use leaderboard::*;
pub use messages::*;
pub use player::*;
