pub mod aggregator;
pub mod events;
pub mod memory;
pub mod ranking;
pub mod store;
pub mod submission;
pub mod week;

// Re-export main components
pub use aggregator::*;
pub use events::*;
pub use memory::*;
pub use ranking::*;
pub use store::*;
pub use submission::*;
pub use week::*;
