use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of roster slots a completed draft fills.
pub const ROSTER_SIZE: usize = 7;

/// Slot layout of a draft, in pick order.
pub const ROSTER_POSITIONS: [&str; ROSTER_SIZE] = ["QB", "RB", "WR", "WR", "TE", "FLEX", "FLEX"];

/// Immutable copy of a drafted player taken at submission time. Snapshots are
/// stored as-is; they are never reconciled against the reference data later.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerSnapshot {
    pub name: String,
    pub team: String,
    pub position: String,
    pub points: f64,
    pub year: i32, // season the stat line comes from
}
