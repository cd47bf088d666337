//! Error types
//!
//! Gameplay outcomes (missed targets, stale references, repeated kills) are
//! handled in-line by the simulation. Only configuration failures and broken
//! lifecycle invariants surface as `SimError`.

use thiserror::Error;

use crate::sim::ActorId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    InvalidTuning { field: &'static str, reason: String },
    #[error("{role} {id:?} is registered but not in the live collection")]
    MissingActor { role: &'static str, id: ActorId },
    #[error("upgrade choice {index} out of range ({offered} offered)")]
    InvalidUpgradeChoice { index: usize, offered: usize },
}

pub type SimResult<T> = Result<T, SimError>;
