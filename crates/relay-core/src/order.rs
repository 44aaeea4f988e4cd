//! Dispatch priority buckets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The relative position at which a subscriber is invoked.
///
/// Subscribers are called in ascending order: every `First` subscriber runs
/// before any `Early` one, and so on down to `Last`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PostOrder {
    /// Called before all other subscribers.
    First,
    /// Called before normal subscribers.
    Early,
    /// No special priority.
    #[default]
    Normal,
    /// Called after normal subscribers.
    Late,
    /// Called after all other subscribers.
    Last,
}

impl PostOrder {
    /// Every bucket, in dispatch order.
    pub const ALL: [PostOrder; 5] = [
        PostOrder::First,
        PostOrder::Early,
        PostOrder::Normal,
        PostOrder::Late,
        PostOrder::Last,
    ];
}

impl fmt::Display for PostOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Early => write!(f, "early"),
            Self::Normal => write!(f, "normal"),
            Self::Late => write!(f, "late"),
            Self::Last => write!(f, "last"),
        }
    }
}
