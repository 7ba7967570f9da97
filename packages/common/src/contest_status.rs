#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;

/// Lifecycle status of a contest.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ContestStatus {
    /// Created but not yet open for submissions.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "draft"))]
    Draft,
    /// Accepting submissions.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "active"))]
    Active,
    /// Manually set by an admin to close submissions while voting continues.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "voting"))]
    Voting,
    /// Closed. Terminal for automatic transitions.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ended"))]
    Ended,
}

impl ContestStatus {
    pub const ALL: &'static [ContestStatus] =
        &[Self::Draft, Self::Active, Self::Voting, Self::Ended];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Voting => "voting",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ContestStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl FromStr for ContestStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "voting" => Ok(Self::Voting),
            "ended" => Ok(Self::Ended),
            _ => Err(ParseEnumError::new(
                "contest status",
                s,
                &Self::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
        }
    }
}

/// Whether a manually set `voting` status survives the automatic recomputation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingPolicy {
    /// `voting` is treated like any non-terminal status and ends with the contest.
    #[default]
    Auto,
    /// `voting` is only left through an explicit admin update.
    Sticky,
}

/// Compute the status a contest should have at `now`.
///
/// Rules, first match wins:
/// 1. `Ended` is terminal.
/// 2. `Voting` is kept under [`VotingPolicy::Sticky`].
/// 3. A contest past its end date is `Ended`.
/// 4. A `Draft` inside its window becomes `Active`.
/// 5. Anything else is left unchanged.
pub fn derive_status(
    stored: ContestStatus,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
    policy: VotingPolicy,
) -> ContestStatus {
    match stored {
        ContestStatus::Ended => ContestStatus::Ended,
        ContestStatus::Voting if policy == VotingPolicy::Sticky => ContestStatus::Voting,
        _ if end < now => ContestStatus::Ended,
        ContestStatus::Draft if start <= now && now <= end => ContestStatus::Active,
        other => other,
    }
}
