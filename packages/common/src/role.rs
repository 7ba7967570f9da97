#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;

/// Account role. Admins can manage contests, moderate entries and finalize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "user"))]
    User,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "admin"))]
    Admin,
}

impl Role {
    pub const ALL: &'static [Role] = &[Self::User, Self::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseEnumError::new(
                "role",
                s,
                &Self::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            )),
        }
    }
}
