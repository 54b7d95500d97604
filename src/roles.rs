//! Access-control roles and their display attributes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Role of a portal account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Planner,
    #[serde(rename = "Asset Manager")]
    AssetManager,
    User,
    /// Visitor without a session
    Public,
}

/// Palette slot used when rendering a role badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    Primary,
    Secondary,
    Success,
    Error,
    Warning,
    Info,
}

/// Badge and description for a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAttributes {
    pub icon: &'static str,
    pub color: ThemeColor,
    pub display_name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Planner,
        Role::AssetManager,
        Role::User,
        Role::Public,
    ];

    /// Wire name as stored on the account record
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Planner => "Planner",
            Role::AssetManager => "Asset Manager",
            Role::User => "User",
            Role::Public => "Public",
        }
    }

    pub fn attributes(&self) -> RoleAttributes {
        match self {
            Role::Admin => RoleAttributes {
                icon: "mdi:laptop",
                color: ThemeColor::Primary,
                display_name: "System Administrator",
                description: "Monitors the management system and keeps everything running",
            },
            Role::Planner => RoleAttributes {
                icon: "mdi:chart-donut",
                color: ThemeColor::Info,
                display_name: "Planner",
                description: "Plans and manages all projects",
            },
            Role::AssetManager => RoleAttributes {
                icon: "mdi:rate-review",
                color: ThemeColor::Warning,
                display_name: "Asset Manager",
                description: "Manages specific projects",
            },
            Role::User => RoleAttributes {
                icon: "mdi:user-outline",
                color: ThemeColor::Success,
                display_name: "User",
                description: "Follows project progress and stakes into packages",
            },
            Role::Public => RoleAttributes {
                icon: "mdi:public",
                color: ThemeColor::Secondary,
                display_name: "Public",
                description: "Visitor who is not signed in",
            },
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Role::Public)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_names() {
        assert_eq!("Asset Manager".parse::<Role>(), Ok(Role::AssetManager));
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("AssetManager".parse::<Role>(), Err(UnknownRole("AssetManager".to_string())));
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_every_role_has_distinct_icon() {
        let mut icons: Vec<_> = Role::ALL.iter().map(|r| r.attributes().icon).collect();
        icons.sort_unstable();
        icons.dedup();
        assert_eq!(icons.len(), Role::ALL.len());
    }

    #[test]
    fn test_serde_matches_as_str() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            assert_eq!(serde_json::from_str::<Role>(&json).unwrap(), role);
        }
    }

    #[test]
    fn test_public_is_not_authenticated() {
        assert!(!Role::Public.is_authenticated());
        assert!(Role::User.is_authenticated());
        assert_eq!(Role::Admin.attributes().color, ThemeColor::Primary);
    }
}
