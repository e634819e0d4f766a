//! Domain types shared across the client layers.
//!
//! These are the structures the backend speaks in its JSON responses.
//! They are deliberately small: the backend owns the data, the client
//! only consumes it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RoleParseError;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The coarse authorization category of a marketplace user.
///
/// Every registered user has exactly one role, assigned by the backend:
///
/// - **Worker** — completes tasks and earns coins.
/// - **Buyer** — posts tasks and pays coins for approved submissions.
/// - **Admin** — moderates users and tasks, approves withdrawals.
///
/// The backend serializes roles as lowercase strings (`"worker"`,
/// `"buyer"`, `"admin"`), hence `rename_all = "lowercase"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Completes tasks for coins.
    Worker,
    /// Posts tasks and reviews submissions.
    Buyer,
    /// Moderates users/tasks and approves withdrawals.
    Admin,
}

impl Role {
    /// The lowercase wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Worker => "worker",
            Role::Buyer => "buyer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worker" => Ok(Role::Worker),
            "buyer" => Ok(Role::Buyer),
            "admin" => Ok(Role::Admin),
            other => Err(RoleParseError::Unknown(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

/// A marketplace user as returned by `GET /users/{email}`.
///
/// This is the backend's user record, not the identity-provider record:
/// the provider knows who someone *is*, the backend knows what they may
/// *do* (role) and what they have *earned* (coin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    pub name: String,
    /// Unique email, the key the backend looks users up by.
    pub email: String,
    /// Avatar URL, if the user has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Authorization category.
    pub role: Role,
    /// Current coin balance.
    pub coin: i64,
}

// ---------------------------------------------------------------------------
// CoinBalance
// ---------------------------------------------------------------------------

/// Response body of `GET /users/{email}/coin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinBalance {
    /// Current coin balance.
    pub coin: i64,
}

// ---------------------------------------------------------------------------
// Coin economics
// ---------------------------------------------------------------------------

/// The fixed marketplace exchange rate: 20 coins equal one US dollar.
pub const COINS_PER_DOLLAR: i64 = 20;

/// Converts a coin amount to its dollar value at the fixed rate.
///
/// Used for display math only (withdrawal forms, earnings summaries);
/// the backend performs the authoritative conversion on withdrawal.
pub fn coin_value_usd(coins: i64) -> f64 {
    coins as f64 / COINS_PER_DOLLAR as f64
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Worker).unwrap(), "\"worker\"");
        assert_eq!(serde_json::to_string(&Role::Buyer).unwrap(), "\"buyer\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_role_from_str_known_roles_parse() {
        assert_eq!("worker".parse::<Role>().unwrap(), Role::Worker);
        assert_eq!("buyer".parse::<Role>().unwrap(), Role::Buyer);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn test_role_from_str_unknown_returns_error() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("superuser"));
    }

    #[test]
    fn test_role_display_matches_wire_name() {
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_user_profile_deserializes_backend_shape() {
        // The shape the backend actually returns for GET /users/{email}.
        let json = r#"{
            "name": "Ada",
            "email": "ada@example.com",
            "photo_url": "https://cdn.example.com/ada.png",
            "role": "buyer",
            "coin": 50
        }"#;

        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.role, Role::Buyer);
        assert_eq!(profile.coin, 50);
    }

    #[test]
    fn test_user_profile_photo_url_is_optional() {
        let json = r#"{
            "name": "Ada",
            "email": "ada@example.com",
            "role": "worker",
            "coin": 0
        }"#;

        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert!(profile.photo_url.is_none());
    }

    #[test]
    fn test_coin_balance_deserializes() {
        let balance: CoinBalance =
            serde_json::from_str(r#"{ "coin": 140 }"#).unwrap();
        assert_eq!(balance.coin, 140);
    }

    #[test]
    fn test_coin_value_usd_fixed_rate() {
        // 20 coins = 1 dollar.
        assert_eq!(coin_value_usd(20), 1.0);
        assert_eq!(coin_value_usd(50), 2.5);
        assert_eq!(coin_value_usd(0), 0.0);
    }
}
