use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account role. An account with no role is stored as NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guardian,
    Protege,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guardian => "guardian",
            Self::Protege => "protege",
        }
    }

    /// Parse the role field of a role-change request. `None` and `"none"`
    /// both clear the role.
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Role>, ParseRoleError> {
        match raw {
            None | Some("none") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid role '{0}', expected guardian, protege or none")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guardian" => Ok(Self::Guardian),
            "protege" => Ok(Self::Protege),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// The fixed set of notification types a device or app may relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CheckOk,
    YesOk,
    NoOk,
    FallDetected,
    BpmLow,
    BpmHigh,
    NotWell,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 7] = [
        Self::CheckOk,
        Self::YesOk,
        Self::NoOk,
        Self::FallDetected,
        Self::BpmLow,
        Self::BpmHigh,
        Self::NotWell,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CheckOk => "check_ok",
            Self::YesOk => "yes_ok",
            Self::NoOk => "no_ok",
            Self::FallDetected => "fall_detected",
            Self::BpmLow => "bpm_low",
            Self::BpmHigh => "bpm_high",
            Self::NotWell => "not_well",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown notification type '{0}'")]
pub struct ParseKindError(pub String);

impl FromStr for NotificationKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

/// A pending notification as delivered to its recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub sender_email: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

/// Latest sensor sample from the room monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorReading {
    pub temperature: f64,
    pub humidity: f64,
    pub timestamp: DateTime<Utc>,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
    pub partner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_accepts_none_and_null() {
        assert_eq!(Role::parse_optional(None), Ok(None));
        assert_eq!(Role::parse_optional(Some("none")), Ok(None));
        assert_eq!(Role::parse_optional(Some("guardian")), Ok(Some(Role::Guardian)));
        assert_eq!(Role::parse_optional(Some("protege")), Ok(Some(Role::Protege)));
        assert!(Role::parse_optional(Some("Guardian")).is_err());
        assert!(Role::parse_optional(Some("")).is_err());
    }

    #[test]
    fn notification_kinds_match_wire_names() {
        for kind in NotificationKind::ALL {
            assert_eq!(kind.as_str().parse::<NotificationKind>(), Ok(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert!("fall".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn notification_serializes_type_field() {
        let n = Notification {
            sender_email: "b@x.com".into(),
            kind: NotificationKind::FallDetected,
        };
        let v = serde_json::to_value(&n).unwrap();
        assert_eq!(v, serde_json::json!({ "sender_email": "b@x.com", "type": "fall_detected" }));
    }
}
