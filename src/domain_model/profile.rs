use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NICKNAME_MIN_LEN: usize = 3;

/// Upper bound appended to a prefix for range queries over `nicknameLower`.
pub const PREFIX_RANGE_SUFFIX: char = '\u{f8ff}';

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Nickname(String);

impl Nickname {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("nickname can't be empty".to_string());
        }
        if trimmed.chars().count() < NICKNAME_MIN_LEN {
            return Err(format!(
                "nickname must be at least {NICKNAME_MIN_LEN} characters"
            ));
        }
        Ok(Nickname(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn normalized(&self) -> String {
        normalize_nickname(&self.0)
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize_nickname(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Profile document at `users/{uid}`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub uid: UserId,
    #[serde(default)]
    pub email: String,
    pub nickname: String,
    pub nickname_lower: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(uid: UserId, nickname: &Nickname, email: String, now: DateTime<Utc>) -> Self {
        Profile {
            uid,
            email,
            nickname: nickname.as_str().to_owned(),
            nickname_lower: nickname.normalized(),
            created_at: Some(now),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            "Unknown"
        } else {
            &self.nickname
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_is_trimmed_and_checked() {
        assert!(Nickname::parse("   ").is_err());
        assert!(Nickname::parse(" ab ").is_err());
        let nick = Nickname::parse("  Ada Reads ").unwrap();
        assert_eq!(nick.as_str(), "Ada Reads");
        assert_eq!(nick.normalized(), "ada reads");
    }
}
