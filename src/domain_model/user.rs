use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier issued by the identity provider.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Applies the parsing rules to an id that was built without parsing.
    pub fn check(&self) -> Result<(), String> {
        let parsed: UserId = self.0.parse()?;
        if parsed.0 != self.0 {
            return Err(format!("user id has surrounding whitespace: {:?}", self.0));
        }
        Ok(())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("empty user id".to_string());
        }
        if trimmed.contains('/') {
            return Err(format!("user id must not contain '/': {trimmed}"));
        }
        Ok(UserId(trimmed.to_owned()))
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_owned())
    }
}

/// Unordered pair of users, normalised so that `min() <= max()`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct UserPair(UserId, UserId);

impl UserPair {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a < b { Self(a, b) } else { Self(b, a) }
    }

    pub fn min(&self) -> &UserId {
        &self.0
    }

    pub fn max(&self) -> &UserId {
        &self.1
    }
}

impl fmt::Display for UserPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.0, self.1)
    }
}

/// The signed-in user as resolved by the identity provider.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Session {
    pub uid: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_order_independent() {
        let a = UserPair::new("alice".into(), "bob".into());
        let b = UserPair::new("bob".into(), "alice".into());
        assert_eq!(a, b);
        assert_eq!(UserPair::min(&a).as_str(), "alice");
        assert_eq!(UserPair::max(&a).as_str(), "bob");
    }

    #[test]
    fn parse_rejects_blank_and_slashes() {
        assert!("  ".parse::<UserId>().is_err());
        assert!("a/b".parse::<UserId>().is_err());
        assert_eq!("  carol ".parse::<UserId>().unwrap(), UserId::from("carol"));
    }

    #[test]
    fn check_holds_unparsed_ids_to_the_parse_rules() {
        assert!(UserId::from("carol").check().is_ok());
        assert!(UserId::from(" carol").check().is_err());
        assert!(UserId::from("carol/x").check().is_err());
        assert!(UserId::from("").check().is_err());
    }
}
