//! Newtype wrappers for domain identifiers.
//!
//! These types keep repository names and delivery IDs from being mixed up with
//! arbitrary strings pulled out of webhook payloads.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a string is not a valid `owner/repo` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid repository identifier {0:?}: expected \"owner/repo\"")]
pub struct InvalidRepoId(pub String);

/// A repository identifier (owner/repo format).
///
/// GitHub treats owner and repository names case-insensitively, but webhook
/// payloads always carry the canonical casing, so comparison here is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses a `full_name` as found in `repository.full_name` of a webhook payload.
    ///
    /// Both halves must be non-empty and there must be exactly one `/`.
    pub fn parse(full_name: &str) -> Result<Self, InvalidRepoId> {
        let invalid = || InvalidRepoId(full_name.to_string());

        let (owner, repo) = full_name.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }
        if owner.chars().any(char::is_whitespace) || repo.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(RepoId::new(owner, repo))
    }

    /// Returns the `owner/repo` form used by the GitHub API.
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = InvalidRepoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepoId::parse(s)
    }
}

/// A GitHub webhook delivery ID.
///
/// Only used to correlate log lines; the relay keeps no record of deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryId(pub String);

impl DeliveryId {
    pub fn new(s: impl Into<String>) -> Self {
        DeliveryId(s.into())
    }

    /// Placeholder used when the sender omitted `X-GitHub-Delivery`.
    pub fn unknown() -> Self {
        DeliveryId("unknown".to_string())
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod repo_id {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn parse_valid() {
            let repo = RepoId::parse("jurono/api").unwrap();
            assert_eq!(repo.owner, "jurono");
            assert_eq!(repo.repo, "api");
        }

        #[test]
        fn parse_rejects_missing_slash() {
            assert!(RepoId::parse("jurono").is_err());
        }

        #[test]
        fn parse_rejects_empty_halves() {
            assert!(RepoId::parse("/api").is_err());
            assert!(RepoId::parse("jurono/").is_err());
            assert!(RepoId::parse("/").is_err());
            assert!(RepoId::parse("").is_err());
        }

        #[test]
        fn parse_rejects_extra_segments() {
            assert!(RepoId::parse("jurono/api/extra").is_err());
        }

        #[test]
        fn parse_rejects_whitespace() {
            assert!(RepoId::parse("jurono /api").is_err());
            assert!(RepoId::parse("jurono/a pi").is_err());
        }

        #[test]
        fn from_str_matches_parse() {
            let parsed: RepoId = "jurono/backend".parse().unwrap();
            assert_eq!(parsed, RepoId::new("jurono", "backend"));
        }

        proptest! {
            #[test]
            fn display_parse_roundtrip(owner in "[a-zA-Z0-9_.-]{1,39}", repo in "[a-zA-Z0-9_.-]{1,100}") {
                let id = RepoId::new(&owner, &repo);
                let parsed = RepoId::parse(&id.full_name()).unwrap();
                prop_assert_eq!(parsed, id);
            }

            #[test]
            fn parse_never_panics(s: String) {
                let _ = RepoId::parse(&s);
            }
        }
    }

    mod delivery_id {
        use super::*;

        #[test]
        fn display_is_raw_value() {
            let id = DeliveryId::new("72d3162e-cc78-11e3-81ab-4c9367dc0958");
            assert_eq!(id.to_string(), "72d3162e-cc78-11e3-81ab-4c9367dc0958");
        }

        #[test]
        fn unknown_placeholder() {
            assert_eq!(DeliveryId::unknown().to_string(), "unknown");
        }
    }
}
