//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., using an
//! IssueNumber where a PullNumber is expected) and make the code more
//! self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An issue number within a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueNumber(pub u64);

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for IssueNumber {
    fn from(n: u64) -> Self {
        IssueNumber(n)
    }
}

/// A pull request number within a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullNumber(pub u64);

impl fmt::Display for PullNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for PullNumber {
    fn from(n: u64) -> Self {
        PullNumber(n)
    }
}

/// A workflow run ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RunId {
    fn from(n: u64) -> Self {
        RunId(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod issue_number {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_roundtrip(n: u64) {
                let issue = IssueNumber(n);
                let json = serde_json::to_string(&issue).unwrap();
                let parsed: IssueNumber = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(issue, parsed);
            }

            #[test]
            fn display_format(n: u64) {
                let issue = IssueNumber(n);
                prop_assert_eq!(format!("{}", issue), format!("#{}", n));
            }
        }
    }

    mod pull_number {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_roundtrip(n: u64) {
                let pull = PullNumber(n);
                let json = serde_json::to_string(&pull).unwrap();
                let parsed: PullNumber = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(pull, parsed);
            }

            #[test]
            fn comparison_matches_underlying(a: u64, b: u64) {
                let pull_a = PullNumber(a);
                let pull_b = PullNumber(b);
                prop_assert_eq!(pull_a == pull_b, a == b);
            }
        }
    }

    mod run_id {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_roundtrip(n: u64) {
                let id = RunId(n);
                let json = serde_json::to_string(&id).unwrap();
                let parsed: RunId = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(id, parsed);
            }
        }
    }
}
