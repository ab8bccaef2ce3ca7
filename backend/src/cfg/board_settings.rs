use serde::{Deserialize, Serialize};

/// What happens when a user votes twice on the same post.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateVotePolicy {
    /// The repeated vote succeeds without changing the tally.
    #[default]
    Idempotent,
    /// The repeated vote is rejected with a conflict.
    Strict,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BoardSettings {
    #[serde(default)]
    pub duplicate_vote_policy: DuplicateVotePolicy,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

const fn default_max_page_size() -> i64 {
    100
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            duplicate_vote_policy: DuplicateVotePolicy::default(),
            max_page_size: default_max_page_size(),
        }
    }
}
