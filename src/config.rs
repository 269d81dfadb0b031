use std::env;

use anyhow::{bail, Context, Result};

use crate::executor::PromotionPolicy;

pub const PROMOTION_POLICY_VAR: &str = "CHESS_PROMOTION_POLICY";
pub const SUGGESTION_ATTEMPTS_VAR: &str = "CHESS_SUGGESTION_ATTEMPTS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub promotion_policy: PromotionPolicy,
    /// How many times an external move source is asked again after it
    /// suggests a move that cannot be played.
    pub max_suggestion_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            promotion_policy: PromotionPolicy::Require,
            max_suggestion_attempts: 3,
        }
    }
}

impl SessionConfig {
    pub fn set_promotion_policy(&mut self, policy: PromotionPolicy) {
        self.promotion_policy = policy;
    }

    pub fn set_max_suggestion_attempts(&mut self, attempts: u32) {
        self.max_suggestion_attempts = attempts;
    }

    /// Defaults overridden by `CHESS_PROMOTION_POLICY` (`require` or `queen`)
    /// and `CHESS_SUGGESTION_ATTEMPTS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(PROMOTION_POLICY_VAR) {
            let policy = match value.trim().to_ascii_lowercase().as_str() {
                "require" => PromotionPolicy::Require,
                "queen" | "auto-queen" => PromotionPolicy::AutoQueen,
                other => bail!(
                    "{} must be \"require\" or \"queen\", got {:?}",
                    PROMOTION_POLICY_VAR,
                    other
                ),
            };
            config.set_promotion_policy(policy);
        }

        if let Some(value) = lookup(SUGGESTION_ATTEMPTS_VAR) {
            let attempts: u32 = value
                .trim()
                .parse()
                .with_context(|| {
                    format!("{} must be a positive integer", SUGGESTION_ATTEMPTS_VAR)
                })?;
            if attempts == 0 {
                bail!("{} must be at least 1", SUGGESTION_ATTEMPTS_VAR);
            }
            config.set_max_suggestion_attempts(attempts);
        }

        Ok(config)
    }
}
