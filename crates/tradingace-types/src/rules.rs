//! Reward rule configuration
//!
//! Chain, pool and token precision are injected by the operator; the engine
//! never decides them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::user_task::CompletionRule;

/// Which side of the pool holds the reference (stable) token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSide {
    Token0,
    Token1,
}

/// Who qualifies for share-pool points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityScope {
    /// Any completed task record of the user, in any campaign
    Global,
    /// A completed onboarding task in the share-pool task's own campaign
    CampaignOnboarding,
}

impl Default for EligibilityScope {
    fn default() -> Self {
        Self::Global
    }
}

/// Reward rules applied by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardRules {
    /// Pool side carrying the reference token
    #[serde(default = "default_reference_side")]
    pub reference_side: TokenSide,

    /// Decimal precision of the reference token
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u32,

    /// Cumulative amount that completes an onboarding task
    #[serde(default = "default_onboarding_threshold")]
    pub onboarding_threshold: Decimal,

    /// Points awarded for completing an onboarding task
    #[serde(default = "default_onboarding_points")]
    pub onboarding_points: i64,

    /// Share-pool eligibility gate
    #[serde(default)]
    pub eligibility: EligibilityScope,
}

impl Default for RewardRules {
    fn default() -> Self {
        Self {
            reference_side: default_reference_side(),
            token_decimals: default_token_decimals(),
            onboarding_threshold: default_onboarding_threshold(),
            onboarding_points: default_onboarding_points(),
            eligibility: EligibilityScope::default(),
        }
    }
}

impl RewardRules {
    /// Completion rule for onboarding tasks
    pub fn onboarding_rule(&self) -> CompletionRule {
        CompletionRule {
            threshold: self.onboarding_threshold,
            points: self.onboarding_points,
        }
    }
}

fn default_reference_side() -> TokenSide {
    TokenSide::Token1
}

fn default_token_decimals() -> u32 {
    6
}

fn default_onboarding_threshold() -> Decimal {
    Decimal::from(1000)
}

fn default_onboarding_points() -> i64 {
    100
}
