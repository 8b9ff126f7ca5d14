//! Token cost estimation.
//!
//! Prices are USD per million tokens. Estimates are informational; unknown
//! model names never fail and resolve to the closest known model or the
//! default.

use crate::llm::TokenUsage;
use serde::{Deserialize, Serialize};

/// Canonical models with known pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
    Gpt4oMini,
    Gpt4o,
    O3Mini,
    O1Mini,
    O1,
    Gpt4Turbo,
    Gpt4,
    Gpt35Turbo,
}

/// Per-model pricing (USD per 1M tokens)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl Model {
    /// Fallback when a model name matches nothing
    pub const DEFAULT: Model = Model::Gpt4oMini;

    /// Resolution order: more specific identifiers come before the ids they contain.
    const RESOLUTION_ORDER: [Model; 8] = [
        Model::Gpt4oMini,
        Model::Gpt4o,
        Model::O3Mini,
        Model::O1Mini,
        Model::O1,
        Model::Gpt4Turbo,
        Model::Gpt4,
        Model::Gpt35Turbo,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt4o => "gpt-4o",
            Model::O3Mini => "o3-mini",
            Model::O1Mini => "o1-mini",
            Model::O1 => "o1",
            Model::Gpt4Turbo => "gpt-4-turbo",
            Model::Gpt4 => "gpt-4",
            Model::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }

    pub fn pricing(&self) -> ModelPricing {
        let (input, output) = match self {
            Model::Gpt4oMini => (0.15, 0.60),
            Model::Gpt4o => (2.50, 10.00),
            Model::O3Mini => (1.10, 4.40),
            Model::O1Mini => (3.00, 12.00),
            Model::O1 => (15.00, 60.00),
            Model::Gpt4Turbo => (10.00, 30.00),
            Model::Gpt4 => (30.00, 60.00),
            Model::Gpt35Turbo => (0.50, 1.50),
        };
        ModelPricing {
            input_per_million: input,
            output_per_million: output,
        }
    }

    /// Exact lookup of a canonical id
    pub fn from_id(id: &str) -> Option<Model> {
        Self::RESOLUTION_ORDER.into_iter().find(|m| m.id() == id)
    }

    /// Whether `name` (already lowercased, prefix-stripped) refers to this model.
    ///
    /// The o-series ids are short enough to appear inside unrelated names, so
    /// they only match as a prefix.
    fn matches(&self, name: &str) -> bool {
        match self {
            Model::O3Mini | Model::O1Mini | Model::O1 => name.starts_with(self.id()),
            _ => name.contains(self.id()),
        }
    }
}

/// Membership test against the pricing table
pub fn is_supported_model(name: &str) -> bool {
    Model::from_id(name).is_some()
}

/// Resolve an arbitrary model name to a canonical model.
///
/// Matching is case-insensitive and ignores provider prefixes such as
/// `openai/`. Falls back to [`Model::DEFAULT`].
pub fn guess_model(name: &str) -> Model {
    let lower = name.trim().to_lowercase();
    let name = lower.rsplit('/').next().unwrap_or(&lower);

    Model::RESOLUTION_ORDER
        .into_iter()
        .find(|m| m.matches(name))
        .unwrap_or(Model::DEFAULT)
}

/// Token usage as reported in cost breakdowns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageInfo {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl From<TokenUsage> for UsageInfo {
    fn from(usage: TokenUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

/// Estimated cost of one upstream call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostInfo {
    /// Canonical model the pricing was taken from
    pub model: String,
    pub usage: UsageInfo,
    pub cost: CostBreakdown,
    pub currency: String,
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Estimate the cost of `usage` under `model`'s pricing. Never fails.
pub fn calculate_cost(model: &str, usage: &UsageInfo) -> CostInfo {
    let resolved = Model::from_id(model).unwrap_or_else(|| guess_model(model));
    let pricing = resolved.pricing();

    let input_cost = usage.prompt_tokens as f64 / 1_000_000.0 * pricing.input_per_million;
    let output_cost = usage.completion_tokens as f64 / 1_000_000.0 * pricing.output_per_million;

    CostInfo {
        model: resolved.id().to_string(),
        usage: *usage,
        cost: CostBreakdown {
            input_cost: round6(input_cost),
            output_cost: round6(output_cost),
            total_cost: round6(input_cost + output_cost),
        },
        currency: "USD".to_string(),
    }
}

/// One-line summary for display
pub fn format_cost_info(info: &CostInfo) -> String {
    format!(
        "Model: {} | Tokens: {} prompt + {} completion = {} total | Cost: ${:.6} input + ${:.6} output = ${:.6} {}",
        info.model,
        info.usage.prompt_tokens,
        info.usage.completion_tokens,
        info.usage.total_tokens,
        info.cost.input_cost,
        info.cost.output_cost,
        info.cost.total_cost,
        info.currency
    )
}
