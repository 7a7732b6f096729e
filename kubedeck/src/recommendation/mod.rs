//! Resource recommendations.

mod llm;
mod prompt;

pub use llm::{LlmRecommendationEngine, parse_recommendation};
pub use prompt::build_prompt;

use async_trait::async_trait;

use crate::Result;
use crate::domain::{Recommendation, UsageByNamespace};

/// Turns collected usage into a set of flagged workloads.
#[async_trait]
pub trait RecommendationEngine: Send + Sync {
    /// Analyze `usage`, phrasing the summary according to `style`.
    async fn recommend(&self, usage: &UsageByNamespace, style: &str) -> Result<Recommendation>;
}
