//! Per-feature advice text.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AiError;

/// Screens that can show advice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureTag {
    Taxes,
    Audit,
    Compliance,
    Costing,
    Budgeting,
    Invoices,
    Reports,
    Dashboard,
}

impl FeatureTag {
    pub const ALL: [FeatureTag; 8] = [
        FeatureTag::Taxes,
        FeatureTag::Audit,
        FeatureTag::Compliance,
        FeatureTag::Costing,
        FeatureTag::Budgeting,
        FeatureTag::Invoices,
        FeatureTag::Reports,
        FeatureTag::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureTag::Taxes => "taxes",
            FeatureTag::Audit => "audit",
            FeatureTag::Compliance => "compliance",
            FeatureTag::Costing => "costing",
            FeatureTag::Budgeting => "budgeting",
            FeatureTag::Invoices => "invoices",
            FeatureTag::Reports => "reports",
            FeatureTag::Dashboard => "dashboard",
        }
    }
}

impl FromStr for FeatureTag {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AiError::UnknownFeature(s.to_string()))
    }
}

impl core::fmt::Display for FeatureTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const FALLBACK_ADVICE: &str =
    "Our AI has analyzed your data and has some suggestions to optimize your work.";

/// Lookup from feature tag to advice text.
#[derive(Debug, Clone)]
pub struct AdviceCatalog {
    entries: HashMap<FeatureTag, &'static str>,
}

impl AdviceCatalog {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Catalog with the stock advice for every feature.
    pub fn standard() -> Self {
        Self::empty()
            .with_entry(
                FeatureTag::Taxes,
                "Consider reviewing recent tax code changes that might affect your client's deductions. Our analysis suggests potential savings in the R&D category.",
            )
            .with_entry(
                FeatureTag::Audit,
                "Based on the transaction patterns, you might want to examine the accounts receivable aging report more closely, as there are unusual patterns compared to previous quarters.",
            )
            .with_entry(
                FeatureTag::Compliance,
                "Your client's industry has new regulatory requirements effective next month. Consider preparing a compliance checklist to ensure all new requirements are met.",
            )
            .with_entry(
                FeatureTag::Costing,
                "Your cost allocation approach could be optimized. Consider activity-based costing for manufacturing clients to get more accurate insights.",
            )
            .with_entry(
                FeatureTag::Budgeting,
                "Based on historical data, your client's Q3 forecast may be optimistic. Consider creating alternative scenarios with different growth assumptions.",
            )
            .with_entry(
                FeatureTag::Invoices,
                "Some of your uploaded invoices have inconsistent payment terms. Consider standardizing terms to improve cash flow predictability.",
            )
            .with_entry(
                FeatureTag::Reports,
                "Your clients might benefit from custom KPI dashboards tailored to their industry. Consider setting up industry benchmarks for comparison.",
            )
            .with_entry(
                FeatureTag::Dashboard,
                "Your dashboard shows revenue growth is outpacing profitability. Consider analyzing expense categories to identify areas for potential cost optimization.",
            )
    }

    pub fn with_entry(mut self, tag: FeatureTag, text: &'static str) -> Self {
        self.entries.insert(tag, text);
        self
    }

    /// Advice for `tag`, or the generic line when none is registered.
    pub fn advice_for(&self, tag: FeatureTag) -> &'static str {
        self.entries.get(&tag).copied().unwrap_or(FALLBACK_ADVICE)
    }
}

impl Default for AdviceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
