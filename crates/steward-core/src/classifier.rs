//! Filename classification.
//!
//! Rules are evaluated in declaration order and the first match wins. The
//! rules overlap on purpose (`client_brief_contract.pdf` matches both the
//! brief and the contract rule), so the order below is part of the contract.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned to a detected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Invoices and bills
    Invoice,
    /// Receipts and payment confirmations
    Receipt,
    /// Client or project briefs
    ClientBrief,
    /// Contracts, agreements, NDAs, statements of work
    Contract,
    /// Nothing matched
    Unknown,
}

impl Category {
    /// Wire/display name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Receipt => "receipt",
            Self::ClientBrief => "client_brief",
            Self::Contract => "contract",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triage priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Needs attention first
    High,
    /// Normal
    Medium,
    /// Whenever
    Low,
}

impl Priority {
    /// Wire/display name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Detected category
    pub category: Category,
    /// Priority attached to the matching rule
    pub priority: Priority,
}

impl Classification {
    /// Classification used when no rule matches.
    pub const UNKNOWN: Classification = Classification {
        category: Category::Unknown,
        priority: Priority::Low,
    };
}

struct Rule {
    pattern: Regex,
    category: Category,
    priority: Priority,
}

fn rule(pattern: &str, category: Category, priority: Priority) -> Rule {
    let pattern = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|e| panic!("invalid built-in classification pattern {pattern:?}: {e}"));
    Rule {
        pattern,
        category,
        priority,
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule("invoice|inv_|bill", Category::Invoice, Priority::High),
        rule(
            "receipt|rcpt_|payment_confirmation",
            Category::Receipt,
            Priority::Medium,
        ),
        rule(
            "brief|client_brief|project_brief",
            Category::ClientBrief,
            Priority::High,
        ),
        rule("contract|agreement|nda|sow", Category::Contract, Priority::High),
    ]
});

/// Classify a filename. Pure and total.
pub fn classify(filename: &str) -> Classification {
    RULES
        .iter()
        .find(|rule| rule.pattern.is_match(filename))
        .map(|rule| Classification {
            category: rule.category,
            priority: rule.priority,
        })
        .unwrap_or(Classification::UNKNOWN)
}
