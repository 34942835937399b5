use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the ten canonical CFA Level I topic areas.
///
/// The catalog (display name, description, exam weight) is fixed. Weights sum to
/// 1.0 and are informational only; exam composition does not enforce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    EthicalAndProfessionalStandards,
    QuantitativeMethods,
    Economics,
    FinancialStatementAnalysis,
    CorporateIssuers,
    EquityInvestments,
    FixedIncome,
    Derivatives,
    AlternativeInvestments,
    PortfolioManagement,
}

/// Source topics spelled differently from the canonical category names.
const TOPIC_ALIASES: &[(&str, Category)] = &[
    (
        "Ethical & Professional Standards",
        Category::EthicalAndProfessionalStandards,
    ),
    (
        "Financial Reporting & Analysis",
        Category::FinancialStatementAnalysis,
    ),
];

impl Category {
    /// Catalog order, which is also the order categories are visited during composition.
    pub const ALL: [Category; 10] = [
        Category::EthicalAndProfessionalStandards,
        Category::QuantitativeMethods,
        Category::Economics,
        Category::FinancialStatementAnalysis,
        Category::CorporateIssuers,
        Category::EquityInvestments,
        Category::FixedIncome,
        Category::Derivatives,
        Category::AlternativeInvestments,
        Category::PortfolioManagement,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Category::EthicalAndProfessionalStandards => "Ethical and Professional Standards",
            Category::QuantitativeMethods => "Quantitative Methods",
            Category::Economics => "Economics",
            Category::FinancialStatementAnalysis => "Financial Statement Analysis",
            Category::CorporateIssuers => "Corporate Issuers",
            Category::EquityInvestments => "Equity Investments",
            Category::FixedIncome => "Fixed Income",
            Category::Derivatives => "Derivatives",
            Category::AlternativeInvestments => "Alternative Investments",
            Category::PortfolioManagement => "Portfolio Management",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Category::EthicalAndProfessionalStandards => {
                "Focuses on ethical principles and professional standards"
            }
            Category::QuantitativeMethods => "Covers statistical tools for financial analysis",
            Category::Economics => "Examines macroeconomic and microeconomic concepts",
            Category::FinancialStatementAnalysis => "Analysis of financial statements",
            Category::CorporateIssuers => "Characteristics of corporate issuers",
            Category::EquityInvestments => "Valuation of equity securities",
            Category::FixedIncome => "Analysis of fixed-income securities",
            Category::Derivatives => "Valuation of derivative securities",
            Category::AlternativeInvestments => "Hedge funds, private equity, real estate",
            Category::PortfolioManagement => "Portfolio construction and risk management",
        }
    }

    /// Approximate share of the exam covered by this topic area.
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            Category::EthicalAndProfessionalStandards | Category::FinancialStatementAnalysis => {
                0.15
            }
            Category::QuantitativeMethods | Category::Economics | Category::CorporateIssuers => {
                0.10
            }
            Category::EquityInvestments | Category::FixedIncome => 0.11,
            Category::Derivatives
            | Category::AlternativeInvestments
            | Category::PortfolioManagement => 0.06,
        }
    }

    /// Map a free-text source topic onto a canonical category.
    ///
    /// The topic is trimmed and looked up in the alias table first, then compared
    /// against the canonical names. Anything else yields `None`: such questions are
    /// not selectable by any exam.
    #[must_use]
    pub fn from_topic(topic: &str) -> Option<Self> {
        let topic = topic.trim();
        TOPIC_ALIASES
            .iter()
            .find(|(alias, _)| *alias == topic)
            .map(|(_, category)| *category)
            .or_else(|| Self::from_name(topic))
    }

    /// Exact lookup by canonical display name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Case-insensitive lookup by canonical name, used for user input.
    #[must_use]
    pub fn from_name_loose(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Category::EthicalAndProfessionalStandards => 0,
            Category::QuantitativeMethods => 1,
            Category::Economics => 2,
            Category::FinancialStatementAnalysis => 3,
            Category::CorporateIssuers => 4,
            Category::EquityInvestments => 5,
            Category::FixedIncome => 6,
            Category::Derivatives => 7,
            Category::AlternativeInvestments => 8,
            Category::PortfolioManagement => 9,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let total: f64 = Category::ALL.iter().map(|c| c.weight()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn index_matches_catalog_order() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn aliases_map_to_canonical_categories() {
        assert_eq!(
            Category::from_topic("Ethical & Professional Standards"),
            Some(Category::EthicalAndProfessionalStandards)
        );
        assert_eq!(
            Category::from_topic(" Financial Reporting & Analysis "),
            Some(Category::FinancialStatementAnalysis)
        );
        assert_eq!(Category::from_topic("Economics"), Some(Category::Economics));
    }

    #[test]
    fn canonical_names_pass_through() {
        assert_eq!(
            Category::from_topic("Financial Statement Analysis"),
            Some(Category::FinancialStatementAnalysis)
        );
    }

    #[test]
    fn unknown_topics_are_not_mapped() {
        assert_eq!(Category::from_topic("Behavioral Finance"), None);
        assert_eq!(Category::from_topic("economics"), None);
        assert_eq!(
            Category::from_name_loose("economics"),
            Some(Category::Economics)
        );
    }
}
