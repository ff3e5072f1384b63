//! Analysis and report configuration.
//!
//! Category labels the engine depends on are carried in an explicit
//! [`AnalysisConfig`] value passed to every computation. Settings can be
//! read from a JSON file; every field has a default so partial files are
//! accepted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Application name used for the XDG config and cache directories.
pub const APP_NAME: &str = "ledger-report";

/// File name of the settings file inside the config directory.
const CONFIG_FILE: &str = "config.json";

/// Default label of the loan disbursement / interest category.
pub const DEFAULT_LOAN_CATEGORY: &str = "Loan, interests";
/// Default label of the repayment / lending-out category.
pub const DEFAULT_REPAYMENT_CATEGORY: &str = "Lending, renting";
/// Default label of the charity category.
pub const DEFAULT_CHARITY_CATEGORY: &str = "Charity";

/// Extra categories folded into the charity and lending buckets.
///
/// The configured labels always belong to their bucket: `charity_category`
/// to charity, `loan_category` and `repayment_category` to lending. These
/// lists only add categories on top of them. Anything else falls into the
/// `normal` bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendingBuckets {
    /// Additional categories counted as charity.
    pub charity: Vec<String>,
    /// Additional categories counted as lending.
    pub lending: Vec<String>,
}

/// Category labels and chart thresholds used by the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Expense category holding loan disbursements and interest.
    pub loan_category: String,
    /// Income category holding loan repayments.
    pub repayment_category: String,
    /// Expense category holding charitable giving.
    pub charity_category: String,
    /// Extra members of the simplified charity and lending buckets.
    pub spending_buckets: SpendingBuckets,
    /// Pie-chart slices below this share of the total fold into "Others".
    pub small_category_threshold: f64,
    /// Maximum number of categories shown in bar charts.
    pub max_categories_display: usize,
}

impl Default for AnalysisConfig {
    #[inline]
    fn default() -> Self {
        Self {
            loan_category: DEFAULT_LOAN_CATEGORY.to_owned(),
            repayment_category: DEFAULT_REPAYMENT_CATEGORY.to_owned(),
            charity_category: DEFAULT_CHARITY_CATEGORY.to_owned(),
            spending_buckets: SpendingBuckets::default(),
            small_category_threshold: 0.02,
            max_categories_display: 10,
        }
    }
}

impl AnalysisConfig {
    /// Returns `true` if `category` belongs to the charity bucket.
    #[inline]
    #[must_use]
    pub fn is_charity_bucket(&self, category: &str) -> bool {
        category == self.charity_category
            || self.spending_buckets.charity.iter().any(|c| c == category)
    }

    /// Returns `true` if `category` belongs to the lending bucket.
    #[inline]
    #[must_use]
    pub fn is_lending_bucket(&self, category: &str) -> bool {
        category == self.loan_category
            || category == self.repayment_category
            || self.spending_buckets.lending.iter().any(|c| c == category)
    }
}

/// Presentation settings for generated reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// ISO code of the currency all amounts are expressed in.
    pub base_currency: String,
    /// `strftime` pattern for the generation timestamp.
    pub date_format: String,
    /// Number of categories listed in "top spending" views.
    pub top_categories: usize,
}

impl Default for ReportConfig {
    #[inline]
    fn default() -> Self {
        Self {
            base_currency: "EGP".to_owned(),
            date_format: "%Y-%m-%d at %H:%M:%S".to_owned(),
            top_categories: 5,
        }
    }
}

/// Complete settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Engine category labels and chart thresholds.
    pub analysis: AnalysisConfig,
    /// Report presentation.
    pub report: ReportConfig,
}

impl Settings {
    /// Reads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] if the file cannot be read,
    /// [`LedgerError::Serialization`] if it is not valid JSON, or
    /// [`LedgerError::Config`] if the values are inconsistent.
    #[inline]
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| LedgerError::io(path, err))?;
        let settings: Self = serde_json::from_str(&contents)?;
        settings.validate()?;
        tracing::debug!("loaded settings");
        Ok(settings)
    }

    /// Reads settings from the default location, falling back to defaults
    /// when no settings file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing settings file cannot be read or
    /// parsed.
    #[inline]
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Returns the platform config path (`$XDG_CONFIG_HOME/ledger-report/config.json`).
    #[inline]
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Checks that labels are non-empty, the extra bucket lists do not
    /// overlap and thresholds are in range.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] describing the first problem found.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        let labels = [
            ("loan_category", &analysis.loan_category),
            ("repayment_category", &analysis.repayment_category),
            ("charity_category", &analysis.charity_category),
        ];
        for (name, value) in labels {
            if value.trim().is_empty() {
                return Err(LedgerError::Config(format!("{name} must not be empty")));
            }
        }
        let buckets = &analysis.spending_buckets;
        let shared = buckets
            .charity
            .iter()
            .find(|&category| analysis.is_lending_bucket(category))
            .or_else(|| {
                buckets
                    .lending
                    .iter()
                    .find(|&category| analysis.is_charity_bucket(category))
            });
        if let Some(shared) = shared {
            return Err(LedgerError::Config(format!(
                "category {shared:?} is listed as both charity and lending"
            )));
        }
        if !(0.0_f64..1.0_f64).contains(&analysis.small_category_threshold) {
            return Err(LedgerError::Config(format!(
                "small_category_threshold must be in [0, 1), got {}",
                analysis.small_category_threshold
            )));
        }
        if self.report.base_currency.trim().is_empty() {
            return Err(LedgerError::Config("base_currency must not be empty".to_owned()));
        }
        Ok(())
    }
}
