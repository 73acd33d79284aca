// ============================================================================
// Summary Session
// ============================================================================
//
// State of one user's summarize-and-export workflow: the current selection,
// the text being edited, and the results of the last submission together
// with the text that produced them.
//
// ============================================================================

use chrono::Local;

use crate::aggregator::{FanOutAggregator, Provider, ProviderSelection, ResultSet};
use crate::error::{AppError, AppResult};
use crate::export::{self, CsvExport};

#[derive(Debug, Clone, Default)]
pub struct SummarySession {
    selection: ProviderSelection,
    content: String,
    submitted_content: String,
    results: ResultSet,
}

impl SummarySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(selection: ProviderSelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &ProviderSelection {
        &self.selection
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Results of the most recent submission
    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Text the current results were produced from
    pub fn submitted_content(&self) -> &str {
        &self.submitted_content
    }

    /// Run the current content through every selected model.
    ///
    /// Replaces the previous results once the whole batch has settled.
    pub async fn submit(
        &mut self,
        aggregator: &FanOutAggregator,
        catalog: &[Provider],
    ) -> AppResult<&ResultSet> {
        validate_submission(&self.content, &self.selection, catalog)?;

        let results = aggregator.submit(&self.content, &self.selection).await;
        self.submitted_content = self.content.clone();
        self.results = results;
        Ok(&self.results)
    }

    /// Export the current results, named after the local time
    pub fn export(&self) -> AppResult<CsvExport> {
        export::export(&self.submitted_content, &self.results, &Local::now())
    }
}

/// Reject submissions that would be pointless or that name models outside
/// the catalog
pub fn validate_submission(
    content: &str,
    selection: &ProviderSelection,
    catalog: &[Provider],
) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::validation("Enter some text to summarize"));
    }
    if !selection.has_any() {
        return Err(AppError::validation("Select at least one model"));
    }
    if let Some((provider, model)) = selection.first_unlisted(catalog) {
        return Err(AppError::validation(format!(
            "Unknown model: {}/{}",
            provider, model
        )));
    }
    Ok(())
}
