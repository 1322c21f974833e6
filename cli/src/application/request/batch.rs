//! Batch requests: one sub-request per item, then a final request.

use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::Request;
use crate::application::cancel::ensure_active;
use crate::application::ports::ProgressReporter;
use crate::domain::DeployError;

/// Result of processing a single batch item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Done,
    /// The item hit a recoverable condition and was left untouched.
    Skipped(String),
}

/// Value of the final request plus the items that were skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<T> {
    pub value: T,
    pub skipped: Vec<String>,
}

type ItemRequest<'a, I> = Box<dyn Fn(&I) -> Request<'a, ItemOutcome> + 'a>;

/// Runs one request per item, reporting `[i/N]` progress, and finishes with
/// `finish`.
pub struct BatchRequest<'a, I, T> {
    label: String,
    items: Vec<I>,
    per_item: ItemRequest<'a, I>,
    finish: Request<'a, T>,
    skipped_warning: fn(&str) -> String,
}

impl<'a, I, T> BatchRequest<'a, I, T> {
    pub fn new<F>(
        label: impl Into<String>,
        items: Vec<I>,
        per_item: F,
        finish: Request<'a, T>,
    ) -> Self
    where
        F: Fn(&I) -> Request<'a, ItemOutcome> + 'a,
    {
        Self {
            label: label.into(),
            items,
            per_item: Box::new(per_item),
            finish,
            skipped_warning: |names| format!("Skipped: {names}"),
        }
    }

    /// Format of the single warning listing skipped items (comma-joined).
    #[must_use]
    pub fn with_skipped_warning(mut self, format: fn(&str) -> String) -> Self {
        self.skipped_warning = format;
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Process every item in order, then run the final request.
    ///
    /// # Errors
    ///
    /// Returns `Canceled` when cancellation is observed between items, or the
    /// first non-recoverable item failure.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        reporter: &dyn ProgressReporter,
    ) -> Result<BatchOutcome<T>, DeployError> {
        let total = self.items.len();
        let mut skipped = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            ensure_active(cancel, &self.label)?;
            let request = (self.per_item)(item);
            reporter.step(&format!("[{}/{total}] {}", index + 1, request.label()));
            if let ItemOutcome::Skipped(name) = request.run(cancel).await? {
                skipped.push(name);
            }
        }
        if !skipped.is_empty() {
            let message = (self.skipped_warning)(&skipped.join(", "));
            warn!(batch = %self.label, skipped = skipped.len(), "{message}");
            reporter.warn(&message);
        }
        ensure_active(cancel, &self.label)?;
        let value = self.finish.run(cancel).await?;
        Ok(BatchOutcome { value, skipped })
    }
}
