//! Prompt assembly and a single-flight background runner for the external
//! financial advisor. The advisor itself is an opaque text generator behind
//! [`AdvisorClient`].

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, TryRecvError},
        Arc,
    },
    thread,
};

use crate::{
    core::services::Summary,
    currency::CurrencyFormatter,
    domain::Subscription,
    errors::AdvisorError,
};

/// Text generator invoked with a prompt and an API key.
pub trait AdvisorClient: Send + Sync {
    fn generate(&self, prompt: &str, credential: &str) -> Result<String, AdvisorError>;
}

/// Builds the advisor prompt from a monthly summary and the subscription list.
///
/// Only active subscriptions are listed; amounts go through `formatter`.
pub fn build_prompt(
    summary: &Summary,
    subscriptions: &[Subscription],
    formatter: &CurrencyFormatter,
) -> String {
    let mut lines = vec![
        format!(
            "Act as a personal finance advisor. Review my finances for {} and give three short, concrete recommendations.",
            summary.month
        ),
        String::new(),
        format!("Income: {}", formatter.format(summary.income)),
        format!(
            "Total expenses: {} ({} from subscriptions)",
            formatter.format(summary.total_expense),
            formatter.format(summary.subscriptions_total)
        ),
        format!("Balance: {}", formatter.format(summary.balance)),
    ];

    if !summary.category_breakdown.is_empty() {
        lines.push(String::new());
        lines.push("Spending by category:".to_string());
        lines.extend(
            summary
                .category_breakdown
                .iter()
                .map(|entry| format!("- {}: {}", entry.group, formatter.format(entry.amount))),
        );
    }

    let active: Vec<&Subscription> = subscriptions.iter().filter(|sub| sub.active).collect();
    if !active.is_empty() {
        lines.push(String::new());
        lines.push("Active subscriptions:".to_string());
        lines.extend(active.iter().map(|sub| {
            format!(
                "- {} ({}): {} on day {}",
                sub.name,
                sub.category,
                formatter.format(sub.amount),
                sub.billing_day
            )
        }));
    }

    let mut prompt = lines.join("\n");
    prompt.push('\n');
    prompt
}

/// Runs at most one advisor request at a time on a background thread.
#[derive(Debug, Clone, Default)]
pub struct AdvisorRunner {
    in_flight: Arc<AtomicBool>,
}

impl AdvisorRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Starts a request. Fails fast with `MissingCredential` when no key is
    /// set and with `Busy` while another request is running.
    pub fn request(
        &self,
        client: Arc<dyn AdvisorClient>,
        prompt: String,
        credential: Option<&str>,
    ) -> Result<PendingAnalysis, AdvisorError> {
        let credential = credential
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AdvisorError::MissingCredential)?
            .to_string();
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AdvisorError::Busy);
        }

        let guard = InFlight(self.in_flight.clone());
        let (sender, receiver) = mpsc::channel();
        tracing::info!(prompt_len = prompt.len(), "advisor request started");
        thread::spawn(move || {
            let result = client.generate(&prompt, &credential);
            if let Err(err) = &result {
                tracing::warn!(%err, "advisor request failed");
            }
            drop(guard);
            let _ = sender.send(result);
        });
        Ok(PendingAnalysis { receiver })
    }
}

/// Clears the in-flight flag when the worker finishes, including on panic.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Outcome of a request that may still be running.
pub struct PendingAnalysis {
    receiver: Receiver<Result<String, AdvisorError>>,
}

impl PendingAnalysis {
    /// Blocks until the advisor answers.
    pub fn wait(self) -> Result<String, AdvisorError> {
        self.receiver
            .recv()
            .unwrap_or(Err(AdvisorError::Disconnected))
    }

    /// Returns `None` while the request is still running.
    pub fn try_result(&self) -> Option<Result<String, AdvisorError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AdvisorError::Disconnected)),
        }
    }
}
