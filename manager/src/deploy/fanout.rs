//! Per-service fan-out of adapter calls

use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::errors::{AdapterError, FanoutError};
use crate::utils::{calc_exp_backoff, CooldownOptions};

/// Fan-out settings
#[derive(Debug, Clone)]
pub struct FanoutOptions {
    /// Maximum adapter calls in flight at once
    pub max_concurrency: usize,

    /// Attempts per call, including the first; only transient failures are retried
    pub max_attempts: u32,

    /// Delay between attempts
    pub cooldown: CooldownOptions,
}

impl Default for FanoutOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            max_attempts: 3,
            cooldown: CooldownOptions::default(),
        }
    }
}

/// Run `call` once per service ID and return the results in ID order.
///
/// Every ID is attempted regardless of how the others fare.
pub async fn fan_out<'a, T, F, Fut>(
    operation: &'static str,
    ids: &'a [String],
    options: &'a FanoutOptions,
    call: F,
) -> Vec<(&'a str, Result<T, AdapterError>)>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = Result<T, AdapterError>>,
{
    let call = &call;
    stream::iter(ids.iter().map(String::as_str))
        .map(|id| async move { (id, with_retry(operation, id, options, || call(id)).await) })
        .buffered(options.max_concurrency.max(1))
        .collect()
        .await
}

/// Split fan-out results into successes or one composite error
pub fn collect<T>(
    operation: &'static str,
    results: Vec<(&str, Result<T, AdapterError>)>,
) -> Result<Vec<T>, FanoutError> {
    let total = results.len();
    let mut values = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for (id, result) in results {
        match result {
            Ok(value) => values.push(value),
            Err(e) => failures.push((id.to_string(), e)),
        }
    }

    if failures.is_empty() {
        Ok(values)
    } else {
        Err(FanoutError {
            operation,
            total,
            failures,
        })
    }
}

async fn with_retry<T, F, Fut>(
    operation: &str,
    id: &str,
    options: &FanoutOptions,
    mut attempt_fn: F,
) -> Result<T, AdapterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AdapterError>>,
{
    let mut attempt = 0;
    loop {
        match attempt_fn().await {
            Err(e) if e.is_transient() && attempt + 1 < options.max_attempts => {
                let delay = calc_exp_backoff(&options.cooldown, attempt);
                warn!(
                    "{} of service {} failed ({}), retrying in {:?}",
                    operation, id, e, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
