//! Throttled cache of the beds on a SleepIQ account.
//!
//! Every sensor of the integration refreshes through the same
//! [`SleepIqData`], so a full poll cycle costs at most one login and one
//! fetch per [`MIN_TIME_BETWEEN_UPDATES`].

use std::collections::HashMap;

use chrono::TimeDelta;
use sleephub_domain::time::{Clock, SystemClock, Timestamp};

use crate::client::{ClientError, ClientOutput, SleepIqClient};
use crate::error::SleepIqError;
use crate::model::BedSnapshot;

/// Minimum time between two fetches triggered by [`SleepIqData::update`].
pub const MIN_TIME_BETWEEN_UPDATES: TimeDelta = TimeDelta::seconds(30);

/// Bed snapshots keyed by bed id, plus the client that produces them.
pub struct SleepIqData<C, K = SystemClock> {
    client: C,
    clock: K,
    min_interval: TimeDelta,
    beds: HashMap<String, BedSnapshot>,
    last_success: Option<Timestamp>,
}

impl<C: SleepIqClient> SleepIqData<C> {
    /// Create an empty cache reading the system clock.
    pub fn new(client: C) -> Self {
        Self::with_clock(client, SystemClock)
    }
}

impl<C: SleepIqClient, K: Clock> SleepIqData<C, K> {
    /// Create an empty cache reading `clock`.
    pub fn with_clock(client: C, clock: K) -> Self {
        Self {
            client,
            clock,
            min_interval: MIN_TIME_BETWEEN_UPDATES,
            beds: HashMap::new(),
            last_success: None,
        }
    }

    /// Override the throttle window.
    #[must_use]
    pub fn with_min_interval(mut self, min_interval: TimeDelta) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Every cached bed, keyed by bed id.
    #[must_use]
    pub fn beds(&self) -> &HashMap<String, BedSnapshot> {
        &self.beds
    }

    /// The cached bed with the given id.
    #[must_use]
    pub fn bed(&self, bed_id: &str) -> Option<&BedSnapshot> {
        self.beds.get(bed_id)
    }

    /// When the last successful fetch completed.
    #[must_use]
    pub fn last_success(&self) -> Option<Timestamp> {
        self.last_success
    }

    /// Refresh the cache unless the last successful fetch is younger than
    /// the throttle window. A last success in the future (clock stepped
    /// back) counts as expired.
    ///
    /// # Errors
    ///
    /// See [`force_update`](Self::force_update).
    pub async fn update(&mut self) -> Result<(), SleepIqError> {
        let now = self.clock.now();
        let fresh = self.last_success.is_some_and(|last| {
            let elapsed = now - last;
            elapsed >= TimeDelta::zero() && elapsed < self.min_interval
        });
        if fresh {
            tracing::trace!("SleepIQ data still fresh, skipping fetch");
            return Ok(());
        }
        self.force_update().await
    }

    /// Log in and fetch every bed, ignoring the throttle window.
    ///
    /// # Errors
    ///
    /// Returns [`SleepIqError::Connection`] or [`SleepIqError::UnknownUser`]
    /// after emptying the cache, or [`SleepIqError::Client`] with the cache
    /// untouched.
    #[tracing::instrument(skip_all)]
    pub async fn force_update(&mut self) -> Result<(), SleepIqError> {
        let mut output = ClientOutput::default();
        let result = self.fetch(&mut output).await;
        if !output.is_empty() {
            tracing::warn!("{}", output.as_str().trim_end());
        }

        match result {
            Ok(beds) => {
                if self.beds.is_empty() {
                    tracing::debug!("connected to SleepIQ");
                }
                self.beds = beds
                    .into_iter()
                    .map(|bed| (bed.bed_id.clone(), bed))
                    .collect();
                self.last_success = Some(self.clock.now());
                tracing::debug!(beds = self.beds.len(), "SleepIQ data refreshed");
                Ok(())
            }
            Err(err) => {
                let err = SleepIqError::classify(err);
                if err.clears_cache() {
                    self.beds.clear();
                }
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    #[cfg(test)]
    pub(crate) fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    async fn fetch(&mut self, output: &mut ClientOutput) -> Result<Vec<BedSnapshot>, ClientError> {
        self.client.login(output).await?;
        self.client.beds_with_sleeper_status(output).await
    }
}
