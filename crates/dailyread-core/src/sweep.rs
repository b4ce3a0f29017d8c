//! Scheduled sweeps: daily cards and evening nudges.
//!
//! A sweep authenticates the caller, then walks every user through
//! evaluate, send, mark. Users are independent: a failure for one is logged
//! and counted, never marks that user as sent, and never stops the sweep.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::delivery::{Message, Messenger};
use crate::engine::ProgressEngine;
use crate::error::{CoreError, DeliveryError, Result};
use crate::storage::{Config, Store, User};

/// Per-sweep counters. `evaluated == sent + skipped + failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub evaluated: u32,
    pub sent: u32,
    pub skipped: u32,
    pub failed: u32,
}

enum UserOutcome {
    Sent,
    Skipped,
}

/// Check a caller-supplied cron secret.
///
/// Digests are compared rather than raw strings. An empty configured secret
/// rejects every caller.
pub fn verify_cron_secret(supplied: Option<&str>, expected: &str) -> Result<()> {
    let Some(supplied) = supplied.filter(|s| !s.is_empty()) else {
        warn!("sweep called without a cron secret");
        return Err(CoreError::Unauthorized);
    };
    if expected.is_empty() {
        warn!("no cron secret configured; rejecting sweep");
        return Err(CoreError::Unauthorized);
    }
    if Sha256::digest(supplied.as_bytes()) != Sha256::digest(expected.as_bytes()) {
        warn!("sweep called with a mismatched cron secret");
        return Err(CoreError::Unauthorized);
    }
    Ok(())
}

pub struct Sweeper<'a, S: Store, C: Clock, M: Messenger> {
    engine: &'a ProgressEngine<S, C>,
    messenger: &'a M,
    cron_secret: String,
    timeout: Duration,
}

impl<'a, S: Store, C: Clock, M: Messenger> Sweeper<'a, S, C, M> {
    pub fn new(engine: &'a ProgressEngine<S, C>, messenger: &'a M, config: &Config) -> Self {
        Self {
            engine,
            messenger,
            cron_secret: config.cron.secret.clone(),
            timeout: Duration::from_secs(config.delivery.timeout_secs),
        }
    }

    /// Send today's card to every user inside their morning window.
    pub async fn daily(&self, secret: Option<&str>) -> Result<SweepReport> {
        verify_cron_secret(secret, &self.cron_secret)?;
        let users = self.engine.users()?;
        let now = self.engine.now();

        let mut report = SweepReport::default();
        for user in &users {
            report.evaluated += 1;
            match self.daily_for(user, now).await {
                Ok(UserOutcome::Sent) => report.sent += 1,
                Ok(UserOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    warn!(user_id = user.id, error = %e, "daily card failed");
                    report.failed += 1;
                }
            }
        }
        info!(?report, "daily sweep finished");
        Ok(report)
    }

    /// Nudge every user inside their evening window who has not read today.
    pub async fn nudge(&self, secret: Option<&str>) -> Result<SweepReport> {
        verify_cron_secret(secret, &self.cron_secret)?;
        let users = self.engine.users()?;
        let now = self.engine.now();

        let mut report = SweepReport::default();
        for user in &users {
            report.evaluated += 1;
            match self.nudge_for(user, now).await {
                Ok(UserOutcome::Sent) => report.sent += 1,
                Ok(UserOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    warn!(user_id = user.id, error = %e, "nudge failed");
                    report.failed += 1;
                }
            }
        }
        info!(?report, "nudge sweep finished");
        Ok(report)
    }

    async fn daily_for(&self, user: &User, now: DateTime<Utc>) -> Result<UserOutcome> {
        if !self.engine.should_send_daily(user, now) {
            return Ok(UserOutcome::Skipped);
        }
        let Some(card) = self.engine.daily_card(user)? else {
            debug!(user_id = user.id, pointer = %user.pointer, "no plan entry at pointer");
            return Ok(UserOutcome::Skipped);
        };

        self.send(&Message::daily_card(user.id, &card)).await?;
        self.engine.mark_daily_sent(user, now)?;
        debug!(user_id = user.id, "daily card sent");
        Ok(UserOutcome::Sent)
    }

    async fn nudge_for(&self, user: &User, now: DateTime<Utc>) -> Result<UserOutcome> {
        if !self.engine.should_send_nudge(user, now)? {
            return Ok(UserOutcome::Skipped);
        }

        self.send(&Message::nudge(user.id)).await?;
        self.engine.record_nudge_sent(user, now)?;
        debug!(user_id = user.id, "nudge sent");
        Ok(UserOutcome::Sent)
    }

    async fn send(&self, message: &Message) -> Result<(), DeliveryError> {
        match tokio::time::timeout(self.timeout, self.messenger.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}
