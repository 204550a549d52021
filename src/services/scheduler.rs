use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use teloxide::{Bot, prelude::*};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::utils::datetime::format_datetime;

/// Units accepted by the relative scheduling shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Maps a single-character unit token (Cyrillic or Latin) to its unit.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "с" | "s" => Some(Self::Seconds),
            "м" | "m" => Some(Self::Minutes),
            "ч" | "h" => Some(Self::Hours),
            "д" | "d" => Some(Self::Days),
            _ => None,
        }
    }

    fn seconds(self) -> i64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 3_600,
            Self::Days => 86_400,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("{} is already in the past", format_datetime(.0))]
    PastTime(DateTime<Tz>),
    #[error("the delay must be a positive number, got {0}")]
    InvalidAmount(i64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CancelError {
    #[error("no timer with id {0}")]
    NotFound(u64),
    #[error("timer {0} belongs to another user")]
    NotOwner(u64),
}

/// Delivery failure reported by a [`ReminderSink`].
#[derive(Debug, Error)]
#[error("failed to deliver reminder: {0}")]
pub struct TransportError(pub String);

/// Outbound channel for due reminders. Production sends through the Bot API;
/// tests substitute a recording implementation.
#[async_trait]
pub trait ReminderSink: Send + Sync {
    async fn deliver(&self, chat_id: ChatId, text: String) -> Result<(), TransportError>;
}

/// Sends reminders as plain Telegram messages.
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReminderSink for TelegramSink {
    async fn deliver(&self, chat_id: ChatId, text: String) -> Result<(), TransportError> {
        self.bot
            .send_message(chat_id, text)
            .await
            .map(|_| ())
            .map_err(|e| TransportError(e.to_string()))
    }
}

/// Receipt for a newly armed timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTimer {
    pub id: u64,
    pub fire_at: DateTime<Tz>,
}

/// What a successful cancellation removed, echoed back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelledTimer {
    pub id: u64,
    pub text: String,
    pub fire_at: DateTime<Tz>,
}

struct Timer {
    owner: UserId,
    chat_id: ChatId,
    display_name: String,
    text: String,
    fire_at: DateTime<Tz>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    timers: HashMap<u64, Timer>,
}

/// In-process registry of one-shot reminders.
///
/// Each timer is a spawned task sleeping until its fire time. Ids grow
/// monotonically and are never reused while the process lives; nothing is
/// persisted, so a restart forgets all pending timers.
#[derive(Clone)]
pub struct TimerScheduler {
    registry: Arc<Mutex<Registry>>,
    sink: Arc<dyn ReminderSink>,
    timezone: Tz,
}

impl TimerScheduler {
    pub fn new(sink: Arc<dyn ReminderSink>, timezone: Tz) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            sink,
            timezone,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Current wall-clock time in the bot's timezone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    /// Arms a timer for an absolute moment, which must be strictly in the
    /// future.
    pub async fn schedule_at(
        &self,
        owner: UserId,
        chat_id: ChatId,
        display_name: &str,
        text: &str,
        fire_at: DateTime<Tz>,
    ) -> Result<ScheduledTimer, ScheduleError> {
        let now = self.now();
        if fire_at <= now {
            return Err(ScheduleError::PastTime(fire_at));
        }
        let delay = (fire_at - now).to_std().unwrap_or_default();
        Ok(self.arm(owner, chat_id, display_name, text, fire_at, delay).await)
    }

    /// Arms a timer a positive number of units from now.
    pub async fn schedule_in(
        &self,
        owner: UserId,
        chat_id: ChatId,
        display_name: &str,
        text: &str,
        amount: i64,
        unit: TimeUnit,
    ) -> Result<ScheduledTimer, ScheduleError> {
        if amount <= 0 {
            return Err(ScheduleError::InvalidAmount(amount));
        }
        let seconds = amount
            .checked_mul(unit.seconds())
            .ok_or(ScheduleError::InvalidAmount(amount))?;
        let fire_at = Duration::try_seconds(seconds)
            .and_then(|delay| self.now().checked_add_signed(delay))
            .ok_or(ScheduleError::InvalidAmount(amount))?;
        let delay = std::time::Duration::from_secs(seconds as u64);
        Ok(self.arm(owner, chat_id, display_name, text, fire_at, delay).await)
    }

    /// Cancels a pending timer. Only the owner may cancel; anyone else gets
    /// `NotOwner` and the timer stays armed.
    pub async fn cancel(&self, id: u64, requester: UserId) -> Result<CancelledTimer, CancelError> {
        let mut registry = self.registry.lock().await;
        let timer = registry
            .timers
            .remove(&id)
            .ok_or(CancelError::NotFound(id))?;
        if timer.owner != requester {
            registry.timers.insert(id, timer);
            return Err(CancelError::NotOwner(id));
        }
        timer.task.abort();
        tracing::debug!("Cancelled timer {} for user {}", id, requester);
        Ok(CancelledTimer {
            id,
            text: timer.text,
            fire_at: timer.fire_at,
        })
    }

    pub async fn pending_count(&self) -> usize {
        self.registry.lock().await.timers.len()
    }

    async fn arm(
        &self,
        owner: UserId,
        chat_id: ChatId,
        display_name: &str,
        text: &str,
        fire_at: DateTime<Tz>,
        delay: std::time::Duration,
    ) -> ScheduledTimer {
        // Holding the lock across the spawn keeps a zero-delay task from
        // looking itself up before it has been inserted.
        let mut registry = self.registry.lock().await;
        registry.next_id += 1;
        let id = registry.next_id;

        let task = {
            let registry = Arc::clone(&self.registry);
            let sink = Arc::clone(&self.sink);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                deliver_due(id, registry, sink).await;
            })
        };

        registry.timers.insert(
            id,
            Timer {
                owner,
                chat_id,
                display_name: display_name.to_string(),
                text: text.to_string(),
                fire_at,
                task,
            },
        );
        tracing::debug!("Armed timer {} to fire at {}", id, format_datetime(&fire_at));
        ScheduledTimer { id, fire_at }
    }
}

async fn deliver_due(id: u64, registry: Arc<Mutex<Registry>>, sink: Arc<dyn ReminderSink>) {
    // Removing before sending makes delivery at-most-once: a send that fails
    // is logged, never retried.
    let timer = {
        let mut registry = registry.lock().await;
        registry.timers.remove(&id)
    };

    // Cancelled between expiry and lock acquisition
    let Some(timer) = timer else { return };

    let message = format!(
        "🔔 {}: {} (scheduled for {})",
        timer.display_name,
        timer.text,
        format_datetime(&timer.fire_at)
    );
    match sink.deliver(timer.chat_id, message).await {
        Ok(()) => tracing::info!("Delivered timer {} to chat {}", id, timer.chat_id),
        Err(e) => tracing::error!("Failed to deliver timer {}: {}", id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_tokens() {
        assert_eq!(TimeUnit::from_token("с"), Some(TimeUnit::Seconds));
        assert_eq!(TimeUnit::from_token("м"), Some(TimeUnit::Minutes));
        assert_eq!(TimeUnit::from_token("ч"), Some(TimeUnit::Hours));
        assert_eq!(TimeUnit::from_token("д"), Some(TimeUnit::Days));
        assert_eq!(TimeUnit::from_token("s"), Some(TimeUnit::Seconds));
        assert_eq!(TimeUnit::from_token("m"), Some(TimeUnit::Minutes));
        assert_eq!(TimeUnit::from_token("h"), Some(TimeUnit::Hours));
        assert_eq!(TimeUnit::from_token("d"), Some(TimeUnit::Days));
        assert_eq!(TimeUnit::from_token("x"), None);
        assert_eq!(TimeUnit::from_token("мм"), None);
        assert_eq!(TimeUnit::from_token(""), None);
    }

    #[test]
    fn test_unit_seconds() {
        assert_eq!(TimeUnit::Seconds.seconds(), 1);
        assert_eq!(TimeUnit::Minutes.seconds(), 60);
        assert_eq!(TimeUnit::Hours.seconds(), 3_600);
        assert_eq!(TimeUnit::Days.seconds(), 86_400);
    }
}
