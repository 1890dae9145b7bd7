use chrono::{DateTime, Utc};
use retro_domain::BoardTimer;
use std::pin::Pin;
use tokio::time::{Instant, Sleep};

/// One-shot countdown derived from a board timer.
///
/// Fires at most once per expiry instant: a snapshot that still carries an
/// expiry that already fired does not re-arm it, a new instant does.
#[derive(Debug, Default)]
pub struct Countdown {
    expiry: Option<DateTime<Utc>>,
    sleep: Option<Pin<Box<Sleep>>>,
    last_fired: Option<DateTime<Utc>>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the timer of the current snapshot.
    pub fn sync(&mut self, timer: &BoardTimer) {
        match timer.active_expiry() {
            Some(expiry) if self.expiry == Some(expiry) => {}
            Some(expiry) if self.last_fired == Some(expiry) => {}
            Some(expiry) => self.arm(expiry),
            None => self.cancel(),
        }
    }

    pub fn arm(&mut self, expiry: DateTime<Utc>) {
        let delay = (expiry - Utc::now()).to_std().unwrap_or_default();
        tracing::debug!("Countdown armed for {} ({:?} left)", expiry, delay);
        self.expiry = Some(expiry);
        self.sleep = Some(Box::pin(tokio::time::sleep_until(Instant::now() + delay)));
    }

    pub fn cancel(&mut self) {
        if self.expiry.take().is_some() {
            tracing::debug!("Countdown cancelled");
        }
        self.sleep = None;
    }

    pub fn is_armed(&self) -> bool {
        self.sleep.is_some()
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// Resolves when the armed countdown runs out, never while disarmed.
    /// Cancel safe.
    pub async fn expired(&mut self) -> DateTime<Utc> {
        let Some(expiry) = self.expiry else {
            return std::future::pending().await;
        };
        let Some(sleep) = self.sleep.as_mut() else {
            return std::future::pending().await;
        };

        sleep.as_mut().await;
        self.sleep = None;
        self.expiry = None;
        self.last_fired = Some(expiry);
        expiry
    }
}
