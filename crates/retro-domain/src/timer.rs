use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Board countdown state as stored in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardTimer {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl BoardTimer {
    pub fn arm(&mut self, expiry: DateTime<Utc>) {
        self.running = true;
        self.expiry_date = Some(expiry);
    }

    pub fn clear(&mut self) {
        self.running = false;
        self.expiry_date = None;
    }

    /// Expiry instant of a running countdown.
    pub fn active_expiry(&self) -> Option<DateTime<Utc>> {
        if self.running {
            self.expiry_date
        } else {
            None
        }
    }
}
