use std::sync::Arc;

use chrono::{DateTime, Utc};

#[cfg(test)]
use mockall::automock;

pub type DynClock = Arc<dyn Clock + Send + Sync>;

#[cfg_attr(test, automock)]
pub trait Clock {
    fn utc_now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl SystemClock {
    pub fn new_dyn() -> DynClock {
        Arc::new(SystemClock)
    }
}

impl Clock for SystemClock {
    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
