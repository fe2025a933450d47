use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use halo_types::models::MonitorReading;

/// The single process-wide sensor slot. Last writer wins; no history is kept.
#[derive(Clone, Default)]
pub struct MonitorSlot {
    latest: Arc<RwLock<Option<MonitorReading>>>,
}

impl MonitorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a reading stamped with the current time and return it.
    pub async fn report(&self, temperature: f64, humidity: f64) -> MonitorReading {
        let reading = MonitorReading {
            temperature,
            humidity,
            timestamp: Utc::now(),
        };
        *self.latest.write().await = Some(reading.clone());
        reading
    }

    pub async fn current(&self) -> Option<MonitorReading> {
        self.latest.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_until_first_report() {
        let slot = MonitorSlot::new();
        assert!(slot.current().await.is_none());
    }

    #[tokio::test]
    async fn latest_report_overwrites() {
        let slot = MonitorSlot::new();
        slot.report(21.5, 40.0).await;
        let second = slot.report(22.0, 38.5).await;

        let current = slot.current().await.unwrap();
        assert_eq!(current, second);
        assert_eq!(current.temperature, 22.0);
        assert_eq!(current.humidity, 38.5);
    }
}
