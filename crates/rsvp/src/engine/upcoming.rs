use std::collections::BTreeMap;

use chrono::Utc;

use rsvp_core::friday::{visible_fridays, Friday, Identity};
use rsvp_core::schedule::upcoming_slots;
use rsvp_core::storage::RepositoryError;

use super::{Engine, Result};

impl Engine {
    /// Fridays in the lookahead window the caller may see, ascending.
    ///
    /// Hosts additionally get every weekly slot that has not been scheduled
    /// yet, as a disabled Friday they can open.
    pub async fn upcoming_for(&self, identity: &Identity) -> Result<Vec<Friday>> {
        let days = self.config.lookahead_days;
        let mut by_date: BTreeMap<i64, Friday> = self
            .store
            .get_upcoming_fridays(days)
            .await?
            .into_iter()
            .map(|friday| (friday.date.timestamp(), friday))
            .collect();

        if identity.is_host() {
            let slots = upcoming_slots(Utc::now(), days, self.config.timezone)
                .map_err(|err| RepositoryError::InvalidData(err.to_string()))?;
            for slot in slots {
                by_date.entry(slot.timestamp()).or_insert_with(|| {
                    let mut friday = self.new_friday(slot);
                    friday.enabled = false;
                    friday
                });
            }
        }

        Ok(visible_fridays(identity, by_date.into_values().collect()))
    }
}
