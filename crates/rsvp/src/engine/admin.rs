//! Host administration of Fridays and friends, and per-caller preferences.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use rsvp_core::friday::{
    normalize_email, Friday, FridayIdError, FridayUpdate, Friend, Identity, Preferences,
};
use rsvp_core::schedule::is_slot;
use rsvp_core::gateway::GatewayError;
use rsvp_core::storage::RepositoryError;

use super::{Engine, EngineError, Result};

impl Engine {
    fn require_host(identity: &Identity) -> Result<()> {
        if identity.is_host() {
            Ok(())
        } else {
            Err(EngineError::not_allowed(format!(
                "{} is not a host",
                identity.email
            )))
        }
    }

    /// Tolerates a remote event that was never created.
    fn ignore_missing_event(result: std::result::Result<(), GatewayError>) -> Result<()> {
        match result {
            Err(GatewayError::EventNotFound(event_id)) => {
                warn!(event_id = %event_id, "No calendar event to update");
                Ok(())
            }
            other => Ok(other?),
        }
    }

    /// Schedules a Friday with the default capacity. No-op if one exists.
    ///
    /// `date` must be a weekly slot start in the configured timezone.
    pub async fn add_friday(&self, identity: &Identity, date: DateTime<Utc>) -> Result<Friday> {
        Self::require_host(identity)?;
        if !is_slot(&date, self.config.timezone) {
            return Err(FridayIdError::NotASlot(date.timestamp()).into());
        }
        self.store.add_friday(&self.new_friday(date)).await?;
        info!(friday = %date.timestamp(), host = %identity.email, "Friday scheduled");
        Ok(self.store.get_friday(date).await?)
    }

    /// Applies host edits to a Friday. The guest list is never touched.
    pub async fn update_friday(
        &self,
        identity: &Identity,
        friday_id: &str,
        update: &FridayUpdate,
    ) -> Result<Friday> {
        Self::require_host(identity)?;
        let (_, date) = Self::parse_friday_id(friday_id)?;

        let mut friday = self.store.get_friday(date).await?;
        update.apply(&mut friday);
        self.store.update_friday(&friday).await?;
        info!(friday = %friday_id, host = %identity.email, "Friday updated");

        Ok(self.store.get_friday(date).await?)
    }

    /// Opens or closes a Friday for RSVP, scheduling it first if needed, and
    /// mirrors the change onto the remote event.
    pub async fn set_enabled(
        &self,
        identity: &Identity,
        friday_id: &str,
        enabled: bool,
    ) -> Result<Friday> {
        Self::require_host(identity)?;
        let (id, date) = Self::parse_friday_id(friday_id)?;

        let mut friday = match self.store.get_friday(date).await {
            Ok(friday) => friday,
            Err(RepositoryError::NotFound { .. }) => {
                self.store.add_friday(&self.new_friday(date)).await?;
                self.store.get_friday(date).await?
            }
            Err(err) => return Err(err.into()),
        };
        friday.enabled = enabled;
        self.store.update_friday(&friday).await?;
        info!(friday = %id, enabled, "Friday availability changed");

        if let Some(calendar) = self.calendar() {
            let event_id = id.event_id();
            let result = if enabled {
                calendar.activate_event(&event_id).await
            } else {
                calendar.cancel_event(&event_id).await
            };
            Self::ignore_missing_event(result)?;
        }

        Ok(friday)
    }

    /// Deletes a Friday with its guest list and cancels the remote event.
    pub async fn remove_friday(&self, identity: &Identity, friday_id: &str) -> Result<()> {
        Self::require_host(identity)?;
        let (id, date) = Self::parse_friday_id(friday_id)?;

        self.store.remove_friday(date).await?;
        info!(friday = %id, host = %identity.email, "Friday removed");

        match self.calendar() {
            Some(calendar) => Self::ignore_missing_event(calendar.cancel_event(&id.event_id()).await),
            None => Ok(()),
        }
    }

    pub async fn add_friend(&self, identity: &Identity, email: &str, name: &str) -> Result<Friend> {
        Self::require_host(identity)?;
        let email = normalize_email(email);
        self.store.add_friend(&email, name).await?;
        Ok(self.store.get_friend_by_email(&email).await?)
    }

    pub async fn remove_friend(&self, identity: &Identity, email: &str) -> Result<()> {
        Self::require_host(identity)?;
        self.store.remove_friend(&normalize_email(email)).await?;
        Ok(())
    }

    pub async fn list_friends(&self, identity: &Identity) -> Result<Vec<Friend>> {
        Self::require_host(identity)?;
        Ok(self.store.list_friends().await?)
    }

    /// The caller's preferences; empty if they never registered.
    pub async fn preferences(&self, identity: &Identity) -> Result<Preferences> {
        match self.store.get_preferences(&identity.email).await {
            Ok(preferences) => Ok(preferences),
            Err(RepositoryError::NotFound { .. }) => Ok(Preferences::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Replaces the caller's preferences, registering them if needed.
    pub async fn set_preferences(&self, identity: &Identity, preferences: &Preferences) -> Result<()> {
        self.register(identity).await?;
        self.store
            .set_preferences(&identity.email, preferences)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rsvp_core::friday::Topping;
    use rsvp_core::gateway::{CalendarGateway, EventStatus};
    use rsvp_core::storage::AttendanceStore;

    use super::super::fixtures::{guest, host, next_slot, next_week, Fixture};
    use super::*;

    #[tokio::test]
    async fn test_admin_requires_host() {
        let fixture = Fixture::new();
        let alice = guest("alice");

        assert!(matches!(
            fixture.engine.add_friday(&alice, next_week()).await,
            Err(EngineError::NotAllowed(_))
        ));
        assert!(matches!(
            fixture.engine.list_friends(&alice).await,
            Err(EngineError::NotAllowed(_))
        ));
        assert!(matches!(
            fixture.engine.remove_friend(&alice, "bob@example.com").await,
            Err(EngineError::NotAllowed(_))
        ));
    }

    #[tokio::test]
    async fn test_add_friday_uses_default_capacity() {
        let fixture = Fixture::new();

        let friday = fixture.engine.add_friday(&host("hank"), next_slot()).await.unwrap();

        assert_eq!(friday.max_guests, 10);
        assert!(friday.enabled);
        assert!(friday.guests.is_empty());
    }

    #[tokio::test]
    async fn test_add_friday_rejects_off_schedule_date() {
        let fixture = Fixture::new();
        let date = next_slot() + chrono::Duration::hours(1);

        let result = fixture.engine.add_friday(&host("hank"), date).await;

        assert_eq!(
            result,
            Err(EngineError::InvalidFridayId(FridayIdError::NotASlot(date.timestamp())))
        );
        assert!(!fixture.store.does_friday_exist(date).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_friday_keeps_guests() {
        let fixture = Fixture::new();
        let hank = host("hank");
        let friday = fixture.engine.add_friday(&hank, next_slot()).await.unwrap();
        fixture
            .engine
            .rsvp(&guest("alice"), &friday.id().to_string(), None)
            .await
            .unwrap();

        let update = FridayUpdate {
            group: Some(Some("ravens".to_string())),
            details: Some(Some("Bring a chair".to_string())),
            max_guests: Some(4),
            enabled: None,
        };
        let updated = fixture
            .engine
            .update_friday(&hank, &friday.id().to_string(), &update)
            .await
            .unwrap();

        assert_eq!(updated.group.as_deref(), Some("ravens"));
        assert_eq!(updated.details.as_deref(), Some("Bring a chair"));
        assert_eq!(updated.max_guests, 4);
        assert_eq!(updated.guests, vec!["alice@example.com"]);
    }

    #[tokio::test]
    async fn test_set_enabled_creates_and_mirrors_remotely() {
        let fixture = Fixture::new();
        let hank = host("hank");
        let date = next_week();
        let id = date.timestamp().to_string();

        let friday = fixture.engine.set_enabled(&hank, &id, false).await.unwrap();
        assert!(!friday.enabled);
        assert!(!fixture.store.get_friday(date).await.unwrap().enabled);

        fixture.engine.rsvp(&hank, &id, None).await.unwrap();
        fixture.engine.set_enabled(&hank, &id, false).await.unwrap();
        let event = fixture.calendar.get_event(&id).await.unwrap();
        assert_eq!(event.status, EventStatus::Cancelled);

        fixture.engine.set_enabled(&hank, &id, true).await.unwrap();
        let event = fixture.calendar.get_event(&id).await.unwrap();
        assert_eq!(event.status, EventStatus::Confirmed);
        assert!(fixture.store.get_friday(date).await.unwrap().enabled);
    }

    #[tokio::test]
    async fn test_remove_friday_cancels_event() {
        let fixture = Fixture::new();
        let hank = host("hank");
        let friday = fixture.engine.add_friday(&hank, next_slot()).await.unwrap();
        let id = friday.id().to_string();
        fixture.engine.rsvp(&hank, &id, None).await.unwrap();

        fixture.engine.remove_friday(&hank, &id).await.unwrap();

        assert!(!fixture.store.does_friday_exist(friday.date).await.unwrap());
        let event = fixture.calendar.get_event(&id).await.unwrap();
        assert_eq!(event.status, EventStatus::Cancelled);

        // Nothing left remotely or locally is still fine.
        fixture.engine.remove_friday(&hank, &next_week().timestamp().to_string()).await.unwrap();
    }

    #[tokio::test]
    async fn test_friend_admin() {
        let fixture = Fixture::new();
        let hank = host("hank");

        let bob = fixture
            .engine
            .add_friend(&hank, " Bob@Example.com ", "Bob")
            .await
            .unwrap();
        assert_eq!(bob.email, "bob@example.com");
        assert_eq!(fixture.engine.list_friends(&hank).await.unwrap(), vec![bob]);

        fixture.engine.remove_friend(&hank, "BOB@example.com").await.unwrap();
        assert!(fixture.engine.list_friends(&hank).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preferences_for_caller() {
        let fixture = Fixture::new();
        let alice = guest("alice");
        assert!(fixture.engine.preferences(&alice).await.unwrap().is_empty());

        let preferences = Preferences {
            toppings: vec![Topping::Mushroom],
            ..Default::default()
        };
        fixture
            .engine
            .set_preferences(&alice, &preferences)
            .await
            .unwrap();

        assert_eq!(fixture.engine.preferences(&alice).await.unwrap(), preferences);
    }
}
