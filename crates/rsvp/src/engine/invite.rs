//! Invitation workflow: local write-through, then a best-effort remote invite.

use tracing::{debug, info, warn};

use rsvp_core::friday::{admission, normalize_email, Admission, Friday, Identity};
use rsvp_core::gateway::GatewayError;
use rsvp_core::storage::RepositoryError;

use super::{Engine, EngineError, Result};

impl Engine {
    /// Records `email` as a guest of `friday`, then invites them to the
    /// remote event.
    ///
    /// The local write is kept even when the remote invite fails. A missing
    /// remote event is created and the invite retried once; losing that
    /// creation to a concurrent caller still retries the invite.
    pub async fn create_and_invite(&self, friday: &Friday, email: &str, name: &str) -> Result<()> {
        let email = normalize_email(email);
        let friday_id = friday.id();

        if friday.is_full() && !friday.has_guest(&email) {
            return Err(EngineError::FridayIsFull(friday_id.to_string()));
        }

        self.store.add_friend_to_friday(&email, friday).await?;
        debug!(friday = %friday_id, email = %email, "Guest recorded");

        let Some(calendar) = self.calendar() else {
            return Ok(());
        };

        let event_id = friday_id.event_id();
        match calendar.invite_to_event(&event_id, &email, name).await {
            Ok(()) => {}
            Err(GatewayError::EventNotFound(_)) => {
                info!(event_id = %event_id, "Creating missing calendar event");
                match calendar.create_event(&self.event_for(friday)?).await {
                    Ok(()) => {}
                    Err(GatewayError::EventAlreadyExists(_)) => {
                        debug!(event_id = %event_id, "Calendar event created concurrently");
                    }
                    Err(err) => return Err(err.into()),
                }
                calendar.invite_to_event(&event_id, &email, name).await?;
            }
            Err(err) => {
                warn!(event_id = %event_id, email = %email, error = %err, "Calendar invite failed");
                return Err(err.into());
            }
        }

        info!(event_id = %event_id, email = %email, "Guest invited");
        Ok(())
    }

    /// Registers the caller as a friend, or refreshes their name.
    pub async fn register(&self, identity: &Identity) -> Result<()> {
        self.store
            .add_friend(&identity.email, &identity.given_name)
            .await?;
        Ok(())
    }

    /// RSVPs the caller, or with `plus_one` an existing friend, to a Friday.
    ///
    /// Hosts may RSVP to a slot that has no Friday yet; it is created with the
    /// default capacity.
    pub async fn rsvp(
        &self,
        identity: &Identity,
        friday_id: &str,
        plus_one: Option<&str>,
    ) -> Result<()> {
        let (_, date) = Self::parse_friday_id(friday_id)?;

        let (email, name) = match plus_one {
            Some(guest) => {
                if !identity.can_plus_one() {
                    return Err(EngineError::not_allowed(format!(
                        "{} may not RSVP for others",
                        identity.email
                    )));
                }
                let friend = self.store.get_friend_by_email(&normalize_email(guest)).await?;
                (friend.email, friend.name)
            }
            None => {
                self.register(identity).await?;
                (identity.email.clone(), identity.given_name.clone())
            }
        };

        let friday = match self.store.get_friday(date).await {
            Ok(friday) => friday,
            Err(RepositoryError::NotFound { .. }) if identity.is_host() => {
                info!(friday = %friday_id, host = %identity.email, "Scheduling Friday on RSVP");
                self.store.add_friday(&self.new_friday(date)).await?;
                self.store.get_friday(date).await?
            }
            Err(err) => return Err(err.into()),
        };

        match admission(identity, &friday) {
            Admission::Allowed => {}
            Admission::WrongGroup => {
                return Err(EngineError::not_allowed(format!(
                    "Friday {friday_id} is restricted to another group"
                )))
            }
            Admission::Disabled => {
                return Err(EngineError::not_allowed(format!(
                    "Friday {friday_id} is closed"
                )))
            }
        }

        self.create_and_invite(&friday, &email, &name).await
    }
}
