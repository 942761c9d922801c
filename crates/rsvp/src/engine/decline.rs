//! Decline workflow.

use tracing::{info, warn};

use rsvp_core::friday::{normalize_email, Identity};
use rsvp_core::gateway::GatewayError;

use super::{Engine, EngineError, Result};

impl Engine {
    /// Removes a guest from a Friday, then declines them on the remote event.
    ///
    /// Guests may only decline themselves; hosts may decline anyone. The
    /// remote side is allowed to have lost the event or the attendee.
    pub async fn decline(
        &self,
        identity: &Identity,
        friday_id: &str,
        guest: Option<&str>,
    ) -> Result<()> {
        let (id, date) = Self::parse_friday_id(friday_id)?;
        let email = guest.map_or_else(|| identity.email.clone(), normalize_email);

        if email != identity.email && !identity.is_host() {
            return Err(EngineError::not_allowed(format!(
                "{} may not decline for {email}",
                identity.email
            )));
        }

        let friday = self.store.get_friday(date).await?;
        if !friday.has_guest(&email) {
            return Err(EngineError::NotInvited {
                friday: id.to_string(),
                email,
            });
        }

        self.store.remove_friend_from_friday(&email, date).await?;
        info!(friday = %id, email = %email, "Guest removed");

        let Some(calendar) = self.calendar() else {
            return Ok(());
        };

        match calendar.decline_event(&id.event_id(), &email).await {
            Ok(()) => Ok(()),
            Err(err @ (GatewayError::NotInvited { .. } | GatewayError::EventNotFound(_))) => {
                warn!(event_id = %id, email = %email, error = %err, "Remote decline skipped");
                Ok(())
            }
            Err(err) => Err(EngineError::GatewayFailure(err)),
        }
    }
}
