//! Admin gate: answers the administrator's ping before normal processing

use tracing::{info, warn};

use crate::error::Result;
use crate::message::{to_contact_id, InboundMessage};
use crate::session::{SendOutcome, WhatsAppSession};

/// Control message (and its reply) recognised from the administrator
pub const ADMIN_PING: &str = "👋";

/// Intercepts control messages from the administrator
#[derive(Debug, Clone)]
pub struct AdminGate {
    admin_id: String,
}

impl AdminGate {
    /// `admin_phone` is digits with an optional leading `+`
    pub fn new(admin_phone: &str) -> Self {
        Self {
            admin_id: to_contact_id(admin_phone),
        }
    }

    pub fn admin_id(&self) -> &str {
        &self.admin_id
    }

    /// Returns `false` when the message was fully handled here
    pub async fn check(
        &self,
        session: &dyn WhatsAppSession,
        message: &InboundMessage,
    ) -> Result<bool> {
        if message.from != self.admin_id || message.body.as_deref() != Some(ADMIN_PING) {
            return Ok(true);
        }

        info!("Answering admin ping from {}", message.from);
        if session.send_text(&message.from, ADMIN_PING).await? == SendOutcome::Rejected {
            warn!("Admin ping reply to {} was rejected", message.from);
        }
        Ok(false)
    }
}
