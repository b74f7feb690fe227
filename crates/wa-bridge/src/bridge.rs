//! Inbound pipeline: admin gate -> translator -> dispatcher

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use wa_core::Config;

use crate::admin::AdminGate;
use crate::dispatcher::WebhookDispatcher;
use crate::error::Result;
use crate::media::MediaStore;
use crate::message::InboundMessage;
use crate::session::WhatsAppSession;
use crate::translator::InboundTranslator;

/// Processes inbound WhatsApp messages
pub struct WhatsAppBridge {
    session: Arc<dyn WhatsAppSession>,
    gate: AdminGate,
    translator: InboundTranslator,
    dispatcher: WebhookDispatcher,
}

impl WhatsAppBridge {
    pub fn new(
        session: Arc<dyn WhatsAppSession>,
        gate: AdminGate,
        media: MediaStore,
        dispatcher: WebhookDispatcher,
        account_sid: &str,
    ) -> Self {
        let translator = InboundTranslator::new(Arc::clone(&session), media, account_sid);

        Self {
            session,
            gate,
            translator,
            dispatcher,
        }
    }

    /// Build the pipeline from configuration
    pub fn from_config(config: &Config, session: Arc<dyn WhatsAppSession>) -> Self {
        Self::new(
            session,
            AdminGate::new(&config.admin_sender),
            MediaStore::new(&config.media.dir, &config.media.root),
            WebhookDispatcher::new(&config.webhook.endpoint, &config.webhook.shared_secret),
            &config.webhook.account_sid,
        )
    }

    /// Run one message through the pipeline
    pub async fn process(&self, message: &InboundMessage) -> Result<()> {
        if !self.gate.check(self.session.as_ref(), message).await? {
            debug!("Admin message {} handled", message.id);
            return Ok(());
        }

        let form = self.translator.translate(message).await?;
        self.dispatcher.dispatch(&form).await
    }

    /// Process a message, logging and discarding any failure
    pub async fn handle(&self, message: InboundMessage) {
        if let Err(e) = self.process(&message).await {
            error!(
                message_id = %message.id,
                from = %message.from,
                error = %e,
                "Failed to process inbound message: {:?}",
                message
            );
        }
    }

    /// Consume inbound messages until the channel closes
    ///
    /// Each message is handled in its own task; messages are not ordered
    /// relative to each other.
    pub async fn run(self: Arc<Self>, mut receiver: mpsc::Receiver<InboundMessage>) {
        info!("WhatsApp bridge started");

        while let Some(message) = receiver.recv().await {
            let bridge = Arc::clone(&self);
            tokio::spawn(async move {
                bridge.handle(message).await;
            });
        }

        info!("Inbound channel closed, WhatsApp bridge stopped");
    }
}
