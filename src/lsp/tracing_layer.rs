//! Tracing layer that forwards events to LSP window/logMessage.
//!
//! Events recorded before the initialize handshake has completed are dropped:
//! the protocol forbids server notifications before the client's
//! `initialized`. Detaching releases the layer's sender so the stdio writer
//! thread can finish.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Sender;
use lsp_server::{Connection, Message, Notification};
use lsp_types::notification::{LogMessage, Notification as _};
use lsp_types::{LogMessageParams, MessageType};
use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;

/// A tracing layer that sends log messages to the LSP client.
pub struct LspLayer {
    sender: Arc<Mutex<Option<Sender<Message>>>>,
    initialized: Arc<AtomicBool>,
}

/// Handle to mark the LspLayer as initialized or detach it.
#[derive(Clone)]
pub struct LspLayerHandle {
    sender: Arc<Mutex<Option<Sender<Message>>>>,
    initialized: Arc<AtomicBool>,
}

impl LspLayerHandle {
    /// Mark the layer as initialized. Messages will now be sent.
    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::SeqCst);
    }

    /// Stop forwarding and drop the connection sender.
    pub fn detach(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
    }
}

impl LspLayer {
    /// Create a new LSP tracing layer and a handle to control it.
    pub fn new(connection: &Connection) -> (Self, LspLayerHandle) {
        let sender = Arc::new(Mutex::new(Some(connection.sender.clone())));
        let initialized = Arc::new(AtomicBool::new(false));

        let layer = Self {
            sender: Arc::clone(&sender),
            initialized: Arc::clone(&initialized),
        };

        let handle = LspLayerHandle {
            sender,
            initialized,
        };

        (layer, handle)
    }

    fn level_to_message_type(level: &Level) -> MessageType {
        match *level {
            Level::ERROR => MessageType::ERROR,
            Level::WARN => MessageType::WARNING,
            Level::INFO => MessageType::INFO,
            Level::DEBUG | Level::TRACE => MessageType::LOG,
        }
    }
}

/// Collects the message and the structured fields of an event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for LspLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if !self.initialized.load(Ordering::SeqCst) {
            return;
        }

        let metadata = event.metadata();
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut message = if visitor.message.is_empty() {
            metadata.target().to_string()
        } else {
            visitor.message
        };
        message.push_str(&visitor.fields);

        let params = LogMessageParams {
            typ: Self::level_to_message_type(metadata.level()),
            message,
        };
        let notif = Notification::new(LogMessage::METHOD.to_string(), params);
        if let Ok(guard) = self.sender.lock()
            && let Some(sender) = guard.as_ref()
        {
            // The client may already be gone during shutdown.
            let _ = sender.send(Message::Notification(notif));
        }
    }
}
