use crate::error::BridgeError;
use crate::protocol::{Envelope, Origin};

/// Decodes and authenticates inbound text
///
/// Only envelopes from the configured counterpart get through. Anything
/// else is logged and dropped; callers never see an error.
#[derive(Debug, Clone)]
pub struct Inbox {
    counterpart: Origin,
}

impl Inbox {
    pub fn new(counterpart: Origin) -> Self {
        Self { counterpart }
    }

    pub fn counterpart(&self) -> &Origin {
        &self.counterpart
    }

    pub fn accept(&self, raw: &str) -> Option<Envelope> {
        match self.check(raw) {
            Ok(envelope) => Some(envelope),
            Err(err) => {
                tracing::warn!(%err, "dropping inbound envelope");
                None
            }
        }
    }

    /// Like [`accept`](Self::accept), but reports why an envelope was refused
    pub fn check(&self, raw: &str) -> Result<Envelope, BridgeError> {
        let envelope = Envelope::decode(raw)?;

        if envelope.origin != self.counterpart {
            return Err(BridgeError::ForeignOrigin {
                expected: self.counterpart.clone(),
                actual: envelope.origin,
            });
        }

        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Message;

    fn raw_from(origin: Origin) -> String {
        Envelope::new(origin, 1, Message::ResyncRequest {})
            .encode()
            .unwrap()
    }

    #[test]
    fn test_accepts_counterpart() {
        let inbox = Inbox::new(Origin::preview("pv-1"));
        let envelope = inbox.accept(&raw_from(Origin::preview("pv-1"))).unwrap();
        assert_eq!(envelope.message, Message::ResyncRequest {});
    }

    #[test]
    fn test_rejects_wrong_session() {
        let inbox = Inbox::new(Origin::preview("pv-1"));
        assert!(inbox.accept(&raw_from(Origin::preview("pv-2"))).is_none());
    }

    #[test]
    fn test_rejects_wrong_context() {
        let inbox = Inbox::new(Origin::preview("pv-1"));
        let err = inbox.check(&raw_from(Origin::editor("pv-1"))).unwrap_err();
        assert!(matches!(err, BridgeError::ForeignOrigin { .. }));
    }

    #[test]
    fn test_rejects_garbage() {
        let inbox = Inbox::new(Origin::preview("pv-1"));
        assert!(inbox.accept("not json").is_none());
        assert!(inbox.accept(r#"{"type":"UNDO","payload":{}}"#).is_none());
    }
}
