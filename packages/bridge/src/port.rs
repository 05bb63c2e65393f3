use crate::error::BridgeError;
use crate::protocol::Envelope;
use tokio::sync::mpsc;

/// Create two connected ports
///
/// Text sent on one end arrives on the other in send order.
pub fn pair() -> (Port, Port) {
    let (a_tx, a_rx) = mpsc::unbounded_channel();
    let (b_tx, b_rx) = mpsc::unbounded_channel();

    (
        Port {
            sender: PortSender { tx: a_tx },
            receiver: PortReceiver { rx: b_rx },
        },
        Port {
            sender: PortSender { tx: b_tx },
            receiver: PortReceiver { rx: a_rx },
        },
    )
}

/// One end of a bidirectional text channel
#[derive(Debug)]
pub struct Port {
    sender: PortSender,
    receiver: PortReceiver,
}

impl Port {
    pub fn send(&self, envelope: &Envelope) -> Result<(), BridgeError> {
        self.sender.send(envelope)
    }

    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    pub fn sender(&self) -> PortSender {
        self.sender.clone()
    }

    pub fn split(self) -> (PortSender, PortReceiver) {
        (self.sender, self.receiver)
    }
}

#[derive(Debug, Clone)]
pub struct PortSender {
    tx: mpsc::UnboundedSender<String>,
}

impl PortSender {
    /// Encode and send. At most once: nothing is retried.
    pub fn send(&self, envelope: &Envelope) -> Result<(), BridgeError> {
        let raw = envelope.encode()?;
        self.send_raw(raw)
    }

    pub fn send_raw(&self, raw: String) -> Result<(), BridgeError> {
        self.tx.send(raw).map_err(|_| BridgeError::Disconnected)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug)]
pub struct PortReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

impl PortReceiver {
    /// Next raw message, or `None` once the peer is gone
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Message, Origin};

    #[tokio::test]
    async fn test_pair_delivers_in_order() {
        let (left, mut right) = pair();

        for revision in 1..=3 {
            left.send(&Envelope::new(Origin::editor("e"), revision, Message::Undo {}))
                .unwrap();
        }

        for expected in 1..=3 {
            let raw = right.recv().await.unwrap();
            assert_eq!(Envelope::decode(&raw).unwrap().revision, expected);
        }
    }

    #[tokio::test]
    async fn test_send_to_dropped_peer_fails() {
        let (left, right) = pair();
        drop(right);

        let err = left
            .send(&Envelope::new(Origin::editor("e"), 0, Message::ResyncRequest {}))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Disconnected));
    }
}
