use bytes::Bytes;

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("channel send failed, peer torn down")]
pub struct SendError;

/// A labeled data channel, reliable or unreliable. The real datagram
/// transport's two negotiated channels both implement this trait; the tick
/// loop and `SignalingStore` never touch the transport library directly, so
/// tests exercise the same code paths against [`InProcessChannel`].
pub trait Channel: Send + Sync {
    fn send(&self, bytes: Bytes) -> Result<(), SendError>;
}

/// A `kanal`-backed channel standing in for a real reliable/unreliable data
/// channel, for the in-process integration test and any tooling that needs
/// to observe what the server sent without a real peer.
pub struct InProcessChannel {
    tx: kanal::Sender<Bytes>,
}

impl InProcessChannel {
    #[must_use]
    pub fn pair() -> (Self, kanal::Receiver<Bytes>) {
        let (tx, rx) = kanal::unbounded();
        (Self { tx }, rx)
    }
}

impl Channel for InProcessChannel {
    fn send(&self, bytes: Bytes) -> Result<(), SendError> {
        match self.tx.try_send(bytes) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(SendError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_process_channel_round_trips() {
        let (chan, rx) = InProcessChannel::pair();
        chan.send(Bytes::from_static(b"hello")).unwrap();
        assert_eq!(rx.try_recv().unwrap().unwrap(), Bytes::from_static(b"hello"));
    }
}
