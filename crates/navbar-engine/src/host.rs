use std::time::Duration;

use navbar_protocol::{HapticKind, HostEvent, bus::HostTx};
use tracing::{debug, trace};

use crate::{Error, Result};

/// Sends side-effect requests to the host dashboard.
#[derive(Clone)]
pub struct HostBridge {
    tx: HostTx,
}

impl HostBridge {
    /// Create a bridge from a host event channel.
    pub fn new(tx: HostTx) -> Self {
        Self { tx }
    }

    /// Send an event now.
    pub fn send(&self, event: HostEvent) -> Result<()> {
        trace!(?event, "host_event");
        self.tx.send(event).map_err(|_| Error::ChannelClosed)
    }

    /// Send an event after `delay`. A closed channel at that point is only logged.
    pub fn send_later(&self, delay: Duration, event: HostEvent) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(?event, "host_event_delayed");
            if tx.send(event).is_err() {
                debug!("host channel closed before delayed event");
            }
        });
    }

    /// Request selection haptic feedback.
    pub fn haptic(&self) -> Result<()> {
        self.send(HostEvent::Haptic {
            kind: HapticKind::Selection,
        })
    }

    /// True once the host has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
