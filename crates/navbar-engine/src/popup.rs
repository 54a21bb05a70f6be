use std::{sync::Arc, time::Duration};

use navbar_protocol::{HostEvent, TargetId};
use parking_lot::Mutex;
use tracing::debug;

use crate::{HostBridge, Result};

/// Length of the popup close transition.
pub const POPUP_CLOSE_DELAY: Duration = Duration::from_millis(200);

/// Tracks the single open popup.
#[derive(Clone)]
pub struct PopupTracker {
    open: Arc<Mutex<Option<usize>>>,
    host: HostBridge,
}

impl PopupTracker {
    pub fn new(host: HostBridge) -> Self {
        Self {
            open: Arc::new(Mutex::new(None)),
            host,
        }
    }

    /// Route whose popup is currently open.
    pub fn open_route(&self) -> Option<usize> {
        *self.open.lock()
    }

    /// Open the popup of `route`, closing any other popup first.
    pub fn open(&self, route: usize, target: &TargetId) -> Result<()> {
        let previous = self.open.lock().replace(route);
        if let Some(prev) = previous
            && prev != route
        {
            self.send_close(prev)?;
        }
        debug!(route, %target, "popup_open");
        self.host.send(HostEvent::OpenPopup {
            route,
            target: target.clone(),
        })
    }

    /// Close the popup of `route` if it is the open one.
    pub fn close(&self, route: usize) -> Result<()> {
        {
            let mut open = self.open.lock();
            if *open != Some(route) {
                return Ok(());
            }
            *open = None;
        }
        self.send_close(route)
    }

    /// Close whichever popup is open.
    pub fn close_any(&self) -> Result<()> {
        match self.open.lock().take() {
            Some(route) => self.send_close(route),
            None => Ok(()),
        }
    }

    fn send_close(&self, route: usize) -> Result<()> {
        debug!(route, "popup_close");
        self.host.send(HostEvent::ClosePopup { route })?;
        self.host
            .send_later(POPUP_CLOSE_DELAY, HostEvent::PopupRemoved { route });
        Ok(())
    }
}
