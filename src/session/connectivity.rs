//! Connectivity signal
//!
//! A boolean online/offline observable backed by a `tokio::sync::watch`
//! channel. The platform layer owns the [`Connectivity`] and flips it;
//! sessions hold receivers.

use tokio::sync::watch;

#[derive(Debug)]
pub struct Connectivity {
    sender: watch::Sender<bool>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self { sender }
    }

    pub fn online() -> Self {
        Self::new(true)
    }

    pub fn set_online(&self, online: bool) {
        self.sender.send_if_modified(|current| {
            let changed = *current != online;
            *current = online;
            changed
        });
    }

    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::online()
    }
}
