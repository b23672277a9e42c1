//! Listing streams that run on their own producer thread
//!
//! A [`Listing`] walks a backend on a background thread and hands entries
//! over a rendezvous channel, so the producer never runs more than one entry
//! ahead of its consumer. Dropping the `Listing` disconnects the channel; the
//! producer notices on its next send, stops, and drops the backend walker
//! along with any handle it holds.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use tracing::{trace, warn};

use crate::entry::Entry;
use crate::error::{PlanError, Result};
use crate::location::ObjectUrl;
use crate::storage::Storage;

/// Lazily produced listing of one root
pub struct Listing {
    receiver: Receiver<Result<Entry>>,
}

impl Listing {
    /// Start listing `url` on a producer thread
    pub fn spawn(storage: Arc<dyn Storage>, url: ObjectUrl, recursive: bool) -> Self {
        let root = url.to_string();
        let (sender, receiver) = crossbeam_channel::bounded(0);

        let spawned = thread::Builder::new()
            .name(format!("list:{root}"))
            .spawn(move || produce(&*storage, &url, recursive, &sender));

        if let Err(e) = spawned {
            warn!(root = %root, error = %e, "unable to start listing thread");
            // The producer closure (and its sender) is gone; report through a
            // fresh buffered channel instead.
            let (sender, receiver) = crossbeam_channel::bounded(1);
            let _ = sender.send(Err(PlanError::listing(root.clone(), e)));
            return Self { receiver };
        }

        Self { receiver }
    }
}

fn produce(storage: &dyn Storage, url: &ObjectUrl, recursive: bool, sender: &Sender<Result<Entry>>) {
    for event in storage.list(url, recursive) {
        if sender.send(event).is_err() {
            trace!(root = %url, "listing consumer went away");
            return;
        }
    }
    trace!(root = %url, "listing finished");
}

impl Iterator for Listing {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}
