//! Background compression worker
//!
//! One named thread drains a channel of freshly recorded payloads and swaps
//! each one's flat bytes for the run-length form. The driving thread never
//! waits on it except through [`Compressor::wait_idle`].

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, trace, warn};

use super::tree::Payload;
use crate::codec::{self, FLAT};

/// Count of submitted payloads the worker has not finished with.
type Pending = Arc<(Mutex<usize>, Condvar)>;

/// Handle to the compression thread.
///
/// Dropping the handle closes the queue and joins the thread once it has
/// drained.
pub struct Compressor {
    /// Option so the sender can be dropped before joining
    tx: Option<Sender<Arc<Payload>>>,
    handle: Option<JoinHandle<()>>,
    pending: Pending,
}

impl Compressor {
    pub fn spawn() -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Arc<Payload>>();
        let pending: Pending = Arc::new((Mutex::new(0), Condvar::new()));
        let worker_pending = Arc::clone(&pending);

        let handle = thread::Builder::new()
            .name("history-compress".into())
            .spawn(move || run(rx, worker_pending))?;

        debug!("history compression worker started");
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            pending,
        })
    }

    /// Queue a payload. Never blocks.
    pub fn submit(&self, payload: Arc<Payload>) {
        let Some(tx) = &self.tx else {
            return;
        };
        adjust(&self.pending, 1);
        if tx.send(payload).is_err() {
            warn!("history compression worker is gone, keeping state uncompressed");
            adjust(&self.pending, -1);
        }
    }

    /// Block until every submitted payload has been processed.
    pub fn wait_idle(&self) {
        let (count, idle) = &*self.pending;
        let mut guard = match count.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        while *guard > 0 {
            guard = match idle.wait(guard) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }
}

impl Drop for Compressor {
    fn drop(&mut self) {
        // The worker exits when the channel closes.
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        debug!("history compression worker stopped");
    }
}

fn run(rx: Receiver<Arc<Payload>>, pending: Pending) {
    for payload in rx {
        let flat = payload.bytes();
        if flat.first() == Some(&FLAT) {
            match codec::compress(&flat) {
                Ok(packed) => {
                    trace!(from = flat.len(), to = packed.len(), "compressed state");
                    payload.replace(Arc::from(packed));
                }
                Err(e) => error!("failed to compress recorded state: {e}"),
            }
        }
        adjust(&pending, -1);
    }
}

fn adjust(pending: &Pending, delta: isize) {
    let (count, idle) = &**pending;
    let mut guard = match count.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = guard.saturating_add_signed(delta);
    if *guard == 0 {
        idle.notify_all();
    }
}
