// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fixed-size worker pool for background work.

use crossbeam_channel::{Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    done: Condvar,
}

impl Pending {
    fn increment(&self) {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn decrement(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.done.notify_all();
        }
    }
}

/// Marks a job finished even if it panics.
struct PendingGuard<'a>(&'a Pending);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// A pool of worker threads fed through a channel.
///
/// Until [`create_threads`](Self::create_threads) is called, submitted work
/// runs inline on the calling thread. The frame loop never waits on the
/// queue; a subsystem that needs results calls [`complete`](Self::complete)
/// itself.
pub struct WorkQueue {
    sender: Option<Sender<Job>>,
    receiver: Receiver<Job>,
    workers: Vec<thread::JoinHandle<()>>,
    pending: Arc<Pending>,
}

impl WorkQueue {
    /// Creates a queue with no worker threads.
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender: Some(sender),
            receiver,
            workers: Vec::new(),
            pending: Arc::new(Pending::default()),
        }
    }

    /// Starts `count` worker threads. Only the first call has an effect.
    pub fn create_threads(&mut self, count: usize) {
        if !self.workers.is_empty() {
            log::warn!("Worker threads already created");
            return;
        }

        for index in 0..count {
            let receiver = self.receiver.clone();
            let pending = Arc::clone(&self.pending);
            let spawned = thread::Builder::new()
                .name(format!("gale-worker-{index}"))
                .spawn(move || {
                    for job in receiver.iter() {
                        let _guard = PendingGuard(&pending);
                        job();
                    }
                });
            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(err) => {
                    log::error!("Failed to spawn worker thread {index}: {err}");
                    break;
                }
            }
        }
        log::info!("Created {} worker threads", self.workers.len());
    }

    /// Submits a job. Without worker threads it runs immediately.
    pub fn add_work_item<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = match &self.sender {
            Some(sender) if !self.workers.is_empty() => sender,
            _ => {
                job();
                return;
            }
        };

        self.pending.increment();
        if let Err(returned) = sender.send(Box::new(job)) {
            self.pending.decrement();
            (returned.into_inner())();
        }
    }

    /// Blocks until every submitted job has finished.
    pub fn complete(&self) {
        let mut count = self
            .pending
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            count = self
                .pending
                .done
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Returns `true` when no submitted job is outstanding.
    pub fn is_completed(&self) -> bool {
        *self
            .pending
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            == 0
    }

    /// Number of worker threads.
    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        // Closing the channel lets workers drain what is queued and exit.
        self.sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
