//! Work queue feeding charts to the batch workers.
//!
//! Uses a std::sync::mpsc channel. The receiver sits behind a mutex so any
//! number of workers can pull from it; each job is taken exactly once.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// One chart to process.
#[derive(Debug, Clone)]
pub struct ChartJob {
    /// Normalised technology name
    pub slug: String,
    /// WEBP or PNG source image
    pub source: PathBuf,
    /// Anchor file for this technology, if one was found
    pub anchors: Option<PathBuf>,
    /// When the job was queued
    pub queued_at: DateTime<Local>,
}

impl ChartJob {
    pub fn new(slug: impl Into<String>, source: PathBuf, anchors: Option<PathBuf>) -> Self {
        Self {
            slug: slug.into(),
            source,
            anchors,
            queued_at: Local::now(),
        }
    }
}

pub type SharedReceiver = Arc<Mutex<Receiver<ChartJob>>>;

/// Creates a new work queue.
///
/// The channel is unbounded; the producer queues every job up front and
/// drops the sender, which ends the workers once the queue drains.
pub fn create_work_queue() -> (Sender<ChartJob>, SharedReceiver) {
    let (sender, receiver) = channel();
    (sender, Arc::new(Mutex::new(receiver)))
}

/// Takes the next job, or `None` once the queue is closed and empty.
pub fn next_job(receiver: &SharedReceiver) -> Option<ChartJob> {
    let guard = match receiver.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.recv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_work_queue_send_receive() {
        let (sender, receiver) = create_work_queue();

        sender
            .send(ChartJob::new("rust", PathBuf::from("charts/rust.webp"), None))
            .expect("Failed to send");

        let received = next_job(&receiver).expect("Failed to receive");
        assert_eq!(received.slug, "rust");
        assert_eq!(received.source, PathBuf::from("charts/rust.webp"));
    }

    #[test]
    fn test_channel_closes_when_sender_dropped() {
        let (sender, receiver) = create_work_queue();
        sender
            .send(ChartJob::new("go", PathBuf::from("go.png"), None))
            .unwrap();
        drop(sender);

        assert!(next_job(&receiver).is_some());
        assert!(next_job(&receiver).is_none());
    }

    #[test]
    fn test_each_job_taken_once_across_workers() {
        let (sender, receiver) = create_work_queue();
        for i in 0..50 {
            sender
                .send(ChartJob::new(format!("chart-{i}"), PathBuf::new(), None))
                .unwrap();
        }
        drop(sender);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                thread::spawn(move || {
                    let mut taken = Vec::new();
                    while let Some(job) = next_job(&receiver) {
                        taken.push(job.slug);
                    }
                    taken
                })
            })
            .collect();

        let all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("Worker thread panicked"))
            .collect();
        let unique: HashSet<&String> = all.iter().collect();
        assert_eq!(all.len(), 50);
        assert_eq!(unique.len(), 50);
    }
}
