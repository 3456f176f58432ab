use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{debug, error, info};
use tokio::sync::broadcast;

use crate::error::WorkerError;
use crate::pipeline::{
    BroadcastProgress, NoopProgress, Pipeline, PipelineRecord, ProgressReporter, RunProgressEvent,
};
use crate::worker::job::{PipelineJob, PipelineOutcome};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs many pipeline jobs concurrently on a fixed set of threads.
///
/// All workers share one [`Pipeline`]; every job gets its own record.
pub struct WorkerPool {
    job_sender: Sender<PipelineJob>,
    result_receiver: Receiver<PipelineOutcome>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl WorkerPool {
    /// # Panics
    /// Panics if `worker_count` is 0.
    pub fn new(pipeline: Arc<Pipeline>, worker_count: usize) -> Self {
        Self::with_progress_sender(pipeline, worker_count, None)
    }

    /// Like [`Self::new`], publishing every run's progress on `progress_sender`.
    ///
    /// # Panics
    /// Panics if `worker_count` is 0.
    pub fn with_progress_sender(
        pipeline: Arc<Pipeline>,
        worker_count: usize,
        progress_sender: Option<Arc<broadcast::Sender<RunProgressEvent>>>,
    ) -> Self {
        assert!(worker_count > 0, "worker_count must be > 0");
        let (job_sender, job_receiver) = bounded::<PipelineJob>(worker_count * 2);
        let (result_sender, result_receiver) = bounded::<PipelineOutcome>(worker_count * 2);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let result_tx = result_sender.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_pipeline = Arc::clone(&pipeline);
            let sender = progress_sender.clone();

            let handle = thread::Builder::new()
                .name(format!("lucio-worker-{}", worker_id))
                .spawn(move || {
                    run_worker(
                        worker_id,
                        job_rx,
                        result_tx,
                        shutdown_flag,
                        worker_pipeline,
                        sender,
                    );
                });

            match handle {
                Ok(handle) => workers.push(handle),
                Err(e) => error!("Failed to spawn worker {}: {}", worker_id, e),
            }
        }

        info!("Started {} workers", workers.len());

        Self {
            job_sender,
            result_receiver,
            workers,
            shutdown,
        }
    }

    pub fn submit(&self, job: PipelineJob) -> Result<(), WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(WorkerError::QueueClosed);
        }
        if self.workers.is_empty() {
            return Err(WorkerError::NoWorkers("no worker threads running".to_string()));
        }

        self.job_sender
            .send(job)
            .map_err(|_| WorkerError::QueueClosed)
    }

    /// Queues `job` without blocking. A full queue hands the job back.
    pub fn try_submit(&self, job: PipelineJob) -> Result<Option<PipelineJob>, WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(WorkerError::QueueClosed);
        }

        match self.job_sender.try_send(job) {
            Ok(()) => Ok(None),
            Err(TrySendError::Full(job)) => Ok(Some(job)),
            Err(TrySendError::Disconnected(_)) => Err(WorkerError::QueueClosed),
        }
    }

    pub fn try_recv_result(&self) -> Option<PipelineOutcome> {
        self.result_receiver.try_recv().ok()
    }

    pub fn recv_result(&self) -> Option<PipelineOutcome> {
        self.result_receiver.recv().ok()
    }

    pub fn recv_result_timeout(&self, timeout: Duration) -> Option<PipelineOutcome> {
        self.result_receiver.recv_timeout(timeout).ok()
    }

    /// Stops workers from taking new jobs. Runs already in progress finish.
    pub fn shutdown(&self) {
        info!("Stopping worker pool; runs in progress will finish");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Closes the job queue and joins every worker.
    pub fn wait(self) {
        drop(self.job_sender);

        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked while running a pipeline: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("Worker pool drained");
    }
}

fn run_worker(
    worker_id: usize,
    job_receiver: Receiver<PipelineJob>,
    result_sender: Sender<PipelineOutcome>,
    shutdown: Arc<AtomicBool>,
    pipeline: Arc<Pipeline>,
    progress_sender: Option<Arc<broadcast::Sender<RunProgressEvent>>>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} saw shutdown flag", worker_id);
            break;
        }

        match job_receiver.recv_timeout(POLL_INTERVAL) {
            Ok(job) => {
                let record = PipelineRecord::from_request(&job.request);
                debug!(
                    "Worker {} running job {} (request {})",
                    worker_id,
                    job.id,
                    record.request_id()
                );

                let record = match progress_sender {
                    Some(ref sender) => {
                        let progress = BroadcastProgress::new(record.request_id(), Arc::clone(sender));
                        pipeline.run(record, &progress as &dyn ProgressReporter)
                    }
                    None => pipeline.run(record, &NoopProgress),
                };

                let outcome = PipelineOutcome {
                    job_id: job.id,
                    record,
                    finished_at: Utc::now(),
                };

                if let Err(e) = result_sender.send(outcome) {
                    error!("Worker {} failed to send result: {}", worker_id, e);
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}
