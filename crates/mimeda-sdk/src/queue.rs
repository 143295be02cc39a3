// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Single-worker FIFO job queue.
//!
//! Jobs run one at a time, in submission order, on a dedicated OS thread
//! that drives its own current-thread tokio runtime. Submitting never blocks
//! the caller.

use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use mimeda_common_http::CancellationToken;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{Result, SdkError};

pub const WORKER_THREAD_NAME: &str = "mimeda-dispatch";

/// Processes jobs pulled from a [`DispatchQueue`].
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
	type Job: Send + 'static;

	async fn handle(&self, job: Self::Job);
}

/// How a [`DispatchQueue::shutdown`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
	/// All queued jobs finished within the first timeout.
	Drained,
	/// Work was cancelled and the worker stopped within the second timeout.
	Cancelled,
	/// The worker did not stop and was left to finish on its own.
	Detached,
	/// The queue had already been shut down.
	AlreadyStopped,
}

/// Queue feeding a single background worker.
pub struct DispatchQueue<J> {
	sender: Mutex<Option<mpsc::UnboundedSender<J>>>,
	done: Mutex<Option<std_mpsc::Receiver<()>>>,
	cancel: CancellationToken,
}

impl<J: Send + 'static> DispatchQueue<J> {
	/// Spawns the worker thread and returns the queue feeding it.
	///
	/// Cancelling `cancel` stops the worker after the current job. The
	/// handler should observe the same token to abandon in-flight work.
	pub fn start<H>(handler: H, cancel: CancellationToken) -> Result<Self>
	where
		H: JobHandler<Job = J>,
	{
		let (sender, receiver) = mpsc::unbounded_channel();
		let (done_tx, done_rx) = std_mpsc::channel();

		let runtime = tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
			.map_err(|e| SdkError::Worker(format!("failed to build worker runtime: {e}")))?;

		let worker_cancel = cancel.clone();
		let handler = Arc::new(handler);
		std::thread::Builder::new()
			.name(WORKER_THREAD_NAME.to_string())
			.spawn(move || {
				runtime.block_on(run_worker(handler, receiver, worker_cancel));
				let _ = done_tx.send(());
			})
			.map_err(|e| SdkError::Worker(format!("failed to spawn worker thread: {e}")))?;

		debug!(thread = WORKER_THREAD_NAME, "dispatch worker started");
		Ok(Self {
			sender: Mutex::new(Some(sender)),
			done: Mutex::new(Some(done_rx)),
			cancel,
		})
	}

	/// Enqueues `job`. Fails only once the queue has been shut down.
	pub fn submit(&self, job: J) -> Result<()> {
		let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
		match sender.as_ref() {
			Some(sender) => sender.send(job).map_err(|_| SdkError::ClientShutdown),
			None => Err(SdkError::ClientShutdown),
		}
	}

	pub fn is_closed(&self) -> bool {
		self.sender.lock().unwrap_or_else(PoisonError::into_inner).is_none()
	}

	/// Stops accepting jobs and waits for the worker.
	///
	/// Waits up to `timeout` for queued work to drain, then cancels and waits
	/// up to `timeout` again before detaching the worker. Blocks the calling
	/// thread.
	pub fn shutdown(&self, timeout: Duration) -> ShutdownOutcome {
		drop(self.sender.lock().unwrap_or_else(PoisonError::into_inner).take());

		let Some(done) = self.done.lock().unwrap_or_else(PoisonError::into_inner).take() else {
			return ShutdownOutcome::AlreadyStopped;
		};

		if worker_stopped(&done, timeout) {
			info!("dispatch queue drained");
			return ShutdownOutcome::Drained;
		}

		warn!(timeout_ms = timeout.as_millis() as u64, "dispatch queue did not drain in time, cancelling");
		self.cancel.cancel();

		if worker_stopped(&done, timeout) {
			info!("dispatch worker stopped after cancellation");
			ShutdownOutcome::Cancelled
		} else {
			error!("dispatch worker did not stop, detaching");
			ShutdownOutcome::Detached
		}
	}
}

fn worker_stopped(done: &std_mpsc::Receiver<()>, timeout: Duration) -> bool {
	match done.recv_timeout(timeout) {
		Ok(()) | Err(std_mpsc::RecvTimeoutError::Disconnected) => true,
		Err(std_mpsc::RecvTimeoutError::Timeout) => false,
	}
}

async fn run_worker<H: JobHandler>(
	handler: Arc<H>,
	mut receiver: mpsc::UnboundedReceiver<H::Job>,
	cancel: CancellationToken,
) {
	loop {
		let job = tokio::select! {
			biased;
			_ = cancel.cancelled() => {
				debug!("dispatch worker cancelled");
				break;
			}
			job = receiver.recv() => job,
		};
		let Some(job) = job else {
			debug!("dispatch queue closed");
			break;
		};

		// Each job runs as its own task so a panicking handler cannot take
		// the worker down.
		let handler = handler.clone();
		if let Err(e) = tokio::spawn(async move { handler.handle(job).await }).await {
			error!(error = %e, "dispatch job panicked");
		}
	}

	let dropped = {
		receiver.close();
		let mut count = 0usize;
		while receiver.try_recv().is_ok() {
			count += 1;
		}
		count
	};
	if dropped > 0 {
		warn!(dropped, "dropped queued jobs on shutdown");
	}
}
