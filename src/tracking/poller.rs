use crate::client::WorkApi;
use crate::error::{Error, Result};
use crate::surface::UploadSurface;
use crate::tracking::status::{StatusResponse, WorkStatus};
use crate::upload::WorkId;
use derivative::Derivative;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const CONNECTION_LOST: &str =
    "Se perdió la conexión con el servidor. Se detuvo el seguimiento.";

/// Deadline for one status query unless overridden with [`StatusPoller::with_query_timeout`].
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// How a poll session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Finished(WorkStatus),
    ConnectionLost { failures: u32 },
    Stopped,
}

/// Starts poll sessions against the status endpoint.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct StatusPoller<A: WorkApi> {
    #[derivative(Debug = "ignore")]
    api: Arc<A>,
    #[derivative(Debug = "ignore")]
    surface: Arc<dyn UploadSurface>,
    interval: Duration,
    query_timeout: Duration,
    max_consecutive_failures: Option<u32>,
}

impl<A: WorkApi> StatusPoller<A> {
    pub fn new(
        api: Arc<A>,
        surface: Arc<dyn UploadSurface>,
        interval: Duration,
        max_consecutive_failures: Option<u32>,
    ) -> Self {
        Self {
            api,
            surface,
            interval,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            max_consecutive_failures,
        }
    }

    /// A query still unanswered after `timeout` counts as a transport failure.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Switch the surface to tracking `work_id` and spawn its poll loop.
    ///
    /// The first query is issued immediately, then once per interval. Must be called from
    /// within a tokio runtime.
    pub fn start(&self, work_id: WorkId) -> PollSession {
        tracing::info!(work_id = %work_id, interval = ?self.interval, "starting poll session");
        self.surface.show_tracking(&work_id);

        let cancel = CancellationToken::new();
        let task = PollTask {
            api: Arc::clone(&self.api),
            surface: Arc::clone(&self.surface),
            work_id: work_id.clone(),
            interval: self.interval,
            query_timeout: self.query_timeout,
            max_consecutive_failures: self.max_consecutive_failures,
        };
        let handle = tokio::spawn(task.run(cancel.clone()));

        PollSession {
            work_id,
            cancel,
            handle,
        }
    }
}

/// Owned handle to a running poll loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct PollSession {
    work_id: WorkId,
    cancel: CancellationToken,
    handle: JoinHandle<PollOutcome>,
}

impl PollSession {
    pub fn work_id(&self) -> &WorkId {
        &self.work_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn stop(self) {
        if !self.is_finished() {
            tracing::info!(work_id = %self.work_id, "stopping poll session");
        }
        drop(self);
    }

    /// Wait for the loop to end. Call at most once.
    pub async fn wait(&mut self) -> PollOutcome {
        (&mut self.handle).await.unwrap_or(PollOutcome::Stopped)
    }
}

impl Drop for PollSession {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

struct PollTask<A: WorkApi> {
    api: Arc<A>,
    surface: Arc<dyn UploadSurface>,
    work_id: WorkId,
    interval: Duration,
    query_timeout: Duration,
    max_consecutive_failures: Option<u32>,
}

impl<A: WorkApi> PollTask<A> {
    async fn run(self, cancel: CancellationToken) -> PollOutcome {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut in_flight: FuturesUnordered<BoxFuture<'static, (u64, Result<StatusResponse>)>> =
            FuturesUnordered::new();
        let mut issued: u64 = 0;
        let mut newest_applied: u64 = 0;
        let mut consecutive_failures: u32 = 0;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::debug!(work_id = %self.work_id, "poll session cancelled");
                    return PollOutcome::Stopped;
                }

                Some((seq, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    match result {
                        Ok(reply) => {
                            consecutive_failures = 0;
                            if seq < newest_applied {
                                tracing::debug!(work_id = %self.work_id, seq, newest_applied, "discarding stale status response");
                                continue;
                            }
                            newest_applied = seq;

                            let status = self.apply(&reply);
                            if status.is_terminal() {
                                tracing::info!(work_id = %self.work_id, status = %status.label(), "poll session finished");
                                return PollOutcome::Finished(status);
                            }
                        }
                        Err(e) => {
                            consecutive_failures += 1;
                            tracing::warn!(
                                work_id = %self.work_id,
                                seq,
                                failures = consecutive_failures,
                                error = %e,
                                "status query failed, retrying on next tick"
                            );

                            if let Some(max) = self.max_consecutive_failures {
                                if consecutive_failures >= max {
                                    tracing::warn!(work_id = %self.work_id, failures = consecutive_failures, "giving up on status polling");
                                    self.surface.set_message(CONNECTION_LOST);
                                    self.surface.set_error(Some(e.to_string().as_str()));
                                    return PollOutcome::ConnectionLost { failures: consecutive_failures };
                                }
                            }
                        }
                    }
                }

                _ = ticker.tick() => {
                    issued += 1;
                    let seq = issued;
                    let api = Arc::clone(&self.api);
                    let work_id = self.work_id.clone();
                    let deadline = self.query_timeout;
                    tracing::debug!(work_id = %work_id, seq, "querying status");
                    in_flight.push(
                        async move {
                            let result = time::timeout(deadline, api.status(&work_id))
                                .await
                                .unwrap_or_else(|_| Err(Error::Timeout(deadline)));
                            (seq, result)
                        }
                        .boxed(),
                    );
                }
            }
        }
    }

    fn apply(&self, reply: &StatusResponse) -> WorkStatus {
        let status = reply.work_status();
        self.surface.set_badge(&status);
        self.surface.set_message(&status.message());

        match &status {
            WorkStatus::Completed => {
                if reply.download_url.is_none() {
                    tracing::warn!(work_id = %self.work_id, "completed without download_url");
                }
                self.surface.set_error(None);
                self.surface.set_download(reply.download_url.as_deref());
            }
            WorkStatus::Failed => {
                self.surface.set_error(reply.error.as_deref());
                self.surface.set_download(None);
            }
            WorkStatus::Unknown(raw) => {
                tracing::warn!(work_id = %self.work_id, status = %raw, "unexpected status value");
                self.surface.set_error(None);
                self.surface.set_download(None);
            }
            _ => {
                self.surface.set_error(None);
                self.surface.set_download(None);
            }
        }
        status
    }
}
