//! Session orchestrator
//!
//! The orchestrator owns one search session from start to summary:
//! - Spawning one worker task per bound site
//! - Relaying operator commands to the shared `PauseSignal` and the
//!   `ProgressAnnouncer`
//! - Polling worker liveness between command reads
//! - Joining every worker with a deadline once none is active
//! - Aggregating the outcomes into a `SessionReport`

use crate::config::{Config, SessionConfig};
use crate::extract::{bind_sources, build_http_client, SourceBinding};
use crate::output::{SessionReport, Statistics, Summary};
use crate::session::{
    ControlCommand, PauseSignal, ProgressAnnouncer, SearchTerms, Worker, WorkerHandle,
    WorkerOutcome, WorkerSettings, WorkerState,
};
use crate::{Result, ScoutError};
use chrono::Utc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Timing policy for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    pub join_timeout: Duration,
    pub pause_notice_interval: Duration,
    pub worker: WorkerSettings,
}

impl From<&SessionConfig> for SessionSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            join_timeout: config.join_timeout(),
            pause_notice_interval: config.pause_notice_interval(),
            worker: WorkerSettings::from(config),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

struct RunningWorker {
    handle: WorkerHandle,
    task: JoinHandle<WorkerOutcome>,
}

impl RunningWorker {
    fn is_live(&self) -> bool {
        self.handle.is_active() && !self.task.is_finished()
    }
}

/// Runs a search session across a fixed set of sites
pub struct Orchestrator {
    terms: SearchTerms,
    bindings: Vec<SourceBinding>,
    settings: SessionSettings,
}

impl Orchestrator {
    /// Creates an orchestrator
    ///
    /// # Arguments
    ///
    /// * `terms` - Validated search terms
    /// * `bindings` - One extractor per site, resolved up front
    /// * `settings` - Polling, join and retry policy
    pub fn new(terms: SearchTerms, bindings: Vec<SourceBinding>, settings: SessionSettings) -> Self {
        Self {
            terms,
            bindings,
            settings,
        }
    }

    /// Creates an orchestrator for every site enabled in `config`
    ///
    /// All extractors share one HTTP client.
    ///
    /// # Returns
    ///
    /// * `Err(ScoutError::Reqwest)` - The HTTP client could not be built
    /// * `Err(ScoutError::Extraction)` - A site's base URL is not a valid URL
    pub fn from_config(config: &Config, terms: SearchTerms) -> Result<Self> {
        let client = build_http_client(&config.user_agent, config.session.request_timeout())?;
        let bindings = bind_sources(config, &client)?;
        Ok(Self::new(terms, bindings, SessionSettings::from(&config.session)))
    }

    /// Number of sites the session will search
    pub fn site_count(&self) -> usize {
        self.bindings.len()
    }

    /// Runs the session to completion
    ///
    /// Operator commands are read line by line from `input`. End of input
    /// only ends command reading; the session keeps running until every
    /// worker has stopped. If the session is paused when input ends, nothing
    /// could ever resume it, so it is stopped with the results collected so
    /// far.
    ///
    /// # Returns
    ///
    /// * `Ok(SessionReport)` - Every worker finished and was joined
    /// * `Err(ScoutError::WorkerFailed)` - A worker task panicked
    /// * `Err(ScoutError::WorkerJoinTimeout)` - A worker could not be joined in time
    pub async fn run<R>(self, input: R) -> Result<SessionReport>
    where
        R: AsyncBufRead + Unpin,
    {
        let Self {
            terms,
            bindings,
            settings,
        } = self;

        let signal = PauseSignal::new();
        let mut announcer = ProgressAnnouncer::new(settings.pause_notice_interval);

        let workers: Vec<RunningWorker> = bindings
            .into_iter()
            .map(|binding| {
                let (worker, handle) =
                    Worker::new(binding, terms.clone(), signal.clone(), settings.worker);
                RunningWorker {
                    handle,
                    task: tokio::spawn(worker.run()),
                }
            })
            .collect();

        tracing::info!(
            "Searching {} on {} for {} site(s). Commands: p = pause, r = resume, s = stop",
            terms.destination,
            terms.checkin.format(crate::session::DATE_FORMAT),
            workers.len()
        );

        let mut lines = input.lines();
        let mut input_open = true;
        let mut ticker = tokio::time::interval(settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while workers.iter().any(RunningWorker::is_live) {
            tokio::select! {
                line = lines.next_line(), if input_open => match line {
                    Ok(Some(line)) => match ControlCommand::parse(&line) {
                        Some(command) => apply_command(command, &signal, &mut announcer).await,
                        None => tracing::debug!("Ignoring unrecognized input: {:?}", line.trim()),
                    },
                    Ok(None) => {
                        tracing::debug!("Control input closed");
                        input_open = false;
                        release_paused_session(&signal, &mut announcer).await;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read control input: {}", e);
                        input_open = false;
                        release_paused_session(&signal, &mut announcer).await;
                    }
                },
                _ = ticker.tick() => {}
            }
        }

        let joined = join_workers(workers, settings.join_timeout).await;
        announcer.stop().await;

        let outcomes = match joined {
            Ok(outcomes) => outcomes,
            Err(e) => {
                signal.stop();
                tracing::error!("Session aborted: {}", e);
                return Err(e);
            }
        };

        let statistics = Statistics::aggregate(&outcomes);
        let summary = Summary::new(&terms, &statistics, Utc::now());
        tracing::info!(
            "Session finished: {} properties from {} site(s)",
            summary.properties_found,
            outcomes.len()
        );

        Ok(SessionReport { summary, outcomes })
    }
}

async fn apply_command(
    command: ControlCommand,
    signal: &PauseSignal,
    announcer: &mut ProgressAnnouncer,
) {
    match command {
        ControlCommand::Pause => {
            if signal.pause() {
                announcer.start();
                tracing::info!("Pausing: workers will stop after their current page");
            }
        }
        ControlCommand::Resume => {
            announcer.stop().await;
            if signal.resume() {
                tracing::info!("Resuming");
            }
        }
        ControlCommand::Stop => {
            announcer.stop().await;
            if signal.stop() {
                tracing::info!("Stopping: workers will finish after their current page");
            }
        }
    }
}

/// Stops a paused session once no further command can arrive
async fn release_paused_session(signal: &PauseSignal, announcer: &mut ProgressAnnouncer) {
    if signal.state() != WorkerState::Paused {
        return;
    }
    announcer.stop().await;
    if signal.stop() {
        tracing::info!("Control input closed while paused: stopping");
    }
}

/// Joins every worker, each within `deadline`
///
/// A worker counts as done once its handle reports it inactive, which can
/// happen while its task is still stuck in an extractor call. Such a task is
/// aborted after `deadline`. On the first failure the remaining workers are
/// stopped and aborted.
async fn join_workers(
    workers: Vec<RunningWorker>,
    deadline: Duration,
) -> Result<Vec<WorkerOutcome>> {
    let mut outcomes = Vec::with_capacity(workers.len());
    let mut pending = workers.into_iter();

    while let Some(RunningWorker { handle, task }) = pending.next() {
        let site = handle.site();
        let abort = task.abort_handle();

        let failure = match tokio::time::timeout(deadline, task).await {
            Ok(Ok(outcome)) => {
                outcomes.push(outcome);
                continue;
            }
            Ok(Err(e)) => ScoutError::WorkerFailed {
                site,
                message: e.to_string(),
            },
            Err(_) => {
                abort.abort();
                ScoutError::WorkerJoinTimeout {
                    site,
                    seconds: deadline.as_secs(),
                }
            }
        };

        handle.stop();
        for rest in pending {
            rest.handle.stop();
            rest.task.abort();
        }
        return Err(failure);
    }

    Ok(outcomes)
}
