use hashbrown::HashMap;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{
    core::{
        parser::{AdifParser, ParseOutcome, ParserConfig},
        stream::StreamParser,
    },
    error::ParseError,
    types::JobId,
};

use super::events::ImportEvent;

/// Failures reported by [`ImportHandle`] calls.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// No open job has this id.
    #[error("unknown import job {0}")]
    UnknownJob(JobId),
    /// `max_open_jobs` chunked jobs are already open.
    #[error("too many open import jobs (limit {0})")]
    TooManyJobs(usize),
    /// The runtime loop is gone.
    #[error("import runtime channel closed")]
    ChannelClosed,
    /// A blocking parse task panicked or was cancelled.
    #[error("parse task failed: {0}")]
    Join(String),
}

/// Import runtime settings.
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    /// Settings handed to every job's parser.
    pub parser: ParserConfig,
    /// Capacity of the command queue.
    pub command_queue_bound: usize,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Chunked jobs that may be open at once.
    pub max_open_jobs: usize,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            command_queue_bound: 256,
            event_capacity: 1024,
            max_open_jobs: 64,
        }
    }
}

/// Cloneable handle to a running import loop.
pub struct ImportHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<ImportEvent>,
}

impl Clone for ImportHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Parse {
        text: String,
        resp: oneshot::Sender<Result<ParseOutcome, ImportError>>,
    },
    Open {
        resp: oneshot::Sender<Result<JobId, ImportError>>,
    },
    Feed {
        job: JobId,
        chunk: String,
        resp: oneshot::Sender<Result<(), ImportError>>,
    },
    Finish {
        job: JobId,
        resp: oneshot::Sender<Result<ParseOutcome, ImportError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

struct LoopState {
    config: ImporterConfig,
    jobs: HashMap<JobId, StreamParser>,
    next_job: JobId,
}

/// Starts the import loop on the current tokio runtime.
///
/// Every job parses with its own parser instance. Whole-document jobs run on
/// the blocking pool and may overlap; chunked jobs are owned by the loop.
pub fn spawn_importer(config: ImporterConfig) -> ImportHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<ImportEvent>(config.event_capacity);

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut state = LoopState {
            config,
            jobs: HashMap::new(),
            next_job: 1,
        };

        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &mut state, &events_tx_loop) {
                break;
            }
        }
        if !state.jobs.is_empty() {
            tracing::debug!(open = state.jobs.len(), "import loop stopped with open jobs");
        }
    });

    ImportHandle { cmd_tx, events_tx }
}

impl ImportHandle {
    /// Subscribes to job events.
    pub fn subscribe(&self) -> broadcast::Receiver<ImportEvent> {
        self.events_tx.subscribe()
    }

    /// Parses a complete document.
    pub async fn parse(&self, text: impl Into<String>) -> Result<ParseOutcome, ImportError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Parse {
                text: text.into(),
                resp: tx,
            })
            .await
            .map_err(|_| ImportError::ChannelClosed)?;
        rx.await.map_err(|_| ImportError::ChannelClosed)?
    }

    /// Opens a chunked job.
    pub async fn open(&self) -> Result<JobId, ImportError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Open { resp: tx })
            .await
            .map_err(|_| ImportError::ChannelClosed)?;
        rx.await.map_err(|_| ImportError::ChannelClosed)?
    }

    /// Appends text to a chunked job. A parse error closes the job.
    pub async fn feed(&self, job: JobId, chunk: impl Into<String>) -> Result<(), ImportError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Feed {
                job,
                chunk: chunk.into(),
                resp: tx,
            })
            .await
            .map_err(|_| ImportError::ChannelClosed)?;
        rx.await.map_err(|_| ImportError::ChannelClosed)?
    }

    /// Ends a chunked job and returns its document.
    pub async fn finish(&self, job: JobId) -> Result<ParseOutcome, ImportError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Finish { job, resp: tx })
            .await
            .map_err(|_| ImportError::ChannelClosed)?;
        rx.await.map_err(|_| ImportError::ChannelClosed)?
    }

    /// Stops the loop. Open chunked jobs are dropped.
    pub async fn shutdown(&self) -> Result<(), ImportError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| ImportError::ChannelClosed)?;
        rx.await.map_err(|_| ImportError::ChannelClosed)
    }
}

fn handle_command(
    cmd: Command,
    state: &mut LoopState,
    events_tx: &broadcast::Sender<ImportEvent>,
) -> bool {
    match cmd {
        Command::Parse { text, resp } => {
            let job = state.allocate_job();
            let parser_config = state.config.parser.clone();
            let events_tx = events_tx.clone();
            tokio::spawn(async move {
                let res = tokio::task::spawn_blocking(move || {
                    AdifParser::with_config(parser_config).parse_with_diagnostics(&text)
                })
                .await
                .map_err(|e| ImportError::Join(e.to_string()))
                .and_then(|r| r.map_err(ImportError::from));
                match &res {
                    Ok(outcome) => publish_outcome(&events_tx, job, outcome),
                    Err(err) => publish_failure(&events_tx, job, err),
                }
                let _ = resp.send(res);
            });
        }
        Command::Open { resp } => {
            let res = if state.jobs.len() >= state.config.max_open_jobs {
                Err(ImportError::TooManyJobs(state.config.max_open_jobs))
            } else {
                let job = state.allocate_job();
                state
                    .jobs
                    .insert(job, StreamParser::new(state.config.parser.clone()));
                let _ = events_tx.send(ImportEvent::Opened { job });
                Ok(job)
            };
            let _ = resp.send(res);
        }
        Command::Feed { job, chunk, resp } => {
            let res = match state.jobs.get_mut(&job) {
                None => Err(ImportError::UnknownJob(job)),
                Some(parser) => parser.feed(&chunk).map_err(ImportError::from),
            };
            if let Err(err @ ImportError::Parse(_)) = &res {
                state.jobs.remove(&job);
                publish_failure(events_tx, job, err);
            }
            let _ = resp.send(res);
        }
        Command::Finish { job, resp } => {
            let res = match state.jobs.remove(&job) {
                None => Err(ImportError::UnknownJob(job)),
                Some(parser) => parser.finish().map_err(ImportError::from),
            };
            match &res {
                Ok(outcome) => publish_outcome(events_tx, job, outcome),
                Err(err @ ImportError::Parse(_)) => publish_failure(events_tx, job, err),
                Err(_) => {}
            }
            let _ = resp.send(res);
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}

impl LoopState {
    fn allocate_job(&mut self) -> JobId {
        let job = self.next_job;
        self.next_job += 1;
        job
    }
}

fn publish_outcome(events_tx: &broadcast::Sender<ImportEvent>, job: JobId, outcome: &ParseOutcome) {
    for diagnostic in &outcome.diagnostics {
        let _ = events_tx.send(ImportEvent::Diagnostic {
            job,
            diagnostic: diagnostic.clone(),
        });
    }
    tracing::debug!(job, records = outcome.records.len(), "import job finished");
    let _ = events_tx.send(ImportEvent::Finished {
        job,
        records: outcome.records.len(),
    });
}

fn publish_failure(events_tx: &broadcast::Sender<ImportEvent>, job: JobId, err: &ImportError) {
    tracing::warn!(job, error = %err, "import job failed");
    let _ = events_tx.send(ImportEvent::Failed {
        job,
        reason: err.to_string(),
    });
}
