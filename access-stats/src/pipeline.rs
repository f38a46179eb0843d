use std::{mem, num::NonZero, path::PathBuf, thread};

use thiserror::Error;
use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::{JoinError, JoinHandle},
};
use tracing::{debug, info};

use crate::{
    analytics::{ByteUnit, Summary, Tally},
    ingest::{self, IngestError, LineReader},
    parser::{Diagnostics, LineParser},
};

pub const DEFAULT_CHUNK_LINES: NonZero<usize> = NonZero::new(10_000).expect("nonzero const");
const CHUNK_BUFFER_SIZE: usize = 4;

/// Static knobs of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub unit: ByteUnit,
    pub diagnostics: Diagnostics,
    pub workers: usize,
    pub chunk_lines: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            unit: ByteUnit::default(),
            diagnostics: Diagnostics::default(),
            workers: thread::available_parallelism().map_or(1, NonZero::get),
            chunk_lines: DEFAULT_CHUNK_LINES.get(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("worker {0} stopped before the input was exhausted")]
    WorkerStopped(usize),
    #[error("pipeline task failed: {0}")]
    Task(#[from] JoinError),
}

#[derive(Debug)]
struct Chunk {
    first_position: u64,
    lines: Vec<String>,
}

/// Cuts the line stream into numbered chunks and deals them to workers round-robin.
struct Dispatcher {
    workers: Vec<Sender<Chunk>>,
    next_worker: usize,
    buffer: Vec<String>,
    chunk_lines: usize,
    position: u64,
}

impl Dispatcher {
    async fn push(&mut self, line: String) -> Result<(), PipelineError> {
        self.buffer.push(line);
        if self.buffer.len() >= self.chunk_lines {
            self.flush().await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), PipelineError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let lines = mem::replace(&mut self.buffer, Vec::with_capacity(self.chunk_lines));
        let first_position = self.position;
        self.position += lines.len() as u64;
        let worker = self.next_worker;
        self.next_worker = (worker + 1) % self.workers.len();
        self.workers[worker]
            .send(Chunk {
                first_position,
                lines,
            })
            .await
            .map_err(|_| PipelineError::WorkerStopped(worker))
    }
}

struct Stages {
    dispatcher: Dispatcher,
    workers: Vec<JoinHandle<()>>,
    aggregator: JoinHandle<Tally>,
}

impl Stages {
    fn start(config: &AnalysisConfig) -> Self {
        let worker_count = config.workers.max(1);
        let chunk_lines = config.chunk_lines.max(1);
        let parser = LineParser::new(config.diagnostics);
        let (tally_tx, tally_rx) = mpsc::channel(worker_count);

        let mut senders = Vec::with_capacity(worker_count);
        let mut workers = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_BUFFER_SIZE);
            senders.push(chunk_tx);
            workers.push(spawn_worker(id, chunk_rx, tally_tx.clone(), parser.clone()));
        }
        debug!(workers = worker_count, chunk_lines, "pipeline started");

        Self {
            dispatcher: Dispatcher {
                workers: senders,
                next_worker: 0,
                buffer: Vec::with_capacity(chunk_lines),
                chunk_lines,
                position: 0,
            },
            workers,
            aggregator: spawn_aggregator(tally_rx),
        }
    }

    async fn finish(self, unit: ByteUnit) -> Result<Summary, PipelineError> {
        let Self {
            mut dispatcher,
            workers,
            aggregator,
        } = self;
        dispatcher.flush().await?;
        let lines = dispatcher.position;
        // closing the chunk channels lets workers hand in their tallies
        drop(dispatcher);
        for worker in workers {
            worker.await?;
        }
        let tally = aggregator.await?;
        info!(lines, "access log analysis finished");
        Ok(tally.summarize(unit))
    }
}

fn spawn_worker(
    id: usize,
    rx: Receiver<Chunk>,
    tx: Sender<Tally>,
    parser: LineParser,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let tally = worker_loop(rx, &parser).await;
        debug!(worker = id, lines = tally.lines(), "worker drained its queue");
        tx.send(tally).await.ok();
    })
}

async fn worker_loop(mut rx: Receiver<Chunk>, parser: &LineParser) -> Tally {
    let mut tally = Tally::default();
    while let Some(Chunk {
        first_position,
        lines,
    }) = rx.recv().await
    {
        for (position, line) in (first_position..).zip(lines) {
            tally.record(position, parser.parse(&line));
        }
    }
    tally
}

fn spawn_aggregator(mut rx: Receiver<Tally>) -> JoinHandle<Tally> {
    tokio::spawn(async move {
        let mut total = Tally::default();
        while let Some(partial) = rx.recv().await {
            total.merge(partial);
        }
        total
    })
}

/// Runs the analysis over an in-memory line sequence.
pub async fn run_lines<I>(lines: I, config: &AnalysisConfig) -> Result<Summary, PipelineError>
where
    I: IntoIterator<Item = String>,
{
    let mut stages = Stages::start(config);
    for line in lines {
        stages.dispatcher.push(line).await?;
    }
    stages.finish(config.unit).await
}

/// Runs the analysis over files, directories, or `-` for stdin.
pub async fn run_sources(
    arguments: &[PathBuf],
    config: &AnalysisConfig,
) -> Result<Summary, PipelineError> {
    let sources = ingest::expand(arguments).await?;
    let mut stages = Stages::start(config);
    for source in &sources {
        info!(%source, "reading access log");
        let mut reader = LineReader::open(source).await?;
        while let Some(line) = reader.next_line().await? {
            stages.dispatcher.push(line).await?;
        }
    }
    stages.finish(config.unit).await
}
