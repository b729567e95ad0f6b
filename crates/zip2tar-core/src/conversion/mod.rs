//! Conversion handle and task wiring.
//!
//! A conversion runs as one tokio task. The optional pre-scan runs on the
//! blocking pool first, then the conversion pass itself runs there too,
//! writing into the bounded [`TarStream`] channel and the unbounded
//! [`Events`] channel. The task's result is the terminal outcome.

mod orchestrator;

use std::time::Instant;

use tokio::task::JoinHandle;

use crate::ArchiveSource;
use crate::ConversionError;
use crate::ConversionEvent;
use crate::ConversionReport;
use crate::ConvertOptions;
use crate::Result;
use crate::event;
use crate::event::EventSender;
use crate::event::Events;
use crate::scan;
use crate::stream;
use crate::stream::TarSink;
use crate::stream::TarStream;

use orchestrator::Orchestrator;

/// A running conversion.
///
/// Holds the three observable parts of a conversion: the TAR byte stream,
/// the event channel, and the terminal outcome.
///
/// The TAR stream must be consumed for the conversion to make progress.
/// [`finish`](Self::finish) drains it automatically when it was never
/// taken.
#[derive(Debug)]
pub struct Conversion {
    stream: Option<TarStream>,
    events: Option<Events>,
    completion: Completion,
}

impl Conversion {
    /// Takes the TAR byte stream. Returns `None` on the second call.
    pub fn take_stream(&mut self) -> Option<TarStream> {
        self.stream.take()
    }

    /// Takes the event receiver. Returns `None` on the second call.
    pub fn take_events(&mut self) -> Option<Events> {
        self.events.take()
    }

    /// Receives the next event, or `None` once the conversion has stopped
    /// producing events or the receiver was taken.
    pub async fn next_event(&mut self) -> Option<ConversionEvent> {
        match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => None,
        }
    }

    /// Splits the conversion into its parts so they can be driven from
    /// separate tasks. Parts already taken are `None`.
    pub fn into_parts(self) -> (Option<TarStream>, Option<Events>, Completion) {
        (self.stream, self.events, self.completion)
    }

    /// Waits for the terminal outcome.
    ///
    /// If the TAR stream was never taken it is drained and discarded. Events
    /// not yet received are dropped.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the conversion.
    pub async fn finish(mut self) -> Result<ConversionReport> {
        drop(self.events.take());
        if let Some(stream) = self.stream.take() {
            tokio::spawn(drain(stream));
        }
        self.completion.wait().await
    }
}

/// The terminal outcome of a conversion, detached from its stream.
#[derive(Debug)]
pub struct Completion {
    task: JoinHandle<Result<ConversionReport>>,
}

impl Completion {
    /// Waits for the conversion task to end.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the conversion, or
    /// [`ConversionError::Interrupted`] if the task panicked or was
    /// cancelled.
    pub async fn wait(self) -> Result<ConversionReport> {
        self.task
            .await
            .map_err(|e| ConversionError::Interrupted(e.to_string()))?
    }
}

/// Validates `source` and spawns the conversion task on the current runtime.
pub(crate) fn start(
    source: ArchiveSource,
    options: ConvertOptions,
) -> Result<(TarStream, Events, Completion)> {
    source.validate()?;
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|_| ConversionError::RuntimeUnavailable)?;

    let (sink, stream) = stream::channel();
    let (sender, events) = event::channel();
    let task = runtime.spawn(run(source, options, sink, sender));

    Ok((stream, events, Completion { task }))
}

pub(crate) fn spawn(source: ArchiveSource, options: ConvertOptions) -> Result<Conversion> {
    let (stream, events, completion) = start(source, options)?;
    Ok(Conversion {
        stream: Some(stream),
        events: Some(events),
        completion,
    })
}

async fn run(
    source: ArchiveSource,
    options: ConvertOptions,
    sink: TarSink,
    events: EventSender,
) -> Result<ConversionReport> {
    let started = Instant::now();
    log::debug!("starting conversion of {source}");

    let total_entries = if options.progress {
        match scan::count_entries(source.clone()).await {
            Ok(total) => Some(total),
            Err(err) => {
                log::warn!("pre-scan of {source} failed: {err}");
                sink.abort(&err).await;
                return Err(err);
            }
        }
    } else {
        None
    };

    let orchestrator = Orchestrator::new(source, total_entries, events);
    let mut report = tokio::task::spawn_blocking(move || orchestrator.run(sink))
        .await
        .map_err(|e| ConversionError::Interrupted(e.to_string()))??;

    report.duration = started.elapsed();
    Ok(report)
}

async fn drain(mut stream: TarStream) {
    if let Err(e) = tokio::io::copy(&mut stream, &mut tokio::io::sink()).await {
        log::debug!("discarded TAR stream ended with error: {e}");
    }
}
