//! Cooperative execution of generation jobs.
//!
//! A job is an explicit resumable state machine: every call to
//! [`Resumable::advance`] performs one unit of work against the grid and
//! reports whether the host should keep going, yield, or stop. The
//! [`GenerationPipeline`] wraps a job with the `Idle -> Running ->
//! {Completed, Cancelled}` lifecycle and polls the cancellation signal before
//! every unit, so cancellation is observed at every checkpoint.
//!
//! Hosts can drive a pipeline themselves with [`GenerationPipeline::poll`]
//! (e.g. one poll per frame), or use the blocking or tokio drivers.

pub mod cancel;

pub use cancel::CancellationSignal;

use std::time::{Duration, Instant};

use crate::grid::TileWriter;

/// How a job wants to suspend at a checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Checkpoint {
    /// Return control to the host for one scheduling tick
    Tick,
    /// Pause for the given duration before the next unit
    Delay(Duration),
}

/// Result of a single unit of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// More work remains; no suspension requested
    Continue,
    /// More work remains; suspend first
    Yield(Checkpoint),
    /// The job has finished
    Done,
}

/// A generation job that runs in resumable units against a grid.
pub trait Resumable {
    /// Perform the next unit of work.
    fn advance<G: TileWriter + ?Sized>(&mut self, grid: &mut G) -> Advance;

    /// Tile assignments issued so far (out-of-range skips excluded)
    fn tiles_committed(&self) -> u64;
}

/// Lifecycle of a pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl PipelineState {
    pub fn is_finished(self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Cancelled)
    }
}

/// Result of polling a pipeline once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Poll {
    Continue,
    Yield(Checkpoint),
    Completed,
    Cancelled,
}

/// Work statistics for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Units of work executed
    pub units: u64,
    /// Checkpoints where the job asked to yield
    pub checkpoints: u64,
    pub tiles_committed: u64,
    pub elapsed: Duration,
}

/// Final outcome of a run. Cancellation is an outcome, not an error; tiles
/// committed before it was observed stay in the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed(GenerationReport),
    Cancelled(GenerationReport),
}

impl Outcome {
    pub fn report(&self) -> &GenerationReport {
        match self {
            Outcome::Completed(r) | Outcome::Cancelled(r) => r,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled(_))
    }
}

/// Drives one job through its lifecycle.
pub struct GenerationPipeline {
    state: PipelineState,
    cancel: CancellationSignal,
    units: u64,
    checkpoints: u64,
    started: Option<Instant>,
    elapsed: Duration,
}

impl GenerationPipeline {
    pub fn new(cancel: CancellationSignal) -> Self {
        Self {
            state: PipelineState::Idle,
            cancel,
            units: 0,
            checkpoints: 0,
            started: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn cancel_signal(&self) -> &CancellationSignal {
        &self.cancel
    }

    /// Run the next unit of `job`.
    ///
    /// The first poll moves the pipeline to `Running`. Once finished, further
    /// polls return the final state without touching the job.
    pub fn poll<J, G>(&mut self, job: &mut J, grid: &mut G) -> Poll
    where
        J: Resumable,
        G: TileWriter + ?Sized,
    {
        match self.state {
            PipelineState::Completed => return Poll::Completed,
            PipelineState::Cancelled => return Poll::Cancelled,
            PipelineState::Idle => {
                self.state = PipelineState::Running;
                self.started = Some(Instant::now());
            }
            PipelineState::Running => {}
        }

        if self.cancel.is_cancelled() {
            self.finish(PipelineState::Cancelled);
            log::info!("Generation cancelled after {} units", self.units);
            return Poll::Cancelled;
        }

        self.units += 1;
        match job.advance(grid) {
            Advance::Continue => Poll::Continue,
            Advance::Yield(checkpoint) => {
                self.checkpoints += 1;
                Poll::Yield(checkpoint)
            }
            Advance::Done => {
                self.finish(PipelineState::Completed);
                Poll::Completed
            }
        }
    }

    fn finish(&mut self, state: PipelineState) {
        self.state = state;
        if let Some(started) = self.started {
            self.elapsed = started.elapsed();
        }
    }

    /// Statistics so far for `job`
    pub fn report<J: Resumable>(&self, job: &J) -> GenerationReport {
        let elapsed = match (self.state, self.started) {
            (PipelineState::Running, Some(started)) => started.elapsed(),
            _ => self.elapsed,
        };
        GenerationReport {
            units: self.units,
            checkpoints: self.checkpoints,
            tiles_committed: job.tiles_committed(),
            elapsed,
        }
    }

    /// Drive `job` to the end on the current thread.
    ///
    /// There is no host loop here, so every checkpoint resumes immediately.
    pub fn run_blocking<J, G>(&mut self, job: &mut J, grid: &mut G) -> Outcome
    where
        J: Resumable,
        G: TileWriter + ?Sized,
    {
        loop {
            match self.poll(job, grid) {
                Poll::Continue | Poll::Yield(_) => {}
                Poll::Completed => return Outcome::Completed(self.report(job)),
                Poll::Cancelled => return Outcome::Cancelled(self.report(job)),
            }
        }
    }

    /// Drive `job` to the end on a tokio runtime, yielding to the scheduler
    /// at every checkpoint.
    pub async fn run_async<J, G>(&mut self, job: &mut J, grid: &mut G) -> Outcome
    where
        J: Resumable,
        G: TileWriter + ?Sized,
    {
        loop {
            match self.poll(job, grid) {
                Poll::Continue => {}
                Poll::Yield(Checkpoint::Tick) => tokio::task::yield_now().await,
                Poll::Yield(Checkpoint::Delay(delay)) => tokio::time::sleep(delay).await,
                Poll::Completed => return Outcome::Completed(self.report(job)),
                Poll::Cancelled => return Outcome::Cancelled(self.report(job)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec2;
    use crate::grid::{commit_tile, TileGrid, TileKind};

    /// Writes one tile per unit along the first row, yielding every other unit.
    struct RowJob {
        next: i32,
        len: i32,
        written: u64,
    }

    impl RowJob {
        fn new(len: i32) -> Self {
            Self { next: 0, len, written: 0 }
        }
    }

    impl Resumable for RowJob {
        fn advance<G: TileWriter + ?Sized>(&mut self, grid: &mut G) -> Advance {
            if self.next >= self.len {
                return Advance::Done;
            }
            if commit_tile(grid, IVec2::new(self.next, 0), TileKind::Rock, true) {
                self.written += 1;
            }
            self.next += 1;
            if self.next % 2 == 0 {
                Advance::Yield(Checkpoint::Tick)
            } else {
                Advance::Continue
            }
        }

        fn tiles_committed(&self) -> u64 {
            self.written
        }
    }

    #[test]
    fn test_lifecycle_idle_running_completed() {
        let mut pipeline = GenerationPipeline::new(CancellationSignal::new());
        let mut grid = TileGrid::new(4, 1);
        let mut job = RowJob::new(2);

        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert_eq!(pipeline.poll(&mut job, &mut grid), Poll::Continue);
        assert_eq!(pipeline.state(), PipelineState::Running);
        assert_eq!(pipeline.poll(&mut job, &mut grid), Poll::Yield(Checkpoint::Tick));
        assert_eq!(pipeline.poll(&mut job, &mut grid), Poll::Completed);
        assert_eq!(pipeline.state(), PipelineState::Completed);
        assert!(pipeline.state().is_finished());

        // Finished pipelines do not touch the job again
        assert_eq!(pipeline.poll(&mut job, &mut grid), Poll::Completed);
        assert_eq!(pipeline.report(&job).units, 3);
    }

    #[test]
    fn test_run_blocking_report() {
        let mut pipeline = GenerationPipeline::new(CancellationSignal::new());
        let mut grid = TileGrid::new(6, 1);
        let mut job = RowJob::new(6);

        let outcome = pipeline.run_blocking(&mut job, &mut grid);
        assert!(outcome.is_completed());
        let report = outcome.report();
        assert_eq!(report.tiles_committed, 6);
        assert_eq!(report.checkpoints, 3);
        assert_eq!(report.units, 7);
        assert_eq!(grid.count(TileKind::Rock), 6);
    }

    #[test]
    fn test_out_of_range_writes_not_counted() {
        let mut pipeline = GenerationPipeline::new(CancellationSignal::new());
        let mut grid = TileGrid::new(3, 1);
        let mut job = RowJob::new(5);

        let outcome = pipeline.run_blocking(&mut job, &mut grid);
        assert!(outcome.is_completed());
        assert_eq!(outcome.report().tiles_committed, 3);
    }

    #[test]
    fn test_cancel_before_start_does_no_work() {
        let cancel = CancellationSignal::new();
        cancel.cancel();
        let mut pipeline = GenerationPipeline::new(cancel);
        let mut grid = TileGrid::new(4, 1);
        let mut job = RowJob::new(4);

        let outcome = pipeline.run_blocking(&mut job, &mut grid);
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.report().units, 0);
        assert_eq!(grid.unassigned(), 4);
        assert_eq!(pipeline.state(), PipelineState::Cancelled);
    }

    #[test]
    fn test_cancel_mid_run_keeps_partial_tiles() {
        let cancel = CancellationSignal::new();
        let mut pipeline = GenerationPipeline::new(cancel.clone());
        let mut grid = TileGrid::new(8, 1);
        let mut job = RowJob::new(8);

        assert_eq!(pipeline.poll(&mut job, &mut grid), Poll::Continue);
        assert_eq!(pipeline.poll(&mut job, &mut grid), Poll::Yield(Checkpoint::Tick));
        cancel.cancel();
        assert_eq!(pipeline.poll(&mut job, &mut grid), Poll::Cancelled);
        assert_eq!(pipeline.poll(&mut job, &mut grid), Poll::Cancelled);

        assert_eq!(grid.count(TileKind::Rock), 2);
        assert_eq!(pipeline.report(&job).tiles_committed, 2);
    }

    #[tokio::test]
    async fn test_run_async_completes() {
        let mut pipeline = GenerationPipeline::new(CancellationSignal::new());
        let mut grid = TileGrid::new(5, 1);
        let mut job = RowJob::new(5);

        let outcome = pipeline.run_async(&mut job, &mut grid).await;
        assert!(outcome.is_completed());
        assert_eq!(grid.count(TileKind::Rock), 5);
    }
}
