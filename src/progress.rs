//! Progress reporting hooks.
//!
//! Observers see read-only views of a running search. They cannot change
//! its outcome, only watch it. The engine does not throttle them: a slow
//! observer slows the search down by exactly as much as it blocks.

use std::time::Duration;

use crate::collections::FxIndexSet;
use crate::config::DebugMode;
use crate::geometry::Position;
use crate::grid::Grid;
use crate::render::render_state;
use crate::search::{Path, SearchNode, shortest_path};


/// Hooks invoked by a search, both default to doing nothing
pub trait SearchObserver: Send + Sync {

    /// Called once per expansion, before the current node is tested against the goal
    fn on_step(&self, _step: &StepSnapshot<'_>) {}

    /// Called once when a search terminates with or without a path
    /// Not called for a search that was cancelled
    fn on_result(&self, _report: &SearchReport<'_>) {}
}


/// View of one expansion step
pub struct StepSnapshot<'a> {
    pub(crate) grid: &'a Grid,
    pub(crate) start: Position,
    pub(crate) goal: Position,
    pub(crate) current: usize,
    pub(crate) nodes: &'a [SearchNode],
    pub(crate) closed: &'a FxIndexSet<Position>,
    pub(crate) open_len: usize,
}

impl<'a> StepSnapshot<'a> {

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    /// Node being expanded
    pub fn current(&self) -> Position {
        self.nodes[self.current].position
    }

    pub fn g_score(&self) -> u32 {
        self.nodes[self.current].g_score
    }

    pub fn f_score(&self) -> u32 {
        self.nodes[self.current].f_score
    }

    /// Expanded positions, in expansion order
    pub fn closed_set(&self) -> &'a FxIndexSet<Position> {
        self.closed
    }

    /// Open set size, may include superseded entries
    pub fn open_len(&self) -> usize {
        self.open_len
    }

    /// Best known route from start to the current node
    pub fn trail(&self) -> Vec<Position> {
        shortest_path(self.nodes, self.current)
    }
}


/// Summary handed to [`SearchObserver::on_result`]
pub struct SearchReport<'a> {
    pub(crate) grid: &'a Grid,
    pub(crate) start: Position,
    pub(crate) goal: Position,
    pub(crate) path: &'a Path,
    pub(crate) expanded: usize,
    pub(crate) elapsed: Duration,
}

impl<'a> SearchReport<'a> {

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn path_found(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn path(&self) -> &'a Path {
        self.path
    }

    /// Number of nodes moved to the closed set
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}


/// Observer used when no hooks are wanted
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}


/// Writes grid snapshots through the `log` facade according to a [`DebugMode`]
pub struct LogObserver {
    mode: DebugMode,
}

impl LogObserver {

    pub fn new(mode: DebugMode) -> Self {
        Self { mode }
    }
}

impl SearchObserver for LogObserver {

    fn on_step(&self, step: &StepSnapshot<'_>) {
        if self.mode == DebugMode::LogProgress {
            log::debug!(
                "expanding {} g={} f={} closed={}\n{}",
                step.current(),
                step.g_score(),
                step.f_score(),
                step.closed_set().len(),
                render_state(step.grid(), step.start(), step.goal(), &step.trail()),
            );
        }
    }

    fn on_result(&self, report: &SearchReport<'_>) {
        if self.mode == DebugMode::Disabled {
            return;
        }
        log::info!(
            "{}\npath found {}, {} steps, cost {}, expanded {} nodes, took {:?}",
            render_state(report.grid(), report.start(), report.goal(), report.path().cells()),
            report.path_found(),
            report.path().steps(),
            report.path().cost(),
            report.expanded(),
            report.elapsed(),
        );
    }
}


/// Fans every callback out to a list of observers, in order
#[derive(Default)]
pub(crate) struct ObserverChain<'a> {
    observers: Vec<&'a dyn SearchObserver>,
}

impl<'a> ObserverChain<'a> {

    pub(crate) fn push(&mut self, observer: &'a dyn SearchObserver) {
        self.observers.push(observer);
    }
}

impl SearchObserver for ObserverChain<'_> {

    fn on_step(&self, step: &StepSnapshot<'_>) {
        for observer in &self.observers {
            observer.on_step(step);
        }
    }

    fn on_result(&self, report: &SearchReport<'_>) {
        for observer in &self.observers {
            observer.on_result(report);
        }
    }
}
