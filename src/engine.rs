//! Search execution: blocking searches on the caller's thread and
//! fire-and-forget searches on a background thread.
//!
//! An engine runs at most one background search at a time. Starting a new
//! one cancels the previous one, and a cancelled search never delivers its
//! result. Cancellation is cooperative: the search polls its token before
//! every expansion and unwinds on its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::config::SearchConfig;
use crate::errors::{PathfinderError, PathfinderResult};
use crate::geometry::Position;
use crate::grid::{CellKind, Grid};
use crate::progress::{LogObserver, ObserverChain, SearchObserver};
use crate::search::{Path, SearchOutcome, a_star};


/// Cooperative cancellation flag shared between a caller and a search
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}


const RUNNING: u8 = 0;
const FINISHED: u8 = 1;
const CANCELLED: u8 = 2;

/// Lifecycle of one background search
/// Exactly one of `finish` or `cancel` wins the transition out of RUNNING
#[derive(Debug)]
struct SearchState {
    token: CancellationToken,
    status: AtomicU8,
}

impl SearchState {

    fn new(token: CancellationToken) -> Self {
        Self { token, status: AtomicU8::new(RUNNING) }
    }

    fn is_running(&self) -> bool {
        self.status.load(Ordering::Acquire) == RUNNING
    }

    /// True if the result may be delivered
    fn finish(&self) -> bool {
        self.status
            .compare_exchange(RUNNING, FINISHED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Stops the search and suppresses its result, no-op once finished
    fn cancel(&self) {
        if self.status
            .compare_exchange(RUNNING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok() {
            self.token.cancel();
        }
    }
}


/// Owned by a worker thread, leaves RUNNING when the worker exits
/// An unwinding worker would otherwise look busy forever
struct WorkerGuard(Arc<SearchState>);

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        if thread::panicking() && self.0.is_running() {
            log::error!("search thread panicked, marking the search cancelled");
        }
        self.0.cancel();
    }
}


/// Handle to a background search
/// Dropping it detaches the search, which keeps running
#[derive(Debug)]
pub struct SearchHandle {
    state: Arc<SearchState>,
    thread: JoinHandle<()>,
}

impl SearchHandle {

    /// Cancel the search; its callback will not run unless it already finished
    pub fn cancel(&self) {
        self.state.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.status.load(Ordering::Acquire) == CANCELLED
    }

    /// True once the worker thread has exited, callback included
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the worker thread exits
    pub fn join(self) {
        if self.thread.join().is_err() {
            log::error!("search thread panicked");
        }
    }
}


/// Book-keeping shared by the sync and async entry points
#[derive(Default)]
struct InFlight {
    current: Option<Arc<SearchState>>,
    sync_searches: usize,
}


/// Decrements the running sync search count when dropped
struct SyncGuard<'a>(&'a Mutex<InFlight>);

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().sync_searches -= 1;
    }
}


/// A* pathfinder bound to one grid
///
/// The grid is shared: [`Pathfinder::update_map`] and direct updates through
/// [`Pathfinder::grid`] are visible to searches that are still running.
///
/// `find_path_sync` and `find_path_async` must not overlap on the same
/// engine; doing so fails with [`PathfinderError::ConcurrentSearchConflict`].
pub struct Pathfinder {
    grid: Arc<Grid>,
    config: SearchConfig,
    observer: Option<Arc<dyn SearchObserver>>,
    in_flight: Mutex<InFlight>,
}

impl Pathfinder {

    /// Engine over an existing grid with the default configuration
    pub fn new(grid: Arc<Grid>) -> Self {
        Self {
            grid,
            config: SearchConfig::default(),
            observer: None,
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    /// Build the grid from rows of classes and bind an engine to it
    pub fn from_cells<R>(rows: &[R]) -> PathfinderResult<Self>
    where 
        R: AsRef<[CellKind]>,
    {
        Ok(Self::new(Arc::new(Grid::build(rows)?)))
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach progress hooks, called in addition to the configured debug logging
    pub fn with_observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Applies to searches started afterwards
    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    /// Replace the cell at (row, column), ignored when out of bounds
    pub fn update_map(&self, kind: CellKind, row: usize, column: usize) {
        self.grid.update_cell(Position::new(row, column), kind);
    }

    /// Run a search on the calling thread and return its path
    /// The path is empty when there is none
    pub fn find_path_sync(&self, start: impl Into<Position>, goal: impl Into<Position>) -> PathfinderResult<Path> {
        let _guard = {
            let mut in_flight = self.in_flight.lock();
            if in_flight.current.as_ref().is_some_and(|state| state.is_running()) {
                return Err(PathfinderError::ConcurrentSearchConflict);
            }
            in_flight.sync_searches += 1;
            SyncGuard(&self.in_flight)
        };

        let outcome = run_search(
            &self.grid,
            start.into(),
            goal.into(),
            &self.config,
            self.observer.as_deref(),
            &CancellationToken::new(),
        );

        match outcome {
            SearchOutcome::Completed(path) => Ok(path),
            // the token is private to this call
            SearchOutcome::Cancelled => Ok(Path::empty()),
        }
    }

    /// Start a search on a background thread
    /// Any unfinished search started earlier by this engine is cancelled
    /// first and will not call its callback. `on_finished` runs on the
    /// background thread, once, unless this search is itself superseded.
    pub fn find_path_async<F>(&self, start: impl Into<Position>, goal: impl Into<Position>, on_finished: F) -> PathfinderResult<SearchHandle>
    where 
        F: FnOnce(Path) + Send + 'static,
    {
        self.find_path_async_with_token(start, goal, CancellationToken::new(), on_finished)
    }

    /// Like [`Pathfinder::find_path_async`] with a caller-owned token,
    /// e.g. to impose a deadline. Cancelling the token suppresses the callback.
    pub fn find_path_async_with_token<F>(
        &self,
        start: impl Into<Position>,
        goal: impl Into<Position>,
        token: CancellationToken,
        on_finished: F,
    ) -> PathfinderResult<SearchHandle>
    where 
        F: FnOnce(Path) + Send + 'static,
    {
        let (start, goal) = (start.into(), goal.into());
        let mut in_flight = self.in_flight.lock();

        if in_flight.sync_searches > 0 {
            return Err(PathfinderError::ConcurrentSearchConflict);
        }

        if let Some(previous) = in_flight.current.take() {
            if previous.is_running() {
                log::debug!("superseding the running search");
            }
            previous.cancel();
        }

        let state = Arc::new(SearchState::new(token));
        let worker_state = Arc::clone(&state);
        let grid = Arc::clone(&self.grid);
        let config = self.config;
        let observer = self.observer.clone();

        let thread = thread::Builder::new()
            .name("gridstar-search".to_string())
            .spawn(move || {
                let guard = WorkerGuard(worker_state);
                let outcome = run_search(&grid, start, goal, &config, observer.as_deref(), &guard.0.token);
                match outcome {
                    SearchOutcome::Completed(path) if guard.0.finish() => on_finished(path),
                    SearchOutcome::Completed(_) => {
                        log::debug!("dropping result of superseded search {start} -> {goal}");
                    }
                    // the guard records the cancellation
                    SearchOutcome::Cancelled => {}
                }
            })
            .map_err(|e| PathfinderError::Spawn(e.to_string()))?;

        in_flight.current = Some(Arc::clone(&state));
        Ok(SearchHandle { state, thread })
    }

    /// Cancel the running background search, if any
    pub fn cancel(&self) {
        if let Some(state) = self.in_flight.lock().current.take() {
            state.cancel();
        }
    }

    /// True while a background search started by this engine is still running
    pub fn is_searching(&self) -> bool {
        self.in_flight.lock().current.as_ref().is_some_and(|state| state.is_running())
    }
}


/// Run one search with the debug logger and the caller's observer attached
fn run_search(
    grid: &Grid,
    start: Position,
    goal: Position,
    config: &SearchConfig,
    observer: Option<&dyn SearchObserver>,
    token: &CancellationToken,
) -> SearchOutcome {
    let logger = LogObserver::new(config.debug_mode);
    let mut observers = ObserverChain::default();
    observers.push(&logger);
    if let Some(observer) = observer {
        observers.push(observer);
    }
    a_star(grid, start, goal, config, &observers, token)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::Heuristic;
    use crate::progress::StepSnapshot;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::time::Duration;

    /// Holds every expansion until opened
    #[derive(Default)]
    struct Gate {
        open: AtomicBool,
        waiting: AtomicUsize,
    }

    impl Gate {
        fn release(&self) {
            self.open.store(true, Ordering::Release);
        }

        fn wait_for_arrival(&self) {
            while self.waiting.load(Ordering::Acquire) == 0 {
                thread::sleep(Duration::from_millis(1));
            }
        }
    }

    impl SearchObserver for Gate {
        fn on_step(&self, _step: &StepSnapshot<'_>) {
            self.waiting.fetch_add(1, Ordering::AcqRel);
            while !self.open.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
        }
    }

    fn maze() -> Arc<Grid> {
        Arc::new(Grid::parse("
            00000000
            0||||||0
            0|0000|0
            0|0||0|0
            0000|000
        ").unwrap())
    }

    #[test]
    fn test_new_from_cells() {
        let finder = Pathfinder::from_cells(&[
            [CellKind::Open, CellKind::Open],
            [CellKind::Wall, CellKind::Open],
        ]).unwrap();
        assert_eq!(finder.grid().rows(), 2);
        assert_eq!(finder.config(), &SearchConfig::default());

        let rows: Vec<Vec<CellKind>> = vec![vec![CellKind::Open], vec![]];
        assert!(matches!(Pathfinder::from_cells(&rows), Err(PathfinderError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_sync_search_is_deterministic() {
        let finder = Pathfinder::new(maze())
            .with_config(SearchConfig::new().with_diagonals(true).with_heuristic(Heuristic::Diagonal));

        let first = finder.find_path_sync((4, 0), (2, 2)).unwrap();
        let second = finder.find_path_sync((4, 0), (2, 2)).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_update_map_changes_later_searches() {
        let finder = Pathfinder::new(Arc::new(Grid::open(3, 3).unwrap()));
        let before = finder.find_path_sync((0, 0), (0, 2)).unwrap();
        assert_eq!(before.cost(), 20);

        finder.update_map(CellKind::Wall, 0, 1);
        let after = finder.find_path_sync((0, 0), (0, 2)).unwrap();
        assert_eq!(after.cost(), 40);
        assert!(!after.cells().contains(&Position::new(0, 1)));

        // ignored
        finder.update_map(CellKind::Wall, 3, 0);
        finder.update_map(CellKind::Wall, 0, 3);
        assert_eq!(finder.find_path_sync((0, 0), (0, 2)).unwrap(), after);
    }

    #[test]
    fn test_set_config_applies_to_next_search() {
        let mut finder = Pathfinder::new(Arc::new(Grid::open(3, 3).unwrap()));
        assert_eq!(finder.find_path_sync((0, 0), (2, 2)).unwrap().cost(), 40);

        finder.set_config(SearchConfig::new().with_diagonals(true));
        assert_eq!(finder.find_path_sync((0, 0), (2, 2)).unwrap().cost(), 28);
    }

    #[test]
    fn test_async_delivers_result() {
        let finder = Pathfinder::new(maze());
        let (tx, rx) = mpsc::channel();

        let handle = finder.find_path_async((4, 0), (2, 2), move |path| {
            tx.send(path).unwrap();
        }).unwrap();
        handle.join();

        let path = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(path, finder.find_path_sync((4, 0), (2, 2)).unwrap());
        assert!(rx.try_recv().is_err());
        assert!(!finder.is_searching());
    }

    #[test]
    fn test_async_blocked_endpoint_delivers_empty_path() {
        let finder = Pathfinder::new(maze());
        let (tx, rx) = mpsc::channel();
        finder.find_path_async((1, 1), (0, 0), move |path| tx.send(path).unwrap()).unwrap().join();
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap().is_empty());
    }

    #[test]
    fn test_second_async_search_supersedes_first() {
        let gate = Arc::new(Gate::default());
        let finder = Pathfinder::new(maze()).with_observer(gate.clone());
        let (tx, rx) = mpsc::channel();

        let first_tx = tx.clone();
        let first = finder.find_path_async((4, 0), (2, 2), move |path| {
            first_tx.send((1, path)).unwrap();
        }).unwrap();
        let second = finder.find_path_async((4, 0), (4, 7), move |path| {
            tx.send((2, path)).unwrap();
        }).unwrap();

        assert!(first.is_cancelled());
        assert!(finder.is_searching());
        gate.release();
        first.join();
        second.join();

        let delivered: Vec<(u8, Path)> = rx.iter().collect();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, 2);
        assert_eq!(delivered[0].1.goal(), Some(Position::new(4, 7)));
    }

    #[test]
    fn test_caller_token_suppresses_callback() {
        let gate = Arc::new(Gate::default());
        let finder = Pathfinder::new(maze()).with_observer(gate.clone());
        let (tx, rx) = mpsc::channel::<Path>();
        let token = CancellationToken::new();

        let handle = finder.find_path_async_with_token((4, 0), (2, 2), token.clone(), move |path| {
            tx.send(path).unwrap();
        }).unwrap();
        gate.wait_for_arrival();
        token.cancel();
        gate.release();

        while !handle.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(handle.is_cancelled());
        handle.join();
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_engine_cancel() {
        let gate = Arc::new(Gate::default());
        let finder = Pathfinder::new(maze()).with_observer(gate.clone());
        let (tx, rx) = mpsc::channel::<Path>();

        let handle = finder.find_path_async((4, 0), (2, 2), move |path| tx.send(path).unwrap()).unwrap();
        finder.cancel();
        assert!(!finder.is_searching());
        gate.release();
        handle.join();
        assert!(rx.recv().is_err());
    }

    /// Panics on the first expansion it sees, then behaves
    #[derive(Default)]
    struct PanicOnce {
        fired: AtomicBool,
    }

    impl SearchObserver for PanicOnce {
        fn on_step(&self, _step: &StepSnapshot<'_>) {
            if !self.fired.swap(true, Ordering::AcqRel) {
                panic!("observer failure");
            }
        }
    }

    #[test]
    fn test_panicking_worker_releases_engine() {
        let finder = Pathfinder::new(maze()).with_observer(Arc::new(PanicOnce::default()));
        let (tx, rx) = mpsc::channel::<Path>();

        let handle = finder.find_path_async((4, 0), (2, 2), move |path| tx.send(path).unwrap()).unwrap();
        while !handle.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(handle.is_cancelled());
        handle.join();

        assert!(rx.recv().is_err());
        assert!(!finder.is_searching());
        let path = finder.find_path_sync((4, 0), (2, 2)).unwrap();
        assert!(!path.is_empty());
    }

    #[test]
    fn test_sync_during_async_conflicts() {
        let gate = Arc::new(Gate::default());
        let finder = Pathfinder::new(maze()).with_observer(gate.clone());

        let handle = finder.find_path_async((4, 0), (2, 2), |_| {}).unwrap();
        assert_eq!(finder.find_path_sync((4, 0), (2, 2)), Err(PathfinderError::ConcurrentSearchConflict));

        gate.release();
        handle.join();
        assert!(finder.find_path_sync((4, 0), (2, 2)).is_ok());
    }

    #[test]
    fn test_async_during_sync_conflicts() {
        let gate = Arc::new(Gate::default());
        let finder = Pathfinder::new(maze()).with_observer(gate.clone());

        thread::scope(|scope| {
            let sync = scope.spawn(|| finder.find_path_sync((4, 0), (2, 2)));
            gate.wait_for_arrival();

            let result = finder.find_path_async((4, 0), (2, 2), |_| {});
            assert!(matches!(result, Err(PathfinderError::ConcurrentSearchConflict)));

            gate.release();
            let path = sync.join().unwrap().unwrap();
            assert!(!path.is_empty());
        });

        // the guard was released with the sync search
        finder.find_path_async((4, 0), (2, 2), |_| {}).unwrap().join();
    }

    #[test]
    fn test_grid_update_during_async_search() {
        let gate = Arc::new(Gate::default());
        let finder = Pathfinder::new(Arc::new(Grid::open(4, 4).unwrap())).with_observer(gate.clone());
        let (tx, rx) = mpsc::channel();

        let handle = finder.find_path_async((0, 0), (3, 3), move |path| tx.send(path).unwrap()).unwrap();
        gate.wait_for_arrival();
        finder.update_map(CellKind::Wall, 1, 1);
        finder.update_map(CellKind::Wall, 2, 2);
        gate.release();
        handle.join();

        // either terrain may have been seen, the result is still a route
        let path = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(path.start(), Some(Position::new(0, 0)));
        assert_eq!(path.goal(), Some(Position::new(3, 3)));
        assert_eq!(path.cost(), 60);
    }
}
