//! Timer-driven owner of the evolving population.
//!
//! All mutation happens under one lock. A ticker carries the arm epoch it
//! was spawned with and only ticks while that epoch is current, so once
//! `stop` or `reset` returns no further tick can land, even if the aborted
//! task was already waiting on the lock.
//!
//! The ticker's handle lives outside that lock, so teardown can always abort
//! it, even mid-tick.

use std::sync::{Arc, PoisonError, Weak};
use std::time::Duration;

use genesis::evolution::{Evolution, TICK_INTERVAL_MS};
use genesis::node::ArchitectureNode;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// What the presentation side sees: republished after every tick, start,
/// stop, and reset.
#[derive(Debug, Clone)]
pub struct PopulationView {
    pub running: bool,
    pub nodes: Arc<[ArchitectureNode]>,
}

struct SimState {
    evolution: Evolution,
    running: bool,
    epoch: u64,
    publisher: watch::Sender<PopulationView>,
}

impl SimState {
    fn publish(&self) {
        self.publisher.send_replace(PopulationView {
            running: self.running,
            nodes: Arc::from(self.evolution.nodes()),
        });
    }

    fn disarm(&mut self) {
        self.running = false;
        self.epoch = self.epoch.wrapping_add(1);
    }
}

pub struct Simulator {
    shared: Arc<Mutex<SimState>>,
    ticker: std::sync::Mutex<Option<JoinHandle<()>>>,
    view: watch::Receiver<PopulationView>,
    period: Duration,
}

impl Simulator {
    pub fn new(seed: u64) -> Self {
        Self::with_period(seed, Duration::from_millis(TICK_INTERVAL_MS))
    }

    /// Same as `new` with a custom cadence; tests use this to avoid waiting
    /// two seconds per tick.
    pub(crate) fn with_period(seed: u64, period: Duration) -> Self {
        let evolution = Evolution::new(seed);
        let (publisher, view) = watch::channel(PopulationView {
            running: false,
            nodes: Arc::from(evolution.nodes()),
        });
        Self {
            shared: Arc::new(Mutex::new(SimState {
                evolution,
                running: false,
                epoch: 0,
                publisher,
            })),
            ticker: std::sync::Mutex::new(None),
            view,
            period,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PopulationView> {
        self.view.clone()
    }

    pub fn snapshot(&self) -> PopulationView {
        self.view.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.view.borrow().running
    }

    /// Replaces the ticker handle, aborting the old task if any. Never held
    /// across an await.
    fn swap_ticker(&self, next: Option<JoinHandle<()>>) {
        let mut slot = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = std::mem::replace(&mut *slot, next) {
            old.abort();
        }
    }

    /// Arms the tick timer. Any previous ticker is disarmed first, so calling
    /// this twice still leaves exactly one. Returns whether it was already
    /// armed.
    pub async fn start(&self) -> bool {
        let mut state = self.shared.lock().await;
        let was_running = state.running;
        state.disarm();
        state.running = true;
        let epoch = state.epoch;
        self.swap_ticker(Some(tokio::spawn(run_ticker(
            Arc::downgrade(&self.shared),
            epoch,
            self.period,
        ))));
        state.publish();
        info!(epoch, size = state.evolution.len(), "Simulation started");
        was_running
    }

    /// Disarms the tick timer. Returns whether it was armed.
    pub async fn stop(&self) -> bool {
        let mut state = self.shared.lock().await;
        let was_running = state.running;
        state.disarm();
        self.swap_ticker(None);
        state.publish();
        if was_running {
            info!(size = state.evolution.len(), "Simulation stopped");
        }
        was_running
    }

    /// Stop and reseed in one critical section.
    pub async fn reset(&self) {
        let mut state = self.shared.lock().await;
        state.disarm();
        self.swap_ticker(None);
        state.evolution.reset();
        state.publish();
        info!("Simulation reset to a single seed node");
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.swap_ticker(None);
        // A ticker mid-tick holds the lock; the abort above ends it at its
        // next await.
        if let Ok(mut state) = self.shared.try_lock() {
            state.disarm();
        }
    }
}

async fn run_ticker(shared: Weak<Mutex<SimState>>, epoch: u64, period: Duration) {
    let mut interval = time::interval_at(time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let Some(strong) = shared.upgrade() else {
            break;
        };
        let mut state = strong.lock().await;
        if state.epoch != epoch {
            break;
        }

        let node = state.evolution.tick();
        debug!(
            id = %node.id,
            parent = node.parent_id.as_deref().unwrap_or("-"),
            generation = node.generation,
            accuracy = node.accuracy,
            "Tick"
        );
        state.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesis::evolution::MAX_POPULATION;

    const PERIOD: Duration = Duration::from_millis(20);

    async fn wait_for_ticks(rx: &mut watch::Receiver<PopulationView>, n: usize) {
        for _ in 0..n {
            time::timeout(Duration::from_secs(2), rx.changed())
                .await
                .expect("tick timed out")
                .expect("publisher dropped");
        }
    }

    #[tokio::test]
    async fn starts_with_a_single_seed() {
        let sim = Simulator::with_period(1, PERIOD);
        let view = sim.snapshot();
        assert!(!view.running);
        assert_eq!(view.nodes.len(), 1);
        assert_eq!(view.nodes[0].generation, 0);
    }

    #[tokio::test]
    async fn running_simulation_publishes_growth() {
        let sim = Simulator::with_period(2, PERIOD);
        let mut rx = sim.subscribe();
        sim.start().await;
        assert!(sim.is_running());
        rx.borrow_and_update();

        wait_for_ticks(&mut rx, 3).await;
        let view = rx.borrow_and_update().clone();
        assert!(view.running);
        assert!(view.nodes.len() >= 4);
        assert!(view.nodes.len() <= MAX_POPULATION);
        let latest = view.nodes.last().unwrap();
        assert!(latest.generation >= 1);
        sim.stop().await;
    }

    #[tokio::test]
    async fn no_ticks_while_stopped() {
        let sim = Simulator::with_period(3, PERIOD);
        time::sleep(PERIOD * 5).await;
        assert_eq!(sim.snapshot().nodes.len(), 1);

        let mut rx = sim.subscribe();
        sim.start().await;
        rx.borrow_and_update();
        wait_for_ticks(&mut rx, 1).await;

        assert!(sim.stop().await);
        assert!(!sim.stop().await);
        let frozen = sim.snapshot().nodes.len();
        time::sleep(PERIOD * 5).await;
        assert_eq!(sim.snapshot().nodes.len(), frozen);
        assert!(!sim.is_running());
    }

    #[tokio::test]
    async fn restarting_leaves_one_ticker() {
        let sim = Simulator::with_period(4, PERIOD);
        let mut rx = sim.subscribe();
        sim.start().await;
        sim.start().await;
        rx.borrow_and_update();
        wait_for_ticks(&mut rx, 2).await;

        // One stop must silence everything started above.
        sim.stop().await;
        let frozen = sim.snapshot().nodes.len();
        time::sleep(PERIOD * 5).await;
        assert_eq!(sim.snapshot().nodes.len(), frozen);
    }

    #[tokio::test]
    async fn reset_mid_run_reseeds_and_stays_stopped() {
        let sim = Simulator::with_period(5, PERIOD);
        let mut rx = sim.subscribe();
        sim.start().await;
        rx.borrow_and_update();
        wait_for_ticks(&mut rx, 3).await;

        sim.reset().await;
        let view = sim.snapshot();
        assert!(!view.running);
        assert_eq!(view.nodes.len(), 1);
        assert_eq!(view.nodes[0].generation, 0);
        assert!(view.nodes[0].parent_id.is_none());

        time::sleep(PERIOD * 5).await;
        assert_eq!(sim.snapshot().nodes.len(), 1);

        sim.start().await;
        rx.borrow_and_update();
        wait_for_ticks(&mut rx, 1).await;
        assert!(sim.snapshot().nodes.len() >= 2);
        sim.stop().await;
    }

    #[tokio::test]
    async fn start_reports_previous_run_flag() {
        let sim = Simulator::with_period(7, PERIOD);
        assert!(!sim.start().await);
        assert!(sim.start().await);
        sim.stop().await;
        assert!(!sim.start().await);
        sim.reset().await;
        assert!(!sim.start().await);
        sim.stop().await;
    }

    #[tokio::test]
    async fn dropping_mid_tick_still_releases_the_timer() {
        let sim = Simulator::with_period(8, PERIOD);
        sim.start().await;

        // Keep the state alive and locked, as a ticker in the middle of a tick
        // would, so drop can neither bump the epoch nor rely on the weak
        // handle failing.
        let shared = Arc::clone(&sim.shared);
        let guard = shared.lock().await;
        let size = guard.evolution.len();
        drop(sim);
        drop(guard);

        time::sleep(PERIOD * 6).await;
        assert_eq!(shared.lock().await.evolution.len(), size);
    }

    #[tokio::test]
    async fn dropping_the_simulator_closes_the_feed() {
        let sim = Simulator::with_period(6, PERIOD);
        let mut rx = sim.subscribe();
        sim.start().await;
        rx.borrow_and_update();
        drop(sim);

        let closed = time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .expect("feed still open");
        assert!(closed.is_err());
    }
}
