//! Dashboard view: two concurrent aggregate requests joined into one
//! [`Dashboard`].
use std::sync::mpsc;
use std::thread;

use super::{CancelToken, ViewState};
use crate::aggregate::Dashboard;
use crate::analytics::events::{self, EventKind};
use crate::api::{ApiError, Backend, endpoints};
use crate::models::{DashboardStats, ProgramPerformance};

/// One of the two dashboard responses.
#[derive(Debug)]
pub enum Arrival {
    Stats(Result<DashboardStats, ApiError>),
    Performance(Result<Vec<ProgramPerformance>, ApiError>),
}

pub struct DashboardView<'a> {
    backend: &'a dyn Backend,
    stats: Option<DashboardStats>,
    performance: Option<Vec<ProgramPerformance>>,
    state: ViewState<Dashboard>,
    cancel: CancelToken,
}

impl<'a> DashboardView<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            stats: None,
            performance: None,
            state: ViewState::Loading,
            cancel: CancelToken::new(),
        }
    }

    pub fn state(&self) -> &ViewState<Dashboard> {
        &self.state
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    /// Reset to `Loading` and forget any earlier arrivals.
    pub fn begin(&mut self) {
        self.stats = None;
        self.performance = None;
        self.state = ViewState::Loading;
    }

    /// Issue both requests at once and wait for them.
    pub fn load(&mut self) -> &ViewState<Dashboard> {
        if self.cancel.is_cancelled() {
            return &self.state;
        }
        self.begin();

        let backend = self.backend;
        let (tx, rx) = mpsc::channel();
        thread::scope(|scope| {
            let stats_tx = tx.clone();
            scope.spawn(move || {
                let _ = stats_tx.send(Arrival::Stats(endpoints::dashboard_stats(backend)));
            });
            scope.spawn(move || {
                let _ = tx.send(Arrival::Performance(endpoints::program_performance(backend)));
            });

            for arrival in rx {
                self.accept(arrival);
            }
        });

        &self.state
    }

    /// Feed one response into the view.
    ///
    /// The view stays `Loading` until both responses have succeeded. The
    /// first failure settles it as `Failed`; anything arriving after the
    /// view has settled or been cancelled is dropped.
    pub fn accept(&mut self, arrival: Arrival) {
        if self.cancel.is_cancelled() || !self.state.is_loading() {
            return;
        }

        let failure = match arrival {
            Arrival::Stats(Ok(stats)) => {
                self.stats = Some(stats);
                None
            }
            Arrival::Performance(Ok(rows)) => {
                self.performance = Some(rows);
                None
            }
            Arrival::Stats(Err(e)) => Some((endpoints::DASHBOARD_STATS, e)),
            Arrival::Performance(Err(e)) => Some((endpoints::PROGRAM_PERFORMANCE, e)),
        };

        if let Some((path, e)) = failure {
            events::record(EventKind::FetchFailed, path, &e.to_string());
            self.state = ViewState::Failed(e.to_string());
            return;
        }

        if let (Some(stats), Some(performance)) = (&self.stats, &self.performance) {
            self.state = ViewState::Loaded(Dashboard::build(stats, performance));
        }
    }
}
