/// Dashboard view tests: the two aggregate requests, arrival order and
/// chart derivation.
mod common;

use common::{MockBackend, unreachable};
use ironlady::aggregate::Band;
use ironlady::api::endpoints::{DASHBOARD_STATS, PROGRAM_PERFORMANCE};
use ironlady::models::{DashboardStats, ProgramPerformance};
use ironlady::view::{Arrival, DashboardView, ViewState};
use serde_json::{Value, json};

fn stats_json() -> Value {
    json!({
        "total_participants": 1250,
        "active_programs": 4,
        "total_enrollments": "5",
        "completion_rate": 40.0,
        "enrollments_by_status": { "Active": 3, "Completed": 2 },
        "enrollments_by_program_type": { "Leadership Essentials": 4, "Masterclass": 1 },
        "recent_enrollments": [
            { "id": 9, "participant_id": 1, "program_id": 2, "full_name": "Asha", "status": "Active" }
        ]
    })
}

fn performance_json() -> Value {
    json!([
        { "program_name": "Leadership Essentials", "program_type": "Leadership Essentials",
          "total_enrollments": 4, "avg_progress": "80.5", "avg_attendance": 90, "completions": 2 },
        { "program_name": "Masterclass", "program_type": "Masterclass",
          "total_enrollments": 1, "avg_progress": 20, "avg_attendance": 50, "completions": 0 }
    ])
}

fn healthy_backend() -> MockBackend {
    MockBackend::new(|req| match req.path.as_str() {
        DASHBOARD_STATS => Ok(stats_json()),
        PROGRAM_PERFORMANCE => Ok(performance_json()),
        _ => Err(unreachable(req)),
    })
}

#[test]
fn load_issues_both_requests_and_builds_dashboard() {
    let backend = healthy_backend();
    let mut view = DashboardView::new(&backend);

    let ViewState::Loaded(dashboard) = view.load() else {
        panic!("dashboard did not load");
    };

    assert_eq!(dashboard.cards.len(), 4);
    assert_eq!(dashboard.cards[0].value, "1,250");
    assert_eq!(dashboard.cards[2].value, "5");
    assert_eq!(dashboard.cards[3].value, "40%");

    assert_eq!(dashboard.status_slices.len(), 2);
    let total: u64 = dashboard.status_slices.iter().map(|s| s.value).sum();
    assert_eq!(total, 5);
    assert_eq!(dashboard.status_slices[0].label(), "Active (60%)");

    assert_eq!(dashboard.performance.len(), 2);
    assert_eq!(dashboard.performance[0].progress_band, Band::High);
    assert_eq!(dashboard.performance[1].progress_band, Band::Low);
    assert_eq!(dashboard.recent_enrollments.len(), 1);

    let mut paths: Vec<_> = backend.calls().into_iter().map(|c| c.path).collect();
    paths.sort();
    assert_eq!(paths, vec![PROGRAM_PERFORMANCE, DASHBOARD_STATS]);
}

#[test]
fn one_arrival_keeps_loading() {
    let backend = healthy_backend();
    let mut view = DashboardView::new(&backend);
    view.begin();

    view.accept(Arrival::Performance(Ok(vec![ProgramPerformance::default()])));
    assert!(view.state().is_loading());

    view.accept(Arrival::Stats(Ok(DashboardStats::default())));
    assert!(matches!(view.state(), ViewState::Loaded(_)));
}

#[test]
fn arrival_order_does_not_matter() {
    let backend = healthy_backend();
    let stats: DashboardStats = serde_json::from_value(stats_json()).unwrap();
    let perf: Vec<ProgramPerformance> = serde_json::from_value(performance_json()).unwrap();

    let mut first = DashboardView::new(&backend);
    first.begin();
    first.accept(Arrival::Stats(Ok(stats.clone())));
    first.accept(Arrival::Performance(Ok(perf.clone())));

    let mut second = DashboardView::new(&backend);
    second.begin();
    second.accept(Arrival::Performance(Ok(perf)));
    second.accept(Arrival::Stats(Ok(stats)));

    assert_eq!(first.state(), second.state());
}

#[test]
fn any_failure_fails_the_dashboard() {
    let backend = MockBackend::new(|req| match req.path.as_str() {
        DASHBOARD_STATS => Ok(stats_json()),
        _ => Err(unreachable(req)),
    });
    let mut view = DashboardView::new(&backend);

    let state = view.load();
    assert!(state.error().is_some_and(|e| e.contains("connection refused")));
}

#[test]
fn late_success_after_failure_is_ignored() {
    let backend = healthy_backend();
    let mut view = DashboardView::new(&backend);
    view.begin();

    let req = ironlady::api::ApiRequest::get(DASHBOARD_STATS);
    view.accept(Arrival::Stats(Err(unreachable(&req))));
    view.accept(Arrival::Performance(Ok(Vec::new())));
    view.accept(Arrival::Stats(Ok(DashboardStats::default())));

    assert!(view.state().error().is_some());
}

#[test]
fn cancelled_dashboard_sends_nothing() {
    let backend = healthy_backend();
    let mut view = DashboardView::new(&backend);
    view.unmount();

    assert!(view.load().is_loading());
    assert!(backend.calls().is_empty());
}
