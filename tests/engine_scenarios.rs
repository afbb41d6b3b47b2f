//! End-to-end enforcement scenarios against the engine and the in-memory store.

mod common;

use chrono::Duration;
use common::{at, fleet_at, monday_noon};
use rust_decimal_macros::dec;
use spendguard::campaign::{PauseReason, RunState};
use spendguard::engine::EngineError;
use spendguard::events::BudgetEvent;
use spendguard::state_machine::Trigger;

#[tokio::test]
async fn test_spend_over_daily_budget_pauses() {
    let fleet = fleet_at(monday_noon()).await;
    fleet.campaign(1, dec!(10), dec!(1000)).await;

    fleet.engine.record_spend(1, dec!(6)).await.unwrap();
    let receipt = fleet.engine.record_spend(1, dec!(5)).await.unwrap();
    assert_eq!(receipt.daily_spend, dec!(11));

    fleet.engine.run_tick().await.unwrap();

    let status = fleet.engine.get_status(1).await.unwrap();
    assert_eq!(status.daily_spend, dec!(11));
    assert_eq!(
        status.run_state,
        RunState::Paused(PauseReason::DailyBudgetExceeded)
    );
    assert_eq!(status.reason, Some(PauseReason::DailyBudgetExceeded));
}

#[tokio::test]
async fn test_daily_reset_reactivates_budget_pause() {
    let fleet = fleet_at(monday_noon()).await;
    fleet.campaign(1, dec!(10), dec!(1000)).await;
    fleet.engine.record_spend(1, dec!(10)).await.unwrap();
    assert!(fleet.engine.get_status(1).await.unwrap().run_state.is_paused());

    fleet.clock.advance(Duration::hours(12));
    // Ticks never release a budget pause.
    fleet.engine.run_tick().await.unwrap();
    assert_eq!(
        fleet.engine.get_status(1).await.unwrap().run_state,
        RunState::Paused(PauseReason::DailyBudgetExceeded)
    );

    let report = fleet.engine.run_daily_reset().await.unwrap();
    assert_eq!(report.transitions.len(), 1);
    assert_eq!(report.transitions[0].cause, Trigger::DailyReset);

    let status = fleet.engine.get_status(1).await.unwrap();
    assert_eq!(status.daily_spend, dec!(0));
    assert_eq!(status.monthly_spend, dec!(10));
    assert_eq!(status.run_state, RunState::Active);
    assert_eq!(status.reason, None);
}

#[tokio::test]
async fn test_dayparting_window_pauses_and_resumes() {
    let fleet = fleet_at(at(2025, 6, 9, 8, 0)).await;
    fleet.campaign(1, dec!(100), dec!(1000)).await;
    fleet.window(1, 0, "09:00", "17:00").await;

    fleet.engine.run_tick().await.unwrap();
    assert_eq!(
        fleet.engine.get_status(1).await.unwrap().run_state,
        RunState::Paused(PauseReason::OutsideDaypartingHours)
    );

    fleet.clock.set(at(2025, 6, 9, 9, 0));
    let report = fleet.engine.run_tick().await.unwrap();
    assert_eq!(report.transitions.len(), 1);
    assert_eq!(
        fleet.engine.get_status(1).await.unwrap().run_state,
        RunState::Active
    );

    fleet.clock.set(at(2025, 6, 9, 17, 1));
    fleet.engine.run_tick().await.unwrap();
    assert_eq!(
        fleet.engine.get_status(1).await.unwrap().run_state,
        RunState::Paused(PauseReason::OutsideDaypartingHours)
    );

    // Tuesday has no window for this campaign, so it runs all day.
    fleet.clock.set(at(2025, 6, 10, 22, 0));
    fleet.engine.run_tick().await.unwrap();
    let status = fleet.engine.get_status(1).await.unwrap();
    assert_eq!(status.run_state, RunState::Active);
    assert!(status.within_daypart);
    assert!(status.todays_windows.is_empty());
}

#[tokio::test]
async fn test_inactive_window_does_not_gate() {
    let fleet = fleet_at(monday_noon()).await;
    fleet.campaign(1, dec!(100), dec!(1000)).await;
    fleet.schedule(1, 0, "09:00", "10:00", false).await;

    fleet.engine.run_tick().await.unwrap();

    let status = fleet.engine.get_status(1).await.unwrap();
    assert_eq!(status.run_state, RunState::Active);
    assert!(status.within_daypart);
}

#[tokio::test]
async fn test_window_on_another_weekday_does_not_gate_today() {
    let fleet = fleet_at(monday_noon()).await;
    fleet.campaign(1, dec!(100), dec!(1000)).await;
    fleet.window(1, 1, "09:00", "17:00").await;

    fleet.engine.run_tick().await.unwrap();
    let status = fleet.engine.get_status(1).await.unwrap();
    assert_eq!(status.run_state, RunState::Active);
    assert!(status.todays_windows.is_empty());

    // Tuesday evening is outside its only window.
    fleet.clock.set(at(2025, 6, 10, 20, 0));
    fleet.engine.run_tick().await.unwrap();
    assert_eq!(
        fleet.engine.get_status(1).await.unwrap().run_state,
        RunState::Paused(PauseReason::OutsideDaypartingHours)
    );
}

#[tokio::test]
async fn test_window_reopening_respects_exhausted_budget() {
    let fleet = fleet_at(at(2025, 6, 9, 8, 0)).await;
    fleet.campaign(1, dec!(20), dec!(1000)).await;
    fleet.window(1, 0, "09:00", "17:00").await;
    fleet.engine.run_tick().await.unwrap();

    // Spend outside the window still counts.
    fleet.engine.record_spend(1, dec!(25)).await.unwrap();
    fleet.clock.set(at(2025, 6, 9, 9, 30));
    fleet.engine.run_tick().await.unwrap();

    assert_eq!(
        fleet.engine.get_status(1).await.unwrap().run_state,
        RunState::Paused(PauseReason::DailyBudgetExceeded)
    );
}

#[tokio::test]
async fn test_manual_pause_survives_every_cycle() {
    let fleet = fleet_at(at(2025, 7, 1, 0, 5)).await;
    fleet.campaign(1, dec!(100), dec!(1000)).await;
    fleet.engine.pause(1).await.unwrap();

    fleet.engine.run_tick().await.unwrap();
    fleet.engine.run_daily_reset().await.unwrap();
    let monthly = fleet.engine.run_monthly_reset().await.unwrap();
    assert!(!monthly.skipped);
    fleet.engine.run_full_reset().await.unwrap();

    let status = fleet.engine.get_status(1).await.unwrap();
    assert_eq!(status.run_state, RunState::Paused(PauseReason::Manual));

    let receipt = fleet.engine.resume(1).await.unwrap();
    assert_eq!(receipt.run_state, RunState::Active);
}

#[tokio::test]
async fn test_first_spend_of_month_seeds_monthly_counter() {
    let fleet = fleet_at(at(2025, 6, 30, 22, 0)).await;
    fleet.campaign(1, dec!(100), dec!(1000)).await;
    fleet.engine.record_spend(1, dec!(40)).await.unwrap();

    fleet.clock.set(at(2025, 7, 1, 0, 0));
    let receipt = fleet.engine.record_spend(1, dec!(5)).await.unwrap();
    assert_eq!(receipt.monthly_spend, dec!(5));
    assert_eq!(receipt.daily_spend, dec!(5));

    // A monthly reset running after that first spend keeps it.
    fleet.engine.run_monthly_reset().await.unwrap();
    let status = fleet.engine.get_status(1).await.unwrap();
    assert_eq!(status.monthly_spend, dec!(5));
}

#[tokio::test]
async fn test_monthly_reset_releases_monthly_pause() {
    let fleet = fleet_at(at(2025, 6, 30, 10, 0)).await;
    fleet.campaign(1, dec!(500), dec!(100)).await;
    fleet.engine.record_spend(1, dec!(100)).await.unwrap();
    assert_eq!(
        fleet.engine.get_status(1).await.unwrap().run_state,
        RunState::Paused(PauseReason::MonthlyBudgetExceeded)
    );

    fleet.clock.set(at(2025, 7, 1, 0, 0));
    fleet.engine.run_daily_reset().await.unwrap();
    assert_eq!(
        fleet.engine.get_status(1).await.unwrap().run_state,
        RunState::Paused(PauseReason::MonthlyBudgetExceeded)
    );

    let report = fleet.engine.run_monthly_reset().await.unwrap();
    assert_eq!(report.cycle_id, "monthly:2025-07-01");
    assert_eq!(
        fleet.engine.get_status(1).await.unwrap().run_state,
        RunState::Active
    );
}

#[tokio::test]
async fn test_daily_limit_wins_tie_with_monthly() {
    let fleet = fleet_at(monday_noon()).await;
    fleet.campaign(1, dec!(100), dec!(100)).await;

    fleet.engine.record_spend(1, dec!(100)).await.unwrap();

    assert_eq!(
        fleet.engine.get_status(1).await.unwrap().run_state,
        RunState::Paused(PauseReason::DailyBudgetExceeded)
    );
}

#[tokio::test]
async fn test_spend_accumulates_within_a_day() {
    let fleet = fleet_at(monday_noon()).await;
    fleet.campaign(1, dec!(1000), dec!(5000)).await;

    fleet.engine.record_spend(1, dec!(12.25)).await.unwrap();
    fleet.engine.record_spend(1, dec!(0.75)).await.unwrap();

    let status = fleet.engine.get_status(1).await.unwrap();
    assert_eq!(status.daily_spend, dec!(13.00));
    assert_eq!(status.daily_remaining, dec!(987));
}

#[tokio::test]
async fn test_negative_spend_is_rejected() {
    let fleet = fleet_at(monday_noon()).await;
    fleet.campaign(1, dec!(10), dec!(100)).await;

    let err = fleet.engine.record_spend(1, dec!(-1)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert_eq!(fleet.engine.get_status(1).await.unwrap().daily_spend, dec!(0));

    let err = fleet.engine.record_spend(99, dec!(1)).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownCampaign(99)));
}

#[tokio::test]
async fn test_pause_reason_present_only_when_paused() {
    let fleet = fleet_at(at(2025, 6, 9, 8, 0)).await;
    fleet.campaign(1, dec!(10), dec!(100)).await;
    fleet.campaign(2, dec!(10), dec!(100)).await;
    fleet.campaign(3, dec!(10), dec!(100)).await;
    fleet.window(2, 0, "09:00", "10:00").await;
    fleet.engine.record_spend(3, dec!(50)).await.unwrap();
    fleet.engine.run_tick().await.unwrap();
    fleet.engine.deactivate(1).await.unwrap();

    for id in 1..=3 {
        let status = fleet.engine.get_status(id).await.unwrap();
        assert_eq!(status.reason.is_some(), status.run_state.is_paused());
    }
}

#[tokio::test]
async fn test_transitions_reach_the_event_log() {
    let fleet = fleet_at(monday_noon()).await;
    fleet.campaign(1, dec!(10), dec!(100)).await;
    fleet.engine.record_spend(1, dec!(10)).await.unwrap();
    fleet.engine.run_tick().await.unwrap();

    let events = fleet.events.recent(10);
    let transition = events
        .iter()
        .find_map(|e| match e {
            BudgetEvent::Transition(t) => Some(t),
            _ => None,
        })
        .expect("transition recorded");
    assert_eq!(transition.campaign_id, 1);
    assert_eq!(transition.from, RunState::Active);
    assert_eq!(transition.cause, Trigger::Spend);
    assert!(events
        .iter()
        .any(|e| matches!(e, BudgetEvent::CycleCompleted(_))));
}
