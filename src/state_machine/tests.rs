use super::*;
use crate::campaign::{Budgets, InitialState};
use crate::events::EventLog;
use crate::store::InMemoryStore;
use chrono::TimeZone;
use rust_decimal_macros::dec;
use std::time::Duration;

const WITHIN: Evaluation = Evaluation {
    within_daypart: true,
    limit: LimitStatus::WithinLimits,
};

const OUTSIDE: Evaluation = Evaluation {
    within_daypart: false,
    limit: LimitStatus::WithinLimits,
};

const DAILY: Evaluation = Evaluation {
    within_daypart: true,
    limit: LimitStatus::DailyExceeded,
};

const MONTHLY: Evaluation = Evaluation {
    within_daypart: true,
    limit: LimitStatus::MonthlyExceeded,
};

fn paused(reason: PauseReason) -> RunState {
    RunState::Paused(reason)
}

const ALL_TRIGGERS: [Trigger; 6] = [
    Trigger::Tick,
    Trigger::Spend,
    Trigger::DailyReset,
    Trigger::MonthlyReset,
    Trigger::FullReset,
    Trigger::Operator,
];

#[test]
fn test_desired_state_checks_daypart_first() {
    let eval = Evaluation {
        within_daypart: false,
        limit: LimitStatus::DailyExceeded,
    };
    assert_eq!(
        eval.desired_state(),
        paused(PauseReason::OutsideDaypartingHours)
    );
    assert_eq!(DAILY.desired_state(), paused(PauseReason::DailyBudgetExceeded));
    assert_eq!(
        MONTHLY.desired_state(),
        paused(PauseReason::MonthlyBudgetExceeded)
    );
    assert_eq!(WITHIN.desired_state(), RunState::Active);
}

#[test]
fn test_tick_pauses_active_campaign() {
    assert_eq!(
        next_state(RunState::Active, Trigger::Tick, &DAILY),
        paused(PauseReason::DailyBudgetExceeded)
    );
    assert_eq!(
        next_state(RunState::Active, Trigger::Tick, &OUTSIDE),
        paused(PauseReason::OutsideDaypartingHours)
    );
    assert_eq!(
        next_state(RunState::Active, Trigger::Tick, &WITHIN),
        RunState::Active
    );
}

#[test]
fn test_tick_resumes_daypart_pause_only_with_budget() {
    let outside = paused(PauseReason::OutsideDaypartingHours);
    assert_eq!(next_state(outside, Trigger::Tick, &WITHIN), RunState::Active);
    assert_eq!(
        next_state(outside, Trigger::Tick, &DAILY),
        paused(PauseReason::DailyBudgetExceeded)
    );
    assert_eq!(next_state(outside, Trigger::Tick, &OUTSIDE), outside);
}

#[test]
fn test_tick_never_releases_budget_pauses() {
    for reason in [
        PauseReason::DailyBudgetExceeded,
        PauseReason::MonthlyBudgetExceeded,
    ] {
        assert_eq!(
            next_state(paused(reason), Trigger::Tick, &WITHIN),
            paused(reason)
        );
    }
}

#[test]
fn test_spend_checks_budget_only() {
    assert_eq!(
        next_state(RunState::Active, Trigger::Spend, &MONTHLY),
        paused(PauseReason::MonthlyBudgetExceeded)
    );
    // Dayparting is left to the tick.
    assert_eq!(
        next_state(RunState::Active, Trigger::Spend, &OUTSIDE),
        RunState::Active
    );
    let outside = paused(PauseReason::OutsideDaypartingHours);
    assert_eq!(next_state(outside, Trigger::Spend, &DAILY), outside);
}

#[test]
fn test_daily_reset_releases_daily_and_daypart_pauses() {
    assert_eq!(
        next_state(
            paused(PauseReason::DailyBudgetExceeded),
            Trigger::DailyReset,
            &WITHIN
        ),
        RunState::Active
    );
    assert_eq!(
        next_state(
            paused(PauseReason::OutsideDaypartingHours),
            Trigger::DailyReset,
            &WITHIN
        ),
        RunState::Active
    );
    assert_eq!(
        next_state(
            paused(PauseReason::MonthlyBudgetExceeded),
            Trigger::DailyReset,
            &WITHIN
        ),
        paused(PauseReason::MonthlyBudgetExceeded)
    );
}

#[test]
fn test_reset_does_not_flap_into_failing_state() {
    // Daily reset ran but the campaign is still outside its window.
    assert_eq!(
        next_state(
            paused(PauseReason::DailyBudgetExceeded),
            Trigger::DailyReset,
            &OUTSIDE
        ),
        paused(PauseReason::OutsideDaypartingHours)
    );
    // Monthly reset ran but today's budget is still spent.
    assert_eq!(
        next_state(
            paused(PauseReason::MonthlyBudgetExceeded),
            Trigger::MonthlyReset,
            &DAILY
        ),
        paused(PauseReason::DailyBudgetExceeded)
    );
}

#[test]
fn test_monthly_reset_releases_monthly_only() {
    assert_eq!(
        next_state(
            paused(PauseReason::MonthlyBudgetExceeded),
            Trigger::MonthlyReset,
            &WITHIN
        ),
        RunState::Active
    );
    assert_eq!(
        next_state(
            paused(PauseReason::DailyBudgetExceeded),
            Trigger::MonthlyReset,
            &WITHIN
        ),
        paused(PauseReason::DailyBudgetExceeded)
    );
}

#[test]
fn test_sweeps_leave_active_campaigns_alone() {
    for trigger in [Trigger::DailyReset, Trigger::MonthlyReset, Trigger::FullReset] {
        assert_eq!(
            next_state(RunState::Active, trigger, &OUTSIDE),
            RunState::Active
        );
    }
}

#[test]
fn test_manual_and_inactive_never_change_automatically() {
    for current in [RunState::Inactive, paused(PauseReason::Manual)] {
        for trigger in ALL_TRIGGERS {
            for eval in [WITHIN, OUTSIDE, DAILY, MONTHLY] {
                assert_eq!(next_state(current, trigger, &eval), current);
            }
        }
    }
}

#[test]
fn test_pause_reason_invariant_holds_for_every_outcome() {
    let states = [
        RunState::Active,
        RunState::Inactive,
        paused(PauseReason::DailyBudgetExceeded),
        paused(PauseReason::MonthlyBudgetExceeded),
        paused(PauseReason::OutsideDaypartingHours),
        paused(PauseReason::Manual),
    ];
    for current in states {
        for trigger in ALL_TRIGGERS {
            for eval in [WITHIN, OUTSIDE, DAILY, MONTHLY] {
                let next = next_state(current, trigger, &eval);
                assert_eq!(next.pause_reason().is_some(), next.is_paused());
            }
        }
    }
}

#[test]
fn test_operator_transitions() {
    assert_eq!(
        operator_transition(RunState::Active, OperatorAction::Pause, &WITHIN),
        Ok(paused(PauseReason::Manual))
    );
    assert_eq!(
        operator_transition(paused(PauseReason::Manual), OperatorAction::Resume, &DAILY),
        Ok(paused(PauseReason::DailyBudgetExceeded))
    );
    assert_eq!(
        operator_transition(RunState::Inactive, OperatorAction::Activate, &WITHIN),
        Ok(RunState::Active)
    );
    assert_eq!(
        operator_transition(
            paused(PauseReason::DailyBudgetExceeded),
            OperatorAction::Deactivate,
            &WITHIN
        ),
        Ok(RunState::Inactive)
    );
}

#[test]
fn test_invalid_operator_transitions() {
    let err = operator_transition(RunState::Active, OperatorAction::Resume, &WITHIN).unwrap_err();
    assert_eq!(err.action, OperatorAction::Resume);
    assert_eq!(err.to_string(), "cannot resume a campaign that is active");

    assert!(operator_transition(
        paused(PauseReason::DailyBudgetExceeded),
        OperatorAction::Resume,
        &WITHIN
    )
    .is_err());
    assert!(operator_transition(RunState::Active, OperatorAction::Activate, &WITHIN).is_err());
}

fn machine() -> (CampaignStateMachine, Arc<InMemoryStore>, Arc<EventLog>) {
    let store = Arc::new(InMemoryStore::new());
    let events = Arc::new(EventLog::new(100));
    (
        CampaignStateMachine::new(store.clone(), events.clone()),
        store,
        events,
    )
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
}

async fn seeded(store: &InMemoryStore) -> Campaign {
    let campaign = Campaign::new(
        1,
        1,
        "Spring",
        Budgets::new(dec!(10), dec!(100)).unwrap(),
        InitialState::Active,
        now(),
    );
    store.insert_campaign(campaign.clone()).await.unwrap();
    campaign
}

#[tokio::test]
async fn test_apply_persists_and_emits() {
    let (machine, store, events) = machine();
    let mut campaign = seeded(&store).await;

    let guard = machine.lock(1).await;
    let event = machine
        .transition(&guard, &mut campaign, Trigger::Tick, &DAILY, now())
        .await
        .unwrap()
        .expect("transition expected");

    assert_eq!(event.from, RunState::Active);
    assert_eq!(event.reason, Some(PauseReason::DailyBudgetExceeded));
    assert_eq!(campaign.state(), paused(PauseReason::DailyBudgetExceeded));

    let stored = store.load_campaign(1).await.unwrap().unwrap();
    assert_eq!(stored.state(), campaign.state());
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_noop_emits_nothing() {
    let (machine, store, events) = machine();
    let mut campaign = seeded(&store).await;

    let guard = machine.lock(1).await;
    for _ in 0..3 {
        let event = machine
            .transition(&guard, &mut campaign, Trigger::Tick, &WITHIN, now())
            .await
            .unwrap();
        assert!(event.is_none());
    }
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_operate_rejects_invalid_action() {
    let (machine, store, events) = machine();
    let mut campaign = seeded(&store).await;

    let guard = machine.lock(1).await;
    let err = machine
        .operate(&guard, &mut campaign, OperatorAction::Activate, &WITHIN, now())
        .await
        .unwrap_err();
    assert!(matches!(err, OperateError::Invalid(_)));
    assert_eq!(campaign.state(), RunState::Active);
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_store_failure_leaves_campaign_unchanged() {
    let (machine, _store, events) = machine();
    // Never inserted, so saving fails.
    let mut campaign = Campaign::new(
        5,
        1,
        "Ghost",
        Budgets::new(dec!(10), dec!(100)).unwrap(),
        InitialState::Active,
        now(),
    );
    let guard = machine.lock(5).await;
    let result = machine
        .transition(&guard, &mut campaign, Trigger::Tick, &DAILY, now())
        .await;
    assert!(result.is_err());
    assert_eq!(campaign.state(), RunState::Active);
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_lock_serializes_same_campaign() {
    let (machine, _, _) = machine();
    let machine = Arc::new(machine);

    let guard = machine.lock(1).await;
    let contender = {
        let machine = machine.clone();
        tokio::spawn(async move {
            let _guard = machine.lock(1).await;
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!contender.is_finished());

    // A different campaign is not blocked.
    let other = tokio::time::timeout(Duration::from_millis(100), machine.lock(2)).await;
    assert!(other.is_ok());

    drop(guard);
    tokio::time::timeout(Duration::from_secs(1), contender)
        .await
        .unwrap()
        .unwrap();
}
