/// Integration tests for first-time setup
///
/// These run the orchestrator against the in-memory store and check:
/// - what a fresh account ends up with
/// - the no-op and healing paths
/// - the per-account in-flight guard
/// - partial failures under both completion policies

mod common;

use cartlist_engine::auth::StaticAuthProvider;
use cartlist_engine::seed::{Language, SeedItem, SeedTemplate, Translations};
use cartlist_engine::setup::{
    SetupConfig, SetupOrchestrator, SetupOutcome, SetupPolicy, SetupReport, SetupStage,
};
use cartlist_engine::store::{FailurePlan, Operation};
use common::TestContext;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn strict() -> SetupConfig {
    SetupConfig {
        policy: SetupPolicy::Strict,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fresh_account_gets_starter_data() {
    let ctx = TestContext::new(Some("no"));
    let orchestrator = ctx.orchestrator(SetupConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let outcome = orchestrator
        .run(
            &ctx.profile(),
            Some(Box::new(move |report: &SetupReport| {
                assert_eq!(report.items_created, 116);
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .await;

    let report = match outcome {
        SetupOutcome::Completed(report) => report,
        other => panic!("expected completed setup, got {:?}", other),
    };
    assert_eq!(report.language, Language::No);
    assert_eq!(report.categories_created, 17);
    assert_eq!(report.items_created, 116);
    assert!(!report.has_gaps());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let lists = ctx.store.all_lists();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, "Mat");
    assert_eq!(lists[0].owner_id, ctx.account_id);
    assert_eq!(Some(lists[0].id), report.list_id);

    let categories = ctx.store.all_categories();
    assert_eq!(categories.len(), 17);
    assert_eq!(categories[5].name, "🥬 Grønnsaker");
    assert!(categories.iter().all(|c| c.owner_id == ctx.account_id));

    let items = ctx.store.all_items();
    assert_eq!(items.len(), 116);
    assert!(items.iter().all(|item| !item.checked && item.list_id == lists[0].id));
    assert!(items.iter().all(|item| item.category_id.is_some()));

    assert!(ctx.profile().initial_setup_completed);
}

#[tokio::test]
async fn test_seed_quantities() {
    let ctx = TestContext::new(Some("en"));
    let outcome = ctx
        .orchestrator(SetupConfig::default())
        .run(&ctx.profile(), None)
        .await;
    assert!(matches!(outcome, SetupOutcome::Completed(_)));

    let items = ctx.store.all_items();
    let quantity = |name: &str| {
        items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.quantity)
    };
    assert_eq!(quantity("Sweet Potatoes"), Some(2));
    assert_eq!(quantity("Cooked Shrimp"), Some(12));
    assert_eq!(items.iter().filter(|item| item.quantity == 1).count(), 114);
}

#[tokio::test]
async fn test_completed_account_is_noop() {
    let ctx = TestContext::new(Some("en"));
    let orchestrator = ctx.orchestrator(SetupConfig::default());

    orchestrator.run(&ctx.profile(), None).await;
    let outcome = orchestrator.run(&ctx.profile(), None).await;

    assert_eq!(outcome, SetupOutcome::AlreadyCompleted);
    assert_eq!(ctx.store.all_lists().len(), 1);
    assert_eq!(ctx.store.calls(Operation::InsertList), 1);
    assert_eq!(ctx.store.calls(Operation::ListLists), 1);
}

#[tokio::test]
async fn test_existing_lists_heal_the_flag() {
    let ctx = TestContext::new(Some("en"));
    ctx.list("Weekend").await;
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let outcome = ctx
        .orchestrator(SetupConfig::default())
        .run(
            &ctx.profile(),
            Some(Box::new(move |_: &SetupReport| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .await;

    assert_eq!(outcome, SetupOutcome::Healed);
    assert_eq!(ctx.store.all_lists().len(), 1);
    assert!(ctx.store.all_categories().is_empty());
    assert!(ctx.store.all_items().is_empty());
    assert!(ctx.profile().initial_setup_completed);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_runs_create_one_list() {
    let ctx = TestContext::new(Some("en"));
    let orchestrator = ctx.orchestrator(SetupConfig::default());
    let profile = ctx.profile();
    ctx.store.hold(Operation::ListLists);

    let first = {
        let orchestrator = orchestrator.clone();
        let profile = profile.clone();
        tokio::spawn(async move { orchestrator.run(&profile, None).await })
    };
    ctx.store.wait_for_calls(Operation::ListLists, 1).await;
    assert!(orchestrator.is_running(ctx.account_id));

    let second = orchestrator.run(&profile, None).await;
    assert_eq!(second, SetupOutcome::InProgress);

    ctx.store.release(Operation::ListLists);
    let first = first.await.unwrap();
    assert!(matches!(first, SetupOutcome::Completed(_)));
    assert!(!orchestrator.is_running(ctx.account_id));

    // A late trigger with the stale profile finds the list and only heals
    let late = orchestrator.run(&profile, None).await;
    assert_eq!(late, SetupOutcome::Healed);
    assert_eq!(ctx.store.all_lists().len(), 1);
}

#[tokio::test]
async fn test_separate_orchestrators_share_the_guard() {
    let ctx = TestContext::new(Some("en"));
    let background = ctx.orchestrator(SetupConfig::default());
    let foreground = ctx.orchestrator(SetupConfig::default());
    let profile = ctx.profile();
    ctx.store.hold(Operation::InsertList);

    let first = {
        let profile = profile.clone();
        tokio::spawn(async move { background.run(&profile, None).await })
    };
    ctx.store.wait_for_calls(Operation::InsertList, 1).await;
    assert!(foreground.is_running(ctx.account_id));

    let second = foreground.run(&profile, None).await;
    assert_eq!(second, SetupOutcome::InProgress);

    ctx.store.release(Operation::InsertList);
    assert!(matches!(first.await.unwrap(), SetupOutcome::Completed(_)));
    assert_eq!(ctx.store.all_lists().len(), 1);
    assert!(!foreground.is_running(ctx.account_id));
}

#[tokio::test]
async fn test_other_accounts_are_not_blocked() {
    let ctx = TestContext::new(Some("en"));
    let orchestrator = ctx.orchestrator(SetupConfig::default());
    let other_account = ctx.store.add_account(Some("lt"));
    let other_profile = ctx.store.profile(other_account).unwrap();
    ctx.store.hold(Operation::InsertList);

    let first = {
        let orchestrator = orchestrator.clone();
        let profile = ctx.profile();
        tokio::spawn(async move { orchestrator.run(&profile, None).await })
    };
    ctx.store.wait_for_calls(Operation::InsertList, 1).await;

    let second = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.run(&other_profile, None).await })
    };
    ctx.store.wait_for_calls(Operation::InsertList, 2).await;
    assert!(orchestrator.is_running(ctx.account_id));
    assert!(orchestrator.is_running(other_account));

    ctx.store.release(Operation::InsertList);
    assert!(matches!(first.await.unwrap(), SetupOutcome::Completed(_)));
    assert!(matches!(second.await.unwrap(), SetupOutcome::Completed(_)));
    assert_eq!(ctx.store.all_lists().len(), 2);
}

#[tokio::test]
async fn test_dropped_run_releases_guard() {
    let ctx = TestContext::new(Some("en"));
    let orchestrator = ctx.orchestrator(SetupConfig::default());
    ctx.store.hold(Operation::ListLists);

    let run = {
        let orchestrator = orchestrator.clone();
        let profile = ctx.profile();
        tokio::spawn(async move { orchestrator.run(&profile, None).await })
    };
    ctx.store.wait_for_calls(Operation::ListLists, 1).await;
    assert!(orchestrator.is_running(ctx.account_id));

    run.abort();
    assert!(run.await.unwrap_err().is_cancelled());
    assert!(!orchestrator.is_running(ctx.account_id));

    ctx.store.release(Operation::ListLists);
    let retry = orchestrator.run(&ctx.profile(), None).await;
    assert!(matches!(retry, SetupOutcome::Completed(_)));
}

#[tokio::test]
async fn test_signup_language_wins_over_display_language() {
    let ctx = TestContext::new(Some("no"));
    let orchestrator = SetupOrchestrator::new(ctx.store.clone(), ctx.auth(Some("lt")));

    let outcome = orchestrator.run(&ctx.profile(), None).await;

    assert_eq!(outcome.report().map(|r| r.language), Some(Language::Lt));
    assert_eq!(ctx.store.all_lists()[0].name, "Maistas");
}

#[tokio::test]
async fn test_auth_failure_falls_back_to_display_language() {
    let ctx = TestContext::new(Some("lt"));
    let orchestrator =
        SetupOrchestrator::new(ctx.store.clone(), Arc::new(StaticAuthProvider::unavailable()));

    let outcome = orchestrator.run(&ctx.profile(), None).await;

    assert!(outcome.is_success());
    assert_eq!(ctx.store.all_lists()[0].name, "Maistas");
}

#[tokio::test]
async fn test_unknown_language_uses_english() {
    let ctx = TestContext::new(Some("fr"));
    ctx.orchestrator(SetupConfig::default())
        .run(&ctx.profile(), None)
        .await;

    assert_eq!(ctx.store.all_lists()[0].name, "Food");
    assert_eq!(ctx.store.all_categories()[0].name, "🍿 Snacks");
}

#[tokio::test]
async fn test_missing_translation_falls_back_per_item() {
    let ctx = TestContext::new(Some("lt"));
    let template = SeedTemplate {
        list_name: Translations::new("Food").with(Language::Lt, "Maistas"),
        categories: vec![Translations::new("🥛 Dairy").with(Language::Lt, "🥛 Pieno produktai")],
        items: vec![
            SeedItem::new(Translations::new("Milk").with(Language::Lt, "Pienas"), Some(0)),
            SeedItem::new(Translations::new("Oat Milk"), Some(0)),
            SeedItem::new(Translations::new("Batteries"), None).with_quantity(4),
        ],
    };
    let orchestrator = ctx
        .orchestrator(SetupConfig::default())
        .with_template(template);

    let outcome = orchestrator.run(&ctx.profile(), None).await;
    assert!(matches!(outcome, SetupOutcome::Completed(_)));

    let category = &ctx.store.all_categories()[0];
    assert_eq!(category.name, "🥛 Pieno produktai");

    let items = ctx.store.all_items();
    let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["Pienas", "Oat Milk", "Batteries"]);
    assert_eq!(items[1].category_id, Some(category.id));
    assert_eq!(items[2].category_id, None);
    assert_eq!(items[2].quantity, 4);
}

#[tokio::test]
async fn test_failed_chunk_is_skipped() {
    let ctx = TestContext::new(Some("en"));
    ctx.store
        .fail(Operation::InsertItems, FailurePlan::OnCalls(vec![2]));

    let outcome = ctx
        .orchestrator(SetupConfig::default())
        .run(&ctx.profile(), None)
        .await;

    let report = match outcome {
        SetupOutcome::Completed(report) => report,
        other => panic!("expected completed setup, got {:?}", other),
    };
    assert_eq!(report.failed_chunks, 1);
    assert_eq!(report.items_failed, 50);
    assert_eq!(report.items_created, 66);
    assert!(report.has_gaps());
    assert_eq!(ctx.store.calls(Operation::InsertItems), 3);

    let items = ctx.store.all_items();
    assert_eq!(items.len(), 66);
    assert_eq!(items[0].name, "Chips");
    assert!(ctx.profile().initial_setup_completed);
}

#[tokio::test]
async fn test_failed_category_leaves_items_uncategorized() {
    let ctx = TestContext::new(Some("en"));
    ctx.store
        .fail(Operation::InsertCategory, FailurePlan::OnCalls(vec![1]));
    let expected_uncategorized = SeedTemplate::builtin()
        .items
        .iter()
        .filter(|item| item.category == Some(0))
        .count();

    let outcome = ctx
        .orchestrator(SetupConfig::default())
        .run(&ctx.profile(), None)
        .await;

    let report = outcome.report().cloned().expect("report");
    assert_eq!(report.categories_created, 16);
    assert_eq!(report.categories_failed, 1);
    assert_eq!(report.items_created, 116);
    assert!(outcome.is_success());

    assert_eq!(ctx.store.all_categories().len(), 16);
    let uncategorized = ctx
        .store
        .all_items()
        .iter()
        .filter(|item| item.category_id.is_none())
        .count();
    assert!(expected_uncategorized > 0);
    assert_eq!(uncategorized, expected_uncategorized);
}

#[tokio::test]
async fn test_strict_policy_rolls_back_partial_setup() {
    let ctx = TestContext::new(Some("en"));
    ctx.store.fail(Operation::InsertItems, FailurePlan::Next(1));
    let orchestrator = ctx.orchestrator(strict());

    let outcome = orchestrator.run(&ctx.profile(), None).await;

    let report = match outcome {
        SetupOutcome::RolledBack(report) => report,
        other => panic!("expected rollback, got {:?}", other),
    };
    assert_eq!(report.rollback_failures, 0);
    assert!(ctx.store.all_lists().is_empty());
    assert!(ctx.store.all_categories().is_empty());
    assert!(ctx.store.all_items().is_empty());
    assert!(!ctx.profile().initial_setup_completed);

    let retry = orchestrator.run(&ctx.profile(), None).await;
    assert!(matches!(retry, SetupOutcome::Completed(ref r) if !r.has_gaps()));
    assert_eq!(ctx.store.all_items().len(), 116);
}

#[tokio::test]
async fn test_list_failure_ends_run_and_allows_retry() {
    let ctx = TestContext::new(Some("en"));
    ctx.store.fail(Operation::InsertList, FailurePlan::Next(1));
    let orchestrator = ctx.orchestrator(SetupConfig::default());

    let outcome = orchestrator.run(&ctx.profile(), None).await;
    assert!(matches!(
        outcome,
        SetupOutcome::Failed {
            stage: SetupStage::CreateList,
            ..
        }
    ));
    assert!(!orchestrator.is_running(ctx.account_id));
    assert_eq!(ctx.store.calls(Operation::InsertCategory), 0);
    assert!(!ctx.profile().initial_setup_completed);

    let retry = orchestrator.run(&ctx.profile(), None).await;
    assert!(matches!(retry, SetupOutcome::Completed(_)));
}

#[tokio::test]
async fn test_flag_failure_is_healed_on_retry() {
    let ctx = TestContext::new(Some("en"));
    ctx.store.fail(Operation::UpdateProfile, FailurePlan::Next(1));
    let orchestrator = ctx.orchestrator(SetupConfig::default());

    let outcome = orchestrator.run(&ctx.profile(), None).await;
    assert!(matches!(
        outcome,
        SetupOutcome::Failed {
            stage: SetupStage::MarkCompleted,
            ..
        }
    ));
    assert_eq!(ctx.store.all_items().len(), 116);

    let retry = orchestrator.run(&ctx.profile(), None).await;
    assert_eq!(retry, SetupOutcome::Healed);
    assert_eq!(ctx.store.all_lists().len(), 1);
    assert!(ctx.profile().initial_setup_completed);
}

#[tokio::test]
async fn test_burst_of_triggers_seeds_once() {
    let ctx = TestContext::new(Some("en"));
    let orchestrator = ctx.orchestrator(SetupConfig::default());
    let profile = ctx.profile();

    let outcomes =
        futures::future::join_all((0..5).map(|_| orchestrator.run(&profile, None))).await;

    let completed = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, SetupOutcome::Completed(_)))
        .count();
    assert_eq!(completed, 1);
    assert!(outcomes.iter().all(|outcome| matches!(
        outcome,
        SetupOutcome::Completed(_) | SetupOutcome::Healed | SetupOutcome::InProgress
    )));
    assert_eq!(ctx.store.all_lists().len(), 1);
    assert_eq!(ctx.store.all_items().len(), 116);
}
