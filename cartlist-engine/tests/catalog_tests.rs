/// Integration tests for catalog operations and session loading

mod common;

use cartlist_engine::catalog::{Catalog, CatalogError, Direction, MoveOutcome};
use cartlist_engine::notify::NoticeLevel;
use cartlist_engine::session::load_app_data;
use cartlist_engine::store::{FailurePlan, Operation, RemoteStore};
use cartlist_shared::models::{CategoryPatch, Role};
use common::TestContext;
use std::time::Duration;

fn catalog(ctx: &TestContext) -> Catalog {
    Catalog::new(ctx.store.clone(), ctx.notifier.clone(), ctx.account_id)
}

fn names(catalog: &Catalog) -> Vec<String> {
    catalog.categories().into_iter().map(|c| c.name).collect()
}

async fn board(catalog: &Catalog) {
    for name in ["🍞 Bakery", "🥛 Dairy", "🍿 Snacks"] {
        catalog.create_category(name).await.unwrap();
    }
}

#[tokio::test]
async fn test_create_category_appends_after_last() {
    let ctx = TestContext::new(None);
    let catalog = catalog(&ctx);
    board(&catalog).await;

    let orders: Vec<i32> = catalog.categories().iter().map(|c| c.sort_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert!(matches!(
        catalog.create_category("   ").await,
        Err(CatalogError::EmptyName)
    ));
}

#[tokio::test]
async fn test_move_category_writes_both_orders() {
    let ctx = TestContext::new(None);
    let catalog = catalog(&ctx);
    board(&catalog).await;
    let dairy = catalog.categories()[1].id;

    let outcome = catalog.move_category(dairy, Direction::Up).await.unwrap();

    assert_eq!(outcome, MoveOutcome::Moved);
    assert_eq!(names(&catalog), vec!["🥛 Dairy", "🍞 Bakery", "🍿 Snacks"]);

    let stored: Vec<String> = ctx
        .store
        .all_categories()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(stored, names(&catalog));

    let edge = catalog.move_category(dairy, Direction::Up).await.unwrap();
    assert_eq!(edge, MoveOutcome::AtEdge);
}

#[tokio::test]
async fn test_move_category_restores_order_on_failure() {
    let mut ctx = TestContext::new(None);
    let catalog = catalog(&ctx);
    board(&catalog).await;
    let before = names(&catalog);
    let bakery = catalog.categories()[0].id;

    // First write succeeds, partner write fails
    ctx.store
        .fail(Operation::UpdateCategory, FailurePlan::OnCalls(vec![2]));
    let outcome = catalog.move_category(bakery, Direction::Down).await.unwrap();

    assert!(matches!(outcome, MoveOutcome::Restored { .. }));
    assert_eq!(names(&catalog), before);

    let stored: Vec<String> = ctx
        .store
        .all_categories()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(stored, before);

    let notices = ctx.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_move_renumbers_equal_orders() {
    let ctx = TestContext::new(None);
    let catalog = catalog(&ctx);
    board(&catalog).await;
    for category in catalog.categories() {
        ctx.store
            .update_category(category.id, &CategoryPatch::sort_order(0))
            .await
            .unwrap();
    }
    catalog.load_categories().await.unwrap();
    let snacks = catalog.categories()[2].id;

    let outcome = catalog.move_category(snacks, Direction::Up).await.unwrap();

    assert_eq!(outcome, MoveOutcome::Moved);
    let board: Vec<(String, i32)> = catalog
        .categories()
        .into_iter()
        .map(|c| (c.name, c.sort_order))
        .collect();
    assert_eq!(board[1], ("🍿 Snacks".to_string(), 10));
    assert_eq!(board[2], ("🥛 Dairy".to_string(), 20));
}

#[tokio::test]
async fn test_move_with_tied_pair_keeps_later_categories_after() {
    let ctx = TestContext::new(None);
    let catalog = catalog(&ctx);
    for name in ["A", "B", "C", "D"] {
        catalog.create_category(name).await.unwrap();
    }
    let c = catalog.categories()[2].id;
    ctx.store
        .update_category(c, &CategoryPatch::sort_order(1))
        .await
        .unwrap();
    catalog.load_categories().await.unwrap();
    assert_eq!(names(&catalog), vec!["A", "B", "C", "D"]);

    let outcome = catalog.move_category(c, Direction::Up).await.unwrap();

    assert_eq!(outcome, MoveOutcome::Moved);
    let board: Vec<(String, i32)> = catalog
        .categories()
        .into_iter()
        .map(|c| (c.name, c.sort_order))
        .collect();
    assert_eq!(
        board,
        vec![
            ("A".to_string(), 0),
            ("C".to_string(), 10),
            ("B".to_string(), 20),
            ("D".to_string(), 30),
        ]
    );

    catalog.load_categories().await.unwrap();
    assert_eq!(names(&catalog), vec!["A", "C", "B", "D"]);
}

#[tokio::test]
async fn test_failed_renumbering_restores_every_order() {
    let mut ctx = TestContext::new(None);
    let catalog = catalog(&ctx);
    for name in ["A", "B", "C", "D"] {
        catalog.create_category(name).await.unwrap();
    }
    let c = catalog.categories()[2].id;
    ctx.store
        .update_category(c, &CategoryPatch::sort_order(1))
        .await
        .unwrap();
    catalog.load_categories().await.unwrap();
    let before: Vec<(String, i32)> = ctx
        .store
        .all_categories()
        .into_iter()
        .map(|c| (c.name, c.sort_order))
        .collect();

    // Setup used call 1; the move writes C, B, D as calls 2, 3, 4
    ctx.store
        .fail(Operation::UpdateCategory, FailurePlan::OnCalls(vec![4]));
    let outcome = catalog.move_category(c, Direction::Up).await.unwrap();

    assert!(matches!(outcome, MoveOutcome::Restored { .. }));
    assert_eq!(names(&catalog), vec!["A", "B", "C", "D"]);
    let after: Vec<(String, i32)> = ctx
        .store
        .all_categories()
        .into_iter()
        .map(|c| (c.name, c.sort_order))
        .collect();
    assert_eq!(after, before);
    assert_eq!(ctx.drain_notices().len(), 1);
}

#[tokio::test]
async fn test_delete_category_uncategorizes_items() {
    let ctx = TestContext::new(None);
    let catalog = catalog(&ctx);
    let list = catalog.create_list("Food").await.unwrap();
    let dairy = catalog.create_category("🥛 Dairy").await.unwrap();
    let milk = ctx.item(list.id, "Milk", 1).await;
    ctx.store
        .update_item(
            milk.id,
            &cartlist_shared::models::ItemPatch::category(Some(dairy.id)),
        )
        .await
        .unwrap();

    catalog.delete_category(dairy.id).await.unwrap();

    assert!(catalog.categories().is_empty());
    assert_eq!(ctx.store.item(milk.id).unwrap().category_id, None);
}

#[tokio::test]
async fn test_list_operations() {
    let mut ctx = TestContext::new(None);
    let catalog = catalog(&ctx);

    let list = catalog.create_list("  Party ").await.unwrap();
    assert_eq!(list.name, "Party");
    assert_eq!(list.owner_id, ctx.account_id);

    let renamed = catalog.rename_list(list.id, "Birthday").await.unwrap();
    assert_eq!(renamed.name, "Birthday");

    ctx.store.fail(Operation::DeleteList, FailurePlan::Next(1));
    assert!(matches!(
        catalog.delete_list(list.id).await,
        Err(CatalogError::Store(_))
    ));
    assert_eq!(ctx.drain_notices().len(), 1);

    catalog.delete_list(list.id).await.unwrap();
    assert!(ctx.store.all_lists().is_empty());
}

#[tokio::test]
async fn test_update_language() {
    let ctx = TestContext::new(Some("en"));
    let catalog = catalog(&ctx);

    let profile = catalog.update_language("LT").await.unwrap();
    assert_eq!(profile.language.as_deref(), Some("lt"));

    assert!(matches!(
        catalog.update_language("de").await,
        Err(CatalogError::UnsupportedLanguage(_))
    ));
    assert_eq!(ctx.profile().language.as_deref(), Some("lt"));
}

#[tokio::test(start_paused = true)]
async fn test_session_waits_for_profile_row() {
    let ctx = TestContext::new(Some("no"));
    let profile = ctx.profile();
    ctx.store.remove_profile(ctx.account_id);
    ctx.store.set_role(ctx.account_id, Role::Admin);
    ctx.list("Food").await;

    let late_insert = {
        let store = ctx.store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(700)).await;
            store.put_profile(profile);
        })
    };

    let data = load_app_data(ctx.store.as_ref(), ctx.account_id)
        .await
        .unwrap();
    late_insert.await.unwrap();

    assert_eq!(data.profile.language.as_deref(), Some("no"));
    assert_eq!(data.role, Role::Admin);
    assert_eq!(data.lists.len(), 1);
    // Attempts at 0 ms, 500 ms and 1500 ms
    assert_eq!(ctx.store.calls(Operation::FetchProfile), 3);
}

#[tokio::test]
async fn test_session_defaults_role_and_includes_shared_lists() {
    let ctx = TestContext::new(None);
    let friend = ctx.store.add_account(None);
    let own = ctx.list("Food").await;
    let shared = ctx
        .store
        .insert_list(cartlist_shared::models::CreateList {
            name: "Cabin trip".to_string(),
            owner_id: friend,
        })
        .await
        .unwrap();
    ctx.store.share_list(shared.id, ctx.account_id);

    let data = load_app_data(ctx.store.as_ref(), ctx.account_id)
        .await
        .unwrap();

    assert_eq!(data.role, Role::User);
    let ids: Vec<_> = data.lists.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![own.id, shared.id]);
}
