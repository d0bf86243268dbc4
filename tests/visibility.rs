//! What each kind of viewer gets to see.

mod common;

use pricing_dapp::blockchain::{SessionCall, SessionStatus};
use pricing_dapp::view;

use common::{admin, deploy, drive, registered_chain, start_as, user};

#[tokio::test]
async fn participant_listed_iff_admin_or_self() {
    for viewer in [admin(), user(1), user(2), user(3)] {
        let (_, app) = start_as(registered_chain(3), viewer);
        app.handle().bootstrap().await.unwrap();
        let state = app.handle().snapshot().await.unwrap();

        for candidate in [user(1), user(2), user(3)] {
            let listed = state.participants.iter().any(|p| p.account == candidate);
            assert_eq!(
                listed,
                viewer == admin() || viewer == candidate,
                "viewer {} candidate {}",
                viewer,
                candidate
            );
        }
        app.stop().await;
    }
}

#[tokio::test]
async fn members_never_see_idle_or_stopped_sessions() {
    let chain = registered_chain(1);
    deploy(&chain, "Idle");
    let pricing = deploy(&chain, "Pricing");
    drive(&chain, admin(), pricing, SessionCall::Start);
    let stopped = deploy(&chain, "Stopped");
    drive(&chain, admin(), stopped, SessionCall::Start);
    drive(&chain, admin(), stopped, SessionCall::Stop);

    let (chain, app) = start_as(chain, user(1));
    app.handle().bootstrap().await.unwrap();
    let state = app.handle().snapshot().await.unwrap();

    assert_eq!(state.products.len(), 1);
    assert_eq!(state.products[0].address, pricing);
    assert!(state
        .products
        .iter()
        .all(|p| !matches!(p.status, SessionStatus::Idle | SessionStatus::Stopped)));

    chain.switch_account(admin());
    app.handle().accounts_changed().await.unwrap();
    let state = app.handle().snapshot().await.unwrap();
    let statuses: Vec<_> = state.products.iter().map(|p| p.status.label()).collect();
    assert_eq!(statuses, vec!["START", "PRICING", "STOP"]);
    app.stop().await;
}

#[tokio::test]
async fn select_then_current_is_that_product() {
    let chain = registered_chain(0);
    let sessions = [deploy(&chain, "Tablet"), deploy(&chain, "Phone"), deploy(&chain, "Laptop")];
    let (_, app) = start_as(chain, admin());
    app.handle().bootstrap().await.unwrap();

    for (index, address) in sessions.iter().enumerate() {
        app.handle().select_product(index).await.unwrap();
        let state = app.handle().snapshot().await.unwrap();
        assert_eq!(state.current_product().map(|p| p.address), Some(*address));
        assert_eq!(state.current_product, index);
    }
    app.stop().await;
}

#[tokio::test]
async fn dashboard_renders_member_profile() {
    let (_, app) = start_as(registered_chain(2), user(2));
    app.handle().bootstrap().await.unwrap();
    let rendered = view::render_app(&app.subscribe().borrow());

    assert!(rendered.contains(&format!("https://robohash.org/{}", user(2))));
    assert!(rendered.contains("Role     Member"));
    assert!(rendered.contains("user2@test.com"));
    assert!(!rendered.contains("user1@test.com"));
    assert!(!rendered.contains(&user(1).to_string()));
    app.stop().await;
}
