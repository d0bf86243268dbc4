//! Driving sessions through the controller.

mod common;

use alloy::primitives::U256;
use pricing_dapp::blockchain::{ChainError, ContractGateway, SessionCall, SessionStatus, SimulatedChain};
use pricing_dapp::state::{Notice, ProductField, ProfileField};
use pricing_dapp::AppError;

use common::{admin, deploy, drive, price, registered_chain, start_as, user};

#[tokio::test]
async fn member_pricing_zero_is_rejected_without_sending() {
    let chain = registered_chain(1);
    let session = deploy(&chain, "Tablet");
    drive(&chain, admin(), session, SessionCall::Start);

    let (chain, app) = start_as(chain, user(1));
    app.handle().bootstrap().await.unwrap();
    app.handle().select_product(0).await.unwrap();

    let err = app
        .handle()
        .session_action(SessionCall::Pricing(U256::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Chain(ChainError::Reverted { .. })));

    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(
        state.notice,
        Some(Notice::Rejected("Price must be greater than zero".to_string()))
    );
    assert_eq!(chain.submitted_transactions(), 0);
    assert_eq!(
        chain.session_figures(session, user(1)).await.unwrap().viewer_price,
        U256::ZERO
    );
    app.stop().await;
}

#[tokio::test]
async fn member_cannot_start_a_session() {
    let chain = registered_chain(1);
    let session = deploy(&chain, "Tablet");
    drive(&chain, admin(), session, SessionCall::Start);
    drive(&chain, admin(), session, SessionCall::Close(U256::from(10)));

    let (chain, app) = start_as(chain, user(1));
    app.handle().bootstrap().await.unwrap();
    app.handle().select_product(0).await.unwrap();

    assert!(app.handle().session_action(SessionCall::Start).await.is_err());
    assert_eq!(chain.submitted_transactions(), 0);
    assert_eq!(chain.session_status(session).await.unwrap(), SessionStatus::Closed);
    app.stop().await;
}

#[tokio::test]
async fn admin_closing_stopped_session_refreshes_everything() {
    let chain = registered_chain(1);
    let session = deploy(&chain, "Tablet");
    drive(&chain, admin(), session, SessionCall::Start);
    price(&chain, user(1), session, 424);
    drive(&chain, admin(), session, SessionCall::Stop);

    let (chain, app) = start_as(chain, admin());
    app.handle().bootstrap().await.unwrap();
    let before = app.handle().snapshot().await.unwrap();
    assert_eq!(before.products[0].status, SessionStatus::Stopped);
    assert_eq!(before.products[0].figures.proposed_price, U256::from(424));
    assert_eq!(before.participants[0].n_sessions, 0);

    app.handle().select_product(0).await.unwrap();
    app.handle()
        .session_action(SessionCall::Close(U256::from(500)))
        .await
        .unwrap();
    assert_eq!(chain.submitted_transactions(), 1);

    let after = app.handle().snapshot().await.unwrap();
    assert_eq!(after.products[0].status, SessionStatus::Closed);
    assert_eq!(after.products[0].figures.final_price, U256::from(500));
    assert_eq!(after.participants[0].n_sessions, 1);
    assert_eq!(after.participants[0].deviation, 15);
    assert_eq!(chain.session_score(session, user(1)), Some(15));
    app.stop().await;
}

#[tokio::test]
async fn start_and_stop_refresh_products() {
    let chain = registered_chain(0);
    deploy(&chain, "Tablet");
    let (chain, app) = start_as(chain, admin());
    app.handle().bootstrap().await.unwrap();
    app.handle().select_product(0).await.unwrap();

    app.handle().session_action(SessionCall::Start).await.unwrap();
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.products[0].status, SessionStatus::Pricing);
    assert_eq!(state.notice, None);

    app.handle().session_action(SessionCall::Stop).await.unwrap();
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.products[0].status, SessionStatus::Stopped);
    assert_eq!(chain.submitted_transactions(), 2);
    app.stop().await;
}

#[tokio::test]
async fn register_then_create_then_price() {
    let chain = SimulatedChain::with_accounts(2);
    let (chain, app) = start_as(chain, admin());
    app.handle().bootstrap().await.unwrap();
    app.handle()
        .edit_new_product(ProductField::Name, "Tablet")
        .await
        .unwrap();
    app.handle().create_product().await.unwrap();
    app.handle().select_product(0).await.unwrap();
    app.handle().session_action(SessionCall::Start).await.unwrap();

    chain.switch_account(user(1));
    app.handle().accounts_changed().await.unwrap();
    let state = app.handle().snapshot().await.unwrap();
    assert!(!state.is_registered());
    assert!(state.participants.is_empty());

    app.handle()
        .edit_profile(ProfileField::Fullname, "user1")
        .await
        .unwrap();
    app.handle()
        .edit_profile(ProfileField::Email, "user1@test.com")
        .await
        .unwrap();
    app.handle().register().await.unwrap();

    app.handle().select_product(0).await.unwrap();
    app.handle()
        .session_action(SessionCall::Pricing(U256::from(424)))
        .await
        .unwrap();

    let state = app.handle().snapshot().await.unwrap();
    assert!(state.is_registered());
    assert_eq!(state.participants.len(), 1);
    assert_eq!(
        state.notice,
        Some(Notice::Success("Price submitted for Tablet".to_string()))
    );
    assert_eq!(chain.submitted_transactions(), 4);
    app.stop().await;
}
