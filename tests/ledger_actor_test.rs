use actor_framework::mock::MockClient;
use actor_framework::{ActorClient, FrameworkError};
use keyshop::clients::KeyPoolClient;
use keyshop::ledger_actor::ActionError;
use keyshop::model::*;
use rust_decimal::Decimal;

fn consumed_key(id: u32, product: ProductId, action: ActionId) -> Key {
    Key {
        id: KeyId(id),
        product,
        secret: format!("SECRET-{id}"),
        code: format!("Office-{id}"),
        available: false,
        consumed_by: Some(action),
    }
}

fn purchase(lines: Vec<LineDraft>) -> ActionCreate {
    ActionCreate {
        kind: ActionKind::Purchase,
        client: UserId(1),
        seller: Some(UserId(2)),
        payment_method: PaymentMethodId(1),
        lines,
    }
}

fn line(product: u32, name: &str, price: i64, quantity: u32) -> LineDraft {
    LineDraft {
        product: ProductId(product),
        product_name: name.into(),
        unit_price: Decimal::from(price),
        validity: Validity::TwoYears,
        quantity,
    }
}

/// Real ledger actor with a mocked Key Pool.
///
/// Checks that recording a purchase sends exactly one claim batch and stores the keys it
/// returns as the allocation.
#[tokio::test]
async fn test_purchase_records_claimed_keys() {
    let mut key_mock = MockClient::<Key>::new();
    // The ledger's first id is 1; the claim is made on its behalf
    let action = ActionId(1);
    key_mock.expect_batch().return_ok(vec![vec![
        (KeyId(7), consumed_key(7, ProductId(3), action)),
        (KeyId(9), consumed_key(9, ProductId(3), action)),
    ]]);
    let keys = KeyPoolClient::new(key_mock.client());

    let (ledger_actor, ledger) = keyshop::ledger_actor::new(8);
    let handle = tokio::spawn(ledger_actor.run(keys));

    let recorded = ledger
        .record(purchase(vec![line(3, "Office", 1500, 2)]))
        .await
        .expect("Purchase should be recorded");

    assert_eq!(recorded.id, action);
    assert_eq!(recorded.code, "ACHAT-1");
    assert_eq!(recorded.total_price, Decimal::from(3000));
    assert_eq!(recorded.lines[0].sub_total, Decimal::from(3000));
    assert_eq!(recorded.key_ids(), vec![KeyId(7), KeyId(9)]);
    let entries = &recorded.allocation["Office"];
    assert_eq!(entries[0].secret_payload, "SECRET-7");
    assert_eq!(entries[0].display_code, "Office-7");
    assert_eq!(entries[0].validity_label, Validity::TwoYears);

    let stored = ledger.get(action).await.unwrap().expect("Action not stored");
    assert_eq!(stored, recorded);

    key_mock.verify();
    drop(ledger);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_short_claim_stores_nothing() {
    let mut key_mock = MockClient::<Key>::new();
    key_mock.expect_batch().return_err(FrameworkError::Shortfall {
        step: 1,
        requested: 4,
        found: 1,
    });
    let keys = KeyPoolClient::new(key_mock.client());

    let (ledger_actor, ledger) = keyshop::ledger_actor::new(8);
    let handle = tokio::spawn(ledger_actor.run(keys));

    let err = ledger
        .record(purchase(vec![
            line(3, "Office", 1500, 1),
            line(5, "Antivirus", 200, 4),
        ]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ActionError::InsufficientStock {
            product: ProductId(5),
            requested: 4,
            available: 1,
        }
    );
    assert!(ledger.list(ActionFilter::default()).await.unwrap().is_empty());

    key_mock.verify();
    drop(ledger);
    handle.await.unwrap();
}

/// A quote never talks to the Key Pool: the mock has no expectations and would panic on any
/// request.
#[tokio::test]
async fn test_quote_needs_no_keys() {
    let key_mock = MockClient::<Key>::new();
    let keys = KeyPoolClient::new(key_mock.client());

    let (ledger_actor, ledger) = keyshop::ledger_actor::new(8);
    let handle = tokio::spawn(ledger_actor.run(keys));

    let mut quote = purchase(vec![line(3, "Office", 1500, 2), line(3, "Office", 1500, 1)]);
    quote.kind = ActionKind::Quote;
    let recorded = ledger.record(quote).await.expect("Quote should be recorded");

    assert_eq!(recorded.code, "DEVIS-1");
    assert_eq!(recorded.total_price, Decimal::from(4500));
    assert_eq!(recorded.allocation["Office"].len(), 3);
    assert!(recorded.key_ids().is_empty());

    key_mock.verify();
    drop(ledger);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_update_flags_and_agreed_price() {
    let key_mock = MockClient::<Key>::new();
    let keys = KeyPoolClient::new(key_mock.client());

    let (ledger_actor, ledger) = keyshop::ledger_actor::new(8);
    let handle = tokio::spawn(ledger_actor.run(keys));

    let mut quote = purchase(vec![line(3, "Office", 1500, 1)]);
    quote.kind = ActionKind::Quote;
    let recorded = ledger.record(quote).await.unwrap();

    let updated = ledger
        .update_action(
            recorded.id,
            ActionUpdate {
                delivered: Some(true),
                paid: Some(true),
                agreed_price: Some(Decimal::from(1200)),
            },
        )
        .await
        .expect("Update should succeed");
    assert!(updated.delivered && updated.paid);
    assert_eq!(updated.agreed_price, Some(Decimal::from(1200)));
    assert_eq!(updated.total_price, Decimal::from(1500));

    let err = ledger
        .update_action(
            recorded.id,
            ActionUpdate {
                agreed_price: Some(Decimal::from(-1)),
                ..ActionUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::ValidationError(_)));

    let err = ledger
        .update_action(ActionId(99), ActionUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::NotFound(_)));

    drop(ledger);
    handle.await.unwrap();
}

/// Prices that leave `Decimal`'s range are rejected before any key is claimed.
#[tokio::test]
async fn test_price_overflow_is_a_validation_error() {
    let key_mock = MockClient::<Key>::new();
    let keys = KeyPoolClient::new(key_mock.client());

    let (ledger_actor, ledger) = keyshop::ledger_actor::new(8);
    let handle = tokio::spawn(ledger_actor.run(keys));

    let mut huge = line(3, "Office", 0, 2);
    huge.unit_price = Decimal::MAX;
    let err = ledger.record(purchase(vec![huge])).await.unwrap_err();
    assert!(matches!(err, ActionError::ValidationError(ref m) if m.contains("overflows")));

    // Each sub-total fits, their sum does not
    let mut half = line(3, "Office", 0, 1);
    half.unit_price = Decimal::MAX;
    let err = ledger
        .record(purchase(vec![half.clone(), half]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ActionError::ValidationError("total price overflows".into())
    );

    let err = ledger
        .record(purchase(vec![line(3, "Office", 10, MAX_LINE_QUANTITY + 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::ValidationError(_)));

    assert!(ledger.list(ActionFilter::default()).await.unwrap().is_empty());
    key_mock.verify();
    drop(ledger);
    handle.await.unwrap();
}
