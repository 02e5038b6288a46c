//! Notification delivery and retries, on a paused clock.

use actor_framework::ActorClient;
use keyshop::allocator::{ActionRequest, LineRequest};
use keyshop::auth::{hash_password, Principal};
use keyshop::config::Config;
use keyshop::lifecycle::ShopSystem;
use keyshop::model::*;
use keyshop::notify::{self, DispatcherConfig, DispatcherStores, MemoryMailer, Notification, RetryPolicy};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

fn account(email: &str, role: Role) -> UserCreate {
    UserCreate {
        email: email.into(),
        full_name: "Hery Rakoto".into(),
        role,
        account_type: AccountType::Individual,
        phone: String::new(),
        address: String::new(),
        company: CompanyNumbers::default(),
        password_hash: hash_password("secret").expect("Failed to hash password"),
    }
}

fn config() -> Config {
    Config {
        notify_workers: 1,
        ..Config::in_memory()
    }
}

/// Records a quote for one product and returns its code.
async fn record_quote(system: &ShopSystem) -> String {
    let staff = system
        .users
        .create_user(account("vola@shop.mg", Role::Vendeur))
        .await
        .unwrap();
    let client = system
        .users
        .create_user(account("hery@client.mg", Role::Client))
        .await
        .unwrap();
    let payment = system
        .payments
        .create_method(PaymentMethodCreate {
            label: "Virement".into(),
        })
        .await
        .unwrap();
    let category = system
        .categories
        .create_category(CategoryCreate {
            name: "Office".into(),
            description: String::new(),
        })
        .await
        .unwrap();
    let product = system
        .products
        .create_product(ProductCreate {
            category: category.id,
            name: "Office 2024".into(),
            description: String::new(),
            validity: Validity::Lifetime,
            price_min: Decimal::from(100),
            price: Decimal::from(120),
            price_max: Decimal::from(150),
        })
        .await
        .unwrap();

    let outcome = system
        .allocator
        .submit(
            &Principal {
                user: staff.id,
                role: Role::Vendeur,
            },
            ActionRequest {
                kind: "DEVIS".into(),
                client: client.id,
                payment_method: payment.id,
                lines: vec![LineRequest {
                    product: product.id,
                    quantity: 2,
                }],
            },
        )
        .await
        .expect("Quote failed");
    outcome.action.code
}

async fn wait_for_failures(system: &ShopSystem) -> Vec<DeliveryFailure> {
    for _ in 0..1_000 {
        let failures = system
            .failures
            .list(DeliveryFailureFilter::default())
            .await
            .unwrap();
        if !failures.is_empty() {
            return failures;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    panic!("No delivery failure was recorded");
}

#[tokio::test(start_paused = true)]
async fn test_retries_follow_backoff_then_record_failure() {
    let mailer = MemoryMailer::failing(u32::MAX);
    let system =
        ShopSystem::new(&config(), Arc::new(mailer.clone())).expect("Failed to start system");
    record_quote(&system).await;

    let failures = wait_for_failures(&system).await;

    let attempts = mailer.attempts();
    assert_eq!(attempts.len(), 4, "One attempt and three retries");
    let gaps: Vec<u64> = attempts
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).as_secs())
        .collect();
    assert_eq!(gaps, vec![60, 120, 240]);

    assert_eq!(failures.len(), 1);
    let failure = &failures[0];
    assert_eq!(failure.attempts, 4);
    assert!(!failure.resolved);
    assert!(failure.error.contains("mail server unavailable"));
    let payload: Allocation = serde_json::from_str(&failure.payload).unwrap();
    assert_eq!(payload["Office 2024"].len(), 2);

    let resolved = system.failures.resolve(failure.id).await.unwrap();
    assert!(resolved.resolved);
    let open = system
        .failures
        .list(DeliveryFailureFilter {
            resolved: Some(false),
        })
        .await
        .unwrap();
    assert!(open.is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_is_delivered_on_retry() {
    let mailer = MemoryMailer::failing(2);
    let system =
        ShopSystem::new(&config(), Arc::new(mailer.clone())).expect("Failed to start system");
    let code = record_quote(&system).await;

    for _ in 0..1_000 {
        if !mailer.sent().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, format!("Your quote {code}"));
    assert_eq!(mailer.attempts().len(), 3);
    assert!(system
        .failures
        .list(DeliveryFailureFilter::default())
        .await
        .unwrap()
        .is_empty());

    system.shutdown().await.unwrap();
}

/// A notification whose action is gone cannot be rendered; it is logged without any send.
#[tokio::test]
async fn test_unrenderable_notification_is_recorded() {
    let mailer = MemoryMailer::new();
    let system =
        ShopSystem::new(&config(), Arc::new(MemoryMailer::new())).expect("Failed to start system");

    let (notifier, workers) = notify::start(
        DispatcherConfig {
            workers: 1,
            buffer: 4,
            policy: RetryPolicy::default(),
            currency: "MGA".into(),
            from: "no-reply@shop.mg".into(),
        },
        Arc::new(mailer.clone()),
        DispatcherStores {
            users: system.users.clone(),
            ledger: system.ledger.clone(),
            failures: system.failures.clone(),
        },
    );
    notifier
        .enqueue(Notification {
            client: UserId(1),
            action: ActionId(42),
            allocation: Allocation::new(),
        })
        .await;

    // Closing the queue lets the worker finish what it holds, then stop
    drop(notifier);
    for worker in workers {
        worker.await.unwrap();
    }

    let failures = system
        .failures
        .list(DeliveryFailureFilter::default())
        .await
        .unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].action, ActionId(42));
    assert_eq!(failures[0].attempts, 0);
    assert!(mailer.attempts().is_empty());

    system.shutdown().await.unwrap();
}
