//! Restarting the shop over the same database file.

use actor_framework::ActorClient;
use keyshop::allocator::{ActionRequest, LineRequest};
use keyshop::auth::{hash_password, verify_password, Principal};
use keyshop::config::{BootstrapAdmin, Config};
use keyshop::lifecycle::ShopSystem;
use keyshop::model::*;
use keyshop::notify::MemoryMailer;
use rust_decimal::Decimal;
use std::sync::Arc;
use tempfile::TempDir;

fn config(dir: &TempDir) -> Config {
    Config {
        database: dir
            .path()
            .join("keyshop.db")
            .to_str()
            .expect("Temp path is not UTF-8")
            .into(),
        ..Config::default()
    }
}

fn start(config: &Config) -> ShopSystem {
    ShopSystem::new(config, Arc::new(MemoryMailer::new())).expect("Failed to start system")
}

fn account(email: &str, role: Role) -> UserCreate {
    UserCreate {
        email: email.into(),
        full_name: email.into(),
        role,
        account_type: AccountType::Individual,
        phone: String::new(),
        address: String::new(),
        company: CompanyNumbers::default(),
        password_hash: hash_password("secret").expect("Failed to hash password"),
    }
}

#[tokio::test]
async fn test_restart_keeps_actions_keys_and_failures() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = config(&dir);

    let system = start(&config);
    let seller = system
        .users
        .create_user(account("vola@shop.mg", Role::Vendeur))
        .await
        .expect("Failed to create seller");
    let client = system
        .users
        .create_user(account("hery@client.mg", Role::Client))
        .await
        .expect("Failed to create client");
    let payment = system
        .payments
        .create_method(PaymentMethodCreate {
            label: "Mvola".into(),
        })
        .await
        .expect("Failed to create payment method");
    let category = system
        .categories
        .create_category(CategoryCreate {
            name: "Bureautique".into(),
            description: String::new(),
        })
        .await
        .expect("Failed to create category");
    let product = system
        .products
        .create_product(ProductCreate {
            category: category.id,
            name: "Office".into(),
            description: String::new(),
            validity: Validity::OneYear,
            price_min: Decimal::new(9_000, 2),
            price: Decimal::new(12_550, 2),
            price_max: Decimal::new(15_000, 2),
        })
        .await
        .expect("Failed to create product");
    for n in 0..3 {
        system
            .keys
            .create_key(KeyCreate {
                product: product.id,
                secret: format!("OFFICE-{n}"),
            })
            .await
            .expect("Failed to create key");
    }

    let staff = Principal {
        user: seller.id,
        role: Role::Vendeur,
    };
    let outcome = system
        .allocator
        .submit(
            &staff,
            ActionRequest {
                kind: "ACHAT".into(),
                client: client.id,
                payment_method: payment.id,
                lines: vec![LineRequest {
                    product: product.id,
                    quantity: 2,
                }],
            },
        )
        .await
        .expect("Purchase failed");
    let failure = system
        .failures
        .record(DeliveryFailureCreate {
            client: client.id,
            action: outcome.action_id,
            error: "mailbox full".into(),
            attempts: 4,
            payload: "{}".into(),
        })
        .await
        .expect("Failed to record failure");
    system.shutdown().await.expect("Shutdown failed");

    let system = start(&config);

    let actions = system
        .ledger
        .list(ActionFilter::default())
        .await
        .expect("Failed to list actions");
    assert_eq!(actions, vec![outcome.action.clone()]);
    assert_eq!(actions[0].total_price, Decimal::new(25_100, 2));
    assert_eq!(actions[0].seller, Some(seller.id));

    assert_eq!(
        system.keys.count_available(product.id).await.unwrap(),
        1,
        "Consumed keys must stay consumed"
    );
    let held = system
        .keys
        .list(KeyFilter::held_by(outcome.action_id))
        .await
        .expect("Failed to list keys");
    assert_eq!(held.len(), 2);

    let failures = system
        .failures
        .list(DeliveryFailureFilter::default())
        .await
        .expect("Failed to list failures");
    assert_eq!(failures, vec![failure]);

    let reloaded = system
        .users
        .find_by_email("HERY@client.mg")
        .await
        .expect("Lookup failed")
        .expect("Client lost on restart");
    assert!(verify_password("secret", &reloaded.password_hash));

    // Ids carry on from the stored rows.
    let next = system
        .categories
        .create_category(CategoryCreate {
            name: "Antivirus".into(),
            description: String::new(),
        })
        .await
        .expect("Failed to create category");
    assert_eq!(next.id, CategoryId(category.id.0 + 1));

    // The last key can still be sold, once.
    let second = system
        .allocator
        .submit(
            &staff,
            ActionRequest {
                kind: "ACHAT".into(),
                client: client.id,
                payment_method: payment.id,
                lines: vec![LineRequest {
                    product: product.id,
                    quantity: 1,
                }],
            },
        )
        .await
        .expect("Purchase after restart failed");
    assert_eq!(second.action_id, ActionId(outcome.action_id.0 + 1));
    assert_eq!(system.keys.count_available(product.id).await.unwrap(), 0);

    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_bootstrap_admin_survives_restart() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = config(&dir);
    let admin = BootstrapAdmin {
        email: "root@shop.mg".into(),
        password: "secret".into(),
    };

    let system = start(&config);
    let first = system
        .bootstrap_admin(&admin)
        .await
        .expect("Bootstrap failed");
    system.shutdown().await.expect("Shutdown failed");

    let system = start(&config);
    let again = system
        .bootstrap_admin(&admin)
        .await
        .expect("Bootstrap failed");
    assert_eq!(again.id, first.id);
    assert_eq!(system.users.list(UserFilter::default()).await.unwrap().len(), 1);
    system.shutdown().await.expect("Shutdown failed");
}
