use crate::allocator::Allocator;
use crate::auth::{hash_password, TokenService};
use crate::catalog::Catalog;
use crate::clients::{
    CategoryClient, FailureLogClient, KeyPoolClient, LedgerClient, PaymentMethodClient,
    ProductClient, UserClient,
};
use crate::config::{BootstrapAdmin, Config};
use crate::model::{AccountType, CompanyNumbers, Role, User, UserCreate};
use crate::notify::{self, DispatcherConfig, DispatcherStores, Mailer, RetryPolicy};
use crate::store::Database;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Starts, wires and stops every actor of the shop.
///
/// # Architecture
///
/// Seven actors, each owning one store and writing it through to the SQLite database named by
/// [`Config::database`]:
///
/// | Actor | Context | Notes |
/// |-------|---------|-------|
/// | User | `()` | |
/// | Category | `()` | |
/// | PaymentMethod | `()` | |
/// | DeliveryFailure | `()` | written by the dispatcher |
/// | Product | `CategoryClient` | category lookup for the product code |
/// | Key | `ProductClient` | product lookup for the key code |
/// | Action (ledger) | `KeyPoolClient` | claims keys while recording a purchase |
///
/// The notification workers hold the User, ledger and failure-log clients; the
/// [`Allocator`] holds the queue handle.
///
/// # Example
///
/// ```ignore
/// let system = ShopSystem::new(&Config::in_memory(), Arc::new(ConsoleMailer))?;
/// let outcome = system.allocator.submit(&principal, request).await?;
/// system.shutdown().await?;
/// ```
pub struct ShopSystem {
    pub users: UserClient,
    pub categories: CategoryClient,
    pub products: ProductClient,
    pub payments: PaymentMethodClient,
    pub keys: KeyPoolClient,
    pub ledger: LedgerClient,
    pub failures: FailureLogClient,
    pub catalog: Catalog,
    pub allocator: Allocator,
    pub tokens: TokenService,

    /// Notification workers; they stop once every queue handle is gone.
    workers: Vec<JoinHandle<()>>,
    /// Actor tasks (used for graceful shutdown)
    actors: Vec<JoinHandle<()>>,
}

impl ShopSystem {
    /// Opens the database, loads every actor from it and starts them with the notification
    /// workers. Fails if the database cannot be opened or holds unreadable rows.
    pub fn new(config: &Config, mailer: Arc<dyn Mailer>) -> Result<Self, String> {
        let buffer = config.actor_buffer;
        let db = Database::open(&config.database).map_err(|e| e.to_string())?;

        // 1. Create actors
        let (user_actor, users) = crate::user_actor::open(buffer, &db).map_err(|e| e.to_string())?;
        let (category_actor, categories) =
            crate::category_actor::open(buffer, &db).map_err(|e| e.to_string())?;
        let (payment_actor, payments) =
            crate::payment_actor::open(buffer, &db).map_err(|e| e.to_string())?;
        let (failure_actor, failures) =
            crate::failure_actor::open(buffer, &db).map_err(|e| e.to_string())?;
        let (product_actor, products) =
            crate::product_actor::open(buffer, &db).map_err(|e| e.to_string())?;
        let (key_actor, keys) = crate::key_actor::open(buffer, &db).map_err(|e| e.to_string())?;
        let (ledger_actor, ledger) =
            crate::ledger_actor::open(buffer, &db).map_err(|e| e.to_string())?;

        // 2. Start actors with injected context
        let actors = vec![
            tokio::spawn(user_actor.run(())),
            tokio::spawn(category_actor.run(())),
            tokio::spawn(payment_actor.run(())),
            tokio::spawn(failure_actor.run(())),
            tokio::spawn(product_actor.run(categories.clone())),
            tokio::spawn(key_actor.run(products.clone())),
            tokio::spawn(ledger_actor.run(keys.clone())),
        ];

        // 3. Services on top of the actors
        let (notifier, workers) = notify::start(
            DispatcherConfig {
                workers: config.notify_workers,
                buffer,
                policy: RetryPolicy::new(config.notify_max_retries, config.notify_initial_delay),
                currency: config.currency.clone(),
                from: config.mail_from.clone(),
            },
            mailer,
            DispatcherStores {
                users: users.clone(),
                ledger: ledger.clone(),
                failures: failures.clone(),
            },
        );
        let catalog = Catalog::new(categories.clone(), products.clone(), keys.clone());
        let allocator = Allocator::new(
            users.clone(),
            payments.clone(),
            catalog.clone(),
            keys.clone(),
            ledger.clone(),
            notifier,
        );
        let tokens = TokenService::new(
            users.clone(),
            chrono::Duration::minutes(config.access_ttl_minutes),
            chrono::Duration::days(config.refresh_ttl_days),
        );

        info!(actors = actors.len(), database = %config.database, "Shop system started");
        Ok(Self {
            users,
            categories,
            products,
            payments,
            keys,
            ledger,
            failures,
            catalog,
            allocator,
            tokens,
            workers,
            actors,
        })
    }

    /// Creates the configured admin unless an account already uses its email.
    pub async fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> Result<User, String> {
        if let Some(existing) = self
            .users
            .find_by_email(&admin.email)
            .await
            .map_err(|e| e.to_string())?
        {
            info!(user_id = %existing.id, "Admin account already present");
            return Ok(existing);
        }
        let user = self
            .users
            .create_user(UserCreate {
                email: admin.email.clone(),
                full_name: "Administrator".into(),
                role: Role::Admin,
                account_type: AccountType::Individual,
                phone: String::new(),
                address: String::new(),
                company: CompanyNumbers::default(),
                password_hash: hash_password(&admin.password).map_err(|e| e.to_string())?,
            })
            .await
            .map_err(|e| e.to_string())?;
        info!(user_id = %user.id, "Admin account created");
        Ok(user)
    }

    /// Gracefully shuts down the entire system.
    ///
    /// Every handle held outside the system (router state, test clones) must be dropped first,
    /// or the matching actors keep running and this never returns.
    ///
    /// 1. Drops the clients and services, which closes the notification queue and the channels
    /// 2. Waits for the workers, then for every actor task
    /// 3. Returns an error if any task panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        let Self {
            users,
            categories,
            products,
            payments,
            keys,
            ledger,
            failures,
            catalog,
            allocator,
            tokens,
            workers,
            actors,
        } = self;
        drop(allocator);
        drop(tokens);
        drop(catalog);

        for handle in workers {
            if let Err(e) = handle.await {
                error!("Notification worker failed: {:?}", e);
                return Err(format!("Notification worker failed: {:?}", e));
            }
        }

        drop((users, categories, products, payments, keys, ledger, failures));
        for handle in actors {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
