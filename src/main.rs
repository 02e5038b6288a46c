//! Serves the shop over HTTP until Ctrl-C.

use actor_framework::tracing::setup_tracing;
use keyshop::config::Config;
use keyshop::http::{router, AppState};
use keyshop::lifecycle::ShopSystem;
use keyshop::notify::{ConsoleMailer, Mailer, SmtpMailer};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = Config::from_env().map_err(|e| e.to_string())?;
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            info!(host = %smtp.host, port = smtp.port, "Invoices go out over SMTP");
            Arc::new(SmtpMailer::new(smtp).map_err(|e| e.to_string())?)
        }
        None => {
            warn!("KEYSHOP_SMTP_HOST not set; invoices are only logged");
            Arc::new(ConsoleMailer)
        }
    };
    let system = ShopSystem::new(&config, mailer)?;

    match &config.admin {
        Some(admin) => {
            system
                .bootstrap_admin(admin)
                .await
                .map_err(|e| e.to_string())?;
        }
        None => warn!("KEYSHOP_ADMIN_EMAIL not set; no admin account bootstrapped"),
    }

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .map_err(|e| format!("Cannot bind {}: {e}", config.bind))?;
    info!(address = %config.bind, "Listening");

    let app = router(AppState::new(&system));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await
        .map_err(|e| e.to_string())?;

    system.shutdown().await
}
