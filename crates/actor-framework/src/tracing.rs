//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging for any binary built on the framework.
//!
//! Every `ResourceActor` logs with an `entity_type` field (`Key`, `Action`, …), so the compact
//! format hides module paths (`with_target(false)`). Verbosity follows `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=info cargo run      # lifecycle: Created, Batch committed, Shutdown
//! RUST_LOG=debug cargo run     # full payloads and filters
//! RUST_LOG=keyshop=debug,actor_framework=info cargo run
//! ```
//!
//! A purchase of two keys reads like this at `info`:
//!
//! ```text
//! INFO Batch committed entity_type="Key" touched=2
//! INFO Created entity_type="Action" id=action_4 size=4
//! INFO Action recorded action_id=action_4 code=ACHAT-4 total=250000
//! ```
//!
//! A lost race rolls the batch back before the action is stored:
//!
//! ```text
//! WARN Batch rolled back entity_type="Key" error=Batch step 0 selected 1 of 2 entities
//! WARN Create failed entity_type="Action" id=action_5 error=...
//! ```

/// Installs the global `fmt` subscriber. Call once, at the start of `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
