//! # bistro-session: Session Orchestration for Bistro POS
//!
//! Wraps the pure cart engine of `bistro-core` in a session the storefront
//! can drive: it fetches the catalog and promotions, keeps the newest
//! snapshot of each, reads the clock, and hands checked-out orders to the
//! order submitter.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Architecture                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  PosSession (Main Orchestrator)                  │  │
//! │  │                                                                  │  │
//! │  │  Mutex<CartStore>: one mutation at a time                        │  │
//! │  │  CartView snapshots for the view layer                           │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ SnapshotSlot   │  │ Providers      │  │  Clock                 │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Latest refresh │  │ Catalog        │  │ System clock in the    │    │
//! │  │ wins; stale    │  │ Promotions     │  │ store's offset, or a   │    │
//! │  │ fetches drop   │  │ OrderSubmitter │  │ fixed clock for tests  │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  AMBIENT: SessionConfig (TOML + env), telemetry (tracing EnvFilter),   │
//! │           SessionError / ViewError                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use bistro_session::{
//!     AddLineRequest, InMemorySubmitter, JsonFileProvider, PosSession, SessionConfig, SystemClock,
//! };
//!
//! # async fn run() -> Result<(), bistro_session::SessionError> {
//! let config = SessionConfig::load_or_default(None);
//! let provider = JsonFileProvider::new("./data");
//! let session = PosSession::new(
//!     &config,
//!     provider.clone(),
//!     provider,
//!     InMemorySubmitter::new(),
//!     Arc::new(SystemClock::from_offset(config.utc_offset())),
//! );
//!
//! session.refresh_all().await?;
//! session.add_line(AddLineRequest::new("d-1")).await?;
//! let view = session.view().await;
//! println!("{}", config.format_amount(view.totals.final_total));
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod snapshot;
pub mod telemetry;

// =============================================================================
// Public Re-exports
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SessionConfig;
pub use error::{ErrorCode, SessionError, SessionResult, ViewError};
pub use providers::{
    CatalogProvider, InMemorySubmitter, JsonFileProvider, OrderSubmitter, PromotionProvider,
    StaticCatalogProvider, StaticPromotionProvider, SubmissionReceipt,
};
pub use session::{AddLineRequest, CartView, PosSession, ToppingPick};
pub use snapshot::{RefreshOutcome, SnapshotSlot};
