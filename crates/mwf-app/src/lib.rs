//! # mwf-app: Portable Session Core
//!
//! Headless core of the mine-with-friends desktop client. It knows which games
//! exist and which one is loaded, walks a game through create, finalize and
//! switch, keeps the chat scroll view, and backs the purchase offer form.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │  Frontends (desktop shell, tests)          │
//! └──────────────────────┬─────────────────────┘
//!                        │ workflows / snapshots
//! ┌──────────────────────▼─────────────────────┐
//! │  AppCore                                   │
//! │  ├── views (Dynamic<T> + Subscription<T>)  │
//! │  ├── workflows (latched user actions)      │
//! │  └── BackendGateway ──────────► host RPC   │
//! └────────────────────────────────────────────┘
//! ```
//!
//! The core never polls. Registry and chat updates arrive as full snapshots
//! pushed by the host; user actions go out through [`BackendGateway`].

pub mod config;
pub mod core;
pub mod errors;
pub mod reactive;
pub mod runtime_bridge;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod views;
pub mod workflows;

pub use crate::config::{AppConfig, ChatConfig, ConfigError};
pub use crate::core::AppCore;
pub use crate::errors::{Action, AppError, ErrorCategory, ValidationError};
pub use crate::reactive::{Dynamic, Subscription};
pub use crate::runtime_bridge::{
    BackendGateway, FinalizationParams, GatewayError, NewGameTicket, OfflineGateway, Operation,
    PlayerId, PurchaseOffer, PurchaseSchema,
};
pub use crate::views::{
    ChatFeed, ChatMessage, ChatView, GameHandle, GameIdentityRegistry, GameSettings,
    PurchaseState, RegistrySnapshot, SessionCreationRequest, SessionPhase, SessionState,
};
pub use crate::workflows::CreationOutcome;
