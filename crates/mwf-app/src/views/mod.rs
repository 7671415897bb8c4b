//! # View State
//!
//! Plain data describing what frontends render. Each view lives in a
//! [`crate::reactive::Dynamic`] owned by [`crate::AppCore`].

pub mod chat;
pub mod purchase;
pub mod registry;
pub mod session;

pub use chat::{ChatFeed, ChatMessage, ChatView};
pub use purchase::PurchaseState;
pub use registry::{GameHandle, GameIdentityRegistry, RegistrySnapshot};
pub use session::{GameSettings, SessionCreationRequest, SessionPhase, SessionState};
