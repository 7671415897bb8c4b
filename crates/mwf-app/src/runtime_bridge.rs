//! # BackendGateway: the RPC seam to the game backend
//!
//! The core never talks to a ledger, a database or a socket. Everything that
//! needs the backend goes through [`BackendGateway`], implemented by the host
//! (a Tauri shell invoking its commands, a test double, etc.).
//!
//! ```text
//! mwf-app (pure)              host
//! ┌──────────────────┐        ┌──────────────────┐
//! │ AppCore          │        │ desktop shell    │
//! │  ┌──────────────┐│        │   implements     │
//! │  │BackendGateway│◄────────│   BackendGateway │
//! │  └──────────────┘│        │                  │
//! └──────────────────┘        └──────────────────┘
//! ```
//!
//! Every operation is a single request with a single response. The gateway
//! makes no idempotence promise; `AppCore` guarantees it is never called
//! twice concurrently for the same user action.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Bridge Types
// =============================================================================

/// Invite code and passcode issued by `make_new_game`.
///
/// The passcode is known only to the creator and is required to finalize.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameTicket {
    /// Code handed to joiners
    pub invite_code: String,
    /// Secret needed to finalize the game
    pub passcode: String,
}

impl NewGameTicket {
    /// Create a ticket
    pub fn new(invite_code: impl Into<String>, passcode: impl Into<String>) -> Self {
        Self {
            invite_code: invite_code.into(),
            passcode: passcode.into(),
        }
    }
}

impl fmt::Debug for NewGameTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewGameTicket")
            .field("invite_code", &self.invite_code)
            .field("passcode", &"<redacted>")
            .finish()
    }
}

/// Arguments to `finalize_game`.
///
/// Field names on the wire match the host command (`code`, `finish_time`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationParams {
    /// Invite code of the game being finalized
    #[serde(rename = "code")]
    pub invite_code: String,
    /// Creator passcode
    pub passcode: String,
    /// Game duration in milliseconds
    #[serde(rename = "finish_time")]
    pub finish_time_ms: u64,
    /// Starting balance for every player
    pub start_amount: u64,
}

impl fmt::Debug for FinalizationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalizationParams")
            .field("invite_code", &self.invite_code)
            .field("passcode", &"<redacted>")
            .field("finish_time_ms", &self.finish_time_ms)
            .field("start_amount", &self.start_amount)
            .finish()
    }
}

/// Identifier of the player a purchase offer is made on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque JSON schema describing the purchase form.
///
/// The core never interprets it; the host's form renderer does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseSchema(pub serde_json::Value);

/// Arguments to `make_purchase_offer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOffer {
    /// Form data collected against [`PurchaseSchema`]
    pub purchase_data: serde_json::Value,
    /// Player making the offer
    pub from: PlayerId,
}

/// Backend operations, named as the host exposes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `make_new_game`
    MakeNewGame,
    /// `join_existing_game`
    JoinExistingGame,
    /// `finalize_game`
    FinalizeGame,
    /// `switch_to_game`
    SwitchToGame,
    /// `get_purchase_schema`
    GetPurchaseSchema,
    /// `make_purchase_offer`
    MakePurchaseOffer,
}

impl Operation {
    /// Command name on the host side.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MakeNewGame => "make_new_game",
            Self::JoinExistingGame => "join_existing_game",
            Self::FinalizeGame => "finalize_game",
            Self::SwitchToGame => "switch_to_game",
            Self::GetPurchaseSchema => "get_purchase_schema",
            Self::MakePurchaseOffer => "make_purchase_offer",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Failure reported by a gateway call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend ran the operation and refused it
    #[error("rejected: {reason}")]
    Rejected {
        /// Backend-supplied reason
        reason: String,
    },
    /// The operation could not be delivered to the backend
    #[error("unavailable: {reason}")]
    Unavailable {
        /// Why delivery failed
        reason: String,
    },
}

impl GatewayError {
    /// Create a rejection
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Create an unavailability error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// Bridge trait for backend operations
///
/// The primary implementation lives in the desktop host, where each method
/// invokes the matching backend command. [`OfflineGateway`] covers the
/// offline case; `testing::ScriptedGateway` (feature `testing`) the test one.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Create a new game under `nickname`.
    async fn make_new_game(&self, nickname: &str) -> Result<NewGameTicket, GatewayError>;

    /// Join the game identified by `invite_code` under `nickname`.
    async fn join_existing_game(
        &self,
        nickname: &str,
        invite_code: &str,
    ) -> Result<(), GatewayError>;

    /// Activate a created game with concrete parameters.
    async fn finalize_game(&self, params: &FinalizationParams) -> Result<(), GatewayError>;

    /// Load the game identified by `public_key`.
    async fn switch_to_game(&self, public_key: &str) -> Result<(), GatewayError>;

    /// Fetch the purchase form schema.
    async fn get_purchase_schema(&self) -> Result<PurchaseSchema, GatewayError>;

    /// Submit a purchase offer.
    async fn make_purchase_offer(&self, offer: &PurchaseOffer) -> Result<(), GatewayError>;
}

/// Gateway used when no backend is attached.
///
/// Every call fails with [`GatewayError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGateway;

impl OfflineGateway {
    fn offline<T>(what: &str) -> Result<T, GatewayError> {
        Err(GatewayError::unavailable(format!(
            "{what} not available in offline mode"
        )))
    }
}

#[async_trait]
impl BackendGateway for OfflineGateway {
    async fn make_new_game(&self, _nickname: &str) -> Result<NewGameTicket, GatewayError> {
        Self::offline("Game creation")
    }

    async fn join_existing_game(
        &self,
        _nickname: &str,
        _invite_code: &str,
    ) -> Result<(), GatewayError> {
        Self::offline("Joining games")
    }

    async fn finalize_game(&self, _params: &FinalizationParams) -> Result<(), GatewayError> {
        Self::offline("Finalization")
    }

    async fn switch_to_game(&self, _public_key: &str) -> Result<(), GatewayError> {
        Self::offline("Switching games")
    }

    async fn get_purchase_schema(&self) -> Result<PurchaseSchema, GatewayError> {
        Self::offline("Purchase schema")
    }

    async fn make_purchase_offer(&self, _offer: &PurchaseOffer) -> Result<(), GatewayError> {
        Self::offline("Purchase offers")
    }
}
