//! Categorized application errors
//!
//! Every workflow returns [`AppError`]. Frontends use [`ErrorCategory`] to
//! decide whether an error disables an action, shows a retryable notice, or
//! gets reported as a bug.

use std::fmt;
use thiserror::Error;

use crate::runtime_bridge::{GatewayError, Operation};

// ============================================================================
// Error Categories
// ============================================================================

/// High-level error categories for frontend error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Input rejected before reaching the backend (correctable by user)
    Input,
    /// Referenced game is not in the registry
    NotFound,
    /// Backend completed the call but signalled failure, or was unreachable
    Backend,
    /// Same action already in flight
    Busy,
}

impl ErrorCategory {
    /// Whether the user can fix this by changing their input.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Input)
    }

    /// Whether re-submitting the same action may succeed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Input | Self::Backend | Self::Busy)
    }

    /// Short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::NotFound => "Not Found",
            Self::Backend => "Backend",
            Self::Busy => "Busy",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Actions
// ============================================================================

/// User-facing actions guarded by an in-flight latch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create a new game or join an existing one
    CreateOrJoin,
    /// Finalize a created game
    Finalize,
    /// Switch the loaded game
    Switch,
    /// Fetch the purchase form schema
    LoadPurchaseSchema,
    /// Submit a purchase offer
    PurchaseOffer,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateOrJoin => "create or join",
            Self::Finalize => "finalize",
            Self::Switch => "switch",
            Self::LoadPurchaseSchema => "load purchase schema",
            Self::PurchaseOffer => "purchase offer",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Client-side validation failures. These never reach the backend.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Nickname missing or blank
    #[error("a chain nickname is required")]
    MissingNickname,

    /// Join requested without an invite code
    #[error("an invite code is required to join a game")]
    MissingInviteCode,

    /// Finalize requested without a held invite code and passcode
    #[error("no invite code and passcode are held for finalization")]
    MissingCredentials,

    /// Finalize requested outside the awaiting-finalization phase
    #[error("cannot finalize while {phase}")]
    NotAwaitingFinalization {
        /// Phase the session was in
        phase: String,
    },

    /// Game duration must be positive
    #[error("finish time must be greater than zero")]
    NonPositiveFinishTime,

    /// Starting amount must be positive
    #[error("start amount must be greater than zero")]
    NonPositiveStartAmount,

    /// Switching to a game is not possible in the current phase
    #[error("cannot switch games while {phase}")]
    SwitchUnavailable {
        /// Phase the session was in
        phase: String,
    },

    /// Purchase offer attempted before the schema was loaded
    #[error("purchase schema has not been loaded")]
    SchemaNotLoaded,

    /// Purchase data must be a JSON object
    #[error("purchase data must be a JSON object")]
    MalformedPurchaseData,
}

/// Categorized application errors
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AppError {
    /// Rejected locally before any backend call
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The backend completed the call and signalled failure
    #[error("{operation} rejected by backend: {reason}")]
    BackendRejected {
        /// Backend operation
        operation: Operation,
        /// Reason reported by the backend
        reason: String,
    },

    /// The backend could not be reached
    #[error("{operation} unavailable: {reason}")]
    BackendUnavailable {
        /// Backend operation
        operation: Operation,
        /// Why the call could not be made
        reason: String,
    },

    /// Switch target is not a known game
    #[error("unknown game handle: {public_key}")]
    UnknownHandle {
        /// The key that failed to resolve
        public_key: String,
    },

    /// The same action is already in flight
    #[error("{action} already in progress")]
    ActionPending {
        /// Action whose latch was held
        action: Action,
    },
}

impl AppError {
    /// Wrap a gateway failure for `operation`.
    pub fn from_gateway(operation: Operation, err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { reason } => Self::BackendRejected { operation, reason },
            GatewayError::Unavailable { reason } => Self::BackendUnavailable { operation, reason },
        }
    }

    /// Create an unknown-handle error
    pub fn unknown_handle(public_key: impl Into<String>) -> Self {
        Self::UnknownHandle {
            public_key: public_key.into(),
        }
    }

    /// Category for frontend routing
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Input,
            Self::BackendRejected { .. } | Self::BackendUnavailable { .. } => {
                ErrorCategory::Backend
            }
            Self::UnknownHandle { .. } => ErrorCategory::NotFound,
            Self::ActionPending { .. } => ErrorCategory::Busy,
        }
    }

    /// Whether the user may retry the action as-is or after fixing input.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.category().is_recoverable()
    }

    /// Get a short error code string
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::BackendRejected { .. } => "BACKEND_REJECTED",
            Self::BackendUnavailable { .. } => "BACKEND_UNAVAILABLE",
            Self::UnknownHandle { .. } => "UNKNOWN_HANDLE",
            Self::ActionPending { .. } => "ACTION_PENDING",
        }
    }
}
