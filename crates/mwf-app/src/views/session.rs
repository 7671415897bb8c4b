//! # Session View State
//!
//! Where the client is in the create → finalize lifecycle, plus the pending
//! flags frontends use to disable buttons.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ValidationError;
use crate::runtime_bridge::{FinalizationParams, NewGameTicket};

/// One hour, in milliseconds.
pub const DEFAULT_FINISH_TIME_MS: u64 = 60 * 60 * 1000;

/// Starting balance handed to each player.
pub const DEFAULT_START_AMOUNT: u64 = 1_000_000;

/// Lifecycle phase of the client's own game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No game in progress
    #[default]
    Idle,
    /// `make_new_game` / `join_existing_game` in flight
    Creating,
    /// Game created; holding invite code and passcode
    AwaitingFinalization,
    /// `finalize_game` in flight
    Finalizing,
    /// Game finalized, joined or switched to
    Active,
}

impl SessionPhase {
    /// Whether a non-empty switch is allowed from this phase.
    #[must_use]
    pub fn can_switch(&self) -> bool {
        matches!(self, Self::Idle | Self::Active)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Creating => "creating",
            Self::AwaitingFinalization => "awaiting finalization",
            Self::Finalizing => "finalizing",
            Self::Active => "active",
        };
        f.write_str(s)
    }
}

/// A create-or-join submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum SessionCreationRequest {
    /// Start a new game
    New {
        /// Chain nickname
        nickname: String,
    },
    /// Join a game created by someone else
    Join {
        /// Chain nickname
        nickname: String,
        /// Code received from the creator
        invite_code: String,
    },
}

impl SessionCreationRequest {
    /// New-game request
    pub fn new_game(nickname: impl Into<String>) -> Self {
        Self::New {
            nickname: nickname.into(),
        }
    }

    /// Join request
    pub fn join(nickname: impl Into<String>, invite_code: impl Into<String>) -> Self {
        Self::Join {
            nickname: nickname.into(),
            invite_code: invite_code.into(),
        }
    }

    /// Trimmed nickname.
    pub fn nickname(&self) -> &str {
        match self {
            Self::New { nickname } | Self::Join { nickname, .. } => nickname.trim(),
        }
    }

    /// Check required fields, returning a trimmed copy.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let nickname = self.nickname();
        if nickname.is_empty() {
            return Err(ValidationError::MissingNickname);
        }
        match self {
            Self::New { .. } => Ok(Self::new_game(nickname)),
            Self::Join { invite_code, .. } => {
                let code = invite_code.trim();
                if code.is_empty() {
                    return Err(ValidationError::MissingInviteCode);
                }
                Ok(Self::join(nickname, code))
            }
        }
    }
}

/// Duration and stake used when finalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Game duration in milliseconds
    pub finish_time_ms: u64,
    /// Starting balance for every player
    pub start_amount: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            finish_time_ms: DEFAULT_FINISH_TIME_MS,
            start_amount: DEFAULT_START_AMOUNT,
        }
    }
}

impl GameSettings {
    /// Both values must be positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.finish_time_ms == 0 {
            return Err(ValidationError::NonPositiveFinishTime);
        }
        if self.start_amount == 0 {
            return Err(ValidationError::NonPositiveStartAmount);
        }
        Ok(())
    }

    /// Combine with the held ticket into backend parameters.
    pub fn finalization_params(
        &self,
        ticket: &NewGameTicket,
    ) -> Result<FinalizationParams, ValidationError> {
        self.validate()?;
        if ticket.invite_code.is_empty() || ticket.passcode.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(FinalizationParams {
            invite_code: ticket.invite_code.clone(),
            passcode: ticket.passcode.clone(),
            finish_time_ms: self.finish_time_ms,
            start_amount: self.start_amount,
        })
    }
}

/// Session state observed by frontends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Current phase
    pub phase: SessionPhase,
    /// Credentials from the last successful `New` submission, until finalized
    pub ticket: Option<NewGameTicket>,
    /// Create/join latch held
    pub creating: bool,
    /// Finalize latch held
    pub finalizing: bool,
    /// Switch latch held
    pub switching: bool,
    /// Last surfaced error, cleared by the next success
    pub last_error: Option<String>,
}

impl SessionState {
    /// Invite code to show to the creator.
    pub fn invite_code(&self) -> Option<&str> {
        self.ticket.as_ref().map(|t| t.invite_code.as_str())
    }

    /// Whether the finalize action should be offered.
    pub fn can_finalize(&self) -> bool {
        self.phase == SessionPhase::AwaitingFinalization
            && !self.finalizing
            && self
                .ticket
                .as_ref()
                .is_some_and(|t| !t.invite_code.is_empty() && !t.passcode.is_empty())
    }

    /// Label for the create/join button.
    pub fn submit_label(&self, join: bool) -> String {
        let action = if join { "Join" } else { "New" };
        if self.creating {
            format!("{action} Pending...")
        } else {
            format!("{action} Game")
        }
    }

    /// Label for the finalize button.
    pub fn finalize_label(&self) -> &'static str {
        if self.finalizing {
            "Finalizing..."
        } else {
            "Finalize Game"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_requires_invite_code() {
        let req = SessionCreationRequest::join("Bob", "   ");
        assert_eq!(req.validated(), Err(ValidationError::MissingInviteCode));
    }

    #[test]
    fn test_blank_nickname_rejected_in_both_modes() {
        assert_eq!(
            SessionCreationRequest::new_game("").validated(),
            Err(ValidationError::MissingNickname)
        );
        assert_eq!(
            SessionCreationRequest::join(" ", "ABC").validated(),
            Err(ValidationError::MissingNickname)
        );
    }

    #[test]
    fn test_validated_trims_fields() {
        let req = SessionCreationRequest::join(" Bob ", " ABC123\n");
        assert_eq!(
            req.validated(),
            Ok(SessionCreationRequest::join("Bob", "ABC123"))
        );
    }

    #[test]
    fn test_default_settings() {
        let settings = GameSettings::default();
        assert_eq!(settings.finish_time_ms, 3_600_000);
        assert_eq!(settings.start_amount, 1_000_000);
    }

    #[test]
    fn test_zero_settings_rejected() {
        let ticket = NewGameTicket::new("ABC", "XYZ");
        let zero_time = GameSettings {
            finish_time_ms: 0,
            ..GameSettings::default()
        };
        assert_eq!(
            zero_time.finalization_params(&ticket),
            Err(ValidationError::NonPositiveFinishTime)
        );

        let zero_amount = GameSettings {
            start_amount: 0,
            ..GameSettings::default()
        };
        assert_eq!(
            zero_amount.finalization_params(&ticket),
            Err(ValidationError::NonPositiveStartAmount)
        );
    }

    #[test]
    fn test_request_wire_shape() {
        let json = serde_json::to_value(SessionCreationRequest::join("Bob", "C0DE")).unwrap();
        assert_eq!(json["mode"], "Join");
        assert_eq!(json["invite_code"], "C0DE");
    }

    #[test]
    fn test_can_finalize_needs_ticket_and_phase() {
        let mut state = SessionState {
            phase: SessionPhase::AwaitingFinalization,
            ..SessionState::default()
        };
        assert!(!state.can_finalize());

        state.ticket = Some(NewGameTicket::new("ABC", "XYZ"));
        assert!(state.can_finalize());

        state.finalizing = true;
        assert!(!state.can_finalize());
        assert_eq!(state.finalize_label(), "Finalizing...");
    }

    #[test]
    fn test_submit_label() {
        let mut state = SessionState::default();
        assert_eq!(state.submit_label(false), "New Game");
        state.creating = true;
        assert_eq!(state.submit_label(true), "Join Pending...");
    }
}
