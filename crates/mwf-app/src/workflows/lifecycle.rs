//! Session Lifecycle Workflow
//!
//! Create, join, finalize and switch. Each entry point takes its action's
//! latch before anything else, so a repeated click while a request is pending
//! returns [`AppError::ActionPending`] without touching state or the backend.
//!
//! State writes happen before and after the gateway call, never across it.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::core::AppCore;
use crate::errors::{AppError, ValidationError};
use crate::reactive::Dynamic;
use crate::runtime_bridge::{NewGameTicket, Operation};
use crate::views::{GameSettings, SessionCreationRequest, SessionPhase, SessionState};

/// Result of a successful create-or-join submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreationOutcome {
    /// A new game exists and waits to be finalized with this ticket
    Created(NewGameTicket),
    /// An existing game was joined
    Joined,
}

/// Record `err` on the session view and hand it back.
fn surface(session: &Dynamic<SessionState>, err: AppError) -> AppError {
    session.update(|s| s.last_error = Some(err.to_string()));
    err
}

/// Clears a pending flag once, bumping the version only if it was set.
fn clear_flag(session: &Dynamic<SessionState>, flag: fn(&mut SessionState) -> &mut bool) {
    session.update_if(|s| std::mem::replace(flag(s), false));
}

// =============================================================================
// Create / Join
// =============================================================================

/// Create a new game or join an existing one
///
/// **What it does**: Validates the request, calls `make_new_game` or
/// `join_existing_game`, and moves the session phase
/// **Returns**: The ticket for a new game, or [`CreationOutcome::Joined`]
///
/// On failure the phase the session had before the call is restored.
pub async fn submit_create_or_join(
    app: &AppCore,
    request: SessionCreationRequest,
) -> Result<CreationOutcome, AppError> {
    let session = app.session_cell();
    let _guard = app
        .latches
        .create
        .try_acquire()?
        .on_release(move || clear_flag(session, |s| &mut s.creating));

    let request = request
        .validated()
        .map_err(|e| surface(session, e.into()))?;

    let prior = session.update(|s| {
        s.creating = true;
        std::mem::replace(&mut s.phase, SessionPhase::Creating)
    });
    info!(from = ?prior, nickname = %request.nickname(), "session creation started");

    let (operation, result) = match &request {
        SessionCreationRequest::New { nickname } => (
            Operation::MakeNewGame,
            app.gateway().make_new_game(nickname).await.map(Some),
        ),
        SessionCreationRequest::Join {
            nickname,
            invite_code,
        } => (
            Operation::JoinExistingGame,
            app.gateway()
                .join_existing_game(nickname, invite_code)
                .await
                .map(|()| None),
        ),
    };

    match result {
        Ok(Some(ticket)) => {
            session.update(|s| {
                s.creating = false;
                s.phase = SessionPhase::AwaitingFinalization;
                s.ticket = Some(ticket.clone());
                s.last_error = None;
            });
            info!(invite_code = %ticket.invite_code, "game created; awaiting finalization");
            Ok(CreationOutcome::Created(ticket))
        }
        Ok(None) => {
            session.update(|s| {
                s.creating = false;
                s.phase = SessionPhase::Active;
                s.ticket = None;
                s.last_error = None;
            });
            info!("joined existing game");
            Ok(CreationOutcome::Joined)
        }
        Err(gateway_err) => {
            let err = AppError::from_gateway(operation, gateway_err);
            warn!(operation = %operation, error = %err, "session creation failed");
            session.update(|s| {
                s.creating = false;
                if s.phase == SessionPhase::Creating {
                    s.phase = prior;
                }
            });
            Err(surface(session, err))
        }
    }
}

// =============================================================================
// Finalize
// =============================================================================

/// Finalize the game created by this client
///
/// **What it does**: Sends the held invite code and passcode with `settings`
/// to `finalize_game`
/// **Returns**: Unit result
///
/// Only valid while awaiting finalization with credentials held. Success
/// discards the passcode, so the same game cannot be finalized twice.
pub async fn finalize(app: &AppCore, settings: GameSettings) -> Result<(), AppError> {
    let session = app.session_cell();
    let _guard = app
        .latches
        .finalize
        .try_acquire()?
        .on_release(move || clear_flag(session, |s| &mut s.finalizing));

    let (phase, ticket) = session.with(|s| (s.phase, s.ticket.clone()));
    if phase != SessionPhase::AwaitingFinalization {
        return Err(surface(
            session,
            ValidationError::NotAwaitingFinalization {
                phase: phase.to_string(),
            }
            .into(),
        ));
    }
    let params = ticket
        .ok_or(ValidationError::MissingCredentials)
        .and_then(|t| settings.finalization_params(&t))
        .map_err(|e| surface(session, e.into()))?;

    session.update(|s| {
        s.finalizing = true;
        s.phase = SessionPhase::Finalizing;
    });
    info!(
        invite_code = %params.invite_code,
        finish_time_ms = params.finish_time_ms,
        start_amount = params.start_amount,
        "finalizing game"
    );

    match app.gateway().finalize_game(&params).await {
        Ok(()) => {
            session.update(|s| {
                s.finalizing = false;
                s.phase = SessionPhase::Active;
                if s
                    .ticket
                    .as_ref()
                    .is_some_and(|t| t.invite_code == params.invite_code)
                {
                    s.ticket = None;
                }
                s.last_error = None;
            });
            info!(invite_code = %params.invite_code, "game finalized");
            Ok(())
        }
        Err(gateway_err) => {
            let err = AppError::from_gateway(Operation::FinalizeGame, gateway_err);
            warn!(operation = %Operation::FinalizeGame, error = %err, "finalize failed");
            session.update(|s| {
                s.finalizing = false;
                if s.phase == SessionPhase::Finalizing {
                    s.phase = SessionPhase::AwaitingFinalization;
                }
            });
            Err(surface(session, err))
        }
    }
}

/// Finalize with the configured duration and starting amount.
pub async fn finalize_with_defaults(app: &AppCore) -> Result<(), AppError> {
    finalize(app, app.config().finalize).await
}

// =============================================================================
// Switch
// =============================================================================

/// Switch the loaded game
///
/// **What it does**: Calls `switch_to_game` and marks `target` active in the
/// registry
/// **Returns**: Unit result
///
/// An empty `target` deselects. It is handled locally and never reaches the
/// backend, but shares the switch latch: a deselect while a switch is pending
/// is rejected with [`AppError::ActionPending`] so the pending response
/// cannot overwrite it.
pub async fn switch_active(app: &AppCore, target: &str) -> Result<(), AppError> {
    let session = app.session_cell();
    let registry = app.registry_cell();

    if target.is_empty() {
        let _guard = app.latches.switch.try_acquire()?;
        let cleared = registry.update_if(|r| r.clear_active());
        session.update_if(|s| {
            if s.phase == SessionPhase::Active {
                s.phase = SessionPhase::Idle;
                true
            } else {
                false
            }
        });
        debug!(cleared, "game deselected");
        return Ok(());
    }

    let _guard = app
        .latches
        .switch
        .try_acquire()?
        .on_release(move || clear_flag(session, |s| &mut s.switching));

    let phase = session.with(|s| s.phase);
    if !phase.can_switch() {
        return Err(surface(
            session,
            ValidationError::SwitchUnavailable {
                phase: phase.to_string(),
            }
            .into(),
        ));
    }
    if !registry.with(|r| r.contains(target)) {
        let err = AppError::unknown_handle(target);
        error!(public_key = %target, "switch target is not a known game");
        return Err(surface(session, err));
    }

    session.update(|s| s.switching = true);
    info!(public_key = %target, "switching game");

    if let Err(gateway_err) = app.gateway().switch_to_game(target).await {
        let err = AppError::from_gateway(Operation::SwitchToGame, gateway_err);
        warn!(operation = %Operation::SwitchToGame, error = %err, "switch failed");
        session.update(|s| s.switching = false);
        return Err(surface(session, err));
    }

    // A snapshot may have dropped the target while the call was pending.
    let mut outcome = Ok(false);
    registry.update_if(|r| {
        let changed = r.active() != Some(target);
        match r.set_active(Some(target)) {
            Ok(()) => {
                outcome = Ok(changed);
                changed
            }
            Err(err) => {
                outcome = Err(err);
                false
            }
        }
    });
    let applied = match outcome {
        Ok(changed) => changed,
        Err(err) => {
            error!(public_key = %target, "switched game vanished from registry");
            session.update(|s| s.switching = false);
            return Err(surface(session, err));
        }
    };

    session.update(|s| {
        s.switching = false;
        if s.phase.can_switch() {
            s.phase = SessionPhase::Active;
        }
        s.last_error = None;
    });
    info!(public_key = %target, changed = applied, "game switched");
    Ok(())
}
