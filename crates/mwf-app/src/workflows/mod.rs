//! # Workflows - User Actions
//!
//! Multi-step operations a frontend triggers from a button: create or join a
//! game, finalize it, switch the loaded game, and the purchase form.
//!
//! ## Design Patterns
//!
//! **1. Latch first**
//! - Every action takes its [`latch::InFlightLatch`] before reading state
//! - A held latch means `AppError::ActionPending`; the backend is not called
//! - The guard's release hook clears the view's pending flag, so a dropped
//!   future never leaves a button disabled
//!
//! **2. State around the call, never across it**
//! - Read and write the `Dynamic` views, release, await the gateway, then
//!   write again
//! - A response is applied to whatever the state is when it arrives
//!
//! **3. Error Handling**
//! - Return `Result<T, AppError>`; the core never retries
//! - Lifecycle failures are also recorded in `SessionState::last_error`
//!
//! ## Example
//!
//! ```rust,ignore
//! let outcome = workflows::submit_create_or_join(
//!     &app,
//!     SessionCreationRequest::new_game("alice"),
//! )
//! .await?;
//! if let CreationOutcome::Created(ticket) = outcome {
//!     show_invite_code(&ticket.invite_code);
//! }
//! workflows::finalize_with_defaults(&app).await?;
//! ```

pub mod latch;
pub mod lifecycle;
pub mod purchase;

pub use lifecycle::{
    finalize, finalize_with_defaults, submit_create_or_join, switch_active, CreationOutcome,
};
pub use purchase::{load_purchase_schema, submit_purchase_offer};
