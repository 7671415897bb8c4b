//! Scriptable gateway for tests.
//!
//! [`ScriptedGateway`] records every call, answers with configurable
//! responses, and can hold calls pending until the test releases them. That
//! last part is what makes re-entrancy observable: start a call, leave it
//! parked on the gate, then try the same action again.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::runtime_bridge::{
    BackendGateway, FinalizationParams, GatewayError, NewGameTicket, Operation, PurchaseOffer,
    PurchaseSchema,
};

/// A call observed by [`ScriptedGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    /// `make_new_game`
    MakeNewGame {
        /// Nickname sent
        nickname: String,
    },
    /// `join_existing_game`
    JoinExistingGame {
        /// Nickname sent
        nickname: String,
        /// Invite code sent
        invite_code: String,
    },
    /// `finalize_game`
    FinalizeGame(FinalizationParams),
    /// `switch_to_game`
    SwitchToGame {
        /// Target key
        public_key: String,
    },
    /// `get_purchase_schema`
    GetPurchaseSchema,
    /// `make_purchase_offer`
    MakePurchaseOffer(PurchaseOffer),
}

impl GatewayCall {
    /// Operation this call invoked.
    pub fn operation(&self) -> Operation {
        match self {
            Self::MakeNewGame { .. } => Operation::MakeNewGame,
            Self::JoinExistingGame { .. } => Operation::JoinExistingGame,
            Self::FinalizeGame(_) => Operation::FinalizeGame,
            Self::SwitchToGame { .. } => Operation::SwitchToGame,
            Self::GetPurchaseSchema => Operation::GetPurchaseSchema,
            Self::MakePurchaseOffer(_) => Operation::MakePurchaseOffer,
        }
    }
}

struct Script {
    calls: Vec<GatewayCall>,
    failures: HashMap<Operation, GatewayError>,
    ticket: NewGameTicket,
    schema: PurchaseSchema,
}

/// In-memory [`BackendGateway`] driven by the test.
pub struct ScriptedGateway {
    script: Mutex<Script>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    operation_gates: Mutex<HashMap<Operation, Arc<Semaphore>>>,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGateway {
    /// Gateway that accepts everything, issuing ticket `ABC123` / `XYZ`.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                calls: Vec::new(),
                failures: HashMap::new(),
                ticket: NewGameTicket::new("ABC123", "XYZ"),
                schema: PurchaseSchema(serde_json::json!({ "type": "object" })),
            }),
            gate: Mutex::new(None),
            operation_gates: Mutex::new(HashMap::new()),
        }
    }

    /// Ticket returned by `make_new_game`.
    pub fn with_ticket(self, ticket: NewGameTicket) -> Self {
        self.script.lock().ticket = ticket;
        self
    }

    /// Change the ticket returned by later `make_new_game` calls.
    pub fn set_ticket(&self, ticket: NewGameTicket) {
        self.script.lock().ticket = ticket;
    }

    /// Schema returned by `get_purchase_schema`.
    pub fn with_schema(self, schema: serde_json::Value) -> Self {
        self.script.lock().schema = PurchaseSchema(schema);
        self
    }

    /// Make every later `operation` call fail with `err`.
    pub fn fail(&self, operation: Operation, err: GatewayError) {
        self.script.lock().failures.insert(operation, err);
    }

    /// Undo [`Self::fail`] for `operation`.
    pub fn succeed(&self, operation: Operation) {
        self.script.lock().failures.remove(&operation);
    }

    /// Park every later call until [`Self::release`] hands out a permit.
    ///
    /// Calls are recorded before they park.
    pub fn hold_calls(&self) {
        *self.gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `n` parked (or future) calls through.
    pub fn release(&self, n: usize) {
        if let Some(gate) = self.gate.lock().as_ref() {
            gate.add_permits(n);
        }
    }

    /// Park later `operation` calls until [`Self::release_operation`].
    ///
    /// Takes precedence over [`Self::hold_calls`] for that operation.
    pub fn hold(&self, operation: Operation) {
        self.operation_gates
            .lock()
            .insert(operation, Arc::new(Semaphore::new(0)));
    }

    /// Let `n` parked `operation` calls through.
    pub fn release_operation(&self, operation: Operation, n: usize) {
        if let Some(gate) = self.operation_gates.lock().get(&operation) {
            gate.add_permits(n);
        }
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.script.lock().calls.clone()
    }

    /// Number of calls made to `operation`.
    pub fn count(&self, operation: Operation) -> usize {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    async fn record(&self, call: GatewayCall) -> Result<(), GatewayError> {
        let operation = call.operation();
        self.script.lock().calls.push(call);

        let gate = self
            .operation_gates
            .lock()
            .get(&operation)
            .cloned()
            .or_else(|| self.gate.lock().clone());
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| GatewayError::unavailable("gate closed"))?;
            permit.forget();
        }

        match self.script.lock().failures.get(&operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BackendGateway for ScriptedGateway {
    async fn make_new_game(&self, nickname: &str) -> Result<NewGameTicket, GatewayError> {
        self.record(GatewayCall::MakeNewGame {
            nickname: nickname.to_string(),
        })
        .await?;
        Ok(self.script.lock().ticket.clone())
    }

    async fn join_existing_game(
        &self,
        nickname: &str,
        invite_code: &str,
    ) -> Result<(), GatewayError> {
        self.record(GatewayCall::JoinExistingGame {
            nickname: nickname.to_string(),
            invite_code: invite_code.to_string(),
        })
        .await
    }

    async fn finalize_game(&self, params: &FinalizationParams) -> Result<(), GatewayError> {
        self.record(GatewayCall::FinalizeGame(params.clone())).await
    }

    async fn switch_to_game(&self, public_key: &str) -> Result<(), GatewayError> {
        self.record(GatewayCall::SwitchToGame {
            public_key: public_key.to_string(),
        })
        .await
    }

    async fn get_purchase_schema(&self) -> Result<PurchaseSchema, GatewayError> {
        self.record(GatewayCall::GetPurchaseSchema).await?;
        Ok(self.script.lock().schema.clone())
    }

    async fn make_purchase_offer(&self, offer: &PurchaseOffer) -> Result<(), GatewayError> {
        self.record(GatewayCall::MakePurchaseOffer(offer.clone()))
            .await
    }
}

impl std::fmt::Debug for ScriptedGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let script = self.script.lock();
        f.debug_struct("ScriptedGateway")
            .field("calls", &script.calls.len())
            .field("failures", &script.failures)
            .field("held", &self.gate.lock().is_some())
            .field("held_operations", &self.operation_gates.lock().len())
            .finish()
    }
}
