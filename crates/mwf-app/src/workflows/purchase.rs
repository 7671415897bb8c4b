//! Purchase Offer Workflow
//!
//! Fetches the form schema and submits offers filled in against it. The
//! schema is opaque here; only the host's form renderer reads it.

use tracing::{info, warn};

use crate::core::AppCore;
use crate::errors::{AppError, ValidationError};
use crate::runtime_bridge::{Operation, PlayerId, PurchaseOffer, PurchaseSchema};

/// Fetch the purchase form schema
///
/// **What it does**: Calls `get_purchase_schema` once and stores the result
/// in the purchase view
/// **Returns**: The schema
///
/// A schema already loaded is returned without a backend call.
pub async fn load_purchase_schema(app: &AppCore) -> Result<PurchaseSchema, AppError> {
    let purchase = app.purchase_cell();
    let _guard = app.latches.schema.try_acquire()?.on_release(move || {
        purchase.update_if(|p| std::mem::replace(&mut p.loading_schema, false));
    });

    if let Some(schema) = purchase.with(|p| p.schema.clone()) {
        return Ok(schema);
    }

    purchase.update(|p| p.loading_schema = true);
    let result = app.gateway().get_purchase_schema().await;

    match result {
        Ok(schema) => {
            purchase.update(|p| {
                p.loading_schema = false;
                p.schema = Some(schema.clone());
            });
            info!("purchase schema loaded");
            Ok(schema)
        }
        Err(gateway_err) => {
            let err = AppError::from_gateway(Operation::GetPurchaseSchema, gateway_err);
            warn!(operation = %Operation::GetPurchaseSchema, error = %err, "schema fetch failed");
            purchase.update(|p| p.loading_schema = false);
            Err(err)
        }
    }
}

/// Submit a purchase offer on behalf of `from`
///
/// **What it does**: Checks the form is loaded and `purchase_data` is a JSON
/// object, then calls `make_purchase_offer`
/// **Returns**: Unit result
pub async fn submit_purchase_offer(
    app: &AppCore,
    from: PlayerId,
    purchase_data: serde_json::Value,
) -> Result<(), AppError> {
    let purchase = app.purchase_cell();
    let _guard = app.latches.offer.try_acquire()?.on_release(move || {
        purchase.update_if(|p| std::mem::replace(&mut p.submitting, false));
    });

    if !purchase.with(|p| p.is_ready()) {
        return Err(ValidationError::SchemaNotLoaded.into());
    }
    if !purchase_data.is_object() {
        return Err(ValidationError::MalformedPurchaseData.into());
    }

    let offer = PurchaseOffer {
        purchase_data,
        from,
    };
    purchase.update(|p| p.submitting = true);

    match app.gateway().make_purchase_offer(&offer).await {
        Ok(()) => {
            let sent = purchase.update(|p| {
                p.submitting = false;
                p.offers_sent = p.offers_sent.saturating_add(1);
                p.offers_sent
            });
            info!(player = %from, offers_sent = sent, "purchase offer submitted");
            Ok(())
        }
        Err(gateway_err) => {
            let err = AppError::from_gateway(Operation::MakePurchaseOffer, gateway_err);
            warn!(
                operation = %Operation::MakePurchaseOffer,
                player = %from,
                error = %err,
                "purchase offer failed"
            );
            purchase.update(|p| p.submitting = false);
            Err(err)
        }
    }
}
