use crate::database::connection::DbPool;
use crate::models::donation::{Donation, DonationError, DonationStatus, PaymentEvent, Transition};
use serde::Deserialize;
use tracing::{info, warn};

/// Razorpay webhook envelope: `{event, payload: {payment: {entity: {...}}}}`.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    pub payload: WebhookPayload,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub payment: PaymentWrapper,
}

#[derive(Debug, Deserialize)]
pub struct PaymentWrapper {
    pub entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub order_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The donation transitioned and, for captures, the campaign was credited.
    Applied(DonationStatus),
    /// The donation was already terminal; redelivery, nothing written.
    AlreadyTerminal,
    /// No donation references this order; acknowledged so the gateway stops retrying.
    UnknownOrder,
    /// Event type carries no state change for this design.
    Ignored,
}

/// Apply one verified gateway event to the donation ledger. Every outcome
/// except a storage failure is acknowledged with success; the gateway only
/// retries deliveries this system can still resolve.
pub async fn reconcile(
    pool: &DbPool,
    envelope: &WebhookEnvelope,
) -> Result<ReconcileOutcome, DonationError> {
    let event = PaymentEvent::parse(&envelope.event);
    if event == PaymentEvent::Other {
        info!("Ignoring gateway event type: {}", envelope.event);
        return Ok(ReconcileOutcome::Ignored);
    }

    let entity = &envelope.payload.payment.entity;
    let donation = match Donation::find_by_order_id(pool, &entity.order_id).await? {
        Some(donation) => donation,
        None => {
            warn!(
                "Webhook for unknown order {}, acknowledging without changes",
                entity.order_id
            );
            return Ok(ReconcileOutcome::UnknownOrder);
        }
    };

    match donation.status.transition(event) {
        Transition::Apply(DonationStatus::Paid) => {
            if donation.mark_paid(pool, &entity.id).await? {
                info!(
                    "Donation {} paid, campaign {} credited with {}",
                    donation.id, donation.campaign_id, donation.amount
                );
                Ok(ReconcileOutcome::Applied(DonationStatus::Paid))
            } else {
                // A concurrent delivery won the guarded update.
                Ok(ReconcileOutcome::AlreadyTerminal)
            }
        }
        Transition::Apply(_) => {
            if donation.mark_failed(pool, &entity.id).await? {
                info!("Donation {} marked failed", donation.id);
                Ok(ReconcileOutcome::Applied(DonationStatus::Failed))
            } else {
                Ok(ReconcileOutcome::AlreadyTerminal)
            }
        }
        Transition::AlreadyTerminal => {
            info!(
                "Donation {} already {:?}, skipping redelivered {}",
                donation.id, donation.status, envelope.event
            );
            Ok(ReconcileOutcome::AlreadyTerminal)
        }
        Transition::Ignore => Ok(ReconcileOutcome::Ignored),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_the_gateway_shape() {
        let body = r#"{
            "entity": "event",
            "event": "payment.captured",
            "payload": {
                "payment": {
                    "entity": {
                        "id": "pay_29QQoUBi66xm2f",
                        "order_id": "order_9A33XWu170gUtm",
                        "amount": 50000,
                        "currency": "INR",
                        "status": "captured"
                    }
                }
            }
        }"#;

        let envelope: WebhookEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.event, "payment.captured");
        assert_eq!(envelope.payload.payment.entity.id, "pay_29QQoUBi66xm2f");
        assert_eq!(
            envelope.payload.payment.entity.order_id,
            "order_9A33XWu170gUtm"
        );
    }

    #[test]
    fn envelope_rejects_bodies_missing_the_payment_entity() {
        let body = r#"{"event": "payment.captured", "payload": {}}"#;
        assert!(serde_json::from_str::<WebhookEnvelope>(body).is_err());
    }
}
