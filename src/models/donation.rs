use crate::database::connection::DbPool;
use crate::models::campaign::Campaign;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DonationError {
    #[error("Donation with ID {id} not found")]
    NotFound { id: Uuid },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "donation_status", rename_all = "lowercase")]
pub enum DonationStatus {
    Created,
    Paid,
    Failed,
}

/// Gateway payment lifecycle events the reconciler understands. Everything
/// else is accepted and acknowledged without a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEvent {
    Captured,
    Failed,
    Other,
}

impl PaymentEvent {
    pub fn parse(event: &str) -> Self {
        match event {
            "payment.captured" => PaymentEvent::Captured,
            "payment.failed" => PaymentEvent::Failed,
            _ => PaymentEvent::Other,
        }
    }
}

/// Outcome of asking the state machine what a gateway event means for a
/// donation in its current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Apply(DonationStatus),
    AlreadyTerminal,
    Ignore,
}

impl DonationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DonationStatus::Paid | DonationStatus::Failed)
    }

    /// Status only moves forward: `Created` reaches `Paid` or `Failed` once,
    /// and a redelivered event against a terminal donation is a no-op.
    pub fn transition(self, event: PaymentEvent) -> Transition {
        match (self, event) {
            (_, PaymentEvent::Other) => Transition::Ignore,
            (DonationStatus::Created, PaymentEvent::Captured) => {
                Transition::Apply(DonationStatus::Paid)
            }
            (DonationStatus::Created, PaymentEvent::Failed) => {
                Transition::Apply(DonationStatus::Failed)
            }
            (DonationStatus::Paid | DonationStatus::Failed, _) => Transition::AlreadyTerminal,
        }
    }
}

/// Who the money came from. A donation is owned by a registered account or
/// by a guest identified by email and PAN, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payer {
    Registered(Uuid),
    Guest { email: String, pan: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub status: DonationStatus,
    pub user_id: Option<Uuid>,
    pub guest_email: Option<String>,
    #[serde(skip_serializing)]
    pub guest_pan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDonation {
    pub campaign_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub gateway_order_id: String,
    pub payer: Payer,
}

impl Donation {
    pub async fn create(pool: &DbPool, donation: CreateDonation) -> Result<Self, DonationError> {
        let now = Utc::now();
        let (user_id, guest_email, guest_pan) = match donation.payer {
            Payer::Registered(id) => (Some(id), None, None),
            Payer::Guest { email, pan } => (None, Some(email), Some(pan)),
        };

        let donation = sqlx::query_as::<_, Donation>(
            "INSERT INTO donations (id, campaign_id, amount, currency, gateway_order_id, status, user_id, guest_email, guest_pan, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, 'created', $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(donation.campaign_id)
        .bind(donation.amount)
        .bind(donation.currency)
        .bind(donation.gateway_order_id)
        .bind(user_id)
        .bind(guest_email)
        .bind(guest_pan)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(donation)
    }

    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let donation = sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(donation)
    }

    pub async fn find_by_order_id(
        pool: &DbPool,
        gateway_order_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let donation =
            sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE gateway_order_id = $1")
                .bind(gateway_order_id)
                .fetch_optional(pool)
                .await?;

        Ok(donation)
    }

    pub async fn find_by_campaign(
        pool: &DbPool,
        campaign_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let donations = sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE campaign_id = $1 ORDER BY created_at DESC",
        )
        .bind(campaign_id)
        .fetch_all(pool)
        .await?;

        Ok(donations)
    }

    pub async fn find_by_user(pool: &DbPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let donations = sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(donations)
    }

    /// Flip this donation to `paid` and credit the campaign's raised total,
    /// both inside one transaction. The status update is guarded on the row
    /// still being `created`, so a concurrent redelivery of the same capture
    /// event finds zero affected rows and skips the increment. Returns
    /// whether the transition was applied.
    pub async fn mark_paid(
        &self,
        pool: &DbPool,
        gateway_payment_id: &str,
    ) -> Result<bool, DonationError> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE donations SET status = 'paid', gateway_payment_id = $2, updated_at = $3
             WHERE id = $1 AND status = 'created'",
        )
        .bind(self.id)
        .bind(gateway_payment_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        Campaign::increment_raised(&mut *tx, self.campaign_id, self.amount).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Flip this donation to `failed`. No financial side effect; guarded the
    /// same way as `mark_paid`.
    pub async fn mark_failed(
        &self,
        pool: &DbPool,
        gateway_payment_id: &str,
    ) -> Result<bool, DonationError> {
        let result = sqlx::query(
            "UPDATE donations SET status = 'failed', gateway_payment_id = $2, updated_at = $3
             WHERE id = $1 AND status = 'created'",
        )
        .bind(self.id)
        .bind(gateway_payment_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_event_pays_a_created_donation() {
        assert_eq!(
            DonationStatus::Created.transition(PaymentEvent::Captured),
            Transition::Apply(DonationStatus::Paid)
        );
    }

    #[test]
    fn failed_event_fails_a_created_donation() {
        assert_eq!(
            DonationStatus::Created.transition(PaymentEvent::Failed),
            Transition::Apply(DonationStatus::Failed)
        );
    }

    #[test]
    fn redelivered_capture_is_a_no_op_on_paid() {
        assert_eq!(
            DonationStatus::Paid.transition(PaymentEvent::Captured),
            Transition::AlreadyTerminal
        );
    }

    #[test]
    fn terminal_states_never_move() {
        for status in [DonationStatus::Paid, DonationStatus::Failed] {
            for event in [PaymentEvent::Captured, PaymentEvent::Failed] {
                assert_eq!(status.transition(event), Transition::AlreadyTerminal);
            }
        }
    }

    #[test]
    fn unrecognised_events_are_ignored_in_any_state() {
        for status in [
            DonationStatus::Created,
            DonationStatus::Paid,
            DonationStatus::Failed,
        ] {
            assert_eq!(status.transition(PaymentEvent::Other), Transition::Ignore);
        }
    }

    #[test]
    fn event_names_parse_to_known_variants() {
        assert_eq!(PaymentEvent::parse("payment.captured"), PaymentEvent::Captured);
        assert_eq!(PaymentEvent::parse("payment.failed"), PaymentEvent::Failed);
        assert_eq!(PaymentEvent::parse("payment.authorized"), PaymentEvent::Other);
        assert_eq!(PaymentEvent::parse("order.paid"), PaymentEvent::Other);
    }
}
