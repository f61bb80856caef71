use crate::database::connection::DbPool;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, Type};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Campaign with ID {id} not found")]
    NotFound { id: Uuid },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("No fields provided for update")]
    NoUpdateFields,
}

#[derive(Debug, Clone, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "campaign_status", rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Live,
    Closed,
}

impl FromStr for CampaignStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CampaignStatus::Draft),
            "live" => Ok(CampaignStatus::Live),
            "closed" => Ok(CampaignStatus::Closed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub goal_amount: Decimal,
    pub raised_amount: Decimal,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaign {
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub goal_amount: Decimal,
}

impl Campaign {
    /// Only live campaigns accept new donations.
    pub fn is_fundable(&self) -> bool {
        self.status == CampaignStatus::Live
    }

    pub async fn create(pool: &DbPool, campaign: CreateCampaign) -> Result<Self, CampaignError> {
        let now = Utc::now();

        let campaign = sqlx::query_as::<_, Campaign>(
            "INSERT INTO campaigns (id, owner_id, title, description, goal_amount, raised_amount, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, 0, 'draft', $6, $7)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(campaign.owner_id)
        .bind(campaign.title)
        .bind(campaign.description)
        .bind(campaign.goal_amount)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(campaign)
    }

    pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let campaign = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(campaign)
    }

    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        let campaigns =
            sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?;

        Ok(campaigns)
    }

    pub async fn find_by_owner(pool: &DbPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            "SELECT * FROM campaigns WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(campaigns)
    }

    pub async fn set_status(
        pool: &DbPool,
        id: Uuid,
        status: CampaignStatus,
    ) -> Result<Self, CampaignError> {
        let now = Utc::now();

        let campaign = sqlx::query_as::<_, Campaign>(
            "UPDATE campaigns SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        campaign.ok_or(CampaignError::NotFound { id })
    }

    /// Add a confirmed donation amount to the raised total. The increment is
    /// a single in-database update so concurrent confirmations never lose
    /// each other's writes. Runs on any executor so the reconciler can wrap
    /// it in the same transaction as the donation status flip.
    pub async fn increment_raised<'e, E>(
        executor: E,
        id: Uuid,
        amount: Decimal,
    ) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            "UPDATE campaigns SET raised_amount = raised_amount + $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(amount)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        Ok(())
    }
}
