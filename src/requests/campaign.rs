use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CampaignRequest {
    pub title: String,
    pub description: Option<String>,
    pub goal_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCampaignStatusRequest {
    pub status: String,
}
