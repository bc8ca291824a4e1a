//! Core type definitions for claims and leaderboard rows.
//!
//! # Type Categories
//!
//! ## Persistence Types
//! - [`Claim`]: a stored claim row with identity and derived net fee
//! - [`NewClaim`]: an ingestion payload before identity assignment
//!
//! ## Leaderboard Types
//! - [`ProviderTotal`]: one aggregate row, a provider and its summed net fee
//!
//! The net fee is derived once at ingestion time and persisted with the row;
//! it is never recomputed from a stored claim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted dental claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: i64,
    pub service_dttm: DateTime<Utc>,
    pub submitted_proc: String,
    pub group_id: String,
    pub subscriber_id: String,
    pub provider_npi: String,
    pub provider_fees: f64,
    pub allowed_fees: f64,
    pub member_co_ins: f64,
    pub member_co_pay: f64,
    pub quadrant: Option<String>,
    pub net_fee: f64,
}

/// A claim payload submitted for ingestion.
///
/// Carries no identity and no net fee; both are assigned by the store.
/// `service_dttm` defaults to the ingestion time when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClaim {
    #[serde(default)]
    pub service_dttm: Option<DateTime<Utc>>,
    pub submitted_proc: String,
    pub group_id: String,
    pub subscriber_id: String,
    pub provider_npi: String,
    pub provider_fees: f64,
    pub allowed_fees: f64,
    pub member_co_ins: f64,
    pub member_co_pay: f64,
    #[serde(default)]
    pub quadrant: Option<String>,
}

impl NewClaim {
    /// Derives the net fee: provider fees plus member responsibility, minus
    /// the allowed amount.
    #[must_use]
    pub fn net_fee(&self) -> f64 {
        self.provider_fees + self.member_co_pay + self.member_co_ins - self.allowed_fees
    }
}

/// One leaderboard row: a provider and its summed net fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderTotal {
    pub provider_npi: String,
    pub net_fee: f64,
}
