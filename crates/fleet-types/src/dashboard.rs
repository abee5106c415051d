//! Dashboard summary types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fleet::ExpiryStatus;

/// Trip counts per overall status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripStatusCounts {
    pub planned: usize,
    pub en_route: usize,
    pub completed: usize,
    pub incident: usize,
    pub cancelled: usize,
}

/// A dated document that needs attention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryAlert {
    /// "driver_license", "vehicle_inspection", "semi_trailer_inspection", "insurance_policy"
    pub subject: String,
    pub id: Uuid,
    pub label: String,
    pub expires_on: NaiveDate,
    pub status: ExpiryStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub trips: TripStatusCounts,
    pub active_drivers: usize,
    pub available_vehicles: usize,
    pub available_semi_trailers: usize,
    /// Sorted by expiry date, earliest first
    pub alerts: Vec<ExpiryAlert>,
}
