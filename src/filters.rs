//! List filters
//!
//! Each listing screen filters with equality and date-range predicates.
//! Badge filters (licence status, policy status) are reduced to inclusive
//! date ranges so that the in-memory store and the SQL store evaluate the
//! exact same predicate.

use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;

use fleet_types::{
    AssetStatus, Driver, ExpiryStatus, InsurancePolicy, Location, LocationCategory, PolicyStatus,
    SemiTrailer, Trip, TripDirection, TripStatus, Vehicle,
};

use crate::rules::DEFAULT_WARNING_DAYS;

/// Reference date and warning window used to evaluate badge filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow {
    pub today: NaiveDate,
    pub warning_days: i64,
}

impl ExpiryWindow {
    pub fn new(today: NaiveDate, warning_days: i64) -> Self {
        Self {
            today,
            warning_days,
        }
    }

    pub fn today_with_default() -> Self {
        Self::new(chrono::Utc::now().date_naive(), DEFAULT_WARNING_DAYS)
    }

    /// Expiry dates that carry the given badge
    pub fn expiry_range(&self, status: ExpiryStatus) -> DateRange {
        let horizon = shift(self.today, self.warning_days);
        match status {
            ExpiryStatus::Expired => DateRange::until(shift(self.today, -1)),
            ExpiryStatus::ExpiringSoon => DateRange::between(self.today, horizon),
            ExpiryStatus::Valid => DateRange::since(shift(horizon, 1)),
        }
    }

    /// (start_date range, end_date range) of policies with the given badge
    pub fn policy_ranges(&self, status: PolicyStatus) -> (DateRange, DateRange) {
        let started = DateRange::until(self.today);
        match status {
            PolicyStatus::NotStarted => {
                (DateRange::since(shift(self.today, 1)), DateRange::any())
            }
            PolicyStatus::Active => (started, self.expiry_range(ExpiryStatus::Valid)),
            PolicyStatus::ExpiringSoon => (started, self.expiry_range(ExpiryStatus::ExpiringSoon)),
            PolicyStatus::Expired => (started, self.expiry_range(ExpiryStatus::Expired)),
        }
    }
}

/// Inclusive date range; either bound may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn since(from: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    pub fn until(to: NaiveDate) -> Self {
        Self {
            from: None,
            to: Some(to),
        }
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |f| date >= f) && self.to.map_or(true, |t| date <= t)
    }

    /// An unset date only matches an open range
    pub fn contains_opt(&self, date: Option<NaiveDate>) -> bool {
        match date {
            Some(d) => self.contains(d),
            None => self.is_open(),
        }
    }
}

/// Case-insensitive substring match against any of `fields`
fn text_matches(search: &Option<String>, fields: &[&str]) -> bool {
    match search.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(needle) => {
            let needle = needle.to_lowercase();
            fields.iter().any(|f| f.to_lowercase().contains(&needle))
        }
    }
}

/// `%needle%` for ILIKE, with LIKE metacharacters escaped
pub fn like_pattern(search: &str) -> String {
    let escaped = search
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Non-empty, trimmed search term
pub fn search_term(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub license_status: Option<ExpiryStatus>,
}

impl DriverFilter {
    pub fn matches(&self, driver: &Driver, window: ExpiryWindow) -> bool {
        text_matches(
            &self.search,
            &[
                driver.full_name.as_str(),
                driver.national_id.as_str(),
                driver.license_number.as_str(),
            ],
        ) && self.active.map_or(true, |a| driver.active == a)
            && self
                .license_status
                .map_or(true, |s| window.expiry_range(s).contains(driver.license_expiry))
    }
}

/// Filter shared by vehicles and semi-trailers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<AssetStatus>,
    #[serde(default)]
    pub inspection_status: Option<ExpiryStatus>,
}

impl AssetFilter {
    fn matches_common(
        &self,
        status: AssetStatus,
        inspection_expiry: Option<NaiveDate>,
        window: ExpiryWindow,
    ) -> bool {
        self.status.map_or(true, |s| status == s)
            && self.inspection_status.map_or(true, |s| {
                inspection_expiry.is_some_and(|d| window.expiry_range(s).contains(d))
            })
    }

    pub fn matches_vehicle(&self, vehicle: &Vehicle, window: ExpiryWindow) -> bool {
        let fields = [
            vehicle.plate.as_str(),
            vehicle.brand.as_str(),
            vehicle.model.as_str(),
        ];
        text_matches(&self.search, &fields)
            && self.matches_common(vehicle.status, vehicle.inspection_expiry, window)
    }

    pub fn matches_semi_trailer(&self, trailer: &SemiTrailer, window: ExpiryWindow) -> bool {
        text_matches(&self.search, &[trailer.plate.as_str()])
            && self.matches_common(trailer.status, trailer.inspection_expiry, window)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub policy_status: Option<PolicyStatus>,
    #[serde(default)]
    pub asset_id: Option<Uuid>,
}

impl PolicyFilter {
    pub fn matches(&self, policy: &InsurancePolicy, window: ExpiryWindow) -> bool {
        text_matches(&self.search, &[policy.policy_number.as_str(), policy.insurer.as_str()])
            && self.asset_id.map_or(true, |id| policy.asset.id() == id)
            && self.policy_status.map_or(true, |s| {
                let (starts, ends) = window.policy_ranges(s);
                starts.contains(policy.start_date) && ends.contains(policy.end_date)
            })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<LocationCategory>,
}

impl LocationFilter {
    pub fn matches(&self, location: &Location) -> bool {
        text_matches(&self.search, &[location.name.as_str(), location.city.as_str()])
            && self.category.map_or(true, |c| location.category == c)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<TripStatus>,
    #[serde(default)]
    pub direction: Option<TripDirection>,
    #[serde(default)]
    pub driver_id: Option<Uuid>,
    /// Earliest scheduled departure (inclusive)
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Latest scheduled departure (inclusive)
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl TripFilter {
    pub fn departure_range(&self) -> DateRange {
        DateRange {
            from: self.from,
            to: self.to,
        }
    }

    pub fn matches(&self, trip: &Trip) -> bool {
        text_matches(
            &self.search,
            &[
                trip.reference.as_str(),
                trip.container_number.as_deref().unwrap_or(""),
            ],
        ) && self.status.map_or(true, |s| trip.status == s)
            && self.direction.map_or(true, |d| trip.direction == d)
            && self.driver_id.map_or(true, |id| trip.driver_id == Some(id))
            && self.departure_range().contains_opt(trip.scheduled_departure)
    }
}


/// `date` moved by `days`, saturating at the calendar bounds
fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    let moved = Duration::try_days(days).and_then(|d| date.checked_add_signed(d));
    moved.unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_types::DriverInput;

    fn window() -> ExpiryWindow {
        ExpiryWindow::new(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(), 30)
    }

    fn driver(name: &str, expiry: NaiveDate, active: bool) -> Driver {
        Driver::from_input(DriverInput {
            full_name: name.into(),
            national_id: "N".into(),
            license_number: "L".into(),
            license_expiry: expiry,
            phone: None,
            email: None,
            active,
        })
    }

    #[test]
    fn test_expiry_ranges_partition_the_calendar() {
        let w = window();
        for offset in -5..=40 {
            let d = w.today + Duration::days(offset);
            let hits = ExpiryStatus::ALL
                .iter()
                .filter(|s| w.expiry_range(**s).contains(d))
                .count();
            assert_eq!(hits, 1, "date {} must carry exactly one badge", d);
        }
    }

    #[test]
    fn test_oversized_window_saturates() {
        let w = ExpiryWindow::new(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(), 1_000_000_000);
        assert!(w.expiry_range(ExpiryStatus::ExpiringSoon).contains(NaiveDate::MAX));
        assert!(!w.expiry_range(ExpiryStatus::Valid).contains(w.today));
    }

    #[test]
    fn test_driver_filter_combines_predicates() {
        let w = window();
        let expiring = driver("Marta Soler", w.today + Duration::days(5), true);
        let expired = driver("Pau Vidal", w.today - Duration::days(1), true);
        let inactive = driver("Marta Pons", w.today + Duration::days(5), false);

        let filter = DriverFilter {
            search: Some("marta".into()),
            active: Some(true),
            license_status: Some(ExpiryStatus::ExpiringSoon),
        };

        assert!(filter.matches(&expiring, w));
        assert!(!filter.matches(&expired, w));
        assert!(!filter.matches(&inactive, w));
    }

    #[test]
    fn test_trip_range_excludes_unscheduled() {
        let filter = TripFilter {
            from: Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            ..Default::default()
        };
        assert!(!filter.departure_range().contains_opt(None));
        assert!(TripFilter::default().departure_range().contains_opt(None));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" 50%_off "), "%50\\%\\_off%");
    }
}
