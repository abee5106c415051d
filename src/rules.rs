//! Expiry badges
//!
//! Licences, technical inspections and insurance policies are classified
//! against today's date and a warning window (30 days unless configured).

use chrono::NaiveDate;

use fleet_types::{Driver, ExpiryStatus, InsurancePolicy, PolicyStatus};

pub const DEFAULT_WARNING_DAYS: i64 = 30;

/// Classify a single expiry date.
///
/// Expired strictly before `today`; expiring soon when the date falls
/// within `warning_days` of today (inclusive); valid otherwise.
pub fn expiry_status(expires_on: NaiveDate, today: NaiveDate, warning_days: i64) -> ExpiryStatus {
    let remaining = days_remaining(expires_on, today);
    if remaining < 0 {
        ExpiryStatus::Expired
    } else if remaining <= warning_days {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Valid
    }
}

pub fn license_status(driver: &Driver, today: NaiveDate, warning_days: i64) -> ExpiryStatus {
    expiry_status(driver.license_expiry, today, warning_days)
}

pub fn policy_status(policy: &InsurancePolicy, today: NaiveDate, warning_days: i64) -> PolicyStatus {
    if policy.start_date > today {
        return PolicyStatus::NotStarted;
    }
    match expiry_status(policy.end_date, today, warning_days) {
        ExpiryStatus::Valid => PolicyStatus::Active,
        ExpiryStatus::ExpiringSoon => PolicyStatus::ExpiringSoon,
        ExpiryStatus::Expired => PolicyStatus::Expired,
    }
}

/// Days left until `expires_on`; negative once it has passed
pub fn days_remaining(expires_on: NaiveDate, today: NaiveDate) -> i64 {
    (expires_on - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use fleet_types::{Coverage, DriverInput, InsurancePolicyInput, InsuredAsset};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_expiry_thresholds() {
        let t = today();
        assert_eq!(expiry_status(t - Duration::days(1), t, 30), ExpiryStatus::Expired);
        assert_eq!(expiry_status(t, t, 30), ExpiryStatus::ExpiringSoon);
        assert_eq!(expiry_status(t + Duration::days(30), t, 30), ExpiryStatus::ExpiringSoon);
        assert_eq!(expiry_status(t + Duration::days(31), t, 30), ExpiryStatus::Valid);
    }

    #[test]
    fn test_license_status_uses_expiry() {
        let driver = Driver::from_input(DriverInput {
            full_name: "Luis Gil".into(),
            national_id: "X1".into(),
            license_number: "C-2".into(),
            license_expiry: today() + Duration::days(10),
            phone: None,
            email: None,
            active: true,
        });
        assert_eq!(license_status(&driver, today(), 30), ExpiryStatus::ExpiringSoon);
        assert_eq!(license_status(&driver, today(), 5), ExpiryStatus::Valid);
    }

    #[test]
    fn test_policy_status_window() {
        let mut policy = InsurancePolicy::from_input(InsurancePolicyInput {
            policy_number: "P-1".into(),
            insurer: "Allianz".into(),
            asset: InsuredAsset::Vehicle { id: Uuid::new_v4() },
            coverage: Coverage::ThirdParty,
            start_date: today() + Duration::days(2),
            end_date: today() + Duration::days(365),
            premium: Decimal::new(120000, 2),
        });
        assert_eq!(policy_status(&policy, today(), 30), PolicyStatus::NotStarted);

        policy.start_date = today() - Duration::days(300);
        assert_eq!(policy_status(&policy, today(), 30), PolicyStatus::Active);

        policy.end_date = today() + Duration::days(3);
        assert_eq!(policy_status(&policy, today(), 30), PolicyStatus::ExpiringSoon);

        policy.end_date = today() - Duration::days(3);
        assert_eq!(policy_status(&policy, today(), 30), PolicyStatus::Expired);
    }
}
