//! Capacity table
//!
//! Daily provisioned ceilings per usage type, and the typical daily load the
//! synthesizer scales from. Load deliberately sits well under the ceiling.

use crate::types::UsageType;

pub const DNS_QUERY_CAPACITY: f64 = 500_000.0;
pub const CDN_REQUEST_CAPACITY: f64 = 2_000_000.0;
/// Abstract traffic volume units per day
pub const CDN_TRAFFIC_CAPACITY: f64 = 50_000.0;
pub const DEFAULT_CAPACITY: f64 = 1_000_000.0;

/// Daily capacity ceiling for a usage type
pub fn capacity_for(usage_type: &UsageType) -> f64 {
    match usage_type {
        UsageType::DnsQueryUsageSum => DNS_QUERY_CAPACITY,
        UsageType::CdnRequestSum => CDN_REQUEST_CAPACITY,
        UsageType::CdnTrafficSum => CDN_TRAFFIC_CAPACITY,
        UsageType::Other(_) => DEFAULT_CAPACITY,
    }
}

/// Typical daily load for a usage type
pub fn base_value(usage_type: &UsageType) -> f64 {
    match usage_type {
        UsageType::DnsQueryUsageSum => 100_000.0,
        UsageType::CdnRequestSum => 500_000.0,
        UsageType::CdnTrafficSum => 10_000.0,
        UsageType::Other(_) => 100_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_table() {
        assert_eq!(capacity_for(&UsageType::DnsQueryUsageSum), 500_000.0);
        assert_eq!(capacity_for(&UsageType::CdnRequestSum), 2_000_000.0);
        assert_eq!(capacity_for(&UsageType::CdnTrafficSum), 50_000.0);
        assert_eq!(capacity_for(&UsageType::Other("waf_hits".into())), 1_000_000.0);
    }

    #[test]
    fn test_base_load_under_capacity() {
        for usage_type in [
            UsageType::DnsQueryUsageSum,
            UsageType::CdnRequestSum,
            UsageType::CdnTrafficSum,
            UsageType::Other("x".into()),
        ] {
            assert!(base_value(&usage_type) < capacity_for(&usage_type));
        }
    }
}
