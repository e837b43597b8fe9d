//! Derived views over [`AppState`](super::AppState)

use super::AppState;
use crate::types::{Bid, BidStatus, ListingType, Vehicle, VehicleStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn verified_vehicles(state: &AppState) -> Vec<&Vehicle> {
    state
        .vehicles
        .items
        .iter()
        .filter(|v| v.status.is_verified())
        .collect()
}

fn verified_of_type(state: &AppState, listing_type: ListingType) -> Vec<&Vehicle> {
    verified_vehicles(state)
        .into_iter()
        .filter(|v| v.listing_type == Some(listing_type))
        .collect()
}

pub fn marketplace_vehicles(state: &AppState) -> Vec<&Vehicle> {
    verified_of_type(state, ListingType::Marketplace)
}

pub fn instant_sale_vehicles(state: &AppState) -> Vec<&Vehicle> {
    verified_of_type(state, ListingType::InstantSale)
}

pub fn vehicle_by_id(state: &AppState, id: u64) -> Option<&Vehicle> {
    state.vehicles.items.iter().find(|v| v.id == id)
}

pub fn rejected_vehicles(state: &AppState) -> Vec<&Vehicle> {
    state
        .vehicles
        .user_vehicles
        .iter()
        .filter(|v| v.status == VehicleStatus::Rejected)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserVehicleStats {
    pub total: usize,
    pub pending: usize,
    pub verified: usize,
    pub rejected: usize,
}

pub fn user_vehicle_stats(state: &AppState) -> UserVehicleStats {
    let vehicles = &state.vehicles.user_vehicles;
    let count = |f: fn(&Vehicle) -> bool| vehicles.iter().filter(|v| f(v)).count();
    UserVehicleStats {
        total: vehicles.len(),
        pending: count(|v| v.status == VehicleStatus::Pending),
        verified: count(|v| v.status.is_verified()),
        rejected: count(|v| v.status == VehicleStatus::Rejected),
    }
}

// ===== Bids =====

pub fn bids_for_vehicle(state: &AppState, vehicle_id: u64) -> Vec<&Bid> {
    state
        .bids
        .all_bids
        .iter()
        .filter(|bid| bid.vehicle == vehicle_id)
        .collect()
}

/// Zero when the vehicle has no bids
pub fn highest_bid(state: &AppState, vehicle_id: u64) -> Decimal {
    bids_for_vehicle(state, vehicle_id)
        .into_iter()
        .map(|bid| bid.amount)
        .max()
        .unwrap_or(Decimal::ZERO)
}

pub fn active_bids(state: &AppState) -> Vec<&Bid> {
    state
        .bids
        .items
        .iter()
        .filter(|bid| bid.status == BidStatus::Pending)
        .collect()
}

pub fn vehicles_with_bids(state: &AppState) -> Vec<&Vehicle> {
    state
        .vehicles
        .items
        .iter()
        .filter(|v| state.bids.all_bids.iter().any(|bid| bid.vehicle == v.id))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleBidInfo<'a> {
    pub vehicle: &'a Vehicle,
    pub bid_count: usize,
    pub highest_bid: Decimal,
    pub has_bids: bool,
}

pub fn vehicle_with_bid_info(state: &AppState, vehicle_id: u64) -> Option<VehicleBidInfo<'_>> {
    let vehicle = vehicle_by_id(state, vehicle_id)?;
    let bid_count = bids_for_vehicle(state, vehicle_id).len();
    Some(VehicleBidInfo {
        vehicle,
        bid_count,
        highest_bid: highest_bid(state, vehicle_id),
        has_bids: bid_count > 0,
    })
}

// ===== Admin =====

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdminDashboardStats {
    pub pending_count: usize,
    /// Physically verified only
    pub verified_count: usize,
    pub total_listings: usize,
    pub instant_sale_requests: usize,
}

pub fn admin_dashboard_stats(state: &AppState) -> AdminDashboardStats {
    let all = &state.vehicles.items;
    AdminDashboardStats {
        pending_count: state.vehicles.pending_vehicles.len(),
        verified_count: all
            .iter()
            .filter(|v| v.status == VehicleStatus::PhysicallyVerified)
            .count(),
        total_listings: all.len(),
        instant_sale_requests: all
            .iter()
            .filter(|v| v.listing_type == Some(ListingType::InstantSale))
            .count(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineStep {
    pub label: &'static str,
    pub date: Option<DateTime<Utc>>,
    pub completed: bool,
}

/// Steps with neither a date nor completion are left out
pub fn verification_timeline(vehicle: &Vehicle) -> Vec<TimelineStep> {
    let steps = [
        TimelineStep {
            label: "Submitted",
            date: vehicle.created_at,
            completed: true,
        },
        TimelineStep {
            label: "Digital Verification",
            date: vehicle.digital_verification_date,
            completed: vehicle.status.is_verified(),
        },
        TimelineStep {
            label: "Physical Verification",
            date: vehicle.physical_verification_date,
            completed: vehicle.status == VehicleStatus::PhysicallyVerified,
        },
    ];
    steps
        .into_iter()
        .filter(|step| step.date.is_some() || step.completed)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn vehicle(id: u64, status: &str, listing_type: &str) -> Vehicle {
        serde_json::from_value(json!({
            "id": id,
            "status": status,
            "listing_type": listing_type,
        }))
        .unwrap()
    }

    fn bid(id: u64, vehicle: u64, amount: &str, status: &str) -> Bid {
        serde_json::from_value(json!({
            "id": id,
            "vehicle": vehicle,
            "amount": amount,
            "status": status,
        }))
        .unwrap()
    }

    fn state() -> AppState {
        let mut state = AppState::default();
        state.vehicles.items = vec![
            vehicle(1, "digitally_verified", "marketplace"),
            vehicle(2, "physically_verified", "instant_sale"),
            vehicle(3, "pending", "marketplace"),
        ];
        state.vehicles.pending_vehicles = vec![vehicle(3, "pending", "marketplace")];
        state.bids.all_bids = vec![
            bid(10, 1, "1000.00", "pending"),
            bid(11, 1, "1500.50", "rejected"),
        ];
        state.bids.items = state.bids.all_bids.clone();
        state
    }

    #[test]
    fn test_listing_filters_only_show_verified() {
        let state = state();
        let ids = |vs: Vec<&Vehicle>| vs.iter().map(|v| v.id).collect::<Vec<_>>();
        assert_eq!(ids(marketplace_vehicles(&state)), vec![1]);
        assert_eq!(ids(instant_sale_vehicles(&state)), vec![2]);
        assert_eq!(ids(vehicles_with_bids(&state)), vec![1]);
    }

    #[test]
    fn test_bid_info() {
        let state = state();
        let info = vehicle_with_bid_info(&state, 1).unwrap();
        assert_eq!(info.bid_count, 2);
        assert_eq!(info.highest_bid, dec!(1500.50));
        assert!(info.has_bids);

        assert_eq!(highest_bid(&state, 2), Decimal::ZERO);
        assert_eq!(active_bids(&state).len(), 1);
        assert!(vehicle_with_bid_info(&state, 99).is_none());
    }

    #[test]
    fn test_admin_stats_count_physical_verification_only() {
        assert_eq!(
            admin_dashboard_stats(&state()),
            AdminDashboardStats {
                pending_count: 1,
                verified_count: 1,
                total_listings: 3,
                instant_sale_requests: 1,
            }
        );
    }

    #[test]
    fn test_user_vehicle_stats() {
        let mut state = AppState::default();
        state.vehicles.user_vehicles = vec![
            vehicle(1, "pending", "marketplace"),
            vehicle(2, "rejected", "marketplace"),
            vehicle(3, "digitally_verified", "marketplace"),
        ];
        let stats = user_vehicle_stats(&state);
        assert_eq!((stats.total, stats.pending, stats.verified, stats.rejected), (3, 1, 1, 1));
        assert_eq!(rejected_vehicles(&state)[0].id, 2);
    }

    #[test]
    fn test_timeline_skips_future_steps() {
        let mut v = vehicle(1, "digitally_verified", "marketplace");
        v.created_at = Some(Utc::now());
        v.digital_verification_date = Some(Utc::now());

        let labels: Vec<&str> = verification_timeline(&v).iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["Submitted", "Digital Verification"]);
    }
}
