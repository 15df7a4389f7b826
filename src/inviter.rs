use std::path::Path;

use anyhow::Result;
use log::{debug, info, warn};

use crate::customer::{read_customers, Customer, Invitee};
use crate::geo::{great_circle_distance, Coordinate, EARTH_RADIUS_KM};

pub const DUBLIN_OFFICE: Coordinate = Coordinate {
    latitude: 53.339428,
    longitude: -6.257664,
};

/// Where the office is and how far out invitations go.
#[derive(Clone, Debug)]
pub struct InviterConfig {
    pub office_name: String,
    pub office: Coordinate,
    pub earth_radius_km: f64,
    pub threshold_km: f64,
}

impl Default for InviterConfig {
    fn default() -> Self {
        InviterConfig {
            office_name: String::from("Intercom Dublin Office"),
            office: DUBLIN_OFFICE,
            earth_radius_km: EARTH_RADIUS_KM,
            threshold_km: 100.0,
        }
    }
}

fn is_valid_threshold(threshold_km: f64) -> bool {
    // Also rejects NaN
    if threshold_km >= 0.0 {
        true
    } else {
        warn!("{} is invalid. Distance must be >= 0.", threshold_km);
        false
    }
}

/// True iff both points are valid and no more than `threshold_km` apart.
pub fn is_within_km(a: Coordinate, b: Coordinate, radius_km: f64, threshold_km: f64) -> bool {
    is_valid_threshold(threshold_km)
        && great_circle_distance(a, b, radius_km).is_some_and(|d| d <= threshold_km)
}

/// Customers within `threshold_km` of `reference_point`, ordered by `user_id`.
///
/// The sort is stable, so customers sharing an id keep their input order.
/// Customers whose distance is undefined are left out.
pub fn select_invitees(
    mut records: Vec<Customer>,
    reference_point: Coordinate,
    radius_km: f64,
    threshold_km: f64,
) -> Vec<Invitee> {
    if !is_valid_threshold(threshold_km) {
        return Vec::new();
    }
    records.sort_by_key(|c| c.user_id);
    records
        .iter()
        .filter(|c| {
            let distance = great_circle_distance(c.coordinate, reference_point, radius_km);
            debug!("user_id {} is {:?} km away", c.user_id, distance);
            distance.is_some_and(|d| d <= threshold_km)
        })
        .map(Invitee::from)
        .collect()
}

pub struct Inviter {
    config: InviterConfig,
}

impl Inviter {
    pub fn new(config: InviterConfig) -> Self {
        Inviter { config }
    }

    pub fn config(&self) -> &InviterConfig {
        &self.config
    }

    pub fn invitees(&self, customers: Vec<Customer>) -> Vec<Invitee> {
        select_invitees(
            customers,
            self.config.office,
            self.config.earth_radius_km,
            self.config.threshold_km,
        )
    }

    /// Load customers from `path` and pick the ones to invite.
    /// Fails only when the file cannot be opened or read.
    pub fn customers_to_invite<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Invitee>> {
        let customers = read_customers(path)?;
        let total = customers.len();
        let invitees = self.invitees(customers);
        info!(
            "{} of {} customers are within {}km of the {}",
            invitees.len(),
            total,
            self.config.threshold_km,
            self.config.office_name
        );
        Ok(invitees)
    }
}

impl Default for Inviter {
    fn default() -> Self {
        Inviter::new(InviterConfig::default())
    }
}
