pub mod customer;
pub mod geo;
pub mod inviter;

pub use customer::{Customer, Invitee};
pub use geo::{great_circle_distance, Coordinate, EARTH_RADIUS_KM};
pub use inviter::{select_invitees, Inviter, InviterConfig};
