//! Great-circle distances on a spherical Earth.

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in decimal degrees.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Round a distance to two decimals for presentation.
pub fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}
