//! EPSG:4326 ⇄ EPSG:3857 (spherical Web Mercator).
//! Same sphere as slippy-map tiles; x/y are in projected metres.

/// WGS84 semi-major axis used as the Web Mercator sphere radius.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude beyond which Web Mercator is undefined in practice.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Project (lon, lat) degrees to Web Mercator (x, y) metres.
/// Latitude is clamped to ±`MAX_MERCATOR_LAT`.
pub fn to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Inverse of [`to_mercator`]: Web Mercator (x, y) metres to (lon, lat) degrees.
/// Longitude is not wrapped, so a ring crossing the antimeridian stays continuous.
pub fn from_mercator(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}
