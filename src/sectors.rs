//! Compass sector classification.

/// Map a bearing in degrees onto one of `num_sectors` equal compass
/// sectors, with sector 0 centered on bearing 0 (north).
///
/// The bearing is normalized into `[0, 360)` with floored modulo, so
/// negative bearings wrap correctly (-10° ≡ 350°). The half-sector
/// offset shifts bucket boundaries so each sector is centered on its
/// nominal direction rather than starting there: with 4 sectors,
/// bearings in `[-45, 44]` land in sector 0.
///
/// Pure and total for any integer bearing. `num_sectors` must be at
/// least 1; sector configuration is validated at startup, not here.
pub fn sector(num_sectors: usize, bearing_degrees: i64) -> usize {
    let normalized = bearing_degrees.rem_euclid(360) as usize;
    let offset = 360 / num_sectors / 2;
    (normalized + offset) * num_sectors / 360 % num_sectors
}
