/// Assumed km per litre for every vehicle.
///
/// TODO: replace with per-vehicle efficiency once the vehicle master exposes it.
pub const AVERAGE_FUEL_EFFICIENCY: f64 = 10.0;

/// Estimated litres used to cover `distance` km.
pub fn estimate_fuel(distance: f64) -> f64 {
    distance / AVERAGE_FUEL_EFFICIENCY
}

/// km per litre. Returns 0.0 when no fuel was used.
pub fn fuel_efficiency(distance: f64, fuel: f64) -> f64 {
    if fuel == 0.0 {
        return 0.0;
    }
    distance / fuel
}
