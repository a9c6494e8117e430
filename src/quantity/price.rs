use crate::quantity::{cost::Cost, energy::KilowattHours};

quantity!(
    /// Dollars per kilowatt-hour.
    KilowattHourPrice, via: f64, suffix: "$/kWh", precision: 5
);

implement_mul!(KilowattHours, KilowattHourPrice, Cost);
