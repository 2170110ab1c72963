//! Linear amortization shared by every asset with a finite service life.

/// Minutes per hour, for converting print durations.
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// An asset whose purchase price is spread linearly over its service life.
///
/// Printers, auxiliary modules and consumables all implement this; the
/// default methods give the per-hour rate, the cost of a run and the share
/// of the service life already used.
pub trait Depreciating {
    fn purchase_price(&self) -> f64;
    fn lifetime_hours(&self) -> f64;
    fn current_hours(&self) -> f64;

    /// Price per operating hour, or 0 when the lifetime is not positive.
    fn depreciation_per_hour(&self) -> f64 {
        let lifetime = self.lifetime_hours();
        if lifetime > 0.0 {
            self.purchase_price() / lifetime
        } else {
            0.0
        }
    }

    /// Depreciation accrued over a run of `minutes`.
    fn depreciation_cost(&self, minutes: f64) -> f64 {
        self.depreciation_per_hour() * minutes / MINUTES_PER_HOUR
    }

    /// Percentage of the service life consumed, capped at 100.
    fn wear_percentage(&self) -> f64 {
        let lifetime = self.lifetime_hours();
        if lifetime > 0.0 {
            (self.current_hours() / lifetime * 100.0).min(100.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Tool {
        price: f64,
        lifetime: f64,
        used: f64,
    }

    impl Depreciating for Tool {
        fn purchase_price(&self) -> f64 {
            self.price
        }
        fn lifetime_hours(&self) -> f64 {
            self.lifetime
        }
        fn current_hours(&self) -> f64 {
            self.used
        }
    }

    #[test]
    fn per_hour_rate_is_price_over_lifetime() {
        let tool = Tool { price: 300.0, lifetime: 5000.0, used: 0.0 };
        assert_relative_eq!(tool.depreciation_per_hour(), 0.06, epsilon = 1e-12);
        assert_relative_eq!(tool.depreciation_cost(90.0), 0.09, epsilon = 1e-12);
    }

    #[test]
    fn zero_or_negative_lifetime_costs_nothing() {
        for lifetime in [0.0, -10.0] {
            let tool = Tool { price: 300.0, lifetime, used: 50.0 };
            assert_eq!(tool.depreciation_per_hour(), 0.0);
            assert_eq!(tool.depreciation_cost(120.0), 0.0);
            assert_eq!(tool.wear_percentage(), 0.0);
        }
    }

    #[test]
    fn wear_is_capped() {
        let tool = Tool { price: 1.0, lifetime: 100.0, used: 250.0 };
        assert_eq!(tool.wear_percentage(), 100.0);

        let tool = Tool { price: 1.0, lifetime: 100.0, used: 25.0 };
        assert_relative_eq!(tool.wear_percentage(), 25.0, epsilon = 1e-12);
    }
}
