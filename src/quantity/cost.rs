use std::fmt::{Debug, Display, Formatter};

quantity!(
    /// Amount of money in dollars.
    Cost, via: f64
);

impl Cost {
    /// Round the cost to whole cents, exact halves to the even cent.
    #[must_use]
    pub fn round_to_cents(self) -> Self {
        Self((self.0 * 100.0).round_ties_even() / 100.0)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Debug for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}$", self.0)
    }
}
