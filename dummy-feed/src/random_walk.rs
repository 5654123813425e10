//! Synthetic random-walk prices.
//!
//! Each tick moves every security's price by a uniform random percentage in
//! `[-volatility, +volatility)`. Seeded for reproducible runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trading::PriceUpdate;

const PRICE_FLOOR: f64 = 0.01;

/// A simple random walk data generator.
pub struct RandomWalk {
    securities: Vec<String>,
    prices: Vec<f64>,
    volatility: f64,
    rng: StdRng,
    clock: u64,
}

impl RandomWalk {
    /// Creates a walk where every security starts at `start_price`.
    ///
    /// # Arguments
    ///
    /// * `securities` - Securities to generate prices for.
    /// * `start_price` - Initial price for all of them.
    /// * `volatility` - Maximum relative move per tick (e.g. 0.01 for 1%).
    /// * `seed` - RNG seed; `None` seeds from entropy.
    pub fn new(
        securities: Vec<String>,
        start_price: f64,
        volatility: f64,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let prices = vec![start_price.max(PRICE_FLOOR); securities.len()];
        Self {
            securities,
            prices,
            volatility: volatility.abs(),
            rng,
            clock: 0,
        }
    }

    /// Advances every price one step and returns the new observations.
    pub fn next_tick(&mut self) -> Vec<PriceUpdate> {
        self.clock += 1;
        let mut updates = Vec::with_capacity(self.securities.len());
        for (i, security) in self.securities.iter().enumerate() {
            let change_pct = if self.volatility > 0.0 {
                self.rng.gen_range(-self.volatility..self.volatility)
            } else {
                0.0
            };
            self.prices[i] = (self.prices[i] * (1.0 + change_pct)).max(PRICE_FLOOR);
            updates.push(PriceUpdate::new(security.clone(), self.prices[i], self.clock));
        }
        updates
    }

    /// Current price of `security`, if it is part of this walk.
    pub fn price(&self, security: &str) -> Option<f64> {
        self.securities
            .iter()
            .position(|s| s == security)
            .map(|i| self.prices[i])
    }
}

impl Iterator for RandomWalk {
    type Item = Vec<PriceUpdate>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_tick())
    }
}
