//! Gas metering: a balance plus a wall-clock deadline

use std::time::{Duration, Instant};

/// Execution budget of one interpreter
#[derive(Debug, Clone)]
pub struct Meter {
    balance: f64,
    deadline: Option<Instant>,
}

impl Meter {
    /// Starts a meter; `None` means unlimited for either dimension
    pub fn new(balance: Option<f64>, timeout: Option<Duration>) -> Self {
        Meter {
            balance: balance.unwrap_or(f64::INFINITY),
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// Adds a signed amount to the balance and reports whether the run may continue
    ///
    /// Debits are negative. The run may continue while the balance stays
    /// strictly positive and the deadline has not passed.
    pub fn transact(&mut self, amount: f64) -> bool {
        self.balance += amount;
        self.ok()
    }

    /// Whether budget remains, without changing it
    pub fn ok(&self) -> bool {
        self.balance > 0.0 && self.deadline.map_or(true, |d| Instant::now() < d)
    }

    /// Current balance
    pub fn balance(&self) -> f64 {
        self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_meter_never_runs_out() {
        let mut meter = Meter::new(None, None);
        for _ in 0..1000 {
            assert!(meter.transact(-1.0));
        }
        assert!(meter.balance().is_infinite());
    }

    #[test]
    fn test_balance_exhaustion() {
        let mut meter = Meter::new(Some(2.0), None);
        assert!(meter.transact(-1.0));
        assert!(!meter.transact(-1.0));
        assert!(meter.transact(5.0));
    }

    #[test]
    fn test_zero_balance_fails_first_debit() {
        assert!(!Meter::new(Some(0.0), None).transact(-1.0));
    }

    #[test]
    fn test_elapsed_deadline() {
        let mut meter = Meter::new(None, Some(Duration::ZERO));
        assert!(!meter.transact(0.0));
    }
}
