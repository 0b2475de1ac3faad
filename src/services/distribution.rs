use crate::types::models::HolderBalance;

#[derive(Debug, Clone, PartialEq)]
pub struct HolderShare {
    pub address: String,
    pub balance: u64,
    /// Fraction of the eligible balance, in percent.
    pub share_percentage: f64,
    pub amount: f64,
}

/// Splits `payout` across `holders` in proportion to their current balances.
///
/// Returns an empty plan when the eligible balance is zero. Order follows
/// `holders`.
pub fn calculate_distribution(holders: &[HolderBalance], payout: f64) -> Vec<HolderShare> {
    let total_eligible_balance: u64 = holders.iter().map(|h| h.balance).sum();
    if total_eligible_balance == 0 {
        return Vec::new();
    }

    let total = total_eligible_balance as f64;
    holders
        .iter()
        .map(|holder| {
            let share = holder.balance as f64 / total;
            HolderShare {
                address: holder.address.clone(),
                balance: holder.balance,
                share_percentage: share * 100.0,
                amount: payout * share,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(address: &str, balance: u64) -> HolderBalance {
        HolderBalance {
            address: address.to_string(),
            balance,
        }
    }

    #[test]
    fn test_proportional_split() {
        let shares = calculate_distribution(&[holder("A", 100), holder("B", 300)], 40.0);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].address, "A");
        assert!((shares[0].amount - 10.0).abs() < f64::EPSILON);
        assert!((shares[1].amount - 30.0).abs() < f64::EPSILON);
        assert!((shares[0].share_percentage - 25.0).abs() < 1e-9);
        assert!((shares[1].share_percentage - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_amounts_sum_to_payout() {
        let holders: Vec<HolderBalance> = (1..=37).map(|i| holder(&format!("H{}", i), i * 7_919)).collect();
        let payout = 12.345_678_9;
        let total: f64 = calculate_distribution(&holders, payout).iter().map(|s| s.amount).sum();
        assert!((total - payout).abs() < 1e-9);
    }

    #[test]
    fn test_no_eligible_balance() {
        assert!(calculate_distribution(&[], 40.0).is_empty());
        assert!(calculate_distribution(&[holder("A", 0)], 40.0).is_empty());
    }
}
