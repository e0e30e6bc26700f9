use crate::models::pricing::{PricingSummary, VesselSelection};

/// Advance percentage used when an adventure predates the configurable field.
pub const DEFAULT_ADVANCE_PERCENTAGE: f64 = 30.0;

pub struct PricingService;

impl PricingService {
    /// Base price from per-vessel counts. A double kayak seats two people
    /// and is billed at twice the per-person rate; singles and SUP boards
    /// seat one at the plain rate. No rounding here.
    pub fn base_price(rate: f64, vessels: &VesselSelection) -> f64 {
        vessels.caiac_single as f64 * rate
            + vessels.caiac_dublu as f64 * rate * 2.0
            + vessels.placa_sup as f64 * rate
    }

    pub fn total_people(vessels: &VesselSelection) -> u32 {
        vessels.caiac_single + vessels.caiac_dublu * 2 + vessels.placa_sup
    }

    /// Split the total into the upfront-payable amount and the cash-on-day
    /// remainder. `remaining = round(total - advance)` rather than
    /// `round(total) - advance`, so the two parts recompose to the rounded
    /// total within one unit.
    pub fn advance_split(total_price: f64, advance_percentage: Option<f64>) -> (f64, f64) {
        let pct = advance_percentage
            .unwrap_or(DEFAULT_ADVANCE_PERCENTAGE)
            .clamp(0.0, 100.0);

        let advance = (total_price * pct / 100.0).round();
        let remaining = (total_price - advance).round();

        (advance, remaining)
    }

    /// Full breakdown for a submission. The discount is re-derived by the
    /// caller from the current base price on every vessel-count change; this
    /// only caps it so the total never goes negative.
    pub fn summarize(
        rate: f64,
        vessels: &VesselSelection,
        discount: f64,
        advance_percentage: Option<f64>,
    ) -> PricingSummary {
        // Junk rates in old records must not push the total negative.
        let base_price = Self::base_price(rate, vessels).max(0.0);
        let discount = discount.max(0.0).min(base_price);
        let total_price = base_price - discount;
        let (advance_payment_amount, remaining_amount) =
            Self::advance_split(total_price, advance_percentage);

        PricingSummary {
            base_price,
            discount,
            total_price,
            advance_payment_amount,
            remaining_amount,
            total_people: Self::total_people(vessels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vessels(caiac_single: u32, caiac_dublu: u32, placa_sup: u32) -> VesselSelection {
        VesselSelection {
            caiac_single,
            caiac_dublu,
            placa_sup,
        }
    }

    #[test]
    fn test_base_price_counts_doubles_twice() {
        // 2 singles + 1 double at 100 RON/person
        let selection = vessels(2, 1, 0);
        assert_eq!(PricingService::base_price(100.0, &selection), 400.0);
        assert_eq!(PricingService::total_people(&selection), 4);
    }

    #[test]
    fn test_base_price_sup_counts_once() {
        let selection = vessels(0, 0, 3);
        assert_eq!(PricingService::base_price(150.0, &selection), 450.0);
        assert_eq!(PricingService::total_people(&selection), 3);
    }

    #[test]
    fn test_empty_selection_prices_to_zero() {
        let selection = vessels(0, 0, 0);
        assert!(selection.is_empty());
        assert_eq!(PricingService::base_price(100.0, &selection), 0.0);
        assert_eq!(PricingService::total_people(&selection), 0);
    }

    #[test]
    fn test_advance_split_thirty_percent() {
        let (advance, remaining) = PricingService::advance_split(320.0, Some(30.0));
        assert_eq!(advance, 96.0);
        assert_eq!(remaining, 224.0);
    }

    #[test]
    fn test_advance_split_defaults_to_thirty() {
        let (advance, remaining) = PricingService::advance_split(320.0, None);
        assert_eq!(advance, 96.0);
        assert_eq!(remaining, 224.0);
    }

    #[test]
    fn test_advance_split_clamps_percentage() {
        let (advance, remaining) = PricingService::advance_split(100.0, Some(150.0));
        assert_eq!(advance, 100.0);
        assert_eq!(remaining, 0.0);

        let (advance, remaining) = PricingService::advance_split(100.0, Some(-10.0));
        assert_eq!(advance, 0.0);
        assert_eq!(remaining, 100.0);
    }

    #[test]
    fn test_advance_and_remaining_recompose_total() {
        for total in [0.0, 1.0, 99.0, 250.0, 333.0, 1234.0] {
            for pct in [0.0, 10.0, 25.0, 30.0, 33.0, 50.0, 100.0] {
                let (advance, remaining) = PricingService::advance_split(total, Some(pct));
                assert!(
                    (advance + remaining - total.round()).abs() <= 1.0,
                    "split of {} at {}% does not recompose",
                    total,
                    pct
                );
            }
        }
    }

    #[test]
    fn test_summary_caps_discount_at_base_price() {
        let summary = PricingService::summarize(100.0, &vessels(1, 0, 0), 250.0, Some(30.0));
        assert_eq!(summary.base_price, 100.0);
        assert_eq!(summary.discount, 100.0);
        assert_eq!(summary.total_price, 0.0);
        assert_eq!(summary.advance_payment_amount, 0.0);
        assert_eq!(summary.remaining_amount, 0.0);
    }

    #[test]
    fn test_summary_full_breakdown() {
        // 2 singles + 1 double at 100, 80 RON off, 30% advance
        let summary = PricingService::summarize(100.0, &vessels(2, 1, 0), 80.0, Some(30.0));
        assert_eq!(summary.base_price, 400.0);
        assert_eq!(summary.discount, 80.0);
        assert_eq!(summary.total_price, 320.0);
        assert_eq!(summary.advance_payment_amount, 96.0);
        assert_eq!(summary.remaining_amount, 224.0);
        assert_eq!(summary.total_people, 4);
    }
}
