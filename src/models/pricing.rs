use serde::{Deserialize, Serialize};

/// Vessel unit counts chosen for a booking. Field names follow the wire
/// vocabulary of the storefront forms.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VesselSelection {
    #[serde(default)]
    pub caiac_single: u32,
    #[serde(default)]
    pub caiac_dublu: u32,
    #[serde(rename = "placaSUP", default)]
    pub placa_sup: u32,
}

impl VesselSelection {
    pub fn is_empty(&self) -> bool {
        self.caiac_single == 0 && self.caiac_dublu == 0 && self.placa_sup == 0
    }
}

/// Full pricing breakdown for a submission, stored on intents and bookings
/// so later status changes never reprice history.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingSummary {
    pub base_price: f64,
    pub discount: f64,
    pub total_price: f64,
    pub advance_payment_amount: f64,
    pub remaining_amount: f64,
    pub total_people: u32,
}
