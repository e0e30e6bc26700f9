use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment provider request failed: {0}")]
    Provider(String),
    #[error("payment provider returned an unusable response: {0}")]
    BadResponse(String),
    #[error("invalid IPN payload: {0}")]
    InvalidPayload(String),
}

/// What we hand the provider when opening a card payment.
#[derive(Debug, Clone)]
pub struct StartPaymentRequest {
    /// Our reference, echoed back in the IPN.
    pub order_ref: String,
    /// Amount actually charged online (the advance, or voucher total), RON.
    pub amount: f64,
    pub description: String,
    pub customer_email: String,
}

#[derive(Debug, Clone)]
pub struct PaymentRedirect {
    /// Hosted payment page the customer is sent to.
    pub redirect_url: String,
}

pub trait PaymentOperations {
    /// Register the order with the provider and obtain the redirect URL.
    async fn start_payment(
        &self,
        request: StartPaymentRequest,
    ) -> Result<PaymentRedirect, PaymentError>;

    /// Check a callback signature over the raw request body.
    fn verify_ipn_signature(&self, payload: &[u8], signature: &str) -> bool;
}
