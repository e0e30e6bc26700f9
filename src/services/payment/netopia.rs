use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;

use super::interface::{PaymentError, PaymentOperations, PaymentRedirect, StartPaymentRequest};
use crate::models::payment_intent::payment_status;

const SANDBOX_BASE_URL: &str = "https://secure.sandbox.netopia-payments.com";

/// Card-payment client in the shape of Netopia's hosted-payment API: we open
/// an order and redirect; the provider reports the outcome through signed
/// IPN callbacks.
pub struct NetopiaClient {
    api_key: String,
    signature_key: String,
    base_url: String,
    return_url: String,
    notify_url: String,
    client: reqwest::Client,
}

impl NetopiaClient {
    pub fn new(
        api_key: String,
        signature_key: String,
        base_url: String,
        return_url: String,
        notify_url: String,
    ) -> Self {
        Self {
            api_key,
            signature_key,
            base_url,
            return_url,
            notify_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var("NETOPIA_API_KEY").expect("NETOPIA_API_KEY must be set"),
            std::env::var("NETOPIA_SIGNATURE_KEY").expect("NETOPIA_SIGNATURE_KEY must be set"),
            std::env::var("NETOPIA_BASE_URL").unwrap_or_else(|_| SANDBOX_BASE_URL.to_string()),
            std::env::var("PAYMENT_RETURN_URL").expect("PAYMENT_RETURN_URL must be set"),
            std::env::var("PAYMENT_NOTIFY_URL").expect("PAYMENT_NOTIFY_URL must be set"),
        )
    }

    /// Total mapping from the provider's numeric payment state to the intent
    /// vocabulary. Codes we have never seen land on `error` rather than
    /// failing the callback.
    pub fn payment_status_for(provider_code: u32) -> &'static str {
        match provider_code {
            1 => payment_status::PENDING,
            2 | 3 | 8 => payment_status::PROCESSING,
            5 | 11 => payment_status::CONFIRMED,
            10 => payment_status::CANCELLED,
            12 => payment_status::DECLINED,
            13 => payment_status::EXPIRED,
            _ => payment_status::ERROR,
        }
    }

    fn expected_signature(&self, payload: &[u8]) -> Option<String> {
        let mut mac = Hmac::<Sha1>::new_from_slice(self.signature_key.as_bytes()).ok()?;
        mac.update(payload);
        Some(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl PaymentOperations for NetopiaClient {
    async fn start_payment(
        &self,
        request: StartPaymentRequest,
    ) -> Result<PaymentRedirect, PaymentError> {
        let url = format!("{}/payment/card/start", self.base_url);

        let body = serde_json::json!({
            "order": {
                "orderRef": request.order_ref,
                "amount": request.amount,
                "currency": "RON",
                "description": request.description,
                "billing": { "email": request.customer_email },
            },
            "config": {
                "redirectUrl": self.return_url,
                "notifyUrl": self.notify_url,
            },
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PaymentError::Provider(format!(
                "provider returned {}",
                response.status()
            )));
        }

        let parsed: StartPaymentResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::BadResponse(e.to_string()))?;

        match parsed.payment.and_then(|payment| payment.payment_url) {
            Some(redirect_url) => Ok(PaymentRedirect { redirect_url }),
            None => Err(PaymentError::BadResponse(
                "no payment URL in provider response".to_string(),
            )),
        }
    }

    fn verify_ipn_signature(&self, payload: &[u8], signature: &str) -> bool {
        match self.expected_signature(payload) {
            Some(expected) => expected == signature.trim(),
            None => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StartPaymentResponse {
    payment: Option<PaymentUrl>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentUrl {
    payment_url: Option<String>,
}

/// Decoded body of an IPN callback. The provider posts a base64 envelope
/// around a small JSON document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpnPayload {
    pub order_ref: String,
    pub status: u32,
    #[serde(default)]
    pub message: Option<String>,
}

impl IpnPayload {
    pub fn from_envelope(body: &[u8]) -> Result<IpnPayload, PaymentError> {
        let text = std::str::from_utf8(body)
            .map_err(|e| PaymentError::InvalidPayload(e.to_string()))?;

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(text.trim())
            .map_err(|e| PaymentError::InvalidPayload(e.to_string()))?;

        serde_json::from_slice(&decoded).map_err(|e| PaymentError::InvalidPayload(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> NetopiaClient {
        NetopiaClient::new(
            "api-key".to_string(),
            "signature-secret".to_string(),
            SANDBOX_BASE_URL.to_string(),
            "https://adventuretime.ro/payment/result".to_string(),
            "https://adventuretime.ro/api/payments/ipn".to_string(),
        )
    }

    #[test]
    fn test_provider_code_mapping() {
        assert_eq!(NetopiaClient::payment_status_for(1), "pending");
        assert_eq!(NetopiaClient::payment_status_for(3), "processing");
        assert_eq!(NetopiaClient::payment_status_for(5), "confirmed");
        assert_eq!(NetopiaClient::payment_status_for(10), "cancelled");
        assert_eq!(NetopiaClient::payment_status_for(12), "declined");
        assert_eq!(NetopiaClient::payment_status_for(13), "expired");
        // Unknown codes degrade to error, never panic
        assert_eq!(NetopiaClient::payment_status_for(99), "error");
    }

    #[test]
    fn test_signature_roundtrip() {
        let client = client();
        let payload = b"eyJvcmRlclJlZiI6InJlZi0xIiwic3RhdHVzIjo1fQ==";

        let signature = client.expected_signature(payload).unwrap();
        assert!(client.verify_ipn_signature(payload, &signature));
        assert!(client.verify_ipn_signature(payload, &format!(" {} ", signature)));
    }

    #[test]
    fn test_tampered_payload_fails_verification() {
        let client = client();
        let signature = client.expected_signature(b"original").unwrap();
        assert!(!client.verify_ipn_signature(b"tampered", &signature));
        assert!(!client.verify_ipn_signature(b"original", "bogus"));
    }

    #[test]
    fn test_ipn_envelope_roundtrip() {
        let json = serde_json::json!({ "orderRef": "ref-1", "status": 5 }).to_string();
        let envelope = base64::engine::general_purpose::STANDARD.encode(json);

        let payload = IpnPayload::from_envelope(envelope.as_bytes()).unwrap();
        assert_eq!(payload.order_ref, "ref-1");
        assert_eq!(payload.status, 5);
    }

    #[test]
    fn test_ipn_envelope_rejects_garbage() {
        assert!(IpnPayload::from_envelope(b"%%%not-base64%%%").is_err());

        let envelope = base64::engine::general_purpose::STANDARD.encode("{\"status\": 5}");
        assert!(IpnPayload::from_envelope(envelope.as_bytes()).is_err());
    }
}
