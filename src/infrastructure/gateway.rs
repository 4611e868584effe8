use crate::domain::order::Order;
use crate::domain::ports::PaymentGateway;
use crate::error::Result;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Payment gateway adapter with HMAC-SHA256 callback verification.
///
/// Order references are minted locally; the provider's own checkout flow is
/// out of scope, so the only part with real logic is the signature check:
/// `hex(HMAC-SHA256(secret, "<order_ref>|<payment_ref>"))`, compared in
/// constant time. A remote provider client slots in behind the same
/// [`PaymentGateway`] port.
#[derive(Clone)]
pub struct HmacGateway {
    secret: String,
}

impl HmacGateway {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, order_ref: &str, payment_ref: &str) -> Option<HmacSha256> {
        // HMAC accepts keys of any length; new_from_slice only fails for
        // pathological key types, never for byte slices.
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(order_ref.as_bytes());
        mac.update(b"|");
        mac.update(payment_ref.as_bytes());
        Some(mac)
    }

    /// Hex signature for `(order_ref, payment_ref)` as the provider would
    /// compute it. Exposed for tests and local checkout simulation.
    pub fn sign(&self, order_ref: &str, payment_ref: &str) -> String {
        match self.mac(order_ref, payment_ref) {
            Some(mac) => hex::encode(mac.finalize().into_bytes()),
            None => String::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for HmacGateway {
    async fn create_order(&self, amount: u64, currency: &str, receipt: &str) -> Result<Order> {
        Ok(Order {
            order_ref: format!("order_{}", Uuid::new_v4().simple()),
            amount,
            currency: currency.to_string(),
            receipt: receipt.to_string(),
        })
    }

    fn verify_signature(&self, order_ref: &str, payment_ref: &str, signature: &str) -> bool {
        let Ok(provided) = hex::decode(signature) else {
            return false;
        };
        match self.mac(order_ref, payment_ref) {
            // verify_slice is constant-time
            Some(mac) => mac.verify_slice(&provided).is_ok(),
            None => false,
        }
    }
}
