use std::time::Duration;

/// Configuration injected into the orchestrator at construction.
///
/// The gateway secret and currency were ambient globals in earlier drafts of
/// this service; they are now explicit values so that tests and deployments
/// can run side by side without shared state.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Shared secret used to verify payment callback signatures.
    pub gateway_secret: String,
    /// ISO currency code for orders, e.g. "INR".
    pub currency: String,
    /// Upper bound applied to each gateway call and store operation.
    pub op_timeout: Duration,
}

impl PaymentConfig {
    pub fn new(gateway_secret: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            gateway_secret: gateway_secret.into(),
            currency: currency.into(),
            op_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }
}
