//! Transactional email templates.
//!
//! Plain-text bodies; rendering for the marketing site lives elsewhere.

use rust_decimal::Decimal;

/// Email sent after each successful course enrollment.
pub fn course_enrollment(course_name: &str, first_name: &str) -> (String, String) {
    let subject = format!("Enrolled in {course_name}");
    let body = format!(
        "Hi {first_name},\n\n\
         You have been enrolled in \"{course_name}\". \
         Head to your dashboard to start learning.\n"
    );
    (subject, body)
}

/// Receipt email sent once per successful payment.
pub fn payment_success(
    first_name: &str,
    amount: Decimal,
    order_ref: &str,
    payment_ref: &str,
) -> (String, String) {
    let subject = "Payment Successful!".to_string();
    let body = format!(
        "Hi {first_name},\n\n\
         Your payment of {amount} was received.\n\
         Order reference: {order_ref}\n\
         Payment reference: {payment_ref}\n"
    );
    (subject, body)
}
