use crate::common::normalize_phone;
use crate::domains::auth::errors::AuthError;
use crate::domains::auth::types::OtpSent;
use crate::kernel::ServerDeps;

/// Issue a challenge for the phone number and try to deliver it by SMS.
///
/// Delivery failure is not an error; `dispatched` reports it.
pub async fn send_otp(phone_number: &str, deps: &ServerDeps) -> Result<OtpSent, AuthError> {
    let phone_number = normalize_phone(phone_number).ok_or(AuthError::MalformedPhone)?;

    let issued = deps.otp.issue(&phone_number).await?;

    Ok(OtpSent {
        phone_number,
        dispatched: issued.dispatched,
        debug_code: issued.debug_code,
    })
}
