//! Payee lookup constants: endpoint, headers, form fields and timeout.

use std::time::Duration;

/// Federal tax service payee lookup endpoint.
pub const C_URL_PAYEE_DEFAULT: &str = "https://service.nalog.ru/addrno-proc.json";
/// `Accept` header the service form sends.
pub const C_HEADER_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";
/// Form body content type, charset included.
pub const C_HEADER_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Response key carrying the payee details object.
pub const C_KEY_PAYEE_DETAILS: &str = "payeeDetails";

/// Fixed form fields sent with every lookup.
pub const TUP_FORM_FIXED: [(&str, &str); 3] = [("c", "next"), ("step", "1"), ("npKind", "fl")];

/// Whole-request timeout.
pub const DUR_TIMEOUT_DEFAULT: Duration = Duration::from_millis(100);
