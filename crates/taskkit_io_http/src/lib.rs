//! `taskkit_io_http` v1:
//! Blocking HTTP lookups used by the taskkit tools.

mod conf;
mod payee;
mod spec;

pub use conf::{C_KEY_PAYEE_DETAILS, C_URL_PAYEE_DEFAULT, DUR_TIMEOUT_DEFAULT};
pub use payee::{derive_payee_details_from_response, derive_payee_form, fetch_payee_details};
pub use spec::{PayeeRequestError, SpecPayeeRequestOptions};
