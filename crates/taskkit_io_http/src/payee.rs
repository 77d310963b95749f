//! Payee details lookup against the tax service form endpoint.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::conf::{C_HEADER_ACCEPT, C_HEADER_CONTENT_TYPE, C_KEY_PAYEE_DETAILS, TUP_FORM_FIXED};
use crate::spec::{PayeeRequestError, SpecPayeeRequestOptions};

/// Form fields for one lookup, in wire order.
pub fn derive_payee_form(ifns: u64, oktmmf: u64) -> Vec<(&'static str, String)> {
    TUP_FORM_FIXED
        .iter()
        .map(|&(c_key, c_val)| (c_key, c_val.to_string()))
        .chain([("ifns", ifns.to_string()), ("oktmmf", oktmmf.to_string())])
        .collect()
}

fn derive_payee_headers() -> HeaderMap {
    let mut dict_headers = HeaderMap::new();
    dict_headers.insert(ACCEPT, HeaderValue::from_static(C_HEADER_ACCEPT));
    dict_headers.insert(CONTENT_TYPE, HeaderValue::from_static(C_HEADER_CONTENT_TYPE));
    dict_headers
}

/// Interpret a finished response: non-200 fails, 200 must carry `payeeDetails`.
pub fn derive_payee_details_from_response(
    status: StatusCode,
    body: &str,
) -> Result<Value, PayeeRequestError> {
    if status != StatusCode::OK {
        return Err(PayeeRequestError::RequestFailed(status.as_u16()));
    }

    let mut document: Value = serde_json::from_str(body).map_err(PayeeRequestError::Decode)?;
    document
        .get_mut(C_KEY_PAYEE_DETAILS)
        .map(Value::take)
        .ok_or_else(|| PayeeRequestError::MissingKey(C_KEY_PAYEE_DETAILS.to_string()))
}

fn classify_transport_error(
    err: reqwest::Error,
    options: &SpecPayeeRequestOptions,
) -> PayeeRequestError {
    if err.is_timeout() {
        PayeeRequestError::Timeout(options.timeout)
    } else {
        PayeeRequestError::Transport(err)
    }
}

/// Fetch payee details for a tax office code and municipality code.
///
/// One attempt, no retry. The timeout covers the whole exchange.
pub fn fetch_payee_details(
    ifns: u64,
    oktmmf: u64,
    options: &SpecPayeeRequestOptions,
) -> Result<Value, PayeeRequestError> {
    let client = Client::builder()
        .timeout(options.timeout)
        .build()
        .map_err(PayeeRequestError::Transport)?;

    let response = client
        .post(&options.url_endpoint)
        .form(&derive_payee_form(ifns, oktmmf))
        .headers(derive_payee_headers())
        .send()
        .map_err(|err| classify_transport_error(err, options))?;

    let status = response.status();
    tracing::info!(status = status.as_u16(), ifns, oktmmf, "payee lookup answered");

    let c_body = response
        .text()
        .map_err(|err| classify_transport_error(err, options))?;
    derive_payee_details_from_response(status, &c_body)
}
