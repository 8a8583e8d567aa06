//! OAuth `state` codec
//!
//! The `state` parameter carries the caller's callback URL through the
//! provider round trip: it is the standard (padded) base64 encoding of the
//! URL's UTF-8 bytes. It is not signed and has no expiry.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use url::{form_urlencoded, Url};

/// Query parameter on the callback URL holding the final destination
pub const REDIRECT_PARAM: &str = "r";

/// Path used when the caller does not supply a callback
pub const DEBUG_CALLBACK_PATH: &str = "/api/oauth/debug/token";

/// Stand-in base used only to check relative references
const REFERENCE_BASE: &str = "http://callback.invalid/";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("state is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("state does not hold a valid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("state does not hold a callback")]
    Empty,
}

pub fn encode_state(callback: &str) -> String {
    STANDARD.encode(callback.as_bytes())
}

/// Callback URL carried in `state`
///
/// The callback may be absolute or a relative reference such as
/// `/dashboard`. It is returned exactly as it was encoded.
pub fn decode_state(state: &str) -> Result<String, StateError> {
    let bytes = STANDARD.decode(state)?;
    let text = String::from_utf8(bytes)?;
    if text.is_empty() {
        return Err(StateError::Empty);
    }
    check_reference(&text)?;
    Ok(text)
}

fn check_reference(text: &str) -> Result<(), url::ParseError> {
    match Url::parse(text) {
        Ok(_) => Ok(()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(REFERENCE_BASE)?.join(text).map(|_| ())
        }
        Err(e) => Err(e),
    }
}

/// Callback URL for a login attempt
///
/// An absent or empty `c` falls back to the debug token endpoint under
/// `base_url`. A non-empty `r` is appended as the `r` query parameter.
pub fn build_callback(base_url: &str, c: Option<&str>, r: Option<&str>) -> String {
    let mut callback = match c.filter(|c| !c.is_empty()) {
        Some(c) => c.to_string(),
        None => format!("{}{}", base_url.trim_end_matches('/'), DEBUG_CALLBACK_PATH),
    };

    if let Some(r) = r.filter(|r| !r.is_empty()) {
        let separator = if callback.contains('?') { '&' } else { '?' };
        let encoded: String = form_urlencoded::byte_serialize(r.as_bytes()).collect();
        callback.push(separator);
        callback.push_str(REDIRECT_PARAM);
        callback.push('=');
        callback.push_str(&encoded);
    }

    callback
}

/// Where to send the browser after the provider returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackTarget {
    /// Decoded callback with query and fragment removed
    pub callback: String,
    /// Fragment of the decoded callback, without the `#`
    pub fragment: Option<String>,
    /// The callback's `r` parameter, if present and non-empty
    pub redirect_to: Option<String>,
}

impl CallbackTarget {
    pub fn from_state(state: &str) -> Result<Self, StateError> {
        let decoded = decode_state(state)?;

        let (rest, fragment) = match decoded.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (decoded.as_str(), None),
        };
        let (callback, query) = match rest.split_once('?') {
            Some((callback, query)) => (callback, Some(query)),
            None => (rest, None),
        };

        let redirect_to = query
            .and_then(|query| {
                form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key == REDIRECT_PARAM)
                    .map(|(_, value)| value.into_owned())
            })
            .filter(|value| !value.is_empty());

        Ok(Self {
            callback: callback.to_string(),
            fragment,
            redirect_to,
        })
    }

    /// Callback with a provider-reported error attached
    ///
    /// The original fragment, if any, is kept after the query.
    pub fn error_redirect(&self, error: &str) -> String {
        let error: String = form_urlencoded::byte_serialize(error.as_bytes()).collect();
        match &self.fragment {
            Some(fragment) => format!("{}?error={}#{}", self.callback, error, fragment),
            None => format!("{}?error={}", self.callback, error),
        }
    }
}
