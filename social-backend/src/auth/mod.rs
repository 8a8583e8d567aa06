//! Authentication
//!
//! Login is delegated to OAuth2 providers; see [`oauth`].

pub mod oauth;
