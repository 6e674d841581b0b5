//! Fuzzing harness for sso-credential.
//!
//! Targets exercise token claim decoding and untyped scope input, the two
//! places that read data the caller does not control.
//!
//! # Usage
//!
//! ```bash
//! cd crates/token-fuzz
//! cargo +nightly fuzz run fuzz_token_parse -- -max_total_time=60
//! ```

pub use sso_credential::scopes;
pub use sso_credential::token;
