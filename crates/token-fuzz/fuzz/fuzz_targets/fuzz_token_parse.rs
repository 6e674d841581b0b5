#![no_main]

use libfuzzer_sys::fuzz_target;
use sso_credential::cache::derive_cache_key;
use sso_credential::scopes::Scopes;
use sso_credential::token::{SsoToken, parse_token};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    // Decoding must never panic, whatever the segments hold.
    let _ = parse_token(raw);

    if let Ok(sso) = SsoToken::parse(raw) {
        let key = derive_cache_key(sso.user_id(), "client", sso.tenant_id(), &Scopes::parse("s"));
        assert!(serde_json::from_str::<Vec<String>>(&key).is_ok());
    }
});
