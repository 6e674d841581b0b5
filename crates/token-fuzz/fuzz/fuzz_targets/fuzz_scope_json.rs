#![no_main]

use libfuzzer_sys::fuzz_target;
use sso_credential::scopes::Scopes;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    if let Ok(scopes) = Scopes::from_json(&value) {
        let canonical = scopes.canonical();
        assert_eq!(Scopes::parse(&canonical).canonical(), canonical);
        assert_eq!(scopes.is_empty(), canonical.is_empty());
    }
});
