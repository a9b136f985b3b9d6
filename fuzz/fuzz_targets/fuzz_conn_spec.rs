#![no_main]

use couchbase_bootstrap::connection::resolve_endpoints;
use couchbase_bootstrap::ConnSpec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(spec) = ConnSpec::parse(input) {
        assert!(!spec.hosts.is_empty());

        let resolved = resolve_endpoints(&spec);
        assert_eq!(resolved.kv_endpoints.len(), spec.hosts.len());
        assert_eq!(resolved.mgmt_endpoints.len(), spec.hosts.len());
        assert_eq!(resolved.encrypted, spec.scheme.is_encrypted());
    }
});
