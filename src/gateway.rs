//! Gateway URI Resolver
//! ipfs://CID → public gateway URL conversion used by every list/detail view.

/// Public IPFS gateway the pinning service exposes.
pub const GATEWAY_BASE: &str = "https://gateway.pinata.cloud/ipfs/";

/// Scheme prefix for content-addressed references.
const IPFS_SCHEME: &str = "ipfs://";

/// Convert a content reference into a displayable HTTPS URL.
///
/// - `None` / empty input → `""`
/// - `ipfs://CID` → `https://gateway.pinata.cloud/ipfs/CID`
/// - anything else is already an HTTP(S) URL and passes through unchanged
pub fn to_gateway(uri: Option<&str>) -> String {
    let Some(uri) = uri else {
        return String::new();
    };
    if uri.is_empty() {
        return String::new();
    }
    if let Some(cid) = uri.strip_prefix(IPFS_SCHEME) {
        return format!("{}{}", GATEWAY_BASE, cid);
    }
    uri.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_and_empty_resolve_to_empty_string() {
        assert_eq!(to_gateway(None), "");
        assert_eq!(to_gateway(Some("")), "");
    }

    #[test]
    fn ipfs_scheme_is_spliced_into_gateway_url() {
        assert_eq!(
            to_gateway(Some("ipfs://QmTestCid123")),
            "https://gateway.pinata.cloud/ipfs/QmTestCid123"
        );
    }

    #[test]
    fn http_urls_pass_through_unchanged() {
        let url = "https://gateway.pinata.cloud/ipfs/QmAlready";
        assert_eq!(to_gateway(Some(url)), url);
        assert_eq!(to_gateway(Some("http://example.com/a.png")), "http://example.com/a.png");
    }

    #[test]
    fn resolver_is_idempotent_on_its_own_output() {
        let once = to_gateway(Some("ipfs://QmCid"));
        let twice = to_gateway(Some(&once));
        assert_eq!(once, twice);
    }
}
