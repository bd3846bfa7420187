//! Peer URL normalization.

const SCHEMES: [&str; 4] = ["grpcs://", "grpc://", "https://", "http://"];

/// Strips the transport scheme from a peer URL, leaving `host:port`.
///
/// Greylist entries are keyed by this form so that `grpcs://peer0:7051` and
/// `peer0:7051` refer to the same peer.
///
/// ```
/// use fabric_sdk::to_address;
///
/// assert_eq!(to_address("grpcs://peer0.org1.example.com:7051"), "peer0.org1.example.com:7051");
/// assert_eq!(to_address("peer0.org1.example.com:7051"), "peer0.org1.example.com:7051");
/// ```
#[must_use]
pub fn to_address(url: &str) -> &str {
    let url = url.trim();
    SCHEMES.iter().find_map(|scheme| url.strip_prefix(scheme)).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_grpc_schemes() {
        assert_eq!(to_address("grpc://peer0:7051"), "peer0:7051");
        assert_eq!(to_address("grpcs://peer0:7051"), "peer0:7051");
        assert_eq!(to_address("https://peer0:7051"), "peer0:7051");
    }

    #[test]
    fn test_bare_address_unchanged() {
        assert_eq!(to_address("peer0:7051"), "peer0:7051");
        assert_eq!(to_address("  peer0:7051 "), "peer0:7051");
    }

    #[test]
    fn test_empty_and_scheme_only() {
        assert_eq!(to_address(""), "");
        assert_eq!(to_address("grpcs://"), "");
    }

    #[test]
    fn test_only_leading_scheme_stripped() {
        assert_eq!(to_address("grpcs://grpc://peer0:7051"), "grpc://peer0:7051");
    }
}
