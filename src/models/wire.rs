//! Peer wire envelopes
//!
//! Protobuf messages exchanged between peers. Field tags are part of the
//! protocol and must not change.

use prost::Message;

/// Request for one key of one group.
#[derive(Clone, PartialEq, Message)]
pub struct FetchRequest {
    #[prost(string, tag = "1")]
    pub group: String,
    #[prost(string, tag = "2")]
    pub key: String,
}

impl FetchRequest {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }
}

/// Value returned by the owning peer.
#[derive(Clone, PartialEq, Message)]
pub struct FetchResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub value: prost::bytes::Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_decodes_what_it_encodes() {
        let response = FetchResponse {
            value: prost::bytes::Bytes::from_static(b"630"),
        };
        let encoded = response.encode_to_vec();

        let decoded = FetchResponse::decode(encoded.as_slice()).unwrap();
        assert_eq!(decoded.value.as_ref(), b"630");
    }

    #[test]
    fn test_empty_value_encodes_to_nothing() {
        let response = FetchResponse::default();
        assert!(response.encode_to_vec().is_empty());
        assert!(FetchResponse::decode(&[][..]).unwrap().value.is_empty());
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        // field 1, length-delimited, claims 10 bytes but carries 2
        let garbage = [0x0a, 0x0a, 0x01, 0x02];
        assert!(FetchResponse::decode(&garbage[..]).is_err());
    }
}
