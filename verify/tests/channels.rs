//! Tests for channel encoding

use std::sync::Arc;

use base64ct::{Base64, Base64UrlUnpadded, Encoding};
use credibil_verify::channel::{self, DEFAULT_WALLET_URL};
use credibil_verify::{AuthEnvelope, ChannelPayload, ProofCatalog, ScopedRequest, compose};
use serde_json::Value;
use test_utils::data::{EMPTY_BODY, SIGN_IN};

fn requests() -> Vec<ScopedRequest> {
    let envelope: AuthEnvelope = SIGN_IN.parse().expect("should parse");
    ProofCatalog::builtin()
        .descriptors()
        .iter()
        .map(|d| compose(&envelope, d).expect("should compose"))
        .collect()
}

// Decoding the deep link payload reproduces the request.
#[test]
fn wallet_link_round_trip() {
    for request in requests() {
        let link = channel::wallet_link(&request, DEFAULT_WALLET_URL).expect("should encode");

        // decode by hand, as a wallet would
        let (_, payload) = link.split_once("payload=").expect("has payload");
        let json = Base64::decode_vec(payload).expect("should be base64");
        let decoded: Value = serde_json::from_slice(&json).expect("should be JSON");
        assert_eq!(decoded, serde_json::to_value(&request).expect("should serialize"));

        assert_eq!(channel::decode_wallet_link(&link).expect("should decode"), request);
    }
}

// The QR payload parses to the extension payload.
#[test]
fn qr_matches_extension() {
    for request in requests() {
        let qr = channel::qr_payload(&request).expect("should encode");
        let parsed: ScopedRequest = serde_json::from_str(&qr).expect("should parse");
        assert_eq!(&parsed, channel::extension_payload(&request));
    }
}

// All channels of one selection carry the same request.
#[test]
fn cross_channel_identity() {
    for request in requests() {
        let payload = ChannelPayload::new(Arc::new(request), "https://wallet.example/")
            .expect("should encode");

        let qr: Value = serde_json::from_str(&payload.qr_payload).expect("should parse");
        let link = channel::decode_wallet_link(&payload.wallet_link).expect("should decode");
        let extension = serde_json::to_value(payload.extension()).expect("should serialize");

        assert_eq!(qr, extension);
        assert_eq!(serde_json::to_value(&link).expect("should serialize"), extension);
        assert!(payload.wallet_link.starts_with("https://wallet.example/#auth?type=base64&payload="));
    }
}

// Serialization is deterministic.
#[test]
fn canonical_output() {
    let request = requests().remove(1);
    let first = channel::canonical_json(&request).expect("should encode");
    let second = channel::canonical_json(&request.clone()).expect("should encode");
    assert_eq!(first, second);
    assert_eq!(first, channel::qr_payload(&request).expect("should encode"));
}

// Wallets that re-encode the payload as unpadded URL-safe base64 are still
// understood.
#[test]
fn url_safe_unpadded_payload() {
    let envelope: AuthEnvelope = EMPTY_BODY.parse().expect("should parse");
    let catalog = ProofCatalog::builtin();
    let request = compose(&envelope, catalog.find("age-over-18").expect("should exist"))
        .expect("should compose");

    let json = channel::canonical_json(&request).expect("should encode");
    let link = format!(
        "{DEFAULT_WALLET_URL}/#auth?type=base64&payload={}",
        Base64UrlUnpadded::encode_string(json.as_bytes())
    );
    assert_eq!(channel::decode_wallet_link(&link).expect("should decode"), request);
}
