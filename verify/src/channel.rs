//! # Channel Encoder
//!
//! Renders a [`ScopedRequest`] for each of the three delivery channels:
//!
//! * browser extension: the request itself, carried by the `request-ready`
//!   signal;
//! * mobile wallet: a deep link with the request base64-encoded in the URL
//!   fragment;
//! * QR code: the request as canonical JSON.
//!
//! All representations are derived from the same request instance. Decoding
//! the deep link payload or parsing the QR payload yields a value equal to
//! the extension payload.

use std::io::Cursor;
use std::sync::Arc;

use base64ct::{Base64, Base64Unpadded, Base64Url, Base64UrlUnpadded, Encoding};
use qrcode::render::unicode::Dense1x2;
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::Error;
use crate::types::ScopedRequest;

/// Wallet used for deep links unless configured otherwise.
pub const DEFAULT_WALLET_URL: &str = "https://wallet.privado.id";

const AUTH_FRAGMENT: &str = "#auth?";

/// Payload for the browser extension channel. The extension receives the
/// request itself.
#[must_use]
pub const fn extension_payload(request: &ScopedRequest) -> &ScopedRequest {
    request
}

/// Serialize a request as canonical JSON: object keys sorted, no
/// insignificant whitespace.
///
/// # Errors
///
/// Returns `Error::Encoding` if the request cannot be serialized.
pub fn canonical_json(request: &ScopedRequest) -> Result<String> {
    // `Value` objects are key-ordered maps, so a round trip through `Value`
    // fixes the key order regardless of struct field order.
    let value = serde_json::to_value(request)
        .map_err(|e| Error::Encoding(format!("issue serializing request: {e}")))?;
    serde_json::to_string(&value)
        .map_err(|e| Error::Encoding(format!("issue serializing request: {e}")))
}

/// Deep link that opens the wallet at `wallet_url` with the request.
///
/// The link has the form `<wallet_url>/#auth?type=base64&payload=<encoded>`
/// where `<encoded>` is the standard (padded) base64 encoding of the
/// request's canonical JSON.
///
/// # Errors
///
/// Returns `Error::Encoding` if the request cannot be serialized.
pub fn wallet_link(request: &ScopedRequest, wallet_url: &str) -> Result<String> {
    let json = canonical_json(request)?;
    let encoded = Base64::encode_string(json.as_bytes());
    Ok(format!("{}/{AUTH_FRAGMENT}type=base64&payload={encoded}", wallet_url.trim_end_matches('/')))
}

/// Recover the request from a deep link created by [`wallet_link`].
///
/// Accepts the standard and URL-safe base64 alphabets, padded or not, and a
/// percent-encoded payload.
///
/// # Errors
///
/// Returns `Error::Encoding` if the link has no `auth` fragment, the payload
/// type is not `base64`, or the payload does not decode to a request.
pub fn decode_wallet_link(link: &str) -> Result<ScopedRequest> {
    let Some((_, query)) = link.split_once(AUTH_FRAGMENT) else {
        return Err(Error::Encoding("link has no `#auth` fragment".to_string()));
    };

    let mut payload_type = None;
    let mut payload = None;
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("type", v)) => payload_type = Some(v),
            Some(("payload", v)) => payload = Some(v),
            _ => {}
        }
    }
    if payload_type != Some("base64") {
        return Err(Error::Encoding("link payload type is not `base64`".to_string()));
    }
    let Some(payload) = payload else {
        return Err(Error::Encoding("link has no payload".to_string()));
    };

    let payload = payload.replace("%2B", "+").replace("%2F", "/").replace("%3D", "=");
    let bytes = Base64::decode_vec(&payload)
        .or_else(|_| Base64Url::decode_vec(&payload))
        .or_else(|_| Base64UrlUnpadded::decode_vec(&payload))
        .or_else(|_| Base64Unpadded::decode_vec(&payload))
        .map_err(|e| Error::Encoding(format!("issue decoding link payload: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| Error::Encoding(format!("issue deserializing link payload: {e}")))
}

/// Payload to render as a QR code: the request's canonical JSON.
///
/// # Errors
///
/// Returns `Error::Encoding` if the request cannot be serialized.
pub fn qr_payload(request: &ScopedRequest) -> Result<String> {
    canonical_json(request)
}

/// The three channel representations of one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelPayload {
    /// The request carried by the extension signal.
    pub request: Arc<ScopedRequest>,

    /// Mobile wallet deep link.
    pub wallet_link: String,

    /// QR code payload.
    pub qr_payload: String,
}

impl ChannelPayload {
    /// Derive every channel representation from `request`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encoding` if the request cannot be serialized.
    pub fn new(request: Arc<ScopedRequest>, wallet_url: &str) -> Result<Self> {
        let wallet_link = wallet_link(&request, wallet_url)?;
        let qr_payload = qr_payload(&request)?;
        Ok(Self {
            request,
            wallet_link,
            qr_payload,
        })
    }

    /// The extension channel payload.
    #[must_use]
    pub fn extension(&self) -> &ScopedRequest {
        extension_payload(&self.request)
    }
}

/// QR error correction level.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum QrLevel {
    /// Recovers 7% of data.
    L,

    /// Recovers 15% of data.
    M,

    /// Recovers 25% of data.
    #[default]
    Q,

    /// Recovers 30% of data.
    H,
}

impl From<QrLevel> for EcLevel {
    fn from(level: QrLevel) -> Self {
        match level {
            QrLevel::L => Self::L,
            QrLevel::M => Self::M,
            QrLevel::Q => Self::Q,
            QrLevel::H => Self::H,
        }
    }
}

/// QR code rendering options.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct QrOptions {
    /// Error correction level.
    pub level: QrLevel,

    /// Render the quiet zone around the code.
    pub margin: bool,

    /// Minimum width and height of a rendered image, in pixels.
    pub size: u32,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            level: QrLevel::Q,
            margin: true,
            size: 256,
        }
    }
}

impl QrOptions {
    fn code(&self, payload: &str) -> Result<QrCode> {
        QrCode::with_error_correction_level(payload, self.level.into())
            .map_err(|e| Error::Encoding(format!("issue creating QR code: {e}")))
    }
}

/// Render `payload` as a PNG QR code, returned as a `data:` URL.
///
/// # Errors
///
/// Returns `Error::Encoding` if the payload does not fit in a QR code or the
/// image cannot be written.
pub fn to_qrcode(payload: &str, options: &QrOptions) -> Result<String> {
    let qr_code = options.code(payload)?;

    // write image to buffer
    let img_buf = qr_code
        .render::<image::Luma<u8>>()
        .quiet_zone(options.margin)
        .min_dimensions(options.size, options.size)
        .build();
    let mut buffer: Vec<u8> = Vec::new();
    let mut writer = Cursor::new(&mut buffer);
    img_buf
        .write_to(&mut writer, image::ImageFormat::Png)
        .map_err(|e| Error::Encoding(format!("issue writing QR code: {e}")))?;

    // base64 encode image
    Ok(format!("data:image/png;base64,{}", Base64::encode_string(buffer.as_slice())))
}

/// Render `payload` as a QR code made of Unicode half blocks, for display in
/// a terminal.
///
/// # Errors
///
/// Returns `Error::Encoding` if the payload does not fit in a QR code.
pub fn to_terminal(payload: &str, options: &QrOptions) -> Result<String> {
    let qr_code = options.code(payload)?;
    Ok(qr_code
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .quiet_zone(options.margin)
        .build())
}
