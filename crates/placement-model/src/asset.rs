use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("stored signature is not a data URL")]
    NotDataUrl,
    #[error("stored signature is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("signature payload is empty")]
    Empty,
}

/// A previously captured signature image. The bytes are never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureAsset {
    media_type: String,
    bytes: Vec<u8>,
}

impl SignatureAsset {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AssetError> {
        if bytes.is_empty() {
            return Err(AssetError::Empty);
        }

        Ok(Self { media_type: media_type.into(), bytes })
    }

    /// Parses `data:<media-type>;base64,<payload>`.
    pub fn from_data_url(url: &str) -> Result<Self, AssetError> {
        let rest = url.trim().strip_prefix("data:").ok_or(AssetError::NotDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(AssetError::NotDataUrl)?;
        let media_type = header.strip_suffix(";base64").ok_or(AssetError::NotBase64)?;

        let bytes = STANDARD.decode(payload)?;
        let media_type =
            if media_type.is_empty() { "application/octet-stream" } else { media_type };

        Self::new(media_type, bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
