//! Flash cookie value codec: hex-encoded JSON.

use super::FlashMessage;

/// Encode messages into a cookie-safe value.
pub fn encode(messages: &[FlashMessage]) -> String {
    match serde_json::to_vec(messages) {
        Ok(json) => hex::encode(json),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode flash messages");
            String::new()
        }
    }
}

/// Decode a cookie value. Malformed input yields no messages.
pub fn decode(value: &str) -> Vec<FlashMessage> {
    let bytes = match hex::decode(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Discarding malformed flash cookie");
            return Vec::new();
        }
    };

    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Discarding undecodable flash cookie");
        Vec::new()
    })
}
