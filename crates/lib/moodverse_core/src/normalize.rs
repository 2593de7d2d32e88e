//! Response normalisation: model text → JSON portrait.

use crate::error::{PortraitError, PortraitResult};
use crate::portrait::PortraitReading;
use crate::upstream::UpstreamResponse;

/// Remove Markdown code-fence markers (```` ```json ```` and ```` ``` ````) and trim.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Extract the first text segment and parse it as JSON.
///
/// The parsed value is passed through as-is; its shape is not checked.
pub fn normalize(response: &UpstreamResponse) -> PortraitResult<PortraitReading> {
    let raw = response.first_text().unwrap_or_default();
    let clean = strip_code_fences(raw);
    serde_json::from_str(&clean).map_err(|e| PortraitError::Parse(e.to_string()))
}
