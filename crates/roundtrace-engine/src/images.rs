//! Inline image extraction and `[Image #N]` back-reference resolution.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use roundtrace_types::{ContentBlock, Message};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static IMAGE_REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Image #(\d+)\]").unwrap());

/// Displayable descriptor of an inline image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedImage {
    /// 1-based, in first-encounter order within the scanned messages
    pub number: usize,
    pub media_type: String,
    /// Base64 payload as found in the log
    pub data: String,
    /// Decoded size; None when the payload is not valid base64
    pub byte_len: Option<usize>,
    pub message_index: usize,
    pub block_index: usize,
}

impl ExtractedImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// `[Image #N]` occurrence inside a text; `start..end` is a byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub number: usize,
    pub start: usize,
    pub end: usize,
}

/// Number every Image block of `messages` in document order
pub fn extract_images<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<ExtractedImage> {
    let mut images = Vec::new();

    for (message_index, message) in messages.into_iter().enumerate() {
        for (block_index, block) in message.content.iter().enumerate() {
            match block {
                ContentBlock::Image { media_type, data } => {
                    let byte_len = STANDARD.decode(data.trim()).ok().map(|bytes| bytes.len());
                    if byte_len.is_none() {
                        tracing::debug!(message_index, block_index, "image payload is not valid base64");
                    }
                    images.push(ExtractedImage {
                        number: images.len() + 1,
                        media_type: media_type.clone(),
                        data: data.clone(),
                        byte_len,
                        message_index,
                        block_index,
                    });
                }
                ContentBlock::Text { .. }
                | ContentBlock::ToolUse { .. }
                | ContentBlock::ToolResult { .. } => {}
            }
        }
    }

    images
}

pub fn find_image_references(text: &str) -> Vec<ImageReference> {
    IMAGE_REF_REGEX
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            // Too large to index anything; kept so it resolves to "no match"
            let number = cap.get(1)?.as_str().parse::<usize>().unwrap_or(usize::MAX);
            Some(ImageReference {
                number,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Strictly positional, 1-indexed lookup; out of range is "no match"
pub fn resolve_image(images: &[ExtractedImage], number: usize) -> Option<&ExtractedImage> {
    number.checked_sub(1).and_then(|idx| images.get(idx))
}

pub fn resolve_image_references<'a>(
    text: &str,
    images: &'a [ExtractedImage],
) -> Vec<(ImageReference, Option<&'a ExtractedImage>)> {
    find_image_references(text)
        .into_iter()
        .map(|reference| (reference, resolve_image(images, reference.number)))
        .collect()
}
