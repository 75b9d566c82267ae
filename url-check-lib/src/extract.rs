//! URL extraction from product documents.
//!
//! A document is a JSON array of model objects. Each model contributes its
//! image URLs (`images[].src`) and attachment URLs
//! (`attachments[].attachmentLocation`), labelled with `general.model`.

use crate::error::UrlCheckError;
use crate::types::{UrlCategory, UrlTask};
use crate::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelEntry {
    general: Option<General>,
    images: Vec<ImageEntry>,
    attachments: Vec<AttachmentEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct General {
    model: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageEntry {
    src: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AttachmentEntry {
    attachment_location: Option<String>,
}

/// Tasks extracted from one document, split by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedUrls {
    pub images: Vec<UrlTask>,
    pub attachments: Vec<UrlTask>,
}

impl ExtractedUrls {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.attachments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len() + self.attachments.len()
    }

    pub fn get(&self, category: UrlCategory) -> &[UrlTask] {
        match category {
            UrlCategory::Image => &self.images,
            UrlCategory::Attachment => &self.attachments,
        }
    }
}

/// Extract image and attachment tasks from a JSON document.
///
/// Blank or missing URLs are dropped here so they never reach the pool.
///
/// # Errors
///
/// Returns `UrlCheckError::InvalidDocument` if the text is not a JSON
/// array of objects.
pub fn extract_urls(json: &str) -> Result<ExtractedUrls> {
    extract_named(json, "<inline>")
}

fn extract_named(json: &str, source: &str) -> Result<ExtractedUrls> {
    let models: Vec<ModelEntry> = serde_json::from_str(json)
        .map_err(|e| UrlCheckError::invalid_document(source, e.to_string()))?;

    let mut extracted = ExtractedUrls::default();

    for model in models {
        let label = model
            .general
            .and_then(|general| general.model)
            .map(model_label)
            .unwrap_or_default();

        let images = model.images.into_iter().filter_map(|image| image.src);
        extracted.images.extend(tasks_for(images, &label));

        let attachments = model
            .attachments
            .into_iter()
            .filter_map(|attachment| attachment.attachment_location);
        extracted.attachments.extend(tasks_for(attachments, &label));
    }

    Ok(extracted)
}

/// Render a model name of any JSON type as a label.
fn model_label(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(name) => name,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn tasks_for<'a>(
    urls: impl Iterator<Item = String> + 'a,
    label: &'a str,
) -> impl Iterator<Item = UrlTask> + 'a {
    urls.map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .map(move |url| UrlTask::new(url, label))
}

/// Read a document from disk and extract its tasks.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<ExtractedUrls> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        UrlCheckError::file_error(path.to_string_lossy(), format!("Failed to read document: {}", e))
    })?;

    let extracted = extract_named(&content, &path.to_string_lossy())?;
    tracing::debug!(
        path = %path.display(),
        images = extracted.images.len(),
        attachments = extracted.attachments.len(),
        "extracted urls"
    );
    Ok(extracted)
}
