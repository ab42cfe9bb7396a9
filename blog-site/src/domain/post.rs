use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::ValidateUrl;

use super::error::DomainError;

const TITLE_MAX_CHARS: usize = 250;
const SUBTITLE_MAX_CHARS: usize = 250;
const IMG_URL_MAX_CHARS: usize = 250;
const DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_name: String,
    pub(crate) title: String,
    pub(crate) subtitle: String,
    pub(crate) body: String,
    pub(crate) img_url: String,
    pub(crate) date: String,
}

/// Editable part of a post. Used for both creation and edits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct PostContent {
    pub(crate) title: String,
    pub(crate) subtitle: String,
    pub(crate) body: String,
    pub(crate) img_url: String,
}

impl PostContent {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_line(&self.title, "title", TITLE_MAX_CHARS)?,
            subtitle: normalize_line(&self.subtitle, "subtitle", SUBTITLE_MAX_CHARS)?,
            body: normalize_body(&self.body)?,
            img_url: normalize_img_url(&self.img_url)?,
        })
    }
}

impl From<&Post> for PostContent {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            body: post.body.clone(),
            img_url: post.img_url.clone(),
        }
    }
}

/// Human-readable creation date stored with each post, e.g. `October 19, 2026`.
pub(crate) fn display_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn normalize_line(
    value: &str,
    field: &'static str,
    max_chars: usize,
) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max_chars {
        return Err(DomainError::Validation {
            field,
            message: "must be 1..250 chars",
        });
    }
    Ok(value.to_string())
}

fn normalize_body(body: &str) -> Result<String, DomainError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(DomainError::Validation {
            field: "body",
            message: "must not be empty",
        });
    }
    Ok(body.to_string())
}

fn normalize_img_url(img_url: &str) -> Result<String, DomainError> {
    let img_url = normalize_line(img_url, "img_url", IMG_URL_MAX_CHARS)?;
    if !img_url.validate_url() {
        return Err(DomainError::Validation {
            field: "img_url",
            message: "must be a valid URL",
        });
    }
    Ok(img_url)
}
