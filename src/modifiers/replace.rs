//! Textual find/replace over response bodies.
//!
//! Bodies that are not valid UTF-8 pass through untouched.

use bytes::Bytes;

use crate::error::BoxError;
use crate::proxy::message::{InboundResponse, OutboundResponse};
use crate::proxy::modifier::Modifier;

#[derive(Debug)]
pub struct ReplaceModifier {
    find: String,
    replace: String,
}

impl ReplaceModifier {
    #[must_use]
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

impl Modifier for ReplaceModifier {
    fn name(&self) -> &str {
        "replace"
    }

    fn on_response(&self, response: InboundResponse) -> Result<OutboundResponse, BoxError> {
        let mut response = OutboundResponse::from(response);
        if self.find.is_empty() {
            return Ok(response);
        }
        if let Ok(text) = std::str::from_utf8(&response.body) {
            if text.contains(&self.find) {
                response.body = Bytes::from(text.replace(&self.find, &self.replace));
            }
        }
        Ok(response)
    }
}
