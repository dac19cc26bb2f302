use crate::ReturnCode;
use crate::api::Action;
use serde::de::{DeserializeOwned, Error as _};

/// Verbatim reply body from the camera.
///
/// The firmware normally answers with a JSON object keyed by the action name
/// (`{"PTSpeedGet": {…}}`), or with an `error` object carrying a numeric
/// `"Return Code"`. Bodies are kept verbatim and only interpreted at the
/// explicit extraction points below; non-JSON bodies (boot pages, captive
/// proxies) pass through untouched.
#[derive(Debug, Clone)]
pub struct RawReply {
    text: String,
}

impl RawReply {
    pub(crate) fn from_text(text: String) -> Self {
        Self { text }
    }

    /// The reply body exactly as received.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the body was empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// JSON view of the body, or `None` when it isn't valid JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.text).ok()
    }

    /// The firmware return code from the reply's `error` object, if any.
    pub fn error_return_code(&self) -> Option<ReturnCode> {
        let value = self.json()?;
        let code = value.get("error")?.get("Return Code")?;
        serde_json::from_value(code.clone()).ok()
    }

    /// Deserialize the object the reply nests under the action's own name.
    pub(crate) fn section<T: DeserializeOwned>(
        &self,
        action: Action,
    ) -> Result<T, serde_json::Error> {
        let value = serde_json::from_str::<serde_json::Value>(&self.text)?;
        let section = value
            .get(action.as_str())
            .ok_or_else(|| serde_json::Error::custom(format!("no {action} object in reply")))?;
        T::deserialize(section)
    }
}

impl std::fmt::Display for RawReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
