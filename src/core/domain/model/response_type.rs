//! Response formats a session can decode API bodies into.

use std::fmt;

/// How the body of a CRUD response is handed back to the caller.
///
/// Parsing is deliberately forgiving: an unrecognised name selects
/// [`ResponseType::Array`] instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResponseType {
    /// JSON parsed into a generic [`serde_json::Value`].
    #[default]
    Array,
    /// JSON parsed into a top-level object map.
    Object,
    /// JSON text, unparsed.
    Json,
    Html,
    Extjs,
    Text,
    /// Raw PNG bytes.
    Png,
    /// PNG bytes as a base64 `data:` URI.
    PngB64,
}

impl ResponseType {
    pub const ALL: [ResponseType; 8] = [
        ResponseType::Array,
        ResponseType::Object,
        ResponseType::Json,
        ResponseType::Html,
        ResponseType::Extjs,
        ResponseType::Text,
        ResponseType::Png,
        ResponseType::PngB64,
    ];

    /// Lenient parse: exact lowercase names only, anything else is `Array`.
    pub fn parse(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == value)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Array => "array",
            ResponseType::Object => "object",
            ResponseType::Json => "json",
            ResponseType::Html => "html",
            ResponseType::Extjs => "extjs",
            ResponseType::Text => "text",
            ResponseType::Png => "png",
            ResponseType::PngB64 => "pngb64",
        }
    }

    /// The format segment of the API path (`/api2/<segment>/...`).
    pub fn path_segment(&self) -> &'static str {
        match self {
            ResponseType::Array | ResponseType::Object | ResponseType::Json => "json",
            ResponseType::PngB64 => "png",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ResponseType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}
