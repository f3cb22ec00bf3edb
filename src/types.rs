//! Domain values handed to the rendering model by the request layer.

/// An object property whose related individuals are rendered as a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectProperty {
    uri: String,
}

impl ObjectProperty {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// The subject individual whose property values are being listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    uri: String,
}

impl Individual {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}
