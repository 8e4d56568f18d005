/// Errors raised while wiring the documentation frame to its host page.
///
/// None of these reach the host: every event entry point on
/// [`DocView`](crate::host::DocView) logs them and degrades to a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocViewError {
    /// The host page has no frame element matching the configured selector.
    FrameMissing,
    /// The frame has not loaded a document yet, or it lacks a required part.
    DocumentUnavailable(&'static str),
    /// A required data attribute is absent from the frame element.
    AttributeMissing { attribute: String },
    /// A URL could not be parsed or joined.
    InvalidUrl { value: String, reason: String },
    /// A selector string uses syntax outside the supported subset.
    InvalidSelector(String),
    /// A configuration value could not be parsed.
    InvalidConfig { key: &'static str, value: String },
}

impl std::fmt::Display for DocViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrameMissing => write!(f, "no documentation frame on page"),
            Self::DocumentUnavailable(what) => write!(f, "embedded document unavailable: {}", what),
            Self::AttributeMissing { attribute } => {
                write!(f, "frame element lacks attribute {}", attribute)
            }
            Self::InvalidUrl { value, reason } => write!(f, "invalid URL {:?}: {}", value, reason),
            Self::InvalidSelector(sel) => write!(f, "unsupported selector {:?}", sel),
            Self::InvalidConfig { key, value } => {
                write!(f, "invalid value {:?} for {}", value, key)
            }
        }
    }
}

impl std::error::Error for DocViewError {}

impl DocViewError {
    pub(crate) fn url(value: &str, err: url::ParseError) -> Self {
        Self::InvalidUrl {
            value: value.to_string(),
            reason: err.to_string(),
        }
    }
}
