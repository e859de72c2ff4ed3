//! Stream description types

/// Stream category (e.g. depth, color)
pub type StreamType = i32;

/// Stream variant within a category
pub type StreamSubtype = i32;

/// Describes the stream a connection reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamDescription {
    /// Stream category
    pub stream_type: StreamType,
    /// Stream variant
    pub subtype: StreamSubtype,
}

impl StreamDescription {
    /// Create a new stream description
    pub fn new(stream_type: StreamType, subtype: StreamSubtype) -> Self {
        Self {
            stream_type,
            subtype,
        }
    }
}

impl std::fmt::Display for StreamDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.stream_type, self.subtype)
    }
}
