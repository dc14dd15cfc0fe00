/// Configuration of a [Publisher](crate::Publisher).
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Create the message table of a topic the first time something is
    /// published to it.
    pub auto_initialize_schema: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            auto_initialize_schema: true,
        }
    }
}

impl PublisherConfig {
    pub fn with_auto_initialize_schema(mut self, auto_initialize_schema: bool) -> Self {
        self.auto_initialize_schema = auto_initialize_schema;
        self
    }
}
