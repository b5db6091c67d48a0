/// Configuration for a [`Session`](crate::Session) and graph loading.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
    /// Fail a load when an image source's path cannot be read (default: true).
    /// When false the source comes back empty and a warning is logged.
    pub strict_image_paths: bool,
    /// Where freshly spawned nodes are placed (default: 100, 100)
    pub spawn_offset: [f64; 2],
    /// Where the output node of a new session is placed (default: 1000, 45)
    pub sink_position: [f64; 2],
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            strict_image_paths: true,
            spawn_offset: [100.0, 100.0],
            sink_position: [1000.0, 45.0],
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict_image_paths(mut self, strict: bool) -> Self {
        self.strict_image_paths = strict;
        self
    }

    pub fn spawn_offset(mut self, x: f64, y: f64) -> Self {
        self.spawn_offset = [x, y];
        self
    }

    pub fn sink_position(mut self, x: f64, y: f64) -> Self {
        self.sink_position = [x, y];
        self
    }
}
