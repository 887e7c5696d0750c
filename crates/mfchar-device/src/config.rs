use serde::Serialize;

/// Default node name, published as `/dev/mfchar`.
pub const DEFAULT_DEVICE_NAME: &str = "mfchar";

/// Default ceiling on simultaneously open handles.
pub const DEFAULT_MAX_OPEN_HANDLES: usize = 1024;

/// How open handles map onto handle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BufferMode {
    /// Every open handle owns an isolated slot.
    #[default]
    PerHandle,
    /// Legacy layout: all handles share a single slot and see each other's data.
    Shared,
}

impl BufferMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BufferMode::PerHandle => "per-handle",
            BufferMode::Shared => "shared",
        }
    }
}

/// Device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceConfig {
    /// Node name; the device is reachable at `/dev/<name>`.
    pub name: String,
    /// Slot layout. Default: per-handle.
    pub buffer_mode: BufferMode,
    /// Maximum simultaneously open handles before open reports out of memory.
    pub max_open_handles: usize,
}

impl DeviceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_buffer_mode(mut self, mode: BufferMode) -> Self {
        self.buffer_mode = mode;
        self
    }

    pub fn with_max_open_handles(mut self, max: usize) -> Self {
        self.max_open_handles = max;
        self
    }

    /// Path the node is published under.
    pub fn node_path(&self) -> String {
        format!("/dev/{}", self.name)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DEVICE_NAME.to_string(),
            buffer_mode: BufferMode::default(),
            max_open_handles: DEFAULT_MAX_OPEN_HANDLES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_publish_dev_mfchar() {
        let config = DeviceConfig::default();
        assert_eq!(config.node_path(), "/dev/mfchar");
        assert_eq!(config.buffer_mode, BufferMode::PerHandle);
        assert_eq!(config.max_open_handles, DEFAULT_MAX_OPEN_HANDLES);
    }

    #[test]
    fn builder_overrides() {
        let config = DeviceConfig::new("scratch")
            .with_buffer_mode(BufferMode::Shared)
            .with_max_open_handles(2);
        assert_eq!(config.node_path(), "/dev/scratch");
        assert_eq!(config.buffer_mode.as_str(), "shared");
        assert_eq!(config.max_open_handles, 2);
    }

    #[test]
    fn serializes_mode_in_kebab_case() {
        let json = serde_json::to_value(DeviceConfig::default()).unwrap();
        assert_eq!(json["buffer_mode"], "per-handle");
        assert_eq!(json["name"], "mfchar");
    }
}
