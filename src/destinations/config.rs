//! Per-destination configuration.

use serde::{Deserialize, Serialize};

use crate::events::Data;

/// Configuration stored with every registered destination.
///
/// `init` tracks whether the destination finished initialization. Any other
/// keys are kept in `settings` for the destination's own use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationConfig {
    #[serde(default)]
    pub init: bool,
    #[serde(flatten)]
    pub settings: Data,
}

impl DestinationConfig {
    /// Config for a destination that is already initialized.
    pub fn initialized() -> Self {
        Self {
            init: true,
            settings: Data::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_init_flag_defaults_to_false() {
        let cfg: DestinationConfig =
            serde_json::from_value(json!({"containerId": "GTM-XXXX"})).unwrap();
        assert!(!cfg.init);
        assert_eq!(cfg.settings["containerId"], json!("GTM-XXXX"));
    }

    #[test]
    fn init_flag_is_read() {
        let cfg: DestinationConfig = serde_json::from_value(json!({"init": true})).unwrap();
        assert_eq!(cfg, DestinationConfig::initialized());
    }
}
