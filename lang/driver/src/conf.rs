use sculptor::{AppAuthor, impl_serde_str_toml};
use serde::{Deserialize, Serialize};

/// User configuration, stored as `helix.toml` in the platform config dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
    /// header named by the first `#include` of every C unit
    pub runtime_header: String,
    pub emit_line_comments: bool,
    /// declare the runtime ABI at the top of the unit
    pub emit_prelude: bool,
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            runtime_header: "helix_runtime.h".to_string(),
            emit_line_comments: true,
            emit_prelude: true,
        }
    }
}

impl_serde_str_toml!(Conf);

impl AppAuthor for Conf {
    fn app_name() -> &'static str {
        "Helix"
    }

    fn author() -> &'static str {
        "Helix"
    }
}
