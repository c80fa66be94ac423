use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Objective given to sessions created without one.
    #[serde(default = "d_objective")]
    pub default_objective: String,

    /// How long a session mutation waits for an in-flight run before it is
    /// rejected as busy.
    #[serde(default = "d_2000")]
    pub lock_wait_ms: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            default_objective: d_objective(),
            lock_wait_ms: 2_000,
        }
    }
}

fn d_objective() -> String {
    "Help me write the next message.".into()
}
fn d_2000() -> u64 {
    2_000
}
