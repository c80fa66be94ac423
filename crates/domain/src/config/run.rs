use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Run pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// How much of the raw model text a `final_error` frame carries.
    #[serde(default = "d_1500")]
    pub raw_snippet_chars: usize,

    /// Frames buffered between the run task and the HTTP response.
    #[serde(default = "d_64")]
    pub channel_capacity: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            raw_snippet_chars: 1_500,
            channel_capacity: 64,
        }
    }
}

fn d_1500() -> usize {
    1_500
}
fn d_64() -> usize {
    64
}
