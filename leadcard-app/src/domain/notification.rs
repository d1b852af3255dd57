use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Notification {
    /// Increases with every post; timers only act on the id they were armed for.
    pub id: u64,
    pub text: String,
    pub visible: bool,
}

impl Notification {
    pub fn shown(id: u64, text: String) -> Self {
        Self {
            id,
            text,
            visible: true,
        }
    }
}
