use serde::{Deserialize, Serialize};

/// 提示消息级别，对应页面样式类名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_serializes_as_css_class() {
        let json = serde_json::to_string(&FlashMessage::new(FlashLevel::Danger, "x")).unwrap();
        assert_eq!(json, r#"{"level":"danger","message":"x"}"#);
    }
}
