//! 服务商响应信封处理
//!
//! 服务商在不同端点上时而直接返回数据，时而包在 `payload` 字段中

use serde_json::Value;

/// 音色列表响应的归一化结果
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Recognized(Vec<Value>),
    Unrecognized,
}

/// 识别裸数组或 `{payload: [...]}` 两种列表形状
pub fn normalize_listing(value: &Value) -> Listing {
    match value {
        Value::Array(items) => Listing::Recognized(items.clone()),
        Value::Object(map) => match map.get("payload") {
            Some(Value::Array(items)) => Listing::Recognized(items.clone()),
            _ => Listing::Unrecognized,
        },
        _ => Listing::Unrecognized,
    }
}

/// 取出 `payload` 对象，没有信封时返回原值
pub fn unwrap_envelope(value: &Value) -> &Value {
    match value.get("payload") {
        Some(payload) if payload.is_object() => payload,
        _ => value,
    }
}

/// 读取非空字符串字段，数值字段转为字符串
pub fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_shapes() {
        let bare = json!([{"id": 1, "voice_name": "A"}]);
        let enveloped = json!({"status_code": 200, "payload": [{"id": 1, "voice_name": "A"}]});
        assert_eq!(normalize_listing(&bare), normalize_listing(&enveloped));
        assert!(matches!(normalize_listing(&bare), Listing::Recognized(items) if items.len() == 1));
        assert_eq!(normalize_listing(&json!({"voices": []})), Listing::Unrecognized);
        assert_eq!(normalize_listing(&json!("nope")), Listing::Unrecognized);
    }

    #[test]
    fn test_unwrap_envelope() {
        let enveloped = json!({"payload": {"task_id": "t1"}});
        assert_eq!(string_field(unwrap_envelope(&enveloped), "task_id").as_deref(), Some("t1"));

        let flat = json!({"task_id": 7});
        assert_eq!(string_field(unwrap_envelope(&flat), "task_id").as_deref(), Some("7"));
        assert_eq!(string_field(&json!({"task_id": ""}), "task_id"), None);
    }
}
