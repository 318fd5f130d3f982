// 响应解析器 - 将录像 API 的响应文本转换为结果列表
//
// 私有响应约定：响应以 `]` 开头，其后为 JSON；缺少该前缀说明服务器
// 返回了别的内容（例如跳转到登录页）。

use serde_json::Value;

use crate::models::ReplayResult;

/// 私有响应约定的前缀字符
pub const RESPONSE_SENTINEL: char = ']';

/// 解析响应文本
///
/// # 参数
/// - `text`: 原始响应文本
/// - `private_convention`: 是否要求 `]` 前缀
///
/// # 返回值
/// - `Ok(Vec<ReplayResult>)`: 录像列表
/// - `Err(String)`: 展示给用户的错误信息（`actionerror` 字段或 `Unrecognized response: ...`）
pub fn parse_response(text: &str, private_convention: bool) -> Result<Vec<ReplayResult>, String> {
    let body = match text.strip_prefix(RESPONSE_SENTINEL) {
        Some(rest) => rest,
        None if private_convention => return Err(unrecognized(text)),
        None => text,
    };

    match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Array(_)) => {
            serde_json::from_value::<Vec<ReplayResult>>(value).map_err(|e| {
                tracing::warn!("录像列表格式不符: {}", e);
                unrecognized(body)
            })
        }
        Ok(Value::Object(map)) => match map.get("actionerror") {
            Some(Value::String(message)) => Err(message.clone()),
            _ => Err(unrecognized(body)),
        },
        Ok(_) | Err(_) => Err(unrecognized(body)),
    }
}

fn unrecognized(text: &str) -> String {
    format!("Unrecognized response: {}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_REPLAY: &str = r#"[{"uploadtime":1700000000,"id":"gen9ou-1","format":"gen9ou","players":["Alice","Bob"],"rating":1600}]"#;

    #[test]
    fn test_private_list() {
        let text = format!("]{}", ONE_REPLAY);
        let results = parse_response(&text, true).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "gen9ou-1");
        assert_eq!(results[0].players, vec!["Alice", "Bob"]);
        assert_eq!(results[0].rating, Some(1600));
    }

    #[test]
    fn test_private_empty_list() {
        assert_eq!(parse_response("][]", true).unwrap(), Vec::new());
    }

    #[test]
    fn test_actionerror_is_surfaced() {
        let err = parse_response(r#"]{"actionerror":"bad"}"#, true).unwrap_err();
        assert_eq!(err, "bad");
    }

    #[test]
    fn test_missing_sentinel_with_private_convention() {
        let err = parse_response("not-json", true).unwrap_err();
        assert_eq!(err, "Unrecognized response: not-json");

        let err = parse_response(ONE_REPLAY, true).unwrap_err();
        assert!(err.starts_with("Unrecognized response: [{"));
    }

    #[test]
    fn test_public_bare_list() {
        let results = parse_response(ONE_REPLAY, false).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_public_strips_sentinel_when_present() {
        let text = format!("]{}", ONE_REPLAY);
        assert_eq!(parse_response(&text, false).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_response("]<html>login</html>", true).unwrap_err();
        assert_eq!(err, "Unrecognized response: <html>login</html>");
    }

    #[test]
    fn test_object_without_actionerror() {
        let err = parse_response(r#"]{"error":"nope"}"#, true).unwrap_err();
        assert_eq!(err, r#"Unrecognized response: {"error":"nope"}"#);
    }

    #[test]
    fn test_non_string_actionerror() {
        let err = parse_response(r#"]{"actionerror":42}"#, true).unwrap_err();
        assert_eq!(err, r#"Unrecognized response: {"actionerror":42}"#);
    }

    #[test]
    fn test_list_of_wrong_shape() {
        let err = parse_response("][1,2,3]", true).unwrap_err();
        assert_eq!(err, "Unrecognized response: [1,2,3]");
    }

    #[test]
    fn test_scalar_payload() {
        let err = parse_response("]\"hello\"", true).unwrap_err();
        assert_eq!(err, "Unrecognized response: \"hello\"");
    }
}
