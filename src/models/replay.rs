use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// 旧格式名改名的时间点（2013-10-14，X/Y 发售两天后）
///
/// 此前上传的 `ou` 等格式属于第五世代，此后属于第六世代。
pub const FORMAT_RENAME_CUTOVER: i64 = 1381734000;

const LEGACY_GEN_BEFORE: &str = "gen5";
const LEGACY_GEN_AFTER: &str = "gen6";

/// 服务器返回的录像记录（只读）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// 上传时间（Unix 秒）
    pub uploadtime: i64,
    pub id: String,
    pub format: String,
    /// 对战双方，第一位为默认视角
    #[serde(default)]
    pub players: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// 服务器可能返回 0/1 或 true/false
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
}

impl ReplayResult {
    /// 获取第 `index` 位玩家，不存在时返回空字符串
    pub fn player(&self, index: usize) -> &str {
        self.players.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn is_private(&self) -> bool {
        self.private.unwrap_or(false)
    }

    /// 有效的录像密码（空字符串视为无密码）
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|pw| !pw.is_empty())
    }

    /// 展示用格式标签，带评分时附加 ` (Rating: N)`
    pub fn display_label(&self) -> String {
        match self.rating {
            Some(rating) if rating > 0 => format!("{} (Rating: {})", self.format, rating),
            _ => self.format.clone(),
        }
    }

    /// 上传时间
    pub fn upload_date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.uploadtime, 0)
    }

    /// 规范化后的格式 ID，见 [`format_id`]
    pub fn format_id(&self) -> String {
        format_id(&self.format, self.uploadtime)
    }

    /// 为指定观看者生成录像固定链接（相对路径）
    ///
    /// 当观看者就是第二位玩家时追加 `?p2` 请求切换视角。
    pub fn permalink(&self, viewer: &str) -> String {
        let viewer = to_id(viewer);
        let switched = !viewer.is_empty() && to_id(self.player(1)) == viewer;
        self.build_permalink(switched)
    }

    /// 强制使用第二位玩家视角的固定链接
    pub fn permalink_switched(&self) -> String {
        self.build_permalink(true)
    }

    fn build_permalink(&self, switched: bool) -> String {
        let mut url = self.id.clone();
        if let Some(password) = self.password() {
            url.push('-');
            url.push_str(password);
            url.push_str("pw");
        }
        if switched {
            url.push_str("?p2");
        }
        url
    }
}

/// 将名称转换为 ID：小写，仅保留 `[a-z0-9]`
pub fn to_id(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// 规范化旧格式名
///
/// # 规则
/// - 不以 `gen<数字>` 开头的旧名称按上传时间补上世代前缀：
///   晚于 [`FORMAT_RENAME_CUTOVER`] 为 `gen6`，否则为 `gen5`
/// - 世代前缀后缺少 `-` 时补上
///
/// # 示例
/// ```
/// use replay_search::models::format_id;
///
/// assert_eq!(format_id("ou", 1381733999), "gen5-ou");
/// assert_eq!(format_id("ou", 1381734001), "gen6-ou");
/// assert_eq!(format_id("gen8ou", 0), "gen8-ou");
/// ```
pub fn format_id(label: &str, uploadtime: i64) -> String {
    static GEN_MARKER: OnceLock<Regex> = OnceLock::new();
    let marker = GEN_MARKER.get_or_init(|| {
        Regex::new(r"^gen[0-9]+").expect("世代前缀正则表达式编译失败")
    });

    let mut formatid = if marker.is_match(label) {
        label.to_string()
    } else {
        let generation = if uploadtime > FORMAT_RENAME_CUTOVER {
            LEGACY_GEN_AFTER
        } else {
            LEGACY_GEN_BEFORE
        };
        format!("{}{}", generation, label)
    };

    // 在完整的数字段之后插入分隔符（兼容 gen10 这类两位世代）
    let marker_end = marker.find(&formatid).map(|m| m.end()).unwrap_or(0);
    if !formatid[marker_end..].starts_with('-') {
        formatid.insert(marker_end, '-');
    }
    formatid
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(flag)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64().map(|v| v != 0.0).unwrap_or(false))),
        Some(other) => Err(de::Error::custom(format!("invalid private flag: {}", other))),
    }
}
