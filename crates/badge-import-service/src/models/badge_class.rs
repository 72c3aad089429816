//! 徽章类实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::component::ErrorRecord;

/// 本地徽章类记录
///
/// 必定归属一个颁发机构；颁发机构被引用期间禁止删除
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BadgeClass {
    pub id: i64,
    /// 规范来源 URL，唯一查找键
    pub url: String,
    /// 原始 JSON 文档（已附加 @context）
    pub json: Value,
    /// 结构化错误记录列表（JSON）
    pub errors: Value,
    /// 所属颁发机构 ID
    pub issuer_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BadgeClass {
    /// 解析错误记录列表
    pub fn parse_errors(&self) -> Result<Vec<ErrorRecord>, serde_json::Error> {
        serde_json::from_value(self.errors.clone())
    }
}
