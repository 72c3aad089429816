//! 颁发机构实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::component::ErrorRecord;

/// 本地颁发机构记录
///
/// 每个来源 URL 仅创建一次，之后的导入直接返回已有行（不支持重新派生）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    pub id: i64,
    /// 规范来源 URL，唯一查找键
    pub url: String,
    /// 原始 JSON 文档（已附加 @context）
    pub json: Value,
    /// 结构化错误记录列表（JSON）
    pub errors: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issuer {
    /// 解析错误记录列表
    pub fn parse_errors(&self) -> Result<Vec<ErrorRecord>, serde_json::Error> {
        serde_json::from_value(self.errors.clone())
    }
}
