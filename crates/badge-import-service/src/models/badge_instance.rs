//! 徽章实例实体

use backpack_shared::config::MediaConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::component::ErrorRecord;

/// 本地徽章实例记录
///
/// 0.5 版本的断言没有徽章类与颁发机构概念，两个外键均可为空；
/// 存在徽章类时，issuer_id 由徽章类传递推导，与其保持一致。
///
/// 生命周期：每个来源 URL 仅创建一次。唯一的变更路径是为缺少
/// 接收者身份的已有行补挂 recipient_user_id，其余重复导入均为只读。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BadgeInstance {
    pub id: i64,
    /// 规范来源 URL，唯一查找键
    pub url: String,
    /// 原始断言文档（image 字段指向落盘图片的公开地址）
    pub json: Value,
    /// 分析器产出的全部错误记录（JSON）
    pub errors: Value,
    /// 所属徽章类 ID（0.5 断言为空）
    #[sqlx(default)]
    pub badge_class_id: Option<i64>,
    /// 颁发机构 ID，由徽章类传递推导（0.5 断言为空）
    #[sqlx(default)]
    pub issuer_id: Option<i64>,
    /// 接收者标识（通常为邮箱）
    pub recipient_id: String,
    /// 已解析的接收者身份
    #[sqlx(default)]
    pub recipient_user_id: Option<i64>,
    /// 落盘图片的相对路径
    pub image_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BadgeInstance {
    /// 解析错误记录列表
    pub fn parse_errors(&self) -> Result<Vec<ErrorRecord>, serde_json::Error> {
        serde_json::from_value(self.errors.clone())
    }

    /// 计算落盘图片的绝对访问地址
    ///
    /// media_url 为绝对地址时直接拼接，否则以 http_origin 作为前缀
    pub fn image_url(&self, media: &MediaConfig) -> String {
        media.absolute_url(&self.image_name)
    }

    /// 是否已挂接接收者身份
    pub fn has_recipient_user(&self) -> bool {
        self.recipient_user_id.is_some()
    }
}
