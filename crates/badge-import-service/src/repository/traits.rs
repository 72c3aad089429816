//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{BadgeClass, BadgeInstance, Issuer};

/// 本地组件仓储接口
///
/// 覆盖 颁发机构 -> 徽章类 -> 徽章实例 三层结构的数据访问
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComponentRepositoryTrait: Send + Sync {
    // 颁发机构
    async fn find_issuer_by_url(&self, url: &str) -> Result<Option<Issuer>>;
    async fn create_issuer(&self, issuer: &Issuer) -> Result<i64>;
    async fn count_badge_classes_by_issuer(&self, issuer_id: i64) -> Result<i64>;
    async fn count_instances_by_issuer(&self, issuer_id: i64) -> Result<i64>;
    async fn delete_issuer(&self, id: i64) -> Result<bool>;

    // 徽章类
    async fn find_badge_class_by_url(&self, url: &str) -> Result<Option<BadgeClass>>;
    async fn create_badge_class(&self, badge_class: &BadgeClass) -> Result<i64>;
    async fn list_badge_classes_by_issuer(&self, issuer_id: i64) -> Result<Vec<BadgeClass>>;
    async fn count_instances_by_badge_class(&self, badge_class_id: i64) -> Result<i64>;
    async fn delete_badge_class(&self, id: i64) -> Result<bool>;

    // 徽章实例
    async fn find_instance_by_url(&self, url: &str) -> Result<Option<BadgeInstance>>;
    async fn create_instance(&self, instance: &BadgeInstance) -> Result<i64>;
    async fn list_instances_by_recipient_user(
        &self,
        recipient_user_id: i64,
    ) -> Result<Vec<BadgeInstance>>;
    async fn update_instance_recipient_user(&self, id: i64, recipient_user_id: i64) -> Result<()>;
    async fn update_instance_document(&self, id: i64, json: &Value) -> Result<()>;
}
