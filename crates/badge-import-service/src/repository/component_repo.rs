//! 本地组件仓储
//!
//! 提供颁发机构、徽章类、徽章实例的数据访问。
//! 查找-创建路径没有加锁：并发导入同一 URL 时依赖 url 唯一索引兜底，
//! 冲突以数据库错误的形式抛给调用方。

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

use super::traits::ComponentRepositoryTrait;
use crate::error::Result;
use crate::models::{BadgeClass, BadgeInstance, Issuer};

/// 本地组件仓储
///
/// 负责 颁发机构 -> 徽章类 -> 徽章实例 三层结构的数据访问
pub struct ComponentRepository {
    pool: PgPool,
}

impl ComponentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 颁发机构 ====================

    /// 按来源 URL 查找颁发机构
    pub async fn find_issuer_by_url(&self, url: &str) -> Result<Option<Issuer>> {
        let issuer = sqlx::query_as::<_, Issuer>(
            r#"
            SELECT id, url, json, errors, created_at, updated_at
            FROM issuers
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(issuer)
    }

    /// 创建颁发机构记录
    ///
    /// 返回新记录的 ID
    pub async fn create_issuer(&self, issuer: &Issuer) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO issuers (url, json, errors, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&issuer.url)
        .bind(&issuer.json)
        .bind(&issuer.errors)
        .bind(issuer.created_at)
        .bind(issuer.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// 统计引用某颁发机构的徽章类数量
    pub async fn count_badge_classes_by_issuer(&self, issuer_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM badge_classes WHERE issuer_id = $1
            "#,
        )
        .bind(issuer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 统计直接引用某颁发机构的徽章实例数量
    pub async fn count_instances_by_issuer(&self, issuer_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM badge_instances WHERE issuer_id = $1
            "#,
        )
        .bind(issuer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 删除颁发机构
    ///
    /// 返回是否确有删除；引用完整性检查由服务层在调用前完成
    pub async fn delete_issuer(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM issuers WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ==================== 徽章类 ====================

    /// 按来源 URL 查找徽章类
    pub async fn find_badge_class_by_url(&self, url: &str) -> Result<Option<BadgeClass>> {
        let badge_class = sqlx::query_as::<_, BadgeClass>(
            r#"
            SELECT id, url, json, errors, issuer_id, created_at, updated_at
            FROM badge_classes
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(badge_class)
    }

    /// 创建徽章类记录
    ///
    /// 返回新记录的 ID
    pub async fn create_badge_class(&self, badge_class: &BadgeClass) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO badge_classes (url, json, errors, issuer_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&badge_class.url)
        .bind(&badge_class.json)
        .bind(&badge_class.errors)
        .bind(badge_class.issuer_id)
        .bind(badge_class.created_at)
        .bind(badge_class.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// 列出某颁发机构下的全部徽章类
    pub async fn list_badge_classes_by_issuer(&self, issuer_id: i64) -> Result<Vec<BadgeClass>> {
        let badge_classes = sqlx::query_as::<_, BadgeClass>(
            r#"
            SELECT id, url, json, errors, issuer_id, created_at, updated_at
            FROM badge_classes
            WHERE issuer_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(issuer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(badge_classes)
    }

    /// 统计引用某徽章类的实例数量
    pub async fn count_instances_by_badge_class(&self, badge_class_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM badge_instances WHERE badge_class_id = $1
            "#,
        )
        .bind(badge_class_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 删除徽章类
    pub async fn delete_badge_class(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM badge_classes WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ==================== 徽章实例 ====================

    /// 按来源 URL 查找徽章实例
    pub async fn find_instance_by_url(&self, url: &str) -> Result<Option<BadgeInstance>> {
        let instance = sqlx::query_as::<_, BadgeInstance>(
            r#"
            SELECT id, url, json, errors, badge_class_id, issuer_id,
                   recipient_id, recipient_user_id, image_name, created_at, updated_at
            FROM badge_instances
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(instance)
    }

    /// 创建徽章实例记录
    ///
    /// 返回新记录的 ID
    pub async fn create_instance(&self, instance: &BadgeInstance) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO badge_instances
                (url, json, errors, badge_class_id, issuer_id,
                 recipient_id, recipient_user_id, image_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&instance.url)
        .bind(&instance.json)
        .bind(&instance.errors)
        .bind(instance.badge_class_id)
        .bind(instance.issuer_id)
        .bind(&instance.recipient_id)
        .bind(instance.recipient_user_id)
        .bind(&instance.image_name)
        .bind(instance.created_at)
        .bind(instance.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// 列出某接收者名下的全部徽章实例
    pub async fn list_instances_by_recipient_user(
        &self,
        recipient_user_id: i64,
    ) -> Result<Vec<BadgeInstance>> {
        let instances = sqlx::query_as::<_, BadgeInstance>(
            r#"
            SELECT id, url, json, errors, badge_class_id, issuer_id,
                   recipient_id, recipient_user_id, image_name, created_at, updated_at
            FROM badge_instances
            WHERE recipient_user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(recipient_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(instances)
    }

    /// 为已有实例挂接接收者身份
    pub async fn update_instance_recipient_user(
        &self,
        id: i64,
        recipient_user_id: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE badge_instances
            SET recipient_user_id = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(recipient_user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 仅回写实例的 json 文档列
    ///
    /// 用于落盘后图片地址被存储后端改写的修正
    pub async fn update_instance_document(&self, id: i64, json: &Value) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE badge_instances
            SET json = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ComponentRepositoryTrait for ComponentRepository {
    async fn find_issuer_by_url(&self, url: &str) -> Result<Option<Issuer>> {
        self.find_issuer_by_url(url).await
    }

    async fn create_issuer(&self, issuer: &Issuer) -> Result<i64> {
        self.create_issuer(issuer).await
    }

    async fn count_badge_classes_by_issuer(&self, issuer_id: i64) -> Result<i64> {
        self.count_badge_classes_by_issuer(issuer_id).await
    }

    async fn count_instances_by_issuer(&self, issuer_id: i64) -> Result<i64> {
        self.count_instances_by_issuer(issuer_id).await
    }

    async fn delete_issuer(&self, id: i64) -> Result<bool> {
        self.delete_issuer(id).await
    }

    async fn find_badge_class_by_url(&self, url: &str) -> Result<Option<BadgeClass>> {
        self.find_badge_class_by_url(url).await
    }

    async fn create_badge_class(&self, badge_class: &BadgeClass) -> Result<i64> {
        self.create_badge_class(badge_class).await
    }

    async fn list_badge_classes_by_issuer(&self, issuer_id: i64) -> Result<Vec<BadgeClass>> {
        self.list_badge_classes_by_issuer(issuer_id).await
    }

    async fn count_instances_by_badge_class(&self, badge_class_id: i64) -> Result<i64> {
        self.count_instances_by_badge_class(badge_class_id).await
    }

    async fn delete_badge_class(&self, id: i64) -> Result<bool> {
        self.delete_badge_class(id).await
    }

    async fn find_instance_by_url(&self, url: &str) -> Result<Option<BadgeInstance>> {
        self.find_instance_by_url(url).await
    }

    async fn create_instance(&self, instance: &BadgeInstance) -> Result<i64> {
        self.create_instance(instance).await
    }

    async fn list_instances_by_recipient_user(
        &self,
        recipient_user_id: i64,
    ) -> Result<Vec<BadgeInstance>> {
        self.list_instances_by_recipient_user(recipient_user_id)
            .await
    }

    async fn update_instance_recipient_user(&self, id: i64, recipient_user_id: i64) -> Result<()> {
        self.update_instance_recipient_user(id, recipient_user_id)
            .await
    }

    async fn update_instance_document(&self, id: i64, json: &Value) -> Result<()> {
        self.update_instance_document(id, json).await
    }
}
