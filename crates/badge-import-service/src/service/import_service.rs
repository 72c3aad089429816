//! 徽章导入服务
//!
//! 把已分析的断言落地为本地记录，包括：
//! - 三个实体的查找-创建入口（按来源 URL 幂等）
//! - 0.5 断言的能力降级（无徽章类/颁发机构概念时返回 None）
//! - 版本识别失败的行内留痕
//! - 接收者身份解析与补挂
//! - 烘焙图片落盘、公开地址回写
//! - 删除前的引用完整性检查
//!
//! ## 导入流程（徽章实例）
//!
//! 1. 校验结论检查 -> 2. 按 URL 查已有行（命中则最多补挂接收者后返回）
//!    -> 3. 解析接收者身份 -> 4. 解析徽章类（级联解析颁发机构）
//!    -> 5. 图片烘焙与落盘 -> 6. 写入记录
//!    -> 7. 图片地址被后端改写时仅回写 json 列

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use backpack_shared::config::MediaConfig;

use crate::analyzer::{AnalyzedBadgeInstance, BadgeComponent};
use crate::collaborators::{ImageBaker, ImageStore, RecipientResolver};
use crate::error::{ImportError, Result};
use crate::models::{BadgeClass, BadgeInstance, ErrorRecord, Issuer, OPENBADGES_CONTEXT_V1};
use crate::repository::ComponentRepositoryTrait;

/// 导入选项
///
/// 对应调用方在单次导入中可以显式提供的内容：
/// 已解析的接收者身份、已烘焙的图片。缺省时走外部协作方。
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub recipient_user: Option<i64>,
    pub image: Option<crate::collaborators::BakedImage>,
}

/// 徽章导入服务
///
/// 控制流严格自顶向下：实例入口触发徽章类解析，徽章类入口触发
/// 颁发机构解析。查找-创建路径不加锁，重复键由存储层唯一索引兜底。
pub struct ImportService<R>
where
    R: ComponentRepositoryTrait,
{
    repo: Arc<R>,
    recipient_resolver: Arc<dyn RecipientResolver>,
    image_baker: Arc<dyn ImageBaker>,
    image_store: Arc<dyn ImageStore>,
    media: MediaConfig,
}

impl<R> ImportService<R>
where
    R: ComponentRepositoryTrait,
{
    pub fn new(
        repo: Arc<R>,
        recipient_resolver: Arc<dyn RecipientResolver>,
        image_baker: Arc<dyn ImageBaker>,
        image_store: Arc<dyn ImageStore>,
        media: MediaConfig,
    ) -> Self {
        Self {
            repo,
            recipient_resolver,
            image_baker,
            image_store,
            media,
        }
    }

    /// 从分析结果查找或创建颁发机构
    ///
    /// - 分析结论无效时报错
    /// - 0.5 断言没有颁发机构概念，返回 None
    /// - 已有同 URL 记录时原样返回
    #[instrument(skip(self, abi, _options), fields(instance_url = %abi.instance_url))]
    pub async fn issuer_from_analyzed_instance(
        &self,
        abi: &AnalyzedBadgeInstance,
        _options: &ImportOptions,
    ) -> Result<Option<Issuer>> {
        ensure_valid(abi, "Issuer")?;

        match &abi.badge {
            None => Ok(None),
            Some(badge) => self.get_or_create_issuer(abi, badge).await.map(Some),
        }
    }

    /// 从分析结果查找或创建徽章类
    ///
    /// 与颁发机构入口同构，键为徽章类 URL；创建时级联解析颁发机构
    #[instrument(skip(self, abi, _options), fields(instance_url = %abi.instance_url))]
    pub async fn badge_class_from_analyzed_instance(
        &self,
        abi: &AnalyzedBadgeInstance,
        _options: &ImportOptions,
    ) -> Result<Option<BadgeClass>> {
        ensure_valid(abi, "BadgeClass")?;

        match &abi.badge {
            None => Ok(None),
            Some(badge) => self.get_or_create_badge_class(abi, badge).await.map(Some),
        }
    }

    /// 从分析结果查找或创建徽章实例
    ///
    /// 已有记录时唯一的变更路径是补挂接收者身份；创建路径解析接收者、
    /// 徽章类（级联颁发机构）、烘焙图片，并在落盘路径被后端改写时
    /// 仅回写 json 列中的图片地址。
    #[instrument(
        skip(self, abi, options),
        fields(instance_url = %abi.instance_url, recipient_id = %abi.recipient_id)
    )]
    pub async fn badge_instance_from_analyzed_instance(
        &self,
        abi: &AnalyzedBadgeInstance,
        options: &ImportOptions,
    ) -> Result<BadgeInstance> {
        ensure_valid(abi, "BadgeInstance")?;

        if let Some(mut existing) = self.repo.find_instance_by_url(&abi.instance_url).await? {
            if existing.recipient_user_id.is_none()
                && let Some(user_id) = options.recipient_user
            {
                self.repo
                    .update_instance_recipient_user(existing.id, user_id)
                    .await?;
                existing.recipient_user_id = Some(user_id);
                info!(
                    instance_id = existing.id,
                    recipient_user_id = user_id,
                    "为已有徽章实例挂接接收者"
                );
            }
            return Ok(existing);
        }

        // 接收者身份：优先使用调用方提供的，否则交给外部解析
        let recipient_user_id = match options.recipient_user {
            Some(user_id) => Some(user_id),
            None => {
                self.recipient_resolver
                    .find_recipient_user(&abi.recipient_id)
                    .await?
            }
        };

        // 0.5 断言两者皆无
        let badge_class = match &abi.badge {
            Some(badge) => Some(self.get_or_create_badge_class(abi, badge).await?),
            None => None,
        };

        // 烘焙图片：优先使用调用方提供的，否则由外部烘焙
        let baked = match options.image.clone() {
            Some(image) => image,
            None => self.image_baker.baked_image_from_analyzed(abi).await?,
        };

        // 唯一文件名保留原扩展名；公开地址先按落盘前的名字写入文档
        let image_name = generated_image_name(&baked.name);
        let mut json = abi.data.clone();
        if let Some(object) = json.as_object_mut() {
            object.insert(
                "image".to_string(),
                Value::String(self.media.absolute_url(&image_name)),
            );
        }

        // 存储后端可能改写相对路径，必须以返回值为准
        let stored_name = self.image_store.store(&image_name, &baked.content).await?;

        let now = Utc::now();
        let mut instance = BadgeInstance {
            id: 0,
            url: abi.instance_url.clone(),
            json,
            errors: serde_json::to_value(abi.all_errors())?,
            badge_class_id: badge_class.as_ref().map(|badge_class| badge_class.id),
            // 颁发机构由徽章类传递推导，不单独探测
            issuer_id: badge_class.as_ref().map(|badge_class| badge_class.issuer_id),
            recipient_id: abi.recipient_id.clone(),
            recipient_user_id,
            image_name: stored_name,
            created_at: now,
            updated_at: now,
        };
        instance.id = self.repo.create_instance(&instance).await?;

        // 落盘后重新计算公开地址，与文档不一致时仅回写 json 列
        let effective_url = instance.image_url(&self.media);
        if instance.json.get("image").and_then(Value::as_str) != Some(effective_url.as_str()) {
            if let Some(object) = instance.json.as_object_mut() {
                object.insert("image".to_string(), Value::String(effective_url));
            }
            self.repo
                .update_instance_document(instance.id, &instance.json)
                .await?;
        }

        info!(
            instance_id = instance.id,
            url = %instance.url,
            "创建本地徽章实例记录"
        );

        Ok(instance)
    }

    /// 删除颁发机构
    ///
    /// 删除前执行引用完整性检查：仍被徽章类或实例引用时拒绝删除
    #[instrument(skip(self))]
    pub async fn delete_issuer(&self, issuer_id: i64) -> Result<()> {
        let badge_class_count = self.repo.count_badge_classes_by_issuer(issuer_id).await?;
        if badge_class_count > 0 {
            return Err(ImportError::IssuerProtected {
                issuer_id,
                references: badge_class_count,
            });
        }

        let instance_count = self.repo.count_instances_by_issuer(issuer_id).await?;
        if instance_count > 0 {
            return Err(ImportError::IssuerProtected {
                issuer_id,
                references: instance_count,
            });
        }

        if !self.repo.delete_issuer(issuer_id).await? {
            return Err(ImportError::IssuerNotFound(issuer_id));
        }

        info!(issuer_id, "删除本地颁发机构记录");
        Ok(())
    }

    /// 删除徽章类
    ///
    /// 删除前执行引用完整性检查：仍被实例引用时拒绝删除
    #[instrument(skip(self))]
    pub async fn delete_badge_class(&self, badge_class_id: i64) -> Result<()> {
        let instance_count = self
            .repo
            .count_instances_by_badge_class(badge_class_id)
            .await?;
        if instance_count > 0 {
            return Err(ImportError::BadgeClassProtected {
                badge_class_id,
                references: instance_count,
            });
        }

        if !self.repo.delete_badge_class(badge_class_id).await? {
            return Err(ImportError::BadgeClassNotFound(badge_class_id));
        }

        info!(badge_class_id, "删除本地徽章类记录");
        Ok(())
    }

    // ==================== 私有方法 ====================

    /// 查找或创建颁发机构（内部路径，badge 组件已确认存在）
    async fn get_or_create_issuer(
        &self,
        abi: &AnalyzedBadgeInstance,
        badge: &BadgeComponent,
    ) -> Result<Issuer> {
        if let Some(existing) = self.repo.find_issuer_by_url(&badge.issuer.url).await? {
            return Ok(existing);
        }

        let errors = match badge.issuer.version {
            Some(_) => vec![],
            None => vec![ErrorRecord::version_detection(
                "Issuer",
                badge.issuer.version_errors.clone(),
            )],
        };

        let document = abi
            .issuer_document()
            .ok_or_else(|| ImportError::MalformedDocument {
                pointer: "badge.issuer".to_string(),
            })?;

        let now = Utc::now();
        let mut issuer = Issuer {
            id: 0,
            url: badge.issuer.url.clone(),
            json: annotate_context(document),
            errors: serde_json::to_value(&errors)?,
            created_at: now,
            updated_at: now,
        };
        issuer.id = self.repo.create_issuer(&issuer).await?;

        info!(issuer_id = issuer.id, url = %issuer.url, "创建本地颁发机构记录");
        Ok(issuer)
    }

    /// 查找或创建徽章类（内部路径，badge 组件已确认存在）
    async fn get_or_create_badge_class(
        &self,
        abi: &AnalyzedBadgeInstance,
        badge: &BadgeComponent,
    ) -> Result<BadgeClass> {
        if let Some(existing) = self.repo.find_badge_class_by_url(&badge.url).await? {
            return Ok(existing);
        }

        let issuer = self.get_or_create_issuer(abi, badge).await?;

        let errors = match badge.version {
            Some(_) => vec![],
            None => vec![ErrorRecord::version_detection(
                "BadgeClass",
                badge.version_errors.clone(),
            )],
        };

        let document = abi
            .badge_document()
            .ok_or_else(|| ImportError::MalformedDocument {
                pointer: "badge".to_string(),
            })?;

        let now = Utc::now();
        let mut badge_class = BadgeClass {
            id: 0,
            url: badge.url.clone(),
            json: annotate_context(document),
            errors: serde_json::to_value(&errors)?,
            issuer_id: issuer.id,
            created_at: now,
            updated_at: now,
        };
        badge_class.id = self.repo.create_badge_class(&badge_class).await?;

        info!(
            badge_class_id = badge_class.id,
            url = %badge_class.url,
            "创建本地徽章类记录"
        );
        Ok(badge_class)
    }
}

/// 校验分析结论，未通过时拒绝保存
fn ensure_valid(abi: &AnalyzedBadgeInstance, entity: &str) -> Result<()> {
    if abi.is_valid() {
        Ok(())
    } else {
        Err(ImportError::InvalidInstance {
            entity: entity.to_string(),
        })
    }
}

/// 为入库文档附加 Open Badges v1 上下文
fn annotate_context(mut document: Value) -> Value {
    if let Some(object) = document.as_object_mut() {
        object.insert(
            "@context".to_string(),
            Value::String(OPENBADGES_CONTEXT_V1.to_string()),
        );
    }
    document
}

/// 生成唯一的落盘文件名，保留原始扩展名
fn generated_image_name(original_name: &str) -> String {
    match Path::new(original_name)
        .extension()
        .and_then(OsStr::to_str)
    {
        Some(ext) => format!("earned_badge_{}.{}", Uuid::new_v4(), ext),
        None => format!("earned_badge_{}", Uuid::new_v4()),
    }
}
