//! 导入服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use thiserror::Error;

/// 导入服务错误类型
#[derive(Debug, Error)]
pub enum ImportError {
    // === 校验相关错误 ===
    #[error("徽章实例未通过校验, 无法保存: {entity}")]
    InvalidInstance { entity: String },

    #[error("徽章文档缺少声明的组件: {pointer}")]
    MalformedDocument { pointer: String },

    // === 删除保护错误 ===
    #[error("颁发机构仍被引用, 无法删除: issuer_id={issuer_id}, references={references}")]
    IssuerProtected { issuer_id: i64, references: i64 },

    #[error("徽章类仍被实例引用, 无法删除: badge_class_id={badge_class_id}, references={references}")]
    BadgeClassProtected {
        badge_class_id: i64,
        references: i64,
    },

    #[error("颁发机构不存在: {0}")]
    IssuerNotFound(i64),

    #[error("徽章类不存在: {0}")]
    BadgeClassNotFound(i64),

    // === 外部协作方错误 ===
    #[error("接收者身份解析失败: {0}")]
    RecipientLookup(String),

    #[error("烘焙图片生成失败: {0}")]
    ImageBake(String),

    #[error("图片存储失败: {0}")]
    ImageStorage(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 导入服务 Result 类型别名
pub type Result<T> = std::result::Result<T, ImportError>;

impl ImportError {
    /// 获取错误码（用于日志与上层响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInstance { .. } => "INVALID_INSTANCE",
            Self::MalformedDocument { .. } => "MALFORMED_DOCUMENT",
            Self::IssuerProtected { .. } => "ISSUER_PROTECTED",
            Self::BadgeClassProtected { .. } => "BADGE_CLASS_PROTECTED",
            Self::IssuerNotFound(_) => "ISSUER_NOT_FOUND",
            Self::BadgeClassNotFound(_) => "BADGE_CLASS_NOT_FOUND",
            Self::RecipientLookup(_) => "RECIPIENT_LOOKUP_FAILED",
            Self::ImageBake(_) => "IMAGE_BAKE_FAILED",
            Self::ImageStorage(_) => "IMAGE_STORAGE_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Serialization(_) | Self::Internal(_)
        )
    }

    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::ImageStorage(_) | Self::RecipientLookup(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = ImportError::InvalidInstance {
            entity: "Issuer".to_string(),
        };
        assert_eq!(err.error_code(), "INVALID_INSTANCE");

        let err = ImportError::IssuerProtected {
            issuer_id: 1,
            references: 3,
        };
        assert_eq!(err.error_code(), "ISSUER_PROTECTED");
    }

    #[test]
    fn test_is_business_error() {
        assert!(
            ImportError::InvalidInstance {
                entity: "BadgeInstance".to_string()
            }
            .is_business_error()
        );
        assert!(ImportError::BadgeClassNotFound(5).is_business_error());
        assert!(!ImportError::Internal("panic".to_string()).is_business_error());
        assert!(!ImportError::Database(sqlx::Error::PoolTimedOut).is_business_error());
    }

    #[test]
    fn test_is_retryable() {
        assert!(ImportError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!ImportError::IssuerNotFound(1).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ImportError::BadgeClassProtected {
            badge_class_id: 7,
            references: 2,
        };
        assert!(err.to_string().contains("7"));
        assert!(err.to_string().contains("2"));
    }
}
