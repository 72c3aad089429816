//! 外部协作方接口
//!
//! 接收者身份解析、图片烘焙与图片存储由宿主系统提供，
//! 导入层只依赖这里的抽象，便于 mock 测试

use async_trait::async_trait;

use crate::analyzer::AnalyzedBadgeInstance;
use crate::error::Result;

/// 烘焙完成的徽章图片
#[derive(Debug, Clone)]
pub struct BakedImage {
    /// 原始文件名（扩展名在落盘时保留）
    pub name: String,
    pub content: Vec<u8>,
}

impl BakedImage {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// 接收者身份解析器
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipientResolver: Send + Sync {
    /// 按接收者标识查找宿主系统中的用户，找不到返回 None
    async fn find_recipient_user(&self, recipient_id: &str) -> Result<Option<i64>>;
}

/// 图片烘焙器
///
/// 把断言元数据嵌入徽章图片
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageBaker: Send + Sync {
    async fn baked_image_from_analyzed(&self, abi: &AnalyzedBadgeInstance) -> Result<BakedImage>;
}

/// 图片存储后端
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// 落盘图片内容，返回最终的相对路径
    ///
    /// 后端可能改写路径（重名、分桶等），调用方必须以返回值为准
    async fn store(&self, name: &str, content: &[u8]) -> Result<String>;
}
