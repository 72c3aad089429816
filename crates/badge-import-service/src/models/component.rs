//! 本地组件共享定义
//!
//! 三类本地记录共用的列为：url（唯一查找键）、json（原始文档）、
//! errors（结构化错误记录）以及 created_at / updated_at 审计列。
//! 这些列直接展开在各实体结构体上。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open Badges v1 JSON-LD 上下文
///
/// 入库的 issuer / badge 子文档统一附加该上下文
pub const OPENBADGES_CONTEXT_V1: &str = "https://w3id.org/openbadges/v1";

/// 版本识别失败的错误码
pub const ERROR_VERSION_DETECTION: &str = "error.version_detection";

/// 行内结构化错误记录
///
/// 以 (code, message, detail) 形式记录分析阶段的问题，
/// 序列化后存入实体的 errors 列，不会中断导入流程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub code: String,
    pub message: String,
    /// 原始错误明细，结构由产生方决定
    pub detail: Value,
}

impl ErrorRecord {
    pub fn new(code: impl Into<String>, message: impl Into<String>, detail: Value) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            detail,
        }
    }

    /// 组件版本识别失败的记录
    ///
    /// entity 为组件名（Issuer / BadgeClass），detail 保存分析器的版本探测明细
    pub fn version_detection(entity: &str, detail: Value) -> Self {
        Self::new(
            ERROR_VERSION_DETECTION,
            format!("Could not determine Open Badges version of {}", entity),
            detail,
        )
    }
}
