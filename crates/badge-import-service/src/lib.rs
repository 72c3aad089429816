//! 徽章导入服务
//!
//! 将外部分析器产出的 Open Badges 断言落地为本地记录。三类实体构成
//! 颁发机构 -> 徽章类 -> 徽章实例 层级，均以来源 URL 为唯一查找键，
//! 采用查找-创建语义：同一 URL 重复导入返回同一行。
//!
//! ## 核心功能
//!
//! - **查找-创建**：三个 `*_from_analyzed_instance` 入口按 URL 幂等落库
//! - **版本留痕**：组件版本无法识别时以结构化错误记录写入行内，不中断导入
//! - **0.5 兼容**：旧版断言没有徽章类/颁发机构概念，对应入口返回 None
//! - **接收者挂接**：已有实例缺少接收者身份时补挂，这是模型中唯一的变更路径
//! - **图片落盘**：烘焙图片以唯一文件名存储，公开地址回写进文档
//! - **保护性删除**：删除前执行引用完整性检查
//!
//! ## 模块结构
//!
//! - `models`: 本地组件实体定义
//! - `analyzer`: 分析结果输入模型
//! - `collaborators`: 外部协作方接口（接收者解析、图片烘焙与存储）
//! - `error`: 错误类型定义
//! - `repository`: 数据库仓储层
//! - `service`: 导入服务层

pub mod analyzer;
pub mod collaborators;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use analyzer::{AnalyzedBadgeInstance, BadgeComponent, IssuerComponent, ObiVersion};
pub use collaborators::{BakedImage, ImageBaker, ImageStore, RecipientResolver};
pub use error::{ImportError, Result};
pub use models::*;
pub use repository::{ComponentRepository, ComponentRepositoryTrait};
pub use service::{ImportOptions, ImportService};
