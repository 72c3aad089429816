//! 本地组件领域模型
//!
//! 包含颁发机构、徽章类、徽章实例三类本地记录的实体定义

pub mod badge_class;
pub mod badge_instance;
pub mod component;
pub mod issuer;

// 重新导出常用类型
pub use badge_class::BadgeClass;
pub use badge_instance::BadgeInstance;
pub use component::{ErrorRecord, OPENBADGES_CONTEXT_V1};
pub use issuer::Issuer;
