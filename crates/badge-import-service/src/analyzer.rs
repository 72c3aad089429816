//! 分析结果输入模型
//!
//! 徽章解析、签名/版本识别由外部分析器完成，本模块定义其产出在导入层
//! 的数据形态。版本能力以显式标签表达：0.5 断言没有徽章类与颁发机构
//! 概念，对应 `badge` 为 `None`，相关 URL 访问器返回 `None`，
//! 不依赖异常回退。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::ErrorRecord;

/// 识别出的 Open Badges 规范版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObiVersion {
    /// 0.5 时代断言 - 无独立的徽章类/颁发机构对象
    #[serde(rename = "0.5")]
    V0_5,
    /// 1.0 断言 - hosted/signed 验证，三层对象齐全
    #[serde(rename = "1.0")]
    V1_0,
    /// 1.1 断言 - 带 JSON-LD 上下文
    #[serde(rename = "1.1")]
    V1_1,
}

impl ObiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V0_5 => "0.5",
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
        }
    }
}

/// 颁发机构组件的分析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerComponent {
    /// 颁发机构来源 URL
    pub url: String,
    /// 识别出的版本，识别失败为 None
    pub version: Option<ObiVersion>,
    /// 版本探测过程的错误明细
    #[serde(default)]
    pub version_errors: Value,
}

/// 徽章类组件的分析结果
///
/// 徽章类组件总是携带其颁发机构组件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeComponent {
    /// 徽章类来源 URL
    pub url: String,
    /// 识别出的版本，识别失败为 None
    pub version: Option<ObiVersion>,
    /// 版本探测过程的错误明细
    #[serde(default)]
    pub version_errors: Value,
    pub issuer: IssuerComponent,
}

/// 已分析的徽章实例
///
/// 外部分析器校验、版本归一化之后的断言内存表示，导入层的唯一输入
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedBadgeInstance {
    /// 原始断言文档
    pub data: Value,
    /// 断言来源 URL
    pub instance_url: String,
    /// 接收者标识（通常为邮箱）
    pub recipient_id: String,
    /// 识别出的断言版本
    pub version: Option<ObiVersion>,
    /// 版本探测过程的错误明细
    #[serde(default)]
    pub version_errors: Value,
    /// 分析阶段收集的全部错误记录
    #[serde(default)]
    pub errors: Vec<ErrorRecord>,
    /// 分析器的整体校验结论
    pub valid: bool,
    /// 徽章类组件；0.5 断言为 None
    pub badge: Option<BadgeComponent>,
}

impl AnalyzedBadgeInstance {
    /// 分析器的整体校验结论
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// 分析阶段收集的全部错误记录
    pub fn all_errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// 徽章类来源 URL；0.5 断言为 None
    pub fn badge_url(&self) -> Option<&str> {
        self.badge.as_ref().map(|badge| badge.url.as_str())
    }

    /// 颁发机构来源 URL；0.5 断言为 None
    pub fn issuer_url(&self) -> Option<&str> {
        self.badge.as_ref().map(|badge| badge.issuer.url.as_str())
    }

    /// 取出文档中的 badge 子对象
    pub fn badge_document(&self) -> Option<Value> {
        self.data.get("badge").filter(|v| v.is_object()).cloned()
    }

    /// 取出文档中的 badge.issuer 子对象
    pub fn issuer_document(&self) -> Option<Value> {
        self.data
            .get("badge")
            .and_then(|badge| badge.get("issuer"))
            .filter(|v| v.is_object())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analyzed_v1() -> AnalyzedBadgeInstance {
        AnalyzedBadgeInstance {
            data: json!({
                "verify": {"type": "hosted", "url": "https://e.org/a/1"},
                "badge": {
                    "name": "Tester",
                    "issuer": {"name": "Org", "url": "https://e.org/i/1"},
                },
            }),
            instance_url: "https://e.org/a/1".to_string(),
            recipient_id: "earner@example.org".to_string(),
            version: Some(ObiVersion::V1_0),
            version_errors: json!([]),
            errors: vec![],
            valid: true,
            badge: Some(BadgeComponent {
                url: "https://e.org/b/1".to_string(),
                version: Some(ObiVersion::V1_0),
                version_errors: json!([]),
                issuer: IssuerComponent {
                    url: "https://e.org/i/1".to_string(),
                    version: Some(ObiVersion::V1_0),
                    version_errors: json!([]),
                },
            }),
        }
    }

    fn analyzed_legacy() -> AnalyzedBadgeInstance {
        AnalyzedBadgeInstance {
            data: json!({"recipient": "earner@example.org", "badge": {"name": "Old"}}),
            instance_url: "https://e.org/a/legacy".to_string(),
            recipient_id: "earner@example.org".to_string(),
            version: Some(ObiVersion::V0_5),
            version_errors: json!([]),
            errors: vec![],
            valid: true,
            badge: None,
        }
    }

    #[test]
    fn test_component_urls_present_for_v1() {
        let abi = analyzed_v1();
        assert_eq!(abi.badge_url(), Some("https://e.org/b/1"));
        assert_eq!(abi.issuer_url(), Some("https://e.org/i/1"));
    }

    #[test]
    fn test_component_urls_absent_for_legacy() {
        let abi = analyzed_legacy();
        assert_eq!(abi.badge_url(), None);
        assert_eq!(abi.issuer_url(), None);
    }

    #[test]
    fn test_document_accessors() {
        let abi = analyzed_v1();
        assert_eq!(abi.badge_document().unwrap()["name"], "Tester");
        assert_eq!(abi.issuer_document().unwrap()["url"], "https://e.org/i/1");
    }

    #[test]
    fn test_issuer_document_requires_object() {
        let mut abi = analyzed_v1();
        abi.data["badge"]["issuer"] = json!("https://e.org/i/1");
        assert!(abi.issuer_document().is_none());
    }

    #[test]
    fn test_version_serialization() {
        assert_eq!(serde_json::to_value(ObiVersion::V0_5).unwrap(), json!("0.5"));
        assert_eq!(ObiVersion::V1_1.as_str(), "1.1");
    }
}
