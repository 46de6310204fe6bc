//! blob 构造配置。
//!
//! # 教案背景（Why）
//! - 宿主通常在配置文件里统一声明缓冲的初始大小、增长策略与容量上限，
//!   由本模块解析后交给 [`Blob::with_config`](crate::Blob::with_config)；
//! - 解析失败统一映射为 `InvalidArgument`，与直接调用构造函数的失败语义一致。
//!
//! # 配置示例（How）
//! ```toml
//! initial_size = 64
//! policy = "rounded_reserve"
//! reserve_boundary = 1024
//! max_capacity = 1048576
//! ```

use serde::Deserialize;

use crate::{
    error::{BlobError, Result},
    policy::{DEFAULT_RESERVE_BOUNDARY, GrowthPolicy},
};

/// 配置文件中的策略名称；别名兼容历史取值。
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    #[serde(alias = "basic")]
    Exact,
    #[serde(alias = "tight")]
    AlwaysReallocate,
    #[serde(alias = "loose")]
    RoundedReserve,
}

/// blob 构造参数。
///
/// # 契约说明（What）
/// - `initial_size`：初始分配字节数，必须大于 0，默认 8；
/// - `policy`：增长策略名称，默认 `exact`；
/// - `reserve_boundary`：仅对 `rounded_reserve` 生效的取整边界，必须大于 0，默认 4096；
/// - `max_capacity`：容量上限，超过即视为分配失败；缺省表示不设上限。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BlobConfig {
    pub initial_size: usize,
    pub policy: PolicyKind,
    pub reserve_boundary: usize,
    pub max_capacity: Option<usize>,
}

impl BlobConfig {
    /// 未指定大小时使用的初始分配字节数。
    pub const DEFAULT_INITIAL_SIZE: usize = 8;

    /// 从 TOML 文本解析配置并校验。
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|err| {
            BlobError::invalid_argument(format!("invalid blob configuration: {}", err.message()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 校验取值范围：初始大小与取整边界都必须为正，初始大小不得超过容量上限。
    pub fn validate(&self) -> Result<()> {
        if self.initial_size == 0 {
            return Err(BlobError::invalid_argument(
                "initial size must be greater than 0",
            ));
        }
        if let Some(limit) = self.max_capacity
            && self.initial_size > limit
        {
            return Err(BlobError::invalid_argument(format!(
                "initial size {} exceeds max capacity {limit}",
                self.initial_size
            )));
        }
        self.growth_policy().map(|_| ())
    }

    /// 组合出对应的 [`GrowthPolicy`]。
    pub fn growth_policy(&self) -> Result<GrowthPolicy> {
        match self.policy {
            PolicyKind::Exact => Ok(GrowthPolicy::Exact),
            PolicyKind::AlwaysReallocate => Ok(GrowthPolicy::AlwaysReallocate),
            PolicyKind::RoundedReserve => GrowthPolicy::rounded_reserve_with(self.reserve_boundary),
        }
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            initial_size: Self::DEFAULT_INITIAL_SIZE,
            policy: PolicyKind::Exact,
            reserve_boundary: DEFAULT_RESERVE_BOUNDARY,
            max_capacity: None,
        }
    }
}
