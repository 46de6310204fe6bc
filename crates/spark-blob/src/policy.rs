use core::{fmt, num::NonZeroUsize, str::FromStr};

use crate::error::{BlobError, Result};

/// `RoundedReserve` 策略的默认对齐边界（4 KiB）。
pub const DEFAULT_RESERVE_BOUNDARY: usize = 4096;

/// blob 当前的容量足迹，增长策略据此给出决策。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Footprint {
    /// 逻辑长度。
    pub length: usize,
    /// 已分配容量。
    pub capacity: usize,
}

/// 增长策略对一次容量请求给出的决策。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapacityPlan {
    /// 保持现有存储不动，容量不变。
    Keep,
    /// 重新分配到 `target` 字节。
    ///
    /// `keep_on_failure` 为真时，若分配失败但现有容量已覆盖请求，仍视为成功并保留原容量。
    Reallocate {
        target: usize,
        keep_on_failure: bool,
    },
}

/// `GrowthPolicy` 决定 blob 在调整大小时如何改变容量。
///
/// # 设计背景（Why）
/// - 不同调用方对内存的诉求不同：摘要输出等定长场景希望“分多少用多少”，
///   流式写入场景则希望预留余量以减少反复重新分配。
/// - 使用封闭枚举而非函数指针，新增策略时编译器会强制覆盖所有分支。
///
/// # 逻辑解析（How）
/// - [`plan`](Self::plan) 只做纯计算，不触碰内存；真正的分配由 blob 核心执行，
///   因此策略可以被独立测试。
///
/// # 契约说明（What）
/// - `Exact`：请求小于逻辑长度或为 0 时保持不变，否则精确重新分配到请求大小；
/// - `AlwaysReallocate`：请求为 0 时保持不变，否则无论增减都精确重新分配；
/// - `RoundedReserve`：保持条件同 `Exact`，增长时把请求向上取整到 `boundary` 的整数倍。
/// - 策略在 blob 创建时确定，之后不可更改。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GrowthPolicy {
    /// 仅在增长时精确分配。
    #[default]
    Exact,
    /// 每次非零请求都精确重新分配，内存开销最小、分配次数最多。
    AlwaysReallocate,
    /// 按边界向上取整预留容量。
    RoundedReserve { boundary: NonZeroUsize },
}

impl GrowthPolicy {
    /// 以默认 4 KiB 边界构造 `RoundedReserve`。
    pub const fn rounded_reserve() -> Self {
        Self::RoundedReserve {
            boundary: NonZeroUsize::new(DEFAULT_RESERVE_BOUNDARY).unwrap(),
        }
    }

    /// 以自定义边界构造 `RoundedReserve`，边界为 0 时返回 `InvalidArgument`。
    pub fn rounded_reserve_with(boundary: usize) -> Result<Self> {
        NonZeroUsize::new(boundary)
            .map(|boundary| Self::RoundedReserve { boundary })
            .ok_or_else(|| BlobError::invalid_argument("reserve boundary must be greater than 0"))
    }

    /// 策略的规范名称，与配置文件及 [`FromStr`] 使用的名称一致。
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::AlwaysReallocate => "always_reallocate",
            Self::RoundedReserve { .. } => "rounded_reserve",
        }
    }

    /// 针对一次容量请求给出决策。
    pub fn plan(&self, footprint: Footprint, requested: usize) -> CapacityPlan {
        match self {
            Self::Exact => {
                if requested == 0 || requested < footprint.length {
                    CapacityPlan::Keep
                } else {
                    CapacityPlan::Reallocate {
                        target: requested,
                        keep_on_failure: false,
                    }
                }
            }
            Self::AlwaysReallocate => {
                if requested == 0 {
                    CapacityPlan::Keep
                } else {
                    CapacityPlan::Reallocate {
                        target: requested,
                        keep_on_failure: false,
                    }
                }
            }
            Self::RoundedReserve { boundary } => {
                if requested == 0 || requested < footprint.length {
                    CapacityPlan::Keep
                } else {
                    // 取整溢出时退回精确请求，交由分配器判定能否满足。
                    let target = requested
                        .checked_next_multiple_of(boundary.get())
                        .unwrap_or(requested);
                    CapacityPlan::Reallocate {
                        target,
                        keep_on_failure: true,
                    }
                }
            }
        }
    }
}

impl fmt::Display for GrowthPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundedReserve { boundary } => write!(f, "{}({})", self.name(), boundary),
            _ => f.write_str(self.name()),
        }
    }
}

impl FromStr for GrowthPolicy {
    type Err = BlobError;

    /// 解析策略名称；同时接受 `basic`/`tight`/`loose` 三个历史别名。
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" | "basic" => Ok(Self::Exact),
            "always_reallocate" | "tight" => Ok(Self::AlwaysReallocate),
            "rounded_reserve" | "loose" => Ok(Self::rounded_reserve()),
            other => Err(BlobError::invalid_argument(format!(
                "allocation mode '{other}' is not supported; valid values are 'exact', 'always_reallocate', 'rounded_reserve'"
            ))),
        }
    }
}
