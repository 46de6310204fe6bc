use core::{fmt, str::FromStr};

use sha2::{Digest, Sha256};

use crate::{
    blob::Blob,
    error::{BlobError, Result},
    policy::GrowthPolicy,
};

/// SHA-256 摘要长度（字节）。
pub const SHA256_LEN: usize = 32;

/// 支持的摘要算法。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha256,
}

impl DigestAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// 摘要输出长度。
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha256 => SHA256_LEN,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = BlobError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha256" => Ok(Self::Sha256),
            other => Err(BlobError::invalid_argument(format!(
                "unsupported hash algorithm '{other}'"
            ))),
        }
    }
}

/// 对 `src` 的 `[start, start + len)` 计算摘要，结果写入一个新建的定长 blob。
///
/// 输出 blob 采用 `AlwaysReallocate` 策略，容量与摘要长度一致；`len` 缺省时取到逻辑末尾。
pub fn digest(
    algorithm: DigestAlgorithm,
    src: &Blob,
    start: usize,
    len: Option<usize>,
) -> Result<Blob> {
    let input = src.range(start, len)?;
    let mut out = Blob::with_len(algorithm.output_len(), GrowthPolicy::AlwaysReallocate)?;
    match algorithm {
        DigestAlgorithm::Sha256 => {
            out.as_bytes_mut()?
                .copy_from_slice(Sha256::digest(input).as_slice());
        }
    }
    Ok(out)
}
