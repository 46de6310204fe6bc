//! 游标协议性质验证
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：对每一种标量类型，任意合法值写入后都能按同一类型原样读回；
//!   任意类型在逻辑末尾之后读取都以 `OutOfRange` 失败。
//! - **设计手法 (How)**：以 proptest 生成 `(类型, 值)` 序列，一次写入、一次读回，逐项比对；
//!   越界性质则把游标放在“刚好差一个字节”的位置上读取，
//!   或让长度前缀完整可读而其声明的正文越过逻辑末尾。

use bytes::Bytes;
use proptest::prelude::*;
use spark_blob::{Blob, GrowthPolicy, codes};
use spark_codec_blob::{
    FieldKind, ReadField, ReadItem, ScalarKind, Value, WriteField, WriteValue, read, write,
};

/// 一条待写入的样本：类型、写入值与期望读回的值。
#[derive(Clone, Debug)]
struct Sample {
    kind: ScalarKind,
    input: Input,
    expected: Value,
}

#[derive(Clone, Debug)]
enum Input {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bytes(Vec<u8>),
}

impl Input {
    fn as_write_value(&self) -> WriteValue<'_> {
        match self {
            Self::Int(v) => WriteValue::Int(*v),
            Self::UInt(v) => WriteValue::UInt(*v),
            Self::Float(v) => WriteValue::Float(*v),
            Self::Bytes(v) => WriteValue::Bytes(v),
        }
    }
}

fn int_sample(kind: ScalarKind, v: i64) -> Sample {
    Sample {
        kind,
        input: Input::Int(v),
        expected: Value::Int(v),
    }
}

fn uint_sample(kind: ScalarKind, v: u64) -> Sample {
    Sample {
        kind,
        input: Input::UInt(v),
        expected: Value::UInt(v),
    }
}

fn text_sample(kind: ScalarKind, v: Vec<u8>) -> Sample {
    Sample {
        kind,
        expected: Value::Str(Bytes::from(v.clone())),
        input: Input::Bytes(v),
    }
}

fn samples() -> impl Strategy<Value = Sample> {
    let no_nul = proptest::collection::vec(1u8..=255, 0..32);
    let any_bytes = proptest::collection::vec(any::<u8>(), 0..300);
    prop_oneof![
        no_nul.prop_map(|v| text_sample(ScalarKind::CStr, v)),
        proptest::collection::vec(any::<u8>(), 0..=255)
            .prop_map(|v| text_sample(ScalarKind::U8Str, v)),
        any_bytes
            .clone()
            .prop_map(|v| text_sample(ScalarKind::U16Str, v)),
        any_bytes.prop_map(|v| text_sample(ScalarKind::U32Str, v)),
        any::<u8>().prop_map(|b| text_sample(ScalarKind::Char, vec![b])),
        any::<i8>().prop_map(|v| int_sample(ScalarKind::I8, v.into())),
        any::<u8>().prop_map(|v| uint_sample(ScalarKind::U8, v.into())),
        any::<i16>().prop_map(|v| int_sample(ScalarKind::I16, v.into())),
        any::<u16>().prop_map(|v| uint_sample(ScalarKind::U16, v.into())),
        any::<i32>().prop_map(|v| int_sample(ScalarKind::I32, v.into())),
        any::<u32>().prop_map(|v| uint_sample(ScalarKind::U32, v.into())),
        any::<i64>().prop_map(|v| int_sample(ScalarKind::I64, v)),
        any::<u64>().prop_map(|v| uint_sample(ScalarKind::U64, v)),
        any::<f32>()
            .prop_filter("NaN 不满足相等比较", |v| !v.is_nan())
            .prop_map(|v| Sample {
                kind: ScalarKind::Float,
                input: Input::Float(v.into()),
                expected: Value::Float(v.into()),
            }),
        any::<f64>()
            .prop_filter("NaN 不满足相等比较", |v| !v.is_nan())
            .prop_map(|v| Sample {
                kind: ScalarKind::Double,
                input: Input::Float(v),
                expected: Value::Float(v),
            }),
    ]
}

fn policies() -> impl Strategy<Value = GrowthPolicy> {
    prop_oneof![
        Just(GrowthPolicy::Exact),
        Just(GrowthPolicy::AlwaysReallocate),
        Just(GrowthPolicy::rounded_reserve()),
    ]
}

proptest! {
    #[test]
    fn prop_scalars_round_trip(
        policy in policies(),
        samples in proptest::collection::vec(samples(), 1..16),
    ) {
        let mut blob = Blob::new(1, policy).expect("创建 blob");
        let fields: Vec<WriteField<'_>> = samples
            .iter()
            .map(|s| WriteField::new(s.kind, s.input.as_write_value()))
            .collect();
        let end = write(&mut blob, fields).expect("写入样本");
        prop_assert_eq!(Ok(end), blob.len());

        let values = read(&blob, samples.iter().map(|s| s.kind)).expect("读回样本");
        let expected: Vec<Value> = samples.iter().map(|s| s.expected.clone()).collect();
        prop_assert_eq!(values, expected);
    }

    #[test]
    fn prop_reads_past_length_fail(len in 0usize..24) {
        let blob = if len == 0 {
            Blob::default()
        } else {
            Blob::with_len(len, GrowthPolicy::Exact).expect("创建 blob")
        };
        for kind in ScalarKind::ALL {
            let width = kind.fixed_width().unwrap_or(1);
            let start = (len + 1).saturating_sub(width);
            let err = read(&blob, [ReadField::new(kind).pos(start)]).unwrap_err();
            prop_assert_eq!(err.code(), codes::OUT_OF_RANGE, "类型 {}", kind);
        }
        for kind in [FieldKind::Str, FieldKind::Blob] {
            let items = [ReadItem::from(ReadField::new(kind).len(len + 1))];
            let err = read(&blob, items).unwrap_err();
            prop_assert_eq!(err.code(), codes::OUT_OF_RANGE, "类型 {}", kind);
        }
    }

    #[test]
    fn prop_prefixed_body_past_length_fails(
        body in proptest::collection::vec(any::<u8>(), 0..16),
        missing in 1usize..8,
    ) {
        let declared = body.len() + missing;
        for kind in [ScalarKind::U8Str, ScalarKind::U16Str, ScalarKind::U32Str] {
            let mut data = match kind {
                ScalarKind::U8Str => vec![u8::try_from(declared).expect("声明长度小于 256")],
                ScalarKind::U16Str => {
                    u16::try_from(declared).expect("声明长度可表示").to_ne_bytes().to_vec()
                }
                _ => u32::try_from(declared).expect("声明长度可表示").to_ne_bytes().to_vec(),
            };
            data.extend_from_slice(&body);
            let blob = Blob::from_slice(&data, GrowthPolicy::Exact).expect("创建 blob");
            let err = read(&blob, [kind]).unwrap_err();
            prop_assert_eq!(err.code(), codes::OUT_OF_RANGE, "类型 {}", kind);
        }
    }
}
