use num_traits::Float;

use crate::error::{Error, Result};

use super::type_id::{DataType, TypeId};

/// An operation generic over the element type, selected at runtime by a
/// [`TypeId`] through [`dispatch`].
pub trait TypeOp {
    type Output;

    fn call<T: DataType>(self) -> Self::Output;
}

/// Like [`TypeOp`] but restricted to floating point element types.
pub trait FloatOp {
    type Output;

    fn call<T: DataType + Float>(self) -> Self::Output;
}

pub fn dispatch<Op: TypeOp>(type_id: TypeId, op: Op) -> Result<Op::Output> {
    Ok(match type_id {
        TypeId::Int8 => op.call::<i8>(),
        TypeId::Int16 => op.call::<i16>(),
        TypeId::Int32 => op.call::<i32>(),
        TypeId::Int64 => op.call::<i64>(),
        TypeId::UInt8 => op.call::<u8>(),
        TypeId::UInt16 => op.call::<u16>(),
        TypeId::UInt32 => op.call::<u32>(),
        TypeId::UInt64 => op.call::<u64>(),
        TypeId::Float32 => op.call::<f32>(),
        TypeId::Float64 => op.call::<f64>(),
        TypeId::Custom => {
            return Err(Error::incorrect_parameter(
                "type 'custom' has no native mapping and cannot be dispatched",
            )
            .into());
        }
    })
}

pub fn dispatch_float<Op: FloatOp>(type_id: TypeId, op: Op) -> Result<Op::Output> {
    match type_id {
        TypeId::Float32 => Ok(op.call::<f32>()),
        TypeId::Float64 => Ok(op.call::<f64>()),
        other => Err(Error::incorrect_parameter(format!(
            "operation requires a floating point type, got '{}'",
            other
        ))
        .into()),
    }
}
