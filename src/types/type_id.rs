use std::fmt::{self, Debug, Display};

use bytemuck::Pod;
use num_traits::NumCast;

use super::scalar::{HostArray, Scalar};

/// Element types a buffer may hold.
///
/// `Custom` tags values with no native mapping. It is never dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TypeId {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    #[default]
    Custom,
}

impl TypeId {
    pub const NATIVE: [TypeId; 10] = [
        TypeId::Int8,
        TypeId::Int16,
        TypeId::Int32,
        TypeId::Int64,
        TypeId::UInt8,
        TypeId::UInt16,
        TypeId::UInt32,
        TypeId::UInt64,
        TypeId::Float32,
        TypeId::Float64,
    ];

    pub fn of<T: DataType>() -> Self {
        T::TYPE_ID
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeId::Int8 => "int8",
            TypeId::Int16 => "int16",
            TypeId::Int32 => "int32",
            TypeId::Int64 => "int64",
            TypeId::UInt8 => "uint8",
            TypeId::UInt16 => "uint16",
            TypeId::UInt32 => "uint32",
            TypeId::UInt64 => "uint64",
            TypeId::Float32 => "float32",
            TypeId::Float64 => "float64",
            TypeId::Custom => "custom",
        }
    }

    /// Element size in bytes, `None` for `Custom`.
    pub fn size_in_bytes(self) -> Option<usize> {
        match self {
            TypeId::Int8 | TypeId::UInt8 => Some(1),
            TypeId::Int16 | TypeId::UInt16 => Some(2),
            TypeId::Int32 | TypeId::UInt32 | TypeId::Float32 => Some(4),
            TypeId::Int64 | TypeId::UInt64 | TypeId::Float64 => Some(8),
            TypeId::Custom => None,
        }
    }

    pub fn is_floating(self) -> bool {
        matches!(self, TypeId::Float32 | TypeId::Float64)
    }
}

impl Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A primitive numeric type with a native [`TypeId`].
pub trait DataType:
    Pod + NumCast + Default + PartialEq + PartialOrd + Debug + Send + Sync + 'static
{
    const TYPE_ID: TypeId;

    fn into_scalar(self) -> Scalar;

    fn host_array(slice: &[Self]) -> HostArray<'_>;
}

macro_rules! impl_data_type {
    ($($ty:ty => $id:ident),* $(,)?) => {
        $(
            impl DataType for $ty {
                const TYPE_ID: TypeId = TypeId::$id;

                fn into_scalar(self) -> Scalar {
                    Scalar::$id(self)
                }

                fn host_array(slice: &[Self]) -> HostArray<'_> {
                    HostArray::$id(slice)
                }
            }
        )*
    };
}

impl_data_type!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
);
