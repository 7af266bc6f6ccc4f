use num_traits::NumCast;

use super::type_id::{DataType, TypeId};

/// A single value of one of the native element types.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
}

/// A borrowed host array of one of the native element types.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostArray<'a> {
    Int8(&'a [i8]),
    Int16(&'a [i16]),
    Int32(&'a [i32]),
    Int64(&'a [i64]),
    UInt8(&'a [u8]),
    UInt16(&'a [u16]),
    UInt32(&'a [u32]),
    UInt64(&'a [u64]),
    Float32(&'a [f32]),
    Float64(&'a [f64]),
}

macro_rules! for_each_variant {
    ($enum:ident, $value:expr, $binding:ident => $body:expr) => {
        match $value {
            $enum::Int8($binding) => $body,
            $enum::Int16($binding) => $body,
            $enum::Int32($binding) => $body,
            $enum::Int64($binding) => $body,
            $enum::UInt8($binding) => $body,
            $enum::UInt16($binding) => $body,
            $enum::UInt32($binding) => $body,
            $enum::UInt64($binding) => $body,
            $enum::Float32($binding) => $body,
            $enum::Float64($binding) => $body,
        }
    };
}

impl Scalar {
    pub fn type_id(&self) -> TypeId {
        for_each_variant!(Scalar, self, v => type_of(v))
    }

    /// Exact-type extraction: `None` when the scalar holds another type.
    pub fn get<T: DataType>(&self) -> Option<T> {
        if self.type_id() != T::TYPE_ID {
            return None;
        }
        self.cast()
    }

    /// Numeric conversion to `T`, `None` when the value is not representable.
    pub fn cast<T: DataType>(&self) -> Option<T> {
        for_each_variant!(Scalar, *self, v => <T as NumCast>::from(v))
    }
}

impl<T: DataType> From<T> for Scalar {
    fn from(value: T) -> Self {
        value.into_scalar()
    }
}

impl<'a> HostArray<'a> {
    pub fn new<T: DataType>(slice: &'a [T]) -> Self {
        T::host_array(slice)
    }

    pub fn type_id(&self) -> TypeId {
        for_each_variant!(HostArray, self, v => slice_type_of(v))
    }

    pub fn len(&self) -> usize {
        for_each_variant!(HostArray, self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Typed view of the array, `None` when `T` is not the element type.
    pub fn as_slice<T: DataType>(&self) -> Option<&'a [T]> {
        if self.type_id() != T::TYPE_ID {
            return None;
        }
        Some(for_each_variant!(HostArray, *self, v => bytemuck::cast_slice::<_, T>(v)))
    }
}

fn type_of<T: DataType>(_: &T) -> TypeId {
    T::TYPE_ID
}

fn slice_type_of<T: DataType>(_: &&[T]) -> TypeId {
    T::TYPE_ID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_exact_and_cast() {
        let s = Scalar::from(7i32);
        assert_eq!(s.type_id(), TypeId::Int32);
        assert_eq!(s.get::<i32>(), Some(7));
        assert_eq!(s.get::<i64>(), None);
        assert_eq!(s.cast::<f64>(), Some(7.0));
        assert_eq!(Scalar::from(-1i8).cast::<u8>(), None);
    }

    #[test]
    fn test_host_array_view() {
        let data = [1.5f32, 2.5];
        let array = HostArray::new(&data);
        assert_eq!(array.type_id(), TypeId::Float32);
        assert_eq!(array.len(), 2);
        assert_eq!(array.as_slice::<f32>(), Some(&data[..]));
        assert!(array.as_slice::<u32>().is_none());
    }
}
