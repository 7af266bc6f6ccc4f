mod any;
mod dispatch;
mod scalar;
mod type_id;

pub use any::Any;
pub use dispatch::{FloatOp, TypeOp, dispatch, dispatch_float};
pub use scalar::{HostArray, Scalar};
pub use type_id::{DataType, TypeId};
