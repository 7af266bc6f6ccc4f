use std::any::{Any as StdAny, type_name};
use std::fmt;

trait AnyValue: StdAny + Send + Sync {
    fn clone_box(&self) -> Box<dyn AnyValue>;
    fn as_std(&self) -> &dyn StdAny;
    fn as_std_mut(&mut self) -> &mut dyn StdAny;
    fn type_name(&self) -> &'static str;
}

impl<T: Clone + Send + Sync + 'static> AnyValue for T {
    fn clone_box(&self) -> Box<dyn AnyValue> {
        Box::new(self.clone())
    }

    fn as_std(&self) -> &dyn StdAny {
        self
    }

    fn as_std_mut(&mut self) -> &mut dyn StdAny {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Owns at most one value of any clonable type.
///
/// Cloning an `Any` clones the held value. Typed access through [`Any::get`]
/// is checked and panics on a type mismatch, callers that cannot guarantee
/// the type use [`Any::check`] or [`Any::try_get`] first.
#[derive(Default)]
pub struct Any {
    value: Option<Box<dyn AnyValue>>,
}

impl Any {
    pub fn new<T: Clone + Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn check<T: 'static>(&self) -> bool {
        self.try_get::<T>().is_some()
    }

    pub fn try_get<T: 'static>(&self) -> Option<&T> {
        self.value.as_deref()?.as_std().downcast_ref::<T>()
    }

    pub fn try_get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.value.as_deref_mut()?.as_std_mut().downcast_mut::<T>()
    }

    pub fn get<T: 'static>(&self) -> &T {
        match self.try_get::<T>() {
            Some(value) => value,
            None => panic!(
                "Any holds {} but {} was requested",
                self.type_name(),
                type_name::<T>()
            ),
        }
    }

    pub fn get_mut<T: 'static>(&mut self) -> &mut T {
        let held = self.type_name();
        match self.try_get_mut::<T>() {
            Some(value) => value,
            None => panic!("Any holds {} but {} was requested", held, type_name::<T>()),
        }
    }

    /// Replaces the held value, dropping the previous one first.
    pub fn set<T: Clone + Send + Sync + 'static>(&mut self, value: T) {
        self.value = None;
        self.value = Some(Box::new(value));
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn type_name(&self) -> &'static str {
        self.value.as_deref().map_or("nothing", |v| v.type_name())
    }
}

impl Clone for Any {
    fn clone(&self) -> Self {
        Self {
            value: self.value.as_deref().map(|v| v.clone_box()),
        }
    }
}

impl fmt::Debug for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Any")
            .field("holds", &self.type_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, TypeId, TypeOp, dispatch};

    struct RoundTrip;

    impl TypeOp for RoundTrip {
        type Output = ();

        fn call<T: DataType>(self) {
            let v: T = num_traits::cast(42u8).unwrap();
            let any = Any::new(v);
            assert_eq!(*any.get::<T>(), v);
            assert!(any.check::<T>());

            for other in TypeId::NATIVE.iter().filter(|&&id| id != T::TYPE_ID) {
                assert!(!dispatch(*other, Probe(&any)).unwrap());
            }
        }
    }

    struct Probe<'a>(&'a Any);

    impl TypeOp for Probe<'_> {
        type Output = bool;

        fn call<T: DataType>(self) -> bool {
            self.0.check::<T>()
        }
    }

    #[test]
    fn test_round_trip_for_every_native_type() {
        for id in TypeId::NATIVE {
            dispatch(id, RoundTrip).unwrap();
        }
    }

    #[test]
    fn test_empty_and_reassign() {
        let mut any = Any::default();
        assert!(any.is_empty());
        assert!(!any.check::<i32>());

        any.set(5i32);
        assert!(!any.is_empty());
        any.set(String::from("text"));
        assert!(!any.check::<i32>());
        assert_eq!(any.get::<String>(), "text");
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = Any::new(vec![1, 2, 3]);
        let copy = original.clone();
        original.get_mut::<Vec<i32>>().push(4);
        assert_eq!(copy.get::<Vec<i32>>(), &vec![1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "was requested")]
    fn test_wrong_type_panics() {
        let any = Any::new(1.0f32);
        let _ = any.get::<f64>();
    }
}
