//! Static structural description of model types.
//!
//! A [`Shape`] is what the schema synthesizer inspects: the kind of a type, and for
//! structs the ordered list of fields with their naming and descriptor tags. Shapes come
//! from the [`Reflect`] trait for types known to the caller, or from
//! [`crate::type_resolver`] for `struct` definitions found in the scanned sources.
//!
//! ```
//! use openapi_from_annotations::reflect::{FieldShape, Reflect, Shape};
//!
//! struct Widget {
//!     name: String,
//! }
//!
//! impl Reflect for Widget {
//!     fn shape() -> Shape {
//!         Shape::structure("Widget", || {
//!             vec![FieldShape::of::<String>("name").rename("name").describe("desc=Display name")]
//!         })
//!     }
//! }
//!
//! assert_eq!(Widget::shape().type_name(), Some("Widget"));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Kind of a model type, as far as schema synthesis is concerned.
#[derive(Debug, Clone)]
pub enum Shape {
    String,
    Char,
    Int,
    Uint,
    Float,
    Bool,
    /// Vectors, slices, arrays and sets
    Seq(Box<Shape>),
    /// Maps keyed by string-like values
    Map(Box<Shape>),
    Struct(StructShape),
    /// `Option`, `Box`, `Rc`, `Arc` and references
    Indirect(Box<Shape>),
    /// Anything without a better description (enums, foreign types)
    Opaque(String),
}

impl Shape {
    /// A named struct whose fields are produced on demand.
    pub fn structure<F>(name: impl Into<String>, fields: F) -> Self
    where
        F: Fn() -> Vec<FieldShape> + 'static,
    {
        Shape::Struct(StructShape {
            name: name.into(),
            fields: Rc::new(fields),
        })
    }

    /// Strip every layer of indirection.
    pub fn unwrapped(&self) -> &Shape {
        match self {
            Shape::Indirect(inner) => inner.unwrapped(),
            other => other,
        }
    }

    /// Name of the struct behind any indirection, if there is one.
    pub fn type_name(&self) -> Option<&str> {
        match self.unwrapped() {
            Shape::Struct(structure) => Some(&structure.name),
            _ => None,
        }
    }
}

/// A named struct type.
#[derive(Clone)]
pub struct StructShape {
    pub name: String,
    fields: Rc<dyn Fn() -> Vec<FieldShape>>,
}

impl StructShape {
    /// Fields in declaration order.
    pub fn fields(&self) -> Vec<FieldShape> {
        (self.fields)()
    }
}

impl fmt::Debug for StructShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructShape")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// One field of a struct.
///
/// `tag` is the serialization naming tag (`"name"`, `"name,omitempty"`, `"-"`); a field
/// without one is not serialized. `descriptor` holds directives such as `desc=...`.
#[derive(Debug, Clone)]
pub struct FieldShape {
    pub ident: String,
    pub tag: Option<String>,
    pub descriptor: Option<String>,
    pub shape: Shape,
}

impl FieldShape {
    pub fn new(ident: impl Into<String>, shape: Shape) -> Self {
        Self {
            ident: ident.into(),
            tag: None,
            descriptor: None,
            shape,
        }
    }

    pub fn of<T: Reflect + ?Sized>(ident: impl Into<String>) -> Self {
        Self::new(ident, T::shape())
    }

    /// Set the naming tag.
    pub fn rename(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Mark the field as never serialized.
    pub fn skip(mut self) -> Self {
        self.tag = Some("-".to_string());
        self
    }

    pub fn describe(mut self, descriptor: impl Into<String>) -> Self {
        self.descriptor = Some(descriptor.into());
        self
    }

    /// Serialized property name: the tag up to its first comma.
    ///
    /// `None` when the field has no tag, or the name is empty or `-`.
    pub fn serialized_name(&self) -> Option<&str> {
        let tag = self.tag.as_deref()?;
        let name = tag.split(',').next().unwrap_or_default().trim();
        if name.is_empty() || name == "-" {
            None
        } else {
            Some(name)
        }
    }
}

/// Types that can describe their own structure without a value.
pub trait Reflect {
    fn shape() -> Shape;
}

macro_rules! reflect_as {
    ($shape:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                fn shape() -> Shape {
                    $shape
                }
            }
        )+
    };
}

reflect_as!(Shape::String => String, str);
reflect_as!(Shape::Char => char);
reflect_as!(Shape::Int => i8, i16, i32, i64, i128, isize);
reflect_as!(Shape::Uint => u8, u16, u32, u64, u128, usize);
reflect_as!(Shape::Float => f32, f64);
reflect_as!(Shape::Bool => bool);

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> Shape {
        Shape::Seq(Box::new(T::shape()))
    }
}

impl<T: Reflect> Reflect for [T] {
    fn shape() -> Shape {
        Shape::Seq(Box::new(T::shape()))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape() -> Shape {
        Shape::Seq(Box::new(T::shape()))
    }
}

impl<T: Reflect> Reflect for HashSet<T> {
    fn shape() -> Shape {
        Shape::Seq(Box::new(T::shape()))
    }
}

impl<T: Reflect> Reflect for BTreeSet<T> {
    fn shape() -> Shape {
        Shape::Seq(Box::new(T::shape()))
    }
}

impl<K, V: Reflect> Reflect for HashMap<K, V> {
    fn shape() -> Shape {
        Shape::Map(Box::new(V::shape()))
    }
}

impl<K, V: Reflect> Reflect for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Map(Box::new(V::shape()))
    }
}

impl<K, V: Reflect> Reflect for indexmap::IndexMap<K, V> {
    fn shape() -> Shape {
        Shape::Map(Box::new(V::shape()))
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> Shape {
        Shape::Indirect(Box::new(T::shape()))
    }
}

impl<T: Reflect + ?Sized> Reflect for Box<T> {
    fn shape() -> Shape {
        Shape::Indirect(Box::new(T::shape()))
    }
}

impl<T: Reflect + ?Sized> Reflect for Rc<T> {
    fn shape() -> Shape {
        Shape::Indirect(Box::new(T::shape()))
    }
}

impl<T: Reflect + ?Sized> Reflect for Arc<T> {
    fn shape() -> Shape {
        Shape::Indirect(Box::new(T::shape()))
    }
}

impl<T: Reflect + ?Sized> Reflect for &T {
    fn shape() -> Shape {
        Shape::Indirect(Box::new(T::shape()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node {
        #[allow(dead_code)]
        children: Vec<Node>,
    }

    impl Reflect for Node {
        fn shape() -> Shape {
            Shape::structure("Node", || vec![FieldShape::of::<Vec<Node>>("children").rename("children")])
        }
    }

    #[test]
    fn test_serialized_name() {
        let field = FieldShape::of::<String>("name");
        assert_eq!(field.serialized_name(), None);
        assert_eq!(field.clone().rename("name").serialized_name(), Some("name"));
        assert_eq!(
            field.clone().rename("display_name,omitempty").serialized_name(),
            Some("display_name")
        );
        assert_eq!(field.clone().rename("").serialized_name(), None);
        assert_eq!(field.skip().serialized_name(), None);
    }

    #[test]
    fn test_indirection_is_unwrapped() {
        let shape = <Option<Box<Node>>>::shape();
        assert!(matches!(shape, Shape::Indirect(_)));
        assert_eq!(shape.type_name(), Some("Node"));
        assert!(<Option<i64>>::shape().type_name().is_none());
    }

    #[test]
    fn test_collection_shapes() {
        assert!(matches!(<Vec<u8>>::shape(), Shape::Seq(inner) if matches!(*inner, Shape::Uint)));
        assert!(matches!(<[bool; 4]>::shape(), Shape::Seq(_)));
        assert!(matches!(<HashMap<String, f64>>::shape(), Shape::Map(inner) if matches!(*inner, Shape::Float)));
        assert!(matches!(<&str>::shape(), Shape::Indirect(_)));
    }

    #[test]
    fn test_self_referential_shape() {
        let Shape::Struct(node) = Node::shape() else {
            panic!("expected struct shape");
        };
        let fields = node.fields();

        assert_eq!(fields.len(), 1);
        match &fields[0].shape {
            Shape::Seq(item) => assert_eq!(item.type_name(), Some("Node")),
            other => panic!("unexpected shape {:?}", other),
        }
    }
}
