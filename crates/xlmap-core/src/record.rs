//! Record descriptors
//!
//! A record is a plain Rust struct whose properties define the column schema
//! of a cell array. Each record type describes itself once through the
//! [`Record`] trait; the resulting [`RecordType`] is cached in a process-wide
//! registry keyed by [`TypeId`].
//!
//! ```rust
//! use xlmap_core::{Record, RecordBuilder, RecordType};
//!
//! #[derive(Default)]
//! struct Quote {
//!     symbol: String,
//!     price: f64,
//! }
//!
//! impl Record for Quote {
//!     fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
//!         builder
//!             .property("Symbol", |q| q.symbol.clone(), |q, v| q.symbol = v)
//!             .property("Price", |q| q.price, |q, v| q.price = v)
//!             .with_default()
//!     }
//! }
//!
//! let ty = RecordType::of::<Quote>();
//! assert_eq!(ty.name(), "Quote");
//! assert_eq!(ty.declared_properties().count(), 2);
//! ```

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::types::{Field, Value, ValueType};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

/// A plain data type usable as a row of a cell array
pub trait Record: Sized + 'static {
    /// Declare the record's properties and constructors
    fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self>;
}

type Getter = Arc<dyn Fn(&dyn Any) -> Option<CellValue> + Send + Sync>;
type Setter = Arc<dyn Fn(&mut dyn Any, Value) -> Result<()> + Send + Sync>;
type Factory = Arc<dyn Fn(Vec<Value>) -> Result<Box<dyn Any>> + Send + Sync>;
type DefaultFactory = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;

/// Where a property comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyOrigin {
    /// Declared directly on the record
    Declared,
    /// Supplied by an embedded base record
    Inherited,
}

/// One property of a record type
#[derive(Clone)]
pub struct PropertyDescriptor {
    name: String,
    value_type: ValueType,
    origin: PropertyOrigin,
    getter: Getter,
    setter: Option<Setter>,
}

impl PropertyDescriptor {
    /// Property name, as used for header matching
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the property
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn origin(&self) -> PropertyOrigin {
        self.origin
    }

    /// Whether the property is declared directly on the record
    pub fn is_declared(&self) -> bool {
        self.origin == PropertyOrigin::Declared
    }

    /// Whether the property has a setter
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Read the property as a cell value
    pub fn get(&self, record: &RecordValue) -> Result<CellValue> {
        (self.getter)(record.inner.as_ref()).ok_or_else(|| {
            Error::argument_type(self.owner_hint(), record.record_type().name())
        })
    }

    /// Write the property from a value of its declared type
    pub fn set(&self, record: &mut RecordValue, value: Value) -> Result<()> {
        match &self.setter {
            Some(setter) => setter(record.inner.as_mut(), value),
            None => Err(Error::ReadOnlyProperty(self.name.clone())),
        }
    }

    fn owner_hint(&self) -> String {
        format!("record with property {}", self.name)
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("origin", &self.origin)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// A positional constructor
#[derive(Clone)]
pub struct Constructor {
    parameters: Vec<ValueType>,
    factory: Factory,
}

impl Constructor {
    /// Parameter types in declared order
    pub fn parameters(&self) -> &[ValueType] {
        &self.parameters
    }

    /// Whether the parameter list equals `types`, in order
    pub fn accepts(&self, types: &[&ValueType]) -> bool {
        self.parameters.len() == types.len()
            && self.parameters.iter().zip(types).all(|(p, t)| p == *t)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Argument lists accepted by positional constructors
///
/// Implemented for tuples of [`Field`] types.
pub trait ConstructorArgs: Sized + 'static {
    /// Declared parameter types, in order
    fn parameter_types() -> Vec<ValueType>;

    /// Unpack already-converted values
    fn from_values(values: Vec<Value>) -> Result<Self>;
}

macro_rules! impl_constructor_args {
    ($len:expr; $($name:ident),+) => {
        impl<$($name: Field),+> ConstructorArgs for ($($name,)+) {
            fn parameter_types() -> Vec<ValueType> {
                vec![$($name::value_type()),+]
            }

            fn from_values(values: Vec<Value>) -> Result<Self> {
                if values.len() != $len {
                    return Err(Error::ArgumentCount {
                        function: "constructor".to_string(),
                        expected: $len,
                        actual: values.len(),
                    });
                }
                let mut values = values.into_iter();
                Ok(($(
                    $name::from_value(values.next().unwrap_or(Value::Empty))?,
                )+))
            }
        }
    };
}

impl_constructor_args!(1; A);
impl_constructor_args!(2; A, B);
impl_constructor_args!(3; A, B, C);
impl_constructor_args!(4; A, B, C, D);
impl_constructor_args!(5; A, B, C, D, E);
impl_constructor_args!(6; A, B, C, D, E, F);
impl_constructor_args!(7; A, B, C, D, E, F, G);
impl_constructor_args!(8; A, B, C, D, E, F, G, H);

/// Collects the shape of a record type
pub struct RecordBuilder<T> {
    name: String,
    properties: Vec<PropertyDescriptor>,
    constructors: Vec<Constructor>,
    default_constructor: Option<DefaultFactory>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> RecordBuilder<T> {
    fn new() -> Self {
        Self {
            name: short_type_name(std::any::type_name::<T>()).to_string(),
            properties: Vec::new(),
            constructors: Vec::new(),
            default_constructor: None,
            _marker: PhantomData,
        }
    }

    /// Override the record's display name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a readable and writable property
    pub fn property<F, G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        F: Field,
        G: Fn(&T) -> F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        self.push(name.into(), PropertyOrigin::Declared, get, Some(set))
    }

    /// Add a property without a setter
    pub fn read_only<F, G>(self, name: impl Into<String>, get: G) -> Self
    where
        F: Field,
        G: Fn(&T) -> F + Send + Sync + 'static,
    {
        self.push::<F, G, fn(&mut T, F)>(name.into(), PropertyOrigin::Declared, get, None)
    }

    /// Add a property supplied by an embedded base record
    ///
    /// Inherited properties are part of the record's shape but are not used
    /// as columns.
    pub fn inherited<F, G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        F: Field,
        G: Fn(&T) -> F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        self.push(name.into(), PropertyOrigin::Inherited, get, Some(set))
    }

    /// Add a positional constructor
    ///
    /// The tuple type `A` declares the parameter types.
    pub fn constructor<A, C>(mut self, construct: C) -> Self
    where
        A: ConstructorArgs,
        C: Fn(A) -> T + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |values: Vec<Value>| {
            let args = A::from_values(values)?;
            Ok(Box::new(construct(args)) as Box<dyn Any>)
        });
        self.constructors.push(Constructor {
            parameters: A::parameter_types(),
            factory,
        });
        self
    }

    /// Add a default constructor
    pub fn default_constructor<C>(mut self, construct: C) -> Self
    where
        C: Fn() -> T + Send + Sync + 'static,
    {
        self.default_constructor = Some(Arc::new(move || Box::new(construct()) as Box<dyn Any>));
        self
    }

    fn push<F, G, S>(mut self, name: String, origin: PropertyOrigin, get: G, set: Option<S>) -> Self
    where
        F: Field,
        G: Fn(&T) -> F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        let getter: Getter =
            Arc::new(move |any: &dyn Any| any.downcast_ref::<T>().map(|r| get(r).to_cell()));
        let setter = set.map(|set| -> Setter {
            Arc::new(move |any: &mut dyn Any, value: Value| {
                let record = any.downcast_mut::<T>().ok_or_else(|| {
                    Error::argument_type(short_type_name(std::any::type_name::<T>()), "record")
                })?;
                set(record, F::from_value(value)?);
                Ok(())
            })
        });
        self.properties.push(PropertyDescriptor {
            name,
            value_type: F::value_type(),
            origin,
            getter,
            setter,
        });
        self
    }

    fn build(self) -> RecordDescriptor {
        RecordDescriptor {
            type_id: TypeId::of::<T>(),
            name: self.name,
            properties: self.properties,
            constructors: self.constructors,
            default_constructor: self.default_constructor,
        }
    }
}

impl<T: Record + Default> RecordBuilder<T> {
    /// Use [`Default::default`] as the default constructor
    pub fn with_default(self) -> Self {
        self.default_constructor(T::default)
    }
}

/// Strip module path and generic arguments from a type name
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

struct RecordDescriptor {
    type_id: TypeId,
    name: String,
    properties: Vec<PropertyDescriptor>,
    constructors: Vec<Constructor>,
    default_constructor: Option<DefaultFactory>,
}

/// The shape of a record type: properties and constructors
///
/// Cheap to clone. Two handles are equal when they describe the same Rust
/// type.
#[derive(Clone)]
pub struct RecordType(Arc<RecordDescriptor>);

static REGISTRY: Lazy<RwLock<AHashMap<TypeId, RecordType>>> =
    Lazy::new(|| RwLock::new(AHashMap::new()));

impl RecordType {
    /// Look up (or build and cache) the descriptor for `T`
    pub fn of<T: Record>() -> Self {
        let key = TypeId::of::<T>();
        if let Some(found) = REGISTRY
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return found.clone();
        }

        // Described outside the lock; a concurrent builder may win the insert.
        let built = RecordType(Arc::new(T::describe(RecordBuilder::new()).build()));
        tracing::trace!(record = %built.name(), "registered record type");
        REGISTRY
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(built)
            .clone()
    }

    /// Display name of the record
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn type_id(&self) -> TypeId {
        self.0.type_id
    }

    /// All properties, in declared order
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.0.properties
    }

    /// Properties declared directly on the record, in declared order
    pub fn declared_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> + '_ {
        self.0.properties.iter().filter(|p| p.is_declared())
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.0.constructors
    }

    /// Find a constructor whose parameter list equals `types`, in order
    pub fn find_constructor(&self, types: &[&ValueType]) -> Option<&Constructor> {
        self.0.constructors.iter().find(|c| c.accepts(types))
    }

    pub fn has_default_constructor(&self) -> bool {
        self.0.default_constructor.is_some()
    }

    /// Build a record through a positional constructor
    pub fn construct(&self, constructor: &Constructor, args: Vec<Value>) -> Result<RecordValue> {
        let inner = (constructor.factory)(args)?;
        Ok(RecordValue {
            record_type: self.clone(),
            inner,
        })
    }

    /// Build a record through its default constructor
    pub fn construct_default(&self) -> Result<RecordValue> {
        let factory = self
            .0
            .default_constructor
            .as_ref()
            .ok_or_else(|| Error::NoConstructor(self.name().to_string()))?;
        Ok(RecordValue {
            record_type: self.clone(),
            inner: factory(),
        })
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.0.type_id == other.0.type_id
    }
}

impl Eq for RecordType {}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.0.name)
            .field("properties", &self.0.properties)
            .field("constructors", &self.0.constructors.len())
            .field("default_constructor", &self.has_default_constructor())
            .finish()
    }
}

/// A type-erased record instance
pub struct RecordValue {
    record_type: RecordType,
    inner: Box<dyn Any>,
}

impl RecordValue {
    /// Wrap a typed record
    pub fn new<T: Record>(record: T) -> Self {
        Self {
            record_type: RecordType::of::<T>(),
            inner: Box::new(record),
        }
    }

    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Borrow as `T`, if that is the record's type
    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Unwrap as `T`, returning the value unchanged on a type mismatch
    pub fn downcast<T: Record>(self) -> std::result::Result<T, Self> {
        let RecordValue { record_type, inner } = self;
        inner
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|inner| RecordValue { record_type, inner })
    }
}

impl fmt::Debug for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.record_type.name());
        for property in self.record_type.properties() {
            match property.get(self) {
                Ok(cell) => s.field(property.name(), &cell),
                Err(_) => s.field(property.name(), &"?"),
            };
        }
        s.finish()
    }
}
