//! Component metadata
//!
//! A [`ComponentType`] answers every structural question the container asks
//! about a type: is it a managed component, which fields want injection, and
//! which constructors exist. Nothing outside this module touches `TypeId`s or
//! downcasts directly; the rest of the pipeline goes through these descriptors.
//!
//! Descriptors are normally generated by `#[derive(Component)]`, but they can
//! be built by hand with [`ComponentType::builder`].

use crate::registry::Bean;
use crate::{DiError, Result};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An owned, type-erased instance that has not been registered yet
pub type Instance = Box<dyn Any + Send + Sync>;

/// A registered, shared, type-erased instance
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// Converts a shared instance into a boxed `Arc<Target>` for one declared type
pub type CastFn = fn(SharedInstance) -> Option<Box<dyn Any + Send + Sync>>;

/// Writes a resolved bean into one field of a freshly constructed instance
pub type InjectFn = fn(&mut (dyn Any + Send + Sync), &Bean) -> Result<()>;

/// Invokes a constructor with already-resolved arguments
pub type ConstructFn = fn(&[Bean]) -> Result<Instance>;

// =============================================================================
// TypeKey
// =============================================================================

/// Identity of a declared type.
///
/// Works for concrete types as well as trait objects such as `dyn Notifier`.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for `T`
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Human-readable type name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// =============================================================================
// View - one declared type an instance is assignable to
// =============================================================================

/// A declared type that instances of a component are assignable to.
///
/// Every component has an identity view for its own type; `provides(dyn Trait)`
/// adds one view per implemented trait object.
#[derive(Clone, Copy)]
pub struct View {
    key: TypeKey,
    cast: CastFn,
}

impl View {
    /// View of an instance as its own concrete type
    #[inline]
    pub fn identity<T: Send + Sync + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            cast: cast_identity::<T>,
        }
    }

    /// View as `Target`, typically a trait object
    ///
    /// `cast` must return a boxed `Arc<Target>`.
    #[inline]
    pub fn new<Target: ?Sized + 'static>(cast: CastFn) -> Self {
        Self {
            key: TypeKey::of::<Target>(),
            cast,
        }
    }

    /// The declared type this view exposes
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub(crate) fn cast(&self, instance: &SharedInstance) -> Option<Box<dyn Any + Send + Sync>> {
        (self.cast)(Arc::clone(instance))
    }
}

fn cast_identity<T: Send + Sync + 'static>(
    instance: SharedInstance,
) -> Option<Box<dyn Any + Send + Sync>> {
    instance
        .downcast::<T>()
        .ok()
        .map(|typed| Box::new(typed) as Box<dyn Any + Send + Sync>)
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("View").field(&self.key).finish()
    }
}

// =============================================================================
// Fields and constructors
// =============================================================================

/// A declared field, injectable or not
#[derive(Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    ty: TypeKey,
    injector: Option<InjectFn>,
}

impl FieldDescriptor {
    /// A field the container never touches
    pub fn plain(name: &'static str, ty: TypeKey) -> Self {
        Self {
            name,
            ty,
            injector: None,
        }
    }

    /// A field marked for injection
    pub fn injectable(name: &'static str, ty: TypeKey, injector: InjectFn) -> Self {
        Self {
            name,
            ty,
            injector: Some(injector),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type; for injectable fields this is the dependency type
    pub fn ty(&self) -> TypeKey {
        self.ty
    }

    pub fn is_injectable(&self) -> bool {
        self.injector.is_some()
    }

    /// Assign `bean` into this field of `target`
    pub fn inject(&self, target: &mut (dyn Any + Send + Sync), bean: &Bean) -> Result<()> {
        match self.injector {
            Some(injector) => injector(target, bean),
            None => Err(DiError::InjectionFailed {
                field: self.name,
                reason: "field is not marked for injection".into(),
            }),
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("injectable", &self.is_injectable())
            .finish()
    }
}

/// A declared constructor
#[derive(Clone)]
pub struct ConstructorDescriptor {
    injectable: bool,
    params: Vec<TypeKey>,
    invoke: ConstructFn,
}

impl ConstructorDescriptor {
    pub fn new(injectable: bool, params: Vec<TypeKey>, invoke: ConstructFn) -> Self {
        Self {
            injectable,
            params,
            invoke,
        }
    }

    /// Zero-argument constructor backed by `Default`
    pub fn default_of<T: Default + Send + Sync + 'static>() -> Self {
        Self::new(false, Vec::new(), construct_default::<T>)
    }

    /// Injectable constructor backed by the type's [`Construct`] impl
    pub fn injected<T: Construct>() -> Self {
        Self::new(true, T::Args::param_types(), construct_injected::<T>)
    }

    pub fn is_injectable(&self) -> bool {
        self.injectable
    }

    pub fn is_zero_arg(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter types in declaration order
    pub fn params(&self) -> &[TypeKey] {
        &self.params
    }

    /// Call the constructor; `args` must line up with [`params`](Self::params)
    pub fn invoke(&self, args: &[Bean]) -> Result<Instance> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("injectable", &self.injectable)
            .field("params", &self.params)
            .finish()
    }
}

fn construct_default<T: Default + Send + Sync + 'static>(_args: &[Bean]) -> Result<Instance> {
    Ok(Box::new(T::default()))
}

fn construct_injected<T: Construct>(args: &[Bean]) -> Result<Instance> {
    let args = T::Args::from_beans(args)?;
    Ok(Box::new(T::construct(args)))
}

// =============================================================================
// Construct / Resolvable - constructor injection
// =============================================================================

/// A constructor designated for injection.
///
/// `#[component(constructor)]` makes the derive register this as the
/// component's injectable constructor.
///
/// # Example
///
/// ```rust
/// use simple_ioc::Construct;
/// use std::sync::Arc;
///
/// struct Database;
///
/// struct Reports {
///     db: Arc<Database>,
/// }
///
/// impl Construct for Reports {
///     type Args = Arc<Database>;
///
///     fn construct(db: Arc<Database>) -> Self {
///         Reports { db }
///     }
/// }
/// ```
pub trait Construct: Send + Sync + Sized + 'static {
    /// Constructor parameters: `()`, `Arc<T>` or a tuple of `Arc`s
    type Args: Resolvable;

    fn construct(args: Self::Args) -> Self;
}

/// Constructor parameter lists the container can fill from beans.
///
/// Implemented for:
/// - `()` - No parameters
/// - `Arc<T>` - One parameter; `T` may be a trait object
/// - Tuples of `Arc<T>` - Up to eight parameters
pub trait Resolvable: Sized {
    /// Declared parameter types, in order
    fn param_types() -> Vec<TypeKey>;

    /// Build the parameter list from beans matched to [`param_types`](Self::param_types)
    fn from_beans(beans: &[Bean]) -> Result<Self>;
}

impl Resolvable for () {
    #[inline]
    fn param_types() -> Vec<TypeKey> {
        Vec::new()
    }

    #[inline]
    fn from_beans(_beans: &[Bean]) -> Result<Self> {
        Ok(())
    }
}

impl<T: ?Sized + 'static> Resolvable for Arc<T> {
    #[inline]
    fn param_types() -> Vec<TypeKey> {
        vec![TypeKey::of::<T>()]
    }

    #[inline]
    fn from_beans(beans: &[Bean]) -> Result<Self> {
        argument::<T>(beans, 0)
    }
}

fn argument<T: ?Sized + 'static>(beans: &[Bean], index: usize) -> Result<Arc<T>> {
    beans.get(index).and_then(Bean::get::<T>).ok_or_else(|| {
        DiError::Internal(format!(
            "constructor argument {index} is not a {}",
            std::any::type_name::<T>()
        ))
    })
}

macro_rules! impl_resolvable_tuple {
    ($($idx:tt $T:ident),+) => {
        impl<$($T: ?Sized + 'static),+> Resolvable for ($(Arc<$T>,)+) {
            #[inline]
            fn param_types() -> Vec<TypeKey> {
                vec![$(TypeKey::of::<$T>()),+]
            }

            #[inline]
            fn from_beans(beans: &[Bean]) -> Result<Self> {
                Ok(($(argument::<$T>(beans, $idx)?,)+))
            }
        }
    };
}

impl_resolvable_tuple!(0 A, 1 B);
impl_resolvable_tuple!(0 A, 1 B, 2 C);
impl_resolvable_tuple!(0 A, 1 B, 2 C, 3 D);
impl_resolvable_tuple!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_resolvable_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
impl_resolvable_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
impl_resolvable_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);

// =============================================================================
// ComponentType
// =============================================================================

/// Types that describe themselves to the container.
///
/// Implemented by `#[derive(Component)]`.
pub trait Component: Send + Sync + 'static {
    fn component_type() -> ComponentType;
}

struct TypeInfo {
    name: &'static str,
    module_path: &'static str,
    simple_name: &'static str,
    type_key: TypeKey,
    component: bool,
    concrete: bool,
    fields: Vec<FieldDescriptor>,
    constructors: Vec<ConstructorDescriptor>,
    views: Arc<[View]>,
}

/// Structural description of a type.
///
/// Cheap to clone. Equality and hashing use the fully-qualified name.
#[derive(Clone)]
pub struct ComponentType {
    info: Arc<TypeInfo>,
}

impl ComponentType {
    /// Start describing `T`, registered under the fully-qualified `name`
    /// (`module::path::TypeName`).
    pub fn builder<T: Send + Sync + 'static>(name: &'static str) -> ComponentTypeBuilder {
        ComponentTypeBuilder {
            name,
            type_key: TypeKey::of::<T>(),
            component: true,
            concrete: true,
            fields: Vec::new(),
            constructors: Vec::new(),
            views: vec![View::identity::<T>()],
        }
    }

    /// Fully-qualified name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.info.name
    }

    /// Enclosing module path
    #[inline]
    pub fn module_path(&self) -> &'static str {
        self.info.module_path
    }

    /// Unqualified type name
    #[inline]
    pub fn simple_name(&self) -> &'static str {
        self.info.simple_name
    }

    /// Registry key for beans of this type: the simple name.
    ///
    /// Two types with the same simple name in different modules share a bean name.
    #[inline]
    pub fn bean_name(&self) -> &'static str {
        self.info.simple_name
    }

    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.info.type_key
    }

    /// Whether this type carries the component marker
    #[inline]
    pub fn is_component(&self) -> bool {
        self.info.component
    }

    /// Whether instances can be created at all
    #[inline]
    pub fn is_concrete(&self) -> bool {
        self.info.concrete
    }

    /// All declared fields, in declaration order
    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.info.fields
    }

    /// Fields marked for injection, in declaration order
    pub fn injectable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.info.fields.iter().filter(|f| f.is_injectable())
    }

    /// Whether any field is marked for injection
    pub fn has_dependencies(&self) -> bool {
        self.injectable_fields().next().is_some()
    }

    /// Declared constructors
    #[inline]
    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.info.constructors
    }

    /// Declared types instances are assignable to
    #[inline]
    pub fn views(&self) -> &Arc<[View]> {
        &self.info.views
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.info.name == other.info.name
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.info.name.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("name", &self.info.name)
            .field("component", &self.info.component)
            .field("fields", &self.info.fields)
            .field("constructors", &self.info.constructors)
            .finish()
    }
}

/// Builder for [`ComponentType`]
pub struct ComponentTypeBuilder {
    name: &'static str,
    type_key: TypeKey,
    component: bool,
    concrete: bool,
    fields: Vec<FieldDescriptor>,
    constructors: Vec<ConstructorDescriptor>,
    views: Vec<View>,
}

impl ComponentTypeBuilder {
    /// Set the component marker (defaults to `true`)
    pub fn component(mut self, component: bool) -> Self {
        self.component = component;
        self
    }

    /// Mark the type as abstract; the container skips abstract components
    pub fn concrete(mut self, concrete: bool) -> Self {
        self.concrete = concrete;
        self
    }

    /// Declare a field that is not injected
    pub fn field(mut self, name: &'static str, ty: TypeKey) -> Self {
        self.fields.push(FieldDescriptor::plain(name, ty));
        self
    }

    /// Declare a field marked for injection
    pub fn inject_field(mut self, name: &'static str, ty: TypeKey, injector: InjectFn) -> Self {
        self.fields.push(FieldDescriptor::injectable(name, ty, injector));
        self
    }

    /// Declare a constructor
    pub fn constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Make instances assignable to `Target`
    pub fn provides<Target: ?Sized + 'static>(mut self, cast: CastFn) -> Self {
        self.views.push(View::new::<Target>(cast));
        self
    }

    pub fn build(self) -> ComponentType {
        let (module_path, simple_name) = match self.name.rsplit_once("::") {
            Some((module, simple)) => (module, simple),
            None => ("", self.name),
        };

        ComponentType {
            info: Arc::new(TypeInfo {
                name: self.name,
                module_path,
                simple_name,
                type_key: self.type_key,
                component: self.component,
                concrete: self.concrete,
                fields: self.fields,
                constructors: self.constructors,
                views: self.views.into(),
            }),
        }
    }
}
