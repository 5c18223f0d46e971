//! Derive macro for simple-ioc
//!
//! `#[derive(Component)]` marks a struct as a managed component. It generates
//! the struct's `ComponentType` descriptor and registers it with the type
//! catalog at link time, so the container's scanner can find it.
//!
//! # Example
//!
//! ```rust,ignore
//! use simple_ioc::Component;
//! use std::sync::Arc;
//!
//! pub trait Notifier: Send + Sync {
//!     fn notify(&self, message: &str);
//! }
//!
//! #[derive(Component, Default)]
//! #[component(provides(dyn Notifier))]
//! pub struct EmailService;
//!
//! impl Notifier for EmailService {
//!     fn notify(&self, message: &str) {
//!         println!("Sending email: {message}");
//!     }
//! }
//!
//! #[derive(Component, Default)]
//! pub struct UserComponent {
//!     #[inject]
//!     notifier: Option<Arc<dyn Notifier>>,
//!     // Not injected
//!     logins: u64,
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::Parse;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Meta, Token, Type, parse_macro_input};

/// Derive macro for managed components.
///
/// # Attributes
///
/// - `#[inject]` on a field - Inject a bean here. The field type must be
///   `Option<Arc<T>>`; `T` may be a concrete type or `dyn Trait`.
/// - `#[component(constructor)]` - Use the type's `Construct` impl as the
///   injectable constructor.
/// - `#[component(default)]` - Also keep the zero-argument `Default`
///   constructor. Implied when `constructor` is absent.
/// - `#[component(provides(dyn A, dyn B))]` - Make beans of this type
///   assignable to the listed trait objects.
/// - `#[component(abstract_type)]` - Describe the type but never instantiate it.
#[proc_macro_derive(Component, attributes(inject, component))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_component(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_component(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let name_str = LitStr::new(&name.to_string(), name.span());

    // Registrations are statics, which cannot be generic
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Component cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Component can only be derived for structs with named fields or unit structs",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Component can only be derived for structs",
            ));
        }
    };

    let options = parse_component_options(&input.attrs)?;
    let mut steps = Vec::new();

    if options.abstract_type {
        steps.push(quote! { .concrete(false) });
    }

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_str = LitStr::new(&field_name.to_string(), field_name.span());
        let field_type = &field.ty;

        if has_inject_attr(&field.attrs)? {
            let Some(inner_type) = extract_option_arc_inner_type(field_type) else {
                return Err(syn::Error::new_spanned(
                    field_type,
                    "Fields marked with #[inject] must have type Option<Arc<T>>",
                ));
            };

            steps.push(quote! {
                .inject_field(
                    #field_str,
                    ::simple_ioc::TypeKey::of::<#inner_type>(),
                    |target, bean| {
                        let target = target.downcast_mut::<#name>().ok_or_else(|| {
                            ::simple_ioc::DiError::InjectionFailed {
                                field: #field_str,
                                reason: ::std::format!("target is not a {}", #name_str),
                            }
                        })?;
                        let dependency = bean.get::<#inner_type>().ok_or_else(|| {
                            ::simple_ioc::DiError::InjectionFailed {
                                field: #field_str,
                                reason: ::std::format!(
                                    "bean '{}' is not a {}",
                                    bean.name(),
                                    ::std::any::type_name::<#inner_type>()
                                ),
                            }
                        })?;
                        target.#field_name = ::std::option::Option::Some(dependency);
                        ::std::result::Result::Ok(())
                    },
                )
            });
        } else {
            steps.push(quote! {
                .field(#field_str, ::simple_ioc::TypeKey::of::<#field_type>())
            });
        }
    }

    if options.constructor {
        steps.push(quote! {
            .constructor(::simple_ioc::ConstructorDescriptor::injected::<#name>())
        });
    }
    if options.default || (!options.constructor && !options.abstract_type) {
        steps.push(quote! {
            .constructor(::simple_ioc::ConstructorDescriptor::default_of::<#name>())
        });
    }

    for provided in &options.provides {
        steps.push(quote! {
            .provides::<#provided>(|instance| {
                instance.downcast::<#name>().ok().map(|typed| {
                    let view: ::std::sync::Arc<#provided> = typed;
                    ::std::boxed::Box::new(view)
                        as ::std::boxed::Box<
                            dyn ::std::any::Any + ::std::marker::Send + ::std::marker::Sync,
                        >
                })
            })
        });
    }

    Ok(quote! {
        impl ::simple_ioc::Component for #name {
            fn component_type() -> ::simple_ioc::ComponentType {
                ::simple_ioc::ComponentType::builder::<#name>(
                    ::std::concat!(::std::module_path!(), "::", #name_str)
                )
                #(#steps)*
                .build()
            }
        }

        ::simple_ioc::__private::inventory::submit! {
            ::simple_ioc::TypeRegistration::new(<#name as ::simple_ioc::Component>::component_type)
        }
    })
}

/// Parsed `#[component(...)]` options
#[derive(Default)]
struct ComponentOptions {
    constructor: bool,
    default: bool,
    abstract_type: bool,
    provides: Vec<Type>,
}

fn parse_component_options(attrs: &[Attribute]) -> syn::Result<ComponentOptions> {
    let mut options = ComponentOptions::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("component")) {
        // Bare #[component] adds nothing
        if let Meta::Path(_) = attr.meta {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("constructor") {
                options.constructor = true;
                Ok(())
            } else if meta.path.is_ident("default") {
                options.default = true;
                Ok(())
            } else if meta.path.is_ident("abstract_type") {
                options.abstract_type = true;
                Ok(())
            } else if meta.path.is_ident("provides") {
                let content;
                syn::parenthesized!(content in meta.input);
                let types = content.parse_terminated(Type::parse, Token![,])?;
                options.provides.extend(types);
                Ok(())
            } else {
                Err(meta.error(
                    "expected `constructor`, `default`, `abstract_type` or `provides(...)`",
                ))
            }
        })?;
    }

    Ok(options)
}

/// Whether the field carries `#[inject]`
fn has_inject_attr(attrs: &[Attribute]) -> syn::Result<bool> {
    for attr in attrs {
        if attr.path().is_ident("inject") {
            attr.meta.require_path_only()?;
            return Ok(true);
        }
    }
    Ok(false)
}

/// Extract T from Arc<T>
fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Arc" {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return Some(inner);
                }
            }
        }
    }
    None
}

/// Extract T from Option<Arc<T>>
fn extract_option_arc_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Option" {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return extract_arc_inner_type(inner);
                }
            }
        }
    }
    None
}
