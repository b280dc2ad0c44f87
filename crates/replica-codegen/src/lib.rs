// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Visibility};

/// Container-level options from `#[replica(...)]`.
#[derive(Default)]
struct ContainerAttrs {
    self_copy: bool,
    export_import: bool,
}

/// Field-level options from `#[replica(...)]`.
#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    tag: Option<LitStr>,
}

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut out = ContainerAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("replica")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("self_copy") {
                out.self_copy = true;
                Ok(())
            } else if meta.path.is_ident("export_import") {
                out.export_import = true;
                Ok(())
            } else {
                Err(meta.error("expected `self_copy` or `export_import`"))
            }
        })?;
    }
    Ok(out)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("replica")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                out.skip = true;
                Ok(())
            } else if meta.path.is_ident("tag") {
                out.tag = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `tag = \"...\"`"))
            }
        })?;
    }
    Ok(out)
}

/// `#[derive(Reflect)]`: implements `Reflect`, `ReflectRecord` and `Typed`.
///
/// Requirements:
/// - a struct with named fields and no generic parameters
/// - `Clone + Default` on the struct
/// - every non-skipped field type implements `replica::Typed`
///
/// Fields declared `pub` (or `pub(...)`) are visible to the copy engine and
/// the codec; private fields are described but skipped.
///
/// Attributes:
/// - `#[replica(self_copy)]` - deep copy through `replica::SelfCopy`
/// - `#[replica(export_import)]` - deep copy through `replica::ExportImport`
/// - `#[replica(skip)]` on a field - not reflected at all
/// - `#[replica(tag = "...")]` on a field - metadata kept in the descriptor
///
/// Example:
/// ```ignore
/// use replica::Reflect;
///
/// #[derive(Reflect, Clone, Default)]
/// pub struct Reading {
///     pub sensor: String,
///     #[replica(tag = "celsius")]
///     pub value: f64,
///     cache: Vec<u8>,            // hidden: zero in copies, not encoded
///     #[replica(skip)]
///     scratch: Option<Box<str>>, // not reflected
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(replica))]
#[allow(clippy::too_many_lines)]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "Generic types are not supported")
            .to_compile_error()
            .into();
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            Fields::Unit => {
                return syn::Error::new_spanned(&input, "Unit structs are not supported")
                    .to_compile_error()
                    .into()
            }
            Fields::Unnamed(_) => {
                return syn::Error::new_spanned(&input, "Only named fields are supported")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Only structs are supported")
                .to_compile_error()
                .into()
        }
    };

    let container = match parse_container_attrs(&input.attrs) {
        Ok(attrs) => attrs,
        Err(e) => return e.to_compile_error().into(),
    };

    struct FieldInfo {
        ident: syn::Ident,
        ty: syn::Type,
        visible: bool,
        tag: Option<LitStr>,
    }

    let mut infos = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return syn::Error::new_spanned(field, "Field must have a name")
                .to_compile_error()
                .into();
        };
        let attrs = match parse_field_attrs(&field.attrs) {
            Ok(attrs) => attrs,
            Err(e) => return e.to_compile_error().into(),
        };
        if attrs.skip {
            continue;
        }
        infos.push(FieldInfo {
            ident: ident.clone(),
            ty: field.ty.clone(),
            visible: matches!(field.vis, Visibility::Public(_) | Visibility::Restricted(_)),
            tag: attrs.tag,
        });
    }

    let count = infos.len();
    let indices: Vec<usize> = (0..count).collect();
    let idents: Vec<_> = infos.iter().map(|f| &f.ident).collect();
    let names: Vec<String> = infos
        .iter()
        .map(|f| {
            let raw = f.ident.to_string();
            raw.strip_prefix("r#").map_or(raw.clone(), str::to_owned)
        })
        .collect();
    let visible: Vec<bool> = infos.iter().map(|f| f.visible).collect();

    let self_copy = if container.self_copy {
        quote!(::core::option::Option::Some(
            ::replica::copy::self_copy_hook::<#name> as ::replica::CopyFn
        ))
    } else {
        quote!(::core::option::Option::None)
    };
    let export_import = if container.export_import {
        quote!(::core::option::Option::Some(
            ::replica::copy::export_import_hook::<#name> as ::replica::CopyFn
        ))
    } else {
        quote!(::core::option::Option::None)
    };
    let copy_override = quote!(::replica::CopyOverride::resolve(#self_copy, #export_import));

    let field_shapes = infos.iter().zip(&names).map(|(f, field_name)| {
        let ident = &f.ident;
        let ty = &f.ty;
        let visible = f.visible;
        let tag = match &f.tag {
            Some(tag) => quote!(::core::option::Option::Some(#tag)),
            None => quote!(::core::option::Option::None),
        };
        quote! {
            ::replica::FieldShape {
                name: #field_name,
                tag: #tag,
                visible: #visible,
                offset: ::core::mem::offset_of!(#name, #ident),
                shape: <#ty as ::replica::Typed>::shape,
                get: |value| {
                    ::replica::Reflect::as_any(value)
                        .downcast_ref::<#name>()
                        .map(|record| &record.#ident as &dyn ::replica::Reflect)
                },
                get_mut: |value| {
                    ::replica::Reflect::as_any_mut(value)
                        .downcast_mut::<#name>()
                        .map(|record| &mut record.#ident as &mut dyn ::replica::Reflect)
                },
            }
        }
    });

    let expanded = quote! {
        impl ::replica::Reflect for #name {
            ::replica::__reflect_boilerplate!();

            fn reflect_ref(&self) -> ::replica::ValueRef<'_> {
                ::replica::ValueRef::Record(self)
            }

            fn reflect_mut(&mut self) -> ::replica::ValueMut<'_> {
                ::replica::ValueMut::Record(self)
            }

            fn copy_override(&self) -> ::replica::CopyOverride {
                #copy_override
            }
        }

        impl ::replica::ReflectRecord for #name {
            fn field_count(&self) -> usize {
                #count
            }

            fn field_name(&self, index: usize) -> ::core::option::Option<&'static str> {
                match index {
                    #(#indices => ::core::option::Option::Some(#names),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_visible(&self, index: usize) -> bool {
                match index {
                    #(#indices => #visible,)*
                    _ => false,
                }
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn ::replica::Reflect> {
                match index {
                    #(#indices => ::core::option::Option::Some(&self.#idents as &dyn ::replica::Reflect),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn ::replica::Reflect> {
                match index {
                    #(#indices => ::core::option::Option::Some(&mut self.#idents as &mut dyn ::replica::Reflect),)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::replica::Typed for #name {
            fn shape() -> ::replica::TypeShape {
                ::replica::TypeShape::of::<Self>(::replica::ShapeKind::Record {
                    fields: ::std::vec![#(#field_shapes),*],
                })
                .with_copy(#copy_override)
            }

            fn zero() -> Self {
                ::core::default::Default::default()
            }
        }
    };

    TokenStream::from(expanded)
}
