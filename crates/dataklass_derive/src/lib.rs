//! Derive macro for dataklass records.
//!
//! `#[derive(Dataklass)]` is the compile-time counterpart of the runtime decorator: it emits the
//! same method families for a struct with named fields, in field declaration order.
//!
//! | Family | Emitted item                                   | Default |
//! |--------|------------------------------------------------|---------|
//! | init   | `pub fn new(<fields>) -> Self`                 | on      |
//! | repr   | `Debug` printing `Name(a=.., b=..)`            | on      |
//! | eq     | `PartialEq` comparing all fields               | on      |
//! | iter   | `pub fn iter(&self)` over `&dyn Debug`         | off     |
//! | hash   | `Hash` over all fields                         | off     |
//!
//! `dataklass::Record` (class name, field names, field types) is always implemented.
//!
//! ## Attributes
//!
//! - `#[dataklass(iter)]`, `#[dataklass(hash)]`: enable the opt-in families.
//! - `#[dataklass(skip(repr, eq))]`: leave families to a hand-written implementation.
//!   Spellings and aliases come from `dataklass_core::lang::families`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Generics, Ident, Type, parse_macro_input, parse_quote};

use dataklass_core::MethodFamily;

struct Options {
    enabled: Vec<MethodFamily>,
}

impl Options {
    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut enabled: Vec<MethodFamily> = dataklass_core::FAMILIES
            .into_iter()
            .filter(|f| f.enabled_by_default())
            .collect();
        let mut skipped: Vec<MethodFamily> = Vec::new();

        for attr in input.attrs.iter().filter(|a| a.path().is_ident("dataklass")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("iter") {
                    enabled.push(MethodFamily::Iter);
                    Ok(())
                } else if meta.path.is_ident("hash") {
                    enabled.push(MethodFamily::Hash);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    meta.parse_nested_meta(|inner| {
                        let Some(ident) = inner.path.get_ident() else {
                            return Err(inner.error("expected a method family name"));
                        };
                        let spelling = ident.unraw().to_string();
                        match MethodFamily::from_str(&spelling) {
                            Some(family) => {
                                skipped.push(family);
                                Ok(())
                            }
                            None => Err(inner.error(format!(
                                "unknown method family `{}`; expected one of: {}",
                                spelling,
                                family_list()
                            ))),
                        }
                    })
                } else {
                    Err(meta.error("unknown dataklass option; expected `iter`, `hash`, or `skip(...)`"))
                }
            })?;
        }

        enabled.retain(|f| !skipped.contains(f));
        Ok(Self { enabled })
    }

    fn has(&self, family: MethodFamily) -> bool {
        self.enabled.contains(&family)
    }
}

fn family_list() -> String {
    dataklass_core::FAMILIES.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(", ")
}

struct Field<'a> {
    ident: &'a Ident,
    name: String,
    ty: &'a Type,
}

fn named_fields(input: &DeriveInput) -> syn::Result<Vec<Field<'_>>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Dataklass can only be derived for structs with named fields",
        ));
    };
    match &data.fields {
        Fields::Named(fields) => Ok(fields
            .named
            .iter()
            .filter_map(|f| {
                f.ident.as_ref().map(|ident| Field {
                    ident,
                    name: ident.unraw().to_string(),
                    ty: &f.ty,
                })
            })
            .collect()),
        Fields::Unnamed(_) | Fields::Unit => Err(syn::Error::new_spanned(
            &input.ident,
            "Dataklass needs named fields; tuple and unit structs have no field names",
        )),
    }
}

/// Copy of `generics` with `bound` added to every type parameter.
fn bounded(generics: &Generics, bound: TokenStream2) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(#bound));
    }
    generics
}

/// Derive the dataklass method families for a struct with named fields.
///
/// # Example
/// ```ignore
/// #[derive(Dataklass)]
/// #[dataklass(hash)]
/// struct Coordinates {
///     x: i64,
///     y: i64,
/// }
///
/// let c = Coordinates::new(2, 3);
/// assert_eq!(format!("{:?}", c), "Coordinates(x=2, y=3)");
/// ```
#[proc_macro_derive(Dataklass, attributes(dataklass))]
pub fn derive_dataklass(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input).unwrap_or_else(syn::Error::into_compile_error).into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let options = Options::parse(input)?;
    let fields = named_fields(input)?;

    let name = &input.ident;
    let name_str = name.unraw().to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let idents: Vec<&Ident> = fields.iter().map(|f| f.ident).collect();
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let types: Vec<&Type> = fields.iter().map(|f| f.ty).collect();
    let type_strs: Vec<String> = types.iter().map(|ty| quote!(#ty).to_string()).collect();

    let mut items = Vec::new();

    if options.has(MethodFamily::Init) {
        items.push(quote! {
            impl #impl_generics #name #ty_generics #where_clause {
                /// Positional constructor, one parameter per field in declaration order.
                #[allow(clippy::too_many_arguments)]
                pub fn new(#(#idents: #types),*) -> Self {
                    Self { #(#idents),* }
                }
            }
        });
    }

    if options.has(MethodFamily::Repr) {
        let generics = bounded(&input.generics, quote!(::core::fmt::Debug));
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        let labels: Vec<String> = names
            .iter()
            .enumerate()
            .map(|(i, n)| if i == 0 { format!("{}=", n) } else { format!(", {}=", n) })
            .collect();
        items.push(quote! {
            impl #impl_generics ::core::fmt::Debug for #name #ty_generics #where_clause {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    f.write_str(#name_str)?;
                    f.write_str("(")?;
                    #(
                        f.write_str(#labels)?;
                        ::core::fmt::Debug::fmt(&self.#idents, f)?;
                    )*
                    f.write_str(")")
                }
            }
        });
    }

    if options.has(MethodFamily::Eq) {
        let generics = bounded(&input.generics, quote!(::core::cmp::PartialEq));
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        items.push(quote! {
            impl #impl_generics ::core::cmp::PartialEq for #name #ty_generics #where_clause {
                #[allow(unused_variables)]
                fn eq(&self, other: &Self) -> bool {
                    true #(&& self.#idents == other.#idents)*
                }
            }
        });
    }

    if options.has(MethodFamily::Iter) {
        let generics = bounded(&input.generics, quote!(::core::fmt::Debug));
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        let count = idents.len();
        items.push(quote! {
            impl #impl_generics #name #ty_generics #where_clause {
                /// Field values in declaration order.
                pub fn iter(&self) -> impl ::core::iter::Iterator<Item = &dyn ::core::fmt::Debug> + '_ {
                    let values: [&dyn ::core::fmt::Debug; #count] = [#(&self.#idents),*];
                    values.into_iter()
                }
            }
        });
    }

    if options.has(MethodFamily::Hash) {
        let generics = bounded(&input.generics, quote!(::core::hash::Hash));
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        items.push(quote! {
            impl #impl_generics ::core::hash::Hash for #name #ty_generics #where_clause {
                #[allow(unused_variables)]
                fn hash<__H: ::core::hash::Hasher>(&self, state: &mut __H) {
                    #( ::core::hash::Hash::hash(&self.#idents, state); )*
                }
            }
        });
    }

    items.push(quote! {
        impl #impl_generics ::dataklass::Record for #name #ty_generics #where_clause {
            const CLASS_NAME: &'static str = #name_str;
            const MATCH_ARGS: &'static [&'static str] = &[#(#names),*];
            const FIELD_TYPES: &'static [&'static str] = &[#(#type_strs),*];
        }
    });

    Ok(quote! { #(#items)* })
}
