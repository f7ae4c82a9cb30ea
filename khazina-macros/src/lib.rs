//! Procedural macros for Khazina.
//!
//! Use them through `khazina` (or `khazina-derive`), not directly.

use darling::ast::Data;
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

#[derive(FromDeriveInput)]
#[darling(attributes(khazina), supports(struct_named))]
struct ViewInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<(), ViewField>,
    /// Path to the `khazina` crate, for code that renames or re-exports it.
    #[darling(default, rename = "crate")]
    krate: Option<syn::Path>,
}

#[derive(FromField)]
#[darling(attributes(khazina))]
struct ViewField {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    /// Registry key; defaults to the field name.
    #[darling(default)]
    key: Option<String>,
}

/// Implements `FromAccessor` for a struct with named fields.
///
/// Each field is injected from the key of the same name, or from
/// `#[khazina(key = "...")]`. Field types must implement `Inject`
/// (`Arc<T>`, `Value`, or `Option` of either).
///
/// ```rust,ignore
/// #[derive(FromAccessor)]
/// struct Services {
///     #[khazina(key = "db")]
///     database: Arc<Database>,
///     mailer: Option<Arc<Mailer>>,
/// }
///
/// let services: Services = container.view()?;
/// ```
#[proc_macro_derive(FromAccessor, attributes(khazina))]
pub fn derive_from_accessor(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_from_accessor(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand_from_accessor(input: &DeriveInput) -> darling::Result<TokenStream2> {
    let view = ViewInput::from_derive_input(input)?;
    let krate = view
        .krate
        .map(|path| quote!(#path))
        .unwrap_or_else(|| quote!(::khazina));

    let fields = view
        .data
        .take_struct()
        .ok_or_else(|| darling::Error::unsupported_shape("enum"))?
        .fields;

    let inits = fields.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        let key = field
            .key
            .clone()
            .or_else(|| field.ident.as_ref().map(ToString::to_string))
            .unwrap_or_default();

        quote! {
            #ident: <#ty as #krate::accessor::Inject>::inject(accessor, #key)?
        }
    });

    let ident = &view.ident;
    let (impl_generics, ty_generics, where_clause) = view.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::accessor::FromAccessor for #ident #ty_generics #where_clause {
            fn from_accessor(
                accessor: &#krate::accessor::Accessor<'_>,
            ) -> #krate::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #(#inits,)*
                })
            }
        }
    })
}
