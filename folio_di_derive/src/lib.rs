use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Field, Fields};

/// Derives `folio_di::Build` for a struct.
///
/// Every field is built from the provider, except fields marked `#[state]`,
/// which are initialized with `Default::default()`. The built value is stored
/// in the provider cache so that later requests share the same instance.
#[proc_macro_derive(Build, attributes(state))]
pub fn derive_build(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let ident = input.ident;

    let generics = input
        .generics
        .type_params()
        .map(|x| &x.ident)
        .collect::<Vec<_>>();

    let syn::Data::Struct(data) = input.data else {
        return quote! { ::core::compile_error!("Build can only be derived for structs"); }.into();
    };

    let bounds = data
        .fields
        .iter()
        .filter(|x| !is_state(x))
        .map(|Field { ty, .. }| quote! { #ty: ::folio_di::Build<__Provider> })
        .collect::<Vec<_>>();

    let build_expr = build_expr(&data.fields);

    quote! {
        impl<__Provider, #(#generics),*> ::folio_di::Build<__Provider> for #ident<#(#generics),*>
        where
            Self: ::core::clone::Clone + 'static,
            __Provider: ::folio_di::Provider,
            #(#bounds),*
        {
            fn build(provider: &mut __Provider) -> Self {
                if let ::core::option::Option::Some(cached) = ::folio_di::Provider::get(provider) {
                    return cached;
                }
                let built: Self = #build_expr;
                ::folio_di::Provider::insert(provider, ::core::clone::Clone::clone(&built));
                built
            }
        }
    }
    .into()
}

fn is_state(field: &Field) -> bool {
    field
        .attrs
        .iter()
        .any(|x| x.path().get_ident().is_some_and(|x| x == "state"))
}

fn field_expr(field: &Field) -> TokenStream2 {
    if is_state(field) {
        quote! { ::core::default::Default::default() }
    } else {
        quote! { ::folio_di::Build::build(provider) }
    }
}

fn build_expr(fields: &Fields) -> TokenStream2 {
    match fields {
        Fields::Named(fields) => {
            let fields = fields.named.iter().map(|f| {
                let ident = &f.ident;
                let expr = field_expr(f);
                quote! { #ident: #expr }
            });
            quote! { Self { #(#fields),* } }
        }
        Fields::Unnamed(fields) => {
            let fields = fields.unnamed.iter().map(field_expr);
            quote! { Self( #(#fields),* ) }
        }
        Fields::Unit => quote! { Self },
    }
}
