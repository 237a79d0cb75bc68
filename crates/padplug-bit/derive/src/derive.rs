use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Widest layout supported by `padplug_bit_mask::Bitmask`.
const MAX_BITS: usize = 16;

pub fn handle_derive_bit(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "Bit can be derived only for enums",
        ));
    };

    // Positions come from declaration order. Explicit discriminants would let
    // `as` casts disagree with the bit layout, so they are rejected.
    let mut variants = Vec::with_capacity(data.variants.len());
    for v in &data.variants {
        if !matches!(v.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                v,
                "Bit supports only fieldless enum variants",
            ));
        }
        if let Some((_, expr)) = &v.discriminant {
            return Err(syn::Error::new_spanned(
                expr,
                "Bit assigns positions by declaration order; remove the discriminant",
            ));
        }
        variants.push(&v.ident);
    }

    if variants.len() > MAX_BITS {
        return Err(syn::Error::new_spanned(
            name,
            format!("Bit supports at most {MAX_BITS} variants"),
        ));
    }

    let count = variants.len() as u32;
    let bit_arms = variants.iter().enumerate().map(|(i, v)| {
        let idx = i as u16;
        quote! { #name::#v => 1u16 << #idx }
    });
    let index_arms = variants.iter().enumerate().map(|(i, v)| {
        let idx = i as u32;
        quote! { #idx => ::core::option::Option::Some(#name::#v) }
    });

    Ok(quote! {
        impl ::padplug_bit_mask::Bitable for #name {
            const COUNT: u32 = #count;

            #[inline]
            fn bit(&self) -> u16 {
                match self { #( #bit_arms, )* }
            }

            #[inline]
            fn index(&self) -> u32 { self.bit().trailing_zeros() }

            #[inline]
            fn from_index(index: u32) -> ::core::option::Option<Self> {
                match index {
                    #( #index_arms, )*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}
