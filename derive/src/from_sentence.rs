use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Field, Fields, GenericParam, Ident, Lifetime, LifetimeParam, LitInt,
    LitStr, Result,
    parse::{Parse, ParseStream},
};

pub(crate) fn expand_from_sentence(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`FromSentence` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`FromSentence` may only be derived on structs with named fields.",
        ))?
    };

    let SentenceAttribute { tag, count } = SentenceAttribute::find(input)?;

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();

    for field in &fields {
        let Some((position, literal)) = &field.position else {
            continue;
        };

        if *position == 0 || *position > count {
            Err(Error::new_spanned(
                literal,
                format!("Field position must be between 1 and {count}."),
            ))?
        }

        if !seen.insert(*position) {
            Err(Error::new_spanned(
                literal,
                "Field positions must be unique.",
            ))?
        }
    }

    let assignments = fields.iter().map(|field| {
        let name = &field.name;

        match &field.position {
            Some((position, _)) => {
                let index = position - 1;
                quote! { #name: ::core::convert::Into::into(fields[#index]) }
            }
            None => quote! { #name: ::core::default::Default::default() },
        }
    });

    // Borrow fields for the struct's own lifetime, or introduce one.
    let mut generics = input.generics.clone();

    let lifetime = match input.generics.lifetimes().next() {
        Some(param) => param.lifetime.clone(),
        None => {
            let lifetime = Lifetime::new("'__sentence", Span::call_site());
            generics
                .params
                .push(GenericParam::Lifetime(LifetimeParam::new(lifetime.clone())));
            lifetime
        }
    };

    let (impl_generics, _, _) = generics.split_for_impl();
    let (_, ty_generics, where_clause) = input.generics.split_for_impl();

    let name = &input.ident;

    let expanded = quote! {
        impl #impl_generics ::odometer::sans::sentence::FromSentence<#lifetime>
            for #name #ty_generics #where_clause
        {
            const TAG: &'static str = #tag;
            const FIELDS: usize = #count;

            fn from_fields(fields: &[&#lifetime str]) -> Self {
                Self {
                    #(#assignments,)*
                }
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct SentenceAttribute {
    tag: LitStr,
    count: usize,
}

impl SentenceAttribute {
    fn find(input: &DeriveInput) -> Result<Self> {
        let Some(attr) = input.attrs.iter().find(|a| a.path().is_ident("sentence")) else {
            Err(Error::new_spanned(
                &input.ident,
                "`FromSentence` requires a `#[sentence(tag = \"..\", fields = N)]` attribute.",
            ))?
        };

        let mut tag = None;
        let mut count = None;

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                tag = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else if meta.path.is_ident("fields") {
                let literal = meta.value()?.parse::<LitInt>()?;
                count = Some(literal.base10_parse::<usize>()?);
                Ok(())
            } else {
                Err(meta.error("Expected `tag` or `fields`."))
            }
        })?;

        let Some(tag) = tag else {
            Err(Error::new_spanned(attr, "Sentence attribute is missing `tag`."))?
        };

        let Some(count) = count else {
            Err(Error::new_spanned(
                attr,
                "Sentence attribute is missing `fields`.",
            ))?
        };

        Ok(Self { tag, count })
    }
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    position: Option<(usize, LitInt)>,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Self> {
        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(Self {
                name,
                position: None,
            });
        };

        let FieldAttribute { position } = attr.meta.require_list()?.parse_args()?;
        let value = position.base10_parse::<usize>()?;

        Ok(Self {
            name,
            position: Some((value, position)),
        })
    }
}

#[derive(Debug)]
struct FieldAttribute {
    position: LitInt,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let position = input.parse::<LitInt>()?;
        Ok(Self { position })
    }
}
