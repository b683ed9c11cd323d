//! `#[derive(Event)]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Field, Fields, Index, Member, Type, parse_macro_input, parse_quote,
    spanned::Spanned,
};

/// A field marked with `#[event(...)]`.
struct Marked {
    member: Member,
    ty: Type,
}

#[derive(Default)]
struct EventFields {
    parent: Option<Marked>,
    cancel: Option<Marked>,
}

fn member_of(index: usize, field: &Field) -> Member {
    match &field.ident {
        Some(ident) => Member::Named(ident.clone()),
        None => Member::Unnamed(Index {
            index: index as u32,
            span: field.span(),
        }),
    }
}

fn scan_fields(fields: &Fields) -> syn::Result<EventFields> {
    let mut found = EventFields::default();

    for (index, field) in fields.iter().enumerate() {
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("event")) {
            attr.parse_nested_meta(|meta| {
                let slot = if meta.path.is_ident("parent") {
                    &mut found.parent
                } else if meta.path.is_ident("cancel") {
                    &mut found.cancel
                } else {
                    return Err(meta.error("expected `parent` or `cancel`"));
                };
                if slot.is_some() {
                    return Err(meta.error("only one field may carry this attribute"));
                }
                *slot = Some(Marked {
                    member: member_of(index, field),
                    ty: field.ty.clone(),
                });
                Ok(())
            })?;
        }
    }

    Ok(found)
}

/// Implementation of `#[derive(Event)]`.
pub fn derive_event_impl(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);

    let fields = match &input.data {
        Data::Struct(data) => match scan_fields(&data.fields) {
            Ok(fields) => fields,
            Err(err) => return err.to_compile_error().into(),
        },
        // Enums and unions are leaf events.
        _ => EventFields::default(),
    };

    // Events cross threads and live in a `TypeId`-keyed registry.
    let params: Vec<_> = input
        .generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    let where_clause = input.generics.make_where_clause();
    for param in params {
        where_clause
            .predicates
            .push(parse_quote!(#param: ::core::marker::Send + ::core::marker::Sync + 'static));
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let parent_items: Option<TokenStream2> = fields.parent.as_ref().map(|parent| {
        let member = &parent.member;
        let ty = &parent.ty;
        quote! {
            fn lineage() -> ::std::vec::Vec<::herald::EventType> {
                let mut lineage = ::std::vec![::herald::EventType::of::<Self>()];
                lineage.extend(<#ty as ::herald::Event>::lineage());
                lineage
            }

            fn upcast(
                &self,
                target: ::std::any::TypeId,
            ) -> ::core::option::Option<&dyn ::std::any::Any> {
                if target == ::std::any::TypeId::of::<Self>() {
                    ::core::option::Option::Some(self)
                } else {
                    ::herald::Event::upcast(&self.#member, target)
                }
            }
        }
    });

    let cancel_item: Option<TokenStream2> = match (&fields.cancel, &fields.parent) {
        (Some(cancel), _) => {
            let member = &cancel.member;
            Some(quote! {
                fn as_cancellable(&self) -> ::core::option::Option<&dyn ::herald::Cancellable> {
                    ::core::option::Option::Some(&self.#member)
                }
            })
        }
        (None, Some(parent)) => {
            let member = &parent.member;
            Some(quote! {
                fn as_cancellable(&self) -> ::core::option::Option<&dyn ::herald::Cancellable> {
                    ::herald::Event::as_cancellable(&self.#member)
                }
            })
        }
        (None, None) => None,
    };

    let expanded = quote! {
        impl #impl_generics ::herald::Event for #name #ty_generics #where_clause {
            #parent_items
            #cancel_item
        }
    };

    TokenStream::from(expanded)
}
