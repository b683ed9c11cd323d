//! `#[listener]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    FnArg, Ident, ItemFn, LitBool, LitStr, ReturnType, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

const PRIORITIES: [&str; 6] = ["Highest", "High", "Normal", "Low", "Lowest", "Monitor"];

/// Arguments for the `#[listener]` macro.
pub(crate) struct ListenerArgs {
    pub name: Option<String>,
    pub priority: Option<Ident>,
    pub ignore_cancelled: bool,
}

impl Parse for ListenerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;
        let mut priority = None;
        let mut ignore_cancelled = false;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "name" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    name = Some(lit.value());
                }
                "priority" => {
                    input.parse::<Token![=]>()?;
                    let level: Ident = input.parse()?;
                    if !PRIORITIES.contains(&level.to_string().as_str()) {
                        return Err(syn::Error::new(
                            level.span(),
                            format!("unknown priority, expected one of {}", PRIORITIES.join(", ")),
                        ));
                    }
                    priority = Some(level);
                }
                "ignore_cancelled" => {
                    ignore_cancelled = if input.peek(Token![=]) {
                        input.parse::<Token![=]>()?;
                        input.parse::<LitBool>()?.value
                    } else {
                        true
                    };
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ListenerArgs {
            name,
            priority,
            ignore_cancelled,
        })
    }
}

/// Implementation of the `#[listener]` attribute macro.
pub fn listener_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ListenerArgs);
    let input = parse_macro_input!(item as ItemFn);

    let fn_name = &input.sig.ident;
    let fn_vis = &input.vis;
    let fn_block = &input.block;

    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(input.sig.fn_token, "Listener function must be async")
            .to_compile_error()
            .into();
    }

    let inputs = &input.sig.inputs;
    if inputs.len() != 1 {
        return syn::Error::new_spanned(
            inputs,
            "Listener function must take exactly one argument: fn(event: &Event)",
        )
        .to_compile_error()
        .into();
    }

    let (event_pat, event_type) = match inputs.first() {
        Some(FnArg::Typed(pat_type)) => {
            if let Type::Reference(type_ref) = &*pat_type.ty {
                (&pat_type.pat, &type_ref.elem)
            } else {
                return syn::Error::new_spanned(
                    &pat_type.ty,
                    "Listener event argument must be a reference (&Event)",
                )
                .to_compile_error()
                .into();
            }
        }
        _ => {
            return syn::Error::new_spanned(inputs, "Listener function cannot take self")
                .to_compile_error()
                .into();
        }
    };

    let struct_name = match args.name {
        Some(ref custom_name) => Ident::new(custom_name, fn_name.span()),
        None => fn_name.clone(),
    };

    let priority = args
        .priority
        .unwrap_or_else(|| Ident::new("Normal", fn_name.span()));
    let ignore_cancelled = args.ignore_cancelled;

    // A body without a declared return type is infallible.
    let body = match &input.sig.output {
        ReturnType::Default => quote! {
            #fn_block
            ::core::result::Result::Ok(())
        },
        ReturnType::Type(..) => quote! { #fn_block },
    };

    let expanded = quote! {
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Default)]
        #[doc = concat!("Auto-generated Listener from `#[herald::listener]` on `", stringify!(#fn_name), "`")]
        #fn_vis struct #struct_name;

        impl #struct_name {
            /// Priority this listener is registered with.
            pub const PRIORITY: ::herald::Priority = ::herald::Priority::#priority;

            /// Whether this listener still runs for cancelled events.
            pub const IGNORE_CANCELLED: bool = #ignore_cancelled;

            /// Register this listener on `bus` with its declared options.
            pub fn subscribe(bus: &::herald::EventBus) -> ::herald::Subscription {
                bus.subscribe::<#event_type, _>(Self::PRIORITY, Self::IGNORE_CANCELLED, Self)
            }
        }

        impl ::herald::Listener<#event_type> for #struct_name {
            async fn handle(
                &self,
                #event_pat: &#event_type,
            ) -> ::core::result::Result<(), ::herald::BoxError> {
                #body
            }
        }
    };

    TokenStream::from(expanded)
}
