//! Procedural macros for Herald.
//!
//! - `#[derive(Event)]` implements `herald::Event`, wiring up the supertype
//!   lineage and the cancelled flag from field attributes
//! - `#[listener]` turns an async function into a `herald::Listener`
//!
//! Generated code refers to the `herald` facade crate.

use proc_macro::TokenStream;

mod event;
mod listener;

/// Derive macro for implementing `Event`.
///
/// Field attributes:
/// - `#[event(parent)]`: the embedded supertype event
/// - `#[event(cancel)]`: a field implementing `Cancellable`
///
/// Without a `cancel` field, cancellation is inherited from the parent.
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    event::derive_event_impl(input)
}

/// Turn `async fn name(event: &E) -> Result<(), BoxError>` into a listener.
///
/// Options: `name = "..."`, `priority = High`, `ignore_cancelled`.
#[proc_macro_attribute]
pub fn listener(attr: TokenStream, item: TokenStream) -> TokenStream {
    listener::listener_impl(attr, item)
}
