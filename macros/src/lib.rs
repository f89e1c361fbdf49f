mod model;
mod route;

use proc_macro::TokenStream;

/// Creates a new documentation function for the route, named after the original function with the suffix `_docs`.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates two new structs for the model `X`: `CreateXInput` and `UpdateXInput`.
///
/// Fields with `#[serde(skip_deserializing)]` or `#[serde(skip)]` are left out of both.
/// Every other field is copied with its attributes, verbatim in `CreateXInput` and
/// wrapped in an `Option` in `UpdateXInput`, so missing fields are left untouched by
/// an update. Fields that are already optional become `Option<Option<T>>` in the
/// update, where an explicit `null` deserializes as `Some(None)`. The crate using the
/// macro provides the deserializer at `crate::route::model::nullable`.
#[proc_macro_attribute]
pub fn model(_args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(input)
}
