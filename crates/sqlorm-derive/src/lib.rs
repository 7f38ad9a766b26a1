//! Derive macro for sqlorm
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod record;

/// Derive the `Record` trait (and row scanning) for a struct.
///
/// # Example
///
/// ```ignore
/// use sqlorm::Record;
///
/// #[derive(Record)]
/// #[orm(table = "passport_user")]
/// struct User {
///     #[orm(primary_key)]
///     user_id: i64,
///     #[orm(column = "birth_year")]
///     birth: i64,
///     nickname: String,
/// }
/// ```
///
/// Field declaration order is load-bearing: rows are mapped positionally,
/// pairing the Nth result column with the Nth declared field.
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Table name (required)
/// - `#[orm(primary_key)]` - Mark field as the primary key
/// - `#[orm(column = "name")]` - Map field to a different column name
#[proc_macro_derive(Record, attributes(orm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
