//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

struct FieldMeta {
    ident: syn::Ident,
    column: String,
    is_primary: bool,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let table = get_table_name(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ))
        }
    };

    let mut metas = Vec::with_capacity(fields.len());
    let mut primary: Option<String> = None;
    for field in fields {
        let attr = parse_field_attr(field)?;
        let ident = field.ident.clone().ok_or_else(|| {
            syn::Error::new_spanned(field, "Record fields must be named")
        })?;
        let column = attr.column.unwrap_or_else(|| ident.to_string());
        if attr.is_primary {
            if primary.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field may be marked #[orm(primary_key)]",
                ));
            }
            primary = Some(column.clone());
        }
        metas.push(FieldMeta {
            ident,
            column,
            is_primary: attr.is_primary,
        });
    }

    let primary = primary.unwrap_or_default();
    let field_count = metas.len();

    let all_columns: Vec<&str> = metas.iter().map(|m| m.column.as_str()).collect();
    let columns: Vec<&str> = metas
        .iter()
        .filter(|m| !m.is_primary)
        .map(|m| m.column.as_str())
        .collect();

    let field_builds: Vec<_> = metas
        .iter()
        .map(|m| {
            let ident = &m.ident;
            let column = &m.column;
            quote! {
                #ident: {
                    let value = values.next().ok_or_else(|| {
                        sqlorm::OrmError::shape("row ended before all fields were filled")
                    })?;
                    sqlorm::FromValue::from_value(value)
                        .map_err(|e| sqlorm::OrmError::decode(#column, e.to_string()))?
                }
            }
        })
        .collect();

    let all_values: Vec<_> = metas
        .iter()
        .map(|m| {
            let ident = &m.ident;
            quote! { sqlorm::ToValue::to_value(&self.#ident) }
        })
        .collect();

    let insert_values: Vec<_> = metas
        .iter()
        .filter(|m| !m.is_primary)
        .map(|m| {
            let ident = &m.ident;
            quote! { sqlorm::ToValue::to_value(&self.#ident) }
        })
        .collect();

    Ok(quote! {
        impl #impl_generics sqlorm::Record for #name #ty_generics #where_clause {
            const TABLE: &'static str = #table;

            fn primary_field() -> &'static str {
                #primary
            }

            fn fields() -> &'static [&'static str] {
                &[#(#columns),*]
            }

            fn all_fields() -> &'static [&'static str] {
                &[#(#all_columns),*]
            }

            fn from_values(values: Vec<sqlorm::Value>) -> sqlorm::OrmResult<Self> {
                if values.len() != #field_count {
                    return Err(sqlorm::OrmError::shape(format!(
                        "column count {} does not match field count {}",
                        values.len(),
                        #field_count
                    )));
                }
                let mut values = values.into_iter();
                Ok(Self {
                    #(#field_builds),*
                })
            }

            fn to_values(&self) -> Vec<sqlorm::Value> {
                vec![#(#all_values),*]
            }

            fn insert_values(&self) -> Vec<sqlorm::Value> {
                vec![#(#insert_values),*]
            }
        }

        impl #impl_generics sqlorm::ScanRow for #name #ty_generics #where_clause {
            fn check_columns(columns: &[String]) -> sqlorm::OrmResult<()> {
                if columns.len() != #field_count {
                    return Err(sqlorm::OrmError::shape(format!(
                        "column count {} does not match field count {}",
                        columns.len(),
                        #field_count
                    )));
                }
                Ok(())
            }

            fn scan_row(
                _columns: &[String],
                values: Vec<sqlorm::Value>,
            ) -> sqlorm::OrmResult<Self> {
                <Self as sqlorm::Record>::from_values(values)
            }
        }
    })
}

struct FieldAttr {
    is_primary: bool,
    column: Option<String>,
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut is_primary = false;
        let mut column = None;

        loop {
            if input.is_empty() {
                break;
            }

            let ident: syn::Ident = input.parse()?;
            if ident == "primary_key" {
                is_primary = true;
            } else if ident == "column" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                column = Some(value.value());
            } else {
                return Err(syn::Error::new_spanned(
                    &ident,
                    format!("unknown orm attribute `{ident}`"),
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(FieldAttr { is_primary, column })
    }
}

fn parse_field_attr(field: &syn::Field) -> Result<FieldAttr> {
    for attr in &field.attrs {
        if attr.path().is_ident("orm") {
            if let syn::Meta::List(meta_list) = &attr.meta {
                return syn::parse2::<FieldAttr>(meta_list.tokens.clone());
            }
        }
    }
    Ok(FieldAttr {
        is_primary: false,
        column: None,
    })
}

/// Extract the table name from the struct-level `#[orm(table = "...")]` attribute.
fn get_table_name(input: &DeriveInput) -> Result<String> {
    for attr in &input.attrs {
        if attr.path().is_ident("orm") {
            if let Ok(nested) = attr.parse_args::<syn::MetaNameValue>() {
                if nested.path.is_ident("table") {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit),
                        ..
                    }) = &nested.value
                    {
                        return Ok(lit.value());
                    }
                }
            }
        }
    }
    Err(syn::Error::new_spanned(
        input,
        "Record requires #[orm(table = \"table_name\")] attribute",
    ))
}
