use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Type};

/// Field types a record may declare.
const SUPPORTED_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize", "f32",
    "f64", "bool", "String",
];

/// Derive macro for attribute-map records.
///
/// Implements `ddbtk_api::Record`: a field-descriptor table in declaration
/// order and a schema memoized in a per-type static.
///
/// Each field may carry one `#[ddb("...")]` attribute holding its tag. The
/// tag is resolved at runtime by `ddbtk_api::tag::parse_tag`, so a malformed
/// tag excludes the field rather than failing the build.
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Default)]
/// pub struct User {
///     #[ddb("user_id,N")]
///     pub id: u64,
///
///     // Column "name", type S.
///     pub name: String,
///
///     #[ddb("-")]
///     pub session: String,
/// }
/// ```
///
/// Supported field types: all primitive integers, `f32`, `f64`, `bool`,
/// `String`. Anything else is rejected at compile time.
///
/// The check looks at the type as written, by its last path segment, so a
/// type alias (`type Id = u64;`) is rejected as `unsupported type 'Id'`
/// even though it names a supported type. Spell the primitive type out.
#[proc_macro_derive(Record, attributes(ddb))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Record only supports structs")),
    };

    let mut field_def_tokens = Vec::new();

    for field in fields {
        let field_name = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "expected named field")
        })?;
        let field_name_str = field_name.unraw().to_string();
        let field_ty = &field.ty;

        // Parse #[ddb("...")] attribute.
        let mut tag: Option<LitStr> = None;
        for attr in &field.attrs {
            if !attr.path().is_ident("ddb") {
                continue;
            }
            if tag.is_some() {
                return Err(syn::Error::new_spanned(attr, "duplicate #[ddb(...)] attribute"));
            }
            let value: LitStr = attr.parse_args().map_err(|e| {
                syn::Error::new(e.span(), "expected #[ddb(\"name,type\")] with a string literal")
            })?;
            tag = Some(value);
        }

        let ty_name = type_ident_name(field_ty).ok_or_else(|| {
            syn::Error::new_spanned(field_ty, "unsupported type for Record")
        })?;
        if !SUPPORTED_TYPES.contains(&ty_name.as_str()) {
            return Err(syn::Error::new_spanned(
                field_ty,
                format!(
                    "unsupported type '{ty_name}' (expected a primitive integer, f32, f64, bool or String)"
                ),
            ));
        }

        let tag_expr = match &tag {
            Some(lit) => quote! { ::std::option::Option::Some(#lit) },
            None => quote! { ::std::option::Option::None },
        };

        field_def_tokens.push(quote! {
            ::ddbtk_api::schema::FieldDef::new(
                #field_name_str,
                #tag_expr,
                <#field_ty as ::ddbtk_api::value::NativeField>::KIND,
                |__record: &#name| ::ddbtk_api::value::NativeField::render(&__record.#field_name),
                |__record: &mut #name, __text: &str|
                    -> ::std::result::Result<(), ::ddbtk_api::value::DataFailure> {
                    __record.#field_name =
                        <#field_ty as ::ddbtk_api::value::NativeField>::parse_wire(__text)?;
                    ::std::result::Result::Ok(())
                },
            )
        });
    }

    let expanded = quote! {
        impl ::ddbtk_api::schema::Record for #name {
            fn field_defs() -> ::std::vec::Vec<::ddbtk_api::schema::FieldDef<Self>> {
                ::std::vec![
                    #(#field_def_tokens),*
                ]
            }

            fn schema() -> ::std::result::Result<
                &'static ::ddbtk_api::schema::RecordSchema<Self>,
                ::ddbtk_api::error::ConfigError,
            > {
                static __SCHEMA: ::std::sync::OnceLock<
                    ::std::result::Result<
                        ::ddbtk_api::schema::RecordSchema<#name>,
                        ::ddbtk_api::error::ConfigError,
                    >,
                > = ::std::sync::OnceLock::new();
                ::ddbtk_api::schema::RecordSchema::memoized(&__SCHEMA)
            }
        }
    };

    Ok(TokenStream::from(expanded))
}

/// Extract the last path segment ident name from a type (e.g. `u64`, `String`).
fn type_ident_name(ty: &Type) -> Option<String> {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string())
    } else {
        None
    }
}
