use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Field, Fields, GenericArgument, Index, Member, PathArguments, Type,
    parse_macro_input,
};

/// Derive `SerializableFields`, registering every `#[serialize_field]` field.
///
/// Each marked field is probed for its packing strategy, in this order:
/// `HierarchicalNode`, `NodeLoadable`, serde `Serialize + DeserializeOwned`.
/// Marked fields matching none of them are skipped. A field declared as
/// `Option<F>` is null while it holds `None`; any other field is always
/// present.
///
/// Marking one `PackedFields` field with `#[packed_fields]` also implements
/// `SerializationCallbacks`, storing the packed state in that field.
///
/// ```ignore
/// #[derive(SerializableFields, Default)]
/// struct Tank {
///     #[serialize_field]
///     config: Option<ConfigNode>,
///     #[serialize_field]
///     resources: Option<ResourceList>,
///     #[serialize_field]
///     capacity: f64,
///     #[packed_fields]
///     packed: PackedFields,
/// }
/// ```
///
/// Generic structs are not supported: strategy probing needs concrete field
/// types.
#[proc_macro_derive(SerializableFields, attributes(serialize_field, packed_fields))]
pub fn derive_serializable_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "SerializableFields cannot be derived for generic structs",
        ));
    }

    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unnamed(fields) => fields.unnamed.iter().collect(),
            Fields::Unit => Vec::new(),
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "SerializableFields can only be derived for structs",
            ));
        }
    };

    let mut registrations = Vec::new();
    let mut packed_member: Option<Member> = None;

    for (i, field) in fields.iter().enumerate() {
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index::from(i)),
        };
        let serialize = has_attr(field, "serialize_field");

        if has_attr(field, "packed_fields") {
            if serialize {
                return Err(syn::Error::new_spanned(
                    field,
                    "a #[packed_fields] field cannot also be #[serialize_field]",
                ));
            }
            if packed_member.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be marked #[packed_fields]",
                ));
            }
            packed_member = Some(member.clone());
        }

        if serialize {
            let field_name = match &field.ident {
                Some(ident) => ident.to_string(),
                None => i.to_string(),
            };
            registrations.push(registration(name, &member, &field_name, &field.ty));
        }
    }

    let callbacks = packed_member.map(|member| {
        quote! {
            impl redlilium_fieldpack::SerializationCallbacks for #name {
                fn packed_fields(&self) -> &redlilium_fieldpack::PackedFields {
                    &self.#member
                }

                fn packed_fields_mut(&mut self) -> &mut redlilium_fieldpack::PackedFields {
                    &mut self.#member
                }
            }
        }
    });

    Ok(quote! {
        impl redlilium_fieldpack::SerializableFields for #name {
            #[allow(unused_variables)]
            fn describe_fields(
                __fields: &mut redlilium_fieldpack::FieldSetBuilder<Self>,
            ) {
                #[allow(unused_imports)]
                use redlilium_fieldpack::field::{
                    Ineligible as _, NoConstructor as _, ViaDefault as _,
                    ViaGenericBinary as _, ViaHierarchicalNode as _, ViaNodeLoadable as _,
                };
                #(#registrations)*
            }
        }

        #callbacks
    })
}

/// Accessor functions plus the probed push for one field.
fn registration(
    owner: &syn::Ident,
    member: &Member,
    field_name: &str,
    ty: &Type,
) -> proc_macro2::TokenStream {
    let (inner, accessors) = match option_inner(ty) {
        Some(inner) => (
            inner,
            quote! {
                fn get(target: &#owner) -> ::core::option::Option<&#inner> {
                    target.#member.as_ref()
                }
                fn get_mut(target: &mut #owner) -> ::core::option::Option<&mut #inner> {
                    target.#member.as_mut()
                }
                fn set(target: &mut #owner, value: #inner) {
                    target.#member = ::core::option::Option::Some(value);
                }
            },
        ),
        None => (
            ty,
            quote! {
                fn get(target: &#owner) -> ::core::option::Option<&#ty> {
                    ::core::option::Option::Some(&target.#member)
                }
                fn get_mut(target: &mut #owner) -> ::core::option::Option<&mut #ty> {
                    ::core::option::Option::Some(&mut target.#member)
                }
                fn set(target: &mut #owner, value: #ty) {
                    target.#member = value;
                }
            },
        ),
    };

    quote! {
        {
            #accessors
            let access = redlilium_fieldpack::Accessor::<#owner, #inner>::new(get, get_mut, set)
                .with_constructor(
                    (&&redlilium_fieldpack::field::Probe::<#inner>::new()).constructor(),
                );
            __fields.push(
                #field_name,
                ::core::any::type_name::<#inner>(),
                (&&&&redlilium_fieldpack::field::Probe::<#inner>::new()).codec(access),
            );
        }
    }
}

fn has_attr(field: &Field, name: &str) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// `Some(F)` when `ty` is written as `Option<F>` (matching the last path segment).
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}
