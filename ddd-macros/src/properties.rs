use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashSet;
use syn::spanned::Spanned;
use syn::{Field, Item, ItemStruct, LitStr, Result, parse_macro_input};

/// #[properties] 宏实现
/// - 为具名字段结构体实现 `::ddd_model::property::PropertyAccess`
/// - 每个字段默认暴露为同名属性，字段类型需实现 `ToRoutingValue`
/// - 字段参数：`#[property(skip)]` 不暴露；`#[property(rename = "...")]` 指定属性名
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[properties] takes no arguments",
        )
        .to_compile_error()
        .into();
    }

    let input = parse_macro_input!(item as Item);
    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[properties] only on struct")
                .to_compile_error()
                .into();
        }
    };

    match property_access_impl(&mut st) {
        Ok(access) => TokenStream::from(quote! {
            #st

            #access
        }),
        Err(err) => err.to_compile_error().into(),
    }
}

/// 生成 `PropertyAccess` 实现，并移除字段上的 `#[property(...)]` 属性
pub(crate) fn property_access_impl(st: &mut ItemStruct) -> Result<TokenStream2> {
    let mut names: Vec<LitStr> = Vec::new();
    let mut idents: Vec<syn::Ident> = Vec::new();

    match &mut st.fields {
        syn::Fields::Named(fields_named) => {
            let mut seen = HashSet::new();
            for field in fields_named.named.iter_mut() {
                let cfg = take_property_attrs(field)?;
                if cfg.skip {
                    continue;
                }
                let Some(ident) = field.ident.clone() else {
                    continue;
                };
                let name = cfg
                    .rename
                    .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
                if !seen.insert(name.value()) {
                    return Err(syn::Error::new(
                        name.span(),
                        format!("duplicate property name '{}'", name.value()),
                    ));
                }
                names.push(name);
                idents.push(ident);
            }
        }
        syn::Fields::Unit => {}
        syn::Fields::Unnamed(f) => {
            return Err(syn::Error::new(
                f.span(),
                "#[properties] supports only named-field or unit struct",
            ));
        }
    }

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::ddd_model::property::PropertyAccess for #ident #ty_generics #where_clause {
            const PROPERTY_NAMES: &'static [&'static str] = &[#(#names),*];

            fn property(name: &str) -> ::core::option::Option<::ddd_model::property::Property> {
                match name {
                    #(
                        #names => ::core::option::Option::Some(
                            ::ddd_model::property::Property::of::<Self>(#names, |s: &Self| {
                                ::ddd_model::property::ToRoutingValue::to_routing_value(&s.#idents)
                            }),
                        ),
                    )*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

#[derive(Default)]
struct FieldPropertyConfig {
    skip: bool,
    rename: Option<LitStr>,
}

// 解析并剥离字段上的 #[property(...)]
fn take_property_attrs(field: &mut Field) -> Result<FieldPropertyConfig> {
    let mut cfg = FieldPropertyConfig::default();
    let mut retained = Vec::with_capacity(field.attrs.len());

    for attr in std::mem::take(&mut field.attrs) {
        if !attr.path().is_ident("property") {
            retained.push(attr);
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                cfg.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                if cfg.rename.is_some() {
                    return Err(meta.error("duplicate key 'rename' in attribute"));
                }
                cfg.rename = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown key; expected 'skip' | 'rename'"))
            }
        })?;
    }

    field.attrs = retained;
    Ok(cfg)
}
