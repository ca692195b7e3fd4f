use crate::properties::property_access_impl;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{
    Ident, Item, LitStr, Result as SynResult, Token, parse::Parse, parse::ParseStream,
    parse_macro_input, spanned::Spanned,
};

/// #[command] 宏实现
/// - 同 `#[properties]`，为结构体生成属性表
/// - 额外实现 `::ddd_model::message::Command`，命令名默认取结构体名
/// - 支持参数：`#[command(name = "...")]`
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as CommandAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[command] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let access = match property_access_impl(&mut st) {
        Ok(ts) => ts,
        Err(err) => return err.to_compile_error().into(),
    };

    let ident = &st.ident;
    let name = cfg
        .name
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    if name.value().is_empty() {
        return syn::Error::new(name.span(), "command name must not be empty")
            .to_compile_error()
            .into();
    }
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    TokenStream::from(quote! {
        #st

        #access

        impl #impl_generics ::ddd_model::message::Command for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
        }
    })
}

// 键值对：key = "literal"
struct KvLit {
    key: Ident,
    _eq: Token![=],
    value: LitStr,
}

impl Parse for KvLit {
    fn parse(input: ParseStream) -> SynResult<Self> {
        Ok(Self {
            key: input.parse()?,
            _eq: input.parse()?,
            value: input.parse()?,
        })
    }
}

// 解析 command 宏键值参数：name = "..."
struct CommandAttrConfig {
    name: Option<LitStr>,
}

impl Parse for CommandAttrConfig {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let mut name: Option<LitStr> = None;

        if input.is_empty() {
            return Ok(Self { name });
        }

        let pairs: Punctuated<KvLit, Token![,]> =
            Punctuated::<KvLit, Token![,]>::parse_terminated(input)?;

        for kv in pairs.into_iter() {
            let key = kv.key.to_string();
            match key.as_str() {
                "name" => {
                    if name.is_some() {
                        return Err(syn::Error::new(
                            kv.key.span(),
                            "duplicate key 'name' in attribute",
                        ));
                    }
                    name = Some(kv.value);
                }
                _ => {
                    return Err(syn::Error::new(
                        kv.key.span(),
                        "unknown key in attribute; expected 'name'",
                    ));
                }
            }
        }

        Ok(Self { name })
    }
}
