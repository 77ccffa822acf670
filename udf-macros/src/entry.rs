//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
use convert_case::{Boundary, Case, Converter};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::spanned::Spanned;
use syn::{ImplItem, ItemImpl, LitStr, Type};

use crate::types::{ImplKind, RegisterArgs, ReturnKind, ReturnShape};

/// Everything needed to emit the symbols of one impl block
struct Registration {
    kind: ImplKind,
    self_ty: Type,
    name: LitStr,
    aliases: Vec<LitStr>,
    default_name_used: bool,
}

impl Registration {
    fn new(args: RegisterArgs, item: &ItemImpl) -> syn::Result<Self> {
        let Some((None, path, _)) = &item.trait_ else {
            return Err(syn::Error::new(
                item.impl_token.span,
                "expected trait `BasicUdf` or `AggregateUdf`",
            ));
        };
        let Some(kind) = ImplKind::from_trait_path(path) else {
            return Err(syn::Error::new_spanned(
                path,
                "expected trait `BasicUdf` or `AggregateUdf`",
            ));
        };
        if !item.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &item.generics,
                "`#[register]` cannot be used on generic impls",
            ));
        }

        let self_ty = (*item.self_ty).clone();
        let struct_ident = match &self_ty {
            Type::Path(p) if p.qself.is_none() => p.path.segments.last().map(|s| s.ident.clone()),
            _ => None,
        };
        let Some(struct_ident) = struct_ident else {
            return Err(syn::Error::new_spanned(&self_ty, "expected a path to a struct or enum"));
        };

        let default_name_used = args.name.is_none();
        let name = args.name.unwrap_or_else(|| {
            LitStr::new(&default_name(&struct_ident), struct_ident.span())
        });

        for n in std::iter::once(&name).chain(&args.aliases) {
            symbol_ident(n, "")?;
        }

        Ok(Self { kind, self_ty, name, aliases: args.aliases, default_name_used })
    }

    fn all_names(&self) -> impl Iterator<Item = &LitStr> {
        std::iter::once(&self.name).chain(&self.aliases)
    }
}

/// Snake case of the struct name, where digits stay with the word before them
///
/// `Avg2` is `avg2` and `Md5Hash` is `md5_hash`.
fn default_name(ident: &Ident) -> String {
    Converter::new()
        .remove_boundaries(&[Boundary::LowerDigit, Boundary::UpperDigit, Boundary::DigitLower])
        .to_case(Case::Snake)
        .convert(ident.to_string())
}

/// The identifier for symbol `name` + `suffix`, which must be a valid C and Rust identifier
fn symbol_ident(name: &LitStr, suffix: &str) -> syn::Result<Ident> {
    let value = format!("{}{suffix}", name.value());
    syn::parse_str::<Ident>(&value)
        .map(|mut ident| {
            ident.set_span(name.span());
            ident
        })
        .map_err(|_| syn::Error::new(name.span(), format!("`{value}` is not a valid symbol name")))
}

pub(crate) fn register(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    let args: RegisterArgs = syn::parse2(attr)?;
    let item: ItemImpl = syn::parse2(item)?;
    let reg = Registration::new(args, &item)?;

    let emitted = match reg.kind {
        ImplKind::Basic => basic_fns(&reg, &item)?,
        ImplKind::Aggregate => aggregate_fns(&reg, &item)?,
    };

    Ok(quote! {
        #item

        #emitted
    })
}

/// `xxx_init`, `xxx_deinit` and `xxx` for every name, plus `RegisteredBasicUdf`
fn basic_fns(reg: &Registration, item: &ItemImpl) -> syn::Result<TokenStream> {
    let returns = item
        .items
        .iter()
        .find_map(|i| match i {
            ImplItem::Type(t) if t.ident == "Returns" => Some(&t.ty),
            _ => None,
        })
        .ok_or_else(|| syn::Error::new(item.span(), "missing `type Returns`"))?;

    let shape = ReturnShape::classify(returns);
    let ty = &reg.self_ty;
    let inner = &shape.inner;
    let storage = match shape.kind {
        ReturnKind::BufOwned => quote! { ::udf::wrapper::BufConverter<#ty, #inner> },
        _ => quote! { #ty },
    };

    let name = &reg.name;
    let aliases = &reg.aliases;
    let default_name_used = reg.default_name_used;
    let maybe_null = shape.optional;

    let mut stream = quote! {
        impl ::udf::traits::RegisteredBasicUdf for #ty {
            type Storage = #storage;
            const NAME: &'static str = #name;
            const ALIASES: &'static [&'static str] = &[#(#aliases),*];
            const DEFAULT_NAME_USED: bool = #default_name_used;
        }
    };

    for n in reg.all_names() {
        let init_ident = symbol_ident(n, "_init")?;
        let deinit_ident = symbol_ident(n, "_deinit")?;
        let process_ident = symbol_ident(n, "")?;
        let process_fn = process_fn(&process_ident, ty, &storage, &shape);

        stream.extend(quote! {
            #[no_mangle]
            #[doc(hidden)]
            pub unsafe extern "C" fn #init_ident(
                initid: *mut ::udf::udf_sys::UDF_INIT,
                args: *mut ::udf::udf_sys::UDF_ARGS,
                message: *mut ::std::ffi::c_char,
            ) -> bool {
                unsafe {
                    ::udf::wrapper::wrap_init::<#storage, #ty>(initid, args, message, #maybe_null)
                }
            }

            #[no_mangle]
            #[doc(hidden)]
            pub unsafe extern "C" fn #deinit_ident(initid: *mut ::udf::udf_sys::UDF_INIT) {
                unsafe { ::udf::wrapper::wrap_deinit::<#storage, #ty>(initid) }
            }

            #process_fn
        });
    }

    Ok(stream)
}

fn process_fn(ident: &Ident, ty: &Type, storage: &TokenStream, shape: &ReturnShape) -> TokenStream {
    let inner = &shape.inner;

    if let ReturnKind::Int | ReturnKind::Real = shape.kind {
        let abi = if shape.kind == ReturnKind::Int {
            quote! { ::std::ffi::c_longlong }
        } else {
            quote! { ::std::ffi::c_double }
        };
        let wrap = if shape.optional {
            quote! { wrap_process_basic_option }
        } else {
            quote! { wrap_process_basic }
        };
        return quote! {
            #[no_mangle]
            #[doc(hidden)]
            pub unsafe extern "C" fn #ident(
                initid: *mut ::udf::udf_sys::UDF_INIT,
                args: *mut ::udf::udf_sys::UDF_ARGS,
                is_null: *mut ::std::ffi::c_uchar,
                error: *mut ::std::ffi::c_uchar,
            ) -> #abi {
                unsafe {
                    ::udf::wrapper::#wrap::<#storage, #ty, #inner>(initid, args, is_null, error)
                }
            }
        };
    }

    let call = match (shape.kind, shape.optional) {
        (ReturnKind::BufBorrowed, false) => quote! { wrap_process_buf::<#ty, #ty> },
        (ReturnKind::BufBorrowed, true) => quote! { wrap_process_buf_option::<#ty, #ty> },
        (_, false) => quote! { wrap_process_buf_owned::<#ty, #inner> },
        (_, true) => quote! { wrap_process_buf_owned_option::<#ty, #inner> },
    };

    quote! {
        #[no_mangle]
        #[doc(hidden)]
        pub unsafe extern "C" fn #ident(
            initid: *mut ::udf::udf_sys::UDF_INIT,
            args: *mut ::udf::udf_sys::UDF_ARGS,
            result: *mut ::std::ffi::c_char,
            length: *mut ::std::ffi::c_ulong,
            is_null: *mut ::std::ffi::c_uchar,
            error: *mut ::std::ffi::c_uchar,
        ) -> *mut ::std::ffi::c_char {
            unsafe { ::udf::wrapper::#call(initid, args, result, length, is_null, error) }
        }
    }
}

/// `xxx_clear`, `xxx_add` and maybe `xxx_remove` for every name, plus the name check
fn aggregate_fns(reg: &Registration, item: &ItemImpl) -> syn::Result<TokenStream> {
    let ty = &reg.self_ty;
    let storage = quote! { <#ty as ::udf::traits::RegisteredBasicUdf>::Storage };
    let name = &reg.name;
    let aliases = &reg.aliases;
    let overrides_remove = item
        .items
        .iter()
        .any(|i| matches!(i, ImplItem::Fn(f) if f.sig.ident == "remove"));

    let mut stream = quote! {
        const _: () = ::udf::wrapper::verify_aggregate_name::<#ty>(#name, &[#(#aliases),*]);
    };

    for n in reg.all_names() {
        let clear_ident = symbol_ident(n, "_clear")?;
        let add_ident = symbol_ident(n, "_add")?;

        stream.extend(quote! {
            #[no_mangle]
            #[doc(hidden)]
            pub unsafe extern "C" fn #clear_ident(
                initid: *mut ::udf::udf_sys::UDF_INIT,
                is_null: *mut ::std::ffi::c_uchar,
                error: *mut ::std::ffi::c_uchar,
            ) {
                unsafe { ::udf::wrapper::wrap_clear::<#storage, #ty>(initid, is_null, error) }
            }

            #[no_mangle]
            #[doc(hidden)]
            pub unsafe extern "C" fn #add_ident(
                initid: *mut ::udf::udf_sys::UDF_INIT,
                args: *mut ::udf::udf_sys::UDF_ARGS,
                is_null: *mut ::std::ffi::c_uchar,
                error: *mut ::std::ffi::c_uchar,
            ) {
                unsafe { ::udf::wrapper::wrap_add::<#storage, #ty>(initid, args, is_null, error) }
            }
        });

        if overrides_remove {
            let remove_ident = symbol_ident(n, "_remove")?;
            stream.extend(quote! {
                #[no_mangle]
                #[doc(hidden)]
                pub unsafe extern "C" fn #remove_ident(
                    initid: *mut ::udf::udf_sys::UDF_INIT,
                    args: *mut ::udf::udf_sys::UDF_ARGS,
                    is_null: *mut ::std::ffi::c_uchar,
                    error: *mut ::std::ffi::c_uchar,
                ) {
                    unsafe {
                        ::udf::wrapper::wrap_remove::<#storage, #ty>(initid, args, is_null, error)
                    }
                }
            });
        }
    }

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    fn expand(attr: TokenStream, item: TokenStream) -> String {
        register(attr, item).unwrap().to_string()
    }

    fn expand_err(attr: TokenStream, item: TokenStream) -> String {
        register(attr, item).unwrap_err().to_string()
    }

    #[test]
    fn basic_default_name() {
        let out = expand(
            quote!(),
            quote! {
                impl BasicUdf for SumInt {
                    type Returns<'a> = i64;
                }
            },
        );
        assert!(out.contains("fn sum_int_init"));
        assert!(out.contains("fn sum_int_deinit"));
        assert!(out.contains("fn sum_int ("));
        assert!(out.contains("wrap_process_basic :: < SumInt , SumInt , i64 >"));
        assert!(out.contains("const DEFAULT_NAME_USED : bool = true"));
        assert!(out.contains("c_longlong"));
    }

    #[test]
    fn default_names_keep_digits() {
        let name = |s: &str| default_name(&Ident::new(s, proc_macro2::Span::call_site()));
        assert_eq!(name("Avg2"), "avg2");
        assert_eq!(name("Md5Hash"), "md5_hash");
        assert_eq!(name("Sha256"), "sha256");
        assert_eq!(name("UdfMedian"), "udf_median");
        assert_eq!(name("Lipsum"), "lipsum");

        let out = expand(
            quote!(),
            quote! {
                impl BasicUdf for Md5Hash {
                    type Returns<'a> = Option<String>;
                }
            },
        );
        for sym in ["md5_hash", "md5_hash_init", "md5_hash_deinit"] {
            assert!(out.contains(&format!("fn {sym} (")), "missing {sym}");
        }
        assert!(!out.contains("md_5"));
    }

    #[test]
    fn names_and_aliases() {
        let out = expand(
            quote!(name = "avg2", alias = "average_two"),
            quote! {
                impl udf::BasicUdf for Avg2 {
                    type Returns<'a> = Option<f64>;
                }
            },
        );
        for sym in ["avg2", "avg2_init", "avg2_deinit", "average_two", "average_two_init"] {
            assert!(out.contains(&format!("fn {sym} (")), "missing {sym}");
        }
        assert!(out.contains("wrap_process_basic_option"));
        assert!(out.contains("const DEFAULT_NAME_USED : bool = false"));
        // `Option` returns may be null
        assert!(out.contains("message , true"));
    }

    #[test]
    fn string_returns() {
        let owned = expand(
            quote!(),
            quote! {
                impl BasicUdf for Lipsum {
                    type Returns<'a> = Option<String>;
                }
            },
        );
        assert!(owned.contains("BufConverter < Lipsum , String >"));
        assert!(owned.contains("wrap_process_buf_owned_option :: < Lipsum , String >"));

        let borrowed = expand(
            quote!(),
            quote! {
                impl BasicUdf for Attribute {
                    type Returns<'a> = &'a str;
                }
            },
        );
        assert!(borrowed.contains("type Storage = Attribute"));
        assert!(borrowed.contains("wrap_process_buf :: < Attribute , Attribute >"));
    }

    #[test]
    fn aggregate_remove_only_when_overridden() {
        let item = quote! {
            impl AggregateUdf for Median {
                fn clear(&mut self) {}
                fn add(&mut self) {}
            }
        };
        let out = expand(quote!(), item);
        assert!(out.contains("fn median_clear"));
        assert!(out.contains("fn median_add"));
        assert!(!out.contains("median_remove"));
        assert!(out.contains("verify_aggregate_name :: < Median >"));

        let item = quote! {
            impl AggregateUdf for Median {
                fn remove(&mut self) {}
            }
        };
        assert!(expand(quote!(), item).contains("fn median_remove"));
    }

    #[test]
    fn errors() {
        let item = quote! { impl Clone for Foo {} };
        assert_eq!(expand_err(quote!(), item), "expected trait `BasicUdf` or `AggregateUdf`");

        let item = quote! { impl Foo {} };
        assert_eq!(expand_err(quote!(), item), "expected trait `BasicUdf` or `AggregateUdf`");

        let item = quote! { impl BasicUdf for Foo { type Returns<'a> = i64; } };
        assert_eq!(
            expand_err(quote!(name = "not valid"), item.clone()),
            "`not valid` is not a valid symbol name"
        );
        assert_eq!(
            expand_err(quote!(name = "a", name = "b"), item),
            "`name` may only be given once"
        );

        let item = quote! { impl BasicUdf for Foo {} };
        assert_eq!(expand_err(quote!(), item), "missing `type Returns`");
    }
}
