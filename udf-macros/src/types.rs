//LICENSE Portions Copyright 2019-2021 ZomboDB, LLC.
//LICENSE
//LICENSE Portions Copyright 2021-2023 Technology Concepts & Design, Inc.
//LICENSE
//LICENSE Portions Copyright 2023-2023 PgCentral Foundation, Inc. <contact@pgcentral.org>
//LICENSE
//LICENSE All rights reserved.
//LICENSE
//LICENSE Use of this source code is governed by the MIT license that can be found in the LICENSE file.
//! What `#[register]` needs to know about its arguments and the impl block
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Expr, ExprLit, GenericArgument, Lit, LitStr, MetaNameValue, PathArguments, Token, Type};

/// The contents of `#[register(...)]`
#[derive(Debug, Default)]
pub struct RegisterArgs {
    pub name: Option<LitStr>,
    pub aliases: Vec<LitStr>,
}

impl Parse for RegisterArgs {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let mut args = Self::default();
        let metas = Punctuated::<MetaNameValue, Token![,]>::parse_terminated(input)?;

        for meta in metas {
            let value = match &meta.value {
                Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => s.clone(),
                other => {
                    return Err(syn::Error::new_spanned(other, "expected a string literal"));
                }
            };

            if meta.path.is_ident("name") {
                if args.name.is_some() {
                    return Err(syn::Error::new_spanned(
                        &meta.path,
                        "`name` may only be given once",
                    ));
                }
                args.name = Some(value);
            } else if meta.path.is_ident("alias") {
                args.aliases.push(value);
            } else {
                return Err(syn::Error::new_spanned(
                    &meta.path,
                    "unknown argument, expected `name` or `alias`",
                ));
            }
        }

        Ok(args)
    }
}

/// Which trait the impl block is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplKind {
    Basic,
    Aggregate,
}

impl ImplKind {
    /// Match `BasicUdf`, `udf::BasicUdf`, `udf::traits::BasicUdf`, `::udf::...`
    pub fn from_trait_path(path: &syn::Path) -> Option<Self> {
        let last = path.segments.last()?;
        let prefix_ok = path
            .segments
            .iter()
            .rev()
            .skip(1)
            .map(|s| s.ident.to_string())
            .all(|s| s == "udf" || s == "traits" || s == "prelude");
        if !prefix_ok {
            return None;
        }
        if last.ident == "BasicUdf" {
            Some(Self::Basic)
        } else if last.ident == "AggregateUdf" {
            Some(Self::Aggregate)
        } else {
            None
        }
    }
}

/// Which `extern "C"` process signature a `Returns` type needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// `i64`, returned as `c_longlong`
    Int,
    /// `f64`, returned as `c_double`
    Real,
    /// Borrows from the function's state, returned as a pointer into it
    BufBorrowed,
    /// Owned, stashed in a `BufConverter` until the next call
    BufOwned,
}

/// A classified `Returns` type
#[derive(Debug, Clone)]
pub struct ReturnShape {
    pub kind: ReturnKind,
    pub optional: bool,
    /// `Returns` with any outer `Option` removed
    pub inner: Type,
}

impl ReturnShape {
    pub fn classify(ty: &Type) -> Self {
        let (optional, inner) = match option_inner(ty) {
            Some(inner) => (true, inner.clone()),
            None => (false, ty.clone()),
        };

        let kind = if is_ident(&inner, "i64") {
            ReturnKind::Int
        } else if is_ident(&inner, "f64") {
            ReturnKind::Real
        } else if has_lifetime(&inner) {
            ReturnKind::BufBorrowed
        } else {
            ReturnKind::BufOwned
        };

        Self { kind, optional, inner }
    }
}

fn is_ident(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(p) => p.qself.is_none() && p.path.is_ident(name),
        Type::Group(g) => is_ident(&g.elem, name),
        _ => false,
    }
}

/// `T` if `ty` is `Option<T>`
fn option_inner(ty: &Type) -> Option<&Type> {
    let p = match ty {
        Type::Path(p) => p,
        Type::Group(g) => return option_inner(&g.elem),
        _ => return None,
    };
    let last = p.path.segments.last()?;
    if last.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(t) if args.args.len() == 1 => Some(t),
        _ => None,
    }
}

/// References and anything with a lifetime parameter can borrow from the state
fn has_lifetime(ty: &Type) -> bool {
    match ty {
        Type::Reference(_) => true,
        Type::Group(g) => has_lifetime(&g.elem),
        Type::Paren(p) => has_lifetime(&p.elem),
        Type::Path(p) => p.path.segments.iter().any(|seg| match &seg.arguments {
            PathArguments::AngleBracketed(args) => args.args.iter().any(|a| match a {
                GenericArgument::Lifetime(_) => true,
                GenericArgument::Type(t) => has_lifetime(t),
                _ => false,
            }),
            _ => false,
        }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn shape(ty: Type) -> (ReturnKind, bool) {
        let s = ReturnShape::classify(&ty);
        (s.kind, s.optional)
    }

    #[test]
    fn classify_returns() {
        assert_eq!(shape(parse_quote!(i64)), (ReturnKind::Int, false));
        assert_eq!(shape(parse_quote!(Option<i64>)), (ReturnKind::Int, true));
        assert_eq!(shape(parse_quote!(f64)), (ReturnKind::Real, false));
        assert_eq!(shape(parse_quote!(Option<f64>)), (ReturnKind::Real, true));
        assert_eq!(shape(parse_quote!(&'a str)), (ReturnKind::BufBorrowed, false));
        assert_eq!(shape(parse_quote!(Option<&'a [u8]>)), (ReturnKind::BufBorrowed, true));
        assert_eq!(shape(parse_quote!(Cow<'a, str>)), (ReturnKind::BufBorrowed, false));
        assert_eq!(shape(parse_quote!(&'static str)), (ReturnKind::BufBorrowed, false));
        assert_eq!(shape(parse_quote!(String)), (ReturnKind::BufOwned, false));
        assert_eq!(shape(parse_quote!(Option<Vec<u8>>)), (ReturnKind::BufOwned, true));
        assert_eq!(shape(parse_quote!(std::option::Option<String>)), (ReturnKind::BufOwned, true));
    }

    #[test]
    fn inner_strips_option() {
        let s = ReturnShape::classify(&parse_quote!(Option<String>));
        let expected: Type = parse_quote!(String);
        assert_eq!(s.inner, expected);
    }

    #[test]
    fn parse_args() {
        let args: RegisterArgs = syn::parse_quote!(name = "foo", alias = "bar", alias = "baz");
        assert_eq!(args.name.unwrap().value(), "foo");
        let aliases: Vec<_> = args.aliases.iter().map(LitStr::value).collect();
        assert_eq!(aliases, ["bar", "baz"]);

        let empty: RegisterArgs = syn::parse_str("").unwrap();
        assert!(empty.name.is_none());
        assert!(empty.aliases.is_empty());
    }

    #[test]
    fn bad_args() {
        let err = syn::parse_str::<RegisterArgs>(r#"name = "a", name = "b""#).unwrap_err();
        assert_eq!(err.to_string(), "`name` may only be given once");
        let err = syn::parse_str::<RegisterArgs>(r#"nme = "a""#).unwrap_err();
        assert_eq!(err.to_string(), "unknown argument, expected `name` or `alias`");
        let err = syn::parse_str::<RegisterArgs>("name = 1").unwrap_err();
        assert_eq!(err.to_string(), "expected a string literal");
    }

    #[test]
    fn trait_paths() {
        let p = |s: &str| syn::parse_str::<syn::Path>(s).unwrap();
        assert_eq!(ImplKind::from_trait_path(&p("BasicUdf")), Some(ImplKind::Basic));
        assert_eq!(ImplKind::from_trait_path(&p("udf::BasicUdf")), Some(ImplKind::Basic));
        assert_eq!(
            ImplKind::from_trait_path(&p("::udf::traits::AggregateUdf")),
            Some(ImplKind::Aggregate)
        );
        assert_eq!(ImplKind::from_trait_path(&p("other::BasicUdf")), None);
        assert_eq!(ImplKind::from_trait_path(&p("Clone")), None);
    }
}
