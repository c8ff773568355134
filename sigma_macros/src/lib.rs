//! `#[native_fn]` turns a typed Rust function into a registry-compatible
//! native function for `sigma-rs`.
//!
//! ```ignore
//! #[native_fn]
//! fn hypot(precision: Precision, x: Number, y: Number) -> Result<Number, EvalError> { .. }
//! ```
//!
//! expands to `pub fn hypot(precision: Precision, args: &[Number]) -> Result<Number, EvalError>`
//! with the arity check and argument extraction generated. Parameter types
//! may be `Precision` (receives the evaluation precision), `Number` (one
//! argument each) and, last, `Vec<Number>` (all remaining arguments).
//!
//! Options: `name = "isPrime"` sets the name reported in arity errors,
//! `min_args = 2` sets the minimum count when a `Vec<Number>` is present.
//! The generated code refers to `crate::` paths and only works inside the
//! `sigma-rs` crate.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, Ident, ItemFn, LitInt, LitStr, Pat, PatType, Type};

enum Parameter {
    Precision(Ident),
    Scalar(Ident),
    Rest(Ident),
}

fn type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}

fn classify(arg: &FnArg) -> syn::Result<Parameter> {
    let FnArg::Typed(PatType { pat, ty, .. }) = arg else {
        return Err(syn::Error::new_spanned(arg, "native functions cannot take self"));
    };
    let ident = match **pat {
        Pat::Ident(ref ident) => ident.ident.clone(),
        _ => return Err(syn::Error::new_spanned(pat, "unsupported parameter pattern")),
    };
    match type_name(ty).as_deref() {
        Some("Precision") => Ok(Parameter::Precision(ident)),
        Some("Number") => Ok(Parameter::Scalar(ident)),
        Some("Vec") => Ok(Parameter::Rest(ident)),
        _ => Err(syn::Error::new_spanned(
            ty,
            "expected Precision, Number or Vec<Number>",
        )),
    }
}

fn expand(
    name: Option<LitStr>,
    min_args: Option<LitInt>,
    input: ItemFn,
) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = &input.attrs;
    let fn_name = &input.sig.ident;
    let fn_output = &input.sig.output;
    let fn_body = &input.block;
    let reported_name = name.map_or_else(|| fn_name.to_string(), |lit| lit.value());

    let precision_arg = format_ident!("__precision");
    let values_arg = format_ident!("__args");

    let mut extractions = Vec::new();
    let mut scalar_count = 0usize;
    let mut has_rest = false;

    for arg in input.sig.inputs.iter() {
        if has_rest {
            return Err(syn::Error::new_spanned(
                arg,
                "Vec<Number> must be the last parameter",
            ));
        }
        match classify(arg)? {
            Parameter::Precision(ident) => extractions.push(quote! {
                let #ident: crate::kernel::Precision = #precision_arg;
            }),
            Parameter::Scalar(ident) => {
                let position = scalar_count;
                extractions.push(quote! {
                    let #ident: crate::kernel::Number = #values_arg[#position].clone();
                });
                scalar_count += 1;
            }
            Parameter::Rest(ident) => {
                let position = scalar_count;
                extractions.push(quote! {
                    let #ident: Vec<crate::kernel::Number> = #values_arg[#position..].to_vec();
                });
                has_rest = true;
            }
        }
    }

    let arity_check = if has_rest {
        let minimum = match min_args {
            Some(lit) => lit.base10_parse::<usize>()?,
            None => scalar_count + 1,
        };
        if minimum < scalar_count {
            return Err(syn::Error::new(
                Span::call_site(),
                "min_args cannot be below the number of Number parameters",
            ));
        }
        quote! {
            if #values_arg.len() < #minimum {
                return Err(crate::error::EvalError::ArityMismatch {
                    function: #reported_name.to_string(),
                    expected: crate::error::Arity::AtLeast(#minimum),
                    found: #values_arg.len(),
                });
            }
        }
    } else {
        if let Some(lit) = min_args {
            return Err(syn::Error::new_spanned(
                lit,
                "min_args requires a trailing Vec<Number> parameter",
            ));
        }
        quote! {
            if #values_arg.len() != #scalar_count {
                return Err(crate::error::EvalError::ArityMismatch {
                    function: #reported_name.to_string(),
                    expected: crate::error::Arity::Exact(#scalar_count),
                    found: #values_arg.len(),
                });
            }
        }
    };

    Ok(quote! {
        #(#attrs)*
        pub fn #fn_name(
            #precision_arg: crate::kernel::Precision,
            #values_arg: &[crate::kernel::Number],
        ) #fn_output {
            #arity_check

            #(#extractions)*

            #fn_body
        }
    })
}

#[proc_macro_attribute]
pub fn native_fn(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut name: Option<LitStr> = None;
    let mut min_args: Option<LitInt> = None;
    let attr_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("min_args") {
            min_args = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported native_fn option"))
        }
    });
    parse_macro_input!(attr with attr_parser);
    let input = parse_macro_input!(item as ItemFn);

    expand(name, min_args, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
