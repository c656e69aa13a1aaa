//! Procedural macros used in the definition and implementation of getters and setters for PolicySettings

use quote::quote;
use syn::parse::ParseStream;
use syn::parse::{Parse, Result};
use syn::{Expr, Ident, Token};

type ValueName = Ident;
type ValueType = Ident;
type DefaultValue = Expr;

/// Signature contains the results of parsing a ps_gets_and_sets definition, i.e., the
/// name of a value stored in a PolicySettings map and the corresponding type.
struct Signature {
    value_name: ValueName,
    value_type: ValueType,
}

/// Syntax contains the components of a ps_gets_and_sets, i.e., a value name, a comma and
/// a value type. For example:
///     ```
///     ps_gets_and_sets!(PS_TRUST_ANCHOR_FOLDER, String);
///     ```
struct Syntax {
    value_name: ValueName,
    _comma_token: Token!(,),
    value_type: ValueType,
}

/// SignatureWithDefault contains the results of parsing a ps_gets_and_sets_with_default definition,
/// i.e., the name of a value stored in a PolicySettings map, the corresponding type and the
/// value returned when the map does not contain the named item.
struct SignatureWithDefault {
    value_name: ValueName,
    value_type: ValueType,
    default_value: DefaultValue,
}

/// SyntaxWithDefault contains the components of a ps_gets_and_sets_with_default. For example:
///     ```
///     ps_gets_and_sets_with_default!(PS_MAX_CHAIN_LENGTH, u8, PS_MAX_CHAIN_LENGTH_DEFAULT);
///     ```
struct SyntaxWithDefault {
    value_name: ValueName,
    _comma_token: Token!(,),
    value_type: ValueType,
    _comma_token2: Token!(,),
    default_value: DefaultValue,
}

impl Parse for Signature {
    fn parse(stream: ParseStream) -> Result<Self> {
        if stream.is_empty() {
            panic!("Write full function signature.");
        }

        let syntax = Syntax {
            value_name: stream.parse()?,
            _comma_token: stream.parse()?,
            value_type: stream.parse()?,
        };

        Ok(Signature {
            value_name: syntax.value_name,
            value_type: syntax.value_type,
        })
    }
}

impl Parse for SignatureWithDefault {
    fn parse(stream: ParseStream) -> Result<Self> {
        if stream.is_empty() {
            panic!("Write full function signature.");
        }

        let syntax = SyntaxWithDefault {
            value_name: stream.parse()?,
            _comma_token: stream.parse()?,
            value_type: stream.parse()?,
            _comma_token2: stream.parse()?,
            default_value: stream.parse()?,
        };

        Ok(SignatureWithDefault {
            value_name: syntax.value_name,
            value_type: syntax.value_type,
            default_value: syntax.default_value,
        })
    }
}

/// is_string_numeric is used to determine if a string value contains only numeric characters.
/// It is used to process a slice that omits the first character, i.e., in order to identify
/// types like u8, u32, etc.
fn is_string_numeric(str: &str) -> bool {
    !str.is_empty() && str.chars().all(|c| c.is_numeric())
}

/// Names shared by both macros: getter and setter identifiers, the PolicyProcessingTypes variant
/// that holds the value and the doc comments attached to each generated function.
struct Accessors {
    getter: Ident,
    setter: Ident,
    variant: Ident,
    getter_comment: String,
    setter_comment: String,
}

fn accessors(flag: &Ident, value_type: &Ident) -> Accessors {
    // PS_ prefix is dropped from generated function names
    let flag_str = format!("{}", flag)[3..].to_lowercase();
    let getter_str = format!("get_{}", flag_str);
    let setter_str = format!("set_{}", flag_str);
    let type_str = format!("{}", value_type);
    let mut variant_str = if is_string_numeric(&type_str[1..]) {
        type_str.to_uppercase()
    } else {
        type_str
    };
    if variant_str == "bool" {
        variant_str = "Bool".to_string();
    }

    Accessors {
        getter: syn::Ident::new(&getter_str, flag.span()),
        setter: syn::Ident::new(&setter_str, flag.span()),
        variant: syn::Ident::new(&variant_str, value_type.span()),
        getter_comment: format!(
            "`{}` is used to retrieve `{}` items from a [`PolicySettings`] instance",
            getter_str, flag
        ),
        setter_comment: format!(
            "`{}` is used to set `{}` items in a [`PolicySettings`] instance",
            setter_str, flag
        ),
    }
}

/// `ps_gets_and_sets` generates an `Option`-returning getter and a setter on `PolicySettings` for
/// the named item.
#[proc_macro]
pub fn ps_gets_and_sets(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let signature = syn::parse_macro_input!(input as Signature);
    let flag = signature.value_name;
    let return_t = signature.value_type;
    let Accessors {
        getter,
        setter,
        variant,
        getter_comment,
        setter_comment,
    } = accessors(&flag, &return_t);

    let tokens = quote! {
        impl PolicySettings {
            #[doc = #getter_comment]
            pub fn #getter(&self) -> Option<#return_t> {
                match self.0.get(#flag) {
                    Some(PolicyProcessingTypes::#variant(v)) => Some(v.clone()),
                    _ => None,
                }
            }
            #[doc = #setter_comment]
            pub fn #setter(&mut self, v: #return_t) {
                self.0.insert(
                    #flag.to_string(),
                    PolicyProcessingTypes::#variant(v),
                );
            }
        }
    };
    tokens.into()
}

/// `ps_gets_and_sets_with_default` generates a getter that falls back to the given default value
/// and a setter on `PolicySettings` for the named item.
#[proc_macro]
pub fn ps_gets_and_sets_with_default(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let signature = syn::parse_macro_input!(input as SignatureWithDefault);
    let flag = signature.value_name;
    let return_t = signature.value_type;
    let default_value = signature.default_value;
    let Accessors {
        getter,
        setter,
        variant,
        getter_comment,
        setter_comment,
    } = accessors(&flag, &return_t);

    let tokens = quote! {
        impl PolicySettings {
            #[doc = #getter_comment]
            pub fn #getter(&self) -> #return_t {
                match self.0.get(#flag) {
                    Some(PolicyProcessingTypes::#variant(v)) => v.clone(),
                    _ => #default_value,
                }
            }
            #[doc = #setter_comment]
            pub fn #setter(&mut self, v: #return_t) {
                self.0.insert(
                    #flag.to_string(),
                    PolicyProcessingTypes::#variant(v),
                );
            }
        }
    };
    tokens.into()
}
