//! Text search functions.
//!
//! PostgreSQL text search functions take an optional leading configuration
//! name. Callers usually pass it as a plain string, so the first argument
//! of a call with more than one argument is bound as `REGCONFIG` rather
//! than as text. Every bound argument is keyed by the function name.
//!
//! ```rust
//! use sqlweave_core::coercion::Argument;
//! use sqlweave_core::element::table_column;
//! use sqlweave_core::types::DataType;
//! use sqlweave_postgres::functions::to_tsvector;
//! use sqlweave_postgres::types::regconfig;
//!
//! let body = table_column("docs", "body", DataType::Text);
//! let vector = to_tsvector([Argument::from("english"), Argument::from(body)]).unwrap();
//! let call = vector.downcast_ref::<sqlweave_core::element::FunctionCall>().unwrap();
//! assert_eq!(call.arguments[0].data_type(), regconfig());
//! ```

use sqlweave_core::coercion::{coerce_with, Argument, CoerceOptions, Role};
use sqlweave_core::element::{FunctionCall, Node};
use sqlweave_core::error::Result;
use sqlweave_core::types::DataType;

use crate::types::{is_tsquery, regconfig, tsquery, tsvector};

fn regconfig_call(
    name: &str,
    args: Vec<Argument>,
    has_regconfig: bool,
    data_type: DataType,
) -> Result<Node> {
    let plain = CoerceOptions::default().named(name);
    let mut args = args.into_iter();
    let mut arguments = Vec::with_capacity(args.len());
    if has_regconfig {
        if let Some(config) = args.next() {
            let options = CoerceOptions::typed(regconfig()).named(name);
            arguments.push(coerce_with(Role::ExpressionElement, config, &options)?);
        }
    }
    for arg in args {
        arguments.push(coerce_with(Role::ExpressionElement, arg, &plain)?);
    }
    Ok(Node::new(FunctionCall::new(name, arguments, data_type)))
}

fn regconfig_fn<I>(name: &str, args: I, data_type: DataType) -> Result<Node>
where
    I: IntoIterator<Item = Argument>,
{
    let args: Vec<Argument> = args.into_iter().collect();
    let has_regconfig = args.len() > 1;
    regconfig_call(name, args, has_regconfig, data_type)
}

/// `to_tsvector([config,] document)`, returning `TSVECTOR`.
///
/// # Errors
///
/// Returns a coercion error if an argument is not an expression.
pub fn to_tsvector<I: IntoIterator<Item = Argument>>(args: I) -> Result<Node> {
    regconfig_fn("to_tsvector", args, tsvector())
}

/// `to_tsquery([config,] query)`, returning `TSQUERY`.
///
/// # Errors
///
/// Returns a coercion error if an argument is not an expression.
pub fn to_tsquery<I: IntoIterator<Item = Argument>>(args: I) -> Result<Node> {
    regconfig_fn("to_tsquery", args, tsquery())
}

/// `plainto_tsquery([config,] query)`, returning `TSQUERY`.
///
/// # Errors
///
/// Returns a coercion error if an argument is not an expression.
pub fn plainto_tsquery<I: IntoIterator<Item = Argument>>(args: I) -> Result<Node> {
    regconfig_fn("plainto_tsquery", args, tsquery())
}

/// `phraseto_tsquery([config,] query)`, returning `TSQUERY`.
///
/// # Errors
///
/// Returns a coercion error if an argument is not an expression.
pub fn phraseto_tsquery<I: IntoIterator<Item = Argument>>(args: I) -> Result<Node> {
    regconfig_fn("phraseto_tsquery", args, tsquery())
}

/// `websearch_to_tsquery([config,] query)`, returning `TSQUERY`.
///
/// # Errors
///
/// Returns a coercion error if an argument is not an expression.
pub fn websearch_to_tsquery<I: IntoIterator<Item = Argument>>(args: I) -> Result<Node> {
    regconfig_fn("websearch_to_tsquery", args, tsquery())
}

/// `ts_headline([config,] document, query [, options])`, returning `TEXT`.
///
/// The configuration is optional in the middle of the signature, so the
/// argument count alone cannot identify it: when the second argument is an
/// expression already typed `TSQUERY`, the call has no configuration.
///
/// # Errors
///
/// Returns a coercion error if an argument is not an expression.
pub fn ts_headline<I: IntoIterator<Item = Argument>>(args: I) -> Result<Node> {
    let args: Vec<Argument> = args.into_iter().collect();
    let has_regconfig = match args.get(1) {
        None => false,
        Some(second) => !second
            .as_element()
            .is_some_and(|node| node.is_column_element() && is_tsquery(&node.data_type())),
    };
    regconfig_call("ts_headline", args, has_regconfig, DataType::Text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlweave_core::element::{table_column, BindParameter};

    fn arguments(node: &Node) -> &[Node] {
        &node.downcast_ref::<FunctionCall>().unwrap().arguments
    }

    fn body() -> Node {
        table_column("docs", "body", DataType::Text)
    }

    #[test]
    fn test_single_argument_has_no_config() {
        let node = to_tsvector([Argument::from("fat cats")]).unwrap();
        assert_eq!(node.data_type(), tsvector());
        let args = arguments(&node);
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].data_type(), DataType::Varchar(None));
    }

    #[test]
    fn test_config_argument_is_regconfig() {
        let node = to_tsquery([Argument::from("english"), Argument::from("fat & rat")]).unwrap();
        assert_eq!(node.data_type(), tsquery());
        let args = arguments(&node);
        assert_eq!(args[0].data_type(), regconfig());
        assert_eq!(args[1].data_type(), DataType::Varchar(None));
        let bind = args[0].downcast_ref::<BindParameter>().unwrap();
        assert_eq!(bind.key.as_deref(), Some("to_tsquery"));
    }

    #[test]
    fn test_config_column_keeps_its_type() {
        let config = table_column("docs", "lang", DataType::Text);
        let node = to_tsvector([Argument::from(config), Argument::from(body())]).unwrap();
        assert_eq!(arguments(&node)[0].data_type(), DataType::Text);
    }

    #[test]
    fn test_every_tsquery_family_member() {
        let builders: [fn(Vec<Argument>) -> Result<Node>; 3] =
            [plainto_tsquery, phraseto_tsquery, websearch_to_tsquery];
        for build in builders {
            let node = build(vec![Argument::from("simple"), Argument::from("a b")]).unwrap();
            assert_eq!(node.data_type(), tsquery());
            assert_eq!(arguments(&node)[0].data_type(), regconfig());
        }
    }

    #[test]
    fn test_ts_headline_with_tsquery_second() {
        let query = to_tsquery([Argument::from("cats")]).unwrap();
        let node = ts_headline([Argument::from(body()), Argument::from(query)]).unwrap();
        assert_eq!(node.data_type(), DataType::Text);
        let args = arguments(&node);
        assert_eq!(args[0].data_type(), DataType::Text);
        assert_eq!(args[1].data_type(), tsquery());
    }

    #[test]
    fn test_ts_headline_with_config() {
        let query = to_tsquery([Argument::from("cats")]).unwrap();
        let node = ts_headline([
            Argument::from("english"),
            Argument::from(body()),
            Argument::from(query),
        ])
        .unwrap();
        assert_eq!(arguments(&node)[0].data_type(), regconfig());
    }

    #[test]
    fn test_ts_headline_two_plain_arguments() {
        let node = ts_headline([Argument::from("english"), Argument::from("some text")]).unwrap();
        assert_eq!(arguments(&node)[0].data_type(), regconfig());

        let single = ts_headline([Argument::from("text")]).unwrap();
        assert_eq!(arguments(&single)[0].data_type(), DataType::Varchar(None));
    }
}
