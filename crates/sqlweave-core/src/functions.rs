//! SQL function constructors.

use crate::coercion::{coerce, Argument, Role};
use crate::element::{FunctionCall, Node};
use crate::error::Result;
use crate::types::DataType;

/// Creates a call to the function `name` returning `data_type`, coercing
/// each argument under the expression role.
///
/// # Errors
///
/// Returns a coercion error for arguments that are not expressions.
pub fn func<I, A>(name: &str, args: I, data_type: DataType) -> Result<Node>
where
    I: IntoIterator<Item = A>,
    A: Into<Argument>,
{
    let arguments = args
        .into_iter()
        .map(|arg| coerce(Role::ExpressionElement, arg))
        .collect::<Result<Vec<_>>>()?;
    Ok(Node::new(FunctionCall::new(name, arguments, data_type)))
}

/// `count(expr)`.
///
/// # Errors
///
/// Returns a coercion error if `arg` is not an expression.
pub fn count(arg: impl Into<Argument>) -> Result<Node> {
    func("count", [arg], DataType::Bigint)
}

/// `array_agg(expr)`, typed as an array of the argument's type.
///
/// # Errors
///
/// Returns a coercion error if `arg` is not an expression.
pub fn array_agg(arg: impl Into<Argument>) -> Result<Node> {
    array_agg_with([arg.into()], None, DataType::array)
}

/// `array_agg` with an explicit return type and array type constructor.
///
/// An explicit `data_type` is used as given. Otherwise an argument already
/// typed as an array keeps its type, and any other argument type (unknown
/// included) is wrapped with `array_type`.
///
/// # Errors
///
/// Returns a coercion error for arguments that are not expressions.
pub fn array_agg_with<I>(
    args: I,
    data_type: Option<DataType>,
    array_type: fn(DataType) -> DataType,
) -> Result<Node>
where
    I: IntoIterator<Item = Argument>,
{
    let arguments = args
        .into_iter()
        .map(|arg| coerce(Role::ExpressionElement, arg))
        .collect::<Result<Vec<_>>>()?;
    let data_type = data_type.unwrap_or_else(|| {
        match arguments.first().map_or(DataType::Null, Node::data_type) {
            array @ DataType::Array { .. } => array,
            item => array_type(item),
        }
    });
    Ok(Node::new(FunctionCall::new("array_agg", arguments, data_type)))
}
