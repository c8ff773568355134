use crate::kernel::Number;

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionResult {
    Single(Number),
    Multiple(Vec<Number>),
}

impl FunctionResult {
    /// The value of a scalar result.
    pub fn as_number(&self) -> Option<&Number> {
        if let FunctionResult::Single(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// The values of a multi-valued result.
    pub fn as_list(&self) -> Option<&[Number]> {
        if let FunctionResult::Multiple(values) = self {
            Some(values)
        } else {
            None
        }
    }
}
