/// failures raised while turning caller-supplied values (form fields, query
/// arguments, serialized route boxes) into typed engine inputs.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("invalid {axis} '{value}', must be in range [{min},{max}]")]
    InvalidCoordinate {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("not a number: '{0}'")]
    NotANumber(String),
    #[error("route polygon requires at least one rectangle")]
    EmptyRectangles,
    #[error("malformed rectangle list: {0}")]
    MalformedRectangles(String),
    #[error("unable to parse date '{0}'")]
    UnparseableDate(String),
    #[error("unknown fuzziness '{0}', expected one of 1-hours, 2-hours, 3-hours, 4-hours, 5-hours, day, week, anytime")]
    UnknownFuzziness(String),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("malformed JSON input: {0}")]
    MalformedJson(String),
}
