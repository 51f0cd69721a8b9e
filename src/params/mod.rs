//! scalar configuration parameters
//!
//! typed getters with validation flags, table-driven reads, detection of
//! unknown parameters and a writer for templates.

mod extract;
mod flags;
mod table;
mod template;

pub use extract::{
    get_bool_param, get_duration_param, get_float_param, get_int64_param, get_int_param,
    get_size_param, get_string_param,
};
pub use flags::ParamFlags;
pub use table::{
    check_unknown_parameters, read_scalar_params, ParamTarget, ScalarParam, UnknownKind, UnknownParameter,
};
pub use template::TemplateWriter;
