mod check;
mod parse;
mod tokens;

pub(crate) use check::cmd_check;
pub(crate) use parse::cmd_parse;
pub(crate) use tokens::cmd_tokens;
