pub mod logging;
pub mod syntax;
pub mod url;

#[cfg(test)]
pub(crate) mod test_utils;
