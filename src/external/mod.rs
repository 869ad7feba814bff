pub mod messaging;
pub mod sheet;

pub use messaging::*;
pub use sheet::*;

#[cfg(test)]
pub(crate) mod test_server;
