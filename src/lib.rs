pub mod config;
pub mod oracle;
pub mod report;
pub mod resolver;
pub mod rpc_oracle;

pub use oracle::{BlockOracle, BlockRef, OracleError, Sample};
pub use resolver::{BlockResolver, ResolutionResult, ResolveError, ResolverSettings};
pub use rpc_oracle::RpcOracle;
