mod reader;

pub use reader::{ChainReader, RpcChainReader};
