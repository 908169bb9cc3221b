mod types;
pub use types::ConfigGateway;

mod http_gateway;
pub use http_gateway::HttpGateway;
