mod test_gateway;

pub use test_gateway::TestGateway;

pub const TEST_ACCESS_KEY: &str = "AK123";
pub const TEST_SECRET_KEY: &str = "SK456";
pub const TEST_API_NAME: &str = "echo";
pub const TEST_API_VERSION: &str = "1.0";
