//! Fixed values of the container and output contracts.

/// TCP port the search engine listens on.
pub const SERVICE_PORT: u16 = 8108;

/// HTTP path answering the readiness probe.
pub const HEALTH_CHECK_PATH: &str = "/health";

/// Port of the public load balancer listener.
pub const LISTENER_PORT: u16 = 80;

/// Field name inside the credential secret.
pub const API_KEY_FIELD: &str = "apiKey";

/// Environment variable the container reads the credential from.
pub const API_KEY_ENV_VAR: &str = "TYPESENSE_API_KEY";

/// Container name inside every task definition.
pub const CONTAINER_NAME: &str = "typesense";

/// Source range for the public ingress rules.
pub const ANY_IPV4: &str = "0.0.0.0/0";

pub const OUTPUT_API_URL: &str = "api-url";
pub const OUTPUT_API_KEY_SECRET_ARN: &str = "api-key-secret-arn";
pub const OUTPUT_CLUSTER_NAME: &str = "cluster-name";
pub const OUTPUT_SERVICE_NAME: &str = "service-name";
