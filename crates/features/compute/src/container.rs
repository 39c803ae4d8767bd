use sdeck_domain::constants::{API_KEY_ENV_VAR, CONTAINER_NAME, SERVICE_PORT};
use serde_json::{Value, json};
use typed_builder::TypedBuilder;

/// Name of the task volume backing the data directory.
pub const DATA_VOLUME: &str = "data";

/// Container definition of the search process, shared by both topologies.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ContainerSpec {
    #[builder(setter(into))]
    image: String,
    #[builder(setter(into))]
    data_dir: String,
    #[builder(default = true)]
    enable_cors: bool,
    /// Runtime reference to the credential field, injected as `TYPESENSE_API_KEY`.
    api_key_from: Value,
    /// Log group the container writes to.
    log_group: Value,
    #[builder(setter(into))]
    log_stream_prefix: String,
    /// Host port; `None` leaves the mapping to the network mode.
    #[builder(default, setter(strip_option))]
    host_port: Option<u16>,
    #[builder(default, setter(strip_option))]
    memory_reservation_mib: Option<u32>,
    /// Mount the [`DATA_VOLUME`] at the data directory.
    #[builder(default)]
    mount_data_volume: bool,
}

impl ContainerSpec {
    /// Process arguments: `--data-dir <path>` and, if enabled, `--enable-cors`.
    #[must_use]
    pub fn command(&self) -> Vec<String> {
        let mut args = vec!["--data-dir".to_owned(), self.data_dir.clone()];
        if self.enable_cors {
            args.push("--enable-cors".to_owned());
        }
        args
    }

    /// Renders the `ContainerDefinitions` entry.
    #[must_use]
    pub fn render(&self) -> Value {
        let mut mapping = json!({ "ContainerPort": SERVICE_PORT, "Protocol": "tcp" });
        if let Some(host_port) = self.host_port {
            mapping["HostPort"] = json!(host_port);
        }

        let mut definition = json!({
            "Name": CONTAINER_NAME,
            "Image": self.image,
            "Essential": true,
            "Command": self.command(),
            "PortMappings": [mapping],
            "Secrets": [{ "Name": API_KEY_ENV_VAR, "ValueFrom": self.api_key_from }],
            "LogConfiguration": {
                "LogDriver": "awslogs",
                "Options": {
                    "awslogs-group": self.log_group,
                    "awslogs-region": { "Ref": "AWS::Region" },
                    "awslogs-stream-prefix": self.log_stream_prefix,
                },
            },
        });

        if let Some(memory) = self.memory_reservation_mib {
            definition["MemoryReservation"] = json!(memory);
        }
        if self.mount_data_volume {
            definition["MountPoints"] = json!([{
                "SourceVolume": DATA_VOLUME,
                "ContainerPath": self.data_dir,
                "ReadOnly": false,
            }]);
        }
        definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_follows_container_contract() {
        let spec = ContainerSpec::builder()
            .image("typesense/typesense:27.1")
            .data_dir("/data")
            .api_key_from(json!({ "Ref": "ApiKeySecret" }))
            .log_group(json!({ "Ref": "LogGroup" }))
            .log_stream_prefix("typesense")
            .build();
        assert_eq!(spec.command(), ["--data-dir", "/data", "--enable-cors"]);

        let quiet = ContainerSpec::builder()
            .image("img")
            .data_dir("/var/lib/search")
            .enable_cors(false)
            .api_key_from(Value::Null)
            .log_group(Value::Null)
            .log_stream_prefix("p")
            .build();
        assert_eq!(quiet.command(), ["--data-dir", "/var/lib/search"]);
    }

    #[test]
    fn bridge_definition_maps_host_port_and_mounts_data() {
        let rendered = ContainerSpec::builder()
            .image("typesense/typesense:27.1")
            .data_dir("/data")
            .api_key_from(json!({ "Ref": "ApiKeySecret" }))
            .log_group(json!({ "Ref": "LogGroup" }))
            .log_stream_prefix("typesense")
            .host_port(8108)
            .memory_reservation_mib(512)
            .mount_data_volume(true)
            .build()
            .render();
        assert_eq!(rendered["PortMappings"][0]["HostPort"], 8108);
        assert_eq!(rendered["MountPoints"][0]["ContainerPath"], "/data");
        assert_eq!(rendered["MemoryReservation"], 512);
    }

    #[test]
    fn credential_is_a_reference() {
        let rendered = ContainerSpec::builder()
            .image("typesense/typesense:27.1")
            .data_dir("/data")
            .api_key_from(json!({ "Ref": "ApiKeySecret" }))
            .log_group(json!({ "Ref": "LogGroup" }))
            .log_stream_prefix("typesense")
            .build()
            .render();
        assert_eq!(rendered["Secrets"][0]["Name"], "TYPESENSE_API_KEY");
        assert_eq!(rendered["Secrets"][0]["ValueFrom"], json!({ "Ref": "ApiKeySecret" }));
        assert!(rendered.get("Environment").is_none());
        assert!(rendered["PortMappings"][0].get("HostPort").is_none());
    }
}
