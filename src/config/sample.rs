/// Annotated configuration printed by `--sample-config`.
pub const SAMPLE_CONFIG: &str = r#"# The Chef Server URL, including the organization name
chef_server_url = "https://chef.example.com/organizations/demo/"

# The client used to make API requests, and the path to its key
client_name = "chef-load"
client_key = "/etc/chef-load/chef-load.pem"

# Ohai data used as automatic attributes of every node. When omitted,
# nearly empty node objects are saved.
# ohai_json_file = "/path/to/ohai.json"

# Number of nodes making chef-client runs
nodes = 10

# Number of chef-client runs each node should make, 0 value will make infinite runs
runs = 0

# Node names are "<node_name_prefix>-<index>"
node_name_prefix = "chef-load"

# Seconds each run waits between resolving cookbooks and saving the node
sleep_duration = 1800

# The run list used by every node
run_list = [ "role[base]", "recipe[ntp]" ]

# Extra API paths requested during every run, relative to chef_server_url
api_get_requests = [ "nodes", "roles" ]

# Download the files of every resolved cookbook during each run
download_cookbooks = false

# Per request and connection timeouts, e.g. "500ms", "30s" or "2m"
request_timeout = "60s"
connect_timeout = "10s"

# Skip TLS certificate validation
insecure = false

# Value sent in the X-Chef-Version header
chef_version = "13.0.0"
"#;
