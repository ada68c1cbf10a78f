const PLUGIN: &str = env!("CARGO_PKG_NAME");
const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn user_agent(editor: &str, editor_version: &str) -> String {
    format!(
        "{}/{} ({}-{}) {}/{}",
        editor,
        editor_version,
        std::env::consts::OS,
        std::env::consts::ARCH,
        PLUGIN,
        PLUGIN_VERSION
    )
}

pub fn machine_name() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|k| std::env::var(k).ok())
        .chain(std::fs::read_to_string("/etc/hostname").ok())
        .map(|n| n.trim().to_owned())
        .find(|n| !n.is_empty())
        .unwrap_or_else(|| "unknown".to_owned())
}
