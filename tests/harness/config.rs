use std::io::Write;

use tempfile::NamedTempFile;

/// Write `contents` to a temporary `.toml` file removed on drop.
pub fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("pricewatch-test-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

/// Config with only the deterministic stub source and no fallback.
pub const STUB_ONLY: &str = r#"
[aggregator]
fallback = false

[sources.stub]
enabled = true
"#;
