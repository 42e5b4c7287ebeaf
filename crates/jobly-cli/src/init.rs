use std::path::Path;

const TEMPLATE: &str = r#"
version = "1"

[database]
url = "${DATABASE_URL}"
max_connections = 16

[logging]
# Level SQL statements are logged at; also enable it with RUST_LOG=jobly.sql=debug
sql_level = "debug"
max_sql_length = 200
"#;

pub fn run(path: &Path) -> anyhow::Result<()> {
    write_template(path)?;
    println!("wrote {}", path.display());
    Ok(())
}

fn write_template(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("refusing to overwrite existing file: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("failed to create directory {}: {e}", parent.display())
            })?;
        }
    }

    std::fs::write(path, TEMPLATE.trim_start_matches('\n'))
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))
}
