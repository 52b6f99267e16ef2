use std::fs;

const QUOTING: &[&str] = &["escaped", "plain"];

fn main() {
    // The bundled config is include_str!'d, so reject a broken one at build time
    let config_path = "src/default_config.toml";
    println!("cargo:rerun-if-changed={}", config_path);

    let content = fs::read_to_string(config_path).expect("Failed to read default_config.toml");
    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_config.toml: {}", e),
    };

    let quoting = table
        .get("parser")
        .and_then(|parser| parser.get("quoting"))
        .and_then(|value| value.as_str());
    if let Some(quoting) = quoting {
        if !QUOTING.contains(&quoting) {
            panic!("Invalid default_config.toml: unknown quoting {:?}", quoting);
        }
    }

    if !table.get("theme").is_some_and(|theme| theme.is_table()) {
        panic!("Invalid default_config.toml: missing [theme]");
    }
}
