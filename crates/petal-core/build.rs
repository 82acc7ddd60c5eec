use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Checks one care file and returns the flower name it declares.
fn check_care_file(content: &str) -> Result<String, String> {
    let table: toml::Table = content
        .parse()
        .map_err(|err| format!("invalid toml: {err}"))?;
    let flower = table
        .get("flower")
        .and_then(toml::Value::as_table)
        .ok_or("missing [flower] table")?;

    let text = |key: &str| -> Result<String, String> {
        match flower.get(key) {
            Some(toml::Value::String(value)) if !value.trim().is_empty() => {
                Ok(value.trim().to_string())
            }
            Some(toml::Value::String(_)) => Err(format!("[flower] {key} is blank")),
            Some(_) => Err(format!("[flower] {key} must be a string")),
            None => Err(format!("[flower] {key} is missing")),
        }
    };
    let name = text("name")?;
    text("care")?;
    if let Some(order) = flower.get("order") {
        if !order.is_integer() {
            return Err("[flower] order must be an integer".to_string());
        }
    }
    Ok(name)
}

fn main() {
    let manifest_dir =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo"));
    let guide_dir = manifest_dir.join("../../care-guide");
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    println!("cargo:rerun-if-changed={}", guide_dir.display());

    let mut files: Vec<PathBuf> = match fs::read_dir(&guide_dir) {
        Ok(read_dir) => read_dir
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("toml"))
            .collect(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => panic!("failed to read {}: {err}", guide_dir.display()),
    };
    files.sort();

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut generated =
        String::from("pub const EMBEDDED_CARE_GUIDE: &[EmbeddedCareFile] = &[\n");
    for path in &files {
        println!("cargo:rerun-if-changed={}", path.display());
        let file = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
        let name = check_care_file(&content)
            .unwrap_or_else(|message| panic!("care-guide/{file}: {message}"));
        if let Some(previous) = seen.insert(name.to_lowercase(), file.clone()) {
            panic!("care-guide/{file}: flower {name:?} is already defined in {previous}");
        }
        generated.push_str(&format!(
            "    EmbeddedCareFile {{ file: {file:?}, content: {content:?} }},\n"
        ));
    }
    generated.push_str("];\n");

    fs::write(out_dir.join("embedded_care_guide.rs"), generated)
        .expect("failed to write embedded care guide");
}
