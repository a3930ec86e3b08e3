//! `meta.xml` generation and parsing.
//!
//! The Homebrew Channel reads application metadata and launch arguments from
//! a `meta.xml` next to the boot executable. Values are written verbatim:
//! text containing `<` or `&` produces a document the loader may reject.

use crate::args::tokenize;
use crate::preset::ExportPreset;
use anyhow::{Context, Result, anyhow};
use roxmltree::Document;

/// File name of the manifest inside the bundle directory.
pub const MANIFEST_FILE: &str = "meta.xml";

/// Launch arguments for the manifest: `exec_path` followed by the tokens of
/// the trimmed `arguments` string.
pub fn argument_list(preset: &ExportPreset) -> Vec<String> {
    let mut list = vec![preset.exec_path.clone()];
    let args = preset.arguments.trim();
    if !args.is_empty() {
        list.extend(tokenize(args));
    }
    list
}

/// Build the `meta.xml` text for a preset.
pub fn build(preset: &ExportPreset, arguments: &[String]) -> String {
    let mut out = String::with_capacity(512);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    out.push_str(&format!("<app version=\"{}\">\n", preset.version));
    element(&mut out, 1, "name", &preset.name);
    element(&mut out, 1, "coder", &preset.coder);
    element(&mut out, 1, "version", &preset.version);
    element(&mut out, 1, "release_date", &preset.release_date);
    element(&mut out, 1, "short_description", &preset.short_description);
    element(&mut out, 1, "long_description", &preset.long_description);
    if preset.ahb_access {
        out.push_str("  <ahb_access/>\n");
    }
    out.push_str("  <arguments>\n");
    for arg in arguments {
        element(&mut out, 2, "arg", arg);
    }
    out.push_str("  </arguments>\n");
    out.push_str("</app>");
    out
}

fn element(out: &mut String, level: usize, tag: &str, text: &str) {
    for _ in 0..level {
        out.push_str("  ");
    }
    out.push_str(&format!("<{tag}>{text}</{tag}>\n"));
}

/// The contents of a `meta.xml`, read back from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub app_version: Option<String>,
    pub name: String,
    pub coder: String,
    pub version: String,
    pub release_date: String,
    pub short_description: String,
    pub long_description: String,
    pub ahb_access: bool,
    pub arguments: Vec<String>,
}

impl Manifest {
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml).context("Failed to parse manifest XML")?;
        let app = doc.root_element();
        if !app.has_tag_name("app") {
            return Err(anyhow!("Expected <app> root, found <{}>", app.tag_name().name()));
        }
        let mut manifest = Manifest {
            app_version: app.attribute("version").map(str::to_string),
            ..Default::default()
        };
        for child in app.children().filter(|n| n.is_element()) {
            let text = || child.text().unwrap_or_default().to_string();
            match child.tag_name().name() {
                "name" => manifest.name = text(),
                "coder" => manifest.coder = text(),
                "version" => manifest.version = text(),
                "release_date" => manifest.release_date = text(),
                "short_description" => manifest.short_description = text(),
                "long_description" => manifest.long_description = text(),
                "ahb_access" => manifest.ahb_access = true,
                "arguments" => {
                    manifest.arguments = child
                        .children()
                        .filter(|n| n.has_tag_name("arg"))
                        .map(|n| n.text().unwrap_or_default().to_string())
                        .collect();
                }
                _ => {}
            }
        }
        Ok(manifest)
    }

    pub fn from_file(path: impl AsRef<camino::Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
        Self::parse(&text).with_context(|| format!("Invalid manifest {}", path))
    }
}
