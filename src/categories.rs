//! The category tree: compiled from `.cat` files, emitted as overlay XML.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use waymark_common::kv;

pub const CATEGORY_EXTENSION: &str = ".cat";
pub const CATEGORY_FILE: &str = "_markerCategories.xml";

/// Behaviors the overlay runtime supports; 1 and 5 are not.
const VALID_BEHAVIORS: [i64; 6] = [0, 2, 3, 4, 6, 7];
const NUMERIC_KEYS: [&str; 6] = [
    "iconsize",
    "alpha",
    "fadenear",
    "fadefar",
    "heightoffset",
    "resetlength",
];

#[derive(Debug, Clone, Default)]
pub struct Category {
    pub name: String,
    pub display_name: String,
    pub keys: BTreeMap<String, String>,
    pub children: Vec<Category>,
}

impl Category {
    /// Match a dot-separated category reference against this subtree.
    pub fn matches(&self, reference: &str) -> bool {
        let segments: Vec<&str> = kv::trim(reference).split('.').collect();
        self.match_list(&segments)
    }

    fn match_list(&self, segments: &[&str]) -> bool {
        match segments {
            [] => false,
            [only] => *only == self.name,
            [head, rest @ ..] => {
                *head == self.name && self.children.iter().any(|c| c.match_list(rest))
            }
        }
    }
}

/// Whether any category in the forest matches the reference.
pub fn reference_exists(categories: &[Category], reference: &str) -> bool {
    categories.iter().any(|c| c.matches(reference))
}

/// Compile the category tree rooted at `path`.
///
/// Directories become interior nodes named after themselves; `.cat` files
/// become leaves carrying `key = value` attributes. Returns the forest and
/// accumulated validation warnings.
pub fn compile(path: &Path, pack_root: &Path) -> Result<(Vec<Category>, Vec<String>)> {
    let mut out = Vec::new();
    let mut warns = Vec::new();

    let entries = std::fs::read_dir(path)
        .with_context(|| format!("reading categories at {}", path.display()))?;
    let mut items: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    items.sort();

    for item in items {
        let file_name = item
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if item.is_dir() {
            let (children, child_warns) = compile(&item, pack_root)?;
            warns.extend(child_warns);
            let (name, display_name) = name_info(&file_name);
            out.push(Category {
                name,
                display_name,
                keys: BTreeMap::new(),
                children,
            });
        } else if file_name.ends_with(CATEGORY_EXTENSION) {
            let (category, cat_warns) = read_category(&item, pack_root)?;
            warns.extend(cat_warns);
            out.push(category);
        }
    }
    Ok((out, warns))
}

fn read_category(path: &Path, pack_root: &Path) -> Result<(Category, Vec<String>)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let (name, display_name) = name_info(file_name);
    let mut category = Category {
        name,
        display_name,
        keys: BTreeMap::new(),
        children: Vec::new(),
    };
    let mut warns = Vec::new();

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    if text.trim().is_empty() {
        warns.push(format!(
            "[{}] no category definition found, consider switching to a directory",
            path.display()
        ));
    }

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            bail!(
                "error in {}, line {}: expected key=value",
                path.display(),
                index + 1
            );
        };
        let key = key.trim();
        let value = value.trim();
        if let Some(warn) = validate(key, value, pack_root) {
            warns.push(format!(
                "validation failed for {}: [{key}] {warn}",
                category.display_name
            ));
        }
        category.keys.insert(key.to_string(), value.to_string());
    }

    if !category.keys.contains_key("iconfile") {
        warns.push(format!("no icon for: {}", category.display_name));
    }
    Ok((category, warns))
}

/// Derive the category name and display name from a file or directory name:
/// the extension drops, CamelCase humps become separate display words.
fn name_info(path_name: &str) -> (String, String) {
    let name = path_name
        .strip_suffix(CATEGORY_EXTENSION)
        .unwrap_or(path_name);
    let mut display = String::new();
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            display.push(' ');
        }
        display.push(c);
    }
    (name.to_string(), display)
}

fn validate(key: &str, value: &str, pack_root: &Path) -> Option<String> {
    if key.eq_ignore_ascii_case("behavior") {
        let v = kv::trim(value);
        return match v.parse::<i64>() {
            Err(_) => Some(format!("expected integer, found {v}")),
            Ok(n) if !VALID_BEHAVIORS.contains(&n) => Some(format!(
                "invalid value: {n}, expected one of {VALID_BEHAVIORS:?}"
            )),
            Ok(_) => None,
        };
    }
    if NUMERIC_KEYS.iter().any(|k| key.eq_ignore_ascii_case(k)) {
        let v = kv::trim(value);
        return match v.parse::<f64>() {
            Err(_) => Some("not numeric".to_string()),
            Ok(f) if f < 0.0 => Some("negative value".to_string()),
            Ok(_) => None,
        };
    }
    if key.eq_ignore_ascii_case("iconfile") {
        let target = pack_root.join(kv::trim(value));
        if !target.exists() {
            return Some(format!("file {} not found", kv::trim(value)));
        }
    }
    None
}

/// Write `_markerCategories.xml` into the build folder.
pub fn save(categories: &[Category], build_dir: &Path) -> Result<()> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("overlaydata")))?;
    for category in categories {
        write_category(&mut writer, category)?;
    }
    writer.write_event(Event::End(BytesEnd::new("overlaydata")))?;

    let path = build_dir.join(CATEGORY_FILE);
    std::fs::write(&path, writer.into_inner())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn write_category(writer: &mut Writer<Vec<u8>>, category: &Category) -> Result<()> {
    let mut element = BytesStart::new("markercategory");
    element.push_attribute(("name", category.name.as_str()));
    element.push_attribute(("displayname", category.display_name.as_str()));
    for (key, value) in &category.keys {
        element.push_attribute((key.as_str(), kv::trim(value)));
    }
    if category.children.is_empty() {
        writer.write_event(Event::Empty(element))?;
    } else {
        writer.write_event(Event::Start(element))?;
        for child in &category.children {
            write_category(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new("markercategory")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_info_splits_camel_case() {
        let (name, display) = name_info("TestCategory.cat");
        assert_eq!(name, "TestCategory");
        assert_eq!(display, "Test Category");
    }

    #[test]
    fn test_match_dotted_reference() {
        let tree = Category {
            name: "loot".into(),
            display_name: "loot".into(),
            keys: BTreeMap::new(),
            children: vec![Category {
                name: "chests".into(),
                display_name: "chests".into(),
                keys: BTreeMap::new(),
                children: Vec::new(),
            }],
        };
        assert!(tree.matches("loot"));
        assert!(tree.matches("loot.chests"));
        assert!(!tree.matches("loot.keys"));
        assert!(!tree.matches("chests"));
    }

    #[test]
    fn test_compile_tree_and_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("categories");
        std::fs::create_dir_all(root.join("Treasure")).unwrap();
        std::fs::write(
            root.join("Treasure/BuriedChest.cat"),
            "iconsize = 1.5\nbehavior = 2\n",
        )
        .unwrap();

        let (cats, warns) = compile(&root, dir.path()).unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].name, "Treasure");
        assert_eq!(cats[0].children.len(), 1);
        assert_eq!(cats[0].children[0].display_name, "Buried Chest");
        // No iconfile on the leaf.
        assert!(warns.iter().any(|w| w.contains("no icon")));
    }

    #[test]
    fn test_invalid_behavior_warns() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("categories");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("Bad.cat"), "behavior = 5\n").unwrap();

        let (_, warns) = compile(&root, dir.path()).unwrap();
        assert!(warns.iter().any(|w| w.contains("invalid value: 5")));
    }

    #[test]
    fn test_malformed_line_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("categories");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("Broken.cat"), "justtext\n").unwrap();
        assert!(compile(&root, dir.path()).is_err());
    }

    #[test]
    fn test_save_emits_nested_xml() {
        let dir = tempfile::tempdir().unwrap();
        let tree = vec![Category {
            name: "loot".into(),
            display_name: "loot".into(),
            keys: BTreeMap::from([("iconsize".to_string(), "1.2".to_string())]),
            children: vec![Category {
                name: "chests".into(),
                display_name: "chests".into(),
                keys: BTreeMap::new(),
                children: Vec::new(),
            }],
        }];
        save(&tree, dir.path()).unwrap();

        let xml = std::fs::read_to_string(dir.path().join(CATEGORY_FILE)).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains(r#"<markercategory name="loot" displayname="loot" iconsize="1.2">"#));
        assert!(xml.contains(r#"<markercategory name="chests" displayname="chests"/>"#));
        assert!(xml.ends_with("</overlaydata>"));
    }
}
