// src/core/history.rs

//! # Recent Project History
//!
//! Parses the `recentProjects.xml` (or Rider's `recentSolutions.xml`) document
//! an IDE keeps in its `options` directory:
//!
//! ```xml
//! <application>
//!   <component name="RecentProjectsManager">
//!     <option name="additionalInfo">
//!       <map>
//!         <entry key="$USER_HOME$/work/amp">
//!           <value>
//!             <RecentProjectMetaInfo frameTitle="amp – pom.xml (amp)">
//!               <option name="build" value="IU-252.23892.409" />
//!               ...
//!             </RecentProjectMetaInfo>
//!           </value>
//!         </entry>
//!       </map>
//!     </option>
//!     <option name="lastOpenedProject" value="..." />
//!   </component>
//! </application>
//! ```
//!
//! The document is user data that is frequently stale or half-written, so
//! every failure here ends in an empty result and a log line. DTDs are
//! rejected outright, which also rules out external entity expansion.

use crate::core::paths;
use crate::models::ProjectRecord;
use lazy_static::lazy_static;
use regex::Regex;
use roxmltree::{Document, Node, ParsingOptions};
use std::fs;
use std::path::Path;

const ROOT_ELEMENT: &str = "application";
const ADDITIONAL_INFO_OPTION: &str = "additionalInfo";
const LAST_OPENED_PROJECT_OPTION: &str = "lastOpenedProject";
const LAST_PROJECT_LOCATION_OPTION: &str = "lastProjectLocation";
const META_INFO_ELEMENT: &str = "RecentProjectMetaInfo";

/// Separator IDEs put between the project name and the file in window titles.
const FRAME_TITLE_SEPARATOR: char = '\u{2013}';

lazy_static! {
    static ref BUILD_PRODUCT_CODE: Regex =
        Regex::new(r"^([A-Za-z]{2,3})-\d").expect("product code pattern is valid");
}

/// Parses a history file. A missing file is an empty history.
pub fn parse_file(path: &Path) -> Vec<ProjectRecord> {
    match read_history_text(path) {
        Some(text) => parse_str(&text),
        None => Vec::new(),
    }
}

/// Parses a history document held in memory.
///
/// Empty input, malformed XML and documents that are not an IDE history
/// all produce an empty list. Entries with an empty key are dropped.
pub fn parse_str(xml: &str) -> Vec<ProjectRecord> {
    if xml.trim().is_empty() {
        return Vec::new();
    }

    let Some(doc) = parse_document(xml) else {
        return Vec::new();
    };

    let Some(additional_info) = find_component_option(&doc, ADDITIONAL_INFO_OPTION) else {
        log::debug!("History document has no '{}' option.", ADDITIONAL_INFO_OPTION);
        return Vec::new();
    };

    element_children(additional_info, "map")
        .flat_map(|map| element_children(map, "entry"))
        .filter_map(parse_entry)
        .collect()
}

/// The `lastOpenedProject` value of a history file, if any.
pub fn get_last_opened_project_path(path: &Path) -> Option<String> {
    read_top_level_option(path, LAST_OPENED_PROJECT_OPTION)
}

/// The `lastProjectLocation` value of a history file, if any.
pub fn get_last_project_location(path: &Path) -> Option<String> {
    read_top_level_option(path, LAST_PROJECT_LOCATION_OPTION)
}

/// Display name for a project: an explicit display name wins, then the part
/// of the frame title before the first en dash, then the last path segment.
pub fn derive_display_name(display_name: &str, frame_title: &str, path_key: &str) -> String {
    let explicit = display_name.trim();
    if !explicit.is_empty() {
        return explicit.to_string();
    }

    let from_title = frame_title
        .split(FRAME_TITLE_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim();
    if !from_title.is_empty() {
        return from_title.to_string();
    }

    path_key
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(path_key)
        .to_string()
}

/// Product code prefix of a build string such as `IU-252.23892.409`.
pub fn product_code_from_build(build: &str) -> Option<String> {
    BUILD_PRODUCT_CODE
        .captures(build)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}

// --- Internals ---

fn read_history_text(path: &Path) -> Option<String> {
    if !path.is_file() {
        log::trace!("History file '{}' does not exist.", path.display());
        return None;
    }

    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!("Failed to read history file '{}': {}", path.display(), e);
            None
        }
    }
}

fn parse_document(xml: &str) -> Option<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: false,
        ..ParsingOptions::default()
    };

    let doc = match Document::parse_with_options(xml, options) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("Error parsing history XML: {}", e);
            return None;
        }
    };

    let root_name = doc.root_element().tag_name().name();
    if root_name != ROOT_ELEMENT {
        log::warn!(
            "Unexpected history root element <{}>, expected <{}>.",
            root_name,
            ROOT_ELEMENT
        );
        return None;
    }
    Some(doc)
}

fn read_top_level_option(path: &Path, option_name: &str) -> Option<String> {
    let text = read_history_text(path)?;
    let doc = parse_document(&text)?;
    find_component_option(&doc, option_name)
        .and_then(|option| option.attribute("value"))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// First `<option name=...>` among the components of the document. Most IDEs
/// use `RecentProjectsManager`, Rider `RiderRecentProjectsManager`, so the
/// component name is not checked.
fn find_component_option<'a, 'input>(
    doc: &'a Document<'input>,
    option_name: &str,
) -> Option<Node<'a, 'input>> {
    element_children(doc.root_element(), "component")
        .flat_map(|component| element_children(component, "option"))
        .find(|option| option.attribute("name") == Some(option_name))
}

fn element_children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == tag)
}

fn parse_entry(entry: Node<'_, '_>) -> Option<ProjectRecord> {
    let raw_key = entry.attribute("key").unwrap_or_default();
    if raw_key.trim().is_empty() {
        log::debug!("Dropping history entry with an empty key.");
        return None;
    }

    let mut record = ProjectRecord {
        path_key: paths::expand_path_macros(raw_key),
        ..ProjectRecord::default()
    };
    let mut display_name = String::new();

    let meta_infos = element_children(entry, "value")
        .flat_map(|value| element_children(value, META_INFO_ELEMENT));
    for meta in meta_infos {
        // Newer IDEs write some fields as attributes; options override them.
        for attr in meta.attributes() {
            apply_field(&mut record, &mut display_name, attr.name(), attr.value());
        }
        for option in element_children(meta, "option") {
            if let (Some(name), Some(value)) = (option.attribute("name"), option.attribute("value"))
            {
                apply_field(&mut record, &mut display_name, name, value);
            }
        }
    }

    if record.product_code.is_empty() {
        if let Some(code) = product_code_from_build(&record.build_string) {
            record.product_code = code;
        }
    }

    record.display_name = derive_display_name(&display_name, &record.frame_title, &record.path_key);
    Some(record)
}

fn apply_field(record: &mut ProjectRecord, display_name: &mut String, name: &str, value: &str) {
    match name {
        "displayName" => *display_name = value.to_string(),
        "frameTitle" => record.frame_title = value.to_string(),
        "productionCode" | "productCode" => record.product_code = value.to_string(),
        "activationTimestamp" => {
            if let Some(ts) = parse_timestamp(name, value) {
                record.activation_timestamp = ts;
            }
        }
        "projectOpenTimestamp" => {
            if let Some(ts) = parse_timestamp(name, value) {
                record.project_open_timestamp = ts;
            }
        }
        "build" => record.build_string = value.to_string(),
        "projectWorkspaceId" => record.workspace_id = value.to_string(),
        "opened" => {
            if value.eq_ignore_ascii_case("true") {
                record.is_opened = true;
            } else if value.eq_ignore_ascii_case("false") {
                record.is_opened = false;
            }
        }
        _ => {}
    }
}

fn parse_timestamp(name: &str, value: &str) -> Option<i64> {
    match value.trim().parse::<i64>() {
        Ok(ts) => Some(ts),
        Err(e) => {
            log::debug!("Ignoring unparsable {} '{}': {}", name, value, e);
            None
        }
    }
}
