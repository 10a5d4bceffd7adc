//! Module descriptor (`META-INF/module.xml`) generation.

use crate::buckets::Coordinate;
use crate::constants::{MODULE_DESCRIPTOR_PATH, MODULE_INCLUDE_FILE, MODULE_PERMISSIONS_FILE};
use crate::error::ModuleResult;
use crate::project::Project;
use std::fmt::Write;
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Inputs and output of descriptor generation.
///
/// Optional fragments are recorded only if they existed when the spec was
/// configured. Files created or removed afterwards are not observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSpec {
    /// Where the descriptor is written.
    pub output_path: PathBuf,

    /// Fragment inserted verbatim into the `<module>` element.
    pub module_include: Option<PathBuf>,

    /// Fragment populating `<permissions>`.
    pub module_permissions: Option<PathBuf>,

    /// Files whose change invalidates the descriptor.
    pub inputs: Vec<PathBuf>,
}

/// Metadata written into the descriptor.
#[derive(Debug, Clone)]
pub struct DescriptorMetadata<'a> {
    pub name: &'a str,
    pub vendor: &'a str,
    pub version: &'a str,
    pub description: Option<&'a str>,
    pub runtime_profile: Option<&'a str>,
    pub dependencies: &'a [Coordinate],
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DescriptorSpec {
    /// Build the spec for a project, checking for optional fragments now.
    pub fn configure(project: &Project) -> Self {
        let existing = |file: &str| {
            let path = project.dir.join(file);
            path.is_file().then_some(path)
        };

        let module_include = existing(MODULE_INCLUDE_FILE);
        let module_permissions = existing(MODULE_PERMISSIONS_FILE);

        let mut inputs = vec![project.build_file.clone()];
        inputs.extend(module_include.iter().cloned());
        inputs.extend(module_permissions.iter().cloned());

        Self {
            output_path: project
                .layout
                .processed_resources_dir
                .join(MODULE_DESCRIPTOR_PATH),
            module_include,
            module_permissions,
            inputs,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Render the descriptor document.
pub fn render(spec: &DescriptorSpec, meta: &DescriptorMetadata<'_>) -> ModuleResult<String> {
    let mut xml = String::with_capacity(1024);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

    let _ = write!(
        xml,
        "<module name=\"{}\" vendor=\"{}\" vendorVersion=\"{}\"",
        escape_xml(meta.name),
        escape_xml(meta.vendor),
        escape_xml(meta.version)
    );
    if let Some(description) = meta.description {
        let _ = write!(xml, " description=\"{}\"", escape_xml(description));
    }
    if let Some(profile) = meta.runtime_profile {
        let _ = write!(xml, " runtimeProfile=\"{}\"", escape_xml(profile));
    }
    xml.push_str(">\n");

    if !meta.dependencies.is_empty() {
        xml.push_str("  <dependencies>\n");
        for dep in meta.dependencies {
            let _ = write!(xml, "    <dependency name=\"{}\"", escape_xml(&dep.name));
            if let Some(group) = &dep.group {
                let _ = write!(xml, " vendor=\"{}\"", escape_xml(group));
            }
            if let Some(version) = &dep.version {
                let _ = write!(xml, " vendorVersion=\"{}\"", escape_xml(version));
            }
            xml.push_str("/>\n");
        }
        xml.push_str("  </dependencies>\n");
    }

    if let Some(path) = &spec.module_include {
        let fragment = read_fragment(path)?;
        if !fragment.is_empty() {
            xml.push_str(&fragment);
            xml.push('\n');
        }
    }

    if let Some(path) = &spec.module_permissions {
        let fragment = read_fragment(path)?;
        if has_root_element(&fragment, "permissions") {
            xml.push_str(&fragment);
            xml.push('\n');
        } else {
            xml.push_str("  <permissions>\n");
            if !fragment.is_empty() {
                xml.push_str(&fragment);
                xml.push('\n');
            }
            xml.push_str("  </permissions>\n");
        }
    }

    xml.push_str("</module>\n");
    Ok(xml)
}

/// Render the descriptor and write it to the spec's output path.
pub fn generate(spec: &DescriptorSpec, meta: &DescriptorMetadata<'_>) -> ModuleResult<PathBuf> {
    let xml = render(spec, meta)?;

    if let Some(parent) = spec.output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&spec.output_path, xml)?;

    tracing::info!("wrote {}", spec.output_path.display());
    Ok(spec.output_path.clone())
}

/// Read a fragment file, dropping the BOM, XML declaration, DOCTYPE and
/// surrounding whitespace. Comments and other processing instructions are kept.
fn read_fragment(path: &Path) -> ModuleResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut rest = content.trim_start_matches('\u{feff}').trim();
    let mut kept = String::new();

    while let Some((item, remainder)) = split_prolog_item(rest) {
        let is_declaration = item.starts_with("<?xml")
            && item[5..].starts_with(|c: char| c.is_whitespace() || c == '?');
        if !is_declaration && !item.starts_with("<!DOCTYPE") {
            kept.push_str(item);
            kept.push('\n');
        }
        rest = remainder.trim_start();
    }

    kept.push_str(rest);
    Ok(kept.trim().to_string())
}

/// True if the first element of `fragment`, after any comments, processing
/// instructions and DOCTYPE, is `<name>`.
fn has_root_element(fragment: &str, name: &str) -> bool {
    let mut rest = fragment.trim_start_matches('\u{feff}').trim_start();
    while let Some((_, remainder)) = split_prolog_item(rest) {
        rest = remainder.trim_start();
    }

    rest.strip_prefix('<')
        .and_then(|r| r.strip_prefix(name))
        .is_some_and(|r| r.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/'))
}

/// Split a leading comment, processing instruction or DOCTYPE off `input`.
fn split_prolog_item(input: &str) -> Option<(&str, &str)> {
    let end = if input.starts_with("<!--") {
        input.find("-->").map(|i| i + 3)
    } else if input.starts_with("<?") {
        input.find("?>").map(|i| i + 2)
    } else if input.starts_with("<!DOCTYPE") {
        doctype_end(input)
    } else {
        return None;
    };

    // Unterminated constructs swallow the rest of the input.
    let end = end.unwrap_or(input.len());
    Some(input.split_at(end))
}

/// End offset of a DOCTYPE, skipping an internal subset in brackets.
fn doctype_end(input: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '>' if depth == 0 => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Escape text for use in XML attribute values.
pub fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BUILD_FILE;
    use crate::project::BuildFile;
    use tempfile::TempDir;

    fn project_in(dir: &Path) -> Project {
        std::fs::write(
            dir.join(BUILD_FILE),
            "[project]\nname = \"demo\"\ngroup = \"acme\"\nversion = \"2.3.1\"\n",
        )
        .unwrap();
        let build = BuildFile::load(dir).unwrap();
        Project::load(dir, &build).unwrap()
    }

    fn meta<'a>(project: &'a Project, deps: &'a [Coordinate]) -> DescriptorMetadata<'a> {
        DescriptorMetadata {
            name: &project.name,
            vendor: &project.group,
            version: &project.version,
            description: None,
            runtime_profile: None,
            dependencies: deps,
        }
    }

    #[test]
    fn test_minimal_descriptor() {
        let dir = TempDir::new().unwrap();
        let project = project_in(dir.path());
        let spec = DescriptorSpec::configure(&project);

        assert!(spec.module_include.is_none());
        assert!(spec.module_permissions.is_none());
        assert_eq!(spec.inputs, vec![project.build_file.clone()]);

        let xml = render(&spec, &meta(&project, &[])).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("name=\"demo\""));
        assert!(xml.contains("vendorVersion=\"2.3.1\""));
        assert!(!xml.contains("<permissions"));
        assert!(!xml.contains("<dependencies"));
        assert!(xml.trim_end().ends_with("</module>"));
    }

    #[test]
    fn test_include_and_permissions() {
        let dir = TempDir::new().unwrap();
        let project = project_in(dir.path());
        std::fs::write(
            dir.path().join(MODULE_INCLUDE_FILE),
            "<?xml version=\"1.0\"?>\n<types><type name=\"Point\"/></types>\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(MODULE_PERMISSIONS_FILE),
            "<niagara-permission-groups/>",
        )
        .unwrap();

        let spec = DescriptorSpec::configure(&project);
        assert_eq!(spec.inputs.len(), 3);

        let xml = render(&spec, &meta(&project, &[])).unwrap();
        assert!(xml.contains("<types><type name=\"Point\"/></types>"));
        assert_eq!(xml.matches("<?xml").count(), 1);
        assert!(
            xml.contains("<permissions>\n<niagara-permission-groups/>\n  </permissions>")
        );
    }

    #[test]
    fn test_permissions_root_not_wrapped_twice() {
        let dir = TempDir::new().unwrap();
        let project = project_in(dir.path());
        std::fs::write(
            dir.path().join(MODULE_PERMISSIONS_FILE),
            "<permissions><p/></permissions>",
        )
        .unwrap();

        let spec = DescriptorSpec::configure(&project);
        let xml = render(&spec, &meta(&project, &[])).unwrap();
        assert_eq!(xml.matches("<permissions>").count(), 1);
    }

    #[test]
    fn test_commented_permissions_root_not_wrapped() {
        let dir = TempDir::new().unwrap();
        let project = project_in(dir.path());
        std::fs::write(
            dir.path().join(MODULE_PERMISSIONS_FILE),
            "<?xml version=\"1.0\"?>\n<!DOCTYPE permissions>\n<!-- module permissions -->\n<permissions><p/></permissions>\n",
        )
        .unwrap();

        let spec = DescriptorSpec::configure(&project);
        let xml = render(&spec, &meta(&project, &[])).unwrap();
        assert_eq!(xml.matches("<permissions>").count(), 1);
        assert!(xml.contains("<!-- module permissions -->\n<permissions><p/></permissions>"));
        assert!(!xml.contains("DOCTYPE"));
        assert_eq!(xml.matches("<?xml").count(), 1);
    }

    #[test]
    fn test_root_element_detection() {
        assert!(has_root_element("<permissions/>", "permissions"));
        assert!(has_root_element("<!-- a -->\n<?pi x?>\n<permissions >", "permissions"));
        assert!(has_root_element(
            "<!DOCTYPE permissions [<!ELEMENT p EMPTY>]><permissions>",
            "permissions"
        ));
        assert!(!has_root_element("<permissionsX/>", "permissions"));
        assert!(!has_root_element("<p/><permissions/>", "permissions"));
        assert!(!has_root_element("<!-- <permissions> -->", "permissions"));
    }

    #[test]
    fn test_include_keeps_comments_drops_doctype() {
        let dir = TempDir::new().unwrap();
        let project = project_in(dir.path());
        std::fs::write(
            dir.path().join(MODULE_INCLUDE_FILE),
            "\u{feff}<?xml version=\"1.0\"?>\n<!DOCTYPE types>\n<!-- types -->\n<types/>\n",
        )
        .unwrap();

        let spec = DescriptorSpec::configure(&project);
        let xml = render(&spec, &meta(&project, &[])).unwrap();
        assert!(xml.contains("<!-- types -->\n<types/>"));
        assert!(!xml.contains("DOCTYPE"));
        assert!(!xml.contains('\u{feff}'));
    }

    #[test]
    fn test_existence_checked_at_configuration_only() {
        let dir = TempDir::new().unwrap();
        let project = project_in(dir.path());
        let spec = DescriptorSpec::configure(&project);

        std::fs::write(dir.path().join(MODULE_INCLUDE_FILE), "<late/>").unwrap();

        let xml = render(&spec, &meta(&project, &[])).unwrap();
        assert!(!xml.contains("<late/>"));
    }

    #[test]
    fn test_dependencies_and_escaping() {
        let dir = TempDir::new().unwrap();
        let project = project_in(dir.path());
        let spec = DescriptorSpec::configure(&project);
        let deps: Vec<Coordinate> = vec![
            "Tridium:baja:4.10".parse().unwrap(),
            "control".parse().unwrap(),
        ];
        let meta = DescriptorMetadata {
            description: Some("A & B <module>"),
            runtime_profile: Some("rt"),
            ..meta(&project, &deps)
        };

        let xml = render(&spec, &meta).unwrap();
        assert!(xml.contains("description=\"A &amp; B &lt;module&gt;\""));
        assert!(xml.contains("runtimeProfile=\"rt\""));
        assert!(
            xml.contains("<dependency name=\"baja\" vendor=\"Tridium\" vendorVersion=\"4.10\"/>")
        );
        assert!(xml.contains("<dependency name=\"control\"/>"));
    }

    #[test]
    fn test_generate_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let project = project_in(dir.path());
        let spec = DescriptorSpec::configure(&project);
        assert!(!spec.output_path.parent().unwrap().exists());

        let path = generate(&spec, &meta(&project, &[])).unwrap();
        assert!(path.ends_with("META-INF/module.xml"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("name=\"demo\""));
    }
}
