//! Output routing.
//!
//! Maps item identifiers to output paths. Routing is a pure function of the
//! identifier string.

use kiln_core::{ContentItem, OutputPolicy};

use crate::artifact::CompiledArtifact;

/// Compute the output path for an identifier.
///
/// An `index` stem keeps its directory and gets an `.html` extension; any
/// other stem becomes a directory holding `index.html`.
///
/// ```
/// use kiln_generator::router::route;
///
/// assert_eq!(route("/articles/post-1.md"), "/articles/post-1/index.html");
/// assert_eq!(route("/articles/index.md"), "/articles/index.html");
/// ```
#[must_use]
pub fn route(identifier: &str) -> String {
    let (dir, name) = match identifier.rfind('/') {
        Some(pos) => identifier.split_at(pos + 1),
        None => ("", identifier),
    };

    let stem = strip_extension(name);
    if stem == "index" {
        format!("{dir}index.html")
    } else {
        format!("{dir}{stem}/index.html")
    }
}

/// Drop the final extension of a file name. Leading dots do not start an
/// extension.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    }
}

/// Output path for an item under a rule's output policy. `None` means the
/// rule writes nothing.
#[must_use]
pub fn output_path(identifier: &str, policy: &OutputPolicy) -> Option<String> {
    match policy {
        OutputPolicy::Routed => Some(route(identifier)),
        OutputPolicy::Fixed { path } => Some(if path.starts_with('/') {
            path.clone()
        } else {
            format!("/{path}")
        }),
        OutputPolicy::Identity => Some(identifier.to_string()),
        OutputPolicy::Skip => None,
    }
}

/// Copy an unmatched item unchanged to its own identifier path. The file
/// bytes are emitted as read, frontmatter included.
#[must_use]
pub fn passthrough(item: &ContentItem) -> CompiledArtifact {
    CompiledArtifact::new(item.identifier(), item.raw_bytes(), item.identifier())
}
