//! Canonical rendering of a manifest file's own lines

use super::{normalize_name, DependencyEntry, Line, Manifest};

/// Render the top-level file in canonical form.
///
/// Entries are re-rendered, comment lines kept, blank runs collapsed and
/// leading/trailing blanks dropped. With `sort`, entries are ordered by
/// normalized name inside each block of consecutive entry lines.
pub fn render(manifest: &Manifest, sort: bool) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut block: Vec<&DependencyEntry> = Vec::new();

    for source in manifest.lines() {
        if let Line::Requirement(entry) = &source.line {
            block.push(entry);
            continue;
        }
        flush(&mut block, &mut out, sort);

        match &source.line {
            Line::Blank => {
                if out.last().is_some_and(|last| !last.is_empty()) {
                    out.push(String::new());
                }
            }
            Line::Comment(text) => out.push(text.clone()),
            Line::Include { path, comment } => out.push(match comment {
                Some(c) => format!("-r {}  # {}", path, c),
                None => format!("-r {}", path),
            }),
            Line::Requirement(_) => {}
        }
    }
    flush(&mut block, &mut out, sort);

    while out.last().is_some_and(|last| last.is_empty()) {
        out.pop();
    }

    if out.is_empty() {
        String::new()
    } else {
        out.join("\n") + "\n"
    }
}

fn flush(block: &mut Vec<&DependencyEntry>, out: &mut Vec<String>, sort: bool) {
    if sort {
        block.sort_by_cached_key(|entry| normalize_name(&entry.name));
    }
    out.extend(block.drain(..).map(|entry| entry.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(text: &str, sort: bool) -> String {
        render(&Manifest::parse_str(text, "m").unwrap(), sort)
    }

    #[test]
    fn test_normalizes_spacing() {
        let text = "\n\n# Runner\npytest >= 7.4.2   #   runner\n\n\n\nrequests>=2.31.0 , <3\n\n";
        assert_eq!(
            canonical(text, false),
            "# Runner\npytest>=7.4.2  # runner\n\nrequests>=2.31.0,<3\n"
        );
    }

    #[test]
    fn test_canonical_is_stable() {
        let once = canonical("b>=1\na\n# c\nz\n", false);
        assert_eq!(canonical(&once, false), once);
    }

    #[test]
    fn test_sort_within_blocks() {
        let text = "selenium>=4.15.2\nFaker\naiohttp\n# metrics\nprometheus-client\ncoverage\n";
        assert_eq!(
            canonical(text, true),
            "aiohttp\nFaker\nselenium>=4.15.2\n# metrics\ncoverage\nprometheus-client\n"
        );
    }

    #[test]
    fn test_empty_manifest() {
        assert_eq!(canonical("\n\n", false), "");
        assert_eq!(canonical("# only\n\n", false), "# only\n");
    }
}
