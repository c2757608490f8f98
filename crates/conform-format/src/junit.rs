use std::path::Path;

use conform_domain::{Item, META_FILE, META_TYPE, TYPE_FILE};
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
struct XmlTestSuites {
    #[serde(rename = "testsuite", default)]
    testsuite: Vec<XmlTestSuite>,
}

#[derive(Debug, Deserialize, Default)]
struct XmlTestSuite {
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(rename = "testcase", default)]
    testcase: Vec<XmlTestCase>,
}

#[derive(Debug, Deserialize, Default)]
struct XmlTestCase {
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(default)]
    skipped: Option<XmlText>,
    #[serde(default)]
    failure: Option<XmlText>,
    #[serde(default)]
    error: Option<XmlText>,
    #[serde(rename = "system-out", default)]
    system_out: Option<XmlText>,
    #[serde(rename = "system-err", default)]
    system_err: Option<XmlText>,
}

#[derive(Debug, Deserialize, Default)]
struct XmlText {
    #[serde(rename = "@message", default)]
    message: Option<String>,
    #[serde(rename = "$text", default)]
    text: Option<String>,
}

impl XmlText {
    /// `message` attribute and character data concatenated with a single
    /// space when both are present, trimmed (§4.4).
    fn combined(&self) -> String {
        match (&self.message, &self.text) {
            (Some(m), Some(t)) if !m.trim().is_empty() && !t.trim().is_empty() => {
                format!("{} {}", m.trim(), t.trim())
            }
            (Some(m), _) if !m.trim().is_empty() => m.trim().to_string(),
            (_, Some(t)) => t.trim().to_string(),
            _ => String::new(),
        }
    }
}

fn is_testsuites_root(xml: &str) -> bool {
    let trimmed = xml.trim_start();
    let after_decl = if trimmed.starts_with("<?xml") {
        trimmed.splitn(2, "?>").nth(1).unwrap_or("").trim_start()
    } else {
        trimmed
    };
    after_decl.starts_with("<testsuites")
}

/// Parse a JUnit XML artifact into an Item tree (§4.4). Accepts either a
/// `<testsuites>` root or a bare `<testsuite>`, which is wrapped into a
/// single-suite collection. On any parse failure the returned Item still
/// carries `name`, `metadata[file]` and `metadata[error]` (IV5).
pub fn process(plugin_dir: &Path, file_path: &Path) -> Item {
    let relpath = super::relpath(plugin_dir, file_path);
    let basename = super::basename(file_path);
    let mut item = Item::new(&basename, "");
    item.set_meta(META_TYPE, TYPE_FILE);
    item.set_meta(META_FILE, &relpath);

    let xml = match std::fs::read_to_string(file_path) {
        Ok(x) => x,
        Err(e) => {
            item.mark_error(format!("reading {}: {}", relpath, e));
            return item;
        }
    };

    let suites: Vec<XmlTestSuite> = if is_testsuites_root(&xml) {
        match quick_xml::de::from_str::<XmlTestSuites>(&xml) {
            Ok(parsed) => parsed.testsuite,
            Err(e) => {
                item.mark_error(format!("parsing junit xml: {}", e));
                return item;
            }
        }
    } else {
        match quick_xml::de::from_str::<XmlTestSuite>(&xml) {
            Ok(parsed) => vec![parsed],
            Err(e) => {
                item.mark_error(format!("parsing junit xml: {}", e));
                return item;
            }
        }
    };

    for (i, suite) in suites.into_iter().enumerate() {
        let name = suite
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("testsuite-{:03}", i + 1));
        let mut suite_item = Item::new(name, "");

        for case in suite.testcase {
            suite_item.items.push(testcase_item(case));
        }
        item.items.push(suite_item);
    }

    item
}

fn testcase_item(case: XmlTestCase) -> Item {
    let name = case.name.unwrap_or_default();
    let status = if case.skipped.is_some() {
        "skipped"
    } else if case.failure.is_some() || case.error.is_some() {
        // §8 open question: both `failure` and `error` are treated as failure
        // at the test-case level too — the source's `JUnitFailed` classifier
        // disagreeing on bare `<error>` is not reproduced here.
        "failed"
    } else {
        "passed"
    };

    let mut tc = Item::new(name, status);
    if let Some(f) = &case.failure {
        tc.details.insert("failure".into(), f.combined().into());
    }
    if let Some(e) = &case.error {
        tc.details.insert("error".into(), e.combined().into());
    }
    if let Some(o) = &case.system_out {
        tc.details.insert("system-out".into(), o.combined().into());
    }
    if let Some(e) = &case.system_err {
        tc.details.insert("system-err".into(), e.combined().into());
    }
    tc
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junit.xml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn unnamed_suites_get_sequential_names() {
        let (dir, path) = fixture("<testsuites><testsuite/><testsuite/></testsuites>");
        let item = process(dir.path(), &path);
        assert_eq!(item.items.len(), 2);
        assert_eq!(item.items[0].name, "testsuite-001");
        assert_eq!(item.items[1].name, "testsuite-002");
    }

    #[test]
    fn bare_testsuite_is_wrapped() {
        let (dir, path) = fixture(
            r#"<testsuite name="only"><testcase name="t1"/></testsuite>"#,
        );
        let item = process(dir.path(), &path);
        assert_eq!(item.items.len(), 1);
        assert_eq!(item.items[0].name, "only");
        assert_eq!(item.items[0].items[0].status, "passed");
    }

    #[test]
    fn failure_marks_testcase_failed_with_details() {
        let (dir, path) = fixture(
            r#"<testsuites><testsuite name="s"><testcase name="t1"><failure message="boom">trace</failure></testcase></testsuite></testsuites>"#,
        );
        let item = process(dir.path(), &path);
        let tc = &item.items[0].items[0];
        assert_eq!(tc.status, "failed");
        assert_eq!(tc.details.get("failure").unwrap(), "boom trace");
    }

    #[test]
    fn skipped_wins_over_failure() {
        let (dir, path) = fixture(
            r#"<testsuites><testsuite name="s"><testcase name="t1"><skipped/></testcase></testsuite></testsuites>"#,
        );
        let item = process(dir.path(), &path);
        assert_eq!(item.items[0].items[0].status, "skipped");
    }

    #[test]
    fn malformed_xml_yields_error_item() {
        let (dir, path) = fixture("<testsuites><testsuite>");
        let item = process(dir.path(), &path);
        assert_eq!(item.status, "unknown");
        assert!(item.meta(conform_domain::META_ERROR).is_some());
    }
}
