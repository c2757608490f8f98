use conform_pipeline::RunReport;

/// Render a [`RunReport`] as human-readable text for the terminal.
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("status: {}\n", report.status));
    out.push_str(&format!("errors: {}\n", report.error_count));

    for err in &report.errors {
        out.push_str(&format!("  - {}\n", err));
    }

    match &report.tarball {
        Some(tarball) => out.push_str(&format!(
            "tarball: {} ({} bytes, sha256 {})\n",
            tarball.path.display(),
            tarball.size_bytes,
            tarball.sha256
        )),
        None => out.push_str("tarball: not produced\n"),
    }

    out
}
