use std::path::{Path, PathBuf};

use arch_lint::rules::{NoErrorSwallowing, NoSilentResultDrop};
use arch_lint::{Analyzer, Severity};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .expect("crates/pydock-cli sits two levels below the workspace root")
}

/// Every `Result` in the pydock crates' `src/` trees is propagated or handled:
/// no `.ok()`, `let _ =` or empty `Err` arms. Integration tests and
/// `examples/` are not checked.
#[test]
fn crate_sources_never_drop_errors() {
    let analyzer = Analyzer::builder()
        .root(workspace_root())
        .exclude("**/target/**")
        .exclude("**/tests/**")
        .exclude("examples/**")
        .rule(NoErrorSwallowing::new())
        .rule(NoSilentResultDrop::new())
        .build()
        .expect("analyzer config is valid");

    let result = analyzer.analyze().expect("workspace sources are readable");
    assert!(
        !result.has_violations_at(Severity::Warning),
        "{}",
        result.format_test_report(Severity::Warning)
    );
}
