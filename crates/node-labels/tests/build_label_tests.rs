//! "build" labels for build system files.

use node_labels::resolve_labels;

#[test]
fn test_build_related_files() {
    let build_files = [
        "configure",
        "node.gyp",
        "common.gypi",
        "BSDmakefile",
        "Makefile",
        "tools/Makefile",
        "tools/install.py",
        "tools/create_android_makefiles",
        "tools/getnodeversion.py",
        "tools/js2c.py",
        "tools/utils.py",
        "tools/configure.d/nodedownload.py",
    ];

    for file in build_files {
        let labels = resolve_labels(&[file], None);
        assert!(
            labels.iter().any(|l| l == "build"),
            "{file} should have \"build\" label, got {labels:?}"
        );
        assert!(
            labels.iter().any(|l| l == "needs-ci"),
            "{file} should have \"needs-ci\" label, got {labels:?}"
        );
    }
}

#[test]
fn test_no_build_for_deps_makefile() {
    let labels = resolve_labels(&["deps/v8/Makefile"], None);

    assert!(!labels.iter().any(|l| l == "build"));
    assert!(labels.iter().any(|l| l == "needs-ci"));
}

#[test]
fn test_tools_build_scripts() {
    assert_eq!(
        resolve_labels(&["tools/msvs/msi/product.wxs"], None),
        ["tools", "build", "windows", "install", "needs-ci"]
    );
    assert_eq!(
        resolve_labels(&["tools/gyp/pylib/gyp/common.py"], None),
        ["tools", "build"]
    );
    assert_eq!(resolve_labels(&["tools/lint-md.mjs"], None), ["tools"]);
}
