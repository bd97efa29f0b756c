//! Rule tables mapping repository paths to labels.
//!
//! Order inside each table matters: the first matching rule wins, so specific
//! entries sit above the catch-alls they override.

use std::sync::LazyLock;

use crate::rules::Effect::{Capture, Label, Subsystem};
use crate::rules::{Rule, RuleTable};

/// Umbrella label that replaces individual subsystems once too many changed.
pub const LIB_SRC: &str = "lib / src";

/// Label for changes that must run through CI.
pub const NEEDS_CI: &str = "needs-ci";

/// Labels the collapse rule never removes.
pub const STICKY_LABELS: &[&str] = &[NEEDS_CI, "c++", "doc", LIB_SRC];

/// JS subsystems recognized as labels of their own.
pub const JS_SUBSYSTEMS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "crypto",
    "debugger",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "esm",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "querystring",
    "quic",
    "readline",
    "repl",
    "report",
    "stream",
    "string_decoder",
    "test_runner",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker",
    "zlib",
];

#[must_use]
pub fn is_js_subsystem(name: &str) -> bool {
    JS_SUBSYSTEMS.contains(&name)
}

/// Rules for paths whose labels only apply when every changed path is one of
/// them: tests, docs and benchmarks.
pub static EXCLUSIVE_RULES: LazyLock<RuleTable> = LazyLock::new(|| {
    RuleTable::new(vec![
        // test/
        Rule::prefix("test/addons/", &[Label("test"), Label("addons")]),
        Rule::prefix("test/debugger", &[Label("test"), Label("debugger")]),
        Rule::prefix("test/doctool/", &[Label("test"), Label("doc"), Label("tools")]),
        Rule::prefix("test/timers", &[Label("test"), Label("timers")]),
        Rule::prefix("test/pseudo-tty/", &[Label("test"), Label("tty")]),
        Rule::prefix("test/inspector", &[Label("test"), Label("inspector")]),
        Rule::prefix("test/cctest/test_inspector", &[Label("test"), Label("inspector")]),
        Rule::prefix("test/cctest/test_url", &[Label("test"), Label("whatwg-url")]),
        Rule::pattern(
            r"^test/(?:addons-napi|js-native-api|node-api)/",
            &[Label("test"), Label("n-api")],
        ),
        Rule::prefix("test/async-hooks/", &[Label("test"), Label("async_hooks")]),
        Rule::prefix("test/report/", &[Label("test"), Label("report")]),
        Rule::pattern(r"^test/(?:fixtures/)?es-module", &[Label("test"), Label("esm")]),
        Rule::prefix("test/", &[Label("test")]),
        // doc/
        Rule::exact("doc/api/modules.md", &[Label("doc"), Label("module")]),
        Rule::exact("doc/api/esm.md", &[Label("doc"), Label("esm")]),
        Rule::exact("doc/api/webcrypto.md", &[Label("doc"), Label("crypto")]),
        Rule::exact("doc/api/webstreams.md", &[Label("doc"), Label("web streams")]),
        Rule::exact("doc/api/n-api.md", &[Label("doc"), Label("n-api")]),
        Rule::exact("doc/api/worker_threads.md", &[Label("doc"), Label("worker")]),
        Rule::exact("doc/api/deprecations.md", &[Label("doc"), Label("deprecations")]),
        Rule::pattern(r"^doc/api/(\w+)\.md$", &[Label("doc"), Subsystem(1)]),
        Rule::prefix("doc/", &[Label("doc")]),
        // benchmark/
        Rule::prefix("benchmark/buffers/", &[Label("benchmark"), Label("buffer")]),
        Rule::pattern(
            r"^benchmark/(?:arrays|es)/",
            &[Label("benchmark"), Label("v8 engine")],
        ),
        Rule::prefix("benchmark/_http", &[Label("benchmark"), Label("http")]),
        Rule::pattern(r"^benchmark/(?:misc|fixtures)/", &[Label("benchmark")]),
        Rule::prefix("benchmark/streams/", &[Label("benchmark"), Label("stream")]),
        Rule::pattern(
            r"^benchmark/async[-_]hooks/",
            &[Label("benchmark"), Label("async_hooks")],
        ),
        Rule::pattern(r"^benchmark/([^/]+)/", &[Label("benchmark"), Subsystem(1)]),
        Rule::prefix("benchmark/", &[Label("benchmark")]),
    ])
});

/// Rules for everything else: native sources, build and meta files, tools,
/// bundled dependencies and the JS library.
pub static SUBSYSTEM_RULES: LazyLock<RuleTable> = LazyLock::new(|| {
    let cpp = Label("c++");
    let build = Label("build");
    let ci = Label(NEEDS_CI);

    RuleTable::new(vec![
        // src/
        Rule::prefix("src/async_wrap", &[cpp, Label("async_wrap")]),
        Rule::pattern(r"^src/(?:base64|node_buffer|string_)", &[cpp, Label("buffer")]),
        Rule::prefix("src/cares", &[cpp, Label("cares")]),
        Rule::pattern(r"^src/(?:process_wrap|spawn_)", &[cpp, Label("child_process")]),
        Rule::pattern(r"^src/(?:node_)?crypto", &[cpp, Label("crypto")]),
        Rule::prefix("src/debug-agent", &[cpp, Label("debugger")]),
        Rule::prefix("src/udp_", &[cpp, Label("dgram")]),
        Rule::pattern(r"^src/(?:fs_|node_file|node_stat_watcher)", &[cpp, Label("fs")]),
        Rule::prefix("src/node_http_parser", &[cpp, Label("http_parser")]),
        Rule::prefix("src/node_i18n", &[cpp, Label("i18n-api")]),
        Rule::prefix("src/uv.", &[cpp, Label("libuv")]),
        Rule::pattern(r"^src/(?:connect(?:ion)?|pipe|tcp)_", &[cpp, Label("net")]),
        Rule::prefix("src/node_os", &[cpp, Label("os")]),
        Rule::pattern(r"^src/(?:node_main|signal_)", &[cpp, Label("process")]),
        Rule::prefix("src/timer_", &[cpp, Label("timers")]),
        Rule::pattern(r"^src/(?:node_root_certs|tls_)", &[cpp, Label("tls")]),
        Rule::prefix("src/tty_", &[cpp, Label("tty")]),
        Rule::prefix("src/node_url", &[cpp, Label("whatwg-url")]),
        Rule::prefix("src/node_util", &[cpp, Label("util")]),
        Rule::pattern(r"^src/(?:node_v8|v8abbr)", &[cpp, Label("v8 engine")]),
        Rule::prefix("src/node_contextify", &[cpp, Label("vm")]),
        Rule::pattern(r"^src/.*win32", &[cpp, Label("windows")]),
        Rule::prefix("src/node_zlib", &[cpp, Label("zlib")]),
        Rule::prefix("src/tracing", &[cpp, Label("tracing")]),
        Rule::prefix("src/node_api", &[cpp, Label("n-api")]),
        Rule::prefix("src/node_http2", &[cpp, Label("http2")]),
        Rule::prefix("src/node_report", &[cpp, Label("report")]),
        Rule::prefix("src/node_wasi", &[cpp, Label("wasi")]),
        Rule::prefix("src/node_worker", &[cpp, Label("worker")]),
        Rule::prefix("src/node_sea", &[cpp, Label("single-executable")]),
        Rule::prefix("src/inspector_", &[cpp, Label("inspector")]),
        Rule::pattern(r"^src/.+\.py$", &[Label(LIB_SRC)]),
        // a version bump alone is not a c++ change
        Rule::exact("src/node_version.h", &[]),
        Rule::prefix("src/", &[cpp]),
        // top-level build files
        Rule::exact("vcbuild.bat", &[build, Label("windows"), ci]),
        Rule::pattern(r"^(?:android-)?configure$", &[build, ci]),
        Rule::pattern(r"^[^/]+\.gypi?$", &[build, ci]),
        Rule::pattern(r"^(?:tools/)?(?:Makefile|BSDmakefile)$", &[build, ci]),
        Rule::pattern(
            r"^tools/(?:install\.py|create_android_makefiles|getnodeversion\.py|js2c\.py|utils\.py|configure\.d/)",
            &[build, ci],
        ),
        // top-level meta and doc files
        Rule::pattern(
            r"^(?:\.gitattributes|\.gitignore|\.mailmap|AUTHORS|LICENSE)$",
            &[Label("meta")],
        ),
        Rule::pattern(
            r"^(?:CHANGELOG|CODE_OF_CONDUCT|GOVERNANCE|ROADMAP|WORKING_GROUPS)\.md$",
            &[Label("meta"), Label("doc")],
        ),
        Rule::prefix(".github/", &[Label("meta")]),
        Rule::pattern(r"^[^/]+\.md$", &[build, Label("doc")]),
        Rule::pattern(r"^\.(?:eslint|remark|editorconfig)", &[Label("tools")]),
        // tools/
        Rule::pattern(
            r"^tools/(?:certdata|mkssldef|mk-ca-bundle)",
            &[Label("tools"), Label("openssl"), Label("tls")],
        ),
        Rule::prefix(
            "tools/msvs/",
            &[Label("tools"), build, Label("windows"), Label("install"), ci],
        ),
        Rule::pattern(
            r"^tools/[^/]+\.bat$",
            &[Label("tools"), build, Label("windows"), ci],
        ),
        Rule::pattern(
            r"^tools/(?:make-v8|v8_gypfiles)",
            &[Label("tools"), Label("v8 engine"), ci],
        ),
        Rule::pattern(r"^tools/(?:code_cache|snapshot)/", &[ci]),
        Rule::prefix("tools/icu/", &[Label("i18n-api"), ci]),
        Rule::prefix("tools/doc/", &[Label("tools"), Label("doc")]),
        Rule::prefix("tools/gyp/", &[Label("tools"), build]),
        Rule::exact("tools/test.py", &[Label("test"), Label("tools")]),
        Rule::prefix("tools/", &[Label("tools")]),
        // deps/
        Rule::prefix("deps/uv/", &[Label("libuv")]),
        Rule::exact(
            "deps/v8/tools/gen-postmortem-metadata.py",
            &[Label("v8 engine"), Label("post-mortem")],
        ),
        Rule::prefix("deps/v8/", &[Label("v8 engine")]),
        Rule::prefix("deps/uvwasi/", &[Label("wasi")]),
        Rule::prefix("deps/npm/", &[Label("npm")]),
        Rule::pattern(r"^deps/nghttp2/[^/]+\.gypi?$", &[build, Label("http2")]),
        Rule::prefix("deps/nghttp2/", &[Label("http2")]),
        Rule::prefix("deps/ngtcp2/", &[Label("quic")]),
        Rule::prefix("deps/icu", &[Label("i18n-api")]),
        Rule::prefix("deps/openssl/", &[Label("dependencies"), Label("openssl")]),
        Rule::pattern(r"^deps/([^/]+)/", &[Label("dependencies"), Capture(1)]),
        // lib/ oddities
        Rule::pattern(r"^lib/(?:punycode\.js|sys\.js|\w+/freelist)", &[]),
        Rule::pattern(r"^lib/(?:internal/)?constants\.js$", &[Label(LIB_SRC)]),
        Rule::prefix("lib/internal/bootstrap", &[Label(LIB_SRC)]),
        Rule::prefix("lib/internal/v8_prof_", &[Label("tools")]),
        Rule::pattern(r"^lib/internal/socket(?:_list|address)", &[Label("net")]),
        Rule::exact("lib/internal/linkedlist.js", &[Label("timers")]),
        Rule::pattern(r"^lib/\w+/streams$", &[Label("streams")]),
        Rule::pattern(r"^lib/.*http2", &[Label("http2")]),
        Rule::exact("lib/worker_threads.js", &[Label("worker")]),
        Rule::exact("lib/internal/url.js", &[Label("whatwg-url")]),
        Rule::prefix("lib/internal/modules/esm", &[Label("esm")]),
        Rule::prefix("lib/internal/webstreams", &[Label("web streams")]),
        Rule::prefix("lib/internal/test_runner", &[Label("test_runner")]),
        // lib/ files named after their subsystem
        Rule::pattern(r"^lib/_(\w+)_\w+\.js$", &[Capture(1)]),
        Rule::pattern(r"^lib/(?:internal/)?(\w+)\.js$", &[Capture(1)]),
        Rule::pattern(r"^lib/internal/(\w+)(?:/|$)", &[Capture(1)]),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(table: &RuleTable, path: &str) -> Vec<String> {
        table.labels_for(path).unwrap_or_default()
    }

    #[test]
    fn test_src_lookup_is_independent_of_cpp() {
        assert_eq!(labels(&SUBSYSTEM_RULES, "src/cares_wrap.cc"), ["c++", "cares"]);
        assert_eq!(labels(&SUBSYSTEM_RULES, "src/node.cc"), ["c++"]);
        assert!(labels(&SUBSYSTEM_RULES, "src/node_version.h").is_empty());
    }

    #[test]
    fn test_legacy_lib_files_use_their_prefix() {
        assert_eq!(labels(&SUBSYSTEM_RULES, "lib/_stream_wrap.js"), ["stream"]);
        assert_eq!(labels(&SUBSYSTEM_RULES, "lib/_debug_agent.js"), ["debug"]);
        assert_eq!(labels(&SUBSYSTEM_RULES, "lib/_http_outgoing.js"), ["http"]);
    }

    #[test]
    fn test_ignored_lib_files_claim_the_path() {
        assert_eq!(SUBSYSTEM_RULES.labels_for("lib/punycode.js"), Some(vec![]));
        assert_eq!(SUBSYSTEM_RULES.labels_for("lib/sys.js"), Some(vec![]));
    }

    #[test]
    fn test_deps_build_files_are_not_top_level_build_files() {
        assert_eq!(labels(&SUBSYSTEM_RULES, "deps/v8/Makefile"), ["v8 engine"]);
        assert_eq!(
            labels(&SUBSYSTEM_RULES, "deps/nghttp2/nghttp2.gyp"),
            ["build", "http2"]
        );
        assert_eq!(
            labels(&SUBSYSTEM_RULES, "deps/zlib/zlib.gyp"),
            ["dependencies", "zlib"]
        );
    }

    #[test]
    fn test_exclusive_rules_cover_tests_docs_and_benchmarks() {
        assert!(EXCLUSIVE_RULES.matches("test/parallel/test-fs.js"));
        assert!(EXCLUSIVE_RULES.matches("doc/onboarding.md"));
        assert!(EXCLUSIVE_RULES.matches("benchmark/misc/freelist.js"));
        assert!(!EXCLUSIVE_RULES.matches("lib/fs.js"));
        assert!(!EXCLUSIVE_RULES.matches("README.md"));
    }

    #[test]
    fn test_benchmark_directories() {
        assert_eq!(
            labels(&EXCLUSIVE_RULES, "benchmark/buffers/buffer-read.js"),
            ["benchmark", "buffer"]
        );
        assert_eq!(
            labels(&EXCLUSIVE_RULES, "benchmark/fs/readfile.js"),
            ["benchmark", "fs"]
        );
        assert_eq!(
            labels(&EXCLUSIVE_RULES, "benchmark/common.js"),
            ["benchmark"]
        );
        assert_eq!(
            labels(&EXCLUSIVE_RULES, "benchmark/napi/function_call/index.js"),
            ["benchmark"]
        );
    }

    #[test]
    fn test_subsystem_list() {
        assert!(is_js_subsystem("fs"));
        assert!(is_js_subsystem("module"));
        assert!(!is_js_subsystem("modules"));
        assert!(!is_js_subsystem("_toc"));
    }
}
