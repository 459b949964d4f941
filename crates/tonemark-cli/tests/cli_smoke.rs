use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const PAGE: &str = r#"<html><body>
<a href="gradint.cgi?jsl=zh&amp;js=x">ni3 hao3</a>
<a href="gradint.cgi?jsl=zh-yue&amp;js=x">sin<sup>1</sup></a>
<a href="/elsewhere">ma1</a>
</body></html>
"#;

fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo_bin!("tonemark-cli"))
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("run tonemark-cli");
    assert!(
        output.status.success(),
        "tonemark-cli failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 stdout")
}

#[test]
fn forced_capabilities_rewrite_matching_links() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let page = write_fixture(tmp.path(), "page.html", PAGE);

    let out = stdout_of(cli().args([
        "rewrite",
        "--pinyin",
        "on",
        "--superscript",
        "on",
        page.to_string_lossy().as_ref(),
    ]));
    assert!(out.contains(">nǐ hǎo</a>"), "{out}");
    assert!(out.contains(">sin¹</a>"), "{out}");
    assert!(out.contains(r#"<a href="/elsewhere">ma1</a>"#), "{out}");
    assert!(out.contains("font-family: FreeSerif"), "{out}");
}

#[test]
fn auto_without_fonts_leaves_the_document_alone() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let page = write_fixture(tmp.path(), "page.html", PAGE);

    let out = stdout_of(cli().arg(page.to_string_lossy().as_ref()));
    assert_eq!(out, PAGE);
}

#[test]
fn each_capability_gates_its_own_links() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let page = write_fixture(tmp.path(), "page.html", PAGE);

    let out = stdout_of(cli().args([
        "--pinyin",
        "on",
        "--superscript",
        "off",
        page.to_string_lossy().as_ref(),
    ]));
    assert!(out.contains(">nǐ hǎo</a>"), "{out}");
    assert!(out.contains(">sin<sup>1</sup></a>"), "{out}");
}

#[test]
fn out_flag_writes_file_and_report_goes_to_stderr() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let page = write_fixture(tmp.path(), "page.html", PAGE);
    let out_path = tmp.path().join("out.html");

    let output = cli()
        .args([
            "--pinyin",
            "on",
            "--superscript",
            "on",
            "--report",
            "--out",
            out_path.to_string_lossy().as_ref(),
            page.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run tonemark-cli");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written = fs::read_to_string(&out_path).expect("read output");
    assert!(written.contains(">sin¹</a>"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    let report_line = stderr
        .lines()
        .find(|l| l.starts_with('{'))
        .expect("JSON report on stderr");
    let report: serde_json::Value = serde_json::from_str(report_line).expect("report JSON");
    assert_eq!(report["links"], 3);
    assert_eq!(report["mutations"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["capabilities"]["pinyinDiacritics"], true);
}

#[test]
fn config_file_overrides_markers() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let page = write_fixture(
        tmp.path(),
        "page.html",
        r#"<a href="/say?lang=cmn">ma3</a><a href="gradint.cgi?jsl=zh&amp;js=x">ma3</a>"#,
    );
    let config = write_fixture(
        tmp.path(),
        "tonemark.json",
        r#"{ "fontFamily": "serif", "markers": { "mandarin": "lang=cmn" } }"#,
    );

    let out = stdout_of(cli().args([
        "--config",
        config.to_string_lossy().as_ref(),
        "--pinyin",
        "on",
        page.to_string_lossy().as_ref(),
    ]));
    assert_eq!(
        out,
        r#"<a href="/say?lang=cmn" style="font-family: serif">mǎ</a><a href="gradint.cgi?jsl=zh&amp;js=x">ma3</a>"#
    );
}

#[test]
fn convert_applies_one_table() {
    let out = stdout_of(cli().args(["convert", "--mandarin", "ang1 Ai4"]));
    assert_eq!(out, "āng Ài\n");

    let out = stdout_of(cli().args(["convert", "--cantonese", "jyut<sup>6</sup>"]));
    assert_eq!(out, "jyut⁶\n");
}

#[test]
fn probe_without_fonts_reports_nothing_renderable() {
    let out = stdout_of(cli().arg("probe"));
    let caps: serde_json::Value = serde_json::from_str(out.trim()).expect("probe JSON");
    assert_eq!(
        caps,
        serde_json::json!({ "pinyinDiacritics": false, "superscriptDigits": false })
    );
}

#[test]
fn usage_errors_exit_with_code_2() {
    cli().args(["--pinyin", "maybe"]).assert().code(2);
    cli().args(["convert", "ni3"]).assert().code(2);
    cli().arg("--bogus").assert().code(2);
}

#[test]
fn unreadable_font_fails() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let page = write_fixture(tmp.path(), "page.html", PAGE);
    let missing = tmp.path().join("missing.ttf");

    cli()
        .args([
            "--font",
            &format!("FreeSerif={}", missing.display()),
            page.to_string_lossy().as_ref(),
        ])
        .assert()
        .code(1);
}

fn dejavu_font_arg() -> String {
    format!(
        "DejaVu Sans={}/../tonemark-fonts/tests/fixtures/DejaVuSans.ttf",
        env!("CARGO_MANIFEST_DIR")
    )
}

#[test]
fn probe_with_a_real_font_follows_the_configured_stack() {
    let font = dejavu_font_arg();

    let out = stdout_of(cli().args(["probe", "--font", &font]));
    let caps: serde_json::Value = serde_json::from_str(out.trim()).expect("probe JSON");
    assert_eq!(
        caps,
        serde_json::json!({ "pinyinDiacritics": true, "superscriptDigits": true })
    );

    let out = stdout_of(cli().args(["probe", "--font", &font, "--font-family", "FreeSerif"]));
    let caps: serde_json::Value = serde_json::from_str(out.trim()).expect("probe JSON");
    assert_eq!(caps["pinyinDiacritics"], false);
    assert_eq!(caps["superscriptDigits"], false);
}

#[test]
fn font_family_flag_overrides_config() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let page = write_fixture(
        tmp.path(),
        "page.html",
        r#"<a href="gradint.cgi?jsl=zh&amp;js=x">ma3</a>"#,
    );

    let out = stdout_of(cli().args([
        "--pinyin",
        "on",
        "--font-family",
        "DejaVu Sans, serif",
        page.to_string_lossy().as_ref(),
    ]));
    assert_eq!(
        out,
        r#"<a href="gradint.cgi?jsl=zh&amp;js=x" style="font-family: DejaVu Sans, serif">mǎ</a>"#
    );
}

#[test]
fn font_size_flag_is_validated() {
    cli().args(["probe", "--font-size", "big"]).assert().code(2);
    cli()
        .args(["probe", "--font", &dejavu_font_arg(), "--font-size", "0"])
        .assert()
        .code(1);
}
