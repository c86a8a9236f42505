use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn docmark_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docmark"));
    cmd.current_dir(dir);
    cmd.env_remove("DOCMARK_LOG");
    cmd
}

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/demo")
}

/// Run `generate` on the demo fixture into a fresh output directory.
fn generate_demo() -> (tempfile::TempDir, Output) {
    let out = tempfile::tempdir().unwrap();
    let output = docmark_cmd(&fixture())
        .args(["generate", "--output"])
        .arg(out.path())
        .output()
        .unwrap();
    (out, output)
}

fn page(out: &Path, file: &str) -> String {
    let path = out.join("Demo").join(file);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn generate_writes_every_page() {
    let (out, output) = generate_demo();
    assert!(output.status.success(), "generate failed: {}", stderr(&output));

    for file in [
        "Index.md",
        "Demo.assembly.md",
        "Demo.Geometry.namespace.md",
        "Demo.Util.namespace.md",
        "Demo.Geometry.Shape.md",
        "Demo.Geometry.Square.md",
        "Demo.Geometry.Square.ctor.System.Double.md",
        "Demo.Geometry.Box.1.md",
        "Demo.Geometry.Box.1.ctor.T.md",
        "Demo.Geometry.Box.1.Map.U.System.Func.2.T.U.md",
        "Demo.Geometry.Box.1.Value.md",
        "Demo.Geometry.Color.md",
        "Demo.Geometry.Color.Red.md",
        "Demo.Geometry.Resized.md",
        "Demo.Util.Calc.Sum.System.Int32.System.Int32.md",
        "Demo.Util.Calc.Sum.System.Int32Array.md",
        "Demo.Util.Calc.Changed.md",
    ] {
        assert!(out.path().join("Demo").join(file).exists(), "missing {file}");
    }
    assert!(!out.path().join("Demo/Demo.Geometry.Hidden.md").exists(), "internal type documented");
    // Inherited members link to the declaring type's page and get none of their own.
    assert!(!out.path().join("Demo/Demo.Geometry.Square.Name.md").exists());
    assert!(stderr(&output).contains("## Diagnostics"));
}

#[test]
fn type_page_links_internal_external_and_plain() {
    let (out, output) = generate_demo();
    assert!(output.status.success(), "generate failed: {}", stderr(&output));
    let square = page(out.path(), "Demo.Geometry.Square.md");

    assert!(square.contains("## Square Class"));
    assert!(square.contains(
        "**Inheritance** : [object](https://learn.microsoft.com/en-us/dotnet/api/system.object \"object\") ↣ [Shape](./Demo.Geometry.Shape.md \"Shape\") ↣ Square"
    ));
    assert!(square.contains("*A square.*"));
    assert!(square.contains("* All four sides are equal."));
    assert!(square.contains("Immutable once built."));
    assert!(square.contains("[Attach(Gadget, Token)](./Demo.Geometry.Square.Attach.Demo.Vendor.Gadget.Vendor.Internal.Token.md \"Attach(Gadget, Token)\")"));
    assert!(square.contains(
        "[Name](./Demo.Geometry.Shape.Name.md \"Name\")&nbsp;&nbsp;&nbsp;&nbsp;*(inherited from [Shape](./Demo.Geometry.Shape.md \"Shape\"))*"
    ));
    assert!(square.contains("ToString()&nbsp;&nbsp;&nbsp;&nbsp;*(inherited from [object]("));

    let attach = page(out.path(), "Demo.Geometry.Square.Attach.Demo.Vendor.Gadget.Vendor.Internal.Token.md");
    assert!(attach.contains("|gadget|[Gadget](https://example.com/gadget \"Gadget\")|-|"));
    assert!(attach.contains("|token|Token|-|"));
}

#[test]
fn generic_member_page_resolves_arguments_independently() {
    let (out, output) = generate_demo();
    assert!(output.status.success(), "generate failed: {}", stderr(&output));
    let map = page(out.path(), "Demo.Geometry.Box.1.Map.U.System.Func.2.T.U.md");

    assert!(map.contains("#### Map\\<U\\>(Func\\<T, U\\>) Method"));
    assert!(map.contains(
        "|selector|[Func](https://learn.microsoft.com/en-us/dotnet/api/system.func-2 \"Func\")\\<T, U\\>|Transformation.|"
    ));
    assert!(map.contains("**Return Type** : [Box](./Demo.Geometry.Box.1.md \"Box\")\\<U\\>"));
    assert!(map.contains("**Returns** : A new box."));
    assert!(map.contains("|U|Result type.|-|"));

    let ctor = page(out.path(), "Demo.Geometry.Box.1.ctor.T.md");
    assert!(ctor.contains("*Wraps a value.*"));
    assert!(ctor.contains("|value|T|The value.|"));
}

#[test]
fn namespace_page_groups_by_directory_and_lists_delegates() {
    let (out, output) = generate_demo();
    assert!(output.status.success(), "generate failed: {}", stderr(&output));
    let ns = page(out.path(), "Demo.Geometry.namespace.md");

    assert!(ns.starts_with("###### [Home](./Index.md \"Home\")"));
    assert!(ns.contains("*Plane shapes.*"));
    assert!(ns.contains("* **Shapes**\n    * [Shape](./Demo.Geometry.Shape.md \"Shape\")\n    * [Square]"));
    assert!(ns.contains("#### Delegates\n\n* [Resized](./Demo.Geometry.Resized.md \"Resized\")"));
}

#[test]
fn member_page_shows_exceptions_and_parameters() {
    let (out, output) = generate_demo();
    assert!(output.status.success(), "generate failed: {}", stderr(&output));
    let ctor = page(out.path(), "Demo.Geometry.Square.ctor.System.Double.md");

    assert!(ctor.contains("#### Square(double) Constructor"));
    assert!(ctor.contains("|side|[double](https://learn.microsoft.com/en-us/dotnet/api/system.double \"double\")|Side length.|"));
    assert!(ctor.contains(
        "|[ArgumentOutOfRangeException](https://learn.microsoft.com/en-us/dotnet/api/system.argumentoutofrangeexception \"ArgumentOutOfRangeException\")|Side is negative.|"
    ));
    assert!(ctor.contains("**Declaring Type** : [Square](./Demo.Geometry.Square.md \"Square\")"));
}

#[test]
fn fragment_is_appended_after_generated_content() {
    let (out, output) = generate_demo();
    assert!(output.status.success(), "generate failed: {}", stderr(&output));
    let shape = page(out.path(), "Demo.Geometry.Shape.md");
    assert!(shape.ends_with("\n\n## See also\n\nHand-written notes about shapes.\n"));
    assert!(!page(out.path(), "Demo.Geometry.Square.md").contains("Hand-written"));
}

#[test]
fn ids_lists_canonical_ids_with_pages() {
    let out = tempfile::tempdir().unwrap();
    let output = docmark_cmd(&fixture()).args(["ids", "--output"]).arg(out.path()).output().unwrap();
    assert!(output.status.success(), "ids failed: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("M:Demo.Geometry.Box`1.#ctor(`0) -> "));
    assert!(stdout.contains("M:Demo.Geometry.Box`1.Map``1(System.Func{`0,``0}) -> "));
    assert!(stdout.contains("T:Demo.Geometry.Resized -> ") && stdout.contains("(no comment)"));
    assert!(!out.path().join("Demo").exists(), "ids must not write pages");
}

#[test]
fn malformed_documentation_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixture().join("Demo.universe.json"), dir.path().join("Demo.universe.json")).unwrap();
    std::fs::write(dir.path().join("Demo.xml"), "<doc><members><member name=\"T:Demo.Geometry.Shape\">").unwrap();

    let output = docmark_cmd(dir.path())
        .args(["generate", "--universe", "Demo.universe.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Malformed Documentation File"), "{}", stderr(&output));
}

#[test]
fn wrong_root_element_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixture().join("Demo.universe.json"), dir.path().join("Demo.universe.json")).unwrap();
    std::fs::write(dir.path().join("Demo.xml"), "<notdoc/>").unwrap();

    let output = docmark_cmd(dir.path())
        .args(["generate", "--universe", "Demo.universe.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("expected root element <doc>"));
}

#[test]
fn missing_universe_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = docmark_cmd(dir.path())
        .args(["generate", "--universe", "absent.universe.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Input Missing"));
}

#[test]
fn unconfigured_universe_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = docmark_cmd(dir.path()).arg("generate").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No Type Universe"));
}

#[test]
fn info_json_is_valid() {
    let dir = tempfile::tempdir().unwrap();
    let output = docmark_cmd(dir.path()).args(["info", "--json"]).output().unwrap();
    assert!(output.status.success());
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["current_state"]["config_found"], false);
    assert_eq!(info["exit_codes"].as_array().map(Vec::len), Some(3));
}
