use color_eyre::{eyre::Context, Result};
use predicates::str::contains;
use serde_json::Value;
use simple_test_case::test_case;

use crate::{dockerfile, dockmoor, DOCKERFILE};

const PINNED: &str =
    "ghcr.io/fossas/app@sha256:d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240";

fn lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(String::from)
        .collect()
}

#[test_case(&[], vec!["golang:1.22", "nginx", "nginx:latest", PINNED]; "all")]
#[test_case(&["--latest"], vec!["nginx:latest"]; "latest")]
#[test_case(&["--untagged"], vec!["nginx", PINNED]; "untagged")]
#[test_case(&["--tags", "1.22,1.23"], vec!["golang:1.22"]; "tags")]
#[test_case(&["--unpinned"], vec!["golang:1.22", "nginx", "nginx:latest"]; "unpinned")]
#[test_case(&["--domains", "ghcr.io"], vec![PINNED]; "domains")]
#[test_case(&["--names", "docker.io/library/nginx"], vec!["nginx", "nginx:latest"]; "names")]
#[test_case(&["--untagged", "--unpinned"], vec!["nginx"]; "untagged_unpinned")]
#[test_case(&["--latest", "--domains", "ghcr.io"], vec![]; "nothing")]
#[test]
fn find(args: &[&str], expected: Vec<&str>) -> Result<()> {
    let (_temp, path) = dockerfile(DOCKERFILE)?;
    let output = dockmoor()?
        .arg("find")
        .arg(&path)
        .args(args)
        .output()
        .context("run dockmoor")?;

    assert!(output.status.success(), "{output:?}");
    pretty_assertions::assert_eq!(lines(&output.stdout), expected);
    Ok(())
}

#[test]
fn find_json() -> Result<()> {
    let (_temp, path) = dockerfile(DOCKERFILE)?;
    let output = dockmoor()?
        .args(["find", &path, "--json", "--names", "docker.io/library/nginx"])
        .output()
        .context("run dockmoor")?;
    assert!(output.status.success(), "{output:?}");

    let rendered = serde_json::from_slice::<Value>(&output.stdout).context("parse output")?;
    pretty_assertions::assert_eq!(
        rendered,
        serde_json::json!([
            {
                "line": 5,
                "original": "nginx",
                "domain": "docker.io",
                "path": "library/nginx",
                "name": "docker.io/library/nginx",
                "tag": null,
                "digest": null,
            },
            {
                "line": 6,
                "original": "nginx:latest",
                "domain": "docker.io",
                "path": "library/nginx",
                "name": "docker.io/library/nginx",
                "tag": "latest",
                "digest": null,
            },
        ])
    );
    Ok(())
}

const SUGGESTION: &str = "use at most one predicate per group";

#[test_case(&["--latest", "--tags", "1.22"], "at most one tag predicate", true; "tag_group")]
#[test_case(&["--unpinned", "--digests", "sha256:abc"], "at most one digest predicate", true; "digest_group")]
#[test_case(&["--outdated"], "outdated predicate is not supported", false; "outdated")]
#[test]
fn invalid_predicates(args: &[&str], message: &str, suggested: bool) -> Result<()> {
    let (_temp, path) = dockerfile(DOCKERFILE)?;
    let assert = dockmoor()?
        .arg("find")
        .arg(&path)
        .args(args)
        .assert()
        .code(2)
        .stdout("")
        .stderr(contains(message));

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    pretty_assertions::assert_eq!(stderr.contains(SUGGESTION), suggested, "{stderr}");
    Ok(())
}

#[test]
fn not_a_dockerfile() -> Result<()> {
    let (_temp, path) = dockerfile("just some text\n")?;
    dockmoor()?
        .args(["find", &path])
        .assert()
        .code(2)
        .stderr(contains("not a Dockerfile"));
    Ok(())
}

#[test]
fn missing_input() -> Result<()> {
    let (temp, _) = dockerfile(DOCKERFILE)?;
    let missing = temp.path().join("Missing.Dockerfile");
    dockmoor()?
        .arg("find")
        .arg(&missing)
        .assert()
        .code(2)
        .stderr(contains("read input"));
    Ok(())
}
