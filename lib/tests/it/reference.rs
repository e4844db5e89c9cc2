use dockmoor_lib::{Reference, ReferenceFormatError, NAME_TOTAL_LENGTH_MAX};
use proptest::prelude::*;
use simple_test_case::test_case;

use crate::{DIGEST, HEX};

#[test_case("nginx"; "nginx")]
#[test_case("alpine"; "alpine")]
#[test_case("httpd"; "httpd")]
#[test]
fn well_known_names(input: &str) {
    let reference = Reference::parse(input).unwrap();
    pretty_assertions::assert_eq!(reference.name(), format!("docker.io/library/{input}"));
    pretty_assertions::assert_eq!(reference.tag(), None);
    pretty_assertions::assert_eq!(reference.digest(), None);
}

#[test_case("nginx:latest"; "nginx:latest")]
#[test_case("nginx:1.15.2-alpine-perl"; "nginx:1.15.2-alpine-perl")]
#[test_case("mongo:3.4.16-windowsservercore-ltsc2016"; "mongo:3.4.16-windowsservercore-ltsc2016")]
#[test]
fn well_known_tagged_names(input: &str) {
    let reference = Reference::parse(input).unwrap();
    let tag = reference.tag().expect("reference is tagged");
    pretty_assertions::assert_eq!(
        format!("{}:{tag}", reference.name()),
        format!("docker.io/library/{input}")
    );
}

#[test_case("nginx"; "nginx")]
#[test_case("nginx:latest"; "nginx:latest")]
#[test_case("nginx:1.15.2-alpine-perl"; "nginx:1.15.2-alpine-perl")]
#[test_case("index.docker.io/nginx"; "index.docker.io/nginx")]
#[test_case(HEX; "identifier")]
#[test]
fn originals_are_unchanged(input: &str) {
    let reference = Reference::parse(input).unwrap();
    pretty_assertions::assert_eq!(reference.original(), input);
}

#[test_case(HEX; "identifier")]
#[test_case(DIGEST; "digest")]
#[test]
fn digest_only(input: &str) {
    let reference = Reference::parse(input).unwrap();
    assert!(!reference.is_named());
    pretty_assertions::assert_eq!(reference.name(), "");
    pretty_assertions::assert_eq!(reference.domain(), "");
    pretty_assertions::assert_eq!(reference.path(), "");
    pretty_assertions::assert_eq!(reference.tag(), None);
    pretty_assertions::assert_eq!(reference.digest().map(ToString::to_string).as_deref(), Some(DIGEST));
    pretty_assertions::assert_eq!(reference.to_string(), DIGEST);
}

#[test]
fn name_and_digest() {
    let reference = Reference::parse(&format!("nginx@{DIGEST}")).unwrap();
    pretty_assertions::assert_eq!(reference.name(), "docker.io/library/nginx");
    pretty_assertions::assert_eq!(reference.tag(), None);
    pretty_assertions::assert_eq!(reference.digest(), Some(&dockmoor_lib::digest!("d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240")));
}

#[test]
fn name_and_tag_and_digest() {
    let reference = Reference::parse(&format!("nginx:1.2@{DIGEST}")).unwrap();
    pretty_assertions::assert_eq!(reference.name(), "docker.io/library/nginx");
    pretty_assertions::assert_eq!(reference.tag(), Some("1.2"));
    pretty_assertions::assert_eq!(reference.digest().map(ToString::to_string).as_deref(), Some(DIGEST));
}

#[test_case("nginx", "docker.io", "library/nginx"; "nginx")]
#[test_case("my.com/nginx", "my.com", "nginx"; "my.com/nginx")]
#[test_case("localhost/app", "localhost", "app"; "localhost/app")]
#[test_case("localhost:5000/team/app:1.0", "localhost:5000", "team/app"; "localhost:5000/team/app:1.0")]
#[test_case("[::1]:5000/app", "[::1]:5000", "app"; "ipv6")]
#[test_case("ghcr.io/fossas/project/app:sha-e01ce6b", "ghcr.io", "fossas/project/app"; "ghcr.io/fossas/project/app:sha-e01ce6b")]
#[test_case("contribsys/faktory", "docker.io", "contribsys/faktory"; "contribsys/faktory")]
#[test_case("index.docker.io/nginx", "docker.io", "library/nginx"; "index.docker.io/nginx")]
#[test]
fn domain_and_path(input: &str, domain: &str, path: &str) {
    let reference = Reference::parse(input).unwrap();
    pretty_assertions::assert_eq!(reference.domain(), domain);
    pretty_assertions::assert_eq!(reference.path(), path);
    pretty_assertions::assert_eq!(reference.name(), format!("{domain}/{path}"));
}

#[test_case("app"; "app")]
#[test_case("library/app"; "library/app")]
#[test_case("docker.io/app"; "docker.io/app")]
#[test_case("docker.io/library/app"; "docker.io/library/app")]
#[test_case("index.docker.io/library/app"; "index.docker.io/library/app")]
#[test_case("app:1.0"; "app:1.0")]
#[test]
fn default_domain_is_equivalent(input: &str) {
    let reference = Reference::parse(input).unwrap();
    pretty_assertions::assert_eq!(reference.domain(), "docker.io");
    pretty_assertions::assert_eq!(reference.name(), "docker.io/library/app");
    pretty_assertions::assert_eq!(reference.familiar_name(), "app");
}

#[test_case("ubuntu", "docker.io/library/ubuntu"; "ubuntu")]
#[test_case("ubuntu:14.04", "docker.io/library/ubuntu:14.04"; "ubuntu:14.04")]
#[test_case("contribsys/faktory:1.0.0", "docker.io/contribsys/faktory:1.0.0"; "contribsys/faktory:1.0.0")]
#[test_case("host.dev/somecorp/someproject/someimage", "host.dev/somecorp/someproject/someimage"; "host.dev/somecorp/someproject/someimage")]
#[test]
fn display(input: &str, expected: &str) {
    let reference = Reference::parse(input).unwrap();
    pretty_assertions::assert_eq!(reference.to_string(), expected);
}

#[test_case("docker.io/library/nginx", "nginx"; "official")]
#[test_case("docker.io/contribsys/faktory", "contribsys/faktory"; "user")]
#[test_case("docker.io/library/team/app", "library/team/app"; "nested_library")]
#[test_case("ghcr.io/fossas/app", "ghcr.io/fossas/app"; "other_registry")]
#[test]
fn familiar_name(input: &str, expected: &str) {
    let reference = Reference::parse(input).unwrap();
    pretty_assertions::assert_eq!(reference.familiar_name(), expected);
}

#[test]
fn familiar_name_of_identifier() {
    let reference = Reference::parse(HEX).unwrap();
    pretty_assertions::assert_eq!(reference.familiar_name(), "");
}

#[test]
fn empty() {
    let err = Reference::parse("").expect_err("must error");
    pretty_assertions::assert_eq!(err, ReferenceFormatError::Empty);
}

#[test_case("invalid:reference:format"; "extra_colon")]
#[test_case("/repo:tag"; "empty_domain")]
#[test_case("host.io/:tag"; "empty_path_with_tag")]
#[test_case("host.io/"; "empty_path")]
#[test_case("nginx:"; "empty_tag")]
#[test_case("nginx@"; "empty_digest")]
#[test_case("nginx@sha256:abc"; "short_digest")]
#[test_case("nginx lts"; "whitespace")]
#[test]
fn invalid_format(input: &str) {
    let err = Reference::parse(input).expect_err("must error");
    assert!(
        matches!(err, ReferenceFormatError::Format { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn invalid_format_names_input() {
    let err = Reference::parse("invalid:reference:format").expect_err("must error");
    assert!(err.to_string().contains("invalid:reference:format"), "{err}");
}

#[test_case("Nginx"; "Nginx")]
#[test_case("docker.io/Library/nginx:latest"; "uppercase_namespace")]
#[test]
fn uppercase(input: &str) {
    let err = Reference::parse(input).expect_err("must error");
    assert!(
        matches!(err, ReferenceFormatError::Uppercase { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn uppercase_tag_is_allowed() {
    let reference = Reference::parse("nginx:Stable").unwrap();
    pretty_assertions::assert_eq!(reference.tag(), Some("Stable"));
}

#[test]
fn invalid_domain() {
    let err = Reference::parse("my_host.com/app").expect_err("must error");
    pretty_assertions::assert_eq!(
        err,
        ReferenceFormatError::Domain {
            input: String::from("my_host.com/app"),
            domain: String::from("my_host.com"),
        }
    );
}

#[test]
fn name_too_long() {
    let input = format!("example.com/{}", "a".repeat(250));
    let err = Reference::parse(&input).expect_err("must error");
    assert!(
        matches!(err, ReferenceFormatError::NameTooLong { .. }),
        "unexpected error: {err}"
    );

    let limit = format!("longer than {NAME_TOTAL_LENGTH_MAX} characters");
    assert!(err.to_string().contains(&limit), "unexpected error: {err}");
}

#[test_case(&format!("nginx@sha256:{}", &HEX[1..]); "wrong_length")]
#[test_case(&format!("nginx@md5:{HEX}"); "unsupported_algorithm")]
#[test_case(&format!("nginx@sha256:{}", HEX.to_uppercase()); "uppercase_hex")]
#[test]
fn invalid_digest(input: &str) {
    let err = Reference::parse(input).expect_err("must error");
    assert!(
        matches!(err, ReferenceFormatError::Digest { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn serializes_fields() {
    let reference = Reference::parse("nginx:1.25").unwrap();
    let rendered = serde_json::to_value(&reference).unwrap();
    pretty_assertions::assert_eq!(
        rendered,
        serde_json::json!({
            "original": "nginx:1.25",
            "domain": "docker.io",
            "path": "library/nginx",
            "name": "docker.io/library/nginx",
            "tag": "1.25",
            "digest": null,
        })
    );
}

// Strategy to generate valid host names
fn host_strategy() -> impl Strategy<Value = String> {
    // Generate reasonable hostnames like ghcr.io, registry.example.com, etc
    "[a-z][a-z0-9]{0,10}(\\.[a-z][a-z0-9]{0,10}){0,3}\\.[a-z]{2,6}"
}

// Strategy to generate valid repository paths
fn repository_strategy() -> impl Strategy<Value = String> {
    // Generate repository paths like ubuntu, library/ubuntu, user/project/app
    "[a-z][a-z0-9]{0,10}(/[a-z][a-z0-9]{0,10}){0,2}"
}

// Strategy to generate valid tags
fn tag_strategy() -> impl Strategy<Value = String> {
    // Generate reasonable tag names like latest, v1.0.0, etc
    "[a-zA-Z0-9_][a-zA-Z0-9._-]{0,40}"
}

// Strategy to generate valid SHA256 digests
fn digest_strategy() -> impl Strategy<Value = String> {
    "sha256:[a-f0-9]{64}"
}

// Strategy to generate complete reference strings, with every part optional but the repository
fn reference_strategy() -> impl Strategy<Value = String> {
    (
        proptest::option::of(host_strategy()),
        repository_strategy(),
        proptest::option::of(tag_strategy()),
        proptest::option::of(digest_strategy()),
    )
        .prop_map(|(host, repository, tag, digest)| {
            let mut reference = String::new();
            if let Some(host) = host {
                reference.push_str(&host);
                reference.push('/');
            }
            reference.push_str(&repository);
            if let Some(tag) = tag {
                reference.push(':');
                reference.push_str(&tag);
            }
            if let Some(digest) = digest {
                reference.push('@');
                reference.push_str(&digest);
            }
            reference
        })
}

proptest! {
    // Property: the original text is preserved exactly
    #[test]
    fn original_roundtrip(input in reference_strategy()) {
        let reference = Reference::parse(&input).unwrap();
        prop_assert_eq!(reference.original(), input.as_str());
    }

    // Property: re-parsing the normalized name and tag yields the same domain and path
    #[test]
    fn normalization_is_idempotent(input in reference_strategy()) {
        let reference = Reference::parse(&input).unwrap();
        let renormalized = match reference.tag() {
            Some(tag) => format!("{}:{tag}", reference.name()),
            None => reference.name().to_string(),
        };

        let reparsed = Reference::parse(&renormalized).unwrap();
        prop_assert_eq!(reparsed.domain(), reference.domain());
        prop_assert_eq!(reparsed.path(), reference.path());
        prop_assert_eq!(reparsed.tag(), reference.tag());
    }

    // Property: the display form parses to the same normalized reference
    #[test]
    fn display_is_canonical(input in reference_strategy()) {
        let reference = Reference::parse(&input).unwrap();
        let reparsed = Reference::parse(&reference.to_string()).unwrap();
        prop_assert_eq!(reparsed.name(), reference.name());
        prop_assert_eq!(reparsed.tag(), reference.tag());
        prop_assert_eq!(reparsed.digest(), reference.digest());
    }

    // Property: parsing should reject empty hosts
    #[test]
    fn rejects_empty_host(repository in repository_strategy(), tag in tag_strategy()) {
        let input = format!("/{repository}:{tag}");
        prop_assert!(Reference::parse(&input).is_err());
    }
}
