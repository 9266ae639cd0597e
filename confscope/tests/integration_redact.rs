//! Integration tests for redacted copies.
//!
//! These tests verify that:
//! - every secret field in the copy holds the placeholder, at any depth
//! - the source instance is never modified
//! - arrays are replaced wholesale and redaction is idempotent

use std::{
    collections::{BTreeSet, HashSet},
    path::PathBuf,
};

use confscope::{
    diff, redact, redact_optional, Configuration, Error, Introspect, Operand, DEFAULT_PLACEHOLDER,
};
#[cfg(feature = "slog")]
use serde::Serialize;

#[derive(Clone, PartialEq, Configuration)]
#[cfg_attr(feature = "slog", derive(Serialize))]
#[config(rename_all = "PascalCase")]
struct Credentials {
    username: String,
    #[config(secret)]
    password: String,
}

#[derive(Clone, PartialEq, Configuration)]
#[cfg_attr(feature = "slog", derive(Serialize))]
#[config(rename_all = "PascalCase")]
struct Certificate {
    path: PathBuf,
    #[config(secret)]
    password: Option<String>,
}

#[derive(Clone, PartialEq, Configuration)]
#[cfg_attr(feature = "slog", derive(Serialize))]
#[config(rename_all = "PascalCase")]
struct Web {
    port: u16,
    certificate: Certificate,
    #[config(secret)]
    api_keys: Vec<String>,
    #[config(secret, rename = "JwtSecret")]
    jwt_key: Box<String>,
}

#[derive(Clone, PartialEq, Configuration)]
#[cfg_attr(feature = "slog", derive(Serialize))]
#[config(rename_all = "PascalCase")]
struct Options {
    instance_name: String,
    credentials: Credentials,
    web: Web,
    #[config(secret)]
    pin: u32,
}

fn sample() -> Options {
    Options {
        instance_name: "default".into(),
        credentials: Credentials {
            username: "admin".into(),
            password: "hunter2".into(),
        },
        web: Web {
            port: 5030,
            certificate: Certificate {
                path: PathBuf::from("/etc/cert.pfx"),
                password: Some("pfx-pass".into()),
            },
            api_keys: vec!["k1".into(), "k2".into()],
            jwt_key: Box::new("jwt".into()),
        },
        pin: 1234,
    }
}

#[test]
fn test_secrets_are_masked_at_every_depth() {
    let redacted = redact(&sample(), "*****").unwrap();

    assert_eq!(redacted.credentials.password, "*****");
    assert_eq!(redacted.web.certificate.password.as_deref(), Some("*****"));
    assert_eq!(*redacted.web.jwt_key, "*****");
    assert_eq!(redacted.pin, 0);
}

#[test]
fn test_non_secret_fields_are_copied() {
    let original = sample();
    let redacted = redact(&original, DEFAULT_PLACEHOLDER).unwrap();

    assert_eq!(redacted.instance_name, "default");
    assert_eq!(redacted.credentials.username, "admin");
    assert_eq!(redacted.web.port, 5030);
    assert_eq!(redacted.web.certificate.path, PathBuf::from("/etc/cert.pfx"));

    let paths: Vec<_> = diff(&original, &redacted)
        .unwrap()
        .iter()
        .filter(|difference| !difference.is_secret())
        .map(|difference| difference.path().to_string())
        .collect();
    assert!(paths.is_empty());
}

#[test]
fn test_only_secret_paths_change() {
    let original = sample();
    let redacted = original.redacted().unwrap();

    let paths: Vec<_> = diff(&original, &redacted)
        .unwrap()
        .iter()
        .map(|difference| difference.path().to_string())
        .collect();
    assert_eq!(
        paths,
        [
            "Credentials.Password",
            "Web.Certificate.Password",
            "Web.ApiKeys",
            "Web.JwtSecret",
            "Pin",
        ]
    );
}

#[test]
fn test_source_is_unchanged() {
    let original = sample();
    let snapshot = original.clone();

    let mut redacted = redact(&original, DEFAULT_PLACEHOLDER).unwrap();
    redacted.credentials.username = "changed".into();
    redacted.web.api_keys.push("k3".into());

    assert!(original == snapshot);
    assert!(diff(&original, &snapshot).unwrap().is_empty());
}

#[test]
fn test_secret_arrays_are_replaced_wholesale() {
    let redacted = redact(&sample(), "xxx").unwrap();
    assert_eq!(redacted.web.api_keys, vec!["xxx".to_string()]);
}

#[test]
fn test_redaction_is_idempotent() {
    let once = redact(&sample(), DEFAULT_PLACEHOLDER).unwrap();
    let twice = redact(&once, DEFAULT_PLACEHOLDER).unwrap();
    assert!(diff(&once, &twice).unwrap().is_empty());
}

#[test]
fn test_custom_placeholder() {
    let redacted = sample().redacted_with("[hidden]").unwrap();
    assert_eq!(redacted.credentials.password, "[hidden]");
    assert_eq!(redacted.web.api_keys, vec!["[hidden]".to_string()]);
}

#[test]
fn test_absent_target() {
    let err = redact_optional::<Options>(None, DEFAULT_PLACEHOLDER).unwrap_err();
    assert!(matches!(
        err,
        Error::NullArgument {
            operand: Operand::Target
        }
    ));
    assert_eq!(err.to_string(), "redaction target operand is missing");

    let present = sample();
    let redacted = redact_optional(Some(&present), DEFAULT_PLACEHOLDER).unwrap();
    assert_eq!(redacted.credentials.password, DEFAULT_PLACEHOLDER);
}

#[test]
fn test_debug_output_masks_secrets() {
    let rendered = format!("{:?}", sample());
    assert!(rendered.contains("instance_name: \"default\""));
    assert!(rendered.contains("password: \"*****\""));
    assert!(!rendered.contains("hunter2"));
    assert!(!rendered.contains("pfx-pass"));
    assert!(!rendered.contains("k1"));
}

#[test]
fn test_type_without_secrets_is_cloned_verbatim() {
    #[derive(Clone, PartialEq, Configuration)]
    #[cfg_attr(feature = "slog", derive(Serialize))]
    struct Plain {
        name: String,
        tags: Vec<String>,
    }

    let plain = Plain {
        name: "n".into(),
        tags: vec!["t".into()],
    };
    assert!(redact(&plain, DEFAULT_PLACEHOLDER).unwrap() == plain);
}

#[test]
fn test_secret_sets_and_nullable_arrays_are_replaced() {
    #[derive(Clone, PartialEq, Configuration)]
    #[cfg_attr(feature = "slog", derive(Serialize))]
    struct Keyring {
        #[config(secret)]
        fingerprints: BTreeSet<String>,
        #[config(secret)]
        tokens: HashSet<String>,
        #[config(secret)]
        backups: Option<Vec<String>>,
        mirrors: Option<Vec<String>>,
    }

    let keyring = Keyring {
        fingerprints: BTreeSet::from(["ab:cd".to_string()]),
        tokens: HashSet::from(["t1".to_string(), "t2".to_string()]),
        backups: None,
        mirrors: Some(vec!["m1".into()]),
    };
    let redacted = redact(&keyring, DEFAULT_PLACEHOLDER).unwrap();

    assert_eq!(
        redacted.fingerprints,
        BTreeSet::from([DEFAULT_PLACEHOLDER.to_string()])
    );
    assert_eq!(
        redacted.tokens,
        HashSet::from([DEFAULT_PLACEHOLDER.to_string()])
    );
    assert_eq!(redacted.backups, Some(vec![DEFAULT_PLACEHOLDER.to_string()]));
    assert_eq!(redacted.mirrors, keyring.mirrors);
    assert_eq!(keyring.tokens.len(), 2);
}

#[test]
fn test_debug_output_uses_unprefixed_raw_names() {
    #[derive(Clone, Configuration)]
    #[cfg_attr(feature = "slog", derive(Serialize))]
    struct Listener {
        r#type: String,
        #[config(secret)]
        r#ref: String,
    }

    let listener = Listener {
        r#type: "tcp".into(),
        r#ref: "hidden".into(),
    };
    let rendered = format!("{:?}", listener);
    assert_eq!(rendered, "Listener { type: \"tcp\", ref: \"*****\" }");
}
