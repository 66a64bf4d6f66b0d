//! Binding tests for serde_tini: realistic documents in and out.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_tini::{Error, from_str, to_string};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Tls {
    cert: String,
    enabled: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Listen {
    host: String,
    port: u16,
    tls: Tls,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Gateway {
    name: String,
    debug: bool,
    #[serde(with = "serde_tini::duration")]
    timeout: Duration,
    listen: Listen,
    limits: BTreeMap<String, u32>,
}

fn gateway() -> Gateway {
    Gateway {
        name: "gateway".into(),
        debug: false,
        timeout: Duration::from_secs(30),
        listen: Listen {
            host: "0.0.0.0".into(),
            port: 8443,
            tls: Tls {
                cert: "/etc/gateway/cert.pem".into(),
                enabled: true,
            },
        },
        limits: BTreeMap::from([("burst".into(), 50), ("rate".into(), 100)]),
    }
}

/// Helper to unwrap the collected type errors.
fn type_errors(err: Error) -> Vec<String> {
    match err {
        Error::Type(err) => err.errors,
        other => panic!("expected type errors, got {other:?}"),
    }
}

#[test]
fn test_serialize_gateway() {
    let text = to_string(&gateway()).unwrap();
    insta::assert_snapshot!(text, @r"
    name = gateway
    debug = false
    timeout = 30s

    [listen]
    host = 0.0.0.0
    port = 8443
    tls.cert = /etc/gateway/cert.pem
    tls.enabled = true

    [limits]
    burst = 50
    rate = 100
    ");
}

#[test]
fn test_gateway_reads_back() {
    let text = to_string(&gateway()).unwrap();
    let back: Gateway = from_str(&text).unwrap();
    assert_eq!(back, gateway());
}

#[test]
fn test_hand_written_gateway() {
    let text = r#"
# gateway settings
name = "gateway"
debug = off
timeout = 0.5m

[listen]
host = 0.0.0.0
port = 0x20FB          ; 8443
tls.enabled = yes
tls.cert = '/etc/gateway/cert.pem'

[limits]
rate = 100
burst = 5_0
"#;
    let parsed: Gateway = from_str(text).unwrap();
    assert_eq!(parsed, gateway());
}

#[derive(Deserialize, Debug, PartialEq)]
struct Database {
    host: String,
    port: u16,
    #[serde(default)]
    user: Option<String>,
}

#[test]
fn test_inherited_sections() {
    let text = "\
[common]
host = db.internal
port = 5432

[dev:common]
host = localhost

[prod:common]
user = svc
";
    let databases: BTreeMap<String, Database> = from_str(text).unwrap();
    assert_eq!(databases.len(), 3);
    assert_eq!(
        databases["dev"],
        Database {
            host: "localhost".into(),
            port: 5432,
            user: None,
        }
    );
    assert_eq!(databases["prod"].host, "db.internal");
    assert_eq!(databases["prod"].user.as_deref(), Some("svc"));
}

#[derive(Deserialize, Debug, PartialEq)]
struct Service {
    name: String,
    #[serde(with = "serde_tini::duration")]
    timeout: Duration,
}

#[derive(Deserialize, Debug, PartialEq)]
struct Services {
    #[serde(with = "serde_tini::duration")]
    timeout: Duration,
    api: Service,
}

#[test]
fn test_inherit_from_default() {
    let text = "timeout = 250ms\n[api:default]\nname = api\n";
    let services: Services = from_str(text).unwrap();
    assert_eq!(services.timeout, Duration::from_millis(250));
    assert_eq!(services.api.timeout, Duration::from_millis(250));
    assert_eq!(services.api.name, "api");
}

#[test]
fn test_duration_forms() {
    #[derive(Deserialize)]
    struct Wait {
        #[serde(with = "serde_tini::duration")]
        wait: Duration,
    }

    let wait = |text: &str| from_str::<Wait>(text).map(|w| w.wait);
    assert_eq!(wait("wait = 1h30m").unwrap(), Duration::from_secs(5400));
    assert_eq!(wait("wait = 1000").unwrap(), Duration::from_micros(1));
    assert_eq!(wait("wait =").unwrap(), Duration::ZERO);
    assert_eq!(
        type_errors(wait("wait = soon").unwrap_err()),
        ["line 1: cannot unmarshal !!str `soon` into Duration"]
    );
}

#[derive(Deserialize, Debug)]
#[allow(dead_code)]
struct Limits {
    workers: u8,
    ratio: f32,
    retries: u16,
    label: i32,
    strict: bool,
}

#[test]
fn test_every_mismatch_is_reported() {
    let text = "\
workers = 300
ratio = high
retries = -1
label = abcdefghijkl
strict = maybe
";
    let errors = type_errors(from_str::<Limits>(text).unwrap_err());
    assert_eq!(
        errors,
        [
            "line 1: cannot unmarshal !!int `300` into u8",
            "line 2: cannot unmarshal !!str `high` into f32",
            "line 3: cannot unmarshal !!int `-1` into u16",
            "line 4: cannot unmarshal !!str `abcdefg...` into i32",
            "line 5: cannot unmarshal !!str `maybe` into bool",
        ]
    );
}

#[test]
fn test_type_error_message() {
    let err = from_str::<Limits>("workers = 1\nratio = 0.5\nretries = 3\nlabel = 1.5\nstrict = true")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "ini: unmarshal errors:\n  line 4: cannot unmarshal !!float `1.5` into i32"
    );
}

#[test]
fn test_numeric_coercions() {
    #[derive(Deserialize)]
    struct Numbers {
        big: u64,
        whole: i32,
        ratio: f64,
        inf: f64,
        octal: u32,
    }

    let numbers: Numbers =
        from_str("big = 18446744073709551615\nwhole = 3.0\nratio = 7\ninf = -.inf\noctal = 0o17\n")
            .unwrap();
    assert_eq!(numbers.big, u64::MAX);
    assert_eq!(numbers.whole, 3);
    assert_eq!(numbers.ratio, 7.0);
    assert_eq!(numbers.inf, f64::NEG_INFINITY);
    assert_eq!(numbers.octal, 15);
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Postgres {
    host: String,
    port: u16,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Backend {
    Memory,
    Postgres(Postgres),
    Sqlite { path: String },
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Store {
    backend: Backend,
}

#[test]
fn test_enum_variants() {
    let store: Store = from_str("backend = memory").unwrap();
    assert_eq!(store.backend, Backend::Memory);

    let store: Store = from_str("[backend]\npostgres.host = db\npostgres.port = 5432\n").unwrap();
    assert_eq!(
        store.backend,
        Backend::Postgres(Postgres {
            host: "db".into(),
            port: 5432,
        })
    );

    let store: Store = from_str("backend.sqlite.path = /var/lib/app.db").unwrap();
    assert_eq!(
        store.backend,
        Backend::Sqlite {
            path: "/var/lib/app.db".into()
        }
    );
}

#[test]
fn test_enum_variants_serialize() {
    let postgres = Store {
        backend: Backend::Postgres(Postgres {
            host: "db".into(),
            port: 5432,
        }),
    };
    let text = to_string(&postgres).unwrap();
    assert_eq!(text, "[backend]\npostgres.host = db\npostgres.port = 5432\n");
    assert_eq!(from_str::<Store>(&text).unwrap(), postgres);

    let memory = Store {
        backend: Backend::Memory,
    };
    assert_eq!(to_string(&memory).unwrap(), "backend = memory\n");
}

#[test]
fn test_enum_with_two_keys_is_a_type_error() {
    let errors = type_errors(
        from_str::<Store>("[backend]\nmemory =\nsqlite.path = x\n").unwrap_err(),
    );
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("into Backend"), "{errors:?}");
}

#[test]
fn test_missing_field() {
    let err = from_str::<Database>("host = x").unwrap_err();
    assert_eq!(err.to_string(), "ini: missing field `port`");
}

#[test]
fn test_sequences_are_not_supported() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Hosts {
        hosts: Vec<String>,
    }

    let err = from_str::<Hosts>("hosts = a").unwrap_err();
    assert_eq!(err.to_string(), "ini: line 1: sequences are not supported");
}

#[test]
fn test_strings_needing_quotes() {
    let mut values = BTreeMap::new();
    values.insert("empty", "");
    values.insert("flag", "yes");
    values.insert("hash", "# not a comment");
    values.insert("padded", "  x  ");
    values.insert("version", "1.10");
    let text = to_string(&values).unwrap();
    assert_eq!(
        text,
        "empty = \"\"\nflag = \"yes\"\nhash = \"# not a comment\"\npadded = \"  x  \"\nversion = \"1.10\"\n"
    );
    let back: BTreeMap<String, String> = from_str(&text).unwrap();
    assert_eq!(back["padded"], "  x  ");
    assert_eq!(back["version"], "1.10");
    assert_eq!(back["empty"], "");
}

#[test]
fn test_from_reader() {
    let source = std::io::Cursor::new(b"host = reader\nport = 1\n".to_vec());
    let db: Database = serde_tini::from_reader(source).unwrap();
    assert_eq!(db.host, "reader");
}
