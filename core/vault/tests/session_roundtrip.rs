//! End-to-end sessions against a real key store on disk.

use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use jsonvault_common::{Error, Identity};
use jsonvault_crypto::{KeyStore, StoreScope};
use jsonvault_vault::{
    codec::decode_armored, ConsolePrompt, Document, Session, SessionOptions, VaultCodec,
};

const THUMB: &str = "1a2b3c4d5e6f1a2b3c4d5e6f1a2b3c4d5e6f1a2b3c4d5e6f1a2b3c4d5e6f1a2b";

struct Fixture {
    temp: TempDir,
    store: KeyStore,
}

impl Fixture {
    fn new(scope: StoreScope) -> Self {
        let temp = TempDir::new().unwrap();
        let store = KeyStore::new(temp.path().join("machine"), temp.path().join("user"));
        store.enroll(&Identity::parse(THUMB).unwrap(), scope).unwrap();
        Self { temp, store }
    }

    fn template(&self, text: &str) -> std::path::PathBuf {
        let path = self.temp.path().join("appsettings.json");
        fs::write(&path, text).unwrap();
        path
    }

    fn codec(&self, scope: StoreScope) -> VaultCodec {
        VaultCodec::new(Arc::new(self.store.clone()), scope, self.temp.path())
    }

    fn artifact(&self) -> std::path::PathBuf {
        self.temp.path().join(format!("{}.encVault", THUMB))
    }
}

fn run(
    fixture: &Fixture,
    input: &Path,
    thumbprint: &str,
    scope: StoreScope,
    console_input: &str,
) -> (Result<jsonvault_vault::SessionReport, Error>, String) {
    let mut console = ConsolePrompt::new(Cursor::new(console_input.as_bytes().to_vec()), Vec::new());
    let options = SessionOptions {
        input: input.to_path_buf(),
        thumbprint: Some(thumbprint.to_string()),
        answers: None,
    };
    let result = Session::new(options, fixture.codec(scope)).run(&mut console);
    let transcript = String::from_utf8(console.into_inner().1).unwrap();
    (result, transcript)
}

#[test]
fn fills_placeholders_in_document_order() {
    let fixture = Fixture::new(StoreScope::LocalMachine);
    let input = fixture.template(r#"{"name": "<ask>", "port": 8080, "tags": ["<ask>", "x"]}"#);

    let (result, transcript) = run(
        &fixture,
        &input,
        THUMB,
        StoreScope::LocalMachine,
        "alice\nprod\n\n",
    );
    let report = result.unwrap();

    let first = transcript.find("Enter replacement for 'name': ").unwrap();
    let second = transcript.find("Enter replacement for 'tags[0]': ").unwrap();
    assert!(first < second);
    assert_eq!(transcript.matches("Enter replacement").count(), 2);

    assert!(report.verified);
    let names: Vec<_> = report.resolved.iter().map(|p| p.to_string()).collect();
    assert_eq!(names, vec!["name", "tags[0]"]);

    let decrypted = transcript
        .split("Decrypted JSON for verification:\n")
        .nth(1)
        .unwrap();
    let doc = Document::parse(decrypted).unwrap();
    assert_eq!(
        doc.into_value(),
        serde_json::json!({"name": "alice", "port": 8080, "tags": ["prod", "x"]})
    );
}

#[test]
fn marker_free_document_encrypts_without_prompts() {
    let fixture = Fixture::new(StoreScope::LocalMachine);
    let input = fixture.template("{\"mode\": \"release\", \"debug\": false}");

    let (result, transcript) = run(&fixture, &input, THUMB, StoreScope::LocalMachine, "\n");

    let report = result.unwrap();
    assert!(report.resolved.is_empty());
    assert!(!transcript.contains("Enter replacement"));
    assert!(transcript.contains("{\n  \"mode\": \"release\",\n  \"debug\": false\n}"));
    assert!(fixture.artifact().exists());
}

#[test]
fn artifact_is_wrapped_base64_only() {
    let fixture = Fixture::new(StoreScope::LocalMachine);
    let long_value = "v".repeat(300);
    let input = fixture.template(&format!("{{\"blob\": \"{}\"}}", long_value));

    let (result, _) = run(&fixture, &input, THUMB, StoreScope::LocalMachine, "\n");
    result.unwrap();

    let armored = fs::read_to_string(fixture.artifact()).unwrap();
    let lines: Vec<&str> = armored.split("\r\n").collect();
    assert!(lines.len() > 1);
    assert!(lines.iter().all(|l| l.len() <= 76));
    assert!(lines
        .iter()
        .all(|l| l.chars().all(|c| c.is_ascii_alphanumeric() || "+/=".contains(c))));
    assert!(!decode_armored(&armored).unwrap().is_empty());
}

#[test]
fn short_thumbprint_aborts_before_anything() {
    let fixture = Fixture::new(StoreScope::LocalMachine);
    let input = fixture.template(r#"{"secret": "<ask>"}"#);

    let (result, transcript) = run(&fixture, &input, "abc", StoreScope::LocalMachine, "x\n\n");

    assert!(matches!(result, Err(Error::InvalidIdentity(_))));
    assert!(transcript.is_empty());
    let vaults = fs::read_dir(fixture.temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "encVault"))
        .count();
    assert_eq!(vaults, 0);
}

#[test]
fn wrong_store_scope_fails_encryption() {
    let fixture = Fixture::new(StoreScope::LocalMachine);
    let input = fixture.template(r#"{"a": 1}"#);

    let (result, _) = run(&fixture, &input, THUMB, StoreScope::CurrentUser, "\n");

    assert!(matches!(result, Err(Error::Encryption(_))));
    assert!(!fixture.artifact().exists());
}

#[test]
fn malformed_template_reports_parse_error() {
    let fixture = Fixture::new(StoreScope::CurrentUser);
    let input = fixture.template("{\"a\": [1, 2,, 3]}");

    let (result, _) = run(&fixture, &input, THUMB, StoreScope::CurrentUser, "\n");

    assert!(matches!(result, Err(Error::Parse(_))));
}

#[test]
fn corrupted_artifact_fails_read_back_and_stays() {
    let fixture = Fixture::new(StoreScope::CurrentUser);
    let codec = fixture.codec(StoreScope::CurrentUser);
    let identity = Identity::parse(THUMB).unwrap();

    let path = codec.seal("{\n  \"a\": 1\n}", &identity).unwrap();
    fs::write(&path, "####").unwrap();

    assert!(matches!(
        codec.verify(&identity),
        Err(Error::CorruptArtifact(_))
    ));
    assert!(path.exists());
}

#[test]
fn rerun_overwrites_previous_vault() {
    let fixture = Fixture::new(StoreScope::LocalMachine);
    let input = fixture.template(r#"{"pin": "<ask>"}"#);

    run(&fixture, &input, THUMB, StoreScope::LocalMachine, "1111\n\n")
        .0
        .unwrap();
    let first = fs::read_to_string(fixture.artifact()).unwrap();

    let (result, transcript) = run(&fixture, &input, THUMB, StoreScope::LocalMachine, "2222\n\n");
    result.unwrap();

    assert_ne!(fs::read_to_string(fixture.artifact()).unwrap(), first);
    assert!(transcript.ends_with("{\n  \"pin\": \"2222\"\n}\n"));
}
