//! Pipeline tests against a scripted host and an in-memory configuration
//! store. No real processes or files are involved.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use prefixsync_core::{InterfaceName, PrefixError};
use prefixsync_host::{CommandOutput, CommandRunner, HostError};
use prefixsync_sync::{
    pipeline::{self, SyncOutcome},
    ConfigStore, DaemonConfig, SyncError, SyncOptions,
};
use rstest::rstest;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

const E2E_LISTING: &str = r#"[{"ifindex":2,"ifname":"eth0","addr_info":[
  {"family":"inet6","local":"2001:db8:abcd::1","prefixlen":64,"scope":"global","dynamic":true,"valid_life_time":3600,"preferred_life_time":1800},
  {"family":"inet6","local":"fd00::1","prefixlen":64,"scope":"global","valid_life_time":4294967295,"preferred_life_time":4294967295}
]}]"#;

enum IpReply {
    Listing(&'static str),
    Fails(&'static str),
    Missing,
}

struct FakeHost {
    ip: IpReply,
    restart_status: i32,
    calls: RefCell<Vec<String>>,
}

impl FakeHost {
    fn new(ip: IpReply) -> Self {
        Self {
            ip,
            restart_status: 0,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn restarts(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("systemctl restart"))
            .count()
    }
}

impl CommandRunner for FakeHost {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, HostError> {
        self.calls
            .borrow_mut()
            .push(format!("{program} {}", args.join(" ")));
        match program {
            "ip" => match self.ip {
                IpReply::Listing(json) => Ok(CommandOutput {
                    status: Some(0),
                    stdout: json.to_string(),
                    stderr: String::new(),
                }),
                IpReply::Fails(stderr) => Ok(CommandOutput {
                    status: Some(1),
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                }),
                IpReply::Missing => Err(HostError::ToolMissing {
                    tool: "ip".to_string(),
                }),
            },
            "systemctl" => Ok(CommandOutput {
                status: Some(self.restart_status),
                stdout: String::new(),
                stderr: String::new(),
            }),
            other => panic!("unexpected program {other}"),
        }
    }
}

#[derive(Default)]
struct MemoryStore {
    files: RefCell<HashMap<PathBuf, String>>,
    writes: RefCell<usize>,
}

impl MemoryStore {
    fn with(path: &Path, contents: &str) -> Self {
        let store = Self::default();
        store
            .files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        store
    }

    fn get(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }
}

impl ConfigStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        self.get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        *self.writes.borrow_mut() += 1;
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

fn options() -> SyncOptions {
    let mut opts = SyncOptions::new(InterfaceName::new("eth0").unwrap());
    opts.config_path = PathBuf::from("/etc/docker/daemon.json");
    opts
}

const STALE_CONFIG: &str =
    r#"{"ipv6": true, "fixed-cidr-v6": "2001:db8:0000::/80", "log-driver": "journald"}"#;

// ---------------------------------------------------------------------------
// End-to-end flow
// ---------------------------------------------------------------------------

#[test]
fn stale_prefix_is_rewritten_then_left_alone() {
    let opts = options();
    let host = FakeHost::new(IpReply::Listing(E2E_LISTING));
    let store = MemoryStore::with(&opts.config_path, STALE_CONFIG);

    let first = pipeline::run(&host, &store, &opts).expect("first run");
    assert_eq!(
        first,
        SyncOutcome::Updated {
            previous: "2001:db8::/80".parse().unwrap(),
            current: "2001:db8:abcd:0:ffff::/80".parse().unwrap(),
            restarted: true,
        }
    );
    assert_eq!(host.restarts(), 1);
    assert_eq!(*store.writes.borrow(), 1);

    let written = DaemonConfig::parse(&opts.config_path, &store.get(&opts.config_path).unwrap())
        .expect("written config parses");
    assert_eq!(written.fixed_cidr().to_string(), "2001:db8:abcd:0:ffff::/80");
    assert_eq!(written.document()["log-driver"], "journald");
    assert_eq!(written.document()["ipv6"], true);

    let second = pipeline::run(&host, &store, &opts).expect("second run");
    assert!(matches!(second, SyncOutcome::Unchanged { .. }), "got: {second:?}");
    assert_eq!(host.restarts(), 1, "second run must not restart");
    assert_eq!(*store.writes.borrow(), 1, "second run must not write");
}

#[test]
fn restart_failure_is_not_fatal() {
    let opts = options();
    let mut host = FakeHost::new(IpReply::Listing(E2E_LISTING));
    host.restart_status = 1;
    let store = MemoryStore::with(&opts.config_path, STALE_CONFIG);

    let outcome = pipeline::run(&host, &store, &opts).expect("run succeeds");
    assert!(matches!(outcome, SyncOutcome::Updated { restarted: false, .. }));
    assert_eq!(*store.writes.borrow(), 1, "config write happened before restart");
    assert_eq!(host.restarts(), 1, "restart is attempted exactly once");
}

#[test]
fn dry_run_writes_and_restarts_nothing() {
    let mut opts = options();
    opts.dry_run = true;
    let host = FakeHost::new(IpReply::Listing(E2E_LISTING));
    let store = MemoryStore::with(&opts.config_path, STALE_CONFIG);

    let outcome = pipeline::run(&host, &store, &opts).expect("dry run");
    assert!(matches!(outcome, SyncOutcome::WouldUpdate { .. }));
    assert!(outcome.to_string().contains("[dry-run]"));
    assert_eq!(*store.writes.borrow(), 0);
    assert_eq!(host.restarts(), 0);
    assert_eq!(store.get(&opts.config_path).unwrap(), STALE_CONFIG);
}

#[test]
fn custom_subnet_size_and_service_are_honoured() {
    let mut opts = options();
    opts.subnet_len = 112;
    opts.service = "moby".to_string();
    let host = FakeHost::new(IpReply::Listing(E2E_LISTING));
    let store = MemoryStore::with(&opts.config_path, STALE_CONFIG);

    let outcome = pipeline::run(&host, &store, &opts).expect("run");
    let SyncOutcome::Updated { current, .. } = outcome else {
        panic!("expected update, got {outcome:?}");
    };
    assert_eq!(current.to_string(), "2001:db8:abcd:0:ffff:ffff:ffff:0/112");
    assert!(host.calls.borrow().iter().any(|c| c == "systemctl restart moby"));
}

// ---------------------------------------------------------------------------
// Fatal failures leave the configuration untouched
// ---------------------------------------------------------------------------

#[rstest]
#[case::tool_missing(IpReply::Missing)]
#[case::query_failed(IpReply::Fails("Device \"eth0\" does not exist."))]
#[case::only_private(IpReply::Listing(
    r#"[{"ifname":"eth0","addr_info":[{"family":"inet6","local":"fd00::1","prefixlen":64,"scope":"global","valid_life_time":600}]}]"#
))]
fn fatal_host_failures_abort_before_compare(#[case] reply: IpReply) {
    let opts = options();
    let host = FakeHost::new(reply);
    let store = MemoryStore::with(&opts.config_path, STALE_CONFIG);

    let err = pipeline::run(&host, &store, &opts).unwrap_err();
    assert!(
        matches!(
            err,
            SyncError::Host(HostError::ToolMissing { .. })
                | SyncError::Host(HostError::QueryFailed { .. })
                | SyncError::Prefix(PrefixError::NoUsableAddress)
        ),
        "got: {err}"
    );
    assert_eq!(*store.writes.borrow(), 0);
    assert_eq!(host.restarts(), 0);
}

#[test]
fn missing_config_aborts_without_creating_it() {
    let opts = options();
    let host = FakeHost::new(IpReply::Listing(E2E_LISTING));
    let store = MemoryStore::default();

    let err = pipeline::run(&host, &store, &opts).unwrap_err();
    assert!(matches!(err, SyncError::ConfigNotFound { .. }), "got: {err}");
    assert!(!store.exists(&opts.config_path), "config must stay absent");
    assert_eq!(host.restarts(), 0);
}

#[test]
fn config_without_cidr_key_is_invalid() {
    let opts = options();
    let host = FakeHost::new(IpReply::Listing(E2E_LISTING));
    let store = MemoryStore::with(&opts.config_path, r#"{"ipv6": true}"#);

    let err = pipeline::run(&host, &store, &opts).unwrap_err();
    assert!(matches!(err, SyncError::ConfigInvalid { .. }), "got: {err}");
    assert_eq!(*store.writes.borrow(), 0);
}
