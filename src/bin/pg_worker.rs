//! Runs embedded `PostgreSQL` lifecycle steps for the board test suite when
//! the suite itself executes as root.
//!
//! Usage:
//!
//! ```text
//! pg_worker <setup|start|stop> <config-path>
//! ```
//!
//! `config-path` names a JSON [`WorkerPayload`] carrying the cluster settings
//! and the environment overrides to apply before the step runs. The worker
//! drops to `nobody` before touching the data directory because `initdb`
//! refuses to run as root.

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use nix::unistd::{Uid, User, initgroups, setgid, setuid};
#[cfg(unix)]
use pg_embedded_setup_unpriv::ambient_dir_and_path;
#[cfg(unix)]
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
#[cfg(unix)]
use postgresql_embedded::{PostgreSQL, Status};
#[cfg(unix)]
use std::ffi::CString;
#[cfg(unix)]
use std::io::{self, Read};
#[cfg(unix)]
use std::process::{Command, ExitStatus};
#[cfg(unix)]
use std::env;
#[cfg(unix)]
use thiserror::Error;

#[cfg(unix)]
const REEXEC_MARKER: &str = "TRELLIS_PG_WORKER_REEXEC";
#[cfg(unix)]
const TRUSTED_PATH: &str = "/usr/sbin:/usr/bin:/sbin:/bin";
#[cfg(unix)]
const UNPRIVILEGED_USER: &str = "nobody";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
#[derive(Debug, Error)]
enum WorkerError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("failed to read worker config: {0}")]
    ConfigRead(#[source] BoxError),
    #[error("failed to parse worker config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("settings conversion failed: {0}")]
    SettingsConversion(String),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] io::Error),
    #[error("failed to drop privileges: {0}")]
    PrivilegeDrop(String),
    #[error("postgres operation failed: {0}")]
    Postgres(String),
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Setup,
    Start,
    Stop,
}

#[cfg(unix)]
impl Step {
    fn parse(arg: &str) -> Result<Self, WorkerError> {
        match arg {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(WorkerError::InvalidArgs(format!(
                "unknown step '{other}'; expected setup, start, or stop"
            ))),
        }
    }
}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    let args = collect_args()?;
    reexec_unprivileged(&args)?;
    let (step, config_path) = parse_args(&args)?;
    run_step(step, &config_path).map_err(Into::into)
}

#[cfg(unix)]
fn collect_args() -> Result<Vec<Utf8PathBuf>, WorkerError> {
    env::args_os()
        .map(|arg| {
            arg.into_string()
                .map(Utf8PathBuf::from)
                .map_err(|_| WorkerError::InvalidArgs("argument is not valid UTF-8".into()))
        })
        .collect()
}

#[cfg(unix)]
fn parse_args(args: &[Utf8PathBuf]) -> Result<(Step, Utf8PathBuf), WorkerError> {
    match args {
        [_, step, config] => Ok((Step::parse(step.as_str())?, config.clone())),
        [_] => Err(WorkerError::InvalidArgs("missing step argument".into())),
        [_, _] => Err(WorkerError::InvalidArgs("missing config path argument".into())),
        _ => Err(WorkerError::InvalidArgs(format!(
            "expected two arguments, got {}",
            args.len().saturating_sub(1)
        ))),
    }
}

#[cfg(unix)]
fn run_step(step: Step, config_path: &Utf8Path) -> Result<(), WorkerError> {
    let payload = load_payload(config_path)?;
    drop_privileges(UNPRIVILEGED_USER)?;
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| WorkerError::SettingsConversion(err.to_string()))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(WorkerError::RuntimeInit)?;
    apply_environment(&payload.environment);

    let mut postgres = PostgreSQL::new(settings);
    runtime.block_on(async {
        match step {
            Step::Setup => {
                postgres
                    .setup()
                    .await
                    .map_err(|err| WorkerError::Postgres(err.to_string()))?;
                ensure_started(&mut postgres).await
            }
            Step::Start => ensure_started(&mut postgres).await,
            Step::Stop => postgres
                .stop()
                .await
                .map_err(|err| WorkerError::Postgres(err.to_string())),
        }
    })?;

    if step != Step::Stop {
        // The server must outlive this process; dropping the handle stops it.
        std::mem::forget(postgres);
    }
    Ok(())
}

#[cfg(unix)]
async fn ensure_started(postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
    if matches!(postgres.status(), Status::Started) {
        return Ok(());
    }
    postgres
        .start()
        .await
        .map_err(|err| WorkerError::Postgres(err.to_string()))
}

#[cfg(unix)]
fn load_payload(config_path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
    let bytes = read_config(config_path).map_err(WorkerError::ConfigRead)?;
    serde_json::from_slice(&bytes).map_err(WorkerError::ConfigParse)
}

#[cfg(unix)]
fn read_config(path: &Utf8Path) -> Result<Vec<u8>, BoxError> {
    let (dir, relative) = ambient_dir_and_path(path)?;
    let mut file = dir.open(relative.as_std_path())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Re-runs the worker as the unprivileged user when started as root.
///
/// The child inherits the arguments and exits with its own status.
#[cfg(unix)]
fn reexec_unprivileged(args: &[Utf8PathBuf]) -> Result<(), WorkerError> {
    if !Uid::effective().is_root() || env::var_os(REEXEC_MARKER).is_some() {
        return Ok(());
    }

    let exe = env::current_exe()
        .map_err(WorkerError::RuntimeInit)
        .and_then(|path| {
            Utf8PathBuf::from_path_buf(path).map_err(|_| {
                WorkerError::RuntimeInit(io::Error::other("executable path is not valid UTF-8"))
            })
        })?;
    let forwarded = args.get(1..).unwrap_or_default();
    let status = match Command::new("runuser")
        .args(["-u", UNPRIVILEGED_USER, "--"])
        .arg(exe.as_std_path())
        .args(forwarded.iter().map(|arg| arg.as_std_path()))
        .env(REEXEC_MARKER, "1")
        .env("PATH", TRUSTED_PATH)
        .status()
    {
        Ok(status) => status,
        Err(err) if err.kind() == io::ErrorKind::NotFound => reexec_via_su(&exe, forwarded)?,
        Err(err) => return Err(WorkerError::PrivilegeDrop(err.to_string())),
    };

    std::process::exit(status.code().unwrap_or(1));
}

#[cfg(unix)]
fn reexec_via_su(exe: &Utf8Path, args: &[Utf8PathBuf]) -> Result<ExitStatus, WorkerError> {
    let command = std::iter::once(exe)
        .chain(args.iter().map(Utf8PathBuf::as_path))
        .map(|part| shell_quote(part.as_str()))
        .fold(format!("{REEXEC_MARKER}=1 exec"), |mut line, part| {
            line.push(' ');
            line.push_str(&part);
            line
        });

    Command::new("/bin/su")
        .args(["-s", "/bin/sh", UNPRIVILEGED_USER, "-c"])
        .arg(command)
        .env("PATH", TRUSTED_PATH)
        .status()
        .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))
}

/// Wraps `value` in single quotes for `/bin/sh`.
#[cfg(unix)]
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(unix)]
fn drop_privileges(username: &str) -> Result<(), WorkerError> {
    if !Uid::effective().is_root() {
        return Ok(());
    }

    let user = User::from_name(username)
        .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?
        .ok_or_else(|| WorkerError::PrivilegeDrop(format!("user '{username}' not found")))?;
    let name = CString::new(user.name.clone())
        .map_err(|err| WorkerError::PrivilegeDrop(format!("invalid user name: {err}")))?;
    initgroups(&name, user.gid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
    setgid(user.gid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
    setuid(user.uid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;

    // SAFETY: the worker is single-threaded until the runtime is built.
    unsafe {
        env::set_var("HOME", user.dir);
        env::set_var("USER", &user.name);
        env::set_var("LOGNAME", user.name);
    }
    Ok(())
}

#[cfg(unix)]
fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
    for (key, value) in environment {
        // SAFETY: the current-thread runtime has not spawned any task yet.
        unsafe {
            match value {
                Some(secret) => env::set_var(key, secret.expose()),
                None => env::remove_var(key),
            }
        }
    }
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is only supported on Unix platforms".into())
}
