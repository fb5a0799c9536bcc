//! Backup run orchestration
//!
//! A run walks a fixed sequence of states:
//!
//! ```text
//! AwaitingPassword -> ValidatingDestinations -> BackingUpClients
//!     -> BackingUpAppointments -> BackingUpHouseholds -> Completed
//! ```
//!
//! Any state may move to `Aborted`. Collections are always processed in the
//! order clients, appointments, households, and each one is fetched,
//! encrypted, written and (optionally) uploaded before the next begins.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use uuid::Uuid;

use crate::config::paths::PantryPaths;
use crate::config::settings::Settings;
use crate::crypto::{KeyDerivationParams, LineCipher};
use crate::diagnostics::{DiagnosticEntry, DiagnosticLog, Severity};
use crate::error::{PantryError, PantryResult};
use crate::models::{Collection, InsertStatement};
use crate::operator::{acquire_confirmed_password, CancellationToken, PasswordProvider, ProgressSink};
use crate::remote::RemoteStore;
use crate::storage::{is_writable_dir, RecordSource};

use super::dump::write_dump;

/// Upper bound of the progress scale
pub const PROGRESS_MAX: u32 = 170;

/// Progress values reported while one collection is backed up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Milestones {
    encrypted: u32,
    written: u32,
    done: u32,
}

impl Milestones {
    fn for_collection(collection: Collection) -> Self {
        match collection {
            Collection::Clients => Self {
                encrypted: 7,
                written: 15,
                done: 40,
            },
            Collection::Appointments => Self {
                encrypted: 52,
                written: 66,
                done: 120,
            },
            Collection::Households => Self {
                encrypted: 129,
                written: 140,
                done: PROGRESS_MAX,
            },
        }
    }
}

/// State of a backup run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupState {
    AwaitingPassword,
    ValidatingDestinations,
    BackingUpClients,
    BackingUpAppointments,
    BackingUpHouseholds,
    Completed,
    Aborted,
}

impl BackupState {
    /// The state that backs up the given collection
    pub fn backing_up(collection: Collection) -> Self {
        match collection {
            Collection::Clients => Self::BackingUpClients,
            Collection::Appointments => Self::BackingUpAppointments,
            Collection::Households => Self::BackingUpHouseholds,
        }
    }

    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::AwaitingPassword => "password",
            Self::ValidatingDestinations => "destination",
            Self::BackingUpClients => "clients",
            Self::BackingUpAppointments => "appointments",
            Self::BackingUpHouseholds => "households",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

/// What a run was asked to do, taken from the settings at start time
#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub local_enabled: bool,
    pub local_directory: Option<PathBuf>,
    pub remote_enabled: bool,
    /// Where dumps live between writing and uploading when no local copy is kept
    pub staging_directory: PathBuf,
    pub key_derivation: KeyDerivationParams,
}

impl BackupConfig {
    /// Snapshot the destination settings for one run
    pub fn from_settings(settings: &Settings, paths: &PantryPaths) -> Self {
        Self {
            local_enabled: settings.local_backup.enabled,
            local_directory: settings.local_backup.directory.clone(),
            remote_enabled: settings.remote_backup.enabled,
            staging_directory: paths.staging_dir(),
            key_derivation: settings.key_derivation,
        }
    }
}

/// Destinations actually used by a run, after any fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destinations {
    /// Directory dump files are written to
    pub write_dir: PathBuf,
    /// Whether the written files are the local backup (otherwise transient)
    pub keep_local: bool,
    pub upload: bool,
}

impl Destinations {
    /// Message shown when a run with these destinations completes
    pub fn completion_message(&self) -> &'static str {
        match (self.keep_local, self.upload) {
            (true, true) => "Local and remote backup complete!",
            (true, false) => "Local backup complete!",
            _ => "Remote backup complete!",
        }
    }
}

/// Result of backing up one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionOutcome {
    pub collection: Collection,
    pub file_name: String,
    pub line_count: usize,
    /// Where the dump remains on disk, if anywhere
    pub local_path: Option<PathBuf>,
    pub uploaded: bool,
    pub upload_error: Option<String>,
}

/// Terminal report of a backup run
#[derive(Debug)]
pub struct BackupReport {
    pub run_id: Uuid,
    /// Every state entered, in order; the last one is terminal
    pub states: Vec<BackupState>,
    pub destinations: Option<Destinations>,
    pub outcomes: Vec<CollectionOutcome>,
    /// Why the run aborted
    pub error: Option<PantryError>,
    /// Final message shown to the operator
    pub message: String,
}

impl BackupReport {
    /// The state the run ended in
    pub fn final_state(&self) -> BackupState {
        self.states.last().copied().unwrap_or(BackupState::Aborted)
    }

    pub fn is_completed(&self) -> bool {
        self.final_state() == BackupState::Completed
    }

    /// Process exit code: 0 completed, 2 cancelled, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match &self.error {
            None if self.is_completed() => 0,
            Some(PantryError::Cancelled | PantryError::PasswordCancelled) => 2,
            _ => 1,
        }
    }
}

/// Mutable bookkeeping for one run
#[derive(Debug, Default)]
struct BackupRun {
    states: Vec<BackupState>,
    destinations: Option<Destinations>,
    outcomes: Vec<CollectionOutcome>,
    progress: u32,
    first_upload_error: Option<PantryError>,
}

impl BackupRun {
    fn enter(&mut self, state: BackupState) {
        self.states.push(state);
    }

    fn current(&self) -> BackupState {
        self.states
            .last()
            .copied()
            .unwrap_or(BackupState::AwaitingPassword)
    }

    /// Report progress, ignoring values that would move it backwards
    fn advance(&mut self, sink: &mut dyn ProgressSink, value: u32) {
        if value > self.progress {
            self.progress = value;
            sink.progress(value);
        }
    }
}

/// Runs one backup from password entry to a terminal report
///
/// The orchestrator owns the record source for the whole run and closes it on
/// every exit path.
pub struct BackupOrchestrator {
    config: BackupConfig,
    source: Box<dyn RecordSource>,
    remote: Option<Box<dyn RemoteStore>>,
    diagnostics: DiagnosticLog,
    cancel: CancellationToken,
    run_id: Uuid,
}

impl BackupOrchestrator {
    pub fn new(
        config: BackupConfig,
        source: Box<dyn RecordSource>,
        remote: Option<Box<dyn RemoteStore>>,
        diagnostics: DiagnosticLog,
    ) -> Self {
        Self {
            config,
            source,
            remote,
            diagnostics,
            cancel: CancellationToken::new(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Use an existing cancellation token instead of a fresh one
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels this run at the next collection boundary
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Execute the run to a terminal state
    pub fn run(
        mut self,
        passwords: &mut dyn PasswordProvider,
        sink: &mut dyn ProgressSink,
    ) -> BackupReport {
        let mut run = BackupRun::default();
        let result = self.execute(&mut run, passwords, sink);

        let (message, error) = match result {
            Ok(()) => {
                run.enter(BackupState::Completed);
                let message = run
                    .destinations
                    .as_ref()
                    .map(Destinations::completion_message)
                    .unwrap_or("Backup complete!")
                    .to_string();
                self.diagnostics.record(&DiagnosticEntry::info(
                    Some(self.run_id),
                    "backup.completed",
                    &message,
                ));
                sink.notify(Severity::Info, &message);
                (message, None)
            }
            Err(err) => {
                let message = self.report_abort(&run, &err, sink);
                run.enter(BackupState::Aborted);
                (message, Some(err))
            }
        };

        self.close_source(sink);

        BackupReport {
            run_id: self.run_id,
            states: run.states,
            destinations: run.destinations,
            outcomes: run.outcomes,
            error,
            message,
        }
    }

    fn execute(
        &mut self,
        run: &mut BackupRun,
        passwords: &mut dyn PasswordProvider,
        sink: &mut dyn ProgressSink,
    ) -> PantryResult<()> {
        run.enter(BackupState::AwaitingPassword);
        let cipher = {
            let password = acquire_confirmed_password(passwords)?;
            LineCipher::derive(password.as_str(), &self.config.key_derivation)?
        };
        self.check_cancelled()?;

        run.enter(BackupState::ValidatingDestinations);
        let destinations = self.resolve_destinations(sink)?;
        run.destinations = Some(destinations.clone());
        sink.progress(0);

        for collection in Collection::ALL {
            self.check_cancelled()?;
            run.enter(BackupState::backing_up(collection));
            let outcome = self.backup_collection(collection, &cipher, &destinations, run, sink)?;
            run.outcomes.push(outcome);
        }

        match run.first_upload_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn check_cancelled(&self) -> PantryResult<()> {
        if self.cancel.is_cancelled() {
            Err(PantryError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Decide where dumps go, falling back to remote-only when the local
    /// directory is unusable and remote backup is enabled
    fn resolve_destinations(&mut self, sink: &mut dyn ProgressSink) -> PantryResult<Destinations> {
        let upload = self.config.remote_enabled;
        if upload && self.remote.is_none() {
            return Err(PantryError::Config(
                "Remote backup is enabled but no remote store is configured".into(),
            ));
        }

        if self.config.local_enabled {
            match self.prepare_local_dir() {
                Ok(dir) => {
                    return Ok(Destinations {
                        write_dir: dir,
                        keep_local: true,
                        upload,
                    })
                }
                Err(err) if upload => {
                    self.diagnostics.record(&DiagnosticEntry::warning(
                        Some(self.run_id),
                        "backup.destination",
                        format!("{}; continuing with remote backup only", err),
                    ));
                    sink.notify(
                        Severity::Warning,
                        &format!("{}. Continuing with remote backup only.", err),
                    );
                }
                Err(err) => return Err(err),
            }
        } else if !upload {
            return Err(PantryError::Config(
                "Neither local nor remote backup is enabled".into(),
            ));
        }

        let staging = &self.config.staging_directory;
        fs::create_dir_all(staging).map_err(|e| {
            PantryError::DestinationUnwritable(format!(
                "cannot create staging directory {}: {}",
                staging.display(),
                e
            ))
        })?;
        if !is_writable_dir(staging) {
            return Err(PantryError::DestinationUnwritable(format!(
                "no permission to write to staging directory {}",
                staging.display()
            )));
        }

        Ok(Destinations {
            write_dir: staging.clone(),
            keep_local: false,
            upload: true,
        })
    }

    fn prepare_local_dir(&self) -> PantryResult<PathBuf> {
        let dir = self.config.local_directory.clone().ok_or_else(|| {
            PantryError::DestinationUnwritable("no local backup directory is configured".into())
        })?;

        if !dir.is_dir() {
            fs::create_dir_all(&dir).map_err(|e| {
                PantryError::DestinationUnwritable(format!(
                    "local backup directory {} does not exist and cannot be created: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        if !is_writable_dir(&dir) {
            return Err(PantryError::DestinationUnwritable(format!(
                "no permission to write to local backup directory {}",
                dir.display()
            )));
        }

        Ok(dir)
    }

    fn backup_collection(
        &mut self,
        collection: Collection,
        cipher: &LineCipher,
        destinations: &Destinations,
        run: &mut BackupRun,
        sink: &mut dyn ProgressSink,
    ) -> PantryResult<CollectionOutcome> {
        let milestones = Milestones::for_collection(collection);
        let noun = collection.noun();

        sink.phase(&format!("Retrieving and encrypting {} data...", noun));
        let lines = fetch_statements(self.source.as_mut(), collection)?
            .iter()
            .map(|statement| cipher.encrypt_line(statement))
            .collect::<PantryResult<Vec<_>>>()?;
        run.advance(sink, milestones.encrypted);

        if destinations.keep_local {
            sink.phase(&format!("Writing {} data to local backup file...", noun));
        }
        let dump = write_dump(
            &destinations.write_dir,
            collection,
            Local::now().naive_local(),
            &lines,
        )?;
        let written = if destinations.upload {
            milestones.written
        } else {
            milestones.done
        };
        run.advance(sink, written);

        let mut outcome = CollectionOutcome {
            collection,
            file_name: dump.file_name.clone(),
            line_count: dump.line_count,
            local_path: Some(dump.path.clone()),
            uploaded: false,
            upload_error: None,
        };

        if !destinations.upload {
            return Ok(outcome);
        }

        if self.cancel.is_cancelled() {
            if !destinations.keep_local {
                self.discard_transient(&dump.path, sink);
            }
            return Err(PantryError::Cancelled);
        }

        sink.phase(&format!("Uploading {} data...", noun));
        match self.upload(&dump.path) {
            Ok(()) => {
                outcome.uploaded = true;
                if !destinations.keep_local {
                    self.discard_transient(&dump.path, sink);
                    outcome.local_path = None;
                }
            }
            Err(err) => {
                self.diagnostics.record(&DiagnosticEntry::from_error(
                    Some(self.run_id),
                    format!("backup.{}.upload", collection.table_name()),
                    &err,
                ));
                sink.notify(
                    Severity::Error,
                    &format!(
                        "Problem uploading {}. Check your internet connection. ({})",
                        dump.file_name, err
                    ),
                );
                if !destinations.keep_local {
                    sink.notify(
                        Severity::Warning,
                        &format!("The encrypted dump was kept at {}", dump.path.display()),
                    );
                }
                outcome.upload_error = Some(err.to_string());
                run.first_upload_error.get_or_insert(err);
            }
        }
        run.advance(sink, milestones.done);

        Ok(outcome)
    }

    fn upload(&mut self, path: &Path) -> PantryResult<()> {
        match self.remote.as_mut() {
            Some(remote) => remote.upload(path),
            None => Err(PantryError::Config(
                "Remote backup is enabled but no remote store is configured".into(),
            )),
        }
    }

    fn discard_transient(&self, path: &Path, sink: &mut dyn ProgressSink) {
        if let Err(e) = fs::remove_file(path) {
            let message = format!("Could not remove temporary dump {}: {}", path.display(), e);
            self.diagnostics.record(&DiagnosticEntry::warning(
                Some(self.run_id),
                "backup.cleanup",
                &message,
            ));
            sink.notify(Severity::Warning, &message);
        }
    }

    /// Log and announce why the run stopped, returning the operator message
    fn report_abort(&self, run: &BackupRun, err: &PantryError, sink: &mut dyn ProgressSink) -> String {
        let context = format!("backup.{}", run.current().label());

        let message = match err {
            PantryError::PasswordCancelled => {
                "Backup cancelled: no encryption password was entered.".to_string()
            }
            PantryError::Cancelled => {
                self.diagnostics.record(&DiagnosticEntry::warning(
                    Some(self.run_id),
                    context,
                    "Backup cancelled by the operator",
                ));
                "Backup cancelled.".to_string()
            }
            // already logged per file as it happened
            PantryError::Upload { .. } => {
                format!("Backup finished with upload failures: {}", err)
            }
            _ => {
                self.diagnostics.record(&DiagnosticEntry::from_error(
                    Some(self.run_id),
                    context,
                    err,
                ));
                format!("Backup failed: {}", err)
            }
        };

        let severity = if err.is_fatal() {
            Severity::Error
        } else {
            Severity::Warning
        };
        sink.notify(severity, &message);
        message
    }

    fn close_source(&mut self, sink: &mut dyn ProgressSink) {
        if let Err(e) = self.source.close() {
            self.diagnostics.record(&DiagnosticEntry::from_error(
                Some(self.run_id),
                "backup.close",
                &e,
            ));
            sink.notify(
                Severity::Warning,
                &format!("Could not close the data connection: {}", e),
            );
        }
    }
}

/// Fetch a collection and render each record as one statement line
pub fn fetch_statements(
    source: &mut dyn RecordSource,
    collection: Collection,
) -> PantryResult<Vec<String>> {
    let statements = match collection {
        Collection::Clients => render(source.clients()),
        Collection::Appointments => render(source.appointments()),
        Collection::Households => render(source.household_members()),
    };

    statements.map_err(|e| match e {
        e @ PantryError::RecordFetch { .. } => e,
        other => PantryError::fetch(collection.noun(), other.to_string()),
    })
}

fn render<T: InsertStatement>(records: PantryResult<Vec<T>>) -> PantryResult<Vec<String>> {
    Ok(records?.iter().map(InsertStatement::as_insert_statement).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appointment, Client, HouseholdMember};
    use crate::operator::password::testing::ScriptedPasswords;
    use crate::operator::progress::testing::RecordingProgress;
    use crate::remote::DirectoryStore;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    const PASSWORD: &str = "Secret1";

    #[derive(Default)]
    struct MemorySource {
        clients: Vec<Client>,
        appointments: Vec<Appointment>,
        households: Vec<HouseholdMember>,
        fail_on: Option<Collection>,
        closed: Arc<AtomicBool>,
    }

    impl MemorySource {
        fn sample() -> Self {
            let stamp = NaiveDate::from_ymd_opt(2015, 3, 2)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap();
            Self {
                clients: vec![Client {
                    client_id: 1,
                    first_name: "Ann".into(),
                    last_name: "Lee".into(),
                    ssn: "Withheld".into(),
                    birthday: None,
                    address: "1 Main St".into(),
                    city: "Holland".into(),
                    telephone: None,
                    gender: "Female".into(),
                    notes: Some("Prefers \"mornings\"".into()),
                    valid_as_of: stamp,
                }],
                appointments: vec![
                    Appointment {
                        appointment_id: 1,
                        client_id: 1,
                        date: stamp,
                        pounds: Some(20),
                    },
                    Appointment {
                        appointment_id: 2,
                        client_id: 1,
                        date: stamp,
                        pounds: None,
                    },
                ],
                households: vec![HouseholdMember {
                    household_member_id: 1,
                    client_id: 1,
                    name: "Sam Lee".into(),
                    birthday: NaiveDate::from_ymd_opt(2008, 7, 4),
                    gender: "Male".into(),
                    relationship: "Son".into(),
                }],
                ..Default::default()
            }
        }

        fn check(&self, collection: Collection) -> PantryResult<()> {
            if self.closed.load(Ordering::SeqCst) {
                return Err(PantryError::fetch(collection.noun(), "closed"));
            }
            if self.fail_on == Some(collection) {
                return Err(PantryError::Io("connection reset".into()));
            }
            Ok(())
        }
    }

    impl RecordSource for MemorySource {
        fn clients(&mut self) -> PantryResult<Vec<Client>> {
            self.check(Collection::Clients)?;
            Ok(self.clients.clone())
        }

        fn appointments(&mut self) -> PantryResult<Vec<Appointment>> {
            self.check(Collection::Appointments)?;
            Ok(self.appointments.clone())
        }

        fn household_members(&mut self) -> PantryResult<Vec<HouseholdMember>> {
            self.check(Collection::Households)?;
            Ok(self.households.clone())
        }

        fn close(&mut self) -> PantryResult<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Remote store that records uploads, optionally failing one collection
    #[derive(Default)]
    struct RecordingStore {
        uploaded: Arc<Mutex<Vec<String>>>,
        fail_tag: Option<&'static str>,
    }

    impl RemoteStore for RecordingStore {
        fn upload(&mut self, path: &Path) -> PantryResult<()> {
            assert!(path.exists(), "upload of a file that is not on disk");
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            if let Some(tag) = self.fail_tag {
                if name.contains(tag) {
                    return Err(PantryError::upload(name, "connection refused"));
                }
            }
            self.uploaded.lock().unwrap().push(name);
            Ok(())
        }
    }

    struct Fixture {
        temp: TempDir,
        closed: Arc<AtomicBool>,
        uploaded: Arc<Mutex<Vec<String>>>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                temp: TempDir::new().unwrap(),
                closed: Arc::new(AtomicBool::new(false)),
                uploaded: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn local_dir(&self) -> PathBuf {
            self.temp.path().join("backups")
        }

        fn staging_dir(&self) -> PathBuf {
            self.temp.path().join("staging")
        }

        fn diagnostics(&self) -> DiagnosticLog {
            DiagnosticLog::new(self.temp.path().join("diagnostics.log"))
        }

        fn config(&self, local: bool, remote: bool) -> BackupConfig {
            BackupConfig {
                local_enabled: local,
                local_directory: Some(self.local_dir()),
                remote_enabled: remote,
                staging_directory: self.staging_dir(),
                key_derivation: KeyDerivationParams::with_costs(64, 1, 1),
            }
        }

        fn orchestrator(&self, config: BackupConfig, mut source: MemorySource) -> BackupOrchestrator {
            source.closed = self.closed.clone();
            let remote: Option<Box<dyn RemoteStore>> = if config.remote_enabled {
                Some(Box::new(RecordingStore {
                    uploaded: self.uploaded.clone(),
                    fail_tag: None,
                }))
            } else {
                None
            };
            BackupOrchestrator::new(config, Box::new(source), remote, self.diagnostics())
        }
    }

    fn passwords() -> ScriptedPasswords {
        ScriptedPasswords::new(&[Some(PASSWORD), Some(PASSWORD)])
    }

    fn files_in(dir: &Path) -> Vec<String> {
        if !dir.exists() {
            return Vec::new();
        }
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_local_backup_round_trip() {
        let fx = Fixture::new();
        let source = MemorySource::sample();
        let expected: Vec<String> = source
            .appointments
            .iter()
            .map(InsertStatement::as_insert_statement)
            .collect();
        let sink = RecordingProgress::default();
        let log = sink.log.clone();

        let report = fx
            .orchestrator(fx.config(true, false), source)
            .run(&mut passwords(), &mut sink.clone());

        assert!(report.is_completed());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.message, "Local backup complete!");
        assert_eq!(
            report.states,
            vec![
                BackupState::AwaitingPassword,
                BackupState::ValidatingDestinations,
                BackupState::BackingUpClients,
                BackupState::BackingUpAppointments,
                BackupState::BackingUpHouseholds,
                BackupState::Completed,
            ]
        );
        assert!(fx.closed.load(Ordering::SeqCst));
        assert_eq!(files_in(&fx.local_dir()).len(), 3);

        let appointments = &report.outcomes[1];
        assert_eq!(appointments.collection, Collection::Appointments);
        assert_eq!(appointments.line_count, 2);
        let content = fs::read_to_string(appointments.local_path.as_ref().unwrap()).unwrap();
        let cipher =
            LineCipher::derive(PASSWORD, &KeyDerivationParams::with_costs(64, 1, 1)).unwrap();
        let decrypted: Vec<String> = content
            .lines()
            .map(|line| cipher.decrypt_line(line).unwrap())
            .collect();
        assert_eq!(decrypted, expected);

        let log = log.lock().unwrap();
        assert_eq!(log.values, vec![0, 7, 40, 52, 120, 129, 170]);
        assert_eq!(log.phases[0], "Retrieving and encrypting client data...");
        assert_eq!(log.phases[1], "Writing client data to local backup file...");
    }

    #[test]
    fn test_remote_only_leaves_no_files() {
        let fx = Fixture::new();
        let sink = RecordingProgress::default();
        let log = sink.log.clone();

        let report = fx
            .orchestrator(fx.config(false, true), MemorySource::sample())
            .run(&mut passwords(), &mut sink.clone());

        assert!(report.is_completed());
        assert_eq!(report.message, "Remote backup complete!");
        assert!(files_in(&fx.staging_dir()).is_empty());
        assert!(!fx.local_dir().exists());

        let uploaded = fx.uploaded.lock().unwrap();
        assert_eq!(uploaded.len(), 3);
        assert!(uploaded[0].ends_with("_Clients.sql"));
        assert!(uploaded[1].ends_with("_Appointments.sql"));
        assert!(uploaded[2].ends_with("_Households.sql"));
        assert!(report.outcomes.iter().all(|o| o.local_path.is_none()));

        let log = log.lock().unwrap();
        assert_eq!(log.values, vec![0, 7, 15, 40, 52, 66, 120, 129, 140, 170]);
        assert!(!log.phases.iter().any(|p| p.starts_with("Writing")));
        assert!(log.phases.contains(&"Uploading household data...".to_string()));
    }

    #[test]
    fn test_local_and_remote() {
        let fx = Fixture::new();
        let report = fx
            .orchestrator(fx.config(true, true), MemorySource::sample())
            .run(&mut passwords(), &mut RecordingProgress::default());

        assert_eq!(report.message, "Local and remote backup complete!");
        assert_eq!(files_in(&fx.local_dir()).len(), 3);
        assert_eq!(fx.uploaded.lock().unwrap().len(), 3);
        assert!(report.outcomes.iter().all(|o| o.uploaded));
    }

    #[test]
    fn test_missing_local_dir_without_remote_aborts() {
        let fx = Fixture::new();
        let blocker = fx.temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let mut config = fx.config(true, false);
        config.local_directory = Some(blocker.join("backups"));

        let report = fx
            .orchestrator(config, MemorySource::sample())
            .run(&mut passwords(), &mut RecordingProgress::default());

        assert_eq!(report.final_state(), BackupState::Aborted);
        assert!(matches!(
            report.error,
            Some(PantryError::DestinationUnwritable(_))
        ));
        assert!(report.outcomes.is_empty());
        assert!(!fx.staging_dir().exists());
        assert!(fx.closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_unusable_local_dir_falls_back_to_remote() {
        let fx = Fixture::new();
        let blocker = fx.temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let mut config = fx.config(true, true);
        config.local_directory = Some(blocker.join("backups"));
        let sink = RecordingProgress::default();
        let log = sink.log.clone();

        let report = fx
            .orchestrator(config, MemorySource::sample())
            .run(&mut passwords(), &mut sink.clone());

        assert!(report.is_completed());
        assert_eq!(report.message, "Remote backup complete!");
        assert!(!report.destinations.as_ref().unwrap().keep_local);
        assert_eq!(fx.uploaded.lock().unwrap().len(), 3);
        assert!(files_in(&fx.staging_dir()).is_empty());

        let log = log.lock().unwrap();
        assert!(log
            .messages
            .iter()
            .any(|(s, m)| *s == Severity::Warning && m.contains("remote backup only")));
    }

    #[test]
    fn test_nothing_enabled_is_config_error() {
        let fx = Fixture::new();
        let report = fx
            .orchestrator(fx.config(false, false), MemorySource::sample())
            .run(&mut passwords(), &mut RecordingProgress::default());

        assert!(matches!(report.error, Some(PantryError::Config(_))));
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_fetch_failure_aborts_and_logs() {
        let fx = Fixture::new();
        let mut source = MemorySource::sample();
        source.fail_on = Some(Collection::Appointments);

        let report = fx
            .orchestrator(fx.config(true, false), source)
            .run(&mut passwords(), &mut RecordingProgress::default());

        assert_eq!(report.final_state(), BackupState::Aborted);
        assert!(matches!(
            report.error,
            Some(PantryError::RecordFetch {
                collection: "appointment",
                ..
            })
        ));
        let files = files_in(&fx.local_dir());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("_Clients.sql"));
        assert!(fx.closed.load(Ordering::SeqCst));

        let entries = fx.diagnostics().read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].context, "backup.appointments");
        assert_eq!(entries[0].kind.as_deref(), Some("RecordFetchFailure"));
        assert_eq!(entries[0].run_id, Some(report.run_id));
    }

    #[test]
    fn test_cancel_stops_at_collection_boundary() {
        let fx = Fixture::new();
        let orchestrator = fx.orchestrator(fx.config(true, false), MemorySource::sample());
        let mut sink = RecordingProgress {
            cancel_on_phase: Some((
                "Writing client data to local backup file...".into(),
                orchestrator.cancellation(),
            )),
            ..Default::default()
        };

        let report = orchestrator.run(&mut passwords(), &mut sink);

        assert!(matches!(report.error, Some(PantryError::Cancelled)));
        assert_eq!(report.exit_code(), 2);
        assert_eq!(report.outcomes.len(), 1);
        let files = files_in(&fx.local_dir());
        assert_eq!(files, vec![report.outcomes[0].file_name.clone()]);
        assert!(!files[0].ends_with(".tmp"));
    }

    #[test]
    fn test_cancel_before_upload_discards_transient_dump() {
        let fx = Fixture::new();
        let orchestrator = fx.orchestrator(fx.config(false, true), MemorySource::sample());
        let mut sink = RecordingProgress {
            cancel_on_phase: Some((
                "Retrieving and encrypting client data...".into(),
                orchestrator.cancellation(),
            )),
            ..Default::default()
        };

        let report = orchestrator.run(&mut passwords(), &mut sink);

        assert!(matches!(report.error, Some(PantryError::Cancelled)));
        assert!(fx.uploaded.lock().unwrap().is_empty());
        assert!(files_in(&fx.staging_dir()).is_empty());
    }

    #[test]
    fn test_password_cancel_has_no_side_effects() {
        let fx = Fixture::new();
        let mut provider = ScriptedPasswords::new(&[Some("Secret1"), Some("Secret2"), None]);

        let report = fx
            .orchestrator(fx.config(true, false), MemorySource::sample())
            .run(&mut provider, &mut RecordingProgress::default());

        assert_eq!(
            report.states,
            vec![BackupState::AwaitingPassword, BackupState::Aborted]
        );
        assert!(matches!(report.error, Some(PantryError::PasswordCancelled)));
        assert_eq!(provider.rejections.len(), 1);
        assert!(!fx.local_dir().exists());
        assert!(fx.diagnostics().read_all().unwrap().is_empty());
        assert!(fx.closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_upload_failure_continues_with_remaining_collections() {
        let fx = Fixture::new();
        let remote = RecordingStore {
            uploaded: fx.uploaded.clone(),
            fail_tag: Some("_Appointments"),
        };
        let orchestrator = BackupOrchestrator::new(
            fx.config(true, true),
            Box::new(MemorySource::sample()),
            Some(Box::new(remote)),
            fx.diagnostics(),
        );

        let report = orchestrator.run(&mut passwords(), &mut RecordingProgress::default());

        assert_eq!(report.final_state(), BackupState::Aborted);
        assert!(matches!(report.error, Some(PantryError::Upload { .. })));
        assert_eq!(report.outcomes.len(), 3);
        assert!(report.outcomes[0].uploaded);
        assert!(!report.outcomes[1].uploaded);
        assert!(report.outcomes[1].upload_error.is_some());
        assert!(report.outcomes[2].uploaded);
        assert_eq!(files_in(&fx.local_dir()).len(), 3);

        let entries = fx.diagnostics().read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].context, "backup.appointment.upload");
    }

    #[test]
    fn test_large_clients_collection_keeps_collection_order() {
        let fx = Fixture::new();
        let mut source = MemorySource::sample();
        let template = source.clients[0].clone();
        source.clients = (1..=500)
            .map(|id| Client {
                client_id: id,
                ..template.clone()
            })
            .collect();
        source.appointments.clear();
        let sink = RecordingProgress::default();
        let log = sink.log.clone();

        let report = fx
            .orchestrator(fx.config(true, true), source)
            .run(&mut passwords(), &mut sink.clone());

        assert!(report.is_completed());
        let collections: Vec<Collection> = report.outcomes.iter().map(|o| o.collection).collect();
        assert_eq!(collections, Collection::ALL.to_vec());
        let counts: Vec<usize> = report.outcomes.iter().map(|o| o.line_count).collect();
        assert_eq!(counts, vec![500, 0, 1]);

        let suffixes = ["_Clients.sql", "_Appointments.sql", "_Households.sql"];
        for (outcome, suffix) in report.outcomes.iter().zip(suffixes) {
            assert!(outcome.file_name.ends_with(suffix), "{}", outcome.file_name);
        }
        let uploaded = fx.uploaded.lock().unwrap();
        assert_eq!(uploaded.len(), 3);
        for (name, suffix) in uploaded.iter().zip(suffixes) {
            assert!(name.ends_with(suffix), "{}", name);
        }

        let log = log.lock().unwrap();
        let first_upload = |noun: &str| {
            log.phases
                .iter()
                .position(|p| *p == format!("Uploading {} data...", noun))
                .unwrap()
        };
        assert!(first_upload("client") < first_upload("appointment"));
        assert!(first_upload("appointment") < first_upload("household"));
    }

    #[test]
    fn test_restore_reads_costs_the_backup_used() {
        let fx = Fixture::new();
        let mut config = fx.config(true, false);
        config.key_derivation = KeyDerivationParams::with_costs(128, 2, 1);
        let source = MemorySource::sample();
        let expected: Vec<String> = source
            .clients
            .iter()
            .map(InsertStatement::as_insert_statement)
            .collect();

        let report = fx
            .orchestrator(config, source)
            .run(&mut passwords(), &mut RecordingProgress::default());
        assert!(report.is_completed());

        // restore takes no costs of its own
        let path = report.outcomes[0].local_path.clone().unwrap();
        let mut session = crate::restore::RestoreSession::open(&path).unwrap();
        let lines = session
            .attempt(&crate::crypto::SecureString::from(PASSWORD))
            .unwrap();
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_empty_collections_produce_empty_dumps() {
        let fx = Fixture::new();
        let report = fx
            .orchestrator(fx.config(true, false), MemorySource::default())
            .run(&mut passwords(), &mut RecordingProgress::default());

        assert!(report.is_completed());
        for outcome in &report.outcomes {
            assert_eq!(outcome.line_count, 0);
            let path = outcome.local_path.as_ref().unwrap();
            assert_eq!(fs::metadata(path).unwrap().len(), 0);
        }
    }

    #[test]
    fn test_directory_store_remote() {
        let fx = Fixture::new();
        let target = fx.temp.path().join("cloud");
        let orchestrator = BackupOrchestrator::new(
            fx.config(false, true),
            Box::new(MemorySource::sample()),
            Some(Box::new(DirectoryStore::new(target.clone()))),
            fx.diagnostics(),
        );

        let report = orchestrator.run(&mut passwords(), &mut RecordingProgress::default());

        assert!(report.is_completed());
        let names: Vec<String> = report.outcomes.iter().map(|o| o.file_name.clone()).collect();
        let mut expected = names.clone();
        expected.sort();
        assert_eq!(files_in(&target), expected);
    }
}
