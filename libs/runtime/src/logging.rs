//! Log routing for the configured `logging` sections.
//!
//! Every key except `default` names a target prefix such as `auth` or
//! `petcare_payments`. A section sets a console level and, when `file` is
//! set, a rotating JSON sink. Records claimed by a named section never
//! reach the `default` catch-all, so a chatty subsystem can be split off
//! without duplicating its output.

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use tracing::{level_filters::LevelFilter, Level, Metadata};
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

use crate::config::{LoggingConfig, Section};

/// Installs the global subscriber described by `cfg`. Relative file paths
/// land under `base_dir`. An empty table falls back to plain console output.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // `log` records must be bridged before any subscriber exists.
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let plan = Plan::from_config(cfg);
    let fanout = FileFanout::open(&plan, base_dir);
    plan.install(fanout);
}

/// The `logging` table split into the catch-all and the named sections,
/// in stable order.
struct Plan {
    catch_all: Option<Section>,
    named: Vec<(String, Section)>,
}

impl Plan {
    fn from_config(cfg: &LoggingConfig) -> Self {
        let mut named: Vec<(String, Section)> = cfg
            .iter()
            .filter(|(name, _)| name.as_str() != "default")
            .map(|(name, section)| (name.clone(), section.clone()))
            .collect();
        named.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            catch_all: cfg.get("default").cloned(),
            named,
        }
    }

    fn names(&self) -> Vec<String> {
        self.named.iter().map(|(name, _)| name.clone()).collect()
    }

    /// One `Targets` filter over the named sections, with everything else
    /// switched off. `pick` decides which of a section's levels applies.
    fn targets(&self, pick: fn(&Section) -> Option<Level>) -> Targets {
        let mut targets = Targets::new().with_default(LevelFilter::OFF);
        for (name, section) in &self.named {
            if let Some(level) = pick(section) {
                targets = targets.with_target(name.clone(), level);
            }
        }
        targets
    }

    /// Four layers total. Named sections get a console layer and a routed
    /// file layer; the `default` section gets catch-all twins that only see
    /// records no named section claimed.
    fn install(self, fanout: FileFanout) {
        let ansi = atty::is(atty::Stream::Stdout);
        let stamp = fmt::time::UtcTime::rfc_3339;

        let named_console = fmt::layer()
            .with_timer(stamp())
            .with_level(true)
            .with_target(true)
            .with_ansi(ansi)
            .with_filter(self.targets(console_level));

        let named_files = if fanout.has_sinks() {
            Some(
                fmt::layer()
                    .json()
                    .with_timer(stamp())
                    .with_level(true)
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(fanout.clone())
                    .with_filter(self.targets(file_level)),
            )
        } else {
            None
        };

        let spare_console = self.catch_all.as_ref().and_then(console_level).map(|cap| {
            fmt::layer()
                .with_timer(stamp())
                .with_level(true)
                .with_target(true)
                .with_ansi(ansi)
                .with_filter(unclaimed(self.names(), cap))
        });

        let spare_file = match (&fanout.fallback, self.catch_all.as_ref().and_then(file_level)) {
            (Some(_), Some(cap)) => Some(
                fmt::layer()
                    .json()
                    .with_timer(stamp())
                    .with_level(true)
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(fanout.clone())
                    .with_filter(unclaimed(self.names(), cap)),
            ),
            _ => None,
        };

        let _ = Registry::default()
            .with(named_console)
            .with(named_files)
            .with(spare_console)
            .with(spare_file)
            .try_init();
    }
}

/// Console verbosity for a section, `None` when switched off.
fn console_level(section: &Section) -> Option<Level> {
    read_level(&section.console_level)
}

/// File verbosity. Sections without a file never sink, and a blank
/// `file_level` inherits the console setting.
fn file_level(section: &Section) -> Option<Level> {
    if section.file.trim().is_empty() {
        return None;
    }
    if section.file_level.trim().is_empty() {
        return console_level(section);
    }
    read_level(&section.file_level)
}

/// `off` and `none` disable a sink; unknown names fall back to `info`.
fn read_level(raw: &str) -> Option<Level> {
    let name = raw.trim().to_ascii_lowercase();
    match name.as_str() {
        "off" | "none" => None,
        _ => Some(name.parse().unwrap_or(Level::INFO)),
    }
}

/// A section named `auth` claims the `auth` target and the whole
/// `auth::...` tree, but not `auth_worker`.
fn in_section(target: &str, section: &str) -> bool {
    match target.strip_prefix(section) {
        Some("") => true,
        Some(rest) => rest.starts_with("::"),
        None => false,
    }
}

type SpareFilter = FilterFn<Box<dyn Fn(&Metadata<'_>) -> bool + Send + Sync + 'static>>;

/// Accepts records below `cap` whose target no named section claims.
fn unclaimed(claimed: Vec<String>, cap: Level) -> SpareFilter {
    FilterFn::new(Box::new(move |meta: &Metadata<'_>| {
        meta.level() <= &cap && !claimed.iter().any(|name| in_section(meta.target(), name))
    }))
}

/// Fans file output out to one sink per named section, with the `default`
/// sink catching everything else.
#[derive(Clone)]
struct FileFanout {
    fallback: Option<LogSink>,
    sections: Vec<(String, LogSink)>,
}

impl FileFanout {
    fn open(plan: &Plan, base_dir: &Path) -> Self {
        let fallback = plan
            .catch_all
            .as_ref()
            .and_then(|section| LogSink::open_for("default", section, base_dir));

        let sections = plan
            .named
            .iter()
            .filter_map(|(name, section)| {
                LogSink::open_for(name, section, base_dir).map(|sink| (name.clone(), sink))
            })
            .collect();

        Self { fallback, sections }
    }

    fn has_sinks(&self) -> bool {
        self.fallback.is_some() || !self.sections.is_empty()
    }

    fn route(&self, target: &str) -> Option<SinkWriter> {
        self.sections
            .iter()
            .find(|(name, _)| in_section(target, name))
            .map(|(_, sink)| sink.writer())
            .or_else(|| self.fallback.as_ref().map(LogSink::writer))
    }
}

impl<'a> fmt::MakeWriter<'a> for FileFanout {
    type Writer = OptionalWriter;

    fn make_writer(&'a self) -> Self::Writer {
        OptionalWriter(self.fallback.as_ref().map(LogSink::writer))
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        OptionalWriter(self.route(meta.target()))
    }
}

/// One rotating log file shared by every writer handle cloned from it.
#[derive(Clone)]
struct LogSink(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl LogSink {
    /// Opens the section's sink, creating parent directories. A failure is
    /// reported on stderr and the section simply loses its file output.
    fn open_for(name: &str, section: &Section, base_dir: &Path) -> Option<Self> {
        if section.file.trim().is_empty() {
            return None;
        }
        let path = place_under(base_dir, &section.file);
        match Self::open(&path, section) {
            Ok(sink) => Some(sink),
            Err(err) => {
                eprintln!("logging: cannot open {} for '{name}': {err}", path.display());
                None
            }
        }
    }

    fn open(path: &Path, section: &Section) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rotate = FileRotate::new(
            path,
            AppendTimestamp::default(keep_limit(section)),
            ContentLimit::BytesSurpassed(rotate_bytes(section)),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rotate))))
    }

    fn writer(&self) -> SinkWriter {
        SinkWriter(Arc::clone(&self.0))
    }
}

/// How many rotated files survive. `max_backups` wins over `max_age_days`.
fn keep_limit(section: &Section) -> FileLimit {
    match (section.max_backups, section.max_age_days) {
        (Some(files), _) => FileLimit::MaxFiles(files),
        (None, Some(days)) => FileLimit::Age(chrono::Duration::days(i64::from(days))),
        (None, None) => FileLimit::Age(chrono::Duration::days(7)),
    }
}

fn rotate_bytes(section: &Section) -> usize {
    const MB: u64 = 1024 * 1024;
    (section.max_size_mb.unwrap_or(100) * MB) as usize
}

struct SinkWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

/// Writer handed to layers whose record has no sink. Writes are swallowed
/// whole so the layer never sees an error.
struct OptionalWriter(Option<SinkWriter>);

impl Write for OptionalWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.as_mut() {
            Some(sink) => sink.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.0.as_mut() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

/// Absolute paths are honored as given, anything else lands under `base`.
fn place_under(base: &Path, file: &str) -> PathBuf {
    let file = Path::new(file);
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        base.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_age_days: None,
            max_backups: None,
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn level_names_parse_loosely() {
        assert_eq!(read_level("TRACE"), Some(Level::TRACE));
        assert_eq!(read_level(" debug "), Some(Level::DEBUG));
        assert_eq!(read_level("Info"), Some(Level::INFO));
        assert_eq!(read_level("warn"), Some(Level::WARN));
        assert_eq!(read_level("ERROR"), Some(Level::ERROR));
        assert_eq!(read_level("carrot"), Some(Level::INFO));
    }

    #[test]
    fn off_and_none_disable_a_sink() {
        assert_eq!(read_level("off"), None);
        assert_eq!(read_level("NONE"), None);
    }

    #[test]
    fn a_section_claims_its_module_tree_only() {
        assert!(in_section("auth", "auth"));
        assert!(in_section("auth::domain::service", "auth"));
        assert!(!in_section("auth_worker", "auth"));
        assert!(!in_section("bookings", "auth"));
        assert!(!in_section("au", "auth"));
    }

    #[test]
    fn blank_file_level_inherits_the_console_level() {
        let inherited = section("warn", "logs/app.log", "");
        assert_eq!(file_level(&inherited), Some(Level::WARN));

        let explicit = section("warn", "logs/app.log", "trace");
        assert_eq!(file_level(&explicit), Some(Level::TRACE));

        let fileless = section("warn", "", "trace");
        assert_eq!(file_level(&fileless), None);
    }

    #[test]
    fn the_plan_splits_default_from_named_sections() {
        let cfg = LoggingConfig::from([
            ("default".to_string(), section("info", "", "")),
            (
                "payments".to_string(),
                section("debug", "logs/payments.log", ""),
            ),
            ("auth".to_string(), section("debug", "", "")),
        ]);

        let plan = Plan::from_config(&cfg);
        assert!(plan.catch_all.is_some());
        assert_eq!(plan.names(), vec!["auth".to_string(), "payments".to_string()]);
    }

    #[test]
    fn relative_files_land_under_the_base_dir() {
        let base = Path::new("/var/petcare");
        assert_eq!(
            place_under(base, "logs/app.log"),
            PathBuf::from("/var/petcare/logs/app.log")
        );
        assert_eq!(
            place_under(base, "/tmp/app.log"),
            PathBuf::from("/tmp/app.log")
        );
    }

    #[test]
    fn sinks_create_their_parent_directories() {
        let tmp = tempdir().unwrap();
        let sec = section("info", "logs/nested/app.log", "debug");

        let sink = LogSink::open_for("default", &sec, tmp.path());
        assert!(sink.is_some());
        assert!(tmp.path().join("logs/nested").is_dir());
    }

    #[test]
    fn the_fanout_routes_by_section_and_falls_back() {
        let tmp = tempdir().unwrap();
        let cfg = LoggingConfig::from([
            ("default".to_string(), section("info", "logs/app.log", "")),
            ("auth".to_string(), section("debug", "logs/auth.log", "")),
        ]);

        let fanout = FileFanout::open(&Plan::from_config(&cfg), tmp.path());
        assert!(fanout.has_sinks());
        assert!(fanout.route("auth::login").is_some());
        assert!(fanout.route("bookings::create").is_some());
    }

    #[test]
    fn without_a_default_file_unclaimed_targets_have_no_sink() {
        let tmp = tempdir().unwrap();
        let cfg = LoggingConfig::from([("auth".to_string(), section("debug", "logs/auth.log", ""))]);

        let fanout = FileFanout::open(&Plan::from_config(&cfg), tmp.path());
        assert!(fanout.route("auth").is_some());
        assert!(fanout.route("bookings").is_none());
    }

    #[test]
    fn backup_count_beats_age_for_rotation() {
        let both = Section {
            max_backups: Some(2),
            max_age_days: Some(30),
            ..section("info", "x.log", "")
        };
        assert!(matches!(keep_limit(&both), FileLimit::MaxFiles(2)));

        let aged = Section {
            max_age_days: Some(30),
            ..section("info", "x.log", "")
        };
        assert!(matches!(keep_limit(&aged), FileLimit::Age(_)));

        let bare = section("info", "x.log", "");
        assert!(matches!(keep_limit(&bare), FileLimit::Age(_)));
    }
}
