use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};
use chrono::{Local, Utc};

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use text_diff::print_diff;

use ward_access::directory::MemoryDirectory;
use ward_access::entry::{DataEntry, Submission};
use ward_access::export::{export, ExportMode, ExportRequest, Report};
use ward_access::fields::{DivisionScheme, FieldPolicy};
use ward_access::listing::VoterListing;
use ward_access::messages;
use ward_access::routes::{guard, nav_items, Guard, Route};
use ward_access::services::*;
use ward_access::session::{Capabilities, Session};
use ward_access::*;

use crate::args::{Args, Command};
use crate::track::config_reader::*;
use crate::track::io_auth::{FileAuthenticator, SESSION_KEY};
use crate::track::io_common::*;
use crate::track::io_csv::{parse_number, CsvRow};
use crate::track::io_report::{check_reference, JsonReportSink};
use crate::track::io_store::FileStore;
use crate::track::io_ward::WardDirectory;

mod config_reader;
mod io_auth;
mod io_common;
mod io_csv;
mod io_excel;
mod io_report;
mod io_store;
mod io_ward;

#[derive(Debug, Snafu)]
pub enum TrackError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson { source: io::Error, path: String },
    #[snafu(display("Error reading the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing the JSON content of {path}"))]
    SerializingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile { source: io::Error, path: String },
    #[snafu(display("Error writing to the terminal"))]
    Terminal { source: io::Error },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    ReadingCsv {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Invalid cell range {range:?} (expected something like A1:R26)"))]
    InvalidRange { range: String },
    #[snafu(display("The report {path} has no summary"))]
    MissingSummary { path: String },
    #[snafu(display("Invalid credentials for {username}"))]
    LoginFailed {
        source: ServiceError,
        username: String,
    },
    #[snafu(display("Not logged in. Run `wardtrack login <username>` first"))]
    NotLoggedIn {},
    #[snafu(display("{source}"))]
    Service { source: ServiceError },
    #[snafu(display("{source}"))]
    Flow { source: FlowError },
    #[snafu(display("The voter was not changed: {source}"))]
    Edit { source: EditRejection },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TrackResult<T> = Result<T, TrackError>;

/// Everything a command works on: the ward file, its directory and the local store.
pub struct Ward {
    dir: WardDirectory,
    store: FileStore,
    auth: FileAuthenticator,
    lang: Language,
}

impl Ward {
    pub fn open(ward_path: &str, store_path: Option<&str>, lang: Option<&str>) -> TrackResult<Ward> {
        let dir = WardDirectory::open(ward_path)?;
        let store_path = match store_path {
            Some(p) => PathBuf::from(p),
            None => default_store_path(ward_path),
        };
        let store = FileStore::open(&store_path)?;
        let lang = match lang {
            Some(code) => parse_language(code)?,
            None => Language::load(&store),
        };
        let auth = FileAuthenticator::new(dir.config().users.clone(), store.get(SESSION_KEY));
        info!(
            "open: ward {:?} store {:?} language {:?}",
            ward_path, store_path, lang
        );
        Ok(Ward {
            dir,
            store,
            auth,
            lang,
        })
    }

    fn config(&self) -> &WardConfig {
        self.dir.config()
    }

    fn policy(&self) -> FieldPolicy {
        self.config().policy()
    }

    /// Resolves a navigation for the logged-in user and narrows the directory to what they may see.
    ///
    /// A route the account may not open sends it to its landing page instead.
    fn enter(&mut self, route: Route, out: &mut dyn Write) -> TrackResult<(Capabilities, Route)> {
        let session = Session::restore(&self.auth);
        let target = match guard(&session, route) {
            Guard::Render(r) => r,
            Guard::Redirect(Route::Login) | Guard::ShowLoading => {
                return NotLoggedInSnafu {}.fail();
            }
            Guard::Redirect(r) => {
                warn!("enter: {} is not available, redirecting to {}", route, r);
                writeln!(out, "{} is not available to this account, showing {}", route, r)
                    .context(TerminalSnafu {})?;
                r
            }
        };
        let caps = session.capabilities().cloned().context(NotLoggedInSnafu {})?;
        self.dir.set_viewer(&caps);
        Ok((caps, target))
    }
}

pub fn run(args: &Args) -> TrackResult<()> {
    let mut ward = Ward::open(&args.ward, args.store.as_deref(), args.lang.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &args.command {
        Command::Login { username, password } => {
            let password = match password {
                Some(p) => p.clone(),
                None => read_password(&mut out)?,
            };
            login(&mut ward, username, &password, &mut out)
        }
        Command::Entry { serial, history } if serial.is_empty() && !history => {
            let stdin = io::stdin();
            let lines = stdin.lock().lines();
            data_entry(&mut ward, lines, false, &mut out)
        }
        cmd => run_command(&mut ward, cmd, &mut out),
    }
}

fn read_password(out: &mut dyn Write) -> TrackResult<String> {
    write!(out, "Password: ").context(TerminalSnafu {})?;
    out.flush().context(TerminalSnafu {})?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context(TerminalSnafu {})?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

/// Runs every command that does not need the standard input.
pub fn run_command(ward: &mut Ward, command: &Command, out: &mut dyn Write) -> TrackResult<()> {
    debug!("run_command: {:?}", command);
    match command {
        Command::Login { username, password } => match password {
            Some(p) => login(ward, username, p, out),
            None => whatever!("A password is required"),
        },
        Command::Logout => logout(ward, out),
        Command::Whoami => whoami(ward, out),
        Command::Lang { code } => set_language(ward, code, out),
        Command::Open { path } => open_page(ward, path, out),
        Command::Voters {
            search,
            voted,
            party,
            status,
            page,
            all,
            watch,
        } => {
            let opts = ListOptions {
                search: search.clone(),
                voted: *voted,
                party: party.clone(),
                status: status.clone(),
                page: *page,
                all: *all,
            };
            list_voters(ward, &opts, *watch, out)
        }
        Command::Voter { id } => show_voter(ward, *id, out),
        Command::Edit {
            id,
            status,
            party,
            voted,
            phone,
            notes,
        } => {
            let changes = EditOptions {
                status: status.clone(),
                party: party.clone(),
                voted: *voted,
                phone: phone.clone(),
                notes: notes.clone(),
            };
            edit_voter(ward, *id, &changes, out)
        }
        Command::Entry { serial, history } => {
            let lines = serial.iter().cloned().map(Ok);
            data_entry(ward, lines, *history, out)
        }
        Command::Stats => dashboard(ward, out),
        Command::Volunteers { level } => list_volunteers(ward, level.as_deref(), out),
        Command::VolunteerVoters { id, voted } => volunteer_voters(ward, *id, *voted, out),
        Command::Export {
            ldf_only,
            out: out_dir,
            reference,
        } => export_report(
            ward,
            *ldf_only,
            out_dir.as_deref().unwrap_or("."),
            reference.as_deref(),
            out,
        ),
        Command::ImportParty {
            excel,
            sheet,
            range,
            party,
            dry_run,
        } => {
            let serials = io_excel::read_serials(excel, sheet.as_deref(), range.as_deref())?;
            import_party(ward, &serials, party, *dry_run, out)
        }
        Command::ImportVoters {
            en_csv,
            ml_csv,
            clear,
        } => import_voters(ward, en_csv, ml_csv.as_deref(), *clear, out),
        Command::AssignTharas { csv, dry_run } => {
            let mapping = io_csv::read_thara_list(csv)?;
            assign_tharas(ward, &mapping, *dry_run, out)
        }
    }
}

// ******** Session **********

fn login(ward: &mut Ward, username: &str, password: &str, out: &mut dyn Write) -> TrackResult<()> {
    let session = Session::login(&mut ward.auth, username, password).context(LoginFailedSnafu {
        username: username.to_string(),
    })?;
    ward.store
        .set(SESSION_KEY, username.to_string())
        .context(ServiceSnafu {})?;
    let caps = session.capabilities().context(NotLoggedInSnafu {})?;
    writeln!(out, "Logged in as {} ({})", username, caps.role_label()).context(TerminalSnafu {})?;
    print_nav(caps, ward.lang, out)
}

fn logout(ward: &mut Ward, out: &mut dyn Write) -> TrackResult<()> {
    let username = ward.auth.current_username().map(|s| s.to_string());
    let _ = Session::logout(&mut ward.auth);
    ward.store.remove(SESSION_KEY).context(ServiceSnafu {})?;
    match username {
        Some(name) => writeln!(out, "Logged out {}", name).context(TerminalSnafu {}),
        None => writeln!(out, "Not logged in").context(TerminalSnafu {}),
    }
}

fn whoami(ward: &mut Ward, out: &mut dyn Write) -> TrackResult<()> {
    let session = Session::restore(&ward.auth);
    match (session.user(), session.capabilities()) {
        (Some(user), Some(caps)) => {
            writeln!(out, "{} ({})", user.username, caps.role_label()).context(TerminalSnafu {})?;
            if let Some(profile) = &user.volunteer {
                writeln!(out, "Volunteer {} ({})", profile.name, profile.volunteer_id)
                    .context(TerminalSnafu {})?;
            }
            writeln!(out, "Home: {}", caps.home).context(TerminalSnafu {})?;
            print_nav(caps, ward.lang, out)
        }
        _ => writeln!(out, "Not logged in").context(TerminalSnafu {}),
    }
}

fn print_nav(caps: &Capabilities, lang: Language, out: &mut dyn Write) -> TrackResult<()> {
    for item in nav_items(caps) {
        writeln!(out, "  {:<14} {}", item.route.to_string(), item.label.get(lang))
            .context(TerminalSnafu {})?;
    }
    Ok(())
}

fn set_language(ward: &mut Ward, code: &str, out: &mut dyn Write) -> TrackResult<()> {
    let lang = parse_language(code)?;
    lang.save(&mut ward.store).context(ServiceSnafu {})?;
    ward.lang = lang;
    writeln!(out, "Language set to {}", lang.code()).context(TerminalSnafu {})
}

fn open_page(ward: &mut Ward, path: &str, out: &mut dyn Write) -> TrackResult<()> {
    let route: Route = match path.parse() {
        Ok(r) => r,
        Err(e) => match e {},
    };
    let session = Session::restore(&ward.auth);
    let line = match guard(&session, route) {
        Guard::Render(r) => format!("render {}", r),
        Guard::Redirect(r) => format!("redirect {}", r),
        Guard::ShowLoading => "loading".to_string(),
    };
    writeln!(out, "{}", line).context(TerminalSnafu {})
}

// ******** Voters **********

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    pub voted: Option<bool>,
    pub party: Option<String>,
    pub status: Option<String>,
    pub page: u32,
    pub all: bool,
}

fn parse_party(policy: &FieldPolicy, caps: &Capabilities, input: &str) -> TrackResult<Party> {
    match policy.parse_party(caps, input) {
        Some(p) => Ok(p),
        None if caps.can_see_party_names => {
            whatever!("Unknown party {:?} (expected ldf, udf, bjp, other or unknown)", input)
        }
        None => whatever!("Unknown division {:?}", input),
    }
}

fn list_voters(ward: &mut Ward, opts: &ListOptions, watch: bool, out: &mut dyn Write) -> TrackResult<()> {
    let (caps, _) = ward.enter(Route::Voters, out)?;
    let policy = ward.policy();
    let page_size = ward.config().page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    let mut listing = VoterListing::for_capabilities(&caps).with_page_size(page_size);
    if opts.all {
        listing.set_filters(VoterFilters::default());
    }
    if opts.search.is_some() {
        listing.set_search(opts.search.clone());
    }
    if opts.voted.is_some() {
        listing.set_has_voted(opts.voted);
    }
    if let Some(p) = &opts.party {
        listing.set_party(Some(parse_party(&policy, &caps, p)?));
    }
    if let Some(s) = &opts.status {
        listing.set_status(Some(parse_status(s)?));
    }
    listing.set_page(opts.page);

    listing.fetch(&ward.dir, Utc::now()).context(FlowSnafu {})?;
    print_listing(&listing, &policy, &caps, ward.lang, out)?;

    if !watch {
        return Ok(());
    }
    let period = match caps.auto_refresh {
        Some(p) => p,
        None => {
            return writeln!(out, "This list does not refresh itself").context(TerminalSnafu {});
        }
    };
    loop {
        std::thread::sleep(period);
        if !listing.refresh_due(Utc::now()) {
            continue;
        }
        // Another machine may have changed the ward file in the meantime.
        ward.dir.reload()?;
        ward.dir.set_viewer(&caps);
        match listing.fetch(&ward.dir, Utc::now()) {
            Ok(()) => print_listing(&listing, &policy, &caps, ward.lang, out)?,
            Err(e) => {
                warn!("list_voters: refresh failed: {}", e);
                writeln!(out, "{}", messages::describe(&e, ward.lang)).context(TerminalSnafu {})?;
            }
        }
    }
}

fn print_listing(
    listing: &VoterListing,
    policy: &FieldPolicy,
    caps: &Capabilities,
    lang: Language,
    out: &mut dyn Write,
) -> TrackResult<()> {
    writeln!(
        out,
        "Page {}/{} ({} voters)",
        listing.page(),
        listing.total_pages(),
        listing.count().unwrap_or(listing.voters().len() as u64)
    )
    .context(TerminalSnafu {})?;
    for v in listing.voters() {
        writeln!(out, "{}", voter_line(policy, caps, v, lang)).context(TerminalSnafu {})?;
    }
    Ok(())
}

fn print_voter(
    policy: &FieldPolicy,
    caps: &Capabilities,
    v: &Voter,
    lang: Language,
    out: &mut dyn Write,
) -> TrackResult<()> {
    writeln!(out, "{} (S.No: {})", v.name(lang), v.serial_no).context(TerminalSnafu {})?;
    writeln!(out, "  {}", v.house_name(lang)).context(TerminalSnafu {})?;
    if let Some(age) = v.age {
        writeln!(out, "  Age: {}", age).context(TerminalSnafu {})?;
    }
    for (_, view) in policy.views(caps, v, lang) {
        let mark = if view.editable { "" } else { " (read-only)" };
        writeln!(out, "  {}: {}{}", view.label, view.display, mark).context(TerminalSnafu {})?;
    }
    if let Some(t) = v.time_voted {
        writeln!(
            out,
            "  Voted at: {}",
            t.with_timezone(&Local).format("%d/%m/%Y %H:%M")
        )
        .context(TerminalSnafu {})?;
    }
    Ok(())
}

fn show_voter(ward: &mut Ward, id: u32, out: &mut dyn Write) -> TrackResult<()> {
    let (caps, _) = ward.enter(Route::VoterDetail(id), out)?;
    let voter = ward.dir.get(id).context(ServiceSnafu {})?;
    print_voter(&ward.policy(), &caps, &voter, ward.lang, out)
}

#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    pub status: Option<String>,
    pub party: Option<String>,
    pub voted: Option<bool>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

fn edit_voter(ward: &mut Ward, id: u32, changes: &EditOptions, out: &mut dyn Write) -> TrackResult<()> {
    let (caps, _) = ward.enter(Route::VoterDetail(id), out)?;
    let policy = ward.policy();
    let current = ward.dir.get(id).context(ServiceSnafu {})?;
    let update = VoterUpdate {
        status: match &changes.status {
            Some(s) => Some(parse_status(s)?),
            None => None,
        },
        party: match &changes.party {
            Some(p) => Some(parse_party(&policy, &caps, p)?),
            None => None,
        },
        has_voted: changes.voted,
        phone_number: changes.phone.clone(),
        notes: changes.notes.clone(),
    };
    policy
        .authorize(&caps, &current, &update)
        .context(EditSnafu {})?;
    let updated = ward.dir.update(id, &update).context(ServiceSnafu {})?;
    writeln!(out, "{}", messages::CHANGES_SAVED.get(ward.lang)).context(TerminalSnafu {})?;
    print_voter(&policy, &caps, &updated, ward.lang, out)
}

// ******** Data entry **********

/// Marks the voters whose serial numbers come in, one submission per line.
fn data_entry<I>(ward: &mut Ward, lines: I, history: bool, out: &mut dyn Write) -> TrackResult<()>
where
    I: Iterator<Item = io::Result<String>>,
{
    let (_, target) = ward.enter(Route::DataEntry, out)?;
    if target != Route::DataEntry {
        return list_voters(ward, &ListOptions::default(), false, out);
    }
    let mut entry = DataEntry::new(&ward.dir, &ward.store);

    if history {
        for r in entry.trail().records() {
            writeln!(
                out,
                "{}  {:>5}  {:<28} {}",
                r.timestamp.format("%d/%m/%Y %H:%M:%S"),
                r.voter.serial_no,
                r.voter.name(ward.lang),
                r.voter.house_name(ward.lang)
            )
            .context(TerminalSnafu {})?;
        }
        return writeln!(out, "{} voters marked on this machine", entry.trail().len())
            .context(TerminalSnafu {});
    }
    if !entry.voting_enabled() {
        writeln!(out, "{}", messages::describe(&FlowError::FeatureDisabled, ward.lang))
            .context(TerminalSnafu {})?;
        return Ok(());
    }

    let mut marked = 0;
    for line in lines {
        let line = line.context(TerminalSnafu {})?;
        entry.set_input(&line);
        let res = entry.submit(&mut ward.dir, &mut ward.store);
        if let Some(msg) = res.message(ward.lang) {
            writeln!(out, "{}", msg).context(TerminalSnafu {})?;
        }
        if matches!(res, Submission::Marked(_)) {
            marked += 1;
        }
    }
    info!("data_entry: {} voters marked", marked);
    Ok(())
}

// ******** Dashboard **********

fn dashboard(ward: &mut Ward, out: &mut dyn Write) -> TrackResult<()> {
    let (caps, target) = ward.enter(Route::Dashboard, out)?;
    if target != Route::Dashboard {
        return list_voters(ward, &ListOptions::default(), false, out);
    }
    let policy = ward.policy();
    let lang = ward.lang;
    let stats = ward.dir.dashboard_stats().context(ServiceSnafu {})?;

    let mut lines = vec![
        ward.config().ward_name.clone(),
        format!("Total voters:  {}", stats.total_voters),
        format!("Voted:         {} ({}%)", stats.voted_count, stats.voting_percentage),
        format!("Not voted:     {}", stats.not_voted_count),
        format!(
            "Voted (M / F): {} / {}",
            stats.male_voted, stats.female_voted
        ),
        format!("{}:", policy.party_label(&caps).get(lang)),
    ];
    for (party, s) in stats.party_stats.iter() {
        lines.push(format!(
            "  {:<12} {}",
            policy.party_display(&caps, *party, lang),
            s.voted_count
        ));
    }
    lines.push(format!("{}:", messages::STATUS.get(lang)));
    for (status, s) in stats.status_stats.iter() {
        lines.push(format!(
            "  {:<16} {}",
            messages::status_label(status, lang),
            s.count
        ));
    }
    for (title, table) in [
        ("Level 2 volunteers", &stats.level2_volunteer_stats),
        ("Level 1 volunteers", &stats.level1_volunteer_stats),
    ] {
        if table.is_empty() {
            continue;
        }
        lines.push(format!("{}:", title));
        for s in table.iter() {
            lines.push(format!(
                "  {:<20} {:>4}/{:<4} {:>6}%   {} {:>4}/{:<4} {:>6}%",
                s.name,
                s.voted_count,
                s.total_voters,
                s.voting_percentage,
                policy.party_display(&caps, Party::Ldf, lang),
                s.ldf_voted,
                s.ldf_total,
                s.ldf_percentage
            ));
        }
    }
    for l in lines {
        writeln!(out, "{}", l).context(TerminalSnafu {})?;
    }
    Ok(())
}

// ******** Volunteers **********

fn list_volunteers(ward: &mut Ward, level: Option<&str>, out: &mut dyn Write) -> TrackResult<()> {
    let (_, target) = ward.enter(Route::Volunteers, out)?;
    if target != Route::Volunteers {
        return list_voters(ward, &ListOptions::default(), false, out);
    }
    let level = match level {
        Some(l) => Some(parse_level(l)?),
        None => None,
    };
    let volunteers = ward.dir.volunteers(level).context(ServiceSnafu {})?;
    for v in volunteers.iter() {
        let level = match v.level {
            VolunteerLevel::Level1 => "level 1",
            VolunteerLevel::Level2 => "level 2",
        };
        let active = if v.is_active { "" } else { " (inactive)" };
        writeln!(
            out,
            "{:>4}  {:>5}  {:<24} {}{}",
            v.id, v.volunteer_id, v.name, level, active
        )
        .context(TerminalSnafu {})?;
    }
    Ok(())
}

fn volunteer_voters(
    ward: &mut Ward,
    id: u32,
    voted: Option<bool>,
    out: &mut dyn Write,
) -> TrackResult<()> {
    let (caps, target) = ward.enter(Route::VolunteerVoters(id), out)?;
    if target != Route::VolunteerVoters(id) {
        return list_voters(ward, &ListOptions::default(), false, out);
    }
    let policy = ward.policy();
    let volunteer = ward.dir.volunteer(id).context(ServiceSnafu {})?;
    let voters = ward
        .dir
        .volunteer_voters(id, voted)
        .context(ServiceSnafu {})?;
    writeln!(out, "{} ({} voters)", volunteer.name, voters.len()).context(TerminalSnafu {})?;
    for v in voters.iter() {
        writeln!(out, "{}", voter_line(&policy, &caps, v, ward.lang)).context(TerminalSnafu {})?;
    }
    Ok(())
}

// ******** Reports **********

fn export_report(
    ward: &mut Ward,
    ldf_only: bool,
    out_dir: &str,
    reference: Option<&str>,
    out: &mut dyn Write,
) -> TrackResult<()> {
    let (caps, target) = ward.enter(Route::Dashboard, out)?;
    if target != Route::Dashboard {
        return list_voters(ward, &ListOptions::default(), false, out);
    }
    let req = ExportRequest {
        mode: if ldf_only {
            ExportMode::LdfOnly
        } else {
            ExportMode::AllVoters
        },
        language: ward.lang,
        ward_name: &ward.dir.config().ward_name,
        scheme: ward.dir.config().division_scheme,
        now: Local::now(),
    };
    let mut sink = JsonReportSink::new(Path::new(out_dir));
    let report: Report =
        export(&ward.dir, &ward.dir, &mut sink, &caps, &req).context(FlowSnafu {})?;
    writeln!(out, "{}", report.title).context(TerminalSnafu {})?;
    writeln!(
        out,
        "{}: {}  Voted: {}  ({}%)",
        report.total_label,
        report.summary.denominator,
        report.summary.numerator,
        report.summary.percentage
    )
    .context(TerminalSnafu {})?;
    for p in sink.written() {
        writeln!(out, "Written to {}", p.display()).context(TerminalSnafu {})?;
    }

    if let Some(reference_path) = reference {
        if !check_reference(&report, reference_path)? {
            whatever!("Difference detected between the report and the reference report")
        }
        writeln!(out, "Same summary as {}", simplify_file_name(reference_path))
            .context(TerminalSnafu {})?;
    }
    Ok(())
}

// ******** Ward data **********

/// The ward data commands are for administrators only.
fn enter_as_admin(ward: &mut Ward, out: &mut dyn Write) -> TrackResult<Capabilities> {
    let (caps, _) = ward.enter(Route::Voters, out)?;
    if !caps.is_admin {
        return Err(ServiceError::Forbidden).context(ServiceSnafu {});
    }
    Ok(caps)
}

/// What an import would do to the ward.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ImportPlan {
    /// (voter id, serial number, current party) of the voters to change.
    pub changes: Vec<(u32, u32, Party)>,
    /// Serial numbers of voters that already have the party.
    pub unchanged: Vec<u32>,
    pub not_found: Vec<u32>,
}

pub fn plan_party_import(dir: &MemoryDirectory, serials: &BTreeSet<u32>, party: Party) -> ImportPlan {
    let mut plan = ImportPlan::default();
    for serial in serials.iter() {
        match dir.voter_by_serial(*serial) {
            Some(v) if v.party == party => plan.unchanged.push(*serial),
            Some(v) => plan.changes.push((v.id, *serial, v.party)),
            None => plan.not_found.push(*serial),
        }
    }
    plan
}

fn import_party(
    ward: &mut Ward,
    serials: &BTreeSet<u32>,
    party_code: &str,
    dry_run: bool,
    out: &mut dyn Write,
) -> TrackResult<()> {
    enter_as_admin(ward, out)?;
    let party = match Party::from_code(&party_code.to_ascii_lowercase()) {
        Some(p) => p,
        None => whatever!("Unknown party {:?}", party_code),
    };
    if serials.is_empty() {
        whatever!("No valid serial numbers found in the Excel file");
    }
    let plan = plan_party_import(ward.dir.memory(), serials, party);
    let name = messages::party_label(party, Language::En);
    for (id, serial, old) in plan.changes.iter() {
        if dry_run {
            writeln!(
                out,
                "  Serial {}: would update to {} (currently {})",
                serial,
                name,
                messages::party_label(*old, Language::En)
            )
            .context(TerminalSnafu {})?;
        } else {
            let update = VoterUpdate {
                party: Some(party),
                ..Default::default()
            };
            ward.dir.update(*id, &update).context(ServiceSnafu {})?;
            writeln!(
                out,
                "  Serial {}: updated from {} to {}",
                serial,
                messages::party_label(*old, Language::En),
                name
            )
            .context(TerminalSnafu {})?;
        }
    }
    for serial in plan.unchanged.iter() {
        writeln!(out, "  Serial {}: already {}", serial, name).context(TerminalSnafu {})?;
    }
    let verb = if dry_run { "Would update" } else { "Updated" };
    writeln!(out, "{}: {}", verb, plan.changes.len() + plan.unchanged.len())
        .context(TerminalSnafu {})?;
    writeln!(out, "Not Found: {}", plan.not_found.len()).context(TerminalSnafu {})?;
    if !plan.not_found.is_empty() {
        writeln!(out, "Serial numbers not found: {:?}", plan.not_found).context(TerminalSnafu {})?;
    }
    Ok(())
}

// ******** Voter lists **********

/// The voters of the ward after an import of the voter lists.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct VoterImport {
    pub voters: Vec<Voter>,
    pub created: usize,
    pub updated: usize,
    /// Serial numbers of the lines that were left out, with the reason.
    pub skipped: Vec<(u32, &'static str)>,
}

fn csv_field(row: Option<&CsvRow>, key: &str) -> Option<String> {
    row.and_then(|r| r.get(key))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn csv_gender(s: &str) -> Gender {
    let s = s.to_ascii_uppercase();
    if s.contains('F') {
        Gender::Female
    } else if s.contains('M') {
        Gender::Male
    } else {
        Gender::Other
    }
}

/// Merges the English and Malayalam voter lists into the voters of the ward.
///
/// A voter is matched on its SEC id: known voters are updated, the others are created with
/// the next free ids. The party, the voted flag, the volunteers and the notes are kept.
pub fn plan_voter_import(
    existing: &[Voter],
    en: &BTreeMap<u32, CsvRow>,
    ml: &BTreeMap<u32, CsvRow>,
) -> VoterImport {
    let mut plan = VoterImport {
        voters: existing.to_vec(),
        ..Default::default()
    };
    let mut next_id = existing.iter().map(|v| v.id).max().unwrap_or(0) + 1;
    for (serial, row) in en.iter() {
        let en_row = Some(row);
        let ml_row = ml.get(serial);
        let sec_id = match csv_field(en_row, "New SEC ID No.") {
            Some(x) => x,
            None => {
                plan.skipped.push((*serial, "No SEC ID"));
                continue;
            }
        };
        let name_en = match csv_field(en_row, "Name") {
            Some(x) => x,
            None => {
                plan.skipped.push((*serial, "No name"));
                continue;
            }
        };
        let known = plan
            .voters
            .iter()
            .position(|v| v.sec_id.as_deref() == Some(sec_id.as_str()));
        let idx = match known {
            Some(i) => {
                plan.updated += 1;
                i
            }
            None => {
                plan.created += 1;
                plan.voters.push(Voter {
                    id: next_id,
                    serial_no: *serial,
                    sec_id: Some(sec_id),
                    name_en: name_en.clone(),
                    name_ml: None,
                    house_name_en: String::new(),
                    house_name_ml: None,
                    status: VoterStatus::Active,
                    party: Party::Unknown,
                    has_voted: false,
                    phone_number: None,
                    notes: None,
                    level1_volunteer: None,
                    level2_volunteer: None,
                    gender: None,
                    age: None,
                    time_voted: None,
                });
                next_id += 1;
                plan.voters.len() - 1
            }
        };
        let v = &mut plan.voters[idx];
        v.serial_no = *serial;
        v.name_en = name_en;
        v.name_ml = csv_field(ml_row, "Name");
        v.house_name_en = csv_field(en_row, "House Name").unwrap_or_default();
        v.house_name_ml = csv_field(ml_row, "House Name");
        v.gender = csv_field(en_row, "Gender").map(|g| csv_gender(&g));
        v.age = csv_field(en_row, "Age")
            .and_then(|a| parse_number(&a))
            .filter(|a| *a > 0);
        let deleted = csv_field(en_row, "Category")
            .map_or(false, |c| c.to_lowercase().contains("deletion"));
        if deleted {
            v.status = VoterStatus::Deleted;
        }
    }
    debug!(
        "plan_voter_import: created: {} updated: {} skipped: {:?}",
        plan.created, plan.updated, plan.skipped
    );
    plan
}

fn import_voters(
    ward: &mut Ward,
    en_path: &str,
    ml_path: Option<&str>,
    clear: bool,
    out: &mut dyn Write,
) -> TrackResult<()> {
    enter_as_admin(ward, out)?;
    let en = io_csv::read_voter_rows(en_path)?;
    if en.is_empty() {
        whatever!("No voters found in {}", en_path);
    }
    let ml = match ml_path {
        Some(p) if Path::new(p).exists() => io_csv::read_voter_rows(p)?,
        Some(p) => {
            writeln!(
                out,
                "Malayalam file not found: {}. Proceeding with the English file only",
                p
            )
            .context(TerminalSnafu {})?;
            BTreeMap::new()
        }
        None => BTreeMap::new(),
    };
    let existing = if clear {
        writeln!(out, "Deleting {} existing voters", ward.config().voters.len())
            .context(TerminalSnafu {})?;
        Vec::new()
    } else {
        ward.config().voters.clone()
    };

    let plan = plan_voter_import(&existing, &en, &ml);
    for (serial, reason) in plan.skipped.iter() {
        writeln!(out, "Skipping voter {}: {}", serial, reason).context(TerminalSnafu {})?;
    }
    let (created, updated, skipped) = (plan.created, plan.updated, plan.skipped.len());
    ward.dir.replace_voters(plan.voters)?;
    writeln!(out, "Created: {}", created).context(TerminalSnafu {})?;
    writeln!(out, "Updated: {}", updated).context(TerminalSnafu {})?;
    if skipped > 0 {
        writeln!(out, "Errors: {}", skipped).context(TerminalSnafu {})?;
    }
    writeln!(out, "Total: {}", created + updated).context(TerminalSnafu {})
}

// ******** Thara assignment **********

/// The user name of the level 2 volunteer in charge of a thara.
pub fn thara_username(thara: u32) -> String {
    format!("th{:02}", thara)
}

/// What an assignment from the thara list would do to the ward.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct TharaPlan {
    /// The level 2 volunteer of each thara that has one.
    pub volunteers: BTreeMap<u32, Volunteer>,
    /// (voter id, serial number, thara) of the voters to assign.
    pub assignments: Vec<(u32, u32, u32)>,
    /// (serial number, thara) of the voters whose thara has no volunteer.
    pub no_volunteer: Vec<(u32, u32)>,
    pub not_found: Vec<u32>,
}

impl TharaPlan {
    /// Voters assigned per thara.
    pub fn distribution(&self) -> BTreeMap<u32, usize> {
        let mut res = BTreeMap::new();
        for (_, _, thara) in self.assignments.iter() {
            *res.entry(*thara).or_insert(0) += 1;
        }
        res
    }
}

pub fn plan_thara_assignment(dir: &MemoryDirectory, mapping: &BTreeMap<u32, u32>) -> TharaPlan {
    let mut plan = TharaPlan::default();
    let tharas: BTreeSet<u32> = mapping.values().copied().collect();
    for thara in tharas.iter() {
        let username = thara_username(*thara);
        let found = dir.all_volunteers().iter().find(|v| {
            v.level == VolunteerLevel::Level2 && v.username.as_deref() == Some(username.as_str())
        });
        if let Some(v) = found {
            plan.volunteers.insert(*thara, v.clone());
        }
    }
    for (serial, thara) in mapping.iter() {
        if !plan.volunteers.contains_key(thara) {
            plan.no_volunteer.push((*serial, *thara));
            continue;
        }
        match dir.voter_by_serial(*serial) {
            Some(v) => plan.assignments.push((v.id, *serial, *thara)),
            None => plan.not_found.push(*serial),
        }
    }
    plan
}

fn assign_tharas(
    ward: &mut Ward,
    mapping: &BTreeMap<u32, u32>,
    dry_run: bool,
    out: &mut dyn Write,
) -> TrackResult<()> {
    enter_as_admin(ward, out)?;
    if mapping.is_empty() {
        whatever!("No valid mappings found in the thara list");
    }
    let plan = plan_thara_assignment(ward.dir.memory(), mapping);
    let tharas: BTreeSet<u32> = mapping.values().copied().collect();
    for thara in tharas.iter() {
        let line = match plan.volunteers.get(thara) {
            Some(v) => format!("  Found volunteer: {} - {}", thara_username(*thara), v.name),
            None => format!("  Volunteer {} not found", thara_username(*thara)),
        };
        writeln!(out, "{}", line).context(TerminalSnafu {})?;
    }
    if plan.volunteers.is_empty() {
        whatever!("No level 2 volunteers found for the tharas of the list");
    }
    if dry_run {
        writeln!(out, "DRY RUN MODE - No changes will be made").context(TerminalSnafu {})?;
    }
    for (serial, thara) in plan.no_volunteer.iter() {
        writeln!(
            out,
            "Skipping serial {}: Volunteer {} not found",
            serial,
            thara_username(*thara)
        )
        .context(TerminalSnafu {})?;
    }
    for serial in plan.not_found.iter() {
        writeln!(out, "Skipping serial {}: Voter not found", serial).context(TerminalSnafu {})?;
    }

    if !dry_run && !plan.assignments.is_empty() {
        let mut voters = ward.config().voters.clone();
        for (id, _, thara) in plan.assignments.iter() {
            let volunteer_id = plan.volunteers.get(thara).map(|v| v.id);
            if let Some(v) = voters.iter_mut().find(|v| v.id == *id) {
                v.level2_volunteer = volunteer_id;
            }
        }
        ward.dir.replace_voters(voters)?;
    }

    writeln!(out, "Assigned: {}", plan.assignments.len()).context(TerminalSnafu {})?;
    writeln!(
        out,
        "Skipped: {}",
        plan.no_volunteer.len() + plan.not_found.len()
    )
    .context(TerminalSnafu {})?;
    writeln!(out, "Distribution by level 2 volunteer:").context(TerminalSnafu {})?;
    for (thara, count) in plan.distribution() {
        let name = plan.volunteers.get(&thara).map_or("", |v| v.name.as_str());
        writeln!(
            out,
            "  {} ({}): {} voters",
            thara_username(thara),
            name,
            count
        )
        .context(TerminalSnafu {})?;
    }
    if dry_run {
        writeln!(out, "To apply these changes, run without --dry-run").context(TerminalSnafu {})?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/ward_sample.json");

    // A private copy of the sample ward, with its own store.
    fn ward(name: &str) -> (Ward, PathBuf) {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut dir = std::env::temp_dir();
        dir.push(format!("wardtrack_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ward.json");
        fs::copy(SAMPLE, &path).unwrap();
        let w = Ward::open(&path.display().to_string(), None, None).unwrap();
        (w, dir)
    }

    fn run_cmd(w: &mut Ward, cmd: Command) -> TrackResult<String> {
        let mut buf: Vec<u8> = Vec::new();
        run_command(w, &cmd, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    fn login_as(w: &mut Ward, username: &str, password: &str) {
        run_cmd(
            w,
            Command::Login {
                username: username.to_string(),
                password: Some(password.to_string()),
            },
        )
        .unwrap();
    }

    fn entry(serials: &[&str]) -> Command {
        Command::Entry {
            serial: serials.iter().map(|s| s.to_string()).collect(),
            history: false,
        }
    }

    #[test]
    fn commands_need_a_login() {
        let (mut w, dir) = ward("need_login");
        let res = run_cmd(&mut w, Command::Stats);
        assert!(matches!(res, Err(TrackError::NotLoggedIn { .. })));
        let res = run_cmd(
            &mut w,
            Command::Login {
                username: "admin".to_string(),
                password: Some("nope".to_string()),
            },
        );
        assert!(matches!(res, Err(TrackError::LoginFailed { .. })));
        let s = run_cmd(&mut w, Command::Whoami).unwrap();
        assert_eq!(s.trim(), "Not logged in");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn data_entry_marks_and_saves() {
        let (mut w, dir) = ward("entry");
        login_as(&mut w, "admin", "admin123");
        let s = run_cmd(&mut w, entry(&["1", "3", "1", "9999"])).unwrap();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "✓ Anitha K (S.No: 1) marked as voted");
        assert_eq!(lines[1], "Kesavan Nair (S.No: 3) is marked as Deceased");
        assert_eq!(lines[2], "Anitha K (S.No: 1) is already marked as voted");
        assert_eq!(lines[3], "Serial number 9999 not found");

        // The ward file and the audit trail were both written.
        let again = Ward::open(w.dir.path(), None, None).unwrap();
        assert!(again.dir.voter_by_serial(1).map_or(false, |v| v.has_voted));
        let mut again = again;
        let s = run_cmd(
            &mut again,
            Command::Entry {
                serial: vec![],
                history: true,
            },
        )
        .unwrap();
        assert!(s.contains("Anitha K"));
        assert!(s.contains("1 voters marked on this machine"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unsaved_marks_stay_out_of_the_trail() {
        let (mut w, dir) = ward("entry_unsaved");
        login_as(&mut w, "admin", "admin123");
        let path = w.dir.path().to_string();
        fs::remove_file(&path).unwrap();
        fs::create_dir_all(&path).unwrap();

        let s = run_cmd(&mut w, entry(&["1", "3"])).unwrap();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "Failed to update voter status");
        assert_eq!(lines[1], "Kesavan Nair (S.No: 3) is marked as Deceased");
        assert!(w.dir.voter_by_serial(1).map_or(false, |v| !v.has_voted));

        let store = FileStore::open(&default_store_path(&path)).unwrap();
        assert_eq!(store.get(ward_access::entry::MARKED_VOTERS_KEY), None);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn volunteers_are_sent_back_to_the_voter_list() {
        let (mut w, dir) = ward("redirect");
        login_as(&mut w, "booth", "booth123");
        let s = run_cmd(&mut w, Command::Stats).unwrap();
        assert!(s.starts_with("/dashboard is not available to this account, showing /voters"));
        assert!(s.contains("Page 1/"));
        // A level 1 volunteer only sees divisions, never party names.
        assert!(!s.contains("LDF"));

        let s = run_cmd(
            &mut w,
            Command::Open {
                path: "/data-entry".to_string(),
            },
        )
        .unwrap();
        assert_eq!(s.trim(), "redirect /voters");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn read_only_accounts_cannot_edit() {
        let (mut w, dir) = ward("read_only");
        login_as(&mut w, "overview", "overview123");
        let res = run_cmd(
            &mut w,
            Command::Edit {
                id: 1,
                status: None,
                party: None,
                voted: None,
                phone: Some("9400000000".to_string()),
                notes: None,
            },
        );
        assert!(matches!(
            res,
            Err(TrackError::Edit {
                source: EditRejection::ReadOnly
            })
        ));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn thara_edits_with_division_letters() {
        let (mut w, dir) = ward("thara_edit");
        login_as(&mut w, "thara", "thara123");
        let s = run_cmd(
            &mut w,
            Command::Edit {
                id: 2,
                status: None,
                party: Some("Division C".to_string()),
                voted: None,
                phone: None,
                notes: Some("Prefers morning".to_string()),
            },
        )
        .unwrap();
        assert!(s.starts_with("Changes saved successfully!"));
        assert!(s.contains("Division: Division C"));
        let again = Ward::open(w.dir.path(), None, None).unwrap();
        let v = again.dir.voter_by_serial(2).cloned().unwrap();
        assert_eq!(v.party, Party::Bjp);
        assert_eq!(v.notes.as_deref(), Some("Prefers morning"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn export_writes_a_report() {
        let (mut w, dir) = ward("export");
        login_as(&mut w, "admin", "admin123");
        run_cmd(&mut w, entry(&["1"])).unwrap();
        let out_dir = dir.join("reports");
        let s = run_cmd(
            &mut w,
            Command::Export {
                ldf_only: true,
                out: Some(out_dir.display().to_string()),
                reference: None,
            },
        )
        .unwrap();
        assert!(s.starts_with("Ward 14 - LDF Voting Status Report"));
        let written: Vec<PathBuf> = fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(written.len(), 1);
        let reference = written[0].display().to_string();
        run_cmd(
            &mut w,
            Command::Export {
                ldf_only: true,
                out: Some(out_dir.display().to_string()),
                reference: Some(reference),
            },
        )
        .unwrap();
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn party_import_plan() {
        let (mut w, dir) = ward("import");
        login_as(&mut w, "admin", "admin123");
        let serials: BTreeSet<u32> = [1, 2, 4242].into_iter().collect();
        let plan = plan_party_import(w.dir.memory(), &serials, Party::Ldf);
        assert_eq!(plan.unchanged, vec![1]);
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.not_found, vec![4242]);

        let mut buf: Vec<u8> = Vec::new();
        import_party(&mut w, &serials, "LDF", true, &mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.contains("Would update: 2"));
        assert!(s.contains("Not Found: 1"));
        assert_eq!(w.dir.voter_by_serial(2).map(|v| v.party), Some(Party::Udf));

        let mut buf: Vec<u8> = Vec::new();
        import_party(&mut w, &serials, "ldf", false, &mut buf).unwrap();
        let again = Ward::open(w.dir.path(), None, None).unwrap();
        assert_eq!(again.dir.voter_by_serial(2).map(|v| v.party), Some(Party::Ldf));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn voter_lists_are_merged_on_the_sec_id() {
        let (mut w, dir) = ward("import_voters");
        let en = dir.join("voters_en.csv");
        fs::write(
            &en,
            "Serial No.,New SEC ID No.,Name,Guardian's Name,House Name,Gender,Age,Category\n\
             9,KL/14/001,Meera V,Vasu,Thekkethil,Female,29,Existing\n\
             10,,No Id,,,M,40,\n\
             11,KL/14/003,Joseph T,Thomas,Kunnel,M,61,Deletion\n",
        )
        .unwrap();
        let ml = dir.join("voters_ml.csv");
        fs::write(&ml, "Serial No.,Name,House Name\n9,മീര വി,തെക്കേതിൽ\n").unwrap();
        let cmd = Command::ImportVoters {
            en_csv: en.display().to_string(),
            ml_csv: Some(ml.display().to_string()),
            clear: false,
        };

        login_as(&mut w, "overview", "overview123");
        let res = run_cmd(&mut w, cmd.clone());
        assert!(matches!(
            res,
            Err(TrackError::Service {
                source: ServiceError::Forbidden
            })
        ));

        login_as(&mut w, "admin", "admin123");
        let s = run_cmd(&mut w, cmd.clone()).unwrap();
        assert!(s.contains("Skipping voter 10: No SEC ID"));
        assert!(s.contains("Created: 2\nUpdated: 0\nErrors: 1\nTotal: 2"));

        let again = Ward::open(w.dir.path(), None, None).unwrap();
        let meera = again.dir.voter_by_serial(9).cloned().unwrap();
        assert_eq!(meera.id, 9);
        assert_eq!(meera.name_ml.as_deref(), Some("മീര വി"));
        assert_eq!(meera.house_name_ml.as_deref(), Some("തെക്കേതിൽ"));
        assert_eq!(meera.gender, Some(Gender::Female));
        assert_eq!(meera.age, Some(29));
        assert_eq!(meera.status, VoterStatus::Active);
        let joseph = again.dir.voter_by_serial(11).cloned().unwrap();
        assert_eq!(joseph.status, VoterStatus::Deleted);
        assert_eq!(joseph.name_ml, None);
        assert_eq!(
            again.dir.voter_by_serial(1).map(|v| v.party),
            Some(Party::Ldf)
        );

        // The same lists again only update.
        let s = run_cmd(&mut w, cmd).unwrap();
        assert!(s.contains("Created: 0\nUpdated: 2"));
        assert_eq!(w.dir.config().voters.len(), 10);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn thara_list_assigns_level2_volunteers() {
        let (mut w, dir) = ward("assign_tharas");
        login_as(&mut w, "admin", "admin123");
        let list = dir.join("thara.csv");
        fs::write(&list, "VL No,Name,Thara\n1,Anitha K,2\n2,Rajan P,2\n9999,Nobody,2\n5,Somebody,7\n")
            .unwrap();
        let assign = |dry_run: bool| Command::AssignTharas {
            csv: list.display().to_string(),
            dry_run,
        };

        let s = run_cmd(&mut w, assign(true)).unwrap();
        assert!(s.contains("  Found volunteer: th02 - Biju Thomas"));
        assert!(s.contains("  Volunteer th07 not found"));
        assert!(s.contains("DRY RUN MODE"));
        assert_eq!(w.dir.voter_by_serial(1).and_then(|v| v.level2_volunteer), Some(1));

        let s = run_cmd(&mut w, assign(false)).unwrap();
        assert!(s.contains("Skipping serial 5: Volunteer th07 not found"));
        assert!(s.contains("Skipping serial 9999: Voter not found"));
        assert!(s.contains("Assigned: 2\nSkipped: 2"));
        assert!(s.contains("  th02 (Biju Thomas): 2 voters"));
        let again = Ward::open(w.dir.path(), None, None).unwrap();
        for serial in [1, 2] {
            assert_eq!(
                again.dir.voter_by_serial(serial).and_then(|v| v.level2_volunteer),
                Some(3)
            );
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn language_preference_is_stored() {
        let (mut w, dir) = ward("lang");
        run_cmd(
            &mut w,
            Command::Lang {
                code: "ml".to_string(),
            },
        )
        .unwrap();
        let again = Ward::open(w.dir.path(), None, None).unwrap();
        assert_eq!(again.lang, Language::Ml);
        let forced = Ward::open(w.dir.path(), None, Some("en")).unwrap();
        assert_eq!(forced.lang, Language::En);
        fs::remove_dir_all(&dir).unwrap();
    }
}
