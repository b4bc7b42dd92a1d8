use clap::{Parser, Subcommand};

/// Ward voter tracking from the command line: voter lists, quick data entry and polling reports.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, default ward.json) The ward file with the users, volunteers, voters and settings.
    /// For more information about the file format, read the manual of the ward_access crate.
    #[clap(short, long, value_parser, default_value = "ward.json")]
    pub ward: String,

    /// (file path, optional) The local store (language, logged-in user, marked voters).
    /// Defaults to a `.store.json` file next to the ward file.
    #[clap(short, long, value_parser)]
    pub store: Option<String>,

    /// (en or ml, optional) The display language for this command only. See the `lang` command
    /// to change the stored preference.
    #[clap(long, value_parser)]
    pub lang: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Logs in. The password is read from the standard input when not given.
    Login {
        username: String,
        #[clap(short, long, value_parser)]
        password: Option<String>,
    },
    Logout,
    /// Prints the logged-in user and what the account may do.
    Whoami,
    /// Checks that a page may be opened, as in `/voters/12` or `/dashboard`.
    Open { path: String },
    /// Lists the voters.
    Voters {
        /// Name, house name or serial number.
        #[clap(long, value_parser)]
        search: Option<String>,
        /// true or false
        #[clap(long, value_parser)]
        voted: Option<bool>,
        /// Party code for administrators (ldf, udf...), division letter for everybody else.
        #[clap(long, value_parser)]
        party: Option<String>,
        #[clap(long, value_parser)]
        status: Option<String>,
        #[clap(long, value_parser, default_value_t = 1)]
        page: u32,
        /// Clears the default filters of the role.
        #[clap(long, takes_value = false)]
        all: bool,
        /// Keeps printing the list when the role refreshes it automatically.
        #[clap(long, takes_value = false)]
        watch: bool,
    },
    /// Shows one voter.
    Voter { id: u32 },
    /// Changes the fields of a voter.
    Edit {
        id: u32,
        #[clap(long, value_parser)]
        status: Option<String>,
        /// Party code for administrators, division letter for everybody else.
        #[clap(long, value_parser)]
        party: Option<String>,
        #[clap(long, value_parser)]
        voted: Option<bool>,
        #[clap(long, value_parser)]
        phone: Option<String>,
        #[clap(long, value_parser)]
        notes: Option<String>,
    },
    /// Quick data entry: marks voters as voted by serial number.
    /// The serial numbers are read from the standard input when no --serial is given.
    Entry {
        #[clap(long, value_parser)]
        serial: Vec<String>,
        /// Prints the voters marked on this machine and exits.
        #[clap(long, takes_value = false)]
        history: bool,
    },
    /// Prints the dashboard statistics.
    Stats,
    Volunteers {
        /// level1 or level2
        #[clap(long, value_parser)]
        level: Option<String>,
    },
    /// Lists the voters under one volunteer.
    VolunteerVoters {
        id: u32,
        #[clap(long, value_parser)]
        voted: Option<bool>,
    },
    /// Writes the polling status report of the voted voters.
    Export {
        #[clap(long, takes_value = false)]
        ldf_only: bool,
        /// (directory, default .) Where the report is written.
        #[clap(short, long, value_parser)]
        out: Option<String>,
        /// (file path) An earlier report. The summaries are compared and the differences printed.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    /// Sets the party of the voters whose serial numbers are listed in an Excel file.
    ImportParty {
        excel: String,
        /// (default: the first worksheet)
        #[clap(long, value_parser)]
        sheet: Option<String>,
        /// A cell range such as A1:R26. The whole worksheet is read by default.
        #[clap(long, value_parser)]
        range: Option<String>,
        #[clap(long, value_parser, default_value = "ldf")]
        party: String,
        /// Prints what would change without saving the ward file.
        #[clap(long, takes_value = false)]
        dry_run: bool,
    },
    /// Creates or updates the voters of the ward from the CSV voter list.
    /// Voters are matched on their SEC id.
    ImportVoters {
        /// The voter list in English, with a "Serial No." column.
        en_csv: String,
        /// (file path, optional) The same list in Malayalam. Names and house names are taken
        /// from the line with the same serial number.
        #[clap(long, value_parser)]
        ml_csv: Option<String>,
        /// Removes every voter of the ward before importing.
        #[clap(long, takes_value = false)]
        clear: bool,
    },
    /// Assigns the voters to level 2 volunteers from the thara list (columns "VL No" and "Thara").
    /// Thara 3 is the volunteer with the user name th03.
    AssignTharas {
        csv: String,
        /// Prints the assignments without saving the ward file.
        #[clap(long, takes_value = false)]
        dry_run: bool,
    },
    /// Stores the display language (en or ml).
    Lang { code: String },
}
