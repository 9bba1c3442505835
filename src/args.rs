use clap::{Parser, Subcommand};

/// This is a collaborative prioritization program: teams score a shared backlog
/// on impact and complexity, and the scores are combined into a priority matrix.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, default prioriza_session.json) The JSON file holding the initiatives
    /// and the votes of the session. It is created by the first ingestion.
    #[clap(short, long, value_parser)]
    pub store: Option<String>,

    /// (file path, optional) A JSON configuration file with the session id and the list of teams.
    /// The last team of the list is the oversight team. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (string, optional) The id of the session. Setting this option overrides the id that may be
    /// specified with the --config option.
    #[clap(long, value_parser)]
    pub session: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging on the standard error.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Loads a backlog file into the session. This replaces all the existing initiatives.
    Ingest(IngestArgs),
    /// Scores one initiative. A second vote from the same user replaces the first one.
    Vote(VoteArgs),
    /// Shows the initiatives a user still has to score.
    Queue(QueueArgs),
    /// Computes the weighted position of every scored initiative.
    Matrix(MatrixArgs),
    /// Counts the initiatives of the session.
    Stats(StatsArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct IngestArgs {
    /// (file path) The backlog file.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// Required when the session already holds initiatives: they will be removed, with their votes.
    #[clap(long, takes_value = false)]
    pub replace: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct VoteArgs {
    /// The id of the initiative.
    #[clap(long, value_parser)]
    pub initiative: String,

    #[clap(long, value_parser)]
    pub user_id: String,

    #[clap(long, value_parser)]
    pub user_name: String,

    /// The team of the user. It must be one of the configured teams.
    #[clap(long, value_parser)]
    pub user_team: String,

    /// (0 to 100) The impact score. Values out of range are clamped.
    #[clap(long, value_parser, allow_hyphen_values = true)]
    pub impact: i64,

    /// (0 to 100) The complexity score. Values out of range are clamped.
    #[clap(long, value_parser, allow_hyphen_values = true)]
    pub complexity: i64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct QueueArgs {
    #[clap(long, value_parser)]
    pub user_id: String,

    /// Prints the whole queue instead of the next initiative only.
    #[clap(long, takes_value = false)]
    pub all: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct MatrixArgs {
    /// (optional) Only keeps the initiatives of this team.
    #[clap(long, value_parser)]
    pub team: Option<String>,

    /// (optional) Only keeps the initiatives with this priority (any accepted label).
    #[clap(long, value_parser)]
    pub priority: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the matrix will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, optional) If specified, the plotted initiatives are also written as CSV.
    #[clap(long, value_parser)]
    pub csv: Option<String>,

    /// (file path) A reference file containing a matrix summary in JSON format. If provided, prioriza will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StatsArgs {
    /// (optional) Also counts the initiatives this user did not score yet.
    #[clap(long, value_parser)]
    pub user_id: Option<String>,
}
